//! Status and reason model for the offload scan coordinator.
//!
//! Three related but distinct vocabularies live here:
//!
//! - [`StatusCode`] – the coordinator's *cached belief* about remote service
//!   health.  It persists between calls and is only overwritten by a later
//!   event or a successful operation.
//! - [`ReasonCode`] – a *per-call* explanation of why one request failed.
//!   It has no persistent lifecycle; every failing call produces a fresh one.
//! - [`Outcome`] – what the remote service *reported* for a single request,
//!   including the transport-level failure modes the service never sees.
//!
//! [`map_outcome`] is the single place that interprets an [`Outcome`].  The
//! coordinator never matches on outcomes directly; keeping the mapping in one
//! pure function keeps it independently testable and keeps call sites honest.

use thiserror::Error;

/// The coordinator's current belief about remote-service health.
///
/// `NoError` is the only state in which new scan requests are attempted;
/// every other value makes `start_scan` fail fast without a remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// The service is reachable and the last interaction succeeded.
    NoError,
    /// No service handle exists: none was found at construction, or the
    /// service process has since died.
    NoService,
    /// The service reported that it lost its connection to the scan hardware.
    NotConnected,
    /// A request to the service timed out.
    Timeout,
    /// Construction had no locator to work with, or the service reported a
    /// generic failure.
    Error,
}

/// Why a single request failed.  Output-only; set fresh on each failing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReasonCode {
    /// Default value; never attached to a failure.
    #[error("no failure")]
    None,
    /// A service handle exists but cached status has degraded; the request
    /// was rejected locally without a remote call.
    #[error("offload service is currently unusable")]
    NotAvailable,
    /// The caller asked to stop scans that were never subscribed to.
    #[error("not subscribed to offload scan results")]
    NotSubscribed,
    /// The service explicitly refused the requested operation.
    #[error("offload service refused the operation")]
    OperationFailed,
    /// The transport failed to deliver the request or timed out.
    #[error("request could not be delivered to the offload service")]
    TransactionFailed,
    /// No service handle exists at all: offload scans are unsupported on
    /// this system, or the service process has died.
    #[error("offload service is not available on this system")]
    NotSupported,
}

/// The service's reported result for one synchronous request.
///
/// `TransportFailed` and `TimedOut` are produced by the transport layer when
/// the service never answered; the remaining variants are answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The request was accepted.
    Ok,
    /// The service answered and explicitly refused the operation.
    Refused,
    /// The transport could not deliver the request.
    TransportFailed,
    /// The request was delivered but no answer arrived in time.
    TimedOut,
    /// The service is not currently available (no handle, or terminated
    /// between lookup and call).
    Unavailable,
    /// The service considers the caller subscribed but not yet configured;
    /// the request ordering was wrong.
    NotConfigured,
}

/// Maps a remote operation's reported outcome to the caller-facing result.
///
/// This table is the only place service-specific outcome codes are
/// interpreted.  Note that `TimedOut` and `TransportFailed` collapse to the
/// same reason: from the caller's point of view the request was simply not
/// transacted.  The coordinator separately degrades its cached status for
/// those two outcomes.
pub fn map_outcome(outcome: Outcome) -> Result<(), ReasonCode> {
    match outcome {
        Outcome::Ok => Ok(()),
        Outcome::Refused => Err(ReasonCode::OperationFailed),
        Outcome::TransportFailed => Err(ReasonCode::TransactionFailed),
        Outcome::TimedOut => Err(ReasonCode::TransactionFailed),
        Outcome::Unavailable => Err(ReasonCode::NotAvailable),
        Outcome::NotConfigured => Err(ReasonCode::NotSubscribed),
    }
}

/// Payload of an asynchronous error event reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceError {
    /// The service lost its connection to the scan hardware.
    NoConnection,
    /// An operation inside the service timed out.
    Timeout,
    /// An unspecified internal failure.
    Internal,
}

impl From<ServiceError> for StatusCode {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::NoConnection => StatusCode::NotConnected,
            ServiceError::Timeout => StatusCode::Timeout,
            ServiceError::Internal => StatusCode::Error,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
