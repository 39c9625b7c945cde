//! HAL-facing seam of the offload scan manager.
//!
//! The real offload service lives in another process; how requests cross
//! that boundary (and how notifications come back) is the transport's
//! problem.  This module pins down the two traits the coordinator consumes:
//!
//! - [`RemoteScanService`] – one connected service instance.  Calls are
//!   synchronous: they block until the transport returns or times out, and
//!   report an [`Outcome`] rather than raising errors.
//! - [`ServiceLocator`] – finds a service instance and constructs the
//!   [`NotificationBridge`](bridge::NotificationBridge) bound to a
//!   coordinator.
//!
//! The production implementations wrap the platform transport; tests and the
//! daemon's demo mode use [`mock::MockScanService`].

use std::sync::{Arc, Weak};

use offload_core::{Outcome, ScanRequestParams, ScanStats};
use uuid::Uuid;

pub mod bridge;
pub mod mock;

use bridge::{NotificationBridge, NotificationListener};

/// Opaque token handed to the service when registering for death
/// notifications.
///
/// The coordinator mints a fresh token per registration and checks incoming
/// death events against it, so a notification for a previous incarnation can
/// never act on the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeathToken(Uuid);

impl DeathToken {
    /// Mints a new, globally unique token.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DeathToken {
    fn default() -> Self {
        Self::new()
    }
}

/// One connected offload scan service.
///
/// Every method may be called with the service process already gone; the
/// implementation reports that as [`Outcome::Unavailable`] or
/// [`Outcome::TransportFailed`] instead of panicking.
pub trait RemoteScanService: Send + Sync {
    /// Applies scan parameters and filter settings.
    fn configure(&self, params: &ScanRequestParams) -> Outcome;

    /// Registers interest in scan results; delivered batches arrive on
    /// `bridge` until [`unsubscribe`](Self::unsubscribe) succeeds.
    fn subscribe(&self, bridge: Arc<NotificationBridge>) -> Outcome;

    /// Withdraws the current subscription.
    fn unsubscribe(&self) -> Outcome;

    /// Queries the service's scan statistics.
    fn scan_stats(&self) -> (Outcome, ScanStats);

    /// Asks the service to report its own death on `bridge`, tagged with
    /// `token`.
    fn link_to_death(&self, bridge: Arc<NotificationBridge>, token: DeathToken) -> Outcome;
}

/// Supplies a handle to the remote service and builds the notification
/// callback object bound to one coordinator.
pub trait ServiceLocator: Send + Sync {
    /// Returns a handle to a running offload service, if one exists.
    fn remote_service(&self) -> Option<Arc<dyn RemoteScanService>>;

    /// Constructs the notification bridge that forwards service events to
    /// `listener`.
    fn notification_bridge(
        &self,
        listener: Weak<dyn NotificationListener>,
    ) -> Arc<NotificationBridge>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_death_tokens_are_unique() {
        let a = DeathToken::new();
        let b = DeathToken::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_death_token_compares_equal_to_its_copy() {
        let token = DeathToken::new();
        let copy = token;
        assert_eq!(token, copy);
    }
}
