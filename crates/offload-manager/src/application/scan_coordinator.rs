//! ScanCoordinator: subscription lifecycle for the offload scan service.
//!
//! The coordinator owns two small pieces of state — the cached
//! [`StatusCode`] and a subscribed flag — and reconciles them against two
//! independent flows:
//!
//! - synchronous caller requests (`start_scan`, `stop_scan`, `scan_stats`,
//!   `offload_status`), assumed to come from one logical thread;
//! - asynchronous service events (result batches, error reports, death
//!   notices), delivered concurrently through the
//!   [`NotificationBridge`](crate::infrastructure::hal::bridge::NotificationBridge).
//!
//! # Lifecycle
//!
//! ```text
//! new()            start_scan()        start_scan()         stop_scan()
//!  NoError   ──►  configure+subscribe  ──► configure only ──► unsubscribe
//!  subscribed=false     subscribed=true       (update params)    subscribed=false
//! ```
//!
//! An error event degrades the cached status; the next `start_scan` then
//! fails fast without touching the service.  A death notice additionally
//! drops the service handle, after which `stop_scan` performs one
//! best-effort cleanup and the coordinator reports `NoService` until it is
//! rebuilt.
//!
//! All shared state sits behind a single mutex, held across the remote call,
//! so an event arriving mid-operation can never observe a torn status or
//! cause a double subscribe.  Result batches bypass the lock entirely: they
//! go straight to the registered handler.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use offload_core::{
    map_outcome, Outcome, ReasonCode, ScanRecord, ScanRequestParams, ScanStats, ServiceError,
    StatusCode,
};
use tracing::{debug, info, warn};

use crate::infrastructure::hal::bridge::{NotificationBridge, NotificationListener};
use crate::infrastructure::hal::{DeathToken, RemoteScanService, ServiceLocator};

/// Receives every delivered scan result batch, in delivery order.
pub type ScanResultHandler = Box<dyn Fn(Vec<ScanRecord>) + Send + Sync>;

/// Mutable state shared between the coordinator and its bridge listener.
struct CoordinatorState {
    status: StatusCode,
    subscribed: bool,
    service: Option<Arc<dyn RemoteScanService>>,
    bridge: Option<Arc<NotificationBridge>>,
}

/// The `Arc`'d interior the bridge holds a weak reference to.
struct CoordinatorInner {
    state: Mutex<CoordinatorState>,
    handler: ScanResultHandler,
    death_token: DeathToken,
}

impl CoordinatorInner {
    fn state(&self) -> MutexGuard<'_, CoordinatorState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Degrades cached status for outcomes that mean the transport itself is
    /// in trouble.  Service-level refusals are transient and leave the
    /// status alone.
    fn note_transport_outcome(state: &mut CoordinatorState, outcome: Outcome) {
        match outcome {
            Outcome::TimedOut => state.status = StatusCode::Timeout,
            Outcome::TransportFailed => state.status = StatusCode::Error,
            _ => {}
        }
    }
}

impl NotificationListener for CoordinatorInner {
    fn on_scan_results(&self, records: Vec<ScanRecord>) {
        // Forwarded unconditionally: the handler is the sole consumer of
        // scan content, regardless of subscription bookkeeping or status.
        debug!(count = records.len(), "scan result batch delivered");
        (self.handler)(records);
    }

    fn on_error(&self, error: ServiceError) {
        let mut state = self.state();
        state.status = StatusCode::from(error);
        warn!(?error, status = ?state.status, "offload service reported an error");
    }

    fn on_death(&self, token: DeathToken) {
        if token != self.death_token {
            debug!("ignoring death notice with stale token");
            return;
        }
        let mut state = self.state();
        state.service = None;
        state.status = StatusCode::NoService;
        // The subscribed flag is left as-is so a later stop_scan still makes
        // one best-effort cleanup attempt.
        warn!("offload service died; handle invalidated");
    }
}

/// Coordinates configuration and subscription requests against the remote
/// offload scan service.
///
/// Public entry points are expected on one logical thread; service events
/// arrive concurrently and are serialized through the same internal lock.
pub struct ScanCoordinator {
    inner: Arc<CoordinatorInner>,
}

impl ScanCoordinator {
    /// Builds a coordinator from a locator and a result handler.
    ///
    /// Without a locator nothing can ever work and the status is pinned to
    /// [`StatusCode::Error`].  With a locator but no running service the
    /// status is [`StatusCode::NoService`].  Otherwise the notification
    /// bridge is created and the death registration completed before this
    /// returns, leaving the status at [`StatusCode::NoError`].
    pub fn new(locator: Option<Arc<dyn ServiceLocator>>, handler: ScanResultHandler) -> Self {
        let inner = Arc::new(CoordinatorInner {
            state: Mutex::new(CoordinatorState {
                status: StatusCode::Error,
                subscribed: false,
                service: None,
                bridge: None,
            }),
            handler,
            death_token: DeathToken::new(),
        });

        let Some(locator) = locator else {
            warn!("no service locator supplied; offload scans unavailable");
            return Self { inner };
        };

        let Some(service) = locator.remote_service() else {
            warn!("offload scan service not found");
            inner.state().status = StatusCode::NoService;
            return Self { inner };
        };

        let listener: Weak<dyn NotificationListener> =
            Arc::downgrade(&(Arc::clone(&inner) as Arc<dyn NotificationListener>));
        let bridge = locator.notification_bridge(listener);

        let link = service.link_to_death(Arc::clone(&bridge), inner.death_token);
        if link != Outcome::Ok {
            warn!(?link, "death-notification registration failed");
        }

        {
            let mut state = inner.state();
            state.status = StatusCode::NoError;
            state.service = Some(service);
            state.bridge = Some(bridge);
        }
        info!("connected to offload scan service");
        Self { inner }
    }

    /// Requests offload scans with the given parameters.
    ///
    /// The first successful call issues a configure followed by a subscribe;
    /// while subscribed, later calls issue only a configure to update the
    /// live scan settings.
    ///
    /// # Errors
    ///
    /// Fails fast with [`ReasonCode::NotSupported`] when no service handle
    /// exists and [`ReasonCode::NotAvailable`] when the cached status has
    /// degraded; in both cases no remote call is made.  Otherwise returns
    /// the reason mapped from the failing remote outcome.
    pub fn start_scan(&self, params: &ScanRequestParams) -> Result<(), ReasonCode> {
        if let Err(e) = params.validate() {
            warn!(error = %e, "rejecting malformed scan parameters");
            return Err(ReasonCode::OperationFailed);
        }

        let mut state = self.inner.state();

        if state.status != StatusCode::NoError {
            let reason = if state.service.is_none() {
                ReasonCode::NotSupported
            } else {
                ReasonCode::NotAvailable
            };
            warn!(status = ?state.status, %reason, "start_scan rejected without remote call");
            return Err(reason);
        }

        let Some(service) = state.service.clone() else {
            // status said NoError but the handle is gone; treat as unsupported.
            state.status = StatusCode::NoService;
            return Err(ReasonCode::NotSupported);
        };

        let outcome = service.configure(params);
        CoordinatorInner::note_transport_outcome(&mut state, outcome);
        map_outcome(outcome)?;

        if !state.subscribed {
            let Some(bridge) = state.bridge.clone() else {
                state.status = StatusCode::NoService;
                return Err(ReasonCode::NotSupported);
            };
            let outcome = service.subscribe(bridge);
            CoordinatorInner::note_transport_outcome(&mut state, outcome);
            map_outcome(outcome)?;
            state.subscribed = true;
            info!(interval_ms = params.interval_ms, "subscribed to offload scan results");
        } else {
            debug!(interval_ms = params.interval_ms, "updated live scan configuration");
        }

        state.status = StatusCode::NoError;
        Ok(())
    }

    /// Withdraws the current subscription.
    ///
    /// An unsubscribe is attempted even when the status has degraded since
    /// subscribing; only a dead service handle makes the cleanup impossible.
    ///
    /// # Errors
    ///
    /// [`ReasonCode::NotSubscribed`] when no subscription exists (no remote
    /// call is made), [`ReasonCode::NotAvailable`] when the service died
    /// before the cleanup could run, or the reason mapped from the failing
    /// remote outcome.
    pub fn stop_scan(&self) -> Result<(), ReasonCode> {
        let mut state = self.inner.state();

        if !state.subscribed {
            return Err(ReasonCode::NotSubscribed);
        }

        let Some(service) = state.service.clone() else {
            // The service died while subscribed: the subscription is gone
            // with it, so the flag is cleared even though nothing was sent.
            state.subscribed = false;
            warn!("stop_scan: service handle is gone; abandoning subscription");
            return Err(ReasonCode::NotAvailable);
        };

        let outcome = service.unsubscribe();
        CoordinatorInner::note_transport_outcome(&mut state, outcome);
        map_outcome(outcome)?;

        state.subscribed = false;
        state.status = StatusCode::NoError;
        info!("unsubscribed from offload scan results");
        Ok(())
    }

    /// Queries the service's scan statistics.  Independent of subscription
    /// state.
    ///
    /// # Errors
    ///
    /// [`ReasonCode::NotSupported`] when no service handle exists, otherwise
    /// the reason mapped from the failing remote outcome.
    pub fn scan_stats(&self) -> Result<ScanStats, ReasonCode> {
        let mut state = self.inner.state();

        let Some(service) = state.service.clone() else {
            return Err(ReasonCode::NotSupported);
        };

        let (outcome, stats) = service.scan_stats();
        CoordinatorInner::note_transport_outcome(&mut state, outcome);
        map_outcome(outcome)?;
        Ok(stats)
    }

    /// Returns the cached service status.  Never performs a remote call.
    pub fn offload_status(&self) -> StatusCode {
        self.inner.state().status
    }
}

impl Drop for ScanCoordinator {
    fn drop(&mut self) {
        // Revoke the callback registration so no in-flight event can reach
        // a coordinator that no longer exists.  The weak back-reference in
        // the bridge covers the same hazard; doing both keeps teardown
        // deterministic.
        let bridge = self.inner.state().bridge.take();
        if let Some(bridge) = bridge {
            bridge.revoke();
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::hal::mock::{MockScanService, MockServiceLocator};

    fn params() -> ScanRequestParams {
        ScanRequestParams {
            interval_ms: 30_000,
            rssi_threshold_dbm: -76,
            scan_ssids: vec![b"Home".to_vec()],
            match_ssids: vec![b"Home".to_vec()],
            match_security: vec![0x02],
            frequencies_mhz: vec![2412, 2437],
        }
    }

    fn noop_handler() -> ScanResultHandler {
        Box::new(|_| {})
    }

    fn healthy() -> (Arc<MockScanService>, Arc<MockServiceLocator>, ScanCoordinator) {
        let service = Arc::new(MockScanService::new());
        let locator = Arc::new(MockServiceLocator::with_service(Arc::clone(&service)));
        let coordinator = ScanCoordinator::new(
            Some(Arc::clone(&locator) as Arc<dyn ServiceLocator>),
            noop_handler(),
        );
        (service, locator, coordinator)
    }

    #[test]
    fn test_malformed_params_fail_locally_with_operation_failed() {
        let (service, _locator, coordinator) = healthy();
        let mut bad = params();
        bad.interval_ms = 0;

        assert_eq!(coordinator.start_scan(&bad), Err(ReasonCode::OperationFailed));
        assert_eq!(service.configure_calls(), 0);
    }

    #[test]
    fn test_subscribe_failure_leaves_subscription_off() {
        let (service, _locator, coordinator) = healthy();
        service.set_subscribe_outcome(Outcome::Refused);

        assert_eq!(
            coordinator.start_scan(&params()),
            Err(ReasonCode::OperationFailed)
        );

        // A later attempt with a healthy service must subscribe again.
        service.set_subscribe_outcome(Outcome::Ok);
        assert_eq!(coordinator.start_scan(&params()), Ok(()));
        assert_eq!(service.subscribe_calls(), 2);
    }

    #[test]
    fn test_unsubscribe_refusal_keeps_subscription_on() {
        let (service, _locator, coordinator) = healthy();
        coordinator.start_scan(&params()).unwrap();
        service.set_unsubscribe_outcome(Outcome::Refused);

        assert_eq!(coordinator.stop_scan(), Err(ReasonCode::OperationFailed));

        // Still subscribed: a second stop reaches the service again.
        service.set_unsubscribe_outcome(Outcome::Ok);
        assert_eq!(coordinator.stop_scan(), Ok(()));
        assert_eq!(service.unsubscribe_calls(), 2);
    }

    #[test]
    fn test_configure_timeout_degrades_status_to_timeout() {
        let (service, _locator, coordinator) = healthy();
        service.set_configure_outcome(Outcome::TimedOut);

        assert_eq!(
            coordinator.start_scan(&params()),
            Err(ReasonCode::TransactionFailed)
        );
        assert_eq!(coordinator.offload_status(), StatusCode::Timeout);

        // Degraded status now short-circuits before the service is reached.
        let calls_before = service.configure_calls();
        assert_eq!(
            coordinator.start_scan(&params()),
            Err(ReasonCode::NotAvailable)
        );
        assert_eq!(service.configure_calls(), calls_before);
    }

    #[test]
    fn test_transport_failure_degrades_status_to_error() {
        let (service, _locator, coordinator) = healthy();
        service.set_configure_outcome(Outcome::TransportFailed);

        assert_eq!(
            coordinator.start_scan(&params()),
            Err(ReasonCode::TransactionFailed)
        );
        assert_eq!(coordinator.offload_status(), StatusCode::Error);
    }

    #[test]
    fn test_successful_stop_recovers_degraded_status() {
        let (_service, locator, coordinator) = healthy();
        coordinator.start_scan(&params()).unwrap();

        locator.bridge().unwrap().on_error(ServiceError::NoConnection);
        assert_eq!(coordinator.offload_status(), StatusCode::NotConnected);

        coordinator.stop_scan().unwrap();
        assert_eq!(coordinator.offload_status(), StatusCode::NoError);
    }

    #[test]
    fn test_stale_death_token_does_not_invalidate_handle() {
        let (_service, locator, coordinator) = healthy();

        locator.bridge().unwrap().on_death(DeathToken::new());

        assert_eq!(coordinator.offload_status(), StatusCode::NoError);
    }

    #[test]
    fn test_scan_stats_failure_maps_remote_outcome() {
        let (service, _locator, coordinator) = healthy();
        service.set_stats(Outcome::Refused, ScanStats::default());

        assert_eq!(coordinator.scan_stats(), Err(ReasonCode::OperationFailed));
    }

    #[test]
    fn test_scan_stats_without_service_is_not_supported() {
        let locator = Arc::new(MockServiceLocator::without_service());
        let coordinator =
            ScanCoordinator::new(Some(locator as Arc<dyn ServiceLocator>), noop_handler());

        assert_eq!(coordinator.scan_stats(), Err(ReasonCode::NotSupported));
    }
}
