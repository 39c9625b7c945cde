//! Mock offload service and locator.
//!
//! Allows tests to script service outcomes and inject notifications without
//! a real out-of-process service, and powers the daemon's demo mode.  Every
//! remote call is counted so tests can assert exactly which requests were
//! issued.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, Weak};

use offload_core::{Outcome, ScanRecord, ScanRequestParams, ScanStats, ServiceError};
use tracing::debug;

use super::bridge::{NotificationBridge, NotificationListener};
use super::{DeathToken, RemoteScanService, ServiceLocator};

/// A scriptable implementation of [`RemoteScanService`].
///
/// All outcomes default to [`Outcome::Ok`]; tests override them per call
/// kind.  The bridges passed to `subscribe` and `link_to_death` are captured
/// so notifications can be pushed back through the real delivery path.
pub struct MockScanService {
    configure_outcome: Mutex<Outcome>,
    subscribe_outcome: Mutex<Outcome>,
    unsubscribe_outcome: Mutex<Outcome>,
    stats_outcome: Mutex<Outcome>,
    stats: Mutex<ScanStats>,
    configure_calls: AtomicU32,
    subscribe_calls: AtomicU32,
    unsubscribe_calls: AtomicU32,
    stats_calls: AtomicU32,
    last_params: Mutex<Option<ScanRequestParams>>,
    subscriber: Mutex<Option<Arc<NotificationBridge>>>,
    death_link: Mutex<Option<(Arc<NotificationBridge>, DeathToken)>>,
}

impl MockScanService {
    /// Creates a mock that accepts every request.
    pub fn new() -> Self {
        Self {
            configure_outcome: Mutex::new(Outcome::Ok),
            subscribe_outcome: Mutex::new(Outcome::Ok),
            unsubscribe_outcome: Mutex::new(Outcome::Ok),
            stats_outcome: Mutex::new(Outcome::Ok),
            stats: Mutex::new(ScanStats::default()),
            configure_calls: AtomicU32::new(0),
            subscribe_calls: AtomicU32::new(0),
            unsubscribe_calls: AtomicU32::new(0),
            stats_calls: AtomicU32::new(0),
            last_params: Mutex::new(None),
            subscriber: Mutex::new(None),
            death_link: Mutex::new(None),
        }
    }

    // ── Scripting ─────────────────────────────────────────────────────────────

    /// Sets the outcome returned by subsequent `configure` calls.
    pub fn set_configure_outcome(&self, outcome: Outcome) {
        *self.configure_outcome.lock().unwrap_or_else(|e| e.into_inner()) = outcome;
    }

    /// Sets the outcome returned by subsequent `subscribe` calls.
    pub fn set_subscribe_outcome(&self, outcome: Outcome) {
        *self.subscribe_outcome.lock().unwrap_or_else(|e| e.into_inner()) = outcome;
    }

    /// Sets the outcome returned by subsequent `unsubscribe` calls.
    pub fn set_unsubscribe_outcome(&self, outcome: Outcome) {
        *self.unsubscribe_outcome.lock().unwrap_or_else(|e| e.into_inner()) = outcome;
    }

    /// Sets the outcome and payload returned by subsequent `scan_stats` calls.
    pub fn set_stats(&self, outcome: Outcome, stats: ScanStats) {
        *self.stats_outcome.lock().unwrap_or_else(|e| e.into_inner()) = outcome;
        *self.stats.lock().unwrap_or_else(|e| e.into_inner()) = stats;
    }

    // ── Inspection ────────────────────────────────────────────────────────────

    /// Number of `configure` calls received.
    pub fn configure_calls(&self) -> u32 {
        self.configure_calls.load(Ordering::SeqCst)
    }

    /// Number of `subscribe` calls received.
    pub fn subscribe_calls(&self) -> u32 {
        self.subscribe_calls.load(Ordering::SeqCst)
    }

    /// Number of `unsubscribe` calls received.
    pub fn unsubscribe_calls(&self) -> u32 {
        self.unsubscribe_calls.load(Ordering::SeqCst)
    }

    /// Number of `scan_stats` calls received.
    pub fn stats_calls(&self) -> u32 {
        self.stats_calls.load(Ordering::SeqCst)
    }

    /// The parameters from the most recent `configure` call.
    pub fn last_params(&self) -> Option<ScanRequestParams> {
        self.last_params.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    // ── Notification injection ────────────────────────────────────────────────

    /// Delivers a result batch through the bridge captured at `subscribe`.
    ///
    /// Batches delivered before any subscription are dropped, matching a
    /// real service that has nobody to notify yet.
    pub fn deliver_results(&self, records: Vec<ScanRecord>) {
        let bridge = self.subscriber.lock().unwrap_or_else(|e| e.into_inner()).clone();
        match bridge {
            Some(bridge) => bridge.on_scan_results(records),
            None => debug!("mock service has no subscriber; dropping batch"),
        }
    }

    /// Reports an asynchronous error through the death-registration bridge.
    pub fn report_error(&self, error: ServiceError) {
        let link = self.death_link.lock().unwrap_or_else(|e| e.into_inner()).clone();
        if let Some((bridge, _)) = link {
            bridge.on_error(error);
        }
    }

    /// Simulates the service process dying: fires the registered death
    /// notice and makes every further call fail with [`Outcome::Unavailable`].
    pub fn trigger_death(&self) {
        self.set_configure_outcome(Outcome::Unavailable);
        self.set_subscribe_outcome(Outcome::Unavailable);
        self.set_unsubscribe_outcome(Outcome::Unavailable);
        *self.stats_outcome.lock().unwrap_or_else(|e| e.into_inner()) = Outcome::Unavailable;

        let link = self.death_link.lock().unwrap_or_else(|e| e.into_inner()).clone();
        if let Some((bridge, token)) = link {
            bridge.on_death(token);
        }
    }
}

impl Default for MockScanService {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteScanService for MockScanService {
    fn configure(&self, params: &ScanRequestParams) -> Outcome {
        self.configure_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_params.lock().unwrap_or_else(|e| e.into_inner()) = Some(params.clone());
        *self.configure_outcome.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn subscribe(&self, bridge: Arc<NotificationBridge>) -> Outcome {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        *self.subscriber.lock().unwrap_or_else(|e| e.into_inner()) = Some(bridge);
        *self.subscribe_outcome.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn unsubscribe(&self) -> Outcome {
        self.unsubscribe_calls.fetch_add(1, Ordering::SeqCst);
        *self.unsubscribe_outcome.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn scan_stats(&self) -> (Outcome, ScanStats) {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        let outcome = *self.stats_outcome.lock().unwrap_or_else(|e| e.into_inner());
        let stats = self.stats.lock().unwrap_or_else(|e| e.into_inner()).clone();
        (outcome, stats)
    }

    fn link_to_death(&self, bridge: Arc<NotificationBridge>, token: DeathToken) -> Outcome {
        *self.death_link.lock().unwrap_or_else(|e| e.into_inner()) = Some((bridge, token));
        Outcome::Ok
    }
}

/// A [`ServiceLocator`] over an optional [`MockScanService`].
///
/// The bridge it constructs is captured so tests can fire notifications
/// directly, independent of any subscription.
pub struct MockServiceLocator {
    service: Option<Arc<MockScanService>>,
    bridge: Mutex<Option<Arc<NotificationBridge>>>,
    bridge_requests: AtomicU32,
}

impl MockServiceLocator {
    /// A locator that finds `service`.
    pub fn with_service(service: Arc<MockScanService>) -> Self {
        Self {
            service: Some(service),
            bridge: Mutex::new(None),
            bridge_requests: AtomicU32::new(0),
        }
    }

    /// A locator whose service lookup always comes up empty.
    pub fn without_service() -> Self {
        Self {
            service: None,
            bridge: Mutex::new(None),
            bridge_requests: AtomicU32::new(0),
        }
    }

    /// The bridge constructed by the most recent `notification_bridge` call.
    pub fn bridge(&self) -> Option<Arc<NotificationBridge>> {
        self.bridge.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of `notification_bridge` calls received.
    pub fn bridge_requests(&self) -> u32 {
        self.bridge_requests.load(Ordering::SeqCst)
    }
}

impl ServiceLocator for MockServiceLocator {
    fn remote_service(&self) -> Option<Arc<dyn RemoteScanService>> {
        self.service
            .clone()
            .map(|service| service as Arc<dyn RemoteScanService>)
    }

    fn notification_bridge(
        &self,
        listener: Weak<dyn NotificationListener>,
    ) -> Arc<NotificationBridge> {
        self.bridge_requests.fetch_add(1, Ordering::SeqCst);
        let bridge = NotificationBridge::new(listener);
        *self.bridge.lock().unwrap_or_else(|e| e.into_inner()) = Some(Arc::clone(&bridge));
        bridge
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
