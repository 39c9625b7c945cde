//! The notification bridge: the callback object registered with the remote
//! service.
//!
//! The service delivers three kinds of asynchronous events — scan result
//! batches, error reports, and death notices — on its own notification
//! channel, concurrently with whatever the coordinator is doing.  The bridge
//! is the sole recipient and forwards each event to a
//! [`NotificationListener`].
//!
//! # Lifetime safety
//!
//! The bridge holds only a `Weak` back-reference to the listener, and the
//! coordinator revokes the registration when it is dropped.  Either is enough
//! on its own to guarantee that a late event can never invoke a freed
//! coordinator; events arriving after revocation are logged and discarded.

use std::sync::{Arc, Mutex, Weak};

use offload_core::{ScanRecord, ServiceError};
use tracing::debug;

use super::DeathToken;

/// Receives the events the bridge forwards.
///
/// Implemented by the coordinator's shared inner state; kept as an explicit
/// trait so the bridge can be exercised in isolation.
pub trait NotificationListener: Send + Sync {
    /// A batch of scan results was delivered.
    fn on_scan_results(&self, records: Vec<ScanRecord>);

    /// The service reported an asynchronous error.
    fn on_error(&self, error: ServiceError);

    /// The service process terminated.  `token` identifies which death
    /// registration the notice belongs to.
    fn on_death(&self, token: DeathToken);
}

/// Callback object handed to the remote service at registration time.
pub struct NotificationBridge {
    listener: Mutex<Option<Weak<dyn NotificationListener>>>,
}

impl NotificationBridge {
    /// Creates a bridge forwarding to `listener`.
    pub fn new(listener: Weak<dyn NotificationListener>) -> Arc<Self> {
        Arc::new(Self {
            listener: Mutex::new(Some(listener)),
        })
    }

    /// Permanently detaches the bridge from its listener.  Subsequent events
    /// are discarded.
    pub fn revoke(&self) {
        *self.lock_listener() = None;
    }

    /// Upgrades the back-reference, if it is still live.
    fn listener(&self) -> Option<Arc<dyn NotificationListener>> {
        self.lock_listener().as_ref().and_then(Weak::upgrade)
    }

    fn lock_listener(&self) -> std::sync::MutexGuard<'_, Option<Weak<dyn NotificationListener>>> {
        self.listener.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Entry point for a delivered scan result batch.
    pub fn on_scan_results(&self, records: Vec<ScanRecord>) {
        match self.listener() {
            Some(listener) => listener.on_scan_results(records),
            None => debug!("scan result batch discarded: coordinator is gone"),
        }
    }

    /// Entry point for a reported error.
    pub fn on_error(&self, error: ServiceError) {
        match self.listener() {
            Some(listener) => listener.on_error(error),
            None => debug!(?error, "error event discarded: coordinator is gone"),
        }
    }

    /// Entry point for a death notice.
    pub fn on_death(&self, token: DeathToken) {
        match self.listener() {
            Some(listener) => listener.on_death(token),
            None => debug!("death notice discarded: coordinator is gone"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Records every event it receives.
    #[derive(Default)]
    struct RecordingListener {
        batches: Mutex<Vec<Vec<ScanRecord>>>,
        errors: Mutex<Vec<ServiceError>>,
        deaths: AtomicU32,
    }

    impl NotificationListener for RecordingListener {
        fn on_scan_results(&self, records: Vec<ScanRecord>) {
            self.batches.lock().unwrap().push(records);
        }

        fn on_error(&self, error: ServiceError) {
            self.errors.lock().unwrap().push(error);
        }

        fn on_death(&self, _token: DeathToken) {
            self.deaths.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn sample_record(rssi_dbm: i32) -> ScanRecord {
        ScanRecord {
            timestamp_ms: 1,
            ssid: b"net".to_vec(),
            bssid: [0, 1, 2, 3, 4, 5],
            rssi_dbm,
            frequency_mhz: 2412,
            capability: 0,
            associated: false,
        }
    }

    #[test]
    fn test_bridge_forwards_scan_results_to_live_listener() {
        let listener = Arc::new(RecordingListener::default());
        let weak: Weak<dyn NotificationListener> =
            Arc::downgrade(&(Arc::clone(&listener) as Arc<dyn NotificationListener>));
        let bridge = NotificationBridge::new(weak);

        bridge.on_scan_results(vec![sample_record(-50)]);

        let batches = listener.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0][0].rssi_dbm, -50);
    }

    #[test]
    fn test_bridge_forwards_errors_and_deaths() {
        let listener = Arc::new(RecordingListener::default());
        let weak: Weak<dyn NotificationListener> =
            Arc::downgrade(&(Arc::clone(&listener) as Arc<dyn NotificationListener>));
        let bridge = NotificationBridge::new(weak);

        bridge.on_error(ServiceError::NoConnection);
        bridge.on_death(DeathToken::new());

        assert_eq!(
            *listener.errors.lock().unwrap(),
            vec![ServiceError::NoConnection]
        );
        assert_eq!(listener.deaths.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_revoked_bridge_discards_events() {
        let listener = Arc::new(RecordingListener::default());
        let weak: Weak<dyn NotificationListener> =
            Arc::downgrade(&(Arc::clone(&listener) as Arc<dyn NotificationListener>));
        let bridge = NotificationBridge::new(weak);

        bridge.revoke();
        bridge.on_scan_results(vec![sample_record(-40)]);
        bridge.on_error(ServiceError::Internal);

        assert!(listener.batches.lock().unwrap().is_empty());
        assert!(listener.errors.lock().unwrap().is_empty());
    }

    #[test]
    fn test_bridge_discards_events_after_listener_dropped() {
        let listener = Arc::new(RecordingListener::default());
        let weak: Weak<dyn NotificationListener> =
            Arc::downgrade(&(Arc::clone(&listener) as Arc<dyn NotificationListener>));
        let bridge = NotificationBridge::new(weak);

        drop(listener);

        // Must neither panic nor dereference the dead listener.
        bridge.on_scan_results(vec![sample_record(-40)]);
        bridge.on_death(DeathToken::new());
    }

    #[test]
    fn test_bridge_preserves_batch_order() {
        let listener = Arc::new(RecordingListener::default());
        let weak: Weak<dyn NotificationListener> =
            Arc::downgrade(&(Arc::clone(&listener) as Arc<dyn NotificationListener>));
        let bridge = NotificationBridge::new(weak);

        bridge.on_scan_results(vec![sample_record(-10)]);
        bridge.on_scan_results(vec![sample_record(-20)]);
        bridge.on_scan_results(vec![sample_record(-30)]);

        let batches = listener.batches.lock().unwrap();
        let rssi: Vec<i32> = batches.iter().map(|b| b[0].rssi_dbm).collect();
        assert_eq!(rssi, vec![-10, -20, -30]);
    }
}
