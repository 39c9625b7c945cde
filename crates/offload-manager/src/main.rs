//! Offload scan manager daemon entry point.
//!
//! Wires the scan coordinator to an offload service and keeps a background
//! scan subscription alive until shutdown.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()           -- TOML config with full defaults
//!  └─ ScanCoordinator::new()  -- binds to the service, registers the bridge
//!  └─ start_scan()            -- configure + subscribe
//!  └─ event loop
//!       ├─ demo result ticker -- simulated batches through the bridge
//!       └─ Ctrl-C             -- stop_scan() and exit
//! ```
//!
//! In demo mode (the default) the daemon runs against the in-process mock
//! service, which is enough to exercise the whole subscription lifecycle
//! end to end.

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use offload_core::{ScanRecord, StatusCode};
use offload_manager::application::ScanCoordinator;
use offload_manager::infrastructure::hal::mock::{MockScanService, MockServiceLocator};
use offload_manager::infrastructure::hal::ServiceLocator;
use offload_manager::infrastructure::storage::config::{load_config, ManagerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = load_config()?;

    // Initialise structured logging.  Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cfg.manager.log_level.clone())),
        )
        .init();

    info!("offload scan manager starting");

    if !cfg.service.demo_mode {
        // No real transport is wired up yet; without demo mode there is no
        // service to find, so report the status and exit cleanly.
        let locator: Arc<dyn ServiceLocator> = Arc::new(MockServiceLocator::without_service());
        let coordinator = ScanCoordinator::new(Some(locator), Box::new(|_| {}));
        error!(
            status = ?coordinator.offload_status(),
            "no offload service available; enable [service] demo_mode or wire a transport"
        );
        return Ok(());
    }

    // ── Demo service and coordinator ──────────────────────────────────────────
    let service = Arc::new(MockScanService::new());
    let locator: Arc<dyn ServiceLocator> =
        Arc::new(MockServiceLocator::with_service(Arc::clone(&service)));

    let coordinator = ScanCoordinator::new(
        Some(locator),
        Box::new(|records: Vec<ScanRecord>| {
            info!(batch_len = records.len(), "scan results received");
            for record in &records {
                info!(
                    ssid = %String::from_utf8_lossy(&record.ssid),
                    rssi_dbm = record.rssi_dbm,
                    frequency_mhz = record.frequency_mhz,
                    "  network"
                );
            }
        }),
    );

    let params = cfg.scan.to_params();
    match coordinator.start_scan(&params) {
        Ok(()) => info!(
            interval_ms = params.interval_ms,
            ssids = params.scan_ssids.len(),
            "offload scan subscription started"
        ),
        Err(reason) => {
            error!(%reason, "failed to start offload scan");
            return Ok(());
        }
    }

    // ── Event loop ────────────────────────────────────────────────────────────
    let mut ticker = tokio::time::interval(std::time::Duration::from_millis(
        cfg.service.result_interval_ms.max(100),
    ));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut round: u64 = 0;

    info!("offload scan manager ready.  Press Ctrl-C to exit.");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
            _ = ticker.tick() => {
                round += 1;
                service.deliver_results(demo_batch(&cfg, round));
            }
        }
    }

    // ── Shutdown ──────────────────────────────────────────────────────────────
    if let Err(reason) = coordinator.stop_scan() {
        warn!(%reason, "stop_scan failed during shutdown");
    }

    match coordinator.scan_stats() {
        Ok(stats) => info!(
            subscription_duration_ms = stats.subscription_duration_ms,
            scans = stats.num_scans_requested_by_wifi,
            "final scan statistics"
        ),
        Err(reason) => warn!(%reason, "could not fetch final scan statistics"),
    }

    if coordinator.offload_status() != StatusCode::NoError {
        warn!(status = ?coordinator.offload_status(), "exiting with degraded status");
    }
    info!("offload scan manager stopped");
    Ok(())
}

/// Builds a simulated result batch for demo round `round`.
///
/// Reports the configured SSIDs (or a placeholder network when none are
/// configured) with RSSI drifting per round so the log output visibly
/// changes.
fn demo_batch(cfg: &ManagerConfig, round: u64) -> Vec<ScanRecord> {
    let ssids: Vec<Vec<u8>> = if cfg.scan.ssids.is_empty() {
        vec![b"demo-network".to_vec()]
    } else {
        cfg.scan.ssids.iter().map(|s| s.as_bytes().to_vec()).collect()
    };

    let frequencies = if cfg.scan.frequencies_mhz.is_empty() {
        vec![2412]
    } else {
        cfg.scan.frequencies_mhz.clone()
    };

    ssids
        .into_iter()
        .enumerate()
        .map(|(i, ssid)| ScanRecord {
            timestamp_ms: round * cfg.service.result_interval_ms,
            bssid: [0x02, 0x00, 0x00, 0x00, 0x00, i as u8],
            rssi_dbm: -50 - ((round as i32 + i as i32) % 25),
            frequency_mhz: frequencies[i % frequencies.len()],
            capability: 0x0411,
            associated: false,
            ssid,
        })
        .collect()
}
