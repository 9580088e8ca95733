//! Periodic device health monitoring.
//!
//! The monitor owns a scheduled task that probes the adapter's modality on
//! a fixed interval and publishes the resulting descriptor into the
//! adapter's status channel. It replaces ad hoc polling loops with a task
//! that has an explicit owner and an explicit stop: dropping the returned
//! handle without calling [`MonitorHandle::shutdown`] aborts the task on
//! drop rather than leaving an interval running past its owner.
//!
//! Probing uses only the modality's `probe` method and never touches the
//! adapter's capture gate, so a poll can interleave with, but never cancel,
//! an in-flight capture.

use crate::adapter::CaptureAdapter;
use crate::traits::CaptureModality;
use rollcall_core::constants::DEFAULT_POLL_INTERVAL_SECS;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Configuration for the health monitor.
///
/// The recommended polling range is 5-15 seconds (see
/// `rollcall_core::constants`); shorter intervals are accepted for tests.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Interval between connectivity probes.
    pub poll_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }
}

impl MonitorConfig {
    /// Set the polling interval.
    #[must_use]
    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// Periodic connectivity prober feeding an adapter's status channel.
pub struct DeviceHealthMonitor;

impl DeviceHealthMonitor {
    /// Start monitoring an adapter.
    ///
    /// Probes immediately, then on every interval tick, until the returned
    /// handle is shut down or dropped.
    pub fn start<M>(adapter: &CaptureAdapter<M>, config: MonitorConfig) -> MonitorHandle
    where
        M: CaptureModality + 'static,
    {
        let modality = adapter.modality_handle();
        let health_tx = adapter.health_sender();
        let shutdown = CancellationToken::new();
        let stop = shutdown.clone();

        info!(
            "Starting device health monitor ({}s interval)",
            config.poll_interval.as_secs_f64()
        );

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.poll_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = stop.cancelled() => {
                        debug!("Health monitor stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        let device = modality.probe().await;
                        debug!(connected = device.connected, "Health probe completed");
                        let _ = health_tx.send(device);
                    }
                }
            }
        });

        MonitorHandle {
            shutdown,
            task: Some(task),
        }
    }
}

/// Handle owning a running health monitor task.
pub struct MonitorHandle {
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// Stop the monitor and wait for its task to finish.
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    /// Whether the monitor task has terminated.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        // Teardown on disposal; shutdown() is the graceful path.
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::CaptureConfig;
    use crate::mock::MockModality;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_monitor_publishes_connectivity() {
        let (mock, handle) = MockModality::new();
        let adapter = CaptureAdapter::new(mock, CaptureConfig::default());

        assert!(!adapter.status().connected);

        let monitor = DeviceHealthMonitor::start(
            &adapter,
            MonitorConfig::default().poll_interval(Duration::from_millis(10)),
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(adapter.status().connected);

        handle.set_connected(false);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!adapter.status().connected);

        monitor.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_stops_task() {
        let (mock, _handle) = MockModality::new();
        let adapter = CaptureAdapter::new(mock, CaptureConfig::default());

        let monitor = DeviceHealthMonitor::start(
            &adapter,
            MonitorConfig::default().poll_interval(Duration::from_millis(10)),
        );
        assert!(!monitor.is_finished());

        monitor.shutdown().await;
    }

    #[tokio::test]
    async fn test_poll_does_not_cancel_in_flight_capture() {
        let (mock, handle) = MockModality::new();
        let adapter = Arc::new(CaptureAdapter::new(mock, CaptureConfig::default()));

        let monitor = DeviceHealthMonitor::start(
            &adapter,
            MonitorConfig::default().poll_interval(Duration::from_millis(5)),
        );

        // Capture outlives several poll ticks, then completes normally
        let pending = {
            let adapter = Arc::clone(&adapter);
            tokio::spawn(async move { adapter.capture().await })
        };
        tokio::time::sleep(Duration::from_millis(40)).await;

        handle.queue_sample("dGVtcGxhdGU=", 80).await.unwrap();
        let sample = pending.await.unwrap().unwrap();
        assert_eq!(sample.quality, 80);

        monitor.shutdown().await;
    }

    #[tokio::test]
    async fn test_drop_aborts_monitor() {
        let (mock, _handle) = MockModality::new();
        let adapter = CaptureAdapter::new(mock, CaptureConfig::default());

        {
            let _monitor = DeviceHealthMonitor::start(
                &adapter,
                MonitorConfig::default().poll_interval(Duration::from_millis(10)),
            );
        }

        // Dropped handle cancelled the token; the task winds down on its own.
        tokio::time::sleep(Duration::from_millis(30)).await;
    }
}
