//! Health Check Scheduler
//!
//! Runs one health check, sleeps for the configured interval, and repeats
//! until a shutdown signal arrives. Cycles never overlap: the fetch, the
//! judgement and any page are awaited before the sleep starts. A cycle cannot
//! fail, so nothing inside it can stop the loop.

use std::time::Duration;
use tokio::sync::watch;

use validator_watch_core::health::UNKNOWN_ERROR_COOLDOWN_SECS;
use validator_watch_core::{CommitSource, CycleOutcome, HealthEvaluator};

pub struct Scheduler<S> {
    evaluator: HealthEvaluator,
    source: S,
    interval: Duration,
    prune_after: chrono::Duration,
}

impl<S: CommitSource> Scheduler<S> {
    pub fn new(evaluator: HealthEvaluator, source: S) -> Self {
        let config = evaluator.config();
        let interval = Duration::from_secs(config.check_interval_secs);
        let longest_cooldown = config.throttle_interval_secs.max(UNKNOWN_ERROR_COOLDOWN_SECS);
        let prune_after =
            chrono::Duration::seconds(i64::try_from(longest_cooldown).unwrap_or(i64::MAX / 1000));
        Self { evaluator, source, interval, prune_after }
    }

    pub fn evaluator(&self) -> &HealthEvaluator {
        &self.evaluator
    }

    /// Run a single cycle and tidy the throttle table.
    pub async fn run_once(&mut self) -> CycleOutcome {
        let outcome = self.evaluator.run_cycle(&self.source).await;

        let pruned = self.evaluator.pager().throttle().prune_older_than(self.prune_after);
        if pruned > 0 {
            tracing::debug!("[Scheduler] Pruned {} expired throttle entries", pruned);
        }

        outcome
    }

    /// Loop until `shutdown_rx` flips. Returns the number of cycles run.
    ///
    /// A closed channel is not a shutdown request; the loop keeps going.
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) -> u64 {
        tracing::info!(
            "[Scheduler] Health checks every {}s for validator {}",
            self.interval.as_secs(),
            self.evaluator.config().validator_address
        );

        let mut cycles: u64 = 0;
        loop {
            let outcome = self.run_once().await;
            cycles = cycles.saturating_add(1);
            tracing::debug!("[Scheduler] Cycle {} finished: {}", cycles, outcome.kind());

            tokio::select! {
                () = tokio::time::sleep(self.interval) => {}
                Ok(()) = shutdown_rx.changed() => {
                    tracing::info!(
                        "[Scheduler] Shutdown requested, stopping after {} cycles",
                        cycles
                    );
                    break;
                }
            }
        }
        cycles
    }
}

/// Channel that flips to `true` on Ctrl-C or SIGTERM.
///
/// If no signal handler can be installed the channel never flips.
pub fn shutdown_channel() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_signal().await;
        let _ = tx.send(true);
    });
    rx
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("Failed to install SIGTERM handler: {}", e);
            wait_for_ctrl_c().await;
            return;
        },
    };

    tokio::select! {
        () = wait_for_ctrl_c() => {}
        Some(()) = term.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C, running until killed: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use validator_watch_core::{ManualClock, NodeError, Pager};
    use validator_watch_types::{CommitRecord, MonitorConfig};

    #[derive(Default)]
    struct FailingSource {
        calls: AtomicU32,
    }

    #[async_trait]
    impl CommitSource for FailingSource {
        async fn fetch_latest_commit(&self) -> Result<CommitRecord, NodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(NodeError::Status { status: 502, body: "Bad Gateway".to_string() })
        }
    }

    fn scheduler(source: Arc<FailingSource>) -> Scheduler<Arc<FailingSource>> {
        let clock = Arc::new(ManualClock::new(chrono::Utc::now()));
        let config = MonitorConfig {
            validator_address: "1D9CB56367B3CD5C83529F02A2896D51C983219A".to_string(),
            acceptable_consecutive_flakes: 2,
            ..Default::default()
        };
        let pager = Pager::new(None, "", clock.clone());
        Scheduler::new(HealthEvaluator::new(config, pager, clock), source)
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_cycles_keep_looping_until_shutdown() {
        let source = Arc::new(FailingSource::default());
        let scheduler = scheduler(source.clone());
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(scheduler.run(rx));

        // Cycles at t = 0, 30, 60, 90
        tokio::time::sleep(Duration::from_secs(95)).await;
        tx.send(true).unwrap();

        let cycles = handle.await.unwrap();
        assert_eq!(cycles, 4);
        assert_eq!(source.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_shutdown_channel_keeps_looping() {
        let source = Arc::new(FailingSource::default());
        let scheduler = scheduler(source.clone());
        let (tx, rx) = watch::channel(false);
        drop(tx);

        let handle = tokio::spawn(scheduler.run(rx));

        // Cycles at t = 0, 30, ..., 300
        tokio::time::sleep(Duration::from_secs(305)).await;
        assert!(!handle.is_finished());
        assert_eq!(source.calls.load(Ordering::SeqCst), 11);

        handle.abort();
    }

    #[tokio::test]
    async fn test_run_once_counts_flakes() {
        let source = Arc::new(FailingSource::default());
        let mut scheduler = scheduler(source);

        let first = scheduler.run_once().await;
        assert!(matches!(first, CycleOutcome::UnknownError { page: None, .. }));
        let second = scheduler.run_once().await;
        assert!(matches!(
            second,
            CycleOutcome::UnknownError { consecutive_flakes: 2, page: Some(_), .. }
        ));
        assert_eq!(scheduler.evaluator().state().consecutive_flakes, 2);
    }
}
