//! Health evaluator implementation.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::types::{CycleOutcome, EvaluatorState, Verdict};
use crate::clock::Clock;
use crate::error::EvalError;
use crate::node::CommitSource;
use crate::pager::Pager;
use validator_watch_types::{CommitRecord, MonitorConfig};

/// Cooldown for pages raised from the flake path. Fixed so that error storms
/// are throttled independently of the configurable domain-alert cooldown.
pub const UNKNOWN_ERROR_COOLDOWN_SECS: u64 = 5 * 60;

const MISSED_PRECOMMIT_KEY: &str = "missed-precommit";
const NODE_LAG_KEY: &str = "node-lag";

pub struct HealthEvaluator {
    config: MonitorConfig,
    state: EvaluatorState,
    pager: Pager,
    clock: Arc<dyn Clock>,
}

impl HealthEvaluator {
    pub fn new(config: MonitorConfig, pager: Pager, clock: Arc<dyn Clock>) -> Self {
        Self { config, state: EvaluatorState::default(), pager, clock }
    }

    pub fn state(&self) -> EvaluatorState {
        self.state
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Apply one fetched commit to the counters.
    ///
    /// Does no I/O. The flake counter is only reset here; incrementing it is
    /// the caller's job when this or the fetch fails.
    pub fn judge(
        &mut self,
        commit: &CommitRecord,
        now: DateTime<Utc>,
    ) -> Result<Verdict, EvalError> {
        let height = commit.height;
        let signature = commit.signature_from(&self.config.validator_address);

        match signature {
            Some(_) => self.state.consecutive_misses = 0,
            None => {
                self.state.consecutive_misses = self.state.consecutive_misses.saturating_add(1);
            },
        }

        let Some(signature) = signature else {
            let consecutive_misses = self.state.consecutive_misses;
            if consecutive_misses > self.config.acceptable_consecutive_miss {
                return Ok(Verdict::MissedPrecommit { height, consecutive_misses });
            }
            self.state.consecutive_flakes = 0;
            return Ok(Verdict::MissTolerated { height, consecutive_misses });
        };

        let signed_at = signature.signed_at().map_err(|e| EvalError::InvalidTimestamp {
            value: signature.timestamp.clone(),
            message: e.to_string(),
        })?;

        let delta_secs = (now - signed_at).num_milliseconds().abs() as f64 / 1000.0;
        if delta_secs > self.config.acceptable_delta_secs as f64 {
            return Ok(Verdict::NodeLag { height, delta_secs });
        }

        self.state.consecutive_flakes = 0;
        Ok(Verdict::Healthy { height, delta_secs })
    }

    /// Run one full health check: fetch, judge, page. Never fails.
    pub async fn run_cycle<S>(&mut self, source: &S) -> CycleOutcome
    where
        S: CommitSource + ?Sized,
    {
        tracing::info!("Running health check...");

        let outcome = match self.check(source).await {
            Ok(outcome) => outcome,
            Err(e) => self.record_flake(&e).await,
        };

        if outcome.is_failure() {
            tracing::warn!("Health checks failed.");
        } else if outcome.is_healthy() {
            tracing::info!("Health check passed.");
        }
        outcome
    }

    async fn check<S>(&mut self, source: &S) -> Result<CycleOutcome, EvalError>
    where
        S: CommitSource + ?Sized,
    {
        tracing::info!("> Fetching latest block from local API..");
        let commit = source.fetch_latest_commit().await?;
        tracing::info!("> Got result at height {}", commit.height);

        let now = self.clock.now();
        let verdict = self.judge(&commit, now)?;

        let outcome = match verdict {
            Verdict::Healthy { height, delta_secs } => {
                tracing::info!(
                    "> Found signature for validator in block {} ({:.1}s old)",
                    height,
                    delta_secs
                );
                CycleOutcome::Healthy { height }
            },
            Verdict::MissTolerated { height, consecutive_misses } => {
                tracing::info!(
                    "> Missed precommit in block {}. Consecutive misses is now: {}",
                    height,
                    consecutive_misses
                );
                CycleOutcome::MissTolerated { height, consecutive_misses }
            },
            Verdict::MissedPrecommit { height, consecutive_misses } => {
                tracing::warn!(
                    "> Missed precommit in block {}. Consecutive misses is now: {}",
                    height,
                    consecutive_misses
                );
                let page = self
                    .pager
                    .page(
                        "Missed Precommits",
                        &format!("Consecutive misses: {}", consecutive_misses),
                        self.config.throttle_interval_secs,
                        Some(MISSED_PRECOMMIT_KEY),
                    )
                    .await;
                CycleOutcome::MissedPrecommit { height, consecutive_misses, page }
            },
            Verdict::NodeLag { height, delta_secs } => {
                tracing::warn!(
                    "> Signature in block {} is {:.1}s old (limit {}s)",
                    height,
                    delta_secs,
                    self.config.acceptable_delta_secs
                );
                let page = self
                    .pager
                    .page(
                        "Node is Lagging",
                        &format!("Lag is currently {:.1} seconds.", delta_secs),
                        self.config.throttle_interval_secs,
                        Some(NODE_LAG_KEY),
                    )
                    .await;
                CycleOutcome::NodeLag { height, delta_secs, page }
            },
        };

        Ok(outcome)
    }

    async fn record_flake(&mut self, error: &EvalError) -> CycleOutcome {
        self.state.consecutive_flakes = self.state.consecutive_flakes.saturating_add(1);
        let consecutive_flakes = self.state.consecutive_flakes;
        let message = error.to_string();

        tracing::warn!(
            "> Unknown error: {}. Consecutive flakes is now: {}",
            message,
            consecutive_flakes
        );

        let page = if consecutive_flakes >= self.config.acceptable_consecutive_flakes {
            tracing::warn!("> Threshold exceeded. Paging.");
            Some(
                self.pager
                    .page("Unknown error", &message, UNKNOWN_ERROR_COOLDOWN_SECS, Some(&message))
                    .await,
            )
        } else {
            None
        };

        CycleOutcome::UnknownError { message, consecutive_flakes, page }
    }
}
