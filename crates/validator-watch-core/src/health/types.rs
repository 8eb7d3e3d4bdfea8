//! Evaluator state and per-cycle results.

use serde::Serialize;

use crate::pager::PageResult;

/// Counters carried from one cycle to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EvaluatorState {
    /// Sequential cycles without the validator's precommit
    pub consecutive_misses: u32,
    /// Sequential cycles that ended in an unexpected error
    pub consecutive_flakes: u32,
}

/// Judgement of a successfully fetched commit, before any paging.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Signed, and the signature is recent.
    Healthy { height: i64, delta_secs: f64 },
    /// Not signed, but still within the tolerated miss count.
    MissTolerated { height: i64, consecutive_misses: u32 },
    /// Not signed for more cycles than tolerated.
    MissedPrecommit { height: i64, consecutive_misses: u32 },
    /// Signed, but the signature is older than allowed.
    NodeLag { height: i64, delta_secs: f64 },
}

/// Everything a cycle did, including the paging decision.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Healthy { height: i64 },
    MissTolerated { height: i64, consecutive_misses: u32 },
    MissedPrecommit { height: i64, consecutive_misses: u32, page: PageResult },
    NodeLag { height: i64, delta_secs: f64, page: PageResult },
    /// `page` is `None` while the flake count is still below its limit.
    UnknownError { message: String, consecutive_flakes: u32, page: Option<PageResult> },
}

impl CycleOutcome {
    /// Whether the cycle passed every check.
    ///
    /// A tolerated miss is not healthy, but it does not fail the cycle either.
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::MissedPrecommit { .. } | Self::NodeLag { .. } | Self::UnknownError { .. }
        )
    }

    /// Short machine-friendly name, used in logs and the `check` command.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Healthy { .. } => "healthy",
            Self::MissTolerated { .. } => "miss_tolerated",
            Self::MissedPrecommit { .. } => "missed_precommit",
            Self::NodeLag { .. } => "node_lag",
            Self::UnknownError { .. } => "unknown_error",
        }
    }
}

impl std::fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Healthy { height } => write!(f, "healthy at height {}", height),
            Self::MissTolerated { height, consecutive_misses } => write!(
                f,
                "missed precommit at height {} ({} consecutive, tolerated)",
                height, consecutive_misses
            ),
            Self::MissedPrecommit { height, consecutive_misses, .. } => write!(
                f,
                "missed precommit at height {} ({} consecutive)",
                height, consecutive_misses
            ),
            Self::NodeLag { height, delta_secs, .. } => {
                write!(f, "node lagging at height {} by {:.1}s", height, delta_secs)
            },
            Self::UnknownError { message, consecutive_flakes, .. } => {
                write!(f, "unknown error ({} consecutive): {}", consecutive_flakes, message)
            },
        }
    }
}
