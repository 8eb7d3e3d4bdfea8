//! Validator Health Evaluation
//!
//! Each cycle the evaluator:
//! - Looks for the validator's precommit in the latest commit
//! - Pages once consecutive misses exceed the tolerated count
//! - Pages when the validator's last signature is too old
//! - Counts unexpected errors as flakes and pages once they pile up
//!
//! ```text
//!            fetch ok                     fetch / parse error
//!   ┌───────────┴──────────┐                      │
//!   ▼                      ▼                      ▼
//! signed?               absent              flakes += 1
//!   │ misses = 0           │ misses += 1     flakes >= limit ─▶ page(error)
//!   ▼                      ▼
//! delta > limit?      misses > limit? ─▶ page("missed-precommit")
//!   ├─ yes ─▶ page("node-lag")
//!   └─ no ──▶ flakes = 0 ◀── (not over limit)
//! ```

mod evaluator;
mod types;


pub use evaluator::{HealthEvaluator, UNKNOWN_ERROR_COOLDOWN_SECS};
pub use types::{CycleOutcome, EvaluatorState, Verdict};
