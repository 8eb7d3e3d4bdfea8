//! # Validator Watch Core
//!
//! Monitoring logic for a single consensus validator.
//!
//! ```text
//! scheduler ─▶ node::NodeClient ─▶ health::HealthEvaluator ─▶ pager::Pager ─▶ PagerDuty
//!                                                                  │
//!                                                          throttle::AlertThrottle
//! ```
//!
//! Everything that touches the network sits behind a trait
//! ([`node::CommitSource`], [`pager::IncidentSink`]) and everything that reads
//! the time goes through [`clock::Clock`], so the evaluator can be driven
//! cycle by cycle in tests.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::float_cmp))]

pub mod clock;
pub mod config;
pub mod error;
pub mod health;
pub mod node;
pub mod pager;
pub mod throttle;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{EvalError, NodeError, PagerError};
pub use health::{CycleOutcome, EvaluatorState, HealthEvaluator, Verdict};
pub use node::{CommitSource, NodeClient};
pub use pager::{Incident, IncidentSink, PageResult, Pager, PagerDutyClient};
pub use throttle::AlertThrottle;
