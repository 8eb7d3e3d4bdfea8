//! # Validator Watch Types
//!
//! Wire models, configuration and error definitions for Validator Watch.
//!
//! - **`error`** - Typed configuration errors
//! - **`models`** - Node API commit records and the monitor configuration
//!
//! ## Architecture Role
//!
//! `validator-watch-types` sits at the bottom of the dependency graph:
//!
//! ```text
//!    validator-watch-types (this crate)
//!                │
//!                ▼
//!    validator-watch-core
//!                │
//!                ▼
//!    validator-watch (daemon)
//! ```

pub mod error;
pub mod models;

pub use error::{ConfigError, Result};

pub use models::{
    BlockId, CommitRecord, CommitResponse, MonitorConfig, NodeConfig, PagerConfig, Signature,
};
