//! Domain models for Validator Watch.

pub mod commit;
pub mod config;

pub use commit::{BlockId, CommitRecord, CommitResponse, Signature};
pub use config::{MonitorConfig, NodeConfig, PagerConfig};
