//! Local node API access.

mod client;

pub use client::NodeClient;

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::NodeError;
use validator_watch_types::CommitRecord;

/// Anything that can produce the node's latest commit.
#[async_trait]
pub trait CommitSource: Send + Sync {
    async fn fetch_latest_commit(&self) -> Result<CommitRecord, NodeError>;
}

#[async_trait]
impl<T: CommitSource + ?Sized> CommitSource for Arc<T> {
    async fn fetch_latest_commit(&self) -> Result<CommitRecord, NodeError> {
        self.as_ref().fetch_latest_commit().await
    }
}
