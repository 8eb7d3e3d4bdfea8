use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use super::CommitSource;
use crate::error::{truncate_body, NodeError};
use validator_watch_types::{CommitRecord, CommitResponse, NodeConfig};

const COMMIT_PATH: &str = "/api/consensus/blocklastcommit";

/// HTTP client for the node's consensus API.
pub struct NodeClient {
    client: Client,
    commit_url: String,
    node_name: String,
}

impl NodeClient {
    pub fn new(config: &NodeConfig) -> Result<Self, NodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            commit_url: format!("{}{}", config.api_base.trim_end_matches('/'), COMMIT_PATH),
            node_name: config.name.clone(),
        })
    }

    pub fn commit_url(&self) -> &str {
        &self.commit_url
    }
}

#[async_trait]
impl CommitSource for NodeClient {
    async fn fetch_latest_commit(&self) -> Result<CommitRecord, NodeError> {
        let resp = self
            .client
            .get(&self.commit_url)
            .query(&[("name", self.node_name.as_str())])
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if status != StatusCode::OK {
            return Err(NodeError::Status {
                status: status.as_u16(),
                body: truncate_body(&body, 256),
            });
        }

        let parsed: CommitResponse = serde_json::from_str(&body)
            .map_err(|e| NodeError::InvalidResponse(e.to_string()))?;
        Ok(parsed.result)
    }
}
