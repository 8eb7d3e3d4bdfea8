//! PagerDuty REST API v2 client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::{Incident, IncidentSink};
use crate::error::{truncate_body, PagerError};
use validator_watch_types::PagerConfig;

const REQUEST_TIMEOUT_SECS: u64 = 15;
const ACCEPT_V2: &str = "application/vnd.pagerduty+json;version=2";

#[derive(Serialize)]
struct CreateIncident<'a> {
    incident: &'a Incident,
}

pub struct PagerDutyClient {
    client: Client,
    api_key: String,
    email: String,
    incidents_url: String,
}

impl PagerDutyClient {
    pub fn new(config: &PagerConfig) -> Result<Self, PagerError> {
        let client = Client::builder().timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS)).build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            email: config.email.clone(),
            incidents_url: format!("{}/incidents", config.api_base()),
        })
    }
}

#[async_trait]
impl IncidentSink for PagerDutyClient {
    async fn create_incident(&self, incident: &Incident) -> Result<(), PagerError> {
        let resp = self
            .client
            .post(&self.incidents_url)
            .header("Authorization", format!("Token token={}", self.api_key))
            .header("Accept", ACCEPT_V2)
            .header("From", &self.email)
            .json(&CreateIncident { incident })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PagerError::Rejected {
                status: status.as_u16(),
                body: truncate_body(&body, 256),
            });
        }

        tracing::debug!("PagerDuty accepted incident {:?} ({})", incident.incident_key, status);
        Ok(())
    }
}
