//! Paging.
//!
//! [`Pager`] gates every alert through the [`AlertThrottle`] and hands the
//! survivors to an [`IncidentSink`]. With no sink configured the pager still
//! throttles and logs, but never contacts anyone.

mod pagerduty;

#[cfg(test)]
mod tests;

pub use pagerduty::PagerDutyClient;

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use crate::clock::Clock;
use crate::error::PagerError;
use crate::throttle::AlertThrottle;
use validator_watch_types::PagerConfig;

/// Destination for incidents that passed the throttle.
#[async_trait]
pub trait IncidentSink: Send + Sync {
    async fn create_incident(&self, incident: &Incident) -> Result<(), PagerError>;
}

/// PagerDuty v2 incident body.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Incident {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub service: ServiceReference,
    pub body: IncidentBody,
    pub incident_key: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ServiceReference {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IncidentBody {
    #[serde(rename = "type")]
    pub kind: String,
    pub details: String,
}

impl Incident {
    pub fn new(title: &str, details: &str, service_id: &str, incident_key: &str) -> Self {
        Self {
            title: title.to_string(),
            kind: "incident".to_string(),
            service: ServiceReference {
                id: service_id.to_string(),
                kind: "service_reference".to_string(),
            },
            body: IncidentBody { kind: "incident_body".to_string(), details: details.to_string() },
            incident_key: incident_key.to_string(),
        }
    }
}

/// What happened to a page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageResult {
    /// Incident submitted.
    Sent,
    /// Same key paged within its cooldown.
    Throttled,
    /// Passed the throttle but paging has no credentials.
    Unconfigured,
    /// Submission failed; the error text is kept for logging.
    Failed(String),
}

impl PageResult {
    /// Whether this request passed the throttle.
    pub fn passed_throttle(&self) -> bool {
        !matches!(self, Self::Throttled)
    }
}

pub struct Pager {
    sink: Option<Arc<dyn IncidentSink>>,
    service_id: String,
    throttle: AlertThrottle,
}

impl Pager {
    pub fn new(
        sink: Option<Arc<dyn IncidentSink>>,
        service_id: &str,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { sink, service_id: service_id.to_string(), throttle: AlertThrottle::new(clock) }
    }

    /// Build a pager backed by PagerDuty, or a silent one when credentials are missing.
    pub fn from_config(config: &PagerConfig, clock: Arc<dyn Clock>) -> Result<Self, PagerError> {
        let sink: Option<Arc<dyn IncidentSink>> = if config.is_configured() {
            Some(Arc::new(PagerDutyClient::new(config)?))
        } else {
            tracing::warn!("PagerDuty is not configured, alerts will only be logged");
            None
        };
        Ok(Self::new(sink, &config.service_id, clock))
    }

    pub fn is_configured(&self) -> bool {
        self.sink.is_some()
    }

    pub fn throttle(&self) -> &AlertThrottle {
        &self.throttle
    }

    /// Page according to throttling rules.
    ///
    /// `alert_key` defaults to `title + details`. Never fails: submission
    /// errors are logged and reported through [`PageResult::Failed`].
    pub async fn page(
        &self,
        title: &str,
        details: &str,
        cooldown_secs: u64,
        alert_key: Option<&str>,
    ) -> PageResult {
        let key = match alert_key {
            Some(k) if !k.is_empty() => k.to_string(),
            _ => format!("{}{}", title, details),
        };

        if !self.throttle.should_alert(&key, cooldown_secs) {
            tracing::debug!("> Page throttled: {} (key {:?})", title, key);
            return PageResult::Throttled;
        }

        tracing::info!("> Paging: {}", title);

        let Some(sink) = &self.sink else {
            tracing::debug!("> Paging disabled, dropping incident {:?}", key);
            return PageResult::Unconfigured;
        };

        let incident = Incident::new(title, details, &self.service_id, &key);
        match sink.create_incident(&incident).await {
            Ok(()) => PageResult::Sent,
            Err(e) => {
                tracing::error!("> Failed to page {:?}: {}", title, e);
                PageResult::Failed(e.to_string())
            },
        }
    }
}
