use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

use super::{Incident, IncidentSink, PageResult, Pager};
use crate::clock::ManualClock;
use crate::error::PagerError;
use validator_watch_types::PagerConfig;

#[derive(Default)]
struct RecordingSink {
    incidents: Mutex<Vec<Incident>>,
    fail: bool,
}

#[async_trait]
impl IncidentSink for RecordingSink {
    async fn create_incident(&self, incident: &Incident) -> Result<(), PagerError> {
        if self.fail {
            return Err(PagerError::Rejected { status: 400, body: "bad service".to_string() });
        }
        self.incidents.lock().push(incident.clone());
        Ok(())
    }
}

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap()))
}

#[tokio::test]
async fn test_page_sends_incident() {
    let sink = Arc::new(RecordingSink::default());
    let pager = Pager::new(Some(sink.clone()), "PSVC123", clock());

    let result = pager
        .page("Node is Lagging", "Lag is currently 1500 seconds.", 300, Some("node-lag"))
        .await;
    assert_eq!(result, PageResult::Sent);

    let incidents = sink.incidents.lock();
    assert_eq!(incidents.len(), 1);
    assert_eq!(incidents[0].title, "Node is Lagging");
    assert_eq!(incidents[0].incident_key, "node-lag");
    assert_eq!(incidents[0].service.id, "PSVC123");
    assert_eq!(incidents[0].body.details, "Lag is currently 1500 seconds.");
}

#[tokio::test]
async fn test_default_key_is_title_plus_details() {
    let sink = Arc::new(RecordingSink::default());
    let pager = Pager::new(Some(sink.clone()), "PSVC123", clock());

    pager.page("Unknown error", "timeout", 300, None).await;
    assert_eq!(sink.incidents.lock()[0].incident_key, "Unknown errortimeout");
    assert!(pager.throttle().last_alerted("Unknown errortimeout").is_some());
}

#[tokio::test]
async fn test_throttled_page_skips_sink() {
    let clock = clock();
    let sink = Arc::new(RecordingSink::default());
    let pager = Pager::new(Some(sink.clone()), "PSVC123", clock.clone());

    let page = |details: &'static str| {
        let pager = &pager;
        async move { pager.page("Missed Precommits", details, 300, Some("missed-precommit")).await }
    };

    assert_eq!(page("Consecutive misses: 11").await, PageResult::Sent);
    clock.advance(Duration::seconds(30));
    assert_eq!(page("Consecutive misses: 12").await, PageResult::Throttled);
    clock.advance(Duration::seconds(300));
    assert_eq!(page("Consecutive misses: 22").await, PageResult::Sent);

    assert_eq!(sink.incidents.lock().len(), 2);
}

#[tokio::test]
async fn test_unconfigured_is_noop() {
    let pager = Pager::from_config(&PagerConfig::default(), clock()).unwrap();
    assert!(!pager.is_configured());

    let first = pager.page("Node is Lagging", "x", 300, Some("node-lag")).await;
    assert_eq!(first, PageResult::Unconfigured);
    let second = pager.page("Node is Lagging", "x", 300, Some("node-lag")).await;
    assert_eq!(second, PageResult::Throttled);
}

#[tokio::test]
async fn test_sink_failure_is_reported() {
    let sink = Arc::new(RecordingSink { fail: true, ..Default::default() });
    let pager = Pager::new(Some(sink), "PSVC123", clock());

    let result = pager.page("Node is Lagging", "x", 300, Some("node-lag")).await;
    assert!(matches!(result, PageResult::Failed(ref msg) if msg.contains("bad service")));
    assert!(result.passed_throttle());
}

#[test]
fn test_incident_serialization() {
    let incident = Incident::new("Unknown error", "boom", "PSVC123", "boom");
    let json = serde_json::to_value(&incident).unwrap();
    assert_eq!(json["type"], "incident");
    assert_eq!(json["service"]["type"], "service_reference");
    assert_eq!(json["service"]["id"], "PSVC123");
    assert_eq!(json["body"]["type"], "incident_body");
    assert_eq!(json["body"]["details"], "boom");
    assert_eq!(json["incident_key"], "boom");
}
