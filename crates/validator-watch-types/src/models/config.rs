//! Monitor configuration.
//!
//! Defaults reproduce a 30 second check cadence: twenty minutes of tolerated
//! signature lag, five minutes of missed precommits and ten minutes of API
//! flakes before anyone is paged.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Full monitor configuration. Immutable once the daemon has started.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MonitorConfig {
    /// Seconds between the end of one health check and the start of the next
    pub check_interval_secs: u64,
    /// Seconds the validator's last signature may lag behind wall time
    pub acceptable_delta_secs: u64,
    /// Consecutive missed precommits tolerated before paging
    pub acceptable_consecutive_miss: u32,
    /// Consecutive unexpected errors tolerated before paging
    pub acceptable_consecutive_flakes: u32,
    /// Minimum seconds between repeated pages for the same alert
    pub throttle_interval_secs: u64,
    /// Hex address the validator signs precommits with
    pub validator_address: String,
    /// Local node API
    pub node: NodeConfig,
    /// PagerDuty credentials
    pub pager: PagerConfig,
}

/// Where to reach the local node API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NodeConfig {
    /// Base URL of the node API (no trailing path)
    pub api_base: String,
    /// Node name as registered in the API
    pub name: String,
    /// Upper bound for a single fetch, must be shorter than the check interval
    pub request_timeout_secs: u64,
}

/// PagerDuty REST API settings. Paging is disabled while key or service is empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PagerConfig {
    /// Personal REST API key (not a service integration key)
    pub api_key: String,
    /// Service the incidents are opened against
    pub service_id: String,
    /// Requester email sent in the `From` header
    pub email: String,
    /// API root, overridable for testing
    pub api_base: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        let check_interval_secs = 30;
        Self {
            check_interval_secs,
            acceptable_delta_secs: 20 * 60,
            acceptable_consecutive_miss: (5 * 60 / check_interval_secs) as u32,
            acceptable_consecutive_flakes: (10 * 60 / check_interval_secs) as u32,
            throttle_interval_secs: 5 * 60,
            validator_address: String::new(),
            node: NodeConfig::default(),
            pager: PagerConfig::default(),
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            api_base: "http://127.0.0.1:8080".to_string(),
            name: "oasis-node".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl PagerConfig {
    pub const DEFAULT_API_BASE: &'static str = "https://api.pagerduty.com";

    /// Whether enough credentials are present to open incidents.
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.service_id.trim().is_empty()
    }

    /// API root, falling back to the public PagerDuty endpoint.
    pub fn api_base(&self) -> &str {
        if self.api_base.trim().is_empty() {
            Self::DEFAULT_API_BASE
        } else {
            self.api_base.trim_end_matches('/')
        }
    }
}

impl MonitorConfig {
    /// Check cross-field constraints. Called once at startup.
    pub fn validate(&self) -> Result<()> {
        if self.validator_address.trim().is_empty() {
            return Err(ConfigError::invalid("validator_address", "must not be empty"));
        }
        if self.check_interval_secs == 0 {
            return Err(ConfigError::invalid("check_interval_secs", "must be greater than 0"));
        }
        if self.node.api_base.trim().is_empty() {
            return Err(ConfigError::invalid("node.api_base", "must not be empty"));
        }
        if self.node.request_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "node.request_timeout_secs",
                "must be greater than 0",
            ));
        }
        if self.node.request_timeout_secs >= self.check_interval_secs {
            return Err(ConfigError::invalid(
                "node.request_timeout_secs",
                format!(
                    "must be shorter than check_interval_secs ({}s)",
                    self.check_interval_secs
                ),
            ));
        }
        Ok(())
    }

    /// Copy safe to print: the PagerDuty key is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.pager.api_key.is_empty() {
            copy.pager.api_key = "********".to_string();
        }
        copy
    }
}
