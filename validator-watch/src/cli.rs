use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use validator_watch_types::MonitorConfig;

#[derive(Parser)]
#[command(
    name = "validator-watch",
    about = "Validator Watch - pages when a validator stops signing or falls behind",
    version = env!("GIT_VERSION"),
    author,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(
        short,
        long,
        global = true,
        env = "VALIDATOR_WATCH_CONFIG",
        help = "Path to JSON config file"
    )]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run health checks forever (default if no command specified)")]
    Run,

    #[command(about = "Run a single health check and exit non-zero unless healthy")]
    Check,

    #[command(about = "Print the resolved configuration (API key redacted)")]
    Config,
}

/// Flags and environment variables that take precedence over the config file.
#[derive(Args, Debug, Default)]
pub struct ConfigOverrides {
    #[arg(long, global = true, env = "VALIDATOR_ADDRESS", help = "Validator address (hex)")]
    pub validator_address: Option<String>,

    #[arg(long, global = true, env = "LOCAL_API", help = "Node API base URL")]
    pub node_api: Option<String>,

    #[arg(long, global = true, env = "LOCAL_NODE_NAME", help = "Node name in the local API")]
    pub node_name: Option<String>,

    #[arg(
        long,
        global = true,
        env = "NODE_REQUEST_TIMEOUT_SECS",
        help = "Node fetch timeout, must be shorter than the check interval (default 10)"
    )]
    pub request_timeout_secs: Option<u64>,

    #[arg(
        long,
        global = true,
        env = "CHECK_INTERVAL_SECONDS",
        help = "Seconds between checks; lowers the fetch timeout below it unless one is given"
    )]
    pub check_interval_secs: Option<u64>,

    #[arg(long, global = true, env = "ACCEPTABLE_DELTA_SECS")]
    pub acceptable_delta_secs: Option<u64>,

    #[arg(long, global = true, env = "ACCEPTABLE_CONSECUTIVE_MISS")]
    pub acceptable_consecutive_miss: Option<u32>,

    #[arg(long, global = true, env = "ACCEPTABLE_CONSECUTIVE_FLAKES")]
    pub acceptable_consecutive_flakes: Option<u32>,

    #[arg(long, global = true, env = "THROTTLE_INTERVAL_SECONDS")]
    pub throttle_interval_secs: Option<u64>,

    #[arg(long, global = true, env = "PAGER_DUTY_API_KEY", hide_env_values = true)]
    pub pagerduty_api_key: Option<String>,

    #[arg(long, global = true, env = "PAGER_DUTY_SERVICE")]
    pub pagerduty_service: Option<String>,

    #[arg(long, global = true, env = "PAGER_DUTY_EMAIL")]
    pub pagerduty_email: Option<String>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut MonitorConfig) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }

        set(&mut config.validator_address, &self.validator_address);
        set(&mut config.node.api_base, &self.node_api);
        set(&mut config.node.name, &self.node_name);
        set(&mut config.node.request_timeout_secs, &self.request_timeout_secs);
        set(&mut config.check_interval_secs, &self.check_interval_secs);
        set(&mut config.acceptable_delta_secs, &self.acceptable_delta_secs);
        set(&mut config.acceptable_consecutive_miss, &self.acceptable_consecutive_miss);
        set(&mut config.acceptable_consecutive_flakes, &self.acceptable_consecutive_flakes);
        set(&mut config.throttle_interval_secs, &self.throttle_interval_secs);
        set(&mut config.pager.api_key, &self.pagerduty_api_key);
        set(&mut config.pager.service_id, &self.pagerduty_service);
        set(&mut config.pager.email, &self.pagerduty_email);

        if let (Some(interval), None) = (self.check_interval_secs, self.request_timeout_secs) {
            if config.node.request_timeout_secs >= interval {
                let timeout = interval.saturating_sub(1).max(1);
                tracing::info!(
                    "Lowering node request timeout from {}s to {}s to fit the {}s check interval",
                    config.node.request_timeout_secs,
                    timeout,
                    interval
                );
                config.node.request_timeout_secs = timeout;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_only_touch_given_fields() {
        let mut config = MonitorConfig::default();
        let overrides = ConfigOverrides {
            validator_address: Some("ABCD".to_string()),
            check_interval_secs: Some(60),
            pagerduty_service: Some("PSVC123".to_string()),
            ..Default::default()
        };
        overrides.apply(&mut config);

        assert_eq!(config.validator_address, "ABCD");
        assert_eq!(config.check_interval_secs, 60);
        assert_eq!(config.pager.service_id, "PSVC123");
        assert_eq!(config.node.name, "oasis-node");
        assert_eq!(config.throttle_interval_secs, 300);
    }

    #[test]
    fn test_short_interval_lowers_default_timeout() {
        let mut config = MonitorConfig {
            validator_address: "ABCD".to_string(),
            ..Default::default()
        };
        let overrides = ConfigOverrides { check_interval_secs: Some(5), ..Default::default() };
        overrides.apply(&mut config);

        assert_eq!(config.check_interval_secs, 5);
        assert_eq!(config.node.request_timeout_secs, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explicit_timeout_is_not_lowered() {
        let mut config = MonitorConfig::default();
        let overrides = ConfigOverrides {
            check_interval_secs: Some(5),
            request_timeout_secs: Some(8),
            ..Default::default()
        };
        overrides.apply(&mut config);

        assert_eq!(config.node.request_timeout_secs, 8);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "validator-watch",
            "check",
            "--validator-address",
            "1D9C",
            "--node-api",
            "http://10.0.0.5:8080",
            "--acceptable-consecutive-miss",
            "4",
        ])
        .unwrap();

        assert!(matches!(cli.command, Some(Commands::Check)));
        assert_eq!(cli.overrides.validator_address.as_deref(), Some("1D9C"));
        assert_eq!(cli.overrides.node_api.as_deref(), Some("http://10.0.0.5:8080"));
        assert_eq!(cli.overrides.acceptable_consecutive_miss, Some(4));
    }
}
