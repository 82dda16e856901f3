//! Configuration structures

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSecondsWithFrac};

use crate::constants::{
    DEFAULT_AUTH_GRANT, DEFAULT_BASE_URL, DEFAULT_RETRY_BACKOFF_SECS, DEFAULT_TRANSIENT_RETRIES,
};
use crate::types::RegionKey;

/// Top-level suite configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub project_id: String,
    pub auth: AuthConfig,
    #[serde(default)]
    pub region: RegionKey,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub order_defaults: OrderDefaults,
}

impl SuiteConfig {
    /// Configuration with defaults for everything but the required fields
    pub fn new(project_id: impl Into<String>, auth: AuthConfig) -> Self {
        Self {
            base_url: default_base_url(),
            project_id: project_id.into(),
            auth,
            region: RegionKey::default(),
            http: HttpSettings::default(),
            polling: PollingConfig::default(),
            order_defaults: OrderDefaults::default(),
        }
    }
}

/// Client-credentials token endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub url: String,
    pub client_id: String,
    #[serde(skip_serializing, default)]
    pub client_secret: String,
    #[serde(default = "default_grant_type")]
    pub grant_type: String,
}

impl AuthConfig {
    pub fn new(
        url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            grant_type: default_grant_type(),
        }
    }
}

/// Transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_seconds: u64,
    /// Attempts per idempotent request inside the transport (1 = no retry)
    pub max_attempts: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self { timeout_seconds: 30, max_attempts: 1 }
    }
}

/// Interval and deadline of one poll loop
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollPolicy {
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    #[serde(rename = "interval_seconds")]
    pub interval: Duration,
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    #[serde(rename = "timeout_seconds")]
    pub timeout: Duration,
}

impl PollPolicy {
    pub const fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    const fn minutes(interval_secs: u64, timeout_minutes: u64) -> Self {
        Self::new(Duration::from_secs(interval_secs), Duration::from_secs(timeout_minutes * 60))
    }
}

/// Poll budgets per kind of operation
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Cluster creation
    pub provisioning: PollPolicy,
    /// Disk, public IP, bandwidth and settings changes
    pub modification: PollPolicy,
    /// Node add/remove and flavor resize
    pub scaling: PollPolicy,
    /// User and database commands
    pub command: PollPolicy,
    pub backup: PollPolicy,
    pub deletion: PollPolicy,
    /// Consecutive transient failures absorbed before giving up
    pub transient_retries: u32,
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    #[serde(rename = "retry_backoff_seconds")]
    pub retry_backoff: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            provisioning: PollPolicy::minutes(60, 25),
            modification: PollPolicy::minutes(60, 15),
            scaling: PollPolicy::minutes(60, 20),
            command: PollPolicy::minutes(30, 5),
            backup: PollPolicy::minutes(30, 10),
            deletion: PollPolicy::minutes(60, 25),
            transient_retries: DEFAULT_TRANSIENT_RETRIES,
            retry_backoff: Duration::from_secs(DEFAULT_RETRY_BACKOFF_SECS),
        }
    }
}

impl PollingConfig {
    /// Same budget for every profile, with the given backoff
    pub const fn uniform(policy: PollPolicy, retry_backoff: Duration) -> Self {
        Self {
            provisioning: policy,
            modification: policy,
            scaling: policy,
            command: policy,
            backup: policy,
            deletion: policy,
            transient_retries: DEFAULT_TRANSIENT_RETRIES,
            retry_backoff,
        }
    }
}

/// Identity fields stamped on every new order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderDefaults {
    pub creator: Creator,
    pub security_groups: Vec<SecurityGroupRef>,
    pub maintenance_window: MaintenanceWindow,
}

impl Default for OrderDefaults {
    fn default() -> Self {
        Self {
            creator: Creator {
                email: "rbatukaev@t1.ru".to_string(),
                id: "d1ace1b2-6094-41d2-bc7d-46812f7c7884".to_string(),
                realm: String::new(),
            },
            security_groups: vec![SecurityGroupRef {
                id: "c79066a7-2ce8-4dbb-ae8e-70b51ecf4fee".to_string(),
                name: "rbatukaev".to_string(),
            }],
            maintenance_window: MaintenanceWindow::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    pub email: String,
    pub id: String,
    pub realm: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroupRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceWindow {
    pub day: u8,
    pub time_range: String,
}

impl Default for MaintenanceWindow {
    fn default() -> Self {
        Self { day: 0, time_range: "00:00 - 01:00".to_string() }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_grant_type() -> String {
    DEFAULT_AUTH_GRANT.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_polling_budgets() {
        let polling = PollingConfig::default();
        assert_eq!(polling.provisioning.timeout, Duration::from_secs(25 * 60));
        assert_eq!(polling.command.interval, Duration::from_secs(30));
        assert_eq!(polling.scaling.timeout, Duration::from_secs(20 * 60));
        assert_eq!(polling.transient_retries, 3);
        assert_eq!(polling.retry_backoff, Duration::from_secs(10));
    }

    #[test]
    fn poll_policy_accepts_fractional_seconds() {
        let policy: PollPolicy =
            serde_json::from_str(r#"{"interval_seconds": 0.5, "timeout_seconds": 30}"#).unwrap();
        assert_eq!(policy.interval, Duration::from_millis(500));
        assert_eq!(policy.timeout, Duration::from_secs(30));
    }

    #[test]
    fn client_secret_is_never_serialized() {
        let config = SuiteConfig::new("proj", AuthConfig::new("https://auth", "id", "s3cr3t"));
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("s3cr3t"));
        assert!(json.contains("https://api.t1.cloud"));
    }
}
