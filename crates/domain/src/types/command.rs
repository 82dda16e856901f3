//! Asynchronous command handles

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandStatus {
    Success,
    Failed,
    Pending,
    #[serde(other)]
    Other,
}

crate::impl_domain_status_conversions!(CommandStatus {
    Success => "success",
    Failed => "failed",
    Pending => "pending",
    Other => "other",
});

/// Result of `GET .../commands/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    pub status: CommandStatus,
    #[serde(default)]
    pub response: Option<CommandResponse>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl Command {
    /// Human-readable error reported by the command, if any
    pub fn error_message(&self) -> String {
        match &self.error {
            Some(Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => "no error details".to_string(),
        }
    }
}

/// Payload of a service-status command
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandResponse {
    pub status: Option<String>,
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of a `202 Accepted` reply that points at a command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptedCommand {
    pub url: String,
}

impl AcceptedCommand {
    /// Command id: the last non-empty path segment of `url`
    pub fn command_id(&self) -> Option<&str> {
        let path = self.url.split(['?', '#']).next().unwrap_or_default();
        path.rsplit('/').find(|segment| !segment.is_empty())
    }
}
