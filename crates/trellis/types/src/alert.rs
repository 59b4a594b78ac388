//! Alert records produced at the terminal recovery tier
//!
//! An alert is a value handed to whatever notification channel is
//! configured — fire-and-forget. The core never persists alert state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::TenantId;

/// Alert severity levels
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    #[default]
    Warning,
    Error,
    Critical,
}

/// A notification produced when a workflow's failure path reaches the
/// terminal tier
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AlertRecord {
    /// Unique id for correlating delivery attempts and log records
    pub alert_id: String,

    /// The tenant whose workflow raised the alert
    pub tenant_id: TenantId,

    pub severity: Severity,

    pub message: String,

    /// Free-form diagnostic context
    #[serde(default)]
    pub context: BTreeMap<String, serde_json::Value>,

    pub raised_at: DateTime<Utc>,
}

impl AlertRecord {
    /// Create a critical alert with empty context
    pub fn new(tenant_id: TenantId, message: impl Into<String>) -> Self {
        Self {
            alert_id: uuid::Uuid::new_v4().to_string(),
            tenant_id,
            severity: Severity::Critical,
            message: message.into(),
            context: BTreeMap::new(),
            raised_at: Utc::now(),
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Attach one context entry
    pub fn with_context(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }

    /// Replace the context wholesale
    pub fn with_context_map(mut self, context: BTreeMap<String, serde_json::Value>) -> Self {
        self.context = context;
        self
    }
}
