//! Alert sinks: delivery channels for terminal-tier notifications
//!
//! The core's contract toward a sink is fire-and-forget: delivery is
//! best-effort, bounded in time, and a sink failure never propagates
//! back into the workflow that raised the alert.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::time::Duration;

use trellis_types::AlertRecord;

/// Errors while handing an alert to its delivery channel.
///
/// Always caught and logged at the call site, never re-raised.
#[derive(Debug, thiserror::Error)]
pub enum AlertDeliveryError {
    #[error("Alert channel misconfigured: {0}")]
    Misconfigured(String),

    #[error("Alert channel unreachable: {0}")]
    Unreachable(String),

    #[error("Alert channel rejected record: {0}")]
    Rejected(String),
}

/// A notification channel that accepts terminal-tier alert records
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Deliver one alert record, best-effort.
    async fn deliver(&self, record: &AlertRecord) -> Result<(), AlertDeliveryError>;
}

/// Default sink: emits the record to the tracing pipeline and nothing
/// else. Infallible.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingAlertSink;

#[async_trait]
impl AlertSink for TracingAlertSink {
    async fn deliver(&self, record: &AlertRecord) -> Result<(), AlertDeliveryError> {
        tracing::error!(
            alert_id = %record.alert_id,
            tenant = %record.tenant_id,
            severity = ?record.severity,
            context = ?record.context,
            "{}",
            record.message
        );
        Ok(())
    }
}

/// In-memory sink for tests and for dashboards polling recent alerts
#[derive(Default)]
pub struct MemoryAlertSink {
    records: RwLock<Vec<AlertRecord>>,
}

impl MemoryAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything delivered so far
    pub fn records(&self) -> Vec<AlertRecord> {
        self.records.read().clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn clear(&self) {
        self.records.write().clear();
    }
}

#[async_trait]
impl AlertSink for MemoryAlertSink {
    async fn deliver(&self, record: &AlertRecord) -> Result<(), AlertDeliveryError> {
        self.records.write().push(record.clone());
        Ok(())
    }
}

/// Webhook sink: POSTs the record as JSON to a notification endpoint
/// (chat hook, dashboard collector, metrics gateway).
///
/// Every request carries a hard timeout so fire-and-forget delivery
/// can never block a workflow indefinitely.
pub struct WebhookAlertSink {
    endpoint: String,
    client: reqwest::Client,
}

impl WebhookAlertSink {
    /// Cap on a single delivery round-trip.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(endpoint: impl Into<String>) -> Result<Self, AlertDeliveryError> {
        Self::with_timeout(endpoint, Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AlertDeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AlertDeliveryError::Misconfigured(e.to_string()))?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl std::fmt::Debug for WebhookAlertSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookAlertSink")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[async_trait]
impl AlertSink for WebhookAlertSink {
    async fn deliver(&self, record: &AlertRecord) -> Result<(), AlertDeliveryError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(record)
            .send()
            .await
            .map_err(|e| AlertDeliveryError::Unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AlertDeliveryError::Rejected(format!(
                "status {}",
                response.status()
            )));
        }
        Ok(())
    }
}
