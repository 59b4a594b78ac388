//! The workflow contract: tenant-bound execution with escalation helpers
//!
//! Every concrete workflow (ingestion, feature engineering, training,
//! inference, ...) owns exactly one [`WorkflowContext`] for its whole
//! lifetime. The context validates the tenant at construction and
//! provides the shared escalation vocabulary; the workflow itself only
//! adds its primary operation.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{AlertSink, TracingAlertSink};
use trellis_types::{AlertRecord, Severity, TenantContext, TenantId, WorkflowResult};

/// Shared state every concrete workflow owns: the validated tenant
/// binding and the terminal-tier alert channel.
pub struct WorkflowContext {
    kind: String,
    tenant: TenantContext,
    alerts: Arc<dyn AlertSink>,
}

impl WorkflowContext {
    /// Bind a workflow kind to a tenant, failing fast on an invalid id.
    ///
    /// Either a fully valid context exists or construction fails with
    /// a validation error; no partial construction is observable. On
    /// success an informational record marks the initialization.
    pub fn new(
        kind: impl Into<String>,
        tenant_id: impl Into<String>,
        alerts: Arc<dyn AlertSink>,
    ) -> WorkflowResult<Self> {
        let kind = kind.into();
        let tenant = TenantContext::new(&kind, tenant_id)?;
        tracing::info!(
            workflow = %kind,
            tenant = %tenant.tenant_id(),
            "initialized workflow for tenant"
        );
        Ok(Self {
            kind,
            tenant,
            alerts,
        })
    }

    /// Bind with the default tracing-only alert sink.
    pub fn with_default_sink(
        kind: impl Into<String>,
        tenant_id: impl Into<String>,
    ) -> WorkflowResult<Self> {
        Self::new(kind, tenant_id, Arc::new(TracingAlertSink))
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn tenant(&self) -> &TenantContext {
        &self.tenant
    }

    pub fn tenant_id(&self) -> &TenantId {
        self.tenant.tenant_id()
    }

    pub fn log_prefix(&self) -> &str {
        self.tenant.log_prefix()
    }

    pub fn storage_prefix(&self) -> &str {
        self.tenant.storage_prefix()
    }

    /// Informational checkpoint for long multi-step workflows.
    ///
    /// No failure semantics; always succeeds. Makes mid-flight
    /// progress auditable per tenant.
    pub fn log_partial_success(&self, step_name: &str, details: &str) {
        tracing::info!(
            prefix = %self.tenant.log_prefix(),
            step = step_name,
            "step completed: {details}"
        );
    }

    /// Terminal recovery tier: log a critical record and best-effort
    /// forward it to the alert sink.
    ///
    /// This call can never be the cause of a process crash. A sink
    /// failure is absorbed and logged, not re-raised. Returns the
    /// record that was raised so callers can correlate it.
    pub async fn alert_critical(
        &self,
        message: &str,
        context: BTreeMap<String, Value>,
    ) -> AlertRecord {
        let record = AlertRecord::new(self.tenant_id().clone(), message)
            .with_severity(Severity::Critical)
            .with_context_map(context);

        tracing::error!(
            prefix = %self.tenant.log_prefix(),
            alert_id = %record.alert_id,
            severity = "critical",
            context = ?record.context,
            "{message}"
        );

        if let Err(delivery) = self.alerts.deliver(&record).await {
            tracing::error!(
                prefix = %self.tenant.log_prefix(),
                alert_id = %record.alert_id,
                failure = %delivery,
                "alert delivery failed, continuing"
            );
        }

        record
    }
}

impl std::fmt::Debug for WorkflowContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowContext")
            .field("kind", &self.kind)
            .field("tenant", &self.tenant)
            .finish()
    }
}

/// The execution contract every tenant-scoped unit of work implements.
///
/// A concrete workflow owns exactly one context for its lifetime and
/// exposes one primary operation. Tenant-scoped resource access goes
/// through the context's derived prefixes; `execute` never accepts a
/// separately supplied tenant string.
#[async_trait]
pub trait Workflow: Send + Sync {
    /// The shared tenant binding and escalation helpers.
    fn context(&self) -> &WorkflowContext;

    /// The primary operation. Must only be invoked on a successfully
    /// constructed workflow.
    async fn execute(&self, payload: Value) -> WorkflowResult<Value>;

    /// The tenant this workflow is bound to.
    fn tenant_id(&self) -> &TenantId {
        self.context().tenant_id()
    }
}
