//! Tenant identity and derived isolation prefixes
//!
//! A tenant is an isolated customer context. Every workflow execution
//! and every log record must be attributable to exactly one tenant, so
//! the prefixes used for logging and storage are derived here and
//! nowhere else.

use serde::{Deserialize, Serialize};

use crate::{WorkflowError, WorkflowResult};

/// Unique identifier for a tenant
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(pub String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable identity token attached to every workflow instance.
///
/// Created once at workflow construction, never reassigned, destroyed
/// with the workflow. Tenant-scoped resource access goes through the
/// derived prefixes; no operation accepts a separately supplied tenant
/// string at call time.
#[derive(Clone, Debug, Serialize)]
pub struct TenantContext {
    tenant_id: TenantId,
    log_prefix: String,
    storage_prefix: String,
}

impl TenantContext {
    /// Validate a tenant id and derive the isolation prefixes.
    ///
    /// Fails when the tenant id is empty. No partially constructed
    /// context is observable: either a fully valid value exists or
    /// this returns an error.
    pub fn new(workflow_kind: &str, tenant_id: impl Into<String>) -> WorkflowResult<Self> {
        let tenant_id = tenant_id.into();
        if tenant_id.is_empty() {
            return Err(WorkflowError::Validation(
                "a non-empty tenant id is required to initialize a workflow".to_string(),
            ));
        }

        let log_prefix = format!("{}[{}]", workflow_kind, tenant_id);
        let storage_prefix = format!("tenants/{}/", tenant_id);

        Ok(Self {
            tenant_id: TenantId::new(tenant_id),
            log_prefix,
            storage_prefix,
        })
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// Tag for every log and alert record this workflow emits.
    pub fn log_prefix(&self) -> &str {
        &self.log_prefix
    }

    /// Root of every tenant-scoped storage path.
    pub fn storage_prefix(&self) -> &str {
        &self.storage_prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_tenant_id_rejected() {
        let result = TenantContext::new("Ingestion", "");
        assert!(matches!(result, Err(WorkflowError::Validation(_))));
    }

    #[test]
    fn test_valid_tenant_id_preserved_exactly() {
        let ctx = TenantContext::new("Ingestion", "org_42").unwrap();
        assert_eq!(ctx.tenant_id().as_str(), "org_42");
    }

    #[test]
    fn test_prefixes_derived_from_tenant() {
        let ctx = TenantContext::new("Training", "org_42").unwrap();
        assert_eq!(ctx.log_prefix(), "Training[org_42]");
        assert_eq!(ctx.storage_prefix(), "tenants/org_42/");
    }

    proptest! {
        #[test]
        fn prop_non_empty_tenant_ids_construct(id in ".+") {
            let ctx = TenantContext::new("Inference", id.clone()).unwrap();
            prop_assert_eq!(ctx.tenant_id().as_str(), id.as_str());
            prop_assert!(ctx.log_prefix().contains(id.as_str()));
        }
    }
}
