//! Escalation chain: ordered recovery tiers around one operation
//!
//! Tier 1 (retry) and Tier 4 (alert) are implemented; Tiers 2 and 3
//! are extension points with fixed contracts. Each non-terminal tier
//! either resolves the failure — ending the chain with a result — or
//! forwards it to the next tier. Only Tier 4 is guaranteed terminal,
//! and it notifies without resolving: the failure that reaches it
//! returns to the caller unchanged.

use async_trait::async_trait;
use serde_json::json;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use crate::WorkflowContext;
use trellis_retry::{CancelToken, RetryPolicy};
use trellis_types::{Recoverable, RecoveryTier, WorkflowError};

/// Tier 2 extension point: substitute a degraded-but-valid result
/// when the retry tier surfaces a failure.
#[async_trait]
pub trait FallbackHandler<T>: Send + Sync {
    /// Inspect the surfaced failure and either resolve the chain with
    /// a substitute value or forward by returning `None`. The failure
    /// is observed by reference and cannot be altered.
    async fn fallback(&self, failure: &WorkflowError) -> Option<T>;
}

/// Tier 3 extension point: shed load from a failing dependency across
/// chain invocations.
///
/// The gate is consulted once per invocation, before any attempt, and
/// the aggregated outcome of the invocation is recorded once — the
/// breaker's state is independent of the retry tier's budget.
pub trait CircuitBreak: Send + Sync {
    /// Whether this invocation may proceed at all.
    fn permit(&self) -> bool;

    /// Record one invocation that resolved.
    fn record_success(&self);

    /// Record one invocation whose dependency surfaced a failure.
    fn record_failure(&self);
}

/// Composition of the recovery tiers around a single operation.
///
/// Order: circuit gate → retry loop → fallback → critical alert.
pub struct EscalationChain<T> {
    retry: RetryPolicy,
    fallback: Option<Arc<dyn FallbackHandler<T>>>,
    breaker: Option<Arc<dyn CircuitBreak>>,
}

impl<T> EscalationChain<T> {
    pub fn new(retry: RetryPolicy) -> Self {
        Self {
            retry,
            fallback: None,
            breaker: None,
        }
    }

    pub fn with_fallback(mut self, handler: Arc<dyn FallbackHandler<T>>) -> Self {
        self.fallback = Some(handler);
        self
    }

    pub fn with_circuit_break(mut self, breaker: Arc<dyn CircuitBreak>) -> Self {
        self.breaker = Some(breaker);
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Run one operation through the chain.
    pub async fn run<F, Fut>(
        &self,
        ctx: &WorkflowContext,
        op_name: &str,
        op: F,
    ) -> Result<T, WorkflowError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, WorkflowError>>,
    {
        self.run_with_cancel(ctx, op_name, &CancelToken::new(), op)
            .await
    }

    /// Run one operation through the chain with a cancellation signal
    /// threaded into the retry tier's backoff waits.
    pub async fn run_with_cancel<F, Fut>(
        &self,
        ctx: &WorkflowContext,
        op_name: &str,
        cancel: &CancelToken,
        op: F,
    ) -> Result<T, WorkflowError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, WorkflowError>>,
    {
        if let Some(breaker) = &self.breaker {
            if !breaker.permit() {
                tracing::warn!(
                    prefix = %ctx.log_prefix(),
                    operation = op_name,
                    tier = %RecoveryTier::CircuitBreak,
                    "invocation suppressed by open circuit"
                );
                return Err(WorkflowError::CircuitOpen(op_name.to_string()));
            }
        }

        let failure = match self.retry.run_with_cancel(op_name, cancel, op).await {
            Ok(value) => {
                if let Some(breaker) = &self.breaker {
                    breaker.record_success();
                }
                return Ok(value);
            }
            Err(failure) => failure,
        };

        // The dependency did fail, whatever the chain resolves to.
        if let Some(breaker) = &self.breaker {
            breaker.record_failure();
        }

        if let Some(handler) = &self.fallback {
            if let Some(substitute) = handler.fallback(&failure).await {
                tracing::warn!(
                    prefix = %ctx.log_prefix(),
                    operation = op_name,
                    tier = %RecoveryTier::Fallback,
                    failure = %failure,
                    "resolved with degraded substitute"
                );
                return Ok(substitute);
            }
        }

        let mut context = BTreeMap::new();
        context.insert("operation".to_string(), json!(op_name));
        context.insert("failure_kind".to_string(), json!(failure.kind()));
        ctx.alert_critical(
            &format!("operation '{op_name}' failed beyond recovery: {failure}"),
            context,
        )
        .await;

        Err(failure)
    }
}
