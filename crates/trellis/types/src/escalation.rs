//! Recovery tier vocabulary
//!
//! Escalation in Trellis is explicit — there is no silent failure.
//! When an operation fails, its workflow walks an ordered tier list:
//! retry locally, substitute a degraded result, shed load from the
//! failing dependency, and finally alert. Each non-terminal tier
//! either resolves the failure or forwards it; only the alert tier is
//! guaranteed terminal.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The ordered tiers of the recovery hierarchy
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryTier {
    /// Tier 1: re-execute locally with exponential backoff
    Retry,

    /// Tier 2: substitute a degraded-but-valid result
    Fallback,

    /// Tier 3: suppress further attempts across calls for a cooldown
    CircuitBreak,

    /// Tier 4: terminal, non-throwing notification
    Alert,
}

impl RecoveryTier {
    pub fn level(&self) -> u8 {
        match self {
            RecoveryTier::Retry => 1,
            RecoveryTier::Fallback => 2,
            RecoveryTier::CircuitBreak => 3,
            RecoveryTier::Alert => 4,
        }
    }

    /// The tier a failure is forwarded to when this one cannot resolve it
    pub fn next(&self) -> Option<RecoveryTier> {
        match self {
            RecoveryTier::Retry => Some(RecoveryTier::Fallback),
            RecoveryTier::Fallback => Some(RecoveryTier::CircuitBreak),
            RecoveryTier::CircuitBreak => Some(RecoveryTier::Alert),
            RecoveryTier::Alert => None,
        }
    }

    /// Only the alert tier swallows what reaches it
    pub fn is_terminal(&self) -> bool {
        matches!(self, RecoveryTier::Alert)
    }
}

impl std::fmt::Display for RecoveryTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "L{}", self.level())
    }
}

/// Circuit breaker thresholds (Tier 3 extension point configuration)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures to open the circuit
    pub failure_threshold: u32,

    /// Successes in half-open to close the circuit
    pub success_threshold: u32,

    /// Time to wait before transitioning from open to half-open
    pub reset_timeout: Duration,

    /// Maximum probe requests allowed in half-open state
    pub half_open_max_requests: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 3,
            reset_timeout: Duration::from_secs(30),
            half_open_max_requests: 3,
        }
    }
}
