//! Trellis Domain Types
//!
//! Trellis runs every tenant-scoped unit of work inside a common
//! orchestration contract. This crate holds the value types that
//! contract is built from:
//!
//! - **TenantContext**: a validated, immutable tenant binding with
//!   deterministically derived logging and storage prefixes.
//! - **FailureKind / Recoverable**: classification of failures for
//!   recovery decisions, without disturbing the failure's identity.
//! - **RecoveryTier**: the ordered tiers (Retry, Fallback, CircuitBreak,
//!   Alert) that a workflow's failure path may traverse.
//! - **AlertRecord**: the Tier 4 notification handed to alert sinks,
//!   fire-and-forget, never persisted here.
//!
//! # Design Principles
//!
//! 1. Isolation by construction: a workflow cannot exist without a
//!    valid tenant, and every prefix is derived from that tenant.
//! 2. Failures escalate, they never mutate. A wrapper may delay or
//!    classify a failure but must surface the original value.
//! 3. The terminal alert tier is a notification, not a resolution.

#![deny(unsafe_code)]

mod alert;
mod errors;
mod escalation;
mod tenant;

pub use alert::*;
pub use errors::*;
pub use escalation::*;
pub use tenant::*;
