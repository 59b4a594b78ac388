//! Trellis Config — process-wide infrastructure settings
//!
//! System-wide infrastructure (database, object store, cache, tracking
//! server) is configured here; tenant-scoped credentials are not —
//! those are fetched through tenant-aware collaborators so one
//! tenant's secrets can never leak into another's workflow.
//!
//! Settings are constructed once at process start with
//! [`Settings::from_env`] and passed by reference into the components
//! that need them. There is no implicit global lookup.

#![deny(unsafe_code)]

mod settings;

pub use settings::*;
