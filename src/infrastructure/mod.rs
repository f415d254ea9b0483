//! # Infrastructure Layer
//!
//! Adapters for everything outside the domain.
//!
//! - [`providers`]: provider channel adapters and their registry
//! - [`pricing`]: pricing catalog for the assessor channel
//! - [`persistence`]: repository ports, event store, in-memory backends

pub mod persistence;
pub mod pricing;
pub mod providers;
