//! # Domain Layer
//!
//! Core business concepts of the repair quote engine.
//!
//! - [`entities`]: damaged parts, quote requests, quotes and derived results
//! - [`value_objects`]: identifiers, money, enums and the request state machine
//! - [`events`]: quote request lifecycle events
//! - [`services`]: part aggregation and market statistics
//! - [`errors`]: domain error type

pub mod entities;
pub mod errors;
pub mod events;
pub mod services;
pub mod value_objects;
