//! # Application Layer
//!
//! Use cases and services coordinating the domain with the infrastructure.
//!
//! - [`services`]: request lifecycle, provider dispatch and recommendation
//! - [`use_cases`]: the end-to-end assessment workflow
//! - [`error`]: application error taxonomy

pub mod error;
pub mod services;
pub mod use_cases;

pub use error::{ApplicationError, ApplicationResult};
