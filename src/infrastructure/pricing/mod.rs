//! # Pricing
//!
//! Pricing data consumed by the assessor channel.

pub mod catalog;

pub use catalog::{CatalogEntry, CatalogError, CatalogPrice, PriceSource, PricingCatalog};
