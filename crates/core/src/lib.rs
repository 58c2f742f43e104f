//! B-Mart Core - Shared types library.
//!
//! This crate provides common types used across all B-Mart components:
//! - `storefront` - Catalog aggregation, cart and account stores
//! - `integration-tests` - End-to-end tests against mocked upstream sources
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for provenance-tagged IDs, prices, emails and phones

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
