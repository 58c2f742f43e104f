//! B-Mart storefront core.
//!
//! Aggregates a product catalog from the FakeStore and DummyJSON demo APIs
//! (with synthetic fallback data), and provides the cart, account and
//! notification services a storefront view layer needs.
//!
//! [`state::AppState`] wires everything together.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod services;
pub mod sources;
pub mod state;
pub mod storage;
pub mod telemetry;
pub mod types;
