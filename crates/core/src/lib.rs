//! Pulp Shop Core - Shared types library.
//!
//! This crate provides the domain types used across all Pulp Shop components:
//! - `server` - HTTP API and tracking pages
//! - `cli` - Migrations, seeding and TOTP helpers
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP. Database encodings are available behind the
//! `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, and delivery status

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
