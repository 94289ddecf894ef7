//! Pulp Shop server library.
//!
//! The HTTP server for the shop's authentication and order-tracking slice,
//! built as a library so the router can be driven in-process by tests and
//! reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod challenges;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
