//! Business logic services for the shop.
//!
//! # Services
//!
//! - `auth` - Password login and the TOTP second factor
//! - `orders` - Order tracking lookups
//! - `sessions` - Cache of authenticated sessions
//! - `tokens` - Signed JWTs for every step of the login flow
//! - `totp` - RFC 6238 time-based one-time passwords

pub mod auth;
pub mod orders;
pub mod sessions;
pub mod tokens;
pub mod totp;
