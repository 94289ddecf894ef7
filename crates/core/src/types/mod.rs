//! Core types for Pulp Shop.

pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use email::{Email, EmailError, obfuscate_vowels};
pub use id::*;
pub use price::Price;
pub use status::DeliveryStatus;
