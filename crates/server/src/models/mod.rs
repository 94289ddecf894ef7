//! Domain models for the shop.
//!
//! These are validated domain types, separate from database row types.

pub mod order;
pub mod session;
pub mod user;

pub use order::{Order, OrderLine, TrackedOrder};
pub use session::SessionUser;
pub use user::{Basket, NewUser, User};
