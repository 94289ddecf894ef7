//! TOTP helpers for testing two-factor logins by hand.

use pulp_server::services::totp::{Totp, TotpError, generate_secret};

/// Print a fresh base32 secret.
#[allow(clippy::print_stdout)]
pub fn secret() {
    println!("{}", generate_secret());
}

/// Print the current code for `secret`.
///
/// # Errors
///
/// Returns `TotpError` if the secret is not valid base32 or is too short.
#[allow(clippy::print_stdout)]
pub fn code(secret: &str) -> Result<(), TotpError> {
    println!("{}", Totp::default().current_code(secret)?);
    Ok(())
}
