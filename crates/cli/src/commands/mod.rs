//! CLI command implementations.

pub mod migrate;
pub mod seed;
pub mod totp;

use secrecy::SecretString;

/// Read the database URL from `PULP_DATABASE_URL`, falling back to
/// `DATABASE_URL`.
///
/// # Errors
///
/// Returns an error if neither variable is set.
pub fn database_url() -> Result<SecretString, &'static str> {
    // Load .env file if present (ignore errors if not found)
    let _ = dotenvy::dotenv();

    std::env::var("PULP_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "PULP_DATABASE_URL not set")
}
