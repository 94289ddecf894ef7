//! Seed the database with users and orders from YAML.
//!
//! Existing emails and order numbers are skipped, so the command can be run
//! repeatedly.

use std::path::Path;

use tracing::info;

use pulp_server::config::DEFAULT_DOMAIN;
use pulp_server::db::{self, PgStore, seed};

/// Seed from `users.yml` and `orders.yml` in `dir`.
///
/// The application domain comes from `PULP_DOMAIN`.
///
/// # Errors
///
/// Returns an error if environment variables are missing, a file cannot be
/// read, or database operations fail.
pub async fn run(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;
    let domain = std::env::var("PULP_DOMAIN").unwrap_or_else(|_| DEFAULT_DOMAIN.to_owned());

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let store = PgStore::new(pool);
    let result = seed::seed_from_dir(&store, dir, &domain).await?;

    info!("Seeding complete!");
    info!("  Inserted: {}", result.inserted);
    info!("  Skipped (already exist): {}", result.skipped);
    Ok(())
}
