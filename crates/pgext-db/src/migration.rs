use std::error::Error;

use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub const CATALOG_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/catalog");

pub fn apply_migrations(
    conn: &mut SqliteConnection,
) -> Result<(), Box<dyn Error + Send + Sync + 'static>> {
    conn.run_pending_migrations(CATALOG_MIGRATIONS)?;
    Ok(())
}
