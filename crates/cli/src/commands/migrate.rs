//! Database migration command.
//!
//! Migration files live in `crates/api/migrations/` and are embedded into
//! the binary at compile time, so `hearthside migrate` works from any
//! working directory.

use tracing::info;

use super::{CommandError, connect};

/// Run pending database migrations.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is unset or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    info!("Connecting to database...");
    let pool = connect().await?;

    info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    info!("Migrations complete");
    Ok(())
}
