//! Admin flag management.
//!
//! There is no separate admin account table; admins are regular users with
//! `is_admin` set. The flag takes effect on the user's next token refresh
//! or login.

use tracing::info;

use hearthside_core::Email;

use super::{CommandError, connect};

/// Set or clear the admin flag on an existing user.
///
/// # Errors
///
/// Returns an error for a malformed email or if no user has that email.
pub async fn set_flag(email: &str, is_admin: bool) -> Result<(), CommandError> {
    let email = Email::parse(email).map_err(|e| CommandError::InvalidInput(e.to_string()))?;

    let pool = connect().await?;

    let result = sqlx::query("UPDATE users SET is_admin = $2, updated_at = NOW() WHERE email = $1")
        .bind(email.as_str())
        .bind(is_admin)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(CommandError::InvalidInput(format!(
            "no user with email {email}"
        )));
    }

    info!(email = %email, is_admin, "admin flag updated");
    Ok(())
}
