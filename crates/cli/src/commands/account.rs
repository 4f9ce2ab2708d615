//! Account management commands.
//!
//! # Usage
//!
//! ```bash
//! favorites-cli account create -n "Ada Lovelace" -e ada@example.com -p 'correct horse'
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string

use favorites_api::db::UserRepository;
use favorites_api::services::auth::AccountService;

use super::{CommandError, connect};

/// Register a new account, with the same validation as `POST /accounts`.
///
/// # Errors
///
/// Returns `CommandError::Account` if validation fails or the email is
/// taken, and `CommandError::Database` if the database is unreachable.
pub async fn create(name: &str, email: &str, password: &str) -> Result<(), CommandError> {
    let pool = connect().await?;

    let user = AccountService::new(UserRepository::new(&pool))
        .register(name, email, password)
        .await?;

    tracing::info!(
        "Account created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(())
}
