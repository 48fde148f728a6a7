use crate::db::DbPool;
use crate::errors::{Error, Result};
use rusqlite::{OptionalExtension, params};
use tracing::{debug, info, instrument};

/// Registers a new account and returns its identifier.
///
/// # Parameters
///
/// * `pool`: The database connection pool.
/// * `username`: The desired username. Matched case-sensitively against
///   existing accounts.
/// * `password`: The password, stored verbatim.
///
/// # Returns
///
/// Returns `Ok(i64)` with the ID of the newly inserted account upon success.
///
/// # Errors
///
/// * `Error::InvalidInput` if either field is empty. The UI performs this
///   check first, but the store is the last line of defense.
/// * `Error::DuplicateUsername` if an account with the exact same username
///   already exists.
/// * `Error::Database` if the database lock cannot be acquired.
#[instrument(skip(pool, password))]
pub async fn register_user(pool: &DbPool, username: &str, password: &str) -> Result<i64> {
    if username.is_empty() || password.is_empty() {
        return Err(Error::InvalidInput(
            "Username and password must both be non-empty".to_string(),
        ));
    }

    let conn = pool
        .lock()
        .map_err(|_| Error::Database("Failed to acquire DB lock".to_string()))?;

    let mut stmt_check = conn.prepare_cached("SELECT id FROM users WHERE username = ?1")?;
    let existing: Option<i64> = stmt_check
        .query_row(params![username], |row| row.get(0))
        .optional()?;
    if existing.is_some() {
        return Err(Error::DuplicateUsername(username.to_string()));
    }

    let mut stmt = conn.prepare_cached("INSERT INTO users (username, password) VALUES (?1, ?2)")?;
    let account_id = stmt.insert(params![username, password])?;
    info!("Registered account_id {} for username '{}'", account_id, username);
    Ok(account_id)
}

/// Verifies credentials and returns the matching account identifier.
///
/// Username and password are compared exactly as stored; there is no
/// hashing and no rate limiting. Hashing is a deliberate product decision
/// left to a future revision, not something this layer changes silently.
///
/// # Errors
///
/// * `Error::InvalidCredentials` if no account matches both fields exactly.
/// * `Error::Database` if the database lock cannot be acquired.
#[instrument(skip(pool, password))]
pub async fn authenticate_user(pool: &DbPool, username: &str, password: &str) -> Result<i64> {
    let conn = pool
        .lock()
        .map_err(|_| Error::Database("Failed to acquire DB lock".to_string()))?;

    let mut stmt =
        conn.prepare_cached("SELECT id FROM users WHERE username = ?1 AND password = ?2")?;
    let account_id: Option<i64> = stmt
        .query_row(params![username, password], |row| row.get(0))
        .optional()?;

    match account_id {
        Some(id) => {
            debug!("Authenticated username '{}' as account_id {}", username, id);
            Ok(id)
        }
        None => Err(Error::InvalidCredentials),
    }
}
