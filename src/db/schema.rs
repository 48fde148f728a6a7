use crate::errors::{Error, Result};
use rusqlite::Connection;
use tracing::{debug, info, instrument};

/// Creates the three application tables if they do not already exist.
///
/// `spending_targets.user_id` intentionally carries no UNIQUE constraint;
/// the at-most-one-target-per-account invariant is enforced procedurally in
/// [`crate::db::targets::set_spending_target`].
#[instrument(skip(conn))]
pub(crate) fn create_tables(conn: &Connection) -> Result<()> {
    debug!("Executing CREATE TABLE statements if tables do not exist.");
    conn.execute_batch(
        "BEGIN;

        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS expenses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            amount REAL NOT NULL,
            description TEXT NOT NULL,
            category TEXT NOT NULL,
            date TEXT NOT NULL, -- 'YYYY-MM-DD'
            FOREIGN KEY (user_id) REFERENCES users (id)
        );

        CREATE TABLE IF NOT EXISTS spending_targets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            target_amount REAL NOT NULL,
            time_period TEXT, -- declared but unused by any operation
            FOREIGN KEY (user_id) REFERENCES users (id)
        );
        COMMIT;",
    )
    .map_err(|e| Error::StorageUnavailable(format!("Failed to create tables: {}", e)))?;
    info!("Database tables ensured.");
    Ok(())
}
