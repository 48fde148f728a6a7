use crate::db::schema::create_tables;
use crate::errors::{Error, Result};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument};

pub type DbPool = Arc<Mutex<Connection>>;

/// Opens the process-wide database connection and ensures the schema exists.
///
/// Safe to call on every process start; the schema statements are
/// idempotent. A path that cannot be opened or written surfaces as
/// [`Error::StorageUnavailable`].
#[instrument]
pub async fn init_db(db_path: &str) -> Result<DbPool> {
    debug!("Initializing database connection to: {}", db_path);
    let conn = Connection::open(db_path).map_err(|e| {
        Error::StorageUnavailable(format!("Failed to open database at {}: {}", db_path, e))
    })?;

    // Enable foreign keys if not enabled by default (good practice)
    conn.execute("PRAGMA foreign_keys = ON;", [])
        .map_err(|e| Error::StorageUnavailable(format!("Failed to enable foreign keys: {}", e)))?;

    info!("Database connection opened. Ensuring tables are created...");
    create_tables(&conn)?;

    Ok(Arc::new(Mutex::new(conn)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::init_test_tracing;

    #[tokio::test]
    async fn test_init_db_in_memory() -> Result<()> {
        init_test_tracing();
        let pool = init_db(":memory:").await?;
        let conn = pool.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
             AND name IN ('users', 'expenses', 'spending_targets')",
            [],
            |row| row.get(0),
        )?;
        assert_eq!(count, 3, "All three tables should exist after init_db");
        Ok(())
    }

    #[tokio::test]
    async fn test_init_db_unwritable_path_is_storage_unavailable() {
        init_test_tracing();
        let result = init_db("/definitely/not/a/writable/dir/mymoney.sqlite").await;
        assert!(matches!(result, Err(Error::StorageUnavailable(_))));
    }
}
