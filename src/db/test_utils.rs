#![allow(dead_code)]
use crate::db::{DbPool, schema};
use crate::errors::{Error, Result};
use crate::models::Expense;
use rusqlite::Connection;
use rusqlite::{OptionalExtension, params};
use std::sync::Arc;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub(crate) fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace")),
        )
        .with_test_writer() // Crucial for `cargo test` output
        .try_init(); // Use try_init to avoid panic if already initialized
}

// Helper to create an in-memory DbPool for testing.
// Sets up the schema as well, matching what init_db does for a real path.
pub(crate) fn setup_test_db() -> Result<DbPool> {
    let conn = Connection::open_in_memory()
        .map_err(|e| Error::Database(format!("Test DB: Failed to open in-memory: {}", e)))?;
    schema::create_tables(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

// Inserts a user directly, bypassing register_user, for focused tests.
pub(crate) fn direct_insert_user(conn: &Connection, username: &str, password: &str) -> Result<i64> {
    let mut stmt =
        conn.prepare_cached("INSERT INTO users (username, password) VALUES (?1, ?2)")?;
    let id = stmt.insert(params![username, password])?;
    Ok(id)
}

pub(crate) struct DirectInsertExpenseArgs<'a> {
    pub(crate) conn: &'a Connection,
    pub(crate) user_id: i64,
    pub(crate) amount: f64,
    pub(crate) description: &'a str,
    pub(crate) category: &'a str,
    pub(crate) date: &'a str,
}

// Simplified expense insert for test setup, not using create_expense.
pub(crate) fn direct_insert_expense(args: &DirectInsertExpenseArgs<'_>) -> Result<i64> {
    let mut stmt = args.conn.prepare_cached(
        "INSERT INTO expenses (user_id, amount, description, category, date)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    let id = stmt.insert(params![
        args.user_id,
        args.amount,
        args.description,
        args.category,
        args.date
    ])?;
    Ok(id)
}

// Fetches any expense by id for test verification.
pub(crate) fn get_expense_by_id_for_test(conn: &Connection, id: i64) -> Result<Option<Expense>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, user_id, amount, description, category, date FROM expenses WHERE id = ?1",
    )?;
    stmt.query_row(params![id], |row| {
        Ok(Expense {
            id: row.get(0)?,
            user_id: row.get(1)?,
            amount: row.get(2)?,
            description: row.get(3)?,
            category: row.get(4)?,
            date: row.get(5)?,
        })
    })
    .optional()
    .map_err(Error::from)
}

// Raw row count of spending_targets for an account; used to verify the
// at-most-one-row invariant directly against storage.
pub(crate) fn count_targets_for_test(conn: &Connection, user_id: i64) -> Result<i64> {
    let mut stmt =
        conn.prepare_cached("SELECT COUNT(*) FROM spending_targets WHERE user_id = ?1")?;
    let count: i64 = stmt.query_row(params![user_id], |row| row.get(0))?;
    Ok(count)
}

pub(crate) fn count_users_for_test(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    Ok(count)
}
