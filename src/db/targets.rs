use crate::db::DbPool;
use crate::errors::{Error, Result};
use crate::models::ExceededDay;
use rusqlite::{OptionalExtension, params};
use tracing::{debug, info, instrument};

/// Returns the account's spending target amount, or `None` if no target has
/// been set yet.
#[instrument(skip(pool))]
pub async fn get_spending_target(pool: &DbPool, account_id: i64) -> Result<Option<f64>> {
    let conn = pool
        .lock()
        .map_err(|_| Error::Database("Failed to acquire DB lock".to_string()))?;

    let mut stmt =
        conn.prepare_cached("SELECT target_amount FROM spending_targets WHERE user_id = ?1")?;
    let target: Option<f64> = stmt
        .query_row(params![account_id], |row| row.get(0))
        .optional()?;
    debug!("Spending target for account_id {}: {:?}", account_id, target);
    Ok(target)
}

/// Sets or updates the account's single spending target (UPSERT behavior).
///
/// The schema puts no uniqueness constraint on `spending_targets.user_id`,
/// so the at-most-one-row invariant lives here: a probe and the matching
/// UPDATE or INSERT run inside one transaction. A second process writing
/// the same file concurrently could still slip between probe and write;
/// accepted for the single-user design.
///
/// # Errors
///
/// * `Error::InvalidInput` if `amount` is negative.
/// * `Error::Database` if the database lock cannot be acquired or the
///   transaction fails to start or commit.
#[instrument(skip(pool))]
pub async fn set_spending_target(pool: &DbPool, account_id: i64, amount: f64) -> Result<()> {
    if amount < 0.0 {
        return Err(Error::InvalidInput(
            "Spending target must be zero or greater".to_string(),
        ));
    }

    let mut conn = pool
        .lock()
        .map_err(|_| Error::Database("Failed to acquire DB lock for target update".to_string()))?;
    let tx = conn.transaction().map_err(|e| {
        Error::Database(format!("Failed to start transaction for target update: {}", e))
    })?;

    let existing: Option<i64> = {
        let mut stmt_check =
            tx.prepare_cached("SELECT id FROM spending_targets WHERE user_id = ?1")?;
        stmt_check
            .query_row(params![account_id], |row| row.get(0))
            .optional()?
    };

    match existing {
        Some(target_id) => {
            tx.execute(
                "UPDATE spending_targets SET target_amount = ?1 WHERE id = ?2",
                params![amount, target_id],
            )?;
            info!(
                "Updated spending target for account_id {} to {}",
                account_id, amount
            );
        }
        None => {
            tx.execute(
                "INSERT INTO spending_targets (user_id, target_amount, time_period)
                 VALUES (?1, ?2, NULL)",
                params![account_id, amount],
            )?;
            info!(
                "Set initial spending target for account_id {} to {}",
                account_id, amount
            );
        }
    }

    tx.commit().map_err(|e| {
        Error::Database(format!(
            "Failed to commit target update for account_id {}: {}",
            account_id, e
        ))
    })?;
    Ok(())
}

/// Reports every date whose summed expenses exceed the account's spending
/// target, date-ascending, with the positive overrun per day.
///
/// Returns an empty list when no target is set; telling the user they have
/// no target yet is the presentation layer's job.
#[instrument(skip(pool))]
pub async fn list_exceeded_days(pool: &DbPool, account_id: i64) -> Result<Vec<ExceededDay>> {
    let Some(target) = get_spending_target(pool, account_id).await? else {
        return Ok(Vec::new());
    };

    let conn = pool
        .lock()
        .map_err(|_| Error::Database("Failed to acquire DB lock".to_string()))?;

    let mut stmt = conn.prepare_cached(
        "SELECT date, SUM(amount) FROM expenses WHERE user_id = ?1
         GROUP BY date HAVING SUM(amount) > ?2 ORDER BY date",
    )?;
    let rows = stmt.query_map(params![account_id, target], |row| {
        let date: String = row.get(0)?;
        let total: f64 = row.get(1)?;
        Ok((date, total))
    })?;

    let mut days = Vec::new();
    for row in rows {
        let (date, total) =
            row.map_err(|e| Error::Database(format!("Failed to map exceeded day row: {}", e)))?;
        days.push(ExceededDay {
            date,
            total,
            exceeded_by: total - target,
        });
    }
    debug!(
        "Found {} exceeded days for account_id {} against target {}",
        days.len(),
        account_id,
        target
    );
    Ok(days)
}
