use crate::db::DbPool;
use crate::errors::{Error, Result};
use crate::models::{CategoryTotal, DailyTotal, Expense, ExpenseFilter};
use chrono::NaiveDate;
use rusqlite::{Row, params};
use tracing::{debug, info, instrument};

const SELECT_EXPENSE: &str =
    "SELECT id, user_id, amount, description, category, date FROM expenses WHERE user_id = ?1";

fn expense_from_row(row: &Row<'_>) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: row.get(0)?,
        user_id: row.get(1)?,
        amount: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        date: row.get(5)?,
    })
}

/// Creates a new expense record in the database.
///
/// # Parameters
///
/// * `pool`: The database connection pool.
/// * `account_id`: The account that owns this expense.
/// * `amount`: The monetary value, already parsed by the caller. May be
///   negative; no range is enforced.
/// * `description`: A textual description of the expense.
/// * `category`: A display category. The UI offers a fixed list but the
///   store accepts any string.
/// * `date`: The expense date as a `YYYY-MM-DD` string. Inserts take the
///   string as given (the UI's date picker produces it); only edits
///   re-validate, matching the recorded behavior.
///
/// # Returns
///
/// Returns `Ok(i64)` with the ID of the newly inserted expense upon success.
///
/// # Errors
///
/// Returns `Error::Database` if there's an issue acquiring the database lock
/// or executing the insert statement.
#[instrument(skip(pool, description))]
pub async fn create_expense(
    pool: &DbPool,
    account_id: i64,
    amount: f64,
    description: &str,
    category: &str,
    date: &str,
) -> Result<i64> {
    let conn = pool
        .lock()
        .map_err(|_| Error::Database("Failed to acquire DB lock".to_string()))?;

    let mut stmt = conn.prepare_cached(
        "INSERT INTO expenses (user_id, amount, description, category, date)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    let expense_id = stmt.insert(params![account_id, amount, description, category, date])?;
    info!(
        "Created expense_id {} for account_id {}: category='{}', amount={}, date={}",
        expense_id, account_id, category, amount, date
    );
    Ok(expense_id)
}

/// Lists an account's expenses, optionally narrowed by year and/or month.
///
/// Filtering matches on the corresponding `strftime` component of the
/// stored date string. Rows come back in insertion (rowid) order; callers
/// that need chronological order sort on the date field.
#[instrument(skip(pool))]
pub async fn list_expenses(
    pool: &DbPool,
    account_id: i64,
    filter: ExpenseFilter,
) -> Result<Vec<Expense>> {
    let conn = pool
        .lock()
        .map_err(|_| Error::Database("Failed to acquire DB lock".to_string()))?;

    let (sql, date_key) = match filter {
        ExpenseFilter::All => (SELECT_EXPENSE.to_string(), None),
        ExpenseFilter::Year(year) => (
            format!("{SELECT_EXPENSE} AND strftime('%Y', date) = ?2"),
            Some(format!("{year:04}")),
        ),
        ExpenseFilter::Month(month) => (
            format!("{SELECT_EXPENSE} AND strftime('%m', date) = ?2"),
            Some(format!("{month:02}")),
        ),
        ExpenseFilter::YearMonth(year, month) => (
            format!("{SELECT_EXPENSE} AND strftime('%Y-%m', date) = ?2"),
            Some(format!("{year:04}-{month:02}")),
        ),
    };

    let mut stmt = conn.prepare_cached(&sql)?;
    let mut expenses = Vec::new();
    match date_key {
        None => {
            let rows = stmt.query_map(params![account_id], expense_from_row)?;
            for expense in rows {
                expenses.push(expense.map_err(|e| {
                    Error::Database(format!("Failed to map expense row: {}", e))
                })?);
            }
        }
        Some(key) => {
            let rows = stmt.query_map(params![account_id, key], expense_from_row)?;
            for expense in rows {
                expenses.push(expense.map_err(|e| {
                    Error::Database(format!("Failed to map expense row: {}", e))
                })?);
            }
        }
    }

    debug!(
        "Fetched {} expenses for account_id {} with filter {:?}",
        expenses.len(),
        account_id,
        filter
    );
    Ok(expenses)
}

/// Replaces all four editable fields of an expense by identifier.
///
/// # Errors
///
/// * `Error::InvalidInput` if `date` does not parse as a calendar
///   `YYYY-MM-DD` date.
/// * `Error::NotFound` if no expense with `expense_id` exists; no row is
///   changed in that case.
/// * `Error::Database` if the database lock cannot be acquired.
#[instrument(skip(pool, description))]
pub async fn update_expense(
    pool: &DbPool,
    expense_id: i64,
    amount: f64,
    description: &str,
    category: &str,
    date: &str,
) -> Result<()> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
        Error::InvalidInput(format!("Date '{}' is not a valid YYYY-MM-DD date", date))
    })?;

    let conn = pool
        .lock()
        .map_err(|_| Error::Database("Failed to acquire DB lock".to_string()))?;

    let rows_updated = conn.execute(
        "UPDATE expenses SET amount = ?1, description = ?2, category = ?3, date = ?4
         WHERE id = ?5",
        params![amount, description, category, date, expense_id],
    )?;
    if rows_updated == 0 {
        return Err(Error::NotFound {
            entity: "expense",
            id: expense_id,
        });
    }
    info!("Updated expense_id {}: amount={}, date={}", expense_id, amount, date);
    Ok(())
}

/// Deletes an expense by identifier.
///
/// User confirmation happens in the presentation layer before this is
/// called; the store deletes unconditionally.
///
/// # Errors
///
/// * `Error::NotFound` if no expense with `expense_id` exists.
/// * `Error::Database` if the database lock cannot be acquired.
#[instrument(skip(pool))]
pub async fn delete_expense(pool: &DbPool, expense_id: i64) -> Result<()> {
    let conn = pool
        .lock()
        .map_err(|_| Error::Database("Failed to acquire DB lock".to_string()))?;

    let rows_deleted = conn.execute("DELETE FROM expenses WHERE id = ?1", params![expense_id])?;
    if rows_deleted == 0 {
        return Err(Error::NotFound {
            entity: "expense",
            id: expense_id,
        });
    }
    info!("Deleted expense_id {}", expense_id);
    Ok(())
}

/// Sums an account's expenses per day, date-ascending.
///
/// Feeds both the daily-trend line chart and the exceeded-target report.
#[instrument(skip(pool))]
pub async fn get_daily_totals(pool: &DbPool, account_id: i64) -> Result<Vec<DailyTotal>> {
    let conn = pool
        .lock()
        .map_err(|_| Error::Database("Failed to acquire DB lock".to_string()))?;

    let mut stmt = conn.prepare_cached(
        "SELECT date, SUM(amount) FROM expenses WHERE user_id = ?1
         GROUP BY date ORDER BY date",
    )?;
    let rows = stmt.query_map(params![account_id], |row| {
        Ok(DailyTotal {
            date: row.get(0)?,
            total: row.get(1)?,
        })
    })?;

    let mut totals = Vec::new();
    for total in rows {
        totals.push(
            total.map_err(|e| Error::Database(format!("Failed to map daily total row: {}", e)))?,
        );
    }
    debug!("Computed {} daily totals for account_id {}", totals.len(), account_id);
    Ok(totals)
}

/// Sums an account's expenses per category, for the category pie chart.
#[instrument(skip(pool))]
pub async fn get_category_totals(pool: &DbPool, account_id: i64) -> Result<Vec<CategoryTotal>> {
    let conn = pool
        .lock()
        .map_err(|_| Error::Database("Failed to acquire DB lock".to_string()))?;

    let mut stmt = conn.prepare_cached(
        "SELECT category, SUM(amount) FROM expenses WHERE user_id = ?1
         GROUP BY category ORDER BY category",
    )?;
    let rows = stmt.query_map(params![account_id], |row| {
        Ok(CategoryTotal {
            category: row.get(0)?,
            total: row.get(1)?,
        })
    })?;

    let mut totals = Vec::new();
    for total in rows {
        totals.push(total.map_err(|e| {
            Error::Database(format!("Failed to map category total row: {}", e))
        })?);
    }
    Ok(totals)
}

/// Returns the sum of all of an account's expenses, or 0.0 if it has none.
#[instrument(skip(pool))]
pub async fn get_total_spending(pool: &DbPool, account_id: i64) -> Result<f64> {
    let conn = pool
        .lock()
        .map_err(|_| Error::Database("Failed to acquire DB lock".to_string()))?;

    let mut stmt = conn
        .prepare_cached("SELECT COALESCE(SUM(amount), 0.0) FROM expenses WHERE user_id = ?1")?;
    let total: f64 = stmt.query_row(params![account_id], |row| row.get(0))?;

    debug!("Total spending for account_id {}: ${:.2}", account_id, total);
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_utils::{
        DirectInsertExpenseArgs, direct_insert_expense, direct_insert_user,
        get_expense_by_id_for_test, init_test_tracing, setup_test_db,
    };

    #[tokio::test]
    async fn test_create_then_list_and_sum() -> Result<()> {
        init_test_tracing();
        let db_pool = setup_test_db()?;
        let account_id = {
            let conn = db_pool.lock().unwrap();
            direct_insert_user(&conn, "spender", "pw")?
        };

        let before = get_total_spending(&db_pool, account_id).await?;
        let expense_id =
            create_expense(&db_pool, account_id, 50.0, "lunch", "Food", "2024-03-01").await?;
        assert!(expense_id > 0, "Expense ID should be positive");

        let expenses = list_expenses(&db_pool, account_id, ExpenseFilter::All).await?;
        assert_eq!(expenses.len(), 1);
        let expense = &expenses[0];
        assert_eq!(expense.id, expense_id);
        assert_eq!(expense.amount, 50.0);
        assert_eq!(expense.description, "lunch");
        assert_eq!(expense.category, "Food");
        assert_eq!(expense.date, "2024-03-01");

        let after = get_total_spending(&db_pool, account_id).await?;
        assert_eq!(after - before, 50.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_filters_by_month_year_and_both() -> Result<()> {
        init_test_tracing();
        let db_pool = setup_test_db()?;
        let account_id;
        {
            let conn = db_pool.lock().unwrap();
            account_id = direct_insert_user(&conn, "filterer", "pw")?;
            for (amount, description, date) in [
                (10.0, "jan_2023", "2023-01-15"),
                (20.0, "jan_2024", "2024-01-05"),
                (30.0, "feb_2024", "2024-02-10"),
                (40.0, "mar_2024", "2024-03-20"),
            ] {
                direct_insert_expense(&DirectInsertExpenseArgs {
                    conn: &conn,
                    user_id: account_id,
                    amount,
                    description,
                    category: "Other",
                    date,
                })?;
            }
        }

        let january = list_expenses(&db_pool, account_id, ExpenseFilter::Month(1)).await?;
        assert_eq!(january.len(), 2);
        assert!(january.iter().all(|e| &e.date[5..7] == "01"));

        let year_2024 = list_expenses(&db_pool, account_id, ExpenseFilter::Year(2024)).await?;
        assert_eq!(year_2024.len(), 3);

        let jan_2024 =
            list_expenses(&db_pool, account_id, ExpenseFilter::YearMonth(2024, 1)).await?;
        assert_eq!(jan_2024.len(), 1);
        assert_eq!(jan_2024[0].description, "jan_2024");

        let all = list_expenses(&db_pool, account_id, ExpenseFilter::All).await?;
        assert_eq!(all.len(), 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_account() -> Result<()> {
        init_test_tracing();
        let db_pool = setup_test_db()?;
        let (mine, theirs);
        {
            let conn = db_pool.lock().unwrap();
            mine = direct_insert_user(&conn, "mine", "pw")?;
            theirs = direct_insert_user(&conn, "theirs", "pw")?;
            direct_insert_expense(&DirectInsertExpenseArgs {
                conn: &conn,
                user_id: theirs,
                amount: 99.0,
                description: "not_yours",
                category: "Other",
                date: "2024-01-01",
            })?;
        }

        let expenses = list_expenses(&db_pool, mine, ExpenseFilter::All).await?;
        assert!(expenses.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_replaces_all_fields() -> Result<()> {
        init_test_tracing();
        let db_pool = setup_test_db()?;
        let expense_id;
        {
            let conn = db_pool.lock().unwrap();
            let account_id = direct_insert_user(&conn, "editor", "pw")?;
            expense_id = direct_insert_expense(&DirectInsertExpenseArgs {
                conn: &conn,
                user_id: account_id,
                amount: 5.0,
                description: "coffee",
                category: "Food",
                date: "2024-04-01",
            })?;
        }

        update_expense(&db_pool, expense_id, 7.5, "coffee and cake", "Other", "2024-04-02")
            .await?;

        let conn = db_pool.lock().unwrap();
        let updated = get_expense_by_id_for_test(&conn, expense_id)?.expect("Expense not found");
        assert_eq!(updated.amount, 7.5);
        assert_eq!(updated.description, "coffee and cake");
        assert_eq!(updated.category, "Other");
        assert_eq!(updated.date, "2024-04-02");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_rejects_malformed_date() -> Result<()> {
        init_test_tracing();
        let db_pool = setup_test_db()?;
        let expense_id;
        {
            let conn = db_pool.lock().unwrap();
            let account_id = direct_insert_user(&conn, "strict", "pw")?;
            expense_id = direct_insert_expense(&DirectInsertExpenseArgs {
                conn: &conn,
                user_id: account_id,
                amount: 1.0,
                description: "x",
                category: "Other",
                date: "2024-05-01",
            })?;
        }

        for bad_date in ["05/01/2024", "2024-13-01", "2024-02-30", "not a date"] {
            let result = update_expense(&db_pool, expense_id, 1.0, "x", "Other", bad_date).await;
            assert!(
                matches!(result, Err(Error::InvalidInput(_))),
                "Date '{}' should be rejected",
                bad_date
            );
        }

        // The stored row must be untouched after the rejected edits.
        let conn = db_pool.lock().unwrap();
        let stored = get_expense_by_id_for_test(&conn, expense_id)?.expect("Expense not found");
        assert_eq!(stored.date, "2024-05-01");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_id_not_found() -> Result<()> {
        init_test_tracing();
        let db_pool = setup_test_db()?;

        let update = update_expense(&db_pool, 9999, 1.0, "ghost", "Other", "2024-01-01").await;
        assert!(matches!(
            update,
            Err(Error::NotFound { entity: "expense", id: 9999 })
        ));

        let delete = delete_expense(&db_pool, 9999).await;
        assert!(matches!(
            delete,
            Err(Error::NotFound { entity: "expense", id: 9999 })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_removes_row() -> Result<()> {
        init_test_tracing();
        let db_pool = setup_test_db()?;
        let expense_id;
        {
            let conn = db_pool.lock().unwrap();
            let account_id = direct_insert_user(&conn, "deleter", "pw")?;
            expense_id = direct_insert_expense(&DirectInsertExpenseArgs {
                conn: &conn,
                user_id: account_id,
                amount: 12.0,
                description: "gone",
                category: "Other",
                date: "2024-06-01",
            })?;
        }

        delete_expense(&db_pool, expense_id).await?;

        let conn = db_pool.lock().unwrap();
        assert!(get_expense_by_id_for_test(&conn, expense_id)?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_daily_totals_group_and_order() -> Result<()> {
        init_test_tracing();
        let db_pool = setup_test_db()?;
        let account_id;
        {
            let conn = db_pool.lock().unwrap();
            account_id = direct_insert_user(&conn, "daily", "pw")?;
            for (amount, date) in [
                (70.0, "2024-01-05"),
                (50.0, "2024-01-05"),
                (15.0, "2024-01-02"),
            ] {
                direct_insert_expense(&DirectInsertExpenseArgs {
                    conn: &conn,
                    user_id: account_id,
                    amount,
                    description: "day",
                    category: "Other",
                    date,
                })?;
            }
        }

        let totals = get_daily_totals(&db_pool, account_id).await?;
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].date, "2024-01-02");
        assert_eq!(totals[0].total, 15.0);
        assert_eq!(totals[1].date, "2024-01-05");
        assert_eq!(totals[1].total, 120.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_category_totals() -> Result<()> {
        init_test_tracing();
        let db_pool = setup_test_db()?;
        let account_id;
        {
            let conn = db_pool.lock().unwrap();
            account_id = direct_insert_user(&conn, "pie", "pw")?;
            for (amount, category) in [(10.0, "Food"), (5.5, "Food"), (20.0, "Transportation")] {
                direct_insert_expense(&DirectInsertExpenseArgs {
                    conn: &conn,
                    user_id: account_id,
                    amount,
                    description: "slice",
                    category,
                    date: "2024-07-01",
                })?;
            }
        }

        let totals = get_category_totals(&db_pool, account_id).await?;
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].category, "Food");
        assert_eq!(totals[0].total, 15.5);
        assert_eq!(totals[1].category, "Transportation");
        assert_eq!(totals[1].total, 20.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_total_spending_empty_account_is_zero() -> Result<()> {
        init_test_tracing();
        let db_pool = setup_test_db()?;
        let account_id = {
            let conn = db_pool.lock().unwrap();
            direct_insert_user(&conn, "empty", "pw")?
        };

        let total = get_total_spending(&db_pool, account_id).await?;
        assert_eq!(total, 0.0);
        Ok(())
    }
}
