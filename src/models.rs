use serde::{Deserialize, Serialize};

// Based on the "users" table
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Account {
    pub id: i64, // Primary Key, typically INTEGER
    pub username: String,
    // Stored and compared verbatim; see the note on `authenticate_user`.
    pub password: String,
}

// Based on the "expenses" table
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Expense {
    pub id: i64,
    pub user_id: i64,
    pub amount: f64, // REAL; may be negative (refunds)
    pub description: String,
    pub category: String, // free-form TEXT; the UI offers a fixed list
    pub date: String,     // TEXT, "YYYY-MM-DD"
}

// Based on the "spending_targets" table
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SpendingTarget {
    pub id: i64,
    pub user_id: i64,
    pub target_amount: f64,
    // Declared in the schema but consumed by no operation; always NULL.
    pub time_period: Option<String>,
}

/// One day's summed spending, for the daily-trend line chart and the
/// exceeded-target report.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DailyTotal {
    pub date: String,
    pub total: f64,
}

/// One category's summed spending, for the category pie chart.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// A date whose summed expenses surpass the account's spending target.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExceededDay {
    pub date: String,
    pub total: f64,
    pub exceeded_by: f64,
}

/// Date filter applied when listing expenses.
///
/// Month and year components match on the corresponding substring of the
/// stored `YYYY-MM-DD` date, mirroring the month/year dropdowns in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseFilter {
    All,
    Year(i32),
    Month(u32),
    YearMonth(i32, u32),
}
