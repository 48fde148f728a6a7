pub mod connection;
pub mod expenses;
pub(crate) mod schema;
pub mod targets;
pub(crate) mod test_utils;
pub mod users;

pub use connection::{DbPool, init_db};
pub use expenses::{
    create_expense, delete_expense, get_category_totals, get_daily_totals, get_total_spending,
    list_expenses, update_expense,
};
pub use targets::{get_spending_target, list_exceeded_days, set_spending_target};
pub use users::{authenticate_user, register_user};
