use thiserror::Error;

/// Unified error type for the persistence core.
///
/// The first five variants are the distinguishable error kinds the
/// presentation layer turns into user-facing messages; the remainder cover
/// infrastructure failures (configuration, lock acquisition, raw SQLite
/// errors) that are surfaced as-is.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Username '{0}' is already taken")]
    DuplicateUsername(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("No {entity} with id {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Database error: {0}")]
    Database(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
