//! # Error Handling
//!
//! Unified error taxonomy for the store. NotFound and Validation are
//! surfaced to the caller for correction; Conflict represents a legitimate
//! race (concurrent activation, duplicate unique key) and is expected to
//! trigger an automatic retry by the caller rather than being masked.

use sea_orm::DbErr;
use thiserror::Error;

/// Errors returned by repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Reference to a nonexistent tenant/scenario/version/catalog entry
    #[error("not found: {0}")]
    NotFound(String),

    /// Unique-constraint violation; the caller should retry the operation
    #[error("conflict: {0}")]
    Conflict(String),

    /// Malformed payload shape
    #[error("validation error: {0}")]
    Validation(String),

    /// Any other database failure
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl RepositoryError {
    /// Wrap a SeaORM error, classifying unique violations as [`Conflict`]
    /// and foreign-key violations as [`NotFound`] so callers never have to
    /// inspect driver error codes themselves.
    ///
    /// [`Conflict`]: RepositoryError::Conflict
    /// [`NotFound`]: RepositoryError::NotFound
    pub fn database_error(error: DbErr) -> Self {
        if is_unique_violation(&error) {
            return RepositoryError::Conflict(error.to_string());
        }
        if is_foreign_key_violation(&error) {
            return RepositoryError::NotFound(format!("referenced row does not exist: {error}"));
        }
        RepositoryError::Database(error)
    }

    pub fn validation_error<S: Into<String>>(message: S) -> Self {
        RepositoryError::Validation(message.into())
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, RepositoryError::Conflict(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound(_))
    }
}

pub(crate) fn is_unique_violation(error: &DbErr) -> bool {
    use sea_orm::RuntimeErr;

    const PG_UNIQUE: &str = "23505";
    const SQLITE_DUPLICATE_CODES: &[&str] = &["1555", "2067"];

    let runtime_err = match error {
        DbErr::Query(RuntimeErr::SqlxError(sqlx_err))
        | DbErr::Exec(RuntimeErr::SqlxError(sqlx_err)) => sqlx_err,
        _ => return false,
    };

    let Some(db_error) = runtime_err.as_database_error() else {
        return false;
    };

    if db_error.is_unique_violation() {
        return true;
    }

    db_error.code().is_some_and(|code| {
        let code_str = code.as_ref();
        code_str == PG_UNIQUE || SQLITE_DUPLICATE_CODES.contains(&code_str)
    })
}

pub(crate) fn is_foreign_key_violation(error: &DbErr) -> bool {
    use sea_orm::RuntimeErr;

    const PG_FOREIGN_KEY: &str = "23503";
    const SQLITE_FOREIGN_KEY_CODES: &[&str] = &["787", "1811"];

    let runtime_err = match error {
        DbErr::Query(RuntimeErr::SqlxError(sqlx_err))
        | DbErr::Exec(RuntimeErr::SqlxError(sqlx_err)) => sqlx_err,
        _ => return false,
    };

    let Some(db_error) = runtime_err.as_database_error() else {
        return false;
    };

    if db_error.is_foreign_key_violation() {
        return true;
    }

    db_error.code().is_some_and(|code| {
        let code_str = code.as_ref();
        code_str == PG_FOREIGN_KEY || SQLITE_FOREIGN_KEY_CODES.contains(&code_str)
    })
}
