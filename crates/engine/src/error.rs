//! The module contains the error the engine can throw.
//!
//! Store failures are classified when they cross into the engine (see the
//! `From<DbErr>` impl), so callers can branch on [`EngineError::kind`]:
//!
//! - [`Validation`] bad input or a reference to a row that does not exist.
//! - [`Conflict`] the store aborted the transaction (serialization failure,
//!   deadlock, busy database). Safe to retry.
//! - [`TransientStore`] the store could not be reached or timed out.
//! - [`Rollback`] the unit of work failed *and* the rollback failed too.
//!
//!  [`Validation`]: ErrorKind::Validation
//!  [`Conflict`]: ErrorKind::Conflict
//!  [`TransientStore`]: ErrorKind::TransientStore
//!  [`Rollback`]: ErrorKind::Rollback
use std::time::Duration;

use sea_orm::{DbErr, RuntimeErr, SqlErr};
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid transfer: {0}")]
    InvalidTransfer(String),
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),
    #[error("Constraint violation: {0}")]
    Constraint(String),
    #[error("Transaction conflict: {0}")]
    Conflict(#[source] DbErr),
    #[error("Store unavailable: {0}")]
    TransientStore(#[source] DbErr),
    #[error("{source}; rollback failed: {rollback}")]
    Rollback {
        #[source]
        source: Box<EngineError>,
        rollback: DbErr,
    },
    #[error("Transaction timed out after {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Database(DbErr),
}

/// Coarse classification of an [`EngineError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    TransientStore,
    Rollback,
    Internal,
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::KeyNotFound(_)
            | Self::InvalidAmount(_)
            | Self::InvalidTransfer(_)
            | Self::InvalidCurrency(_)
            | Self::Constraint(_) => ErrorKind::Validation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::TransientStore(_) | Self::Timeout(_) => ErrorKind::TransientStore,
            Self::Rollback { .. } => ErrorKind::Rollback,
            Self::Database(_) => ErrorKind::Internal,
        }
    }

    /// Whether re-running the whole operation may succeed.
    ///
    /// Nothing inside the engine retries; this is a hint for callers.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Conflict(_) | Self::TransientStore(_) | Self::Timeout(_)
        )
    }
}

/// SQLSTATE / SQLite result codes that mean "the store aborted us, try again".
///
/// - `40001` serialization_failure, `40P01` deadlock_detected (PostgreSQL)
/// - `5` SQLITE_BUSY, `6` SQLITE_LOCKED, `261` SQLITE_BUSY_RECOVERY,
///   `517` SQLITE_BUSY_SNAPSHOT
const CONFLICT_CODES: &[&str] = &["40001", "40P01", "5", "6", "261", "517"];

fn database_error_code(err: &DbErr) -> Option<String> {
    let runtime = match err {
        DbErr::Exec(runtime) | DbErr::Query(runtime) | DbErr::Conn(runtime) => runtime,
        _ => return None,
    };
    match runtime {
        RuntimeErr::SqlxError(sea_orm::sqlx::Error::Database(db_err)) => {
            db_err.code().map(|code| code.into_owned())
        }
        _ => None,
    }
}

impl From<DbErr> for EngineError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg))
            | Some(SqlErr::ForeignKeyConstraintViolation(msg)) => return Self::Constraint(msg),
            _ => {}
        }
        if database_error_code(&err).is_some_and(|code| CONFLICT_CODES.contains(&code.as_str())) {
            return Self::Conflict(err);
        }
        match err {
            DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => Self::TransientStore(err),
            other => Self::Database(other),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidTransfer(a), Self::InvalidTransfer(b)) => a == b,
            (Self::InvalidCurrency(a), Self::InvalidCurrency(b)) => a == b,
            (Self::Constraint(a), Self::Constraint(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b))
            | (Self::TransientStore(a), Self::TransientStore(b))
            | (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            (
                Self::Rollback {
                    source: a,
                    rollback: ra,
                },
                Self::Rollback {
                    source: b,
                    rollback: rb,
                },
            ) => a == b && ra.to_string() == rb.to_string(),
            (Self::Timeout(a), Self::Timeout(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::ConnAcquireErr;

    use super::*;

    #[test]
    fn pool_timeout_is_transient() {
        let err = EngineError::from(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout));
        assert_eq!(err.kind(), ErrorKind::TransientStore);
        assert!(err.is_retryable());
    }

    #[test]
    fn record_not_found_is_internal() {
        let err = EngineError::from(DbErr::RecordNotFound("accounts".to_string()));
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(!err.is_retryable());
    }

    #[test]
    fn rollback_keeps_both_errors() {
        let err = EngineError::Rollback {
            source: Box::new(EngineError::InvalidAmount("boom".to_string())),
            rollback: DbErr::Custom("connection reset".to_string()),
        };
        let msg = err.to_string();
        assert!(msg.contains("boom"));
        assert!(msg.contains("connection reset"));
        assert_eq!(err.kind(), ErrorKind::Rollback);
        assert!(!err.is_retryable());
    }

    #[test]
    fn validation_errors_are_not_retryable() {
        let err = EngineError::InvalidTransfer("same account".to_string());
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(!err.is_retryable());
    }
}
