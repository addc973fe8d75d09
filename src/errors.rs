//! # Error Handling
//!
//! Failures in this crate come from the underlying data store: either a
//! terminal operation failed to execute, or a table's column listing could
//! not be introspected. Everything else in the engine is deliberately
//! permissive (unknown operators pass through, unmatched scopes are ignored,
//! blank values are skipped) and never produces an error; see the module
//! docs on [`crate::filters`] and [`crate::scopes`].
//!
//! Internal details are logged through `tracing` at the point of conversion
//! so callers can surface a sanitized message without losing diagnostics.

use sea_orm::DbErr;
use std::fmt;

/// Error type for query execution and schema introspection.
#[derive(Debug)]
pub enum SieveError {
    /// The data store rejected or failed a query.
    Database(DbErr),

    /// The column listing for a table could not be fetched.
    Schema {
        /// Physical table name whose columns were requested.
        table: String,
        /// Underlying driver error.
        source: DbErr,
    },
}

impl SieveError {
    /// Wrap a database error, logging the internal details.
    pub(crate) fn database(err: DbErr) -> Self {
        tracing::error!(error = %err, "database operation failed");
        Self::Database(err)
    }

    /// Wrap a schema-introspection failure for `table`.
    pub(crate) fn schema(table: impl Into<String>, err: DbErr) -> Self {
        let table = table.into();
        tracing::error!(table = %table, error = %err, "column listing failed");
        Self::Schema { table, source: err }
    }
}

impl fmt::Display for SieveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database(err) => write!(f, "database operation failed: {err}"),
            Self::Schema { table, source } => {
                write!(f, "could not list columns of table '{table}': {source}")
            }
        }
    }
}

impl std::error::Error for SieveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(err) | Self::Schema { source: err, .. } => Some(err),
        }
    }
}

impl From<DbErr> for SieveError {
    fn from(err: DbErr) -> Self {
        Self::database(err)
    }
}
