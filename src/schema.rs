//! Schema introspection.
//!
//! Column-name disambiguation needs to know which columns each table in a
//! query declares. That knowledge comes from a [`SchemaProvider`], an
//! injectable service rather than ambient global state, so callers decide
//! the cache lifetime:
//!
//! - [`DbSchemaProvider`] lists columns straight from the connected
//!   database, per backend.
//! - [`CachedSchemaProvider`] wraps any provider with a table-name-keyed
//!   cache and never invalidates it: schema is assumed static while the
//!   process runs. Share one instance via `Arc` for the process lifetime;
//!   a schema migration requires a fresh provider (or a restart).
//! - [`StaticSchemaProvider`] serves a fixed mapping, for tests and offline
//!   wiring.

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};
use std::collections::HashMap;
use std::sync::RwLock;

use crate::errors::SieveError;

/// Source of column listings, keyed by physical table name.
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    /// Column names of `table`, in declaration order. A table the provider
    /// does not know yields an empty list; the resolver then falls back to
    /// using field names verbatim.
    async fn columns(&self, table: &str) -> Result<Vec<String>, SieveError>;
}

/// Lists columns from the connected database.
#[derive(Clone)]
pub struct DbSchemaProvider {
    db: DatabaseConnection,
}

impl DbSchemaProvider {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SchemaProvider for DbSchemaProvider {
    async fn columns(&self, table: &str) -> Result<Vec<String>, SieveError> {
        let backend = self.db.get_database_backend();
        let (sql, values): (String, Vec<sea_orm::Value>) = match backend {
            DatabaseBackend::Sqlite => (
                "SELECT name AS column_name FROM pragma_table_info(?)".to_string(),
                vec![table.into()],
            ),
            DatabaseBackend::Postgres => (
                "SELECT column_name FROM information_schema.columns \
                 WHERE table_name = $1 ORDER BY ordinal_position"
                    .to_string(),
                vec![table.into()],
            ),
            DatabaseBackend::MySql => (
                "SELECT COLUMN_NAME AS column_name FROM information_schema.COLUMNS \
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? \
                 ORDER BY ORDINAL_POSITION"
                    .to_string(),
                vec![table.into()],
            ),
        };

        let rows = self
            .db
            .query_all(Statement::from_sql_and_values(backend, sql, values))
            .await
            .map_err(|err| SieveError::schema(table, err))?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            columns.push(
                row.try_get::<String>("", "column_name")
                    .map_err(|err| SieveError::schema(table, err))?,
            );
        }
        Ok(columns)
    }
}

/// Caches another provider's listings for the life of the process.
///
/// Population is idempotent, so a race between two requests for the same
/// table yields equivalent values; the lock is held only across map access,
/// never across an await.
pub struct CachedSchemaProvider<P> {
    inner: P,
    cache: RwLock<HashMap<String, Vec<String>>>,
}

impl<P: SchemaProvider> CachedSchemaProvider<P> {
    #[must_use]
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl<P: SchemaProvider> SchemaProvider for CachedSchemaProvider<P> {
    async fn columns(&self, table: &str) -> Result<Vec<String>, SieveError> {
        {
            let cache = self.cache.read().unwrap_or_else(std::sync::PoisonError::into_inner);
            if let Some(hit) = cache.get(table) {
                return Ok(hit.clone());
            }
        }
        let fetched = self.inner.columns(table).await?;
        let mut cache = self.cache.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        let entry = cache.entry(table.to_string()).or_insert(fetched);
        Ok(entry.clone())
    }
}

/// Fixed table → columns mapping.
#[derive(Debug, Clone, Default)]
pub struct StaticSchemaProvider {
    tables: HashMap<String, Vec<String>>,
}

impl StaticSchemaProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a table and its columns.
    #[must_use]
    pub fn table<I, S>(mut self, name: &str, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables.insert(
            name.to_string(),
            columns.into_iter().map(Into::into).collect(),
        );
        self
    }
}

#[async_trait]
impl SchemaProvider for StaticSchemaProvider {
    async fn columns(&self, table: &str) -> Result<Vec<String>, SieveError> {
        Ok(self.tables.get(table).cloned().unwrap_or_default())
    }
}
