//! The request-scoped facade.
//!
//! One [`ApiHelper`] serves one inbound request: it is bound to a
//! [`QuerySource`], fed the request's parameter map (or fluent calls), and
//! then asked for a terminal result (a count, a row, a page, an export).
//! Every terminal operation works on a fresh clone of the stored statement,
//! so the source is never mutated and repeated terminal calls on the same
//! helper are independent of call order.
//!
//! ```rust,ignore
//! let schema = Arc::new(CachedSchemaProvider::new(DbSchemaProvider::new(db.clone())));
//! let envelope = ApiHelper::new(QuerySource::table("users"), schema)
//!     .scope_registry(scopes)
//!     .params(&request_params)
//!     .data(&db)
//!     .await?;
//! ```

use std::sync::Arc;

use chrono::Local;
use sea_orm::sea_query::{Alias, Asterisk, Expr, Query, SelectStatement};
use sea_orm::{ConnectionTrait, DatabaseConnection, FromQueryResult};
use serde_json::{Map, Value as JsonValue};

use crate::columns::{ColumnAliasMap, col_ref};
use crate::decode::{DecodedParams, decode_params};
use crate::errors::SieveError;
use crate::filters::{FilterSet, apply_filters};
use crate::models::{DataEnvelope, DatableEnvelope, Page};
use crate::orders::{OrderSet, apply_orders};
use crate::pagination::PageSpec;
use crate::schema::SchemaProvider;
use crate::scopes::{ScopeQuerySet, ScopeRegistry, apply_scopes};
use crate::source::QuerySource;

/// Declarative filtering, sorting and pagination over one bound query.
pub struct ApiHelper {
    source: QuerySource,
    schema: Arc<dyn SchemaProvider>,
    scopes: Arc<ScopeRegistry>,
    filters: FilterSet,
    queries: ScopeQuerySet,
    orders: OrderSet,
    paging: PageSpec,
    columns: Vec<String>,
    exclude: Vec<String>,
    alias_map: Option<ColumnAliasMap>,
}

impl ApiHelper {
    #[must_use]
    pub fn new(source: QuerySource, schema: Arc<dyn SchemaProvider>) -> Self {
        Self {
            source,
            schema,
            scopes: Arc::new(ScopeRegistry::new()),
            filters: FilterSet::default(),
            queries: ScopeQuerySet::default(),
            orders: OrderSet::default(),
            paging: PageSpec::default(),
            columns: vec!["*".to_string()],
            exclude: Vec::new(),
            alias_map: None,
        }
    }

    /// Attach the scope registry the bound entity type exposes.
    #[must_use]
    pub fn scope_registry(mut self, registry: Arc<ScopeRegistry>) -> Self {
        self.scopes = registry;
        self
    }

    /// Bulk-apply a raw request parameter map: the `f`/`o`/`q` groups plus
    /// `page` and `size`/`per_page`.
    #[must_use]
    pub fn params(mut self, params: &Map<String, JsonValue>) -> Self {
        let DecodedParams {
            filters,
            orders,
            queries,
        } = decode_params(params);
        self.filters = FilterSet::from_params(&filters);
        self.orders = OrderSet::from_params(&orders);
        self.queries = ScopeQuerySet::from_params(&queries);
        self.paging = PageSpec::from_params(params);
        self
    }

    /// Add one filter predicate (sentinel-aware).
    #[must_use]
    pub fn filter(mut self, field: &str, operator: &str, value: JsonValue) -> Self {
        self.filters.filter(field, operator, value);
        self
    }

    /// Add one filter predicate, storing the value verbatim.
    #[must_use]
    pub fn filter_strict(mut self, field: &str, operator: &str, value: JsonValue) -> Self {
        self.filters.filter_strict(field, operator, value);
        self
    }

    /// Set one scope-query argument.
    #[must_use]
    pub fn query(mut self, name: &str, value: JsonValue) -> Self {
        self.queries.set(name, value);
        self
    }

    /// Set one sort clause.
    #[must_use]
    pub fn order(mut self, field: &str, direction: &str) -> Self {
        self.orders.set(field, direction);
        self
    }

    #[must_use]
    pub fn page(mut self, page: i64) -> Self {
        self.paging.set_page(page);
        self
    }

    #[must_use]
    pub fn per_page(mut self, per_page: i64) -> Self {
        self.paging.set_per_page(per_page);
        self
    }

    /// Project the given selectors (`*`, `table.*`, bare or qualified
    /// columns) instead of everything.
    #[must_use]
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        if self.columns.is_empty() {
            self.columns.push("*".to_string());
        }
        self
    }

    /// Subtract columns from the projection after wildcard expansion.
    #[must_use]
    pub fn exclude<I, S>(mut self, exclude: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = exclude.into_iter().map(Into::into).collect();
        self
    }

    /// Swap the underlying query. The memoized column map is dropped and
    /// rebuilt lazily against the new table set.
    #[must_use]
    pub fn source(mut self, source: QuerySource) -> Self {
        self.source = source;
        self.alias_map = None;
        self
    }

    async fn alias_map(&mut self) -> Result<ColumnAliasMap, SieveError> {
        if let Some(map) = &self.alias_map {
            return Ok(map.clone());
        }
        let built = ColumnAliasMap::build(self.schema.as_ref(), &self.source).await?;
        self.alias_map = Some(built.clone());
        Ok(built)
    }

    /// Clone the stored statement and apply filters and scope queries, the
    /// shared prefix of every terminal operation.
    fn filtered_stmt(&self, alias: &ColumnAliasMap) -> SelectStatement {
        let mut stmt = self.source.stmt().clone();
        apply_filters(&mut stmt, &self.filters, alias);
        apply_scopes(&mut stmt, &self.queries, &self.scopes);
        stmt
    }

    fn apply_projection(&self, stmt: &mut SelectStatement, alias: &ColumnAliasMap) {
        if self.source.projected() {
            return;
        }
        let plain = self.columns.len() == 1 && self.columns[0] == "*" && self.exclude.is_empty();
        if plain {
            stmt.column(Asterisk);
            return;
        }
        let selected = alias.select_list(&self.columns, &self.exclude);
        if selected.is_empty() {
            stmt.column(Asterisk);
            return;
        }
        for name in selected {
            stmt.column(col_ref(&name));
        }
    }

    async fn fetch_all(
        db: &DatabaseConnection,
        stmt: &SelectStatement,
    ) -> Result<Vec<JsonValue>, SieveError> {
        let backend = db.get_database_backend();
        let rows = db
            .query_all(backend.build(stmt))
            .await
            .map_err(SieveError::database)?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(JsonValue::from_query_result(&row, "").map_err(SieveError::database)?);
        }
        Ok(out)
    }

    async fn fetch_one(
        db: &DatabaseConnection,
        stmt: &SelectStatement,
    ) -> Result<Option<JsonValue>, SieveError> {
        let backend = db.get_database_backend();
        let row = db
            .query_one(backend.build(stmt))
            .await
            .map_err(SieveError::database)?;
        match row {
            Some(row) => Ok(Some(
                JsonValue::from_query_result(&row, "").map_err(SieveError::database)?,
            )),
            None => Ok(None),
        }
    }

    /// Count the statement's result set by wrapping it in a subquery, so a
    /// grouped statement counts distinct groups rather than raw rows.
    async fn count_stmt(&self, db: &DatabaseConnection, mut stmt: SelectStatement) -> Result<u64, SieveError> {
        if !self.source.projected() {
            if self.source.grouped() {
                for group in self.source.groups() {
                    stmt.column(col_ref(group));
                }
            } else {
                stmt.column(Asterisk);
            }
        }
        let wrapped = Query::select()
            .expr_as(Expr::cust("COUNT(*)"), Alias::new("row_count"))
            .from_subquery(stmt, Alias::new("aggregate"))
            .to_owned();
        let backend = db.get_database_backend();
        let row = db
            .query_one(backend.build(&wrapped))
            .await
            .map_err(SieveError::database)?;
        match row {
            Some(row) => {
                let count: i64 = row
                    .try_get("", "row_count")
                    .map_err(SieveError::database)?;
                Ok(u64::try_from(count).unwrap_or_default())
            }
            None => Ok(0),
        }
    }

    /// Row count, optionally with the active filters and scope queries
    /// applied. Ordering and paging never participate.
    pub async fn count(
        &mut self,
        db: &DatabaseConnection,
        with_filters: bool,
    ) -> Result<u64, SieveError> {
        let stmt = if with_filters {
            let alias = self.alias_map().await?;
            self.filtered_stmt(&alias)
        } else {
            self.source.stmt().clone()
        };
        self.count_stmt(db, stmt).await
    }

    /// Identity lookup by primary key, with filters and scope queries
    /// applied. A miss is `None`, not an error.
    pub async fn find(
        &mut self,
        db: &DatabaseConnection,
        id: impl Into<sea_orm::Value> + Send,
    ) -> Result<Option<JsonValue>, SieveError> {
        let alias = self.alias_map().await?;
        let mut stmt = self.filtered_stmt(&alias);
        let key = alias.resolve(self.source.primary_key_name()).to_string();
        stmt.and_where(Expr::col(col_ref(&key)).eq(id.into()));
        self.apply_projection(&mut stmt, &alias);
        stmt.limit(1);
        Self::fetch_one(db, &stmt).await
    }

    /// Identity lookup by a set of primary keys, with filters, scope
    /// queries and ordering applied. Missing ids are simply absent.
    pub async fn find_many(
        &mut self,
        db: &DatabaseConnection,
        ids: Vec<sea_orm::Value>,
    ) -> Result<Vec<JsonValue>, SieveError> {
        let alias = self.alias_map().await?;
        let mut stmt = self.filtered_stmt(&alias);
        let key = alias.resolve(self.source.primary_key_name()).to_string();
        stmt.and_where(Expr::col(col_ref(&key)).is_in(ids));
        apply_orders(&mut stmt, &self.orders, &alias, self.source.primary_key_name());
        self.apply_projection(&mut stmt, &alias);
        Self::fetch_all(db, &stmt).await
    }

    /// First row of the current page, or `None`.
    pub async fn first(&mut self, db: &DatabaseConnection) -> Result<Option<JsonValue>, SieveError> {
        let alias = self.alias_map().await?;
        let mut stmt = self.filtered_stmt(&alias);
        apply_orders(&mut stmt, &self.orders, &alias, self.source.primary_key_name());
        self.apply_projection(&mut stmt, &alias);
        stmt.offset(self.paging.offset()).limit(1);
        Self::fetch_one(db, &stmt).await
    }

    /// The current page's rows, without the pagination envelope.
    pub async fn get(&mut self, db: &DatabaseConnection) -> Result<Vec<JsonValue>, SieveError> {
        let alias = self.alias_map().await?;
        let mut stmt = self.filtered_stmt(&alias);
        apply_orders(&mut stmt, &self.orders, &alias, self.source.primary_key_name());
        self.apply_projection(&mut stmt, &alias);
        stmt.offset(self.paging.offset()).limit(self.paging.limit());
        Self::fetch_all(db, &stmt).await
    }

    /// Every matching row: filters, scope queries and ordering apply, but
    /// no paging.
    pub async fn all(&mut self, db: &DatabaseConnection) -> Result<Vec<JsonValue>, SieveError> {
        let alias = self.alias_map().await?;
        let mut stmt = self.filtered_stmt(&alias);
        apply_orders(&mut stmt, &self.orders, &alias, self.source.primary_key_name());
        self.apply_projection(&mut stmt, &alias);
        Self::fetch_all(db, &stmt).await
    }

    /// The current page wrapped in pagination metadata. The total is
    /// counted with filters applied, before ordering and paging.
    pub async fn paginate(&mut self, db: &DatabaseConnection) -> Result<Page, SieveError> {
        let alias = self.alias_map().await?;
        let mut stmt = self.filtered_stmt(&alias);
        let total = self.count_stmt(db, stmt.clone()).await?;
        apply_orders(&mut stmt, &self.orders, &alias, self.source.primary_key_name());
        self.apply_projection(&mut stmt, &alias);
        stmt.offset(self.paging.offset()).limit(self.paging.limit());
        let data = Self::fetch_all(db, &stmt).await?;
        Ok(Page::assemble(
            data,
            self.paging.page(),
            self.paging.per_page(),
            total,
        ))
    }

    /// [`Self::paginate`] plus the echoed filter/scope/order state.
    pub async fn data(&mut self, db: &DatabaseConnection) -> Result<DataEnvelope, SieveError> {
        self.data_with(db, |_| {}).await
    }

    /// Like [`Self::data`], with a hook that may post-process the page
    /// before it is enveloped.
    pub async fn data_with<F>(
        &mut self,
        db: &DatabaseConnection,
        hook: F,
    ) -> Result<DataEnvelope, SieveError>
    where
        F: FnOnce(&mut Page),
    {
        let mut page = self.paginate(db).await?;
        hook(&mut page);
        Ok(DataEnvelope {
            page,
            filters: self.filters.to_json(),
            queries: self.queries.to_json(),
            orders: self.orders.to_json(),
        })
    }

    /// [`Self::data`] plus the unfiltered grand total, for table widgets
    /// that show "N of M".
    pub async fn datable(&mut self, db: &DatabaseConnection) -> Result<DatableEnvelope, SieveError> {
        let records_total = self.count(db, false).await?;
        let data = self.data(db).await?;
        let records_filtered = data.page.total;
        Ok(DatableEnvelope {
            data,
            records_total,
            records_filtered,
        })
    }

    /// Flatten the current page into spreadsheet-ready rows: one metadata
    /// row (`[table, "from-to/total", timestamp]`), a header row when the
    /// rows are keyed, then the data rows.
    pub async fn export(&mut self, db: &DatabaseConnection) -> Result<Vec<Vec<JsonValue>>, SieveError> {
        self.export_with(db, |_| {}).await
    }

    /// Like [`Self::export`], with a hook that may post-process the page
    /// before it is flattened.
    pub async fn export_with<F>(
        &mut self,
        db: &DatabaseConnection,
        hook: F,
    ) -> Result<Vec<Vec<JsonValue>>, SieveError>
    where
        F: FnOnce(&mut Page),
    {
        let mut page = self.paginate(db).await?;
        hook(&mut page);

        let header: Option<Vec<String>> = match page.data.first() {
            Some(JsonValue::Object(first)) => Some(first.keys().cloned().collect()),
            _ => None,
        };

        let mut rows: Vec<Vec<JsonValue>> = Vec::with_capacity(page.data.len() + 2);
        rows.push(vec![
            JsonValue::String(self.source.base_table().to_string()),
            JsonValue::String(format!("{}-{}/{}", page.from, page.to, page.total)),
            JsonValue::String(Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
        ]);
        if let Some(keys) = &header {
            rows.push(keys.iter().cloned().map(JsonValue::String).collect());
        }
        for row in &page.data {
            match (row, &header) {
                (JsonValue::Object(map), Some(keys)) => rows.push(
                    keys.iter()
                        .map(|key| map.get(key).cloned().unwrap_or(JsonValue::Null))
                        .collect(),
                ),
                (other, _) => rows.push(vec![other.clone()]),
            }
        }
        Ok(rows)
    }
}

impl std::fmt::Debug for ApiHelper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiHelper")
            .field("source", &self.source)
            .field("filters", &self.filters)
            .field("queries", &self.queries)
            .field("orders", &self.orders)
            .field("paging", &self.paging)
            .finish_non_exhaustive()
    }
}
