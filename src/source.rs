//! The bound query.
//!
//! [`QuerySource`] pairs a sea-query [`SelectStatement`] with the metadata
//! the engine needs but the statement does not expose: which tables the
//! query was declared over (base plus joins, each optionally aliased), the
//! primary key used for identity lookups and the default sort, and whether
//! the statement groups rows. Terminal operations always work on a clone of
//! the stored statement, so one source can back any number of independent
//! calls.

use sea_orm::sea_query::{Alias, JoinType, Query, SelectStatement, SimpleExpr};

use crate::columns::col_ref;

/// `table` or `table AS alias` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    /// Physical table name.
    pub table: String,
    /// Name the query addresses the table by; equals `table` when unaliased.
    pub alias: String,
}

impl TableRef {
    /// Parse `users` or `users AS u` (the `AS` is case-insensitive).
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.to_ascii_lowercase();
        if let Some(position) = lowered.find(" as ") {
            return Self {
                table: raw[..position].trim().to_string(),
                alias: raw[position + 4..].trim().to_string(),
            };
        }
        let name = raw.trim().to_string();
        Self {
            alias: name.clone(),
            table: name,
        }
    }

    fn is_aliased(&self) -> bool {
        self.alias != self.table
    }
}

/// A select statement plus the table set it was declared over.
#[derive(Debug, Clone)]
pub struct QuerySource {
    stmt: SelectStatement,
    base: TableRef,
    joins: Vec<TableRef>,
    primary_key: String,
    groups: Vec<String>,
    projected: bool,
}

impl QuerySource {
    /// Start a query over `raw` (`table` or `table AS alias`). The primary
    /// key defaults to `id`.
    #[must_use]
    pub fn table(raw: &str) -> Self {
        let base = TableRef::parse(raw);
        let mut stmt = Query::select();
        if base.is_aliased() {
            stmt.from_as(Alias::new(&base.table), Alias::new(&base.alias));
        } else {
            stmt.from(Alias::new(&base.table));
        }
        Self {
            stmt,
            base,
            joins: Vec::new(),
            primary_key: "id".to_string(),
            groups: Vec::new(),
            projected: false,
        }
    }

    /// Override the primary key column used for identity lookups and the
    /// default sort.
    #[must_use]
    pub fn primary_key(mut self, key: &str) -> Self {
        self.primary_key = key.to_string();
        self
    }

    /// Join another table (`table` or `table AS alias`) with the given
    /// condition. Joined tables participate in column-name resolution in
    /// declaration order.
    #[must_use]
    pub fn join(mut self, kind: JoinType, raw: &str, condition: SimpleExpr) -> Self {
        let table = TableRef::parse(raw);
        if table.is_aliased() {
            self.stmt.join_as(
                kind,
                Alias::new(&table.table),
                Alias::new(&table.alias),
                condition,
            );
        } else {
            self.stmt.join(kind, Alias::new(&table.table), condition);
        }
        self.joins.push(table);
        self
    }

    #[must_use]
    pub fn inner_join(self, raw: &str, condition: SimpleExpr) -> Self {
        self.join(JoinType::InnerJoin, raw, condition)
    }

    #[must_use]
    pub fn left_join(self, raw: &str, condition: SimpleExpr) -> Self {
        self.join(JoinType::LeftJoin, raw, condition)
    }

    /// Add a fixed predicate that applies before any request filters.
    #[must_use]
    pub fn and_where(mut self, condition: SimpleExpr) -> Self {
        self.stmt.and_where(condition);
        self
    }

    /// Group rows by the given fields (bare or `table.column` form).
    #[must_use]
    pub fn group_by(mut self, fields: &[&str]) -> Self {
        for field in fields {
            self.stmt.group_by_col(col_ref(field));
            self.groups.push((*field).to_string());
        }
        self
    }

    /// Select an explicit column. Once any explicit selection is made the
    /// engine leaves the projection alone.
    #[must_use]
    pub fn column(mut self, name: &str) -> Self {
        self.stmt.column(col_ref(name));
        self.projected = true;
        self
    }

    /// Select a computed expression under `alias`.
    #[must_use]
    pub fn expr_as(mut self, expr: SimpleExpr, alias: &str) -> Self {
        self.stmt.expr_as(expr, Alias::new(alias));
        self.projected = true;
        self
    }

    pub(crate) fn stmt(&self) -> &SelectStatement {
        &self.stmt
    }

    pub(crate) fn base_table(&self) -> &str {
        &self.base.table
    }

    pub(crate) fn primary_key_name(&self) -> &str {
        &self.primary_key
    }

    pub(crate) fn grouped(&self) -> bool {
        !self.groups.is_empty()
    }

    pub(crate) fn groups(&self) -> &[String] {
        &self.groups
    }

    pub(crate) fn projected(&self) -> bool {
        self.projected
    }

    /// Tables in declaration order, base first.
    pub(crate) fn tables(&self) -> impl Iterator<Item = &TableRef> {
        std::iter::once(&self.base).chain(self.joins.iter())
    }
}
