//! Column-name disambiguation.
//!
//! A filter or order names a bare column (`id`, `name`); once a query joins
//! a second table that bare name may be ambiguous. [`ColumnAliasMap`]
//! resolves bare names to their qualified `alias.column` form across every
//! table in the query, with the earliest-declared table winning a collision.
//! It also expands wildcards (`*`, `table.*`) so an exclusion list can be
//! subtracted from a full projection.
//!
//! A name no table claims resolves to itself; any resulting failure is the
//! data store's to report.

use sea_orm::sea_query::{Alias, ColumnRef, IntoIden};
use std::collections::HashMap;
use tracing::warn;

use crate::errors::SieveError;
use crate::schema::SchemaProvider;
use crate::source::QuerySource;

/// Column reference for a bare (`name`) or qualified (`table.name`) field.
pub(crate) fn col_ref(name: &str) -> ColumnRef {
    match name.split_once('.') {
        Some((table, column)) => ColumnRef::TableColumn(
            Alias::new(table).into_iden(),
            Alias::new(column).into_iden(),
        ),
        None => ColumnRef::Column(Alias::new(name).into_iden()),
    }
}

/// Resolved `column → "alias.column"` map across every table in a query.
#[derive(Debug, Clone, Default)]
pub struct ColumnAliasMap {
    aliases: HashMap<String, String>,
    /// `(alias, columns)` per table, in declaration order.
    tables: Vec<(String, Vec<String>)>,
}

impl ColumnAliasMap {
    /// Resolve the table set of `source` through `schema`. Tables are
    /// visited in declaration order; the first table to declare a column
    /// name claims it.
    pub async fn build(
        schema: &dyn SchemaProvider,
        source: &QuerySource,
    ) -> Result<Self, SieveError> {
        let mut map = Self::default();
        for table in source.tables() {
            let columns = schema.columns(&table.table).await?;
            if columns.is_empty() {
                warn!(table = %table.table, "no columns listed, names fall back verbatim");
            }
            for column in &columns {
                map.aliases
                    .entry(column.clone())
                    .or_insert_with(|| format!("{}.{column}", table.alias));
            }
            map.tables.push((table.alias.clone(), columns));
        }
        Ok(map)
    }

    /// Qualified name for `field`, or `field` itself when no table claims it.
    #[must_use]
    pub fn resolve<'a>(&'a self, field: &'a str) -> &'a str {
        self.aliases.get(field).map_or(field, String::as_str)
    }

    /// Expand a selector: `*` covers every table, `table.*` one table, and
    /// anything else resolves as a single column.
    #[must_use]
    pub fn expand(&self, selector: &str) -> Vec<String> {
        if selector == "*" {
            return self
                .tables
                .iter()
                .flat_map(|(alias, columns)| {
                    columns.iter().map(move |column| format!("{alias}.{column}"))
                })
                .collect();
        }
        if let Some(table) = selector.strip_suffix(".*") {
            return self
                .tables
                .iter()
                .filter(|(alias, _)| alias == table)
                .flat_map(|(alias, columns)| {
                    columns.iter().map(move |column| format!("{alias}.{column}"))
                })
                .collect();
        }
        vec![self.resolve(selector).to_string()]
    }

    /// Wildcard-expand `columns`, then subtract `exclude` (whose entries may
    /// be bare or qualified). Duplicates are dropped, order preserved.
    #[must_use]
    pub fn select_list(&self, columns: &[String], exclude: &[String]) -> Vec<String> {
        let excluded: Vec<String> = exclude
            .iter()
            .map(|entry| self.resolve(entry).to_string())
            .collect();
        let mut selected = Vec::new();
        for selector in columns {
            for qualified in self.expand(selector) {
                if excluded.contains(&qualified) || selected.contains(&qualified) {
                    continue;
                }
                selected.push(qualified);
            }
        }
        selected
    }
}
