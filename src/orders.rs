//! Sort specifications.

use sea_orm::sea_query::{Order, SelectStatement};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use utoipa::ToSchema;

use crate::columns::{ColumnAliasMap, col_ref};

/// Sort direction. Anything that is not `desc` normalizes to ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    fn order(self) -> Order {
        match self {
            Self::Asc => Order::Asc,
            Self::Desc => Order::Desc,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// One sort clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct OrderSpec {
    pub field: String,
    pub direction: Direction,
}

/// Sort clauses in insertion order; re-setting a field replaces its
/// direction in place.
#[derive(Debug, Clone, Default)]
pub struct OrderSet {
    entries: Vec<OrderSpec>,
}

impl OrderSet {
    pub fn set(&mut self, field: &str, direction: &str) {
        let direction = Direction::parse(direction);
        if let Some(existing) = self.entries.iter_mut().find(|e| e.field == field) {
            existing.direction = direction;
        } else {
            self.entries.push(OrderSpec {
                field: field.to_string(),
                direction,
            });
        }
    }

    /// Build from a decoded `o` group (`field → direction`).
    #[must_use]
    pub fn from_params(orders: &Map<String, JsonValue>) -> Self {
        let mut set = Self::default();
        for (field, value) in orders {
            set.set(field, value.as_str().unwrap_or_default());
        }
        set
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OrderSpec> {
        self.entries.iter()
    }

    /// Echo form: `field → direction`.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        let mut map = Map::new();
        for spec in &self.entries {
            map.insert(
                spec.field.clone(),
                JsonValue::String(spec.direction.as_str().to_string()),
            );
        }
        JsonValue::Object(map)
    }
}

/// Apply the sort clauses, resolving field names through the alias map.
/// With no clauses supplied, fall back to `fallback` (the primary key)
/// descending.
pub fn apply_orders(
    stmt: &mut SelectStatement,
    orders: &OrderSet,
    alias: &ColumnAliasMap,
    fallback: &str,
) {
    if orders.is_empty() {
        stmt.order_by(col_ref(alias.resolve(fallback)), Order::Desc);
        return;
    }
    for spec in orders.iter() {
        stmt.order_by(col_ref(alias.resolve(&spec.field)), spec.direction.order());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sea_query::{Asterisk, Query, SqliteQueryBuilder};
    use serde_json::json;

    #[test]
    fn test_parse_direction() {
        assert_eq!(Direction::parse("desc"), Direction::Desc);
        assert_eq!(Direction::parse("DESC"), Direction::Desc);
        assert_eq!(Direction::parse("asc"), Direction::Asc);
    }

    #[test]
    fn test_unrecognized_direction_normalizes_to_asc() {
        assert_eq!(Direction::parse("descending"), Direction::Asc);
        assert_eq!(Direction::parse(""), Direction::Asc);
        assert_eq!(Direction::parse("random"), Direction::Asc);
    }

    #[test]
    fn test_set_replaces_existing_field() {
        let mut set = OrderSet::default();
        set.set("name", "asc");
        set.set("name", "desc");
        let entries: Vec<_> = set.iter().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].direction, Direction::Desc);
    }

    #[test]
    fn test_from_params_keeps_order() {
        let mut params = Map::new();
        params.insert("created_at".to_string(), json!("desc"));
        params.insert("name".to_string(), json!("asc"));
        let set = OrderSet::from_params(&params);
        let fields: Vec<&str> = set.iter().map(|s| s.field.as_str()).collect();
        assert_eq!(fields, vec!["created_at", "name"]);
    }

    #[test]
    fn test_empty_set_falls_back_to_primary_key_desc() {
        let mut stmt = Query::select();
        stmt.column(Asterisk).from(sea_orm::sea_query::Alias::new("users"));
        apply_orders(&mut stmt, &OrderSet::default(), &ColumnAliasMap::default(), "id");
        let sql = stmt.to_string(SqliteQueryBuilder);
        assert!(sql.ends_with("ORDER BY \"id\" DESC"), "{sql}");
    }

    #[test]
    fn test_to_json_echo() {
        let mut set = OrderSet::default();
        set.set("id", "desc");
        assert_eq!(set.to_json(), json!({"id": "desc"}));
    }
}
