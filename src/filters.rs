//! Filter construction and application.
//!
//! A [`FilterSet`] is the structured form of the `f` parameter group: one
//! entry per field/operator/value triple, in insertion order. Entries are
//! added either in bulk from a decoded parameter map or one at a time
//! through the fluent API; either way the operator token goes through
//! [`crate::operators::resolve`] before storage.
//!
//! Application walks the set against a statement under construction:
//! blank values skip their predicate, `like`-family values get wildcard
//! wrapping, `in`/`between` values spread their arrays, explicit-null tags
//! turn equality into `IS NULL`, and any operator the dispatcher does not
//! recognize is emitted as a raw `field operator ?` expression with the
//! value still bound as a parameter, so only the operator text is trusted.

use sea_orm::Value;
use sea_orm::sea_query::{Expr, SelectStatement, SimpleExpr};
use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use crate::columns::{ColumnAliasMap, col_ref};
use crate::operators;
use crate::value::FilterValue;

/// One predicate: field, canonical operator, tagged value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCondition {
    pub field: String,
    pub operator: String,
    pub value: FilterValue,
}

/// Structured filter parameters in insertion order. Re-setting the same
/// field/operator pair replaces its value.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    entries: Vec<FilterCondition>,
}

impl FilterSet {
    /// Add a predicate with sentinel-aware value ingestion.
    pub fn filter(&mut self, field: &str, operator: &str, value: JsonValue) {
        self.set(field, operator, FilterValue::from_param(value));
    }

    /// Add a predicate storing the value verbatim (no blank detection, no
    /// sentinel decoding).
    pub fn filter_strict(&mut self, field: &str, operator: &str, value: JsonValue) {
        self.set(field, operator, FilterValue::strict(value));
    }

    fn set(&mut self, field: &str, operator: &str, value: FilterValue) {
        let operator = operators::resolve(operator).into_owned();
        if let Some(existing) = self
            .entries
            .iter_mut()
            .find(|e| e.field == field && e.operator == operator)
        {
            existing.value = value;
        } else {
            self.entries.push(FilterCondition {
                field: field.to_string(),
                operator,
                value,
            });
        }
    }

    /// Build from a decoded `f` group. A raw scalar at the field level
    /// implies equality.
    #[must_use]
    pub fn from_params(filters: &Map<String, JsonValue>) -> Self {
        let mut set = Self::default();
        for (field, condition) in filters {
            match condition {
                JsonValue::Object(operators) => {
                    for (operator, value) in operators {
                        set.filter(field, operator, value.clone());
                    }
                }
                scalar => set.filter(field, "=", scalar.clone()),
            }
        }
        set
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterCondition> {
        self.entries.iter()
    }

    /// Echo form: `field → operator → value`, tags rendered back to plain
    /// JSON.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        let mut map = Map::new();
        for entry in &self.entries {
            let slot = map
                .entry(entry.field.clone())
                .or_insert_with(|| JsonValue::Object(Map::new()));
            if let JsonValue::Object(operators) = slot {
                operators.insert(entry.operator.clone(), entry.value.to_json());
            }
        }
        JsonValue::Object(map)
    }
}

/// Apply every applicable predicate of `filters` to `stmt`, resolving field
/// names through `alias`.
pub fn apply_filters(stmt: &mut SelectStatement, filters: &FilterSet, alias: &ColumnAliasMap) {
    for entry in filters.iter() {
        if entry.value.is_absent() {
            debug!(field = %entry.field, operator = %entry.operator, "blank filter value, predicate skipped");
            continue;
        }
        let field = alias.resolve(&entry.field);
        if let Some(expr) = predicate(field, &entry.operator, &entry.value) {
            stmt.and_where(expr);
        }
    }
}

fn predicate(field: &str, operator: &str, value: &FilterValue) -> Option<SimpleExpr> {
    let column = || Expr::col(col_ref(field));
    match operator {
        "in" => Some(column().is_in(value_list(value))),
        "not in" => Some(column().is_not_in(value_list(value))),
        "between" | "not between" => {
            let bounds = value_list(value);
            if bounds.len() < 2 {
                debug!(%field, %operator, "range filter needs two bounds, predicate skipped");
                return None;
            }
            let (low, high) = (bounds[0].clone(), bounds[1].clone());
            Some(if operator == "between" {
                column().between(low, high)
            } else {
                column().not_between(low, high)
            })
        }
        "=" | "is" if is_null(value) => Some(column().is_null()),
        "<>" if is_null(value) => Some(column().is_not_null()),
        "=" => Some(column().eq(scalar(value))),
        "<>" => Some(column().ne(scalar(value))),
        ">" => Some(column().gt(scalar(value))),
        ">=" => Some(column().gte(scalar(value))),
        "<" => Some(column().lt(scalar(value))),
        "<=" => Some(column().lte(scalar(value))),
        "like" => Some(column().like(like_pattern(value))),
        "not like" => Some(column().not_like(like_pattern(value))),
        "like binary" | "not like binary" => Some(Expr::cust_with_values(
            format!("{field} {operator} ?"),
            [Value::from(like_pattern(value))],
        )),
        // raw pass-through: the operator text is trusted, the value is bound
        _ => Some(Expr::cust_with_values(
            format!("{field} {operator} ?"),
            [scalar(value)],
        )),
    }
}

fn is_null(value: &FilterValue) -> bool {
    matches!(value, FilterValue::ExplicitNull)
        || matches!(value, FilterValue::Present(JsonValue::Null))
}

/// Convert the tagged value to a bindable scalar.
fn scalar(value: &FilterValue) -> Value {
    match value {
        FilterValue::Present(json) => json_value(json),
        FilterValue::ExplicitEmpty => Value::from(""),
        FilterValue::ExplicitNull | FilterValue::Absent => Value::String(None),
    }
}

fn json_value(json: &JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::String(None),
        JsonValue::Bool(flag) => Value::from(*flag),
        JsonValue::Number(number) => {
            if let Some(int) = number.as_i64() {
                Value::from(int)
            } else if let Some(float) = number.as_f64() {
                Value::from(float)
            } else {
                Value::from(number.to_string())
            }
        }
        JsonValue::String(text) => Value::from(text.clone()),
        // arrays and objects bind as their JSON text
        other => Value::from(other.to_string()),
    }
}

/// Array values spread; anything else becomes a single-element list.
fn value_list(value: &FilterValue) -> Vec<Value> {
    match value {
        FilterValue::Present(JsonValue::Array(items)) => items.iter().map(json_value).collect(),
        other => vec![scalar(other)],
    }
}

/// Wrap the value in `%` wildcards unless the caller already supplied one.
fn like_pattern(value: &FilterValue) -> String {
    let raw = match value.to_json() {
        JsonValue::String(text) => text,
        JsonValue::Null => String::new(),
        other => other.to_string(),
    };
    if raw.contains('%') {
        raw
    } else {
        format!("%{raw}%")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sea_query::{Alias, Asterisk, Query, SqliteQueryBuilder};
    use serde_json::json;

    fn render(filters: &FilterSet) -> String {
        let mut stmt = Query::select();
        stmt.column(Asterisk).from(Alias::new("users"));
        apply_filters(&mut stmt, filters, &ColumnAliasMap::default());
        stmt.to_string(SqliteQueryBuilder)
    }

    #[test]
    fn test_bulk_and_fluent_construction_agree() {
        let mut params = Map::new();
        params.insert("status".to_string(), json!({"eq": "1"}));
        let bulk = FilterSet::from_params(&params);

        let mut fluent = FilterSet::default();
        fluent.filter("status", "eq", json!("1"));

        assert_eq!(
            bulk.iter().collect::<Vec<_>>(),
            fluent.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_scalar_condition_implies_equality() {
        let mut params = Map::new();
        params.insert("status".to_string(), json!("1"));
        let set = FilterSet::from_params(&params);
        let entry = set.iter().next().unwrap();
        assert_eq!(entry.operator, "=");
    }

    #[test]
    fn test_like_value_gets_wrapped() {
        let mut set = FilterSet::default();
        set.filter("name", "lk", json!("ann"));
        let sql = render(&set);
        assert!(sql.contains("LIKE '%ann%'"), "{sql}");
    }

    #[test]
    fn test_like_value_with_wildcard_is_untouched() {
        let mut set = FilterSet::default();
        set.filter("name", "lk", json!("ann%"));
        let sql = render(&set);
        assert!(sql.contains("LIKE 'ann%'"), "{sql}");
        assert!(!sql.contains("%ann%"), "{sql}");
    }

    #[test]
    fn test_blank_value_skips_predicate() {
        let mut set = FilterSet::default();
        set.filter("name", "eq", json!(""));
        let sql = render(&set);
        assert!(!sql.contains("WHERE"), "{sql}");
    }

    #[test]
    fn test_zero_still_filters() {
        let mut set = FilterSet::default();
        set.filter("age", "eq", json!(0));
        let sql = render(&set);
        assert!(sql.contains("\"age\" = 0"), "{sql}");
    }

    #[test]
    fn test_strict_blank_builds_predicate() {
        let mut set = FilterSet::default();
        set.filter_strict("name", "eq", json!(""));
        let sql = render(&set);
        assert!(sql.contains("\"name\" = ''"), "{sql}");
    }

    #[test]
    fn test_explicit_null_becomes_is_null() {
        let mut set = FilterSet::default();
        set.filter("deleted_at", "eq", json!(crate::value::NULL_SENTINEL));
        let sql = render(&set);
        assert!(sql.contains("\"deleted_at\" IS NULL"), "{sql}");

        let mut negated = FilterSet::default();
        negated.filter("deleted_at", "neq", json!(crate::value::NULL_SENTINEL));
        let sql = render(&negated);
        assert!(sql.contains("\"deleted_at\" IS NOT NULL"), "{sql}");
    }

    #[test]
    fn test_in_spreads_array_value() {
        let mut set = FilterSet::default();
        set.filter("status", "in", json!(["a", "b"]));
        let sql = render(&set);
        assert!(sql.contains("\"status\" IN ('a', 'b')"), "{sql}");
    }

    #[test]
    fn test_between_takes_two_bounds() {
        let mut set = FilterSet::default();
        set.filter("age", "btw", json!([18, 65]));
        let sql = render(&set);
        assert!(sql.contains("\"age\" BETWEEN 18 AND 65"), "{sql}");
    }

    #[test]
    fn test_between_with_one_bound_is_skipped() {
        let mut set = FilterSet::default();
        set.filter("age", "btw", json!([18]));
        let sql = render(&set);
        assert!(!sql.contains("BETWEEN"), "{sql}");
    }

    #[test]
    fn test_unknown_operator_passes_through_with_bound_value() {
        let mut set = FilterSet::default();
        set.filter("name", "sounds like", json!("ann"));
        let sql = render(&set);
        assert!(sql.contains("name sounds like 'ann'"), "{sql}");
    }

    #[test]
    fn test_resetting_field_operator_replaces_value() {
        let mut set = FilterSet::default();
        set.filter("status", "eq", json!("1"));
        set.filter("status", "=", json!("2"));
        let entries: Vec<_> = set.iter().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].value, FilterValue::Present(json!("2")));
    }

    #[test]
    fn test_to_json_echo_shape() {
        let mut set = FilterSet::default();
        set.filter("age", "gte", json!(18));
        set.filter("age", "lte", json!(65));
        assert_eq!(set.to_json(), json!({"age": {">=": 18, "<=": 65}}));
    }
}
