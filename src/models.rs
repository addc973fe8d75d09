//! Response envelopes.
//!
//! Rows come back as keyed JSON objects (the engine is schema-generic), so
//! the envelopes carry `serde_json::Value` data alongside the pagination
//! metadata. [`DataEnvelope`] additionally echoes the filter/scope/order
//! state that produced the page, so a caller can round-trip applied state;
//! [`DatableEnvelope`] adds the unfiltered and filtered totals that
//! table-widget consumers need for "N of M" displays.

use serde::Serialize;
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

/// One page of rows plus the standard pagination metadata.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Page {
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<JsonValue>,
    pub current_page: u64,
    pub per_page: u64,
    /// Row count with the active filters applied.
    pub total: u64,
    pub last_page: u64,
    /// 1-based index of the first row on this page; 0 when the page is empty.
    pub from: u64,
    /// 1-based index of the last row on this page; 0 when the page is empty.
    pub to: u64,
}

impl Page {
    pub(crate) fn assemble(data: Vec<JsonValue>, page: u64, per_page: u64, total: u64) -> Self {
        let last_page = if total == 0 {
            1
        } else {
            total.div_ceil(per_page.max(1))
        };
        let (from, to) = if data.is_empty() {
            (0, 0)
        } else {
            let from = page
                .saturating_sub(1)
                .saturating_mul(per_page)
                .saturating_add(1);
            (from, from + data.len() as u64 - 1)
        };
        Self {
            data,
            current_page: page,
            per_page,
            total,
            last_page,
            from,
            to,
        }
    }
}

/// A [`Page`] plus the filter/scope/order state that produced it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DataEnvelope {
    #[serde(flatten)]
    pub page: Page,
    #[schema(value_type = Object)]
    pub filters: JsonValue,
    #[schema(value_type = Object)]
    pub queries: JsonValue,
    #[schema(value_type = Object)]
    pub orders: JsonValue,
}

/// A [`DataEnvelope`] plus grand totals, for consumers that show
/// "N of M" counts.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DatableEnvelope {
    #[serde(flatten)]
    pub data: DataEnvelope,
    /// Row count with no filters or scopes applied.
    #[serde(rename = "recordsTotal")]
    pub records_total: u64,
    /// Row count with the active filters and scopes applied.
    #[serde(rename = "recordsFiltered")]
    pub records_filtered: u64,
}
