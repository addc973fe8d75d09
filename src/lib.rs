//! # querysieve
//!
//! Declarative request-parameter filtering, sorting and pagination for
//! Sea-ORM backed APIs.
//!
//! A flat parameter map like
//!
//! ```text
//! f[status][eq]=1&f__name__lk=ann&q[ofBranch]=west&o[created_at]=desc&page=2&size=25
//! ```
//!
//! decodes into structured filter, scope-query and order sets, gets field
//! names disambiguated across joined tables, and runs as a safe, cloned
//! sea-query statement producing counts, rows, pagination envelopes or
//! spreadsheet-ready export rows.
//!
//! ## Parameter groups
//!
//! - **Filters**: `f[field][op]=value` or `f__field__op=value`; a bare
//!   `f[field]=value` means equality. Operator aliases (`gte`, `lk`,
//!   `nbtw`, …) resolve through [`operators::resolve`]; unknown tokens pass
//!   through to the data store verbatim.
//! - **Scope queries**: `q[name]=value` invokes the handler registered
//!   under `name` in the [`ScopeRegistry`]; unregistered names are ignored.
//! - **Orders**: `o[field]=asc|desc`; with none supplied, results order by
//!   the primary key descending.
//! - **Paging**: `page` (1-based) and `size`/`per_page`; invalid input
//!   coerces to defaults.
//!
//! ## Blank values
//!
//! A blank filter or scope value is skipped, so callers can submit whole
//! forms without every field becoming a predicate. The reserved tokens
//! `__EMPTY__` and `__NULL__` request an explicit empty-string or `IS NULL`
//! match instead; see [`value::FilterValue`].
//!
//! ## Terminal operations
//!
//! [`ApiHelper`] exposes `count`, `find`, `find_many`, `first`, `get`,
//! `all`, `paginate`, `data`, `datable` and `export`. Each runs on a fresh
//! clone of the bound [`QuerySource`], so the helper can serve them in any
//! order, any number of times.

pub mod columns;
pub mod decode;
pub mod errors;
pub mod filters;
pub mod helper;
pub mod models;
pub mod operators;
pub mod orders;
pub mod pagination;
pub mod schema;
pub mod scopes;
pub mod source;
pub mod value;

pub use columns::ColumnAliasMap;
pub use decode::{DecodedParams, decode_params};
pub use errors::SieveError;
pub use filters::{FilterCondition, FilterSet};
pub use helper::ApiHelper;
pub use models::{DataEnvelope, DatableEnvelope, Page};
pub use orders::{Direction, OrderSet, OrderSpec};
pub use pagination::{DEFAULT_PER_PAGE, PageSpec};
pub use schema::{CachedSchemaProvider, DbSchemaProvider, SchemaProvider, StaticSchemaProvider};
pub use scopes::{ScopeHandler, ScopeQuerySet, ScopeRegistry};
pub use source::{QuerySource, TableRef};
pub use value::{EMPTY_SENTINEL, FilterValue, NULL_SENTINEL};
