//! Named query scopes.
//!
//! A scope is a pre-registered transformation of the statement under
//! construction ("the composite predicate we call `ofStatus`") that a
//! request invokes by name through the `q` parameter group and parameterizes
//! with caller-supplied values. Handlers are registered once at
//! configuration time in a [`ScopeRegistry`]; application looks names up in
//! the registry, and a name nobody registered applies nothing. That silence
//! is deliberate: callers may probe scopes that only some entity types
//! carry.

use sea_orm::sea_query::SelectStatement;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use crate::value::FilterValue;

/// Handler invoked with the statement under construction and the caller's
/// positional arguments.
pub type ScopeHandler = dyn Fn(&mut SelectStatement, &[JsonValue]) + Send + Sync;

/// Scope handlers registered at configuration time, by wire name.
#[derive(Default)]
pub struct ScopeRegistry {
    handlers: HashMap<String, Box<ScopeHandler>>,
}

impl ScopeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`. Registering the same name again
    /// replaces the previous handler.
    pub fn register<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&mut SelectStatement, &[JsonValue]) + Send + Sync + 'static,
    {
        self.handlers.insert(name.into(), Box::new(handler));
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    fn get(&self, name: &str) -> Option<&ScopeHandler> {
        self.handlers.get(name).map(Box::as_ref)
    }
}

impl fmt::Debug for ScopeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeRegistry")
            .field("scopes", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Scope-name → argument pairs, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ScopeQuerySet {
    entries: Vec<(String, FilterValue)>,
}

impl ScopeQuerySet {
    /// Set a scope argument with sentinel-aware ingestion; re-setting a name
    /// replaces its value.
    pub fn set(&mut self, name: &str, value: JsonValue) {
        let value = FilterValue::from_param(value);
        if let Some(existing) = self.entries.iter_mut().find(|(n, _)| n == name) {
            existing.1 = value;
        } else {
            self.entries.push((name.to_string(), value));
        }
    }

    /// Build from a decoded `q` group (`scope name → value`).
    #[must_use]
    pub fn from_params(queries: &Map<String, JsonValue>) -> Self {
        let mut set = Self::default();
        for (name, value) in queries {
            set.set(name, value.clone());
        }
        set
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Echo form: `scope name → value`, tags rendered back to plain JSON.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        let mut map = Map::new();
        for (name, value) in &self.entries {
            map.insert(name.clone(), value.to_json());
        }
        JsonValue::Object(map)
    }
}

/// Invoke each applicable scope. Array values spread as positional
/// arguments; a scalar wraps into a single-element argument list. Blank
/// values and unregistered names apply nothing.
pub fn apply_scopes(stmt: &mut SelectStatement, scopes: &ScopeQuerySet, registry: &ScopeRegistry) {
    for (name, value) in &scopes.entries {
        if value.is_absent() {
            debug!(scope = %name, "blank scope value, skipped");
            continue;
        }
        let Some(handler) = registry.get(name) else {
            debug!(scope = %name, "no registered scope, ignored");
            continue;
        };
        let args = match value.to_json() {
            JsonValue::Array(items) => items,
            scalar => vec![scalar],
        };
        handler(stmt, &args);
    }
}
