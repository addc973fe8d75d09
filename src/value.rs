//! Tagged filter values.
//!
//! A request-supplied value carries a presence tag so downstream logic can
//! tell "the caller left this blank, ignore the predicate" apart from "the
//! caller explicitly wants the empty string" and "the caller explicitly
//! wants `IS NULL`". The blank-means-ignore policy lets HTML forms submit
//! every field without every field turning into a predicate.
//!
//! On the wire the two explicit cases are spelled with reserved tokens
//! ([`EMPTY_SENTINEL`], [`NULL_SENTINEL`]); they are decoded into the tag at
//! ingestion so the reserved strings never collide with stored data.

use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

/// Wire token requesting an explicit empty-string match.
pub const EMPTY_SENTINEL: &str = "__EMPTY__";

/// Wire token requesting an explicit `IS NULL` match.
pub const NULL_SENTINEL: &str = "__NULL__";

/// A request-supplied value with its presence tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// Nothing usable was supplied; the predicate is skipped.
    Absent,
    /// A concrete scalar or array value.
    Present(JsonValue),
    /// Match the empty string.
    ExplicitEmpty,
    /// Match SQL NULL.
    ExplicitNull,
}

impl FilterValue {
    /// Ingest a raw parameter value.
    ///
    /// Blank input (the empty string, JSON null, an empty array) becomes
    /// [`FilterValue::Absent`]. The reserved wire tokens map to their
    /// explicit tags. Numbers and booleans are always present, so `0` and
    /// `false` still filter.
    #[must_use]
    pub fn from_param(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Absent,
            JsonValue::String(s) if s.is_empty() => Self::Absent,
            JsonValue::String(s) if s == EMPTY_SENTINEL => Self::ExplicitEmpty,
            JsonValue::String(s) if s == NULL_SENTINEL => Self::ExplicitNull,
            JsonValue::Array(items) if items.is_empty() => Self::Absent,
            other => Self::Present(other),
        }
    }

    /// Ingest a value verbatim, bypassing blank detection and sentinel
    /// decoding. An empty string stays an empty-string predicate.
    #[must_use]
    pub fn strict(value: JsonValue) -> Self {
        Self::Present(value)
    }

    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Decode back to the plain JSON form, for scope arguments and for
    /// echoing applied state to the caller.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Absent | Self::ExplicitNull => JsonValue::Null,
            Self::ExplicitEmpty => JsonValue::String(String::new()),
            Self::Present(value) => value.clone(),
        }
    }
}

impl Serialize for FilterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
