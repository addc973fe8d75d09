//! Operator alias resolution.
//!
//! Request filters name their comparison with a short token
//! (`f[age][gte]=18`, `f[name][lk]=ann`). This module maps those tokens to
//! the canonical operator the query layer understands. Resolution is
//! case-insensitive; a token that is not in the table is returned unchanged
//! and flows to the query builder verbatim. That pass-through is a trust
//! boundary, not validation: the data store is the one that rejects an
//! operator it cannot execute.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Alias table: short token → canonical operator.
///
/// The numeric aliases `0`/`1` are positional shorthands for range filters
/// (`f[age][0]=18&f[age][1]=65` reads as `age >= 18 AND age <= 65`).
pub static OPERATOR_ALIASES: &[(&str, &str)] = &[
    ("0", ">="),
    ("1", "<="),
    ("in", "in"),
    ("nin", "not in"),
    ("is", "is"),
    ("min", ">="),
    ("gte", ">="),
    ("max", "<="),
    ("lte", "<="),
    ("btw", "between"),
    ("nbtw", "not between"),
    ("gt", ">"),
    ("lt", "<"),
    ("neq", "<>"),
    ("ne", "<>"),
    ("eq", "="),
    ("equal", "="),
    ("lk", "like"),
    ("like", "like"),
    ("lkb", "like binary"),
    ("nlk", "not like"),
    ("nlkb", "not like binary"),
    ("rlk", "rlike"),
    ("ilk", "ilike"),
    ("and", "&"),
    ("or", "|"),
    ("xor", "^"),
    ("left_shift", "<<"),
    ("right_shift", ">>"),
    ("bitwise_not", "~"),
    ("bitwise_not_any", "~*"),
    ("not_bitwise_not", "!~"),
    ("not_bitwise_not_any", "!~*"),
    ("regexp", "regexp"),
    ("not_regexp", "not regexp"),
    ("similar_to", "similar to"),
    ("not_similar_to", "not similar to"),
];

static LOOKUP: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| OPERATOR_ALIASES.iter().copied().collect());

/// Resolve a short alias to its canonical operator.
///
/// ```
/// use querysieve::operators::resolve;
///
/// assert_eq!(resolve("gte"), ">=");
/// assert_eq!(resolve("LK"), "like");
/// assert_eq!(resolve("sounds like"), "sounds like"); // pass-through
/// ```
#[must_use]
pub fn resolve(operator: &str) -> Cow<'_, str> {
    let lowered = operator.to_ascii_lowercase();
    match LOOKUP.get(lowered.as_str()) {
        Some(canonical) => Cow::Borrowed(*canonical),
        None => Cow::Borrowed(operator),
    }
}
