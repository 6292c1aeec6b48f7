//! Common types used throughout soda-fetch
//!
//! Shared type aliases for records and pages, and the SoQL directive set
//! recognized by the query builder.

use std::collections::BTreeMap;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// A single dataset row as returned by the endpoint
pub type Record = JsonObject;

/// One page of records
pub type Page = Vec<Record>;

/// Filter mapping passed through verbatim as query parameters.
///
/// Ordered by key so the generated URL is stable between runs.
pub type Filters = BTreeMap<String, String>;

// ============================================================================
// SoQL Directives
// ============================================================================

/// SoQL query directives recognized in the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoqlDirective {
    Select,
    Where,
    Order,
    Group,
    Limit,
    Offset,
}

impl SoqlDirective {
    /// All directives, in the order they are appended to a query string
    pub const ALL: [SoqlDirective; 6] = [
        SoqlDirective::Select,
        SoqlDirective::Where,
        SoqlDirective::Order,
        SoqlDirective::Group,
        SoqlDirective::Limit,
        SoqlDirective::Offset,
    ];

    /// Query parameter name, including the `$` prefix
    pub fn param(&self) -> &'static str {
        match self {
            SoqlDirective::Select => "$select",
            SoqlDirective::Where => "$where",
            SoqlDirective::Order => "$order",
            SoqlDirective::Group => "$group",
            SoqlDirective::Limit => "$limit",
            SoqlDirective::Offset => "$offset",
        }
    }
}

impl std::fmt::Display for SoqlDirective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.param())
    }
}
