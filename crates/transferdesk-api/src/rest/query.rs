// PostgREST query-string builder.
//
// Filters are encoded as `column=op.value`; `select`, `order` and `limit`
// are reserved parameter names.

use std::fmt;

/// Query parameters for a PostgREST request, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Columns to project (`select=a,b,c`).
    pub fn select(mut self, columns: &str) -> Self {
        self.params.push(("select".into(), columns.into()));
        self
    }

    /// Equality filter (`column=eq.value`).
    pub fn eq(mut self, column: &str, value: impl fmt::Display) -> Self {
        self.params.push((column.into(), format!("eq.{value}")));
        self
    }

    /// Descending order on a column.
    pub fn order_desc(mut self, column: &str) -> Self {
        self.params.push(("order".into(), format!("{column}.desc")));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.params.push(("limit".into(), limit.to_string()));
        self
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}
