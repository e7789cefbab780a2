//! Lookup service - fetch a thought by id from a query-string value
//!
//! Two implementations sit side by side. The injectable one pastes the raw
//! value into the SQL text and returns every row the resulting query
//! produces. The parameterized one accepts only integers, binds the value
//! and returns at most one row.

use std::sync::Arc;

use anyhow::Result;
use serde_json::json;
use tracing::debug;

use crate::adapters::duckdb::{DuckDbRepository, QueryResult};
use crate::config::FlawSwitches;

const COLUMNS: [&str; 2] = ["id", "text"];

pub struct LookupService {
    repository: Arc<DuckDbRepository>,
    flaws: FlawSwitches,
}

impl LookupService {
    pub fn new(repository: Arc<DuckDbRepository>, flaws: FlawSwitches) -> Self {
        Self { repository, flaws }
    }

    /// Look up thoughts for a raw `id` parameter
    ///
    /// `None` when no id was given (absent or empty), which the page renders
    /// as "nothing searched yet".
    pub fn lookup(&self, raw_id: Option<&str>) -> Result<Option<QueryResult>> {
        let Some(raw_id) = raw_id.filter(|id| !id.is_empty()) else {
            return Ok(None);
        };

        let result = if self.flaws.sql_injection {
            self.lookup_injectable(raw_id)?
        } else {
            self.lookup_parameterized(raw_id)?
        };
        Ok(Some(result))
    }

    /// String-built query. Operators, subqueries and UNIONs in `raw_id`
    /// become part of the statement. SQL errors propagate to the caller.
    pub fn lookup_injectable(&self, raw_id: &str) -> Result<QueryResult> {
        let query = format!("SELECT id, text FROM users_thought WHERE id = {raw_id}");
        debug!(%query, "lookup query");
        let result = self.repository.execute_raw_query(&query)?;
        debug!(row_count = result.row_count, "lookup result");
        Ok(result)
    }

    /// Integer-validated, bound-parameter query returning at most one row.
    /// Non-numeric input yields an empty result.
    pub fn lookup_parameterized(&self, raw_id: &str) -> Result<QueryResult> {
        let Ok(id) = raw_id.trim().parse::<i64>() else {
            debug!("lookup id is not an integer");
            return Ok(QueryResult::empty(&COLUMNS));
        };

        let mut result = QueryResult::empty(&COLUMNS);
        if let Some((id, text)) = self.repository.get_thought_row(id)? {
            result.rows.push(vec![json!(id), json!(text)]);
            result.row_count = 1;
        }
        Ok(result)
    }
}
