//! Machine-readable run report.

use crate::tally::ResultTally;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// JSON document printed by `--format json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub title: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub strict: bool,
    pub exit_code: i32,
    pub results: ResultTally,
}

impl RunReport {
    pub fn new(
        title: impl Into<String>,
        started_at: DateTime<Utc>,
        strict: bool,
        results: ResultTally,
    ) -> Self {
        let exit_code = if strict { results.exit_code() } else { 0 };
        Self {
            title: title.into(),
            started_at,
            finished_at: Utc::now(),
            strict,
            exit_code,
            results,
        }
    }
}
