//! Status service - row counts and active flaw switches

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;

use crate::adapters::duckdb::DuckDbRepository;
use crate::config::FlawSwitches;

pub struct StatusService {
    repository: Arc<DuckDbRepository>,
    flaws: FlawSwitches,
}

impl StatusService {
    pub fn new(repository: Arc<DuckDbRepository>, flaws: FlawSwitches) -> Self {
        Self { repository, flaws }
    }

    pub fn get_status(&self) -> Result<StatusSummary> {
        Ok(StatusSummary {
            total_users: self.repository.count_users()?,
            total_profiles: self.repository.count_profiles()?,
            total_thoughts: self.repository.count_thoughts()?,
            live_sessions: self.repository.count_live_sessions(Utc::now())?,
            flaws: self.flaws,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub total_users: i64,
    pub total_profiles: i64,
    pub total_thoughts: i64,
    pub live_sessions: i64,
    pub flaws: FlawSwitches,
}
