//! Thought service - posting and listing thoughts

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tracing::info;

use crate::adapters::duckdb::DuckDbRepository;
use crate::config::FlawSwitches;
use crate::domain::forms::{Submission, ThoughtForm};
use crate::domain::{Thought, User};

pub struct ThoughtService {
    repository: Arc<DuckDbRepository>,
    flaws: FlawSwitches,
}

impl ThoughtService {
    pub fn new(repository: Arc<DuckDbRepository>, flaws: FlawSwitches) -> Self {
        Self { repository, flaws }
    }

    /// Store a thought owned by `author`
    ///
    /// The page handler passes the signed-in caller here, never the user
    /// whose page is open: writes are scoped to the caller even while reads
    /// follow the requested user.
    pub fn post(&self, author: &User, form: &ThoughtForm) -> Result<Submission<Thought>> {
        let errors = form.validate();
        if !errors.is_empty() {
            return Ok(Submission::Rejected(errors));
        }

        let thought = self
            .repository
            .insert_thought(author.id, &form.text, Utc::now())?;
        info!(thought_id = thought.id, user_id = author.id, "thought posted");
        Ok(Submission::Accepted(thought))
    }

    /// Thoughts shown on a profile page, newest first
    ///
    /// With broken access control on, this lists the target's thoughts with
    /// no ownership check. With it off, only the caller's own.
    pub fn list_for_page(&self, caller: &User, target: &User) -> Result<Vec<Thought>> {
        let owner = if self.flaws.broken_access_control {
            target.id
        } else {
            caller.id
        };
        self.repository.get_thoughts_by_user(owner)
    }
}
