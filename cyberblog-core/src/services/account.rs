//! Account service - registration, login and removal

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tracing::info;

use super::password::{hash_password, verify_password};
use crate::adapters::duckdb::DuckDbRepository;
use crate::domain::forms::{FormErrors, LoginForm, RegistrationForm, Submission};
use crate::domain::result::Error;
use crate::domain::{NewUser, User};

pub struct AccountService {
    repository: Arc<DuckDbRepository>,
}

impl AccountService {
    pub fn new(repository: Arc<DuckDbRepository>) -> Self {
        Self { repository }
    }

    /// Create a user and its empty profile
    ///
    /// The two inserts are separate statements with no surrounding
    /// transaction. A failure between them leaves a user without a profile,
    /// which the profile page repairs by creating one on first visit.
    pub fn register(&self, form: &RegistrationForm) -> Result<Submission<User>> {
        let mut errors = form.validate();

        if !errors.has_field("username") && self.repository.username_taken(&form.username)? {
            errors.add("username", "A user with that username already exists.");
        }
        if !errors.is_empty() {
            return Ok(Submission::Rejected(errors));
        }

        let password_hash = hash_password(&form.password1)?;
        let user = self.repository.insert_user(
            &NewUser::new(&form.username, &form.email, password_hash),
            Utc::now(),
        )?;
        self.repository.insert_profile(user.id)?;

        info!(user_id = user.id, "registered user");
        Ok(Submission::Accepted(user))
    }

    /// Check credentials; rejection carries the generic login message
    pub fn authenticate(&self, form: &LoginForm) -> Result<Submission<User>> {
        let errors = form.validate();
        if !errors.is_empty() {
            return Ok(Submission::Rejected(errors));
        }

        let user = self.repository.get_user_by_username(&form.username)?;
        let valid = match &user {
            Some(user) => verify_password(&form.password, &user.password_hash)?,
            None => false,
        };

        match user {
            Some(user) if valid => Ok(Submission::Accepted(user)),
            _ => {
                let mut errors = FormErrors::new();
                errors.add_non_field(LoginForm::INVALID_LOGIN);
                Ok(Submission::Rejected(errors))
            }
        }
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        self.repository.get_users()
    }

    /// Delete a user by name along with its profile, thoughts and sessions
    pub fn delete_by_username(&self, username: &str) -> Result<User> {
        let user = self
            .repository
            .get_user_by_username(username)?
            .ok_or_else(|| Error::not_found(format!("user '{}'", username)))?;
        self.repository.delete_user(user.id)?;
        info!(user_id = user.id, "deleted user");
        Ok(user)
    }
}
