//! Session service - cookie tokens, login state and one-shot notices
//!
//! The browser holds a random token; the database holds only its SHA-256,
//! so a leaked database does not hand out live sessions.

use std::sync::Arc;

use anyhow::Result;
use base64::Engine;
use chrono::{Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::adapters::duckdb::DuckDbRepository;
use crate::domain::{Flash, Session, User};

pub struct SessionService {
    repository: Arc<DuckDbRepository>,
    ttl: Duration,
}

impl SessionService {
    pub fn new(repository: Arc<DuckDbRepository>, ttl_hours: i64) -> Self {
        Self {
            repository,
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Start a session for a user and return the cookie token
    pub fn create(&self, user_id: i64) -> Result<String> {
        let token = generate_token();
        let now = Utc::now();
        self.repository.insert_session(&Session {
            token_hash: hash_token(&token),
            user_id,
            created_at: now,
            expires_at: now + self.ttl,
            flash: Vec::new(),
        })?;
        debug!(user_id, "session created");
        Ok(token)
    }

    /// The user behind a token, if the session exists and has not expired
    pub fn resolve(&self, token: &str) -> Result<Option<User>> {
        let token_hash = hash_token(token);
        let Some(session) = self.repository.get_session(&token_hash)? else {
            return Ok(None);
        };

        if session.is_expired(Utc::now()) {
            self.repository.delete_session(&token_hash)?;
            return Ok(None);
        }

        self.repository.get_user_by_id(session.user_id)
    }

    pub fn destroy(&self, token: &str) -> Result<()> {
        self.repository.delete_session(&hash_token(token))
    }

    /// Queue a notice for the next page rendered on this session
    pub fn push_flash(&self, token: &str, flash: Flash) -> Result<()> {
        self.repository
            .update_session_flash(&hash_token(token), |pending| pending.push(flash))?;
        Ok(())
    }

    /// Remove and return every queued notice
    pub fn take_flash(&self, token: &str) -> Result<Vec<Flash>> {
        let taken = self
            .repository
            .update_session_flash(&hash_token(token), std::mem::take)?;
        Ok(taken.unwrap_or_default())
    }

    /// Drop expired sessions, returning how many were removed
    pub fn purge_expired(&self) -> Result<usize> {
        self.repository.delete_expired_sessions(Utc::now())
    }
}

fn generate_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewUser;

    fn setup(ttl_hours: i64) -> (SessionService, User) {
        let repo = Arc::new(DuckDbRepository::open_in_memory().unwrap());
        repo.ensure_schema().unwrap();
        let user = repo
            .insert_user(&NewUser::new("alice", "alice@example.com", "hash"), Utc::now())
            .unwrap();
        (SessionService::new(repo, ttl_hours), user)
    }

    #[test]
    fn test_tokens_are_unique_and_url_safe() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_create_and_resolve() {
        let (service, user) = setup(1);
        let token = service.create(user.id).unwrap();
        assert_eq!(service.resolve(&token).unwrap().unwrap().id, user.id);
        assert!(service.resolve("not-a-token").unwrap().is_none());

        service.destroy(&token).unwrap();
        assert!(service.resolve(&token).unwrap().is_none());
    }

    #[test]
    fn test_expired_session_does_not_resolve() {
        let (service, user) = setup(0);
        let token = service.create(user.id).unwrap();
        assert!(service.resolve(&token).unwrap().is_none());
    }

    #[test]
    fn test_purge_removes_only_expired() {
        let (expired, user) = setup(0);
        expired.create(user.id).unwrap();
        assert_eq!(expired.purge_expired().unwrap(), 1);
        assert_eq!(expired.purge_expired().unwrap(), 0);
    }

    #[test]
    fn test_flash_is_shown_once() {
        let (service, user) = setup(1);
        let token = service.create(user.id).unwrap();

        service.push_flash(&token, Flash::success("one")).unwrap();
        service.push_flash(&token, Flash::info("two")).unwrap();

        let taken = service.take_flash(&token).unwrap();
        assert_eq!(taken, vec![Flash::success("one"), Flash::info("two")]);
        assert!(service.take_flash(&token).unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_flash_pushes_are_all_kept() {
        let (service, user) = setup(1);
        let token = service.create(user.id).unwrap();
        let service = Arc::new(service);
        let barrier = Arc::new(std::sync::Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let service = Arc::clone(&service);
                let barrier = Arc::clone(&barrier);
                let token = token.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    service
                        .push_flash(&token, Flash::info(format!("notice {}", i)))
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(service.take_flash(&token).unwrap().len(), 8);
    }

    #[test]
    fn test_flash_on_unknown_session_is_ignored() {
        let (service, _) = setup(1);
        service.push_flash("gone", Flash::info("lost")).unwrap();
        assert!(service.take_flash("gone").unwrap().is_empty());
    }
}
