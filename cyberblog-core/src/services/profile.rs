//! Profile service - whose page is being viewed, and avatar updates

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};
use uuid::Uuid;

use crate::adapters::duckdb::DuckDbRepository;
use crate::config::FlawSwitches;
use crate::domain::forms::{ProfileUpdateForm, Submission};
use crate::domain::{Profile, User};
use crate::ports::MediaStore;

/// Directory (relative to the media root) holding uploaded avatars
pub const AVATAR_DIR: &str = "profile_pics";

pub struct ProfileService {
    repository: Arc<DuckDbRepository>,
    media: Arc<dyn MediaStore>,
    flaws: FlawSwitches,
    max_avatar_bytes: usize,
}

impl ProfileService {
    pub fn new(
        repository: Arc<DuckDbRepository>,
        media: Arc<dyn MediaStore>,
        flaws: FlawSwitches,
        max_avatar_bytes: usize,
    ) -> Self {
        Self {
            repository,
            media,
            flaws,
            max_avatar_bytes,
        }
    }

    /// Decide whose page the caller sees and fetch (or create) that profile
    ///
    /// With broken access control on, the `user_id` query value is trusted
    /// as-is: any signed-in caller can open any other user's page. Values
    /// that name no user (including non-numeric ones) fall back to the
    /// caller. With it off, the parameter is ignored.
    pub fn resolve_target(&self, caller: &User, requested: Option<&str>) -> Result<(User, Profile)> {
        let target = if self.flaws.broken_access_control {
            self.lookup_requested(caller, requested)?
        } else {
            caller.clone()
        };

        let (profile, created) = self.repository.get_or_create_profile(target.id)?;
        if created {
            debug!(user_id = target.id, "created missing profile");
        }
        Ok((target, profile))
    }

    fn lookup_requested(&self, caller: &User, requested: Option<&str>) -> Result<User> {
        let Some(raw) = requested else {
            return Ok(caller.clone());
        };

        let found = match raw.trim().parse::<i64>() {
            Ok(id) if id == caller.id => None,
            Ok(id) => self.repository.get_user_by_id(id)?,
            Err(_) => None,
        };

        match found {
            Some(user) => {
                debug!(caller = caller.id, target = user.id, "viewing another user's page");
                Ok(user)
            }
            None => Ok(caller.clone()),
        }
    }

    /// Validate and store a new avatar for `profile`
    ///
    /// The previous upload is removed once the new one is recorded; the
    /// stock avatar is never touched.
    pub fn update_picture(
        &self,
        profile: &Profile,
        form: &ProfileUpdateForm,
    ) -> Result<Submission<Profile>> {
        let image = match form.validate(self.max_avatar_bytes) {
            Ok(image) => image,
            Err(errors) => return Ok(Submission::Rejected(errors)),
        };

        let relative_path = format!(
            "{}/{}.{}",
            AVATAR_DIR,
            Uuid::new_v4(),
            image.format.extension()
        );
        self.media.save(&relative_path, &image.bytes)?;
        self.repository
            .update_profile_image(profile.id, &relative_path)?;

        if profile.image.starts_with(AVATAR_DIR) {
            self.media.delete(&profile.image)?;
        }

        info!(profile_id = profile.id, "updated profile picture");
        Ok(Submission::Accepted(Profile {
            image: relative_path,
            ..profile.clone()
        }))
    }
}
