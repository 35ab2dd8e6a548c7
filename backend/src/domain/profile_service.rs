//! Profile read/write use-cases.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::error::Error;
use super::events::{ChangeEvent, RecordKind};
use super::ports::{ChangePublisher, ProfileRepository};
use super::profile::{Profile, ProfileChanges, UserId, validate_bio, validate_display_name};
use super::username::Username;

/// Profile use-cases over a [`ProfileRepository`].
pub struct ProfileService<P: ?Sized> {
    profiles: Arc<P>,
    publisher: Arc<dyn ChangePublisher>,
}

impl<P: ?Sized> ProfileService<P> {
    pub fn new(profiles: Arc<P>, publisher: Arc<dyn ChangePublisher>) -> Self {
        Self {
            profiles,
            publisher,
        }
    }
}

impl<P: ProfileRepository + ?Sized> ProfileService<P> {
    /// Fetch a profile by owner id.
    pub async fn get(&self, user_id: &UserId) -> Result<Profile, Error> {
        self.profiles
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("no profile for user {user_id}")))
    }

    /// Fetch a profile by its public handle, case-insensitively.
    pub async fn get_by_username(&self, handle: &str) -> Result<Profile, Error> {
        self.profiles
            .find_by_username_lower(&handle.to_lowercase())
            .await?
            .ok_or_else(|| Error::not_found(format!("no profile with username {handle}")))
    }

    /// Create a profile for a user who does not have one yet.
    pub async fn create(
        &self,
        user_id: UserId,
        username: Username,
        display_name: String,
    ) -> Result<Profile, Error> {
        if self.profiles.find_by_user_id(&user_id).await?.is_some() {
            return Err(Error::conflict(format!(
                "user {user_id} already has a profile"
            )));
        }
        self.ensure_handle_free(&username, &user_id).await?;

        let profile = Profile::new(user_id, username, display_name)?;
        self.profiles.upsert(&profile).await?;
        info!(user_id = %profile.user_id, username = %profile.username, "profile created");
        self.publisher
            .publish(ChangeEvent::insert(user_id, RecordKind::Profile, &profile));
        Ok(profile)
    }

    /// Apply changes to an existing profile. A failed save leaves the stored
    /// profile untouched.
    pub async fn update(
        &self,
        user_id: &UserId,
        changes: ProfileChanges,
    ) -> Result<Profile, Error> {
        let previous = self.get(user_id).await?;
        let mut updated = previous.clone();

        if let Some(username) = changes.username {
            if username.to_lowercase() != previous.username.to_lowercase() {
                self.ensure_handle_free(&username, user_id).await?;
            }
            updated.username = username;
        }
        if let Some(display_name) = changes.display_name {
            updated.display_name = validate_display_name(display_name)?;
        }
        if let Some(bio) = changes.bio {
            updated.bio = validate_bio(bio)?;
        }
        if let Some(avatar_url) = changes.avatar_url {
            updated.avatar_url = avatar_url;
        }
        updated.updated_at = Utc::now();

        self.profiles.upsert(&updated).await?;
        self.publisher.publish(ChangeEvent::update(
            *user_id,
            RecordKind::Profile,
            &updated,
            Some(&previous),
        ));
        Ok(updated)
    }

    /// Reject a handle that belongs to a different user.
    async fn ensure_handle_free(&self, username: &Username, owner: &UserId) -> Result<(), Error> {
        match self
            .profiles
            .find_by_username_lower(&username.to_lowercase())
            .await?
        {
            Some(existing) if existing.user_id != *owner => Err(Error::conflict(format!(
                "username {username} is already taken"
            ))),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockProfileRepository, NoopChangePublisher};

    fn service(repo: MockProfileRepository) -> ProfileService<MockProfileRepository> {
        ProfileService::new(Arc::new(repo), Arc::new(NoopChangePublisher))
    }

    fn handle(value: &str) -> Username {
        Username::new(value).expect("valid handle")
    }

    #[tokio::test]
    async fn create_rejects_second_profile_for_same_user() {
        let user_id = UserId::random();
        let existing = Profile::new(user_id, handle("existing"), "Existing").expect("valid");
        let mut repo = MockProfileRepository::new();
        repo.expect_find_by_user_id()
            .times(1)
            .return_once(move |_| Ok(Some(existing)));

        let error = service(repo)
            .create(user_id, handle("another"), "Another".into())
            .await
            .expect_err("conflict");
        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn create_rejects_taken_handle() {
        let user_id = UserId::random();
        let other = Profile::new(UserId::random(), handle("wanted"), "Other").expect("valid");
        let mut repo = MockProfileRepository::new();
        repo.expect_find_by_user_id()
            .times(1)
            .return_once(|_| Ok(None));
        repo.expect_find_by_username_lower()
            .times(1)
            .return_once(move |_| Ok(Some(other)));
        repo.expect_upsert().times(0);

        let error = service(repo)
            .create(user_id, handle("wanted"), "Me".into())
            .await
            .expect_err("conflict");
        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn create_persists_new_profile() {
        let user_id = UserId::random();
        let mut repo = MockProfileRepository::new();
        repo.expect_find_by_user_id()
            .times(1)
            .return_once(|_| Ok(None));
        repo.expect_find_by_username_lower()
            .times(1)
            .return_once(|_| Ok(None));
        repo.expect_upsert().times(1).return_once(|_| Ok(()));

        let profile = service(repo)
            .create(user_id, handle("newbie"), "Newbie".into())
            .await
            .expect("created");
        assert_eq!(profile.user_id, user_id);
        assert_eq!(profile.username.as_str(), "newbie");
    }

    #[tokio::test]
    async fn update_allows_reclaiming_own_handle_with_different_case() {
        let user_id = UserId::random();
        let current = Profile::new(user_id, handle("casey"), "Casey").expect("valid");
        let mut repo = MockProfileRepository::new();
        repo.expect_find_by_user_id()
            .times(1)
            .return_once(move |_| Ok(Some(current)));
        // Same handle, different case: no collision lookup is needed.
        repo.expect_find_by_username_lower().times(0);
        repo.expect_upsert().times(1).return_once(|_| Ok(()));

        let updated = service(repo)
            .update(
                &user_id,
                ProfileChanges {
                    username: Some(handle("Casey")),
                    ..ProfileChanges::default()
                },
            )
            .await
            .expect("updated");
        assert_eq!(updated.username.as_str(), "Casey");
    }

    #[tokio::test]
    async fn update_surfaces_missing_profile() {
        let mut repo = MockProfileRepository::new();
        repo.expect_find_by_user_id()
            .times(1)
            .return_once(|_| Ok(None));

        let error = service(repo)
            .update(&UserId::random(), ProfileChanges::default())
            .await
            .expect_err("missing");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn get_by_username_is_case_insensitive() {
        let profile = Profile::new(UserId::random(), handle("casey"), "Casey").expect("valid");
        let expected = profile.clone();
        let mut repo = MockProfileRepository::new();
        repo.expect_find_by_username_lower()
            .withf(|lowered| lowered == "casey")
            .times(1)
            .return_once(move |_| Ok(Some(profile)));

        let found = service(repo).get_by_username("CASEY").await.expect("found");
        assert_eq!(found, expected);
    }
}
