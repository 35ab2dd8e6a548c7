//! In-memory repository adapters.
//!
//! These back the mock-datastore composition used in development and in
//! integration tests. Behaviour matches the Diesel adapters observably:
//! the same ordering guarantees, the same miss semantics, the same
//! case-insensitive handle lookups.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{
    LinkRepository, LinkRepositoryError, NotificationRepository, NotificationRepositoryError,
    ProfileRepository, ProfileRepositoryError, TipRepository, TipRepositoryError,
};
use crate::domain::{Link, LinkId, Notification, NotificationId, Profile, Tip, UserId};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory implementation of the `ProfileRepository` port.
#[derive(Debug, Default)]
pub struct InMemoryProfileRepository {
    profiles: Mutex<HashMap<UserId, Profile>>,
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn find_by_user_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Profile>, ProfileRepositoryError> {
        Ok(lock(&self.profiles).get(user_id).cloned())
    }

    async fn find_by_username_lower(
        &self,
        username_lower: &str,
    ) -> Result<Option<Profile>, ProfileRepositoryError> {
        Ok(lock(&self.profiles)
            .values()
            .find(|profile| profile.username.to_lowercase() == username_lower)
            .cloned())
    }

    async fn upsert(&self, profile: &Profile) -> Result<(), ProfileRepositoryError> {
        let mut profiles = lock(&self.profiles);
        let taken = profiles.values().any(|existing| {
            existing.user_id != profile.user_id
                && existing.username.to_lowercase() == profile.username.to_lowercase()
        });
        if taken {
            return Err(ProfileRepositoryError::duplicate_username(
                profile.username.as_str(),
            ));
        }
        profiles.insert(profile.user_id, profile.clone());
        Ok(())
    }
}

/// In-memory implementation of the `LinkRepository` port.
#[derive(Debug, Default)]
pub struct InMemoryLinkRepository {
    links: Mutex<HashMap<LinkId, Link>>,
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn find(&self, link_id: &LinkId) -> Result<Option<Link>, LinkRepositoryError> {
        Ok(lock(&self.links).get(link_id).cloned())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Link>, LinkRepositoryError> {
        let mut links: Vec<Link> = lock(&self.links)
            .values()
            .filter(|link| link.user_id == *user_id)
            .cloned()
            .collect();
        links.sort_by_key(|link| link.position);
        Ok(links)
    }

    async fn insert(&self, link: &Link) -> Result<(), LinkRepositoryError> {
        lock(&self.links).insert(link.id, link.clone());
        Ok(())
    }

    async fn update(&self, link: &Link) -> Result<bool, LinkRepositoryError> {
        let mut links = lock(&self.links);
        match links.get_mut(&link.id) {
            Some(stored) => {
                *stored = link.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, link_id: &LinkId) -> Result<bool, LinkRepositoryError> {
        Ok(lock(&self.links).remove(link_id).is_some())
    }

    async fn record_click(&self, link_id: &LinkId) -> Result<Option<Link>, LinkRepositoryError> {
        let mut links = lock(&self.links);
        Ok(links.get_mut(link_id).map(|link| {
            link.clicks += 1;
            link.clone()
        }))
    }
}

/// In-memory implementation of the `NotificationRepository` port.
#[derive(Debug, Default)]
pub struct InMemoryNotificationRepository {
    notifications: Mutex<HashMap<NotificationId, Notification>>,
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn insert(
        &self,
        notification: &Notification,
    ) -> Result<(), NotificationRepositoryError> {
        lock(&self.notifications).insert(notification.id, notification.clone());
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Notification>, NotificationRepositoryError> {
        let mut notes: Vec<Notification> = lock(&self.notifications)
            .values()
            .filter(|note| note.user_id == *user_id)
            .cloned()
            .collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notes)
    }

    async fn mark_read(
        &self,
        user_id: &UserId,
        notification_id: &NotificationId,
    ) -> Result<Option<Notification>, NotificationRepositoryError> {
        let mut notifications = lock(&self.notifications);
        Ok(notifications
            .get_mut(notification_id)
            .filter(|note| note.user_id == *user_id)
            .map(|note| {
                note.read = true;
                note.clone()
            }))
    }
}

/// In-memory implementation of the `TipRepository` port.
#[derive(Debug, Default)]
pub struct InMemoryTipRepository {
    tips: Mutex<Vec<Tip>>,
}

#[async_trait]
impl TipRepository for InMemoryTipRepository {
    async fn insert(&self, tip: &Tip) -> Result<(), TipRepositoryError> {
        lock(&self.tips).push(tip.clone());
        Ok(())
    }

    async fn list_received(&self, user_id: &UserId) -> Result<Vec<Tip>, TipRepositoryError> {
        let mut tips: Vec<Tip> = lock(&self.tips)
            .iter()
            .filter(|tip| tip.to_user_id == *user_id)
            .cloned()
            .collect();
        tips.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tips)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewLink, Username};

    fn profile(handle: &str) -> Profile {
        Profile::new(
            UserId::random(),
            Username::new(handle).expect("valid handle"),
            "Tester",
        )
        .expect("valid profile")
    }

    #[tokio::test]
    async fn handle_lookup_is_case_insensitive() {
        let repo = InMemoryProfileRepository::default();
        repo.upsert(&profile("Casey")).await.expect("stored");

        let found = repo
            .find_by_username_lower("casey")
            .await
            .expect("queried");
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn duplicate_handles_are_rejected_across_users() {
        let repo = InMemoryProfileRepository::default();
        repo.upsert(&profile("taken")).await.expect("stored");

        let error = repo.upsert(&profile("Taken")).await.expect_err("rejected");
        assert_eq!(
            error,
            ProfileRepositoryError::duplicate_username("Taken")
        );
    }

    #[tokio::test]
    async fn reclaiming_own_handle_is_allowed() {
        let repo = InMemoryProfileRepository::default();
        let mut stored = profile("mine");
        repo.upsert(&stored).await.expect("stored");

        stored.display_name = "Renamed".into();
        repo.upsert(&stored).await.expect("updated");
    }

    #[tokio::test]
    async fn links_list_in_position_order() {
        let repo = InMemoryLinkRepository::default();
        let user_id = UserId::random();
        for position in [2, 0, 1] {
            let link = Link::create(
                user_id,
                NewLink::new("Title", "https://example.com", position).expect("valid"),
            );
            repo.insert(&link).await.expect("stored");
        }

        let listed = repo.list_for_user(&user_id).await.expect("listed");
        let positions: Vec<i32> = listed.iter().map(|link| link.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn record_click_increments_and_returns() {
        let repo = InMemoryLinkRepository::default();
        let link = Link::create(
            UserId::random(),
            NewLink::new("Title", "https://example.com", 0).expect("valid"),
        );
        repo.insert(&link).await.expect("stored");

        let first = repo.record_click(&link.id).await.expect("clicked");
        let second = repo.record_click(&link.id).await.expect("clicked");
        assert_eq!(first.map(|l| l.clicks), Some(1));
        assert_eq!(second.map(|l| l.clicks), Some(2));
        assert!(
            repo.record_click(&LinkId::random())
                .await
                .expect("missed")
                .is_none()
        );
    }

    #[tokio::test]
    async fn mark_read_ignores_other_users_rows() {
        let repo = InMemoryNotificationRepository::default();
        let owner = UserId::random();
        let note = Notification::new(
            owner,
            crate::domain::NotificationKind::System,
            "hello",
        );
        repo.insert(&note).await.expect("stored");

        let foreign = repo
            .mark_read(&UserId::random(), &note.id)
            .await
            .expect("queried");
        assert!(foreign.is_none());

        let own = repo.mark_read(&owner, &note.id).await.expect("queried");
        assert_eq!(own.map(|n| n.read), Some(true));
    }
}
