//! Link CRUD and click-tracking use-cases.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::error::Error;
use super::events::{ChangeEvent, RecordKind};
use super::links::{Link, LinkChanges, LinkId, NewLink};
use super::ports::{ChangePublisher, LinkRepository};
use super::profile::UserId;

/// Link use-cases over a [`LinkRepository`].
pub struct LinkService<L: ?Sized> {
    links: Arc<L>,
    publisher: Arc<dyn ChangePublisher>,
}

impl<L: ?Sized> LinkService<L> {
    pub fn new(links: Arc<L>, publisher: Arc<dyn ChangePublisher>) -> Self {
        Self { links, publisher }
    }
}

impl<L: LinkRepository + ?Sized> LinkService<L> {
    /// All links for a user, ordered by position.
    pub async fn list(&self, user_id: &UserId) -> Result<Vec<Link>, Error> {
        Ok(self.links.list_for_user(user_id).await?)
    }

    /// Create a link on the given user's page.
    pub async fn create(&self, user_id: UserId, new: NewLink) -> Result<Link, Error> {
        let link = Link::create(user_id, new);
        self.links.insert(&link).await?;
        info!(link_id = %link.id, user_id = %link.user_id, "link created");
        self.publisher
            .publish(ChangeEvent::insert(user_id, RecordKind::Link, &link));
        Ok(link)
    }

    /// Apply changes to a link owned by `user_id`.
    ///
    /// Links belonging to other users are indistinguishable from missing
    /// ones, so both cases surface as not-found.
    pub async fn update(
        &self,
        user_id: &UserId,
        link_id: &LinkId,
        changes: LinkChanges,
    ) -> Result<Link, Error> {
        let changes = changes.validated()?;
        let previous = self.owned_link(user_id, link_id).await?;
        if changes.is_empty() {
            return Ok(previous);
        }

        let mut updated = previous.clone();
        if let Some(title) = changes.title {
            updated.title = title;
        }
        if let Some(url) = changes.url {
            updated.url = url;
        }
        if let Some(position) = changes.position {
            updated.position = position;
        }
        if let Some(is_active) = changes.is_active {
            updated.is_active = is_active;
        }
        updated.updated_at = Utc::now();

        if !self.links.update(&updated).await? {
            return Err(missing_link(link_id));
        }
        self.publisher.publish(ChangeEvent::update(
            *user_id,
            RecordKind::Link,
            &updated,
            Some(&previous),
        ));
        Ok(updated)
    }

    /// Remove a link owned by `user_id`.
    pub async fn delete(&self, user_id: &UserId, link_id: &LinkId) -> Result<(), Error> {
        let existing = self.owned_link(user_id, link_id).await?;
        if !self.links.delete(link_id).await? {
            return Err(missing_link(link_id));
        }
        info!(link_id = %link_id, user_id = %user_id, "link deleted");
        self.publisher
            .publish(ChangeEvent::delete(*user_id, RecordKind::Link, &existing));
        Ok(())
    }

    /// Count a visitor click. Public, so no ownership check applies.
    pub async fn record_click(&self, link_id: &LinkId) -> Result<Link, Error> {
        let link = self
            .links
            .record_click(link_id)
            .await?
            .ok_or_else(|| missing_link(link_id))?;
        self.publisher
            .publish(ChangeEvent::update(link.user_id, RecordKind::Link, &link, None));
        Ok(link)
    }

    async fn owned_link(&self, user_id: &UserId, link_id: &LinkId) -> Result<Link, Error> {
        match self.links.find(link_id).await? {
            Some(link) if link.user_id == *user_id => Ok(link),
            _ => Err(missing_link(link_id)),
        }
    }
}

fn missing_link(link_id: &LinkId) -> Error {
    Error::not_found(format!("no link {link_id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{MockLinkRepository, NoopChangePublisher};

    fn service(repo: MockLinkRepository) -> LinkService<MockLinkRepository> {
        LinkService::new(Arc::new(repo), Arc::new(NoopChangePublisher))
    }

    fn stored_link(user_id: UserId) -> Link {
        Link::create(
            user_id,
            NewLink::new("My site", "https://example.com", 0).expect("valid"),
        )
    }

    #[tokio::test]
    async fn create_persists_and_returns_the_link() {
        let user_id = UserId::random();
        let mut repo = MockLinkRepository::new();
        repo.expect_insert().times(1).return_once(|_| Ok(()));

        let link = service(repo)
            .create(
                user_id,
                NewLink::new("My site", "https://example.com", 3).expect("valid"),
            )
            .await
            .expect("created");
        assert_eq!(link.user_id, user_id);
        assert_eq!(link.position, 3);
        assert!(link.is_active);
        assert_eq!(link.clicks, 0);
    }

    #[tokio::test]
    async fn update_rejects_foreign_links_as_missing() {
        let foreign = stored_link(UserId::random());
        let link_id = foreign.id;
        let mut repo = MockLinkRepository::new();
        repo.expect_find()
            .times(1)
            .return_once(move |_| Ok(Some(foreign)));
        repo.expect_update().times(0);

        let error = service(repo)
            .update(
                &UserId::random(),
                &link_id,
                LinkChanges {
                    title: Some("Hijacked".into()),
                    ..LinkChanges::default()
                },
            )
            .await
            .expect_err("hidden");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn update_validates_before_touching_the_store() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find().times(0);

        let error = service(repo)
            .update(
                &UserId::random(),
                &LinkId::random(),
                LinkChanges {
                    url: Some("nope".into()),
                    ..LinkChanges::default()
                },
            )
            .await
            .expect_err("invalid");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn empty_update_is_a_no_op() {
        let user_id = UserId::random();
        let existing = stored_link(user_id);
        let link_id = existing.id;
        let expected = existing.clone();
        let mut repo = MockLinkRepository::new();
        repo.expect_find()
            .times(1)
            .return_once(move |_| Ok(Some(existing)));
        repo.expect_update().times(0);

        let unchanged = service(repo)
            .update(&user_id, &link_id, LinkChanges::default())
            .await
            .expect("no-op");
        assert_eq!(unchanged, expected);
    }

    #[tokio::test]
    async fn update_applies_populated_fields_only() {
        let user_id = UserId::random();
        let existing = stored_link(user_id);
        let link_id = existing.id;
        let original_url = existing.url.clone();
        let mut repo = MockLinkRepository::new();
        repo.expect_find()
            .times(1)
            .return_once(move |_| Ok(Some(existing)));
        repo.expect_update().times(1).return_once(|_| Ok(true));

        let updated = service(repo)
            .update(
                &user_id,
                &link_id,
                LinkChanges {
                    title: Some("Renamed".into()),
                    is_active: Some(false),
                    ..LinkChanges::default()
                },
            )
            .await
            .expect("updated");
        assert_eq!(updated.title, "Renamed");
        assert!(!updated.is_active);
        assert_eq!(updated.url, original_url);
    }

    #[tokio::test]
    async fn delete_surfaces_missing_rows() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find().times(1).return_once(|_| Ok(None));

        let error = service(repo)
            .delete(&UserId::random(), &LinkId::random())
            .await
            .expect_err("missing");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn record_click_returns_the_bumped_row() {
        let mut clicked = stored_link(UserId::random());
        clicked.clicks = 8;
        let link_id = clicked.id;
        let mut repo = MockLinkRepository::new();
        repo.expect_record_click()
            .times(1)
            .return_once(move |_| Ok(Some(clicked)));

        let link = service(repo).record_click(&link_id).await.expect("clicked");
        assert_eq!(link.clicks, 8);
    }

    #[tokio::test]
    async fn record_click_on_missing_link_is_not_found() {
        let mut repo = MockLinkRepository::new();
        repo.expect_record_click().times(1).return_once(|_| Ok(None));

        let error = service(repo)
            .record_click(&LinkId::random())
            .await
            .expect_err("missing");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }
}
