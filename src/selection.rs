use std::sync::Arc;

use tracing::{info, warn};

use crate::api::Fetch;
use crate::data::RemoteData;
use crate::document::Document;
use crate::model::{Post, UserId};
use crate::refresh::{render, RenderTicket, Refresher, Rendered};

pub const DEFAULT_FALLBACK_USER: UserId = UserId(1);

/// A selection whose posts are still being fetched and rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingSelection {
    pub ticket: RenderTicket,
    pub user_id: UserId,
}

pub struct SelectionController {
    remote: Arc<dyn RemoteData>,
    refresher: Refresher,
    fallback: UserId,
}

impl SelectionController {
    pub fn new(remote: Arc<dyn RemoteData>, fallback: UserId) -> Self {
        Self {
            remote,
            refresher: Refresher::new(),
            fallback,
        }
    }

    pub fn remote(&self) -> Arc<dyn RemoteData> {
        self.remote.clone()
    }

    pub fn fallback(&self) -> UserId {
        self.fallback
    }

    pub fn resolve_user(&self, selected: Option<UserId>) -> UserId {
        selected.unwrap_or(self.fallback)
    }

    /// Change handler: fetches the selected user's posts and refreshes the
    /// view with them. Returns the user that was actually loaded.
    pub fn on_selection_change(&mut self, doc: &mut Document, selected: Option<UserId>) -> UserId {
        let user_id = self.resolve_user(selected);
        info!(user = %user_id, "selection changed");
        let posts = fetch_posts(self.remote.as_ref(), user_id);
        self.refresher
            .refresh(doc, self.remote.as_ref(), posts.as_deref());
        user_id
    }

    /// Renders the placeholder without touching the network.
    pub fn show_placeholder(&mut self, doc: &mut Document) {
        self.refresher.refresh(doc, self.remote.as_ref(), None);
    }

    /// Tears the view down and claims a new render generation. The returned
    /// ticket must be passed back to [`Self::complete_selection`].
    pub fn begin_selection(&mut self, doc: &mut Document, selected: Option<UserId>) -> PendingSelection {
        let user_id = self.resolve_user(selected);
        info!(user = %user_id, "selection changed");
        PendingSelection {
            ticket: self.refresher.begin(doc),
            user_id,
        }
    }

    /// The slow half of a selection, safe to run off the UI thread.
    pub fn resolve(remote: &dyn RemoteData, user_id: UserId) -> Rendered {
        let posts = fetch_posts(remote, user_id);
        render(remote, posts.as_deref())
    }

    pub fn is_current(&self, pending: &PendingSelection) -> bool {
        self.refresher.is_current(pending.ticket)
    }

    pub fn complete_selection(
        &mut self,
        doc: &mut Document,
        pending: PendingSelection,
        rendered: Rendered,
    ) -> bool {
        self.refresher.commit(doc, pending.ticket, rendered)
    }
}

fn fetch_posts(remote: &dyn RemoteData, user_id: UserId) -> Option<Vec<Post>> {
    match remote.fetch_user_posts(Some(user_id)) {
        Fetch::Ready(posts) => Some(posts),
        Fetch::Skipped => None,
        Fetch::Failed(err) => {
            warn!(user = %user_id, error = %err, "posts unavailable, showing placeholder");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{sample_user, MockRemoteData, RemoteCall};
    use crate::model::PostId;
    use crate::refresh::{PLACEHOLDER_CLASS, PLACEHOLDER_TEXT};

    fn post(id: u64, user: u64) -> Post {
        Post {
            id: PostId(id),
            user_id: UserId(user),
            title: format!("title {id}"),
            body: format!("body {id}"),
        }
    }

    fn remote() -> Arc<MockRemoteData> {
        Arc::new(
            MockRemoteData::new()
                .with_user(sample_user(1, "Leanne Graham", "Romaguera-Crona", "Multi-layered"))
                .with_user(sample_user(2, "Ervin Howell", "Deckow-Crist", "Proactive"))
                .with_posts(UserId(1), vec![post(1, 1), post(2, 1)])
                .with_posts(UserId(2), vec![post(11, 2)]),
        )
    }

    #[test]
    fn selecting_user_renders_posts_in_order() {
        let remote = remote();
        let mut controller = SelectionController::new(remote.clone(), DEFAULT_FALLBACK_USER);
        let mut doc = Document::new();
        controller.on_selection_change(&mut doc, Some(UserId(1)));

        let articles = doc.articles();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].children()[0].text(), Some("title 1"));
        assert_eq!(articles[1].children()[0].text(), Some("title 2"));
        assert_eq!(doc.button_post_ids(), vec![PostId(1), PostId(2)]);
        assert_eq!(doc.listeners().live(), 2);
    }

    #[test]
    fn missing_selection_falls_back_to_first_user() {
        let remote = remote();
        let mut controller = SelectionController::new(remote.clone(), DEFAULT_FALLBACK_USER);
        let mut doc = Document::new();
        let loaded = controller.on_selection_change(&mut doc, None);
        assert_eq!(loaded, UserId(1));
        assert_eq!(remote.calls()[0], RemoteCall::UserPosts(UserId(1)));
    }

    #[test]
    fn switching_users_replaces_articles() {
        let remote = remote();
        let mut controller = SelectionController::new(remote.clone(), DEFAULT_FALLBACK_USER);
        let mut doc = Document::new();
        controller.on_selection_change(&mut doc, Some(UserId(1)));
        controller.on_selection_change(&mut doc, Some(UserId(2)));
        assert_eq!(doc.button_post_ids(), vec![PostId(11)]);
        assert_eq!(doc.listeners().live(), 1);
    }

    #[test]
    fn unknown_user_renders_no_articles() {
        let remote = remote();
        let mut controller = SelectionController::new(remote.clone(), DEFAULT_FALLBACK_USER);
        let mut doc = Document::new();
        controller.on_selection_change(&mut doc, Some(UserId(42)));
        assert!(doc.main().children().is_empty());
    }

    #[test]
    fn placeholder_is_default_text() {
        let remote = remote();
        let mut controller = SelectionController::new(remote.clone(), DEFAULT_FALLBACK_USER);
        let mut doc = Document::new();
        controller.show_placeholder(&mut doc);
        let children = doc.main().children();
        assert_eq!(children.len(), 1);
        assert!(children[0].has_class(PLACEHOLDER_CLASS));
        assert_eq!(children[0].text(), Some(PLACEHOLDER_TEXT));
        assert!(remote.calls().is_empty());
    }

    #[test]
    fn overlapping_selections_keep_newest() {
        let remote = remote();
        let mut controller = SelectionController::new(remote.clone(), DEFAULT_FALLBACK_USER);
        let mut doc = Document::new();

        let first = controller.begin_selection(&mut doc, Some(UserId(1)));
        let second = controller.begin_selection(&mut doc, Some(UserId(2)));
        assert!(!controller.is_current(&first));

        let second_render = SelectionController::resolve(remote.as_ref(), second.user_id);
        let first_render = SelectionController::resolve(remote.as_ref(), first.user_id);
        assert!(controller.complete_selection(&mut doc, second, second_render));
        assert!(!controller.complete_selection(&mut doc, first, first_render));
        assert_eq!(doc.button_post_ids(), vec![PostId(11)]);
    }
}
