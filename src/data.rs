use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::api::{self, Fetch, FetchError};
use crate::model::{Comment, Company, Post, PostId, User, UserId};

/// The four remote lookups the view pipeline depends on.
pub trait RemoteData: Send + Sync {
    fn fetch_all_users(&self) -> Fetch<Vec<User>>;
    fn fetch_user_posts(&self, user_id: Option<UserId>) -> Fetch<Vec<Post>>;
    fn fetch_user(&self, user_id: Option<UserId>) -> Fetch<User>;
    fn fetch_post_comments(&self, post_id: Option<PostId>) -> Fetch<Vec<Comment>>;
}

pub struct HttpRemoteData {
    client: Arc<api::Client>,
}

impl HttpRemoteData {
    pub fn new(client: Arc<api::Client>) -> Self {
        Self { client }
    }
}

impl RemoteData for HttpRemoteData {
    fn fetch_all_users(&self) -> Fetch<Vec<User>> {
        self.client.fetch_all_users()
    }

    fn fetch_user_posts(&self, user_id: Option<UserId>) -> Fetch<Vec<Post>> {
        self.client.fetch_user_posts(user_id)
    }

    fn fetch_user(&self, user_id: Option<UserId>) -> Fetch<User> {
        self.client.fetch_user(user_id)
    }

    fn fetch_post_comments(&self, post_id: Option<PostId>) -> Fetch<Vec<Comment>> {
        self.client.fetch_post_comments(post_id)
    }
}

/// A lookup that reached the remote side, as recorded by [`MockRemoteData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCall {
    AllUsers,
    UserPosts(UserId),
    User(UserId),
    PostComments(PostId),
}

/// In-memory stand-in for the remote API. Missing identifiers are skipped
/// exactly like the HTTP client, and skipped calls are not recorded.
#[derive(Default)]
pub struct MockRemoteData {
    users: Vec<User>,
    posts: HashMap<UserId, Vec<Post>>,
    comments: HashMap<PostId, Vec<Comment>>,
    failing_users: HashSet<UserId>,
    failing_comments: HashSet<PostId>,
    calls: Mutex<Vec<RemoteCall>>,
}

impl MockRemoteData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Small offline dataset used by `--offline`.
    pub fn with_fixture() -> Self {
        let mut mock = Self::new()
            .with_user(sample_user(
                1,
                "Leanne Graham",
                "Romaguera-Crona",
                "Multi-layered client-server neural-net",
            ))
            .with_user(sample_user(
                2,
                "Ervin Howell",
                "Deckow-Crist",
                "Proactive didactic contingency",
            ))
            .with_user(sample_user(
                3,
                "Clementine Bauch",
                "Romaguera-Jacobson",
                "Face to face bifurcated interface",
            ));

        let mut next_post = 1;
        let mut next_comment = 1;
        for user in 1..=3u64 {
            let mut posts = Vec::new();
            for n in 1..=2 {
                let post = Post {
                    id: PostId(next_post),
                    user_id: UserId(user),
                    title: format!("Post {n} from employee {user}"),
                    body: format!("Offline sample body for post {next_post}."),
                };
                let comments = (1..=2)
                    .map(|c| {
                        let comment = Comment {
                            id: next_comment,
                            post_id: post.id,
                            name: format!("Reply {c} on post {next_post}"),
                            email: format!("reader{next_comment}@example.com"),
                            body: "Thanks for sharing.".into(),
                        };
                        next_comment += 1;
                        comment
                    })
                    .collect();
                mock = mock.with_comments(post.id, comments);
                posts.push(post);
                next_post += 1;
            }
            mock = mock.with_posts(UserId(user), posts);
        }
        mock
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.users.push(user);
        self
    }

    pub fn with_posts(mut self, user_id: UserId, posts: Vec<Post>) -> Self {
        self.posts.insert(user_id, posts);
        self
    }

    pub fn with_comments(mut self, post_id: PostId, comments: Vec<Comment>) -> Self {
        self.comments.insert(post_id, comments);
        self
    }

    pub fn failing_user(mut self, user_id: UserId) -> Self {
        self.failing_users.insert(user_id);
        self
    }

    pub fn failing_comments(mut self, post_id: PostId) -> Self {
        self.failing_comments.insert(post_id);
        self
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().clone()
    }

    fn record(&self, call: RemoteCall) {
        self.calls.lock().push(call);
    }
}

fn not_found(path: String) -> FetchError {
    FetchError::Status {
        url: format!("mock://{path}"),
        status: 404,
    }
}

impl RemoteData for MockRemoteData {
    fn fetch_all_users(&self) -> Fetch<Vec<User>> {
        self.record(RemoteCall::AllUsers);
        Fetch::Ready(self.users.clone())
    }

    fn fetch_user_posts(&self, user_id: Option<UserId>) -> Fetch<Vec<Post>> {
        let Some(user_id) = user_id else {
            return Fetch::Skipped;
        };
        self.record(RemoteCall::UserPosts(user_id));
        // The real API answers an unknown user with an empty list.
        Fetch::Ready(self.posts.get(&user_id).cloned().unwrap_or_default())
    }

    fn fetch_user(&self, user_id: Option<UserId>) -> Fetch<User> {
        let Some(user_id) = user_id else {
            return Fetch::Skipped;
        };
        self.record(RemoteCall::User(user_id));
        if self.failing_users.contains(&user_id) {
            return Fetch::Failed(not_found(format!("users/{user_id}")));
        }
        match self.users.iter().find(|user| user.id == user_id) {
            Some(user) => Fetch::Ready(user.clone()),
            None => Fetch::Failed(not_found(format!("users/{user_id}"))),
        }
    }

    fn fetch_post_comments(&self, post_id: Option<PostId>) -> Fetch<Vec<Comment>> {
        let Some(post_id) = post_id else {
            return Fetch::Skipped;
        };
        self.record(RemoteCall::PostComments(post_id));
        if self.failing_comments.contains(&post_id) {
            return Fetch::Failed(not_found(format!("posts/{post_id}/comments")));
        }
        Fetch::Ready(self.comments.get(&post_id).cloned().unwrap_or_default())
    }
}

pub fn sample_user(id: u64, name: &str, company: &str, catch_phrase: &str) -> User {
    User {
        id: UserId(id),
        name: name.into(),
        username: name.split_whitespace().next().unwrap_or(name).to_lowercase(),
        email: String::new(),
        company: Company {
            name: company.into(),
            catch_phrase: catch_phrase.into(),
            bs: String::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_skips_missing_identifiers_without_recording() {
        let mock = MockRemoteData::with_fixture();
        assert_eq!(mock.fetch_user(None), Fetch::Skipped);
        assert_eq!(mock.fetch_post_comments(None), Fetch::Skipped);
        assert_eq!(mock.fetch_user_posts(None), Fetch::Skipped);
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn fixture_posts_belong_to_their_user() {
        let mock = MockRemoteData::with_fixture();
        let posts = mock.fetch_user_posts(Some(UserId(2))).ready().unwrap();
        assert_eq!(posts.len(), 2);
        assert!(posts.iter().all(|post| post.user_id == UserId(2)));
        assert_eq!(mock.calls(), vec![RemoteCall::UserPosts(UserId(2))]);
    }

    #[test]
    fn failing_user_reports_failure() {
        let mock = MockRemoteData::with_fixture().failing_user(UserId(1));
        assert!(mock.fetch_user(Some(UserId(1))).is_failed());
        assert!(mock.fetch_user(Some(UserId(2))).is_ready());
    }
}
