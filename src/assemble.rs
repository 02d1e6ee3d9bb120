use tracing::{debug, warn};

use crate::api::Fetch;
use crate::builder::{build_comment_fragment, build_text_element};
use crate::data::RemoteData;
use crate::document::POST_ID_KEY;
use crate::model::{Post, PostId};
use crate::node::{Element, Fragment};

pub const SHOW_COMMENTS: &str = "Show Comments";
pub const HIDE_COMMENTS: &str = "Hide Comments";
pub const HIDDEN_CLASS: &str = "hide";
pub const AUTHOR_CLASS: &str = "author";
pub const UNKNOWN_AUTHOR: &str = "Author: unavailable";

/// Builds every article strictly in input order. Each post's author lookup
/// finishes before the next post is started.
pub fn build_all_articles(remote: &dyn RemoteData, posts: &[Post]) -> Fragment {
    posts
        .iter()
        .map(|post| build_one_article(remote, post))
        .collect()
}

pub fn build_one_article(remote: &dyn RemoteData, post: &Post) -> Element {
    let mut article = Element::new("article")
        .with_child(build_text_element("h2", &post.title, None))
        .with_child(build_text_element("p", &post.body, None))
        .with_child(build_text_element("p", &format!("Post ID: {}", post.id), None));

    match remote.fetch_user(Some(post.user_id)) {
        Fetch::Ready(author) => {
            article.append(build_text_element(
                "p",
                &format!("Author: {} with {}", author.name, author.company.name),
                Some(AUTHOR_CLASS),
            ));
            article.append(build_text_element(
                "p",
                &author.company.catch_phrase,
                Some(AUTHOR_CLASS),
            ));
        }
        Fetch::Skipped | Fetch::Failed(_) => {
            warn!(post = %post.id, user = %post.user_id, "author unavailable, rendering placeholder");
            article.append(build_text_element("p", UNKNOWN_AUTHOR, Some(AUTHOR_CLASS)));
        }
    }

    article.append(
        Element::new("button")
            .with_data(POST_ID_KEY, post.id.to_string())
            .with_text(SHOW_COMMENTS),
    );
    if let Some(section) = build_comment_section(remote, Some(post.id)) {
        article.append(section);
    }
    article
}

/// A hidden `<section>` tagged with the post id, holding its comments.
/// A failed comment lookup leaves the section empty.
pub fn build_comment_section(remote: &dyn RemoteData, post_id: Option<PostId>) -> Option<Element> {
    let post_id = post_id?;
    let mut section = Element::new("section")
        .with_class(HIDDEN_CLASS)
        .with_data(POST_ID_KEY, post_id.to_string());

    match remote.fetch_post_comments(Some(post_id)) {
        Fetch::Ready(comments) => {
            debug!(post = %post_id, count = comments.len(), "comments loaded");
            if let Some(fragment) = build_comment_fragment(Some(&comments)) {
                section.append_fragment(fragment);
            }
        }
        Fetch::Skipped | Fetch::Failed(_) => {
            warn!(post = %post_id, "comments unavailable, leaving section empty");
        }
    }
    Some(section)
}
