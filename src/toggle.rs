use tracing::debug;

use crate::assemble::{HIDDEN_CLASS, HIDE_COMMENTS, SHOW_COMMENTS};
use crate::document::{ClickEvent, Document};
use crate::model::PostId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentVisibility {
    Hidden,
    Visible,
}

impl CommentVisibility {
    pub fn button_label(self) -> &'static str {
        match self {
            CommentVisibility::Hidden => SHOW_COMMENTS,
            CommentVisibility::Visible => HIDE_COMMENTS,
        }
    }
}

/// Flips the hidden flag on the post's comment section.
pub fn toggle_comment_section(doc: &mut Document, post_id: Option<PostId>) -> Option<CommentVisibility> {
    let section = doc.comment_section_mut(post_id?)?;
    let hidden = section.toggle_class(HIDDEN_CLASS);
    Some(if hidden {
        CommentVisibility::Hidden
    } else {
        CommentVisibility::Visible
    })
}

/// Flips the post's button label and returns the new label.
pub fn toggle_comment_button(doc: &mut Document, post_id: Option<PostId>) -> Option<String> {
    let button = doc.button_mut(post_id?)?;
    let next = if button.text() == Some(SHOW_COMMENTS) {
        HIDE_COMMENTS
    } else {
        SHOW_COMMENTS
    };
    button.set_text(next);
    Some(next.to_string())
}

pub fn visibility(doc: &Document, post_id: PostId) -> Option<CommentVisibility> {
    let section = doc.comment_section(post_id)?;
    Some(if section.has_class(HIDDEN_CLASS) {
        CommentVisibility::Hidden
    } else {
        CommentVisibility::Visible
    })
}

/// Click entry point. Only acts when the button has a live listener and both
/// halves of the pair exist; the label is derived from the section state so
/// the two never drift apart.
pub fn toggle_comments(doc: &mut Document, event: ClickEvent) -> Option<CommentVisibility> {
    let post_id = event.post_id?;
    if !doc.listeners().is_bound(post_id) {
        debug!(post = %post_id, "click on button without a live listener ignored");
        return None;
    }
    if doc.button(post_id).is_none() || doc.comment_section(post_id).is_none() {
        return None;
    }
    let state = toggle_comment_section(doc, Some(post_id))?;
    let button = doc.button_mut(post_id)?;
    button.set_text(state.button_label());
    debug!(post = %post_id, ?state, "comments toggled");
    Some(state)
}
