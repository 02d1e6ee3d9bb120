//! The owned view: the user selector, the main region and the click
//! listeners bound to buttons inside main.

use std::collections::BTreeMap;

use crate::model::{PostId, UserId};
use crate::node::{Element, Fragment};

pub const SELECT_MENU_ID: &str = "selectMenu";
pub const POST_ID_KEY: &str = "post-id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Click listeners keyed by the post id their button carries.
///
/// Each registration gets its own [`ListenerId`], and detaching only removes a
/// registration whose id matches, so a stale handle can never unbind a newer
/// listener for the same post.
#[derive(Debug, Default)]
pub struct Listeners {
    next_id: u64,
    bound: BTreeMap<PostId, ListenerId>,
}

impl Listeners {
    pub fn attach(&mut self, post_id: PostId) -> ListenerId {
        if let Some(existing) = self.bound.get(&post_id) {
            return *existing;
        }
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.bound.insert(post_id, id);
        id
    }

    pub fn detach(&mut self, post_id: PostId, id: ListenerId) -> bool {
        if self.bound.get(&post_id) == Some(&id) {
            self.bound.remove(&post_id);
            true
        } else {
            false
        }
    }

    pub fn get(&self, post_id: PostId) -> Option<ListenerId> {
        self.bound.get(&post_id).copied()
    }

    pub fn live(&self) -> usize {
        self.bound.len()
    }

    pub fn is_bound(&self, post_id: PostId) -> bool {
        self.bound.contains_key(&post_id)
    }
}

/// A click on a toggle button, identified by the post id it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickEvent {
    pub post_id: Option<PostId>,
}

#[derive(Debug)]
pub struct Document {
    select_menu: Element,
    main: Element,
    listeners: Listeners,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            select_menu: Element::new("select").with_attr("id", SELECT_MENU_ID),
            main: Element::new("main"),
            listeners: Listeners::default(),
        }
    }

    pub fn select_menu(&self) -> &Element {
        &self.select_menu
    }

    pub fn set_options(&mut self, options: Vec<Element>) {
        self.select_menu.clear_children();
        for option in options {
            self.select_menu.append(option);
        }
    }

    /// Values of the selector options, in display order.
    pub fn option_values(&self) -> Vec<Option<UserId>> {
        self.select_menu
            .children()
            .iter()
            .map(|option| option.attr("value").and_then(|raw| raw.parse().ok()))
            .collect()
    }

    pub fn main(&self) -> &Element {
        &self.main
    }

    pub fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    pub fn listeners_mut(&mut self) -> &mut Listeners {
        &mut self.listeners
    }

    pub(crate) fn main_mut(&mut self) -> &mut Element {
        &mut self.main
    }

    pub(crate) fn append_to_main(&mut self, fragment: Fragment) {
        self.main.append_fragment(fragment);
    }

    pub fn articles(&self) -> Vec<&Element> {
        self.main
            .children()
            .iter()
            .filter(|el| el.tag() == "article")
            .collect()
    }

    /// Post ids of every toggle button under main, in document order.
    pub fn button_post_ids(&self) -> Vec<PostId> {
        self.main
            .descendants()
            .into_iter()
            .filter(|el| el.tag() == "button")
            .filter_map(|el| el.data(POST_ID_KEY).and_then(|raw| raw.parse().ok()))
            .collect()
    }

    pub fn button(&self, post_id: PostId) -> Option<&Element> {
        self.tagged(post_id, "button")
    }

    pub fn comment_section(&self, post_id: PostId) -> Option<&Element> {
        self.tagged(post_id, "section")
    }

    pub(crate) fn button_mut(&mut self, post_id: PostId) -> Option<&mut Element> {
        self.tagged_mut(post_id, "button")
    }

    pub(crate) fn comment_section_mut(&mut self, post_id: PostId) -> Option<&mut Element> {
        self.tagged_mut(post_id, "section")
    }

    fn tagged(&self, post_id: PostId, tag: &str) -> Option<&Element> {
        let wanted = post_id.to_string();
        self.main
            .descendants()
            .into_iter()
            .find(|el| el.tag() == tag && el.data(POST_ID_KEY) == Some(wanted.as_str()))
    }

    fn tagged_mut(&mut self, post_id: PostId, tag: &str) -> Option<&mut Element> {
        let wanted = post_id.to_string();
        self.main
            .find_mut(&|el: &Element| el.tag() == tag && el.data(POST_ID_KEY) == Some(wanted.as_str()))
    }

    pub fn to_html(&self) -> String {
        self.main.to_html()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detach_requires_matching_identity() {
        let mut listeners = Listeners::default();
        let first = listeners.attach(PostId(1));
        assert!(listeners.detach(PostId(1), first));
        let second = listeners.attach(PostId(1));
        assert_ne!(first, second);
        assert!(!listeners.detach(PostId(1), first));
        assert!(listeners.is_bound(PostId(1)));
        assert_eq!(listeners.live(), 1);
    }

    #[test]
    fn attach_twice_reuses_registration() {
        let mut listeners = Listeners::default();
        let a = listeners.attach(PostId(3));
        let b = listeners.attach(PostId(3));
        assert_eq!(a, b);
        assert_eq!(listeners.live(), 1);
    }

    #[test]
    fn option_values_parse_user_ids() {
        let mut doc = Document::new();
        doc.set_options(vec![
            Element::new("option").with_attr("value", "1"),
            Element::new("option").with_attr("value", "x"),
        ]);
        assert_eq!(doc.option_values(), vec![Some(UserId(1)), None]);
        assert!(doc.select_menu().to_html().starts_with("<select id=\"selectMenu\">"));
    }
}
