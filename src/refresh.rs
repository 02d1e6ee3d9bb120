use tracing::{debug, info};

use crate::assemble::build_all_articles;
use crate::builder::build_text_element;
use crate::data::RemoteData;
use crate::document::Document;
use crate::model::Post;
use crate::node::Fragment;

pub const PLACEHOLDER_TEXT: &str = "Select an Employee to display their posts.";
pub const PLACEHOLDER_CLASS: &str = "default-text";

/// What a refresh attaches to the main region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Placeholder,
    Articles(Fragment),
}

/// Proof that a refresh began. Only the newest ticket may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct RenderTicket {
    generation: u64,
}

impl RenderTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
pub struct Refresher {
    generation: u64,
}

impl Refresher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Detaches every click listener under main, then removes main's children.
    pub fn teardown(doc: &mut Document) {
        for post_id in doc.button_post_ids() {
            if let Some(id) = doc.listeners().get(post_id) {
                doc.listeners_mut().detach(post_id, id);
            }
        }
        doc.main_mut().clear_children();
    }

    /// Tears down the previous render and supersedes any refresh in flight.
    pub fn begin(&mut self, doc: &mut Document) -> RenderTicket {
        Self::teardown(doc);
        self.generation = self.generation.wrapping_add(1);
        debug!(generation = self.generation, "refresh started");
        RenderTicket {
            generation: self.generation,
        }
    }

    pub fn is_current(&self, ticket: RenderTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Attaches `rendered` and binds one listener per new button. A stale
    /// ticket leaves the document untouched and returns `false`.
    pub fn commit(&mut self, doc: &mut Document, ticket: RenderTicket, rendered: Rendered) -> bool {
        if !self.is_current(ticket) {
            debug!(
                stale = ticket.generation,
                current = self.generation,
                "discarding superseded render"
            );
            return false;
        }
        // Main may have been written to since `begin`.
        Self::teardown(doc);
        match rendered {
            Rendered::Placeholder => {
                doc.main_mut().append(build_text_element(
                    "p",
                    PLACEHOLDER_TEXT,
                    Some(PLACEHOLDER_CLASS),
                ));
            }
            Rendered::Articles(fragment) => doc.append_to_main(fragment),
        }
        let buttons = doc.button_post_ids();
        for post_id in &buttons {
            doc.listeners_mut().attach(*post_id);
        }
        info!(
            generation = ticket.generation,
            articles = doc.articles().len(),
            listeners = doc.listeners().live(),
            "refresh committed"
        );
        true
    }

    /// Full teardown, render and attach in one call.
    pub fn refresh(&mut self, doc: &mut Document, remote: &dyn RemoteData, posts: Option<&[Post]>) {
        let ticket = self.begin(doc);
        let rendered = render(remote, posts);
        self.commit(doc, ticket, rendered);
    }
}

pub fn render(remote: &dyn RemoteData, posts: Option<&[Post]>) -> Rendered {
    match posts {
        Some(posts) => Rendered::Articles(build_all_articles(remote, posts)),
        None => Rendered::Placeholder,
    }
}
