//! Detached element tree used as the view model.
//!
//! An [`Element`] is a tag with classes, attributes, optional text content and
//! child elements. It serialises to HTML for `--dump` and for assertions.

use std::collections::BTreeMap;
use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    tag: String,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.insert(name.to_string(), value.into());
        self
    }

    pub fn with_data(self, key: &str, value: impl Into<String>) -> Self {
        self.with_attr(&format!("data-{key}"), value)
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn data(&self, key: &str) -> Option<&str> {
        self.attr(&format!("data-{key}"))
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|existing| existing == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !class.is_empty() && !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    /// Flips `class` and reports whether it is present afterwards.
    pub fn toggle_class(&mut self, class: &str) -> bool {
        if self.has_class(class) {
            self.classes.retain(|existing| existing != class);
            false
        } else {
            self.classes.push(class.to_string());
            true
        }
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn append(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn append_fragment(&mut self, fragment: Fragment) {
        self.children.extend(fragment.0);
    }

    pub fn clear_children(&mut self) {
        self.children.clear();
    }

    /// Depth-first, pre-order walk over descendants (not including `self`).
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        let mut stack: Vec<&Element> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    pub fn find_mut(&mut self, pred: &dyn Fn(&Element) -> bool) -> Option<&mut Element> {
        for child in self.children.iter_mut() {
            if pred(child) {
                return Some(child);
            }
            if let Some(found) = child.find_mut(pred) {
                return Some(found);
            }
        }
        None
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        let _ = write!(out, "<{}", self.tag);
        if !self.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape(&self.classes.join(" ")));
        }
        for (name, value) in &self.attrs {
            let _ = write!(out, " {}=\"{}\"", name, escape(value));
        }
        out.push('>');
        if let Some(text) = &self.text {
            out.push_str(&escape(text));
        }
        for child in &self.children {
            child.write_html(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

/// An ordered batch of detached elements, attached in one step.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fragment(Vec<Element>);

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, element: Element) {
        self.0.push(element);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn elements(&self) -> &[Element] {
        &self.0
    }

    pub fn into_elements(self) -> Vec<Element> {
        self.0
    }
}

impl FromIterator<Element> for Fragment {
    fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
        Fragment(iter.into_iter().collect())
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_class_reports_presence() {
        let mut section = Element::new("section").with_class("hide");
        assert!(!section.toggle_class("hide"));
        assert!(!section.has_class("hide"));
        assert!(section.toggle_class("hide"));
        assert_eq!(section.classes(), ["hide".to_string()]);
    }

    #[test]
    fn html_escapes_text_and_attributes() {
        let el = Element::new("p")
            .with_data("note", "a\"b")
            .with_text("<b> & co");
        assert_eq!(
            el.to_html(),
            "<p data-note=\"a&quot;b\">&lt;b&gt; &amp; co</p>"
        );
    }

    #[test]
    fn descendants_are_pre_order() {
        let tree = Element::new("main")
            .with_child(
                Element::new("article")
                    .with_child(Element::new("h2"))
                    .with_child(Element::new("p")),
            )
            .with_child(Element::new("article"));
        let tags: Vec<_> = tree.descendants().iter().map(|el| el.tag()).collect();
        assert_eq!(tags, vec!["article", "h2", "p", "article"]);
    }

    #[test]
    fn find_mut_reaches_nested_nodes() {
        let mut tree = Element::new("main").with_child(
            Element::new("article").with_child(Element::new("button").with_data("post-id", "4")),
        );
        let button = tree
            .find_mut(&|el: &Element| el.data("post-id") == Some("4"))
            .unwrap();
        button.set_text("Hide Comments");
        assert!(tree.to_html().contains("Hide Comments"));
    }
}
