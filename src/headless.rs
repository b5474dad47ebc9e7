//! In-memory [`Document`] for running the page logic without a browser.
//!
//! Models just enough of the DOM for the contact page: an element tree,
//! attributes, classes, inline styles, focus, `<dialog>` open state and form
//! constraint validation (`required`, `type="email"`, `pattern`). Calls to
//! `reportValidity` are recorded so tests can assert on them.

#[cfg(test)]
#[path = "headless_test.rs"]
mod headless_test;

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::dom::{Document, Validity};
use crate::error::DomError;

const CONTROL_TAGS: &[&str] = &["input", "select", "textarea", "button"];

/// WHATWG "valid email address" production.
static EMAIL: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
});

/// Handle to an element of a [`HeadlessDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Default)]
struct Element {
    tag: String,
    attrs: BTreeMap<String, String>,
    classes: Vec<String>,
    styles: BTreeMap<String, String>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    value: String,
    default_value: String,
    custom_validity: String,
    open: bool,
    return_value: String,
}

/// Headless document rooted at `<html><body>`.
#[derive(Debug, Clone)]
pub struct HeadlessDocument {
    nodes: Vec<Element>,
    root: NodeId,
    body: NodeId,
    focused: Option<NodeId>,
    path: String,
    reports: Vec<NodeId>,
}

impl Default for HeadlessDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDocument {
    #[must_use]
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            body: NodeId(0),
            focused: None,
            path: "/".to_owned(),
            reports: Vec::new(),
        };
        doc.root = doc.alloc("html");
        doc.body = doc.alloc("body");
        doc.attach(doc.root, doc.body);
        doc
    }

    // --- Building ---

    /// Create an element with `attrs`, append it to `parent` and return it.
    ///
    /// A `value` attribute also becomes the control's current and default value.
    pub fn element(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let id = self.alloc(tag);
        for (name, value) in attrs {
            self.write_attribute(id, name, value);
        }
        self.attach(parent, id);
        id
    }

    /// The `<body>` handle.
    #[must_use]
    pub fn body_id(&self) -> NodeId {
        self.body
    }

    pub fn set_location_path(&mut self, path: &str) {
        path.clone_into(&mut self.path);
    }

    // --- Inspection ---

    #[must_use]
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.get(node).is_some_and(|el| el.classes.iter().any(|c| c == class))
    }

    #[must_use]
    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.get(node)?.styles.get(property).map(String::as_str)
    }

    #[must_use]
    pub fn text(&self, node: NodeId) -> &str {
        self.get(node).map_or("", |el| el.text.as_str())
    }

    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.get(node).map(|el| el.children.as_slice()).unwrap_or_default()
    }

    #[must_use]
    pub fn custom_validity(&self, node: NodeId) -> &str {
        self.get(node).map_or("", |el| el.custom_validity.as_str())
    }

    #[must_use]
    pub fn is_dialog_open(&self, node: NodeId) -> bool {
        self.get(node).is_some_and(|el| el.open)
    }

    #[must_use]
    pub fn return_value(&self, node: NodeId) -> &str {
        self.get(node).map_or("", |el| el.return_value.as_str())
    }

    /// Focused element, without the `<body>` fallback of `active_element`.
    #[must_use]
    pub fn focused(&self) -> Option<NodeId> {
        self.focused.filter(|id| self.connected(*id))
    }

    /// Nodes passed to `report_validity`, oldest first.
    #[must_use]
    pub fn reports(&self) -> &[NodeId] {
        &self.reports
    }

    // --- Internals ---

    fn alloc(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Element { tag: tag.to_ascii_lowercase(), ..Element::default() });
        id
    }

    fn get(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(node.0)
    }

    fn get_mut(&mut self, node: NodeId) -> Result<&mut Element, DomError> {
        self.nodes.get_mut(node.0).ok_or(DomError::UnknownNode)
    }

    fn tag(&self, node: NodeId) -> &str {
        self.get(node).map_or("", |el| el.tag.as_str())
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        if let Some(el) = self.nodes.get_mut(child.0) {
            el.parent = Some(parent);
        }
        if let Some(el) = self.nodes.get_mut(parent.0) {
            el.children.push(child);
        }
    }

    fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.get(child).and_then(|el| el.parent) else {
            return;
        };
        if let Some(el) = self.nodes.get_mut(parent.0) {
            el.children.retain(|c| *c != child);
        }
        if let Some(el) = self.nodes.get_mut(child.0) {
            el.parent = None;
        }
    }

    fn write_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(el) = self.nodes.get_mut(node.0) else {
            return;
        };
        match name {
            "class" => {
                el.classes = value.split_whitespace().map(str::to_owned).collect();
            }
            "value" => {
                value.clone_into(&mut el.value);
                value.clone_into(&mut el.default_value);
            }
            _ => {}
        }
        el.attrs.insert(name.to_owned(), value.to_owned());
    }

    fn connected(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == self.root {
                return true;
            }
            current = self.get(id).and_then(|el| el.parent);
        }
        false
    }

    fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.get(node).and_then(|el| el.parent), |id| self.get(*id).and_then(|el| el.parent))
    }

    /// Descendants of `node` in document order, excluding `node` itself.
    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    fn is_control(&self, node: NodeId) -> bool {
        CONTROL_TAGS.contains(&self.tag(node))
    }

    fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.get(node).is_some_and(|el| el.attrs.contains_key(name))
    }

    fn first_invalid_control(&self, form: NodeId) -> Option<NodeId> {
        self.form_controls(&form)
            .into_iter()
            .find(|id| self.will_validate(id) && !self.validity(id).valid())
    }
}

fn pattern_matches(pattern: &str, value: &str) -> bool {
    // Invalid patterns are ignored, as browsers do.
    Regex::new(&format!("^(?:{pattern})$")).map_or(true, |re| re.is_match(value))
}

fn email_matches(value: &str) -> bool {
    EMAIL.as_ref().map_or(true, |re| re.is_match(value))
}

impl Document for HeadlessDocument {
    type Node = NodeId;

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|node| self.get(*node).and_then(|el| el.attrs.get("id")).is_some_and(|v| v == id))
    }

    fn body(&self) -> Result<NodeId, DomError> {
        if self.connected(self.body) {
            Ok(self.body)
        } else {
            Err(DomError::MissingBody)
        }
    }

    fn active_element(&self) -> Option<NodeId> {
        Some(self.focused().unwrap_or(self.body))
    }

    fn is_connected(&self, node: &NodeId) -> bool {
        self.connected(*node)
    }

    fn first_focusable_within(&self, container: &NodeId) -> Option<NodeId> {
        self.descendants(*container).into_iter().find(|id| self.is_control(*id))
    }

    fn navigation_links(&self) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|id| self.tag(*id) == "a" && self.ancestors(*id).any(|a| self.tag(a) == "nav"))
            .collect()
    }

    fn location_path(&self) -> String {
        self.path.clone()
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        if name == "class" {
            let el = self.get(*node)?;
            return el.attrs.contains_key("class").then(|| el.classes.join(" "));
        }
        self.get(*node)?.attrs.get(name).cloned()
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.get_mut(*node)?;
        self.write_attribute(*node, name, value);
        Ok(())
    }

    fn remove_attribute(&mut self, node: &NodeId, name: &str) -> Result<(), DomError> {
        let el = self.get_mut(*node)?;
        el.attrs.remove(name);
        if name == "class" {
            el.classes.clear();
        }
        Ok(())
    }

    fn toggle_class(&mut self, node: &NodeId, class: &str, enabled: bool) -> Result<(), DomError> {
        if class.is_empty() || class.contains(char::is_whitespace) {
            return Err(DomError::Js(format!("invalid class token {class:?}")));
        }
        let el = self.get_mut(*node)?;
        let present = el.classes.iter().any(|c| c == class);
        if enabled && !present {
            el.classes.push(class.to_owned());
        } else if !enabled && present {
            el.classes.retain(|c| c != class);
        }
        el.attrs.insert("class".to_owned(), el.classes.join(" "));
        Ok(())
    }

    fn set_style(&mut self, node: &NodeId, property: &str, value: &str) -> Result<(), DomError> {
        self.get_mut(*node)?.styles.insert(property.to_owned(), value.to_owned());
        Ok(())
    }

    fn set_text(&mut self, node: &NodeId, text: &str) -> Result<(), DomError> {
        text.clone_into(&mut self.get_mut(*node)?.text);
        Ok(())
    }

    fn focus(&mut self, node: &NodeId) -> Result<(), DomError> {
        self.get_mut(*node)?;
        if self.connected(*node) {
            self.focused = Some(*node);
        }
        Ok(())
    }

    fn create_element(&mut self, tag: &str) -> Result<NodeId, DomError> {
        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(DomError::Js(format!("invalid tag name {tag:?}")));
        }
        Ok(self.alloc(tag))
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), DomError> {
        self.get_mut(*parent)?;
        self.get_mut(*child)?;
        if parent == child || self.ancestors(*parent).any(|a| a == *child) {
            return Err(DomError::Js("HierarchyRequestError".to_owned()));
        }
        self.attach(*parent, *child);
        Ok(())
    }

    fn remove(&mut self, node: &NodeId) -> Result<(), DomError> {
        self.get_mut(*node)?;
        self.detach(*node);
        Ok(())
    }

    fn show_modal(&mut self, dialog: &NodeId) -> Result<(), DomError> {
        if self.tag(*dialog) != "dialog" || !self.connected(*dialog) {
            return Err(DomError::Js("InvalidStateError".to_owned()));
        }
        let el = self.get_mut(*dialog)?;
        el.open = true;
        el.attrs.insert("open".to_owned(), String::new());
        Ok(())
    }

    fn close_dialog(&mut self, dialog: &NodeId, return_value: &str) -> Result<(), DomError> {
        if self.tag(*dialog) != "dialog" {
            return Err(DomError::Js("not a dialog".to_owned()));
        }
        let el = self.get_mut(*dialog)?;
        if !el.open {
            return Ok(());
        }
        el.open = false;
        el.attrs.remove("open");
        return_value.clone_into(&mut el.return_value);
        Ok(())
    }

    fn form_controls(&self, form: &NodeId) -> Vec<NodeId> {
        if self.tag(*form) != "form" {
            return Vec::new();
        }
        self.descendants(*form).into_iter().filter(|id| self.is_control(*id)).collect()
    }

    fn value(&self, node: &NodeId) -> String {
        self.get(*node).map(|el| el.value.clone()).unwrap_or_default()
    }

    fn set_value(&mut self, node: &NodeId, value: &str) -> Result<(), DomError> {
        if !self.is_control(*node) {
            return Err(DomError::Js("value set on a non-control".to_owned()));
        }
        value.clone_into(&mut self.get_mut(*node)?.value);
        Ok(())
    }

    fn control_type(&self, node: &NodeId) -> String {
        let declared = self.attribute(node, "type").map(|t| t.to_ascii_lowercase());
        match self.tag(*node) {
            "input" => declared.unwrap_or_else(|| "text".to_owned()),
            "button" => declared.unwrap_or_else(|| "submit".to_owned()),
            "select" => "select-one".to_owned(),
            "textarea" => "textarea".to_owned(),
            _ => String::new(),
        }
    }

    fn will_validate(&self, node: &NodeId) -> bool {
        if !self.is_control(*node) || self.has_attribute(*node, "disabled") || self.has_attribute(*node, "readonly") {
            return false;
        }
        match self.tag(*node) {
            "input" => !matches!(self.control_type(node).as_str(), "hidden" | "submit" | "reset" | "button"),
            "select" | "textarea" => true,
            _ => false,
        }
    }

    fn validity(&self, node: &NodeId) -> Validity {
        let Some(el) = self.get(*node) else {
            return Validity::default();
        };
        if !self.is_control(*node) {
            return Validity::default();
        }
        let empty = el.value.is_empty();
        let ty = self.control_type(node);
        let pattern = if self.tag(*node) == "input" { el.attrs.get("pattern") } else { None };
        Validity {
            value_missing: el.attrs.contains_key("required") && empty,
            type_mismatch: ty == "email" && !empty && !email_matches(&el.value),
            pattern_mismatch: pattern.is_some_and(|p| !empty && !pattern_matches(p, &el.value)),
            custom_error: !el.custom_validity.is_empty(),
            other: false,
        }
    }

    fn set_custom_validity(&mut self, node: &NodeId, message: &str) -> Result<(), DomError> {
        if !self.is_control(*node) {
            return Err(DomError::Js("setCustomValidity on a non-control".to_owned()));
        }
        message.clone_into(&mut self.get_mut(*node)?.custom_validity);
        Ok(())
    }

    fn check_validity(&self, form: &NodeId) -> bool {
        if self.tag(*form) == "form" {
            return self.first_invalid_control(*form).is_none();
        }
        !self.will_validate(form) || self.validity(form).valid()
    }

    fn report_validity(&mut self, node: &NodeId) -> Result<bool, DomError> {
        self.get_mut(*node)?;
        let target = if self.tag(*node) == "form" {
            self.first_invalid_control(*node)
        } else if self.is_control(*node) {
            (self.will_validate(node) && !self.validity(node).valid()).then_some(*node)
        } else {
            return Err(DomError::Js("reportValidity on a non-control".to_owned()));
        };
        self.reports.push(*node);
        match target {
            Some(invalid) => {
                self.focus(&invalid)?;
                Ok(false)
            }
            None => Ok(true),
        }
    }

    fn reset_form(&mut self, form: &NodeId) -> Result<(), DomError> {
        if self.tag(*form) != "form" {
            return Err(DomError::Js("reset on a non-form".to_owned()));
        }
        for id in self.form_controls(form) {
            let el = self.get_mut(id)?;
            el.value = el.default_value.clone();
        }
        Ok(())
    }
}
