//! Stock contact page markup shared by the unit tests.

use crate::dom::Document;
use crate::headless::{HeadlessDocument, NodeId};
use crate::phone::PHONE_PATTERN;

/// Handles into the page built by [`contact_page`].
pub struct Page {
    pub doc: HeadlessDocument,
    pub nav_links: Vec<NodeId>,
    pub open_button: NodeId,
    pub dialog: NodeId,
    pub close_button: NodeId,
    pub form: NodeId,
    pub name: NodeId,
    pub email: NodeId,
    pub phone: NodeId,
    pub date: NodeId,
    pub topic: NodeId,
    pub message: NodeId,
    pub submit: NodeId,
}

impl Page {
    /// Fill every field with a valid value.
    pub fn fill_valid(&mut self) {
        let values = [
            (self.name, "Anna"),
            (self.email, "anna@example.com"),
            (self.phone, "+7 (900) 123-45-67"),
            (self.date, "2026-10-20"),
            (self.topic, "support"),
            (self.message, "Hello there"),
        ];
        for (node, value) in values {
            self.doc.set_value(&node, value).expect("fill field");
        }
    }
}

/// `<nav>` with three links, an open button and the contact dialog + form.
pub fn contact_page() -> Page {
    let mut doc = HeadlessDocument::new();
    let body = doc.body_id();

    let nav = doc.element(body, "nav", &[]);
    let nav_links = ["index.html", "about.html", "contacts.html"]
        .iter()
        .map(|href| doc.element(nav, "a", &[("href", *href), ("class", "nav-link")]))
        .collect();

    let open_button = doc.element(body, "button", &[("id", "openDialog"), ("type", "button")]);
    let dialog = doc.element(body, "dialog", &[("id", "contactDialog")]);
    let form = doc.element(dialog, "form", &[("id", "contactForm"), ("novalidate", "")]);
    let name = doc.element(form, "input", &[("id", "name"), ("required", "")]);
    let email = doc.element(form, "input", &[("id", "email"), ("type", "email"), ("required", "")]);
    let phone = doc.element(
        form,
        "input",
        &[("id", "phone"), ("type", "tel"), ("pattern", PHONE_PATTERN), ("required", "")],
    );
    let date = doc.element(form, "input", &[("id", "date"), ("type", "date")]);
    let topic = doc.element(form, "select", &[("id", "topic")]);
    let message = doc.element(form, "textarea", &[("id", "message"), ("required", "")]);
    let submit = doc.element(form, "button", &[("type", "submit")]);
    let close_button = doc.element(form, "button", &[("id", "closeDialog"), ("type", "button")]);

    Page {
        doc,
        nav_links,
        open_button,
        dialog,
        close_button,
        form,
        name,
        email,
        phone,
        date,
        topic,
        message,
        submit,
    }
}
