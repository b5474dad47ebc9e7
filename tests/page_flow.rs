//! End-to-end page flow against the headless document.
//!
//! Drives `App` the way the browser runtime does: events in, deferred timer
//! tasks out, with the test acting as the host's timer queue.

use std::cell::RefCell;
use std::rc::Rc;

use contact_page::app::{App, PageEvent};
use contact_page::config::{CONFIG_ATTRIBUTE, PageConfig};
use contact_page::dom::Document;
use contact_page::form::{ContactSubmission, EMAIL_MESSAGE};
use contact_page::headless::{HeadlessDocument, NodeId};
use contact_page::notify::{Deferred, NotificationKind};
use contact_page::phone::{PHONE_FORMAT_MESSAGE, PHONE_PATTERN};

struct Ids {
    links: Vec<NodeId>,
    open: NodeId,
    dialog: NodeId,
    email: NodeId,
    phone: NodeId,
}

fn build_page(path: &str) -> (HeadlessDocument, Ids) {
    let mut doc = HeadlessDocument::new();
    doc.set_location_path(path);
    let body = doc.body_id();

    let header = doc.element(body, "header", &[]);
    let nav = doc.element(header, "nav", &[]);
    let links = ["index.html", "about.html", "contacts.html"]
        .iter()
        .map(|href| doc.element(nav, "a", &[("href", *href)]))
        .collect();

    let open = doc.element(body, "button", &[("id", "openDialog"), ("type", "button")]);
    let dialog = doc.element(body, "dialog", &[("id", "contactDialog")]);
    let form = doc.element(dialog, "form", &[("id", "contactForm"), ("novalidate", "")]);
    doc.element(form, "input", &[("id", "name"), ("required", "")]);
    let email = doc.element(form, "input", &[("id", "email"), ("type", "email"), ("required", "")]);
    let phone = doc.element(
        form,
        "input",
        &[("id", "phone"), ("type", "tel"), ("pattern", PHONE_PATTERN), ("required", "")],
    );
    doc.element(form, "input", &[("id", "date"), ("type", "date")]);
    doc.element(form, "select", &[("id", "topic"), ("value", "general")]);
    doc.element(form, "textarea", &[("id", "message"), ("required", "")]);
    doc.element(form, "button", &[("id", "closeDialog"), ("type", "button")]);
    doc.element(form, "button", &[("type", "submit")]);

    (doc, Ids { links, open, dialog, email, phone })
}

/// Host-side timer queue: runs tasks in due order.
#[derive(Default)]
struct Clock {
    now: u32,
    queue: Vec<(u32, Deferred)>,
}

impl Clock {
    fn push(&mut self, deferred: Vec<Deferred>) {
        for d in deferred {
            self.queue.push((self.now + d.delay_ms, d));
        }
    }

    fn advance(&mut self, app: &mut App<HeadlessDocument>, until: u32) {
        loop {
            self.queue.sort_by_key(|(due, _)| *due);
            if self.queue.first().is_none_or(|(due, _)| *due > until) {
                break;
            }
            let (due, d) = self.queue.remove(0);
            self.now = due;
            let next = app.handle(PageEvent::Timer(d.task));
            self.push(next);
        }
        self.now = until;
    }
}

fn type_into(app: &mut App<HeadlessDocument>, id: &str, value: &str) {
    let node = app.dom().element_by_id(id).expect("field exists");
    app.dom_mut().set_value(&node, value).expect("set value");
}

#[test]
fn visitor_opens_dialog_fixes_errors_and_submits() {
    let (doc, ids) = build_page("/site/contacts.html");
    let submissions = Rc::new(RefCell::new(Vec::<ContactSubmission>::new()));
    let sink = Rc::clone(&submissions);
    let mut app = App::new(doc, PageConfig::default())
        .with_sink(move |s: &ContactSubmission| sink.borrow_mut().push(s.clone()));
    let mut clock = Clock::default();

    app.update_active_nav();
    assert!(app.dom().has_class(ids.links[2], "active"));
    assert_eq!(app.dom().attribute(&ids.links[2], "aria-current").as_deref(), Some("page"));

    app.dom_mut().focus(&ids.open).expect("focus opener");
    app.open_modal();
    assert!(app.dom().is_dialog_open(ids.dialog));

    // Bad email, half-typed phone.
    type_into(&mut app, "name", "Anna");
    type_into(&mut app, "email", "anna@");
    type_into(&mut app, "phone", "8900123");
    app.handle(PageEvent::PhoneInput);
    assert_eq!(app.dom().value(&ids.phone), "+7 (900) 123");
    app.handle(PageEvent::PhoneBlur);
    assert_eq!(app.dom().custom_validity(ids.phone), PHONE_FORMAT_MESSAGE);

    clock.push(app.handle(PageEvent::Submit));
    assert!(submissions.borrow().is_empty());
    assert_eq!(app.dom().custom_validity(ids.email), EMAIL_MESSAGE);
    assert_eq!(app.dom().attribute(&ids.email, "aria-invalid").as_deref(), Some("true"));
    assert!(app.is_dialog_open());

    // Corrections.
    type_into(&mut app, "email", "anna@example.com");
    type_into(&mut app, "phone", "+7 (900) 123-45-67");
    app.handle(PageEvent::PhoneInput);
    type_into(&mut app, "message", "Call me back");

    let before = app.dom().children(app.dom().body_id()).len();
    clock.push(app.handle(PageEvent::Submit));

    let captured = submissions.borrow().clone();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].phone, "+7 (900) 123-45-67");
    assert_eq!(captured[0].topic, "general");
    assert!(!app.is_dialog_open());
    assert_eq!(app.dom().return_value(ids.dialog), "success");
    assert_eq!(app.dom().focused(), Some(ids.open));
    assert_eq!(app.dom().attribute(&ids.email, "aria-invalid"), None);

    let body = app.dom().body_id();
    assert_eq!(app.dom().children(body).len(), before + 1);
    let lifetime = app.config().notifications.lifetime_ms();
    clock.advance(&mut app, lifetime);
    assert_eq!(app.dom().children(body).len(), before);
}

#[test]
fn script_api_notifications_queue_past_the_visible_cap() {
    let (doc, _) = build_page("/index.html");
    let mut app = App::new(doc, PageConfig::default());
    let mut clock = Clock::default();
    let body = app.dom().body_id();
    let before = app.dom().children(body).len();

    for i in 0..5 {
        clock.push(app.show_notification(&format!("note {i}"), NotificationKind::parse("error")));
    }
    assert_eq!(app.notifications().visible_count(), 3);
    assert_eq!(app.notifications().pending_count(), 2);

    let lifetime = app.config().notifications.lifetime_ms();
    clock.advance(&mut app, lifetime);
    assert_eq!(app.notifications().visible_count(), 2);
    assert_eq!(app.notifications().pending_count(), 0);

    clock.advance(&mut app, lifetime * 3);
    assert_eq!(app.notifications().visible_count(), 0);
    assert_eq!(app.dom().children(body).len(), before);
}

#[test]
fn body_config_renames_elements() {
    let (mut doc, ids) = build_page("/");
    doc.set_attribute(&ids.dialog, "id", "feedback").expect("rename dialog");
    let body = doc.body_id();
    doc.set_attribute(&body, CONFIG_ATTRIBUTE, r#"{"ids": {"dialog": "feedback"}, "knownPages": ["index", "about"]}"#)
        .expect("set config");

    let config = PageConfig::load(&doc);
    let mut app = App::new(doc, config);
    assert!(app.features().dialog);

    app.update_active_nav();
    assert!(app.dom().has_class(ids.links[0], "active"));

    app.open_modal();
    assert!(app.dom().is_dialog_open(ids.dialog));
    app.handle(PageEvent::DialogClick { target: ids.dialog });
    assert!(!app.is_dialog_open());
}
