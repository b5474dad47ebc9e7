use std::cell::Cell;
use std::rc::Rc;

use super::*;
use crate::fixture::{Page, contact_page};
use crate::form::ContactSubmission;
use crate::headless::{HeadlessDocument, NodeId};

fn app_with_counter(page: Page) -> (App<HeadlessDocument>, Rc<Cell<usize>>) {
    let count = Rc::new(Cell::new(0));
    let sink_count = Rc::clone(&count);
    let app = App::new(page.doc, PageConfig::default())
        .with_sink(move |_: &ContactSubmission| sink_count.set(sink_count.get() + 1));
    (app, count)
}

fn fill_valid(app: &mut App<HeadlessDocument>) {
    for (id, value) in [
        ("name", "Anna"),
        ("email", "anna@example.com"),
        ("phone", "+7 (900) 123-45-67"),
        ("message", "Hello"),
    ] {
        let node = app.dom().element_by_id(id).expect("field");
        app.dom_mut().set_value(&node, value).expect("fill");
    }
}

fn toasts(app: &App<HeadlessDocument>, skip: usize) -> Vec<NodeId> {
    let doc = app.dom();
    doc.children(doc.body_id())[skip..].to_vec()
}

// =============================================================
// Bootstrapping
// =============================================================

#[test]
fn full_page_wires_every_feature() {
    let app = App::new(contact_page().doc, PageConfig::default());
    assert_eq!(
        app.features(),
        Features { dialog: true, close_button: true, form: true, phone_mask: true }
    );
}

#[test]
fn empty_page_disables_features_without_failing() {
    let mut app = App::new(HeadlessDocument::new(), PageConfig::default());
    assert_eq!(app.features(), Features::default());

    app.open_modal();
    app.close_modal();
    assert!(app.handle(PageEvent::Submit).is_empty());
    app.handle(PageEvent::PhoneInput);
    assert!(!app.is_dialog_open());
}

#[test]
fn dialog_without_open_button_is_not_wired() {
    let mut page = contact_page();
    page.doc.remove(&page.open_button).expect("remove");
    let mut app = App::new(page.doc, PageConfig::default());
    assert!(!app.features().dialog);
    app.open_modal();
    assert!(!app.dom().is_dialog_open(page.dialog));
}

#[test]
fn custom_ids_come_from_config() {
    let mut page = contact_page();
    page.doc.set_attribute(&page.dialog, "id", "feedback").expect("rename");
    let mut config = PageConfig::default();
    config.ids.dialog = "feedback".to_owned();
    let app = App::new(page.doc, config);
    assert!(app.features().dialog);
}

// =============================================================
// Dialog flow
// =============================================================

#[test]
fn open_then_cancel_restores_focus() {
    let page = contact_page();
    let (open_button, name) = (page.open_button, page.name);
    let (mut app, _) = app_with_counter(page);
    app.dom_mut().focus(&open_button).expect("focus");

    app.open_modal();
    assert!(app.is_dialog_open());
    assert_eq!(app.dom().focused(), Some(name));

    app.close_modal();
    assert!(!app.is_dialog_open());
    assert_eq!(app.dom().focused(), Some(open_button));
}

#[test]
fn backdrop_click_closes_but_content_click_does_not() {
    let page = contact_page();
    let (dialog, email) = (page.dialog, page.email);
    let (mut app, _) = app_with_counter(page);
    app.open_modal();

    app.handle(PageEvent::DialogClick { target: email });
    assert!(app.is_dialog_open());

    app.handle(PageEvent::DialogClick { target: dialog });
    assert!(!app.is_dialog_open());
    assert_eq!(app.dom().return_value(dialog), "cancel");
}

// =============================================================
// Submission
// =============================================================

#[test]
fn invalid_submit_never_calls_sink_and_keeps_dialog_open() {
    let (mut app, count) = app_with_counter(contact_page());
    app.open_modal();

    let deferred = app.handle(PageEvent::Submit);

    assert!(deferred.is_empty());
    assert_eq!(count.get(), 0);
    assert!(app.is_dialog_open());
}

#[test]
fn valid_submit_calls_sink_once_notifies_and_closes() {
    let page = contact_page();
    let (dialog, email) = (page.dialog, page.email);
    let (mut app, count) = app_with_counter(page);
    app.open_modal();
    fill_valid(&mut app);

    let deferred = app.handle(PageEvent::Submit);

    assert_eq!(count.get(), 1);
    assert_eq!(deferred.len(), 2);
    assert!(!app.is_dialog_open());
    assert_eq!(app.dom().return_value(dialog), "success");
    assert_eq!(app.dom().value(&email), "");

    let body_children = app.dom().children(app.dom().body_id()).len();
    let toast = toasts(&app, body_children - 1)[0];
    assert_eq!(app.dom().style(toast, "background-color"), Some("#28a745"));
    assert_eq!(app.dom().text(toast), app.config().success_message);
}

#[test]
fn valid_submit_without_open_dialog_still_resets_form() {
    let page = contact_page();
    let email = page.email;
    let (mut app, count) = app_with_counter(page);
    fill_valid(&mut app);

    app.handle(PageEvent::Submit);

    assert_eq!(count.get(), 1);
    assert_eq!(app.dom().value(&email), "");
}

#[test]
fn failed_success_toast_still_closes_and_resets() {
    let page = contact_page();
    let (dialog, email) = (page.dialog, page.email);
    let (mut app, count) = app_with_counter(page);
    app.open_modal();
    fill_valid(&mut app);
    let body = app.dom().body_id();
    app.dom_mut().remove(&body).expect("detach body");

    let deferred = app.handle(PageEvent::Submit);

    assert!(deferred.is_empty());
    assert_eq!(count.get(), 1);
    assert!(!app.is_dialog_open());
    assert_eq!(app.dom().return_value(dialog), "success");
    assert_eq!(app.dom().value(&email), "");

    app.handle(PageEvent::Submit);
    assert_eq!(count.get(), 1);
}

// =============================================================
// Phone, nav, notifications
// =============================================================

#[test]
fn phone_input_event_masks_value() {
    let page = contact_page();
    let phone = page.phone;
    let (mut app, _) = app_with_counter(page);
    app.dom_mut().set_value(&phone, "89001234567").expect("type");
    app.handle(PageEvent::PhoneInput);
    assert_eq!(app.dom().value(&phone), "+7 (900) 123-45-67");
}

#[test]
fn update_active_nav_entry_point() {
    let mut page = contact_page();
    page.doc.set_location_path("/contacts.html");
    let links = page.nav_links.clone();
    let (mut app, _) = app_with_counter(page);

    app.update_active_nav();

    assert!(app.dom().has_class(links[2], "active"));
    assert!(!app.dom().has_class(links[0], "active"));
}

#[test]
fn show_notification_timer_lifecycle_removes_toast() {
    let (mut app, _) = app_with_counter(contact_page());
    let before = app.dom().children(app.dom().body_id()).len();

    let deferred = app.show_notification("Hello", NotificationKind::Info);
    let toast = toasts(&app, before)[0];
    let fade = deferred
        .iter()
        .find(|d| matches!(d.task, Task::NotificationFadeOut(_)))
        .expect("fade-out scheduled");
    assert_eq!(fade.delay_ms, app.config().notifications.display_ms);

    let removal = app.handle(PageEvent::Timer(fade.task));
    assert_eq!(removal.len(), 1);
    assert_eq!(removal[0].delay_ms, app.config().notifications.fade_ms);
    app.handle(PageEvent::Timer(removal[0].task));

    assert!(!app.dom().is_connected(&toast));
    assert_eq!(app.notifications().visible_count(), 0);
}
