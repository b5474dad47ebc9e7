//! Browser runtime: web-sys [`Document`] and the wasm entry point.
//!
//! SYSTEM CONTEXT
//! ==============
//! `start` runs when the wasm module loads. It installs console logging,
//! waits for `DOMContentLoaded` if the document is still parsing, then builds
//! one [`App`] shared by every listener through `Rc<RefCell<_>>`.
//!
//! Listeners translate DOM events into [`PageEvent`]s. Tasks returned by the
//! app are scheduled with `gloo_timers` and fed back as [`PageEvent::Timer`].
//! An event raised while another handler holds the app (a `blur` fired by
//! focus restoration, say) is skipped.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen::{JsCast, JsValue, closure::Closure};
use web_sys::{
    Element, Event, EventTarget, HtmlButtonElement, HtmlDialogElement, HtmlElement, HtmlFormElement, HtmlInputElement,
    HtmlSelectElement, HtmlTextAreaElement, ValidityState,
};

use crate::app::{App, PageEvent};
use crate::config::PageConfig;
use crate::dom::{Document, Validity};
use crate::error::DomError;
use crate::notify::{Deferred, Notification, NotificationKind};

const FOCUSABLE: &str = "input, select, textarea, button";
const NAV_LINKS: &str = "nav a";

type SharedApp = Rc<RefCell<App<WebDocument>>>;

fn js_error(err: JsValue) -> DomError {
    DomError::Js(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

/// The live page, accessed through web-sys.
#[derive(Debug, Clone)]
pub struct WebDocument {
    window: web_sys::Window,
    document: web_sys::Document,
}

impl WebDocument {
    /// Bind to the global window and its document.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::MissingWindow`] outside a browsing context.
    pub fn from_window() -> Result<Self, DomError> {
        let window = web_sys::window().ok_or(DomError::MissingWindow)?;
        let document = window.document().ok_or(DomError::MissingWindow)?;
        Ok(Self { window, document })
    }

    fn html(node: &Element) -> Result<&HtmlElement, DomError> {
        node.dyn_ref::<HtmlElement>()
            .ok_or_else(|| DomError::Js("not an HTML element".to_owned()))
    }

    fn dialog(node: &Element) -> Result<&HtmlDialogElement, DomError> {
        node.dyn_ref::<HtmlDialogElement>()
            .ok_or_else(|| DomError::Js("not a dialog".to_owned()))
    }

    fn form(node: &Element) -> Result<&HtmlFormElement, DomError> {
        node.dyn_ref::<HtmlFormElement>()
            .ok_or_else(|| DomError::Js("not a form".to_owned()))
    }
}

/// Listed form control with constraint validation.
enum Control<'a> {
    Input(&'a HtmlInputElement),
    Select(&'a HtmlSelectElement),
    TextArea(&'a HtmlTextAreaElement),
    Button(&'a HtmlButtonElement),
}

impl<'a> Control<'a> {
    fn of(node: &'a Element) -> Option<Self> {
        if let Some(el) = node.dyn_ref::<HtmlInputElement>() {
            Some(Self::Input(el))
        } else if let Some(el) = node.dyn_ref::<HtmlSelectElement>() {
            Some(Self::Select(el))
        } else if let Some(el) = node.dyn_ref::<HtmlTextAreaElement>() {
            Some(Self::TextArea(el))
        } else {
            node.dyn_ref::<HtmlButtonElement>().map(Self::Button)
        }
    }

    fn require(node: &'a Element, operation: &str) -> Result<Self, DomError> {
        Self::of(node).ok_or_else(|| DomError::Js(format!("{operation} on a non-control")))
    }

    fn value(&self) -> String {
        match self {
            Self::Input(el) => el.value(),
            Self::Select(el) => el.value(),
            Self::TextArea(el) => el.value(),
            Self::Button(el) => el.value(),
        }
    }

    fn set_value(&self, value: &str) {
        match self {
            Self::Input(el) => el.set_value(value),
            Self::Select(el) => el.set_value(value),
            Self::TextArea(el) => el.set_value(value),
            Self::Button(el) => el.set_value(value),
        }
    }

    fn control_type(&self) -> String {
        match self {
            Self::Input(el) => el.type_(),
            Self::Select(el) => el.type_(),
            Self::TextArea(el) => el.type_(),
            Self::Button(el) => el.type_(),
        }
    }

    fn will_validate(&self) -> bool {
        match self {
            Self::Input(el) => el.will_validate(),
            Self::Select(el) => el.will_validate(),
            Self::TextArea(el) => el.will_validate(),
            Self::Button(el) => el.will_validate(),
        }
    }

    fn validity(&self) -> ValidityState {
        match self {
            Self::Input(el) => el.validity(),
            Self::Select(el) => el.validity(),
            Self::TextArea(el) => el.validity(),
            Self::Button(el) => el.validity(),
        }
    }

    fn set_custom_validity(&self, message: &str) {
        match self {
            Self::Input(el) => el.set_custom_validity(message),
            Self::Select(el) => el.set_custom_validity(message),
            Self::TextArea(el) => el.set_custom_validity(message),
            Self::Button(el) => el.set_custom_validity(message),
        }
    }

    fn report_validity(&self) -> bool {
        match self {
            Self::Input(el) => el.report_validity(),
            Self::Select(el) => el.report_validity(),
            Self::TextArea(el) => el.report_validity(),
            Self::Button(el) => el.report_validity(),
        }
    }
}

impl Document for WebDocument {
    type Node = Element;

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn body(&self) -> Result<Element, DomError> {
        self.document.body().map(Element::from).ok_or(DomError::MissingBody)
    }

    fn active_element(&self) -> Option<Element> {
        self.document.active_element()
    }

    fn is_connected(&self, node: &Element) -> bool {
        node.is_connected()
    }

    fn first_focusable_within(&self, container: &Element) -> Option<Element> {
        match container.query_selector(FOCUSABLE) {
            Ok(found) => found,
            Err(e) => {
                log::warn!("focusable lookup failed: {}", js_error(e));
                None
            }
        }
    }

    fn navigation_links(&self) -> Vec<Element> {
        let list = match self.document.query_selector_all(NAV_LINKS) {
            Ok(list) => list,
            Err(e) => {
                log::warn!("navigation lookup failed: {}", js_error(e));
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_ref::<Element>().cloned())
            .collect()
    }

    fn location_path(&self) -> String {
        self.window.location().pathname().unwrap_or_default()
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&mut self, node: &Element, name: &str, value: &str) -> Result<(), DomError> {
        node.set_attribute(name, value).map_err(js_error)
    }

    fn remove_attribute(&mut self, node: &Element, name: &str) -> Result<(), DomError> {
        node.remove_attribute(name).map_err(js_error)
    }

    fn toggle_class(&mut self, node: &Element, class: &str, enabled: bool) -> Result<(), DomError> {
        node.class_list()
            .toggle_with_force(class, enabled)
            .map(|_| ())
            .map_err(js_error)
    }

    fn set_style(&mut self, node: &Element, property: &str, value: &str) -> Result<(), DomError> {
        Self::html(node)?
            .style()
            .set_property(property, value)
            .map_err(js_error)
    }

    fn set_text(&mut self, node: &Element, text: &str) -> Result<(), DomError> {
        node.set_text_content(Some(text));
        Ok(())
    }

    fn focus(&mut self, node: &Element) -> Result<(), DomError> {
        Self::html(node)?.focus().map_err(js_error)
    }

    fn create_element(&mut self, tag: &str) -> Result<Element, DomError> {
        self.document.create_element(tag).map_err(js_error)
    }

    fn append_child(&mut self, parent: &Element, child: &Element) -> Result<(), DomError> {
        parent.append_child(child).map(|_| ()).map_err(js_error)
    }

    fn remove(&mut self, node: &Element) -> Result<(), DomError> {
        node.remove();
        Ok(())
    }

    fn show_modal(&mut self, dialog: &Element) -> Result<(), DomError> {
        Self::dialog(dialog)?.show_modal().map_err(js_error)
    }

    fn close_dialog(&mut self, dialog: &Element, return_value: &str) -> Result<(), DomError> {
        let dialog = Self::dialog(dialog)?;
        if dialog.open() {
            dialog.close_with_return_value(return_value);
        }
        Ok(())
    }

    fn form_controls(&self, form: &Element) -> Vec<Element> {
        let Some(form) = form.dyn_ref::<HtmlFormElement>() else {
            return Vec::new();
        };
        let elements = form.elements();
        (0..elements.length())
            .filter_map(|i| elements.item(i))
            .filter(|el| Control::of(el).is_some())
            .collect()
    }

    fn value(&self, node: &Element) -> String {
        Control::of(node).as_ref().map(Control::value).unwrap_or_default()
    }

    fn set_value(&mut self, node: &Element, value: &str) -> Result<(), DomError> {
        Control::require(node, "value set")?.set_value(value);
        Ok(())
    }

    fn control_type(&self, node: &Element) -> String {
        Control::of(node).as_ref().map(Control::control_type).unwrap_or_default()
    }

    fn will_validate(&self, node: &Element) -> bool {
        Control::of(node).as_ref().is_some_and(Control::will_validate)
    }

    fn validity(&self, node: &Element) -> Validity {
        let Some(state) = Control::of(node).as_ref().map(Control::validity) else {
            return Validity::default();
        };
        Validity {
            value_missing: state.value_missing(),
            type_mismatch: state.type_mismatch(),
            pattern_mismatch: state.pattern_mismatch(),
            custom_error: state.custom_error(),
            other: state.too_long()
                || state.too_short()
                || state.range_underflow()
                || state.range_overflow()
                || state.step_mismatch()
                || state.bad_input(),
        }
    }

    fn set_custom_validity(&mut self, node: &Element, message: &str) -> Result<(), DomError> {
        Control::require(node, "setCustomValidity")?.set_custom_validity(message);
        Ok(())
    }

    fn check_validity(&self, form: &Element) -> bool {
        form.dyn_ref::<HtmlFormElement>()
            .is_none_or(HtmlFormElement::check_validity)
    }

    fn report_validity(&mut self, node: &Element) -> Result<bool, DomError> {
        if let Some(form) = node.dyn_ref::<HtmlFormElement>() {
            return Ok(form.report_validity());
        }
        Ok(Control::require(node, "reportValidity")?.report_validity())
    }

    fn reset_form(&mut self, form: &Element) -> Result<(), DomError> {
        Self::form(form)?.reset();
        Ok(())
    }
}

// =============================================================================
// Entry point
// =============================================================================

/// Wasm start hook: install logging and initialize once the DOM is parsed.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&JsValue::from_str(&format!("console logger unavailable: {e}")));
    }

    let dom = match WebDocument::from_window() {
        Ok(dom) => dom,
        Err(e) => {
            log::error!("contact page not started: {e}");
            return;
        }
    };

    if dom.document.ready_state() == "loading" {
        let target = dom.document.clone();
        let on_ready = Closure::once_into_js(move || init(dom));
        if let Err(e) = target.add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref()) {
            log::error!("failed to wait for DOMContentLoaded: {}", js_error(e));
        }
    } else {
        init(dom);
    }
}

fn init(dom: WebDocument) {
    let config = PageConfig::load(&dom);
    let app: SharedApp = Rc::new(RefCell::new(App::new(dom, config)));

    if let Err(e) = wire_listeners(&app) {
        log::error!("failed to wire page listeners: {e}");
    }
    if let Err(e) = expose_global(&app) {
        log::error!("failed to expose window.App: {e}");
    }
    dispatch(&app, PageEvent::UpdateNav);
}

fn wire_listeners(app: &SharedApp) -> Result<(), DomError> {
    let (ids, features, lookup) = {
        let app = app.borrow();
        let ids = app.config().ids.clone();
        let dom = app.dom();
        let lookup = [&ids.open_button, &ids.close_button, &ids.dialog, &ids.form, &ids.phone]
            .map(|id| dom.element_by_id(id));
        (ids, app.features(), lookup)
    };
    let [open_button, close_button, dialog, form, phone] = lookup;
    log::debug!("wiring listeners for #{} and #{}", ids.dialog, ids.form);

    if features.dialog {
        if let (Some(open_button), Some(dialog)) = (open_button, dialog) {
            listen(&open_button, "click", app, |_| Some(PageEvent::OpenModal))?;
            listen(&dialog, "click", app, |event| {
                event
                    .target()
                    .and_then(|target| target.dyn_ref::<Element>().cloned())
                    .map(|target| PageEvent::DialogClick { target })
            })?;
            listen(&dialog, "close", app, |_| Some(PageEvent::DialogClosed))?;
        }
    }
    if features.close_button {
        if let Some(close_button) = close_button {
            listen(&close_button, "click", app, |_| Some(PageEvent::CloseModal))?;
        }
    }
    if features.form {
        if let Some(form) = form {
            listen(&form, "submit", app, |event| {
                event.prevent_default();
                Some(PageEvent::Submit)
            })?;
        }
    }
    if features.phone_mask {
        if let Some(phone) = phone {
            listen(&phone, "input", app, |_| Some(PageEvent::PhoneInput))?;
            listen(&phone, "blur", app, |_| Some(PageEvent::PhoneBlur))?;
        }
    }
    Ok(())
}

/// Attach a listener that maps DOM events to page events. Lives as long as the page.
fn listen(
    target: &EventTarget,
    kind: &str,
    app: &SharedApp,
    to_event: impl Fn(&Event) -> Option<PageEvent<Element>> + 'static,
) -> Result<(), DomError> {
    let app = Rc::clone(app);
    let cb = Closure::wrap(Box::new(move |event: Event| {
        if let Some(page_event) = to_event(&event) {
            dispatch(&app, page_event);
        }
    }) as Box<dyn FnMut(Event)>);
    target
        .add_event_listener_with_callback(kind, cb.as_ref().unchecked_ref())
        .map_err(js_error)?;
    cb.forget();
    Ok(())
}

fn dispatch(app: &SharedApp, event: PageEvent<Element>) {
    let deferred = match app.try_borrow_mut() {
        Ok(mut guard) => guard.handle(event),
        Err(_) => {
            log::debug!("skipping re-entrant page event {event:?}");
            return;
        }
    };
    schedule(app, deferred);
}

fn schedule(app: &SharedApp, deferred: Vec<Deferred>) {
    for Deferred { delay_ms, task } in deferred {
        let app = Rc::clone(app);
        Timeout::new(delay_ms, move || dispatch(&app, PageEvent::Timer(task))).forget();
    }
}

/// Install `window.App` with the page's public entry points.
fn expose_global(app: &SharedApp) -> Result<(), DomError> {
    let api = js_sys::Object::new();

    let show = {
        let app = Rc::clone(app);
        Closure::wrap(Box::new(move |message: JsValue, kind: JsValue| {
            let message = message.as_string().unwrap_or_default();
            let kind = kind.as_string().map_or(NotificationKind::Info, |raw| NotificationKind::parse(&raw));
            dispatch(&app, PageEvent::ShowNotification(Notification::new(message, kind)));
        }) as Box<dyn FnMut(JsValue, JsValue)>)
    };
    set_property(&api, "showNotification", show.as_ref())?;
    show.forget();

    for (name, event) in [
        ("openModal", PageEvent::OpenModal),
        ("closeModal", PageEvent::CloseModal),
        ("updateActiveNav", PageEvent::UpdateNav),
    ] {
        let app = Rc::clone(app);
        let cb = Closure::wrap(Box::new(move || dispatch(&app, event.clone())) as Box<dyn FnMut()>);
        set_property(&api, name, cb.as_ref())?;
        cb.forget();
    }

    let window = app.borrow().dom().window.clone();
    set_property(&window, "App", &api)
}

fn set_property(target: &JsValue, name: &str, value: &JsValue) -> Result<(), DomError> {
    js_sys::Reflect::set(target, &JsValue::from_str(name), value)
        .map(|_| ())
        .map_err(js_error)
}
