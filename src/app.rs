//! Page bootstrapper and event dispatch.
//!
//! SYSTEM CONTEXT
//! ==============
//! `App` resolves the page's elements once, owns the per-feature controllers
//! and exposes a single [`App::handle`] entry point. The host (the web runtime
//! or a test) translates DOM events into [`PageEvent`]s, feeds them in, and
//! runs the returned [`Deferred`] tasks after their delay.
//!
//! Missing elements disable only the feature that needs them. Document errors
//! are logged here and never escape a handler.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use crate::config::PageConfig;
use crate::dialog::{CloseReason, DialogController};
use crate::dom::Document;
use crate::error::DomError;
use crate::form::{ContactFields, ContactForm, LogSink, SubmissionSink, SubmitOutcome};
use crate::nav;
use crate::notify::{Deferred, Notification, NotificationKind, NotificationPresenter, Task};

/// Something that happened on the page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent<N> {
    /// `openDialog` clicked, or `App.openModal()`.
    OpenModal,
    /// `closeDialog` clicked, or `App.closeModal()`.
    CloseModal,
    /// Click anywhere inside the dialog element.
    DialogClick { target: N },
    /// The dialog's `close` event fired.
    DialogClosed,
    /// The contact form was submitted.
    Submit,
    PhoneInput,
    PhoneBlur,
    /// `App.showNotification(message, kind)`.
    ShowNotification(Notification),
    /// `App.updateActiveNav()`.
    UpdateNav,
    /// A deferred task came due.
    Timer(Task),
}

/// Which features were wired at construction.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Features {
    pub dialog: bool,
    pub close_button: bool,
    pub form: bool,
    pub phone_mask: bool,
}

pub struct App<D: Document> {
    dom: D,
    config: PageConfig,
    dialog: Option<DialogController<D::Node>>,
    form: Option<ContactForm<D::Node>>,
    notifications: NotificationPresenter<D::Node>,
    sink: Box<dyn SubmissionSink>,
    features: Features,
}

impl<D: Document> App<D> {
    /// Resolve page elements and build the controllers.
    pub fn new(dom: D, config: PageConfig) -> Self {
        log::info!("initializing contact page");
        let ids = &config.ids;

        let dialog_el = dom.element_by_id(&ids.dialog);
        let open_button = dom.element_by_id(&ids.open_button);
        let dialog = match (dialog_el, open_button) {
            (Some(dialog), Some(_)) => Some(DialogController::new(dialog)),
            (dialog, _) => {
                log::warn!(
                    "dialog disabled: #{} {}, #{} missing",
                    ids.dialog,
                    if dialog.is_some() { "present" } else { "missing" },
                    ids.open_button
                );
                None
            }
        };
        let close_button = dialog.is_some() && dom.element_by_id(&ids.close_button).is_some();

        let form = match dom.element_by_id(&ids.form) {
            Some(form) => Some(ContactForm::new(form, ContactFields::resolve(&dom, ids))),
            None => {
                log::warn!("form handling disabled: #{} missing", ids.form);
                None
            }
        };
        let phone_mask = form.as_ref().is_some_and(|f| f.fields().phone.is_some());
        if form.is_some() && !phone_mask {
            log::warn!("phone mask disabled: #{} missing", ids.phone);
        }

        let features = Features { dialog: dialog.is_some(), close_button, form: form.is_some(), phone_mask };
        let notifications = NotificationPresenter::new(config.notifications);
        log::info!("contact page initialized: {features:?}");

        Self { dom, config, dialog, form, notifications, sink: Box::new(LogSink), features }
    }

    /// Replace the submission sink.
    #[must_use]
    pub fn with_sink(mut self, sink: impl SubmissionSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    #[must_use]
    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    #[must_use]
    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    #[must_use]
    pub fn features(&self) -> Features {
        self.features
    }

    #[must_use]
    pub fn is_dialog_open(&self) -> bool {
        self.dialog.as_ref().is_some_and(DialogController::is_open)
    }

    #[must_use]
    pub fn notifications(&self) -> &NotificationPresenter<D::Node> {
        &self.notifications
    }

    /// Handle one page event; returns tasks for the host to schedule.
    pub fn handle(&mut self, event: PageEvent<D::Node>) -> Vec<Deferred> {
        match self.dispatch(event) {
            Ok(deferred) => deferred,
            Err(e) => {
                log::error!("page event failed: {e}");
                Vec::new()
            }
        }
    }

    // --- Entry points ---

    pub fn show_notification(&mut self, message: &str, kind: NotificationKind) -> Vec<Deferred> {
        self.handle(PageEvent::ShowNotification(Notification::new(message, kind)))
    }

    pub fn open_modal(&mut self) {
        self.handle(PageEvent::OpenModal);
    }

    pub fn close_modal(&mut self) {
        self.handle(PageEvent::CloseModal);
    }

    pub fn update_active_nav(&mut self) {
        self.handle(PageEvent::UpdateNav);
    }

    fn dispatch(&mut self, event: PageEvent<D::Node>) -> Result<Vec<Deferred>, DomError> {
        let form = self.form.as_ref();
        match event {
            PageEvent::OpenModal => {
                if let Some(dialog) = self.dialog.as_mut() {
                    dialog.open(&mut self.dom)?;
                }
            }
            PageEvent::CloseModal => {
                if let Some(dialog) = self.dialog.as_mut() {
                    dialog.close(&mut self.dom, CloseReason::Cancel, form)?;
                }
            }
            PageEvent::DialogClick { target } => {
                if let Some(dialog) = self.dialog.as_mut() {
                    dialog.handle_click(&mut self.dom, &target, form)?;
                }
            }
            PageEvent::DialogClosed => {
                if let Some(dialog) = self.dialog.as_mut() {
                    dialog.handle_closed(&mut self.dom, form)?;
                }
            }
            PageEvent::Submit => return self.submit(),
            PageEvent::PhoneInput => {
                if let Some(form) = form {
                    form.on_phone_input(&mut self.dom)?;
                }
            }
            PageEvent::PhoneBlur => {
                if let Some(form) = form {
                    form.on_phone_blur(&mut self.dom)?;
                }
            }
            PageEvent::ShowNotification(notification) => {
                return self.notifications.show(&mut self.dom, notification);
            }
            PageEvent::UpdateNav => {
                nav::update_active_nav(&mut self.dom, &self.config.known_pages)?;
            }
            PageEvent::Timer(task) => return self.notifications.run(&mut self.dom, task),
        }
        Ok(Vec::new())
    }

    fn submit(&mut self) -> Result<Vec<Deferred>, DomError> {
        let Some(form) = self.form.as_ref() else {
            return Ok(Vec::new());
        };
        let SubmitOutcome::Submitted(_) = form.on_submit(&mut self.dom, self.sink.as_mut())? else {
            return Ok(Vec::new());
        };

        // The sink already has the submission; close and reset regardless.
        let success = Notification::new(self.config.success_message.clone(), NotificationKind::Success);
        let deferred = match self.notifications.show(&mut self.dom, success) {
            Ok(deferred) => deferred,
            Err(e) => {
                log::error!("success notification failed: {e}");
                Vec::new()
            }
        };
        match self.dialog.as_mut() {
            Some(dialog) if dialog.is_open() => dialog.close(&mut self.dom, CloseReason::Success, Some(form))?,
            _ => form.reset(&mut self.dom)?,
        }
        log::info!("contact form handled");
        Ok(deferred)
    }
}
