//! Modal contact dialog with focus restoration.
//!
//! The controller owns the only cross-event state on the page: the element
//! that had focus before the dialog opened. Close handling is idempotent so
//! it can run both from [`DialogController::close`] and from the host's own
//! `close` event (Escape key) without resetting the form twice.

#[cfg(test)]
#[path = "dialog_test.rs"]
mod dialog_test;

use crate::dom::Document;
use crate::error::DomError;
use crate::form::ContactForm;

/// Why the dialog was closed; written as the dialog's return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Cancel,
    Success,
}

impl CloseReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cancel => "cancel",
            Self::Success => "success",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogState<N> {
    Closed,
    Open {
        /// Element focused before opening. Not owned; may be detached by now.
        previously_focused: Option<N>,
    },
}

#[derive(Debug, Clone)]
pub struct DialogController<N> {
    dialog: N,
    state: DialogState<N>,
}

impl<N: Clone + PartialEq> DialogController<N> {
    #[must_use]
    pub fn new(dialog: N) -> Self {
        Self { dialog, state: DialogState::Closed }
    }

    #[must_use]
    pub fn dialog(&self) -> &N {
        &self.dialog
    }

    #[must_use]
    pub fn state(&self) -> &DialogState<N> {
        &self.state
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self.state, DialogState::Open { .. })
    }

    /// Show the dialog and focus its first control.
    ///
    /// # Errors
    ///
    /// Propagates document failures; the state stays `Closed` if showing fails.
    pub fn open<D: Document<Node = N>>(&mut self, dom: &mut D) -> Result<(), DomError> {
        if self.is_open() {
            log::debug!("dialog already open");
            return Ok(());
        }
        let previously_focused = dom.active_element();
        dom.show_modal(&self.dialog)?;
        self.state = DialogState::Open { previously_focused };

        if let Some(first) = dom.first_focusable_within(&self.dialog) {
            dom.focus(&first)?;
        }
        log::info!("contact dialog opened");
        Ok(())
    }

    /// Close the dialog and run close handling.
    ///
    /// # Errors
    ///
    /// Propagates document failures.
    pub fn close<D: Document<Node = N>>(
        &mut self,
        dom: &mut D,
        reason: CloseReason,
        form: Option<&ContactForm<N>>,
    ) -> Result<(), DomError> {
        if !self.is_open() {
            return Ok(());
        }
        dom.close_dialog(&self.dialog, reason.as_str())?;
        log::info!("contact dialog closed ({})", reason.as_str());
        self.handle_closed(dom, form)
    }

    /// React to the dialog having closed, whatever closed it.
    ///
    /// Restores focus and resets the form. Does nothing if already handled.
    ///
    /// # Errors
    ///
    /// Propagates document failures.
    pub fn handle_closed<D: Document<Node = N>>(
        &mut self,
        dom: &mut D,
        form: Option<&ContactForm<N>>,
    ) -> Result<(), DomError> {
        let DialogState::Open { previously_focused } = std::mem::replace(&mut self.state, DialogState::Closed) else {
            return Ok(());
        };
        if let Some(node) = previously_focused.filter(|node| dom.is_connected(node)) {
            dom.focus(&node)?;
        }
        if let Some(form) = form {
            form.reset(dom)?;
        }
        Ok(())
    }

    /// Treat a click on the dialog element itself (its backdrop) as cancel.
    ///
    /// Returns whether the click closed the dialog.
    ///
    /// # Errors
    ///
    /// Propagates document failures.
    pub fn handle_click<D: Document<Node = N>>(
        &mut self,
        dom: &mut D,
        target: &N,
        form: Option<&ContactForm<N>>,
    ) -> Result<bool, DomError> {
        if *target != self.dialog || !self.is_open() {
            return Ok(false);
        }
        self.close(dom, CloseReason::Cancel, form)?;
        Ok(true)
    }
}
