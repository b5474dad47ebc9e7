//! Document capability interface.
//!
//! Every component in this crate talks to the page through [`Document`]
//! instead of a global document singleton. The browser build implements it
//! over web-sys (`crate::web`), tests implement it with
//! [`crate::headless::HeadlessDocument`].
//!
//! Node handles are opaque and cheap to clone. Holding one does not keep the
//! element in the tree; callers check [`Document::is_connected`] before acting
//! on a handle stored across events.

use crate::error::DomError;

/// Constraint-validation flags for a single form control.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Validity {
    /// `required` control with an empty value.
    pub value_missing: bool,
    /// Value does not match the control's `type` (e.g. a malformed email).
    pub type_mismatch: bool,
    /// Value does not match the control's `pattern` attribute.
    pub pattern_mismatch: bool,
    /// A custom validity message is set.
    pub custom_error: bool,
    /// Any other failed constraint (length, range, step, unparsable input).
    pub other: bool,
}

impl Validity {
    /// Whether no constraint is violated.
    #[must_use]
    pub fn valid(self) -> bool {
        !(self.value_missing || self.type_mismatch || self.pattern_mismatch || self.custom_error || self.other)
    }
}

/// DOM operations required by the page components.
pub trait Document {
    /// Handle to an element in this document.
    type Node: Clone + PartialEq + std::fmt::Debug;

    // --- Lookup ---

    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// The `<body>` element.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::MissingBody`] when the document has no body.
    fn body(&self) -> Result<Self::Node, DomError>;

    /// The element that currently has focus, if any.
    fn active_element(&self) -> Option<Self::Node>;

    /// Whether the node is still attached to the document tree.
    fn is_connected(&self, node: &Self::Node) -> bool;

    /// First `input, select, textarea, button` descendant of `container`.
    fn first_focusable_within(&self, container: &Self::Node) -> Option<Self::Node>;

    /// Links inside `<nav>` elements, in document order.
    fn navigation_links(&self) -> Vec<Self::Node>;

    /// Path component of the current location (e.g. `/site/about.html`).
    fn location_path(&self) -> String;

    // --- Element state ---

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    /// # Errors
    ///
    /// Returns an error if the node is unknown or the DOM rejects the attribute.
    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str) -> Result<(), DomError>;

    /// # Errors
    ///
    /// Returns an error if the node is unknown.
    fn remove_attribute(&mut self, node: &Self::Node, name: &str) -> Result<(), DomError>;

    /// Add (`enabled == true`) or remove a class token.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unknown or the token is invalid.
    fn toggle_class(&mut self, node: &Self::Node, class: &str, enabled: bool) -> Result<(), DomError>;

    /// # Errors
    ///
    /// Returns an error if the node is unknown or has no inline style.
    fn set_style(&mut self, node: &Self::Node, property: &str, value: &str) -> Result<(), DomError>;

    /// # Errors
    ///
    /// Returns an error if the node is unknown.
    fn set_text(&mut self, node: &Self::Node, text: &str) -> Result<(), DomError>;

    /// # Errors
    ///
    /// Returns an error if the node is unknown or cannot take focus.
    fn focus(&mut self, node: &Self::Node) -> Result<(), DomError>;

    // --- Tree ---

    /// # Errors
    ///
    /// Returns an error if the tag name is rejected.
    fn create_element(&mut self, tag: &str) -> Result<Self::Node, DomError>;

    /// # Errors
    ///
    /// Returns an error if either node is unknown or the insertion is rejected.
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), DomError>;

    /// Detach `node` from its parent.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unknown.
    fn remove(&mut self, node: &Self::Node) -> Result<(), DomError>;

    // --- Dialog ---

    /// Show a `<dialog>` as a modal.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not a connected dialog.
    fn show_modal(&mut self, dialog: &Self::Node) -> Result<(), DomError>;

    /// Close a `<dialog>`, recording `return_value`. Closing a closed dialog is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not a dialog.
    fn close_dialog(&mut self, dialog: &Self::Node, return_value: &str) -> Result<(), DomError>;

    // --- Forms ---

    /// Listed form controls of `form`, in document order.
    fn form_controls(&self, form: &Self::Node) -> Vec<Self::Node>;

    /// Current value of a control (empty for non-controls).
    fn value(&self, node: &Self::Node) -> String;

    /// # Errors
    ///
    /// Returns an error if the node is not a form control.
    fn set_value(&mut self, node: &Self::Node, value: &str) -> Result<(), DomError>;

    /// Control type as the DOM reports it (`"email"`, `"text"`, `"textarea"`, `"select-one"`, ...).
    fn control_type(&self, node: &Self::Node) -> String;

    /// Whether the control is a candidate for constraint validation.
    fn will_validate(&self, node: &Self::Node) -> bool;

    fn validity(&self, node: &Self::Node) -> Validity;

    /// Set (or clear, with an empty message) the custom validity message.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is not a form control.
    fn set_custom_validity(&mut self, node: &Self::Node, message: &str) -> Result<(), DomError>;

    /// Run constraint validation on every control of `form` without reporting.
    fn check_validity(&self, form: &Self::Node) -> bool;

    /// Run constraint validation and show the host's validity UI.
    /// Works on a form or a single control.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is neither a form nor a control.
    fn report_validity(&mut self, node: &Self::Node) -> Result<bool, DomError>;

    /// Restore every control of `form` to its default value.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is not a form.
    fn reset_form(&mut self, form: &Self::Node) -> Result<(), DomError>;
}
