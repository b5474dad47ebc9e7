//! Contact form validation, phone masking hooks and local submission.
//!
//! Submission never leaves the page: a valid form is handed to a
//! [`SubmissionSink`], and the default sink only logs it.

#[cfg(test)]
#[path = "form_test.rs"]
mod form_test;

use serde::Serialize;

use crate::config::ElementIds;
use crate::dom::{Document, Validity};
use crate::error::DomError;
use crate::phone::{PHONE_FORMAT_MESSAGE, format_phone, is_complete};

pub const EMAIL_MESSAGE: &str = "Please enter a valid email address.";
pub const REQUIRED_MESSAGE: &str = "This field is required.";

const ARIA_INVALID: &str = "aria-invalid";

/// Values captured from the form at submission time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date: String,
    pub topic: String,
    pub message: String,
}

/// Receiver for valid submissions.
pub trait SubmissionSink {
    fn submit(&mut self, submission: &ContactSubmission);
}

impl<F: FnMut(&ContactSubmission)> SubmissionSink for F {
    fn submit(&mut self, submission: &ContactSubmission) {
        self(submission);
    }
}

/// Default sink: logs the captured values as JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl SubmissionSink for LogSink {
    fn submit(&mut self, submission: &ContactSubmission) {
        match serde_json::to_string(submission) {
            Ok(json) => log::info!("contact form submitted: {json}"),
            Err(e) => log::error!("contact form submitted but could not be serialized: {e}"),
        }
    }
}

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; `invalid` controls were marked.
    Rejected { invalid: usize },
    /// The form was valid and the submission went to the sink.
    Submitted(ContactSubmission),
}

/// Handles to the individual contact fields. Any of them may be absent.
#[derive(Debug, Clone)]
pub struct ContactFields<N> {
    pub name: Option<N>,
    pub email: Option<N>,
    pub phone: Option<N>,
    pub date: Option<N>,
    pub topic: Option<N>,
    pub message: Option<N>,
}

impl<N> ContactFields<N> {
    pub fn resolve<D: Document<Node = N>>(dom: &D, ids: &ElementIds) -> Self {
        Self {
            name: dom.element_by_id(&ids.name),
            email: dom.element_by_id(&ids.email),
            phone: dom.element_by_id(&ids.phone),
            date: dom.element_by_id(&ids.date),
            topic: dom.element_by_id(&ids.topic),
            message: dom.element_by_id(&ids.message),
        }
    }
}

/// Message to attach for a failed control, if its failure kind has one.
#[must_use]
pub fn failure_message(validity: Validity, control_type: &str, is_phone: bool) -> Option<&'static str> {
    if validity.type_mismatch && control_type == "email" {
        Some(EMAIL_MESSAGE)
    } else if validity.pattern_mismatch && is_phone {
        Some(PHONE_FORMAT_MESSAGE)
    } else if validity.value_missing {
        Some(REQUIRED_MESSAGE)
    } else {
        None
    }
}

/// The contact form and its fields.
#[derive(Debug, Clone)]
pub struct ContactForm<N> {
    form: N,
    fields: ContactFields<N>,
}

impl<N: Clone + PartialEq> ContactForm<N> {
    #[must_use]
    pub fn new(form: N, fields: ContactFields<N>) -> Self {
        Self { form, fields }
    }

    #[must_use]
    pub fn form(&self) -> &N {
        &self.form
    }

    #[must_use]
    pub fn fields(&self) -> &ContactFields<N> {
        &self.fields
    }

    /// Validate and, if valid, hand the values to `sink` exactly once.
    ///
    /// # Errors
    ///
    /// Propagates document failures; validation failures are an `Ok` outcome.
    pub fn on_submit<D: Document<Node = N>>(
        &self,
        dom: &mut D,
        sink: &mut dyn SubmissionSink,
    ) -> Result<SubmitOutcome, DomError> {
        self.clear_errors(dom)?;

        if !dom.check_validity(&self.form) {
            dom.report_validity(&self.form)?;
            let mut invalid = 0;
            for control in dom.form_controls(&self.form) {
                if !dom.will_validate(&control) {
                    continue;
                }
                let validity = dom.validity(&control);
                if validity.valid() {
                    continue;
                }
                invalid += 1;
                dom.set_attribute(&control, ARIA_INVALID, "true")?;
                let is_phone = self.fields.phone.as_ref() == Some(&control);
                if let Some(message) = failure_message(validity, &dom.control_type(&control), is_phone) {
                    dom.set_custom_validity(&control, message)?;
                }
            }
            log::debug!("contact form has {invalid} invalid field(s)");
            return Ok(SubmitOutcome::Rejected { invalid });
        }

        let submission = self.capture(dom);
        sink.submit(&submission);
        Ok(SubmitOutcome::Submitted(submission))
    }

    /// Re-mask the phone field after an `input` event.
    ///
    /// Also drops a stale phone error so the next blur re-checks the new value.
    ///
    /// # Errors
    ///
    /// Propagates document failures.
    pub fn on_phone_input<D: Document<Node = N>>(&self, dom: &mut D) -> Result<(), DomError> {
        let Some(phone) = &self.fields.phone else {
            return Ok(());
        };
        let formatted = format_phone(&dom.value(phone));
        dom.set_value(phone, &formatted)?;
        dom.set_custom_validity(phone, "")?;
        dom.remove_attribute(phone, ARIA_INVALID)
    }

    /// Flag a non-empty, malformed phone when the field loses focus.
    ///
    /// A number short of 11 digits is malformed even if the field carries no
    /// `pattern` attribute.
    ///
    /// # Errors
    ///
    /// Propagates document failures.
    pub fn on_phone_blur<D: Document<Node = N>>(&self, dom: &mut D) -> Result<(), DomError> {
        let Some(phone) = &self.fields.phone else {
            return Ok(());
        };
        let value = dom.value(phone);
        if value.is_empty() || (is_complete(&value) && dom.validity(phone).valid()) {
            return Ok(());
        }
        dom.set_custom_validity(phone, PHONE_FORMAT_MESSAGE)?;
        dom.set_attribute(phone, ARIA_INVALID, "true")?;
        dom.report_validity(phone)?;
        Ok(())
    }

    /// Clear every custom message and `aria-invalid` marker.
    ///
    /// # Errors
    ///
    /// Propagates document failures.
    pub fn clear_errors<D: Document<Node = N>>(&self, dom: &mut D) -> Result<(), DomError> {
        for control in dom.form_controls(&self.form) {
            dom.set_custom_validity(&control, "")?;
            dom.remove_attribute(&control, ARIA_INVALID)?;
        }
        Ok(())
    }

    /// Restore default values and clear validation state.
    ///
    /// # Errors
    ///
    /// Propagates document failures.
    pub fn reset<D: Document<Node = N>>(&self, dom: &mut D) -> Result<(), DomError> {
        dom.reset_form(&self.form)?;
        self.clear_errors(dom)
    }

    fn capture<D: Document<Node = N>>(&self, dom: &D) -> ContactSubmission {
        let read = |field: &Option<N>| field.as_ref().map(|node| dom.value(node)).unwrap_or_default();
        ContactSubmission {
            name: read(&self.fields.name),
            email: read(&self.fields.email),
            phone: read(&self.fields.phone),
            date: read(&self.fields.date),
            topic: read(&self.fields.topic),
            message: read(&self.fields.message),
        }
    }
}
