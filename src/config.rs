//! Page configuration.
//!
//! Every field has a default matching the stock contact page markup. A page
//! may override any subset by putting a JSON object in the `data-page-config`
//! attribute of `<body>`; missing keys keep their defaults.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::Deserialize;

use crate::dom::Document;
use crate::error::ConfigError;

/// Attribute on `<body>` holding the JSON overrides.
pub const CONFIG_ATTRIBUTE: &str = "data-page-config";

pub const DEFAULT_ENTER_DELAY_MS: u32 = 10;
pub const DEFAULT_DISPLAY_MS: u32 = 5000;
pub const DEFAULT_FADE_MS: u32 = 300;
pub const DEFAULT_MAX_VISIBLE: usize = 3;
pub const DEFAULT_MAX_PENDING: usize = 8;

pub const DEFAULT_SUCCESS_MESSAGE: &str = "Thank you! Your message has been sent. We will contact you shortly.";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageConfig {
    pub ids: ElementIds,
    pub notifications: NotificationConfig,
    /// Page names (without `.html`) the navigation highlighter recognizes.
    pub known_pages: Vec<String>,
    /// Toast shown after a successful submission.
    pub success_message: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            ids: ElementIds::default(),
            notifications: NotificationConfig::default(),
            known_pages: vec!["index".to_owned(), "about".to_owned(), "contacts".to_owned()],
            success_message: DEFAULT_SUCCESS_MESSAGE.to_owned(),
        }
    }
}

impl PageConfig {
    /// Parse overrides from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when `raw` is not a valid config object.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Read the config from the body's [`CONFIG_ATTRIBUTE`], falling back to
    /// defaults when the attribute is absent or malformed.
    pub fn load<D: Document>(dom: &D) -> Self {
        let raw = dom
            .body()
            .map(|body| dom.attribute(&body, CONFIG_ATTRIBUTE))
            .unwrap_or_default();
        let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
            return Self::default();
        };
        match Self::from_json(&raw) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{e}; using default page config");
                Self::default()
            }
        }
    }
}

/// DOM ids of the elements the page wires up.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElementIds {
    pub dialog: String,
    pub open_button: String,
    pub close_button: String,
    pub form: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date: String,
    pub topic: String,
    pub message: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            dialog: "contactDialog".to_owned(),
            open_button: "openDialog".to_owned(),
            close_button: "closeDialog".to_owned(),
            form: "contactForm".to_owned(),
            name: "name".to_owned(),
            email: "email".to_owned(),
            phone: "phone".to_owned(),
            date: "date".to_owned(),
            topic: "topic".to_owned(),
            message: "message".to_owned(),
        }
    }
}

/// Toast timings and queue limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NotificationConfig {
    /// Delay between insertion and the slide-in transition.
    pub enter_delay_ms: u32,
    /// Time from creation until the fade-out starts.
    pub display_ms: u32,
    /// Fade-out duration before the node is removed.
    pub fade_ms: u32,
    /// Maximum toasts on screen at once (at least 1).
    pub max_visible: usize,
    /// Maximum toasts waiting for a free slot.
    pub max_pending: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enter_delay_ms: DEFAULT_ENTER_DELAY_MS,
            display_ms: DEFAULT_DISPLAY_MS,
            fade_ms: DEFAULT_FADE_MS,
            max_visible: DEFAULT_MAX_VISIBLE,
            max_pending: DEFAULT_MAX_PENDING,
        }
    }
}

impl NotificationConfig {
    /// Upper bound on a toast's lifetime, creation to removal.
    #[must_use]
    pub fn lifetime_ms(&self) -> u32 {
        self.display_ms.saturating_add(self.fade_ms)
    }
}
