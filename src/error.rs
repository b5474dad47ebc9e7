//! Error types shared by the page core and the document adapters.
//!
//! Validation failures are not errors: they surface through field validity
//! and `aria-invalid`. These types cover the document itself misbehaving and
//! malformed page configuration.

/// Failure reported by a [`crate::dom::Document`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    /// The node handle does not belong to this document.
    #[error("node is not part of this document")]
    UnknownNode,
    /// No global `window` is available.
    #[error("no global window")]
    MissingWindow,
    /// The document has no `<body>` element.
    #[error("document has no body")]
    MissingBody,
    /// The underlying DOM call threw.
    #[error("dom operation failed: {0}")]
    Js(String),
}

/// Error returned by [`crate::config::PageConfig::from_json`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration blob is not valid JSON for [`crate::config::PageConfig`].
    #[error("failed to parse page config: {0}")]
    Parse(#[from] serde_json::Error),
}
