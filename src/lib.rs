//! # contact-page
//!
//! Rust + WASM enhancement layer for a small contact website: modal contact
//! dialog, contact form validation with `+7` phone masking, toast
//! notifications and active navigation highlighting.
//!
//! All decision logic runs against the [`dom::Document`] capability trait, so
//! it can be exercised headlessly with [`headless::HeadlessDocument`]. The
//! `hydrate` feature adds the web-sys implementation and the wasm entry point
//! in [`web`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`app`] | Bootstrapper, [`app::PageEvent`] dispatch, host entry points |
//! | [`dialog`] | Modal open/close state machine and focus restoration |
//! | [`form`] | Constraint validation, error messages, local submission |
//! | [`phone`] | `+7 (XXX) XXX-XX-XX` mask |
//! | [`notify`] | Toasts with a bounded display queue |
//! | [`nav`] | Active navigation link |
//! | [`dom`] | Document capability trait |
//! | [`headless`] | In-memory document |
//! | [`config`] | Element ids, timings and page names |
//! | [`error`] | Error types |

pub mod app;
pub mod config;
pub mod dialog;
pub mod dom;
pub mod error;
pub mod form;
pub mod headless;
pub mod nav;
pub mod notify;
pub mod phone;

#[cfg(feature = "hydrate")]
pub mod web;

#[cfg(test)]
#[path = "fixture_test.rs"]
mod fixture;
