//! Transient toast notifications.
//!
//! Each toast is a fixed-position `div` in the top-right corner that slides
//! in, stays for [`NotificationConfig::display_ms`], fades out and is removed.
//! The presenter never touches timers itself: every step returns
//! [`Deferred`] tasks that the host runs after their delay.
//!
//! At most `max_visible` toasts are on screen. Further toasts wait in a
//! bounded FIFO and are shown as slots free up.

#[cfg(test)]
#[path = "notify_test.rs"]
mod notify_test;

use std::collections::VecDeque;

use crate::config::NotificationConfig;
use crate::dom::Document;
use crate::error::DomError;

const HIDDEN_TRANSFORM: &str = "translateX(100%)";
const SHOWN_TRANSFORM: &str = "translateX(0)";

/// Base inline style shared by every toast.
const BASE_STYLE: &[(&str, &str)] = &[
    ("position", "fixed"),
    ("top", "20px"),
    ("right", "20px"),
    ("padding", "1rem"),
    ("border-radius", "8px"),
    ("color", "white"),
    ("z-index", "10000"),
    ("max-width", "300px"),
    ("box-shadow", "0 4px 12px rgba(0,0,0,0.15)"),
    ("transition", "opacity 0.3s ease, transform 0.3s ease"),
    ("opacity", "0"),
    ("transform", HIDDEN_TRANSFORM),
];

/// Visual category of a toast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Error,
}

impl NotificationKind {
    /// Parse the kind names accepted by `showNotification`; anything else is `Info`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "success" => Self::Success,
            "error" => Self::Error,
            _ => Self::Info,
        }
    }

    /// Background color (teal, green, red).
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Info => "#17a2b8",
            Self::Success => "#28a745",
            Self::Error => "#dc3545",
        }
    }

    fn role(self) -> &'static str {
        match self {
            Self::Error => "alert",
            Self::Info | Self::Success => "status",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn new(message: impl Into<String>, kind: NotificationKind) -> Self {
        Self { message: message.into(), kind }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastId(pub u64);

/// Timer-driven step of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    NotificationEnter(ToastId),
    NotificationFadeOut(ToastId),
    NotificationRemove(ToastId),
}

/// A task the host must run after `delay_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deferred {
    pub delay_ms: u32,
    pub task: Task,
}

impl Deferred {
    #[must_use]
    pub fn new(delay_ms: u32, task: Task) -> Self {
        Self { delay_ms, task }
    }
}

#[derive(Debug, Clone)]
struct Toast<N> {
    id: ToastId,
    node: N,
}

#[derive(Debug, Clone)]
pub struct NotificationPresenter<N> {
    config: NotificationConfig,
    next_id: u64,
    visible: Vec<Toast<N>>,
    pending: VecDeque<Notification>,
}

impl<N: Clone + PartialEq> NotificationPresenter<N> {
    #[must_use]
    pub fn new(config: NotificationConfig) -> Self {
        Self { config, next_id: 0, visible: Vec::new(), pending: VecDeque::new() }
    }

    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Node of a toast that is still tracked as visible.
    #[must_use]
    pub fn node(&self, id: ToastId) -> Option<&N> {
        self.visible.iter().find(|t| t.id == id).map(|t| &t.node)
    }

    fn max_visible(&self) -> usize {
        self.config.max_visible.max(1)
    }

    /// Show a toast now, or queue it when the screen is full.
    ///
    /// # Errors
    ///
    /// Propagates document failures while building the toast.
    pub fn show<D: Document<Node = N>>(
        &mut self,
        dom: &mut D,
        notification: Notification,
    ) -> Result<Vec<Deferred>, DomError> {
        if self.visible.len() < self.max_visible() {
            return self.present(dom, notification);
        }
        if self.pending.len() >= self.config.max_pending {
            match self.pending.pop_front() {
                Some(dropped) => log::warn!("notification queue full; dropping {:?}", dropped.message),
                None => {
                    log::warn!("notification queue disabled; dropping {:?}", notification.message);
                    return Ok(Vec::new());
                }
            }
        }
        self.pending.push_back(notification);
        Ok(Vec::new())
    }

    /// Advance a toast's lifecycle.
    ///
    /// # Errors
    ///
    /// Propagates document failures.
    pub fn run<D: Document<Node = N>>(&mut self, dom: &mut D, task: Task) -> Result<Vec<Deferred>, DomError> {
        match task {
            Task::NotificationEnter(id) => {
                if let Some(node) = self.live_node(dom, id) {
                    dom.set_style(&node, "opacity", "1")?;
                    dom.set_style(&node, "transform", SHOWN_TRANSFORM)?;
                }
                Ok(Vec::new())
            }
            Task::NotificationFadeOut(id) => {
                if let Some(node) = self.live_node(dom, id) {
                    dom.set_style(&node, "opacity", "0")?;
                    dom.set_style(&node, "transform", HIDDEN_TRANSFORM)?;
                }
                Ok(vec![Deferred::new(self.config.fade_ms, Task::NotificationRemove(id))])
            }
            Task::NotificationRemove(id) => self.remove(dom, id),
        }
    }

    fn live_node<D: Document<Node = N>>(&self, dom: &D, id: ToastId) -> Option<N> {
        self.node(id).filter(|node| dom.is_connected(node)).cloned()
    }

    fn present<D: Document<Node = N>>(
        &mut self,
        dom: &mut D,
        notification: Notification,
    ) -> Result<Vec<Deferred>, DomError> {
        let node = dom.create_element("div")?;
        for (property, value) in BASE_STYLE {
            dom.set_style(&node, property, value)?;
        }
        dom.set_style(&node, "background-color", notification.kind.color())?;
        dom.set_attribute(&node, "role", notification.kind.role())?;
        dom.set_attribute(&node, "aria-live", "polite")?;
        dom.set_text(&node, &notification.message)?;
        let body = dom.body()?;
        dom.append_child(&body, &node)?;

        self.next_id += 1;
        let id = ToastId(self.next_id);
        self.visible.push(Toast { id, node });

        Ok(vec![
            Deferred::new(self.config.enter_delay_ms, Task::NotificationEnter(id)),
            Deferred::new(self.config.display_ms, Task::NotificationFadeOut(id)),
        ])
    }

    fn remove<D: Document<Node = N>>(&mut self, dom: &mut D, id: ToastId) -> Result<Vec<Deferred>, DomError> {
        let Some(index) = self.visible.iter().position(|t| t.id == id) else {
            return Ok(Vec::new());
        };
        let toast = self.visible.remove(index);
        if dom.is_connected(&toast.node) {
            dom.remove(&toast.node)?;
        }

        let mut deferred = Vec::new();
        while self.visible.len() < self.max_visible() {
            let Some(next) = self.pending.pop_front() else {
                break;
            };
            log::debug!("promoting queued notification");
            deferred.extend(self.present(dom, next)?);
        }
        Ok(deferred)
    }
}
