use std::sync::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Destructive,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Info,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Destructive,
        }
    }
}

/// Fire-and-forget channel for user-visible notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Logs notices and keeps them until the caller drains them into a response.
#[derive(Default)]
pub struct NoticeBuffer {
    notices: Mutex<Vec<Notification>>,
}

impl NoticeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Notification> {
        match self.notices.lock() {
            Ok(mut notices) => notices.drain(..).collect(),
            Err(poisoned) => poisoned.into_inner().drain(..).collect(),
        }
    }
}

impl Notifier for NoticeBuffer {
    fn notify(&self, notification: Notification) {
        log_notification(&notification);
        match self.notices.lock() {
            Ok(mut notices) => notices.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}

fn log_notification(notification: &Notification) {
    match notification.severity {
        Severity::Info => info!("Notice: {} - {}", notification.title, notification.description),
        Severity::Destructive => warn!("Notice: {} - {}", notification.title, notification.description),
    }
}
