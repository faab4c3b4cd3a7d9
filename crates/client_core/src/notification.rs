use tokio::sync::broadcast;

use crate::{error::RemoteError, view::ViewEvent};

pub const REMOTE_FAILURE_TITLE: &str = "There was an issue";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
}

impl Notification {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn remote_failure(err: &RemoteError) -> Self {
        Self::error(REMOTE_FAILURE_TITLE, err.to_string())
    }
}

/// Publishes notifications on a view's event stream.
#[derive(Clone)]
pub struct Notifier {
    events: broadcast::Sender<ViewEvent>,
}

impl Notifier {
    pub(crate) fn new(events: broadcast::Sender<ViewEvent>) -> Self {
        Self { events }
    }

    pub fn notify(&self, notification: Notification) {
        tracing::debug!(
            kind = ?notification.kind,
            title = %notification.title,
            "notification"
        );
        // No subscribers simply means nobody is rendering toasts right now.
        let _ = self.events.send(ViewEvent::Notification(notification));
    }
}
