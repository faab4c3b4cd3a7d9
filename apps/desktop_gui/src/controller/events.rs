//! UI/backend events and error modeling for desktop GUI controller.

use client_core::{FormError, Notification, ViewEvent};
use shared::domain::Student;

#[derive(Debug)]
pub enum UiEvent {
    Info(String),
    StudentsReplaced(Vec<Student>),
    LoadingChanged(bool),
    Notification(Notification),
    StudentCreated(Student),
    CreateFailed(FormError),
    Error(UiError),
}

impl From<ViewEvent> for UiEvent {
    fn from(event: ViewEvent) -> Self {
        match event {
            ViewEvent::StudentsReplaced(students) => UiEvent::StudentsReplaced(students),
            ViewEvent::LoadingChanged(loading) => UiEvent::LoadingChanged(loading),
            ViewEvent::Notification(notification) => UiEvent::Notification(notification),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Startup,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    CommandQueue,
}

/// Failures of the GUI plumbing itself. Service failures never land here; they
/// arrive as notifications.
#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if context == UiErrorContext::BackendStartup
            || message_lower.contains("startup failure")
        {
            UiErrorCategory::Startup
        } else if message_lower.contains("disconnect")
            || message_lower.contains("queue")
            || message_lower.contains("connection")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
