//! Client side of the student admin: the remote service, the cached view of
//! the roster and the drawer form that feeds it.

pub mod error;
pub mod form;
pub mod notification;
pub mod service;
pub mod view;

pub use error::RemoteError;
pub use form::{FormError, FormField, StudentForm};
pub use notification::{Notification, NotificationKind, Notifier, REMOTE_FAILURE_TITLE};
pub use service::{HttpStudentService, StudentService, DEFAULT_REQUEST_TIMEOUT};
pub use view::{StudentsView, SyncOutcome, ViewEvent, ViewSnapshot};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
