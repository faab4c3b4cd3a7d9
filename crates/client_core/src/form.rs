use std::{fmt, future::Future};

use shared::domain::{Gender, NewStudent, Student};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    error::RemoteError,
    notification::{Notification, Notifier},
    service::StudentService,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Email,
    Gender,
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Gender => "gender",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("please enter student {0}")]
    Missing(FormField),
    #[error("student {0} is not valid")]
    Invalid(FormField),
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl FormError {
    /// The field a validation error belongs to, if any.
    pub fn field(&self) -> Option<FormField> {
        match self {
            Self::Missing(field) | Self::Invalid(field) => Some(*field),
            Self::Remote(_) => None,
        }
    }
}

/// Draft state of the "add student" drawer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentForm {
    pub name: String,
    pub email: String,
    pub gender: Option<Gender>,
}

impl StudentForm {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn validate(&self) -> Result<NewStudent, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::Missing(FormField::Name));
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(FormError::Missing(FormField::Email));
        }
        if !email.contains('@') {
            return Err(FormError::Invalid(FormField::Email));
        }
        let gender = self.gender.ok_or(FormError::Missing(FormField::Gender))?;

        Ok(NewStudent {
            name: name.to_owned(),
            email: email.to_owned(),
            gender,
        })
    }

    /// Sends the draft to the service. On success the draft is cleared and
    /// `on_created` runs before returning, so callers pass the view's refresh
    /// here. A rejected draft is kept so the user can correct it.
    pub async fn submit<F, Fut>(
        &mut self,
        service: &dyn StudentService,
        notifier: &Notifier,
        on_created: F,
    ) -> Result<Student, FormError>
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        let new_student = self.validate()?;

        match service.create(&new_student).await {
            Ok(student) => {
                info!(student_id = student.id.0, "student added");
                notifier.notify(Notification::success(
                    "Student successfully added",
                    format!("{} was added to the system", student.name),
                ));
                self.clear();
                on_created().await;
                Ok(student)
            }
            Err(err) => {
                warn!(%err, "failed to add student");
                notifier.notify(Notification::remote_failure(&err));
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
