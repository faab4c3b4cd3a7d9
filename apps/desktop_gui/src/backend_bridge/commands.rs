//! Backend commands queued from UI to backend worker.

use client_core::StudentForm;
use shared::domain::StudentId;

#[derive(Debug)]
pub enum BackendCommand {
    Refresh,
    RemoveStudent { student_id: StudentId },
    CreateStudent { form: StudentForm },
    Teardown,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Refresh => "refresh",
            BackendCommand::RemoveStudent { .. } => "remove_student",
            BackendCommand::CreateStudent { .. } => "create_student",
            BackendCommand::Teardown => "teardown",
        }
    }
}
