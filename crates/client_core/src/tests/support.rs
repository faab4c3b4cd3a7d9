use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use shared::domain::{Gender, NewStudent, Student, StudentId};
use tokio::sync::Semaphore;

use crate::{error::RemoteError, service::StudentService};

pub(crate) fn student(id: i64, name: &str, email: &str, gender: Gender) -> Student {
    Student {
        id: StudentId(id),
        name: name.to_string(),
        email: email.to_string(),
        gender,
    }
}

/// In-memory [`StudentService`] with scriptable failures and gates that hold a
/// call open until the test adds a permit.
#[derive(Default)]
pub(crate) struct FakeStudentService {
    roster: Mutex<Vec<Student>>,
    list_failure: Mutex<Option<RemoteError>>,
    create_failure: Option<RemoteError>,
    list_gate: Option<Arc<Semaphore>>,
    delete_gate: Option<Arc<Semaphore>>,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl FakeStudentService {
    pub(crate) fn with_students(students: Vec<Student>) -> Self {
        Self {
            roster: Mutex::new(students),
            ..Self::default()
        }
    }

    pub(crate) fn failing_create(mut self, err: RemoteError) -> Self {
        self.create_failure = Some(err);
        self
    }

    pub(crate) fn gated_list(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.list_gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    pub(crate) fn gated_delete(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.delete_gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    pub(crate) fn set_list_failure(&self, err: Option<RemoteError>) {
        *self.list_failure.lock().unwrap() = err;
    }

    pub(crate) fn set_roster(&self, students: Vec<Student>) {
        *self.roster.lock().unwrap() = students;
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }
}

async fn pass(gate: &Option<Arc<Semaphore>>) {
    if let Some(gate) = gate {
        gate.acquire().await.unwrap().forget();
    }
}

#[async_trait]
impl StudentService for FakeStudentService {
    async fn list(&self) -> Result<Vec<Student>, RemoteError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        pass(&self.list_gate).await;
        if let Some(err) = self.list_failure.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.roster.lock().unwrap().clone())
    }

    async fn create(&self, new_student: &NewStudent) -> Result<Student, RemoteError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.create_failure {
            return Err(err.clone());
        }
        let mut roster = self.roster.lock().unwrap();
        let next_id = roster.iter().map(|s| s.id.0).max().unwrap_or(0) + 1;
        let created = Student {
            id: StudentId(next_id),
            name: new_student.name.clone(),
            email: new_student.email.clone(),
            gender: new_student.gender,
        };
        roster.push(created.clone());
        Ok(created)
    }

    async fn delete(&self, student_id: StudentId) -> Result<(), RemoteError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        pass(&self.delete_gate).await;
        let mut roster = self.roster.lock().unwrap();
        let before = roster.len();
        roster.retain(|s| s.id != student_id);
        if roster.len() == before {
            return Err(RemoteError::new(
                format!("Student with id {student_id} does not exists"),
                404,
                "Not Found",
            ));
        }
        Ok(())
    }
}
