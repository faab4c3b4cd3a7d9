//! Client-side cache of the student roster.
//!
//! [`StudentsView`] owns the last successfully fetched collection and the
//! loading indicator. Presentation code reads it through [`StudentsView::snapshot`]
//! or the [`ViewEvent`] stream and mutates it only through [`StudentsView::refresh`]
//! and [`StudentsView::remove`]. Creation goes through
//! [`StudentForm`](crate::form::StudentForm), which takes `refresh` as its
//! completion callback.

use std::{
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use shared::domain::{Student, StudentId};
use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    notification::{Notification, Notifier},
    service::StudentService,
};

const VIEW_EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// The cached collection was replaced wholesale by a successful fetch.
    StudentsReplaced(Vec<Student>),
    LoadingChanged(bool),
    Notification(Notification),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewSnapshot {
    pub students: Vec<Student>,
    pub loading: bool,
}

/// How a view operation settled. Purely informational: failures have already
/// been surfaced as notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Applied,
    Failed,
    /// The view was torn down before the operation settled; nothing was changed.
    Cancelled,
}

#[derive(Default)]
struct ViewState {
    students: Vec<Student>,
    fetches_in_flight: usize,
    /// The most recently settled fetch succeeded.
    synced: bool,
    torn_down: bool,
}

struct ViewInner {
    service: Arc<dyn StudentService>,
    state: Mutex<ViewState>,
    events: broadcast::Sender<ViewEvent>,
    lifecycle: watch::Sender<bool>,
}

impl ViewInner {
    fn state(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes the state guard so that events leave in the same order as the
    /// state changes they describe.
    fn emit(&self, _state: &MutexGuard<'_, ViewState>, event: ViewEvent) {
        let _ = self.events.send(event);
    }
}

/// Cheap to clone; all clones share one cache.
#[derive(Clone)]
pub struct StudentsView {
    inner: Arc<ViewInner>,
}

impl StudentsView {
    pub fn new(service: Arc<dyn StudentService>) -> Self {
        let (events, _) = broadcast::channel(VIEW_EVENT_CAPACITY);
        let (lifecycle, _) = watch::channel(false);
        Self {
            inner: Arc::new(ViewInner {
                service,
                state: Mutex::new(ViewState::default()),
                events,
                lifecycle,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.inner.events.subscribe()
    }

    pub fn notifier(&self) -> Notifier {
        Notifier::new(self.inner.events.clone())
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let state = self.inner.state();
        ViewSnapshot {
            students: state.students.clone(),
            loading: state.fetches_in_flight > 0,
        }
    }

    pub fn students(&self) -> Vec<Student> {
        self.inner.state().students.clone()
    }

    pub fn loading(&self) -> bool {
        self.inner.state().fetches_in_flight > 0
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.state().torn_down
    }

    /// False until a fetch lands, and again whenever the latest fetch failed.
    /// A mutation can succeed while its follow-up refresh does not; callers
    /// check this before presenting the cache as current.
    pub fn is_synced(&self) -> bool {
        self.inner.state().synced
    }

    /// Starts the initial fetch in the background. Must be called from within a
    /// tokio runtime.
    pub fn mount(&self) -> JoinHandle<SyncOutcome> {
        info!("mounting students view");
        self.spawn_refresh()
    }

    /// Cancels every pending operation and discards the cache. A torn down view
    /// never mutates again; mount a new one instead.
    pub fn teardown(&self) {
        {
            let mut state = self.inner.state();
            if state.torn_down {
                return;
            }
            state.torn_down = true;
            state.synced = false;
            state.students.clear();
        }
        self.inner.lifecycle.send_replace(true);
        info!("students view torn down");
    }

    pub fn spawn_refresh(&self) -> JoinHandle<SyncOutcome> {
        let view = self.clone();
        tokio::spawn(async move { view.refresh().await })
    }

    pub fn spawn_remove(&self, student_id: StudentId) -> JoinHandle<SyncOutcome> {
        let view = self.clone();
        tokio::spawn(async move { view.remove(student_id).await })
    }

    /// Replaces the cache with the service's current roster. On failure the
    /// cache is left as it was and an error notification is emitted. The
    /// loading flag is reset however the fetch settles.
    pub async fn refresh(&self) -> SyncOutcome {
        if self.is_torn_down() {
            return SyncOutcome::Cancelled;
        }

        let _fetch = FetchGuard::begin(&self.inner);
        debug!("fetching students");

        match self.unless_torn_down(self.inner.service.list()).await {
            None => SyncOutcome::Cancelled,
            Some(Ok(students)) => {
                if self.replace_students(students) {
                    SyncOutcome::Applied
                } else {
                    SyncOutcome::Cancelled
                }
            }
            Some(Err(err)) => {
                warn!(%err, "failed to fetch students");
                self.inner.state().synced = false;
                self.notify(Notification::remote_failure(&err));
                SyncOutcome::Failed
            }
        }
    }

    /// Deletes on the server, then resynchronises with exactly one refresh.
    /// The cached row stays visible until that refresh lands.
    pub async fn remove(&self, student_id: StudentId) -> SyncOutcome {
        if self.is_torn_down() {
            return SyncOutcome::Cancelled;
        }

        debug!(student_id = student_id.0, "deleting student");
        match self.unless_torn_down(self.inner.service.delete(student_id)).await {
            None => SyncOutcome::Cancelled,
            Some(Ok(())) => {
                self.notify(Notification::success(
                    "Student deleted",
                    format!("Student with {student_id} was deleted"),
                ));
                self.refresh().await;
                SyncOutcome::Applied
            }
            Some(Err(err)) => {
                warn!(student_id = student_id.0, %err, "failed to delete student");
                self.notify(Notification::remote_failure(&err));
                SyncOutcome::Failed
            }
        }
    }

    fn replace_students(&self, students: Vec<Student>) -> bool {
        let mut state = self.inner.state();
        if state.torn_down {
            return false;
        }
        debug!(count = students.len(), "students replaced");
        state.students = students.clone();
        state.synced = true;
        self.inner.emit(&state, ViewEvent::StudentsReplaced(students));
        true
    }

    fn notify(&self, notification: Notification) {
        if self.is_torn_down() {
            return;
        }
        self.notifier().notify(notification);
    }

    async fn unless_torn_down<F: Future>(&self, operation: F) -> Option<F::Output> {
        let mut lifecycle = self.inner.lifecycle.subscribe();
        tokio::select! {
            output = operation => Some(output),
            _ = lifecycle.wait_for(|torn_down| *torn_down) => None,
        }
    }
}

/// Counts an in-flight fetch for the lifetime of the guard. Loading is true
/// while any fetch is in flight.
struct FetchGuard {
    inner: Arc<ViewInner>,
}

impl FetchGuard {
    fn begin(inner: &Arc<ViewInner>) -> Self {
        {
            let mut state = inner.state();
            state.fetches_in_flight += 1;
            if state.fetches_in_flight == 1 && !state.torn_down {
                inner.emit(&state, ViewEvent::LoadingChanged(true));
            }
        }
        Self {
            inner: Arc::clone(inner),
        }
    }
}

impl Drop for FetchGuard {
    fn drop(&mut self) {
        let mut state = self.inner.state();
        state.fetches_in_flight = state.fetches_in_flight.saturating_sub(1);
        if state.fetches_in_flight == 0 && !state.torn_down {
            self.inner.emit(&state, ViewEvent::LoadingChanged(false));
        }
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
