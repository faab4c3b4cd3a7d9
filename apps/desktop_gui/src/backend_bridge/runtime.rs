//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{HttpStudentService, StudentService, StudentsView, ViewEvent};
use crossbeam_channel::{Receiver, Sender};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, error, info, warn};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(server_url: String, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(run_backend(server_url, cmd_rx, ui_tx));
    });
}

async fn run_backend(server_url: String, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    let service: Arc<dyn StudentService> = match HttpStudentService::new(&server_url) {
        Ok(service) => Arc::new(service),
        Err(err) => {
            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                UiErrorContext::BackendStartup,
                format!("backend worker startup failure: {err:#}"),
            )));
            error!(%server_url, "failed to build student service client: {err:#}");
            return;
        }
    };

    let view = StudentsView::new(Arc::clone(&service));
    let forward_task = tokio::spawn(forward_view_events(
        view.clone(),
        view.subscribe(),
        ui_tx.clone(),
    ));
    view.mount();
    info!(%server_url, "backend worker ready");
    let _ = ui_tx.try_send(UiEvent::Info(format!("Connected to {server_url}")));

    while let Ok(cmd) = cmd_rx.recv() {
        debug!(command = cmd.name(), "backend received command");
        match cmd {
            BackendCommand::Refresh => {
                view.spawn_refresh();
            }
            BackendCommand::RemoveStudent { student_id } => {
                view.spawn_remove(student_id);
            }
            BackendCommand::CreateStudent { mut form } => {
                let service = Arc::clone(&service);
                let view = view.clone();
                let ui_tx = ui_tx.clone();
                tokio::spawn(async move {
                    let notifier = view.notifier();
                    let event = match form.submit(&*service, &notifier, || view.refresh()).await
                    {
                        Ok(student) => UiEvent::StudentCreated(student),
                        Err(err) => UiEvent::CreateFailed(err),
                    };
                    let _ = ui_tx.try_send(event);
                });
            }
            BackendCommand::Teardown => break,
        }
    }

    view.teardown();
    forward_task.abort();
    info!("backend worker stopped");
}

async fn forward_view_events(
    view: StudentsView,
    mut events: broadcast::Receiver<ViewEvent>,
    ui_tx: Sender<UiEvent>,
) {
    loop {
        match events.recv().await {
            Ok(event) => {
                if ui_tx.try_send(event.into()).is_err() {
                    warn!("ui event queue unavailable; dropping view event");
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "ui lagged behind view events; resyncing from snapshot");
                let snapshot = view.snapshot();
                let _ = ui_tx.try_send(UiEvent::StudentsReplaced(snapshot.students));
                let _ = ui_tx.try_send(UiEvent::LoadingChanged(snapshot.loading));
            }
            Err(RecvError::Closed) => break,
        }
    }
}
