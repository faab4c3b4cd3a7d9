use super::*;
use crate::controller::events::UiErrorContext;
use client_core::{FormField, RemoteError};
use crossbeam_channel::bounded;
use shared::domain::StudentId;

fn app() -> (StudentAdminApp, Receiver<BackendCommand>, Sender<UiEvent>) {
    let (cmd_tx, cmd_rx) = bounded(8);
    let (ui_tx, ui_rx) = bounded(8);
    let app = StudentAdminApp::new(cmd_tx, ui_rx, StartupConfig::default());
    (app, cmd_rx, ui_tx)
}

fn ann() -> Student {
    Student {
        id: StudentId(1),
        name: "Ann Lee".to_string(),
        email: "ann@x.io".to_string(),
        gender: Gender::Female,
    }
}

#[test]
fn avatar_uses_placeholder_for_blank_names() {
    assert_eq!(avatar_initials(""), None);
    assert_eq!(avatar_initials("   "), None);
}

#[test]
fn avatar_uses_first_letter_of_single_word() {
    assert_eq!(avatar_initials("Tom").as_deref(), Some("T"));
}

#[test]
fn avatar_uses_first_and_last_characters_of_longer_names() {
    assert_eq!(avatar_initials("Ann Lee").as_deref(), Some("Ae"));
    assert_eq!(avatar_initials(" Bo Li ").as_deref(), Some("Bi"));
}

#[test]
fn toasts_expire_after_ttl() {
    let mut toasts = ToastStack::default();
    let start = Instant::now();
    toasts.push(Notification::success("a", "first"), start);
    toasts.push(
        Notification::error("b", "second"),
        start + Duration::from_secs(2),
    );

    toasts.prune(start + TOAST_TTL);

    let remaining: Vec<_> = toasts.notifications().map(|n| n.title.as_str()).collect();
    assert_eq!(remaining, vec!["b"]);

    toasts.prune(start + TOAST_TTL + Duration::from_secs(2));
    assert!(toasts.is_empty());
}

#[test]
fn toast_stack_keeps_most_recent() {
    let mut toasts = ToastStack::default();
    let now = Instant::now();
    for i in 0..MAX_VISIBLE_TOASTS + 2 {
        toasts.push(Notification::success(i.to_string(), ""), now);
    }

    let titles: Vec<_> = toasts.notifications().map(|n| n.title.clone()).collect();
    assert_eq!(titles.len(), MAX_VISIBLE_TOASTS);
    assert_eq!(titles.first().map(String::as_str), Some("2"));
}

#[test]
fn view_events_update_roster_and_loading() {
    let (mut app, _cmd_rx, ui_tx) = app();
    ui_tx.send(UiEvent::LoadingChanged(true)).unwrap();
    ui_tx.send(UiEvent::StudentsReplaced(vec![ann()])).unwrap();
    ui_tx
        .send(UiEvent::Notification(Notification::success("ok", "done")))
        .unwrap();

    app.process_ui_events();

    assert!(app.loading);
    assert_eq!(app.students, vec![ann()]);
    assert!(!app.toasts.is_empty());

    ui_tx.send(UiEvent::LoadingChanged(false)).unwrap();
    ui_tx.send(UiEvent::StudentsReplaced(Vec::new())).unwrap();
    app.process_ui_events();
    assert!(!app.loading);
    assert!(app.students.is_empty());
}

#[test]
fn invalid_draft_is_not_sent_to_backend() {
    let (mut app, cmd_rx, _ui_tx) = app();
    app.drawer.open = true;
    app.drawer.draft.name = "Ann".to_string();

    app.submit_drawer();

    assert!(cmd_rx.try_recv().is_err());
    assert_eq!(app.drawer.error, Some(FormError::Missing(FormField::Email)));
    assert!(!app.drawer.submitting);
}

#[test]
fn created_student_closes_and_clears_drawer() {
    let (mut app, cmd_rx, ui_tx) = app();
    app.drawer.open = true;
    app.drawer.draft = StudentForm {
        name: "Ann Lee".to_string(),
        email: "ann@x.io".to_string(),
        gender: Some(Gender::Female),
    };

    app.submit_drawer();
    assert!(app.drawer.submitting);
    assert!(matches!(
        cmd_rx.try_recv(),
        Ok(BackendCommand::CreateStudent { form }) if form.name == "Ann Lee"
    ));

    ui_tx.send(UiEvent::StudentCreated(ann())).unwrap();
    app.process_ui_events();

    assert!(!app.drawer.open);
    assert!(!app.drawer.submitting);
    assert_eq!(app.drawer.draft, StudentForm::default());
}

#[test]
fn rejected_create_keeps_drawer_draft() {
    let (mut app, _cmd_rx, ui_tx) = app();
    app.drawer.open = true;
    app.drawer.submitting = true;
    app.drawer.draft.name = "Ann Lee".to_string();

    ui_tx
        .send(UiEvent::CreateFailed(FormError::Remote(RemoteError::new(
            "Email ann@x.io taken",
            400,
            "Bad Request",
        ))))
        .unwrap();
    app.process_ui_events();

    assert!(app.drawer.open);
    assert!(!app.drawer.submitting);
    assert_eq!(app.drawer.draft.name, "Ann Lee");
    assert_eq!(app.drawer.error, None);
}

#[test]
fn confirmed_delete_queues_remove() {
    let (mut app, cmd_rx, _ui_tx) = app();
    app.pending_delete = Some(ann());

    app.confirm_delete();

    assert!(app.pending_delete.is_none());
    assert!(matches!(
        cmd_rx.try_recv(),
        Ok(BackendCommand::RemoveStudent { student_id }) if student_id == StudentId(1)
    ));
}

#[test]
fn backend_is_released_once() {
    let (mut app, cmd_rx, _ui_tx) = app();

    app.release_backend();
    app.release_backend();

    assert!(matches!(cmd_rx.try_recv(), Ok(BackendCommand::Teardown)));
    assert!(cmd_rx.try_recv().is_err());
}

#[test]
fn backend_errors_raise_status_banner() {
    let (mut app, _cmd_rx, ui_tx) = app();
    ui_tx
        .send(UiEvent::Error(UiError::from_message(
            UiErrorContext::BackendStartup,
            "backend worker startup failure: invalid url",
        )))
        .unwrap();

    app.process_ui_events();

    let banner = app.status_banner.as_ref().unwrap();
    assert_eq!(banner.category(), UiErrorCategory::Startup);
}
