use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    HttpStudentService, Notification, NotificationKind, StudentForm, StudentService,
    StudentsView, SyncOutcome, ViewEvent,
};
use shared::domain::{Gender, Student, StudentId};
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "student-console", about = "Command-line admin for the student service")]
struct Args {
    /// Base URL of the student service.
    #[arg(long, env = "STUDENT_ADMIN_SERVER_URL", default_value = "http://127.0.0.1:8080")]
    server_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every student.
    List,
    /// Add a student, then print the refreshed roster.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        gender: Gender,
    },
    /// Delete a student by id, then print the refreshed roster.
    Delete { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let service: Arc<dyn StudentService> = Arc::new(HttpStudentService::new(&args.server_url)?);
    let view = StudentsView::new(Arc::clone(&service));
    let mut events = view.subscribe();
    tracing::debug!(command = ?args.command, server_url = %args.server_url, "running command");

    let result = run(args.command, &service, &view).await;
    view.teardown();

    for notification in drain_notifications(&mut events) {
        eprintln!("{}", render_notification(&notification));
    }
    match result? {
        Some(students) => print!("{}", render_table(&students)),
        None => eprintln!("Student list could not be reloaded; run `list` to see the current roster"),
    }
    Ok(())
}

/// Runs one command against a fresh view and returns the roster to print, or
/// `None` when the command went through but the roster could not be reloaded.
async fn run(
    command: Command,
    service: &Arc<dyn StudentService>,
    view: &StudentsView,
) -> Result<Option<Vec<Student>>> {
    match command {
        Command::List => {
            let outcome = view.mount().await.context("initial refresh task failed")?;
            ensure_applied(outcome, "could not load students")?;
        }
        Command::Add {
            name,
            email,
            gender,
        } => {
            let mut form = StudentForm {
                name,
                email,
                gender: Some(gender),
            };
            form.submit(&**service, &view.notifier(), || view.refresh())
                .await
                .context("could not add student")?;
        }
        Command::Delete { id } => {
            let outcome = view.remove(StudentId(id)).await;
            ensure_applied(outcome, "could not delete student")?;
        }
    }
    Ok(view.is_synced().then(|| view.students()))
}

fn ensure_applied(outcome: SyncOutcome, what: &str) -> Result<()> {
    match outcome {
        SyncOutcome::Applied => Ok(()),
        SyncOutcome::Failed => bail!("{what}"),
        SyncOutcome::Cancelled => bail!("{what}: operation cancelled"),
    }
}

fn drain_notifications(events: &mut broadcast::Receiver<ViewEvent>) -> Vec<Notification> {
    let mut notifications = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let ViewEvent::Notification(notification) = event {
            notifications.push(notification);
        }
    }
    notifications
}

fn render_notification(notification: &Notification) -> String {
    let kind = match notification.kind {
        NotificationKind::Success => "success",
        NotificationKind::Error => "error",
    };
    format!(
        "[{kind}] {}: {}",
        notification.title, notification.description
    )
}

fn render_table(students: &[Student]) -> String {
    if students.is_empty() {
        return "No students\n".to_string();
    }

    let header = ["Id", "Name", "Email", "Gender"];
    let rows: Vec<[String; 4]> = students
        .iter()
        .map(|student| {
            [
                student.id.to_string(),
                student.name.clone(),
                student.email.clone(),
                student.gender.as_str().to_string(),
            ]
        })
        .collect();

    let mut widths = header.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = format!("Number of students: {}\n", students.len());
    let mut push_row = |cells: [&str; 4]| {
        let line = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    };
    push_row(header);
    for row in &rows {
        push_row([&row[0], &row[1], &row[2], &row[3]]);
    }
    out
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
