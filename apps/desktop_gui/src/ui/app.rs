use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

use client_core::{FormError, Notification, NotificationKind, StudentForm};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::{Gender, Student};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorCategory, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

const TOAST_TTL: Duration = Duration::from_millis(4500);
const MAX_VISIBLE_TOASTS: usize = 5;
const AVATAR_RADIUS: f32 = 14.0;
const TABLE_MAX_HEIGHT: f32 = 500.0;
const BADGE_COLOR: egui::Color32 = egui::Color32::from_rgb(250, 173, 20);

#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub server_url: String,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
        }
    }
}

/// Text shown inside a student's avatar. `None` renders the placeholder icon.
pub(crate) fn avatar_initials(name: &str) -> Option<String> {
    let name = name.trim();
    let first = name.chars().next()?;
    if !name.contains(char::is_whitespace) {
        return Some(first.to_string());
    }
    let last = name.chars().last().unwrap_or(first);
    Some(format!("{first}{last}"))
}

fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Transport => "Transport",
        UiErrorCategory::Startup => "Startup",
        UiErrorCategory::Unknown => "Unexpected",
    }
}

struct Toast {
    notification: Notification,
    shown_at: Instant,
}

#[derive(Default)]
pub(crate) struct ToastStack {
    toasts: VecDeque<Toast>,
}

impl ToastStack {
    pub(crate) fn push(&mut self, notification: Notification, now: Instant) {
        self.toasts.push_back(Toast {
            notification,
            shown_at: now,
        });
        while self.toasts.len() > MAX_VISIBLE_TOASTS {
            self.toasts.pop_front();
        }
    }

    pub(crate) fn prune(&mut self, now: Instant) {
        self.toasts
            .retain(|toast| now.saturating_duration_since(toast.shown_at) < TOAST_TTL);
    }

    pub(crate) fn dismiss(&mut self, index: usize) {
        self.toasts.remove(index);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub(crate) fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.toasts.iter().map(|toast| &toast.notification)
    }
}

#[derive(Default)]
struct DrawerState {
    open: bool,
    draft: StudentForm,
    error: Option<FormError>,
    submitting: bool,
}

pub struct StudentAdminApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    server_url: String,
    students: Vec<Student>,
    loading: bool,
    drawer: DrawerState,
    pending_delete: Option<Student>,
    toasts: ToastStack,
    status: String,
    status_banner: Option<UiError>,
    backend_released: bool,
}

impl StudentAdminApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        startup: StartupConfig,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            server_url: startup.server_url,
            students: Vec::new(),
            loading: false,
            drawer: DrawerState::default(),
            pending_delete: None,
            toasts: ToastStack::default(),
            status: "Starting".to_string(),
            status_banner: None,
            backend_released: false,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::StudentsReplaced(students) => {
                    self.status = format!("{} students loaded", students.len());
                    self.students = students;
                }
                UiEvent::LoadingChanged(loading) => {
                    self.loading = loading;
                }
                UiEvent::Notification(notification) => {
                    self.toasts.push(notification, Instant::now());
                }
                UiEvent::StudentCreated(student) => {
                    self.drawer.submitting = false;
                    self.drawer.draft.clear();
                    self.drawer.error = None;
                    self.drawer.open = false;
                    self.status = format!("Added {}", student.name);
                }
                UiEvent::CreateFailed(err) => {
                    self.drawer.submitting = false;
                    // Remote failures are already shown as toasts.
                    if err.field().is_some() {
                        self.drawer.error = Some(err);
                    }
                }
                UiEvent::Error(err) => {
                    tracing::warn!(context = ?err.context(), "{}", err.message());
                    self.status_banner = Some(err);
                }
            }
        }
    }

    fn queue(&mut self, cmd: BackendCommand) -> bool {
        match dispatch_backend_command(&self.cmd_tx, cmd) {
            Ok(()) => true,
            Err(err) => {
                self.status_banner = Some(err);
                false
            }
        }
    }

    fn toggle_drawer(&mut self) {
        self.drawer.open = !self.drawer.open;
    }

    fn submit_drawer(&mut self) {
        if self.drawer.submitting {
            return;
        }
        if let Err(err) = self.drawer.draft.validate() {
            self.drawer.error = Some(err);
            return;
        }
        self.drawer.error = None;
        let form = self.drawer.draft.clone();
        if self.queue(BackendCommand::CreateStudent { form }) {
            self.drawer.submitting = true;
        }
    }

    fn confirm_delete(&mut self) {
        if let Some(student) = self.pending_delete.take() {
            self.queue(BackendCommand::RemoveStudent {
                student_id: student.id,
            });
        }
    }

    /// Asks the backend to tear the view down. Sent at most once.
    fn release_backend(&mut self) {
        if self.backend_released {
            return;
        }
        self.backend_released = true;
        let _ = dispatch_backend_command(&self.cmd_tx, BackendCommand::Teardown);
    }

    fn show_header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Students");
            ui.separator();
            ui.label(egui::RichText::new(&self.server_url).weak());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add_enabled(!self.loading, egui::Button::new("Refresh"))
                    .clicked()
                {
                    self.queue(BackendCommand::Refresh);
                }
                ui.label(egui::RichText::new(&self.status).small());
            });
        });
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        if let Some(banner) = self.status_banner.clone() {
            egui::Frame::NONE
                .fill(egui::Color32::from_rgb(111, 53, 53))
                .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)))
                .corner_radius(8.0)
                .inner_margin(egui::Margin::symmetric(10, 8))
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(
                            egui::RichText::new(format!(
                                "{}: {}",
                                err_label(banner.category()),
                                banner.message()
                            ))
                            .color(egui::Color32::WHITE),
                        );
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Dismiss").clicked() {
                                self.status_banner = None;
                            }
                        });
                    });
                });
            ui.add_space(8.0);
        }
    }

    fn show_roster(&mut self, ui: &mut egui::Ui) {
        if self.loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading students");
            });
        }

        if self.students.is_empty() {
            if ui.button("+ Add New Student").clicked() {
                self.toggle_drawer();
            }
            ui.add_space(24.0);
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new("No data").weak().size(16.0));
            });
            return;
        }

        ui.horizontal(|ui| {
            ui.label("Number of students");
            show_count_badge(ui, self.students.len());
        });
        ui.add_space(6.0);
        if ui.button("+ Add New Student").clicked() {
            self.toggle_drawer();
        }
        ui.add_space(8.0);

        let mut delete_requested = None;
        egui::ScrollArea::vertical()
            .max_height(TABLE_MAX_HEIGHT)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                egui::Grid::new("students_table")
                    .striped(true)
                    .num_columns(6)
                    .spacing([16.0, 8.0])
                    .show(ui, |ui| {
                        ui.label("");
                        for title in ["Id", "Name", "Email", "Gender", "Actions"] {
                            ui.label(egui::RichText::new(title).strong());
                        }
                        ui.end_row();

                        for student in &self.students {
                            show_avatar(ui, &student.name);
                            ui.label(student.id.to_string());
                            ui.label(&student.name);
                            ui.label(&student.email);
                            ui.label(student.gender.as_str());
                            if ui.button("Delete").clicked() {
                                delete_requested = Some(student.clone());
                            }
                            ui.end_row();
                        }
                    });
            });

        if delete_requested.is_some() {
            self.pending_delete = delete_requested;
        }
    }

    fn show_drawer(&mut self, ctx: &egui::Context) {
        if !self.drawer.open {
            return;
        }

        let mut submit = false;
        let mut close = false;
        egui::SidePanel::right("student_drawer")
            .resizable(false)
            .exact_width(340.0)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                ui.heading("Create new student");
                ui.separator();

                let drawer = &mut self.drawer;
                ui.label("Name");
                ui.add(
                    egui::TextEdit::singleline(&mut drawer.draft.name)
                        .hint_text("Please enter student name"),
                );
                ui.add_space(4.0);
                ui.label("Email");
                ui.add(
                    egui::TextEdit::singleline(&mut drawer.draft.email)
                        .hint_text("Please enter student email"),
                );
                ui.add_space(4.0);
                ui.label("Gender");
                egui::ComboBox::from_id_salt("student_gender")
                    .selected_text(
                        drawer
                            .draft
                            .gender
                            .map(Gender::label)
                            .unwrap_or("Please select a gender"),
                    )
                    .show_ui(ui, |ui| {
                        for gender in Gender::ALL {
                            ui.selectable_value(
                                &mut drawer.draft.gender,
                                Some(gender),
                                gender.label(),
                            );
                        }
                    });

                if let Some(err) = &drawer.error {
                    ui.add_space(6.0);
                    ui.colored_label(egui::Color32::from_rgb(220, 80, 80), err.to_string());
                }

                ui.add_space(12.0);
                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        close = true;
                    }
                    if ui
                        .add_enabled(!drawer.submitting, egui::Button::new("Submit"))
                        .clicked()
                    {
                        submit = true;
                    }
                    if drawer.submitting {
                        ui.spinner();
                    }
                });
            });

        if close {
            self.drawer.open = false;
        }
        if submit {
            self.submit_drawer();
        }
    }

    fn show_delete_confirmation(&mut self, ctx: &egui::Context) {
        let Some(student) = &self.pending_delete else {
            return;
        };

        let mut confirmed = None;
        egui::Window::new("Delete student")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(format!("Are you sure to delete {}", student.name));
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("No").clicked() {
                        confirmed = Some(false);
                    }
                    if ui.button("Yes").clicked() {
                        confirmed = Some(true);
                    }
                });
            });

        match confirmed {
            Some(true) => self.confirm_delete(),
            Some(false) => self.pending_delete = None,
            None => {}
        }
    }

    fn show_toasts(&mut self, ctx: &egui::Context) {
        self.toasts.prune(Instant::now());
        if self.toasts.is_empty() {
            return;
        }

        let mut dismissed = None;
        egui::Area::new(egui::Id::new("notification_toasts"))
            .anchor(egui::Align2::RIGHT_TOP, [-16.0, 16.0])
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                ui.set_max_width(360.0);
                for (index, notification) in self.toasts.notifications().enumerate() {
                    let accent = match notification.kind {
                        NotificationKind::Success => egui::Color32::from_rgb(82, 196, 26),
                        NotificationKind::Error => egui::Color32::from_rgb(255, 77, 79),
                    };
                    egui::Frame::popup(ui.style())
                        .stroke(egui::Stroke::new(1.0, accent))
                        .inner_margin(egui::Margin::symmetric(12, 10))
                        .show(ui, |ui| {
                            ui.horizontal(|ui| {
                                ui.label(
                                    egui::RichText::new(&notification.title)
                                        .strong()
                                        .color(accent),
                                );
                                ui.with_layout(
                                    egui::Layout::right_to_left(egui::Align::Center),
                                    |ui| {
                                        if ui.small_button("x").clicked() {
                                            dismissed = Some(index);
                                        }
                                    },
                                );
                            });
                            ui.label(&notification.description);
                        });
                    ui.add_space(6.0);
                }
            });

        if let Some(index) = dismissed {
            self.toasts.dismiss(index);
        }
    }
}

fn show_avatar(ui: &mut egui::Ui, name: &str) {
    let size = egui::vec2(AVATAR_RADIUS * 2.0, AVATAR_RADIUS * 2.0);
    let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
    let painter = ui.painter();
    painter.circle_filled(rect.center(), AVATAR_RADIUS, egui::Color32::from_gray(190));
    let text = avatar_initials(name).unwrap_or_else(|| "👤".to_string());
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        text,
        egui::FontId::proportional(13.0),
        egui::Color32::WHITE,
    );
}

fn show_count_badge(ui: &mut egui::Ui, count: usize) {
    egui::Frame::NONE
        .fill(BADGE_COLOR)
        .corner_radius(10.0)
        .inner_margin(egui::Margin::symmetric(8, 2))
        .show(ui, |ui| {
            ui.label(
                egui::RichText::new(count.to_string())
                    .color(egui::Color32::WHITE)
                    .strong(),
            );
        });
}

impl eframe::App for StudentAdminApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        if ctx.input(|input| input.viewport().close_requested()) {
            self.release_backend();
        }

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(6.0);
            self.show_header(ui);
            ui.add_space(6.0);
        });
        self.show_drawer(ctx);
        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_status_banner(ui);
            self.show_roster(ui);
        });
        self.show_delete_confirmation(ctx);
        self.show_toasts(ctx);

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
