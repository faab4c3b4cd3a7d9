mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;
use ui::{app::DEFAULT_SERVER_URL, StartupConfig, StudentAdminApp};

#[derive(Debug, Parser)]
#[command(name = "student-admin", about = "Desktop admin for the student service")]
struct Cli {
    /// Base URL of the student service.
    #[arg(long, env = "STUDENT_ADMIN_SERVER_URL", default_value = DEFAULT_SERVER_URL)]
    server_url: String,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let startup = StartupConfig {
        server_url: cli.server_url,
    };

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(startup.server_url.clone(), cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Student Admin")
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([760.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Student Admin",
        options,
        Box::new(|_cc| Ok(Box::new(StudentAdminApp::new(cmd_tx, ui_rx, startup)))),
    )
}
