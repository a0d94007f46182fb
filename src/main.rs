//! Enrollment Dashboard - student records by city, state, course and status.

use anyhow::anyhow;
use clap::Parser;
use eframe::egui;
use matricula_dashboard::auth::hash_password;
use matricula_dashboard::config::AppConfig;
use matricula_dashboard::data::CsvSheetProvider;
use matricula_dashboard::gui::DashboardApp;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Dashboard configuration
    #[arg(short, long, value_name = "FILE", default_value = "dashboard.toml")]
    config: PathBuf,

    /// Print the bcrypt hash to store as `password_hash` and exit
    #[arg(long, value_name = "PASSWORD")]
    hash_password: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if let Some(password) = &cli.hash_password {
        println!("{}", hash_password(password)?);
        return Ok(());
    }

    let config = AppConfig::load_or_default(&cli.config)?;
    let provider = CsvSheetProvider::from_config(&config.source);
    info!(source = %provider.directory().display(), "starting dashboard");

    let title = config.ui.title.clone();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 850.0])
            .with_min_inner_size([1000.0, 650.0])
            .with_title(&title),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, config, Box::new(provider))))),
    )
    .map_err(|e| anyhow!("dashboard window failed: {e}"))
}
