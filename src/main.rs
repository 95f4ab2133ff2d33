#![warn(clippy::all, rust_2018_idioms)]

use clap::Parser;
use filterdash::settings::load_settings;
use filterdash::App;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Base URL of the backend serving /upload and /search.
    #[arg(long)]
    server: Option<String>,

    /// Settings file to use instead of the one in the config folder.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Request timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,
}

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref());
    if let Some(server) = args.server {
        settings.server.base_url = server;
    }
    if let Some(timeout) = args.timeout {
        settings.server.timeout_secs = timeout;
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Filter Dashboard")
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([640.0, 400.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    eframe::run_native(
        "Filter Dashboard",
        native_options,
        Box::new(move |cc| Ok(Box::new(App::new(cc, &settings)?))),
    )
}
