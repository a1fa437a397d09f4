mod app;
mod components;
mod config;
mod error;
mod event;
mod fs;
mod handler;
mod preview_content;
mod session;
mod theme;
mod tui;
mod ui;

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use tracing::{debug, info};

use crate::app::App;
use crate::config::{AppConfig, LogConfig, PreviewConfig, ThemeConfig};
use crate::event::{Event, EventHandler};
use crate::fs::gateway::LocalGateway;
use crate::fs::sync::Gateways;
use crate::session::Session;
use crate::tui::{install_panic_hook, Tui};

/// A terminal notes browser: a lazily loaded folder tree with a preview pane.
#[derive(Parser, Debug)]
#[command(name = "innote", version, about)]
struct Cli {
    /// Folder to open (defaults to the configured or last opened folder)
    path: Option<PathBuf>,

    /// Config file layered over the default locations
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Hide the preview pane
    #[arg(long)]
    no_preview: bool,

    /// Color scheme: dark or light
    #[arg(long, value_name = "SCHEME")]
    theme: Option<String>,

    /// Write logs to this file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Log level: trace, debug, info, warn or error
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

impl Cli {
    /// Flags expressed as the highest-priority config layer.
    fn overrides(&self) -> AppConfig {
        AppConfig {
            preview: PreviewConfig {
                enabled: self.no_preview.then_some(false),
                ..Default::default()
            },
            theme: ThemeConfig {
                scheme: self.theme.clone(),
            },
            log: LogConfig {
                file: self
                    .log_file
                    .as_ref()
                    .map(|p| p.to_string_lossy().to_string()),
                level: self.log_level.clone(),
            },
            ..Default::default()
        }
    }
}

/// Install a file logger when one is configured. The terminal belongs to the
/// UI, so nothing is logged without a file.
fn setup_tracing(config: &AppConfig) {
    let Some(log_file) = config.log_file() else {
        return;
    };
    let level = match config.log_level().parse::<tracing::Level>() {
        Ok(level) => level,
        Err(_) => {
            eprintln!(
                "Warning: unknown log level {:?}, using info",
                config.log_level()
            );
            tracing::Level::INFO
        }
    };
    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: cannot open log file {log_file}: {e}");
            return;
        }
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
}

/// CLI path, then `general.default_path`, then the last opened folder, then
/// the working directory.
fn initial_folder(cli: &Cli, config: &AppConfig, session: &Session) -> error::Result<String> {
    if let Some(path) = &cli.path {
        return app::resolve_folder_input(&path.to_string_lossy());
    }
    if let Some(default_path) = config.default_path() {
        return app::resolve_folder_input(default_path);
    }
    if let Some(last) = session
        .last_folder
        .as_deref()
        .filter(|last| Path::new(last).is_dir())
    {
        return Ok(last.to_string());
    }
    app::resolve_folder_input(".")
}

#[tokio::main]
async fn main() -> error::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));
    setup_tracing(&config);
    debug!(?cli, "parsed arguments");

    let session_path = session::default_session_path();
    let session = session_path
        .as_deref()
        .map(Session::load)
        .unwrap_or_default();
    let folder = initial_folder(&cli, &config, &session)?;
    info!(folder = %folder, "starting");

    install_panic_hook();

    let mut tui = Tui::new()?;
    let mut events = EventHandler::new(Duration::from_millis(250));
    let gateways = Gateways::local(LocalGateway::new(
        config.new_file_name(),
        config.new_directory_name(),
    ));
    let mut app = App::new(gateways, events.sender(), &config, session, session_path);
    app.open_folder(&folder);

    loop {
        tui.terminal_mut().draw(|frame| {
            ui::render(&mut app, frame);
        })?;

        match events.next().await? {
            Event::Key(key) => handler::handle_key_event(&mut app, key),
            event => app.handle_event(event),
        }

        if let Some(title) = app.take_title() {
            tui.set_title(&title)?;
        }

        if app.should_quit {
            break;
        }
    }

    tui.restore()?;
    info!("exiting");
    Ok(())
}
