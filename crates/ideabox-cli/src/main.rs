//! ideabox - command-line front end for the ideabox idea board.
//!
//! Keeps a persistent session between invocations: an expired access token
//! is renewed transparently, and a session that can no longer be renewed is
//! cleared so the next command starts from login.

mod app;
mod commands;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;

/// Log file name prefix inside the cache directory
const LOG_FILE_PREFIX: &str = "ideabox.log";

#[derive(Debug, Parser)]
#[command(name = "ideabox", version, about = "Share and browse ideas on the idea board")]
struct Cli {
    /// Backend base URL, e.g. http://localhost:5000/api
    #[arg(long, global = true, env = "IDEABOX_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and store the session
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        username: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the stored session and current location
    Status,
    /// List published ideas
    Ideas,
    /// Show a single idea
    Idea { id: i64 },
    /// Publish a new idea
    Submit {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        /// Image file to upload and attach
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Manage the cloud draft
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },
    /// Navigate to a route, subject to the login guard
    Open { path: String },
}

#[derive(Debug, Subcommand)]
enum DraftAction {
    Show,
    Save {
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        content: String,
    },
    Clear,
}

/// Initialize the tracing subscriber for logging.
///
/// Use RUST_LOG to control the level (e.g. RUST_LOG=ideabox_core=debug).
/// When a log directory is available, events are also written to a daily
/// rolling file there; the returned guard flushes it on drop.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let stderr_layer = fmt::layer().with_writer(io::stderr);

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = ideabox_core::Config::load()?;
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }

    let log_dir = config
        .cache_dir()
        .ok()
        .filter(|dir| std::fs::create_dir_all(dir).is_ok());
    let _log_guard = init_tracing(log_dir.as_deref());
    info!(api = %config.api_base_url, "ideabox starting");

    let app = App::new(config)?;

    match cli.command {
        Command::Login { email } => commands::session::login(&app, email).await,
        Command::Register { email, username } => {
            commands::session::register(&app, email, username).await
        }
        Command::Logout => commands::session::logout(&app),
        Command::Status => commands::session::status(&app),
        Command::Ideas => commands::ideas::list(&app).await,
        Command::Idea { id } => commands::ideas::show(&app, id).await,
        Command::Submit {
            title,
            content,
            image,
        } => commands::ideas::submit(&app, title, content, image).await,
        Command::Draft { action } => match action {
            DraftAction::Show => commands::draft::show(&app).await,
            DraftAction::Save { title, content } => {
                commands::draft::save(&app, title, content).await
            }
            DraftAction::Clear => commands::draft::clear(&app).await,
        },
        Command::Open { path } => commands::open(&app, &path),
    }
}
