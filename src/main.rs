use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use quizdesk::api::Backend;
use quizdesk::api::file::FileBackend;
use quizdesk::api::http::HttpBackend;
use quizdesk::terminal::TerminalGuard;
use quizdesk::{App, Config, SessionOptions, UserContext, load_config_from};

/// User id assumed in offline mode when none is configured.
const OFFLINE_USER: &str = "local";

#[derive(Parser, Debug)]
#[command(version, about = "Timed quizzes in the terminal", long_about = None)]
struct Args {
    /// Config file (defaults to ./quizdesk.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend root URL
    #[arg(long)]
    base_url: Option<String>,

    /// User id to take quizzes as
    #[arg(short, long)]
    user: Option<String>,

    /// Open this quiz directly instead of the catalogue
    #[arg(short, long)]
    quiz: Option<u64>,

    /// Serve quizzes from `<id>.json` files in this directory
    #[arg(long, value_name = "DIR")]
    offline: Option<PathBuf>,

    /// Log file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = load_config_from(args.config.as_deref())?;
    if let Some(url) = args.base_url {
        config.base_url = url;
    }
    if let Some(user) = args.user {
        config.user_id = Some(user);
    }
    if let Some(path) = args.log_file {
        config.log_file = path;
    }

    init_logging(&config)?;
    info!(version = env!("CARGO_PKG_VERSION"), "quizdesk starting");

    let options = config.session_options();
    match args.offline {
        Some(dir) => {
            let user_id = config.user_id.clone().or_else(|| Some(OFFLINE_USER.to_string()));
            info!(dir = %dir.display(), "offline mode");
            run(FileBackend::new(dir), UserContext::new(user_id), options, args.quiz).await
        }
        None => {
            let backend =
                HttpBackend::new(Some(config.base_url.clone()), config.request_timeout_secs)
                    .context("failed to build HTTP client")?;
            info!(base_url = backend.base_url(), "online mode");
            run(backend, UserContext::new(config.user_id.clone()), options, args.quiz).await
        }
    }
}

async fn run<B: Backend>(
    backend: B,
    user: UserContext,
    options: SessionOptions,
    quiz_id: Option<u64>,
) -> Result<()> {
    let mut app = App::new(backend, user, options);
    if let Some(quiz_id) = quiz_id {
        app.open_quiz(quiz_id);
    }

    let mut terminal = TerminalGuard::new().context("failed to set up terminal")?;
    app.run(&mut terminal).await.context("terminal error")?;

    info!("quizdesk exiting");
    Ok(())
}

/// Logs go to a file; the terminal belongs to the UI.
fn init_logging(config: &Config) -> Result<()> {
    let file = open_log(&config.log_file)?;
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log level")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn open_log(path: &Path) -> Result<std::fs::File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file: {}", path.display()))
}
