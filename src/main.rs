use clap::Parser;
use omnipoll_console::cache_manager::SyncContext;
use omnipoll_console::settings::{ApiSettings, Settings};
use omnipoll_console::sync::config::{DEFAULT_NOTIFICATION_TTL_MS, DEFAULT_REQUEST_TIMEOUT_SECS};
use omnipoll_console::tui;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL of the omnipoll admin api
    #[arg(long, env = "OMNIPOLL_API_URL", default_value = "http://localhost:8080/api")]
    base_url: String,

    #[arg(short, long, env = "OMNIPOLL_API_USER", default_value = "admin")]
    user: String,

    #[arg(short, long, env = "OMNIPOLL_API_PASSWORD", default_value = "admin", hide_env_values = true)]
    password: String,

    /// Ceiling for every request, in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// How long a success or error banner stays up, in milliseconds
    #[arg(long, default_value_t = DEFAULT_NOTIFICATION_TTL_MS)]
    notification_ms: u64,

    #[arg(long, env = "OMNIPOLL_USER_AGENT")]
    user_agent: Option<String>,

    /// The ui owns the terminal, so logs go to a file
    #[arg(long, default_value = "omnipoll-console.log")]
    log_file: PathBuf,

    /// Overrides RUST_LOG
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn settings(&self) -> Settings {
        let defaults = ApiSettings::default();
        let api = ApiSettings {
            base_url: self.base_url.clone(),
            username: self.user.clone(),
            password: self.password.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
        };
        Settings::new(api, Duration::from_millis(self.notification_ms))
    }
}

fn init_logging(args: &Args) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&args.log_file)?;
    let filter = match &args.log_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let settings = args.settings();
    info!(
        "omnipoll-console {} starting against {}",
        env!("CARGO_PKG_VERSION"),
        settings.api.base_url
    );

    let ctx = SyncContext::connect(&settings)?;
    let result = tui::run(ctx.clone()).await;
    ctx.shutdown().await;

    result.map_err(|e| anyhow::anyhow!("{e}"))
}
