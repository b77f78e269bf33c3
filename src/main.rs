use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use estate_chat::config::{Config, Overrides};

/// Terminal chat client for the real-estate analysis backend
#[derive(Debug, Parser)]
#[command(name = "estate-chat", version, about)]
struct Args {
    /// Backend base URL (default depends on the dialect)
    #[arg(long)]
    base_url: Option<String>,

    /// Backend wire dialect: "classic" or "rag"
    #[arg(long)]
    dialect: Option<String>,

    /// Directory CSV exports are written to
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Directory log files are written to
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::load(Overrides {
        base_url: args.base_url,
        dialect: args.dialect,
        export_dir: args.export_dir,
        log_dir: args.log_dir,
    })?;

    // Stdout belongs to the TUI, so tracing goes to a daily log file.
    std::fs::create_dir_all(&config.log_dir)?;
    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "estate-chat.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "estate_chat=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();

    info!(
        dialect = %config.api.dialect,
        base_url = %config.api.base_url,
        "configuration loaded"
    );

    estate_chat::tui::run(config).await
}
