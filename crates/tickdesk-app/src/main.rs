//! tickdesk — headless market watcher entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Market watcher with a structured event log and auto refresh.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via TICKDESK_CONFIG)
    #[arg(short, long)]
    config: Option<String>,

    /// Run a single refresh cycle and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    tickdesk_telemetry::init_logging()?;
    info!("Starting tickdesk v{}", env!("CARGO_PKG_VERSION"));

    let config_path = args
        .config
        .or_else(|| std::env::var("TICKDESK_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());
    info!(config_path = %config_path, "Loading configuration");
    let config = tickdesk_app::AppConfig::load(&config_path)?;

    let app = tickdesk_app::App::new(config)?;
    app.refresh_all().await;

    if args.once {
        if let Some(status) = app.status_line() {
            info!(%status, "Single refresh finished");
        }
        return Ok(());
    }

    let runner = {
        let app = app.clone();
        async move {
            let app_for_refresh = app.clone();
            app.scheduler()
                .run(move || {
                    let app = app_for_refresh.clone();
                    async move { app.refresh_all().await }
                })
                .await;
        }
    };

    tokio::select! {
        _ = runner => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
    }

    Ok(())
}
