mod config;
mod server;
mod watch;

use clap::{Parser, Subcommand};
use config::Config;
use metrics_exporter_statsd::StatsdBuilder;
use server::AppState;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dashd", about = "Dashboard data service")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, short)]
    config: PathBuf,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Serve the widget-data endpoint
    Serve,
    /// Poll configured widgets against a running server and print tiles
    Watch {
        /// Watch a single widget by name
        #[arg(long)]
        widget: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match Config::from_file(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to load config: {err}");
            std::process::exit(1);
        }
    };

    let _sentry_guard = config.logging.as_ref().map(|logging| {
        sentry::init((
            logging.sentry_dsn.clone(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    if let Some(metrics_config) = &config.metrics {
        init_metrics(metrics_config);
    }

    match cli.command {
        CliCommand::Serve => {
            let listener = config.listener.clone();
            let state = AppState::from_config(config);
            if let Err(err) = server::serve(&listener, state).await {
                eprintln!("Server error: {err}");
                std::process::exit(1);
            }
        }
        CliCommand::Watch { widget } => watch::run(config, widget).await,
    }
}

fn init_metrics(config: &config::MetricsConfig) {
    let recorder = StatsdBuilder::from(&config.statsd_host, config.statsd_port)
        .with_queue_size(5000)
        .with_buffer_size(1024)
        .build(Some("dashd"));

    match recorder {
        Ok(recorder) => {
            if let Err(err) = metrics::set_global_recorder(recorder) {
                tracing::warn!(error = %err, "metrics recorder already installed");
            }
        }
        Err(err) => tracing::warn!(error = %err, "failed to set up statsd exporter"),
    }
}
