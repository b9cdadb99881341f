//! Command-line entry point: run the HTTP service or process a local PDF.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use timetablepdf::server::{self, ServerConfig};
use timetablepdf::{ExtractorConfig, ScheduleLayout, TimetableDocument};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "timetablepdf", version, about = "Timetable PDF to room schedule JSON")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve `POST /procesar-pdf`.
    Serve {
        #[arg(long, env = "TIMETABLE_BIND", default_value = "0.0.0.0:8000")]
        bind: SocketAddr,

        /// Largest accepted upload, in MiB.
        #[arg(long, env = "TIMETABLE_MAX_UPLOAD_MB", default_value_t = 20)]
        max_upload_mb: usize,
    },

    /// Process a local PDF and print the result as JSON.
    Parse {
        pdf: PathBuf,

        /// Print the extracted table rows instead of the room schedule.
        #[arg(long)]
        rows: bool,

        #[arg(long)]
        pretty: bool,

        /// Only read the first N pages.
        #[arg(long)]
        max_pages: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── logging ─────────────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Serve { bind, max_upload_mb } => {
            let config = ServerConfig {
                bind,
                max_upload_bytes: max_upload_mb.saturating_mul(1024 * 1024),
                ..ServerConfig::default()
            };
            info!(%bind, max_upload_mb, "starting server");
            server::serve(&config).await?;
        }
        Command::Parse { pdf, rows, pretty, max_pages } => {
            let config = ExtractorConfig { max_pages, ..ExtractorConfig::default() };
            let document = TimetableDocument::from_path(&pdf)
                .with_context(|| format!("cannot open {}", pdf.display()))?
                .with_config(config);
            let extracted = document.extract_rows()?;

            let json = if rows {
                to_json(&extracted, pretty)?
            } else {
                to_json(&ScheduleLayout::default().reshape(&extracted)?, pretty)?
            };
            println!("{json}");
        }
    }

    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}
