use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};

mod annotate;
mod artifacts;
mod error;
mod features;
mod models;
mod report;
mod server;
mod service;

use service::PredictionService;

#[derive(Parser)]
#[command(name = "cardio-risk-service")]
#[command(about = "Cardiovascular disease risk screening service", long_about = None)]
struct Cli {
    #[arg(long, global = true, default_value = "artifacts/cardio_model.json")]
    model: PathBuf,
    #[arg(long, global = true, default_value = "artifacts/scaler.json")]
    scaler: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict risk for a single patient record read from a JSON file
    Predict {
        #[arg(long)]
        input: PathBuf,
    },
    /// Screen a CSV of patient records and write a markdown report
    Batch {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value = "screening-report.md")]
        out: PathBuf,
    },
    /// Print model metadata and feature importances
    ModelInfo,
    /// Run the HTTP prediction endpoint
    Serve {
        #[arg(long, default_value = "127.0.0.1:8000")]
        addr: SocketAddr,
    },
}

fn load_service(model: &Path, scaler: &Path) -> anyhow::Result<PredictionService> {
    PredictionService::load(model, scaler).context("failed to load model artifacts")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Predict { ref input } => {
            let service = load_service(&cli.model, &cli.scaler)?;
            let raw = std::fs::read_to_string(input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let record: models::PatientRecord =
                serde_json::from_str(&raw).context("input is not a valid patient record")?;
            let prediction = service.predict(&record)?;
            println!("{}", serde_json::to_string_pretty(&prediction)?);
        }
        Commands::Batch { ref csv, ref out } => {
            let service = load_service(&cli.model, &cli.scaler)?;
            let records = report::read_patients_csv(csv)?;

            let mut outcomes = Vec::with_capacity(records.len());
            for (i, record) in records.iter().enumerate() {
                let prediction = service
                    .predict(record)
                    .with_context(|| format!("failed to score row {}", i + 1))?;
                outcomes.push(report::ScreeningOutcome {
                    record: record.clone(),
                    report: prediction,
                });
            }

            let markdown = report::build_report(&outcomes, Utc::now().date_naive());
            std::fs::write(out, markdown)?;
            println!(
                "Screened {} records. Report written to {}.",
                outcomes.len(),
                out.display()
            );
        }
        Commands::ModelInfo => {
            let service = load_service(&cli.model, &cli.scaler)?;
            let info = service.model_info();
            println!("{} (held-out accuracy {:.2})", info.model_type, info.accuracy);
            for entry in &info.feature_importances {
                println!("- {}: {:.3}", entry.feature, entry.importance);
            }
        }
        Commands::Serve { addr } => {
            let state = match PredictionService::load(&cli.model, &cli.scaler) {
                Ok(service) => server::AppState::new(Some(service)),
                Err(err) => {
                    tracing::error!(error = %err, "model artifacts unavailable, all predictions will return 503");
                    server::AppState::new(None)
                }
            };
            server::serve(addr, state).await?;
        }
    }

    Ok(())
}
