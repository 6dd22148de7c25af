mod cli;
mod render;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use adapters::FileVenue;
use cli::{Cli, OutputFormat};
use common::init_logger;
use corelib::{PipelineReport, Venue};
use engine::{EngineConfig, Pipeline};
use scheduler::{ReportStore, TickRunner};

fn print_report(report: &PipelineReport, cli: &Cli) -> anyhow::Result<()> {
    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Table => println!("{}", render::render_table(report, cli.color)),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger("fundarb", cli.json_logs);

    let mut cfg = EngineConfig::from_env().context("loading engine config from environment")?;
    cli.apply_overrides(&mut cfg);

    let pipeline = Arc::new(
        Pipeline::new(
            cfg,
            Arc::new(FileVenue::new(Venue::A, &cli.venue_a)),
            Arc::new(FileVenue::new(Venue::B, &cli.venue_b)),
        )
        .context("invalid engine config")?,
    );

    let Some(interval) = cli.interval() else {
        let report = pipeline.run_now(1).await;
        return print_report(&report, &cli);
    };

    info!(interval_secs = interval.as_secs(), "starting polling mode");

    let store = ReportStore::new();
    let (report_tx, mut report_rx) = mpsc::channel(16);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let runner = TickRunner::new(pipeline, store, interval)
        .context("invalid polling interval")?
        .with_report_channel(report_tx)
        .spawn(shutdown_rx);

    loop {
        tokio::select! {
            report = report_rx.recv() => match report {
                Some(report) => print_report(&report, &cli)?,
                None => {
                    warn!("tick runner exited");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("ctrl-c received, shutting down");
                break;
            }
        }
    }

    let _ = shutdown_tx.send(true);
    runner.await?;
    Ok(())
}
