//! RiskDesk CLI
//!
//! Terminal front door for the analytics pipeline: scan an asset, benchmark
//! the catalog, project future prices, compose the audit report, and manage
//! the saved scan history.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use riskdesk_backend::{
    history::HistoryFilter, simulation::DEFAULT_SEED, Analyzer, Config, HistoryStore,
};

#[derive(Parser)]
#[command(name = "riskdesk", version, about = "Quantitative asset risk terminal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a risk scan for one asset and log it to history
    Analyze {
        /// Asset id (e.g. "bitcoin") or display label
        asset: String,
        #[arg(long, default_value = "local")]
        user: String,
        /// Note to attach to the saved record
        #[arg(long)]
        note: Option<String>,
        /// Skip writing a history record
        #[arg(long)]
        no_save: bool,
        #[arg(long)]
        json: bool,
    },
    /// Cross-asset volatility benchmark
    Compare {
        #[arg(long)]
        json: bool,
    },
    /// Monte Carlo price projection
    Forecast {
        asset: String,
        #[arg(long)]
        days: Option<usize>,
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
        #[arg(long)]
        json: bool,
    },
    /// Compose the downloadable audit report
    Report {
        asset: String,
        #[arg(long, default_value = "local")]
        user: String,
        /// Output path (default: Risk_Audit_<asset>.html)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Saved scan history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Store-level counters
    Stats,
}

#[derive(Subcommand)]
enum HistoryAction {
    List {
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        asset: Option<String>,
        #[arg(long)]
        json: bool,
    },
    Delete { id: i64 },
    Purge,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(2)
        }
    }
}

/// Accept either the stable id or the display label on the command line.
fn resolve_asset_id(asset: &str) -> String {
    riskdesk_backend::catalog::find(asset)
        .or_else(|| riskdesk_backend::catalog::find_by_label(asset))
        .map(|spec| spec.id.to_string())
        .unwrap_or_else(|| asset.to_string())
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = Config::from_env()?;
    let analyzer = Analyzer::new(config.clone());

    match cli.command {
        Command::Analyze {
            asset,
            user,
            note,
            no_save,
            json,
        } => {
            let asset_id = resolve_asset_id(&asset);
            let Some(snapshot) = analyzer.snapshot(&asset_id) else {
                warn!(asset = %asset, "no data available for asset");
                return Ok(ExitCode::from(1));
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                println!("Asset:         {}", snapshot.label);
                println!("Price:         ${:.2}", snapshot.price);
                println!("Volatility:    {:.2}%", snapshot.volatility * 100.0);
                println!("Max Drawdown:  {:.2}%", snapshot.max_drawdown * 100.0);
                println!("Risk Tier:     {}", snapshot.tier);
                println!("Observations:  {}", snapshot.observations);
            }

            if !no_save {
                let store = HistoryStore::new(&config.db_path)?;
                let id = store.save_record(
                    &user,
                    &snapshot.label,
                    snapshot.tier,
                    snapshot.volatility,
                    note.as_deref().unwrap_or("Auto-Log: Risk Scan"),
                )?;
                info!(record_id = id, user = %user, "scan saved to history");
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Compare { json } => {
            let comparison = analyzer.comparison_set();
            if comparison.is_empty() {
                warn!("no assets with data in the configured data directory");
                return Ok(ExitCode::from(1));
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&comparison)?);
            } else {
                for (label, vol) in &comparison {
                    println!("{:<14} {:>8.2}%", label, vol * 100.0);
                }
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Forecast {
            asset,
            days,
            seed,
            json,
        } => {
            let asset_id = resolve_asset_id(&asset);
            let days = days.unwrap_or(config.sim_days);
            let Some((ensemble, summary)) = analyzer.forecast(&asset_id, days, seed) else {
                warn!(asset = %asset, "no data available for asset");
                return Ok(ExitCode::from(1));
            };

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "days": ensemble.step_count(),
                        "paths": ensemble.path_count(),
                        "seed": seed,
                        "summary": summary,
                    }))?
                );
            } else {
                println!(
                    "Simulated {} paths over {} days (seed {})",
                    ensemble.path_count(),
                    ensemble.step_count(),
                    seed
                );
                println!("Worst case (p5):   ${:.2}", summary.worst_case);
                println!("Median scenario:   ${:.2}", summary.median);
                println!("Best case (p95):   ${:.2}", summary.best_case);
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Report { asset, user, out } => {
            let asset_id = resolve_asset_id(&asset);
            let Some(artifact) = analyzer.report(&user, &asset_id) else {
                warn!(asset = %asset, "no data available for asset");
                return Ok(ExitCode::from(1));
            };
            let label = analyzer
                .snapshot(&asset_id)
                .map(|s| s.label)
                .unwrap_or_else(|| asset_id.clone());
            let path = out.unwrap_or_else(|| {
                PathBuf::from(format!("Risk_Audit_{}.html", label.replace(' ', "_")))
            });
            std::fs::write(&path, &artifact)
                .with_context(|| format!("write report to {}", path.display()))?;
            info!(path = %path.display(), bytes = artifact.len(), "audit report written");
            Ok(ExitCode::SUCCESS)
        }

        Command::History { action } => {
            let store = HistoryStore::new(&config.db_path)?;
            match action {
                HistoryAction::List { user, asset, json } => {
                    let records = store.query_records(&HistoryFilter { user, asset })?;
                    if json {
                        println!("{}", serde_json::to_string_pretty(&records)?);
                    } else if records.is_empty() {
                        println!("history is empty");
                    } else {
                        for r in &records {
                            println!(
                                "#{:<5} {:<10} {:<14} {:<9} {:>7.2}%  {}  {}",
                                r.id,
                                r.username,
                                r.asset,
                                r.risk_tier,
                                r.volatility * 100.0,
                                r.timestamp,
                                r.note
                            );
                        }
                    }
                }
                HistoryAction::Delete { id } => {
                    if store.delete_record(id)? {
                        info!(id, "record deleted");
                    } else {
                        warn!(id, "no record with that id");
                        return Ok(ExitCode::from(1));
                    }
                }
                HistoryAction::Purge => {
                    let purged = store.purge_all()?;
                    info!(purged, "history purged");
                }
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Stats => {
            let store = HistoryStore::new(&config.db_path)?;
            let stats = store.get_stats()?;
            println!("users:   {}", stats.user_count);
            println!("records: {}", stats.record_count);
            Ok(ExitCode::SUCCESS)
        }
    }
}
