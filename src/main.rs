use chrono::Utc;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gavel::auction::AuctionKind;
use gavel::bidders::PhaseContext;
use gavel::cli::{Cli, Commands};
use gavel::config::AppConfig;
use gavel::decision::{ChatDecisionClient, DecisionQuery};
use gavel::error::{GavelError, Result};
use gavel::report;
use gavel::sim::TrialRunner;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            auction,
            trials,
            bidders,
            reasoning,
            seed,
            out,
        } => {
            let mut cfg = AppConfig::load_from(&cli.config)?;
            init_logging(&cfg.logging.level);
            if let Some(trials) = trials {
                cfg.simulation.trials = trials;
            }
            if let Some(bidders) = bidders {
                cfg.simulation.bidders = bidders;
            }
            if let Some(reasoning) = reasoning {
                cfg.simulation.reasoning_per_trial = reasoning;
            }
            if let Some(seed) = seed {
                cfg.simulation.seed = Some(seed);
            }
            if let Some(out) = out {
                cfg.output.dir = out;
            }
            cfg.validate()?;
            run_experiment(&cfg, &auction).await?;
        }
        Commands::Probe { value } => {
            let cfg = AppConfig::load_from(&cli.config)?;
            init_logging(&cfg.logging.level);
            probe(&cfg, value).await?;
        }
    }

    Ok(())
}

async fn run_experiment(cfg: &AppConfig, auction: &str) -> Result<()> {
    let kinds: Vec<AuctionKind> = if auction.eq_ignore_ascii_case("all") {
        AuctionKind::ALL.to_vec()
    } else {
        vec![auction.parse().map_err(GavelError::InvalidConfig)?]
    };

    let seed = cfg
        .simulation
        .seed
        .unwrap_or_else(|| Utc::now().timestamp_millis() as u64);
    info!(seed, "rng seed (pass --seed {seed} to reproduce this run)");

    let query: Option<Arc<dyn DecisionQuery>> = if cfg.simulation.reasoning_per_trial > 0 {
        Some(Arc::new(ChatDecisionClient::new(&cfg.decision)?))
    } else {
        None
    };

    let mut runner = TrialRunner::new(
        cfg.simulation.clone(),
        cfg.mechanism.clone(),
        query,
        StdRng::seed_from_u64(seed),
    )?;

    let out_dir = Path::new(&cfg.output.dir);
    std::fs::create_dir_all(out_dir)?;

    let mut all_records = Vec::new();
    for kind in kinds {
        let records = runner.run(kind).await?;
        let path = out_dir.join(format!("{}_auction_results.csv", kind.file_stem()));
        report::export_csv(&path, &records)?;
        all_records.extend(records);
    }

    report::export_csv(out_dir.join("combined_results.csv"), &all_records)?;

    let summary = report::summarize(&all_records);
    println!("{}", report::render_summary(&summary));
    Ok(())
}

async fn probe(cfg: &AppConfig, value: f64) -> Result<()> {
    let client = ChatDecisionClient::new(&cfg.decision)?;
    let context = PhaseContext::sealed(AuctionKind::FirstPriceSealed).describe();
    let bid = client.query_bid(value, &context).await?;
    println!("decision service answered: bid {bid} for private value {value}");
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},gavel=debug")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
