use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gavel")]
#[command(version = "0.1.0")]
#[command(about = "Auction mechanism simulator comparing LLM bidders with classical strategies", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config directory (default.toml plus GAVEL_ENV overrides)
    #[arg(short, long, default_value = "config")]
    pub config: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run simulated auction trials and export CSV results
    Run {
        /// Auction type: first-price, vickrey, english, dutch, japanese or all
        #[arg(short, long, default_value = "all")]
        auction: String,

        /// Trials per auction type
        #[arg(long)]
        trials: Option<usize>,

        /// Bidders per trial
        #[arg(long)]
        bidders: Option<usize>,

        /// Reasoning-agent (LLM) seats per trial
        #[arg(long)]
        reasoning: Option<usize>,

        /// RNG seed for reproducible experiments
        #[arg(long)]
        seed: Option<u64>,

        /// Output directory for CSV exports
        #[arg(short, long)]
        out: Option<String>,
    },

    /// Send one test bid query to the decision service
    Probe {
        /// Private value included in the test prompt
        #[arg(long, default_value = "80")]
        value: f64,
    },
}
