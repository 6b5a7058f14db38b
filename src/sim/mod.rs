//! Trial orchestration: fresh populations, one mechanism run per trial.

pub mod runner;

use serde::Serialize;

use crate::auction::{AuctionKind, AuctionOutcome};

pub use runner::TrialRunner;

/// One trial's outcome plus its position in the experiment.
#[derive(Debug, Clone, Serialize)]
pub struct TrialRecord {
    pub trial: usize,
    pub auction: AuctionKind,
    pub outcome: AuctionOutcome,
}
