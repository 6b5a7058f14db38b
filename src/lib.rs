pub mod auction;
pub mod bidders;
pub mod cli;
pub mod config;
pub mod decision;
pub mod error;
pub mod report;
pub mod sim;

pub use auction::{AuctionKind, AuctionOutcome, Mechanism};
pub use bidders::{Bidder, PhaseContext, Strategy};
pub use config::AppConfig;
pub use decision::{ChatDecisionClient, DecisionQuery};
pub use error::{GavelError, QueryError, Result};
pub use sim::{TrialRecord, TrialRunner};
