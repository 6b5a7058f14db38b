//! Auction mechanism state machines.
//!
//! Each mechanism consumes a fresh bidder population and produces exactly
//! one [`AuctionOutcome`]. Mechanisms never fail at runtime: degenerate
//! states (empty population, nobody meets the clock, simultaneous drop-out)
//! resolve to a well-formed no-winner outcome. Invalid parameters are
//! rejected at construction instead.

pub mod dutch;
pub mod english;
pub mod first_price;
pub mod japanese;
pub mod types;
pub mod vickrey;

use async_trait::async_trait;

use crate::bidders::{Bidder, PhaseContext};
use crate::config::MechanismConfig;
use crate::error::Result;

pub use dutch::Dutch;
pub use english::English;
pub use first_price::FirstPriceSealed;
pub use japanese::Japanese;
pub use types::{AuctionOutcome, TraceEntry};
pub use vickrey::Vickrey;

/// The five simulated auction protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuctionKind {
    FirstPriceSealed,
    Vickrey,
    English,
    Dutch,
    Japanese,
}

impl AuctionKind {
    pub const ALL: [AuctionKind; 5] = [
        AuctionKind::FirstPriceSealed,
        AuctionKind::Vickrey,
        AuctionKind::English,
        AuctionKind::Dutch,
        AuctionKind::Japanese,
    ];

    /// Label used in exported records.
    pub fn label(&self) -> &'static str {
        match self {
            AuctionKind::FirstPriceSealed => "FirstPriceSealed",
            AuctionKind::Vickrey => "Vickrey",
            AuctionKind::English => "English",
            AuctionKind::Dutch => "Dutch",
            AuctionKind::Japanese => "Japanese",
        }
    }

    /// File stem for per-mechanism CSV exports.
    pub fn file_stem(&self) -> &'static str {
        match self {
            AuctionKind::FirstPriceSealed => "first_price_sealed",
            AuctionKind::Vickrey => "vickrey",
            AuctionKind::English => "english",
            AuctionKind::Dutch => "dutch",
            AuctionKind::Japanese => "japanese",
        }
    }
}

impl std::str::FromStr for AuctionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first-price" | "first_price" | "sealed" => Ok(AuctionKind::FirstPriceSealed),
            "vickrey" | "second-price" => Ok(AuctionKind::Vickrey),
            "english" => Ok(AuctionKind::English),
            "dutch" => Ok(AuctionKind::Dutch),
            "japanese" => Ok(AuctionKind::Japanese),
            other => Err(format!(
                "unknown auction type '{other}' (expected first-price, vickrey, english, dutch or japanese)"
            )),
        }
    }
}

impl std::fmt::Display for AuctionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl serde::Serialize for AuctionKind {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

/// Protocol driver over one exclusively-owned bidder population.
#[async_trait]
pub trait Mechanism: Send + Sync {
    fn kind(&self) -> AuctionKind;

    /// Drive the protocol to completion. Infallible: degenerate states
    /// resolve to [`AuctionOutcome::no_winner`].
    async fn run(&self, bidders: Vec<Bidder>) -> AuctionOutcome;
}

/// Instantiate a mechanism from validated configuration.
pub fn build(kind: AuctionKind, cfg: &MechanismConfig) -> Result<Box<dyn Mechanism>> {
    Ok(match kind {
        AuctionKind::FirstPriceSealed => Box::new(FirstPriceSealed::new()),
        AuctionKind::Vickrey => Box::new(Vickrey::new()),
        AuctionKind::English => Box::new(English::new(cfg.increment, cfg.max_rounds)?),
        AuctionKind::Dutch => Box::new(Dutch::new(cfg.start_price, cfg.decrement)?),
        AuctionKind::Japanese => Box::new(Japanese::new(
            cfg.japanese_start_price,
            cfg.increment,
            cfg.max_rounds,
        )?),
    })
}

/// Collect one sealed bid per bidder, strictly in population order.
pub(crate) async fn collect_bids(bidders: &[Bidder], ctx: &PhaseContext) -> Vec<f64> {
    let mut bids = Vec::with_capacity(bidders.len());
    for bidder in bidders {
        bids.push(bidder.sealed_bid(ctx).await);
    }
    bids
}

/// Index of the strictly highest bid; ties go to the first encountered.
/// This tie-break is a documented policy, stable under population order.
pub(crate) fn argmax_first(bids: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, bid) in bids.iter().enumerate() {
        match best {
            Some(b) if bids[b] >= *bid => {}
            _ => best = Some(i),
        }
    }
    best
}
