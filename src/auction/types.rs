//! Outcome records produced by auction runs.

use serde::Serialize;

use crate::bidders::Bidder;

/// One bidder's last associated price in a run, in first-participation order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceEntry {
    pub bidder: String,
    pub price: f64,
}

/// Result of a single auction run.
///
/// When `winner` is `None` every numeric field is zero and the trace is
/// empty; construct through [`AuctionOutcome::no_winner`] to keep that
/// invariant in one place.
#[derive(Debug, Clone, Serialize)]
pub struct AuctionOutcome {
    pub winner: Option<String>,
    pub winning_bid: f64,
    pub winner_value: f64,
    pub utility: f64,
    pub is_reasoning: bool,
    pub bid_trace: Vec<TraceEntry>,
}

impl AuctionOutcome {
    pub fn no_winner() -> Self {
        Self {
            winner: None,
            winning_bid: 0.0,
            winner_value: 0.0,
            utility: 0.0,
            is_reasoning: false,
            bid_trace: Vec::new(),
        }
    }

    pub fn settled(winner: &Bidder, clearing_price: f64, bid_trace: Vec<TraceEntry>) -> Self {
        Self {
            winner: Some(winner.name().to_string()),
            winning_bid: clearing_price,
            winner_value: winner.value(),
            utility: winner.value() - clearing_price,
            is_reasoning: winner.is_reasoning(),
            bid_trace,
        }
    }

    pub fn has_winner(&self) -> bool {
        self.winner.is_some()
    }
}

/// Update a bidder's trace entry in place, preserving insertion order.
pub(crate) fn record_price(trace: &mut Vec<TraceEntry>, bidder: &str, price: f64) {
    if let Some(entry) = trace.iter_mut().find(|e| e.bidder == bidder) {
        entry.price = price;
    } else {
        trace.push(TraceEntry {
            bidder: bidder.to_string(),
            price,
        });
    }
}
