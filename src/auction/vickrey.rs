//! Vickrey (second-price sealed-bid) auction.

use async_trait::async_trait;

use crate::auction::types::{AuctionOutcome, TraceEntry};
use crate::auction::{argmax_first, collect_bids, AuctionKind, Mechanism};
use crate::bidders::{Bidder, PhaseContext};

/// Single simultaneous round; the highest bidder wins but pays the
/// second-highest submitted bid. A lone bidder has no second price and
/// clears at 0 by policy.
#[derive(Debug, Default)]
pub struct Vickrey;

impl Vickrey {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Mechanism for Vickrey {
    fn kind(&self) -> AuctionKind {
        AuctionKind::Vickrey
    }

    async fn run(&self, bidders: Vec<Bidder>) -> AuctionOutcome {
        let ctx = PhaseContext::sealed(self.kind());
        let bids = collect_bids(&bidders, &ctx).await;

        let Some(winner_idx) = argmax_first(&bids) else {
            return AuctionOutcome::no_winner();
        };

        let trace: Vec<TraceEntry> = bidders
            .iter()
            .zip(&bids)
            .map(|(bidder, &bid)| TraceEntry {
                bidder: bidder.name().to_string(),
                price: bid,
            })
            .collect();

        let second_price = bids
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != winner_idx)
            .map(|(_, &bid)| bid)
            .fold(None::<f64>, |acc, bid| {
                Some(acc.map_or(bid, |best| best.max(bid)))
            })
            .unwrap_or(0.0);

        AuctionOutcome::settled(&bidders[winner_idx], second_price, trace)
    }
}
