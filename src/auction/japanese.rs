//! Japanese (ascending, simultaneous drop-out) auction.

use async_trait::async_trait;
use tracing::warn;

use crate::auction::types::{record_price, AuctionOutcome, TraceEntry};
use crate::auction::{AuctionKind, Mechanism};
use crate::bidders::{Bidder, PhaseContext};
use crate::error::{GavelError, Result};

/// Symmetric ascending auction: every remaining bidder is polled against
/// the *current* price each round, stayers are retained, then the price
/// increments.
///
/// The run ends when the field shrinks to one (that bidder wins at the
/// price of the shrinking round, which they just accepted) or to zero
/// simultaneously, which is a no-winner failure. A population of one wins
/// at the start price without being polled.
#[derive(Debug)]
pub struct Japanese {
    start_price: f64,
    increment: f64,
    max_rounds: u32,
}

impl Japanese {
    pub fn new(start_price: f64, increment: f64, max_rounds: u32) -> Result<Self> {
        if !(start_price >= 0.0 && start_price.is_finite()) {
            return Err(GavelError::InvalidMechanismParam {
                param: "start_price",
                value: start_price,
            });
        }
        if !(increment > 0.0 && increment.is_finite()) {
            return Err(GavelError::InvalidMechanismParam {
                param: "increment",
                value: increment,
            });
        }
        Ok(Self {
            start_price,
            increment,
            max_rounds,
        })
    }
}

#[async_trait]
impl Mechanism for Japanese {
    fn kind(&self) -> AuctionKind {
        AuctionKind::Japanese
    }

    async fn run(&self, bidders: Vec<Bidder>) -> AuctionOutcome {
        if bidders.is_empty() {
            return AuctionOutcome::no_winner();
        }
        if bidders.len() == 1 {
            return AuctionOutcome::settled(&bidders[0], self.start_price, Vec::new());
        }

        let mut remaining: Vec<usize> = (0..bidders.len()).collect();
        let mut price = self.start_price;
        let mut last_accepted: Option<f64> = None;
        let mut trace: Vec<TraceEntry> = Vec::new();
        let mut rounds = 0u32;

        loop {
            if rounds >= self.max_rounds {
                warn!(rounds, price, "round cap reached, resolving from survivors");
                break;
            }
            rounds += 1;

            let ctx = PhaseContext::at_price(self.kind(), price);
            let mut stayers = Vec::new();
            for &i in &remaining {
                if bidders[i].meets_price(price, &ctx).await {
                    stayers.push(i);
                    record_price(&mut trace, bidders[i].name(), price);
                }
            }

            if stayers.is_empty() {
                // Everyone left simultaneously: the auction fails to clear.
                return AuctionOutcome::no_winner();
            }
            if stayers.len() == 1 {
                return AuctionOutcome::settled(&bidders[stayers[0]], price, trace);
            }

            remaining = stayers;
            last_accepted = Some(price);
            price += self.increment;
        }

        // Round cap: award the highest-value survivor at the last price the
        // field accepted; ties go to population order.
        let Some(price) = last_accepted else {
            return AuctionOutcome::no_winner();
        };
        let mut winner_idx = remaining[0];
        for &i in &remaining[1..] {
            if bidders[i].value() > bidders[winner_idx].value() {
                winner_idx = i;
            }
        }
        AuctionOutcome::settled(&bidders[winner_idx], price, trace)
    }
}
