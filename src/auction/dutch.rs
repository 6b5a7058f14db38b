//! Dutch (descending clock) auction.

use async_trait::async_trait;

use crate::auction::types::{AuctionOutcome, TraceEntry};
use crate::auction::{AuctionKind, Mechanism};
use crate::bidders::Bidder;
use crate::error::{GavelError, Result};

/// Descending clock over the arithmetic sequence
/// `start_price, start_price - decrement, ...` while positive.
///
/// At each level bidders are scanned in population order and the first
/// whose value meets the price wins immediately; scan order is the
/// declared tie-break policy. The clock is not a query point: acceptance
/// is value-based for every bidder kind.
#[derive(Debug)]
pub struct Dutch {
    start_price: f64,
    decrement: f64,
}

impl Dutch {
    pub fn new(start_price: f64, decrement: f64) -> Result<Self> {
        if !(start_price >= 0.0 && start_price.is_finite()) {
            return Err(GavelError::InvalidMechanismParam {
                param: "start_price",
                value: start_price,
            });
        }
        if !(decrement > 0.0 && decrement.is_finite()) {
            return Err(GavelError::InvalidMechanismParam {
                param: "decrement",
                value: decrement,
            });
        }
        Ok(Self {
            start_price,
            decrement,
        })
    }
}

#[async_trait]
impl Mechanism for Dutch {
    fn kind(&self) -> AuctionKind {
        AuctionKind::Dutch
    }

    async fn run(&self, bidders: Vec<Bidder>) -> AuctionOutcome {
        let mut step = 0u64;
        loop {
            // Walk the exact arithmetic sequence instead of accumulating
            // subtractions, so exported prices stay on the grid.
            let price = self.start_price - (step as f64) * self.decrement;
            if price <= 0.0 {
                return AuctionOutcome::no_winner();
            }

            for bidder in &bidders {
                if bidder.value() >= price {
                    let trace = vec![TraceEntry {
                        bidder: bidder.name().to_string(),
                        price,
                    }];
                    return AuctionOutcome::settled(bidder, price, trace);
                }
            }

            step += 1;
        }
    }
}
