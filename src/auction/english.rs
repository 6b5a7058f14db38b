//! English (ascending open-outcry) auction.

use async_trait::async_trait;
use tracing::warn;

use crate::auction::types::{record_price, AuctionOutcome, TraceEntry};
use crate::auction::{AuctionKind, Mechanism};
use crate::bidders::{Bidder, PhaseContext};
use crate::error::{GavelError, Result};

/// Round-based ascending auction.
///
/// Every round the full population is polled against the prospective next
/// price (`current + increment`). While at least one bidder accepts, the
/// price advances and the acceptor set is recorded. At termination the
/// highest-value acceptor of the final non-empty round wins, paying the
/// standing price. Ties on value go to the first bidder in population
/// order.
#[derive(Debug)]
pub struct English {
    increment: f64,
    max_rounds: u32,
}

impl English {
    pub fn new(increment: f64, max_rounds: u32) -> Result<Self> {
        if !(increment > 0.0 && increment.is_finite()) {
            return Err(GavelError::InvalidMechanismParam {
                param: "increment",
                value: increment,
            });
        }
        Ok(Self {
            increment,
            max_rounds,
        })
    }
}

#[async_trait]
impl Mechanism for English {
    fn kind(&self) -> AuctionKind {
        AuctionKind::English
    }

    async fn run(&self, bidders: Vec<Bidder>) -> AuctionOutcome {
        let mut current_price = 0.0;
        let mut trace: Vec<TraceEntry> = Vec::new();
        // Acceptors of the last round that had any, in population order.
        let mut standing: Vec<usize> = Vec::new();
        let mut rounds = 0u32;

        loop {
            if rounds >= self.max_rounds {
                warn!(
                    rounds,
                    current_price, "round cap reached, resolving from standing acceptors"
                );
                break;
            }
            rounds += 1;

            let prospective = current_price + self.increment;
            let ctx = PhaseContext::at_price(self.kind(), prospective);

            let mut acceptors = Vec::new();
            for (i, bidder) in bidders.iter().enumerate() {
                if bidder.meets_price(prospective, &ctx).await {
                    acceptors.push(i);
                }
            }

            if acceptors.is_empty() {
                break;
            }

            current_price = prospective;
            for &i in &acceptors {
                record_price(&mut trace, bidders[i].name(), current_price);
            }
            standing = acceptors;
        }

        let Some(&first) = standing.first() else {
            return AuctionOutcome::no_winner();
        };

        let mut winner_idx = first;
        for &i in &standing[1..] {
            if bidders[i].value() > bidders[winner_idx].value() {
                winner_idx = i;
            }
        }

        AuctionOutcome::settled(&bidders[winner_idx], current_price, trace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bidders::testing::scripted;
    use crate::bidders::Strategy;

    fn truthful(values: &[f64]) -> Vec<Bidder> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| Bidder::new(format!("agent_{i}"), v, Strategy::Truthful).unwrap())
            .collect()
    }

    fn mech() -> English {
        English::new(1.0, 10_000).unwrap()
    }

    #[test]
    fn test_highest_value_bidder_wins_at_own_valuation() {
        let outcome = tokio_test::block_on(mech().run(truthful(&[60.0, 70.0, 80.0, 90.0, 100.0])));
        assert_eq!(outcome.winner.as_deref(), Some("agent_4"));
        assert_eq!(outcome.winning_bid, 100.0);
        assert_eq!(outcome.utility, 0.0);
    }

    #[test]
    fn test_winner_is_solvent() {
        let outcome = tokio_test::block_on(mech().run(truthful(&[61.3, 77.9, 92.4])));
        assert!(outcome.winner_value >= outcome.winning_bid);
    }

    #[test]
    fn test_terminates_within_price_bound() {
        // Rounds are bounded by ceil(max_value / increment) + 1; the final
        // price can never exceed max_value for deterministic bidders.
        let outcome = tokio_test::block_on(mech().run(truthful(&[3.0, 7.0])));
        assert_eq!(outcome.winner.as_deref(), Some("agent_1"));
        assert!(outcome.winning_bid <= 7.0);
    }

    #[test]
    fn test_nobody_meets_opening_price() {
        let outcome = tokio_test::block_on(mech().run(truthful(&[0.0, 0.5])));
        assert!(!outcome.has_winner());
    }

    #[test]
    fn test_empty_population_has_no_winner() {
        let outcome = tokio_test::block_on(mech().run(Vec::new()));
        assert!(!outcome.has_winner());
        assert!(outcome.bid_trace.is_empty());
    }

    #[test]
    fn test_round_cap_stops_agreeable_reasoning_bidders() {
        // Two reasoning bidders that never drop out would loop forever
        // without the cap.
        let bidders = vec![
            Bidder::new(
                "agent_0",
                50.0,
                Strategy::Reasoning {
                    query: scripted(50.0, f64::INFINITY),
                },
            )
            .unwrap(),
            Bidder::new(
                "agent_1",
                60.0,
                Strategy::Reasoning {
                    query: scripted(60.0, f64::INFINITY),
                },
            )
            .unwrap(),
        ];
        let capped = English::new(1.0, 25).unwrap();
        let outcome = tokio_test::block_on(capped.run(bidders));
        assert!(outcome.has_winner());
        assert_eq!(outcome.winning_bid, 25.0);
    }

    #[test]
    fn test_trace_holds_last_accepted_price_per_bidder() {
        let outcome = tokio_test::block_on(mech().run(truthful(&[2.0, 4.0])));
        assert_eq!(outcome.bid_trace.len(), 2);
        let low = outcome.bid_trace.iter().find(|e| e.bidder == "agent_0").unwrap();
        let high = outcome.bid_trace.iter().find(|e| e.bidder == "agent_1").unwrap();
        assert_eq!(low.price, 2.0);
        assert_eq!(high.price, 4.0);
    }

    #[test]
    fn test_rejects_non_positive_increment() {
        assert!(English::new(0.0, 100).is_err());
        assert!(English::new(-1.0, 100).is_err());
    }
}
