//! First-price sealed-bid auction.

use async_trait::async_trait;

use crate::auction::types::{AuctionOutcome, TraceEntry};
use crate::auction::{argmax_first, collect_bids, AuctionKind, Mechanism};
use crate::bidders::{Bidder, PhaseContext};

/// Single simultaneous round; the highest bidder wins and pays their bid.
#[derive(Debug, Default)]
pub struct FirstPriceSealed;

impl FirstPriceSealed {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Mechanism for FirstPriceSealed {
    fn kind(&self) -> AuctionKind {
        AuctionKind::FirstPriceSealed
    }

    async fn run(&self, bidders: Vec<Bidder>) -> AuctionOutcome {
        let ctx = PhaseContext::sealed(self.kind());
        let bids = collect_bids(&bidders, &ctx).await;

        let Some(winner_idx) = argmax_first(&bids) else {
            return AuctionOutcome::no_winner();
        };

        let trace = bidders
            .iter()
            .zip(&bids)
            .map(|(bidder, &bid)| TraceEntry {
                bidder: bidder.name().to_string(),
                price: bid,
            })
            .collect();

        AuctionOutcome::settled(&bidders[winner_idx], bids[winner_idx], trace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bidders::testing::{scripted, unreachable};
    use crate::bidders::Strategy;

    fn truthful(values: &[f64]) -> Vec<Bidder> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| Bidder::new(format!("agent_{i}"), v, Strategy::Truthful).unwrap())
            .collect()
    }

    #[test]
    fn test_truthful_population_highest_value_wins_at_own_bid() {
        let outcome = tokio_test::block_on(
            FirstPriceSealed::new().run(truthful(&[60.0, 70.0, 80.0, 90.0, 100.0])),
        );
        assert_eq!(outcome.winner.as_deref(), Some("agent_4"));
        assert_eq!(outcome.winning_bid, 100.0);
        assert_eq!(outcome.utility, 0.0);
        assert_eq!(outcome.bid_trace.len(), 5);
    }

    #[test]
    fn test_tie_broken_by_population_order() {
        let outcome = tokio_test::block_on(
            FirstPriceSealed::new().run(truthful(&[80.0, 80.0, 50.0])),
        );
        assert_eq!(outcome.winner.as_deref(), Some("agent_0"));
    }

    #[test]
    fn test_shaded_winner_keeps_positive_utility() {
        let bidders = vec![
            Bidder::new("agent_0", 100.0, Strategy::RiskShaded { risk_factor: 0.8 }).unwrap(),
            Bidder::new("agent_1", 90.0, Strategy::Truthful).unwrap(),
        ];
        let outcome = tokio_test::block_on(FirstPriceSealed::new().run(bidders));
        // Shaded bid of 80 loses to the truthful 90
        assert_eq!(outcome.winner.as_deref(), Some("agent_1"));
        assert_eq!(outcome.winning_bid, 90.0);
        assert!(outcome.utility >= 0.0);
    }

    #[test]
    fn test_empty_population_has_no_winner() {
        let outcome = tokio_test::block_on(FirstPriceSealed::new().run(Vec::new()));
        assert!(!outcome.has_winner());
        assert_eq!(outcome.winning_bid, 0.0);
        assert_eq!(outcome.utility, 0.0);
        assert!(outcome.bid_trace.is_empty());
    }

    #[test]
    fn test_reasoning_bidder_can_win_with_service_bid() {
        let mut bidders = truthful(&[60.0, 70.0]);
        bidders.push(
            Bidder::new(
                "agent_2",
                95.0,
                Strategy::Reasoning {
                    query: scripted(88.0, 0.0),
                },
            )
            .unwrap(),
        );
        let outcome = tokio_test::block_on(FirstPriceSealed::new().run(bidders));
        assert_eq!(outcome.winner.as_deref(), Some("agent_2"));
        assert_eq!(outcome.winning_bid, 88.0);
        assert!(outcome.is_reasoning);
    }

    #[test]
    fn test_unreachable_service_falls_back_to_shaded_bid() {
        let bidders = vec![
            Bidder::new(
                "agent_0",
                100.0,
                Strategy::Reasoning {
                    query: unreachable(),
                },
            )
            .unwrap(),
            Bidder::new("agent_1", 70.0, Strategy::Truthful).unwrap(),
        ];
        let outcome = tokio_test::block_on(FirstPriceSealed::new().run(bidders));
        // Fallback bid is 100 * 0.8 = 80
        assert_eq!(outcome.winner.as_deref(), Some("agent_0"));
        assert_eq!(outcome.winning_bid, 80.0);
    }
}
