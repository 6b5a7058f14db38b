//! Bidder population: deterministic strategies and reasoning agents.
//!
//! A bidder is a private valuation plus a strategy. Deterministic strategies
//! (truthful, risk-shaded) resolve locally; the reasoning strategy delegates
//! to the decision service and falls back to a deterministic rule whenever
//! the query fails, so a flaky service can never stall or abort an auction.

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::auction::AuctionKind;
use crate::decision::{fallback_bid, DecisionQuery};
use crate::error::{GavelError, Result};

/// Bidding strategy, fixed at construction.
#[derive(Clone)]
pub enum Strategy {
    /// Bid the private value unchanged.
    Truthful,
    /// Bid `value * risk_factor` in sealed-bid protocols. Shading does not
    /// alter continue/drop decisions in round-based protocols.
    RiskShaded { risk_factor: f64 },
    /// Delegate every decision to the external reasoning service.
    Reasoning { query: Arc<dyn DecisionQuery> },
}

impl Strategy {
    /// Parse a deterministic strategy label from configuration.
    ///
    /// Reasoning seats are assigned by the trial runner, not by label, so
    /// only deterministic labels are accepted here. Anything else is a
    /// fatal configuration error.
    pub fn parse(label: &str, risk_factor: f64) -> Result<Self> {
        match label {
            "truthful" => Ok(Strategy::Truthful),
            "shade" | "risk-shaded" => Ok(Strategy::RiskShaded { risk_factor }),
            other => Err(GavelError::UnknownStrategy(other.to_string())),
        }
    }
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Truthful => write!(f, "Truthful"),
            Strategy::RiskShaded { risk_factor } => f
                .debug_struct("RiskShaded")
                .field("risk_factor", risk_factor)
                .finish(),
            Strategy::Reasoning { .. } => write!(f, "Reasoning"),
        }
    }
}

/// Auction phase handed to a bidder when a decision is requested.
#[derive(Debug, Clone, Copy)]
pub struct PhaseContext {
    pub auction: AuctionKind,
    pub current_price: Option<f64>,
}

impl PhaseContext {
    pub fn sealed(auction: AuctionKind) -> Self {
        Self {
            auction,
            current_price: None,
        }
    }

    pub fn at_price(auction: AuctionKind, price: f64) -> Self {
        Self {
            auction,
            current_price: Some(price),
        }
    }

    /// Situational prompt text for reasoning-agent queries.
    pub fn describe(&self) -> String {
        match self.auction {
            AuctionKind::FirstPriceSealed => {
                "This is a first-price sealed-bid auction. \
                 Submit a single bid without knowing the others."
                    .to_string()
            }
            AuctionKind::Vickrey => {
                "This is a second-price sealed-bid (Vickrey) auction. The winner \
                 pays the second-highest bid. Submit a single bid without knowing \
                 the others."
                    .to_string()
            }
            AuctionKind::English => "This is an English auction. Bid increases each round.".to_string(),
            AuctionKind::Dutch => {
                "This is a Dutch auction. The price decreases until a bidder accepts.".to_string()
            }
            AuctionKind::Japanese => {
                "This is a Japanese auction. The price increases each round, and \
                 bidders drop out if they don't accept the current price."
                    .to_string()
            }
        }
    }
}

/// One participant in a single auction run. No cross-trial state.
#[derive(Debug, Clone)]
pub struct Bidder {
    name: String,
    value: f64,
    strategy: Strategy,
}

impl Bidder {
    pub fn new(name: impl Into<String>, value: f64, strategy: Strategy) -> Result<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(GavelError::InvalidConfig(format!(
                "private value must be a non-negative number, got {value}"
            )));
        }
        if let Strategy::RiskShaded { risk_factor } = strategy {
            if !(risk_factor > 0.0 && risk_factor <= 1.0) {
                return Err(GavelError::InvalidConfig(format!(
                    "risk_factor must be in (0, 1], got {risk_factor}"
                )));
            }
        }
        Ok(Self {
            name: name.into(),
            value,
            strategy,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_reasoning(&self) -> bool {
        matches!(self.strategy, Strategy::Reasoning { .. })
    }

    /// Produce the single sealed bid for simultaneous-submission protocols.
    pub async fn sealed_bid(&self, ctx: &PhaseContext) -> f64 {
        match &self.strategy {
            Strategy::Truthful => self.value,
            Strategy::RiskShaded { risk_factor } => self.value * risk_factor,
            Strategy::Reasoning { query } => {
                match query.query_bid(self.value, &ctx.describe()).await {
                    Ok(bid) => bid,
                    Err(err) => {
                        warn!(
                            bidder = %self.name,
                            error = %err,
                            "bid query failed, applying shaded fallback"
                        );
                        fallback_bid(self.value)
                    }
                }
            }
        }
    }

    /// Continue/drop signal for ascending protocols, evaluated against the
    /// price the bidder would commit to pay.
    pub async fn meets_price(&self, price: f64, ctx: &PhaseContext) -> bool {
        match &self.strategy {
            Strategy::Truthful | Strategy::RiskShaded { .. } => self.value >= price,
            Strategy::Reasoning { query } => {
                match query.query_continue(self.value, price, &ctx.describe()).await {
                    Ok(stay) => stay,
                    Err(err) => {
                        warn!(
                            bidder = %self.name,
                            price,
                            error = %err,
                            "continue query failed, applying solvency fallback"
                        );
                        self.value >= price
                    }
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted decision-query stubs shared by unit and mechanism tests.

    use async_trait::async_trait;
    use std::sync::Arc;

    use crate::decision::DecisionQuery;
    use crate::error::QueryError;

    /// Always answers with a fixed bid and stays below a price ceiling.
    pub struct Scripted {
        pub bid: f64,
        pub stay_below: f64,
    }

    #[async_trait]
    impl DecisionQuery for Scripted {
        async fn query_bid(&self, _value: f64, _context: &str) -> Result<f64, QueryError> {
            Ok(self.bid)
        }

        async fn query_continue(
            &self,
            _value: f64,
            current_price: f64,
            _context: &str,
        ) -> Result<bool, QueryError> {
            Ok(current_price < self.stay_below)
        }
    }

    /// Every query fails, forcing the deterministic fallbacks.
    pub struct Unreachable;

    #[async_trait]
    impl DecisionQuery for Unreachable {
        async fn query_bid(&self, _value: f64, _context: &str) -> Result<f64, QueryError> {
            Err(QueryError::Transport("connection refused".to_string()))
        }

        async fn query_continue(
            &self,
            _value: f64,
            _current_price: f64,
            _context: &str,
        ) -> Result<bool, QueryError> {
            Err(QueryError::Transport("connection refused".to_string()))
        }
    }

    pub fn scripted(bid: f64, stay_below: f64) -> Arc<dyn DecisionQuery> {
        Arc::new(Scripted { bid, stay_below })
    }

    pub fn unreachable() -> Arc<dyn DecisionQuery> {
        Arc::new(Unreachable)
    }
}
