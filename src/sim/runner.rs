//! Randomized trial runner.
//!
//! Each trial builds an independent population with freshly sampled private
//! values, hands it to a new mechanism run and collects the outcome. The
//! RNG is injected so a fixed seed reproduces an experiment exactly.

use rand::rngs::StdRng;
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::auction::{self, AuctionKind};
use crate::bidders::{Bidder, Strategy};
use crate::config::{MechanismConfig, SimulationConfig};
use crate::decision::DecisionQuery;
use crate::error::{GavelError, Result};
use crate::sim::TrialRecord;

/// Deterministic seats keep the strategy the original experiment assigned
/// them: truthful where shading has no edge (the Dutch clock and the
/// truthful-dominant Vickrey auction), risk-shaded elsewhere.
fn deterministic_strategy_for(kind: AuctionKind, risk_factor: f64) -> Strategy {
    match kind {
        AuctionKind::Dutch | AuctionKind::Vickrey => Strategy::Truthful,
        _ => Strategy::RiskShaded { risk_factor },
    }
}

pub struct TrialRunner {
    sim: SimulationConfig,
    mechanism: MechanismConfig,
    query: Option<Arc<dyn DecisionQuery>>,
    rng: StdRng,
}

impl TrialRunner {
    /// Fails fast when reasoning seats are requested without a decision
    /// service to back them.
    pub fn new(
        sim: SimulationConfig,
        mechanism: MechanismConfig,
        query: Option<Arc<dyn DecisionQuery>>,
        rng: StdRng,
    ) -> Result<Self> {
        if sim.reasoning_per_trial > 0 && query.is_none() {
            return Err(GavelError::InvalidConfig(
                "reasoning seats configured but no decision service client supplied".to_string(),
            ));
        }
        if sim.reasoning_per_trial > sim.bidders {
            return Err(GavelError::InvalidConfig(format!(
                "reasoning seats ({}) exceed population size ({})",
                sim.reasoning_per_trial, sim.bidders
            )));
        }
        Ok(Self {
            sim,
            mechanism,
            query,
            rng,
        })
    }

    /// Run the configured number of trials of one auction type.
    pub async fn run(&mut self, kind: AuctionKind) -> Result<Vec<TrialRecord>> {
        let mechanism = auction::build(kind, &self.mechanism)?;
        let mut records = Vec::with_capacity(self.sim.trials);

        info!(auction = %kind, trials = self.sim.trials, "starting trials");
        for trial in 0..self.sim.trials {
            let bidders = self.build_population(kind)?;
            let outcome = mechanism.run(bidders).await;
            debug!(
                auction = %kind,
                trial,
                winner = outcome.winner.as_deref().unwrap_or("-"),
                price = outcome.winning_bid,
                "trial finished"
            );
            records.push(TrialRecord {
                trial,
                auction: kind,
                outcome,
            });
        }

        let cleared = records.iter().filter(|r| r.outcome.has_winner()).count();
        info!(
            auction = %kind,
            cleared,
            failed = records.len() - cleared,
            "trials finished"
        );
        Ok(records)
    }

    /// Fresh population for one trial: values sampled uniformly, reasoning
    /// seats drawn by index sample, the rest on the mechanism's default
    /// deterministic strategy.
    fn build_population(&mut self, kind: AuctionKind) -> Result<Vec<Bidder>> {
        let n = self.sim.bidders;
        let reasoning_seats: HashSet<usize> =
            rand::seq::index::sample(&mut self.rng, n, self.sim.reasoning_per_trial)
                .into_iter()
                .collect();

        let mut bidders = Vec::with_capacity(n);
        for i in 0..n {
            let value = if self.sim.value_max > self.sim.value_min {
                self.rng.gen_range(self.sim.value_min..self.sim.value_max)
            } else {
                self.sim.value_min
            };

            let strategy = if reasoning_seats.contains(&i) {
                // Checked in new(): reasoning seats imply a client.
                let query = self.query.clone().ok_or_else(|| {
                    GavelError::InvalidConfig("decision service client missing".to_string())
                })?;
                Strategy::Reasoning { query }
            } else if let Some(label) = &self.sim.strategy {
                Strategy::parse(label, self.sim.risk_factor)?
            } else {
                deterministic_strategy_for(kind, self.sim.risk_factor)
            };

            bidders.push(Bidder::new(format!("agent_{i}"), value, strategy)?);
        }
        Ok(bidders)
    }
}
