use std::sync::Arc;

use pond_core::{EngineConfig, MessageRecord, ScoreCard};

use crate::strategies::{self, TallyStrategy};

/// The ordered list of enabled tallies. Every tally sees the same original
/// log; the accumulator carries over from one to the next, additively, so
/// the order only fixes floating-point summation, not semantics.
pub struct StrategyPipeline {
    strategies: Vec<Arc<dyn TallyStrategy>>,
}

impl StrategyPipeline {
    pub fn new(strategies: Vec<Arc<dyn TallyStrategy>>) -> Self {
        Self { strategies }
    }

    /// Build the pipeline from a configured strategy list.
    pub fn from_config(config: &EngineConfig) -> Self {
        let strategies = config
            .strategies
            .iter()
            .map(|kind| strategies::build(*kind, &config.tunables))
            .collect();
        Self { strategies }
    }

    /// Apply every tally, in order, to the same log and card.
    pub fn run(&self, log: &[MessageRecord], card: &mut ScoreCard) {
        for strategy in &self.strategies {
            strategy.tally(log, card);
        }
    }

    /// Score a log into a fresh card.
    pub fn score(&self, log: &[MessageRecord]) -> ScoreCard {
        let mut card = ScoreCard::new();
        self.run(log, &mut card);
        card
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}
