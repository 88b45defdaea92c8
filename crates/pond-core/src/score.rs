use serde::{Deserialize, Serialize};

use crate::record::Direction;

/// Accumulated affinity values for one partner, one side each.
/// Mutated additively by every tally in the pipeline; never reset between
/// tallies, discarded at the end of a reporting cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub outgoing: f64,
    pub incoming: f64,
}

impl ScoreCard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` (may be negative) to the given side.
    pub fn credit(&mut self, direction: Direction, amount: f64) {
        match direction {
            Direction::Outgoing => self.outgoing += amount,
            Direction::Incoming => self.incoming += amount,
        }
    }

    pub fn side(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Outgoing => self.outgoing,
            Direction::Incoming => self.incoming,
        }
    }

    pub fn total(&self) -> f64 {
        self.outgoing + self.incoming
    }

    /// Percentage shares `(outgoing, incoming)`, or `None` when the sum is
    /// zero and the ratio is undefined.
    pub fn shares(&self) -> Option<(f64, f64)> {
        let total = self.total();
        if total == 0.0 {
            return None;
        }
        Some((
            self.outgoing / total * 100.0,
            self.incoming / total * 100.0,
        ))
    }
}
