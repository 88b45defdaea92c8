use pond_core::{MessageRecord, ScoreCard};

use super::TallyStrategy;

/// Baseline volume signal: every message is one point for its sender.
pub struct PingPong;

impl TallyStrategy for PingPong {
    fn name(&self) -> &'static str {
        "ping_pong"
    }

    fn tally(&self, log: &[MessageRecord], card: &mut ScoreCard) {
        for msg in log {
            card.credit(msg.direction, 1.0);
        }
    }
}
