use pond_core::{MessageRecord, ScoreCard, Tunables};

use super::TallyStrategy;

/// A long-delayed reply signals waning interest. A direction flip at or
/// beyond the threshold deducts `step * (gap / threshold)` from the
/// replying side, capped per message.
pub struct SnailReply {
    step: f64,
    threshold: i64,
    cap: f64,
}

impl SnailReply {
    pub fn new(tunables: &Tunables) -> Self {
        Self {
            step: tunables.snail_step,
            threshold: tunables.snail_threshold_secs,
            cap: tunables.snail_cap,
        }
    }
}

impl TallyStrategy for SnailReply {
    fn name(&self) -> &'static str {
        "snail_reply"
    }

    fn tally(&self, log: &[MessageRecord], card: &mut ScoreCard) {
        for pair in log.windows(2) {
            let (prev, msg) = (&pair[0], &pair[1]);
            if msg.direction == prev.direction {
                continue;
            }
            let gap = msg.timestamp - prev.timestamp;
            if gap >= self.threshold {
                let penalty = (self.step * gap as f64 / self.threshold as f64).min(self.cap);
                card.credit(msg.direction, -penalty);
            }
        }
    }
}
