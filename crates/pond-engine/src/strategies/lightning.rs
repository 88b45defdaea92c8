use pond_core::{MessageRecord, ScoreCard, Tunables};

use super::TallyStrategy;

/// A near-instant reply signals attention. A direction flip within the
/// window earns `(window - gap) / (2 * window)`, so the bonus approaches
/// 0.5 at gap 0 and fades to 0 at the window edge.
pub struct LightningReply {
    window: i64,
}

impl LightningReply {
    pub fn new(tunables: &Tunables) -> Self {
        Self {
            window: tunables.lightning_window_secs,
        }
    }
}

impl TallyStrategy for LightningReply {
    fn name(&self) -> &'static str {
        "lightning_reply"
    }

    fn tally(&self, log: &[MessageRecord], card: &mut ScoreCard) {
        for pair in log.windows(2) {
            let (prev, msg) = (&pair[0], &pair[1]);
            if msg.direction == prev.direction {
                continue;
            }
            let gap = msg.timestamp - prev.timestamp;
            if (0..=self.window).contains(&gap) {
                let bonus = (self.window - gap) as f64 / (2 * self.window) as f64;
                card.credit(msg.direction, bonus);
            }
        }
    }
}
