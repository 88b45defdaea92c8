use pond_core::{Direction, MessageRecord, ScoreCard, Tunables};

use super::TallyStrategy;

/// Flat bonus for starting a conversation rather than continuing one.
/// A message initiates when the previous message came from the same side
/// more than `same_side_gap` ago, or when the gap from the previous message
/// exceeds `cold_gap` regardless of side. The first record is compared
/// against a virtual previous timestamp of 0.
pub struct Initiator {
    bonus: f64,
    same_side_gap: i64,
    cold_gap: i64,
}

impl Initiator {
    pub fn new(tunables: &Tunables) -> Self {
        Self {
            bonus: tunables.initiation_bonus,
            same_side_gap: tunables.same_side_initiation_gap_secs,
            cold_gap: tunables.cold_initiation_gap_secs,
        }
    }
}

impl TallyStrategy for Initiator {
    fn name(&self) -> &'static str {
        "initiator"
    }

    fn tally(&self, log: &[MessageRecord], card: &mut ScoreCard) {
        let mut prev_ts: i64 = 0;
        let mut prev_dir: Option<Direction> = None;
        for msg in log {
            let gap = msg.timestamp - prev_ts;
            let rekindled = prev_dir == Some(msg.direction) && gap > self.same_side_gap;
            let cold_open = gap > self.cold_gap;
            if rekindled || cold_open {
                card.credit(msg.direction, self.bonus);
            }
            prev_ts = msg.timestamp;
            prev_dir = Some(msg.direction);
        }
    }
}
