use pond_core::{MessageKind, MessageRecord, ScoreCard, Tunables};

use super::TallyStrategy;

/// Voice messages take more effort than text; each one earns a flat bonus
/// on top of its ping-pong point.
pub struct VoiceNote {
    bonus: f64,
}

impl VoiceNote {
    pub fn new(tunables: &Tunables) -> Self {
        Self {
            bonus: tunables.voice_bonus,
        }
    }
}

impl TallyStrategy for VoiceNote {
    fn name(&self) -> &'static str {
        "voice_note"
    }

    fn tally(&self, log: &[MessageRecord], card: &mut ScoreCard) {
        for msg in log {
            if msg.kind == MessageKind::Voice {
                card.credit(msg.direction, self.bonus);
            }
        }
    }
}
