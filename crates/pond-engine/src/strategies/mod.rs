mod initiator;
mod lightning;
mod ping_pong;
mod repeats;
mod snail;
mod streak;
mod voice;

pub use initiator::Initiator;
pub use lightning::LightningReply;
pub use ping_pong::PingPong;
pub use repeats::RepeatEmphasis;
pub use snail::SnailReply;
pub use streak::StreakBonus;
pub use voice::VoiceNote;

use std::sync::Arc;

use pond_core::{MessageRecord, ScoreCard, StrategyKind, Tunables};

/// One independent tally heuristic. A tally reads the whole ordered log in
/// one pass and credits the accumulator additively; it never removes or
/// reorders entries, and any scratch state lives inside a single `tally`
/// call so nothing leaks across partners.
pub trait TallyStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn tally(&self, log: &[MessageRecord], card: &mut ScoreCard);
}

/// Instantiate the tally for a configured kind, thresholds applied.
pub fn build(kind: StrategyKind, tunables: &Tunables) -> Arc<dyn TallyStrategy> {
    match kind {
        StrategyKind::PingPong => Arc::new(PingPong),
        StrategyKind::StreakBonus => Arc::new(StreakBonus::new(tunables)),
        StrategyKind::Initiator => Arc::new(Initiator::new(tunables)),
        StrategyKind::VoiceNote => Arc::new(VoiceNote::new(tunables)),
        StrategyKind::RepeatEmphasis => Arc::new(RepeatEmphasis::new(tunables)),
        StrategyKind::LightningReply => Arc::new(LightningReply::new(tunables)),
        StrategyKind::SnailReply => Arc::new(SnailReply::new(tunables)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_covers_every_kind() {
        let tunables = Tunables::default();
        let names: Vec<&str> = StrategyKind::all()
            .into_iter()
            .map(|k| build(k, &tunables).name())
            .collect();
        assert_eq!(
            names,
            vec![
                "ping_pong",
                "streak_bonus",
                "initiator",
                "voice_note",
                "repeat_emphasis",
                "lightning_reply",
                "snail_reply",
            ]
        );
    }
}
