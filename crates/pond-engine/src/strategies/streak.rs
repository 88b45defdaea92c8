use pond_core::{Direction, MessageRecord, ScoreCard, Tunables};

use super::TallyStrategy;

/// Rewards sustained one-sided bursts. The streak counter increments with
/// every consecutive same-direction message and resets on a direction
/// change; each message earns `step * counter-before-increment`, so the
/// first message of a burst earns nothing.
pub struct StreakBonus {
    step: f64,
}

impl StreakBonus {
    pub fn new(tunables: &Tunables) -> Self {
        Self {
            step: tunables.streak_step,
        }
    }
}

impl TallyStrategy for StreakBonus {
    fn name(&self) -> &'static str {
        "streak_bonus"
    }

    fn tally(&self, log: &[MessageRecord], card: &mut ScoreCard) {
        let mut prev: Option<Direction> = None;
        let mut streak: u32 = 0;
        for msg in log {
            if prev != Some(msg.direction) {
                streak = 0;
            }
            card.credit(msg.direction, self.step * f64::from(streak));
            streak += 1;
            prev = Some(msg.direction);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pond_core::MessageKind;

    fn msg(direction: Direction, timestamp: i64) -> MessageRecord {
        MessageRecord {
            direction,
            timestamp,
            kind: MessageKind::Text,
            text: String::new(),
        }
    }

    fn strategy() -> StreakBonus {
        StreakBonus::new(&Tunables::default())
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn empty_log_is_a_noop() {
        let mut card = ScoreCard::new();
        strategy().tally(&[], &mut card);
        assert_eq!(card, ScoreCard::new());
    }

    #[test]
    fn run_of_k_earns_triangular_bonus() {
        // 0.1 * (0 + 1 + 2 + 3) = 0.6
        let log: Vec<_> = (0..4).map(|t| msg(Direction::Outgoing, t)).collect();
        let mut card = ScoreCard::new();
        strategy().tally(&log, &mut card);
        assert_close(card.outgoing, 0.6);
        assert_eq!(card.incoming, 0.0);
    }

    #[test]
    fn direction_change_resets_the_counter() {
        let log = vec![
            msg(Direction::Outgoing, 0),
            msg(Direction::Outgoing, 1), // 0.1
            msg(Direction::Incoming, 2), // reset, 0
            msg(Direction::Incoming, 3), // 0.1
            msg(Direction::Outgoing, 4), // reset, 0
        ];
        let mut card = ScoreCard::new();
        strategy().tally(&log, &mut card);
        assert_close(card.outgoing, 0.1);
        assert_close(card.incoming, 0.1);
    }

    #[test]
    fn single_message_earns_nothing() {
        let mut card = ScoreCard::new();
        strategy().tally(&[msg(Direction::Incoming, 0)], &mut card);
        assert_eq!(card, ScoreCard::new());
    }
}
