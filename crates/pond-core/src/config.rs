use serde::{Deserialize, Serialize};

/// Identifier for one tally heuristic. The enabled set and its order are
/// configuration, not code: the pipeline is built from this list.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    PingPong,
    StreakBonus,
    Initiator,
    VoiceNote,
    RepeatEmphasis,
    LightningReply,
    SnailReply,
}

impl StrategyKind {
    /// Every known tally, in the declared pipeline order.
    pub fn all() -> Vec<StrategyKind> {
        vec![
            Self::PingPong,
            Self::StreakBonus,
            Self::Initiator,
            Self::VoiceNote,
            Self::RepeatEmphasis,
            Self::LightningReply,
            Self::SnailReply,
        ]
    }
}

/// Heuristic thresholds and weights. The defaults are the reference values
/// the tests pin; none of them is load-bearing beyond that, so deployments
/// may override any of them.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    /// Bonus per position inside a same-direction streak.
    pub streak_step: f64,
    /// Flat bonus for a judged conversation initiation.
    pub initiation_bonus: f64,
    /// Same-direction gap beyond which a message counts as an initiation.
    pub same_side_initiation_gap_secs: i64,
    /// Any-direction gap beyond which a message counts as an initiation.
    pub cold_initiation_gap_secs: i64,
    /// Flat bonus per voice message.
    pub voice_bonus: f64,
    /// Bonus per repeated character beyond the qualifying run length.
    pub repeat_step: f64,
    /// Minimum run length before repetition counts as emphasis.
    pub min_repeat_run: usize,
    /// Characters whose runs never count (whitespace is always excluded).
    pub repeat_excluded: String,
    /// Reply gap at or under which a direction flip earns a lightning bonus.
    pub lightning_window_secs: i64,
    /// Weight of the snail penalty per multiple of the threshold gap.
    pub snail_step: f64,
    /// Reply gap at or over which a direction flip is penalized.
    pub snail_threshold_secs: i64,
    /// Upper bound on a single snail penalty.
    pub snail_cap: f64,
    /// Raw-value difference that triggers an imbalance notification.
    pub balance_margin: f64,
    /// Default partner count for top-N reports.
    pub report_top_n: usize,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            streak_step: 0.1,
            initiation_bonus: 2.0,
            same_side_initiation_gap_secs: 30 * 60,
            cold_initiation_gap_secs: 24 * 60 * 60,
            voice_bonus: 1.0,
            repeat_step: 0.1,
            min_repeat_run: 3,
            repeat_excluded: " .-_+=,`*|\\。".to_string(),
            lightning_window_secs: 60,
            snail_step: 0.1,
            snail_threshold_secs: 600,
            snail_cap: 2.0,
            balance_margin: 10.0,
            report_top_n: 10,
        }
    }
}

impl Tunables {
    /// Whether runs of this character are ignored by the repeat tally.
    pub fn repeat_char_excluded(&self, c: char) -> bool {
        c.is_whitespace() || self.repeat_excluded.contains(c)
    }
}

/// Engine configuration: which tallies run, in which order, with which
/// thresholds.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub strategies: Vec<StrategyKind>,
    pub tunables: Tunables,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategies: StrategyKind::all(),
            tunables: Tunables::default(),
        }
    }
}
