use regex::Regex;

use pond_core::{MessageRecord, ScoreCard, Tunables};

use super::TallyStrategy;

/// A bracketed emoji shortcode counts as one repeated unit, not several
/// characters, so `[Doge][Doge][Doge]` is a run of three.
const TOKEN_PLACEHOLDER: &str = "\u{FFFC}";

/// Exaggerated character repetition ("soooo good") signals emphasis. The
/// longest case-insensitive run of one character earns `step` per character
/// beyond the qualifying length, unless the character is whitespace or
/// common punctuation.
pub struct RepeatEmphasis {
    step: f64,
    min_run: usize,
    excluded: String,
    token: Regex,
}

impl RepeatEmphasis {
    pub fn new(tunables: &Tunables) -> Self {
        Self {
            step: tunables.repeat_step,
            min_run: tunables.min_repeat_run,
            excluded: tunables.repeat_excluded.clone(),
            token: Regex::new(r"\[[^\[\]]+\]").expect("token pattern is valid"),
        }
    }

    fn excluded_char(&self, c: char) -> bool {
        c.is_whitespace() || self.excluded.contains(c)
    }
}

impl TallyStrategy for RepeatEmphasis {
    fn name(&self) -> &'static str {
        "repeat_emphasis"
    }

    fn tally(&self, log: &[MessageRecord], card: &mut ScoreCard) {
        for msg in log {
            let collapsed = self.token.replace_all(&msg.text, TOKEN_PLACEHOLDER);
            let Some((c, run)) = longest_run(&collapsed) else {
                continue;
            };
            if run >= self.min_run && !self.excluded_char(c) {
                let over = (run - (self.min_run - 1)) as f64;
                card.credit(msg.direction, self.step * over);
            }
        }
    }
}

/// The first maximal run of a single character, case-folded.
fn longest_run(text: &str) -> Option<(char, usize)> {
    let mut best: Option<(char, usize)> = None;
    let mut current: Option<(char, usize)> = None;
    for c in text.chars().flat_map(char::to_lowercase) {
        current = match current {
            Some((prev, n)) if prev == c => Some((prev, n + 1)),
            _ => Some((c, 1)),
        };
        if let Some((_, n)) = current {
            if best.map_or(true, |(_, b)| n > b) {
                best = current;
            }
        }
    }
    best
}
