use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use pond_core::{LogSource, PartnerId, Tunables};

use crate::aggregator::PartnerScore;

/// Which partners a report covers.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "scope", content = "n")]
pub enum ReportScope {
    All,
    Top(usize),
}

/// One ranked line of the report. Partners whose values sum to zero never
/// become entries; their percentage is undefined.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReportEntry {
    pub partner: PartnerId,
    pub display_name: String,
    pub outgoing: f64,
    pub incoming: f64,
    pub outgoing_share: f64,
    pub incoming_share: f64,
    pub messages: usize,
}

/// Structured report for programmatic consumers; `render` produces the
/// human-readable summary.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AffinityReport {
    pub entries: Vec<ReportEntry>,
}

impl AffinityReport {
    pub fn render(&self) -> String {
        if self.entries.is_empty() {
            return "no scored conversations yet\n".to_string();
        }
        let mut out = String::new();
        for (rank, entry) in self.entries.iter().enumerate() {
            out.push_str(&format!(
                "{:>3}. {}  you {:.1}% / them {:.1}%  ({:.2} vs {:.2}, {} messages)\n",
                rank + 1,
                entry.display_name,
                entry.outgoing_share,
                entry.incoming_share,
                entry.outgoing,
                entry.incoming,
                entry.messages,
            ));
        }
        out
    }
}

/// Turns aggregated scores into a ranked percentage summary.
pub struct ReportFormatter {
    default_top_n: usize,
}

impl ReportFormatter {
    pub fn new(tunables: &Tunables) -> Self {
        Self {
            default_top_n: tunables.report_top_n,
        }
    }

    /// The scope used when a caller does not name one.
    pub fn default_scope(&self) -> ReportScope {
        ReportScope::Top(self.default_top_n)
    }

    /// Rank by message volume, drop partners with an undefined ratio, cut
    /// to the requested scope, and resolve display names for the output.
    pub fn build(
        &self,
        scores: &HashMap<PartnerId, PartnerScore>,
        scope: ReportScope,
        source: &dyn LogSource,
    ) -> AffinityReport {
        let mut ranked: Vec<(&PartnerId, &PartnerScore)> = scores.iter().collect();
        // volume first, id as the deterministic tie-break
        ranked.sort_by(|(a_id, a), (b_id, b)| {
            b.messages
                .cmp(&a.messages)
                .then_with(|| a_id.as_str().cmp(b_id.as_str()))
        });

        let limit = match scope {
            ReportScope::All => ranked.len(),
            ReportScope::Top(n) => n,
        };

        let entries = ranked
            .into_iter()
            .take(limit)
            .filter_map(|(partner, score)| {
                let (outgoing_share, incoming_share) = score.card.shares()?;
                let display_name = source
                    .display_name(partner)
                    .unwrap_or_else(|| partner.to_string());
                Some(ReportEntry {
                    partner: partner.clone(),
                    display_name,
                    outgoing: score.card.outgoing,
                    incoming: score.card.incoming,
                    outgoing_share,
                    incoming_share,
                    messages: score.messages,
                })
            })
            .collect();

        AffinityReport { entries }
    }
}
