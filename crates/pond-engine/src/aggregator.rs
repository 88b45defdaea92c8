use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use pond_core::{LogSource, MessageRecord, PartnerId, RawMessage, ScoreCard, SelfIdentity};

use crate::error::EngineError;
use crate::pipeline::StrategyPipeline;

/// Finalized result for one partner: the accumulated card plus the
/// normalized message count used for volume ranking.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct PartnerScore {
    #[serde(flatten)]
    pub card: ScoreCard,
    pub messages: usize,
}

/// Runs the full pipeline once per partner over that partner's log.
/// Partners are independent; accumulators are never persisted, every run
/// recomputes from the raw logs.
pub struct ScoreAggregator {
    pipeline: StrategyPipeline,
    identity: SelfIdentity,
}

impl ScoreAggregator {
    pub fn new(pipeline: StrategyPipeline, identity: SelfIdentity) -> Self {
        Self { pipeline, identity }
    }

    pub fn pipeline(&self) -> &StrategyPipeline {
        &self.pipeline
    }

    pub fn identity(&self) -> &SelfIdentity {
        &self.identity
    }

    /// Normalize a raw log, skipping malformed entries with a warning.
    pub fn normalize_log(&self, partner: &PartnerId, raws: &[RawMessage]) -> Vec<MessageRecord> {
        raws.iter()
            .filter_map(|raw| match MessageRecord::from_raw(raw, &self.identity) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(partner = %partner, error = %e, "skipping malformed record");
                    None
                }
            })
            .collect()
    }

    /// Score one partner's raw log.
    pub fn score_partner(&self, partner: &PartnerId, raws: &[RawMessage]) -> PartnerScore {
        let log = self.normalize_log(partner, raws);
        PartnerScore {
            card: self.pipeline.score(&log),
            messages: log.len(),
        }
    }

    /// Score every known partner. A partner whose log cannot be fetched is
    /// skipped with a warning so the rest of the report still comes out;
    /// only partner enumeration failure propagates.
    pub fn compute_scores(
        &self,
        source: &dyn LogSource,
    ) -> Result<HashMap<PartnerId, PartnerScore>, EngineError> {
        let partners = source.list_partners()?;
        let mut scores = HashMap::with_capacity(partners.len());
        for partner in partners {
            let raws = match source.fetch_log(&partner) {
                Ok(raws) => raws,
                Err(e) => {
                    warn!(partner = %partner, error = %e, "log unreachable, partner skipped");
                    continue;
                }
            };
            let score = self.score_partner(&partner, &raws);
            scores.insert(partner, score);
        }
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pond_core::{EngineConfig, SourceError};

    /// In-memory log source with one optionally broken partner.
    struct FakeSource {
        logs: HashMap<PartnerId, Vec<RawMessage>>,
        broken: Option<PartnerId>,
    }

    impl FakeSource {
        fn new(logs: HashMap<PartnerId, Vec<RawMessage>>) -> Self {
            Self { logs, broken: None }
        }
    }

    impl LogSource for FakeSource {
        fn list_partners(&self) -> Result<Vec<PartnerId>, SourceError> {
            let mut partners: Vec<_> = self.logs.keys().cloned().collect();
            partners.extend(self.broken.clone());
            Ok(partners)
        }

        fn fetch_log(&self, partner: &PartnerId) -> Result<Vec<RawMessage>, SourceError> {
            if self.broken.as_ref() == Some(partner) {
                return Err(SourceError::Unavailable("log file corrupt".into()));
            }
            self.logs
                .get(partner)
                .cloned()
                .ok_or_else(|| SourceError::UnknownPartner(partner.to_string()))
        }

        fn display_name(&self, _partner: &PartnerId) -> Option<String> {
            None
        }
    }

    fn aggregator() -> ScoreAggregator {
        ScoreAggregator::new(
            StrategyPipeline::from_config(&EngineConfig::default()),
            SelfIdentity::new("me"),
        )
    }

    #[test]
    fn scores_every_partner_independently() {
        let alice = PartnerId::from_raw("alice");
        let bob = PartnerId::from_raw("bob");
        let logs = HashMap::from([
            (
                alice.clone(),
                vec![
                    RawMessage::text("me", 0, "hi"),
                    RawMessage::text("alice", 5, "hey"),
                ],
            ),
            (bob.clone(), vec![RawMessage::text("bob", 0, "yo")]),
        ]);
        let scores = aggregator().compute_scores(&FakeSource::new(logs)).unwrap();

        assert_eq!(scores.len(), 2);
        assert_eq!(scores[&alice].messages, 2);
        assert_eq!(scores[&bob].messages, 1);
        assert_eq!(scores[&bob].card.outgoing, 0.0);
        assert!(scores[&bob].card.incoming >= 1.0);
    }

    #[test]
    fn malformed_entries_are_skipped_not_fatal() {
        let alice = PartnerId::from_raw("alice");
        let logs = HashMap::from([(
            alice.clone(),
            vec![
                RawMessage::text("me", 0, "hi"),
                RawMessage {
                    sender: None,
                    timestamp: Some(3),
                    kind: "text".into(),
                    text: Some("ghost".into()),
                },
                RawMessage::text("alice", 5, "hey"),
            ],
        )]);
        let scores = aggregator().compute_scores(&FakeSource::new(logs)).unwrap();
        assert_eq!(scores[&alice].messages, 2);
    }

    #[test]
    fn unreachable_log_degrades_gracefully() {
        let alice = PartnerId::from_raw("alice");
        let logs = HashMap::from([(alice.clone(), vec![RawMessage::text("me", 0, "hi")])]);
        let mut source = FakeSource::new(logs);
        source.broken = Some(PartnerId::from_raw("carol"));

        let scores = aggregator().compute_scores(&source).unwrap();
        assert_eq!(scores.len(), 1);
        assert!(scores.contains_key(&alice));
    }

    #[test]
    fn empty_log_yields_a_zero_card() {
        let alice = PartnerId::from_raw("alice");
        let logs = HashMap::from([(alice.clone(), vec![])]);
        let scores = aggregator().compute_scores(&FakeSource::new(logs)).unwrap();
        assert_eq!(scores[&alice].card, ScoreCard::new());
        assert_eq!(scores[&alice].messages, 0);
    }

    #[test]
    fn recomputation_is_idempotent() {
        let alice = PartnerId::from_raw("alice");
        let logs = HashMap::from([(
            alice.clone(),
            vec![
                RawMessage::text("me", 0, "hi"),
                RawMessage::text("alice", 30, "heyyy"),
                RawMessage::voice("alice", 45),
                RawMessage::text("me", 7200, "soooo busy today"),
            ],
        )]);
        let source = FakeSource::new(logs);
        let agg = aggregator();
        let first = agg.compute_scores(&source).unwrap();
        let second = agg.compute_scores(&source).unwrap();
        assert_eq!(first[&alice].card, second[&alice].card);
        assert_eq!(first[&alice].messages, second[&alice].messages);
    }
}
