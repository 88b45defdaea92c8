use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;

use pond_core::{
    EngineConfig, MessageRecord, NotificationSink, PartnerId, RawMessage, ScoreCard, SelfIdentity,
};
use pond_engine::{BalanceMonitor, BalanceState, ScoreAggregator, StrategyPipeline};
use pond_store::{Database, MessageRepo, PartnerRepo};

use crate::error::SessionError;

/// Result of one observed message.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Observation {
    pub card: ScoreCard,
    pub balance: BalanceState,
}

#[derive(Default)]
struct PartnerState {
    log: Vec<MessageRecord>,
    card: ScoreCard,
    bootstrapped: bool,
}

/// Live ingestion path: normalize, persist, re-tally, check balance.
/// Each partner's state lives under its own map entry, so updates are
/// atomic per partner and independent across partners.
pub struct LiveSession {
    aggregator: ScoreAggregator,
    partners: PartnerRepo,
    messages: MessageRepo,
    state: DashMap<PartnerId, PartnerState>,
    monitor: BalanceMonitor,
}

impl LiveSession {
    pub fn new(
        db: Database,
        identity: SelfIdentity,
        config: &EngineConfig,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            aggregator: ScoreAggregator::new(StrategyPipeline::from_config(config), identity),
            partners: PartnerRepo::new(db.clone()),
            messages: MessageRepo::new(db),
            state: DashMap::new(),
            monitor: BalanceMonitor::new(&config.tunables, sink),
        }
    }

    /// Ingest one raw event for a partner. A malformed event is rejected
    /// before anything is persisted; otherwise the event is appended to
    /// the store, the partner's card is recomputed over the full log, and
    /// the balance monitor runs against the fresh card.
    pub fn observe(
        &self,
        partner: &PartnerId,
        display_name: Option<&str>,
        raw: &RawMessage,
    ) -> Result<Observation, SessionError> {
        let record = MessageRecord::from_raw(raw, self.aggregator.identity())?;

        self.partners.get_or_create(partner, display_name)?;
        self.messages.append(partner, raw)?;

        let mut entry = self.state.entry(partner.clone()).or_default();
        if entry.bootstrapped {
            entry.log.push(record);
        } else {
            // first contact since startup: rebuild from the stored log,
            // which already contains the row appended above
            let raws = self.messages.fetch_log(partner)?;
            entry.log = self.aggregator.normalize_log(partner, &raws);
            entry.bootstrapped = true;
        }
        entry.card = self.aggregator.pipeline().score(&entry.log);
        let balance = self.monitor.check(partner, &entry.card);

        Ok(Observation {
            card: entry.card,
            balance,
        })
    }

    /// The current live card for a partner, if any message has been seen.
    pub fn card(&self, partner: &PartnerId) -> Option<ScoreCard> {
        self.state.get(partner).map(|state| state.card)
    }
}
