use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use pond_core::{NotificationSink, PartnerId, ScoreCard, Tunables};

/// Verdict of one balance check.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceState {
    Even,
    TheyAreMoreInvested,
    YouAreMoreInvested,
}

/// Live companion to the batch report: after each tallied message the raw
/// values are compared and a nudge goes out when one side has pulled ahead
/// by more than the margin. Sink failures are logged and swallowed; the
/// card is never touched.
pub struct BalanceMonitor {
    margin: f64,
    sink: Arc<dyn NotificationSink>,
}

impl BalanceMonitor {
    pub fn new(tunables: &Tunables, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            margin: tunables.balance_margin,
            sink,
        }
    }

    /// Pure comparison, no delivery.
    pub fn assess(&self, card: &ScoreCard) -> BalanceState {
        if card.outgoing < card.incoming - self.margin {
            BalanceState::TheyAreMoreInvested
        } else if card.outgoing - self.margin > card.incoming {
            BalanceState::YouAreMoreInvested
        } else {
            BalanceState::Even
        }
    }

    /// Assess and, when out of balance, notify the operator.
    pub fn check(&self, partner: &PartnerId, card: &ScoreCard) -> BalanceState {
        let state = self.assess(card);
        let nudge = match state {
            BalanceState::Even => return state,
            BalanceState::TheyAreMoreInvested => {
                "if you are interested, you might want to display it more openly"
            }
            BalanceState::YouAreMoreInvested => {
                "hey, slow down a little bit and give them some time to catch up"
            }
        };
        info!(partner = %partner, outgoing = card.outgoing, incoming = card.incoming, "imbalance detected");
        let text = format!("{partner}: {nudge}");
        if let Err(e) = self.sink.notify(&text) {
            warn!(partner = %partner, error = %e, "notification dropped");
        }
        state
    }
}
