pub mod config;
pub mod errors;
pub mod identity;
pub mod ids;
pub mod notify;
pub mod record;
pub mod score;
pub mod source;

pub use config::{EngineConfig, StrategyKind, Tunables};
pub use errors::{RecordError, SinkError, SourceError};
pub use identity::SelfIdentity;
pub use ids::PartnerId;
pub use notify::NotificationSink;
pub use record::{Direction, MessageKind, MessageRecord, RawMessage};
pub use score::ScoreCard;
pub use source::LogSource;
