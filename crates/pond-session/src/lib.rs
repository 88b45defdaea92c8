pub mod error;
pub mod session;
pub mod sinks;

pub use error::SessionError;
pub use session::{LiveSession, Observation};
pub use sinks::{BroadcastSink, TracingSink};
