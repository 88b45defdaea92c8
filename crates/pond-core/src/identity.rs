use serde::{Deserialize, Serialize};
use std::fmt;

/// The operator's own transport identity, resolved once at startup and
/// injected wherever message direction is derived.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelfIdentity(String);

impl SelfIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Is this sender the operator?
    pub fn is_self(&self, sender: &str) -> bool {
        self.0 == sender
    }
}

impl fmt::Display for SelfIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
