use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Ingest listener states
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IngestState {
    /// Waiting for a producer to connect
    Accepting,

    /// Reading records from `peer`
    Connected { peer: SocketAddr },

    /// Waiting before the next accept after a failure
    Backoff { attempt: u32 },

    /// Listener closed
    Stopped,
}

impl IngestState {
    /// Check if transition from current state to target state is valid
    pub fn can_transition_to(&self, target: &IngestState) -> bool {
        use IngestState::*;

        matches!(
            (self, target),
            // From Accepting
            (Accepting, Connected { .. }) |
            (Accepting, Backoff { .. }) |

            // From Connected (a newer connection supersedes the current one)
            (Connected { .. }, Connected { .. }) |
            (Connected { .. }, Accepting) |
            (Connected { .. }, Backoff { .. }) |

            // From Backoff
            (Backoff { .. }, Accepting) |

            // Anything can stop
            (_, Stopped)
        ) && *self != Stopped
    }

    /// Get human-readable state name
    pub fn name(&self) -> &str {
        match self {
            Self::Accepting => "Accepting",
            Self::Connected { .. } => "Connected",
            Self::Backoff { .. } => "Backoff",
            Self::Stopped => "Stopped",
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }
}

impl Default for IngestState {
    fn default() -> Self {
        Self::Accepting
    }
}
