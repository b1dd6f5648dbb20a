//! Runtime-level event payloads that have no engine counterpart.

use progression_core::{ActorHandle, EffectTaskId, Tick};
use serde::{Deserialize, Serialize};

/// Actors joining or leaving the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RosterEvent {
    ActorAdded { actor: ActorHandle, name: String },
    ActorRemoved { actor: ActorHandle },
    /// Progress was replaced from a stored snapshot.
    ActorRestored { actor: ActorHandle },
}

/// Why a timed effect stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectEnd {
    Expired,
    Stopped,
}

/// Timed effect lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EffectEvent {
    Applied {
        id: EffectTaskId,
        source: ActorHandle,
        target: ActorHandle,
        expires_at: Option<Tick>,
    },
    Ended {
        id: EffectTaskId,
        reason: EffectEnd,
    },
}
