//! Unified error type surfaced by the runtime API.
//!
//! Wraps engine, cast, effect and repository failures so callers can bubble
//! them up with `?` regardless of which layer rejected the request.

use progression_core::{ActorHandle, CastFailure, EffectError, ProgressionError};
use thiserror::Error;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("unknown actor {0}")]
    UnknownActor(ActorHandle),

    #[error(transparent)]
    Progression(#[from] ProgressionError),

    #[error("cast failed: {0}")]
    Cast(#[from] CastFailure),

    #[error(transparent)]
    Effect(#[from] EffectError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("runtime requires content to be configured before building")]
    MissingContent,

    #[error("no snapshot stored under '{0}'")]
    SnapshotNotFound(String),
}
