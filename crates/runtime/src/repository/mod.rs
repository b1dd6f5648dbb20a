//! Repository layer for persisted actor progress.
//!
//! Repositories store [`progression_core::ProgressSnapshot`]s under a profile
//! key chosen by the host (actor handles are session-local and never
//! persisted). Static content is served by the oracle manager, not here.

mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileSnapshotRepository;
pub use memory::InMemorySnapshotRepository;
pub use traits::{SnapshotRepository, validate_key};
