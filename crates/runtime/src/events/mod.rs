//! Topic-based event bus for runtime events.
//!
//! Engine events are published after each call returns, split across topics
//! so consumers subscribe only to what they need: stat changes go to
//! [`Topic::Stats`], cast outcomes to [`Topic::Cast`], everything else to
//! [`Topic::Progression`].

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{EffectEnd, EffectEvent, RosterEvent};
