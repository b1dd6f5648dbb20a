//! CLI configuration structures and loaders.
use std::env;
use std::path::PathBuf;

use anyhow::Context;
use progression_content::{ContentBundle, ContentFactory};
use progression_core::ClassId;

/// Configuration for one scripted session.
#[derive(Clone, Debug)]
pub struct CliConfig {
    /// Content directory; embedded content when unset.
    pub data_dir: Option<PathBuf>,
    /// Snapshot directory; snapshots stay in memory when unset.
    pub save_dir: Option<PathBuf>,
    pub profile: String,
    pub class: ClassId,
    pub exp: f64,
    pub ticks: u64,
    pub event_buffer: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            save_dir: None,
            profile: "hero".to_owned(),
            class: ClassId::new("mage"),
            exp: 500.0,
            ticks: 200,
            event_buffer: 256,
        }
    }
}

impl CliConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `PROGRESSION_DATA_DIR` - Content directory (default: embedded content)
    /// - `PROGRESSION_SAVE_DIR` - Snapshot directory (default: in-memory)
    /// - `PROGRESSION_PROFILE` - Snapshot key of the session actor (default: hero)
    /// - `PROGRESSION_CLASS` - Class professed by the session actor (default: mage)
    /// - `PROGRESSION_EXP` - Experience granted after professing (default: 500)
    /// - `PROGRESSION_TICKS` - Ticks simulated after casting (default: 200)
    /// - `PROGRESSION_EVENT_BUFFER` - Event bus capacity per topic (default: 256)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.data_dir = env::var("PROGRESSION_DATA_DIR").ok().map(PathBuf::from);
        config.save_dir = env::var("PROGRESSION_SAVE_DIR").ok().map(PathBuf::from);

        if let Ok(profile) = env::var("PROGRESSION_PROFILE") {
            config.profile = profile;
        }
        if let Ok(class) = env::var("PROGRESSION_CLASS") {
            config.class = ClassId::new(class);
        }
        if let Some(exp) = read_env::<f64>("PROGRESSION_EXP") {
            config.exp = exp.max(0.0);
        }
        if let Some(ticks) = read_env::<u64>("PROGRESSION_TICKS") {
            config.ticks = ticks;
        }
        if let Some(capacity) = read_env::<usize>("PROGRESSION_EVENT_BUFFER") {
            config.event_buffer = capacity.max(1);
        }

        config
    }

    /// Loads content from the data directory, or the embedded set.
    pub fn load_content(&self) -> anyhow::Result<ContentBundle> {
        match &self.data_dir {
            Some(dir) => {
                tracing::info!(data_dir = %dir.display(), "loading content");
                ContentFactory::new(dir)
                    .load_bundle()
                    .with_context(|| format!("loading content from {}", dir.display()))
            }
            None => {
                tracing::info!("using embedded content");
                ContentBundle::embedded()
            }
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
