//! Shared fixtures for runtime integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use progression_content::{ClassCatalog, ContentBundle};
use progression_core::{
    ActorHandle, AttributeDefinition, ClassDefinition, GroupSettings, ProgressionConfig,
    ScaledValue, SkillDefinition, StatKey, StatScaling,
};
use runtime::{Event, ProgressionRuntime, StatSheet, VetoPolicy};
use tokio::sync::broadcast;

pub const THROTTLE: u64 = 10;
pub const REGEN_INTERVAL: u64 = 20;

/// Small table set with round numbers:
/// mage has 30 health, 50 mana and regenerates 5 mana per pass;
/// fireball costs 10 mana with a 50 tick cooldown.
pub fn bundle() -> ContentBundle {
    let config = ProgressionConfig {
        throttle_ticks: THROTTLE,
        regen_interval_ticks: REGEN_INTERVAL,
        ..ProgressionConfig::default()
    };

    let vitality = AttributeDefinition::new("vitality", 1, 0.0, 10)
        .with_scaling(StatKey::Health, StatScaling::Add { per_point: 2.0 });

    let mut fireball = SkillDefinition::new("fireball", 3);
    fireball.resource_cost = ScaledValue::flat(10.0);
    fireball.cooldown_ticks = ScaledValue::flat(50.0);

    let mut mage = ClassDefinition::new("mage", "class", 5);
    mage.health = ScaledValue::flat(30.0);
    mage.mana = ScaledValue::flat(50.0);
    mage.mana_regen = ScaledValue::flat(5.0);
    mage.skills = vec!["fireball".into()];

    let mut group = GroupSettings::new("class");
    group.starting_points = 3;
    group.starting_attribute_points = 2;

    ContentBundle::new(
        config,
        vec![vitality],
        vec![fireball],
        ClassCatalog {
            groups: vec![group],
            classes: vec![mage],
        },
    )
    .expect("fixture content is valid")
}

pub fn new_runtime() -> ProgressionRuntime {
    runtime_with(Vec::new())
}

pub fn runtime_with(policies: Vec<Arc<dyn VetoPolicy>>) -> ProgressionRuntime {
    policies
        .into_iter()
        .fold(ProgressionRuntime::builder().content(bundle()), |builder, policy| {
            builder.policy(policy)
        })
        .build()
        .expect("runtime builds")
}

/// Adds an actor and professes it as a mage.
pub fn mage(runtime: &mut ProgressionRuntime, name: &str) -> ActorHandle {
    let actor = runtime.add_actor(name, StatSheet::new());
    runtime
        .with_engine(actor, |engine| engine.profess(&"mage".into()))
        .expect("actor exists")
        .expect("mage can be professed");
    actor
}

/// Everything currently buffered on a receiver.
pub fn drain(receiver: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    std::iter::from_fn(|| receiver.try_recv().ok()).collect()
}
