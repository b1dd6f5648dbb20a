mod common;

use std::sync::Arc;

use common::{REGEN_INTERVAL, THROTTLE, drain, mage, new_runtime, runtime_with};
use progression_core::{
    CastFailure, EffectSpec, ModifierOp, NoPayload, ProgressionError, ProgressionEvent, SkillKey,
    StatKey,
};
use runtime::{
    EffectEnd, EffectEvent, Event, RosterEvent, RuntimeError, SkillLock, StatSheet, Topic,
    VetoPolicy,
};

fn fireball() -> SkillKey {
    "fireball".into()
}

#[test]
fn new_actor_gets_default_health() {
    let mut runtime = new_runtime();
    let actor = runtime.add_actor("villager", StatSheet::new());

    let progress = runtime.progress(actor).expect("actor exists");
    assert_eq!(progress.derived.health, 20.0);
    assert!(!progress.has_class());
}

#[test]
fn engine_events_are_published_by_topic() {
    let mut runtime = new_runtime();
    let mut progression = runtime.subscribe(Topic::Progression);
    let mut stats = runtime.subscribe(Topic::Stats);

    let actor = mage(&mut runtime, "hero");

    let progression_events = drain(&mut progression);
    assert!(progression_events.contains(&Event::Roster(RosterEvent::ActorAdded {
        actor,
        name: "hero".into(),
    })));
    assert!(progression_events.iter().any(|event| matches!(
        event,
        Event::Progression(ProgressionEvent::ClassProfessed { class, .. }) if class.as_str() == "mage"
    )));

    let stat_events = drain(&mut stats);
    assert!(stat_events.iter().any(|event| matches!(
        event,
        Event::Progression(ProgressionEvent::DerivedStatsChanged { stats, .. }) if stats.health == 30.0
    )));
}

#[test]
fn cast_throttle_and_cooldown_follow_the_clock() {
    let mut runtime = new_runtime();
    let actor = mage(&mut runtime, "hero");
    let mut casts = runtime.subscribe(Topic::Cast);
    runtime
        .with_engine(actor, |engine| {
            engine.give_mana(50.0);
            engine.upgrade_skill(&fireball())
        })
        .expect("actor exists")
        .expect("fireball upgrades");

    let receipt = runtime
        .cast(actor, &fireball(), &mut NoPayload)
        .expect("first cast succeeds");
    assert_eq!(receipt.resource_cost, 10.0);
    assert_eq!(runtime.progress(actor).expect("actor").mana.current, 40.0);

    let throttled = runtime.cast(actor, &fireball(), &mut NoPayload);
    assert!(matches!(throttled, Err(RuntimeError::Cast(CastFailure::Throttled))));

    runtime.advance(THROTTLE);
    assert!(!runtime.progress(actor).expect("actor").is_throttled());
    let cooling = runtime.cast(actor, &fireball(), &mut NoPayload);
    assert!(matches!(
        cooling,
        Err(RuntimeError::Cast(CastFailure::OnCooldown { remaining: 40 }))
    ));

    // Two regen passes (ticks 20 and 40) refill the pool on the way.
    runtime.advance(40);
    assert_eq!(runtime.now().0, 50);
    assert_eq!(runtime.progress(actor).expect("actor").mana.current, 50.0);
    assert!(runtime.cast(actor, &fireball(), &mut NoPayload).is_ok());

    let outcomes: Vec<_> = drain(&mut casts)
        .into_iter()
        .filter_map(|event| match event {
            Event::Progression(ProgressionEvent::SkillCast { .. }) => Some("cast"),
            Event::Progression(ProgressionEvent::CastFailed { .. }) => Some("failed"),
            _ => None,
        })
        .collect();
    assert_eq!(outcomes, vec!["cast", "failed", "failed", "cast"]);
}

#[test]
fn regeneration_runs_every_interval() {
    let mut runtime = new_runtime();
    let actor = mage(&mut runtime, "hero");

    runtime.advance(REGEN_INTERVAL - 1);
    assert_eq!(runtime.progress(actor).expect("actor").mana.current, 0.0);

    runtime.advance(1);
    assert_eq!(runtime.progress(actor).expect("actor").mana.current, 5.0);

    runtime.advance(REGEN_INTERVAL * 20);
    assert_eq!(runtime.progress(actor).expect("actor").mana.current, 50.0);
}

#[test]
fn timed_effect_expires_and_restores_stats() {
    let mut runtime = new_runtime();
    let caster = mage(&mut runtime, "caster");
    let target = mage(&mut runtime, "target");
    let mut progression = runtime.subscribe(Topic::Progression);

    let id = runtime
        .apply_effect(
            caster,
            target,
            EffectSpec::stat(StatKey::Health, ModifierOp::Add, 10.0),
            Some(30),
            false,
        )
        .expect("effect applies");
    assert_eq!(runtime.progress(target).expect("target").derived.health, 40.0);

    runtime.advance(29);
    assert_eq!(runtime.effects().len(), 1);

    runtime.advance(1);
    assert!(runtime.effects().is_empty());
    assert_eq!(runtime.progress(target).expect("target").derived.health, 30.0);
    assert!(drain(&mut progression).contains(&Event::Effect(EffectEvent::Ended {
        id,
        reason: EffectEnd::Expired,
    })));
    assert!(!runtime.stop_effect(id));
}

#[test]
fn attribute_effect_feeds_stat_scaling() {
    let mut runtime = new_runtime();
    let caster = mage(&mut runtime, "caster");
    let target = mage(&mut runtime, "target");

    let id = runtime
        .apply_effect(
            caster,
            target,
            EffectSpec::attribute("vitality", ModifierOp::Add, 3.0),
            None,
            false,
        )
        .expect("effect applies");
    assert_eq!(runtime.progress(target).expect("target").derived.health, 36.0);

    assert!(runtime.stop_effect(id));
    assert_eq!(runtime.progress(target).expect("target").derived.health, 30.0);
}

#[test]
fn unknown_attribute_effect_is_rejected() {
    let mut runtime = new_runtime();
    let actor = mage(&mut runtime, "hero");

    let result = runtime.apply_effect(
        actor,
        actor,
        EffectSpec::attribute("charisma", ModifierOp::Add, 1.0),
        Some(10),
        false,
    );

    assert!(matches!(result, Err(RuntimeError::Effect(_))));
    assert!(runtime.effects().is_empty());
}

#[test]
fn removing_a_source_revokes_its_effects() {
    let mut runtime = new_runtime();
    let caster = mage(&mut runtime, "caster");
    let target = mage(&mut runtime, "target");
    runtime
        .apply_effect(
            caster,
            target,
            EffectSpec::stat(StatKey::Health, ModifierOp::Add, 10.0),
            None,
            false,
        )
        .expect("effect applies");

    let record = runtime.remove_actor(caster).expect("caster exists");

    assert_eq!(record.name, "caster");
    assert!(runtime.effects().is_empty());
    assert_eq!(runtime.progress(target).expect("target").derived.health, 30.0);
    assert!(runtime.progress(target).expect("target").modifiers.stats.is_empty());
}

#[test]
fn removed_actor_handle_is_dead() {
    let mut runtime = new_runtime();
    let actor = mage(&mut runtime, "hero");
    runtime
        .with_engine(actor, |engine| {
            engine.give_mana(50.0);
            engine.upgrade_skill(&fireball())
        })
        .expect("actor exists")
        .expect("fireball upgrades");
    runtime
        .cast(actor, &fireball(), &mut NoPayload)
        .expect("cast succeeds");

    runtime.remove_actor(actor).expect("actor exists");

    // The pending throttle job was cancelled; only regen passes remain.
    assert_eq!(runtime.advance(THROTTLE), 0);
    assert!(matches!(
        runtime.with_engine(actor, |engine| engine.recompute()),
        Err(RuntimeError::UnknownActor(handle)) if handle == actor
    ));
    let next = runtime.add_actor("newcomer", StatSheet::new());
    assert_ne!(next, actor);
}

#[test]
fn veto_policy_rolls_back_upgrades() {
    let lock = Arc::new(SkillLock::new([fireball()]));
    let mut runtime = runtime_with(vec![lock.clone() as Arc<dyn VetoPolicy>]);
    let actor = mage(&mut runtime, "hero");

    let denied = runtime
        .with_engine(actor, |engine| engine.upgrade_skill(&fireball()))
        .expect("actor exists");
    assert_eq!(denied, Err(ProgressionError::Vetoed));

    let progress = runtime.progress(actor).expect("actor");
    assert_eq!(progress.skill_level(&fireball()), 0);
    assert_eq!(progress.class(&"class".into()).map(|c| c.points), Some(3));

    lock.unlock(&fireball());
    let upgraded = runtime
        .with_engine(actor, |engine| engine.upgrade_skill(&fireball()))
        .expect("actor exists");
    assert_eq!(upgraded, Ok(1));
}
