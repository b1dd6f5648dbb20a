//! Scripted session: profess, level, spend points, cast, buff, save and load.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use progression_core::{
    ActorHandle, AttributeKey, AttributeOracle, ClassOracle, EffectSpec, ModifierOp, NoPayload,
    ProgressionEngine, SkillKey,
};
use runtime::{
    FileSnapshotRepository, InMemorySnapshotRepository, ProgressionRuntime, SnapshotRepository,
    StatSheet,
};
use tracing::{info, warn};

use crate::config::CliConfig;

const BUFF_TICKS: i64 = 100;

/// Runs the session and returns a printable report of both actors.
pub fn run(runtime: &mut ProgressionRuntime, config: &CliConfig) -> Result<String> {
    let class = runtime
        .content()
        .class(&config.class)
        .cloned()
        .with_context(|| format!("unknown class '{}'", config.class))?;
    let attributes: Vec<AttributeKey> = runtime
        .content()
        .attributes()
        .into_iter()
        .map(|def| def.key.clone())
        .collect();

    let hero = runtime.add_actor(config.profile.as_str(), StatSheet::new());
    runtime.with_engine(hero, |engine| engine.profess(&class.id))??;

    let levels = runtime.with_engine(hero, |engine| engine.give_exp(config.exp))?;
    info!(actor = %hero, levels, "experience granted");

    let (stages, upgrades) = runtime.with_engine(hero, |engine| {
        (
            spend_round_robin(&attributes, |key| engine.upgrade_attribute(key).is_ok()),
            spend_round_robin(&class.skills, |key| engine.upgrade_skill(key).is_ok()),
        )
    })?;
    info!(actor = %hero, stages, upgrades, "points spent");

    cast_first_ready(runtime, hero, &class.skills)?;

    if let Some(key) = attributes.first() {
        runtime.apply_effect(
            hero,
            hero,
            EffectSpec::attribute(key.clone(), ModifierOp::Add, 2.0),
            Some(BUFF_TICKS),
            false,
        )?;
    }
    let fired = runtime.advance(config.ticks);
    info!(now = %runtime.now(), fired, "simulation advanced");

    let repository: Box<dyn SnapshotRepository> = match &config.save_dir {
        Some(dir) => Box::new(FileSnapshotRepository::new(dir)?),
        None => Box::new(InMemorySnapshotRepository::new()),
    };
    runtime.save_snapshot(hero, &config.profile, repository.as_ref())?;
    let echo = runtime.add_actor("echo", StatSheet::new());
    runtime.load_snapshot(echo, &config.profile, repository.as_ref())?;

    let mut report = String::new();
    describe(runtime, hero, &mut report)?;
    describe(runtime, echo, &mut report)?;
    Ok(report)
}

/// Buys one step of each key in turn until no purchase succeeds.
fn spend_round_robin<K>(keys: &[K], mut buy: impl FnMut(&K) -> bool) -> usize {
    let mut bought = 0;
    loop {
        let before = bought;
        for key in keys {
            if buy(key) {
                bought += 1;
            }
        }
        if bought == before {
            return bought;
        }
    }
}

fn cast_first_ready(runtime: &mut ProgressionRuntime, actor: ActorHandle, skills: &[SkillKey]) -> Result<()> {
    runtime.with_engine(actor, fill_mana)?;

    let progress = runtime.progress(actor)?;
    let Some(skill) = skills
        .iter()
        .find(|key| progress.skill_level(key) > 0)
        .cloned()
    else {
        warn!(actor = %actor, "no unlocked skill to cast");
        return Ok(());
    };

    match runtime.cast(actor, &skill, &mut NoPayload) {
        Ok(receipt) => info!(
            actor = %actor,
            skill = %receipt.skill,
            level = receipt.level,
            cooldown = receipt.cooldown_ticks,
            "skill cast"
        ),
        Err(e) => warn!(actor = %actor, skill = %skill, error = %e, "cast failed"),
    }
    Ok(())
}

fn fill_mana(engine: &mut ProgressionEngine<'_>) -> f64 {
    let max = engine.progress().mana.max;
    engine.give_mana(max)
}

fn describe(runtime: &ProgressionRuntime, actor: ActorHandle, out: &mut String) -> Result<()> {
    let name = runtime
        .actor(actor)
        .map(|record| record.name.clone())
        .unwrap_or_default();
    let progress = runtime.progress(actor)?;
    let now = runtime.now();

    writeln!(out, "== {name} ({actor}) ==")?;
    for (group, class) in &progress.classes {
        writeln!(
            out,
            "  {group}: {} level {} ({:.0} exp, {} skill points)",
            class.class, class.level, class.exp, class.points
        )?;
    }
    for (key, entry) in progress.ledger.entries() {
        writeln!(out, "  attribute {key}: stage {}", entry.stage)?;
    }
    writeln!(out, "  attribute points left: {}", progress.ledger.points())?;
    for (key, skill) in progress.skills.iter().filter(|(_, skill)| skill.level > 0) {
        let cooldown = skill.cooldown_remaining(now);
        writeln!(out, "  skill {key}: level {} (cooldown {cooldown})", skill.level)?;
    }
    let derived = &progress.derived;
    writeln!(
        out,
        "  health {:.1}  mana {:.1}/{:.1}  regen {:.2}",
        derived.health, progress.mana.current, progress.mana.max, derived.mana_regen
    )?;
    Ok(())
}
