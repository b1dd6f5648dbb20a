mod common;

use common::{mage, new_runtime};
use progression_core::{NoPayload, SkillKey};
use runtime::{
    FileSnapshotRepository, InMemorySnapshotRepository, RuntimeError, SnapshotRepository,
    StatSheet,
};

fn fireball() -> SkillKey {
    "fireball".into()
}

#[test]
fn progress_round_trips_through_a_file_repository() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repository = FileSnapshotRepository::new(dir.path()).expect("repository");
    let mut runtime = new_runtime();
    let hero = mage(&mut runtime, "hero");
    runtime
        .with_engine(hero, |engine| {
            engine.give_mana(50.0);
            engine.upgrade_skill(&fireball())?;
            engine.upgrade_skill(&fireball())?;
            engine.upgrade_attribute(&"vitality".into())
        })
        .expect("hero exists")
        .expect("upgrades succeed");
    runtime
        .cast(hero, &fireball(), &mut NoPayload)
        .expect("cast succeeds");
    runtime.advance(5);

    runtime
        .save_snapshot(hero, "hero", &repository)
        .expect("saved");
    assert_eq!(repository.list_keys().expect("keys"), vec!["hero".to_owned()]);

    let copy = runtime.add_actor("copy", StatSheet::new());
    runtime
        .load_snapshot(copy, "hero", &repository)
        .expect("loaded");

    let original = runtime.progress(hero).expect("hero");
    let restored = runtime.progress(copy).expect("copy");
    let now = runtime.now();
    assert_eq!(restored.skill_level(&fireball()), 2);
    assert_eq!(restored.classes, original.classes);
    assert_eq!(restored.ledger.points(), original.ledger.points());
    assert_eq!(restored.derived, original.derived);
    assert_eq!(restored.mana.current, 40.0);
    assert_eq!(
        restored.skill(&fireball()).map(|skill| skill.cooldown_remaining(now)),
        Some(45)
    );
    assert_eq!(runtime.snapshot(copy).expect("copy"), runtime.snapshot(hero).expect("hero"));
}

#[test]
fn loading_a_missing_key_fails_without_touching_progress() {
    let repository = InMemorySnapshotRepository::new();
    let mut runtime = new_runtime();
    let hero = mage(&mut runtime, "hero");
    let before = runtime.snapshot(hero).expect("hero");

    let result = runtime.load_snapshot(hero, "nobody", &repository);

    assert!(matches!(result, Err(RuntimeError::SnapshotNotFound(key)) if key == "nobody"));
    assert_eq!(runtime.snapshot(hero).expect("hero"), before);
}

#[test]
fn invalid_keys_surface_as_repository_errors() {
    let repository = InMemorySnapshotRepository::new();
    let mut runtime = new_runtime();
    let hero = mage(&mut runtime, "hero");

    let result = runtime.save_snapshot(hero, "../hero", &repository);

    assert!(matches!(result, Err(RuntimeError::Repository(_))));
}
