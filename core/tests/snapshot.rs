//! Save and restore: round trips, and repair of saves that cannot be
//! trusted.

use garden_core::{
    config::GameConfig,
    engine::GardenEngine,
    rng::FixedJitter,
    slot::Stage,
    snapshot::GameSnapshot,
    state::GameState,
    store::GardenStore,
    types::GRID_SIZE,
};

const PROFILE: &str = "snapshot-test";

fn played_engine() -> GardenEngine {
    let mut engine = GardenEngine::build_test(PROFILE.into(), 21)
        .unwrap()
        .with_jitter(FixedJitter(1.0));
    engine.plant(0, "rose", 0).unwrap();
    engine.plant(4, "lily", 0).unwrap();
    engine.water(0, 15_000).unwrap();
    engine
}

#[test]
fn snapshot_round_trips() {
    let engine = played_engine();
    let json = engine.state().to_json().unwrap();

    let (restored, report) = GameState::restore(&json, &GameConfig::builtin());
    assert!(report.is_clean(), "unexpected repairs: {report:?}");
    assert_eq!(&restored, engine.state());
}

#[test]
fn snapshot_carries_the_save_fields() {
    let snapshot = played_engine().snapshot();
    assert_eq!(snapshot.slots.len(), GRID_SIZE);
    assert_eq!(snapshot.level, 1);
    assert_eq!(snapshot.slots[0].stage, Stage::Sprouting);
    assert_eq!(snapshot.slots[4].seed_id.as_deref(), Some("lily"));
    assert_eq!(snapshot.achievements, vec!["first_sprout".to_string()]);
    assert_eq!(snapshot.counters.plants_placed, 2);

    let value: serde_json::Value = serde_json::to_value(&snapshot).unwrap();
    for key in ["coins", "experience", "level", "slots", "harvested_inventory", "achievements", "created_bouquets"] {
        assert!(value.get(key).is_some(), "missing {key}");
    }
}

#[test]
fn unreadable_save_starts_fresh() {
    let (state, report) = GameState::restore("{ not json", &GameConfig::builtin());
    assert!(report.fresh_start);
    assert_eq!(state, GameState::new(&GameConfig::builtin()));
    assert_eq!(state.economy.coins(), 100);
}

#[test]
fn invalid_slots_are_reset_and_level_recomputed() {
    let mut snapshot: GameSnapshot = played_engine().snapshot();
    snapshot.level = 9;
    // Unknown seed.
    snapshot.slots[0].seed_id = Some("orchid".into());
    // Empty stage with a seed still attached.
    snapshot.slots[1] = snapshot.slots[4].clone();
    snapshot.slots[1].index = 1;
    snapshot.slots[1].stage = Stage::Empty;
    // Health above the cap.
    snapshot.slots[4].health = 150;
    // Index does not match position.
    snapshot.slots[7].index = 8;

    let json = serde_json::to_string(&snapshot).unwrap();
    let (state, report) = GameState::restore(&json, &GameConfig::builtin());

    assert_eq!(report.slots_reset, vec![0, 1, 4, 7]);
    assert!(report.level_corrected);
    assert!(!report.fresh_start);
    assert_eq!(state.economy.level(), 1);
    for index in [0, 1, 4, 7] {
        assert!(state.garden.slot(index).unwrap().is_empty(), "slot {index}");
    }
    assert!(state.garden.slots().iter().all(|s| s.is_consistent()));
    assert_eq!(state.economy.coins(), snapshot.coins, "coins survive slot repairs");
}

#[test]
fn timer_order_is_checked() {
    let mut snapshot = played_engine().snapshot();
    snapshot.slots[0].planted_at = Some(100_000);
    let json = serde_json::to_string(&snapshot).unwrap();
    let (_, report) = GameState::restore(&json, &GameConfig::builtin());
    assert_eq!(report.slots_reset, vec![0]);
}

#[test]
fn short_slot_lists_are_padded() {
    let mut snapshot = played_engine().snapshot();
    snapshot.slots.truncate(5);
    let json = serde_json::to_string(&snapshot).unwrap();
    let (state, report) = GameState::restore(&json, &GameConfig::builtin());

    assert!(report.slots_reset.is_empty());
    assert_eq!(state.garden.slots().len(), GRID_SIZE);
    assert_eq!(state.garden.slot(4).unwrap().stage(), Stage::Planted);
    assert!(state.garden.slot(15).unwrap().is_empty());
}

#[test]
fn older_saves_without_settings_get_defaults() {
    let mut value = serde_json::to_value(played_engine().snapshot()).unwrap();
    let object = value.as_object_mut().unwrap();
    object.remove("settings");
    object.remove("counters");
    object.remove("version");

    let (state, report) = GameState::restore(&value.to_string(), &GameConfig::builtin());
    assert!(report.is_clean());
    assert!(state.settings.auto_save);
    assert_eq!(state.counters.plants_placed, 0);
}

#[test]
fn load_resumes_the_saved_game() {
    let engine = played_engine();
    let expected = engine.state().clone();

    let store = engine.into_store();
    let (resumed, report) =
        GardenEngine::load(PROFILE.into(), 999, GameConfig::builtin(), store).unwrap();
    assert!(report.is_clean());
    assert_eq!(resumed.state(), &expected);
}

#[test]
fn load_without_a_save_starts_fresh() {
    let store = GardenStore::in_memory().unwrap();
    store.migrate().unwrap();
    let (engine, report) =
        GardenEngine::load("newcomer".into(), 1, GameConfig::builtin(), store).unwrap();
    assert!(report.is_clean());
    assert_eq!(engine.coins(), 100);
    assert_eq!(engine.store().profile_seed("newcomer").unwrap(), Some(1));
}

#[test]
fn corrupt_stored_save_degrades_to_a_fresh_game() {
    let store = GardenStore::in_memory().unwrap();
    store.migrate().unwrap();
    store.ensure_profile("broken", 5, "test", 0).unwrap();
    store.save_snapshot("broken", 10, "not a snapshot").unwrap();

    let (engine, report) =
        GardenEngine::load("broken".into(), 5, GameConfig::builtin(), store).unwrap();
    assert!(report.fresh_start);
    assert_eq!(engine.state(), &GameState::new(&GameConfig::builtin()));
}
