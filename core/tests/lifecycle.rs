//! Slot lifecycle: stage order, readiness gates and harvest pricing.
//! These call the pure transition functions directly; nothing here
//! touches coins or the store.

use garden_core::{
    catalog::{SeedCatalog, SeedDefinition},
    error::GardenError,
    lifecycle::{self, TransitionEvent},
    rng::{FixedJitter, GardenRng, JITTER_MAX, JITTER_MIN},
    slot::{Slot, Stage, MAX_HEALTH},
};
use std::sync::Arc;

fn rose() -> Arc<SeedDefinition> {
    SeedCatalog::builtin().get("rose").expect("rose in builtin catalog")
}

/// Plant a rose at t=0 and water it `waterings` times with no jitter.
/// Returns the slot and the time its current timer expires.
fn rose_after(waterings: usize) -> (Slot, u64) {
    let mut slot = lifecycle::plant(&Slot::empty(0), &rose(), 0).unwrap().slot;
    let mut jitter = FixedJitter(1.0);
    for _ in 0..waterings {
        let now = slot.next_ready_at().unwrap();
        slot = lifecycle::water(&slot, now, &mut jitter).unwrap().slot;
    }
    let ready = slot.next_ready_at().unwrap();
    (slot, ready)
}

#[test]
fn planting_starts_the_first_timer() {
    let seed = rose();
    let t = lifecycle::plant(&Slot::empty(3), &seed, 1_000).expect("plant into empty slot");

    assert_eq!(t.slot.stage(), Stage::Planted);
    assert_eq!(t.slot.planted_at(), Some(1_000));
    assert_eq!(t.slot.next_ready_at(), Some(16_000));
    assert_eq!(t.slot.health(), MAX_HEALTH);
    assert!(!t.slot.fertilized());
    assert!(t.slot.is_consistent());
    assert_eq!(
        t.event,
        TransitionEvent::Planted { slot: 3, seed: seed.clone(), cost: 10 }
    );
}

#[test]
fn planting_an_occupied_slot_is_rejected() {
    let (slot, _) = rose_after(0);
    let err = lifecycle::plant(&slot, &rose(), 5_000).unwrap_err();
    assert!(matches!(err, GardenError::InvalidStage { stage: Stage::Planted, .. }));
    assert_eq!(err.user_message(), "This slot is already planted!");
}

#[test]
fn watering_walks_the_growth_stages_in_order() {
    let expected = [Stage::Sprouting, Stage::Growing, Stage::ReadyToFertilize];
    for (waterings, stage) in expected.iter().enumerate() {
        let (slot, _) = rose_after(waterings + 1);
        assert_eq!(slot.stage(), *stage, "after {} waterings", waterings + 1);
        assert!(slot.is_consistent());
    }
}

#[test]
fn watering_before_the_timer_expires_is_rejected() {
    let (slot, ready) = rose_after(0);
    let err = lifecycle::water(&slot, ready - 1, &mut FixedJitter(1.0)).unwrap_err();
    match &err {
        GardenError::NotReady { slot: 0, ready_at, now } => {
            assert_eq!(*ready_at, ready);
            assert_eq!(*now, ready - 1);
        }
        other => panic!("expected NotReady, got {other:?}"),
    }
    assert_eq!(err.user_message(), "Too early! Wait for the timer to finish.");
}

#[test]
fn readiness_is_inclusive_of_the_deadline() {
    let (slot, ready) = rose_after(0);
    let t = lifecycle::water(&slot, ready, &mut FixedJitter(1.0)).expect("water at deadline");
    assert_eq!(t.slot.stage(), Stage::Sprouting);
    assert_eq!(t.slot.next_ready_at(), Some(ready + 15_000));
}

#[test]
fn watering_is_not_allowed_once_ready_to_fertilize() {
    let (slot, ready) = rose_after(3);
    assert_eq!(slot.stage(), Stage::ReadyToFertilize);
    let err = lifecycle::water(&slot, ready + 60_000, &mut FixedJitter(1.0)).unwrap_err();
    assert!(matches!(err, GardenError::InvalidStage { stage: Stage::ReadyToFertilize, .. }));
}

#[test]
fn watering_an_empty_slot_reports_nothing_planted() {
    let err = lifecycle::water(&Slot::empty(7), 0, &mut FixedJitter(1.0)).unwrap_err();
    assert_eq!(err.user_message(), "Nothing is planted here!");
}

#[test]
fn growth_jitter_stays_within_ten_percent() {
    let mut rng = GardenRng::new(0x5eed, 0);
    let lo = (15_000.0 * JITTER_MIN).ceil() as u64;
    let hi = (15_000.0 * JITTER_MAX).floor() as u64;
    let (slot, ready) = rose_after(0);
    for _ in 0..500 {
        let t = lifecycle::water(&slot, ready, &mut rng).unwrap();
        let duration = t.slot.next_ready_at().unwrap() - ready;
        assert!((lo..=hi).contains(&duration), "duration {duration} outside [{lo}, {hi}]");
    }
}

#[test]
fn fertilizing_matures_the_plant_with_a_short_timer() {
    let (slot, ready) = rose_after(3);
    let t = lifecycle::fertilize(&slot, ready).expect("fertilize");
    assert_eq!(t.slot.stage(), Stage::Mature);
    assert!(t.slot.fertilized());
    assert_eq!(t.slot.health(), MAX_HEALTH);
    assert_eq!(t.slot.next_ready_at(), Some(ready + 4_500));
    assert_eq!(t.event, TransitionEvent::Fertilized { slot: 0 });
}

#[test]
fn fertilizing_does_not_wait_for_the_watering_timer() {
    let (slot, ready) = rose_after(3);
    assert!(lifecycle::fertilize(&slot, ready - 10_000).is_ok());
}

#[test]
fn fertilizing_twice_or_too_early_is_rejected() {
    let (growing, ready) = rose_after(2);
    let err = lifecycle::fertilize(&growing, ready).unwrap_err();
    assert!(matches!(err, GardenError::InvalidStage { stage: Stage::Growing, .. }));

    let (slot, ready) = rose_after(3);
    let mature = lifecycle::fertilize(&slot, ready).unwrap().slot;
    let err = lifecycle::fertilize(&mature, ready + 10_000).unwrap_err();
    assert!(matches!(err, GardenError::InvalidStage { stage: Stage::Mature, .. }));
}

#[test]
fn harvest_pays_the_full_health_bonus_and_empties_the_slot() {
    let (slot, ready) = rose_after(3);
    let mature = lifecycle::fertilize(&slot, ready).unwrap().slot;
    let harvest_at = mature.next_ready_at().unwrap();

    let early = lifecycle::harvest(&mature, harvest_at - 1).unwrap_err();
    assert!(matches!(early, GardenError::NotReady { .. }));

    let t = lifecycle::harvest(&mature, harvest_at).expect("harvest when ready");
    assert_eq!(t.slot, Slot::empty(0));
    match t.event {
        TransitionEvent::Harvested { slot: 0, outcome } => {
            assert!((outcome.sell_price - 24.0).abs() < 1e-9, "20 * 1.2");
            assert_eq!(outcome.experience_yield, 10);
            assert_eq!(outcome.health_at_harvest, MAX_HEALTH);
            assert_eq!(outcome.seed.id, "rose");
        }
        other => panic!("expected Harvested, got {other:?}"),
    }
}

#[test]
fn harvest_requires_a_fertilized_mature_plant() {
    let (slot, ready) = rose_after(3);
    let err = lifecycle::harvest(&slot, ready + 100_000).unwrap_err();
    assert!(matches!(err, GardenError::InvalidStage { stage: Stage::ReadyToFertilize, .. }));
    assert_eq!(err.user_message(), "Plant is not ready for harvest yet!");

    let err = lifecycle::harvest(&Slot::empty(0), 0).unwrap_err();
    assert_eq!(err.user_message(), "Nothing is planted here!");
}

#[test]
fn harvest_without_full_health_has_no_bonus() {
    let seed = rose();
    let wilted = Slot::from_parts(0, Stage::Mature, Some(seed), Some(0), Some(100), true, 80)
        .expect("valid mature slot");
    let t = lifecycle::harvest(&wilted, 100).unwrap();
    match t.event {
        TransitionEvent::Harvested { outcome, .. } => {
            assert!((outcome.sell_price - 20.0).abs() < 1e-9);
            assert_eq!(outcome.health_at_harvest, 80);
        }
        other => panic!("expected Harvested, got {other:?}"),
    }
}
