//! Bouquet assembly and sale from harvested inventory.

use garden_core::{
    bouquet::{BouquetSize, FlowerPick},
    command::PlayerCommand,
    engine::GardenEngine,
    error::GardenError,
    event::GardenEvent,
    rng::FixedJitter,
};

/// Harvest one daisy in each of `slots` in parallel. Returns the time
/// the last harvest happened.
fn harvest_daisies(engine: &mut GardenEngine, slots: usize) -> u64 {
    let mut now = 0;
    for slot in 0..slots {
        engine.plant(slot, "daisy", now).unwrap();
    }
    for _ in 0..3 {
        now += 13_000;
        for slot in 0..slots {
            engine.water(slot, now).unwrap();
        }
    }
    for slot in 0..slots {
        engine.fertilize(slot, now).unwrap();
    }
    now += 3_900;
    for slot in 0..slots {
        engine.harvest(slot, now).unwrap();
    }
    now
}

fn engine_with_daisies(count: usize) -> (GardenEngine, u64) {
    let mut engine = GardenEngine::build_test("bouquet-test".into(), 3)
        .unwrap()
        .with_jitter(FixedJitter(1.0));
    let now = harvest_daisies(&mut engine, count);
    (engine, now)
}

fn daisies(count: u32) -> Vec<FlowerPick> {
    vec![FlowerPick { seed_id: "daisy".into(), count }]
}

#[test]
fn sizes_follow_flower_counts() {
    assert_eq!(BouquetSize::classify(2), None);
    assert_eq!(BouquetSize::classify(3), Some(BouquetSize::Small));
    assert_eq!(BouquetSize::classify(4), Some(BouquetSize::Small));
    assert_eq!(BouquetSize::classify(5), Some(BouquetSize::Medium));
    assert_eq!(BouquetSize::classify(7), Some(BouquetSize::Medium));
    assert_eq!(BouquetSize::classify(8), Some(BouquetSize::Large));
    assert_eq!(BouquetSize::classify(40), Some(BouquetSize::Large));
}

#[test]
fn small_bouquet_uses_up_the_flowers() {
    let (mut engine, now) = engine_with_daisies(3);
    // floor(6 × 2 × 1.2 × 0.8) = 11 per daisy
    assert_eq!(engine.state().economy.inventory_entry("daisy").unwrap().unit_price, 11);
    let coins = engine.coins();

    let events = engine.create_bouquet(&daisies(3), "basic", now).expect("bouquet");

    let bouquet = engine.state().bouquets.iter().next().expect("bouquet recorded");
    assert_eq!(bouquet.size, BouquetSize::Small);
    assert_eq!(bouquet.total_value, 33);
    assert_eq!(bouquet.flower_count(), 3);
    assert_eq!(bouquet.created_at, now);
    assert!(bouquet.created_at_utc().is_some());
    assert!(engine.state().economy.inventory_entry("daisy").is_none(), "emptied rows are dropped");

    assert!(matches!(events[0], GardenEvent::BouquetCreated { total_value: 33, flowers: 3, .. }));
    assert!(engine.state().economy.has_achievement("florist"));
    assert_eq!(engine.coins(), coins + 50, "basic wrapper is free; florist pays 50");
}

#[test]
fn wrapper_cost_is_paid_and_added_to_the_value() {
    let (mut engine, now) = engine_with_daisies(4);
    let coins = engine.coins();

    let events = engine.create_bouquet(&daisies(4), "deluxe", now).unwrap();
    assert!(matches!(
        &events[0],
        GardenEvent::CoinsSpent { amount: 5, .. }
    ));
    let bouquet = engine.state().bouquets.iter().next().unwrap();
    assert_eq!(bouquet.total_value, 4 * 11 + 5);
    assert_eq!(bouquet.wrapper.id, "deluxe");
    assert_eq!(engine.coins(), coins - 5 + 50);
}

#[test]
fn too_few_flowers_is_rejected_without_side_effects() {
    let (mut engine, now) = engine_with_daisies(3);
    let before = engine.state().clone();

    let err = engine.create_bouquet(&daisies(2), "basic", now).unwrap_err();
    assert!(matches!(err, GardenError::BouquetTooSmall { flowers: 2 }));
    assert_eq!(err.user_message(), "Bouquet must have at least 3 flowers to be saved!");
    assert_eq!(engine.state(), &before);
}

#[test]
fn missing_flowers_and_unknown_wrappers_are_rejected() {
    let (mut engine, now) = engine_with_daisies(3);
    let before = engine.state().clone();

    let err = engine.create_bouquet(&daisies(4), "basic", now).unwrap_err();
    assert!(matches!(err, GardenError::NotEnoughFlowers { requested: 4, available: 3, .. }));

    let mixed = vec![
        FlowerPick { seed_id: "daisy".into(), count: 2 },
        FlowerPick { seed_id: "lily".into(), count: 1 },
    ];
    let err = engine.create_bouquet(&mixed, "basic", now).unwrap_err();
    assert!(matches!(err, GardenError::NotEnoughFlowers { available: 0, .. }));

    let err = engine.create_bouquet(&daisies(3), "gold_leaf", now).unwrap_err();
    assert!(matches!(err, GardenError::UnknownWrapper { .. }));

    assert_eq!(engine.state(), &before);
}

#[test]
fn oversized_pick_counts_are_rejected_not_wrapped() {
    let (mut engine, now) = engine_with_daisies(4);
    let before = engine.state().clone();
    let logged = engine.store().event_count("bouquet-test", None).unwrap();

    let command = PlayerCommand::CreateBouquet {
        flowers: vec![
            FlowerPick { seed_id: "daisy".into(), count: u32::MAX },
            FlowerPick { seed_id: "daisy".into(), count: 4 },
        ],
        wrapper_id: "basic".into(),
    };
    let err = engine.submit(command, now + 1).unwrap_err();
    assert!(matches!(err, GardenError::NotEnoughFlowers { available: 4, .. }));
    assert!(err.is_rejection());

    assert_eq!(engine.state(), &before);
    assert_eq!(engine.store().event_count("bouquet-test", None).unwrap(), logged);
}

#[test]
fn repeated_picks_of_one_seed_are_merged() {
    let (mut engine, now) = engine_with_daisies(3);
    let split = vec![
        FlowerPick { seed_id: "daisy".into(), count: 1 },
        FlowerPick { seed_id: "daisy".into(), count: 2 },
    ];
    engine.create_bouquet(&split, "basic", now).unwrap();
    let bouquet = engine.state().bouquets.iter().next().unwrap();
    assert_eq!(bouquet.flowers.len(), 1);
    assert_eq!(bouquet.flowers[0].count, 3);
}

#[test]
fn selling_credits_the_value_and_removes_the_bouquet() {
    let (mut engine, now) = engine_with_daisies(3);
    engine.create_bouquet(&daisies(3), "basic", now).unwrap();
    let id = engine.state().bouquets.iter().next().unwrap().id.clone();
    let coins = engine.coins();

    let events = engine.sell_bouquet(&id, now + 1).unwrap();
    assert_eq!(
        events,
        vec![GardenEvent::BouquetSold { at: now + 1, bouquet_id: id.clone(), coins_earned: 33 }]
    );
    assert_eq!(engine.coins(), coins + 33);
    assert!(engine.state().bouquets.is_empty());

    let err = engine.sell_bouquet(&id, now + 2).unwrap_err();
    assert!(matches!(err, GardenError::UnknownBouquet { .. }));
}

#[test]
fn bouquet_ids_are_unique() {
    let (mut engine, now) = engine_with_daisies(6);
    engine.create_bouquet(&daisies(3), "basic", now).unwrap();
    engine.create_bouquet(&daisies(3), "basic", now).unwrap();
    let ids: Vec<_> = engine.state().bouquets.iter().map(|b| b.id.clone()).collect();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
    assert!(uuid::Uuid::parse_str(&ids[0]).is_ok());
}
