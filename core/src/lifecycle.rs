//! Slot lifecycle engine: the growth state machine.
//!
//! RULES:
//!   - Every operation is a pure function of (slot, now, input).
//!     It returns the next slot state plus a TransitionEvent, or an
//!     error. The input slot is never mutated.
//!   - Nothing here reads or writes coins, experience or inventory.
//!     Those effects are described by the TransitionEvent and applied
//!     by the economy.
//!   - Readiness is inclusive: `now >= next_ready_at` passes.
//!   - Stage checks happen before timer checks.

use crate::{
    catalog::SeedDefinition,
    error::{GardenError, GardenResult},
    rng::{JitterSource, JITTER_MAX, JITTER_MIN},
    slot::{Slot, Stage, MAX_HEALTH},
    types::{SlotIndex, Timestamp},
};
use std::sync::Arc;

/// Health restored by each watering.
pub const WATER_HEALTH_GAIN: u8 = 5;
/// Fraction of the growth time a fertilized plant needs before harvest.
pub const FERTILIZE_GROWTH_FACTOR: f64 = 0.3;
/// Sell price multiplier for a plant harvested at full health.
pub const FULL_HEALTH_BONUS: f64 = 1.2;

/// What a harvest produced, before any level multiplier.
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestOutcome {
    pub seed:              Arc<SeedDefinition>,
    /// Sell price after the full-health bonus; not yet floored.
    pub sell_price:        f64,
    pub experience_yield:  u64,
    pub health_at_harvest: u8,
}

/// Economic meaning of a committed stage transition.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionEvent {
    Planted {
        slot: SlotIndex,
        seed: Arc<SeedDefinition>,
        /// Coins the economy must deduct together with the transition.
        cost: u64,
    },
    Watered {
        slot: SlotIndex,
        from: Stage,
        to:   Stage,
    },
    Fertilized {
        slot: SlotIndex,
    },
    Harvested {
        slot:    SlotIndex,
        outcome: HarvestOutcome,
    },
}

/// Result of a successful lifecycle operation. Nothing is committed
/// until the caller hands `slot` back to the garden.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub slot:  Slot,
    pub event: TransitionEvent,
}

pub fn plant(slot: &Slot, seed: &Arc<SeedDefinition>, now: Timestamp) -> GardenResult<Transition> {
    if slot.stage != Stage::Empty {
        return Err(invalid(slot, "plant"));
    }
    let next = Slot {
        index:         slot.index,
        stage:         Stage::Planted,
        seed:          Some(Arc::clone(seed)),
        planted_at:    Some(now),
        next_ready_at: Some(now.saturating_add(seed.growth_time)),
        fertilized:    false,
        health:        MAX_HEALTH,
    };
    Ok(Transition {
        slot: next,
        event: TransitionEvent::Planted {
            slot: slot.index,
            seed: Arc::clone(seed),
            cost: seed.cost,
        },
    })
}

pub fn water<J: JitterSource + ?Sized>(
    slot:   &Slot,
    now:    Timestamp,
    jitter: &mut J,
) -> GardenResult<Transition> {
    let to = slot.stage.after_watering().ok_or_else(|| invalid(slot, "water"))?;
    ensure_ready(slot, now)?;
    let seed = seed_of(slot, "water")?;

    let duration = jittered_duration(seed.growth_time, jitter.growth_jitter());
    let next = Slot {
        stage:         to,
        next_ready_at: Some(now.saturating_add(duration)),
        health:        slot.health.saturating_add(WATER_HEALTH_GAIN).min(MAX_HEALTH),
        ..slot.clone()
    };
    Ok(Transition {
        slot: next,
        event: TransitionEvent::Watered { slot: slot.index, from: slot.stage, to },
    })
}

pub fn fertilize(slot: &Slot, now: Timestamp) -> GardenResult<Transition> {
    if slot.stage != Stage::ReadyToFertilize || slot.fertilized {
        return Err(invalid(slot, "fertilize"));
    }
    let seed = seed_of(slot, "fertilize")?;

    let duration = (seed.growth_time as f64 * FERTILIZE_GROWTH_FACTOR).round() as u64;
    let next = Slot {
        stage:         Stage::Mature,
        fertilized:    true,
        next_ready_at: Some(now.saturating_add(duration)),
        health:        MAX_HEALTH,
        ..slot.clone()
    };
    Ok(Transition {
        slot: next,
        event: TransitionEvent::Fertilized { slot: slot.index },
    })
}

pub fn harvest(slot: &Slot, now: Timestamp) -> GardenResult<Transition> {
    if slot.stage != Stage::Mature || !slot.fertilized {
        return Err(invalid(slot, "harvest"));
    }
    ensure_ready(slot, now)?;
    let seed = seed_of(slot, "harvest")?;

    let mut sell_price = seed.sell_price as f64;
    if slot.health == MAX_HEALTH {
        sell_price *= FULL_HEALTH_BONUS;
    }
    let outcome = HarvestOutcome {
        seed:              Arc::clone(seed),
        sell_price,
        experience_yield:  seed.experience_yield,
        health_at_harvest: slot.health,
    };
    Ok(Transition {
        slot: Slot::empty(slot.index),
        event: TransitionEvent::Harvested { slot: slot.index, outcome },
    })
}

/// round(growth_time × jitter), kept inside the jitter bounds.
pub fn jittered_duration(growth_time: u64, jitter: f64) -> u64 {
    let base = growth_time as f64;
    let lo = (base * JITTER_MIN).ceil() as u64;
    let hi = (base * JITTER_MAX).floor() as u64;
    ((base * jitter).round() as u64).clamp(lo, hi)
}

fn ensure_ready(slot: &Slot, now: Timestamp) -> GardenResult<()> {
    match slot.next_ready_at {
        Some(ready_at) if now < ready_at => Err(GardenError::NotReady {
            slot: slot.index,
            ready_at,
            now,
        }),
        _ => Ok(()),
    }
}

fn seed_of<'a>(slot: &'a Slot, action: &'static str) -> GardenResult<&'a Arc<SeedDefinition>> {
    slot.seed.as_ref().ok_or_else(|| invalid(slot, action))
}

fn invalid(slot: &Slot, action: &'static str) -> GardenError {
    GardenError::InvalidStage { slot: slot.index, stage: slot.stage, action }
}
