//! Auto-action planning.
//!
//! RULE: a tick's plan is computed from one `now` for every slot, before
//! any slot is touched. Each slot gets at most one action per tick.

use crate::{
    settings::AutoActions,
    slot::{Garden, Slot, Stage},
    types::{SlotIndex, Timestamp},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AutoAction {
    Water,
    Fertilize,
    Harvest,
}

/// The action the driver would take on this slot right now, if any.
pub fn next_action(slot: &Slot, now: Timestamp, policy: &AutoActions) -> Option<AutoAction> {
    match slot.stage() {
        Stage::Mature if policy.harvest && slot.fertilized() && slot.is_ready(now) => {
            Some(AutoAction::Harvest)
        }
        Stage::ReadyToFertilize if policy.fertilize && !slot.fertilized() => {
            Some(AutoAction::Fertilize)
        }
        stage if policy.water && stage.is_waterable() && slot.is_ready(now) => {
            Some(AutoAction::Water)
        }
        _ => None,
    }
}

/// Every eligible (slot, action) pair for this tick, in slot order.
pub fn plan(garden: &Garden, now: Timestamp, policy: &AutoActions) -> Vec<(SlotIndex, AutoAction)> {
    if !policy.any() {
        return Vec::new();
    }
    garden
        .slots()
        .iter()
        .filter_map(|slot| next_action(slot, now, policy).map(|a| (slot.index(), a)))
        .collect()
}
