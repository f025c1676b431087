//! Snapshot serialization: full game state to/from JSON.
//!
//! The blob is opaque to the store. Loading never trusts it: slots that
//! break an invariant are reset to Empty, level is recomputed from
//! experience, and an unreadable blob yields a fresh game.

use crate::{
    achievements::ProgressCounters,
    bouquet::{Bouquet, BouquetLedger},
    catalog::SeedCatalog,
    config::GameConfig,
    economy::{level_for, EconomyState, InventoryEntry},
    error::GardenResult,
    settings::GameSettings,
    slot::{Garden, Slot, Stage},
    state::GameState,
    types::{SlotIndex, Timestamp, GRID_SIZE},
};
use serde::{Deserialize, Serialize};

pub const SNAPSHOT_VERSION: u32 = 1;

/// Persisted form of a slot. The seed is stored by catalog id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotRecord {
    pub index:         SlotIndex,
    pub stage:         Stage,
    pub seed_id:       Option<String>,
    pub planted_at:    Option<Timestamp>,
    pub next_ready_at: Option<Timestamp>,
    pub fertilized:    bool,
    pub health:        u8,
}

impl From<&Slot> for SlotRecord {
    fn from(slot: &Slot) -> Self {
        Self {
            index:         slot.index(),
            stage:         slot.stage(),
            seed_id:       slot.seed().map(|s| s.id.clone()),
            planted_at:    slot.planted_at(),
            next_ready_at: slot.next_ready_at(),
            fertilized:    slot.fertilized(),
            health:        slot.health(),
        }
    }
}

impl SlotRecord {
    /// Resolve against the catalog at `position`. None when the record
    /// cannot be a valid slot there.
    fn to_slot(&self, position: SlotIndex, catalog: &SeedCatalog) -> Option<Slot> {
        if self.index != position {
            return None;
        }
        let seed = match &self.seed_id {
            Some(id) => Some(catalog.get(id).ok()?),
            None => None,
        };
        Slot::from_parts(
            self.index,
            self.stage,
            seed,
            self.planted_at,
            self.next_ready_at,
            self.fertilized,
            self.health,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSnapshot {
    #[serde(default)]
    pub version:             u32,
    pub coins:               u64,
    pub experience:          u64,
    pub level:               u32,
    pub slots:               Vec<SlotRecord>,
    pub harvested_inventory: Vec<InventoryEntry>,
    pub achievements:        Vec<String>,
    pub created_bouquets:    Vec<Bouquet>,
    #[serde(default)]
    pub counters:            ProgressCounters,
    #[serde(default)]
    pub settings:            GameSettings,
}

/// What restoring had to repair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// The blob was unreadable and a fresh game was started instead.
    pub fresh_start:     bool,
    /// Slots reset to Empty because their saved state was invalid.
    pub slots_reset:     Vec<SlotIndex>,
    /// The saved level disagreed with the saved experience.
    pub level_corrected: bool,
}

impl RestoreReport {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

impl GameState {
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            version:             SNAPSHOT_VERSION,
            coins:               self.economy.coins(),
            experience:          self.economy.experience(),
            level:               self.economy.level(),
            slots:               self.garden.slots().iter().map(SlotRecord::from).collect(),
            harvested_inventory: self.economy.inventory().cloned().collect(),
            achievements:        self.economy.achievements().cloned().collect(),
            created_bouquets:    self.bouquets.iter().cloned().collect(),
            counters:            self.counters.clone(),
            settings:            self.settings,
        }
    }

    pub fn to_json(&self) -> GardenResult<String> {
        Ok(serde_json::to_string(&self.snapshot())?)
    }

    /// Rebuild state from a parsed snapshot, sanitizing as needed.
    pub fn from_snapshot(snapshot: GameSnapshot, config: &GameConfig) -> (Self, RestoreReport) {
        let mut report = RestoreReport::default();

        let mut slots = Vec::with_capacity(GRID_SIZE);
        for position in 0..GRID_SIZE {
            let restored = snapshot
                .slots
                .get(position)
                .and_then(|record| record.to_slot(position, &config.seeds));
            match restored {
                Some(slot) => slots.push(slot),
                None => {
                    if snapshot.slots.get(position).is_some() {
                        log::warn!("snapshot: slot {position} violates slot invariants; reset to empty");
                        report.slots_reset.push(position);
                    }
                    slots.push(Slot::empty(position));
                }
            }
        }
        if snapshot.slots.len() > GRID_SIZE {
            log::warn!(
                "snapshot: {} slots saved, keeping the first {GRID_SIZE}",
                snapshot.slots.len()
            );
        }
        let garden = Garden::from_slots(slots).unwrap_or_default();

        if snapshot.level != level_for(snapshot.experience) {
            log::warn!(
                "snapshot: saved level {} does not match experience {}; recomputed",
                snapshot.level,
                snapshot.experience
            );
            report.level_corrected = true;
        }
        let economy = EconomyState::from_parts(
            snapshot.coins,
            snapshot.experience,
            snapshot.harvested_inventory,
            snapshot.achievements,
        );

        let state = Self {
            garden,
            economy,
            bouquets: BouquetLedger::from_bouquets(snapshot.created_bouquets),
            counters: snapshot.counters,
            settings: snapshot.settings,
        };
        (state, report)
    }

    /// Restore from a JSON blob. Never fails: an unreadable blob
    /// degrades to a fresh game.
    pub fn restore(json: &str, config: &GameConfig) -> (Self, RestoreReport) {
        match serde_json::from_str::<GameSnapshot>(json) {
            Ok(snapshot) => Self::from_snapshot(snapshot, config),
            Err(e) => {
                log::warn!("snapshot: unreadable save data ({e}); starting a fresh game");
                let report = RestoreReport { fresh_start: true, ..Default::default() };
                (Self::new(config), report)
            }
        }
    }
}
