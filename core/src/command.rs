use crate::{
    bouquet::FlowerPick,
    settings::SettingsPatch,
    types::SlotIndex,
};
use serde::{Deserialize, Serialize};

/// All player-issued intents.
/// Variants are only ever appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PlayerCommand {
    // ── Garden ────────────────────────────────────
    Plant { slot: SlotIndex, seed_id: String },
    Water { slot: SlotIndex },
    Fertilize { slot: SlotIndex },
    Harvest { slot: SlotIndex },

    // ── Shop and bouquets ─────────────────────────
    SpendCoins { amount: u64, reason: String },
    CreateBouquet { flowers: Vec<FlowerPick>, wrapper_id: String },
    SellBouquet { bouquet_id: String },

    // ── Settings ──────────────────────────────────
    UpdateSettings { patch: SettingsPatch },
}
