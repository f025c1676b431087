//! The combined game aggregate: garden slots, economy, bouquet ledger,
//! lifetime counters and settings. One owner, one writer.

use crate::{
    achievements::ProgressCounters,
    bouquet::BouquetLedger,
    config::GameConfig,
    economy::EconomyState,
    settings::GameSettings,
    slot::Garden,
};

#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub garden:   Garden,
    pub economy:  EconomyState,
    pub bouquets: BouquetLedger,
    pub counters: ProgressCounters,
    pub settings: GameSettings,
}

impl GameState {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            garden:   Garden::new(),
            economy:  EconomyState::new(config.starting_coins),
            bouquets: BouquetLedger::default(),
            counters: ProgressCounters::default(),
            settings: GameSettings::default(),
        }
    }
}
