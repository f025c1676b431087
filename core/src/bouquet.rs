//! Bouquet assembly from harvested flowers.

use crate::{
    catalog::WrapperOption,
    economy::EconomyState,
    error::{GardenError, GardenResult},
    types::{SeedId, Timestamp},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MIN_BOUQUET_FLOWERS: u32 = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BouquetSize {
    Small,
    Medium,
    Large,
}

impl BouquetSize {
    /// 3–4 Small, 5–7 Medium, 8+ Large. Fewer than 3 is not a bouquet.
    pub fn classify(flowers: u32) -> Option<Self> {
        match flowers {
            n if n < MIN_BOUQUET_FLOWERS => None,
            3..=4 => Some(Self::Small),
            5..=7 => Some(Self::Medium),
            _     => Some(Self::Large),
        }
    }
}

/// One requested line of a bouquet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlowerPick {
    pub seed_id: SeedId,
    pub count:   u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BouquetFlower {
    pub seed_id:    SeedId,
    pub name:       String,
    pub count:      u32,
    pub unit_price: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bouquet {
    pub id:          String,
    pub flowers:     Vec<BouquetFlower>,
    pub wrapper:     WrapperOption,
    pub total_value: u64,
    pub size:        BouquetSize,
    pub created_at:  Timestamp,
}

impl Bouquet {
    pub fn flower_count(&self) -> u32 {
        self.flowers.iter().map(|f| f.count).sum()
    }

    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(self.created_at as i64)
    }

    /// Collapsed (seed id, count) pairs, as the inventory sees them.
    pub(crate) fn picks(&self) -> Vec<(SeedId, u32)> {
        self.flowers.iter().map(|f| (f.seed_id.clone(), f.count)).collect()
    }
}

/// Validate picks against the inventory and wallet and price the result.
/// Nothing is mutated; the engine commits the returned bouquet.
pub fn compose(
    economy: &EconomyState,
    picks:   &[FlowerPick],
    wrapper: &WrapperOption,
    id:      String,
    now:     Timestamp,
) -> GardenResult<Bouquet> {
    // Counts beyond u32 can never be in stock, so overflow is a shortfall.
    let overflow = |seed_id: &str| GardenError::NotEnoughFlowers {
        seed_id:   seed_id.to_string(),
        requested: u32::MAX,
        available: economy.inventory_entry(seed_id).map_or(0, |e| e.count),
    };

    let mut merged: BTreeMap<&str, u32> = BTreeMap::new();
    let mut total: u32 = 0;
    for pick in picks.iter().filter(|p| p.count > 0) {
        let seed_id = pick.seed_id.as_str();
        let count = merged.entry(seed_id).or_default();
        *count = count.checked_add(pick.count).ok_or_else(|| overflow(seed_id))?;
        total = total.checked_add(pick.count).ok_or_else(|| overflow(seed_id))?;
    }

    let size = BouquetSize::classify(total)
        .ok_or(GardenError::BouquetTooSmall { flowers: total })?;

    let mut flowers = Vec::with_capacity(merged.len());
    for (seed_id, count) in merged {
        let entry = economy
            .inventory_entry(seed_id)
            .filter(|e| e.count >= count)
            .ok_or_else(|| GardenError::NotEnoughFlowers {
                seed_id:   seed_id.to_string(),
                requested: count,
                available: economy.inventory_entry(seed_id).map_or(0, |e| e.count),
            })?;
        flowers.push(BouquetFlower {
            seed_id:    entry.seed_id.clone(),
            name:       entry.name.clone(),
            count,
            unit_price: entry.unit_price,
        });
    }

    if economy.coins() < wrapper.cost {
        return Err(GardenError::InsufficientFunds {
            required:  wrapper.cost,
            available: economy.coins(),
        });
    }

    let flower_value: u64 = flowers.iter().map(|f| f.unit_price * f.count as u64).sum();
    Ok(Bouquet {
        id,
        flowers,
        wrapper: wrapper.clone(),
        total_value: flower_value + wrapper.cost,
        size,
        created_at: now,
    })
}

/// Bouquets made and not yet sold, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BouquetLedger {
    bouquets: Vec<Bouquet>,
}

impl BouquetLedger {
    pub fn from_bouquets(bouquets: Vec<Bouquet>) -> Self {
        Self { bouquets }
    }

    pub fn push(&mut self, bouquet: Bouquet) {
        self.bouquets.push(bouquet);
    }

    pub fn get(&self, id: &str) -> Option<&Bouquet> {
        self.bouquets.iter().find(|b| b.id == id)
    }

    pub fn take(&mut self, id: &str) -> GardenResult<Bouquet> {
        let pos = self
            .bouquets
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| GardenError::UnknownBouquet { bouquet_id: id.to_string() })?;
        Ok(self.bouquets.remove(pos))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bouquet> {
        self.bouquets.iter()
    }

    pub fn len(&self) -> usize {
        self.bouquets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bouquets.is_empty()
    }
}

