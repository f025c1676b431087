use crate::{slot::Stage, types::{SlotIndex, Timestamp}};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GardenError {
    #[error("Slot {slot}: cannot {action} while {stage:?}")]
    InvalidStage {
        slot:   SlotIndex,
        stage:  Stage,
        action: &'static str,
    },

    #[error("Slot {slot}: not ready until {ready_at} (now {now})")]
    NotReady {
        slot:     SlotIndex,
        ready_at: Timestamp,
        now:      Timestamp,
    },

    #[error("Insufficient funds: need {required}, have {available}")]
    InsufficientFunds { required: u64, available: u64 },

    #[error("Slot {slot} is outside the garden grid")]
    SlotOutOfRange { slot: SlotIndex },

    #[error("Unknown seed '{seed_id}'")]
    UnknownSeed { seed_id: String },

    #[error("Unknown wrapper '{wrapper_id}'")]
    UnknownWrapper { wrapper_id: String },

    #[error("Bouquet '{bouquet_id}' not found")]
    UnknownBouquet { bouquet_id: String },

    #[error("Bouquet needs at least 3 flowers, got {flowers}")]
    BouquetTooSmall { flowers: u32 },

    #[error("Not enough '{seed_id}' flowers: requested {requested}, have {available}")]
    NotEnoughFlowers {
        seed_id:   String,
        requested: u32,
        available: u32,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GardenError {
    /// The fixed player-facing message for a rejected action.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidStage { stage: Stage::Empty, action, .. } if *action != "plant" => {
                "Nothing is planted here!"
            }
            Self::InvalidStage { action: "plant", .. } => "This slot is already planted!",
            Self::InvalidStage { action: "water", .. } => "This plant cannot be watered further!",
            Self::InvalidStage { action: "fertilize", .. } => {
                "This plant can't be fertilized yet or already is!"
            }
            Self::InvalidStage { .. } => "Plant is not ready for harvest yet!",
            Self::NotReady { .. } => "Too early! Wait for the timer to finish.",
            Self::InsufficientFunds { .. } => "Not enough coins!",
            Self::SlotOutOfRange { .. } => "That slot does not exist.",
            Self::UnknownSeed { .. } => "Unknown seed type.",
            Self::UnknownWrapper { .. } => "Unknown wrapper.",
            Self::UnknownBouquet { .. } => "That bouquet no longer exists.",
            Self::BouquetTooSmall { .. } => "Bouquet must have at least 3 flowers to be saved!",
            Self::NotEnoughFlowers { .. } => "You don't have enough of those flowers.",
            Self::Database(_) | Self::Serialization(_) | Self::Other(_) => {
                "Something went wrong. Please try again."
            }
        }
    }

    /// True for rejections caused by game rules rather than infrastructure.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Database(_) | Self::Serialization(_) | Self::Other(_))
    }
}

pub type GardenResult<T> = Result<T, GardenError>;
