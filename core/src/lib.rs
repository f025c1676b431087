//! garden-core: the rules of a 4x4 flower garden.
//!
//! No I/O outside `store`, no wall-clock reads. Every operation takes
//! `now` from the caller, and all randomness flows from `rng`.

pub mod achievements;
pub mod auto;
pub mod bouquet;
pub mod catalog;
pub mod clock;
pub mod command;
pub mod config;
pub mod economy;
pub mod engine;
pub mod error;
pub mod event;
pub mod lifecycle;
pub mod rng;
pub mod settings;
pub mod slot;
pub mod snapshot;
pub mod state;
pub mod store;
pub mod types;
