//! The garden engine. Owns the game state and is its only writer.
//!
//! ACTION PATH (same for manual and automatic actions):
//!   1. Validate the slot transition (lifecycle.rs, pure).
//!   2. Apply economic effects to a copy of the state (economy.rs).
//!   3. Evaluate achievements against lifetime counters.
//!   4. Persist the action's events (and snapshot, if auto-save is on)
//!      in one store transaction.
//!   5. Swap the copy in.
//! A failure at any step leaves the live state untouched.

use crate::{
    achievements,
    auto::{self, AutoAction},
    bouquet::{self, FlowerPick},
    command::PlayerCommand,
    config::GameConfig,
    economy::{LevelUp, UnlockOutcome, FERTILIZE_EXPERIENCE, PLANT_EXPERIENCE, WATER_EXPERIENCE},
    error::{GardenError, GardenResult},
    event::{EventLogEntry, GardenEvent},
    lifecycle::{self, Transition, TransitionEvent},
    rng::{GardenRng, JitterSource, RngBank, RngStream},
    settings::SettingsPatch,
    slot::Slot,
    snapshot::{GameSnapshot, RestoreReport},
    state::GameState,
    store::GardenStore,
    types::{ProfileId, SlotIndex, Timestamp},
};

pub struct GardenEngine {
    pub profile_id: ProfileId,
    config:         GameConfig,
    state:          GameState,
    jitter:         Box<dyn JitterSource + Send>,
    id_rng:         GardenRng,
    store:          GardenStore,
}

impl GardenEngine {
    /// Start a fresh game for `profile_id`.
    pub fn new(
        profile_id: ProfileId,
        seed:       u64,
        config:     GameConfig,
        store:      GardenStore,
    ) -> GardenResult<Self> {
        store.ensure_profile(&profile_id, seed, env!("CARGO_PKG_VERSION"), 0)?;
        let state = GameState::new(&config);
        Ok(Self::assemble(profile_id, RngBank::new(seed), config, state, store))
    }

    /// Fresh game on an in-memory store with the builtin catalog.
    pub fn build_test(profile_id: ProfileId, seed: u64) -> GardenResult<Self> {
        let store = GardenStore::in_memory()?;
        store.migrate()?;
        Self::new(profile_id, seed, GameConfig::builtin(), store)
    }

    /// Resume the profile's saved game. A missing save starts a fresh game;
    /// an unreadable or invalid one is repaired or replaced, never trusted.
    pub fn load(
        profile_id: ProfileId,
        seed:       u64,
        config:     GameConfig,
        store:      GardenStore,
    ) -> GardenResult<(Self, RestoreReport)> {
        let seed = store.profile_seed(&profile_id)?.unwrap_or(seed);
        store.ensure_profile(&profile_id, seed, env!("CARGO_PKG_VERSION"), 0)?;

        let (state, report) = match store.load_snapshot(&profile_id)? {
            Some((saved_at, json)) => {
                log::info!("engine: restoring {profile_id} from save written at {saved_at}");
                GameState::restore(&json, &config)
            }
            None => (GameState::new(&config), RestoreReport::default()),
        };

        // Rebase the streams on the history length so a resumed game
        // does not replay draws (and bouquet ids) it already used.
        let generation = store.event_count(&profile_id, None)? as u64;
        let bank = RngBank::new(seed ^ generation.wrapping_mul(0xa076_1d64_78bd_642f));
        Ok((Self::assemble(profile_id, bank, config, state, store), report))
    }

    fn assemble(
        profile_id: ProfileId,
        bank:       RngBank,
        config:     GameConfig,
        state:      GameState,
        store:      GardenStore,
    ) -> Self {
        Self {
            profile_id,
            config,
            state,
            jitter: Box::new(bank.for_stream(RngStream::Growth)),
            id_rng: bank.for_stream(RngStream::Identity),
            store,
        }
    }

    /// Replace the growth jitter source (tests pin it with FixedJitter).
    pub fn with_jitter(mut self, jitter: impl JitterSource + Send + 'static) -> Self {
        self.jitter = Box::new(jitter);
        self
    }

    // ── Queries ────────────────────────────────────────────────

    pub fn state(&self) -> &GameState { &self.state }
    pub fn config(&self) -> &GameConfig { &self.config }
    pub fn store(&self) -> &GardenStore { &self.store }

    /// Give the store back, e.g. to reopen the profile with `load`.
    pub fn into_store(self) -> GardenStore { self.store }

    pub fn slot(&self, index: SlotIndex) -> GardenResult<&Slot> {
        self.state.garden.slot(index)
    }

    pub fn coins(&self) -> u64 { self.state.economy.coins() }
    pub fn experience(&self) -> u64 { self.state.economy.experience() }
    pub fn level(&self) -> u32 { self.state.economy.level() }

    pub fn snapshot(&self) -> GameSnapshot {
        self.state.snapshot()
    }

    /// Write the current snapshot regardless of the auto-save setting.
    pub fn save(&self, now: Timestamp) -> GardenResult<()> {
        self.store.save_snapshot(&self.profile_id, now, &self.state.to_json()?)
    }

    // ── Slot actions ───────────────────────────────────────────

    /// Plant `seed_id` into an Empty slot, paying its cost in the same step.
    pub fn plant(&mut self, slot: SlotIndex, seed_id: &str, now: Timestamp) -> GardenResult<Vec<GardenEvent>> {
        let transition = self
            .config
            .seeds
            .get(seed_id)
            .and_then(|seed| lifecycle::plant(self.state.garden.slot(slot)?, &seed, now));
        let result = transition.and_then(|t| self.apply_transition(t, now));
        log_outcome("plant", slot, now, result)
    }

    pub fn water(&mut self, slot: SlotIndex, now: Timestamp) -> GardenResult<Vec<GardenEvent>> {
        let jitter = &mut *self.jitter;
        let transition = self.state.garden.slot(slot).and_then(|current| lifecycle::water(current, now, jitter));
        let result = transition.and_then(|t| self.apply_transition(t, now));
        log_outcome("water", slot, now, result)
    }

    pub fn fertilize(&mut self, slot: SlotIndex, now: Timestamp) -> GardenResult<Vec<GardenEvent>> {
        let transition = self.state.garden.slot(slot).and_then(|current| lifecycle::fertilize(current, now));
        let result = transition.and_then(|t| self.apply_transition(t, now));
        log_outcome("fertilize", slot, now, result)
    }

    pub fn harvest(&mut self, slot: SlotIndex, now: Timestamp) -> GardenResult<Vec<GardenEvent>> {
        let transition = self.state.garden.slot(slot).and_then(|current| lifecycle::harvest(current, now));
        let result = transition.and_then(|t| self.apply_transition(t, now));
        log_outcome("harvest", slot, now, result)
    }

    /// Run the auto-action driver once. Eligibility is decided for every
    /// slot against this single `now` before any action is applied.
    pub fn auto_tick(&mut self, now: Timestamp) -> GardenResult<Vec<GardenEvent>> {
        let plan = auto::plan(&self.state.garden, now, &self.state.settings.auto_actions);
        let mut out = Vec::new();
        for (slot, action) in &plan {
            let result = match action {
                AutoAction::Water     => self.water(*slot, now),
                AutoAction::Fertilize => self.fertilize(*slot, now),
                AutoAction::Harvest   => self.harvest(*slot, now),
            };
            match result {
                Ok(events) => out.extend(events),
                Err(e) if e.is_rejection() => {}
                Err(e) => return Err(e),
            }
        }
        if !plan.is_empty() {
            log::debug!("now={now} auto: {} slots acted on, {} events", plan.len(), out.len());
        }
        Ok(out)
    }

    // ── Economy actions ────────────────────────────────────────

    /// Spend coins on a non-planting purchase.
    pub fn spend_coins(&mut self, amount: u64, reason: &str, now: Timestamp) -> GardenResult<Vec<GardenEvent>> {
        let mut next = self.state.clone();
        if let Err(e) = next.economy.spend_coins(amount) {
            log::debug!("now={now} economy: spend of {amount} for {reason} rejected: {e}");
            return Err(e);
        }
        let events = vec![GardenEvent::CoinsSpent { at: now, amount, reason: reason.to_string() }];
        self.commit(next, events, now)
    }

    /// Record an achievement the caller has decided is earned.
    pub fn unlock_achievement(&mut self, id: &str, now: Timestamp) -> GardenResult<UnlockOutcome> {
        let mut next = self.state.clone();
        let outcome = next.economy.unlock_achievement(id);
        if let UnlockOutcome::Unlocked { bonus } = outcome {
            let events = vec![GardenEvent::AchievementUnlocked {
                at: now,
                achievement: id.to_string(),
                bonus,
            }];
            self.commit(next, events, now)?;
        }
        Ok(outcome)
    }

    pub fn create_bouquet(
        &mut self,
        picks:      &[FlowerPick],
        wrapper_id: &str,
        now:        Timestamp,
    ) -> GardenResult<Vec<GardenEvent>> {
        let wrapper = self
            .config
            .wrapper(wrapper_id)
            .cloned()
            .ok_or_else(|| GardenError::UnknownWrapper { wrapper_id: wrapper_id.to_string() })?;
        let id = self.next_bouquet_id();
        let bouquet = match bouquet::compose(&self.state.economy, picks, &wrapper, id, now) {
            Ok(bouquet) => bouquet,
            Err(e) => {
                log::debug!("now={now} bouquet: rejected: {e}");
                return Err(e);
            }
        };

        let mut next = self.state.clone();
        next.economy.take_flowers(&bouquet.picks())?;
        next.economy.spend_coins(wrapper.cost)?;
        next.counters.bouquets_created += 1;

        let mut events = Vec::new();
        if wrapper.cost > 0 {
            events.push(GardenEvent::CoinsSpent {
                at:     now,
                amount: wrapper.cost,
                reason: format!("{} wrapper", wrapper.name),
            });
        }
        events.push(GardenEvent::BouquetCreated {
            at:          now,
            bouquet_id:  bouquet.id.clone(),
            size:        bouquet.size,
            flowers:     bouquet.flower_count(),
            wrapper_id:  wrapper.id.clone(),
            total_value: bouquet.total_value,
        });
        next.bouquets.push(bouquet);
        unlock_earned(&mut next, now, &mut events);
        self.commit(next, events, now)
    }

    pub fn sell_bouquet(&mut self, bouquet_id: &str, now: Timestamp) -> GardenResult<Vec<GardenEvent>> {
        let mut next = self.state.clone();
        let bouquet = next.bouquets.take(bouquet_id)?;
        next.economy.add_coins(bouquet.total_value);
        let events = vec![GardenEvent::BouquetSold {
            at:           now,
            bouquet_id:   bouquet.id,
            coins_earned: bouquet.total_value,
        }];
        self.commit(next, events, now)
    }

    pub fn update_settings(&mut self, patch: &SettingsPatch, now: Timestamp) -> GardenResult<()> {
        let mut next = self.state.clone();
        next.settings.apply(patch);
        // Settings changes persist even with auto-save off.
        self.commit_with(next, Vec::new(), now, true)?;
        Ok(())
    }

    /// Dispatch a player command.
    pub fn submit(&mut self, command: PlayerCommand, now: Timestamp) -> GardenResult<Vec<GardenEvent>> {
        match command {
            PlayerCommand::Plant { slot, seed_id }      => self.plant(slot, &seed_id, now),
            PlayerCommand::Water { slot }               => self.water(slot, now),
            PlayerCommand::Fertilize { slot }           => self.fertilize(slot, now),
            PlayerCommand::Harvest { slot }             => self.harvest(slot, now),
            PlayerCommand::SpendCoins { amount, reason } => self.spend_coins(amount, &reason, now),
            PlayerCommand::CreateBouquet { flowers, wrapper_id } => {
                self.create_bouquet(&flowers, &wrapper_id, now)
            }
            PlayerCommand::SellBouquet { bouquet_id }   => self.sell_bouquet(&bouquet_id, now),
            PlayerCommand::UpdateSettings { patch }     => {
                self.update_settings(&patch, now)?;
                Ok(Vec::new())
            }
        }
    }

    // ── Internals ──────────────────────────────────────────────

    /// Apply a validated transition and its economic effects, then commit.
    fn apply_transition(&mut self, transition: Transition, now: Timestamp) -> GardenResult<Vec<GardenEvent>> {
        let Transition { slot, event } = transition;
        let ready_at = slot.next_ready_at().unwrap_or(now);
        let mut next = self.state.clone();
        let mut events = Vec::new();

        let level_up = match event {
            TransitionEvent::Planted { slot: index, seed, cost } => {
                next.economy.apply_plant_cost(&seed)?;
                next.counters.plants_placed += 1;
                events.push(GardenEvent::SeedPlanted {
                    at:         now,
                    slot:       index,
                    seed_id:    seed.id.clone(),
                    cost,
                    ready_at,
                    experience: PLANT_EXPERIENCE,
                });
                next.economy.apply_action_experience(PLANT_EXPERIENCE)
            }
            TransitionEvent::Watered { slot: index, to, .. } => {
                next.counters.waterings += 1;
                events.push(GardenEvent::PlantWatered {
                    at:         now,
                    slot:       index,
                    stage:      to,
                    ready_at,
                    health:     slot.health(),
                    experience: WATER_EXPERIENCE,
                });
                next.economy.apply_action_experience(WATER_EXPERIENCE)
            }
            TransitionEvent::Fertilized { slot: index } => {
                next.counters.fertilizations += 1;
                events.push(GardenEvent::PlantFertilized {
                    at:         now,
                    slot:       index,
                    ready_at,
                    experience: FERTILIZE_EXPERIENCE,
                });
                next.economy.apply_action_experience(FERTILIZE_EXPERIENCE)
            }
            TransitionEvent::Harvested { slot: index, outcome } => {
                let level_before = next.economy.level();
                let receipt = next.economy.apply_harvest_outcome(&outcome, level_before);
                next.counters.harvests += 1;
                events.push(GardenEvent::FlowerHarvested {
                    at:                now,
                    slot:              index,
                    seed_id:           outcome.seed.id.clone(),
                    coins_earned:      receipt.coins_earned,
                    experience:        receipt.experience,
                    health_at_harvest: outcome.health_at_harvest,
                    unit_price:        receipt.unit_price,
                });
                receipt.level_up
            }
        };

        push_level_up(level_up, now, &mut events);
        next.garden.commit(slot);
        unlock_earned(&mut next, now, &mut events);
        self.commit(next, events, now)
    }

    fn commit(
        &mut self,
        next:   GameState,
        events: Vec<GardenEvent>,
        now:    Timestamp,
    ) -> GardenResult<Vec<GardenEvent>> {
        let save = next.settings.auto_save;
        self.commit_with(next, events, now, save)
    }

    /// Persist then swap in `next`. The live state only changes once the
    /// store has accepted the action; events are logged only after that.
    fn commit_with(
        &mut self,
        next:   GameState,
        events: Vec<GardenEvent>,
        now:    Timestamp,
        save:   bool,
    ) -> GardenResult<Vec<GardenEvent>> {
        let entries = events
            .iter()
            .map(|event| {
                Ok(EventLogEntry {
                    id:         None,
                    profile_id: self.profile_id.clone(),
                    at:         event.at(),
                    event_type: event.type_name().to_string(),
                    payload:    serde_json::to_string(event)?,
                })
            })
            .collect::<GardenResult<Vec<_>>>()?;

        let snapshot_json = if save {
            Some(next.to_json()?)
        } else {
            None
        };
        self.store.commit_action(
            &entries,
            snapshot_json.as_deref().map(|json| (self.profile_id.as_str(), now, json)),
        )?;

        self.state = next;
        for event in &events {
            log_committed(event);
        }
        Ok(events)
    }

    fn next_bouquet_id(&mut self) -> String {
        uuid::Builder::from_random_bytes(self.id_rng.next_bytes_16())
            .into_uuid()
            .to_string()
    }
}

fn push_level_up(level_up: Option<LevelUp>, now: Timestamp, events: &mut Vec<GardenEvent>) {
    if let Some(up) = level_up {
        events.push(GardenEvent::LevelUp { at: now, level: up.to, bonus: up.bonus });
    }
}

/// Unlock every achievement the lifetime counters now satisfy.
fn unlock_earned(next: &mut GameState, now: Timestamp, events: &mut Vec<GardenEvent>) {
    let level = next.economy.level();
    let earned: Vec<&'static str> = achievements::earned(&next.counters, level).collect();
    for id in earned {
        if let UnlockOutcome::Unlocked { bonus } = next.economy.unlock_achievement(id) {
            events.push(GardenEvent::AchievementUnlocked {
                at: now,
                achievement: id.to_string(),
                bonus,
            });
        }
    }
}

fn log_committed(event: &GardenEvent) {
    match event {
        GardenEvent::SeedPlanted { at, slot, seed_id, cost, .. } => {
            log::info!("now={at} garden: planted {seed_id} in slot {slot} for {cost} coins");
        }
        GardenEvent::PlantWatered { at, slot, stage, .. } => {
            log::info!("now={at} garden: watered slot {slot}, now {stage:?}");
        }
        GardenEvent::PlantFertilized { at, slot, .. } => {
            log::info!("now={at} garden: fertilized slot {slot}");
        }
        GardenEvent::FlowerHarvested { at, slot, seed_id, coins_earned, .. } => {
            log::info!("now={at} garden: harvested {seed_id} from slot {slot} for {coins_earned} coins");
        }
        GardenEvent::LevelUp { at, level, bonus } => {
            log::info!("now={at} progression: reached level {level} (+{bonus} coins)");
        }
        GardenEvent::AchievementUnlocked { at, achievement, bonus } => {
            log::info!("now={at} progression: achievement {achievement} unlocked (+{bonus} coins)");
        }
        GardenEvent::CoinsSpent { at, amount, reason } => {
            log::info!("now={at} economy: spent {amount} coins on {reason}");
        }
        GardenEvent::BouquetCreated { at, bouquet_id, size, total_value, .. } => {
            log::info!("now={at} bouquet: {size:?} bouquet {bouquet_id} worth {total_value} coins");
        }
        GardenEvent::BouquetSold { at, bouquet_id, coins_earned } => {
            log::info!("now={at} bouquet: sold {bouquet_id} for {coins_earned} coins");
        }
    }
}

fn log_outcome(
    action: &str,
    slot:   SlotIndex,
    now:    Timestamp,
    result: GardenResult<Vec<GardenEvent>>,
) -> GardenResult<Vec<GardenEvent>> {
    if let Err(e) = &result {
        log::debug!("now={now} garden: {action} on slot {slot} rejected: {e}");
    }
    result
}
