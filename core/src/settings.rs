use serde::{Deserialize, Serialize};

/// Which actions the periodic auto-action driver may take.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AutoActions {
    pub water:     bool,
    pub fertilize: bool,
    pub harvest:   bool,
}

impl AutoActions {
    pub fn all() -> Self {
        Self { water: true, fertilize: true, harvest: true }
    }

    pub fn any(&self) -> bool {
        self.water || self.fertilize || self.harvest
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSettings {
    pub sound_enabled: bool,
    pub animations:    bool,
    /// Save a snapshot after every committed action.
    pub auto_save:     bool,
    #[serde(default)]
    pub auto_actions:  AutoActions,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            animations:    true,
            auto_save:     true,
            auto_actions:  AutoActions::default(),
        }
    }
}

/// Partial settings update; `None` leaves a field as it is.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettingsPatch {
    #[serde(default)]
    pub sound_enabled: Option<bool>,
    #[serde(default)]
    pub animations:    Option<bool>,
    #[serde(default)]
    pub auto_save:     Option<bool>,
    #[serde(default)]
    pub auto_actions:  Option<AutoActions>,
}

impl GameSettings {
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(v) = patch.sound_enabled { self.sound_enabled = v; }
        if let Some(v) = patch.animations    { self.animations    = v; }
        if let Some(v) = patch.auto_save     { self.auto_save     = v; }
        if let Some(v) = patch.auto_actions  { self.auto_actions  = v; }
    }
}
