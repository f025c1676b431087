use crate::catalog::{builtin_wrappers, SeedCatalog, SeedDefinition, WrapperOption};
use serde::Deserialize;

/// Coins a fresh game starts with.
pub const DEFAULT_STARTING_COINS: u64 = 100;

#[derive(Debug, Clone, Deserialize)]
struct SeedsFile {
    seeds: Vec<SeedDefinition>,
    #[serde(default)]
    starting_coins: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
struct WrappersFile {
    wrappers: Vec<WrapperOption>,
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub seeds:          SeedCatalog,
    pub wrappers:       Vec<WrapperOption>,
    pub starting_coins: u64,
}

impl GameConfig {
    /// Load the catalogs from `data_dir`.
    /// In tests, use GameConfig::builtin().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let seeds_path = format!("{data_dir}/seeds.json");
        let seeds_content = std::fs::read_to_string(&seeds_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {seeds_path}: {e}"))?;
        let seeds_file: SeedsFile = serde_json::from_str(&seeds_content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {seeds_path}: {e}"))?;
        let seeds = SeedCatalog::new(seeds_file.seeds)
            .map_err(|e| anyhow::anyhow!("{seeds_path}: {e}"))?;

        let wrappers_path = format!("{data_dir}/wrappers.json");
        let wrappers_content = std::fs::read_to_string(&wrappers_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {wrappers_path}: {e}"))?;
        let wrappers_file: WrappersFile = serde_json::from_str(&wrappers_content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {wrappers_path}: {e}"))?;

        log::info!(
            "config: loaded {} seeds and {} wrappers from {data_dir}",
            seeds.len(),
            wrappers_file.wrappers.len()
        );

        Ok(Self {
            seeds,
            wrappers: wrappers_file.wrappers,
            starting_coins: seeds_file.starting_coins.unwrap_or(DEFAULT_STARTING_COINS),
        })
    }

    /// The in-code catalog. Matches the files shipped in `data/`.
    pub fn builtin() -> Self {
        Self {
            seeds:          SeedCatalog::builtin(),
            wrappers:       builtin_wrappers(),
            starting_coins: DEFAULT_STARTING_COINS,
        }
    }

    pub fn wrapper(&self, wrapper_id: &str) -> Option<&WrapperOption> {
        self.wrappers.iter().find(|w| w.id == wrapper_id)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::builtin()
    }
}
