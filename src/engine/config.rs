//! Engine configuration: peasant allotment, seed and heuristic weights.
//! Loaded from TOML for the autoplay and arena CLIs.
//!
//! ```toml
//! peasants_per_player = 7
//! seed = 42
//! preset = "aggressive"
//!
//! [weights]
//! peasant_cost = 0.75
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::games::carcassonne::evaluator::{weights_for_preset, ScoringWeights, DEFAULT_WEIGHTS};
use crate::games::carcassonne::game::DEFAULT_PEASANTS_PER_PLAYER;

/// Per-field overrides applied on top of the selected preset.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct WeightOverrides {
    pub sole_leader: Option<f64>,
    pub tied_leader: Option<f64>,
    pub unclaimed: Option<f64>,
    pub enemy_penalty: Option<f64>,
    pub contest_bonus: Option<f64>,
    pub enemy_region_penalty: Option<f64>,
    pub friendly_cloister: Option<f64>,
    pub enemy_cloister: Option<f64>,
    pub peasant_cost: Option<f64>,
}

impl WeightOverrides {
    pub fn apply(&self, base: ScoringWeights) -> ScoringWeights {
        ScoringWeights {
            sole_leader: self.sole_leader.unwrap_or(base.sole_leader),
            tied_leader: self.tied_leader.unwrap_or(base.tied_leader),
            unclaimed: self.unclaimed.unwrap_or(base.unclaimed),
            enemy_penalty: self.enemy_penalty.unwrap_or(base.enemy_penalty),
            contest_bonus: self.contest_bonus.unwrap_or(base.contest_bonus),
            enemy_region_penalty: self.enemy_region_penalty.unwrap_or(base.enemy_region_penalty),
            friendly_cloister: self.friendly_cloister.unwrap_or(base.friendly_cloister),
            enemy_cloister: self.enemy_cloister.unwrap_or(base.enemy_cloister),
            peasant_cost: self.peasant_cost.unwrap_or(base.peasant_cost),
        }
    }
}

/// Top-level TOML file structure.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub peasants_per_player: u32,
    pub seed: Option<u64>,
    /// Named weight preset: "default", "aggressive", "cautious".
    pub preset: Option<String>,
    pub weights: WeightOverrides,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            peasants_per_player: DEFAULT_PEASANTS_PER_PLAYER,
            seed: None,
            preset: None,
            weights: WeightOverrides::default(),
        }
    }
}

impl EngineConfig {
    /// Effective heuristic weights: preset first, then per-field overrides.
    pub fn scoring_weights(&self) -> ScoringWeights {
        let preset = self.preset.as_deref().unwrap_or("default");
        let base = weights_for_preset(preset).unwrap_or_else(|| {
            tracing::warn!(preset, "unknown weight preset, using default");
            DEFAULT_WEIGHTS
        });
        self.weights.apply(base)
    }

    /// Weights for one seat: the named preset if given and known, otherwise
    /// the config's own weights.
    pub fn weights_for(&self, preset: Option<&str>) -> ScoringWeights {
        let Some(name) = preset else {
            return self.scoring_weights();
        };
        weights_for_preset(name).unwrap_or_else(|| {
            tracing::warn!(preset = name, "unknown weight preset, using config weights");
            self.scoring_weights()
        })
    }
}

/// Load a config from a TOML file at the given path.
pub fn load_config(path: &Path) -> Result<EngineConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    parse_config(&content).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

pub fn parse_config(content: &str) -> Result<EngineConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Try to load a config from well-known paths, returning the default if none found.
pub fn load_default_config() -> EngineConfig {
    let candidates = ["engine.toml", "../engine.toml", "/etc/carcassonne/engine.toml"];
    for path in &candidates {
        let p = Path::new(path);
        if p.exists() {
            match load_config(p) {
                Ok(config) => {
                    tracing::info!(path = %p.display(), "loaded engine config");
                    return config;
                }
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "failed to load engine config");
                }
            }
        }
    }
    tracing::info!("no engine.toml found, using built-in defaults");
    EngineConfig::default()
}
