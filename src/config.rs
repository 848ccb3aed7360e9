use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    pursuer_speed_for_level, DEFAULT_LEVEL, DEFAULT_LIVES, DEFAULT_PURSUED_COUNT,
    DEFAULT_PURSUER_COUNT, ROUND_SECONDS, TICK_MS,
};
use crate::controller::StrategyKind;
use crate::error::{ConfigError, SetupError};
use crate::types::Speed;

/// Round parameters. Every field has a default, so partial TOML files work.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub tick_ms: u64,
    pub round_seconds: i64,
    pub pursued_count: usize,
    pub pursuer_count: usize,
    /// How many of the pursuers are driven by input bindings instead of AI.
    pub input_pursuers: usize,
    pub level: u8,
    pub lives: i32,
    pub pursued_speed: Speed,
    pub seed: Option<u32>,
    /// Drive pursued actors with the random strategy; used for headless runs.
    pub autopilot: bool,
    /// AI strategies cycled over the pursuers. Empty keeps the registry's roster.
    pub roster: Vec<StrategyKind>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_ms: TICK_MS,
            round_seconds: ROUND_SECONDS,
            pursued_count: DEFAULT_PURSUED_COUNT,
            pursuer_count: DEFAULT_PURSUER_COUNT,
            input_pursuers: 0,
            level: DEFAULT_LEVEL,
            lives: DEFAULT_LIVES,
            pursued_speed: Speed::VeryFast,
            seed: None,
            autopilot: false,
            roster: Vec::new(),
        }
    }
}

impl GameConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn pursuer_speed(&self) -> Speed {
        pursuer_speed_for_level(self.level)
    }

    /// Input slots a round built from this config will claim.
    pub fn inputs_needed(&self) -> usize {
        let pursued = if self.autopilot { 0 } else { self.pursued_count };
        pursued + self.input_pursuers
    }

    pub fn validate(&self) -> Result<(), SetupError> {
        if self.tick_ms == 0 {
            return Err(SetupError::ZeroTick);
        }
        if self.pursued_count == 0 {
            return Err(SetupError::NoPursued);
        }
        if self.input_pursuers > self.pursuer_count {
            return Err(SetupError::TooManyInputPursuers {
                input: self.input_pursuers,
                total: self.pursuer_count,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_round() {
        let config = GameConfig::default();
        assert_eq!(config.tick_ms, 33);
        assert_eq!(config.round_seconds, 180);
        assert_eq!(config.lives, 3);
        assert_eq!(config.pursuer_speed(), Speed::Normal);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config = GameConfig::from_toml_str(
            "level = 4\npursuer_count = 2\nautopilot = true\npursued_speed = \"fast\"\n",
        )
        .expect("config parses");
        assert_eq!(config.pursuer_speed(), Speed::VeryFast);
        assert_eq!(config.pursuer_count, 2);
        assert_eq!(config.pursued_speed, Speed::Fast);
        assert_eq!(config.tick_ms, TICK_MS);
        assert_eq!(config.inputs_needed(), 0);
    }

    #[test]
    fn roster_reads_strategy_names() {
        let config = GameConfig::from_toml_str("roster = [\"greedy\", \"pathfinding\"]\n")
            .expect("config parses");
        assert_eq!(
            config.roster,
            vec![StrategyKind::Greedy, StrategyKind::Pathfinding]
        );
        assert!(GameConfig::default().roster.is_empty());
        assert!(matches!(
            GameConfig::from_toml_str("roster = [\"chaser\"]\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn unknown_level_falls_back_to_normal_speed() {
        let config = GameConfig {
            level: 9,
            ..GameConfig::default()
        };
        assert_eq!(config.pursuer_speed(), Speed::Normal);
    }

    #[test]
    fn rejects_unusable_setups() {
        let zero_tick = GameConfig {
            tick_ms: 0,
            ..GameConfig::default()
        };
        assert!(matches!(zero_tick.validate(), Err(SetupError::ZeroTick)));

        let nobody = GameConfig {
            pursued_count: 0,
            ..GameConfig::default()
        };
        assert!(matches!(nobody.validate(), Err(SetupError::NoPursued)));

        let too_many = GameConfig {
            input_pursuers: 5,
            ..GameConfig::default()
        };
        assert!(matches!(
            too_many.validate(),
            Err(SetupError::TooManyInputPursuers { input: 5, total: 4 })
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let result = GameConfig::from_toml_str("level = \"high\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
