//! Configuration types for controlling test behavior and generation parameters.

use std::time::Duration;

use thiserror::Error;

use crate::exhaustive::MAXIMUM_SAMPLES_TO_GENERATE;

/// Environment variable that fixes the seed of every run.
pub const SEED_ENV: &str = "PROBITY_SEED";
/// Environment variable that overrides the number of tries.
pub const TRIES_ENV: &str = "PROBITY_TRIES";

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Invalid tries count: {0} (must be > 0)")]
    InvalidTries(usize),
    #[error("Invalid shrink step limit: {0} (must be > 0)")]
    InvalidShrinkSteps(usize),
    #[error("Invalid timeout (must be > 0)")]
    InvalidTimeout,
    #[error("Invalid generation size: {0} (must be > 0)")]
    InvalidGenSize(u32),
    #[error("Invalid maximum misses: {0} (must be > 0)")]
    InvalidMaxMisses(usize),
    #[error("Invalid value {value:?} for environment variable {variable}")]
    InvalidEnvironment { variable: String, value: String },
}

/// How edge cases are mixed into random generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeCasesMode {
    /// Every edge case is produced once before any random draw.
    #[default]
    First,
    /// Edge cases take every other draw until each was produced once.
    Mixin,
    /// No edge cases.
    None,
}

/// How a property run obtains its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationMode {
    /// Exhaustive when the arbitrary can enumerate at most `tries` values,
    /// randomized otherwise.
    #[default]
    Auto,
    Randomized,
    /// Always exhaustive, within `max_exhaustive_samples`. Arbitraries that
    /// cannot be enumerated within that ceiling fail the run with
    /// `ValueUnavailable`.
    Exhaustive,
}

/// Parameters for value generation
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    /// Size hint handed to generators
    pub gen_size: u32,
    /// Maximum number of edge cases per arbitrary
    pub max_edge_cases: usize,
    /// Maximum consecutive misses tolerated by filters
    pub max_misses: usize,
    /// Ceiling for exhaustive enumeration
    pub max_exhaustive_samples: u64,
    pub edge_cases_mode: EdgeCasesMode,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            gen_size: 1000,
            max_edge_cases: 1000,
            max_misses: 10_000,
            max_exhaustive_samples: MAXIMUM_SAMPLES_TO_GENERATE,
            edge_cases_mode: EdgeCasesMode::default(),
        }
    }
}

impl GenerationConfig {
    /// Validate the generation configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gen_size == 0 {
            return Err(ConfigError::InvalidGenSize(self.gen_size));
        }
        if self.max_misses == 0 {
            return Err(ConfigError::InvalidMaxMisses(self.max_misses));
        }
        Ok(())
    }
}

/// Configuration for individual property tests
#[derive(Debug, Clone, PartialEq)]
pub struct TestConfig {
    /// Number of tries
    pub tries: usize,
    /// Optional seed for reproducible tests
    pub seed: Option<u64>,
    /// Maximum number of committed shrinking steps
    pub max_shrink_steps: usize,
    /// Timeout for shrinking process
    pub shrink_timeout: Duration,
    pub generation: GenerationConfig,
    pub generation_mode: GenerationMode,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            tries: 1000,
            seed: None,
            max_shrink_steps: 1000,
            shrink_timeout: Duration::from_secs(10),
            generation: GenerationConfig::default(),
            generation_mode: GenerationMode::default(),
        }
    }
}

impl TestConfig {
    /// Validate the test configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tries == 0 {
            return Err(ConfigError::InvalidTries(self.tries));
        }
        if self.max_shrink_steps == 0 {
            return Err(ConfigError::InvalidShrinkSteps(self.max_shrink_steps));
        }
        if self.shrink_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        self.generation.validate()
    }

    pub fn with_tries(mut self, tries: usize) -> Self {
        self.tries = tries;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_edge_cases_mode(mut self, mode: EdgeCasesMode) -> Self {
        self.generation.edge_cases_mode = mode;
        self
    }

    pub fn with_generation_mode(mut self, mode: GenerationMode) -> Self {
        self.generation_mode = mode;
        self
    }

    /// Defaults from the global configuration, overridden by
    /// `PROBITY_SEED` and `PROBITY_TRIES` when set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(get_global_config(), |name| std::env::var(name).ok())
    }

    fn from_lookup(
        global: GlobalConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = global.test_config();
        if let Some(raw) = lookup(SEED_ENV) {
            config.seed = Some(parse_env(SEED_ENV, &raw)?);
        }
        if let Some(raw) = lookup(TRIES_ENV) {
            config.tries = parse_env(TRIES_ENV, &raw)?;
        }
        config.validate()?;
        Ok(config)
    }
}

fn parse_env<N: std::str::FromStr>(variable: &str, raw: &str) -> Result<N, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnvironment {
            variable: variable.to_string(),
            value: raw.to_string(),
        })
}

/// Global configuration for default test behavior
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalConfig {
    pub default_tries: usize,
    pub default_seed: Option<u64>,
    pub generation: GenerationConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            default_tries: 1000,
            default_seed: None,
            generation: GenerationConfig::default(),
        }
    }
}

impl GlobalConfig {
    /// Validate the global configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_tries == 0 {
            return Err(ConfigError::InvalidTries(self.default_tries));
        }
        self.generation.validate()
    }

    /// A test configuration inheriting these defaults.
    pub fn test_config(&self) -> TestConfig {
        TestConfig {
            tries: self.default_tries,
            seed: self.default_seed,
            generation: self.generation.clone(),
            ..TestConfig::default()
        }
    }
}

/// Global configuration manager for hierarchical configuration
#[derive(Debug, Default)]
pub struct ConfigManager {
    global_config: GlobalConfig,
}

impl ConfigManager {
    pub fn global_config(&self) -> &GlobalConfig {
        &self.global_config
    }

    pub fn set_global_config(&mut self, global_config: GlobalConfig) -> Result<(), ConfigError> {
        global_config.validate()?;
        self.global_config = global_config;
        Ok(())
    }
}

// Thread-local so parallel test threads do not observe each other's overrides.
thread_local! {
    static CONFIG_MANAGER: std::cell::RefCell<ConfigManager> = std::cell::RefCell::new(ConfigManager::default());
}

/// Get the current global configuration
pub fn get_global_config() -> GlobalConfig {
    CONFIG_MANAGER.with(|manager| manager.borrow().global_config().clone())
}

/// Set the global configuration
pub fn set_global_config(config: GlobalConfig) -> Result<(), ConfigError> {
    CONFIG_MANAGER.with(|manager| manager.borrow_mut().set_global_config(config))
}

/// Create a test configuration that inherits from global defaults
pub fn create_test_config() -> TestConfig {
    get_global_config().test_config()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TestConfig::default();
        assert_eq!(config.tries, 1000);
        assert_eq!(config.max_shrink_steps, 1000);
        assert_eq!(config.generation.gen_size, 1000);
        assert_eq!(config.generation.max_misses, 10_000);
        assert_eq!(config.generation.edge_cases_mode, EdgeCasesMode::First);
        assert_eq!(config.generation_mode, GenerationMode::Auto);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let config = TestConfig::default().with_tries(0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidTries(0)));

        let mut config = TestConfig::default();
        config.shrink_timeout = Duration::ZERO;
        assert_eq!(config.validate(), Err(ConfigError::InvalidTimeout));

        let mut config = TestConfig::default();
        config.generation.gen_size = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidGenSize(0)));
    }

    #[test]
    fn test_environment_overrides() {
        let config = TestConfig::from_lookup(GlobalConfig::default(), |name| match name {
            SEED_ENV => Some("1234".to_string()),
            TRIES_ENV => Some(" 50 ".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.seed, Some(1234));
        assert_eq!(config.tries, 50);

        let error = TestConfig::from_lookup(GlobalConfig::default(), |name| {
            (name == TRIES_ENV).then(|| "many".to_string())
        })
        .unwrap_err();
        assert!(matches!(error, ConfigError::InvalidEnvironment { .. }));
    }

    #[test]
    fn test_global_config_round_trip() {
        let global = GlobalConfig {
            default_tries: 25,
            default_seed: Some(9),
            generation: GenerationConfig::default(),
        };
        set_global_config(global.clone()).unwrap();
        assert_eq!(get_global_config(), global);

        let config = create_test_config();
        assert_eq!(config.tries, 25);
        assert_eq!(config.seed, Some(9));

        let invalid = GlobalConfig {
            default_tries: 0,
            ..GlobalConfig::default()
        };
        assert!(set_global_config(invalid).is_err());
        assert_eq!(get_global_config(), global);

        set_global_config(GlobalConfig::default()).unwrap();
    }
}
