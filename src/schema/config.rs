//! Configuration types for the optimizer.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Number of elite parents carried into every generation.
pub const ELITE_PARENTS: usize = 2;

/// Top-level optimizer configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Population settings.
    #[serde(default)]
    pub population: PopulationConfig,
    /// Search domain.
    #[serde(default)]
    pub bounds: SearchBounds,
    /// Retain/select/mutate fractions.
    #[serde(default)]
    pub selection: SelectionConfig,
    /// Stopping rules.
    #[serde(default)]
    pub termination: TerminationConfig,
    /// Behavioural variants of the reference algorithm.
    #[serde(default)]
    pub modes: ModeConfig,
    /// Evaluate fitness on the rayon thread pool (native only).
    #[serde(default)]
    pub parallel_evaluation: bool,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

/// Population settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Number of candidates per generation.
    #[serde(default = "default_population_size")]
    pub size: usize,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: default_population_size(),
        }
    }
}

fn default_population_size() -> usize {
    1500
}

/// Closed interval `[min, max]` for one coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies inside the interval.
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Rectangular search domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchBounds {
    #[serde(default = "default_x_bounds")]
    pub x: Interval,
    #[serde(default = "default_y_bounds")]
    pub y: Interval,
}

impl Default for SearchBounds {
    fn default() -> Self {
        Self {
            x: default_x_bounds(),
            y: default_y_bounds(),
        }
    }
}

fn default_x_bounds() -> Interval {
    Interval::new(3.0, 10.0)
}
fn default_y_bounds() -> Interval {
    Interval::new(4.0, 8.0)
}

/// Survivor selection and variation fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Share of the ranked population kept as-is after the two parents.
    #[serde(default = "default_retain_fraction")]
    pub retain_fraction: f64,
    /// Probability of keeping each lower-ranked candidate for diversity.
    #[serde(default = "default_select_fraction")]
    pub select_fraction: f64,
    /// Per-candidate probability of replacing one coordinate.
    #[serde(default = "default_mutate_fraction")]
    pub mutate_fraction: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            retain_fraction: default_retain_fraction(),
            select_fraction: default_select_fraction(),
            mutate_fraction: default_mutate_fraction(),
        }
    }
}

fn default_retain_fraction() -> f64 {
    0.20
}
fn default_select_fraction() -> f64 {
    0.05
}
fn default_mutate_fraction() -> f64 {
    0.01
}

/// Stopping rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminationConfig {
    /// Stop once the stagnation counter reaches this value.
    #[serde(default = "default_stagnation_threshold")]
    pub stagnation_threshold: usize,
    /// Hard cap on generations, independent of stagnation.
    #[serde(default = "default_max_generations")]
    pub max_generations: usize,
}

impl Default for TerminationConfig {
    fn default() -> Self {
        Self {
            stagnation_threshold: default_stagnation_threshold(),
            max_generations: default_max_generations(),
        }
    }
}

fn default_stagnation_threshold() -> usize {
    30
}
fn default_max_generations() -> usize {
    10_000
}

/// Selects between the reference behaviour and its corrected variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeConfig {
    #[serde(default)]
    pub sampling: SamplingMode,
    #[serde(default)]
    pub objective: ObjectiveForm,
    #[serde(default)]
    pub stagnation: StagnationRule,
    #[serde(default)]
    pub reporting: BestReporting,
}

/// How a fresh coordinate is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SamplingMode {
    /// `u * max + 1`, shifted by `min` when below it and clamped at `max`.
    /// Not uniform over the interval.
    #[default]
    Legacy,
    /// Uniform over the closed interval.
    Uniform,
}

/// Where the logarithm term sits in the objective.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectiveForm {
    /// `sin(10πx + 10/(1+y²) + ln(x²+y²))`
    #[default]
    Nested,
    /// `sin(10πx + 10/(1+y²)) + ln(x²+y²)`
    Additive,
}

/// How a drop in average fitness affects the stagnation counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StagnationRule {
    /// Only exact repeats of the best average count; regressions are ignored.
    #[default]
    IgnoreRegressions,
    /// Any generation that does not strictly improve counts.
    CountRegressions,
}

/// Which candidate and fitness the final report carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BestReporting {
    /// First member of the final population, paired with the population average.
    #[default]
    PopulationHead,
    /// Fittest member of the final population, paired with its own fitness.
    Reranked,
}

impl SelectionConfig {
    /// Number of ranked candidates retained unconditionally after the parents.
    #[inline]
    pub fn retain_length(&self, population_size: usize) -> usize {
        (population_size as f64 * self.retain_fraction).floor() as usize
    }
}

impl OptimizerConfig {
    /// Load a configuration from a JSON file and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let size = self.population.size;
        if size <= ELITE_PARENTS {
            return Err(ConfigError::PopulationTooSmall(size));
        }

        let check_bounds = |interval: Interval, axis: &'static str| {
            // The width must be finite too or uniform sampling overflows.
            let width = interval.max - interval.min;
            if !interval.min.is_finite()
                || !interval.max.is_finite()
                || !width.is_finite()
                || interval.min >= interval.max
            {
                Err(ConfigError::InvalidBounds {
                    axis,
                    min: interval.min,
                    max: interval.max,
                })
            } else {
                Ok(())
            }
        };
        check_bounds(self.bounds.x, "x")?;
        check_bounds(self.bounds.y, "y")?;

        let check_fraction = |value: f64, name: &'static str| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(ConfigError::FractionOutOfRange { name, value })
            }
        };
        check_fraction(self.selection.retain_fraction, "retain_fraction")?;
        check_fraction(self.selection.select_fraction, "select_fraction")?;
        check_fraction(self.selection.mutate_fraction, "mutate_fraction")?;

        let retained = self.selection.retain_length(size);
        if retained == 0 {
            return Err(ConfigError::EmptyRetainPool {
                size,
                retain_fraction: self.selection.retain_fraction,
            });
        }
        if ELITE_PARENTS + retained > size {
            return Err(ConfigError::RetainExceedsPopulation {
                parents: ELITE_PARENTS,
                retained,
                size,
            });
        }

        if self.termination.stagnation_threshold == 0 {
            return Err(ConfigError::InvalidStagnationThreshold);
        }
        if self.termination.max_generations == 0 {
            return Err(ConfigError::InvalidGenerationCap);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Population size must exceed the 2 elite parents, got {0}")]
    PopulationTooSmall(usize),
    #[error("Invalid {axis} bounds: min ({min}) must be finite and below max ({max})")]
    InvalidBounds {
        axis: &'static str,
        min: f64,
        max: f64,
    },
    #[error("{name} must be within [0, 1], got {value}")]
    FractionOutOfRange { name: &'static str, value: f64 },
    #[error(
        "retain_fraction {retain_fraction} keeps no candidates from a population of {size}; crossover needs at least one"
    )]
    EmptyRetainPool { size: usize, retain_fraction: f64 },
    #[error("{parents} parents plus {retained} retained exceed population size {size}")]
    RetainExceedsPopulation {
        parents: usize,
        retained: usize,
        size: usize,
    },
    #[error("Stagnation threshold must be non-zero")]
    InvalidStagnationThreshold,
    #[error("Generation cap must be non-zero")]
    InvalidGenerationCap,
}

/// Errors raised while loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Error reading config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error parsing config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_valid() {
        let config = OptimizerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.population.size, 1500);
        assert_eq!(config.termination.stagnation_threshold, 30);
        assert_eq!(config.modes.sampling, SamplingMode::Legacy);
    }

    #[test]
    fn test_retain_length_floors() {
        let selection = SelectionConfig::default();
        assert_eq!(selection.retain_length(50), 10);
        assert_eq!(selection.retain_length(49), 9);
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let mut config = OptimizerConfig::default();
        config.bounds.y = Interval::new(8.0, 4.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBounds { axis: "y", .. })
        ));

        config.bounds.y = Interval::new(4.0, 4.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_overflowing_width() {
        let mut config = OptimizerConfig::default();
        config.bounds.x = Interval::new(-1.0e308, 1.0e308);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBounds { axis: "x", .. })
        ));

        config.bounds.x = Interval::new(-1.0e307, 1.0e307);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_small_population() {
        let mut config = OptimizerConfig::default();
        config.population.size = 2;
        assert_eq!(config.validate(), Err(ConfigError::PopulationTooSmall(2)));
    }

    #[test]
    fn test_rejects_fraction_out_of_range() {
        let mut config = OptimizerConfig::default();
        config.selection.mutate_fraction = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::FractionOutOfRange {
                name: "mutate_fraction",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_empty_retain_pool() {
        let mut config = OptimizerConfig::default();
        config.population.size = 4;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyRetainPool { size: 4, .. })
        ));
    }

    #[test]
    fn test_rejects_retain_overflow() {
        let mut config = OptimizerConfig::default();
        config.population.size = 10;
        config.selection.retain_fraction = 0.9;
        assert_eq!(
            config.validate(),
            Err(ConfigError::RetainExceedsPopulation {
                parents: 2,
                retained: 9,
                size: 10,
            })
        );
    }

    #[test]
    fn test_serialization() {
        let mut config = OptimizerConfig::default();
        config.random_seed = Some(7);
        config.modes.reporting = BestReporting::Reranked;
        let json = serde_json::to_string(&config).unwrap();
        let parsed: OptimizerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let parsed: OptimizerConfig =
            serde_json::from_str(r#"{ "population": { "size": 50 }, "random_seed": 3 }"#).unwrap();
        assert_eq!(parsed.population.size, 50);
        assert_eq!(parsed.bounds, SearchBounds::default());
        assert_eq!(parsed.selection, SelectionConfig::default());
        assert_eq!(parsed.random_seed, Some(3));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "population": {{ "size": 60 }}, "modes": {{ "objective": "Additive" }} }}"#
        )
        .unwrap();

        let config = OptimizerConfig::load(file.path()).unwrap();
        assert_eq!(config.population.size, 60);
        assert_eq!(config.modes.objective, ObjectiveForm::Additive);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "population": {{ "size": 1 }} }}"#).unwrap();
        assert!(matches!(
            OptimizerConfig::load(file.path()),
            Err(LoadError::Invalid(ConfigError::PopulationTooSmall(1)))
        ));

        let mut garbage = tempfile::NamedTempFile::new().unwrap();
        write!(garbage, "not json").unwrap();
        assert!(matches!(
            OptimizerConfig::load(garbage.path()),
            Err(LoadError::Parse(_))
        ));
    }
}
