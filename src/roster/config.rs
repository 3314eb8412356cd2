//! Roster configuration.

use crate::cp::SolverConfig;

/// Whether every lector must eventually perform every reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RotationMode {
    /// Each (lector, reading) pair occurs at least once. Too few days make
    /// the model infeasible.
    #[default]
    Required,
    /// The rotation requirement is dropped; only coverage, the per-day
    /// limit, blocked days, and fairness remain.
    Relaxed,
}

/// Configuration for building and solving a roster.
///
/// # Examples
///
/// ```
/// use lector_schedule::roster::{RosterConfig, RotationMode};
///
/// let config = RosterConfig::default()
///     .with_time_limit_secs(10)
///     .with_num_workers(2)
///     .with_seed(42)
///     .with_rotation(RotationMode::Relaxed);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RosterConfig {
    /// Solver limits: time, workers, seed.
    pub solver: SolverConfig,

    /// Rotation requirement.
    pub rotation: RotationMode,

    /// How many readings one lector may perform on the same day.
    pub max_readings_per_day: usize,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            solver: SolverConfig::default(),
            rotation: RotationMode::Required,
            max_readings_per_day: 1,
        }
    }
}

impl RosterConfig {
    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Sets the wall-clock time limit in whole seconds.
    pub fn with_time_limit_secs(mut self, secs: u64) -> Self {
        self.solver.time_limit_ms = Some(secs.saturating_mul(1_000));
        self
    }

    pub fn with_num_workers(mut self, n: usize) -> Self {
        self.solver.num_workers = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.solver.seed = Some(seed);
        self
    }

    pub fn with_rotation(mut self, rotation: RotationMode) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_max_readings_per_day(mut self, n: usize) -> Self {
        self.max_readings_per_day = n;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.solver.validate()?;
        if self.max_readings_per_day == 0 {
            return Err("max_readings_per_day must be at least 1".into());
        }
        Ok(())
    }
}
