//! Solve orchestration: build, solve, classify, project.

use super::builder::RosterModel;
use super::config::RosterConfig;
use super::projection::{project, Roster};
use super::types::ScheduleInput;
use crate::cp::{BranchAndBoundSolver, CpSolver, SearchStats, SolverConfig, SolverStatus};
use crate::error::ScheduleError;

/// Terminal state of a roster solve.
///
/// "No schedule exists" is an expected outcome, so it is a variant here
/// rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterOutcome {
    /// The roster is proven to maximize the minimum readings per lector.
    Optimal(Roster),
    /// A valid roster, but the time limit stopped the optimality proof.
    FeasibleSuboptimal(Roster),
    /// No roster satisfies the hard constraints.
    Infeasible,
    /// The time limit was reached before any roster was found.
    Unknown,
}

impl RosterOutcome {
    /// The roster, for either success variant.
    pub fn roster(&self) -> Option<&Roster> {
        match self {
            RosterOutcome::Optimal(roster) | RosterOutcome::FeasibleSuboptimal(roster) => {
                Some(roster)
            }
            RosterOutcome::Infeasible | RosterOutcome::Unknown => None,
        }
    }

    /// Consumes the outcome, returning the roster if there is one.
    pub fn into_roster(self) -> Option<Roster> {
        match self {
            RosterOutcome::Optimal(roster) | RosterOutcome::FeasibleSuboptimal(roster) => {
                Some(roster)
            }
            RosterOutcome::Infeasible | RosterOutcome::Unknown => None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.roster().is_some()
    }

    pub fn is_optimal(&self) -> bool {
        matches!(self, RosterOutcome::Optimal(_))
    }

    /// Short lowercase label for logs and messages.
    pub fn label(&self) -> &'static str {
        match self {
            RosterOutcome::Optimal(_) => "optimal",
            RosterOutcome::FeasibleSuboptimal(_) => "feasible",
            RosterOutcome::Infeasible => "infeasible",
            RosterOutcome::Unknown => "unknown",
        }
    }
}

/// Result of a roster solve.
#[derive(Debug, Clone)]
pub struct RosterResult {
    /// Terminal state, with the roster on success.
    pub outcome: RosterOutcome,

    /// Objective value reported by the solver (minimum readings per lector).
    pub objective_value: Option<i64>,

    /// Wall-clock solve time in milliseconds.
    pub solve_time_ms: u64,

    /// Search counters.
    pub stats: SearchStats,
}

impl<'a> RosterModel<'a> {
    /// Solves with the built-in exact solver.
    ///
    /// Consumes the model: each solve owns a fresh one.
    pub fn solve(self, config: &SolverConfig) -> Result<RosterResult, ScheduleError> {
        self.solve_with(&BranchAndBoundSolver::new(), config)
    }

    /// Solves with any [`CpSolver`].
    ///
    /// An invalid configuration or model is an error, never an
    /// [`RosterOutcome::Unknown`].
    pub fn solve_with<S: CpSolver>(
        self,
        solver: &S,
        config: &SolverConfig,
    ) -> Result<RosterResult, ScheduleError> {
        config.validate().map_err(ScheduleError::Config)?;
        self.model.validate()?;

        let solution = solver.solve(&self.model, config);
        let outcome = match solution.status {
            SolverStatus::Optimal | SolverStatus::Feasible => {
                match project(self.input, &self.slots, &solution) {
                    Some(roster) if solution.status == SolverStatus::Optimal => {
                        RosterOutcome::Optimal(roster)
                    }
                    Some(roster) => RosterOutcome::FeasibleSuboptimal(roster),
                    None => {
                        tracing::error!("solver solution leaves a reading unassigned");
                        RosterOutcome::Unknown
                    }
                }
            }
            SolverStatus::Infeasible => RosterOutcome::Infeasible,
            SolverStatus::Unknown => RosterOutcome::Unknown,
            SolverStatus::ModelInvalid => return Err(ScheduleError::SolverRejected),
        };

        tracing::info!(
            outcome = outcome.label(),
            min_readings = ?solution.objective_value,
            nodes = solution.stats.nodes,
            time_ms = solution.solve_time_ms,
            "roster solve finished"
        );

        Ok(RosterResult {
            outcome,
            objective_value: solution.objective_value,
            solve_time_ms: solution.solve_time_ms,
            stats: solution.stats,
        })
    }
}

/// Builds and solves a roster in one call.
///
/// # Usage
///
/// ```
/// use lector_schedule::roster::{Day, Lector, Reading, RosterConfig, RosterRunner, ScheduleInput};
///
/// let input = ScheduleInput::new(
///     vec![Lector::new("A"), Lector::new("B")],
///     vec![Reading::new("R1"), Reading::new("R2")],
///     vec![Day::new("D1"), Day::new("D2")],
/// )
/// .unwrap();
///
/// let result = RosterRunner::run(&input, &RosterConfig::default().with_seed(1)).unwrap();
/// let roster = result.outcome.roster().unwrap();
/// assert_eq!(roster.min_readings_per_lector(), 2);
/// ```
pub struct RosterRunner;

impl RosterRunner {
    /// Runs every stage. Fails only on an invalid configuration.
    pub fn run(input: &ScheduleInput, config: &RosterConfig) -> Result<RosterResult, ScheduleError> {
        config.validate().map_err(ScheduleError::Config)?;
        tracing::debug!(
            lectors = input.lectors().len(),
            readings = input.readings().len(),
            days = input.days().len(),
            "building roster model"
        );
        let model = RosterModel::build(input, config);
        model.solve(&config.solver)
    }
}
