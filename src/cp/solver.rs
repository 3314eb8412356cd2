//! CP solver interface and the exact branch-and-bound implementation.

use super::model::CpModel;
use super::search::{Incumbent, Search, SearchStats};
use super::variables::{BoolVar, IntVar};
use std::time::{Duration, Instant};

/// Status of the solver after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverStatus {
    /// Proven optimal solution found (or any solution, for models without
    /// an objective).
    Optimal,
    /// Feasible solution found, search stopped before proving optimality.
    Feasible,
    /// Proven that no feasible solution exists.
    Infeasible,
    /// Model is invalid or malformed.
    ModelInvalid,
    /// Limits reached before any solution was found.
    Unknown,
}

/// Solution from a CP solver.
#[derive(Debug, Clone)]
pub struct CpSolution {
    /// Solver status.
    pub status: SolverStatus,
    /// Objective function value (if any).
    pub objective_value: Option<i64>,
    /// Value of every model variable, indexed by handle. Empty when no
    /// solution was found.
    pub values: Vec<i64>,
    /// Solve time in milliseconds.
    pub solve_time_ms: u64,
    /// Search counters summed over all workers.
    pub stats: SearchStats,
}

impl CpSolution {
    /// Creates an empty solution with the given status.
    pub fn empty(status: SolverStatus) -> Self {
        Self {
            status,
            objective_value: None,
            values: Vec::new(),
            solve_time_ms: 0,
            stats: SearchStats::default(),
        }
    }

    /// Whether a feasible solution was found.
    pub fn is_solution_found(&self) -> bool {
        matches!(self.status, SolverStatus::Optimal | SolverStatus::Feasible)
    }

    /// Value of an integer (or boolean) variable.
    pub fn value(&self, var: impl Into<IntVar>) -> Option<i64> {
        self.values.get(var.into().index()).copied()
    }

    /// Value of a boolean variable.
    pub fn bool_value(&self, var: BoolVar) -> Option<bool> {
        self.value(var).map(|v| v != 0)
    }
}

/// Solver configuration.
///
/// # Examples
///
/// ```
/// use lector_schedule::cp::SolverConfig;
///
/// let config = SolverConfig::default()
///     .with_time_limit_ms(5_000)
///     .with_num_workers(4)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig {
    /// Maximum solve time in milliseconds. `None` searches until done.
    pub time_limit_ms: Option<u64>,
    /// Number of parallel search workers.
    pub num_workers: usize,
    /// Random seed for tie-breaking. Worker `i` uses `seed + i`.
    pub seed: Option<u64>,
    /// Stop after finding the first feasible solution.
    pub stop_after_first: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: Some(60_000),
            num_workers: 1,
            seed: None,
            stop_after_first: false,
        }
    }
}

impl SolverConfig {
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Removes the time limit.
    pub fn without_time_limit(mut self) -> Self {
        self.time_limit_ms = None;
        self
    }

    pub fn with_num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_stop_after_first(mut self, stop: bool) -> Self {
        self.stop_after_first = stop;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.num_workers == 0 {
            return Err("num_workers must be at least 1".into());
        }
        if self.time_limit_ms == Some(0) {
            return Err("time_limit_ms must be positive".into());
        }
        Ok(())
    }
}

/// Trait for CP solver implementations.
///
/// The call blocks until the solver reaches a terminal status or its
/// time limit.
pub trait CpSolver {
    /// Solves the model and returns a solution.
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution;
}

/// Exact depth-first branch-and-bound solver.
///
/// Propagates every linear constraint to bounds consistency, branches
/// fail-first on unmet cardinality constraints, and restarts from the root
/// whenever the incumbent improves. With several workers, each explores the
/// whole tree with its own tie-breaking and they share the incumbent; the
/// first worker to exhaust its tree proves the result.
///
/// # Examples
///
/// ```
/// use lector_schedule::cp::{BranchAndBoundSolver, CpModel, CpSolver, SolverConfig, SolverStatus};
///
/// let mut model = CpModel::new("pick-one");
/// let a = model.new_bool_var("a");
/// let b = model.new_bool_var("b");
/// model.add_exactly_one([a, b]);
///
/// let solution = BranchAndBoundSolver::new().solve(&model, &SolverConfig::default());
/// assert_eq!(solution.status, SolverStatus::Optimal);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchAndBoundSolver;

impl BranchAndBoundSolver {
    pub fn new() -> Self {
        Self
    }
}

struct WorkerReport {
    completed: bool,
    stats: SearchStats,
}

fn run_worker(model: &CpModel, incumbent: &Incumbent, seed: u64, worker: usize) -> WorkerReport {
    let mut search = Search::new(model, seed.wrapping_add(worker as u64));
    let completed = search.run(incumbent);
    if completed {
        // The tree is exhausted: nothing the others find can change the answer.
        incumbent.halt();
    }
    tracing::trace!(worker, completed, nodes = search.stats.nodes, "worker finished");
    WorkerReport {
        completed,
        stats: search.stats,
    }
}

#[cfg(feature = "parallel")]
fn run_workers(
    model: &CpModel,
    incumbent: &Incumbent,
    seed: u64,
    workers: usize,
) -> Vec<WorkerReport> {
    use rayon::prelude::*;

    if workers == 1 {
        return vec![run_worker(model, incumbent, seed, 0)];
    }
    let run_all = || {
        (0..workers)
            .into_par_iter()
            .map(|worker| run_worker(model, incumbent, seed, worker))
            .collect::<Vec<_>>()
    };
    match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool.install(run_all),
        Err(err) => {
            tracing::warn!(%err, "could not build worker pool, using the global pool");
            run_all()
        }
    }
}

#[cfg(not(feature = "parallel"))]
fn run_workers(
    model: &CpModel,
    incumbent: &Incumbent,
    seed: u64,
    workers: usize,
) -> Vec<WorkerReport> {
    if workers > 1 {
        tracing::warn!(workers, "built without the `parallel` feature, using one worker");
    }
    vec![run_worker(model, incumbent, seed, 0)]
}

impl CpSolver for BranchAndBoundSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        if let Err(err) = config.validate() {
            tracing::warn!(%err, "invalid solver configuration");
            return CpSolution::empty(SolverStatus::ModelInvalid);
        }
        if let Err(err) = model.validate() {
            tracing::warn!(%err, model = %model.name, "invalid model");
            return CpSolution::empty(SolverStatus::ModelInvalid);
        }

        let start_time = Instant::now();
        let deadline = config
            .time_limit_ms
            .map(|ms| start_time + Duration::from_millis(ms));
        let seed = config.seed.unwrap_or_else(rand::random);
        let incumbent = Incumbent::new(model.objective, deadline, config.stop_after_first);

        let reports = run_workers(model, &incumbent, seed, config.num_workers);

        let completed = reports.iter().any(|r| r.completed);
        let mut stats = SearchStats::default();
        for report in &reports {
            stats.merge(&report.stats);
        }
        let values = incumbent.take_solution();
        let status = match (values.is_some(), completed) {
            (true, true) => SolverStatus::Optimal,
            (true, false) => SolverStatus::Feasible,
            (false, true) => SolverStatus::Infeasible,
            (false, false) => SolverStatus::Unknown,
        };
        let values = values.unwrap_or_default();
        let objective_value = model
            .objective
            .and_then(|objective| values.get(objective.var().index()).copied());

        let solution = CpSolution {
            status,
            objective_value,
            values,
            solve_time_ms: start_time.elapsed().as_millis() as u64,
            stats,
        };
        tracing::debug!(
            model = %model.name,
            status = ?solution.status,
            objective = ?solution.objective_value,
            nodes = solution.stats.nodes,
            time_ms = solution.solve_time_ms,
            "solve finished"
        );
        solution
    }
}
