//! Constraint Programming (CP) framework.
//!
//! Provides a domain-agnostic model for constrained optimization over
//! boolean and bounded integer variables, plus an exact solver.
//!
//! # Key Components
//!
//! - **Variables**: [`BoolVar`], [`IntVar`]: handles into a model
//! - **Constraints**: [`Constraint`]: bounded linear sums; cardinality
//!   helpers (exactly-one, at-most-one, at-least-one) on [`CpModel`]
//! - **Model**: [`CpModel`]: container for variables, constraints, objective
//! - **Solver**: [`CpSolver`] trait and [`BranchAndBoundSolver`]
//!
//! # Design
//!
//! Objectives are a single variable to maximize or minimize. Composite
//! objectives such as max-min fairness are linearized by the consumer with
//! an auxiliary variable.
//!
//! The solver is exact: [`SolverStatus::Optimal`] and
//! [`SolverStatus::Infeasible`] are proofs, never guesses. Only a time
//! limit (or `stop_after_first`) can produce [`SolverStatus::Feasible`] or
//! [`SolverStatus::Unknown`].
//!
//! # References
//!
//! Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming"

mod model;
mod search;
mod solver;
mod variables;

pub use model::{Constraint, CpModel, ModelError, Objective};
pub use search::SearchStats;
pub use solver::{BranchAndBoundSolver, CpSolution, CpSolver, SolverConfig, SolverStatus};
pub use variables::{BoolVar, IntVar, VarDef, VarKind};
