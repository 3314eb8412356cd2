//! Fair lector rosters for mass readings, solved exactly.
//!
//! - **CP (Constraint Programming)**: domain-agnostic modeling layer over
//!   boolean and bounded integer variables with linear constraints, and an
//!   exact branch-and-bound solver with parallel workers.
//! - **Roster**: the lector scheduling model built on top of it: coverage,
//!   one reading per lector per day, full rotation, blocked days, and a
//!   max-min fairness objective.
//! - **IO**: loaders for the plain-text input lists and renderers for the
//!   resulting roster.
//!
//! # Example
//!
//! ```
//! use lector_schedule::roster::{Day, Lector, Reading, RosterConfig, RosterOutcome, RosterRunner, ScheduleInput};
//!
//! let input = ScheduleInput::new(
//!     vec![Lector::new("A"), Lector::new("B").with_blocked(["nov-05"])],
//!     vec![Reading::new("first reading"), Reading::new("psalm")],
//!     vec![Day::new("oct-29"), Day::new("nov-05"), Day::new("nov-12")],
//! )
//! .unwrap();
//!
//! let result = RosterRunner::run(&input, &RosterConfig::default().with_seed(7)).unwrap();
//! // B is away on nov-05, so A would have to read twice that day.
//! assert_eq!(result.outcome, RosterOutcome::Infeasible);
//! ```

pub mod cp;
pub mod error;
pub mod io;
pub mod roster;

pub use error::ScheduleError;
