//! Lector roster scheduling.
//!
//! Assigns lectors to readings across a sequence of mass days so that:
//!
//! - every reading of every day has exactly one lector;
//! - no lector reads more than once a day (configurable);
//! - every lector eventually performs every reading (full rotation,
//!   relaxable through [`RotationMode::Relaxed`]);
//! - nobody is scheduled on a blocked day;
//!
//! while maximizing the minimum number of readings any lector gets.
//!
//! # Stages
//!
//! [`ScheduleInput`] → [`RosterModelBuilder`] (constraints, objective) →
//! [`RosterModel::solve`] → [`RosterOutcome`] carrying a [`Roster`].
//! [`RosterRunner`] runs all of them.

mod builder;
mod config;
mod projection;
mod runner;
mod types;

pub use builder::{RosterModel, RosterModelBuilder};
pub use config::{RosterConfig, RotationMode};
pub use projection::{Assignment, Roster};
pub use runner::{RosterOutcome, RosterResult, RosterRunner};
pub use types::{BlockedDate, Day, InputSet, InputShapeError, Lector, Reading, ScheduleInput};
