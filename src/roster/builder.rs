//! Translation of a [`ScheduleInput`] into a CP model.
//!
//! One boolean per (day, reading, lector) slot, except slots on a
//! lector's blocked day, which are never created. The constraints:
//!
//! 1. each (day, reading) is read by exactly one lector;
//! 2. each lector reads at most `max_readings_per_day` readings per day;
//! 3. each lector performs each reading at least once over the horizon
//!    (unless rotation is relaxed).
//!
//! The objective maximizes `min_readings`, bounded above by every lector's
//! total, which is the usual linearization of max-min fairness.

use super::config::{RosterConfig, RotationMode};
use super::types::ScheduleInput;
use crate::cp::{BoolVar, CpModel, IntVar, Objective};

/// Builds the roster model in stages over one owned [`CpModel`].
///
/// # Examples
///
/// ```
/// use lector_schedule::roster::{Day, Lector, Reading, RosterConfig, RosterModelBuilder, ScheduleInput};
///
/// let input = ScheduleInput::new(
///     vec![Lector::new("A"), Lector::new("B")],
///     vec![Reading::new("R1"), Reading::new("R2")],
///     vec![Day::new("D1"), Day::new("D2")],
/// )
/// .unwrap();
/// let config = RosterConfig::default();
///
/// let mut builder = RosterModelBuilder::new(&input);
/// builder.add_assignment_constraints(&config);
/// builder.add_fairness_objective(&config);
/// let model = builder.finish();
/// assert_eq!(model.cp_model().bool_var_count(), 8);
/// ```
pub struct RosterModelBuilder<'a> {
    input: &'a ScheduleInput,
    model: CpModel,
    slots: Vec<Option<BoolVar>>,
    min_readings: Option<IntVar>,
}

impl<'a> RosterModelBuilder<'a> {
    /// Creates the slot variables.
    pub fn new(input: &'a ScheduleInput) -> Self {
        let mut model = CpModel::new("lector-roster");
        let (days, readings, lectors) = (input.days(), input.readings(), input.lectors());
        let mut slots = Vec::with_capacity(days.len() * readings.len() * lectors.len());
        for (d, day) in days.iter().enumerate() {
            for reading in readings {
                for (l, lector) in lectors.iter().enumerate() {
                    let slot = (!input.is_blocked(l, d)).then(|| {
                        model.new_bool_var(format!("slot|{}|{day}|{reading}", lector.name()))
                    });
                    slots.push(slot);
                }
            }
        }
        tracing::debug!(
            slots = slots.len(),
            variables = model.var_count(),
            "created slot variables"
        );
        Self {
            input,
            model,
            slots,
            min_readings: None,
        }
    }

    fn slot(&self, day: usize, reading: usize, lector: usize) -> Option<BoolVar> {
        let (readings, lectors) = (self.input.readings().len(), self.input.lectors().len());
        self.slots[(day * readings + reading) * lectors + lector]
    }

    /// Slot variables of one lector over the whole horizon.
    fn lector_slots(&self, lector: usize) -> Vec<BoolVar> {
        let (days, readings) = (self.input.days().len(), self.input.readings().len());
        (0..days)
            .flat_map(|d| (0..readings).map(move |r| (d, r)))
            .filter_map(|(d, r)| self.slot(d, r, lector))
            .collect()
    }

    /// Adds coverage, per-day limit, and (unless relaxed) rotation.
    pub fn add_assignment_constraints(&mut self, config: &RosterConfig) {
        let days = self.input.days().len();
        let readings = self.input.readings().len();
        let lectors = self.input.lectors().len();
        let before = self.model.constraint_count();

        for d in 0..days {
            for r in 0..readings {
                let vars: Vec<_> = (0..lectors).filter_map(|l| self.slot(d, r, l)).collect();
                self.model.add_exactly_one(vars);
            }
        }

        // Redundant once the limit reaches the number of readings.
        let per_day = config.max_readings_per_day;
        if per_day < readings {
            for d in 0..days {
                for l in 0..lectors {
                    let vars: Vec<_> = (0..readings).filter_map(|r| self.slot(d, r, l)).collect();
                    if vars.len() > per_day {
                        self.model.add_at_most(vars, per_day as i64);
                    }
                }
            }
        }

        if config.rotation == RotationMode::Required {
            for r in 0..readings {
                for l in 0..lectors {
                    let vars: Vec<_> = (0..days).filter_map(|d| self.slot(d, r, l)).collect();
                    self.model.add_at_least_one(vars);
                }
            }
        }

        tracing::debug!(
            constraints = self.model.constraint_count() - before,
            rotation = ?config.rotation,
            per_day,
            "added assignment constraints"
        );
    }

    /// Adds `min_readings <= total(l)` for every lector and maximizes it.
    ///
    /// The domain of `min_readings` is capped by the average load and by
    /// the most constrained lector's availability. Under
    /// [`RotationMode::Required`] it is also bounded below by the number of
    /// readings.
    pub fn add_fairness_objective(&mut self, config: &RosterConfig) {
        let days = self.input.days().len();
        let readings = self.input.readings().len();
        let lectors = self.input.lectors().len();

        let per_day = config.max_readings_per_day.min(readings);
        let average = days * readings / lectors;
        let least_available = (0..lectors)
            .map(|l| self.input.available_days(l) * per_day)
            .min()
            .unwrap_or(0);
        let upper = average.min(least_available) as i64;

        let min_readings = self.model.new_int_var("min_readings", 0, upper);
        for l in 0..lectors {
            let vars = self.lector_slots(l);
            self.model.add_le_sum(min_readings, &vars);
        }
        // Full rotation: every lector reads each reading at least once.
        if config.rotation == RotationMode::Required {
            self.model
                .add_linear(vec![(min_readings, 1)], Some(readings as i64), None);
        }
        self.model.set_objective(Objective::Maximize(min_readings));
        self.min_readings = Some(min_readings);
        tracing::debug!(upper, "added max-min fairness objective");
    }

    /// Hands the finished model over for solving.
    pub fn finish(self) -> RosterModel<'a> {
        RosterModel {
            input: self.input,
            model: self.model,
            slots: self.slots,
            min_readings: self.min_readings,
        }
    }
}

/// A fully built roster model, ready to be solved once.
pub struct RosterModel<'a> {
    pub(crate) input: &'a ScheduleInput,
    pub(crate) model: CpModel,
    pub(crate) slots: Vec<Option<BoolVar>>,
    pub(crate) min_readings: Option<IntVar>,
}

impl<'a> RosterModel<'a> {
    /// Runs every building stage for `input` under `config`.
    pub fn build(input: &'a ScheduleInput, config: &RosterConfig) -> Self {
        let mut builder = RosterModelBuilder::new(input);
        builder.add_assignment_constraints(config);
        builder.add_fairness_objective(config);
        builder.finish()
    }

    /// The underlying CP model.
    pub fn cp_model(&self) -> &CpModel {
        &self.model
    }

    /// The fairness variable, if the objective was added.
    pub fn min_readings(&self) -> Option<IntVar> {
        self.min_readings
    }

    pub fn input(&self) -> &'a ScheduleInput {
        self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::Constraint;
    use crate::roster::{Day, Lector, Reading};

    fn input(lectors: Vec<Lector>, readings: usize, days: usize) -> ScheduleInput {
        ScheduleInput::new(
            lectors,
            (1..=readings).map(|r| Reading::new(format!("R{r}"))).collect(),
            (1..=days).map(|d| Day::new(format!("D{d}"))).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_blocked_slots_are_not_created() {
        let input = input(
            vec![Lector::new("A").with_blocked(["D1"]), Lector::new("B")],
            2,
            2,
        );
        let builder = RosterModelBuilder::new(&input);

        // 2 days x 2 readings x 2 lectors, minus A's 2 slots on D1.
        assert_eq!(builder.model.bool_var_count(), 6);
        assert!(builder.slot(0, 0, 0).is_none());
        assert!(builder.slot(0, 1, 0).is_none());
        assert!(builder.slot(1, 0, 0).is_some());
        assert!(builder.slot(0, 0, 1).is_some());
    }

    #[test]
    fn test_constraint_counts() {
        let input = input(vec![Lector::new("A"), Lector::new("B"), Lector::new("C")], 2, 4);
        let config = RosterConfig::default();
        let mut builder = RosterModelBuilder::new(&input);
        builder.add_assignment_constraints(&config);

        // coverage 4*2 + per-day 4*3 + rotation 2*3
        assert_eq!(builder.model.constraint_count(), 8 + 12 + 6);
    }

    #[test]
    fn test_relaxed_rotation_drops_constraint() {
        let input = input(vec![Lector::new("A"), Lector::new("B")], 2, 2);
        let config = RosterConfig::default().with_rotation(RotationMode::Relaxed);
        let mut builder = RosterModelBuilder::new(&input);
        builder.add_assignment_constraints(&config);

        // coverage 2*2 + per-day 2*2
        assert_eq!(builder.model.constraint_count(), 4 + 4);
    }

    #[test]
    fn test_per_day_limit_at_readings_count_is_skipped() {
        let input = input(vec![Lector::new("A"), Lector::new("B")], 2, 2);
        let config = RosterConfig::default()
            .with_rotation(RotationMode::Relaxed)
            .with_max_readings_per_day(2);
        let mut builder = RosterModelBuilder::new(&input);
        builder.add_assignment_constraints(&config);

        assert_eq!(builder.model.constraint_count(), 4);
    }

    #[test]
    fn test_coverage_with_everyone_blocked_is_empty() {
        let input = input(
            vec![
                Lector::new("A").with_blocked(["D1"]),
                Lector::new("B").with_blocked(["D1"]),
            ],
            1,
            2,
        );
        let mut builder = RosterModelBuilder::new(&input);
        builder.add_assignment_constraints(&RosterConfig::default());

        let Constraint::Linear { terms, lower, .. } = &builder.model.constraints[0];
        assert!(terms.is_empty());
        assert_eq!(*lower, Some(1));
    }

    #[test]
    fn test_objective_upper_bound() {
        let input = input(
            vec![
                Lector::new("A"),
                Lector::new("B"),
                Lector::new("C").with_blocked(["D1", "D2", "D3"]),
            ],
            2,
            5,
        );
        let model = RosterModel::build(&input, &RosterConfig::default());
        let min_readings = model.min_readings().unwrap();

        // average is 10 / 3 = 3, but C is only free on two days.
        assert_eq!(model.cp_model().var(min_readings).max, 2);
        assert_eq!(
            model.cp_model().objective,
            Some(Objective::Maximize(min_readings))
        );
        assert!(model.cp_model().validate().is_ok());
    }

    #[test]
    fn test_rotation_bounds_min_readings_below() {
        let input = input(vec![Lector::new("A"), Lector::new("B")], 3, 4);

        let model = RosterModel::build(&input, &RosterConfig::default());
        let min_readings = model.min_readings().unwrap();
        let Some(Constraint::Linear { terms, lower, upper }) = model.cp_model().constraints.last()
        else {
            panic!("expected a constraint");
        };
        assert_eq!(terms, &vec![(min_readings, 1)]);
        assert_eq!((*lower, *upper), (Some(3), None));

        let relaxed = RosterConfig::default().with_rotation(RotationMode::Relaxed);
        let model = RosterModel::build(&input, &relaxed);
        let Some(Constraint::Linear { lower, .. }) = model.cp_model().constraints.last() else {
            panic!("expected a constraint");
        };
        // The last constraint is the fairness link of lector B.
        assert_eq!(*lower, Some(0));
    }
}
