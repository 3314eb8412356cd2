//! CP model definition.

use super::variables::{BoolVar, IntVar, VarDef, VarKind};

/// A constraint in the CP model.
///
/// Every constraint is linear: `lower <= sum(coef * var) <= upper`, with
/// either side optional. Cardinality constraints over booleans
/// (exactly-one, at-most-one, at-least-one) are the unit-coefficient case.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Bounded linear sum.
    Linear {
        /// (variable, coefficient) pairs.
        terms: Vec<(IntVar, i64)>,
        /// Inclusive lower bound, if any.
        lower: Option<i64>,
        /// Inclusive upper bound, if any.
        upper: Option<i64>,
    },
}

impl Constraint {
    /// Variables referenced by this constraint.
    pub fn terms(&self) -> &[(IntVar, i64)] {
        match self {
            Constraint::Linear { terms, .. } => terms,
        }
    }
}

/// Objective function for the CP model.
///
/// Composite objectives (sums, max-min) are linearized by the caller into
/// a single auxiliary variable plus constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    /// Maximize the value of a variable.
    Maximize(IntVar),
    /// Minimize the value of a variable.
    Minimize(IntVar),
}

impl Objective {
    /// The objective variable.
    pub fn var(&self) -> IntVar {
        match *self {
            Objective::Maximize(v) | Objective::Minimize(v) => v,
        }
    }
}

/// Structural problems detected by [`CpModel::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("constraint {constraint} references undefined variable #{var}")]
    UndefinedVariable { constraint: usize, var: usize },

    #[error("objective references undefined variable #{0}")]
    UndefinedObjective(usize),

    #[error("variable '{name}' has an empty domain [{min}, {max}]")]
    EmptyDomain { name: String, min: i64, max: i64 },

    #[error("constraint {0} has neither a lower nor an upper bound")]
    Unbounded(usize),
}

/// A constraint programming model.
///
/// Owns its variables, constraints, and an optional objective. Variables
/// are created through the model and referred to by handle.
///
/// # Examples
///
/// ```
/// use lector_schedule::cp::{CpModel, Objective};
///
/// let mut model = CpModel::new("example");
/// let a = model.new_bool_var("a");
/// let b = model.new_bool_var("b");
/// model.add_exactly_one([a, b]);
/// let total = model.new_int_var("total", 0, 2);
/// model.add_le_sum(total, &[a, b]);
/// model.set_objective(Objective::Maximize(total));
/// assert!(model.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct CpModel {
    /// Model name.
    pub name: String,
    /// Variable definitions, indexed by handle.
    pub vars: Vec<VarDef>,
    /// Constraints.
    pub constraints: Vec<Constraint>,
    /// Objective function.
    pub objective: Option<Objective>,
}

impl CpModel {
    /// Creates a new empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vars: Vec::new(),
            constraints: Vec::new(),
            objective: None,
        }
    }

    /// Adds a boolean variable.
    pub fn new_bool_var(&mut self, name: impl Into<String>) -> BoolVar {
        self.vars.push(VarDef::boolean(name));
        BoolVar(self.vars.len() - 1)
    }

    /// Adds an integer variable with domain `[min, max]`.
    pub fn new_int_var(&mut self, name: impl Into<String>, min: i64, max: i64) -> IntVar {
        self.vars.push(VarDef::integer(name, min, max));
        IntVar(self.vars.len() - 1)
    }

    /// Fixes a boolean variable to a value.
    pub fn fix_bool(&mut self, var: BoolVar, value: bool) {
        let def = &mut self.vars[var.0];
        def.min = i64::from(value);
        def.max = i64::from(value);
    }

    /// Returns the definition of a variable.
    pub fn var(&self, var: impl Into<IntVar>) -> &VarDef {
        &self.vars[var.into().0]
    }

    /// Adds a constraint.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Adds `lower <= sum(coef * var) <= upper`.
    pub fn add_linear(&mut self, terms: Vec<(IntVar, i64)>, lower: Option<i64>, upper: Option<i64>) {
        self.constraints.push(Constraint::Linear {
            terms,
            lower,
            upper,
        });
    }

    /// Exactly one of `vars` is true.
    ///
    /// An empty set makes the model infeasible.
    pub fn add_exactly_one(&mut self, vars: impl IntoIterator<Item = BoolVar>) {
        self.add_linear(unit_terms(vars), Some(1), Some(1));
    }

    /// At most one of `vars` is true.
    pub fn add_at_most_one(&mut self, vars: impl IntoIterator<Item = BoolVar>) {
        self.add_at_most(vars, 1);
    }

    /// At most `k` of `vars` are true.
    pub fn add_at_most(&mut self, vars: impl IntoIterator<Item = BoolVar>, k: i64) {
        self.add_linear(unit_terms(vars), None, Some(k));
    }

    /// At least one of `vars` is true.
    ///
    /// An empty set makes the model infeasible.
    pub fn add_at_least_one(&mut self, vars: impl IntoIterator<Item = BoolVar>) {
        self.add_linear(unit_terms(vars), Some(1), None);
    }

    /// `var <= sum(vars)`.
    pub fn add_le_sum(&mut self, var: IntVar, vars: &[BoolVar]) {
        let mut terms = unit_terms(vars.iter().copied());
        terms.push((var, -1));
        self.add_linear(terms, Some(0), None);
    }

    /// Sets the objective function.
    pub fn set_objective(&mut self, objective: Objective) {
        self.objective = Some(objective);
    }

    /// Validates the model for consistency.
    ///
    /// Checks that every referenced variable exists, that initial domains
    /// are non-empty, and that each constraint is bounded on some side.
    pub fn validate(&self) -> Result<(), ModelError> {
        for def in &self.vars {
            if def.domain_size() <= 0 {
                return Err(ModelError::EmptyDomain {
                    name: def.name.clone(),
                    min: def.min,
                    max: def.max,
                });
            }
        }
        for (index, constraint) in self.constraints.iter().enumerate() {
            let Constraint::Linear {
                terms,
                lower,
                upper,
            } = constraint;
            if lower.is_none() && upper.is_none() {
                return Err(ModelError::Unbounded(index));
            }
            if let Some(&(var, _)) = terms.iter().find(|(v, _)| v.0 >= self.vars.len()) {
                return Err(ModelError::UndefinedVariable {
                    constraint: index,
                    var: var.0,
                });
            }
        }
        if let Some(objective) = self.objective {
            let var = objective.var();
            if var.0 >= self.vars.len() {
                return Err(ModelError::UndefinedObjective(var.0));
            }
        }
        Ok(())
    }

    /// Returns the total number of variables.
    pub fn var_count(&self) -> usize {
        self.vars.len()
    }

    /// Returns the number of boolean variables.
    pub fn bool_var_count(&self) -> usize {
        self.vars.iter().filter(|v| v.kind == VarKind::Bool).count()
    }

    /// Returns the number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }
}

fn unit_terms(vars: impl IntoIterator<Item = BoolVar>) -> Vec<(IntVar, i64)> {
    vars.into_iter().map(|v| (IntVar::from(v), 1)).collect()
}
