//! Depth-first branch-and-bound search with bounds propagation.
//!
//! One [`Search`] is one worker. Workers share nothing but an
//! [`Incumbent`]: the best objective found so far, the matching variable
//! values, and a stop flag.

use super::model::{Constraint, CpModel, Objective};
use super::variables::VarKind;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

/// How often (in nodes) a worker looks at the clock.
const CLOCK_CHECK_INTERVAL: u64 = 64;

/// Counters collected during search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchStats {
    /// Consistent search nodes visited.
    pub nodes: u64,
    /// Dead ends (propagation conflicts).
    pub failures: u64,
    /// Complete assignments reached.
    pub solutions: u64,
    /// Restarts triggered by an improving solution.
    pub restarts: u64,
}

impl SearchStats {
    pub(crate) fn merge(&mut self, other: &SearchStats) {
        self.nodes += other.nodes;
        self.failures += other.failures;
        self.solutions += other.solutions;
        self.restarts += other.restarts;
    }
}

#[derive(Debug, Clone, Copy)]
struct Conflict;

/// Best solution shared between workers.
pub(crate) struct Incumbent {
    objective: Option<Objective>,
    /// Best score in maximization orientation; `i64::MIN` when empty.
    best: AtomicI64,
    solution: Mutex<Option<Vec<i64>>>,
    stop: AtomicBool,
    deadline: Option<Instant>,
    stop_after_first: bool,
}

impl Incumbent {
    pub(crate) fn new(
        objective: Option<Objective>,
        deadline: Option<Instant>,
        stop_after_first: bool,
    ) -> Self {
        Self {
            objective,
            best: AtomicI64::new(i64::MIN),
            solution: Mutex::new(None),
            stop: AtomicBool::new(false),
            deadline,
            stop_after_first,
        }
    }

    /// Records a complete assignment.
    ///
    /// Returns `true` if it improved on the incumbent.
    fn offer(&self, values: &[i64]) -> bool {
        let mut guard = self.solution.lock().unwrap_or_else(PoisonError::into_inner);
        let improved = match self.objective {
            None => guard.is_none(),
            Some(objective) => {
                let score = orient(objective, values[objective.var().0]);
                if score > self.best.load(Ordering::Acquire) {
                    self.best.store(score, Ordering::Release);
                    tracing::debug!(objective = values[objective.var().0], "improved incumbent");
                    true
                } else {
                    false
                }
            }
        };
        if improved {
            *guard = Some(values.to_vec());
        }
        if self.objective.is_none() || self.stop_after_first {
            self.stop.store(true, Ordering::Release);
        }
        improved
    }

    fn best_score(&self) -> Option<i64> {
        match self.best.load(Ordering::Acquire) {
            i64::MIN => None,
            score => Some(score),
        }
    }

    /// Signals every worker to return.
    pub(crate) fn halt(&self) {
        self.stop.store(true, Ordering::Release);
    }

    fn should_stop(&self, nodes: u64) -> bool {
        if nodes % CLOCK_CHECK_INTERVAL == 0 {
            if let Some(deadline) = self.deadline {
                if Instant::now() >= deadline {
                    self.halt();
                }
            }
        }
        self.stop.load(Ordering::Acquire)
    }

    pub(crate) fn take_solution(&self) -> Option<Vec<i64>> {
        self.solution
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Maps an objective value to "bigger is better".
fn orient(objective: Objective, value: i64) -> i64 {
    match objective {
        Objective::Maximize(_) => value,
        Objective::Minimize(_) => -value,
    }
}

/// A bound change `var in [lo, hi]` to try at a choice point.
type Decision = (usize, i64, i64);

struct Frame {
    /// Remaining alternatives, tried from the back.
    alternatives: Vec<Decision>,
    /// Trail length before any alternative was applied.
    mark: usize,
}

/// A single search worker over a model.
pub(crate) struct Search<'a> {
    model: &'a CpModel,
    lo: Vec<i64>,
    hi: Vec<i64>,
    trail: Vec<(usize, i64, i64)>,
    watches: Vec<Vec<usize>>,
    queue: Vec<usize>,
    queued: Vec<bool>,
    needy: Vec<bool>,
    rng: StdRng,
    pub(crate) stats: SearchStats,
}

impl<'a> Search<'a> {
    pub(crate) fn new(model: &'a CpModel, seed: u64) -> Self {
        let mut watches = vec![Vec::new(); model.vars.len()];
        for (index, constraint) in model.constraints.iter().enumerate() {
            for &(var, _) in constraint.terms() {
                watches[var.0].push(index);
            }
        }
        Self {
            model,
            lo: model.vars.iter().map(|v| v.min).collect(),
            hi: model.vars.iter().map(|v| v.max).collect(),
            trail: Vec::new(),
            watches,
            queue: Vec::new(),
            queued: vec![false; model.constraints.len()],
            needy: vec![false; model.constraints.len()],
            rng: StdRng::seed_from_u64(seed),
            stats: SearchStats::default(),
        }
    }

    /// Explores the tree until it is exhausted or the incumbent says stop.
    ///
    /// Returns `true` when the search is complete: the tree was exhausted
    /// under the incumbent bound, or a satisfaction model was solved.
    pub(crate) fn run(&mut self, incumbent: &Incumbent) -> bool {
        for index in 0..self.model.constraints.len() {
            self.enqueue(index);
        }
        let mut consistent = self.propagate().is_ok();
        let root_mark = self.trail.len();
        let mut stack: Vec<Frame> = Vec::new();

        loop {
            if consistent {
                self.stats.nodes += 1;
                if incumbent.should_stop(self.stats.nodes) {
                    return false;
                }
                consistent = self.enforce_incumbent(incumbent).is_ok();
                if !consistent {
                    self.stats.failures += 1;
                }
            }

            if consistent {
                match self.select() {
                    Some(alternatives) => stack.push(Frame {
                        alternatives,
                        mark: self.trail.len(),
                    }),
                    None => {
                        self.stats.solutions += 1;
                        let improved = incumbent.offer(&self.lo);
                        if self.model.objective.is_none() {
                            return true;
                        }
                        if improved {
                            // Restart from the root so that early decisions
                            // are revisited under the tighter bound.
                            self.stats.restarts += 1;
                            stack.clear();
                            self.undo(root_mark);
                            continue;
                        }
                        consistent = false;
                    }
                }
            }

            loop {
                let Some(frame) = stack.last_mut() else {
                    return true;
                };
                let mark = frame.mark;
                match frame.alternatives.pop() {
                    Some((var, lo, hi)) => {
                        self.undo(mark);
                        if self.set_bounds(var, lo, hi).is_ok() && self.propagate().is_ok() {
                            consistent = true;
                            break;
                        }
                        self.clear_queue();
                        self.stats.failures += 1;
                    }
                    None => {
                        stack.pop();
                    }
                }
            }
        }
    }

    /// Tightens the objective variable so only improving solutions remain.
    fn enforce_incumbent(&mut self, incumbent: &Incumbent) -> Result<(), Conflict> {
        let (Some(objective), Some(best)) = (self.model.objective, incumbent.best_score()) else {
            return Ok(());
        };
        let var = objective.var().0;
        match objective {
            Objective::Maximize(_) => self.set_bounds(var, best.saturating_add(1), i64::MAX)?,
            Objective::Minimize(_) => {
                self.set_bounds(var, i64::MIN, best.saturating_add(1).saturating_neg())?
            }
        }
        let result = self.propagate();
        if result.is_err() {
            self.clear_queue();
        }
        result
    }

    /// Picks the next choice point, or `None` when every variable is fixed.
    ///
    /// Booleans first: among lower-bounded constraints still short of
    /// their bound, take the one with the fewest boolean supports, then
    /// the support that appears in the most such constraints. Integer
    /// variables are branched last, objective direction first.
    fn select(&mut self) -> Option<Vec<Decision>> {
        let model = self.model;
        let mut tightest: Option<(usize, usize)> = None;
        for (index, constraint) in model.constraints.iter().enumerate() {
            let Constraint::Linear { terms, lower, .. } = constraint;
            self.needy[index] = false;
            let Some(lower) = *lower else { continue };
            let mut min_sum = 0i64;
            let mut supports = 0usize;
            for &(var, coef) in terms {
                let (lo, hi) = (self.lo[var.0], self.hi[var.0]);
                min_sum += if coef >= 0 { coef * lo } else { coef * hi };
                if coef > 0 && lo != hi && model.vars[var.0].kind == VarKind::Bool {
                    supports += 1;
                }
            }
            if min_sum < lower && supports > 0 {
                self.needy[index] = true;
                if tightest.is_none_or(|(_, best)| supports < best) {
                    tightest = Some((index, supports));
                }
            }
        }

        if let Some((index, _)) = tightest {
            let mut chosen = None;
            let mut best_score = 0usize;
            let mut ties = 0u32;
            for &(var, coef) in model.constraints[index].terms() {
                let v = var.0;
                if coef <= 0 || self.lo[v] == self.hi[v] || model.vars[v].kind != VarKind::Bool {
                    continue;
                }
                let score = self.watches[v].iter().filter(|&&c| self.needy[c]).count();
                if chosen.is_none() || score > best_score {
                    chosen = Some(v);
                    best_score = score;
                    ties = 1;
                } else if score == best_score {
                    ties += 1;
                    if self.rng.random_range(0..ties) == 0 {
                        chosen = Some(v);
                    }
                }
            }
            if let Some(v) = chosen {
                return Some(vec![(v, 0, 0), (v, 1, 1)]);
            }
        }

        if let Some(v) = (0..model.vars.len())
            .find(|&v| model.vars[v].kind == VarKind::Bool && self.lo[v] != self.hi[v])
        {
            return Some(vec![(v, 1, 1), (v, 0, 0)]);
        }

        let v = (0..model.vars.len()).find(|&v| self.lo[v] != self.hi[v])?;
        let (lo, hi) = (self.lo[v], self.hi[v]);
        let prefers_high = matches!(model.objective, Some(Objective::Maximize(var)) if var.0 == v);
        Some(if prefers_high {
            vec![(v, lo, hi - 1), (v, hi, hi)]
        } else {
            vec![(v, lo + 1, hi), (v, lo, lo)]
        })
    }

    fn enqueue(&mut self, constraint: usize) {
        if !self.queued[constraint] {
            self.queued[constraint] = true;
            self.queue.push(constraint);
        }
    }

    fn clear_queue(&mut self) {
        for index in self.queue.drain(..) {
            self.queued[index] = false;
        }
    }

    fn set_bounds(&mut self, var: usize, lo: i64, hi: i64) -> Result<(), Conflict> {
        let (old_lo, old_hi) = (self.lo[var], self.hi[var]);
        let (new_lo, new_hi) = (lo.max(old_lo), hi.min(old_hi));
        if new_lo > new_hi {
            return Err(Conflict);
        }
        if new_lo != old_lo || new_hi != old_hi {
            self.trail.push((var, old_lo, old_hi));
            self.lo[var] = new_lo;
            self.hi[var] = new_hi;
            for &constraint in &self.watches[var] {
                if !self.queued[constraint] {
                    self.queued[constraint] = true;
                    self.queue.push(constraint);
                }
            }
        }
        Ok(())
    }

    fn undo(&mut self, mark: usize) {
        while self.trail.len() > mark {
            if let Some((var, lo, hi)) = self.trail.pop() {
                self.lo[var] = lo;
                self.hi[var] = hi;
            }
        }
    }

    /// Runs queued constraints to a fixpoint.
    fn propagate(&mut self) -> Result<(), Conflict> {
        while let Some(index) = self.queue.pop() {
            self.queued[index] = false;
            if let Err(conflict) = self.propagate_linear(index) {
                self.clear_queue();
                return Err(conflict);
            }
        }
        Ok(())
    }

    /// Bounds consistency for `lower <= sum(coef * var) <= upper`.
    fn propagate_linear(&mut self, index: usize) -> Result<(), Conflict> {
        let model = self.model;
        let Constraint::Linear {
            terms,
            lower,
            upper,
        } = &model.constraints[index];

        let mut min_sum = 0i64;
        let mut max_sum = 0i64;
        for &(var, coef) in terms {
            let (tmin, tmax) = term_range(coef, self.lo[var.0], self.hi[var.0]);
            min_sum += tmin;
            max_sum += tmax;
        }
        if upper.is_some_and(|u| min_sum > u) || lower.is_some_and(|l| max_sum < l) {
            return Err(Conflict);
        }

        for &(var, coef) in terms {
            let v = var.0;
            let (lo, hi) = (self.lo[v], self.hi[v]);
            if coef == 0 || lo == hi {
                continue;
            }
            let (tmin, tmax) = term_range(coef, lo, hi);
            let (mut new_lo, mut new_hi) = (lo, hi);
            if let Some(u) = *upper {
                // coef * x <= u - (rest at minimum)
                let cap = u - (min_sum - tmin);
                if coef > 0 {
                    new_hi = new_hi.min(floor_div(cap, coef));
                } else {
                    new_lo = new_lo.max(ceil_div(cap, coef));
                }
            }
            if let Some(l) = *lower {
                // coef * x >= l - (rest at maximum)
                let need = l - (max_sum - tmax);
                if coef > 0 {
                    new_lo = new_lo.max(ceil_div(need, coef));
                } else {
                    new_hi = new_hi.min(floor_div(need, coef));
                }
            }
            if new_lo != lo || new_hi != hi {
                self.set_bounds(v, new_lo, new_hi)?;
                let (ntmin, ntmax) = term_range(coef, self.lo[v], self.hi[v]);
                min_sum += ntmin - tmin;
                max_sum += ntmax - tmax;
            }
        }
        Ok(())
    }
}

fn term_range(coef: i64, lo: i64, hi: i64) -> (i64, i64) {
    if coef >= 0 {
        (coef * lo, coef * hi)
    } else {
        (coef * hi, coef * lo)
    }
}

fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

fn ceil_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    if a % b != 0 && ((a < 0) == (b < 0)) {
        q + 1
    } else {
        q
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve(model: &CpModel) -> (bool, Option<Vec<i64>>) {
        let incumbent = Incumbent::new(model.objective, None, false);
        let mut search = Search::new(model, 7);
        let completed = search.run(&incumbent);
        (completed, incumbent.take_solution())
    }

    #[test]
    fn test_rounding_division() {
        assert_eq!(floor_div(7, 2), 3);
        assert_eq!(floor_div(-7, 2), -4);
        assert_eq!(floor_div(7, -2), -4);
        assert_eq!(ceil_div(7, 2), 4);
        assert_eq!(ceil_div(-7, 2), -3);
        assert_eq!(ceil_div(7, -2), -3);
        assert_eq!(ceil_div(6, 3), 2);
    }

    #[test]
    fn test_exactly_one_propagates() {
        let mut model = CpModel::new("t");
        let a = model.new_bool_var("a");
        let b = model.new_bool_var("b");
        model.fix_bool(a, false);
        model.add_exactly_one([a, b]);

        let mut search = Search::new(&model, 0);
        search.enqueue(0);
        assert!(search.propagate().is_ok());
        assert_eq!((search.lo[b.0], search.hi[b.0]), (1, 1));
    }

    #[test]
    fn test_root_conflict_is_complete_without_solution() {
        let mut model = CpModel::new("t");
        let a = model.new_bool_var("a");
        model.add_exactly_one([a]);
        model.add_at_most(std::iter::once(a), 0);

        let (completed, solution) = solve(&model);
        assert!(completed);
        assert!(solution.is_none());
    }

    #[test]
    fn test_empty_exactly_one_is_infeasible() {
        let mut model = CpModel::new("t");
        model.add_exactly_one(std::iter::empty());

        let (completed, solution) = solve(&model);
        assert!(completed);
        assert!(solution.is_none());
    }

    #[test]
    fn test_satisfaction_finds_solution() {
        let mut model = CpModel::new("t");
        let vars: Vec<_> = (0..4).map(|i| model.new_bool_var(format!("x{i}"))).collect();
        model.add_exactly_one([vars[0], vars[1]]);
        model.add_exactly_one([vars[2], vars[3]]);
        model.add_at_most_one([vars[0], vars[2]]);

        let (completed, solution) = solve(&model);
        assert!(completed);
        let values = solution.unwrap();
        assert_eq!(values[0] + values[1], 1);
        assert_eq!(values[2] + values[3], 1);
        assert!(values[0] + values[2] <= 1);
    }

    #[test]
    fn test_maximize_count() {
        // Pick at most 2 of 4, maximize how many are picked.
        let mut model = CpModel::new("t");
        let vars: Vec<_> = (0..4).map(|i| model.new_bool_var(format!("x{i}"))).collect();
        model.add_at_most(vars.iter().copied(), 2);
        let total = model.new_int_var("total", 0, 4);
        model.add_le_sum(total, &vars);
        model.set_objective(Objective::Maximize(total));

        let (completed, solution) = solve(&model);
        assert!(completed);
        assert_eq!(solution.unwrap()[total.0], 2);
    }

    #[test]
    fn test_minimize_with_negative_coefficients() {
        // cost >= 3 - a - b, with a + b <= 1: best cost is 2.
        let mut model = CpModel::new("t");
        let a = model.new_bool_var("a");
        let b = model.new_bool_var("b");
        let cost = model.new_int_var("cost", 0, 10);
        model.add_at_most_one([a, b]);
        model.add_linear(vec![(cost, 1), (a.into(), 1), (b.into(), 1)], Some(3), None);
        model.set_objective(Objective::Minimize(cost));

        let (completed, solution) = solve(&model);
        assert!(completed);
        assert_eq!(solution.unwrap()[cost.0], 2);
    }

    #[test]
    fn test_stop_flag_interrupts() {
        let mut model = CpModel::new("t");
        let vars: Vec<_> = (0..3).map(|i| model.new_bool_var(format!("x{i}"))).collect();
        model.add_at_least_one(vars.iter().copied());

        let incumbent = Incumbent::new(None, None, false);
        incumbent.halt();
        let mut search = Search::new(&model, 0);
        assert!(!search.run(&incumbent));
        assert!(incumbent.take_solution().is_none());
    }
}
