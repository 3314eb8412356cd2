//! Roster domain types: lectors, readings, days, and blocked dates.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};

/// One mass occasion that needs every reading filled.
///
/// Days are opaque identifiers (e.g. `"oct-22"`); their order is the order
/// they are given in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Day(String);

impl Day {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Day {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A scriptural reading performed at every mass (e.g. "first reading").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reading(String);

impl Reading {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Reading {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

/// A person who can be assigned readings, with the days they cannot serve.
///
/// Identity is the name: two lectors with the same name are equal whatever
/// their blocked days.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lector {
    name: String,
    blocked: BTreeSet<Day>,
}

impl PartialEq for Lector {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Lector {}

impl Hash for Lector {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl Lector {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blocked: BTreeSet::new(),
        }
    }

    /// Adds days this lector is unavailable.
    pub fn with_blocked<I, D>(mut self, days: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<Day>,
    {
        self.blocked.extend(days.into_iter().map(Into::into));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn blocked_days(&self) -> &BTreeSet<Day> {
        &self.blocked
    }

    pub fn is_blocked_on(&self, day: &Day) -> bool {
        self.blocked.contains(day)
    }
}

/// The relation "lector is unavailable on day".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockedDate {
    pub lector: String,
    pub day: Day,
}

impl BlockedDate {
    pub fn new(lector: impl Into<String>, day: impl Into<Day>) -> Self {
        Self {
            lector: lector.into(),
            day: day.into(),
        }
    }
}

/// Which input set a shape error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSet {
    Lectors,
    Readings,
    Days,
}

impl fmt::Display for InputSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InputSet::Lectors => "lectors",
            InputSet::Readings => "readings",
            InputSet::Days => "days",
        })
    }
}

/// The input cannot form a model at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputShapeError {
    #[error("the set of {set} is empty")]
    Empty { set: InputSet },

    #[error("duplicate entry '{key}' in {set}")]
    Duplicate { set: InputSet, key: String },
}

/// Validated scheduling input.
///
/// Holds the lectors, readings, and ordered days, plus the blocked
/// (lector, day) matrix restricted to the given days. Read-only once built.
///
/// # Examples
///
/// ```
/// use lector_schedule::roster::{Day, Lector, Reading, ScheduleInput};
///
/// let input = ScheduleInput::new(
///     vec![Lector::new("Alice").with_blocked(["oct-22"]), Lector::new("Bob")],
///     vec![Reading::new("first reading")],
///     vec![Day::new("oct-22"), Day::new("oct-29")],
/// )
/// .unwrap();
/// assert!(input.is_blocked(0, 0));
/// assert!(!input.is_blocked(1, 0));
/// ```
#[derive(Debug, Clone)]
pub struct ScheduleInput {
    lectors: Vec<Lector>,
    readings: Vec<Reading>,
    days: Vec<Day>,
    /// `blocked[lector][day]`.
    blocked: Vec<Vec<bool>>,
}

impl ScheduleInput {
    /// Builds the input, checking that no set is empty or has duplicates.
    ///
    /// Blocked days that are not in `days` are ignored with a warning.
    pub fn new(
        lectors: Vec<Lector>,
        readings: Vec<Reading>,
        days: Vec<Day>,
    ) -> Result<Self, InputShapeError> {
        check_shape(InputSet::Lectors, lectors.iter().map(Lector::name))?;
        check_shape(InputSet::Readings, readings.iter().map(Reading::as_str))?;
        check_shape(InputSet::Days, days.iter().map(Day::as_str))?;

        let day_index: HashMap<&Day, usize> =
            days.iter().enumerate().map(|(i, d)| (d, i)).collect();
        let mut blocked = vec![vec![false; days.len()]; lectors.len()];
        for (l, lector) in lectors.iter().enumerate() {
            for day in &lector.blocked {
                match day_index.get(day) {
                    Some(&d) => blocked[l][d] = true,
                    None => tracing::warn!(
                        lector = lector.name(),
                        day = day.as_str(),
                        "skipping blocked day that is not scheduled"
                    ),
                }
            }
        }

        Ok(Self {
            lectors,
            readings,
            days,
            blocked,
        })
    }

    /// Builds the input from lector names plus a blocked-date relation.
    ///
    /// Pairs naming an unknown lector are ignored with a warning.
    pub fn from_relations(
        lectors: Vec<String>,
        readings: Vec<Reading>,
        days: Vec<Day>,
        blocked: impl IntoIterator<Item = BlockedDate>,
    ) -> Result<Self, InputShapeError> {
        let mut lectors: Vec<Lector> = lectors.into_iter().map(Lector::new).collect();
        let index: HashMap<String, usize> = lectors
            .iter()
            .enumerate()
            .map(|(i, l)| (l.name.clone(), i))
            .collect();
        for pair in blocked {
            match index.get(&pair.lector) {
                Some(&l) => {
                    lectors[l].blocked.insert(pair.day);
                }
                None => tracing::warn!(lector = %pair.lector, "skipping blocked day of unknown lector"),
            }
        }
        Self::new(lectors, readings, days)
    }

    pub fn lectors(&self) -> &[Lector] {
        &self.lectors
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn days(&self) -> &[Day] {
        &self.days
    }

    /// Whether lector `lector` is unavailable on day `day` (both indices).
    ///
    /// # Panics
    ///
    /// Panics if `lector` or `day` is out of range.
    pub fn is_blocked(&self, lector: usize, day: usize) -> bool {
        self.blocked[lector][day]
    }

    /// Whether the named lector is unavailable on `day`.
    ///
    /// `None` if either is not part of the input.
    pub fn is_blocked_by_key(&self, lector: &str, day: &Day) -> Option<bool> {
        let l = self.lectors.iter().position(|x| x.name == lector)?;
        let d = self.days.iter().position(|x| x == day)?;
        Some(self.blocked[l][d])
    }

    /// Number of scheduled days lector `lector` is available.
    ///
    /// # Panics
    ///
    /// Panics if `lector` is out of range.
    pub fn available_days(&self, lector: usize) -> usize {
        self.blocked[lector].iter().filter(|&&b| !b).count()
    }

    /// Blocked pairs restricted to the scheduled days, in input order.
    pub fn blocked_dates(&self) -> impl Iterator<Item = BlockedDate> + '_ {
        self.lectors.iter().enumerate().flat_map(move |(l, lector)| {
            self.days
                .iter()
                .enumerate()
                .filter(move |&(d, _)| self.blocked[l][d])
                .map(move |(_, day)| BlockedDate::new(lector.name(), day.clone()))
        })
    }
}

fn check_shape<'a>(
    set: InputSet,
    keys: impl ExactSizeIterator<Item = &'a str>,
) -> Result<(), InputShapeError> {
    if keys.len() == 0 {
        return Err(InputShapeError::Empty { set });
    }
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key) {
            return Err(InputShapeError::Duplicate {
                set,
                key: key.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn days(ids: &[&str]) -> Vec<Day> {
        ids.iter().map(|&d| Day::new(d)).collect()
    }

    #[test]
    fn test_empty_sets_rejected() {
        let err = ScheduleInput::new(vec![], vec!["r".into()], days(&["d"])).unwrap_err();
        assert_eq!(
            err,
            InputShapeError::Empty {
                set: InputSet::Lectors
            }
        );

        let err = ScheduleInput::new(vec![Lector::new("a")], vec![], days(&["d"])).unwrap_err();
        assert_eq!(
            err,
            InputShapeError::Empty {
                set: InputSet::Readings
            }
        );

        let err = ScheduleInput::new(vec![Lector::new("a")], vec!["r".into()], vec![]).unwrap_err();
        assert_eq!(err, InputShapeError::Empty { set: InputSet::Days });
        assert_eq!(err.to_string(), "the set of days is empty");
    }

    #[test]
    fn test_duplicates_rejected() {
        let err = ScheduleInput::new(
            vec![Lector::new("a"), Lector::new("a")],
            vec!["r".into()],
            days(&["d"]),
        )
        .unwrap_err();
        assert_eq!(
            err,
            InputShapeError::Duplicate {
                set: InputSet::Lectors,
                key: "a".into()
            }
        );
    }

    #[test]
    fn test_blocked_matrix() {
        let input = ScheduleInput::new(
            vec![
                Lector::new("a").with_blocked(["d2", "not-scheduled"]),
                Lector::new("b"),
            ],
            vec!["r".into()],
            days(&["d1", "d2", "d3"]),
        )
        .unwrap();

        assert!(!input.is_blocked(0, 0));
        assert!(input.is_blocked(0, 1));
        assert!(!input.is_blocked(1, 1));
        assert_eq!(input.available_days(0), 2);
        assert_eq!(input.available_days(1), 3);
        assert_eq!(
            input.blocked_dates().collect::<Vec<_>>(),
            vec![BlockedDate::new("a", "d2")]
        );
    }

    #[test]
    fn test_lector_identity_is_the_name() {
        let plain = Lector::new("a");
        let busy = Lector::new("a").with_blocked(["d1"]);
        assert_eq!(plain, busy);
        assert_ne!(plain, Lector::new("b"));

        let set: HashSet<Lector> = [plain, busy].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_blocked_lookup_by_key() {
        let input = ScheduleInput::new(
            vec![Lector::new("a").with_blocked(["d2"]), Lector::new("b")],
            vec!["r".into()],
            days(&["d1", "d2"]),
        )
        .unwrap();

        assert_eq!(input.is_blocked_by_key("a", &Day::new("d2")), Some(true));
        assert_eq!(input.is_blocked_by_key("b", &Day::new("d2")), Some(false));
        assert_eq!(input.is_blocked_by_key("ghost", &Day::new("d1")), None);
        assert_eq!(input.is_blocked_by_key("a", &Day::new("d9")), None);
    }

    #[test]
    fn test_from_relations() {
        let input = ScheduleInput::from_relations(
            vec!["a".into(), "b".into()],
            vec!["r".into()],
            days(&["d1", "d2"]),
            vec![BlockedDate::new("b", "d1"), BlockedDate::new("ghost", "d2")],
        )
        .unwrap();

        assert!(input.is_blocked(1, 0));
        assert!(!input.is_blocked(0, 0));
        assert!(input.lectors()[1].is_blocked_on(&Day::new("d1")));
    }
}
