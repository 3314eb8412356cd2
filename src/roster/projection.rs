//! Mapping a solved model back to a roster.

use super::types::{Day, Reading, ScheduleInput};
use crate::cp::{BoolVar, CpSolution};

/// One lector performing one reading on one day.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Assignment {
    pub day: Day,
    pub reading: Reading,
    pub lector: String,
}

/// A complete schedule: for every day, the lector of every reading.
///
/// Produced only from a successful solve, so every (day, reading) cell is
/// filled.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RosterParts"))]
pub struct Roster {
    days: Vec<Day>,
    readings: Vec<Reading>,
    lectors: Vec<String>,
    /// Lector index per `day * readings + reading`.
    cells: Vec<usize>,
}

/// Unchecked wire form of a [`Roster`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RosterParts {
    days: Vec<Day>,
    readings: Vec<Reading>,
    lectors: Vec<String>,
    cells: Vec<usize>,
}

#[cfg(feature = "serde")]
impl TryFrom<RosterParts> for Roster {
    type Error = String;

    fn try_from(parts: RosterParts) -> Result<Self, Self::Error> {
        let expected = parts.days.len() * parts.readings.len();
        if parts.cells.len() != expected {
            return Err(format!(
                "roster has {} cells, expected {expected}",
                parts.cells.len()
            ));
        }
        if let Some(&cell) = parts.cells.iter().find(|&&c| c >= parts.lectors.len()) {
            return Err(format!(
                "cell refers to lector #{cell}, but there are {} lectors",
                parts.lectors.len()
            ));
        }
        Ok(Self {
            days: parts.days,
            readings: parts.readings,
            lectors: parts.lectors,
            cells: parts.cells,
        })
    }
}

impl Roster {
    pub fn days(&self) -> &[Day] {
        &self.days
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    /// Lector names in input order.
    pub fn lectors(&self) -> &[String] {
        &self.lectors
    }

    /// Lector of reading `reading` on day `day` (indices).
    ///
    /// # Panics
    ///
    /// Panics if `day` or `reading` is out of range.
    pub fn lector_at(&self, day: usize, reading: usize) -> &str {
        &self.lectors[self.cells[day * self.readings.len() + reading]]
    }

    /// Lector of a reading on a day, looked up by key.
    pub fn get(&self, day: &str, reading: &str) -> Option<&str> {
        let d = self.days.iter().position(|x| x.as_str() == day)?;
        let r = self.readings.iter().position(|x| x.as_str() == reading)?;
        Some(self.lector_at(d, r))
    }

    /// Every assignment, grouped by day then reading.
    pub fn assignments(&self) -> Vec<Assignment> {
        self.days
            .iter()
            .enumerate()
            .flat_map(|(d, day)| {
                self.readings
                    .iter()
                    .enumerate()
                    .map(move |(r, reading)| Assignment {
                        day: day.clone(),
                        reading: reading.clone(),
                        lector: self.lector_at(d, r).to_string(),
                    })
            })
            .collect()
    }

    /// For each day, the (reading, lector) pairs in reading order.
    pub fn by_day(&self) -> Vec<(&Day, Vec<(&Reading, &str)>)> {
        self.days
            .iter()
            .enumerate()
            .map(|(d, day)| {
                let row = self
                    .readings
                    .iter()
                    .enumerate()
                    .map(|(r, reading)| (reading, self.lector_at(d, r)))
                    .collect();
                (day, row)
            })
            .collect()
    }

    /// For each reading, the (day, lector) pairs in day order.
    pub fn by_reading(&self) -> Vec<(&Reading, Vec<(&Day, &str)>)> {
        self.readings
            .iter()
            .enumerate()
            .map(|(r, reading)| {
                let column = self
                    .days
                    .iter()
                    .enumerate()
                    .map(|(d, day)| (day, self.lector_at(d, r)))
                    .collect();
                (reading, column)
            })
            .collect()
    }

    /// Number of readings each lector performs, in input order.
    pub fn readings_per_lector(&self) -> Vec<(&str, usize)> {
        let mut counts = vec![0usize; self.lectors.len()];
        for &l in &self.cells {
            counts[l] += 1;
        }
        self.lectors
            .iter()
            .map(String::as_str)
            .zip(counts)
            .collect()
    }

    /// The smallest per-lector reading count: the fairness value.
    pub fn min_readings_per_lector(&self) -> usize {
        self.readings_per_lector()
            .into_iter()
            .map(|(_, n)| n)
            .min()
            .unwrap_or(0)
    }
}

/// Reads the slot variables of a successful solution.
///
/// Emits the lector of every true slot; cells are visited in day, reading,
/// lector order so the result depends only on the variable values. Returns
/// `None` if some (day, reading) cell has no true slot.
pub(crate) fn project(
    input: &ScheduleInput,
    slots: &[Option<BoolVar>],
    solution: &CpSolution,
) -> Option<Roster> {
    let lectors = input.lectors().len();
    let cells = slots
        .chunks(lectors)
        .map(|cell| {
            cell.iter()
                .position(|slot| slot.and_then(|var| solution.bool_value(var)) == Some(true))
        })
        .collect::<Option<Vec<_>>>()?;

    Some(Roster {
        days: input.days().to_vec(),
        readings: input.readings().to_vec(),
        lectors: input.lectors().iter().map(|l| l.name().to_string()).collect(),
        cells,
    })
}
