//! Loading the day, reading, and lector lists.

use crate::error::ScheduleError;
use crate::roster::{Day, Lector, Reading, ScheduleInput};
use std::fs;
use std::path::Path;

fn read(path: &Path) -> Result<String, ScheduleError> {
    fs::read_to_string(path).map_err(|source| ScheduleError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn entries(text: &str) -> impl Iterator<Item = String> + '_ {
    text.lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| !line.is_empty())
}

/// One day per line.
pub fn parse_days(text: &str) -> Vec<Day> {
    entries(text).map(Day::new).collect()
}

/// One reading per line.
pub fn parse_readings(text: &str) -> Vec<Reading> {
    entries(text).map(Reading::new).collect()
}

/// One lector per line: the name, then comma-separated blocked days.
///
/// Names keep their case; blocked days are lower-cased like the day list.
pub fn parse_lectors(text: &str) -> Vec<Lector> {
    text.lines()
        .filter_map(|line| {
            let mut fields = line.split(',').map(str::trim);
            let name = fields.next().filter(|name| !name.is_empty())?;
            let blocked = fields
                .filter(|day| !day.is_empty())
                .map(|day| Day::new(day.to_lowercase()));
            Some(Lector::new(name).with_blocked(blocked))
        })
        .collect()
}

pub fn read_days(path: &Path) -> Result<Vec<Day>, ScheduleError> {
    Ok(parse_days(&read(path)?))
}

pub fn read_readings(path: &Path) -> Result<Vec<Reading>, ScheduleError> {
    Ok(parse_readings(&read(path)?))
}

pub fn read_lectors(path: &Path) -> Result<Vec<Lector>, ScheduleError> {
    Ok(parse_lectors(&read(path)?))
}

/// Reads all three lists and validates them into a [`ScheduleInput`].
pub fn load_input(
    lectors: &Path,
    days: &Path,
    readings: &Path,
) -> Result<ScheduleInput, ScheduleError> {
    let days = read_days(days)?;
    let readings = read_readings(readings)?;
    let lectors = read_lectors(lectors)?;
    tracing::debug!(
        days = days.len(),
        readings = readings.len(),
        lectors = lectors.len(),
        "loaded input lists"
    );
    Ok(ScheduleInput::new(lectors, readings, days)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{InputSet, InputShapeError};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file(contents: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_parse_days_normalizes() {
        let days = parse_days("  Oct-22 \n\nNOV-05\n");
        assert_eq!(days, vec![Day::new("oct-22"), Day::new("nov-05")]);
    }

    #[test]
    fn test_parse_lectors() {
        let lectors = parse_lectors("John Doe,Oct-22\nAlice Joseph\n\nBob Crapper, Nov-20 ,Dec-15,\n");

        assert_eq!(lectors.len(), 3);
        assert_eq!(lectors[0].name(), "John Doe");
        assert!(lectors[0].is_blocked_on(&Day::new("oct-22")));
        assert!(lectors[1].blocked_days().is_empty());
        assert_eq!(lectors[2].name(), "Bob Crapper");
        assert_eq!(lectors[2].blocked_days().len(), 2);
        assert!(lectors[2].is_blocked_on(&Day::new("nov-20")));
    }

    #[test]
    fn test_load_input() {
        let lectors = file("Alice,OCT-22\nBob\n");
        let days = file("Oct-22\nOct-29\n");
        let readings = file("First Reading\nPsalm\n");

        let input = load_input(lectors.path(), days.path(), readings.path()).unwrap();

        assert_eq!(input.days()[0].as_str(), "oct-22");
        assert_eq!(input.readings()[1].as_str(), "psalm");
        assert!(input.is_blocked(0, 0));
        assert!(!input.is_blocked(1, 0));
    }

    #[test]
    fn test_empty_days_file() {
        let lectors = file("Alice\n");
        let days = file("\n\n");
        let readings = file("psalm\n");

        let err = load_input(lectors.path(), days.path(), readings.path()).unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::InputShape(InputShapeError::Empty {
                set: InputSet::Days
            })
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = read_days(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, ScheduleError::Read { .. }));
        assert!(err.to_string().contains("/definitely/not/here.txt"));
    }
}
