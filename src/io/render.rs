//! Roster output: an HTML page and a terminal table.

use crate::error::ScheduleError;
use crate::roster::Roster;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const STYLE: &str = "
        h1 { color: #039; padding: 5px 0; border: 2px solid #039; text-align: center; border-radius: 10px; }
        .roster { width: 100%; text-align: center; vertical-align: middle; border-collapse: collapse; }
        .roster th { background-color: #c0c0c0; font-size: 90%; }
        .roster td, .roster th { border: 1px solid #666; padding: 4px; }";

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Renders the roster as a standalone HTML page.
///
/// One row per reading, one column per day.
pub fn render_html(roster: &Roster, title: &str, generated_on: &str) -> String {
    let title = escape(title);
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html>\n<head>\n    <meta charset=\"utf-8\" />\n    <title>{title}</title>\n    <style>{STYLE}\n    </style>\n</head>\n<body>\n    <h1>{title}</h1>\n"
    );

    html.push_str("    <table class=\"roster\">\n    <thead>\n        <tr>\n            <th></th>\n");
    for day in roster.days() {
        let _ = writeln!(html, "            <th>{}</th>", escape(day.as_str()));
    }
    html.push_str("        </tr>\n    </thead>\n    <tbody>\n");

    for (reading, column) in roster.by_reading() {
        let _ = writeln!(html, "        <tr>\n            <td>{}</td>", escape(reading.as_str()));
        for (_, lector) in column {
            let _ = writeln!(html, "            <td>{}</td>", escape(lector));
        }
        html.push_str("        </tr>\n");
    }
    html.push_str("    </tbody>\n    </table>\n");

    html.push_str("    <ul>\n");
    for (lector, count) in roster.readings_per_lector() {
        let _ = writeln!(html, "        <li>{}: {count}</li>", escape(lector));
    }
    html.push_str("    </ul>\n");

    let _ = write!(
        html,
        "    <p>Updated on {}.</p>\n</body>\n</html>\n",
        escape(generated_on)
    );
    html
}

/// Renders the roster as an aligned plain-text table.
pub fn render_text(roster: &Roster) -> String {
    let mut rows: Vec<Vec<&str>> = Vec::with_capacity(roster.readings().len() + 1);
    rows.push(
        std::iter::once("")
            .chain(roster.days().iter().map(|d| d.as_str()))
            .collect(),
    );
    for (reading, column) in roster.by_reading() {
        rows.push(
            std::iter::once(reading.as_str())
                .chain(column.into_iter().map(|(_, lector)| lector))
                .collect(),
        );
    }

    let columns = roster.days().len() + 1;
    let widths: Vec<usize> = (0..columns)
        .map(|c| rows.iter().map(|row| row[c].chars().count()).max().unwrap_or(0))
        .collect();

    let mut out = String::new();
    for row in &rows {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Writes the HTML page to `path`.
pub fn write_html(
    roster: &Roster,
    path: &Path,
    title: &str,
    generated_on: &str,
) -> Result<(), ScheduleError> {
    fs::write(path, render_html(roster, title, generated_on)).map_err(|source| {
        ScheduleError::Write {
            path: path.to_path_buf(),
            source,
        }
    })?;
    tracing::info!(path = %path.display(), "wrote roster");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{Day, Lector, Reading, RosterConfig, RosterRunner, ScheduleInput};

    fn roster() -> Roster {
        let input = ScheduleInput::new(
            vec![Lector::new("Ann & Co"), Lector::new("Bob")],
            vec![Reading::new("first"), Reading::new("second")],
            vec![Day::new("d1"), Day::new("d2")],
        )
        .unwrap();
        RosterRunner::run(&input, &RosterConfig::default().with_seed(1))
            .unwrap()
            .outcome
            .into_roster()
            .unwrap()
    }

    #[test]
    fn test_html_layout() {
        let html = render_html(&roster(), "Lectors <fall>", "2024-01-01");

        assert!(html.contains("<title>Lectors &lt;fall&gt;</title>"));
        assert!(html.contains("<th>d1</th>"));
        assert!(html.contains("<td>first</td>"));
        assert!(html.contains("Ann &amp; Co"));
        assert!(!html.contains("Ann & Co"));
        assert!(html.contains("Updated on 2024-01-01."));
        assert_eq!(html.matches("<tr>").count(), 3);
    }

    #[test]
    fn test_text_table() {
        let text = render_text(&roster());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].trim_start().starts_with("d1"));
        assert!(lines[1].starts_with("first "));
        assert!(lines[2].starts_with("second"));
        assert!(text.contains("Bob"));
    }

    #[test]
    fn test_write_html() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.html");

        write_html(&roster(), &path, "Roster", "today").unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<!DOCTYPE html>"));
    }
}
