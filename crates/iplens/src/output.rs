//! Output formatting for CLI commands.
//!
//! Results are printed either as human-readable text or as JSON for
//! programmatic use. Colors come from `colored`, which honors `NO_COLOR`.

use colored::Colorize;
use iplens_query::{Dataset, Query, SelectSpec};
use std::io::{self, Write};

/// Output mode for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

impl OutputMode {
    /// Pick the mode from the `--json` flag.
    #[must_use]
    pub fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }
}

/// Write a dataset.
///
/// Text mode prints each record key followed by its indented fields, then
/// the number of records.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_dataset<W: Write>(w: &mut W, dataset: &Dataset, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *w, dataset)?;
            writeln!(w)
        }
        OutputMode::Text => {
            for (key, record) in dataset {
                writeln!(w, "{}", key.bold().cyan())?;
                if record.is_empty() {
                    writeln!(w, "  {}", "(no fields)".dimmed())?;
                }
                for (field, value) in record {
                    writeln!(w, "  {}: {}", field.dimmed(), value)?;
                }
            }
            let noun = if dataset.len() == 1 { "record" } else { "records" };
            writeln!(w, "{} {}", dataset.len(), noun)
        }
    }
}

/// Write the structure of a parsed query.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_query<W: Write>(w: &mut W, query: &Query, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *w, query)?;
            writeln!(w)
        }
        OutputMode::Text => {
            writeln!(w, "{} {}", "Query:".bold(), query)?;
            match &query.fields {
                SelectSpec::All => writeln!(w, "{} all", "Fields:".bold())?,
                SelectSpec::Fields(fields) => {
                    writeln!(w, "{} {}", "Fields:".bold(), fields.join(", "))?;
                }
            }
            if query.conditions.is_empty() {
                writeln!(w, "{} none", "Conditions:".bold())?;
            } else {
                writeln!(w, "{}", "Conditions:".bold())?;
                for (i, condition) in query.conditions.iter().enumerate() {
                    writeln!(w, "  {}. {}", i + 1, condition)?;
                }
            }
            Ok(())
        }
    }
}

/// Print a dataset to stdout.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_dataset(dataset: &Dataset, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_dataset(&mut handle, dataset, mode)
}

/// Print a parsed query to stdout.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_query(query: &Query, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_query(&mut handle, query, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use iplens_query::{Record, parse};

    fn sample() -> Dataset {
        Dataset::from([
            (
                "8.8.8.8".to_string(),
                Record::from([("city".to_string(), "Mountain View".to_string())]),
            ),
            ("10.0.0.1".to_string(), Record::new()),
        ])
    }

    fn render<F: FnOnce(&mut Vec<u8>) -> io::Result<()>>(f: F) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_text_dataset() {
        let out = render(|w| write_dataset(w, &sample(), OutputMode::Text));
        assert!(out.contains("8.8.8.8"));
        assert!(out.contains("Mountain View"));
        assert!(out.contains("(no fields)"));
        assert!(out.trim_end().ends_with("2 records"));
    }

    #[test]
    fn test_text_single_record_count() {
        let dataset: Dataset = sample().into_iter().take(1).collect();
        let out = render(|w| write_dataset(w, &dataset, OutputMode::Text));
        assert!(out.trim_end().ends_with("1 record"));
    }

    #[test]
    fn test_json_dataset() {
        let out = render(|w| write_dataset(w, &sample(), OutputMode::Json));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["8.8.8.8"]["city"], "Mountain View");
        assert_eq!(value["10.0.0.1"], serde_json::json!({}));
    }

    #[test]
    fn test_text_query() {
        let query = parse("GET city WHERE country_code = US AND region_code < CO").unwrap();
        let out = render(|w| write_query(w, &query, OutputMode::Text));
        assert!(out.contains("1. country_code = US"));
        assert!(out.contains("2. region_code < CO"));
    }

    #[test]
    fn test_json_query() {
        let query = parse("GET *").unwrap();
        let out = render(|w| write_query(w, &query, OutputMode::Json));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["fields"], "*");
        assert_eq!(value["conditions"], serde_json::json!([]));
    }
}
