//! Reading student rosters from CSV files.
//!
//! A roster has a header row followed by one student per line:
//!
//! ```csv
//! name,forum
//! Ada Lovelace,F1
//! Grace Hopper,F2
//! ```

use crate::error::AttendanceResult;
use serde::Deserialize;
use std::io;
use std::path::Path;

/// One line of a roster.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    pub forum: String,
}

impl RosterEntry {
    pub fn new(name: impl Into<String>, forum: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            forum: forum.into(),
        }
    }
}

/// Reads every entry of the roster at `path`.
pub fn read_roster(path: impl AsRef<Path>) -> AttendanceResult<Vec<RosterEntry>> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path.as_ref())?;

    parse_roster(reader)
}

/// Reads every entry of a roster from any reader.
pub fn read_roster_from(reader: impl io::Read) -> AttendanceResult<Vec<RosterEntry>> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    parse_roster(reader)
}

fn parse_roster<R: io::Read>(mut reader: csv::Reader<R>) -> AttendanceResult<Vec<RosterEntry>> {
    let entries = reader
        .deserialize()
        .collect::<Result<Vec<RosterEntry>, csv::Error>>()?;

    tracing::debug!(count = entries.len(), "read roster");

    Ok(entries)
}
