//! Punch in/out command.
//!
//! Appends one [`TimecardEntry`] stamped with the current UTC time.

use super::{open_store, print_json};
use crate::cli::{Direction, PunchArgs};
use crate::error::Result;
use crate::model::{InOut, TimecardEntry, TIMECARD_TABLE};
use chrono::Utc;
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

impl From<Direction> for InOut {
    fn from(d: Direction) -> Self {
        match d {
            Direction::In => Self::In,
            Direction::Out => Self::Out,
        }
    }
}

/// Build the entry for a punch from CLI arguments.
fn entry_from_args(args: &PunchArgs) -> TimecardEntry {
    TimecardEntry {
        location_raw: args.location.clone(),
        latitude: args.latitude,
        longitude: args.longitude,
        altitude: args.altitude,
        city: args.city.clone(),
        state: args.state.clone(),
        zipcode: args.zipcode.clone(),
        ..TimecardEntry::punch(args.direction.into(), Utc::now())
    }
}

/// Execute the punch command.
///
/// # Errors
///
/// Returns [`crate::Error::UnknownTable`] if the database has not been
/// initialized, or the store's error if the insert fails.
pub fn execute(args: &PunchArgs, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let store = open_store(db_path)?;
    let entry = entry_from_args(args);
    store.insert_record(TIMECARD_TABLE, &entry.to_record())?;

    let stamp = entry.time_stamp.as_deref().unwrap_or_default();
    info!(direction = ?args.direction, time_stamp = stamp, "Recorded punch");

    if json {
        return print_json(&entry);
    }

    let label = match args.direction {
        Direction::In => "Punched in".green().bold(),
        Direction::Out => "Punched out".yellow().bold(),
    };
    match entry.city.as_deref() {
        Some(city) => println!("{label} at {stamp} ({city})"),
        None => println!("{label} at {stamp}"),
    }
    Ok(())
}
