//! Data models for the timecard tracker.
//!
//! Models convert to and from the store's plain records:
//! - `TimecardEntry`

pub mod timecard;

pub use timecard::{timecard_table, InOut, TimecardEntry, TIMECARD_TABLE};
