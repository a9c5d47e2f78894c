//! Timecard entry model.
//!
//! A punch in or out, with optional location data. The store deals only in
//! plain [`Record`]s; this type converts to and from them. In the database
//! the "entered into the timecard system" flag is a `'Y'`/`'N'` string, in
//! memory it is a `bool`.

use crate::storage::{ColumnSpec, Record, Value};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Table holding timecard entries.
pub const TIMECARD_TABLE: &str = "timecard";

/// Direction of a punch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InOut {
    #[serde(rename = "I")]
    In,
    #[serde(rename = "O")]
    Out,
}

impl InOut {
    /// Get the string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::In => "I",
            Self::Out => "O",
        }
    }

    /// Parse the stored flag; anything but `I`/`O` is `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "I" | "i" => Some(Self::In),
            "O" | "o" => Some(Self::Out),
            _ => None,
        }
    }
}

/// One row of the `timecard` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimecardEntry {
    pub id: Option<i64>,

    /// RFC 3339 timestamp of the punch
    pub time_stamp: Option<String>,

    pub in_out_flag: Option<InOut>,

    /// Location exactly as reported by the device
    pub location_raw: Option<String>,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,

    /// Whether the punch has been copied into the external timecard system
    pub timecard_entered_flag: Option<bool>,
}

fn text(record: &Record, key: &str) -> Option<String> {
    record.get(key).and_then(Value::as_text).map(ToString::to_string)
}

fn number(record: &Record, key: &str) -> Option<f64> {
    record.get(key).and_then(Value::as_f64)
}

fn encode_flag(flag: bool) -> &'static str {
    if flag { "Y" } else { "N" }
}

fn decode_flag(value: Option<&Value>) -> Option<bool> {
    match value.and_then(Value::as_text) {
        Some("Y") => Some(true),
        Some("N") => Some(false),
        _ => None,
    }
}

impl TimecardEntry {
    /// A new punch stamped with `at`, not yet entered.
    #[must_use]
    pub fn punch(direction: InOut, at: DateTime<Utc>) -> Self {
        Self {
            time_stamp: Some(at.to_rfc3339_opts(SecondsFormat::Secs, true)),
            in_out_flag: Some(direction),
            timecard_entered_flag: Some(false),
            ..Self::default()
        }
    }

    /// Build from a store record. Missing or null columns become `None`.
    #[must_use]
    pub fn from_record(record: &Record) -> Self {
        Self {
            id: record.get("id").and_then(Value::as_i64),
            time_stamp: text(record, "time_stamp"),
            in_out_flag: text(record, "in_out_flag").as_deref().and_then(InOut::parse),
            location_raw: text(record, "location_raw"),
            latitude: number(record, "latitude"),
            longitude: number(record, "longitude"),
            altitude: number(record, "altitude"),
            city: text(record, "city"),
            state: text(record, "state"),
            zipcode: text(record, "zipcode"),
            timecard_entered_flag: decode_flag(record.get("timecard_entered_flag")),
        }
    }

    /// Convert to a store record, emitting only the fields that are set.
    #[must_use]
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        let mut put = |key: &str, value: Option<Value>| {
            if let Some(v) = value {
                record.insert(key.to_string(), v);
            }
        };

        put("id", self.id.map(Value::Integer));
        put("time_stamp", self.time_stamp.clone().map(Value::Text));
        put("in_out_flag", self.in_out_flag.map(|f| f.as_str().into()));
        put("location_raw", self.location_raw.clone().map(Value::Text));
        put("latitude", self.latitude.map(Value::Real));
        put("longitude", self.longitude.map(Value::Real));
        put("altitude", self.altitude.map(Value::Real));
        put("city", self.city.clone().map(Value::Text));
        put("state", self.state.clone().map(Value::Text));
        put("zipcode", self.zipcode.clone().map(Value::Text));
        put(
            "timecard_entered_flag",
            self.timecard_entered_flag.map(|f| encode_flag(f).into()),
        );

        record
    }
}

/// Column definitions of the `timecard` table, in storage order.
#[must_use]
pub fn timecard_table() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("id", "INTEGER").with_options("PRIMARY KEY"),
        ColumnSpec::new("time_stamp", "TEXT").with_options("NOT NULL"),
        ColumnSpec::new("in_out_flag", "TEXT").with_options("NOT NULL CHECK (in_out_flag IN ('I', 'O'))"),
        ColumnSpec::new("location_raw", "TEXT"),
        ColumnSpec::new("latitude", "REAL"),
        ColumnSpec::new("longitude", "REAL"),
        ColumnSpec::new("altitude", "REAL"),
        ColumnSpec::new("city", "TEXT"),
        ColumnSpec::new("state", "TEXT"),
        ColumnSpec::new("zipcode", "TEXT"),
        ColumnSpec::new("timecard_entered_flag", "TEXT").with_options("DEFAULT 'N'"),
    ]
}
