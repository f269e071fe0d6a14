//! `timestamp,power` CSV profiles.

use serde::Serialize;
use thiserror::Error;

const TIMESTAMP_COLUMN: &str = "timestamp";
const POWER_COLUMN: &str = "power";

/// A power profile read from one CSV file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PowerProfile {
    pub time: Vec<String>,
    /// Power per timestamp (kW).
    pub power: Vec<f64>,
}

impl PowerProfile {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),

    #[error("row {row}: power value \"{value}\" is not a number")]
    InvalidPower { row: usize, value: String },

    #[error("{0}")]
    Csv(#[from] csv::Error),
}

/// Returns `true` for names the upload endpoints accept.
pub fn is_csv_filename(name: &str) -> bool {
    name.ends_with(".csv")
}

/// Parses a CSV document with a header row naming `timestamp` and `power`.
///
/// Column order is free and extra columns are ignored. Fields are trimmed.
/// Rows are numbered from 1, counting data rows only.
///
/// # Errors
///
/// Returns [`ProfileError`] if a required column is missing, a power value
/// is not numeric, or the document is not well-formed CSV.
pub fn parse_profile_csv(bytes: &[u8]) -> Result<PowerProfile, ProfileError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = rdr.headers()?.clone();
    let column = |name: &'static str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or(ProfileError::MissingColumn(name))
    };
    let time_idx = column(TIMESTAMP_COLUMN)?;
    let power_idx = column(POWER_COLUMN)?;

    let mut profile = PowerProfile::default();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = i + 1;
        let timestamp = record.get(time_idx).unwrap_or_default();
        let raw = record.get(power_idx).unwrap_or_default();
        let power = raw.parse::<f64>().map_err(|_| ProfileError::InvalidPower {
            row,
            value: raw.to_string(),
        })?;
        profile.time.push(timestamp.to_string());
        profile.power.push(power);
    }

    Ok(profile)
}
