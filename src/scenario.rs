//! Simulation requests for batch runs: JSON files and built-in presets.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::sim::types::{
    BatteryConfig, GenerationProfiles, GridConfig, SimulationConfig, SimulationRequest,
};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read request `{path}`: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in request `{path}`: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid value for `preset`: unknown preset `{0}` (expected one of: demo)")]
    UnknownPreset(String),
}

/// Reads a [`SimulationRequest`] from a JSON file.
///
/// # Errors
///
/// Returns [`ScenarioError::Read`] or [`ScenarioError::Parse`]; the message
/// carries the file path and the JSON line/column.
pub fn load_request(path: &Path) -> Result<SimulationRequest, ScenarioError> {
    let raw = fs::read_to_string(path).map_err(|source| ScenarioError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ScenarioError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Returns a built-in request by name.
pub fn from_preset(name: &str) -> Result<SimulationRequest, ScenarioError> {
    match name {
        "demo" => Ok(demo()),
        _ => Err(ScenarioError::UnknownPreset(name.to_string())),
    }
}

/// Four half-hour intervals of 10 kW demand. The battery sits at its floor
/// while PV is dark, so the grid carries the first hour; the PV surplus then
/// fills the battery and the remainder is exported.
pub fn demo() -> SimulationRequest {
    let time = ["00:00", "00:30", "01:00", "01:30"]
        .iter()
        .map(|hm| format!("2024-06-01T{hm}:00"))
        .collect();

    SimulationRequest {
        time,
        demand_kw: vec![10.0; 4],
        generation: Some(GenerationProfiles {
            pv: Some(vec![0.0, 0.0, 20.0, 20.0]),
            ..GenerationProfiles::default()
        }),
        config: SimulationConfig {
            step_minutes: None,
            battery: Some(BatteryConfig {
                capacity_kwh: 10.0,
                soc_init_pct: 50.0,
                soc_min_pct: 50.0,
                soc_max_pct: 100.0,
                charge_power_kw: 10.0,
                discharge_power_kw: 10.0,
                charge_efficiency: 1.0,
                discharge_efficiency: 1.0,
            }),
            generator: None,
            grid: Some(GridConfig {
                import_tariff_per_kwh: 0.15,
                ..GridConfig::default()
            }),
        },
    }
}
