//! Core simulation types: request payload, resource configuration, and the
//! per-interval dispatch record.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::ConfigError;

/// Renewable generation profiles aligned index-by-index with the request's
/// timestamps. Any profile may be shorter than the timestamp sequence; the
/// missing tail is treated as zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationProfiles {
    /// Photovoltaic output (kW).
    #[serde(default)]
    pub pv: Option<Vec<f64>>,
    /// Wind output (kW).
    #[serde(default)]
    pub wind: Option<Vec<f64>>,
    /// Additional named sources (kW), summed into a single component.
    #[serde(default)]
    pub other: Option<BTreeMap<String, Vec<f64>>>,
}

/// Battery storage parameters.
///
/// Capacity and power ratings are required on the wire; the SOC band and
/// efficiencies fall back to their defaults when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryConfig {
    /// Total energy capacity (kWh, > 0).
    pub capacity_kwh: f64,
    /// Initial state of charge (% of capacity).
    #[serde(default = "default_soc_init_pct")]
    pub soc_init_pct: f64,
    /// Lower bound of the usable band (% of capacity).
    #[serde(default)]
    pub soc_min_pct: f64,
    /// Upper bound of the usable band (% of capacity).
    #[serde(default = "default_soc_max_pct")]
    pub soc_max_pct: f64,
    /// Maximum charging power drawn from the bus (kW).
    pub charge_power_kw: f64,
    /// Maximum discharging power delivered to the bus (kW).
    pub discharge_power_kw: f64,
    /// Charging efficiency in (0, 1].
    #[serde(default = "default_efficiency")]
    pub charge_efficiency: f64,
    /// Discharging efficiency in (0, 1].
    #[serde(default = "default_efficiency")]
    pub discharge_efficiency: f64,
}

fn default_soc_init_pct() -> f64 {
    50.0
}

fn default_soc_max_pct() -> f64 {
    100.0
}

fn default_efficiency() -> f64 {
    0.95
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity_kwh: 10.0,
            soc_init_pct: default_soc_init_pct(),
            soc_min_pct: 0.0,
            soc_max_pct: default_soc_max_pct(),
            charge_power_kw: 5.0,
            discharge_power_kw: 5.0,
            charge_efficiency: default_efficiency(),
            discharge_efficiency: default_efficiency(),
        }
    }
}

/// Backup generator parameters. `max_power_kw` is required on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Whether the generator may be dispatched at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Rated output (kW).
    pub max_power_kw: f64,
    /// Minimum loading as a fraction of rated output (0..1).
    #[serde(default = "default_min_loading_pct")]
    pub min_loading_pct: f64,
    /// Running cost per kWh produced.
    #[serde(default)]
    pub variable_cost_per_kwh: f64,
    /// Emissions per kWh produced (kg CO2).
    #[serde(default)]
    pub co2_kg_per_kwh: f64,
}

fn default_enabled() -> bool {
    true
}

fn default_min_loading_pct() -> f64 {
    0.3
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_power_kw: 0.0,
            min_loading_pct: default_min_loading_pct(),
            variable_cost_per_kwh: 0.0,
            co2_kg_per_kwh: 0.0,
        }
    }
}

/// Order in which grid import and the generator cover a deficit that the
/// battery could not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridPriority {
    /// Generator first, grid import covers what remains.
    #[default]
    AfterGen,
    /// Grid import first, generator covers what remains.
    BeforeGen,
}

impl GridPriority {
    /// Maps a wire label to a policy.
    ///
    /// Only `"before_gen"` selects [`GridPriority::BeforeGen`]; every other
    /// label falls back to [`GridPriority::AfterGen`]. Labels other than
    /// `"after_gen"` are logged as a warning.
    pub fn from_label(label: &str) -> Self {
        match label {
            "before_gen" => Self::BeforeGen,
            "after_gen" => Self::AfterGen,
            other => {
                tracing::warn!(priority = other, "unrecognized grid priority, using after_gen");
                Self::AfterGen
            }
        }
    }

    /// Wire label for this policy.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AfterGen => "after_gen",
            Self::BeforeGen => "before_gen",
        }
    }
}

impl<'de> Deserialize<'de> for GridPriority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_label(&label))
    }
}

impl Serialize for GridPriority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Grid connection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub allow_import: bool,
    pub allow_export: bool,
    /// Price paid per imported kWh.
    pub import_tariff_per_kwh: f64,
    /// Revenue per exported kWh.
    pub export_tariff_per_kwh: f64,
    /// Import cap (kW); unbounded when absent.
    pub import_limit_kw: Option<f64>,
    /// Export cap (kW); unbounded when absent.
    pub export_limit_kw: Option<f64>,
    pub priority: GridPriority,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            allow_import: true,
            allow_export: true,
            import_tariff_per_kwh: 0.0,
            export_tariff_per_kwh: 0.0,
            import_limit_kw: None,
            export_limit_kw: None,
            priority: GridPriority::AfterGen,
        }
    }
}

/// Static configuration for one simulation run.
///
/// A resource that is absent does not exist for the run: no battery means
/// no storage, no grid means neither import nor export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Explicit interval length in minutes. Absent or zero means the length
    /// is inferred from the timestamps.
    pub step_minutes: Option<u32>,
    pub battery: Option<BatteryConfig>,
    pub generator: Option<GeneratorConfig>,
    pub grid: Option<GridConfig>,
}

impl SimulationConfig {
    /// Validates all resource parameters and returns every violation found.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if let Some(bat) = &self.battery {
            check_finite(&mut errors, "config.battery.capacity_kwh", bat.capacity_kwh);
            if bat.capacity_kwh <= 0.0 {
                errors.push(ConfigError::new("config.battery.capacity_kwh", "must be > 0"));
            }
            if !(0.0..=100.0).contains(&bat.soc_min_pct) {
                errors.push(ConfigError::new("config.battery.soc_min_pct", "must be in [0, 100]"));
            }
            if !(0.0..=100.0).contains(&bat.soc_max_pct) {
                errors.push(ConfigError::new("config.battery.soc_max_pct", "must be in [0, 100]"));
            }
            if bat.soc_min_pct > bat.soc_max_pct {
                errors.push(ConfigError::new(
                    "config.battery.soc_min_pct",
                    "must be <= config.battery.soc_max_pct",
                ));
            }
            if !(bat.soc_min_pct..=bat.soc_max_pct).contains(&bat.soc_init_pct) {
                errors.push(ConfigError::new(
                    "config.battery.soc_init_pct",
                    "must lie within [soc_min_pct, soc_max_pct]",
                ));
            }
            for (field, value) in [
                ("config.battery.charge_power_kw", bat.charge_power_kw),
                ("config.battery.discharge_power_kw", bat.discharge_power_kw),
            ] {
                check_non_negative(&mut errors, field, value);
            }
            for (field, value) in [
                ("config.battery.charge_efficiency", bat.charge_efficiency),
                ("config.battery.discharge_efficiency", bat.discharge_efficiency),
            ] {
                if !(value > 0.0 && value <= 1.0) {
                    errors.push(ConfigError::new(field, "must be in (0, 1]"));
                }
            }
        }

        if let Some(generator) = &self.generator {
            for (field, value) in [
                ("config.generator.max_power_kw", generator.max_power_kw),
                (
                    "config.generator.variable_cost_per_kwh",
                    generator.variable_cost_per_kwh,
                ),
                ("config.generator.co2_kg_per_kwh", generator.co2_kg_per_kwh),
            ] {
                check_non_negative(&mut errors, field, value);
            }
            if !(0.0..=1.0).contains(&generator.min_loading_pct) {
                errors.push(ConfigError::new(
                    "config.generator.min_loading_pct",
                    "must be a fraction in [0, 1]",
                ));
            }
        }

        if let Some(grid) = &self.grid {
            check_finite(&mut errors, "config.grid.import_tariff_per_kwh", grid.import_tariff_per_kwh);
            check_finite(&mut errors, "config.grid.export_tariff_per_kwh", grid.export_tariff_per_kwh);
            if let Some(limit) = grid.import_limit_kw {
                check_non_negative(&mut errors, "config.grid.import_limit_kw", limit);
            }
            if let Some(limit) = grid.export_limit_kw {
                check_non_negative(&mut errors, "config.grid.export_limit_kw", limit);
            }
        }

        errors
    }
}

fn check_finite(errors: &mut Vec<ConfigError>, field: &str, value: f64) {
    if !value.is_finite() {
        errors.push(ConfigError::new(field, "must be a finite number"));
    }
}

fn check_non_negative(errors: &mut Vec<ConfigError>, field: &str, value: f64) {
    if !value.is_finite() || value < 0.0 {
        errors.push(ConfigError::new(field, "must be a finite number >= 0"));
    }
}

/// Complete input for one simulation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationRequest {
    /// Interval start timestamps (ISO-8601-like, strictly increasing).
    pub time: Vec<String>,
    /// Demand per interval (kW); must have one entry per timestamp.
    pub demand_kw: Vec<f64>,
    #[serde(default)]
    pub generation: Option<GenerationProfiles>,
    #[serde(default)]
    pub config: SimulationConfig,
}

impl SimulationRequest {
    /// Validates series values and resource configuration.
    ///
    /// Length alignment between `time` and `demand_kw` is checked separately
    /// by the engine so it can be reported as a shape error.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if let Some(i) = self.demand_kw.iter().position(|v| !v.is_finite()) {
            errors.push(ConfigError::new(
                format!("demand_kw[{i}]"),
                "must be a finite number",
            ));
        }
        if let Some(generation) = &self.generation {
            let named = generation
                .pv
                .iter()
                .map(|v| ("generation.pv".to_string(), v))
                .chain(generation.wind.iter().map(|v| ("generation.wind".to_string(), v)))
                .chain(
                    generation
                        .other
                        .iter()
                        .flatten()
                        .map(|(name, v)| (format!("generation.other.{name}"), v)),
                );
            for (field, values) in named {
                if let Some(i) = values.iter().position(|v| !v.is_finite()) {
                    errors.push(ConfigError::new(
                        format!("{field}[{i}]"),
                        "must be a finite number",
                    ));
                }
            }
        }
        errors.extend(self.config.validate());
        errors
    }
}

/// Dispatch record for one interval. All flows are non-negative kW.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IntervalResult {
    /// Interval index.
    pub timestep: usize,
    pub demand_kw: f64,
    pub pv_kw: f64,
    pub wind_kw: f64,
    /// Sum of all additional named sources.
    pub other_kw: f64,
    /// `pv_kw + wind_kw + other_kw`.
    pub renewables_kw: f64,
    /// Power drawn from the bus into the battery.
    pub charge_kw: f64,
    /// Power delivered from the battery to the bus.
    pub discharge_kw: f64,
    /// Battery state of charge at the end of the interval (%); zero without a battery.
    pub soc_pct: f64,
    pub generator_kw: f64,
    pub import_kw: f64,
    pub export_kw: f64,
    /// Demand left unserved after every resource was tried.
    pub unmet_kw: f64,
    /// Generation that could be neither stored, consumed, nor exported.
    pub curtailed_kw: f64,
}

impl fmt::Display for IntervalResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:>4} | demand={:>7.2} kW  renew={:>7.2} kW | bat(+{:.2}/-{:.2}, SoC={:>5.1}%) \
             gen={:.2}  imp={:.2}  exp={:.2} | unmet={:.2}  curt={:.2}",
            self.timestep,
            self.demand_kw,
            self.renewables_kw,
            self.charge_kw,
            self.discharge_kw,
            self.soc_pct,
            self.generator_kw,
            self.import_kw,
            self.export_kw,
            self.unmet_kw,
            self.curtailed_kw,
        )
    }
}
