//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use microgrid_sim::sim::types::{
    BatteryConfig, GenerationProfiles, GeneratorConfig, GridConfig, SimulationConfig,
    SimulationRequest,
};

/// Tolerance for floating-point flow comparisons (kW / kWh).
pub const TOL: f64 = 1e-9;

/// `n` timestamps `step_minutes` apart starting at midnight.
pub fn timestamps(n: usize, step_minutes: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let minutes = i * step_minutes;
            format!(
                "2024-06-{:02}T{:02}:{:02}:00",
                1 + minutes / 1440,
                (minutes / 60) % 24,
                minutes % 60
            )
        })
        .collect()
}

/// Lossless 10 kWh battery with a 0..100 % band.
pub fn ideal_battery(soc_init_pct: f64, power_kw: f64) -> BatteryConfig {
    BatteryConfig {
        capacity_kwh: 10.0,
        soc_init_pct,
        soc_min_pct: 0.0,
        soc_max_pct: 100.0,
        charge_power_kw: power_kw,
        discharge_power_kw: power_kw,
        charge_efficiency: 1.0,
        discharge_efficiency: 1.0,
    }
}

/// 20 kW generator with an 80 % minimum-loading floor (16 kW).
pub fn stiff_generator() -> GeneratorConfig {
    GeneratorConfig {
        max_power_kw: 20.0,
        min_loading_pct: 0.8,
        variable_cost_per_kwh: 0.3,
        co2_kg_per_kwh: 0.8,
        ..GeneratorConfig::default()
    }
}

/// Grid with no import, no export.
pub fn islanded_grid() -> GridConfig {
    GridConfig {
        allow_import: false,
        allow_export: false,
        ..GridConfig::default()
    }
}

/// Hourly request with a PV profile and the given resources.
pub fn hourly_request(
    demand_kw: Vec<f64>,
    pv: Vec<f64>,
    config: SimulationConfig,
) -> SimulationRequest {
    SimulationRequest {
        time: timestamps(demand_kw.len(), 60),
        demand_kw,
        generation: Some(GenerationProfiles {
            pv: Some(pv),
            ..GenerationProfiles::default()
        }),
        config,
    }
}

/// A day of mixed conditions exercising every resource.
pub fn mixed_day() -> SimulationRequest {
    let demand: Vec<f64> = (0..48)
        .map(|i| 4.0 + 3.0 * ((i as f64) * 0.26).sin().abs())
        .collect();
    let pv: Vec<f64> = (0..48)
        .map(|i| {
            let h = i as f64 / 2.0;
            if (6.0..18.0).contains(&h) {
                9.0 * ((h - 6.0) / 12.0 * std::f64::consts::PI).sin()
            } else {
                0.0
            }
        })
        .collect();
    let wind: Vec<f64> = (0..40).map(|i| f64::from(i % 5) * 0.5).collect();

    SimulationRequest {
        time: timestamps(48, 30),
        demand_kw: demand,
        generation: Some(GenerationProfiles {
            pv: Some(pv),
            wind: Some(wind),
            other: Some([("hydro".to_string(), vec![0.5; 48])].into_iter().collect()),
        }),
        config: SimulationConfig {
            step_minutes: None,
            battery: Some(BatteryConfig {
                capacity_kwh: 12.0,
                soc_init_pct: 40.0,
                soc_min_pct: 20.0,
                soc_max_pct: 90.0,
                charge_power_kw: 4.0,
                discharge_power_kw: 3.0,
                charge_efficiency: 0.92,
                discharge_efficiency: 0.9,
            }),
            generator: Some(GeneratorConfig {
                max_power_kw: 5.0,
                min_loading_pct: 0.4,
                variable_cost_per_kwh: 0.35,
                co2_kg_per_kwh: 0.7,
                ..GeneratorConfig::default()
            }),
            grid: Some(GridConfig {
                import_tariff_per_kwh: 0.2,
                export_tariff_per_kwh: 0.05,
                import_limit_kw: Some(1.5),
                export_limit_kw: Some(2.0),
                ..GridConfig::default()
            }),
        },
    }
}
