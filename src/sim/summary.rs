//! Energy, cost, emissions, and reliability totals for a run.

use std::fmt;

use serde::Serialize;

use crate::devices::{Generator, GridConnection};

use super::types::IntervalResult;

/// Unmet power above this level (kW) counts the interval as lost load.
pub const LOST_LOAD_THRESHOLD_KW: f64 = 1e-6;

/// Aggregate results of one simulation run. Energies in kWh.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub total_demand_kwh: f64,
    pub total_pv_kwh: f64,
    pub total_wind_kwh: f64,
    pub total_other_kwh: f64,
    pub total_renewables_kwh: f64,
    /// Energy drawn from the bus to charge the battery.
    pub total_battery_charge_kwh: f64,
    /// Energy that reached storage after charging losses.
    pub total_battery_stored_kwh: f64,
    /// Energy delivered by the battery to the bus.
    pub total_battery_discharge_kwh: f64,
    pub total_generator_kwh: f64,
    pub total_grid_import_kwh: f64,
    pub total_grid_export_kwh: f64,
    pub total_unmet_kwh: f64,
    pub total_curtailed_kwh: f64,
    /// Fraction of intervals with lost load.
    pub lolp: f64,
    /// `lolp` as a percentage.
    pub lolp_pct: f64,
    pub cost_import: f64,
    pub revenue_export: f64,
    pub cost_generator: f64,
    /// `cost_import - revenue_export + cost_generator`.
    pub total_cost: f64,
    pub total_co2_kg: f64,
}

/// Prices and emission factors applied to the flows.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tariffs {
    pub import_per_kwh: f64,
    pub export_per_kwh: f64,
    pub generator_per_kwh: f64,
    pub generator_co2_kg_per_kwh: f64,
}

impl Tariffs {
    /// Collects the tariffs of the configured resources; absent resources
    /// contribute zero.
    pub fn new(generator: Option<&Generator>, grid: Option<&GridConnection>) -> Self {
        Self {
            import_per_kwh: grid.map_or(0.0, |g| g.import_tariff_per_kwh),
            export_per_kwh: grid.map_or(0.0, |g| g.export_tariff_per_kwh),
            generator_per_kwh: generator.map_or(0.0, |g| g.cost_per_kwh),
            generator_co2_kg_per_kwh: generator.map_or(0.0, |g| g.co2_kg_per_kwh),
        }
    }
}

/// Running totals threaded through the interval loop.
///
/// Every flow is integrated as `power * dt_hours`; production is counted
/// when generated regardless of where it ends up.
#[derive(Debug, Clone)]
pub struct SummaryAccumulator {
    dt_hours: f64,
    tariffs: Tariffs,
    intervals: usize,
    lost_load_intervals: usize,
    totals: SimulationSummary,
}

impl SummaryAccumulator {
    pub fn new(dt_hours: f64, tariffs: Tariffs) -> Self {
        Self {
            dt_hours,
            tariffs,
            intervals: 0,
            lost_load_intervals: 0,
            totals: SimulationSummary::default(),
        }
    }

    /// Folds one interval into the totals.
    ///
    /// # Arguments
    ///
    /// * `r` - The interval's dispatch record
    /// * `stored_kwh` - Energy that reached storage in the interval
    pub fn record(&mut self, r: &IntervalResult, stored_kwh: f64) {
        let dt = self.dt_hours;
        let t = &mut self.totals;

        t.total_demand_kwh += r.demand_kw * dt;
        t.total_pv_kwh += r.pv_kw * dt;
        t.total_wind_kwh += r.wind_kw * dt;
        t.total_other_kwh += r.other_kw * dt;
        t.total_renewables_kwh += r.renewables_kw * dt;
        t.total_battery_charge_kwh += r.charge_kw * dt;
        t.total_battery_stored_kwh += stored_kwh;
        t.total_battery_discharge_kwh += r.discharge_kw * dt;
        t.total_generator_kwh += r.generator_kw * dt;
        t.total_grid_import_kwh += r.import_kw * dt;
        t.total_grid_export_kwh += r.export_kw * dt;
        t.total_unmet_kwh += r.unmet_kw * dt;
        t.total_curtailed_kwh += r.curtailed_kw * dt;

        t.cost_import += r.import_kw * dt * self.tariffs.import_per_kwh;
        t.revenue_export += r.export_kw * dt * self.tariffs.export_per_kwh;
        t.cost_generator += r.generator_kw * dt * self.tariffs.generator_per_kwh;
        t.total_co2_kg += r.generator_kw * dt * self.tariffs.generator_co2_kg_per_kwh;

        self.intervals += 1;
        if r.unmet_kw > LOST_LOAD_THRESHOLD_KW {
            self.lost_load_intervals += 1;
        }
    }

    /// Derives the reliability and cost figures and returns the summary.
    pub fn finish(self) -> SimulationSummary {
        let mut s = self.totals;
        s.lolp = if self.intervals > 0 {
            self.lost_load_intervals as f64 / self.intervals as f64
        } else {
            0.0
        };
        s.lolp_pct = 100.0 * s.lolp;
        s.total_cost = s.cost_import - s.revenue_export + s.cost_generator;
        s
    }
}

impl fmt::Display for SimulationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Summary ---")?;
        writeln!(f, "Demand:            {:>10.2} kWh", self.total_demand_kwh)?;
        writeln!(
            f,
            "Renewables:        {:>10.2} kWh (pv {:.2}, wind {:.2}, other {:.2})",
            self.total_renewables_kwh, self.total_pv_kwh, self.total_wind_kwh, self.total_other_kwh
        )?;
        writeln!(
            f,
            "Battery:           {:>10.2} kWh in, {:.2} kWh out",
            self.total_battery_charge_kwh, self.total_battery_discharge_kwh
        )?;
        writeln!(f, "Generator:         {:>10.2} kWh", self.total_generator_kwh)?;
        writeln!(
            f,
            "Grid:              {:>10.2} kWh import, {:.2} kWh export",
            self.total_grid_import_kwh, self.total_grid_export_kwh
        )?;
        writeln!(f, "Unmet:             {:>10.2} kWh", self.total_unmet_kwh)?;
        writeln!(f, "Curtailed:         {:>10.2} kWh", self.total_curtailed_kwh)?;
        writeln!(f, "LOLP:              {:>10.2} %", self.lolp_pct)?;
        writeln!(
            f,
            "Cost:              {:>10.2} (import {:.2}, export -{:.2}, generator {:.2})",
            self.total_cost, self.cost_import, self.revenue_export, self.cost_generator
        )?;
        write!(f, "CO2:               {:>10.2} kg", self.total_co2_kg)
    }
}
