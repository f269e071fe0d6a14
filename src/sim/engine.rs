//! Simulation engine: walks the intervals in order, carrying only the
//! battery state from one interval to the next.

use serde::Serialize;

use crate::devices::{BatteryState, Generator, GridConnection};
use crate::error::SimError;

use super::clock::StepDuration;
use super::dispatch::{Balance, Dispatcher};
use super::series::{AlignedSeries, IntervalInput};
use super::summary::{SimulationSummary, SummaryAccumulator, Tariffs};
use super::types::{BatteryConfig, IntervalResult, SimulationConfig, SimulationRequest};

/// Complete output of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationOutcome {
    /// Timestamps echoed from the request.
    pub time: Vec<String>,
    /// Resolved interval length.
    pub step_minutes: f64,
    pub intervals: Vec<IntervalResult>,
    pub summary: SimulationSummary,
}

/// Dispatch engine for one static configuration.
///
/// Holds only immutable configuration; each [`Engine::run`] builds its own
/// battery and accumulator, so concurrent or repeated runs share nothing.
#[derive(Debug, Clone)]
pub struct Engine {
    step: StepDuration,
    battery: Option<BatteryConfig>,
    dispatcher: Dispatcher,
    tariffs: Tariffs,
}

impl Engine {
    /// Creates an engine from a (validated) configuration and a resolved
    /// interval length.
    pub fn new(config: &SimulationConfig, step: StepDuration) -> Self {
        let generator = config.generator.as_ref().and_then(Generator::from_config);
        let grid = config.grid.as_ref().map(GridConnection::from_config);
        let tariffs = Tariffs::new(generator.as_ref(), grid.as_ref());
        Self {
            step,
            battery: config.battery.clone(),
            dispatcher: Dispatcher::new(generator, grid),
            tariffs,
        }
    }

    pub fn step_duration(&self) -> StepDuration {
        self.step
    }

    /// Advances one interval.
    ///
    /// # Arguments
    ///
    /// * `t` - Interval index
    /// * `input` - Demand and renewable components for the interval
    /// * `battery` - Battery state, updated in place
    /// * `summary` - Running totals, updated in place
    ///
    /// # Returns
    ///
    /// The interval's dispatch record.
    pub fn step(
        &self,
        t: usize,
        input: &IntervalInput,
        mut battery: Option<&mut BatteryState>,
        summary: &mut SummaryAccumulator,
    ) -> IntervalResult {
        let renewables_kw = input.renewables_kw();
        let balance = Balance::from_net(renewables_kw - input.demand_kw);

        let alloc = self
            .dispatcher
            .allocate(balance, battery.as_deref_mut(), self.step.hours());

        let result = IntervalResult {
            timestep: t,
            demand_kw: input.demand_kw,
            pv_kw: input.pv_kw,
            wind_kw: input.wind_kw,
            other_kw: input.other_kw,
            renewables_kw,
            charge_kw: alloc.charge_kw,
            discharge_kw: alloc.discharge_kw,
            soc_pct: battery.map_or(0.0, |b| b.soc_pct()),
            generator_kw: alloc.generator_kw,
            import_kw: alloc.import_kw,
            export_kw: alloc.export_kw,
            unmet_kw: alloc.unmet_kw,
            curtailed_kw: alloc.curtailed_kw,
        };
        summary.record(&result, alloc.stored_kwh);
        result
    }

    /// Runs every interval of `series` from a fresh battery.
    pub fn run(&self, series: &AlignedSeries) -> (Vec<IntervalResult>, SimulationSummary) {
        let mut battery = self.battery.as_ref().map(BatteryState::from_config);
        let mut summary = SummaryAccumulator::new(self.step.hours(), self.tariffs);
        let mut results = Vec::with_capacity(series.len());

        for (t, input) in series.iter().enumerate() {
            results.push(self.step(t, &input, battery.as_mut(), &mut summary));
        }

        (results, summary.finish())
    }
}

/// Validates a request and runs it to completion.
///
/// # Errors
///
/// Returns [`SimError::LengthMismatch`] if `demand_kw` and `time` differ in
/// length, or [`SimError::InvalidConfig`] listing every invalid parameter.
pub fn simulate(request: &SimulationRequest) -> Result<SimulationOutcome, SimError> {
    let n = request.time.len();
    if request.demand_kw.len() != n {
        return Err(SimError::LengthMismatch {
            expected: n,
            actual: request.demand_kw.len(),
        });
    }
    let errors = request.validate();
    if !errors.is_empty() {
        return Err(SimError::InvalidConfig(errors));
    }

    let step = StepDuration::resolve(request.config.step_minutes, &request.time);
    tracing::debug!(intervals = n, step_minutes = step.minutes(), "starting simulation");

    let engine = Engine::new(&request.config, step);
    let series = AlignedSeries::align(&request.demand_kw, request.generation.as_ref());
    let (intervals, summary) = engine.run(&series);

    tracing::info!(
        intervals = n,
        unmet_kwh = summary.total_unmet_kwh,
        total_cost = summary.total_cost,
        lolp = summary.lolp,
        "simulation complete"
    );

    Ok(SimulationOutcome {
        time: request.time.clone(),
        step_minutes: step.minutes(),
        intervals,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::power_balance::residual_kw;
    use crate::sim::types::{GeneratorConfig, GenerationProfiles, GridConfig};

    fn hourly(n: usize) -> Vec<String> {
        (0..n).map(|h| format!("2024-06-01T{h:02}:00:00")).collect()
    }

    #[test]
    fn rejects_length_mismatch() {
        let req = SimulationRequest {
            time: hourly(3),
            demand_kw: vec![1.0, 2.0],
            ..SimulationRequest::default()
        };
        let err = simulate(&req).unwrap_err();
        assert!(matches!(err, SimError::LengthMismatch { expected: 3, actual: 2 }));
    }

    #[test]
    fn rejects_invalid_config() {
        let req = SimulationRequest {
            time: hourly(1),
            demand_kw: vec![1.0],
            config: SimulationConfig {
                battery: Some(BatteryConfig {
                    capacity_kwh: -1.0,
                    ..BatteryConfig::default()
                }),
                ..SimulationConfig::default()
            },
            ..SimulationRequest::default()
        };
        assert!(matches!(simulate(&req), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn empty_request_is_neutral() {
        let out = simulate(&SimulationRequest::default()).unwrap();
        assert!(out.intervals.is_empty());
        assert_eq!(out.summary.lolp, 0.0);
        assert_eq!(out.step_minutes, 60.0);
    }

    #[test]
    fn step_minutes_inferred_from_timestamps() {
        let req = SimulationRequest {
            time: vec!["2024-06-01T00:00:00".into(), "2024-06-01T00:15:00".into()],
            demand_kw: vec![4.0, 4.0],
            ..SimulationRequest::default()
        };
        let out = simulate(&req).unwrap();
        assert_eq!(out.step_minutes, 15.0);
        assert!((out.summary.total_demand_kwh - 2.0).abs() < 1e-12);
        assert!((out.summary.total_unmet_kwh - 2.0).abs() < 1e-12);
    }

    #[test]
    fn zero_duration_run_does_not_raise() {
        let config = SimulationConfig {
            battery: Some(BatteryConfig::default()),
            grid: Some(GridConfig::default()),
            ..SimulationConfig::default()
        };
        let engine = Engine::new(&config, StepDuration::from_hours(0.0));
        let generation = GenerationProfiles {
            pv: Some(vec![0.0, 9.0]),
            ..GenerationProfiles::default()
        };
        let series = AlignedSeries::align(&[3.0, 3.0], Some(&generation));
        let (results, summary) = engine.run(&series);

        assert_eq!(results[0].discharge_kw, 0.0);
        assert_eq!(results[0].import_kw, 3.0);
        assert_eq!(results[1].charge_kw, 0.0);
        assert_eq!(results[1].export_kw, 6.0);
        assert_eq!(results[1].soc_pct, 50.0);
        assert_eq!(summary.total_demand_kwh, 0.0);
        assert_eq!(summary.total_cost, 0.0);
    }

    #[test]
    fn battery_state_carries_across_intervals() {
        let config = SimulationConfig {
            battery: Some(BatteryConfig {
                capacity_kwh: 10.0,
                soc_init_pct: 0.0,
                soc_min_pct: 0.0,
                soc_max_pct: 100.0,
                charge_power_kw: 5.0,
                discharge_power_kw: 5.0,
                charge_efficiency: 1.0,
                discharge_efficiency: 1.0,
            }),
            ..SimulationConfig::default()
        };
        let engine = Engine::new(&config, StepDuration::from_minutes(60));
        let generation = GenerationProfiles {
            pv: Some(vec![5.0, 5.0, 0.0, 0.0, 0.0]),
            ..GenerationProfiles::default()
        };
        let series = AlignedSeries::align(&[0.0, 0.0, 4.0, 4.0, 4.0], Some(&generation));
        let (results, _) = engine.run(&series);

        let soc: Vec<f64> = results.iter().map(|r| r.soc_pct).collect();
        assert_eq!(soc, vec![50.0, 100.0, 60.0, 20.0, 0.0]);
        assert_eq!(results[4].discharge_kw, 2.0);
        assert_eq!(results[4].unmet_kw, 2.0);
    }

    #[test]
    fn every_interval_conserves_energy() {
        let config = SimulationConfig {
            step_minutes: Some(30),
            battery: Some(BatteryConfig {
                charge_efficiency: 0.9,
                discharge_efficiency: 0.85,
                ..BatteryConfig::default()
            }),
            generator: Some(GeneratorConfig {
                max_power_kw: 6.0,
                min_loading_pct: 0.5,
                ..GeneratorConfig::default()
            }),
            grid: Some(GridConfig {
                import_limit_kw: Some(2.0),
                export_limit_kw: Some(1.5),
                ..GridConfig::default()
            }),
        };
        let engine = Engine::new(&config, StepDuration::from_minutes(30));
        let demand: Vec<f64> = (0..48).map(|i| 3.0 + f64::from(i % 7)).collect();
        let generation = GenerationProfiles {
            pv: Some((0..48).map(|i| f64::from((i * 5) % 13)).collect()),
            wind: Some(vec![1.0; 20]),
            other: None,
        };
        let series = AlignedSeries::align(&demand, Some(&generation));
        let (results, _) = engine.run(&series);

        for r in &results {
            assert!(residual_kw(r).abs() < 1e-9, "unbalanced interval: {r}");
        }
    }
}
