use crate::sim::types::GeneratorConfig;

/// A dispatchable backup generator.
///
/// Stateless across intervals: no ramp limits and no fuel level. When it
/// runs at all it runs at or above its minimum-loading floor, so its output
/// may exceed the power actually needed.
#[derive(Debug, Clone, PartialEq)]
pub struct Generator {
    /// Rated output (kW).
    pub max_power_kw: f64,
    /// Minimum loading as a fraction of rated output.
    pub min_loading_fraction: f64,
    /// Running cost per kWh produced.
    pub cost_per_kwh: f64,
    /// Emissions per kWh produced (kg CO2).
    pub co2_kg_per_kwh: f64,
}

impl Generator {
    /// Builds a generator from its configuration.
    ///
    /// Returns `None` when the generator is disabled or has no rated output,
    /// since such a unit can never be dispatched.
    pub fn from_config(cfg: &GeneratorConfig) -> Option<Self> {
        if !cfg.enabled || cfg.max_power_kw <= 0.0 {
            return None;
        }
        Some(Self {
            max_power_kw: cfg.max_power_kw,
            min_loading_fraction: cfg.min_loading_pct,
            cost_per_kwh: cfg.variable_cost_per_kwh,
            co2_kg_per_kwh: cfg.co2_kg_per_kwh,
        })
    }

    /// Lowest output at which the generator may run (kW).
    pub fn min_output_kw(&self) -> f64 {
        self.min_loading_fraction * self.max_power_kw
    }

    /// Output for a given need (kW).
    ///
    /// Follows the need up to the rating; a positive output below the
    /// minimum-loading floor is raised to the floor.
    pub fn output_kw(&self, need_kw: f64) -> f64 {
        if need_kw <= 0.0 {
            return 0.0;
        }
        let power_kw = need_kw.min(self.max_power_kw);
        let floor_kw = self.min_output_kw();
        if power_kw > 0.0 && power_kw < floor_kw {
            floor_kw
        } else {
            power_kw
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(max_power_kw: f64, min_loading_pct: f64) -> Generator {
        Generator::from_config(&GeneratorConfig {
            enabled: true,
            max_power_kw,
            min_loading_pct,
            variable_cost_per_kwh: 0.3,
            co2_kg_per_kwh: 0.8,
        })
        .unwrap()
    }

    #[test]
    fn disabled_or_unrated_generator_is_absent() {
        let disabled = GeneratorConfig {
            enabled: false,
            max_power_kw: 10.0,
            ..GeneratorConfig::default()
        };
        assert!(Generator::from_config(&disabled).is_none());

        let unrated = GeneratorConfig {
            max_power_kw: 0.0,
            ..GeneratorConfig::default()
        };
        assert!(Generator::from_config(&unrated).is_none());
    }

    #[test]
    fn follows_need_between_floor_and_rating() {
        let g = generator(20.0, 0.25);
        assert_eq!(g.output_kw(12.0), 12.0);
    }

    #[test]
    fn capped_at_rating() {
        let g = generator(20.0, 0.25);
        assert_eq!(g.output_kw(35.0), 20.0);
    }

    #[test]
    fn small_need_raised_to_floor() {
        let g = generator(20.0, 0.5);
        assert_eq!(g.min_output_kw(), 10.0);
        assert_eq!(g.output_kw(3.0), 10.0);
    }

    #[test]
    fn no_need_means_off() {
        let g = generator(20.0, 0.5);
        assert_eq!(g.output_kw(0.0), 0.0);
        assert_eq!(g.output_kw(-1.0), 0.0);
    }
}
