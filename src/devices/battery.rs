use crate::sim::types::BatteryConfig;

/// A battery energy storage system carried across the intervals of one run.
///
/// `BatteryState` tracks the stored energy and enforces the usable band
/// `[min_kwh, max_kwh]`, the charge/discharge power ratings, and the
/// efficiency losses on each side.
///
/// # Efficiency convention
/// - Charging: losses reduce what is stored, not what is drawn from the bus.
/// - Discharging: more energy leaves storage than is delivered to the bus.
#[derive(Debug, Clone, PartialEq)]
pub struct BatteryState {
    /// Battery capacity in kilowatt-hours.
    pub capacity_kwh: f64,

    /// Current energy content in kilowatt-hours.
    pub energy_kwh: f64,

    /// Lower bound of the usable band (kWh).
    pub min_kwh: f64,

    /// Upper bound of the usable band (kWh).
    pub max_kwh: f64,

    /// Maximum charge power in kilowatts.
    pub charge_power_kw: f64,

    /// Maximum discharge power in kilowatts.
    pub discharge_power_kw: f64,

    /// Charging efficiency (0..1.0].
    pub charge_efficiency: f64,

    /// Discharging efficiency (0..1.0].
    pub discharge_efficiency: f64,
}

/// Result of one charging interval.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChargeOutcome {
    /// Power drawn from the bus (kW).
    pub power_kw: f64,
    /// Energy added to storage after losses (kWh).
    pub stored_kwh: f64,
}

impl BatteryState {
    /// Builds a fresh battery from its configuration, starting at the
    /// configured initial state of charge.
    pub fn from_config(cfg: &BatteryConfig) -> Self {
        let pct = |p: f64| cfg.capacity_kwh * (p / 100.0);
        Self {
            capacity_kwh: cfg.capacity_kwh,
            energy_kwh: pct(cfg.soc_init_pct),
            min_kwh: pct(cfg.soc_min_pct),
            max_kwh: pct(cfg.soc_max_pct),
            charge_power_kw: cfg.charge_power_kw,
            discharge_power_kw: cfg.discharge_power_kw,
            charge_efficiency: cfg.charge_efficiency,
            discharge_efficiency: cfg.discharge_efficiency,
        }
    }

    /// State of charge as a percentage of capacity, clamped to `[0, 100]`.
    pub fn soc_pct(&self) -> f64 {
        if self.capacity_kwh > 0.0 {
            (100.0 * self.energy_kwh / self.capacity_kwh).clamp(0.0, 100.0)
        } else {
            0.0
        }
    }

    /// Absorbs up to `surplus_kw` for one interval of `dt_hours`.
    ///
    /// Charging power is the minimum of the surplus, the charge rating, and
    /// the power that would exactly fill the headroom to `max_kwh`.
    pub fn charge(&mut self, surplus_kw: f64, dt_hours: f64) -> ChargeOutcome {
        if surplus_kw <= 0.0 {
            return ChargeOutcome::default();
        }

        let headroom_kwh = (self.max_kwh - self.energy_kwh).max(0.0);
        let soc_limit_kw = if dt_hours > 0.0 && self.charge_efficiency > 0.0 {
            headroom_kwh / (self.charge_efficiency * dt_hours)
        } else {
            0.0
        };
        let power_kw = surplus_kw
            .min(self.charge_power_kw)
            .min(soc_limit_kw)
            .max(0.0);

        let stored_kwh = power_kw * dt_hours * self.charge_efficiency;
        self.energy_kwh = (self.energy_kwh + stored_kwh).min(self.max_kwh);

        ChargeOutcome {
            power_kw,
            stored_kwh,
        }
    }

    /// Delivers up to `deficit_kw` for one interval of `dt_hours` and returns
    /// the power delivered to the bus.
    ///
    /// Discharge power is the minimum of the deficit, the discharge rating,
    /// and the power deliverable from the energy above `min_kwh`.
    pub fn discharge(&mut self, deficit_kw: f64, dt_hours: f64) -> f64 {
        if deficit_kw <= 0.0 {
            return 0.0;
        }

        let available_kwh = (self.energy_kwh - self.min_kwh).max(0.0);
        let soc_limit_kw = if dt_hours > 0.0 {
            available_kwh * self.discharge_efficiency / dt_hours
        } else {
            0.0
        };
        let power_kw = deficit_kw
            .min(self.discharge_power_kw)
            .min(soc_limit_kw)
            .max(0.0);

        let efficiency = if self.discharge_efficiency > 0.0 {
            self.discharge_efficiency
        } else {
            1.0
        };
        let removed_kwh = power_kw * dt_hours / efficiency;
        self.energy_kwh = (self.energy_kwh - removed_kwh).max(self.min_kwh);

        power_kw
    }
}
