//! Fixed-priority allocation of one interval's surplus or deficit.
//!
//! Surplus: battery charge, then grid export, then curtailment.
//! Deficit: battery discharge, then generator and grid import in the order
//! given by [`GridPriority`], then unmet demand.

use crate::devices::{BatteryState, Generator, GridConnection};

use super::types::GridPriority;

/// Sign of an interval's net renewable balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Balance {
    /// Renewables meet demand; carries the excess (kW, >= 0).
    Surplus(f64),
    /// Renewables fall short; carries the shortfall (kW, > 0).
    Deficit(f64),
}

impl Balance {
    /// Classifies `renewables_kw - demand_kw`. A zero balance is a surplus.
    pub fn from_net(net_kw: f64) -> Self {
        if net_kw >= 0.0 {
            Self::Surplus(net_kw)
        } else {
            Self::Deficit(-net_kw)
        }
    }
}

/// Power flows decided for one interval (kW unless noted).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Allocation {
    pub charge_kw: f64,
    /// Energy that reached storage after charging losses (kWh).
    pub stored_kwh: f64,
    pub discharge_kw: f64,
    pub generator_kw: f64,
    pub import_kw: f64,
    pub export_kw: f64,
    pub curtailed_kw: f64,
    pub unmet_kw: f64,
}

/// The interval-invariant resources and the allocation policy over them.
///
/// The battery is not held here: it is the only state that carries across
/// intervals and is threaded through [`Dispatcher::allocate`] by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dispatcher {
    pub generator: Option<Generator>,
    pub grid: Option<GridConnection>,
}

impl Dispatcher {
    pub fn new(generator: Option<Generator>, grid: Option<GridConnection>) -> Self {
        Self { generator, grid }
    }

    fn priority(&self) -> GridPriority {
        self.grid
            .as_ref()
            .map_or(GridPriority::AfterGen, |g| g.priority)
    }

    /// Allocates one interval's balance across battery, grid, and generator.
    pub fn allocate(
        &self,
        balance: Balance,
        battery: Option<&mut BatteryState>,
        dt_hours: f64,
    ) -> Allocation {
        match balance {
            Balance::Surplus(surplus_kw) => self.absorb_surplus(surplus_kw, battery, dt_hours),
            Balance::Deficit(deficit_kw) => self.cover_deficit(deficit_kw, battery, dt_hours),
        }
    }

    fn absorb_surplus(
        &self,
        surplus_kw: f64,
        battery: Option<&mut BatteryState>,
        dt_hours: f64,
    ) -> Allocation {
        let mut alloc = Allocation::default();
        let mut surplus = surplus_kw;

        if let Some(battery) = battery {
            let charge = battery.charge(surplus, dt_hours);
            alloc.charge_kw = charge.power_kw;
            alloc.stored_kwh = charge.stored_kwh;
            surplus -= charge.power_kw;
        }

        self.spill(surplus, &mut alloc);
        alloc
    }

    fn cover_deficit(
        &self,
        deficit_kw: f64,
        battery: Option<&mut BatteryState>,
        dt_hours: f64,
    ) -> Allocation {
        let mut alloc = Allocation::default();
        let mut deficit = deficit_kw;

        if let Some(battery) = battery {
            alloc.discharge_kw = battery.discharge(deficit, dt_hours);
            deficit -= alloc.discharge_kw;
        }

        match self.priority() {
            GridPriority::BeforeGen => {
                deficit = self.draw_import(deficit, &mut alloc);
                deficit = self.run_generator(deficit, &mut alloc);
            }
            GridPriority::AfterGen => {
                deficit = self.run_generator(deficit, &mut alloc);
                deficit = self.draw_import(deficit, &mut alloc);
            }
        }

        if deficit > 0.0 {
            alloc.unmet_kw = deficit;
        }
        alloc
    }

    /// Imports toward `need_kw` and returns what is still uncovered.
    fn draw_import(&self, need_kw: f64, alloc: &mut Allocation) -> f64 {
        let Some(grid) = &self.grid else {
            return need_kw;
        };
        let import_kw = grid.import_kw(need_kw);
        alloc.import_kw += import_kw;
        need_kw - import_kw
    }

    /// Dispatches the generator toward `need_kw` and returns what is still
    /// uncovered. Output forced above the need by the minimum-loading floor
    /// is spilled to export and then curtailment.
    fn run_generator(&self, need_kw: f64, alloc: &mut Allocation) -> f64 {
        let Some(generator) = &self.generator else {
            return need_kw;
        };
        let output_kw = generator.output_kw(need_kw);
        alloc.generator_kw += output_kw;

        let excess_kw = (output_kw - need_kw).max(0.0);
        self.spill(excess_kw, alloc);

        need_kw - need_kw.min(output_kw)
    }

    /// Offers `excess_kw` to grid export and curtails the remainder.
    fn spill(&self, excess_kw: f64, alloc: &mut Allocation) {
        if excess_kw <= 0.0 {
            return;
        }
        let export_kw = self.grid.as_ref().map_or(0.0, |g| g.export_kw(excess_kw));
        alloc.export_kw += export_kw;

        let remainder = excess_kw - export_kw;
        if remainder > 0.0 {
            alloc.curtailed_kw += remainder;
        }
    }
}
