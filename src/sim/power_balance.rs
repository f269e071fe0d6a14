//! Per-interval energy conservation.

use super::types::IntervalResult;

/// Total power entering the bus in an interval (kW).
///
/// Unmet demand is counted as a supply-side slack: it stands in for the
/// power no resource could provide.
pub fn sources_kw(r: &IntervalResult) -> f64 {
    r.renewables_kw + r.discharge_kw + r.generator_kw + r.import_kw + r.unmet_kw
}

/// Total power leaving the bus in an interval (kW).
pub fn sinks_kw(r: &IntervalResult) -> f64 {
    r.demand_kw + r.charge_kw + r.export_kw + r.curtailed_kw
}

/// Conservation residual `sources - sinks` (kW). Zero up to rounding for
/// every interval the engine produces.
pub fn residual_kw(r: &IntervalResult) -> f64 {
    sources_kw(r) - sinks_kw(r)
}
