use crate::sim::types::{GridConfig, GridPriority};

/// Point of common coupling with the utility grid.
///
/// Import and export are gated independently and each may carry a power
/// cap; an absent cap is unbounded.
#[derive(Debug, Clone, PartialEq)]
pub struct GridConnection {
    pub allow_import: bool,
    pub allow_export: bool,
    pub import_tariff_per_kwh: f64,
    pub export_tariff_per_kwh: f64,
    pub import_limit_kw: Option<f64>,
    pub export_limit_kw: Option<f64>,
    /// Whether import is tried before or after the generator in a deficit.
    pub priority: GridPriority,
}

impl GridConnection {
    pub fn from_config(cfg: &GridConfig) -> Self {
        Self {
            allow_import: cfg.allow_import,
            allow_export: cfg.allow_export,
            import_tariff_per_kwh: cfg.import_tariff_per_kwh,
            export_tariff_per_kwh: cfg.export_tariff_per_kwh,
            import_limit_kw: cfg.import_limit_kw,
            export_limit_kw: cfg.export_limit_kw,
            priority: cfg.priority,
        }
    }

    /// Import power granted for a given need (kW).
    pub fn import_kw(&self, need_kw: f64) -> f64 {
        if !self.allow_import || need_kw <= 0.0 {
            return 0.0;
        }
        need_kw.min(self.import_limit_kw.unwrap_or(need_kw))
    }

    /// Export power accepted for a given excess (kW).
    pub fn export_kw(&self, excess_kw: f64) -> f64 {
        if !self.allow_export || excess_kw <= 0.0 {
            return 0.0;
        }
        excess_kw.min(self.export_limit_kw.unwrap_or(excess_kw))
    }
}
