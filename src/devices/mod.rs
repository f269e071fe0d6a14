//! Dispatchable resources of the microgrid.

/// Battery storage with a usable state-of-charge band.
pub mod battery;
/// Backup generator with a minimum-loading floor.
pub mod generator;
/// Grid connection with import/export caps and tariffs.
pub mod grid;

pub use battery::{BatteryState, ChargeOutcome};
pub use generator::Generator;
pub use grid::GridConnection;
