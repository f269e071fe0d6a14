//! Microgrid dispatch simulator: balances demand against renewables, a
//! battery, a backup generator, and the grid, one interval at a time.

#[cfg(feature = "api")]
pub mod api;
pub mod cli;
pub mod config;
pub mod devices;
pub mod error;
/// CSV profile import and interval result export.
pub mod io;
pub mod scenario;
/// Dispatch engine, timestep resolution, and summary aggregation.
pub mod sim;
pub mod telemetry;
