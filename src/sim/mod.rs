/// Interval duration resolution.
pub mod clock;
pub mod dispatch;
pub mod engine;
/// Per-interval energy conservation checks.
pub mod power_balance;
/// Demand and renewable series alignment.
pub mod series;
pub mod summary;
pub mod types;

pub use engine::{Engine, SimulationOutcome, simulate};
