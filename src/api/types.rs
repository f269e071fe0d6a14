//! API request, response, and error types.
//!
//! Simulation results are returned column-wise: one array per flow, aligned
//! index-by-index with `time`.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::error::SimError;
use crate::io::ProfileError;
use crate::sim::SimulationOutcome;
use crate::sim::summary::SimulationSummary;
use crate::sim::types::IntervalResult;

/// Liveness response for `GET /`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: &'static str,
}

/// Several uploaded profiles sharing the first file's timestamps.
#[derive(Debug, Serialize)]
pub struct MultipleProfilesResponse {
    /// Timestamps of the first uploaded file.
    pub time: Vec<String>,
    /// Power series keyed by filename.
    pub profiles: BTreeMap<String, Vec<f64>>,
}

/// Column-wise simulation result.
#[derive(Debug, Serialize)]
pub struct SimulationResponse {
    pub time: Vec<String>,
    pub demand_kw: Vec<f64>,
    pub pv_kw: Vec<f64>,
    pub wind_kw: Vec<f64>,
    pub other_kw: Vec<f64>,
    pub renewables_kw: Vec<f64>,
    pub batt_charge_kw: Vec<f64>,
    pub batt_discharge_kw: Vec<f64>,
    pub batt_soc_pct: Vec<f64>,
    pub generator_kw: Vec<f64>,
    pub grid_import_kw: Vec<f64>,
    pub grid_export_kw: Vec<f64>,
    pub unmet_kw: Vec<f64>,
    pub curtailed_kw: Vec<f64>,
    pub step_minutes: f64,
    pub summary: SimulationSummary,
}

impl From<SimulationOutcome> for SimulationResponse {
    fn from(outcome: SimulationOutcome) -> Self {
        let r = &outcome.intervals;
        let column = |f: fn(&IntervalResult) -> f64| -> Vec<f64> {
            r.iter().map(f).collect()
        };
        Self {
            demand_kw: column(|i| i.demand_kw),
            pv_kw: column(|i| i.pv_kw),
            wind_kw: column(|i| i.wind_kw),
            other_kw: column(|i| i.other_kw),
            renewables_kw: column(|i| i.renewables_kw),
            batt_charge_kw: column(|i| i.charge_kw),
            batt_discharge_kw: column(|i| i.discharge_kw),
            batt_soc_pct: column(|i| i.soc_pct),
            generator_kw: column(|i| i.generator_kw),
            grid_import_kw: column(|i| i.import_kw),
            grid_export_kw: column(|i| i.export_kw),
            unmet_kw: column(|i| i.unmet_kw),
            curtailed_kw: column(|i| i.curtailed_kw),
            step_minutes: outcome.step_minutes,
            time: outcome.time,
            summary: outcome.summary,
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub detail: String,
}

/// Failures surfaced to API clients.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("File must be a CSV")]
    NotCsv,

    #[error("Error processing CSV file: {0}")]
    Profile(#[from] ProfileError),

    #[error("missing multipart field `{0}`")]
    MissingField(&'static str),

    #[error("{0}")]
    Simulation(#[from] SimError),

    /// Request body the extractors could not accept.
    #[error("{detail}")]
    Rejected { status: StatusCode, detail: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Rejected { status, .. } => *status,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::Rejected {
            status: err.status(),
            detail: err.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(%status, error = %self, "request rejected");
        (
            status,
            Json(ErrorResponse {
                detail: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulation_response_maps_columns() {
        let outcome = SimulationOutcome {
            time: vec!["a".into(), "b".into()],
            step_minutes: 30.0,
            intervals: vec![
                IntervalResult {
                    timestep: 0,
                    demand_kw: 3.0,
                    charge_kw: 1.5,
                    soc_pct: 60.0,
                    import_kw: 2.0,
                    ..IntervalResult::default()
                },
                IntervalResult {
                    timestep: 1,
                    demand_kw: 4.0,
                    discharge_kw: 2.5,
                    export_kw: 0.5,
                    ..IntervalResult::default()
                },
            ],
            summary: SimulationSummary::default(),
        };
        let resp = SimulationResponse::from(outcome);

        assert_eq!(resp.time, vec!["a", "b"]);
        assert_eq!(resp.demand_kw, vec![3.0, 4.0]);
        assert_eq!(resp.batt_charge_kw, vec![1.5, 0.0]);
        assert_eq!(resp.batt_discharge_kw, vec![0.0, 2.5]);
        assert_eq!(resp.batt_soc_pct, vec![60.0, 0.0]);
        assert_eq!(resp.grid_import_kw, vec![2.0, 0.0]);
        assert_eq!(resp.grid_export_kw, vec![0.0, 0.5]);
        assert_eq!(resp.step_minutes, 30.0);
    }

    #[test]
    fn csv_errors_carry_prefix() {
        let err = ApiError::from(ProfileError::MissingColumn("power"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().starts_with("Error processing CSV file: "));
    }

    #[test]
    fn simulation_errors_pass_message_through() {
        let err = ApiError::from(SimError::LengthMismatch {
            expected: 2,
            actual: 1,
        });
        assert_eq!(
            err.to_string(),
            "Length of demand_kw (1) must match length of time (2)"
        );
    }
}
