//! Request handlers for the API endpoints.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::Multipart;
use axum::extract::multipart::{Field, MultipartRejection};
use axum::extract::rejection::JsonRejection;

use super::types::{ApiError, MultipleProfilesResponse, SimulationResponse, StatusResponse};
use crate::io::{PowerProfile, is_csv_filename, parse_profile_csv};
use crate::sim::simulate;
use crate::sim::types::SimulationRequest;

/// Liveness probe.
///
/// `GET /` → 200 + `{"message": ...}`
pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "Microgrid dispatch API is running",
    })
}

/// Parses a single uploaded CSV profile.
///
/// `POST /api/v1/upload` (multipart field `file`) → 200 + `{time, power}`
pub async fn upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PowerProfile>, ApiError> {
    let mut multipart = multipart?;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let (filename, profile) = read_profile(field).await?;
        tracing::info!(%filename, rows = profile.len(), "profile uploaded");
        return Ok(Json(profile));
    }
    Err(ApiError::MissingField("file"))
}

/// Parses several uploaded CSV profiles.
///
/// `POST /api/v1/upload-multiple` (multipart fields `files`) → 200 +
/// `{time, profiles}`; `time` comes from the first file.
pub async fn upload_multiple(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<MultipleProfilesResponse>, ApiError> {
    let mut multipart = multipart?;
    let mut time: Option<Vec<String>> = None;
    let mut profiles = BTreeMap::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("files") {
            continue;
        }
        let (filename, profile) = read_profile(field).await?;
        if time.is_none() {
            time = Some(profile.time);
        }
        profiles.insert(filename, profile.power);
    }

    let time = time.ok_or(ApiError::MissingField("files"))?;
    tracing::info!(files = profiles.len(), rows = time.len(), "profiles uploaded");
    Ok(Json(MultipleProfilesResponse { time, profiles }))
}

/// Runs the dispatch engine on a request.
///
/// `POST /api/v1/simulate` → 200 + `SimulationResponse`; length mismatch or
/// invalid configuration → 400 + `{detail}`.
pub async fn simulate_request(
    payload: Result<Json<SimulationRequest>, JsonRejection>,
) -> Result<Json<SimulationResponse>, ApiError> {
    let Json(request) = payload?;
    let outcome = simulate(&request)?;
    Ok(Json(SimulationResponse::from(outcome)))
}

async fn read_profile(field: Field<'_>) -> Result<(String, PowerProfile), ApiError> {
    let filename = field.file_name().unwrap_or_default().to_string();
    if !is_csv_filename(&filename) {
        return Err(ApiError::NotCsv);
    }
    let bytes = field.bytes().await?;
    let profile = parse_profile_csv(&bytes)?;
    Ok((filename, profile))
}
