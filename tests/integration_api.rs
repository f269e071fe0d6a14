//! Integration tests for the HTTP API feature.

#![cfg(feature = "api")]

mod common;

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::util::ServiceExt;

use microgrid_sim::api::{AppState, router};
use microgrid_sim::config::AppConfig;
use microgrid_sim::scenario;

const BOUNDARY: &str = "integration-boundary";

fn build_app() -> Router {
    let config = AppConfig::from_toml_str(
        "[server]\ncors_origins = [\"https://grid.example.com\"]\nmax_upload_bytes = 65536\n",
    )
    .expect("config should parse");
    router(Arc::new(AppState::new(&config.server)))
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn json_post(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn csv_upload(uri: &str, field: &str, files: &[(&str, String)]) -> Request<Body> {
    let mut body = String::new();
    for (name, content) in files {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; \
             filename=\"{name}\"\r\nContent-Type: text/csv\r\n\r\n{content}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn profile_csv(time: &[String], power: &[f64]) -> String {
    let mut out = String::from("timestamp,power\n");
    for (t, p) in time.iter().zip(power) {
        out.push_str(&format!("{t},{p}\n"));
    }
    out
}

#[tokio::test]
async fn simulate_demo_request_over_http() {
    let request = serde_json::to_value(scenario::demo()).expect("serialize demo");
    let (status, json) = send(build_app(), json_post("/api/v1/simulate", &request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["time"].as_array().map(Vec::len), Some(4));
    assert_eq!(json["grid_import_kw"], serde_json::json!([10.0, 10.0, 0.0, 0.0]));
    assert_eq!(json["batt_charge_kw"], serde_json::json!([0.0, 0.0, 10.0, 0.0]));
    assert_eq!(json["grid_export_kw"], serde_json::json!([0.0, 0.0, 0.0, 10.0]));
    assert_eq!(json["batt_soc_pct"], serde_json::json!([50.0, 50.0, 100.0, 100.0]));
    assert_eq!(json["step_minutes"], 30.0);

    let summary = &json["summary"];
    for key in [
        "total_demand_kwh",
        "total_renewables_kwh",
        "total_battery_charge_kwh",
        "total_battery_discharge_kwh",
        "total_unmet_kwh",
        "lolp",
        "lolp_pct",
        "total_cost",
        "total_co2_kg",
    ] {
        assert!(summary.get(key).is_some(), "summary missing {key}");
    }
    let cost = summary["cost_import"].as_f64().unwrap_or(f64::NAN);
    assert!((cost - 1.5).abs() < common::TOL);
}

#[tokio::test]
async fn uploaded_profiles_feed_a_simulation() {
    let time = common::timestamps(3, 60);
    let demand = profile_csv(&time, &[5.0, 6.0, 7.0]);
    let pv = profile_csv(&time, &[7.0, 2.0, 0.0]);

    let (status, uploaded) = send(
        build_app(),
        csv_upload(
            "/api/v1/upload-multiple",
            "files",
            &[("demand.csv", demand), ("pv.csv", pv)],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let request = serde_json::json!({
        "time": uploaded["time"],
        "demand_kw": uploaded["profiles"]["demand.csv"],
        "generation": {"pv": uploaded["profiles"]["pv.csv"]},
        "config": {"grid": {"import_tariff_per_kwh": 0.1, "export_tariff_per_kwh": 0.05}}
    });
    let (status, json) = send(build_app(), json_post("/api/v1/simulate", &request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["grid_export_kw"], serde_json::json!([2.0, 0.0, 0.0]));
    assert_eq!(json["grid_import_kw"], serde_json::json!([0.0, 4.0, 7.0]));
    let total_cost = json["summary"]["total_cost"].as_f64().unwrap_or(f64::NAN);
    assert!((total_cost - (1.1 - 0.1)).abs() < 1e-9);
}

#[tokio::test]
async fn single_upload_round_trips_profile() {
    let time = common::timestamps(2, 15);
    let csv = profile_csv(&time, &[1.25, 2.5]);
    let (status, json) = send(
        build_app(),
        csv_upload("/api/v1/upload", "file", &[("site.csv", csv)]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["time"][0], time[0].as_str());
    assert_eq!(json["power"], serde_json::json!([1.25, 2.5]));
}

#[tokio::test]
async fn invalid_config_reports_field() {
    let request = serde_json::json!({
        "time": ["2024-06-01T00:00:00"],
        "demand_kw": [1.0],
        "config": {"battery": {
            "capacity_kwh": 0.0,
            "charge_power_kw": 5.0,
            "discharge_power_kw": 5.0
        }}
    });
    let (status, json) = send(build_app(), json_post("/api/v1/simulate", &request)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let detail = json["detail"].as_str().unwrap_or_default();
    assert!(detail.contains("config.battery.capacity_kwh"), "{detail}");
}

#[tokio::test]
async fn battery_and_generator_without_ratings_are_rejected() {
    let request = serde_json::json!({
        "time": ["2024-06-01T00:00:00", "2024-06-01T01:00:00"],
        "demand_kw": [4.0, 4.0],
        "config": {"battery": {}, "generator": {}}
    });
    let (status, json) = send(build_app(), json_post("/api/v1/simulate", &request)).await;

    assert!(status.is_client_error(), "unexpected status {status}");
    let detail = json["detail"].as_str().unwrap_or_default();
    assert!(detail.contains("capacity_kwh"), "{detail}");
    assert!(json.get("batt_discharge_kw").is_none());
}

#[tokio::test]
async fn upload_without_multipart_body_is_rejected() {
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/upload")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let (status, json) = send(build_app(), req).await;

    assert!(status.is_client_error(), "unexpected status {status}");
    assert!(json["detail"].as_str().is_some_and(|d| !d.is_empty()));
}

#[tokio::test]
async fn non_csv_in_multi_upload_is_rejected() {
    let (status, json) = send(
        build_app(),
        csv_upload(
            "/api/v1/upload-multiple",
            "files",
            &[
                ("a.csv", "timestamp,power\nt0,1\n".to_string()),
                ("b.json", "{}".to_string()),
            ],
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "File must be a CSV");
}

#[tokio::test]
async fn empty_request_returns_empty_columns() {
    let request = serde_json::json!({"time": [], "demand_kw": []});
    let (status, json) = send(build_app(), json_post("/api/v1/simulate", &request)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["demand_kw"], serde_json::json!([]));
    assert_eq!(json["summary"]["lolp"], 0.0);
    assert_eq!(json["summary"]["total_cost"], 0.0);
}
