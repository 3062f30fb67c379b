use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::analysis::{self, WeatherAnalysis};
use crate::forecast::{ForecastPoint, Forecaster, GeoLocation};
use crate::weather::{HourlyChannels, WeatherSeries};

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

pub(super) struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

// ─── POST /api/forecast ──────────────────────────────────────────

#[derive(Deserialize)]
pub struct ForecastRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub hourly: HourlyChannels,
}

#[derive(Serialize)]
pub struct ForecastResponse {
    pub latitude: f64,
    pub longitude: f64,
    pub forecast: Vec<ForecastPoint>,
}

pub async fn forecast(
    Json(req): Json<ForecastRequest>,
) -> Result<Json<ForecastResponse>, ApiError> {
    let start = Instant::now();

    let location = GeoLocation::new(req.latitude, req.longitude)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("{}", e)))?;
    let series = WeatherSeries::from_hourly(&req.hourly)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("{}", e)))?;

    let points = Forecaster::new(location).forecast(&series);

    let elapsed = start.elapsed();
    eprintln!(
        "[{}] POST /api/forecast lat={:.4} lon={:.4} -> {} hours ({:.1}ms)",
        Utc::now().format("%H:%M:%S"),
        location.latitude(),
        location.longitude(),
        points.len(),
        elapsed.as_secs_f64() * 1000.0,
    );

    Ok(Json(ForecastResponse {
        latitude: location.latitude(),
        longitude: location.longitude(),
        forecast: points,
    }))
}

// ─── POST /api/analysis ──────────────────────────────────────────

#[derive(Deserialize)]
pub struct AnalysisRequest {
    pub hourly: HourlyChannels,
}

pub async fn analysis(
    Json(req): Json<AnalysisRequest>,
) -> Result<Json<WeatherAnalysis>, ApiError> {
    let start = Instant::now();

    let series = WeatherSeries::from_hourly(&req.hourly)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("{}", e)))?;

    let summary = analysis::analyze(&series);

    let elapsed = start.elapsed();
    eprintln!(
        "[{}] POST /api/analysis {} samples -> quality {:.2} ({:.1}ms)",
        Utc::now().format("%H:%M:%S"),
        series.len(),
        summary.forecast_quality,
        elapsed.as_secs_f64() * 1000.0,
    );

    Ok(Json(summary))
}

// ─── GET /api/health ─────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub name: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}
