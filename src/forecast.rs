//! The forecast orchestrator — primary public API.
//!
//! Walks an hourly weather series and chains the solar, cloud, and aerosol
//! models into one predicted-irradiance figure per hour, each with its own
//! confidence score. Night hours short-circuit the whole chain.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::atmosphere;
use crate::solar;
use crate::tuning::{
    CONFIDENCE_FLOOR, NIGHT_CONFIDENCE, SYSTEM_EFFICIENCY, TEMP_COEFFICIENT_PER_C,
    TEMP_DERATE_BASE_C,
};
use crate::weather::{WeatherSample, WeatherSeries};

/// Validated geographic point.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GeoLocation {
    latitude: f64,
    longitude: f64,
}

impl GeoLocation {
    /// Validate and construct. Coordinates must be finite and in range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ForecastError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(ForecastError::InvalidLatitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(ForecastError::InvalidLongitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Structural input errors. Everything past construction is total.
#[derive(Debug)]
pub enum ForecastError {
    InvalidLatitude(f64),
    InvalidLongitude(f64),
}

impl fmt::Display for ForecastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLatitude(v) => {
                write!(f, "Invalid latitude {} (must be finite, -90..90)", v)
            }
            Self::InvalidLongitude(v) => {
                write!(f, "Invalid longitude {} (must be finite, -180..180)", v)
            }
        }
    }
}

impl std::error::Error for ForecastError {}

/// One forecast hour.
///
/// `predicted_irradiance` and `confidence` are the contract; elevation and
/// the beam/diffuse split ride along for charting and export consumers and
/// never feed back into the prediction.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastPoint {
    pub time: DateTime<Utc>,
    pub predicted_irradiance: f64,
    pub confidence: f64,
    pub solar_elevation: f64,
    pub direct_normal: f64,
    pub diffuse_horizontal: f64,
}

/// The forecaster: a location plus the per-hour model chain.
pub struct Forecaster {
    location: GeoLocation,
}

impl Forecaster {
    pub fn new(location: GeoLocation) -> Self {
        Self { location }
    }

    pub fn location(&self) -> GeoLocation {
        self.location
    }

    /// Forecast every hour of the series, preserving order and length.
    ///
    /// Pure and total: per-sample arithmetic is clamp-guarded end to end,
    /// so a valid location and series always yield a full output.
    pub fn forecast(&self, series: &WeatherSeries) -> Vec<ForecastPoint> {
        series
            .samples()
            .iter()
            .enumerate()
            .map(|(idx, sample)| self.forecast_hour(series, idx, sample))
            .collect()
    }

    fn forecast_hour(
        &self,
        series: &WeatherSeries,
        idx: usize,
        sample: &WeatherSample,
    ) -> ForecastPoint {
        let position = solar::solar_position(
            sample.time,
            self.location.latitude,
            self.location.longitude,
        );

        // Night: confidently zero, nothing else to model.
        if position.elevation < 0.0 {
            return ForecastPoint {
                time: sample.time,
                predicted_irradiance: 0.0,
                confidence: NIGHT_CONFIDENCE,
                solar_elevation: position.elevation,
                direct_normal: 0.0,
                diffuse_horizontal: 0.0,
            };
        }

        // The observed shortwave radiation is treated as the potential
        // baseline and attenuated by our own cloud and aerosol factors,
        // even though the upstream figure is already cloud-affected. The
        // clear-sky value participates only through the clearness index.
        let cloud = atmosphere::cloud_impact(sample.cloud_cover, sample.temperature);
        let aerosol = atmosphere::aerosol_transmission(position.elevation);
        let predicted_ghi = sample.shortwave_radiation * cloud * aerosol;

        let temp_loss =
            1.0 + TEMP_COEFFICIENT_PER_C * (sample.temperature - TEMP_DERATE_BASE_C).max(0.0);
        let predicted_irradiance = (predicted_ghi * SYSTEM_EFFICIENCY * temp_loss).max(0.0);

        let split = atmosphere::decompose(predicted_ghi, position.elevation, sample.cloud_cover);

        ForecastPoint {
            time: sample.time,
            predicted_irradiance,
            confidence: confidence(series, idx, position.elevation, sample),
            solar_elevation: position.elevation,
            direct_normal: split.direct_normal,
            diffuse_horizontal: split.diffuse_horizontal,
        }
    }
}

/// Per-hour forecast confidence in [0.1, 1].
///
/// Combines local cloud volatility (spread between the two neighboring
/// hours), solar elevation, and a temperature sanity band. Night hours are
/// "confidently zero" at a fixed 0.95.
fn confidence(series: &WeatherSeries, idx: usize, elevation: f64, sample: &WeatherSample) -> f64 {
    if elevation < 0.0 {
        return NIGHT_CONFIDENCE;
    }

    let prev = if idx > 0 { series.get(idx - 1) } else { None };
    let next = series.get(idx + 1);
    let cloud_variance = match (prev, next) {
        (Some(p), Some(n)) => (p.cloud_cover - n.cloud_cover).abs() / 100.0,
        _ => 0.0,
    };

    let cloud_confidence = 1.0 - 0.4 * cloud_variance;
    let elevation_confidence = (elevation / 80.0).min(1.0);
    let temp_confidence = if sample.temperature < -10.0 || sample.temperature > 40.0 {
        0.7
    } else {
        0.9
    };

    (cloud_confidence * elevation_confidence * temp_confidence).max(CONFIDENCE_FLOOR)
}
