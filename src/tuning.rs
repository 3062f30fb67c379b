//! Tuning constants shared across the engine.
//!
//! These are the knobs that are policy rather than physics: system-level
//! derating, fallback defaults for missing channels, and the alert
//! thresholds. Model coefficients that define a published formula
//! (Spencer terms, Kasten-Young airmass, diffuse-fraction bands) stay with
//! their formulas.

/// Flat system efficiency applied to the predicted plane irradiance.
pub const SYSTEM_EFFICIENCY: f64 = 0.85;

/// Power temperature coefficient per °C above [`TEMP_DERATE_BASE_C`].
pub const TEMP_COEFFICIENT_PER_C: f64 = -0.004;

/// Cell temperature above which derating kicks in (°C).
pub const TEMP_DERATE_BASE_C: f64 = 25.0;

/// Confidence reported for night hours ("confidently zero").
pub const NIGHT_CONFIDENCE: f64 = 0.95;

/// Lower bound for any daytime confidence value.
pub const CONFIDENCE_FLOOR: f64 = 0.1;

// ─── Defaults for missing required channels ─────────────────────

pub const DEFAULT_TEMPERATURE_C: f64 = 25.0;
pub const DEFAULT_CLOUD_COVER_PCT: f64 = 0.0;
pub const DEFAULT_SHORTWAVE_W_M2: f64 = 0.0;

// ─── Analysis window ────────────────────────────────────────────

/// Samples considered by the trend and quality estimators.
pub const ANALYSIS_WINDOW: usize = 24;

/// Quality reported when the series is too short to estimate variance.
pub const QUALITY_FALLBACK: f64 = 0.5;

// ─── Alert thresholds ───────────────────────────────────────────

/// Current cloud cover (%) above which the cloud alert fires.
pub const CLOUD_ALERT_CURRENT_PCT: f64 = 80.0;

/// Cloud cover swing (max − min, %) over the swing window that fires the alert.
pub const CLOUD_ALERT_SWING_PCT: f64 = 50.0;

/// Samples inspected for the cloud swing check.
pub const CLOUD_SWING_WINDOW: usize = 6;

/// Temperature alert bounds (°C).
pub const TEMP_ALERT_LOW_C: f64 = -10.0;
pub const TEMP_ALERT_HIGH_C: f64 = 40.0;

/// Current wind speed (m/s) above which the wind alert fires.
pub const WIND_ALERT_MS: f64 = 20.0;

/// Absolute pressure trend (hPa/h) above which the pressure alert fires.
pub const PRESSURE_TREND_ALERT_HPA_H: f64 = 1.5;

/// Current precipitation (mm) above which the precipitation alert fires.
pub const PRECIP_ALERT_MM: f64 = 5.0;
