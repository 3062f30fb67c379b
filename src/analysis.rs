//! Weather series analysis: trends, alerts, and forecast quality.
//!
//! Runs once per fetched series, independently of the irradiance forecast.
//! Degenerate series (empty or too short) are legitimate low-information
//! inputs and produce defined fallbacks rather than errors.

use serde::Serialize;

use crate::tuning::{
    ANALYSIS_WINDOW, CLOUD_ALERT_CURRENT_PCT, CLOUD_ALERT_SWING_PCT, CLOUD_SWING_WINDOW,
    PRECIP_ALERT_MM, PRESSURE_TREND_ALERT_HPA_H, QUALITY_FALLBACK, TEMP_ALERT_HIGH_C,
    TEMP_ALERT_LOW_C, WIND_ALERT_MS,
};
use crate::weather::{WeatherChannel, WeatherSample, WeatherSeries};

/// Per-channel linear trends over the analysis window, in unit/hour.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct WeatherTrends {
    pub temperature: f64,
    pub cloud_cover: f64,
    pub wind_speed: f64,
    pub pressure: f64,
    pub humidity: f64,
}

/// Independent threshold/variability alerts. "Current" is sample 0.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct WeatherAlerts {
    pub cloud_cover: bool,
    pub temperature: bool,
    pub wind: bool,
    pub pressure: bool,
    pub precipitation: bool,
}

/// Complete per-series analysis summary.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherAnalysis {
    /// Snapshot of the first sample; absent for an empty series.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<WeatherSample>,
    pub trends: WeatherTrends,
    pub alerts: WeatherAlerts,
    pub forecast_quality: f64,
}

/// Analyze a weather series into trends, alerts, and a quality score.
pub fn analyze(series: &WeatherSeries) -> WeatherAnalysis {
    let trends = WeatherTrends {
        temperature: trend_slope(series, WeatherChannel::Temperature),
        cloud_cover: trend_slope(series, WeatherChannel::CloudCover),
        wind_speed: trend_slope(series, WeatherChannel::WindSpeed),
        pressure: trend_slope(series, WeatherChannel::Pressure),
        humidity: trend_slope(series, WeatherChannel::Humidity),
    };

    WeatherAnalysis {
        current: series.get(0).cloned(),
        alerts: detect_alerts(series, &trends),
        forecast_quality: forecast_quality(series),
        trends,
    }
}

/// Ordinary least-squares slope of a channel against the sample index,
/// over the first `min(24, len)` samples.
///
/// Samples without a value for the channel contribute no point but keep
/// their index, so hourly spacing stays intact. Returns 0 with fewer than
/// two usable points or a degenerate denominator.
pub fn trend_slope(series: &WeatherSeries, channel: WeatherChannel) -> f64 {
    let window = &series.samples()[..series.len().min(ANALYSIS_WINDOW)];
    let points: Vec<(f64, f64)> = window
        .iter()
        .enumerate()
        .filter_map(|(i, s)| channel.value(s).map(|v| (i as f64, v)))
        .collect();

    if points.len() < 2 {
        return 0.0;
    }

    let n = points.len() as f64;
    let x_mean = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let y_mean = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let numerator: f64 = points
        .iter()
        .map(|(x, y)| (x - x_mean) * (y - y_mean))
        .sum();
    let denominator: f64 = points.iter().map(|(x, _)| (x - x_mean).powi(2)).sum();

    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Evaluate the five alert rules against the series and its trends.
pub fn detect_alerts(series: &WeatherSeries, trends: &WeatherTrends) -> WeatherAlerts {
    let current = match series.get(0) {
        Some(s) => s,
        None => return WeatherAlerts::default(),
    };

    let swing_window = &series.samples()[..series.len().min(CLOUD_SWING_WINDOW)];
    let cloud_swing = match swing_window
        .iter()
        .map(|s| s.cloud_cover)
        .fold(None::<(f64, f64)>, |acc, v| match acc {
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            None => Some((v, v)),
        }) {
        Some((lo, hi)) => hi - lo,
        None => 0.0,
    };

    WeatherAlerts {
        cloud_cover: current.cloud_cover > CLOUD_ALERT_CURRENT_PCT
            || cloud_swing > CLOUD_ALERT_SWING_PCT,
        temperature: current.temperature < TEMP_ALERT_LOW_C
            || current.temperature > TEMP_ALERT_HIGH_C,
        wind: current.wind_speed.is_some_and(|w| w > WIND_ALERT_MS),
        pressure: trends.pressure.abs() > PRESSURE_TREND_ALERT_HPA_H,
        precipitation: current.precipitation.is_some_and(|p| p > PRECIP_ALERT_MM),
    }
}

/// Variance-based composite quality score in [0.1, 0.99].
///
/// Temperature and cloud stability each weigh 0.4, presence of any
/// precipitation in the window weighs 0.2. Fewer than two samples fall
/// back to 0.5.
pub fn forecast_quality(series: &WeatherSeries) -> f64 {
    let window = &series.samples()[..series.len().min(ANALYSIS_WINDOW)];
    if window.len() < 2 {
        return QUALITY_FALLBACK;
    }

    let temp_stability =
        (1.0 - variance(window.iter().map(|s| s.temperature)).sqrt() / 20.0).max(0.3);
    let cloud_stability =
        (1.0 - variance(window.iter().map(|s| s.cloud_cover)).sqrt() / 40.0).max(0.3);
    let precip_factor = if window
        .iter()
        .any(|s| s.precipitation.is_some_and(|p| p > 0.0))
    {
        0.85
    } else {
        1.0
    };

    (0.4 * temp_stability + 0.4 * cloud_stability + 0.2 * precip_factor).clamp(0.1, 0.99)
}

/// Population variance.
fn variance(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let n = values.clone().count() as f64;
    if n == 0.0 {
        return 0.0;
    }
    let mean = values.clone().sum::<f64>() / n;
    values.map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::HourlyChannels;
    use approx::assert_relative_eq;

    fn times(n: usize) -> Vec<String> {
        (0..n)
            .map(|h| format!("2024-06-{:02}T{:02}:00", 21 + h / 24, h % 24))
            .collect()
    }

    fn series_with(f: impl FnOnce(&mut HourlyChannels), n: usize) -> WeatherSeries {
        let mut channels = HourlyChannels {
            time: times(n),
            ..Default::default()
        };
        f(&mut channels);
        WeatherSeries::from_hourly(&channels).unwrap()
    }

    fn some(values: Vec<f64>) -> Option<Vec<Option<f64>>> {
        Some(values.into_iter().map(Some).collect())
    }

    #[test]
    fn test_trend_recovers_exact_linear_slope() {
        let s = series_with(
            |c| c.temperature_2m = some((0..24).map(|i| 5.0 + 0.5 * i as f64).collect()),
            24,
        );
        assert_relative_eq!(
            trend_slope(&s, WeatherChannel::Temperature),
            0.5,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_trend_negative_slope() {
        let s = series_with(
            |c| c.surface_pressure = some((0..12).map(|i| 1020.0 - 2.0 * i as f64).collect()),
            12,
        );
        assert_relative_eq!(trend_slope(&s, WeatherChannel::Pressure), -2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_trend_constant_channel_is_flat() {
        let s = series_with(|c| c.cloud_cover = some(vec![55.0; 10]), 10);
        assert_eq!(trend_slope(&s, WeatherChannel::CloudCover), 0.0);
    }

    #[test]
    fn test_trend_degenerate_series_is_zero() {
        let empty = WeatherSeries::from_samples(Vec::new());
        assert_eq!(trend_slope(&empty, WeatherChannel::Temperature), 0.0);

        let single = series_with(|c| c.temperature_2m = some(vec![20.0]), 1);
        assert_eq!(trend_slope(&single, WeatherChannel::Temperature), 0.0);
    }

    #[test]
    fn test_trend_missing_channel_is_zero() {
        let s = series_with(|_| {}, 12);
        assert_eq!(trend_slope(&s, WeatherChannel::WindSpeed), 0.0);
        assert_eq!(trend_slope(&s, WeatherChannel::Humidity), 0.0);
    }

    #[test]
    fn test_trend_window_caps_at_24_samples() {
        // Linear over the first 24 hours, then a wild divergence the
        // estimator must never see.
        let mut values: Vec<f64> = (0..24).map(|i| 10.0 + 1.5 * i as f64).collect();
        values.extend([500.0; 6]);
        let s = series_with(|c| c.temperature_2m = some(values), 30);
        assert_relative_eq!(
            trend_slope(&s, WeatherChannel::Temperature),
            1.5,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_cloud_alert_from_current_cover() {
        let s = series_with(|c| c.cloud_cover = some(vec![85.0, 20.0, 20.0]), 3);
        let analysis = analyze(&s);
        assert!(analysis.alerts.cloud_cover, "85% current cover must alert");
    }

    #[test]
    fn test_cloud_alert_from_swing() {
        let s = series_with(
            |c| c.cloud_cover = some(vec![10.0, 30.0, 65.0, 70.0, 40.0, 20.0]),
            6,
        );
        assert!(
            analyze(&s).alerts.cloud_cover,
            "60-point swing in the first six hours must alert"
        );

        let calm = series_with(
            |c| c.cloud_cover = some(vec![30.0, 40.0, 50.0, 55.0, 45.0, 35.0]),
            6,
        );
        assert!(!analyze(&calm).alerts.cloud_cover);
    }

    #[test]
    fn test_temperature_alert_bounds() {
        let cold = series_with(|c| c.temperature_2m = some(vec![-12.0, -11.0]), 2);
        assert!(analyze(&cold).alerts.temperature);

        let hot = series_with(|c| c.temperature_2m = some(vec![41.0, 38.0]), 2);
        assert!(analyze(&hot).alerts.temperature);

        let mild = series_with(|c| c.temperature_2m = some(vec![-10.0, 40.0]), 2);
        assert!(!analyze(&mild).alerts.temperature, "Bounds are exclusive");
    }

    #[test]
    fn test_wind_alert_requires_present_channel() {
        let gusty = series_with(|c| c.wind_speed_10m = some(vec![25.0, 10.0]), 2);
        assert!(analyze(&gusty).alerts.wind);

        let missing = series_with(|_| {}, 2);
        assert!(!analyze(&missing).alerts.wind, "Absent channel never alerts");
    }

    #[test]
    fn test_pressure_alert_follows_trend_magnitude() {
        let falling = series_with(
            |c| c.surface_pressure = some((0..8).map(|i| 1015.0 - 2.0 * i as f64).collect()),
            8,
        );
        assert!(analyze(&falling).alerts.pressure, "-2 hPa/h must alert");

        let steady = series_with(
            |c| c.surface_pressure = some((0..8).map(|i| 1015.0 + 0.5 * i as f64).collect()),
            8,
        );
        assert!(!analyze(&steady).alerts.pressure);
    }

    #[test]
    fn test_precipitation_alert_on_current_sample() {
        let wet = series_with(|c| c.precipitation = some(vec![6.5, 0.0]), 2);
        assert!(analyze(&wet).alerts.precipitation);

        let later_rain = series_with(|c| c.precipitation = some(vec![0.0, 9.0]), 2);
        assert!(
            !analyze(&later_rain).alerts.precipitation,
            "Only the current sample drives the precipitation alert"
        );
    }

    #[test]
    fn test_quality_stable_series_hits_ceiling() {
        let s = series_with(
            |c| {
                c.temperature_2m = some(vec![20.0; 24]);
                c.cloud_cover = some(vec![10.0; 24]);
            },
            24,
        );
        // Zero variance, no precipitation: 0.4 + 0.4 + 0.2 clamps to 0.99
        assert_eq!(forecast_quality(&s), 0.99);
    }

    #[test]
    fn test_quality_volatile_series_scores_lower() {
        let s = series_with(
            |c| {
                c.temperature_2m =
                    some((0..24).map(|i| if i % 2 == 0 { -5.0 } else { 35.0 }).collect());
                c.cloud_cover =
                    some((0..24).map(|i| if i % 2 == 0 { 0.0 } else { 100.0 }).collect());
                c.precipitation = some((0..24).map(|i| if i == 3 { 2.0 } else { 0.0 }).collect());
            },
            24,
        );
        let q = forecast_quality(&s);
        // Both stabilities bottom out at 0.3, rain applies the 0.85 factor
        assert_relative_eq!(q, 0.4 * 0.3 + 0.4 * 0.3 + 0.2 * 0.85, epsilon = 1e-12);
        assert!((0.1..=0.99).contains(&q));
    }

    #[test]
    fn test_quality_fallback_for_short_series() {
        assert_eq!(forecast_quality(&WeatherSeries::from_samples(Vec::new())), 0.5);
        let single = series_with(|c| c.temperature_2m = some(vec![20.0]), 1);
        assert_eq!(forecast_quality(&single), 0.5);
    }

    #[test]
    fn test_analyze_empty_series_is_total() {
        let analysis = analyze(&WeatherSeries::from_samples(Vec::new()));
        assert!(analysis.current.is_none());
        assert_eq!(analysis.trends.temperature, 0.0);
        assert_eq!(analysis.trends.pressure, 0.0);
        assert!(!analysis.alerts.cloud_cover);
        assert!(!analysis.alerts.precipitation);
        assert_eq!(analysis.forecast_quality, 0.5);
    }

    #[test]
    fn test_analyze_snapshot_is_first_sample() {
        let s = series_with(
            |c| {
                c.temperature_2m = some(vec![17.0, 18.0, 19.0]);
                c.wind_speed_10m = some(vec![4.0, 5.0, 6.0]);
            },
            3,
        );
        let analysis = analyze(&s);
        let current = analysis.current.expect("Non-empty series has a snapshot");
        assert_eq!(current.temperature, 17.0);
        assert_eq!(current.wind_speed, Some(4.0));
    }
}
