//! Weather series data model.
//!
//! Bridges the upstream provider's parallel hourly channel arrays into an
//! owned, timestamp-ordered sequence of [`WeatherSample`]. Required channels
//! (temperature, cloud cover, shortwave radiation) are default-filled here,
//! at the construction boundary, so every downstream function stays total.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::tuning::{DEFAULT_CLOUD_COVER_PCT, DEFAULT_SHORTWAVE_W_M2, DEFAULT_TEMPERATURE_C};

/// One hour of weather at the forecast point.
///
/// Units follow the upstream contract: °C, %, W/m², m/s, degrees, hPa, mm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub cloud_cover: f64,
    pub shortwave_radiation: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wind_direction: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precipitation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uv_index: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
}

/// Hourly channel arrays as delivered by the upstream weather fetch.
///
/// Every present channel must be index-aligned with `time`; a length
/// mismatch is rejected at construction rather than zipped short.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HourlyChannels {
    pub time: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_2m: Option<Vec<Option<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_cover: Option<Vec<Option<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortwave_radiation: Option<Vec<Option<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_humidity_2m: Option<Vec<Option<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed_10m: Option<Vec<Option<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_direction_10m: Option<Vec<Option<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface_pressure: Option<Vec<Option<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation: Option<Vec<Option<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uv_index: Option<Vec<Option<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Vec<Option<f64>>>,
}

/// Errors raised while turning channel arrays into a series.
#[derive(Debug)]
pub enum WeatherError {
    /// A channel array's length disagrees with the `time` array.
    ChannelLength {
        channel: &'static str,
        expected: usize,
        actual: usize,
    },
    /// A timestamp failed to parse as ISO-8601.
    BadTimestamp { index: usize, value: String },
}

impl fmt::Display for WeatherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChannelLength {
                channel,
                expected,
                actual,
            } => write!(
                f,
                "Channel '{}' has {} entries but 'time' has {}",
                channel, actual, expected
            ),
            Self::BadTimestamp { index, value } => {
                write!(f, "Invalid timestamp at index {}: '{}'", index, value)
            }
        }
    }
}

impl std::error::Error for WeatherError {}

/// A timestamp-ascending sequence of hourly samples.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WeatherSeries {
    samples: Vec<WeatherSample>,
}

impl WeatherSeries {
    /// Build a series from upstream channel arrays.
    ///
    /// Validates index alignment, parses timestamps, default-fills the
    /// required channels, and sorts ascending by timestamp.
    pub fn from_hourly(hourly: &HourlyChannels) -> Result<Self, WeatherError> {
        let n = hourly.time.len();

        check_len("temperature_2m", n, &hourly.temperature_2m)?;
        check_len("cloud_cover", n, &hourly.cloud_cover)?;
        check_len("shortwave_radiation", n, &hourly.shortwave_radiation)?;
        check_len("relative_humidity_2m", n, &hourly.relative_humidity_2m)?;
        check_len("wind_speed_10m", n, &hourly.wind_speed_10m)?;
        check_len("wind_direction_10m", n, &hourly.wind_direction_10m)?;
        check_len("surface_pressure", n, &hourly.surface_pressure)?;
        check_len("precipitation", n, &hourly.precipitation)?;
        check_len("uv_index", n, &hourly.uv_index)?;
        check_len("visibility", n, &hourly.visibility)?;

        let mut samples = Vec::with_capacity(n);
        for (i, raw) in hourly.time.iter().enumerate() {
            let time = parse_timestamp(raw).ok_or_else(|| WeatherError::BadTimestamp {
                index: i,
                value: raw.clone(),
            })?;

            samples.push(WeatherSample {
                time,
                temperature: channel_at(&hourly.temperature_2m, i)
                    .unwrap_or(DEFAULT_TEMPERATURE_C),
                cloud_cover: channel_at(&hourly.cloud_cover, i).unwrap_or(DEFAULT_CLOUD_COVER_PCT),
                shortwave_radiation: channel_at(&hourly.shortwave_radiation, i)
                    .unwrap_or(DEFAULT_SHORTWAVE_W_M2),
                humidity: channel_at(&hourly.relative_humidity_2m, i),
                wind_speed: channel_at(&hourly.wind_speed_10m, i),
                wind_direction: channel_at(&hourly.wind_direction_10m, i),
                pressure: channel_at(&hourly.surface_pressure, i),
                precipitation: channel_at(&hourly.precipitation, i),
                uv_index: channel_at(&hourly.uv_index, i),
                visibility: channel_at(&hourly.visibility, i),
            });
        }

        samples.sort_by_key(|s| s.time);
        Ok(Self { samples })
    }

    /// Build directly from owned samples (sorted ascending here as well).
    pub fn from_samples(mut samples: Vec<WeatherSample>) -> Self {
        samples.sort_by_key(|s| s.time);
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[WeatherSample] {
        &self.samples
    }

    pub fn get(&self, index: usize) -> Option<&WeatherSample> {
        self.samples.get(index)
    }

    /// Explicit join keyed on timestamp equality.
    ///
    /// Series fetched independently must never be matched positionally;
    /// this is the supported way to line one up against another.
    pub fn sample_at(&self, time: DateTime<Utc>) -> Option<&WeatherSample> {
        self.samples
            .binary_search_by_key(&time, |s| s.time)
            .ok()
            .map(|i| &self.samples[i])
    }
}

/// The analyzable weather channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WeatherChannel {
    Temperature,
    CloudCover,
    WindSpeed,
    Pressure,
    Humidity,
    Precipitation,
}

impl WeatherChannel {
    /// Channel value for one sample. Required channels always yield a value.
    pub fn value(&self, sample: &WeatherSample) -> Option<f64> {
        match self {
            Self::Temperature => Some(sample.temperature),
            Self::CloudCover => Some(sample.cloud_cover),
            Self::WindSpeed => sample.wind_speed,
            Self::Pressure => sample.pressure,
            Self::Humidity => sample.humidity,
            Self::Precipitation => sample.precipitation,
        }
    }
}

impl fmt::Display for WeatherChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temperature => write!(f, "temperature"),
            Self::CloudCover => write!(f, "cloud cover"),
            Self::WindSpeed => write!(f, "wind speed"),
            Self::Pressure => write!(f, "pressure"),
            Self::Humidity => write!(f, "humidity"),
            Self::Precipitation => write!(f, "precipitation"),
        }
    }
}

// ─── Parsing helpers ────────────────────────────────────────────

/// Parse an ISO-8601 timestamp, accepting both zone-suffixed strings and
/// the provider's naive minute-precision form ("2024-06-21T16:00"), which
/// is taken as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    None
}

fn check_len(
    channel: &'static str,
    expected: usize,
    values: &Option<Vec<Option<f64>>>,
) -> Result<(), WeatherError> {
    match values {
        Some(v) if v.len() != expected => Err(WeatherError::ChannelLength {
            channel,
            expected,
            actual: v.len(),
        }),
        _ => Ok(()),
    }
}

fn channel_at(values: &Option<Vec<Option<f64>>>, index: usize) -> Option<f64> {
    values.as_ref().and_then(|v| v.get(index).copied().flatten())
}
