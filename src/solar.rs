//! Solar geometry and clear-sky irradiance.
//!
//! Position comes from Spencer's fractional-year Fourier series, with solar
//! time taken straight from the longitude offset (no timezone or DST
//! lookup). Accuracy is on the order of a quarter degree, which is plenty
//! for irradiance work driven by hourly weather data.

use chrono::{DateTime, Datelike, Timelike, Utc};
use std::f64::consts::PI;

const DEG: f64 = PI / 180.0;

/// Sun position at a specific instant, all in degrees.
#[derive(Debug, Clone, Copy)]
pub struct SolarPosition {
    /// Height above the horizon; negative at night.
    pub elevation: f64,
    /// Angle from vertical, `90 − elevation`.
    pub zenith: f64,
    /// Compass direction, 0° = north, clockwise; 0 when the sun is down.
    pub azimuth: f64,
}

/// Compute the sun's position for a UTC instant at the given coordinates.
///
/// Total: always returns a finite triple. Night is reported as a negative
/// elevation, never as an error.
pub fn solar_position(instant: DateTime<Utc>, lat: f64, lon: f64) -> SolarPosition {
    let gamma = fractional_year(instant);
    let decl = declination(gamma);

    let utc_minutes = instant.hour() as f64 * 60.0
        + instant.minute() as f64
        + instant.second() as f64 / 60.0;
    // Longitude stands in for the timezone: 4 minutes per degree.
    let solar_minutes = utc_minutes + equation_of_time(gamma) + lon * 4.0;
    let hour_angle = (solar_minutes / 60.0 - 12.0) * 15.0 * DEG;

    let lat_r = lat * DEG;
    let sin_elev =
        (lat_r.sin() * decl.sin() + lat_r.cos() * decl.cos() * hour_angle.cos()).clamp(-1.0, 1.0);
    let elev_r = sin_elev.asin();
    let elevation = elev_r / DEG;

    let azimuth = if elevation <= 0.0 {
        0.0
    } else {
        let denom = elev_r.cos() * lat_r.cos();
        let az = if denom.abs() > 1e-9 {
            let cos_az = (decl.sin() - sin_elev * lat_r.sin()) / denom;
            cos_az.clamp(-1.0, 1.0).acos() / DEG
        } else {
            // Sun effectively at the zenith or observer at a pole
            if decl >= lat_r { 180.0 } else { 0.0 }
        };
        if hour_angle.sin() > 0.0 { 360.0 - az } else { az }
    };

    SolarPosition {
        elevation,
        zenith: 90.0 - elevation,
        azimuth,
    }
}

/// Theoretical cloud-free global horizontal irradiance (W/m²).
///
/// Zero whenever the sun is at or below the horizon. The airmass term is
/// the Kasten-Young approximation and is not meant to be meaningful past
/// a zenith of 96°.
pub fn clear_sky_ghi(elevation: f64, zenith: f64) -> f64 {
    if elevation <= 0.0 {
        return 0.0;
    }
    let zenith_r = zenith * DEG;
    let airmass = 1.0 / (zenith_r.cos() + 0.50572 * (96.07995 - zenith).powf(-1.6364));
    let ghi = 910.6 * (0.6797 + 0.00639 * airmass).exp() * zenith_r.cos().max(0.0);
    ghi.max(0.0)
}

// ─── Spencer series ─────────────────────────────────────────────

/// Fractional year angle in radians, day 1 = January 1.
fn fractional_year(instant: DateTime<Utc>) -> f64 {
    let day_of_year = instant.ordinal() as f64;
    2.0 * PI * (day_of_year - 1.0) / 365.0
}

/// Solar declination in radians (7-term Spencer expansion).
fn declination(gamma: f64) -> f64 {
    0.006918 - 0.399912 * gamma.cos() + 0.070257 * gamma.sin()
        - 0.006758 * (2.0 * gamma).cos()
        + 0.000907 * (2.0 * gamma).sin()
        - 0.00205 * (3.0 * gamma).cos()
        + 0.00029 * (3.0 * gamma).sin()
}

/// Equation of time in minutes (4-term expansion).
fn equation_of_time(gamma: f64) -> f64 {
    229.18
        * (0.017645 * gamma.cos()
            - 0.033827 * gamma.sin()
            - 0.00969 * (2.0 * gamma).cos()
            - 0.00569 * (2.0 * gamma).sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_summer_solstice_new_jersey_high_sun() {
        // ~1h before local solar noon at 40°N on the June solstice
        let pos = solar_position(at(2024, 6, 21, 16, 0), 40.0, -74.0);
        assert!(
            pos.elevation > 60.0,
            "Solstice afternoon elevation should exceed 60°, got {:.1}",
            pos.elevation
        );
        assert!((pos.elevation + pos.zenith - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_night_is_negative_elevation_not_error() {
        // 06:00 UTC at 74°W is the small hours of local night
        let pos = solar_position(at(2024, 6, 21, 6, 0), 40.0, -74.0);
        assert!(pos.elevation < 0.0, "Expected night, got {:.1}°", pos.elevation);
        assert_eq!(pos.azimuth, 0.0, "Azimuth is pinned to 0 while the sun is down");
        assert!(pos.elevation.is_finite() && pos.zenith.is_finite());
    }

    #[test]
    fn test_equinox_equator_near_zenith() {
        let pos = solar_position(at(2024, 3, 20, 12, 0), 0.0, 0.0);
        assert!(
            pos.elevation > 85.0,
            "Equinox noon at the equator should be near-zenith, got {:.1}°",
            pos.elevation
        );
    }

    #[test]
    fn test_azimuth_reflects_across_solar_noon() {
        // Solar noon at 74°W falls near 16:56 UTC on this date
        let morning = solar_position(at(2024, 6, 21, 13, 0), 40.0, -74.0);
        let evening = solar_position(at(2024, 6, 21, 21, 0), 40.0, -74.0);
        assert!(
            morning.azimuth < 180.0,
            "Morning sun should sit east of south, got {:.1}°",
            morning.azimuth
        );
        assert!(
            evening.azimuth > 180.0,
            "Evening sun should sit west of south, got {:.1}°",
            evening.azimuth
        );
        assert!((0.0..360.0).contains(&morning.azimuth));
        assert!((0.0..360.0).contains(&evening.azimuth));
    }

    #[test]
    fn test_polar_night_stays_dark() {
        for hour in [0, 6, 12, 18] {
            let pos = solar_position(at(2024, 12, 21, hour, 0), 78.2, 15.6);
            assert!(
                pos.elevation < 0.0,
                "Svalbard on the December solstice must stay dark, got {:.1}° at {:02}:00",
                pos.elevation,
                hour
            );
        }
    }

    #[test]
    fn test_clear_sky_zero_at_and_below_horizon() {
        assert_eq!(clear_sky_ghi(0.0, 90.0), 0.0);
        assert_eq!(clear_sky_ghi(-5.0, 95.0), 0.0);
    }

    #[test]
    fn test_clear_sky_positive_and_finite_daytime() {
        let low = clear_sky_ghi(10.0, 80.0);
        let high = clear_sky_ghi(70.0, 20.0);
        assert!(low > 0.0 && low.is_finite());
        assert!(high > low, "Higher sun should mean more clear-sky GHI");
        assert!(high.is_finite());
    }
}
