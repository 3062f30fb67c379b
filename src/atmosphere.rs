//! Empirical atmospheric attenuation and irradiance decomposition.
//!
//! Everything here is a calibrated proxy rather than physics: cloud cover
//! and temperature stand in for cloud opacity and type, elevation bands
//! stand in for aerosol path length, and the diffuse split is a clearness
//! correlation. Coefficients are frozen — downstream consumers compare
//! outputs across sessions.

use crate::solar;
use std::f64::consts::PI;

const DEG: f64 = PI / 180.0;

/// Fraction of irradiance surviving cloud cover, in (0, 1].
///
/// Below 10% cover a 0.95 near-clear floor models residual scattering;
/// above 90% the 0.15 overcast floor applies. In between, opacity grows
/// superlinearly with cover and temperature nudges the estimate as a crude
/// stand-in for cloud altitude and type.
pub fn cloud_impact(cloud_cover: f64, temperature: f64) -> f64 {
    if cloud_cover < 10.0 {
        return 0.95;
    }
    if cloud_cover > 90.0 {
        return 0.15;
    }
    let opacity = (cloud_cover / 100.0).powf(1.3);
    let temp_factor = ((temperature + 5.0) / 45.0).clamp(0.8, 1.0);
    (1.0 - opacity * temp_factor * 0.85).max(0.1)
}

/// Aerosol transmission as a step function of solar elevation.
///
/// The breakpoints are frozen: `<0 → 0`, `<10 → 0.85`, `<20 → 0.90`,
/// `<30 → 0.93`, else `0.95`. Monotonic non-decreasing by construction.
pub fn aerosol_transmission(elevation: f64) -> f64 {
    if elevation < 0.0 {
        0.0
    } else if elevation < 10.0 {
        0.85
    } else if elevation < 20.0 {
        0.90
    } else if elevation < 30.0 {
        0.93
    } else {
        0.95
    }
}

/// Direct-normal and diffuse-horizontal components of a global value.
#[derive(Debug, Clone, Copy, Default)]
pub struct IrradianceSplit {
    pub direct_normal: f64,
    pub diffuse_horizontal: f64,
}

/// Split global irradiance into beam and diffuse parts.
///
/// Clearness is the ratio of the supplied (post-attenuation) GHI to the
/// clear-sky ceiling at the same elevation; the diffuse fraction follows a
/// three-band correlation in clearness and sin(elevation). Advisory output:
/// the forecast total never feeds from it.
pub fn decompose(ghi: f64, elevation: f64, _cloud_cover: f64) -> IrradianceSplit {
    if elevation <= 0.0 {
        return IrradianceSplit::default();
    }

    let ceiling = solar::clear_sky_ghi(elevation, 90.0 - elevation);
    let clearness = if ceiling > 0.0 {
        (ghi / ceiling).min(1.0)
    } else {
        0.0
    };

    let sin_elev = (elevation * DEG).sin();
    let raw_fraction = if clearness <= 0.3 {
        1.020 - 0.254 * clearness + 0.0123 * sin_elev
    } else if clearness <= 0.78 {
        1.400 - 1.749 * clearness + 0.177 * sin_elev
    } else {
        0.486 * clearness - 0.182 * sin_elev
    };
    let diffuse_fraction = raw_fraction.clamp(0.0, 1.0);

    let diffuse_horizontal = ghi * diffuse_fraction;
    let direct_normal = ((ghi - diffuse_horizontal) / sin_elev.max(0.01)).max(0.0);

    IrradianceSplit {
        direct_normal,
        diffuse_horizontal,
    }
}
