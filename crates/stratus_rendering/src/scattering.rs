//! # Scattering Model
//!
//! Single-scattering light transport for the cloud medium.
//!
//! - Phase: two Henyey-Greenstein lobes, forward-dominant (silver lining)
//!   plus a weaker backward lobe.
//! - Extinction: density times the pre-scaled precipitation factor.
//! - Transmittance: Beer-Lambert.

use std::f32::consts::PI;

use glam::Vec3;
use stratus_core::ParameterSet;

/// Weight of the forward lobe; the backward lobe gets the rest.
pub const FORWARD_LOBE_WEIGHT: f32 = 0.7;

/// Henyey-Greenstein phase function.
///
/// `cos_theta` is the cosine between the view ray and the direction toward
/// the light; positive `g` scatters forward.
#[inline]
#[must_use]
pub fn henyey_greenstein(cos_theta: f32, g: f32) -> f32 {
    let g2 = g * g;
    let denom = (1.0 + g2 - 2.0 * g * cos_theta).max(1e-6);
    (1.0 - g2) / (4.0 * PI * denom * denom.sqrt())
}

/// Two-lobe phase: a forward lobe at `g_forward` and a backward lobe at
/// `-g_backward`.
#[inline]
#[must_use]
pub fn phase(cos_theta: f32, g_forward: f32, g_backward: f32) -> f32 {
    FORWARD_LOBE_WEIGHT * henyey_greenstein(cos_theta, g_forward)
        + (1.0 - FORWARD_LOBE_WEIGHT) * henyey_greenstein(cos_theta, -g_backward)
}

/// Extinction coefficient per metre.
#[inline]
#[must_use]
pub fn extinction(density: f32, precipitation: f32) -> f32 {
    density * precipitation
}

/// Transmittance through `optical_depth`.
#[inline]
#[must_use]
pub fn beer_lambert(optical_depth: f32) -> f32 {
    (-optical_depth).exp()
}

/// Cloud albedo at height fraction `h`: base colour at the bottom, top
/// colour at the top.
#[inline]
#[must_use]
pub fn cloud_color(params: &ParameterSet, h: f32) -> Vec3 {
    params.cloud_base_color.lerp(params.cloud_top_color, h.clamp(0.0, 1.0))
}

/// Radiance scattered toward the viewer at one sample.
#[inline]
#[must_use]
pub fn in_scattered_radiance(
    params: &ParameterSet,
    h: f32,
    light_transmittance: f32,
    phase: f32,
) -> Vec3 {
    let light = params.ambient_light_factor + params.sun_light_factor * light_transmittance * phase;
    cloud_color(params, h) * params.sun_color * light
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isotropic_hg() {
        let expected = 1.0 / (4.0 * PI);
        for cos_theta in [-1.0, -0.3, 0.0, 0.5, 1.0] {
            assert!((henyey_greenstein(cos_theta, 0.0) - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_hg_integrates_to_one() {
        // Integral over the sphere = 2pi * integral over cos_theta in [-1, 1].
        let n = 20_000;
        let mut sum = 0.0f64;
        for i in 0..n {
            let mu = -1.0 + (i as f32 + 0.5) * 2.0 / n as f32;
            sum += f64::from(henyey_greenstein(mu, 0.4)) * 2.0 / f64::from(n);
        }
        assert!((sum * 2.0 * std::f64::consts::PI - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_forward_dominates() {
        for g in [0.1, 0.179, 0.4, 0.8] {
            assert!(phase(1.0, g, g) > phase(-1.0, g, g));
        }
    }

    #[test]
    fn test_beer_lambert() {
        assert_eq!(beer_lambert(0.0), 1.0);
        assert!((beer_lambert(1.0) - (-1.0f32).exp()).abs() < 1e-7);
        assert_eq!(extinction(0.5, 0.01), 0.005);
    }

    #[test]
    fn test_color_gradient() {
        let params = ParameterSet::default();
        assert!((cloud_color(&params, 0.0) - params.cloud_base_color).length() < 1e-6);
        assert!((cloud_color(&params, 1.0) - params.cloud_top_color).length() < 1e-6);
        assert!((cloud_color(&params, 7.0) - params.cloud_top_color).length() < 1e-6);
    }

    #[test]
    fn test_ambient_only_in_shadow() {
        let params = ParameterSet::default();
        let radiance = in_scattered_radiance(&params, 1.0, 0.0, 0.5);
        assert!((radiance - Vec3::splat(params.ambient_light_factor)).length() < 1e-6);
    }
}
