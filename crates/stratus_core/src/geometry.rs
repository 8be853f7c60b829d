//! # Cloud Layer Geometry
//!
//! The cloud layer is the shell between two concentric spheres around the
//! planet centre. Curvature matters: near the horizon a ray spends tens of
//! kilometres inside the shell, which a flat slab would get badly wrong.
//!
//! ```text
//!            outer  = planet_radius + max_height
//!        .-''''''''''''''''-.
//!      .'   inner = r + min   '.
//!     /    .-''''''''''''-.     \
//!    |   .'   ground = r   '.    |
//!    |  |        (c)         |   |
//! ```
//!
//! Intersections are solved in `f64`: at planet scale the squared radii are
//! ~1e9 and the `f32` discriminant loses whole metres.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A ray with a normalized direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// Ray origin (camera position).
    pub origin: Vec3,
    /// Unit-length direction.
    pub direction: Vec3,
}

impl Ray {
    /// Creates a ray, normalizing `direction`.
    ///
    /// A zero direction stays zero rather than becoming NaN.
    #[inline]
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point at distance `t` along the ray.
    #[inline]
    #[must_use]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Distance interval along a ray that lies inside the cloud layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarchInterval {
    /// Distance at which marching starts.
    pub entry: f32,
    /// Distance at which marching stops.
    pub exit: f32,
}

impl MarchInterval {
    /// Length of the interval.
    #[inline]
    #[must_use]
    pub fn length(&self) -> f32 {
        self.exit - self.entry
    }
}

/// Intersects a ray with a sphere.
///
/// Returns both roots `(t_near, t_far)` along the ray, which may be negative
/// (behind the origin). `None` when the ray's line misses the sphere.
#[must_use]
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<(f32, f32)> {
    let oc = (ray.origin - center).as_dvec3();
    let dir = ray.direction.as_dvec3();
    let radius = f64::from(radius);

    let b = oc.dot(dir);
    let c = oc.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 || !discriminant.is_finite() {
        return None;
    }
    let s = discriminant.sqrt();
    Some(((-b - s) as f32, (-b + s) as f32))
}

/// Two concentric spheres bounding the cloud layer.
///
/// Invariant for a usable layer: `planet_radius > 0` and
/// `min_height < max_height`. The core does not enforce it; degenerate layers
/// simply contain no cloud.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CloudLayerGeometry {
    /// Planet centre in world space.
    pub planet_center: Vec3,
    /// Planet (ground) radius.
    pub planet_radius: f32,
    /// Cloud layer bottom, above the ground.
    pub min_height: f32,
    /// Cloud layer top, above the ground.
    pub max_height: f32,
}

impl CloudLayerGeometry {
    /// Creates a layer for a planet whose north pole sits at the world origin.
    #[must_use]
    pub fn new(planet_radius: f32, min_height: f32, max_height: f32) -> Self {
        Self {
            planet_center: Vec3::new(0.0, -planet_radius, 0.0),
            planet_radius,
            min_height,
            max_height,
        }
    }

    /// Radius of the inner (bottom) sphere.
    #[inline]
    #[must_use]
    pub fn inner_radius(&self) -> f32 {
        self.planet_radius + self.min_height
    }

    /// Radius of the outer (top) sphere.
    #[inline]
    #[must_use]
    pub fn outer_radius(&self) -> f32 {
        self.planet_radius + self.max_height
    }

    /// Vertical extent of the layer.
    #[inline]
    #[must_use]
    pub fn thickness(&self) -> f32 {
        self.max_height - self.min_height
    }

    /// True when the layer cannot contain cloud (bad radius or height range).
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        let thickness = self.thickness();
        self.planet_radius.is_nan()
            || self.planet_radius <= 0.0
            || thickness.is_nan()
            || thickness <= 0.0
            || !self.planet_center.is_finite()
            || !self.inner_radius().is_finite()
            || !self.outer_radius().is_finite()
    }

    /// Normalized height of `position` within the layer.
    ///
    /// `0` on the inner sphere, `1` on the outer sphere; values outside
    /// `[0, 1]` lie outside the layer. A degenerate layer reports `-1`.
    #[must_use]
    pub fn height_fraction(&self, position: Vec3) -> f32 {
        if self.is_degenerate() {
            return -1.0;
        }
        let radius = position.distance(self.planet_center);
        (radius - self.inner_radius()) / self.thickness()
    }

    /// Computes where a ray should start and stop marching.
    ///
    /// - Origin under the layer: from the far inner-sphere hit to the far
    ///   outer-sphere hit. Rays that strike the ground first are occluded.
    /// - Origin inside the layer: from the origin to whichever sphere the ray
    ///   leaves through first.
    /// - Origin above the layer: from the near outer-sphere hit, or a miss if
    ///   the layer is not ahead of the ray.
    ///
    /// Returns `None` for misses, occluded rays, and empty intervals.
    #[must_use]
    pub fn march_interval(&self, ray: &Ray) -> Option<MarchInterval> {
        if self.is_degenerate() {
            return None;
        }

        let center = self.planet_center;
        let inner = self.inner_radius();
        let outer = self.outer_radius();
        let origin_radius = ray.origin.distance(center);

        let (entry, exit) = if origin_radius < inner {
            if origin_radius < self.planet_radius {
                return None;
            }
            if let Some((ground_near, _)) = ray_sphere(ray, center, self.planet_radius) {
                if ground_near > 0.0 {
                    return None;
                }
            }
            let (_, inner_far) = ray_sphere(ray, center, inner)?;
            let (_, outer_far) = ray_sphere(ray, center, outer)?;
            (inner_far.max(0.0), outer_far)
        } else if origin_radius <= outer {
            let exit = match ray_sphere(ray, center, inner) {
                Some((inner_near, _)) if inner_near > 0.0 => inner_near,
                _ => ray_sphere(ray, center, outer)?.1,
            };
            (0.0, exit)
        } else {
            let (outer_near, outer_far) = ray_sphere(ray, center, outer)?;
            if outer_near <= 0.0 {
                return None;
            }
            let exit = match ray_sphere(ray, center, inner) {
                Some((inner_near, _)) if inner_near > 0.0 => inner_near,
                _ => outer_far,
            };
            (outer_near, exit)
        };

        if entry.is_finite() && exit.is_finite() && exit > entry {
            Some(MarchInterval { entry, exit })
        } else {
            None
        }
    }
}

impl Default for CloudLayerGeometry {
    fn default() -> Self {
        Self::new(35_000.0, 1_500.0, 4_000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer() -> CloudLayerGeometry {
        CloudLayerGeometry::default()
    }

    #[test]
    fn test_radii() {
        let g = layer();
        assert_eq!(g.inner_radius(), 36_500.0);
        assert_eq!(g.outer_radius(), 39_000.0);
        assert_eq!(g.planet_center, Vec3::new(0.0, -35_000.0, 0.0));
    }

    #[test]
    fn test_height_fraction_at_pole() {
        let g = layer();
        assert!((g.height_fraction(Vec3::new(0.0, 1_500.0, 0.0))).abs() < 1e-3);
        assert!((g.height_fraction(Vec3::new(0.0, 4_000.0, 0.0)) - 1.0).abs() < 1e-3);
        assert!((g.height_fraction(Vec3::new(0.0, 2_750.0, 0.0)) - 0.5).abs() < 1e-3);
        assert!(g.height_fraction(Vec3::new(0.0, 100.0, 0.0)) < 0.0);
    }

    #[test]
    fn test_degenerate_layer_is_outside_everywhere() {
        let g = CloudLayerGeometry::new(35_000.0, 4_000.0, 1_500.0);
        assert!(g.is_degenerate());
        assert_eq!(g.height_fraction(Vec3::new(0.0, 2_000.0, 0.0)), -1.0);
        let up = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::Y);
        assert!(g.march_interval(&up).is_none());

        let flat = CloudLayerGeometry::new(0.0, 1_500.0, 4_000.0);
        assert!(flat.is_degenerate());
    }

    #[test]
    fn test_ray_sphere_roots() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z);
        let (near, far) = ray_sphere(&ray, Vec3::ZERO, 2.0).expect("hit");
        assert!((near - 8.0).abs() < 1e-4);
        assert!((far - 12.0).abs() < 1e-4);

        let miss = Ray::new(Vec3::new(0.0, 5.0, -10.0), Vec3::Z);
        assert!(ray_sphere(&miss, Vec3::ZERO, 2.0).is_none());
    }

    #[test]
    fn test_interval_from_below_looking_up() {
        let g = layer();
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::Y);
        let interval = g.march_interval(&ray).expect("should hit layer");
        assert!((interval.entry - 1_495.0).abs() < 0.5);
        assert!((interval.exit - 3_995.0).abs() < 0.5);
    }

    #[test]
    fn test_interval_from_below_is_occluded_by_ground() {
        let g = layer();
        let down = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.3, -1.0, 0.0));
        assert!(g.march_interval(&down).is_none());
    }

    #[test]
    fn test_interval_from_below_near_horizon_is_long() {
        let g = layer();
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(1.0, 0.01, 0.0));
        let interval = g.march_interval(&ray).expect("horizon ray reaches layer");
        // Far away and much longer than the vertical thickness.
        assert!(interval.entry > 5_000.0);
        assert!(interval.length() > g.thickness());
    }

    #[test]
    fn test_interval_inside_layer() {
        let g = layer();
        let up = Ray::new(Vec3::new(0.0, 2_000.0, 0.0), Vec3::Y);
        let interval = g.march_interval(&up).expect("inside");
        assert_eq!(interval.entry, 0.0);
        assert!((interval.exit - 2_000.0).abs() < 0.5);

        let down = Ray::new(Vec3::new(0.0, 2_000.0, 0.0), Vec3::NEG_Y);
        let interval = g.march_interval(&down).expect("inside");
        assert!((interval.exit - 500.0).abs() < 0.5);
    }

    #[test]
    fn test_interval_above_layer() {
        let g = layer();
        let down = Ray::new(Vec3::new(0.0, 6_000.0, 0.0), Vec3::NEG_Y);
        let interval = g.march_interval(&down).expect("looking down into layer");
        assert!((interval.entry - 2_000.0).abs() < 0.5);
        assert!((interval.exit - 4_500.0).abs() < 0.5);

        let away = Ray::new(Vec3::new(0.0, 6_000.0, 0.0), Vec3::Y);
        assert!(g.march_interval(&away).is_none());
    }
}
