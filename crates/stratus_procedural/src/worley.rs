//! # Tileable Worley Noise
//!
//! One jittered feature point per grid cell. A sample is the distance to the
//! nearest feature point among the 27 cells around it, with cell indices
//! wrapping so the field tiles across the unit cube.
//!
//! Output is inverted (`1 - d`): bright at feature points, dark at cell
//! borders. That reads as billowy cloud cells when used as an eroder.

use glam::Vec3;
use rand::Rng;
use stratus_core::{CloudError, CloudResult};

use crate::seed::NoiseSeed;

/// Jittered feature-point grid at a fixed cell frequency.
#[derive(Clone, Debug)]
pub struct WorleyGrid {
    /// Cells per unit-cube edge.
    frequency: u32,
    /// Cell-local feature point offsets in `[0, 1)^3`, x fastest.
    points: Vec<Vec3>,
}

impl WorleyGrid {
    /// Scatters one feature point per cell from `seed`.
    ///
    /// A frequency of zero is treated as one.
    ///
    /// # Errors
    ///
    /// Returns `VolumeAllocation` if the `frequency³` point table overflows
    /// or cannot be allocated.
    pub fn new(seed: NoiseSeed, frequency: u32) -> CloudResult<Self> {
        let frequency = frequency.max(1);
        let edge = frequency as usize;
        let overflow = CloudError::VolumeAllocation {
            resolution: edge,
            texels: usize::MAX,
        };
        let cells = edge.checked_pow(3).ok_or(overflow)?;

        let mut points = Vec::new();
        points
            .try_reserve_exact(cells)
            .map_err(|_| CloudError::VolumeAllocation {
                resolution: edge,
                texels: cells,
            })?;
        let mut rng = seed.rng();
        points.extend(
            (0..cells).map(|_| Vec3::new(rng.gen::<f32>(), rng.gen::<f32>(), rng.gen::<f32>())),
        );
        Ok(Self { frequency, points })
    }

    /// Cells per unit-cube edge.
    #[inline]
    #[must_use]
    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    #[inline]
    fn point(&self, x: i64, y: i64, z: i64) -> Vec3 {
        let f = i64::from(self.frequency);
        let index = x.rem_euclid(f) + f * (y.rem_euclid(f) + f * z.rem_euclid(f));
        self.points[index as usize]
    }

    /// Inverted normalized distance to the nearest feature point, in `[0, 1]`.
    ///
    /// `p` is in unit-cube coordinates; any point is wrapped into the tile.
    #[must_use]
    pub fn sample(&self, p: Vec3) -> f32 {
        let frequency = self.frequency as f32;
        let local = (p - p.floor()) * frequency;
        let cell = local.floor();
        let (cx, cy, cz) = (cell.x as i64, cell.y as i64, cell.z as i64);

        let mut nearest = f32::MAX;
        for dz in -1..=1 {
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let (x, y, z) = (cx + dx, cy + dy, cz + dz);
                    let feature = Vec3::new(x as f32, y as f32, z as f32) + self.point(x, y, z);
                    nearest = nearest.min(local.distance_squared(feature));
                }
            }
        }

        // Nearest point is never further than one cell diagonal.
        let distance = nearest.sqrt() / 3.0_f32.sqrt();
        1.0 - distance.clamp(0.0, 1.0)
    }
}
