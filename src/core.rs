use crate::error::{ScanrayError, ScanrayResult};

/// Immutable per-render frame parameters, shared read-only by every worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: u32,
    /// Maximum number of child rays a shader may spawn per camera ray.
    pub child_ray_budget: u32,
}

impl Frame {
    pub fn new(
        width: u32,
        height: u32,
        samples_per_pixel: u32,
        child_ray_budget: u32,
    ) -> ScanrayResult<Self> {
        if width == 0 || height == 0 {
            return Err(ScanrayError::validation(
                "frame width and height must be >= 1",
            ));
        }
        if samples_per_pixel == 0 {
            return Err(ScanrayError::validation("samples per pixel must be >= 1"));
        }
        Ok(Self {
            width,
            height,
            samples_per_pixel,
            child_ray_budget,
        })
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Mix a render seed and pixel coordinates into a per-pixel RNG seed.
///
/// Depends only on `(seed, x, y)`, never on scheduling, so the same render
/// produces identical pixels under any strategy, worker count, or thread
/// interleaving.
pub fn pixel_seed(seed: u64, x: u32, y: u32) -> u64 {
    mix64(seed ^ mix64(((y as u64) << 32) | x as u64))
}
