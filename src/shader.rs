use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::color::{BLACK, Color};
use crate::core::{Frame, pixel_seed};
use crate::hittable::RAY_EPSILON;
use crate::ray::Ray;
use crate::scene::Scene;

/// A pure per-pixel shading function.
///
/// Implementations must be safe to call concurrently from any number of
/// worker threads; the only shared state they may touch is read-only. The
/// returned color is the raw sum over `frame.samples_per_pixel` samples —
/// averaging and gamma happen at the sink.
///
/// The scheduler consumes shading exclusively through this trait and makes
/// no assumption about per-pixel cost.
pub trait PixelShader: Sync {
    fn shade(&self, x: u32, y: u32, frame: &Frame) -> Color;
}

/// Recursive path tracer over a [`Scene`], bounded by
/// `frame.child_ray_budget`.
pub struct PathTracer<'a> {
    scene: &'a Scene,
    seed: u64,
}

impl<'a> PathTracer<'a> {
    pub fn new(scene: &'a Scene, seed: u64) -> Self {
        Self { scene, seed }
    }

    fn ray_color(&self, ray: &Ray, child_rays: u32, rng: &mut SmallRng) -> Color {
        if child_rays == 0 {
            return BLACK;
        }

        let Some(hit) = self.scene.world.hit(ray, RAY_EPSILON, f64::INFINITY) else {
            return self.scene.sky.sample(ray);
        };

        let emitted = hit.material.emitted();
        match hit.material.scatter(ray, &hit, rng) {
            Some(scatter) => {
                emitted + scatter.attenuation * self.ray_color(&scatter.ray, child_rays - 1, rng)
            }
            None => emitted,
        }
    }
}

impl PixelShader for PathTracer<'_> {
    fn shade(&self, x: u32, y: u32, frame: &Frame) -> Color {
        // One RNG per pixel, seeded from coordinates only, so the result is
        // identical whichever worker shades it.
        let mut rng = SmallRng::seed_from_u64(pixel_seed(self.seed, x, y));
        let camera = self.scene.camera(frame.aspect_ratio());

        let mut acc = BLACK;
        for _ in 0..frame.samples_per_pixel {
            let u = (x as f64 + rng.random::<f64>()) / (frame.width - 1).max(1) as f64;
            let v = (y as f64 + rng.random::<f64>()) / (frame.height - 1).max(1) as f64;
            let ray = camera.generate_ray(u, v, &mut rng);
            acc += self.ray_color(&ray, frame.child_ray_budget, &mut rng);
        }
        acc
    }
}
