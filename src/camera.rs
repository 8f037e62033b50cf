use glam::DVec3;
use rand::Rng;

use crate::ray::Ray;

/// Positionable camera with optional defocus blur.
///
/// `u`/`v` passed to [`Camera::generate_ray`] are normalized viewport
/// coordinates in [0, 1], `v` increasing upward.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    origin: DVec3,
    lower_left: DVec3,
    horizontal: DVec3,
    vertical: DVec3,
    u: DVec3,
    v: DVec3,
    lens_radius: f64,
}

impl Camera {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        look_from: DVec3,
        look_at: DVec3,
        up: DVec3,
        vertical_fov_degrees: f64,
        aspect_ratio: f64,
        aperture: f64,
        focus_distance: f64,
    ) -> Self {
        let theta = vertical_fov_degrees.to_radians();
        let viewport_height = 2.0 * (theta / 2.0).tan();
        let viewport_width = aspect_ratio * viewport_height;

        let w = (look_from - look_at).normalize();
        let u = up.cross(w).normalize();
        let v = w.cross(u);

        let horizontal = focus_distance * viewport_width * u;
        let vertical = focus_distance * viewport_height * v;
        let lower_left = look_from - horizontal / 2.0 - vertical / 2.0 - focus_distance * w;

        Self {
            origin: look_from,
            lower_left,
            horizontal,
            vertical,
            u,
            v,
            lens_radius: aperture / 2.0,
        }
    }

    pub fn generate_ray(&self, s: f64, t: f64, rng: &mut impl Rng) -> Ray {
        let offset = if self.lens_radius > 0.0 {
            let rd = self.lens_radius * random_in_unit_disk(rng);
            self.u * rd.x + self.v * rd.y
        } else {
            DVec3::ZERO
        };
        Ray::new(
            self.origin + offset,
            self.lower_left + s * self.horizontal + t * self.vertical - self.origin - offset,
        )
    }
}

fn random_in_unit_disk(rng: &mut impl Rng) -> DVec3 {
    loop {
        let p = DVec3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            0.0,
        );
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}
