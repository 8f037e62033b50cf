use glam::DVec3;

use crate::material::Material;
use crate::ray::Ray;

/// Offset below which self-intersection with the originating surface is
/// ignored.
pub const RAY_EPSILON: f64 = 0.001;

#[derive(Clone, Copy)]
pub struct HitRecord {
    pub point: DVec3,
    pub normal: DVec3,
    pub t: f64,
    pub front_face: bool,
    pub material: Material,
}

#[derive(Clone, Copy, Debug)]
pub struct Sphere {
    pub center: DVec3,
    pub radius: f64,
    pub material: Material,
}

impl Sphere {
    pub fn new(center: DVec3, radius: f64, material: Material) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }

    fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord> {
        let oc = ray.origin - self.center;
        let a = ray.direction.length_squared();
        let half_b = oc.dot(ray.direction);
        let c = oc.length_squared() - self.radius * self.radius;
        let discriminant = half_b * half_b - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrt_d = discriminant.sqrt();
        let mut root = (-half_b - sqrt_d) / a;
        if root < t_min || root > t_max {
            root = (-half_b + sqrt_d) / a;
            if root < t_min || root > t_max {
                return None;
            }
        }

        let point = ray.at(root);
        let outward = (point - self.center) / self.radius;
        let front_face = ray.direction.dot(outward) < 0.0;
        Some(HitRecord {
            point,
            normal: if front_face { outward } else { -outward },
            t: root,
            front_face,
            material: self.material,
        })
    }
}

/// Everything a ray can hit. Read-only during a render, shared by all
/// workers.
#[derive(Clone, Debug, Default)]
pub struct World {
    spheres: Vec<Sphere>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sphere: Sphere) {
        self.spheres.push(sphere);
    }

    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }

    /// Closest hit along `ray` in `(t_min, t_max)`, if any.
    pub fn hit(&self, ray: &Ray, t_min: f64, t_max: f64) -> Option<HitRecord> {
        let mut closest = t_max;
        let mut best = None;
        for sphere in &self.spheres {
            if let Some(hit) = sphere.hit(ray, t_min, closest) {
                closest = hit.t;
                best = Some(hit);
            }
        }
        best
    }
}
