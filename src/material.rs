use glam::DVec3;
use rand::Rng;

use crate::color::{BLACK, Color};
use crate::hittable::HitRecord;
use crate::ray::Ray;

/// Result of scattering a ray off a surface.
pub struct Scatter {
    pub attenuation: Color,
    pub ray: Ray,
}

#[derive(Clone, Copy, Debug)]
pub enum Material {
    Lambertian { albedo: Color },
    Metal { albedo: Color, fuzz: f64 },
    Dielectric { refraction_index: f64 },
    DiffuseLight { emit: Color },
}

impl Material {
    /// Light emitted by the surface itself. Black for everything but lights.
    pub fn emitted(&self) -> Color {
        match self {
            Material::DiffuseLight { emit } => *emit,
            _ => BLACK,
        }
    }

    /// Scatter `ray` at `hit`, or `None` if the ray is absorbed.
    pub fn scatter(&self, ray: &Ray, hit: &HitRecord, rng: &mut impl Rng) -> Option<Scatter> {
        match *self {
            Material::Lambertian { albedo } => {
                let mut direction = hit.normal + random_unit_vector(rng);
                if near_zero(direction) {
                    direction = hit.normal;
                }
                Some(Scatter {
                    attenuation: albedo,
                    ray: Ray::new(hit.point, direction),
                })
            }
            Material::Metal { albedo, fuzz } => {
                let reflected = reflect(ray.direction.normalize(), hit.normal);
                let direction = reflected + fuzz * random_unit_vector(rng);
                (direction.dot(hit.normal) > 0.0).then_some(Scatter {
                    attenuation: albedo,
                    ray: Ray::new(hit.point, direction),
                })
            }
            Material::Dielectric { refraction_index } => {
                let ratio = if hit.front_face {
                    1.0 / refraction_index
                } else {
                    refraction_index
                };
                let unit = ray.direction.normalize();
                let cos_theta = (-unit).dot(hit.normal).min(1.0);
                let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

                let cannot_refract = ratio * sin_theta > 1.0;
                let direction =
                    if cannot_refract || reflectance(cos_theta, ratio) > rng.random::<f64>() {
                        reflect(unit, hit.normal)
                    } else {
                        refract(unit, hit.normal, ratio)
                    };
                Some(Scatter {
                    attenuation: Color::ONE,
                    ray: Ray::new(hit.point, direction),
                })
            }
            Material::DiffuseLight { .. } => None,
        }
    }
}

fn near_zero(v: DVec3) -> bool {
    const EPS: f64 = 1e-8;
    v.x.abs() < EPS && v.y.abs() < EPS && v.z.abs() < EPS
}

fn reflect(v: DVec3, n: DVec3) -> DVec3 {
    v - 2.0 * v.dot(n) * n
}

fn refract(unit: DVec3, n: DVec3, etai_over_etat: f64) -> DVec3 {
    let cos_theta = (-unit).dot(n).min(1.0);
    let perp = etai_over_etat * (unit + cos_theta * n);
    let parallel = -(1.0 - perp.length_squared()).abs().sqrt() * n;
    perp + parallel
}

/// Schlick approximation for reflectance at a dielectric boundary.
fn reflectance(cosine: f64, refraction_index: f64) -> f64 {
    let r0 = ((1.0 - refraction_index) / (1.0 + refraction_index)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

fn random_unit_vector(rng: &mut impl Rng) -> DVec3 {
    loop {
        let p = DVec3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );
        let len_sq = p.length_squared();
        if len_sq > 1e-160 && len_sq < 1.0 {
            return p / len_sq.sqrt();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn head_on_hit() -> HitRecord {
        HitRecord {
            point: DVec3::ZERO,
            normal: DVec3::Y,
            t: 1.0,
            front_face: true,
            material: Material::Lambertian { albedo: Color::ONE },
        }
    }

    #[test]
    fn light_emits_and_never_scatters() {
        let light = Material::DiffuseLight {
            emit: Color::new(4.0, 4.0, 4.0),
        };
        let mut rng = SmallRng::seed_from_u64(1);
        let ray = Ray::new(DVec3::ZERO, -DVec3::Y);
        assert!(light.scatter(&ray, &head_on_hit(), &mut rng).is_none());
        assert_eq!(light.emitted(), Color::new(4.0, 4.0, 4.0));
    }

    #[test]
    fn metal_reflects_above_surface() {
        let metal = Material::Metal {
            albedo: Color::ONE,
            fuzz: 0.0,
        };
        let mut rng = SmallRng::seed_from_u64(1);
        let ray = Ray::new(DVec3::new(0.0, 1.0, 0.0), DVec3::new(1.0, -1.0, 0.0));
        let scatter = metal.scatter(&ray, &head_on_hit(), &mut rng).unwrap();
        assert!(scatter.ray.direction.y > 0.0);
    }
}
