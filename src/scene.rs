use glam::DVec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::camera::Camera;
use crate::color::{Color, color};
use crate::error::{ScanrayError, ScanrayResult};
use crate::hittable::{Sphere, World};
use crate::material::Material;
use crate::ray::Ray;

/// Background illumination for rays that escape the world.
#[derive(Clone, Copy, Debug)]
pub enum Sky {
    /// Vertical blend from `horizon` (down) to `zenith` (up).
    Gradient { horizon: Color, zenith: Color },
    Solid(Color),
}

impl Sky {
    pub fn sample(&self, ray: &Ray) -> Color {
        match *self {
            Sky::Gradient { horizon, zenith } => {
                let t = 0.5 * (ray.direction.normalize().y + 1.0);
                (1.0 - t) * horizon + t * zenith
            }
            Sky::Solid(background) => background,
        }
    }
}

/// A world plus the viewpoint it was authored for. The camera itself is
/// built per render because it depends on the frame's aspect ratio.
#[derive(Debug)]
pub struct Scene {
    pub world: World,
    pub sky: Sky,
    look_from: DVec3,
    look_at: DVec3,
    vertical_fov: f64,
    aperture: f64,
    focus_distance: f64,
}

impl Scene {
    pub fn camera(&self, aspect_ratio: f64) -> Camera {
        Camera::new(
            self.look_from,
            self.look_at,
            DVec3::Y,
            self.vertical_fov,
            aspect_ratio,
            self.aperture,
            self.focus_distance,
        )
    }

    pub fn names() -> &'static [&'static str] {
        &[
            "three-spheres",
            "two-spheres",
            "metal-test",
            "light-sample",
            "random",
        ]
    }

    /// Look up a built-in scene. `seed` only affects procedurally generated
    /// scenes.
    pub fn by_name(name: &str, seed: u64) -> ScanrayResult<Scene> {
        match name {
            "three-spheres" => Ok(Self::three_spheres()),
            "two-spheres" => Ok(Self::two_spheres()),
            "metal-test" => Ok(Self::metal_test()),
            "light-sample" => Ok(Self::light_sample()),
            "random" => Ok(Self::random(seed)),
            other => Err(ScanrayError::validation(format!(
                "unknown scene '{}', available: {}",
                other,
                Self::names().join(", ")
            ))),
        }
    }

    /// Ground plane sphere plus one lambertian, one glass, one metal sphere
    /// under a gradient sky.
    pub fn three_spheres() -> Scene {
        let mut world = World::new();
        world.push(Sphere::new(
            DVec3::new(0.0, -100.5, -1.0),
            100.0,
            Material::Lambertian {
                albedo: color(0.8, 0.8, 0.0),
            },
        ));
        world.push(Sphere::new(
            DVec3::new(0.0, 0.0, -1.0),
            0.5,
            Material::Lambertian {
                albedo: color(0.1, 0.2, 0.5),
            },
        ));
        world.push(Sphere::new(
            DVec3::new(-1.0, 0.0, -1.0),
            0.5,
            Material::Dielectric {
                refraction_index: 1.5,
            },
        ));
        world.push(Sphere::new(
            DVec3::new(1.0, 0.0, -1.0),
            0.5,
            Material::Metal {
                albedo: color(0.8, 0.6, 0.2),
                fuzz: 0.1,
            },
        ));

        Scene {
            world,
            sky: Sky::Gradient {
                horizon: color(1.0, 1.0, 1.0),
                zenith: color(0.5, 0.7, 1.0),
            },
            look_from: DVec3::new(-2.0, 2.0, 1.0),
            look_at: DVec3::new(0.0, 0.0, -1.0),
            vertical_fov: 20.0,
            aperture: 0.0,
            focus_distance: 10.0,
        }
    }

    /// Two touching lambertian globes, useful for checking the gradient sky
    /// and shadowing without any specular bounce.
    pub fn two_spheres() -> Scene {
        let mut world = World::new();
        world.push(Sphere::new(
            DVec3::new(0.0, -10.0, 0.0),
            10.0,
            Material::Lambertian {
                albedo: color(0.2, 0.3, 0.1),
            },
        ));
        world.push(Sphere::new(
            DVec3::new(0.0, 10.0, 0.0),
            10.0,
            Material::Lambertian {
                albedo: color(0.9, 0.9, 0.9),
            },
        ));

        Scene {
            world,
            sky: Sky::Gradient {
                horizon: color(1.0, 1.0, 1.0),
                zenith: color(0.5, 0.7, 1.0),
            },
            look_from: DVec3::new(13.0, 2.0, 3.0),
            look_at: DVec3::new(0.0, 0.0, 0.0),
            vertical_fov: 20.0,
            aperture: 0.0,
            focus_distance: 10.0,
        }
    }

    /// A row of metal spheres with increasing fuzz next to a matte one, for
    /// eyeballing reflection sharpness.
    pub fn metal_test() -> Scene {
        let mut world = World::new();
        world.push(Sphere::new(
            DVec3::new(0.0, -1000.0, 0.0),
            1000.0,
            Material::Lambertian {
                albedo: color(0.5, 0.5, 0.5),
            },
        ));
        for (i, fuzz) in [0.0, 0.2, 0.6].into_iter().enumerate() {
            world.push(Sphere::new(
                DVec3::new(-2.5 + 2.5 * i as f64, 1.0, 0.0),
                1.0,
                Material::Metal {
                    albedo: color(0.7, 0.6, 0.5),
                    fuzz,
                },
            ));
        }
        world.push(Sphere::new(
            DVec3::new(0.0, 1.0, 3.0),
            1.0,
            Material::Lambertian {
                albedo: color(0.8, 0.2, 0.2),
            },
        ));

        Scene {
            world,
            sky: Sky::Gradient {
                horizon: color(1.0, 1.0, 1.0),
                zenith: color(0.5, 0.7, 1.0),
            },
            look_from: DVec3::new(0.0, 5.0, -10.0),
            look_at: DVec3::new(0.0, 1.0, 0.0),
            vertical_fov: 30.0,
            aperture: 0.0,
            focus_distance: 10.0,
        }
    }

    /// Two lambertian spheres lit by a single rectangular-ish emitter sphere
    /// against a black background.
    pub fn light_sample() -> Scene {
        let mut world = World::new();
        world.push(Sphere::new(
            DVec3::new(0.0, -1000.0, 0.0),
            1000.0,
            Material::Lambertian {
                albedo: color(0.48, 0.83, 0.53),
            },
        ));
        world.push(Sphere::new(
            DVec3::new(0.0, 2.0, 0.0),
            2.0,
            Material::Lambertian {
                albedo: color(0.4, 0.2, 0.1),
            },
        ));
        world.push(Sphere::new(
            DVec3::new(0.0, 7.0, 0.0),
            1.5,
            Material::DiffuseLight {
                emit: color(4.0, 4.0, 4.0),
            },
        ));

        Scene {
            world,
            sky: Sky::Solid(color(0.0, 0.0, 0.0)),
            look_from: DVec3::new(26.0, 3.0, 6.0),
            look_at: DVec3::new(0.0, 2.0, 0.0),
            vertical_fov: 20.0,
            aperture: 0.0,
            focus_distance: 10.0,
        }
    }

    /// The classic randomized cover scene: a grid of small spheres with
    /// mixed materials around three large ones. Deterministic for a given
    /// `seed`.
    pub fn random(seed: u64) -> Scene {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut world = World::new();

        world.push(Sphere::new(
            DVec3::new(0.0, -1000.0, 0.0),
            1000.0,
            Material::Lambertian {
                albedo: color(0.5, 0.5, 0.5),
            },
        ));

        for a in -7..7 {
            for b in -7..7 {
                let center = DVec3::new(
                    a as f64 + 0.9 * rng.random::<f64>(),
                    0.2,
                    b as f64 + 0.9 * rng.random::<f64>(),
                );
                if (center - DVec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                    continue;
                }

                let choose: f64 = rng.random();
                let material = if choose < 0.8 {
                    Material::Lambertian {
                        albedo: random_color(&mut rng) * random_color(&mut rng),
                    }
                } else if choose < 0.95 {
                    Material::Metal {
                        albedo: random_color(&mut rng) * 0.5 + Color::splat(0.5),
                        fuzz: 0.5 * rng.random::<f64>(),
                    }
                } else {
                    Material::Dielectric {
                        refraction_index: 1.5,
                    }
                };
                world.push(Sphere::new(center, 0.2, material));
            }
        }

        world.push(Sphere::new(
            DVec3::new(0.0, 1.0, 0.0),
            1.0,
            Material::Dielectric {
                refraction_index: 1.5,
            },
        ));
        world.push(Sphere::new(
            DVec3::new(-4.0, 1.0, 0.0),
            1.0,
            Material::Lambertian {
                albedo: color(0.4, 0.2, 0.1),
            },
        ));
        world.push(Sphere::new(
            DVec3::new(4.0, 1.0, 0.0),
            1.0,
            Material::Metal {
                albedo: color(0.7, 0.6, 0.5),
                fuzz: 0.0,
            },
        ));

        Scene {
            world,
            sky: Sky::Gradient {
                horizon: color(1.0, 1.0, 1.0),
                zenith: color(0.5, 0.7, 1.0),
            },
            look_from: DVec3::new(13.0, 2.0, 3.0),
            look_at: DVec3::new(0.0, 0.0, 0.0),
            vertical_fov: 20.0,
            aperture: 0.1,
            focus_distance: 10.0,
        }
    }
}

fn random_color(rng: &mut impl Rng) -> Color {
    color(rng.random(), rng.random(), rng.random())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_scene_resolves() {
        for name in Scene::names() {
            let scene = Scene::by_name(name, 42).unwrap();
            assert!(!scene.world.is_empty());
        }
    }

    #[test]
    fn unknown_scene_is_a_validation_error() {
        let err = Scene::by_name("nope", 0).unwrap_err();
        assert!(err.to_string().contains("unknown scene"));
    }

    #[test]
    fn random_scene_is_deterministic_per_seed() {
        // Same seed, same number of survivors of the exclusion test.
        assert_eq!(Scene::random(9).world.len(), Scene::random(9).world.len());
    }
}
