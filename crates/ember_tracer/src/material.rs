//! Surface materials.
//!
//! Materials are a closed set dispatched by `match`. They are stored in the
//! scene's material arena and referenced from hit records by [`MaterialId`].
//!
//! [`MaterialId`]: crate::MaterialId

use std::sync::Arc;

use ember_core::random::{gen_f64, random_in_unit_sphere, random_unit_vector};
use ember_core::Texture;
use ember_math::{near_zero, reflect, refract, Color, Ray};
use rand::RngCore;

use crate::hittable::HitRecord;

/// A scattered ray and the color it is filtered by.
#[derive(Debug, Clone, Copy)]
pub struct ScatterResult {
    pub attenuation: Color,
    pub scattered: Ray,
}

/// How light interacts with a surface.
#[derive(Debug, Clone)]
pub enum Material {
    /// Ideal diffuse reflector.
    Lambertian { albedo: Arc<Texture> },
    /// Specular reflector. `fuzz` is the roughness in `[0, 1]`, 0 being a
    /// perfect mirror.
    Mirror { albedo: Arc<Texture>, fuzz: f64 },
    /// Clear refractive material such as glass or water.
    Dielectric { color: Color, ior: f64 },
    /// Emitter that absorbs everything it is hit by.
    AreaLight { emit: Color },
}

impl Material {
    pub fn lambertian(albedo: Texture) -> Self {
        Material::Lambertian {
            albedo: Arc::new(albedo),
        }
    }

    /// Roughness is clamped to `[0, 1]`.
    pub fn mirror(albedo: Texture, fuzz: f64) -> Self {
        Material::Mirror {
            albedo: Arc::new(albedo),
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    /// - `ior`: index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn dielectric(color: Color, ior: f64) -> Self {
        Material::Dielectric { color, ior }
    }

    pub fn area_light(emit: Color) -> Self {
        Material::AreaLight { emit }
    }

    /// Scatter an incoming ray.
    ///
    /// Returns `None` if the ray is absorbed.
    pub fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        match self {
            Material::Lambertian { albedo } => {
                let mut direction = rec.normal + random_unit_vector(rng);

                // Catch degenerate scatter direction
                if near_zero(direction) {
                    direction = rec.normal;
                }

                Some(ScatterResult {
                    attenuation: albedo.value(rec.u, rec.v, rec.point),
                    scattered: Ray::new(rec.point, direction, ray_in.time),
                })
            }

            Material::Mirror { albedo, fuzz } => {
                let reflected = reflect(ray_in.direction, rec.normal);
                let direction = reflected + *fuzz * random_in_unit_sphere(rng);

                // Fuzz pushed the ray below the surface
                if direction.dot(rec.normal) <= 0.0 {
                    return None;
                }

                Some(ScatterResult {
                    attenuation: albedo.value(rec.u, rec.v, rec.point),
                    scattered: Ray::new(rec.point, direction, ray_in.time),
                })
            }

            Material::Dielectric { color, ior } => {
                let refraction_ratio = if rec.front_face { 1.0 / ior } else { *ior };

                let unit_direction = ray_in.direction.normalize();
                let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
                let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

                let cannot_refract = refraction_ratio * sin_theta > 1.0;

                let direction = if cannot_refract
                    || reflectance(cos_theta, refraction_ratio) > gen_f64(rng)
                {
                    reflect(unit_direction, rec.normal)
                } else {
                    refract(unit_direction, rec.normal, refraction_ratio)
                };

                Some(ScatterResult {
                    attenuation: *color,
                    scattered: Ray::new(rec.point, direction, ray_in.time),
                })
            }

            Material::AreaLight { .. } => None,
        }
    }

    /// Light emitted by the surface. Black for everything but lights.
    pub fn emitted(&self) -> Color {
        match self {
            Material::AreaLight { emit } => *emit,
            _ => Color::ZERO,
        }
    }
}

/// Schlick's approximation of Fresnel reflectance.
pub fn reflectance(cosine: f64, ior: f64) -> f64 {
    let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::MaterialId;
    use ember_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn hit_at_origin(ray: &Ray, outward_normal: Vec3) -> HitRecord {
        HitRecord::new(ray, 1.0, outward_normal, (0.5, 0.5), MaterialId::new(0))
    }

    fn gray() -> Texture {
        Texture::solid(Color::splat(0.5))
    }

    #[test]
    fn test_lambertian_always_scatters_above_surface() {
        let mat = Material::lambertian(gray());
        let ray = Ray::new(Vec3::Y, Vec3::NEG_Y, 0.25);
        let rec = hit_at_origin(&ray, Vec3::Y);
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..200 {
            let s = mat.scatter(&ray, &rec, &mut rng).unwrap();
            assert_eq!(s.attenuation, Color::splat(0.5));
            assert_eq!(s.scattered.origin, rec.point);
            assert_eq!(s.scattered.time, 0.25);
            assert!(s.scattered.direction.dot(rec.normal) >= 0.0);
        }
    }

    #[test]
    fn test_perfect_mirror_reflects() {
        let mat = Material::mirror(gray(), 0.0);
        let ray = Ray::new_simple(Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, -1.0, 0.0));
        let rec = hit_at_origin(&ray, Vec3::Y);
        let mut rng = StdRng::seed_from_u64(2);

        let s = mat.scatter(&ray, &rec, &mut rng).unwrap();
        assert_eq!(s.scattered.direction, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_mirror_fuzz_scales_with_incoming_length() {
        let mat = Material::mirror(gray(), 1.0);
        // Reflected y is 3, and the fuzz sphere has radius 1
        let ray = Ray::new_simple(Vec3::new(-3.0, 3.0, 0.0), Vec3::new(3.0, -3.0, 0.0));
        let rec = hit_at_origin(&ray, Vec3::Y);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..10_000 {
            let s = mat.scatter(&ray, &rec, &mut rng).expect("long reflection is never absorbed");
            assert!(s.scattered.direction.y > 2.0);
        }
    }

    #[test]
    fn test_mirror_fuzz_is_clamped() {
        match Material::mirror(gray(), 3.0) {
            Material::Mirror { fuzz, .. } => assert_eq!(fuzz, 1.0),
            other => panic!("unexpected material {other:?}"),
        }
    }

    #[test]
    fn test_grazing_fuzzy_mirror_sometimes_absorbs() {
        let mat = Material::mirror(gray(), 1.0);
        // Nearly tangent incoming ray
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(1.0, -0.01, 0.0));
        let rec = hit_at_origin(&ray, Vec3::Y);
        let mut rng = StdRng::seed_from_u64(3);

        let mut absorbed = 0;
        for _ in 0..500 {
            match mat.scatter(&ray, &rec, &mut rng) {
                Some(s) => assert!(s.scattered.direction.dot(rec.normal) > 0.0),
                None => absorbed += 1,
            }
        }
        assert!(absorbed > 0);
    }

    #[test]
    fn test_reflectance_limits() {
        let ior: f64 = 1.5;
        let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);

        assert_eq!(reflectance(1.0, ior), r0);
        assert!((reflectance(0.0, ior) - 1.0).abs() < 1e-12);
        assert!(reflectance(1e-4, ior) > 0.99);
    }

    #[test]
    fn test_dielectric_attenuation_is_material_color() {
        let color = Color::new(0.9, 0.8, 0.7);
        let mat = Material::dielectric(color, 1.5);
        let ray = Ray::new_simple(Vec3::Y, Vec3::NEG_Y);
        let rec = hit_at_origin(&ray, Vec3::Y);
        let mut rng = StdRng::seed_from_u64(4);

        for _ in 0..50 {
            let s = mat.scatter(&ray, &rec, &mut rng).unwrap();
            assert_eq!(s.attenuation, color);
        }
    }

    #[test]
    fn test_dielectric_total_internal_reflection() {
        let mat = Material::dielectric(Color::ONE, 1.5);
        // Leaving the glass at a shallow angle: 1.5 * sin(60deg) > 1
        let dir = Vec3::new(60f64.to_radians().sin(), 60f64.to_radians().cos(), 0.0);
        let ray = Ray::new_simple(Vec3::new(0.0, -1.0, 0.0), dir);
        // Outward normal points along the ray, so this is a back-face hit
        let rec = hit_at_origin(&ray, Vec3::Y);
        assert!(!rec.front_face);
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..50 {
            let s = mat.scatter(&ray, &rec, &mut rng).unwrap();
            // Reflected back into the glass
            assert!(s.scattered.direction.y < 0.0);
        }
    }

    #[test]
    fn test_dielectric_normal_incidence_mostly_refracts() {
        let mat = Material::dielectric(Color::ONE, 1.5);
        let ray = Ray::new_simple(Vec3::Y, Vec3::NEG_Y);
        let rec = hit_at_origin(&ray, Vec3::Y);
        let mut rng = StdRng::seed_from_u64(6);

        let refracted = (0..1000)
            .filter_map(|_| mat.scatter(&ray, &rec, &mut rng))
            .filter(|s| s.scattered.direction.y < 0.0)
            .count();
        // r0 = 0.04
        assert!(refracted > 900, "refracted {refracted}");
    }

    #[test]
    fn test_area_light_emits_and_absorbs() {
        let mat = Material::area_light(Color::new(4.0, 4.0, 4.0));
        let ray = Ray::new_simple(Vec3::Y, Vec3::NEG_Y);
        let rec = hit_at_origin(&ray, Vec3::Y);
        let mut rng = StdRng::seed_from_u64(7);

        assert!(mat.scatter(&ray, &rec, &mut rng).is_none());
        assert_eq!(mat.emitted(), Color::new(4.0, 4.0, 4.0));
        assert_eq!(Material::lambertian(gray()).emitted(), Color::ZERO);
    }
}
