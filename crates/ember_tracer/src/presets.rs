//! Built-in scenes.

use ember_core::{Mesh, Texture};
use ember_math::{Color, Vec3};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::material::Material;
use crate::plane::Plane;
use crate::rectangle::Rectangle;
use crate::scene::{Scene, SceneBuilder};
use crate::sphere::{MovingSphere, Sphere};
use crate::triangle::Triangle;

/// Scene selected by name in the render config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Marble, mirror and glass spheres in a small lit room.
    #[default]
    ThreeSpheres,
    /// Spheres, a triangle and a moving sphere over a checkered floor.
    Showcase,
    /// Smooth-shaded octahedron over an infinite floor plane.
    MeshDemo,
    /// Nothing but background.
    Empty,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::ThreeSpheres,
        Preset::Showcase,
        Preset::MeshDemo,
        Preset::Empty,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::ThreeSpheres => "three_spheres",
            Preset::Showcase => "showcase",
            Preset::MeshDemo => "mesh_demo",
            Preset::Empty => "empty",
        }
    }

    /// Build the scene. `rng` seeds procedural textures.
    pub fn build(&self, background: Color, rng: &mut dyn RngCore) -> Scene {
        log::info!("Building preset scene '{}'", self.name());

        let mut builder = SceneBuilder::new().with_background(background);
        match self {
            Preset::ThreeSpheres => three_spheres(&mut builder, rng),
            Preset::Showcase => showcase(&mut builder),
            Preset::MeshDemo => mesh_demo(&mut builder),
            Preset::Empty => {}
        }
        builder.build()
    }
}

fn three_spheres(builder: &mut SceneBuilder, rng: &mut dyn RngCore) {
    let marble = Texture::noise(10.0, rng);

    let floor = builder.add_material(Material::lambertian(Texture::checker(
        Color::new(0.3, 0.4, 0.5),
        Color::new(0.9, 0.9, 0.9),
    )));
    builder.add(Rectangle::new(
        Vec3::new(-10.0, -0.5, -10.0),
        Vec3::new(-10.0, -0.5, 10.0),
        Vec3::new(10.0, -0.5, 10.0),
        Vec3::new(10.0, -0.5, -10.0),
        floor,
    ));

    // Back, left, right and front walls
    let wall = builder.add_material(Material::lambertian(Texture::solid(Color::new(0.5, 0.4, 0.3))));
    let (x0, x1, y0, y1, z0, z1) = (-1.5, 1.5, -0.5, 2.0, -4.0, 1.0);
    let walls = [
        [(x0, y0, z0), (x0, y1, z0), (x1, y1, z0), (x1, y0, z0)],
        [(x0, y0, z0), (x0, y1, z0), (x0, y1, z1), (x0, y0, z1)],
        [(x1, y0, z0), (x1, y1, z0), (x1, y1, z1), (x1, y0, z1)],
        [(x0, y0, z1), (x0, y1, z1), (x1, y1, z1), (x1, y0, z1)],
    ];
    for [a, b, c, d] in walls {
        builder.add(Rectangle::new(a.into(), b.into(), c.into(), d.into(), wall));
    }

    // Pink core inside a glass shell
    let core = builder.add_material(Material::lambertian(Texture::solid(Color::new(1.0, 0.2, 0.8))));
    builder.add(Sphere::new(Vec3::new(0.0, 0.0, -2.5), 0.4, core));
    let glass = builder.add_material(Material::dielectric(Color::ONE, 1.5));
    builder.add(Sphere::new(Vec3::new(0.0, 0.0, -2.5), 0.5, glass));

    let marble_diffuse = builder.add_material(Material::lambertian(marble.clone()));
    builder.add(Sphere::new(Vec3::new(0.6, -0.2, -2.0), 0.3, marble_diffuse));

    let marble_mirror = builder.add_material(Material::mirror(marble, 0.1));
    builder.add(Sphere::new(Vec3::new(-1.0, -0.2, -3.0), 0.3, marble_mirror));

    let bright = builder.add_material(Material::area_light(Color::splat(10.0)));
    builder.add(Sphere::new(Vec3::new(-1.0, 1.0, 0.0), 0.3, bright));

    let ceiling = builder.add_material(Material::area_light(Color::splat(2.0)));
    builder.add(Rectangle::new(
        Vec3::new(x0, y1, z0),
        Vec3::new(x0, y1, z1),
        Vec3::new(x1, y1, z1),
        Vec3::new(x1, y1, z0),
        ceiling,
    ));
}

fn showcase(builder: &mut SceneBuilder) {
    let orange = Color::new(219.0, 121.0, 59.0) / 255.0;
    let pink = Color::new(201.0, 81.0, 81.0) / 255.0;
    let blue = Color::new(12.0, 173.0, 173.0) / 255.0;
    let dark_gray = Color::splat(0.2);
    let light_gray = Color::splat(0.9);
    let white = Color::ONE;

    let solid = |c: Color| Material::lambertian(Texture::solid(c));

    let tri = builder.add_material(solid(blue));
    builder.add(Triangle::new(
        Vec3::new(-0.3, -0.6, -0.5),
        Vec3::new(-0.8, -0.6, -1.0),
        Vec3::new(-0.4, 0.2, -0.7),
        tri,
    ));

    let chrome = builder.add_material(Material::mirror(Texture::solid(light_gray), 0.05));
    builder.add(Sphere::new(Vec3::new(-0.2, -0.3, -1.0), 0.3, chrome));

    let glass = builder.add_material(Material::dielectric(white, 1.5));
    builder.add(Sphere::new(Vec3::new(0.4, -0.3, -1.0), 0.2, glass));

    let orange = builder.add_material(solid(orange));
    builder.add(Sphere::new(Vec3::new(0.8, -0.3, -1.5), 0.1, orange));

    let pink = builder.add_material(solid(pink));
    builder.add(Sphere::new(Vec3::new(0.3, -0.43, -0.7), 0.07, pink));
    builder.add(MovingSphere::new(
        Vec3::new(0.4, 0.3, -0.8),
        Vec3::new(0.5, 0.3, -0.8),
        0.0,
        1.0,
        0.1,
        pink,
    ));

    // Checkerboard of triangle pairs
    let dark = builder.add_material(solid(dark_gray));
    let light = builder.add_material(solid(white));
    let (y, size) = (-0.5, 0.5);
    for row in 0..20 {
        let z = -(row as f64) * size;
        for col in 0..40 {
            let x = -10.0 + col as f64 * size;
            let a = Vec3::new(x, y, z - size);
            let b = Vec3::new(x, y, z);
            let c = Vec3::new(x + size, y, z);
            let d = Vec3::new(x + size, y, z - size);
            builder.add(Triangle::new(a, b, c, light));
            builder.add(Triangle::new(a, c, d, dark));
        }
    }

    let lamp = builder.add_material(Material::area_light(white));
    for x in [-0.8, 0.2, 0.8] {
        builder.add(Rectangle::new(
            Vec3::new(x, -0.35, -1.4),
            Vec3::new(x, -0.35, -0.6),
            Vec3::new(x, -0.6, -0.6),
            Vec3::new(x, -0.6, -1.4),
            lamp,
        ));
    }
    builder.add(Sphere::new(Vec3::new(0.0, 0.5, -1.0), 0.25, lamp));
}

fn mesh_demo(builder: &mut SceneBuilder) {
    let floor = builder.add_material(Material::lambertian(Texture::checker(
        Color::new(0.2, 0.3, 0.1),
        Color::new(0.9, 0.9, 0.9),
    )));
    builder.add(Plane::new(Vec3::new(0.0, -0.5, 0.0), Vec3::Y, floor));

    let red = builder.add_material(Material::lambertian(Texture::solid(Color::new(0.8, 0.1, 0.1))));
    builder.add_mesh(octahedron(Vec3::new(0.0, 0.1, -2.5), 0.5), red, true);

    let lamp = builder.add_material(Material::area_light(Color::splat(4.0)));
    builder.add(Sphere::new(Vec3::new(1.0, 1.5, -1.5), 0.3, lamp));
}

/// Octahedron with counter-clockwise outward faces.
fn octahedron(center: Vec3, radius: f64) -> Mesh {
    let axes = [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z];
    let positions = axes.iter().map(|&a| center + a * radius).collect();

    let mut indices = Vec::with_capacity(24);
    for sx in [1.0, -1.0] {
        for sy in [1.0, -1.0] {
            for sz in [1.0, -1.0] {
                let ix = if sx > 0.0 { 0 } else { 1 };
                let iy = if sy > 0.0 { 2 } else { 3 };
                let iz = if sz > 0.0 { 4 } else { 5 };
                // An odd number of negative axes flips the winding
                if sx * sy * sz > 0.0 {
                    indices.extend_from_slice(&[ix, iy, iz]);
                } else {
                    indices.extend_from_slice(&[ix, iz, iy]);
                }
            }
        }
    }

    Mesh::new(positions, indices, None)
}
