use std::path::Path;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use kdray::geometry::{ColorVector, ScreenSize, WorldPoint};
use kdray::scene::kd_tree::BuildConfig;
use kdray::scene::primitives::{Polygon, Sphere};
use kdray::scene::{LightParams, Material, Object, PointLight};
use kdray::{Camera, RenderSettings, Scene, render_to_file};

/// A closed room with a handful of spheres, lit by two ceiling-height lights.
fn demo_scene() -> Scene {
    let mut objects: Vec<Box<dyn Object>> = Vec::new();

    let sphere = |center: [f64; 3], radius: f64, color: [f64; 3]| -> Box<dyn Object> {
        Box::new(Sphere::new(
            center.into(),
            radius,
            Material::matte(ColorVector::from(color)),
        ))
    };
    objects.push(sphere([400.0, 300.0, 900.0], 200.0, [0.2, 0.2, 0.8]));
    objects.push(sphere([0.0, 0.0, 500.0], 100.0, [0.9, 0.5, 0.1]));
    objects.push(sphere([-100.0, 0.0, 500.0], 50.0, [0.8, 0.1, 0.1]));
    objects.push(sphere([100.0, 0.0, 500.0], 50.0, [0.9, 0.8, 0.2]));
    objects.push(sphere([-50.0, 100.0, 500.0], 50.0, [0.1, 0.7, 0.2]));
    objects.push(sphere([50.0, 100.0, 500.0], 50.0, [0.4, 0.7, 0.9]));

    // The room. Every wall's normal is turned toward its center.
    let room_center = WorldPoint::new(0.0, 0.0, 500.0);
    let wall = |vertices: [[f64; 3]; 4], color: [f64; 3]| -> Box<dyn Object> {
        Box::new(
            Polygon::quadrangle(
                vertices.map(WorldPoint::from),
                Material::matte(ColorVector::from(color)),
            )
            .with_orientation(room_center),
        )
    };
    let grey = [0.6, 0.6, 0.6];
    // Left and right.
    objects.push(wall(
        [
            [-500.0, -400.0, 0.0],
            [-500.0, 400.0, 0.0],
            [-500.0, 400.0, 1000.0],
            [-500.0, -400.0, 1000.0],
        ],
        [0.7, 0.3, 0.3],
    ));
    objects.push(wall(
        [
            [500.0, -400.0, 0.0],
            [500.0, 400.0, 0.0],
            [500.0, 400.0, 1000.0],
            [500.0, -400.0, 1000.0],
        ],
        [0.3, 0.7, 0.3],
    ));
    // Back.
    objects.push(wall(
        [
            [-500.0, -400.0, 1000.0],
            [500.0, -400.0, 1000.0],
            [500.0, 400.0, 1000.0],
            [-500.0, 400.0, 1000.0],
        ],
        grey,
    ));
    // Ceiling and floor.
    objects.push(wall(
        [
            [-500.0, -400.0, 0.0],
            [500.0, -400.0, 0.0],
            [500.0, -400.0, 1000.0],
            [-500.0, -400.0, 1000.0],
        ],
        grey,
    ));
    objects.push(wall(
        [
            [-500.0, 400.0, 0.0],
            [500.0, 400.0, 0.0],
            [500.0, 400.0, 1000.0],
            [-500.0, 400.0, 1000.0],
        ],
        grey,
    ));

    let lights = vec![
        PointLight::new(
            WorldPoint::new(0.0, -350.0, 250.0),
            LightParams::uniform(1e6),
        ),
        PointLight::new(
            WorldPoint::new(0.0, -350.0, 750.0),
            LightParams::uniform(1e6),
        ),
    ];

    Scene::new(objects, lights, &BuildConfig::default())
}

fn main() -> Result<()> {
    let scene = demo_scene();
    let camera = Camera::builder()
        .eye(WorldPoint::new(0.0, 0.0, -500.0))
        .left_top(WorldPoint::new(-400.0, -300.0, 0.0))
        .right_top(WorldPoint::new(400.0, -300.0, 0.0))
        .left_bottom(WorldPoint::new(-400.0, 300.0, 0.0))
        .resolution(ScreenSize::new(800, 600))
        .build();

    let progress = ProgressBar::new(camera.resolution().y as u64)
        .with_style(ProgressStyle::with_template("{wide_bar} {pos}/{len} rows")?);
    render_to_file(
        &scene,
        &camera,
        &RenderSettings::default(),
        Path::new("render.png"),
        |_row| progress.inc(1),
    )?;
    progress.finish();

    Ok(())
}
