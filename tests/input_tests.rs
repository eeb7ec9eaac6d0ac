// Host-side tests for pure picking functions.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod input {
    include!("../src/input.rs");
}

use glam::Vec3;
use input::*;

#[test]
fn ray_sphere_intersection_basic() {
    let ray_origin = Vec3::ZERO;
    let ray_dir = Vec3::new(0.0, 0.0, 1.0);

    // Sphere at (0, 0, 5) with radius 2: first hit at t = 3
    let t = ray_sphere(ray_origin, ray_dir, Vec3::new(0.0, 0.0, 5.0), 2.0).unwrap();
    assert!((t - 3.0).abs() < 1e-4);
}

#[test]
fn ray_sphere_intersection_miss() {
    let ray_origin = Vec3::ZERO;
    let ray_dir = Vec3::new(1.0, 0.0, 0.0);

    // Ray goes in X, sphere is in Z
    let result = ray_sphere(ray_origin, ray_dir, Vec3::new(0.0, 0.0, 5.0), 2.0);
    assert!(result.is_none());
}

#[test]
fn ray_sphere_behind_origin_is_rejected() {
    let ray_origin = Vec3::ZERO;
    let ray_dir = Vec3::new(0.0, 0.0, 1.0);

    // Sphere entirely behind the ray origin
    let result = ray_sphere(ray_origin, ray_dir, Vec3::new(0.0, 0.0, -5.0), 2.0);
    assert!(result.is_none());
}

#[test]
fn ray_sphere_tangent_still_hits() {
    let ray_origin = Vec3::ZERO;
    let ray_dir = Vec3::new(0.0, 0.0, 1.0);

    let t = ray_sphere(ray_origin, ray_dir, Vec3::new(2.0, 0.0, 5.0), 2.0).unwrap();
    assert!(t > 0.0);
}

#[test]
fn pick_nearest_empty_set_is_none() {
    let hit = pick_nearest(Vec3::ZERO, Vec3::Z, &[], &[]);
    assert_eq!(hit, None);
}

#[test]
fn pick_nearest_all_misses_is_none() {
    let centers = [Vec3::new(10.0, 0.0, 5.0), Vec3::new(-10.0, 0.0, 5.0)];
    let radii = [1.0, 1.0];
    let hit = pick_nearest(Vec3::ZERO, Vec3::Z, &centers, &radii);
    assert_eq!(hit, None);
}

#[test]
fn pick_nearest_prefers_the_closest_hit() {
    // Both spheres sit on the ray; the near one must win regardless of
    // candidate order.
    let centers = [Vec3::new(0.0, 0.0, 9.0), Vec3::new(0.0, 0.0, 4.0)];
    let radii = [1.0, 1.0];
    let (index, t) = pick_nearest(Vec3::ZERO, Vec3::Z, &centers, &radii).unwrap();
    assert_eq!(index, 1);
    assert!((t - 3.0).abs() < 1e-4);
}

#[test]
fn pick_nearest_breaks_ties_toward_the_lower_index() {
    let centers = [Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 5.0)];
    let radii = [1.0, 1.0];
    let (index, _) = pick_nearest(Vec3::ZERO, Vec3::Z, &centers, &radii).unwrap();
    assert_eq!(index, 0);
}

#[test]
fn photo_bounding_radius_is_the_quad_half_diagonal() {
    // Square quad, 2 units wide: half-diagonal sqrt(2).
    let square = photo_bounding_radius(2.0, 1.0, 1.0);
    assert!((square - std::f32::consts::SQRT_2).abs() < 1e-5);

    // Radius scales linearly with the transform scale.
    assert!((photo_bounding_radius(2.0, 1.0, 3.5) - 3.5 * square).abs() < 1e-4);

    // Wider aspect grows the radius.
    assert!(photo_bounding_radius(2.0, 16.0 / 9.0, 1.0) > square);
}

#[test]
fn pick_radius_covers_the_edge_of_a_wide_photo() {
    // A 16:9 photo quad is ~1.78 units wide at half-width; a click just
    // inside that edge must still count as a hit.
    let radius = photo_bounding_radius(2.0, 16.0 / 9.0, 1.0);
    let centers = [Vec3::new(0.0, 0.0, 5.0)];
    let hit = pick_nearest(
        Vec3::new(1.68, 0.0, 0.0),
        Vec3::Z,
        &centers,
        &[radius],
    );
    assert!(hit.is_some(), "edge of the wide photo must be pickable");

    // Well outside the quad still misses.
    let miss = pick_nearest(
        Vec3::new(2.5, 0.0, 0.0),
        Vec3::Z,
        &centers,
        &[radius],
    );
    assert_eq!(miss, None);
}

#[test]
fn pick_nearest_skips_occluding_misses() {
    // A big far sphere and a small near sphere off to the side the ray
    // misses entirely.
    let centers = [Vec3::new(3.0, 0.0, 1.0), Vec3::new(0.0, 0.0, 20.0)];
    let radii = [0.5, 2.0];
    let (index, _) = pick_nearest(Vec3::ZERO, Vec3::Z, &centers, &radii).unwrap();
    assert_eq!(index, 1);
}
