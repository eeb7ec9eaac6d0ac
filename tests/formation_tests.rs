// Host-side tests for the formation blend engine.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod gesture {
    include!("../src/core/gesture.rs");
}
mod session {
    include!("../src/core/session.rs");
}
mod formation {
    include!("../src/core/formation.rs");
}

use formation::*;
use gesture::Gesture;
use glam::{Vec2, Vec3};
use session::Mode;

const DT: f32 = 1.0 / 60.0;

fn tick_n(engine: &mut FormationEngine, n: usize, mode: Mode, gesture: &Gesture) {
    for _ in 0..n {
        engine.tick(DT, mode, gesture, None);
    }
}

#[test]
fn layout_is_seed_deterministic() {
    let a = FormationEngine::new(42, 200);
    let b = FormationEngine::new(42, 200);
    for (pa, pb) in a.particles.iter().zip(b.particles.iter()) {
        assert_eq!(pa.tree_pos, pb.tree_pos);
        assert_eq!(pa.scatter_pos, pb.scatter_pos);
        assert_eq!(pa.palette_index, pb.palette_index);
    }
    let c = FormationEngine::new(43, 200);
    assert!(
        a.particles
            .iter()
            .zip(c.particles.iter())
            .any(|(pa, pc)| pa.tree_pos != pc.tree_pos),
        "different seeds should give different layouts"
    );
}

#[test]
fn tree_positions_stay_inside_the_cone() {
    let engine = FormationEngine::new(42, 1000);
    for p in &engine.particles {
        let half = TREE_HEIGHT / 2.0;
        assert!(p.tree_pos.y >= -half - 1e-4 && p.tree_pos.y <= half + 1e-4);
        let height_pct = (p.tree_pos.y + half) / TREE_HEIGHT;
        let max_r = (1.0 - height_pct) * TREE_BASE_RADIUS;
        let r = (p.tree_pos.x * p.tree_pos.x + p.tree_pos.z * p.tree_pos.z).sqrt();
        assert!(r <= max_r + 1e-3, "r={r} exceeds cone radius {max_r}");
    }
}

#[test]
fn scatter_positions_stay_inside_the_cloud() {
    let engine = FormationEngine::new(42, 1000);
    for p in &engine.particles {
        assert!(p.scatter_pos.x.abs() <= PARTICLE_SCATTER_EXTENT[0] / 2.0 + 1e-4);
        assert!(p.scatter_pos.y.abs() <= PARTICLE_SCATTER_EXTENT[1] / 2.0 + 1e-4);
        assert!(p.scatter_pos.z.abs() <= PARTICLE_SCATTER_EXTENT[2] / 2.0 + 1e-4);
    }
}

#[test]
fn particle_shapes_and_palette_cover_both_kinds() {
    let engine = FormationEngine::new(42, 100);
    assert!(engine
        .particles
        .iter()
        .any(|p| p.shape == ParticleShape::Sphere));
    assert!(engine
        .particles
        .iter()
        .any(|p| p.shape == ParticleShape::Cube));
    for p in &engine.particles {
        assert!(p.palette_index < PALETTE.len());
    }
}

#[test]
fn photo_ids_are_sequential_insertion_indices() {
    let mut engine = FormationEngine::new(42, 10);
    assert_eq!(engine.add_photo(1.5), 0);
    assert_eq!(engine.add_photo(0.8), 1);
    assert_eq!(engine.add_photo(1.0), 2);
    assert_eq!(engine.photo_count(), 3);
    for photo in &engine.photos {
        assert!(photo.spin.abs() <= PHOTO_SPIN_MAX + 1e-6);
        assert!(photo.scatter_pos.x.abs() <= PHOTO_SCATTER_EXTENT[0] / 2.0 + 1e-4);
    }
}

#[test]
fn photo_spiral_radius_grows_with_index() {
    let near = photo_tree_slot(0);
    let far = photo_tree_slot(20);
    let r0 = (near.x * near.x + near.z * near.z).sqrt();
    let r20 = (far.x * far.x + far.z * far.z).sqrt();
    assert!(r20 > r0);
}

#[test]
fn blend_stays_in_unit_interval_and_converges() {
    let mut engine = FormationEngine::new(42, 50);
    assert_eq!(engine.blend, 0.0);

    let neutral = Gesture::neutral();
    let mut prev = engine.blend;
    for _ in 0..300 {
        engine.tick(DT, Mode::Scatter, &neutral, None);
        assert!(engine.blend >= prev - 1e-6, "blend must rise monotonically");
        assert!((0.0..=1.0).contains(&engine.blend));
        prev = engine.blend;
    }
    assert!(engine.blend > 0.95, "blend={} after 5s", engine.blend);

    tick_n(&mut engine, 300, Mode::Tree, &neutral);
    assert!(engine.blend < 0.05, "blend={} back in tree", engine.blend);
}

#[test]
fn blend_convergence_is_frame_rate_independent() {
    let neutral = Gesture::neutral();
    let mut at_60 = FormationEngine::new(42, 10);
    let mut at_120 = FormationEngine::new(42, 10);
    for _ in 0..120 {
        at_60.tick(1.0 / 60.0, Mode::Scatter, &neutral, None);
    }
    for _ in 0..240 {
        at_120.tick(1.0 / 120.0, Mode::Scatter, &neutral, None);
    }
    assert!(
        (at_60.blend - at_120.blend).abs() < 0.02,
        "60Hz blend {} vs 120Hz blend {}",
        at_60.blend,
        at_120.blend
    );
}

#[test]
fn particles_migrate_toward_scatter_slots() {
    let mut engine = FormationEngine::new(42, 50);
    let neutral = Gesture::neutral();
    tick_n(&mut engine, 600, Mode::Scatter, &neutral);
    for p in &engine.particles {
        // Idle float keeps positions moving; they must still orbit the
        // scatter slot rather than the tree slot.
        let to_scatter = p.transform.position.distance(p.scatter_pos);
        assert!(to_scatter <= FLOAT_AMPLITUDE * 2.0 + 0.5, "drifted {to_scatter}");
        assert_eq!(p.transform.scale, PARTICLE_SCALE_SCATTER);
    }
}

#[test]
fn particle_scale_drops_past_the_formation_crossover() {
    let mut engine = FormationEngine::new(42, 10);
    let neutral = Gesture::neutral();
    engine.tick(DT, Mode::Tree, &neutral, None);
    assert_eq!(engine.particles[0].transform.scale, PARTICLE_SCALE_TREE);
    tick_n(&mut engine, 300, Mode::Scatter, &neutral);
    assert!(engine.blend > 0.5);
    assert_eq!(engine.particles[0].transform.scale, PARTICLE_SCALE_SCATTER);
}

#[test]
fn focused_photo_converges_on_the_anchor() {
    let mut engine = FormationEngine::new(42, 10);
    engine.add_photo(1.0);
    engine.add_photo(1.0);
    let neutral = Gesture::neutral();
    for _ in 0..600 {
        engine.tick(DT, Mode::PhotoZoom, &neutral, Some(0));
    }
    // Group rotation is frozen (and zero) in PhotoZoom, so local space is
    // world space here.
    let focused = &engine.photos[0].transform;
    assert!(focused.position.distance(Vec3::from(FOCUS_ANCHOR)) < 0.05);
    assert!((focused.scale - FOCUS_SCALE).abs() < 0.05);

    // The unfocused photo keeps its normal interpolation and scale.
    assert!((engine.photos[1].transform.scale - 1.0).abs() < 0.05);
    assert!(engine.photos[1].transform.position.distance(Vec3::from(FOCUS_ANCHOR)) > 1.0);
}

#[test]
fn focused_photo_faces_the_viewpoint_under_combined_rotation() {
    let mut engine = FormationEngine::new(42, 10);
    engine.add_photo(1.0);
    // Pitch and yaw both nonzero, as left behind by palm steering. The
    // rotation stays frozen in PhotoZoom, so the focused photo's local
    // rotation must exactly cancel it once converged.
    engine.group_rotation = Vec2::new(0.5, 1.0);
    let neutral = Gesture::neutral();
    for _ in 0..600 {
        engine.tick(DT, Mode::PhotoZoom, &neutral, Some(0));
    }
    let r = engine.photos[0].transform.rotation;
    let local = glam::Mat3::from_euler(glam::EulerRot::XYZ, r.x, r.y, r.z);
    let facing = engine.group_matrix() * local * Vec3::Z;
    let off_axis = facing.angle_between(Vec3::Z).to_degrees();
    assert!(off_axis < 1.0, "photo normal {off_axis} degrees off the viewpoint");
}

#[test]
fn focus_is_ignored_outside_photo_zoom() {
    let mut engine = FormationEngine::new(42, 10);
    engine.add_photo(1.0);
    let neutral = Gesture::neutral();
    for _ in 0..600 {
        engine.tick(DT, Mode::Tree, &neutral, Some(0));
    }
    let t = &engine.photos[0].transform;
    assert!(t.position.distance(Vec3::from(FOCUS_ANCHOR)) > 1.0);
    assert!((t.scale - 1.0).abs() < 0.05);
}

#[test]
fn tree_mode_spins_the_group_slowly() {
    let mut engine = FormationEngine::new(42, 10);
    let neutral = Gesture::neutral();
    tick_n(&mut engine, 60, Mode::Tree, &neutral);
    let expected = TREE_SPIN_PER_FRAME * 60.0;
    assert!((engine.group_rotation.y - expected).abs() < 1e-3);
    assert!(engine.group_rotation.x.abs() < 1e-3);
}

#[test]
fn scatter_mode_steers_rotation_with_the_palm() {
    let mut engine = FormationEngine::new(42, 10);
    let steering = Gesture {
        palm: Vec2::new(1.0, 1.0),
        ..Gesture::neutral()
    };
    tick_n(&mut engine, 600, Mode::Scatter, &steering);
    assert!((engine.group_rotation.y - PALM_YAW_RANGE / 2.0).abs() < 0.05);
    assert!((engine.group_rotation.x - PALM_PITCH_RANGE / 2.0).abs() < 0.05);

    // Centered palm steers back to identity.
    tick_n(&mut engine, 600, Mode::Scatter, &Gesture::neutral());
    assert!(engine.group_rotation.y.abs() < 0.05);
    assert!(engine.group_rotation.x.abs() < 0.05);
}

#[test]
fn photo_zoom_freezes_the_group_rotation() {
    let mut engine = FormationEngine::new(42, 10);
    engine.add_photo(1.0);
    let steering = Gesture {
        palm: Vec2::new(1.0, 0.0),
        ..Gesture::neutral()
    };
    tick_n(&mut engine, 120, Mode::Scatter, &steering);
    let frozen = engine.group_rotation;
    for _ in 0..120 {
        engine.tick(DT, Mode::PhotoZoom, &steering, Some(0));
    }
    assert_eq!(engine.group_rotation, frozen);
}

#[test]
fn photo_world_position_applies_the_group_rotation() {
    let mut engine = FormationEngine::new(42, 10);
    let id = engine.add_photo(1.0);
    engine.group_rotation = Vec2::new(0.0, std::f32::consts::FRAC_PI_2);
    let local = engine.photos[id as usize].transform.position;
    let world = engine.photo_world_position(id).unwrap();
    assert!((world.length() - local.length()).abs() < 1e-4);
    let expected = engine.group_matrix() * local;
    assert!(world.distance(expected) < 1e-5);
    assert_eq!(engine.photo_world_position(99), None);
}

#[test]
fn tick_with_zero_dt_changes_nothing() {
    let mut engine = FormationEngine::new(42, 10);
    let neutral = Gesture::neutral();
    engine.tick(DT, Mode::Scatter, &neutral, None);
    let blend = engine.blend;
    let pos = engine.particles[0].transform.position;
    engine.tick(0.0, Mode::Scatter, &neutral, None);
    assert_eq!(engine.blend, blend);
    assert_eq!(engine.particles[0].transform.position, pos);
}
