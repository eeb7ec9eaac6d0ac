// Formation blend engine.
//
// Owns every visual object transform. Each animation frame it eases a
// global blend factor toward the value implied by the current mode,
// interpolates each object between its tree and scatter formation slots,
// applies idle float motion, and overrides the transform of the focused
// photo. Discrete mode switches never jump rendered transforms; they only
// move targets, which the eases absorb over subsequent frames.

use glam::{EulerRot, Mat3, Quat, Vec2, Vec3};
use rand::prelude::*;

use super::gesture::Gesture;
use super::session::{Mode, PhotoId};

// Formation layout bounds.
pub const TREE_HEIGHT: f32 = 20.0;
pub const TREE_BASE_RADIUS: f32 = 8.0;
pub const PARTICLE_SCATTER_EXTENT: [f32; 3] = [35.0, 35.0, 20.0];
pub const PHOTO_SCATTER_EXTENT: [f32; 3] = [25.0, 20.0, 15.0];

// Ease factors, expressed per reference frame (60 Hz). `tick` compensates
// for the actual frame interval so convergence speed is refresh-rate
// independent.
pub const BLEND_EASE: f32 = 0.05;
pub const POSITION_EASE: f32 = 0.1;
pub const SCALE_EASE: f32 = 0.1;
pub const ROTATION_EASE: f32 = 0.05;

// Idle motion and sizing.
pub const FLOAT_AMPLITUDE: f32 = 0.5;
pub const PARTICLE_SCALE_TREE: f32 = 1.0;
pub const PARTICLE_SCALE_SCATTER: f32 = 0.6;
pub const PHOTO_SPIN_MAX: f32 = 0.01;

// Focus override: anchor a few units in front of the viewpoint (camera
// sits at z = 18), eased scale-up instead of a snap.
pub const FOCUS_ANCHOR: [f32; 3] = [0.0, 2.0, 14.0];
pub const FOCUS_SCALE: f32 = 3.5;

// Group rotation.
pub const TREE_SPIN_PER_FRAME: f32 = 0.002;
pub const PALM_YAW_RANGE: f32 = 4.0;
pub const PALM_PITCH_RANGE: f32 = 2.0;

// Pacing of the idle float/rotation clock: 0.01 per frame at 60 Hz.
const TIME_SCALE: f32 = 0.6;

/// Ornament palette: gold, red, deep green, silver.
pub const PALETTE: [[f32; 3]; 4] = [
    [0.831, 0.686, 0.216],
    [0.769, 0.118, 0.227],
    [0.184, 0.310, 0.310],
    [0.898, 0.894, 0.886],
];

/// Position, Euler rotation and uniform scale of one rendered object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: f32,
}

impl Transform {
    fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleShape {
    Sphere,
    Cube,
}

/// One ornament particle. Not individually selectable.
#[derive(Clone, Debug)]
pub struct Particle {
    pub tree_pos: Vec3,
    pub scatter_pos: Vec3,
    pub shape: ParticleShape,
    pub palette_index: usize,
    pub transform: Transform,
}

/// One uploaded photo plane. `aspect` is width over height.
#[derive(Clone, Debug)]
pub struct Photo {
    pub tree_pos: Vec3,
    pub scatter_pos: Vec3,
    pub aspect: f32,
    pub spin: f32,
    pub transform: Transform,
}

/// The blend engine. Exclusively owns all object transforms; the renderer
/// only reads them.
pub struct FormationEngine {
    pub particles: Vec<Particle>,
    pub photos: Vec<Photo>,
    /// Global blend factor in [0, 1]: 0 = tree formation, 1 = scatter.
    pub blend: f32,
    /// Scene-level rotation, x = pitch, y = yaw.
    pub group_rotation: Vec2,
    time: f32,
    rng: StdRng,
}

impl FormationEngine {
    /// Build the particle set from a seed. Tree positions sample a cone
    /// volume uniformly (uniform height, sqrt-radius within the disc at
    /// that height); scatter positions sample a box cloud.
    pub fn new(seed: u64, particle_count: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut particles = Vec::with_capacity(particle_count);
        for i in 0..particle_count {
            let h = rng.gen::<f32>() * TREE_HEIGHT - TREE_HEIGHT / 2.0;
            let height_pct = (h + TREE_HEIGHT / 2.0) / TREE_HEIGHT;
            let radius_at_height = (1.0 - height_pct) * TREE_BASE_RADIUS;
            let angle = rng.gen::<f32>() * std::f32::consts::TAU;
            let r = rng.gen::<f32>().sqrt() * radius_at_height;
            let tree_pos = Vec3::new(angle.cos() * r, h, angle.sin() * r);

            let scatter_pos = centered_box_sample(&mut rng, PARTICLE_SCATTER_EXTENT);

            let shape = if i % 2 == 0 {
                ParticleShape::Sphere
            } else {
                ParticleShape::Cube
            };
            particles.push(Particle {
                tree_pos,
                scatter_pos,
                shape,
                palette_index: rng.gen_range(0..PALETTE.len()),
                transform: Transform::at(tree_pos),
            });
        }
        Self {
            particles,
            photos: Vec::new(),
            blend: 0.0,
            group_rotation: Vec2::ZERO,
            time: 0.0,
            rng,
        }
    }

    /// Register a new photo and assign its formation slots: a spiral tree
    /// position derived from the insertion index and a random scatter
    /// position fixed at creation. Append-only; ids are insertion indices.
    pub fn add_photo(&mut self, aspect: f32) -> PhotoId {
        let id = self.photos.len() as PhotoId;
        let tree_pos = photo_tree_slot(id);
        let scatter_pos = centered_box_sample(&mut self.rng, PHOTO_SCATTER_EXTENT);
        let spin = (self.rng.gen::<f32>() - 0.5) * 2.0 * PHOTO_SPIN_MAX;
        self.photos.push(Photo {
            tree_pos,
            scatter_pos,
            aspect: aspect.max(f32::EPSILON),
            spin,
            transform: Transform::at(tree_pos),
        });
        id
    }

    pub fn photo_count(&self) -> u32 {
        self.photos.len() as u32
    }

    /// The group rotation matrix (pitch then yaw, matching the scene
    /// graph's XYZ Euler order).
    pub fn group_matrix(&self) -> Mat3 {
        Mat3::from_euler(
            EulerRot::XYZ,
            self.group_rotation.x,
            self.group_rotation.y,
            0.0,
        )
    }

    /// World-space position of a photo (group rotation applied), used by
    /// picking.
    pub fn photo_world_position(&self, id: PhotoId) -> Option<Vec3> {
        let photo = self.photos.get(id as usize)?;
        Some(self.group_matrix() * photo.transform.position)
    }

    /// Advance every object transform by one frame.
    pub fn tick(&mut self, dt_sec: f32, mode: Mode, gesture: &Gesture, focus: Option<PhotoId>) {
        let frames = (dt_sec * 60.0).max(0.0);
        self.time += dt_sec.max(0.0) * TIME_SCALE;

        // 1. Blend factor: exponential ease toward the mode's formation.
        let target = if mode == Mode::Tree { 0.0 } else { 1.0 };
        self.blend += (target - self.blend) * ease_alpha(BLEND_EASE, frames);
        self.blend = self.blend.clamp(0.0, 1.0);

        let scattered = self.blend > 0.5;
        let focus = if mode == Mode::PhotoZoom { focus } else { None };
        let inv_group = self.group_matrix().transpose();
        // The focused photo faces the viewpoint when its local rotation
        // composes with the group rotation to the identity, so the facing
        // target is the inverse rotation's own XYZ decomposition (negating
        // the euler components is not an inverse once pitch and yaw mix).
        let (face_x, face_y, face_z) = Quat::from_mat3(&inv_group).to_euler(EulerRot::XYZ);
        let face = Vec3::new(face_x, face_y, face_z);
        let time = self.time;
        let blend = self.blend;

        // 2. Particles: lerp between formations, idle float scaled by the
        // blend factor, continuous rotation, discrete size drop past the
        // formation crossover.
        for (i, p) in self.particles.iter_mut().enumerate() {
            let base = p.tree_pos.lerp(p.scatter_pos, blend);
            let phase = i as f32 * 0.1;
            let sway = Vec3::new(
                (time + phase).sin(),
                (time + phase).cos(),
                0.0,
            ) * FLOAT_AMPLITUDE
                * blend;
            p.transform.position = base + sway;
            p.transform.rotation = Vec3::new(time * 0.5 + i as f32, time * 0.3 + i as f32, 0.0);
            p.transform.scale = if scattered {
                PARTICLE_SCALE_SCATTER
            } else {
                PARTICLE_SCALE_TREE
            };
        }

        // 3/4. Photos: normal interpolation, or the focus override for the
        // selected one.
        for (i, photo) in self.photos.iter_mut().enumerate() {
            let t = &mut photo.transform;
            if focus == Some(i as PhotoId) {
                // Anchor in front of the viewpoint, expressed in the
                // (possibly rotated) group's local space.
                let local_anchor = inv_group * Vec3::from(FOCUS_ANCHOR);
                t.position += (local_anchor - t.position) * ease_alpha(POSITION_EASE, frames);
                t.rotation += (face - t.rotation) * ease_alpha(ROTATION_EASE, frames);
                t.scale += (FOCUS_SCALE - t.scale) * ease_alpha(SCALE_EASE, frames);
            } else {
                let target = photo.tree_pos.lerp(photo.scatter_pos, blend);
                t.position += (target - t.position) * ease_alpha(POSITION_EASE, frames);
                t.rotation.y += photo.spin * frames;
                t.scale += (1.0 - t.scale) * ease_alpha(SCALE_EASE, frames);
            }
        }

        // 5. Group orientation. Frozen in PhotoZoom so the focused photo
        // stays framed.
        match mode {
            Mode::Tree => {
                self.group_rotation.y += TREE_SPIN_PER_FRAME * frames;
                self.group_rotation.x +=
                    (0.0 - self.group_rotation.x) * ease_alpha(ROTATION_EASE, frames);
            }
            Mode::Scatter => {
                let target_yaw = (gesture.palm.x - 0.5) * PALM_YAW_RANGE;
                let target_pitch = (gesture.palm.y - 0.5) * PALM_PITCH_RANGE;
                self.group_rotation.y +=
                    (target_yaw - self.group_rotation.y) * ease_alpha(ROTATION_EASE, frames);
                self.group_rotation.x +=
                    (target_pitch - self.group_rotation.x) * ease_alpha(ROTATION_EASE, frames);
            }
            Mode::PhotoZoom => {}
        }
    }
}

/// Spiral tree slot for the photo at `index`: golden-angle-sized strides
/// of 137.5 radians, radius growing with the index, height cycling over
/// the tree's span.
pub fn photo_tree_slot(index: PhotoId) -> Vec3 {
    let i = index as f32;
    let angle = i * 137.5;
    let radius = 3.0 + i * 0.2;
    let y = (i * 1.5) % 12.0 - 6.0;
    Vec3::new(angle.sin() * radius, y, angle.cos() * radius)
}

/// Uniform sample from a box of the given extent centered on the origin.
fn centered_box_sample(rng: &mut StdRng, extent: [f32; 3]) -> Vec3 {
    Vec3::new(
        (rng.gen::<f32>() - 0.5) * extent[0],
        (rng.gen::<f32>() - 0.5) * extent[1],
        (rng.gen::<f32>() - 0.5) * extent[2],
    )
}

/// Per-tick ease weight for a per-reference-frame factor `k`, compensated
/// for the actual number of elapsed reference frames: repeatedly applying
/// `x += (t - x) * k` for `frames` frames multiplies the remaining error
/// by `(1 - k)^frames`.
#[inline]
fn ease_alpha(k: f32, frames: f32) -> f32 {
    1.0 - (1.0 - k).powf(frames)
}
