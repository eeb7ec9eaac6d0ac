/// Scene and interaction tuning constants.
///
/// These express intended behavior (camera framing, scene scale) and keep
/// magic numbers out of the wiring code.
// Camera: slightly raised, pulled well back so the whole tree is framed.
pub const CAMERA_EYE: [f32; 3] = [0.0, 2.0, 18.0];
pub const CAMERA_FOVY_DEG: f32 = 75.0;
pub const CAMERA_ZNEAR: f32 = 0.1;
pub const CAMERA_ZFAR: f32 = 100.0;

// Particle set size and the layout seed. The seed is fixed so reloading
// the page rebuilds the same tree.
pub const PARTICLE_COUNT: usize = 4000;
pub const LAYOUT_SEED: u64 = 42;

// Rendered particle footprint (world units) before formation scaling.
pub const PARTICLE_BASE_SIZE: f32 = 0.24;

// Photo quad width in world units; height follows the aspect ratio.
pub const PHOTO_BASE_WIDTH: f32 = 2.0;
