// Hand gesture classification.
//
// Turns one hand-landmark sample (21 normalized 3D points, MediaPipe hand
// ordering) into a discrete gesture plus a continuous palm position. The
// classifier is stateless: the same sample always produces the same
// gesture, so it can be tested in isolation from video timing.

use glam::{Vec2, Vec3};

/// Number of landmarks in one hand sample.
pub const LANDMARK_COUNT: usize = 21;

// Landmark indices used by the classifier (MediaPipe hand ordering).
pub const WRIST: usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_TIP: usize = 8;
pub const PALM_CENTER: usize = 9;
pub const MIDDLE_TIP: usize = 12;
pub const RING_TIP: usize = 16;
pub const PINKY_TIP: usize = 20;

// Non-thumb fingertips averaged for the open/fist spread measure.
const FINGERTIPS: [usize; 4] = [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// One detected hand: 21 landmarks with x,y normalized to [0,1] and z as
/// relative depth. Produced at video cadence and consumed immediately.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandSample {
    pub landmarks: [Vec3; LANDMARK_COUNT],
}

impl HandSample {
    /// Build a sample from a flat `[x0, y0, z0, x1, y1, z1, ..]` buffer as
    /// delivered over the perception boundary. Returns `None` unless the
    /// buffer holds exactly 21 points.
    pub fn from_flat(values: &[f32]) -> Option<Self> {
        if values.len() != LANDMARK_COUNT * 3 {
            return None;
        }
        let mut landmarks = [Vec3::ZERO; LANDMARK_COUNT];
        for (i, chunk) in values.chunks_exact(3).enumerate() {
            landmarks[i] = Vec3::new(chunk[0], chunk[1], chunk[2]);
        }
        Some(Self { landmarks })
    }
}

/// Distance thresholds in normalized hand-scale units.
///
/// Tuned empirically for a webcam at arm's length. Treated as
/// configuration rather than hard-coded so alternate camera setups can
/// retune without touching the classifier.
#[derive(Clone, Copy, Debug)]
pub struct ClassifierConfig {
    /// Thumb-tip to index-tip distance below which the hand is pinching.
    pub pinch_max_dist: f32,
    /// Mean wrist-to-fingertip spread below which the hand is a fist.
    pub fist_spread_max: f32,
    /// Mean wrist-to-fingertip spread above which the hand is open.
    pub open_spread_min: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            pinch_max_dist: 0.05,
            fist_spread_max: 0.25,
            open_spread_min: 0.4,
        }
    }
}

/// Classified gesture for one sample.
///
/// At most one of `fist`/`open`/`pinch` is set; `palm` is a continuous
/// control signal reported regardless of which (if any) gesture is active.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gesture {
    pub fist: bool,
    pub open: bool,
    pub pinch: bool,
    pub palm: Vec2,
}

impl Gesture {
    /// The "no input" gesture: nothing active, palm centered. Downstream
    /// consumers never special-case hand absence.
    pub fn neutral() -> Self {
        Self {
            fist: false,
            open: false,
            pinch: false,
            palm: Vec2::splat(0.5),
        }
    }
}

impl Default for Gesture {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Classify one sample, or the absence of one.
///
/// Tie-breaking when thresholds overlap: fist suppresses pinch (a closed
/// hand usually brings thumb and index within pinch distance), and pinch
/// suppresses open, so the three flags are mutually exclusive.
pub fn classify(sample: Option<&HandSample>, cfg: &ClassifierConfig) -> Gesture {
    let Some(hand) = sample else {
        return Gesture::neutral();
    };
    let lm = &hand.landmarks;

    let spread = FINGERTIPS
        .iter()
        .map(|&i| lm[WRIST].distance(lm[i]))
        .sum::<f32>()
        / FINGERTIPS.len() as f32;
    let fist = spread < cfg.fist_spread_max;

    let pinch_dist = lm[THUMB_TIP].distance(lm[INDEX_TIP]);
    let pinch = pinch_dist < cfg.pinch_max_dist && !fist;

    let open = spread > cfg.open_spread_min && !pinch;

    Gesture {
        fist,
        open,
        pinch,
        palm: lm[PALM_CENTER].truncate(),
    }
}
