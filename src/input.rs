use glam::{Vec2, Vec3};
use smallvec::SmallVec;
use web_sys as web;

/// Ray/sphere intersection: nearest non-negative `t` along the ray, or
/// `None` on a miss.
#[inline]
pub fn ray_sphere(ray_origin: Vec3, ray_dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray_origin - center;
    let b = oc.dot(ray_dir);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    (t >= 0.0).then_some(t)
}

/// Bounding-sphere radius of a photo quad `base_width * aspect` wide and
/// `base_width` tall at the given uniform scale: the quad's half-diagonal,
/// so no point inside the drawn quad falls outside its pick sphere.
#[inline]
pub fn photo_bounding_radius(base_width: f32, aspect: f32, scale: f32) -> f32 {
    0.5 * base_width * scale * (aspect * aspect + 1.0).sqrt()
}

/// Nearest hit along the ray over a candidate set of bounding spheres.
///
/// Returns the candidate index and hit distance. Empty candidate sets and
/// all-miss rays yield `None`; ties on distance go to the lower index.
pub fn pick_nearest(
    ray_origin: Vec3,
    ray_dir: Vec3,
    centers: &[Vec3],
    radii: &[f32],
) -> Option<(usize, f32)> {
    let mut hits: SmallVec<[(usize, f32); 4]> = SmallVec::new();
    for (i, (&center, &radius)) in centers.iter().zip(radii.iter()).enumerate() {
        if let Some(t) = ray_sphere(ray_origin, ray_dir, center, radius) {
            hits.push((i, t));
        }
    }
    hits.into_iter()
        .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
}

// ---------------- Pointer helpers ----------------

/// Pointer position in canvas backing-store pixel coordinates.
#[inline]
pub fn pointer_canvas_px(ev: &web::PointerEvent, canvas: &web::HtmlCanvasElement) -> Vec2 {
    let rect = canvas.get_bounding_client_rect();
    let x_css = ev.client_x() as f32 - rect.left() as f32;
    let y_css = ev.client_y() as f32 - rect.top() as f32;
    let sx = (x_css / rect.width().max(1.0) as f32) * canvas.width() as f32;
    let sy = (y_css / rect.height().max(1.0) as f32) * canvas.height() as f32;
    Vec2::new(sx, sy)
}
