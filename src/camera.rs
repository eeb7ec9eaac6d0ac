use glam::{Mat4, Vec3, Vec4};
use web_sys as web;

use crate::constants::{CAMERA_EYE, CAMERA_FOVY_DEG, CAMERA_ZFAR, CAMERA_ZNEAR};

#[inline]
pub fn camera_eye() -> Vec3 {
    Vec3::from(CAMERA_EYE)
}

/// View-projection matrix for the fixed scene camera at the given aspect.
pub fn view_proj(aspect: f32) -> Mat4 {
    let proj = Mat4::perspective_rh(
        CAMERA_FOVY_DEG.to_radians(),
        aspect.max(f32::EPSILON),
        CAMERA_ZNEAR,
        CAMERA_ZFAR,
    );
    let view = Mat4::look_at_rh(camera_eye(), Vec3::ZERO, Vec3::Y);
    proj * view
}

/// Compute a world-space ray from canvas backing-store pixel coordinates.
///
/// Returns `(ray_origin, ray_direction)` in world space, unprojected
/// through the same fixed camera the renderer uses.
pub fn screen_to_world_ray(canvas: &web::HtmlCanvasElement, sx: f32, sy: f32) -> (Vec3, Vec3) {
    let width = canvas.width() as f32;
    let height = canvas.height() as f32;
    let ndc_x = (2.0 * sx / width.max(1.0)) - 1.0;
    let ndc_y = 1.0 - (2.0 * sy / height.max(1.0));
    let inv = view_proj(width / height.max(1.0)).inverse();
    let p_far = inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
    let far: Vec3 = p_far.truncate() / p_far.w;
    let ro = camera_eye();
    let rd = (far - ro).normalize();
    (ro, rd)
}
