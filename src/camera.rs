use std::f32::consts::{FRAC_PI_3, PI, TAU};

use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Conversion factor from dragged mouse pixels to radians of orbit.
pub const DRAG_SCALE: f32 = 0.004;

/// Resting offset of the camera from the model origin. The model rotates in
/// place; the camera itself never changes orientation.
const CAMERA_OFFSET: Vec3 = Vec3::new(0.0, -5.0, -25.0);

/// Model placement hooks. The viewer keeps the model at the origin with unit
/// scale; both stay in the matrix chain so non-trivial values slot in later.
const MODEL_POSITION: Vec3 = Vec3::ZERO;
const MODEL_SCALE: f32 = 1.0;

/// Constant upward bias of the orbiting light direction.
const LIGHT_HEIGHT: f32 = 0.3;

/// Degenerate numeric configuration detected while deriving frame transforms.
///
/// These are configuration bugs, not recoverable conditions: the caller gets
/// a typed error instead of NaN-filled matrices reaching the GPU.
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("viewport dimensions must be finite and positive, got {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },
    #[error("clip planes must satisfy 0 < near < far, got near={near} far={far}")]
    InvalidClipPlanes { near: f32, far: f32 },
    #[error("vertical field of view must lie in (0, pi), got {0}")]
    InvalidFov(f32),
    #[error("elapsed time must be finite, got {0}")]
    InvalidTime(f32),
    #[error("{0} matrix is not invertible")]
    SingularMatrix(&'static str),
}

/// Projection parameters for the viewer camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Vertical field of view in radians.
    pub fovy: f32,
    /// Near clip plane distance.
    pub near: f32,
    /// Far clip plane distance.
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fovy: FRAC_PI_3,
            near: 0.1,
            far: 200.0,
        }
    }
}

impl CameraConfig {
    /// Checks the `0 < near < far` and FOV range invariants.
    pub fn validate(&self) -> Result<(), CameraError> {
        if !self.near.is_finite() || !self.far.is_finite() || self.near <= 0.0 || self.far <= self.near {
            return Err(CameraError::InvalidClipPlanes {
                near: self.near,
                far: self.far,
            });
        }
        if !self.fovy.is_finite() || self.fovy <= 0.0 || self.fovy >= PI {
            return Err(CameraError::InvalidFov(self.fovy));
        }
        Ok(())
    }
}

/// Orbit camera driven by accumulated mouse drag and scroll input.
///
/// Input callbacks feed [`accumulate_drag`](Self::accumulate_drag) and
/// [`set_zoom`](Self::set_zoom); the frame loop calls
/// [`frame_transforms`](Self::frame_transforms) once per frame to derive
/// every matrix the renderer uploads.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    yaw: f32,
    pitch: f32,
    zoom: f32,
    config: CameraConfig,
}

impl OrbitCamera {
    pub fn new(config: CameraConfig) -> Result<Self, CameraError> {
        config.validate()?;
        Ok(Self {
            yaw: 0.0,
            pitch: 0.0,
            zoom: 0.0,
            config,
        })
    }

    /// Adds a mouse drag delta (in pixels) to the accumulated orbit angles.
    ///
    /// Angles are reduced modulo a full turn only once their magnitude
    /// exceeds one, so short drags keep their exact accumulated value while
    /// long sessions cannot drift into float precision loss.
    pub fn accumulate_drag(&mut self, dx: f32, dy: f32) {
        self.yaw = wrap_angle(self.yaw + dx * DRAG_SCALE);
        self.pitch = wrap_angle(self.pitch + dy * DRAG_SCALE);
    }

    /// Adjusts the camera distance offset additively. Positive deltas move
    /// the camera toward the model.
    pub fn set_zoom(&mut self, delta: f32) {
        self.zoom += delta;
    }

    /// Accumulated horizontal orbit angle in radians.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Accumulated vertical orbit angle in radians.
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Accumulated zoom offset.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Unit vector from the model toward the viewer, used by reflective
    /// shading. Derived from the orbit angles by spherical conversion.
    pub fn eye_direction(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.sin(),
            self.pitch.cos(),
            self.yaw.sin() * (-self.pitch).sin(),
        )
        .normalize()
    }

    /// Derives the full transform bundle for one frame.
    pub fn frame_transforms(
        &self,
        viewport_width: f32,
        viewport_height: f32,
        elapsed_seconds: f32,
    ) -> Result<FrameTransforms, CameraError> {
        if !viewport_width.is_finite()
            || !viewport_height.is_finite()
            || viewport_width <= 0.0
            || viewport_height <= 0.0
        {
            return Err(CameraError::InvalidViewport {
                width: viewport_width,
                height: viewport_height,
            });
        }
        if !elapsed_seconds.is_finite() {
            return Err(CameraError::InvalidTime(elapsed_seconds));
        }
        self.config.validate()?;

        let aspect = viewport_width / viewport_height;

        // Vertical drag tilts about world X first, then horizontal drag spins
        // about world Y: combined matrix is Ry * Rx.
        let rotation =
            rotation_about_axis(self.yaw, Vec3::Y) * rotation_about_axis(self.pitch, Vec3::X);
        let model = Mat4::from_translation(MODEL_POSITION)
            * rotation
            * Mat4::from_scale(Vec3::splat(MODEL_SCALE));
        let view = Mat4::from_translation(CAMERA_OFFSET + Vec3::new(0.0, 0.0, self.zoom));
        let projection = perspective_projection(
            self.config.near,
            self.config.far,
            aspect,
            self.config.fovy,
        );

        let model_view = view * model;
        let model_view_projection = projection * model_view;
        let inverse_model_view = checked_inverse(model_view, "model-view")?;
        let inverse_model_view_projection =
            checked_inverse(model_view_projection, "model-view-projection")?;
        let normal = strip_translation(inverse_model_view.transpose());

        Ok(FrameTransforms {
            model,
            view,
            projection,
            model_view,
            model_view_projection,
            inverse_model_view,
            inverse_model_view_projection,
            normal,
            light_direction: light_direction(elapsed_seconds),
            eye_direction: self.eye_direction(),
            elapsed_seconds,
        })
    }
}

/// Per-frame transform bundle consumed by the renderer.
///
/// Recomputed fresh every frame; nothing here outlives a single frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTransforms {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    pub model_view: Mat4,
    pub model_view_projection: Mat4,
    pub inverse_model_view: Mat4,
    pub inverse_model_view_projection: Mat4,
    /// Inverse-transpose of model-view with translation zeroed; transforms
    /// direction vectors without picking up translation.
    pub normal: Mat4,
    pub light_direction: Vec3,
    pub eye_direction: Vec3,
    pub elapsed_seconds: f32,
}

/// Rotation about an arbitrary unit axis via the Rodrigues closed form.
pub fn rotation_about_axis(angle: f32, axis: Vec3) -> Mat4 {
    let (s, c) = angle.sin_cos();
    let omc = 1.0 - c;
    let Vec3 { x, y, z } = axis;
    Mat4::from_cols(
        Vec4::new(c + x * x * omc, x * y * omc + z * s, x * z * omc - y * s, 0.0),
        Vec4::new(x * y * omc - z * s, c + y * y * omc, y * z * omc + x * s, 0.0),
        Vec4::new(x * z * omc + y * s, y * z * omc - x * s, c + z * z * omc, 0.0),
        Vec4::W,
    )
}

/// Right-handed perspective projection with the W row carrying -Z for the
/// perspective divide.
pub fn perspective_projection(near: f32, far: f32, aspect: f32, fovy: f32) -> Mat4 {
    let scale_y = 1.0 / (fovy * 0.5).tan();
    let scale_x = scale_y / aspect;
    let scale_z = -(far + near) / (far - near);
    let scale_w = -2.0 * far * near / (far - near);
    Mat4::from_cols(
        Vec4::new(scale_x, 0.0, 0.0, 0.0),
        Vec4::new(0.0, scale_y, 0.0, 0.0),
        Vec4::new(0.0, 0.0, scale_z, -1.0),
        Vec4::new(0.0, 0.0, scale_w, 0.0),
    )
}

/// Slowly orbiting light direction with a constant upward bias. Sweeps a full
/// circle roughly every 2*pi^2 seconds.
pub fn light_direction(elapsed_seconds: f32) -> Vec3 {
    let phase = elapsed_seconds / PI;
    Vec3::new(phase.sin(), LIGHT_HEIGHT, phase.cos()).normalize()
}

fn wrap_angle(angle: f32) -> f32 {
    if angle.abs() > TAU {
        angle % TAU
    } else {
        angle
    }
}

fn checked_inverse(matrix: Mat4, what: &'static str) -> Result<Mat4, CameraError> {
    let det = matrix.determinant();
    if det == 0.0 || !det.is_finite() {
        return Err(CameraError::SingularMatrix(what));
    }
    let inverse = matrix.inverse();
    if !inverse.is_finite() {
        return Err(CameraError::SingularMatrix(what));
    }
    Ok(inverse)
}

fn strip_translation(matrix: Mat4) -> Mat4 {
    let mut stripped = matrix;
    stripped.x_axis.w = 0.0;
    stripped.y_axis.w = 0.0;
    stripped.z_axis.w = 0.0;
    stripped.w_axis = Vec4::W;
    stripped
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn assert_mat_eq(a: Mat4, b: Mat4) {
        for (lhs, rhs) in a.to_cols_array().iter().zip(b.to_cols_array().iter()) {
            assert!((lhs - rhs).abs() < EPSILON, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn projection_matches_closed_form() {
        let near = 0.1;
        let far = 200.0;
        let aspect = 800.0 / 600.0;
        let fovy = FRAC_PI_3;
        let projection = perspective_projection(near, far, aspect, fovy);

        let scale_y = 1.0 / (fovy * 0.5).tan();
        assert!((projection.y_axis.y - scale_y).abs() < EPSILON);
        assert!((projection.x_axis.x - scale_y / aspect).abs() < EPSILON);
        assert!(projection.to_cols_array().iter().all(|v| v.is_finite()));
        assert_mat_eq(projection, Mat4::perspective_rh_gl(fovy, aspect, near, far));
    }

    #[test]
    fn rodrigues_matches_axis_aligned_rotations() {
        let angle = 0.73;
        assert_mat_eq(
            rotation_about_axis(angle, Vec3::X),
            Mat4::from_rotation_x(angle),
        );
        assert_mat_eq(
            rotation_about_axis(angle, Vec3::Y),
            Mat4::from_rotation_y(angle),
        );
        assert_mat_eq(
            rotation_about_axis(angle, Vec3::Z),
            Mat4::from_rotation_z(angle),
        );
    }

    #[test]
    fn opposite_rotations_cancel() {
        let axis = Vec3::new(1.0, 2.0, -0.5).normalize();
        let product = rotation_about_axis(1.2, axis) * rotation_about_axis(-1.2, axis);
        assert_mat_eq(product, Mat4::IDENTITY);
    }

    #[test]
    fn inverse_round_trips() {
        let mut camera = OrbitCamera::new(CameraConfig::default()).unwrap();
        camera.accumulate_drag(80.0, -45.0);
        camera.set_zoom(3.0);
        let transforms = camera.frame_transforms(1280.0, 720.0, 2.5).unwrap();
        let round_trip = checked_inverse(transforms.inverse_model_view, "round-trip").unwrap();
        assert_mat_eq(round_trip, transforms.model_view);
    }

    #[test]
    fn normal_matrix_has_no_translation() {
        let mut camera = OrbitCamera::new(CameraConfig::default()).unwrap();
        camera.accumulate_drag(150.0, 60.0);
        let transforms = camera.frame_transforms(800.0, 600.0, 1.0).unwrap();
        let normal = transforms.normal;
        assert_eq!(normal.x_axis.w, 0.0);
        assert_eq!(normal.y_axis.w, 0.0);
        assert_eq!(normal.z_axis.w, 0.0);
        assert_eq!(normal.w_axis, Vec4::W);
    }

    #[test]
    fn direction_vectors_stay_unit_length() {
        for step in 0..32 {
            let t = step as f32 * 1.7;
            assert!((light_direction(t).length() - 1.0).abs() < EPSILON);
        }
        let mut camera = OrbitCamera::new(CameraConfig::default()).unwrap();
        for step in 0..32 {
            camera.accumulate_drag(step as f32 * 37.0, step as f32 * -13.0);
            assert!((camera.eye_direction().length() - 1.0).abs() < EPSILON);
        }
    }

    #[test]
    fn rest_pose_matches_fixed_rig() {
        let camera = OrbitCamera::new(CameraConfig::default()).unwrap();
        let transforms = camera.frame_transforms(800.0, 600.0, 0.0).unwrap();
        assert_mat_eq(transforms.model, Mat4::IDENTITY);
        assert_mat_eq(
            transforms.view,
            Mat4::from_translation(Vec3::new(0.0, -5.0, -25.0)),
        );
    }

    #[test]
    fn drag_accumulates_scaled_pixels() {
        let mut camera = OrbitCamera::new(CameraConfig::default()).unwrap();
        camera.accumulate_drag(100.0, 0.0);
        assert!((camera.yaw() - 0.4).abs() < 1e-6);
        assert_eq!(camera.pitch(), 0.0);
    }

    #[test]
    fn long_drags_wrap_short_drags_do_not() {
        let mut camera = OrbitCamera::new(CameraConfig::default()).unwrap();
        camera.accumulate_drag(100.0, 0.0);
        let short = camera.yaw();
        assert!((short - 0.4).abs() < 1e-6);

        for _ in 0..100 {
            camera.accumulate_drag(500.0, 0.0);
        }
        assert!(camera.yaw().abs() <= TAU);
    }

    #[test]
    fn degenerate_configuration_is_an_error() {
        assert!(OrbitCamera::new(CameraConfig {
            fovy: FRAC_PI_3,
            near: 10.0,
            far: 10.0,
        })
        .is_err());
        assert!(OrbitCamera::new(CameraConfig {
            fovy: 0.0,
            ..CameraConfig::default()
        })
        .is_err());

        let camera = OrbitCamera::new(CameraConfig::default()).unwrap();
        assert!(camera.frame_transforms(0.0, 600.0, 0.0).is_err());
        assert!(camera.frame_transforms(f32::NAN, 600.0, 0.0).is_err());
        assert!(camera.frame_transforms(800.0, 600.0, f32::INFINITY).is_err());
    }

    #[test]
    fn zoom_shifts_the_view_translation() {
        let mut camera = OrbitCamera::new(CameraConfig::default()).unwrap();
        camera.set_zoom(4.0);
        let transforms = camera.frame_transforms(800.0, 600.0, 0.0).unwrap();
        assert!((transforms.view.w_axis.z - (-21.0)).abs() < EPSILON);
    }
}
