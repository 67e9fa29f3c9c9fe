use bytemuck::{Pod, Zeroable};

use crate::camera::FrameTransforms;

/// Per-frame uniform bundle uploaded verbatim to the GPU.
///
/// Every shader stage reads from this one block; the layout matches the WGSL
/// `FrameUniforms` struct field for field (mat4x4 and vec4 members only, so
/// no padding is needed between them).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub model_view: [[f32; 4]; 4],
    pub model_view_projection: [[f32; 4]; 4],
    pub inverse_model_view: [[f32; 4]; 4],
    pub inverse_model_view_projection: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    /// Unit light direction, w unused.
    pub light_direction: [f32; 4],
    /// Unit eye direction, w unused.
    pub eye_direction: [f32; 4],
    /// Elapsed seconds broadcast to all four lanes.
    pub time: [f32; 4],
    /// sin(t) at 1x, 2x, 4x and 8x frequency.
    pub sin_time: [f32; 4],
    /// cos(t) at 1x, 2x, 4x and 8x frequency.
    pub cos_time: [f32; 4],
    /// Uniform random values in [0, 1), refreshed every frame for
    /// shader-side dithering.
    pub random: [f32; 4],
    /// Reserved, zero-filled.
    pub texture_size: [f32; 4],
}

// Catch CPU/GPU layout mismatches at compile time.
const _: () = assert!(std::mem::size_of::<FrameUniforms>() == 8 * 64 + 7 * 16);

impl FrameUniforms {
    /// Packs a frame's transforms into the GPU layout, filling in the
    /// time-derived and random lanes.
    pub fn pack(transforms: &FrameTransforms) -> Self {
        let t = transforms.elapsed_seconds;
        Self {
            model: transforms.model.to_cols_array_2d(),
            view: transforms.view.to_cols_array_2d(),
            projection: transforms.projection.to_cols_array_2d(),
            model_view: transforms.model_view.to_cols_array_2d(),
            model_view_projection: transforms.model_view_projection.to_cols_array_2d(),
            inverse_model_view: transforms.inverse_model_view.to_cols_array_2d(),
            inverse_model_view_projection: transforms
                .inverse_model_view_projection
                .to_cols_array_2d(),
            normal: transforms.normal.to_cols_array_2d(),
            light_direction: transforms.light_direction.extend(0.0).into(),
            eye_direction: transforms.eye_direction.extend(0.0).into(),
            time: [t; 4],
            sin_time: [t.sin(), (2.0 * t).sin(), (4.0 * t).sin(), (8.0 * t).sin()],
            cos_time: [t.cos(), (2.0 * t).cos(), (4.0 * t).cos(), (8.0 * t).cos()],
            random: [
                rand::random(),
                rand::random(),
                rand::random(),
                rand::random(),
            ],
            texture_size: [0.0; 4],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{CameraConfig, OrbitCamera};

    fn sample_uniforms(elapsed: f32) -> FrameUniforms {
        let camera = OrbitCamera::new(CameraConfig::default()).unwrap();
        let transforms = camera.frame_transforms(800.0, 600.0, elapsed).unwrap();
        FrameUniforms::pack(&transforms)
    }

    #[test]
    fn time_lanes_follow_frequency_multipliers() {
        let t = 1.3_f32;
        let uniforms = sample_uniforms(t);
        assert_eq!(uniforms.time, [t; 4]);
        let expected_sin = [t.sin(), (2.0 * t).sin(), (4.0 * t).sin(), (8.0 * t).sin()];
        let expected_cos = [t.cos(), (2.0 * t).cos(), (4.0 * t).cos(), (8.0 * t).cos()];
        for lane in 0..4 {
            assert!((uniforms.sin_time[lane] - expected_sin[lane]).abs() < 1e-6);
            assert!((uniforms.cos_time[lane] - expected_cos[lane]).abs() < 1e-6);
        }
    }

    #[test]
    fn random_lanes_stay_in_unit_range() {
        for _ in 0..16 {
            let uniforms = sample_uniforms(0.0);
            for value in uniforms.random {
                assert!((0.0..1.0).contains(&value));
            }
        }
    }

    #[test]
    fn reserved_lanes_are_zeroed() {
        let uniforms = sample_uniforms(2.0);
        assert_eq!(uniforms.texture_size, [0.0; 4]);
        assert_eq!(uniforms.light_direction[3], 0.0);
        assert_eq!(uniforms.eye_direction[3], 0.0);
    }

    #[test]
    fn matrices_round_trip_through_the_layout() {
        let camera = OrbitCamera::new(CameraConfig::default()).unwrap();
        let transforms = camera.frame_transforms(800.0, 600.0, 0.5).unwrap();
        let uniforms = FrameUniforms::pack(&transforms);
        assert_eq!(uniforms.model, transforms.model.to_cols_array_2d());
        assert_eq!(
            uniforms.model_view_projection,
            transforms.model_view_projection.to_cols_array_2d()
        );
    }
}
