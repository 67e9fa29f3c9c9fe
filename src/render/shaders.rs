//! Embedded WGSL sources. The `FrameUniforms` struct in each module must
//! stay in sync with [`super::uniforms::FrameUniforms`].

/// Scene shader: one vertex entry point, one fragment entry point per
/// shading mode.
pub(crate) const SCENE_SHADER: &str = r#"
struct FrameUniforms {
    model: mat4x4<f32>,
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    model_view: mat4x4<f32>,
    model_view_projection: mat4x4<f32>,
    inverse_model_view: mat4x4<f32>,
    inverse_model_view_projection: mat4x4<f32>,
    normal: mat4x4<f32>,
    light_direction: vec4<f32>,
    eye_direction: vec4<f32>,
    time: vec4<f32>,
    sin_time: vec4<f32>,
    cos_time: vec4<f32>,
    random: vec4<f32>,
    texture_size: vec4<f32>,
}

struct MaterialConstants {
    tint: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> frame: FrameUniforms;

@group(1) @binding(0)
var<uniform> material: MaterialConstants;

@group(2) @binding(0)
var base_texture: texture_2d<f32>;
@group(2) @binding(1)
var base_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) uv: vec2<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var output: VertexOutput;
    output.position = frame.model_view_projection * vec4<f32>(input.position, 1.0);
    // The view matrix is a pure translation, so view-space directions match
    // world-space ones and the light direction needs no extra transform.
    output.normal = normalize((frame.normal * vec4<f32>(input.normal, 0.0)).xyz);
    output.uv = input.uv;
    return output;
}

fn diffuse_term(normal: vec3<f32>) -> f32 {
    let ambient = 0.15;
    return ambient + max(dot(normal, frame.light_direction.xyz), 0.0);
}

fn sky_color(direction: vec3<f32>) -> vec3<f32> {
    let zenith = vec3<f32>(0.18, 0.32, 0.56);
    let horizon = vec3<f32>(0.82, 0.74, 0.62);
    let ground = vec3<f32>(0.22, 0.18, 0.15);
    let t = clamp(direction.y, -1.0, 1.0);
    return select(mix(horizon, ground, -t), mix(horizon, zenith, t), t >= 0.0);
}

fn dither() -> f32 {
    return (frame.random.x - 0.5) / 255.0;
}

@fragment
fn fs_textured(input: VertexOutput) -> @location(0) vec4<f32> {
    let base = textureSample(base_texture, base_sampler, input.uv).rgb;
    let normal = normalize(input.normal);
    let color = base * material.tint.rgb * diffuse_term(normal) + dither();
    return vec4<f32>(color, 1.0);
}

@fragment
fn fs_diffuse(input: VertexOutput) -> @location(0) vec4<f32> {
    let normal = normalize(input.normal);
    let color = material.tint.rgb * diffuse_term(normal) + dither();
    return vec4<f32>(color, 1.0);
}

@fragment
fn fs_reflective(input: VertexOutput) -> @location(0) vec4<f32> {
    let normal = normalize(input.normal);
    let reflected = reflect(-frame.eye_direction.xyz, normal);
    let shimmer = 0.9 + 0.1 * frame.sin_time.x;
    let color = mix(
        material.tint.rgb * diffuse_term(normal),
        sky_color(reflected) * shimmer,
        0.65,
    ) + dither();
    return vec4<f32>(color, 1.0);
}

@fragment
fn fs_normals(input: VertexOutput) -> @location(0) vec4<f32> {
    let normal = normalize(input.normal);
    return vec4<f32>(normal * 0.5 + vec3<f32>(0.5), 1.0);
}
"#;

/// Skybox shader: fullscreen triangle unprojected through the inverse
/// model-view-projection so the sky counter-rotates against the model.
pub(crate) const SKYBOX_SHADER: &str = r#"
struct FrameUniforms {
    model: mat4x4<f32>,
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    model_view: mat4x4<f32>,
    model_view_projection: mat4x4<f32>,
    inverse_model_view: mat4x4<f32>,
    inverse_model_view_projection: mat4x4<f32>,
    normal: mat4x4<f32>,
    light_direction: vec4<f32>,
    eye_direction: vec4<f32>,
    time: vec4<f32>,
    sin_time: vec4<f32>,
    cos_time: vec4<f32>,
    random: vec4<f32>,
    texture_size: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> frame: FrameUniforms;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) ndc: vec2<f32>,
}

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VertexOutput {
    var corners = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );
    var output: VertexOutput;
    output.ndc = corners[index];
    output.position = vec4<f32>(corners[index], 1.0, 1.0);
    return output;
}

fn sky_color(direction: vec3<f32>) -> vec3<f32> {
    let zenith = vec3<f32>(0.18, 0.32, 0.56);
    let horizon = vec3<f32>(0.82, 0.74, 0.62);
    let ground = vec3<f32>(0.22, 0.18, 0.15);
    let t = clamp(direction.y, -1.0, 1.0);
    return select(mix(horizon, ground, -t), mix(horizon, zenith, t), t >= 0.0);
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let near = frame.inverse_model_view_projection * vec4<f32>(input.ndc, 0.0, 1.0);
    let far = frame.inverse_model_view_projection * vec4<f32>(input.ndc, 1.0, 1.0);
    let direction = normalize(far.xyz / far.w - near.xyz / near.w);
    // Sun disk where the ray lines up with the orbiting light.
    let sun = pow(max(dot(direction, frame.light_direction.xyz), 0.0), 256.0);
    let color = sky_color(direction) + vec3<f32>(1.0, 0.95, 0.8) * sun;
    return vec4<f32>(color, 1.0);
}
"#;

/// Blit shader: samples the offscreen color target onto the surface with a
/// fullscreen triangle.
pub(crate) const BLIT_SHADER: &str = r#"
@group(0) @binding(0)
var scene_texture: texture_2d<f32>;
@group(0) @binding(1)
var scene_sampler: sampler;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VertexOutput {
    var corners = array<vec2<f32>, 3>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(3.0, -1.0),
        vec2<f32>(-1.0, 3.0),
    );
    var output: VertexOutput;
    let corner = corners[index];
    output.position = vec4<f32>(corner, 0.0, 1.0);
    output.uv = vec2<f32>(corner.x * 0.5 + 0.5, 0.5 - corner.y * 0.5);
    return output;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(scene_texture, scene_sampler, input.uv);
}
"#;
