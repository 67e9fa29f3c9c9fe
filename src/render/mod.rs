//! Two-pass wgpu renderer: scene submeshes and a procedural skybox drawn
//! into an offscreen target, then blitted to the window surface.

pub mod renderer;
pub mod shaders;
pub mod uniforms;

pub use renderer::Renderer;
pub use uniforms::FrameUniforms;
