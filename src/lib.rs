//! Core modules for the capsule viewer.
//!
//! The crate exposes the pieces of the viewer that do not need a window or a
//! GPU: the orbit camera math, OBJ loading, material resolution and input
//! tracking.  The wgpu renderer lives behind the `render` module so that the
//! rest of the code stays testable headless.

pub mod camera;
pub mod input;
pub mod materials;
pub mod obj;
pub mod render;

pub use camera::{CameraConfig, CameraError, FrameTransforms, OrbitCamera};
pub use input::{InputState, KeyCode, MouseButton, NamedKey};
pub use materials::{MaterialDescriptor, MaterialLibrary, ResolvedMaterial, ShadingMode};
pub use obj::{load_obj_from_str, ObjMesh, Submesh};
pub use render::{FrameUniforms, Renderer};
