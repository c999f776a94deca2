// GlyphScene
// copyright glyphscene contributors 2023～2026

//! GPU rendering: vertex batching, the shader matrix, offscreen surfaces,
//! the smoothed camera and the multi-pass screen effects.

pub mod camera;
pub mod effect;
pub mod scene;
pub mod shader;
pub mod shader_source;
pub mod texture;
pub mod vertex;
pub mod viewport;

pub use camera::{Camera, CameraT, MAX_CAMERA_ZOOM, SHADER_SCALE_FACTOR};
pub use scene::{BlendMode, FramebufferTarget, GpuContext, SceneRenderer};
pub use shader_source::{FragShader, VertShader};
pub use texture::PoolHandle;
pub use viewport::{RenderViewport, ScissorRegion};
