// GlyphScene
// copyright glyphscene contributors 2023～2026

//! GlyphScene is a 2d text-first scene renderer: a glyph atlas with lazy
//! Unicode caching and fallback fonts, a batched primitive renderer over
//! OpenGL, a smoothed camera, and multi-pass screen effects (text glow,
//! background blur, CRT warp).
//!
//! The crate is windowing-agnostic.  The embedder creates the GL context
//! (any `glow::Context`), hands it to [`render::GpuContext`], and drives
//! frames itself:
//!
//! ```no_run
//! use glyph_scene::config::RenderConfig;
//! use glyph_scene::glyph::RenderFontContext;
//! use glyph_scene::render::GpuContext;
//! use glyph_scene::util::{ScreenDimensions, Vec2f, hex_to_vec4f};
//!
//! # fn demo(gl: glow::Context) -> Result<(), String> {
//! let config = RenderConfig::load("config.toml")?;
//! let mut gpu = GpuContext::new(gl, ScreenDimensions::new(1280, 720))?;
//! let mut renderer = gpu.create_renderer();
//! let mut fonts = RenderFontContext::from_config(&config)?;
//! fonts.populate(&mut gpu)?;
//!
//! renderer.draw_background(&mut gpu, hex_to_vec4f(0x1E1E2EFF));
//! renderer.set_shader(&mut gpu, glyph_scene::render::FragShader::Text);
//! fonts.bind_glyph_texture(&mut gpu);
//! fonts.render_text(
//!     &mut renderer,
//!     &mut gpu,
//!     "hello",
//!     Vec2f::new(0.0, 0.0),
//!     hex_to_vec4f(0xCDD6F4FF),
//! );
//! renderer.flush(&mut gpu);
//! # Ok(())
//! # }
//! ```

pub mod codepoint;
pub mod config;
pub mod feed;
pub mod glyph;
pub mod log;
pub mod render;
pub mod util;
