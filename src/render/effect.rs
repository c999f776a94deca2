// GlyphScene
// copyright glyphscene contributors 2023～2026

//! Multi-pass screen effects built from framebuffer layers: a two-pass
//! separable blur feeding either a glow composite or a plain background
//! blur, plus a glow variant that runs against a pooled render texture.

use crate::render::scene::{BlendMode, FramebufferTarget, GpuContext, SceneRenderer};
use crate::render::shader_source::{FragShader, VertShader};
use crate::render::texture::PoolHandle;
use crate::render::viewport::RenderViewport;
use crate::util::Vec4f;

/// Total uv distance covered by the blur kernel.
const BLUR_FALLOFF: f32 = 0.03;
/// Blur samples either side of center for the glow.
const GLOW_TAPS: f32 = 8.0;
/// The background blur is cheaper.
const BACKGROUND_TAPS: f32 = 4.0;

const TRANSPARENT: Vec4f = Vec4f::new(0.0, 0.0, 0.0, 0.0);

/// One blur layer: `src` through `frag` into `dest` with the kernel
/// parameters applied.
fn blur_pass(
    renderer: &mut SceneRenderer,
    gpu: &mut GpuContext,
    src: FramebufferTarget,
    dest: Option<FramebufferTarget>,
    frag: FragShader,
    taps: f32,
) {
    gpu.bind_framebuffer(dest);
    gpu.clear(TRANSPARENT);
    gpu.set_blend_mode(BlendMode::PremultipliedAlpha);
    renderer.set_shader(gpu, frag);
    renderer.set_custom_float_value1(gpu, BLUR_FALLOFF);
    renderer.set_custom_float_value2(gpu, taps);
    renderer.render_framebuffer(gpu, src);
}

/// Blooms `src` and composites the result onto `dest` without clearing it.
///
/// The blurred copy ping-pongs through both scratch buffers, then the
/// original is blended over its own glow before the combined image lands
/// on `dest`.
pub fn text_glow(
    renderer: &mut SceneRenderer,
    gpu: &mut GpuContext,
    src: FramebufferTarget,
    dest: Option<FramebufferTarget>,
) {
    renderer.apply_viewport(gpu, RenderViewport::full_screen(gpu.screen()));
    renderer.set_vert_shader(VertShader::NoTransform);

    blur_pass(
        renderer,
        gpu,
        src,
        Some(FramebufferTarget::Scratch1),
        FragShader::BlurVert,
        GLOW_TAPS,
    );
    blur_pass(
        renderer,
        gpu,
        FramebufferTarget::Scratch1,
        Some(FramebufferTarget::Scratch2),
        FragShader::BlurHoriz,
        GLOW_TAPS,
    );

    gpu.enable_prev_pass(FramebufferTarget::Scratch2);
    renderer.render_framebuffer_layer(
        gpu,
        src,
        Some(FramebufferTarget::Scratch1),
        FragShader::BasicTextureBlend,
    );

    renderer.reset_viewport(gpu);
    renderer.render_framebuffer_layer_noclear(
        gpu,
        FramebufferTarget::Scratch1,
        dest,
        FragShader::Image,
    );
}

/// Blurs `src` into `dest`, replacing its contents.
pub fn blur_background(
    renderer: &mut SceneRenderer,
    gpu: &mut GpuContext,
    src: FramebufferTarget,
    dest: Option<FramebufferTarget>,
) {
    renderer.apply_viewport(gpu, RenderViewport::full_screen(gpu.screen()));
    renderer.set_vert_shader(VertShader::NoTransform);

    blur_pass(
        renderer,
        gpu,
        src,
        Some(FramebufferTarget::Scratch1),
        FragShader::BlurVert,
        BACKGROUND_TAPS,
    );
    blur_pass(
        renderer,
        gpu,
        FramebufferTarget::Scratch1,
        Some(FramebufferTarget::Scratch2),
        FragShader::BlurHoriz,
        BACKGROUND_TAPS,
    );

    renderer.reset_viewport(gpu);
    renderer.render_framebuffer_layer(gpu, FramebufferTarget::Scratch2, dest, FragShader::Image);
}

/// Glow variant for a pooled render texture: blurs the texture's contents
/// through the scratch buffers and writes the composite back into the
/// texture.
pub fn apply_text_glow_to(
    renderer: &mut SceneRenderer,
    gpu: &mut GpuContext,
    target: PoolHandle,
) {
    // The texture's pixels use corner-origin coordinates.
    renderer.set_vert_shader(VertShader::OneOneTransform);
    gpu.bind_framebuffer(Some(FramebufferTarget::Scratch1));
    gpu.clear(TRANSPARENT);
    gpu.set_blend_mode(BlendMode::PremultipliedAlpha);
    renderer.set_shader(gpu, FragShader::BlurVert);
    renderer.set_custom_float_value1(gpu, BLUR_FALLOFF);
    renderer.set_custom_float_value2(gpu, GLOW_TAPS);
    renderer.render_render_texture(gpu, target);

    renderer.set_vert_shader(VertShader::NoTransform);
    blur_pass(
        renderer,
        gpu,
        FramebufferTarget::Scratch1,
        Some(FramebufferTarget::Scratch2),
        FragShader::BlurHoriz,
        GLOW_TAPS,
    );

    gpu.set_blend_mode(BlendMode::PremultipliedAlpha);
    gpu.bind_framebuffer(Some(FramebufferTarget::Scratch1));
    gpu.clear(TRANSPARENT);
    renderer.set_vert_shader(VertShader::OneOneTransform);
    renderer.set_shader(gpu, FragShader::Image);
    renderer.render_render_texture(gpu, target);

    gpu.enable_prev_pass(FramebufferTarget::Scratch2);
    renderer.render_framebuffer_to_render_texture(
        gpu,
        FramebufferTarget::Scratch1,
        target,
        FragShader::BasicTextureBlend,
    );
}
