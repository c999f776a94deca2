// GlyphScene
// copyright glyphscene contributors 2023～2026

//! The GPU context and the scene renderer.
//!
//! [`GpuContext`] owns everything tied to the GL context: the shared
//! vertex buffer, the shader matrix, the three effect framebuffers and the
//! render texture pool.  [`SceneRenderer`] carries per-scene state (camera,
//! resolution, clock) and turns primitives into batched triangles.  Several
//! renderers may share one context, but only one may have unflushed
//! vertices at a time; the batch is claimed on the first primitive and
//! released by flush.

use std::mem;

use glow::{HasContext, PixelUnpackData};

use crate::feed::MessageFeed;
use crate::glyph::{GlyphSink, GlyphTexture, GlyphUpload};
use crate::render::camera::{Camera, SHADER_SCALE_FACTOR};
use crate::render::shader::ShaderMatrix;
use crate::render::shader_source::{FragShader, VertShader};
use crate::render::texture::{FramebufferData, PoolHandle, RenderTextureData, TexturePool};
use crate::render::vertex::{RenderVertex, VertexBatch, VERTEX_CAPACITY};
use crate::render::viewport::{RenderViewport, ScissorRegion, ScissorStack};
use crate::util::{ScreenDimensions, Vec2f, Vec4f};

const WHITE: Vec4f = Vec4f::new(1.0, 1.0, 1.0, 1.0);
const CLEAR: Vec4f = Vec4f::new(0.0, 0.0, 0.0, 0.0);

/// The three fixed offscreen surfaces the effect passes ping-pong between.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FramebufferTarget {
    Scene,
    Scratch1,
    Scratch2,
}

impl FramebufferTarget {
    fn index(self) -> usize {
        match self {
            FramebufferTarget::Scene => 0,
            FramebufferTarget::Scratch1 => 1,
            FramebufferTarget::Scratch2 => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendMode {
    /// Straight alpha over.
    Default,
    /// ONE, ONE_MINUS_SRC_ALPHA; offscreen surfaces carry premultiplied
    /// color.
    PremultipliedAlpha,
    /// Separate alpha factors so destination alpha accumulates.
    SrcAlpha,
}

pub struct GpuContext {
    gl: glow::Context,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    batch: VertexBatch,
    shaders: ShaderMatrix,
    framebuffers: [FramebufferData; 3],
    render_textures: TexturePool<RenderTextureData>,
    screen: ScreenDimensions,
    /// Renderer currently holding unflushed vertices.
    current_writer: Option<u64>,
    next_renderer_id: u64,
    scissor_stack: ScissorStack,
}

impl GpuContext {
    pub fn new(gl: glow::Context, screen: ScreenDimensions) -> Result<Self, String> {
        let stride = mem::size_of::<RenderVertex>() as i32;
        let (vao, vbo) = unsafe {
            let vao = gl.create_vertex_array()?;
            gl.bind_vertex_array(Some(vao));

            let vbo = gl.create_buffer()?;
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_size(
                glow::ARRAY_BUFFER,
                (VERTEX_CAPACITY * stride as usize) as i32,
                glow::STREAM_DRAW,
            );

            gl.vertex_attrib_pointer_f32(0, 2, glow::FLOAT, false, stride, 0);
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(1, 2, glow::FLOAT, false, stride, 8);
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(2, 4, glow::FLOAT, false, stride, 16);
            gl.enable_vertex_attrib_array(2);

            gl.enable(glow::BLEND);
            (vao, vbo)
        };

        let shaders = ShaderMatrix::build(&gl)?;
        let framebuffers = [
            FramebufferData::new(&gl, screen)?,
            FramebufferData::new(&gl, screen)?,
            FramebufferData::new(&gl, screen)?,
        ];

        let mut ctx = Self {
            gl,
            vao,
            vbo,
            batch: VertexBatch::new(),
            shaders,
            framebuffers,
            render_textures: TexturePool::new(),
            screen,
            current_writer: None,
            next_renderer_id: 0,
            scissor_stack: ScissorStack::default(),
        };
        ctx.set_blend_mode(BlendMode::Default);
        Ok(ctx)
    }

    pub fn create_renderer(&mut self) -> SceneRenderer {
        let id = self.next_renderer_id;
        self.next_renderer_id += 1;
        SceneRenderer::new(id, self.screen)
    }

    pub fn screen(&self) -> ScreenDimensions {
        self.screen
    }

    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        unsafe {
            match mode {
                BlendMode::Default => {
                    self.gl
                        .blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
                }
                BlendMode::PremultipliedAlpha => {
                    self.gl.blend_func(glow::ONE, glow::ONE_MINUS_SRC_ALPHA);
                }
                BlendMode::SrcAlpha => {
                    self.gl.blend_func_separate(
                        glow::SRC_ALPHA,
                        glow::ONE_MINUS_SRC_ALPHA,
                        glow::ONE,
                        glow::ONE_MINUS_SRC_ALPHA,
                    );
                }
            }
        }
    }

    /// Binds an offscreen target, or the window surface with `None`.
    pub fn bind_framebuffer(&mut self, target: Option<FramebufferTarget>) {
        unsafe {
            let fb = target.map(|t| self.framebuffers[t.index()].framebuffer);
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, fb);
        }
    }

    /// Binds an offscreen target's color texture to unit 0.
    pub fn bind_framebuffer_texture(&mut self, target: FramebufferTarget) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0);
            self.gl.bind_texture(
                glow::TEXTURE_2D,
                Some(self.framebuffers[target.index()].color),
            );
        }
    }

    /// Exposes a target's color texture on unit 1 as `prev_pass_tex`.
    pub fn enable_prev_pass(&mut self, target: FramebufferTarget) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE1);
            self.gl.bind_texture(
                glow::TEXTURE_2D,
                Some(self.framebuffers[target.index()].color),
            );
            self.gl.active_texture(glow::TEXTURE0);
        }
    }

    pub fn clear(&mut self, color: Vec4f) {
        unsafe {
            self.gl.clear_color(color.x, color.y, color.z, color.w);
            self.gl
                .clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }

    /// Recreates the attachments of all three framebuffers at the new
    /// window size and rebinds the window surface.
    pub fn screen_resize(&mut self, screen: ScreenDimensions) -> Result<(), String> {
        self.screen = screen;
        for fb in &mut self.framebuffers {
            fb.resize(&self.gl, screen)?;
        }
        unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, None);
        }
        Ok(())
    }

    pub fn create_render_texture(&mut self, dim: ScreenDimensions) -> Result<PoolHandle, String> {
        let data = RenderTextureData::new(&self.gl, dim)?;
        Ok(self.render_textures.insert(data))
    }

    /// Recreates a pooled render texture at a new size.  The handle stays
    /// valid; the old GPU resources are freed first.
    pub fn update_render_texture(
        &mut self,
        handle: PoolHandle,
        dim: ScreenDimensions,
    ) -> Result<(), String> {
        let replacement = RenderTextureData::new(&self.gl, dim)?;
        match self.render_textures.get_mut(handle) {
            Some(rt) => {
                let old = mem::replace(rt, replacement);
                old.delete(&self.gl);
                Ok(())
            }
            None => {
                replacement.delete(&self.gl);
                Err("Stale render texture handle".to_string())
            }
        }
    }

    pub fn delete_render_texture(&mut self, handle: PoolHandle) {
        if let Some(data) = self.render_textures.remove(handle) {
            data.delete(&self.gl);
        }
    }

    pub fn render_texture_dim(&self, handle: PoolHandle) -> Option<ScreenDimensions> {
        self.render_textures.get(handle).map(|rt| rt.dim)
    }

    pub fn bind_render_texture_framebuffer(&mut self, handle: PoolHandle) {
        if let Some(rt) = self.render_textures.get(handle) {
            unsafe {
                self.gl
                    .bind_framebuffer(glow::FRAMEBUFFER, Some(rt.framebuffer));
            }
        }
    }

    pub fn bind_render_texture_color(&mut self, handle: PoolHandle) {
        if let Some(rt) = self.render_textures.get(handle) {
            unsafe {
                self.gl.active_texture(glow::TEXTURE0);
                self.gl.bind_texture(glow::TEXTURE_2D, Some(rt.color));
            }
        }
    }

    /// Recompile every shader from the on-disk directory; failure keeps
    /// the current set.  The outcome lands on the feed either way.
    pub fn reload_shaders(&mut self, shader_root: &str, feed: &mut MessageFeed) {
        match self.shaders.reload_from_disk(&self.gl, shader_root) {
            Ok(()) => feed.queue_info("Shaders reloaded."),
            Err(e) => feed.queue_error(e),
        }
    }

    /// RGBA8 texture for embedder-supplied images.
    pub fn create_basic_texture(&mut self, dim: ScreenDimensions) -> Result<glow::Texture, String> {
        crate::render::texture::create_basic_texture(&self.gl, dim)
    }

    pub fn submit_basic_texture_data(
        &mut self,
        texture: glow::Texture,
        offset_x: i32,
        offset_y: i32,
        dim: ScreenDimensions,
        pixels: &[u8],
    ) {
        crate::render::texture::submit_texture_data(&self.gl, texture, offset_x, offset_y, dim, pixels);
    }

    pub fn bind_basic_texture(&mut self, texture: glow::Texture) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        }
    }

    pub fn delete_basic_texture(&mut self, texture: glow::Texture) {
        unsafe {
            self.gl.delete_texture(texture);
        }
    }

    fn claim_writer(&mut self, id: u64) {
        match self.current_writer {
            None => self.current_writer = Some(id),
            Some(owner) => {
                assert_eq!(owner, id, "a different renderer holds unflushed vertices")
            }
        }
    }

    pub fn destroy(mut self) {
        for rt in self.render_textures.drain() {
            rt.delete(&self.gl);
        }
        for fb in &self.framebuffers {
            fb.delete(&self.gl);
        }
        self.shaders.delete_all(&self.gl);
        unsafe {
            self.gl.delete_buffer(self.vbo);
            self.gl.delete_vertex_array(self.vao);
        }
    }
}

/// Glyph bitmaps are single channel; rows are tightly packed.
impl GlyphSink for GpuContext {
    fn create_glyph_texture(&mut self, dim: ScreenDimensions) -> Result<GlyphTexture, String> {
        unsafe {
            let texture = self.gl.create_texture()?;
            self.gl.active_texture(glow::TEXTURE0);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RED as i32,
                dim.width as i32,
                dim.height as i32,
                0,
                glow::RED,
                glow::UNSIGNED_BYTE,
                PixelUnpackData::Slice(None),
            );
            crate::render::texture::set_default_sampling(&self.gl);
            Ok(GlyphTexture(texture))
        }
    }

    fn submit_glyph_data(&mut self, tex: GlyphTexture, entry: GlyphUpload<'_>) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(tex.0));
            self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            self.gl.tex_sub_image_2d(
                glow::TEXTURE_2D,
                0,
                entry.offset_x,
                entry.offset_y,
                entry.width as i32,
                entry.height as i32,
                glow::RED,
                glow::UNSIGNED_BYTE,
                PixelUnpackData::Slice(Some(entry.buffer)),
            );
        }
    }

    fn bind_glyph_texture(&mut self, tex: GlyphTexture) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(tex.0));
        }
    }
}

/// Values for the five custom uniform slots.  The renderer remembers them
/// so a shader switch re-uploads the current values into the new program;
/// otherwise a setter call before the switch would be lost.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct CustomUniforms {
    float1: f32,
    float2: f32,
    vec2_1: Vec2f,
    vec2_2: Vec2f,
    vec2_3: Vec2f,
}

impl CustomUniforms {
    fn floats(&self) -> [(&'static str, f32); 2] {
        [
            ("custom_float_value1", self.float1),
            ("custom_float_value2", self.float2),
        ]
    }

    fn vec2s(&self) -> [(&'static str, Vec2f); 3] {
        [
            ("custom_vec2_value1", self.vec2_1),
            ("custom_vec2_value2", self.vec2_2),
            ("custom_vec2_value3", self.vec2_3),
        ]
    }
}

pub struct SceneRenderer {
    id: u64,
    pub camera: Camera,
    resolution: Vec2f,
    time: f32,
    vert_shader: VertShader,
    frag_shader: FragShader,
    custom: CustomUniforms,
    viewport: RenderViewport,
    saved_viewport: Option<(RenderViewport, Vec2f)>,
}

impl SceneRenderer {
    fn new(id: u64, screen: ScreenDimensions) -> Self {
        Self {
            id,
            camera: Camera::new(),
            resolution: Vec2f::new(screen.width as f32, screen.height as f32),
            time: 0.0,
            vert_shader: VertShader::CameraTransform,
            frag_shader: FragShader::BasicColor,
            custom: CustomUniforms::default(),
            viewport: RenderViewport::full_screen(screen),
            saved_viewport: None,
        }
    }

    pub fn resolution(&self) -> Vec2f {
        self.resolution
    }

    pub fn set_time(&mut self, time: f32) {
        self.time = time;
    }

    pub fn advance_time(&mut self, dt: f32) {
        self.time += dt;
    }

    /// Records the vertex transform used by the next
    /// [`set_shader`](Self::set_shader).
    pub fn set_vert_shader(&mut self, vert: VertShader) {
        self.vert_shader = vert;
    }

    /// Switches to the program for the recorded vertex transform and
    /// `frag`, then uploads the shared uniforms and the remembered custom
    /// slot values.  Locations are fetched fresh each time since the
    /// program just changed.
    pub fn set_shader(&mut self, gpu: &mut GpuContext, frag: FragShader) {
        self.frag_shader = frag;
        let program = gpu.shaders.get(self.vert_shader, frag).program;
        unsafe {
            gpu.gl.use_program(Some(program));
            if let Some(loc) = gpu.gl.get_uniform_location(program, "time") {
                gpu.gl.uniform_1_f32(Some(&loc), self.time);
            }
            if let Some(loc) = gpu.gl.get_uniform_location(program, "resolution") {
                gpu.gl
                    .uniform_2_f32(Some(&loc), self.resolution.x, self.resolution.y);
            }
            if let Some(loc) = gpu.gl.get_uniform_location(program, "camera_coord_factor") {
                gpu.gl.uniform_1_f32(Some(&loc), SHADER_SCALE_FACTOR);
            }
            if let Some(loc) = gpu.gl.get_uniform_location(program, "camera_pos") {
                gpu.gl
                    .uniform_2_f32(Some(&loc), self.camera.pos.x, self.camera.pos.y);
            }
            if let Some(loc) = gpu.gl.get_uniform_location(program, "camera_scale") {
                gpu.gl
                    .uniform_2_f32(Some(&loc), self.camera.scale.x, self.camera.scale.y);
            }
            if let Some(loc) = gpu.gl.get_uniform_location(program, "prev_pass_tex") {
                gpu.gl.uniform_1_i32(Some(&loc), 1);
            }
            for (name, value) in self.custom.floats() {
                if let Some(loc) = gpu.gl.get_uniform_location(program, name) {
                    gpu.gl.uniform_1_f32(Some(&loc), value);
                }
            }
            for (name, value) in self.custom.vec2s() {
                if let Some(loc) = gpu.gl.get_uniform_location(program, name) {
                    gpu.gl.uniform_2_f32(Some(&loc), value.x, value.y);
                }
            }
        }
    }

    fn current_program(&self, gpu: &GpuContext) -> glow::Program {
        gpu.shaders.get(self.vert_shader, self.frag_shader).program
    }

    /// The custom setters record the value and also apply it to the
    /// program bound right now, so either call order around
    /// [`set_shader`](Self::set_shader) works.
    pub fn set_custom_float_value1(&mut self, gpu: &mut GpuContext, value: f32) {
        self.custom.float1 = value;
        self.set_float_uniform(gpu, "custom_float_value1", value);
    }

    pub fn set_custom_float_value2(&mut self, gpu: &mut GpuContext, value: f32) {
        self.custom.float2 = value;
        self.set_float_uniform(gpu, "custom_float_value2", value);
    }

    pub fn set_custom_vec2_value1(&mut self, gpu: &mut GpuContext, value: Vec2f) {
        self.custom.vec2_1 = value;
        self.set_vec2_uniform(gpu, "custom_vec2_value1", value);
    }

    pub fn set_custom_vec2_value2(&mut self, gpu: &mut GpuContext, value: Vec2f) {
        self.custom.vec2_2 = value;
        self.set_vec2_uniform(gpu, "custom_vec2_value2", value);
    }

    pub fn set_custom_vec2_value3(&mut self, gpu: &mut GpuContext, value: Vec2f) {
        self.custom.vec2_3 = value;
        self.set_vec2_uniform(gpu, "custom_vec2_value3", value);
    }

    fn set_float_uniform(&mut self, gpu: &mut GpuContext, name: &str, value: f32) {
        let program = self.current_program(gpu);
        unsafe {
            if let Some(loc) = gpu.gl.get_uniform_location(program, name) {
                gpu.gl.uniform_1_f32(Some(&loc), value);
            }
        }
    }

    fn set_vec2_uniform(&mut self, gpu: &mut GpuContext, name: &str, value: Vec2f) {
        let program = self.current_program(gpu);
        unsafe {
            if let Some(loc) = gpu.gl.get_uniform_location(program, name) {
                gpu.gl.uniform_2_f32(Some(&loc), value.x, value.y);
            }
        }
    }

    fn reserve(&mut self, gpu: &mut GpuContext, verts: usize) {
        gpu.claim_writer(self.id);
        if gpu.batch.would_overflow(verts) {
            self.flush(gpu);
            gpu.claim_writer(self.id);
        }
    }

    /// Uploads and draws everything batched so far, releasing the batch.
    pub fn flush(&mut self, gpu: &mut GpuContext) {
        if gpu.batch.is_empty() {
            gpu.current_writer = None;
            return;
        }
        unsafe {
            gpu.gl.bind_vertex_array(Some(gpu.vao));
            gpu.gl.bind_buffer(glow::ARRAY_BUFFER, Some(gpu.vbo));
            gpu.gl
                .buffer_sub_data_u8_slice(glow::ARRAY_BUFFER, 0, gpu.batch.as_bytes());
            gpu.gl
                .draw_arrays(glow::TRIANGLES, 0, gpu.batch.len() as i32);
        }
        gpu.batch.clear();
        gpu.current_writer = None;
    }

    /// Axis-aligned quad from a top-left corner and a (possibly negative)
    /// size.
    #[allow(clippy::too_many_arguments)]
    pub fn render_quad(
        &mut self,
        gpu: &mut GpuContext,
        position: Vec2f,
        size: Vec2f,
        uv0: Vec2f,
        uv1: Vec2f,
        uv2: Vec2f,
        uv3: Vec2f,
        color: Vec4f,
    ) {
        self.reserve(gpu, 6);
        let p0 = position;
        let p1 = position + Vec2f::new(size.x, 0.0);
        let p2 = position + Vec2f::new(0.0, size.y);
        let p3 = position + size;
        gpu.batch.push_quad(p0, p1, p2, p3, uv0, uv1, uv2, uv3, color);
    }

    /// Filled rectangle.  The uvs span [-1, 1] so the circle shader can
    /// reuse the same geometry.
    pub fn solid_rect(&mut self, gpu: &mut GpuContext, position: Vec2f, size: Vec2f, color: Vec4f) {
        self.render_quad(
            gpu,
            position,
            size,
            Vec2f::new(-1.0, 1.0),
            Vec2f::new(1.0, 1.0),
            Vec2f::new(-1.0, -1.0),
            Vec2f::new(1.0, -1.0),
            color,
        );
    }

    /// Square quad around the center; the fragment shader clips it to a
    /// disc.
    pub fn solid_circle(&mut self, gpu: &mut GpuContext, center: Vec2f, radius: f32, color: Vec4f) {
        self.solid_rect(
            gpu,
            center - Vec2f::splat(radius),
            Vec2f::splat(radius * 2.0),
            color,
        );
    }

    /// Rectangle outline built from four filled bars.
    pub fn strike_rect(
        &mut self,
        gpu: &mut GpuContext,
        position: Vec2f,
        size: Vec2f,
        thickness: f32,
        color: Vec4f,
    ) {
        let t = thickness;
        // Top and bottom span the full width.
        self.solid_rect(gpu, position, Vec2f::new(size.x, t), color);
        self.solid_rect(
            gpu,
            Vec2f::new(position.x, position.y + size.y - t),
            Vec2f::new(size.x, t),
            color,
        );
        // Left and right fill the space between them.
        self.solid_rect(
            gpu,
            Vec2f::new(position.x, position.y + t),
            Vec2f::new(t, size.y - 2.0 * t),
            color,
        );
        self.solid_rect(
            gpu,
            Vec2f::new(position.x + size.x - t, position.y + t),
            Vec2f::new(t, size.y - 2.0 * t),
            color,
        );
    }

    /// Textured quad sampling `uv .. uv + uv_size` of the bound texture.
    pub fn render_image(
        &mut self,
        gpu: &mut GpuContext,
        position: Vec2f,
        size: Vec2f,
        uv: Vec2f,
        uv_size: Vec2f,
        color: Vec4f,
    ) {
        self.render_quad(
            gpu,
            position,
            size,
            uv,
            uv + Vec2f::new(uv_size.x, 0.0),
            uv + Vec2f::new(0.0, uv_size.y),
            uv + uv_size,
            color,
        );
    }

    /// Smoothed line segment, drawn immediately rather than batched.
    pub fn line(&mut self, gpu: &mut GpuContext, from: Vec2f, to: Vec2f, width: f32, color: Vec4f) {
        self.flush(gpu);
        gpu.claim_writer(self.id);
        let uv = Vec2f::new(0.0, 0.0);
        gpu.batch.push(RenderVertex::new(from, uv, color));
        gpu.batch.push(RenderVertex::new(to, uv, color));
        unsafe {
            gpu.gl.bind_vertex_array(Some(gpu.vao));
            gpu.gl.bind_buffer(glow::ARRAY_BUFFER, Some(gpu.vbo));
            gpu.gl
                .buffer_sub_data_u8_slice(glow::ARRAY_BUFFER, 0, gpu.batch.as_bytes());
            gpu.gl.enable(glow::LINE_SMOOTH);
            gpu.gl.line_width(width);
            gpu.gl.draw_arrays(glow::LINE_STRIP, 0, 2);
        }
        gpu.batch.clear();
        gpu.current_writer = None;
    }

    /// Fills the whole surface with one color, regardless of the camera.
    pub fn draw_background(&mut self, gpu: &mut GpuContext, color: Vec4f) {
        self.set_vert_shader(VertShader::NoTransform);
        self.set_shader(gpu, FragShader::BasicColor);
        let w = self.resolution.x;
        let h = self.resolution.y;
        self.solid_rect(gpu, Vec2f::new(-w, h), Vec2f::new(2.0 * w, -2.0 * h), color);
        self.flush(gpu);
    }

    /// Draws `src`'s color texture over the current target as a
    /// full-surface quad.  Assumes a centered-origin vertex transform.
    pub fn render_framebuffer(&mut self, gpu: &mut GpuContext, src: FramebufferTarget) {
        gpu.bind_framebuffer_texture(src);
        let w = self.resolution.x;
        let h = self.resolution.y;
        self.render_image(
            gpu,
            Vec2f::new(-w, -h),
            Vec2f::new(2.0 * w, 2.0 * h),
            Vec2f::new(0.0, 0.0),
            Vec2f::new(1.0, 1.0),
            WHITE,
        );
        self.flush(gpu);
    }

    /// One full effect pass: `src` through `frag` into `dest`, cleared
    /// first, premultiplied.
    pub fn render_framebuffer_layer(
        &mut self,
        gpu: &mut GpuContext,
        src: FramebufferTarget,
        dest: Option<FramebufferTarget>,
        frag: FragShader,
    ) {
        gpu.bind_framebuffer(dest);
        gpu.clear(CLEAR);
        self.render_framebuffer_layer_noclear(gpu, src, dest, frag);
    }

    /// Same pass without clearing, for compositing onto existing content.
    pub fn render_framebuffer_layer_noclear(
        &mut self,
        gpu: &mut GpuContext,
        src: FramebufferTarget,
        dest: Option<FramebufferTarget>,
        frag: FragShader,
    ) {
        gpu.bind_framebuffer(dest);
        gpu.set_blend_mode(BlendMode::PremultipliedAlpha);
        self.set_shader(gpu, frag);
        self.render_framebuffer(gpu, src);
    }

    /// Draws a pooled render texture at its natural size from the corner
    /// origin.  Pair with [`VertShader::OneOneTransform`].
    pub fn render_render_texture(&mut self, gpu: &mut GpuContext, handle: PoolHandle) {
        let dim = match gpu.render_texture_dim(handle) {
            Some(dim) => dim,
            None => return,
        };
        gpu.bind_render_texture_color(handle);
        self.render_image(
            gpu,
            Vec2f::new(0.0, 0.0),
            Vec2f::new(dim.width as f32, dim.height as f32),
            Vec2f::new(0.0, 0.0),
            Vec2f::new(1.0, 1.0),
            WHITE,
        );
        self.flush(gpu);
    }

    /// Copies `src` into a pooled render texture through `frag`.
    pub fn render_framebuffer_to_render_texture(
        &mut self,
        gpu: &mut GpuContext,
        src: FramebufferTarget,
        dest: PoolHandle,
        frag: FragShader,
    ) {
        gpu.bind_render_texture_framebuffer(dest);
        gpu.set_blend_mode(BlendMode::PremultipliedAlpha);
        gpu.clear(CLEAR);
        self.set_vert_shader(VertShader::OneOneTransform);
        self.set_shader(gpu, frag);
        gpu.bind_framebuffer_texture(src);
        let screen = gpu.screen();
        self.render_image(
            gpu,
            Vec2f::new(0.0, 0.0),
            Vec2f::new(screen.width as f32, screen.height as f32),
            Vec2f::new(0.0, 0.0),
            Vec2f::new(1.0, 1.0),
            WHITE,
        );
        self.flush(gpu);
    }

    /// Applies a viewport, remembering what it replaced for
    /// [`reset_viewport`](Self::reset_viewport).
    pub fn apply_viewport(&mut self, gpu: &mut GpuContext, viewport: RenderViewport) {
        self.saved_viewport = Some((self.viewport, self.resolution));
        self.set_viewport(gpu, viewport);
    }

    pub fn reset_viewport(&mut self, gpu: &mut GpuContext) {
        if let Some((viewport, resolution)) = self.saved_viewport.take() {
            self.set_viewport(gpu, viewport);
            self.resolution = resolution;
        }
    }

    fn set_viewport(&mut self, gpu: &mut GpuContext, viewport: RenderViewport) {
        self.viewport = viewport;
        self.resolution = Vec2f::new(viewport.width as f32, viewport.height as f32);
        unsafe {
            gpu.gl.viewport(
                viewport.x,
                viewport.y,
                viewport.width as i32,
                viewport.height as i32,
            );
        }
    }

    /// Clips rendering to `region`.  The viewport keeps its current size
    /// but moves to the region's corner, so coordinates inside stay
    /// consistent with the unclipped layout.  Applies nest; each one needs
    /// a matching [`reset_scissor`](Self::reset_scissor).
    pub fn apply_scissor(&mut self, gpu: &mut GpuContext, region: ScissorRegion) {
        unsafe {
            let was_enabled = gpu.gl.is_enabled(glow::SCISSOR_TEST);
            gpu.scissor_stack.push(was_enabled);
            gpu.gl.enable(glow::SCISSOR_TEST);
            gpu.gl.viewport(
                region.x,
                region.y,
                self.viewport.width as i32,
                self.viewport.height as i32,
            );
            gpu.gl.scissor(
                region.x,
                region.y,
                region.width as i32,
                region.height as i32,
            );
        }
    }

    pub fn reset_scissor(&mut self, gpu: &mut GpuContext) {
        unsafe {
            if gpu.scissor_stack.pop_should_disable() {
                gpu.gl.disable(glow::SCISSOR_TEST);
            }
            gpu.gl.viewport(
                self.viewport.x,
                self.viewport.y,
                self.viewport.width as i32,
                self.viewport.height as i32,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_renderer_carries_zeroed_custom_uniforms() {
        let renderer = SceneRenderer::new(0, ScreenDimensions::new(800, 600));
        assert_eq!(renderer.custom, CustomUniforms::default());
        assert!(renderer.custom.floats().iter().all(|(_, v)| *v == 0.0));
    }

    #[test]
    fn custom_uniform_slots_report_recorded_values_by_shader_name() {
        // set_shader walks these pairs on every switch, so a value recorded
        // before the switch lands in the newly bound program.
        let mut custom = CustomUniforms::default();
        custom.float1 = 0.03;
        custom.float2 = 8.0;
        custom.vec2_3 = Vec2f::new(1.0, 2.0);
        assert_eq!(custom.floats()[0], ("custom_float_value1", 0.03));
        assert_eq!(custom.floats()[1], ("custom_float_value2", 8.0));
        assert_eq!(
            custom.vec2s()[2],
            ("custom_vec2_value3", Vec2f::new(1.0, 2.0))
        );
        // Untouched slots keep their defaults rather than going stale.
        assert_eq!(custom.vec2s()[0], ("custom_vec2_value1", Vec2f::default()));
    }
}
