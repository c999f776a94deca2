// GlyphScene
// copyright glyphscene contributors 2023～2026

//! GPU surfaces: plain RGBA textures, the offscreen framebuffers the effect
//! passes ping-pong between, and a generation-checked pool for render
//! textures handed out to embedders.

use glow::{HasContext, PixelUnpackData};

use crate::util::ScreenDimensions;

/// RGBA8 texture with linear filtering and edge clamping.
pub fn create_basic_texture(
    gl: &glow::Context,
    dim: ScreenDimensions,
) -> Result<glow::Texture, String> {
    unsafe {
        let texture = gl.create_texture()?;
        gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            glow::RGBA8 as i32,
            dim.width as i32,
            dim.height as i32,
            0,
            glow::RGBA,
            glow::UNSIGNED_BYTE,
            PixelUnpackData::Slice(None),
        );
        set_default_sampling(gl);
        Ok(texture)
    }
}

/// Uploads an RGBA region into an existing texture.
pub fn submit_texture_data(
    gl: &glow::Context,
    texture: glow::Texture,
    offset_x: i32,
    offset_y: i32,
    dim: ScreenDimensions,
    pixels: &[u8],
) {
    unsafe {
        gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        gl.tex_sub_image_2d(
            glow::TEXTURE_2D,
            0,
            offset_x,
            offset_y,
            dim.width as i32,
            dim.height as i32,
            glow::RGBA,
            glow::UNSIGNED_BYTE,
            PixelUnpackData::Slice(Some(pixels)),
        );
    }
}

/// Shared sampling state for every surface: linear filtering, clamped on
/// every wrap axis.  Expects the texture to be bound.
pub fn set_default_sampling(gl: &glow::Context) {
    unsafe {
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_MIN_FILTER,
            glow::LINEAR as i32,
        );
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_MAG_FILTER,
            glow::LINEAR as i32,
        );
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_WRAP_S,
            glow::CLAMP_TO_EDGE as i32,
        );
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_WRAP_T,
            glow::CLAMP_TO_EDGE as i32,
        );
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_WRAP_R,
            glow::CLAMP_TO_EDGE as i32,
        );
    }
}

/// One offscreen surface with a color and a depth-stencil attachment.
pub struct FramebufferData {
    pub framebuffer: glow::Framebuffer,
    pub color: glow::Texture,
    pub depth: glow::Texture,
    pub dim: ScreenDimensions,
}

impl FramebufferData {
    pub fn new(gl: &glow::Context, dim: ScreenDimensions) -> Result<Self, String> {
        unsafe {
            let framebuffer = gl.create_framebuffer()?;
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(framebuffer));
            let (color, depth) = Self::create_attachments(gl, dim)?;
            gl.draw_buffers(&[glow::COLOR_ATTACHMENT0]);
            if gl.check_framebuffer_status(glow::FRAMEBUFFER) != glow::FRAMEBUFFER_COMPLETE {
                return Err("Framebuffer is incomplete".to_string());
            }
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            Ok(Self {
                framebuffer,
                color,
                depth,
                dim,
            })
        }
    }

    fn create_attachments(
        gl: &glow::Context,
        dim: ScreenDimensions,
    ) -> Result<(glow::Texture, glow::Texture), String> {
        unsafe {
            let color = create_basic_texture(gl, dim)?;
            gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D,
                Some(color),
                0,
            );

            let depth = gl.create_texture()?;
            gl.bind_texture(glow::TEXTURE_2D, Some(depth));
            gl.tex_storage_2d(
                glow::TEXTURE_2D,
                1,
                glow::DEPTH24_STENCIL8,
                dim.width as i32,
                dim.height as i32,
            );
            gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::DEPTH_STENCIL_ATTACHMENT,
                glow::TEXTURE_2D,
                Some(depth),
                0,
            );
            Ok((color, depth))
        }
    }

    /// Drops and recreates both attachments at the new size.
    pub fn resize(&mut self, gl: &glow::Context, dim: ScreenDimensions) -> Result<(), String> {
        unsafe {
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(self.framebuffer));
            gl.delete_texture(self.color);
            gl.delete_texture(self.depth);
            let (color, depth) = Self::create_attachments(gl, dim)?;
            self.color = color;
            self.depth = depth;
            self.dim = dim;
            Ok(())
        }
    }

    pub fn delete(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_texture(self.color);
            gl.delete_texture(self.depth);
            gl.delete_framebuffer(self.framebuffer);
        }
    }
}

/// Pooled offscreen color surface without a depth attachment.
pub struct RenderTextureData {
    pub framebuffer: glow::Framebuffer,
    pub color: glow::Texture,
    pub dim: ScreenDimensions,
}

impl RenderTextureData {
    pub fn new(gl: &glow::Context, dim: ScreenDimensions) -> Result<Self, String> {
        unsafe {
            let framebuffer = gl.create_framebuffer()?;
            gl.bind_framebuffer(glow::FRAMEBUFFER, Some(framebuffer));
            let color = create_basic_texture(gl, dim)?;
            gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D,
                Some(color),
                0,
            );
            gl.draw_buffers(&[glow::COLOR_ATTACHMENT0]);
            if gl.check_framebuffer_status(glow::FRAMEBUFFER) != glow::FRAMEBUFFER_COMPLETE {
                return Err("Render texture framebuffer is incomplete".to_string());
            }
            gl.bind_framebuffer(glow::FRAMEBUFFER, None);
            Ok(Self {
                framebuffer,
                color,
                dim,
            })
        }
    }

    pub fn delete(&self, gl: &glow::Context) {
        unsafe {
            gl.delete_texture(self.color);
            gl.delete_framebuffer(self.framebuffer);
        }
    }
}

/// Stable handle into a [`TexturePool`].  Handles to freed slots go stale
/// instead of aliasing a reused slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoolHandle {
    index: usize,
    generation: u32,
}

pub struct TexturePool<T> {
    slots: Vec<Option<T>>,
    generations: Vec<u32>,
    free: Vec<usize>,
}

impl<T> Default for TexturePool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TexturePool<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free: Vec::new(),
        }
    }

    pub fn insert(&mut self, value: T) -> PoolHandle {
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(value);
                PoolHandle {
                    index,
                    generation: self.generations[index],
                }
            }
            None => {
                self.slots.push(Some(value));
                self.generations.push(0);
                PoolHandle {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        }
    }

    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        if self.generations.get(handle.index) != Some(&handle.generation) {
            return None;
        }
        self.slots[handle.index].as_ref()
    }

    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        if self.generations.get(handle.index) != Some(&handle.generation) {
            return None;
        }
        self.slots[handle.index].as_mut()
    }

    /// Frees the slot and bumps its generation so the handle (and any
    /// copies of it) go stale.
    pub fn remove(&mut self, handle: PoolHandle) -> Option<T> {
        if self.generations.get(handle.index) != Some(&handle.generation) {
            return None;
        }
        let value = self.slots[handle.index].take()?;
        self.generations[handle.index] += 1;
        self.free.push(handle.index);
        Some(value)
    }

    /// Drains every live entry, e.g. for teardown.
    pub fn drain(&mut self) -> Vec<T> {
        let mut out = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(value) = slot.take() {
                self.generations[index] += 1;
                self.free.push(index);
                out.push(value);
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get_round_trip() {
        let mut pool = TexturePool::new();
        let a = pool.insert("a");
        let b = pool.insert("b");
        assert_eq!(pool.get(a), Some(&"a"));
        assert_eq!(pool.get(b), Some(&"b"));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn stale_handles_miss_after_removal() {
        let mut pool = TexturePool::new();
        let a = pool.insert(1u32);
        assert_eq!(pool.remove(a), Some(1));
        assert_eq!(pool.get(a), None);
        assert_eq!(pool.remove(a), None);

        // The slot is reused with a fresh generation; the old handle still
        // misses.
        let b = pool.insert(2u32);
        assert_eq!(pool.get(a), None);
        assert_eq!(pool.get(b), Some(&2));
    }

    #[test]
    fn drain_invalidates_everything() {
        let mut pool = TexturePool::new();
        let a = pool.insert(());
        let b = pool.insert(());
        assert_eq!(pool.drain().len(), 2);
        assert!(pool.is_empty());
        assert_eq!(pool.get(a), None);
        assert_eq!(pool.get(b), None);
    }
}
