// GlyphScene
// copyright glyphscene contributors 2023～2026

//! CPU-side vertex accumulation.  Primitives append triangles here and the
//! scene renderer uploads the whole batch in one buffer_sub_data per flush.

use crate::util::{Vec2f, Vec4f};

/// Up to 25000 triangles per flush.
pub const VERTEX_CAPACITY: usize = 3 * 25000;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C)]
pub struct RenderVertex {
    pub position: Vec2f,
    pub uv: Vec2f,
    pub color: Vec4f,
}

impl RenderVertex {
    pub const fn new(position: Vec2f, uv: Vec2f, color: Vec4f) -> Self {
        Self {
            position,
            uv,
            color,
        }
    }
}

pub struct VertexBatch {
    verts: Vec<RenderVertex>,
}

impl Default for VertexBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexBatch {
    pub fn new() -> Self {
        Self {
            verts: Vec::with_capacity(VERTEX_CAPACITY),
        }
    }

    pub fn len(&self) -> usize {
        self.verts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verts.is_empty()
    }

    /// True when `extra` more vertices would not fit.
    pub fn would_overflow(&self, extra: usize) -> bool {
        self.verts.len() + extra > VERTEX_CAPACITY
    }

    pub fn clear(&mut self) {
        self.verts.clear();
    }

    pub fn push(&mut self, vertex: RenderVertex) {
        debug_assert!(self.verts.len() < VERTEX_CAPACITY);
        self.verts.push(vertex);
    }

    /// Two triangles from the four corners of a quad: (p0 p1 p2) and
    /// (p1 p2 p3), with p0 top-left, p1 top-right, p2 bottom-left and p3
    /// bottom-right.
    #[allow(clippy::too_many_arguments)]
    pub fn push_quad(
        &mut self,
        p0: Vec2f,
        p1: Vec2f,
        p2: Vec2f,
        p3: Vec2f,
        uv0: Vec2f,
        uv1: Vec2f,
        uv2: Vec2f,
        uv3: Vec2f,
        color: Vec4f,
    ) {
        self.push(RenderVertex::new(p0, uv0, color));
        self.push(RenderVertex::new(p1, uv1, color));
        self.push(RenderVertex::new(p2, uv2, color));
        self.push(RenderVertex::new(p1, uv1, color));
        self.push(RenderVertex::new(p2, uv2, color));
        self.push(RenderVertex::new(p3, uv3, color));
    }

    /// The batch as raw bytes for the GL upload.
    pub fn as_bytes(&self) -> &[u8] {
        unsafe { self.verts.align_to::<u8>().1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem;

    const WHITE: Vec4f = Vec4f::new(1.0, 1.0, 1.0, 1.0);

    #[test]
    fn quad_expands_to_two_triangles() {
        let mut batch = VertexBatch::new();
        let p0 = Vec2f::new(0.0, 0.0);
        let p1 = Vec2f::new(4.0, 0.0);
        let p2 = Vec2f::new(0.0, 3.0);
        let p3 = Vec2f::new(4.0, 3.0);
        let uv = Vec2f::new(0.0, 0.0);
        batch.push_quad(p0, p1, p2, p3, uv, uv, uv, uv, WHITE);
        assert_eq!(batch.len(), 6);
        // Shared edge p1-p2 appears in both triangles.
        let bytes = batch.as_bytes();
        assert_eq!(
            bytes.len(),
            6 * mem::size_of::<RenderVertex>()
        );
    }

    #[test]
    fn overflow_check_counts_pending_vertices() {
        let mut batch = VertexBatch::new();
        assert!(!batch.would_overflow(VERTEX_CAPACITY));
        assert!(batch.would_overflow(VERTEX_CAPACITY + 1));
        batch.push(RenderVertex::default());
        assert!(batch.would_overflow(VERTEX_CAPACITY));
        batch.clear();
        assert!(!batch.would_overflow(VERTEX_CAPACITY));
    }

    #[test]
    fn vertex_layout_is_eight_floats() {
        assert_eq!(mem::size_of::<RenderVertex>(), 8 * mem::size_of::<f32>());
    }
}
