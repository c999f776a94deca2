// GlyphScene
// copyright glyphscene contributors 2023～2026

//! Glyph caching: font face ownership, on-demand rasterization and row
//! packing into one shared texture, and per-font-size render contexts.
//!
//! The atlas texture is a single GL_RED image.  The printable ASCII range
//! plus a few marker glyphs are rasterized eagerly per font size; everything
//! else is measured and rasterized lazily as text comes through.

use crate::util::ScreenDimensions;

pub mod atlas;
pub mod context;
pub mod packer;

pub use atlas::{Atlas, CachedFont, CharInfo};
pub use context::RenderFontContext;
pub use packer::AtlasCursor;

/// Shared atlas texture dimensions.
pub const TEXTURE_WIDTH: u32 = 1920;
pub const TEXTURE_HEIGHT: u32 = 1088;

/// Reference pixel size; the eagerly populated cache and the line height
/// formula are both anchored to it.
pub const DEFAULT_FONT_SIZE: u32 = 64;

/// Control codes below this cannot be rendered.
pub const VALID_CHAR_START: u32 = 32;
/// The fixed table covers ASCII [0, 128) ...
pub const CHAR_INFO_COUNT: u32 = 128;
/// ... plus the marker glyphs appended behind it.
pub const MARKER_GLYPH_COUNT: u32 = 3;
pub const TOTAL_CHAR_INFO_COUNT: usize = (CHAR_INFO_COUNT + MARKER_GLYPH_COUNT) as usize;

/// Synthetic glyphs stored behind the ASCII table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecialGlyph {
    Whitespace = CHAR_INFO_COUNT as isize,
    CarriageReturn,
    Tab,
}

impl SpecialGlyph {
    /// The real codepoint rasterized for the marker.
    pub fn codepoint(self) -> char {
        match self {
            SpecialGlyph::Whitespace => '\u{00B7}',
            SpecialGlyph::CarriageReturn => '\u{00B6}',
            SpecialGlyph::Tab => '\u{2192}',
        }
    }

    pub fn table_index(self) -> usize {
        self as usize
    }
}

pub const SPECIAL_GLYPH_MAP: [SpecialGlyph; MARKER_GLYPH_COUNT as usize] = [
    SpecialGlyph::Whitespace,
    SpecialGlyph::CarriageReturn,
    SpecialGlyph::Tab,
];

/// Handle to the GL glyph texture owned by the atlas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphTexture(pub glow::Texture);

/// One bitmap upload into the atlas texture.
pub struct GlyphUpload<'a> {
    pub offset_x: i32,
    pub offset_y: i32,
    pub width: u32,
    pub height: u32,
    pub buffer: &'a [u8],
}

/// Where rasterized bitmaps go.  Implemented by the GPU context; kept as a
/// trait so the cache logic stays testable away from a live GL context.
pub trait GlyphSink {
    fn create_glyph_texture(&mut self, dim: ScreenDimensions) -> Result<GlyphTexture, String>;
    fn submit_glyph_data(&mut self, tex: GlyphTexture, entry: GlyphUpload<'_>);
    fn bind_glyph_texture(&mut self, tex: GlyphTexture);
}
