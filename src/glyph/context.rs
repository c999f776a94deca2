// GlyphScene
// copyright glyphscene contributors 2023～2026

//! Text layout and drawing on top of the atlas.  The context carries the
//! active font size, tab width and marker settings, walks codepoints, and
//! emits one textured quad per glyph.  Measure paths share the exact same
//! glyph resolution as render paths so widths always agree.

use crate::codepoint::{Codepoint, CodepointWalker};
use crate::config::RenderConfig;
use crate::feed::MessageFeed;
use crate::glyph::atlas::{Atlas, ColorSelect, GlyphExtract};
use crate::glyph::{GlyphSink, DEFAULT_FONT_SIZE, TEXTURE_HEIGHT, TEXTURE_WIDTH};
use crate::render::scene::{GpuContext, SceneRenderer};
use crate::util::{combine_paths, hex_to_vec4f, Vec2f, Vec4f};

/// Extra vertical padding per line, expressed as a fraction of the font
/// size (25px at the reference 64px size).
const LINE_PADDING_NUMER: u32 = 25;

const DEFAULT_MARKER_COLOR: Vec4f = hex_to_vec4f(0x7F7F7FFF);

pub struct RenderFontContext {
    atlas: Atlas,
    font_size: u32,
    tabstop: u32,
    render_whitespace: bool,
    whitespace_color: Vec4f,
    carriage_return_color: Vec4f,
}

impl RenderFontContext {
    pub fn new(atlas: Atlas, font_size: u32, tabstop: u32) -> Self {
        Self {
            atlas,
            font_size,
            tabstop,
            render_whitespace: false,
            whitespace_color: DEFAULT_MARKER_COLOR,
            carriage_return_color: DEFAULT_MARKER_COLOR,
        }
    }

    /// Builds the atlas from the font settings in `config`.
    pub fn from_config(config: &RenderConfig) -> Result<Self, String> {
        let base = &config.core.base_asset_path;
        let atlas = Atlas::init(
            &combine_paths(base, &config.fonts.current_font),
            &combine_paths(base, &config.fonts.fallback_fonts_folder),
        )?;
        Ok(Self::new(atlas, config.fonts.font_size, config.fonts.tabstop))
    }

    /// Uploads the standard glyphs for the active size.  Call once the GPU
    /// context exists.
    pub fn populate(&mut self, gpu: &mut GpuContext) -> Result<(), String> {
        self.atlas.populate_atlas(gpu)?;
        self.atlas.ensure_font(Some(gpu), self.font_size);
        Ok(())
    }

    pub fn atlas(&self) -> &Atlas {
        &self.atlas
    }

    pub fn font_family(&self) -> &str {
        self.atlas.font_family()
    }

    pub fn try_load_font_face(&mut self, gpu: &mut GpuContext, path: &str, feed: &mut MessageFeed) {
        self.atlas.try_load_font_face(gpu, path, feed);
        self.atlas.ensure_font(Some(gpu), self.font_size);
    }

    pub fn current_font_size(&self) -> u32 {
        self.font_size
    }

    pub fn set_font_size(&mut self, size: u32) {
        self.font_size = size;
    }

    /// Line advance: the font size plus padding scaled off the reference
    /// size.
    pub fn font_line_height(size: u32) -> u32 {
        size + (LINE_PADDING_NUMER as f32 / DEFAULT_FONT_SIZE as f32 * size as f32) as u32
    }

    pub fn current_font_line_height(&self) -> u32 {
        Self::font_line_height(self.font_size)
    }

    pub fn set_tabstop(&mut self, tabstop: u32) {
        self.tabstop = tabstop;
    }

    pub fn set_render_whitespace(&mut self, enabled: bool) {
        self.render_whitespace = enabled;
    }

    pub fn set_whitespace_color(&mut self, color: Vec4f) {
        self.whitespace_color = color;
    }

    pub fn set_carriage_return_color(&mut self, color: Vec4f) {
        self.carriage_return_color = color;
    }

    pub fn bind_glyph_texture(&self, gpu: &mut GpuContext) {
        self.atlas.bind_primary_texture(gpu);
    }

    fn extract(&mut self, glyph: Codepoint, sink: Option<&mut dyn GlyphSink>) -> GlyphExtract {
        self.atlas.extract_glyph_info(
            self.font_size,
            self.tabstop,
            glyph,
            sink,
            self.render_whitespace,
        )
    }

    fn pick_color(&self, select: ColorSelect, requested: Vec4f) -> Vec4f {
        match select {
            ColorSelect::Default => requested,
            ColorSelect::Whitespace => self.whitespace_color,
            ColorSelect::CarriageReturn => self.carriage_return_color,
        }
    }

    /// Draws `text` starting at `position` and returns the final pen
    /// position.
    pub fn render_text(
        &mut self,
        renderer: &mut SceneRenderer,
        gpu: &mut GpuContext,
        text: &str,
        position: Vec2f,
        color: Vec4f,
    ) -> Vec2f {
        self.render_scaled_text(renderer, gpu, text, position, 1.0, color)
    }

    /// Like [`render_text`](Self::render_text) but with glyph geometry and
    /// advances multiplied by `scalar`.  Texture coordinates are untouched;
    /// the rasterized pixels simply stretch.
    pub fn render_scaled_text(
        &mut self,
        renderer: &mut SceneRenderer,
        gpu: &mut GpuContext,
        text: &str,
        position: Vec2f,
        scalar: f32,
        color: Vec4f,
    ) -> Vec2f {
        let mut pen = position;
        let mut walker = CodepointWalker::new(text);
        while !walker.exhausted() {
            let glyph = walker.next();
            pen = self.render_scaled_glyph(renderer, gpu, glyph, pen, scalar, color);
        }
        pen
    }

    /// Draws one codepoint and returns the advanced pen position.
    pub fn render_glyph(
        &mut self,
        renderer: &mut SceneRenderer,
        gpu: &mut GpuContext,
        glyph: Codepoint,
        position: Vec2f,
        color: Vec4f,
    ) -> Vec2f {
        self.render_scaled_glyph(renderer, gpu, glyph, position, 1.0, color)
    }

    pub fn render_scaled_glyph(
        &mut self,
        renderer: &mut SceneRenderer,
        gpu: &mut GpuContext,
        glyph: Codepoint,
        position: Vec2f,
        scalar: f32,
        color: Vec4f,
    ) -> Vec2f {
        let e = self.extract(glyph, Some(gpu));
        let info = e.info;
        let color = self.pick_color(e.color, color);
        renderer.render_image(
            gpu,
            Vec2f::new(
                position.x + info.bl * scalar,
                position.y + info.bt * scalar,
            ),
            Vec2f::new(info.bw * scalar, -info.bh * scalar),
            Vec2f::new(info.tx, info.ty),
            Vec2f::new(
                info.bw / TEXTURE_WIDTH as f32,
                info.bh / TEXTURE_HEIGHT as f32,
            ),
            color,
        );
        // The pen advances after the quad is placed, not before.
        Vec2f::new(
            position.x + e.x_advance * scalar,
            position.y + info.ay * scalar,
        )
    }

    /// Draws one codepoint with its bitmap corner pinned to `position`,
    /// ignoring bearings.  Used for box-drawing style alignment.
    pub fn render_glyph_no_offsets(
        &mut self,
        renderer: &mut SceneRenderer,
        gpu: &mut GpuContext,
        glyph: Codepoint,
        position: Vec2f,
        color: Vec4f,
    ) {
        let e = self.extract(glyph, Some(gpu));
        let info = e.info;
        let color = self.pick_color(e.color, color);
        renderer.render_image(
            gpu,
            position,
            Vec2f::new(info.bw, -info.bh),
            Vec2f::new(info.tx, info.ty),
            Vec2f::new(
                info.bw / TEXTURE_WIDTH as f32,
                info.bh / TEXTURE_HEIGHT as f32,
            ),
            color,
        );
    }

    /// Natural size of a glyph's bitmap at the active font size.
    pub fn glyph_size(&mut self, glyph: Codepoint) -> Vec2f {
        let e = self.extract(glyph, None);
        Vec2f::new(e.info.bw, e.info.bh)
    }

    /// Pen displacement `render_text` would produce, without drawing.
    pub fn measure_text(&mut self, text: &str) -> Vec2f {
        self.measure_scaled_text(text, 1.0)
    }

    pub fn measure_scaled_text(&mut self, text: &str, scalar: f32) -> Vec2f {
        let mut pen = Vec2f::new(0.0, 0.0);
        let mut walker = CodepointWalker::new(text);
        while !walker.exhausted() {
            let e = self.extract(walker.next(), None);
            pen.x += e.x_advance * scalar;
            pen.y += e.info.ay * scalar;
        }
        pen
    }

    /// Number of codepoints of `text` that fit to the left of `point_x`,
    /// treating each glyph's horizontal midpoint as the boundary.  Used to
    /// map a pointer position to a caret index.
    pub fn glyph_count_to_point(&mut self, text: &str, point_x: f32) -> usize {
        let mut running = 0.0f32;
        let mut count = 0usize;
        let mut walker = CodepointWalker::new(text);
        while !walker.exhausted() {
            let e = self.extract(walker.next(), None);
            running += e.x_advance;
            if running >= point_x {
                let threshold = (running - e.info.ax) + e.x_advance / 2.0;
                if threshold >= point_x {
                    return count;
                }
            }
            count += 1;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::atlas::{CachedFont, CharInfo};
    use crate::glyph::{SpecialGlyph, TOTAL_CHAR_INFO_COUNT, VALID_CHAR_START};

    fn fixed_advance_context(advance: f32) -> RenderFontContext {
        let mut infos = [CharInfo::default(); TOTAL_CHAR_INFO_COUNT];
        for info in infos.iter_mut().skip(VALID_CHAR_START as usize) {
            info.ax = advance;
            info.bw = advance - 2.0;
            info.bh = 12.0;
        }
        let atlas = Atlas::synthetic(CachedFont::synthetic(64, infos));
        RenderFontContext::new(atlas, 64, 4)
    }

    #[test]
    fn measure_sums_advances() {
        let mut ctx = fixed_advance_context(10.0);
        assert_eq!(ctx.measure_text("hello").x, 50.0);
        assert_eq!(ctx.measure_text("").x, 0.0);
    }

    #[test]
    fn measure_scales_linearly() {
        let mut ctx = fixed_advance_context(10.0);
        let base = ctx.measure_text("abc").x;
        assert_eq!(ctx.measure_scaled_text("abc", 2.0).x, base * 2.0);
    }

    #[test]
    fn tab_advance_follows_tabstop() {
        let mut ctx = fixed_advance_context(10.0);
        assert_eq!(ctx.measure_text("\t").x, 40.0);
        ctx.set_tabstop(8);
        assert_eq!(ctx.measure_text("\t").x, 80.0);
    }

    #[test]
    fn tab_uses_marker_advance_when_rendering_whitespace() {
        let mut infos = [CharInfo::default(); TOTAL_CHAR_INFO_COUNT];
        for info in infos.iter_mut().skip(VALID_CHAR_START as usize) {
            info.ax = 10.0;
        }
        infos[SpecialGlyph::Tab.table_index()].ax = 6.0;
        let atlas = Atlas::synthetic(CachedFont::synthetic(64, infos));
        let mut ctx = RenderFontContext::new(atlas, 64, 4);

        assert_eq!(ctx.measure_text("\t").x, 40.0);
        ctx.set_render_whitespace(true);
        assert_eq!(ctx.measure_text("\t").x, 24.0);
    }

    #[test]
    fn glyph_count_snaps_at_glyph_midpoints() {
        let mut ctx = fixed_advance_context(10.0);
        // Caret lands before a glyph up to its midpoint, after it beyond.
        assert_eq!(ctx.glyph_count_to_point("abcd", 0.0), 0);
        assert_eq!(ctx.glyph_count_to_point("abcd", 4.9), 0);
        assert_eq!(ctx.glyph_count_to_point("abcd", 5.1), 1);
        assert_eq!(ctx.glyph_count_to_point("abcd", 14.9), 1);
        assert_eq!(ctx.glyph_count_to_point("abcd", 15.1), 2);
        // Past the end of the text every glyph counts.
        assert_eq!(ctx.glyph_count_to_point("abcd", 1000.0), 4);
    }

    #[test]
    fn glyph_count_is_monotonic_in_x() {
        let mut ctx = fixed_advance_context(7.0);
        let text = "monotonic";
        let mut last = 0;
        for i in 0..200 {
            let count = ctx.glyph_count_to_point(text, i as f32 * 0.5);
            assert!(count >= last);
            last = count;
        }
    }

    #[test]
    fn line_height_tracks_font_size() {
        assert_eq!(RenderFontContext::font_line_height(64), 89);
        assert_eq!(RenderFontContext::font_line_height(32), 44);
        let ctx = fixed_advance_context(10.0);
        assert_eq!(ctx.current_font_line_height(), 89);
    }
}
