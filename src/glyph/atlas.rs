// GlyphScene
// copyright glyphscene contributors 2023～2026

//! The atlas owns the font faces and the shared glyph texture.  Each font
//! pixel size gets a [`CachedFont`]: a fixed metrics table for printable
//! ASCII plus the marker glyphs, and a lazy map for everything else.
//! Dynamic glyphs are measured on first request and rasterized at most
//! once; a failed rasterization is sticky so an unrenderable codepoint is
//! never retried.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use fontdue::{Font, FontSettings};
use log::{debug, warn};

use crate::codepoint::{Codepoint, INVALID_CODEPOINT};
use crate::feed::MessageFeed;
use crate::glyph::packer::AtlasCursor;
use crate::glyph::{
    GlyphSink, GlyphTexture, GlyphUpload, CHAR_INFO_COUNT, DEFAULT_FONT_SIZE, SPECIAL_GLYPH_MAP,
    TEXTURE_HEIGHT, TEXTURE_WIDTH, TOTAL_CHAR_INFO_COUNT, VALID_CHAR_START,
};
use crate::util::ScreenDimensions;

/// Metrics for one rendered glyph at one font size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CharInfo {
    /// advance.x
    pub ax: f32,
    /// advance.y
    pub ay: f32,
    /// bitmap width
    pub bw: f32,
    /// bitmap height
    pub bh: f32,
    /// bitmap left bearing
    pub bl: f32,
    /// bitmap top bearing (baseline to bitmap top)
    pub bt: f32,
    /// normalized x offset of the glyph in the atlas texture
    pub tx: f32,
    /// normalized y offset of the glyph in the atlas texture
    pub ty: f32,
}

/// Index into the atlas face list: 0 is the primary face, anything above
/// is a fallback.
type FaceId = usize;

/// Lifecycle of a dynamically cached glyph.  Metrics exist from the first
/// request on; pixels land in the texture at most once.
#[derive(Clone, Copy, Debug)]
enum GlyphSlot {
    Measured { info: CharInfo, face: FaceId },
    Rasterized { info: CharInfo },
    Failed,
}

/// Per-font-size glyph cache.
pub struct CachedFont {
    font_size: u32,
    infos: [CharInfo; TOTAL_CHAR_INFO_COUNT],
    cached_glyphs: HashMap<Codepoint, GlyphSlot>,
    /// False while the size only ever served measure requests; the standard
    /// glyph pixels are uploaded the first time a render path arrives.
    standard_uploaded: bool,
}

impl CachedFont {
    fn new(font_size: u32) -> Self {
        Self {
            font_size,
            infos: [CharInfo::default(); TOTAL_CHAR_INFO_COUNT],
            cached_glyphs: HashMap::new(),
            standard_uploaded: false,
        }
    }

    pub fn font_size(&self) -> u32 {
        self.font_size
    }

    /// Metrics straight out of the fixed table.  `index` must be below
    /// [`TOTAL_CHAR_INFO_COUNT`].
    pub fn table_info(&self, index: usize) -> &CharInfo {
        &self.infos[index]
    }

    #[cfg(test)]
    pub(crate) fn synthetic(font_size: u32, infos: [CharInfo; TOTAL_CHAR_INFO_COUNT]) -> Self {
        Self {
            font_size,
            infos,
            cached_glyphs: HashMap::new(),
            standard_uploaded: true,
        }
    }
}

/// How a glyph's color is chosen at draw time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorSelect {
    Default,
    Whitespace,
    CarriageReturn,
}

/// Everything a render or measure step needs for one codepoint.
#[derive(Clone, Copy, Debug)]
pub struct GlyphExtract {
    pub info: CharInfo,
    /// Sometimes adjusted from `info.ax`, e.g. tab stops.
    pub x_advance: f32,
    pub color: ColorSelect,
}

pub struct Atlas {
    /// Slot 0 is the primary face; fallbacks follow.
    faces: Vec<Font>,
    family: String,
    fallback_dir: PathBuf,
    /// The fallback directory is scanned at most once.
    fallback_loaded: bool,
    cursor: AtlasCursor,
    cached_fonts: HashMap<u32, CachedFont>,
    texture: Option<GlyphTexture>,
}

fn load_face(path: &Path) -> Result<Font, String> {
    let bytes = fs::read(path)
        .map_err(|e| format!("Failed to load font file '{}': {}", path.display(), e))?;
    Font::from_bytes(bytes, FontSettings::default())
        .map_err(|e| format!("Failed to load font file '{}': {}", path.display(), e))
}

fn family_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_font_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("ttf") | Some("otf")
    )
}

impl Atlas {
    /// Loads the primary face.  Failure here is fatal to startup.
    pub fn init(font_path: &str, fallback_fonts_dir: &str) -> Result<Self, String> {
        let path = Path::new(font_path);
        let primary = load_face(path)?;
        Ok(Self {
            family: family_of(path),
            faces: vec![primary],
            fallback_dir: PathBuf::from(fallback_fonts_dir),
            fallback_loaded: false,
            cursor: AtlasCursor::new(TEXTURE_WIDTH, TEXTURE_HEIGHT),
            cached_fonts: HashMap::new(),
            texture: None,
        })
    }

    /// Allocates the shared texture and eagerly populates the default font
    /// size.  Must run after the GPU context is up and before any lookups.
    pub fn populate_atlas(&mut self, sink: &mut dyn GlyphSink) -> Result<(), String> {
        let dim = ScreenDimensions::new(self.cursor.width(), self.cursor.height());
        self.texture = Some(sink.create_glyph_texture(dim)?);
        self.ensure_font(Some(sink), DEFAULT_FONT_SIZE);
        Ok(())
    }

    /// Hot-swaps the primary face.  On any load failure the previous face
    /// and the whole atlas state stay untouched; on success the texture is
    /// zeroed, every per-size cache is dropped and the default size is
    /// repopulated.
    pub fn try_load_font_face(
        &mut self,
        sink: &mut dyn GlyphSink,
        path: &str,
        feed: &mut MessageFeed,
    ) {
        let path = Path::new(path);
        let new_face = match load_face(path) {
            Ok(face) => face,
            Err(msg) => {
                feed.queue_error(msg);
                return;
            }
        };
        self.faces[0] = new_face;
        self.family = family_of(path);

        self.cursor.reset();
        self.clear_texture(sink);
        self.cached_fonts.clear();
        self.ensure_font(Some(sink), DEFAULT_FONT_SIZE);
        feed.queue_info("Font loaded.");
    }

    pub fn font_family(&self) -> &str {
        &self.family
    }

    pub fn texture(&self) -> Option<GlyphTexture> {
        self.texture
    }

    pub fn bind_primary_texture(&self, sink: &mut dyn GlyphSink) {
        if let Some(tex) = self.texture {
            sink.bind_glyph_texture(tex);
        }
    }

    /// Overwrite the whole texture with zeroed blocks.
    fn clear_texture(&mut self, sink: &mut dyn GlyphSink) {
        const BUF_W: u32 = 64;
        const BUF_H: u32 = 64;
        let zeroes = [0u8; (BUF_W * BUF_H) as usize];
        let tex = match self.texture {
            Some(tex) => tex,
            None => return,
        };
        for x in 0..self.cursor.width() / BUF_W {
            for y in 0..self.cursor.height() / BUF_H {
                sink.submit_glyph_data(
                    tex,
                    GlyphUpload {
                        offset_x: (x * BUF_W) as i32,
                        offset_y: (y * BUF_H) as i32,
                        width: BUF_W,
                        height: BUF_H,
                        buffer: &zeroes,
                    },
                );
            }
        }
    }

    /// Fetches or creates the cache for `size`, eagerly populating the
    /// standard glyph table on first creation.  Every size requested stays
    /// resident for the atlas lifetime.
    pub(crate) fn ensure_font(&mut self, sink: Option<&mut (dyn GlyphSink + '_)>, size: u32) {
        if self.cached_fonts.contains_key(&size) {
            // A measure-only size gets its pixels once a render path shows up.
            if !self.cached_fonts[&size].standard_uploaded {
                if let Some(sink) = sink {
                    self.upload_standard_pixels(sink, size);
                }
            }
            return;
        }
        let mut font = CachedFont::new(size);
        font.standard_uploaded = sink.is_some();
        self.populate_standard_glyphs(sink, &mut font);
        self.cached_fonts.insert(size, font);
    }

    pub(crate) fn font(&self, size: u32) -> &CachedFont {
        &self.cached_fonts[&size]
    }

    /// The per-size cache, created and populated on first request.
    pub fn cached_font(&mut self, sink: Option<&mut dyn GlyphSink>, size: u32) -> &CachedFont {
        self.ensure_font(sink, size);
        self.font(size)
    }

    /// Standard glyph list for one cached font: printable ASCII then the
    /// markers, in table order.
    fn standard_glyphs() -> impl Iterator<Item = (char, usize)> {
        (VALID_CHAR_START..CHAR_INFO_COUNT)
            .map(|i| (char::from_u32(i).unwrap_or('?'), i as usize))
            .chain(
                SPECIAL_GLYPH_MAP
                    .iter()
                    .map(|s| (s.codepoint(), s.table_index())),
            )
    }

    fn rasterize_into_table(
        &mut self,
        sink: Option<&mut (dyn GlyphSink + '_)>,
        font_size: u32,
        ch: char,
        index: usize,
        font: &mut CachedFont,
    ) {
        let (metrics, bitmap) = self.faces[0].rasterize(ch, font_size as f32);
        let placed = self.cursor.place(metrics.width as u32, metrics.height as u32);

        font.infos[index] = CharInfo {
            ax: metrics.advance_width,
            ay: metrics.advance_height,
            bw: metrics.width as f32,
            bh: metrics.height as f32,
            bl: metrics.xmin as f32,
            bt: (metrics.ymin + metrics.height as i32) as f32,
            tx: placed.x as f32 / self.cursor.width() as f32,
            ty: placed.y as f32 / self.cursor.height() as f32,
        };

        if !self.cursor.fits_vertically(placed.y, metrics.height as u32) {
            warn!("standard glyph {:?} exceeds the atlas bounds", ch);
            return;
        }
        if let (Some(sink), Some(tex)) = (sink, self.texture) {
            sink.submit_glyph_data(
                tex,
                GlyphUpload {
                    offset_x: placed.x as i32,
                    offset_y: placed.y as i32,
                    width: metrics.width as u32,
                    height: metrics.height as u32,
                    buffer: &bitmap,
                },
            );
        }
    }

    /// The first 32 entries stay zeroed: control codes cannot render.
    fn populate_standard_glyphs(
        &mut self,
        mut sink: Option<&mut (dyn GlyphSink + '_)>,
        font: &mut CachedFont,
    ) {
        let size = font.font_size;
        for (ch, index) in Self::standard_glyphs() {
            self.rasterize_into_table(sink.as_deref_mut(), size, ch, index, font);
        }
        // Dynamic glyphs begin on the row just under the standard set.
        self.cursor.start_unicode_rows();
    }

    /// Re-rasterizes the standard set of a measure-only size into the rects
    /// its metrics already claim.
    fn upload_standard_pixels(&mut self, sink: &mut dyn GlyphSink, size: u32) {
        let tex = match self.texture {
            Some(tex) => tex,
            None => return,
        };
        for (ch, index) in Self::standard_glyphs() {
            let info = self.cached_fonts[&size].infos[index];
            let (metrics, bitmap) = self.faces[0].rasterize(ch, size as f32);
            let y = (info.ty * self.cursor.height() as f32) as u32;
            if !self.cursor.fits_vertically(y, metrics.height as u32) {
                continue;
            }
            sink.submit_glyph_data(
                tex,
                GlyphUpload {
                    offset_x: (info.tx * self.cursor.width() as f32) as i32,
                    offset_y: y as i32,
                    width: metrics.width as u32,
                    height: metrics.height as u32,
                    buffer: &bitmap,
                },
            );
        }
        if let Some(font) = self.cached_fonts.get_mut(&size) {
            font.standard_uploaded = true;
        }
    }

    /// Picks the face used to rasterize `glyph`: the primary face when it
    /// has a mapping, otherwise the first matching fallback.  With no match
    /// anywhere the primary face is still returned so missing glyphs render
    /// as one consistent box.
    fn identify_font_face_for_glyph(&mut self, glyph: char) -> FaceId {
        if self.faces[0].lookup_glyph_index(glyph) != 0 {
            return 0;
        }
        if !self.fallback_loaded {
            self.load_fallback_fonts();
        }
        for (i, face) in self.faces.iter().enumerate().skip(1) {
            if face.lookup_glyph_index(glyph) != 0 {
                debug!("fallback font {} selected for glyph {:x}", i, glyph as u32);
                return i;
            }
        }
        debug!("glyph {:x} has no appropriate font", glyph as u32);
        0
    }

    /// Load every font file in the fallback directory.  Individual load
    /// failures skip that file; the scan itself happens once.
    fn load_fallback_fonts(&mut self) {
        self.fallback_loaded = true;
        let entries = match fs::read_dir(&self.fallback_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    "Failed to scan fallback fonts folder '{}': {}",
                    self.fallback_dir.display(),
                    e
                );
                return;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if !is_font_file(&path) {
                continue;
            }
            match load_face(&path) {
                Ok(face) => self.faces.push(face),
                Err(msg) => warn!("{}", msg),
            }
        }
    }

    /// On-demand caching for codepoints outside the fixed table.
    ///
    /// The first request resolves the face and records metrics plus the
    /// assigned atlas rect.  Pixels are uploaded only when `sink` is
    /// provided (render paths); measure paths pass `None`.  A glyph whose
    /// row falls outside the texture is marked failed and never retried.
    pub(crate) fn request_cached_glyph(
        &mut self,
        size: u32,
        glyph: Codepoint,
        sink: Option<&mut dyn GlyphSink>,
    ) -> Option<CharInfo> {
        if glyph == INVALID_CODEPOINT {
            return None;
        }
        let ch = char::from_u32(glyph)?;

        let existing = self
            .cached_fonts
            .get(&size)
            .and_then(|font| font.cached_glyphs.get(&glyph))
            .copied();
        match existing {
            Some(GlyphSlot::Failed) => None,
            Some(GlyphSlot::Rasterized { info }) => Some(info),
            Some(GlyphSlot::Measured { info, face }) => match sink {
                None => Some(info),
                Some(sink) => self.rasterize_cached_glyph(sink, size, glyph, ch, info, face),
            },
            None => {
                let face = self.identify_font_face_for_glyph(ch);
                let metrics = self.faces[face].metrics(ch, size as f32);
                let placed = self.cursor.place(metrics.width as u32, metrics.height as u32);
                let info = CharInfo {
                    ax: metrics.advance_width,
                    ay: metrics.advance_height,
                    bw: metrics.width as f32,
                    bh: metrics.height as f32,
                    bl: metrics.xmin as f32,
                    bt: (metrics.ymin + metrics.height as i32) as f32,
                    tx: placed.x as f32 / self.cursor.width() as f32,
                    ty: placed.y as f32 / self.cursor.height() as f32,
                };
                if let Some(font) = self.cached_fonts.get_mut(&size) {
                    font.cached_glyphs
                        .insert(glyph, GlyphSlot::Measured { info, face });
                }
                match sink {
                    None => Some(info),
                    Some(sink) => self.rasterize_cached_glyph(sink, size, glyph, ch, info, face),
                }
            }
        }
    }

    fn rasterize_cached_glyph(
        &mut self,
        sink: &mut dyn GlyphSink,
        size: u32,
        glyph: Codepoint,
        ch: char,
        info: CharInfo,
        face: FaceId,
    ) -> Option<CharInfo> {
        let mark = |atlas: &mut Atlas, slot: GlyphSlot| {
            if let Some(font) = atlas.cached_fonts.get_mut(&size) {
                font.cached_glyphs.insert(glyph, slot);
            }
        };

        let texture = match self.texture {
            Some(tex) => tex,
            None => {
                mark(self, GlyphSlot::Failed);
                return None;
            }
        };
        let (metrics, bitmap) = self.faces[face].rasterize(ch, size as f32);
        let y = (info.ty * self.cursor.height() as f32) as u32;
        // This glyph cannot be rasterized.
        if !self.cursor.fits_vertically(y, metrics.height as u32) {
            mark(self, GlyphSlot::Failed);
            return None;
        }
        let x = (info.tx * self.cursor.width() as f32) as u32;
        sink.submit_glyph_data(
            texture,
            GlyphUpload {
                offset_x: x as i32,
                offset_y: y as i32,
                width: metrics.width as u32,
                height: metrics.height as u32,
                buffer: &bitmap,
            },
        );
        mark(self, GlyphSlot::Rasterized { info });
        Some(info)
    }

    /// Resolves one codepoint to metrics, an x advance and a color class,
    /// applying the marker substitutions: optional whitespace dots, the
    /// carriage return pilcrow, tab arrows with a tabstop-scaled advance,
    /// and `'?'` for anything unrenderable.
    pub(crate) fn extract_glyph_info(
        &mut self,
        size: u32,
        tabstop: u32,
        glyph: Codepoint,
        mut sink: Option<&mut dyn GlyphSink>,
        render_whitespace: bool,
    ) -> GlyphExtract {
        self.ensure_font(sink.as_deref_mut(), size);
        let mut glyph = glyph;
        if glyph >= CHAR_INFO_COUNT {
            if glyph == INVALID_CODEPOINT {
                glyph = '?' as u32;
            } else if let Some(info) = self.request_cached_glyph(size, glyph, sink) {
                return GlyphExtract {
                    info,
                    x_advance: info.ax,
                    color: ColorSelect::Default,
                };
            } else {
                // Either rasterization failed or there is no mapping at all.
                glyph = '?' as u32;
            }
        }
        extract_standard_glyph(self.font(size), tabstop, glyph, render_whitespace)
    }

    #[cfg(test)]
    pub(crate) fn synthetic(font: CachedFont) -> Self {
        let mut cached_fonts = HashMap::new();
        cached_fonts.insert(font.font_size, font);
        Self {
            faces: Vec::new(),
            family: String::from("synthetic"),
            fallback_dir: PathBuf::new(),
            fallback_loaded: true,
            cursor: AtlasCursor::new(TEXTURE_WIDTH, TEXTURE_HEIGHT),
            cached_fonts,
            texture: None,
        }
    }
}

/// The fixed-table half of glyph resolution; never touches the faces.
fn extract_standard_glyph(
    font: &CachedFont,
    tabstop: u32,
    glyph: u32,
    render_whitespace: bool,
) -> GlyphExtract {
    use crate::glyph::SpecialGlyph;

    let mut index = glyph;
    let mut color = ColorSelect::Default;

    if index == ' ' as u32 && render_whitespace {
        index = SpecialGlyph::Whitespace.table_index() as u32;
        color = ColorSelect::Whitespace;
    }

    if index == '\r' as u32 {
        index = SpecialGlyph::CarriageReturn.table_index() as u32;
        color = ColorSelect::CarriageReturn;
    }

    if index == '\t' as u32 {
        index = SpecialGlyph::Tab.table_index() as u32;
        color = ColorSelect::Whitespace;
        if !render_whitespace {
            index = ' ' as u32;
            color = ColorSelect::Default;
        }
        let info = font.infos[index as usize];
        return GlyphExtract {
            info,
            x_advance: info.ax * tabstop as f32,
            color,
        };
    }

    // A control character that survived this far is unrenderable.
    if index < VALID_CHAR_START {
        index = '?' as u32;
    }

    let info = font.infos[index as usize];
    GlyphExtract {
        info,
        x_advance: info.ax,
        color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::MessageLevel;
    use crate::glyph::SpecialGlyph;

    struct NullSink;

    impl GlyphSink for NullSink {
        fn create_glyph_texture(&mut self, _dim: ScreenDimensions) -> Result<GlyphTexture, String> {
            Err("no gpu in tests".to_string())
        }

        fn submit_glyph_data(&mut self, _tex: GlyphTexture, _entry: GlyphUpload<'_>) {}

        fn bind_glyph_texture(&mut self, _tex: GlyphTexture) {}
    }

    fn test_font() -> CachedFont {
        let mut infos = [CharInfo::default(); TOTAL_CHAR_INFO_COUNT];
        for i in VALID_CHAR_START as usize..TOTAL_CHAR_INFO_COUNT {
            infos[i] = CharInfo {
                ax: 10.0 + (i % 7) as f32,
                ay: 0.0,
                bw: 8.0,
                bh: 12.0,
                bl: 1.0,
                bt: 10.0,
                tx: 0.0,
                ty: 0.0,
            };
        }
        CachedFont::synthetic(64, infos)
    }

    #[test]
    fn plain_glyph_reads_table_metrics() {
        let font = test_font();
        let e = extract_standard_glyph(&font, 4, 'A' as u32, false);
        assert_eq!(e.info, font.infos['A' as usize]);
        assert_eq!(e.x_advance, e.info.ax);
        assert_eq!(e.color, ColorSelect::Default);
    }

    #[test]
    fn space_substitutes_marker_only_when_whitespace_rendering() {
        let font = test_font();
        let plain = extract_standard_glyph(&font, 4, ' ' as u32, false);
        assert_eq!(plain.info, font.infos[' ' as usize]);
        assert_eq!(plain.color, ColorSelect::Default);

        let marked = extract_standard_glyph(&font, 4, ' ' as u32, true);
        assert_eq!(
            marked.info,
            font.infos[SpecialGlyph::Whitespace.table_index()]
        );
        assert_eq!(marked.color, ColorSelect::Whitespace);
    }

    #[test]
    fn carriage_return_always_substitutes() {
        let font = test_font();
        let e = extract_standard_glyph(&font, 4, '\r' as u32, false);
        assert_eq!(
            e.info,
            font.infos[SpecialGlyph::CarriageReturn.table_index()]
        );
        assert_eq!(e.color, ColorSelect::CarriageReturn);
    }

    #[test]
    fn tab_scales_advance_by_tabstop() {
        let font = test_font();
        let with_ws = extract_standard_glyph(&font, 8, '\t' as u32, true);
        let tab_info = font.infos[SpecialGlyph::Tab.table_index()];
        assert_eq!(with_ws.info, tab_info);
        assert_eq!(with_ws.x_advance, tab_info.ax * 8.0);
        assert_eq!(with_ws.color, ColorSelect::Whitespace);

        // With whitespace rendering off the advance comes from the plain
        // space glyph instead.
        let without = extract_standard_glyph(&font, 8, '\t' as u32, false);
        assert_eq!(without.x_advance, font.infos[' ' as usize].ax * 8.0);
        assert_eq!(without.color, ColorSelect::Default);
    }

    #[test]
    fn control_characters_render_as_question_mark() {
        let font = test_font();
        let e = extract_standard_glyph(&font, 4, 0x07, false);
        assert_eq!(e.info, font.infos['?' as usize]);
    }

    #[test]
    fn failed_font_swap_keeps_previous_face_and_reports_once() {
        let mut atlas = Atlas::synthetic(test_font());
        let mut sink = NullSink;
        let mut feed = MessageFeed::new();
        atlas.try_load_font_face(&mut sink, "no/such/font.ttf", &mut feed);

        assert_eq!(atlas.font_family(), "synthetic");
        // The per-size caches survive the failed swap untouched.
        assert!(atlas.cached_fonts.contains_key(&64));
        assert_eq!(feed.len(), 1);
        assert_eq!(feed.pop().unwrap().level, MessageLevel::Error);
    }

    #[test]
    fn invalid_codepoint_extracts_question_mark() {
        let mut atlas = Atlas::synthetic(test_font());
        let e = atlas.extract_glyph_info(64, 4, INVALID_CODEPOINT, None, false);
        assert_eq!(e.info, atlas.font(64).infos['?' as usize]);
    }
}
