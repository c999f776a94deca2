// GlyphScene
// copyright glyphscene contributors 2023～2026

//! Shader identifiers and their GLSL sources.  Every source is compiled
//! into the binary; at runtime a source can also be reloaded from the
//! shader directory on disk for live iteration.

use std::fs;

use crate::util::combine_paths;

/// Vertex transforms: how pixel coordinates become clip space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VertShader {
    /// Camera-relative world coordinates.
    CameraTransform,
    /// Pixel coordinates centered on the origin.
    NoTransform,
    /// Pixel coordinates with the origin at the corner, one texel per
    /// pixel.  Used when copying between surfaces.
    OneOneTransform,
}

impl VertShader {
    pub const ALL: [VertShader; 3] = [
        VertShader::CameraTransform,
        VertShader::NoTransform,
        VertShader::OneOneTransform,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            VertShader::CameraTransform => "transform.vert",
            VertShader::NoTransform => "no-transform.vert",
            VertShader::OneOneTransform => "one-one-transform.vert",
        }
    }

    pub fn builtin_source(self) -> &'static str {
        match self {
            VertShader::CameraTransform => include_str!("../../assets/shaders/transform.vert"),
            VertShader::NoTransform => include_str!("../../assets/shaders/no-transform.vert"),
            VertShader::OneOneTransform => {
                include_str!("../../assets/shaders/one-one-transform.vert")
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FragShader {
    BasicColor,
    SolidCircle,
    Image,
    Text,
    /// Current texture plus the previous pass texture.
    BasicTextureBlend,
    BlurHoriz,
    BlurVert,
    CrtWarp,
}

impl FragShader {
    pub const ALL: [FragShader; 8] = [
        FragShader::BasicColor,
        FragShader::SolidCircle,
        FragShader::Image,
        FragShader::Text,
        FragShader::BasicTextureBlend,
        FragShader::BlurHoriz,
        FragShader::BlurVert,
        FragShader::CrtWarp,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            FragShader::BasicColor => "basic-color.frag",
            FragShader::SolidCircle => "solid-circle.frag",
            FragShader::Image => "image.frag",
            FragShader::Text => "text.frag",
            FragShader::BasicTextureBlend => "basic-texture-blend.frag",
            FragShader::BlurHoriz => "blur-horiz.frag",
            FragShader::BlurVert => "blur-vert.frag",
            FragShader::CrtWarp => "crt-warp.frag",
        }
    }

    pub fn builtin_source(self) -> &'static str {
        match self {
            FragShader::BasicColor => include_str!("../../assets/shaders/basic-color.frag"),
            FragShader::SolidCircle => include_str!("../../assets/shaders/solid-circle.frag"),
            FragShader::Image => include_str!("../../assets/shaders/image.frag"),
            FragShader::Text => include_str!("../../assets/shaders/text.frag"),
            FragShader::BasicTextureBlend => {
                include_str!("../../assets/shaders/basic-texture-blend.frag")
            }
            FragShader::BlurHoriz => include_str!("../../assets/shaders/blur-horiz.frag"),
            FragShader::BlurVert => include_str!("../../assets/shaders/blur-vert.frag"),
            FragShader::CrtWarp => include_str!("../../assets/shaders/crt-warp.frag"),
        }
    }
}

/// Reads one shader from the on-disk shader directory.
pub fn disk_source(shader_root: &str, file_name: &str) -> Result<String, String> {
    let path = combine_paths(shader_root, file_name);
    fs::read_to_string(&path).map_err(|e| format!("Failed to read shader '{}': {}", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_sources_declare_a_version() {
        for vert in VertShader::ALL {
            assert!(vert.builtin_source().starts_with("#version 330"));
        }
        for frag in FragShader::ALL {
            assert!(frag.builtin_source().starts_with("#version 330"));
        }
    }

    #[test]
    fn file_names_are_unique() {
        let mut names: Vec<&str> = VertShader::ALL
            .iter()
            .map(|v| v.file_name())
            .chain(FragShader::ALL.iter().map(|f| f.file_name()))
            .collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), VertShader::ALL.len() + FragShader::ALL.len());
    }
}
