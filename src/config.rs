// GlyphScene
// copyright glyphscene contributors 2023～2026

//! Plain-value configuration consumed by the atlas and the effects layer.
//! Persistence and editing belong to the embedder; this module only parses
//! a TOML document into typed values.

use serde::{Deserialize, Serialize};
use std::fs;

fn default_font_size() -> u32 {
    64
}

fn default_tabstop() -> u32 {
    4
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SystemCore {
    #[serde(default)]
    pub base_asset_path: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SystemFonts {
    #[serde(default)]
    pub fallback_fonts_folder: String,
    #[serde(default)]
    pub current_font: String,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default = "default_tabstop")]
    pub tabstop: u32,
}

impl Default for SystemFonts {
    fn default() -> Self {
        Self {
            fallback_fonts_folder: String::new(),
            current_font: String::new(),
            font_size: default_font_size(),
            tabstop: default_tabstop(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SystemEffects {
    #[serde(default)]
    pub postprocessing_enabled: bool,
    #[serde(default)]
    pub screen_warp: bool,
    #[serde(default)]
    pub text_glow: bool,
    #[serde(default)]
    pub blur_background: bool,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub core: SystemCore,
    #[serde(default)]
    pub fonts: SystemFonts,
    #[serde(default)]
    pub effects: SystemEffects,
}

impl RenderConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| format!("Failed to parse config: {}", e))
    }

    pub fn load(path: &str) -> Result<Self, String> {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path, e))?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_document_with_defaults() {
        let cfg = RenderConfig::from_toml_str(
            r#"
            [fonts]
            current_font = "fonts/main.ttf"
            fallback_fonts_folder = "fonts/fallback"

            [effects]
            text_glow = true
            "#,
        )
        .unwrap();
        assert_eq!(cfg.fonts.current_font, "fonts/main.ttf");
        assert_eq!(cfg.fonts.font_size, 64);
        assert_eq!(cfg.fonts.tabstop, 4);
        assert!(cfg.effects.text_glow);
        assert!(!cfg.effects.screen_warp);
    }

    #[test]
    fn rejects_malformed_document() {
        assert!(RenderConfig::from_toml_str("fonts = 3").is_err());
    }
}
