// GlyphScene
// copyright glyphscene contributors 2023～2026

//! Viewport and scissor regions.  Pure data here; the scene renderer
//! applies them to GL state and knows how to restore what they replaced.

use crate::util::ScreenDimensions;

/// A pixel region rendered into.  Odd dimensions are snapped up to even so
/// centered content never lands on a half pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderViewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl RenderViewport {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width: snap_even(width),
            height: snap_even(height),
        }
    }

    pub fn full_screen(dim: ScreenDimensions) -> Self {
        Self::new(0, 0, dim.width, dim.height)
    }

    pub fn dimensions(&self) -> ScreenDimensions {
        ScreenDimensions::new(self.width, self.height)
    }
}

fn snap_even(v: u32) -> u32 {
    v + (v & 1)
}

/// Clip rectangle in viewport pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScissorRegion {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ScissorRegion {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Remembers whether the scissor test was enabled around each apply, so
/// applies nest: only the outermost reset may switch the test back off.
#[derive(Debug, Default)]
pub struct ScissorStack {
    saved: Vec<bool>,
}

impl ScissorStack {
    pub fn push(&mut self, was_enabled: bool) {
        self.saved.push(was_enabled);
    }

    /// True when the matching apply found the scissor test disabled.  An
    /// unbalanced reset is inert.
    pub fn pop_should_disable(&mut self) -> bool {
        matches!(self.saved.pop(), Some(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_dimensions_snap_up_to_even() {
        let vp = RenderViewport::new(0, 0, 801, 599);
        assert_eq!((vp.width, vp.height), (802, 600));
    }

    #[test]
    fn even_dimensions_are_untouched() {
        let vp = RenderViewport::new(4, 8, 800, 600);
        assert_eq!((vp.width, vp.height), (800, 600));
        assert_eq!((vp.x, vp.y), (4, 8));
    }

    #[test]
    fn full_screen_covers_the_surface() {
        let vp = RenderViewport::full_screen(ScreenDimensions::new(1280, 720));
        assert_eq!(vp, RenderViewport::new(0, 0, 1280, 720));
    }

    #[test]
    fn nested_scissor_saves_restore_outside_in() {
        let mut stack = ScissorStack::default();
        // Outer apply finds the test off, inner apply finds it on.
        stack.push(false);
        stack.push(true);
        // Inner reset keeps the test on for the still-active outer region.
        assert!(!stack.pop_should_disable());
        assert!(stack.pop_should_disable());
        // Unbalanced resets do nothing.
        assert!(!stack.pop_should_disable());
    }
}
