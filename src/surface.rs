//! The immediate-mode drawing API the engine paints onto.
//!
//! A `Surface` is deliberately close to a 2D canvas: a stateful pen with a
//! transform stack, fill/stroke styles, text and images. Geometry arrives in
//! local coordinates; the surface applies its own current transform.

use std::sync::{Arc, OnceLock};

use iced::widget::image;
use iced::{Color, Point, Rectangle, Size};

use crate::affine::Affine;
use crate::path::Path;

/// Average glyph advance relative to the font size, used where a backend
/// cannot measure text.
pub const AVERAGE_ADVANCE: f32 = 0.6;

pub trait Surface {
    /// Push the current transform and style state.
    fn save(&mut self);
    /// Pop the state pushed by the matching `save`.
    fn restore(&mut self);

    fn translate(&mut self, dx: f32, dy: f32);
    fn rotate(&mut self, angle: f32);
    fn scale(&mut self, sx: f32, sy: f32);
    /// Multiply the current transform by `m`.
    fn transform(&mut self, m: Affine);
    /// Replace the current transform by `m`.
    fn set_transform(&mut self, m: Affine);

    fn set_fill_color(&mut self, color: Color);
    fn set_stroke_color(&mut self, color: Color);
    fn set_line_width(&mut self, width: f32);
    fn set_line_dash(&mut self, segments: &[f32]);
    fn set_global_alpha(&mut self, alpha: f32);

    fn set_font(&mut self, font: Font);
    fn set_text_align(&mut self, align: TextAlign);
    fn set_text_baseline(&mut self, baseline: TextBaseline);

    fn fill_path(&mut self, path: &Path);
    fn stroke_path(&mut self, path: &Path);
    fn fill_rect(&mut self, rect: Rectangle);
    fn stroke_rect(&mut self, rect: Rectangle);

    fn fill_text(&mut self, text: &str, at: Point);
    fn stroke_text(&mut self, text: &str, at: Point);
    /// Advance width of `text` in the current font, in local units.
    fn measure_text(&self, text: &str) -> f32;

    /// Draw the `source` region of a picture (the whole picture when `None`)
    /// into `target`.
    fn draw_image(&mut self, picture: &LoadedPicture, source: Option<Rectangle>, target: Rectangle);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Font {
    pub size: f32,
    pub face: iced::Font,
}

impl Default for Font {
    fn default() -> Self {
        Font::new(12.0)
    }
}

impl Font {
    pub fn new(size: f32) -> Self {
        Self {
            size,
            face: iced::Font::DEFAULT,
        }
    }

    pub fn bold(size: f32) -> Self {
        Self {
            size,
            face: iced::Font {
                weight: iced::font::Weight::Bold,
                ..iced::Font::DEFAULT
            },
        }
    }

    /// Naive text width for surfaces without a shaper.
    pub fn estimate_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.size * AVERAGE_ADVANCE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    /// Horizontal offset of the text box start relative to the anchor.
    pub fn offset(self, width: f32) -> f32 {
        match self {
            TextAlign::Left => 0.0,
            TextAlign::Center => -0.5 * width,
            TextAlign::Right => -width,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    Top,
    Middle,
    #[default]
    Bottom,
}

impl TextBaseline {
    /// Vertical offset of the text box top relative to the anchor.
    pub fn offset(self, height: f32) -> f32 {
        match self {
            TextBaseline::Top => 0.0,
            TextBaseline::Middle => -0.5 * height,
            TextBaseline::Bottom => -height,
        }
    }
}

/// Pixel data that finished loading.
#[derive(Debug, Clone)]
pub struct LoadedPicture {
    pub handle: image::Handle,
    /// Size in pixels.
    pub size: Size,
    /// Size in layout units for buffers rendered at a higher pixel ratio.
    pub logical_size: Option<Size>,
}

impl LoadedPicture {
    pub fn new(handle: image::Handle, width: u32, height: u32) -> Self {
        Self {
            handle,
            size: Size::new(width as f32, height as f32),
            logical_size: None,
        }
    }

    pub fn with_logical_size(mut self, size: Size) -> Self {
        self.logical_size = Some(size);
        self
    }

    /// The size the picture occupies when drawn without explicit dimensions.
    pub fn natural_size(&self) -> Size {
        self.logical_size.unwrap_or(self.size)
    }
}

/// A picture that may still be loading.
///
/// Clones share the same slot, so a loader thread can fill it while views
/// keep drawing; until then drawing it is a no-op.
#[derive(Debug, Clone, Default)]
pub struct Picture {
    slot: Arc<OnceLock<LoadedPicture>>,
}

impl Picture {
    pub fn pending() -> Self {
        Self::default()
    }

    pub fn loaded(picture: LoadedPicture) -> Self {
        let slot = OnceLock::new();
        let _ = slot.set(picture);
        Self {
            slot: Arc::new(slot),
        }
    }

    /// Fill the slot. Returns `false` when it was already loaded.
    pub fn resolve(&self, picture: LoadedPicture) -> bool {
        self.slot.set(picture).is_ok()
    }

    pub fn get(&self) -> Option<&LoadedPicture> {
        self.slot.get()
    }

    pub fn is_ready(&self) -> bool {
        self.slot.get().is_some()
    }
}
