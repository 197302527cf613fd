//! Transform tracking for surfaces that cannot report their own matrix.

use iced::{Color, Point, Rectangle};

use crate::affine::Affine;
use crate::path::Path;
use crate::surface::{Font, LoadedPicture, Surface, TextAlign, TextBaseline};

/// Wraps a surface and mirrors every transform operation into a matrix the
/// engine can read back and invert.
///
/// There is one tracker per surface; snippets never own one.
#[derive(Debug)]
pub struct Tracked<S: ?Sized> {
    current: Affine,
    stack: Vec<Affine>,
    inner: S,
}

impl<S: Surface> Tracked<S> {
    pub fn new(inner: S) -> Self {
        Self {
            current: Affine::IDENTITY,
            stack: Vec::new(),
            inner,
        }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Surface + ?Sized> Tracked<S> {
    /// Cumulative local → device matrix.
    pub fn current(&self) -> Affine {
        self.current
    }

    /// Device → local matrix; identity when the current matrix is singular.
    pub fn inverse(&self) -> Affine {
        self.current.inverse_or_identity()
    }

    /// Number of pending `save` calls.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Pop saved states until only `depth` remain.
    pub fn restore_to(&mut self, depth: usize) {
        while self.stack.len() > depth {
            self.restore();
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: Surface + ?Sized> Surface for Tracked<S> {
    fn save(&mut self) {
        self.stack.push(self.current);
        self.inner.save();
    }

    fn restore(&mut self) {
        self.current = self.stack.pop().unwrap_or(Affine::IDENTITY);
        self.inner.restore();
        // An unbalanced restore leaves the inner surface wherever it was.
        self.inner.set_transform(self.current);
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.current = self.current.multiply(&Affine::translation(dx, dy));
        self.inner.translate(dx, dy);
    }

    fn rotate(&mut self, angle: f32) {
        self.current = self.current.multiply(&Affine::rotation(angle));
        self.inner.rotate(angle);
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.current = self.current.multiply(&Affine::scaling(sx, sy));
        self.inner.scale(sx, sy);
    }

    fn transform(&mut self, m: Affine) {
        self.current = self.current.multiply(&m);
        self.inner.transform(m);
    }

    fn set_transform(&mut self, m: Affine) {
        self.current = m;
        self.inner.set_transform(m);
    }

    fn set_fill_color(&mut self, color: Color) {
        self.inner.set_fill_color(color);
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.inner.set_stroke_color(color);
    }

    fn set_line_width(&mut self, width: f32) {
        self.inner.set_line_width(width);
    }

    fn set_line_dash(&mut self, segments: &[f32]) {
        self.inner.set_line_dash(segments);
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.inner.set_global_alpha(alpha);
    }

    fn set_font(&mut self, font: Font) {
        self.inner.set_font(font);
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.inner.set_text_align(align);
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.inner.set_text_baseline(baseline);
    }

    fn fill_path(&mut self, path: &Path) {
        self.inner.fill_path(path);
    }

    fn stroke_path(&mut self, path: &Path) {
        self.inner.stroke_path(path);
    }

    fn fill_rect(&mut self, rect: Rectangle) {
        self.inner.fill_rect(rect);
    }

    fn stroke_rect(&mut self, rect: Rectangle) {
        self.inner.stroke_rect(rect);
    }

    fn fill_text(&mut self, text: &str, at: Point) {
        self.inner.fill_text(text, at);
    }

    fn stroke_text(&mut self, text: &str, at: Point) {
        self.inner.stroke_text(text, at);
    }

    fn measure_text(&self, text: &str) -> f32 {
        self.inner.measure_text(text)
    }

    fn draw_image(&mut self, picture: &LoadedPicture, source: Option<Rectangle>, target: Rectangle) {
        self.inner.draw_image(picture, source, target);
    }
}
