//! `Surface` implementation over an iced canvas frame.

use iced::widget::canvas;
use iced::{Color, Pixels, Point, Rectangle, Size};
use kurbo::PathEl;

use crate::affine::{Affine, from_kurbo};
use crate::path::Path;
use crate::surface::{Font, LoadedPicture, Surface, TextAlign, TextBaseline};

// ================================================================================
// Pen State
// ================================================================================

#[derive(Debug, Clone)]
struct PenState {
    transform: Affine,
    fill: Color,
    stroke: Color,
    line_width: f32,
    line_dash: Vec<f32>,
    alpha: f32,
    font: Font,
    align: TextAlign,
    baseline: TextBaseline,
}

impl Default for PenState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            fill: Color::BLACK,
            stroke: Color::BLACK,
            line_width: 1.0,
            line_dash: Vec::new(),
            alpha: 1.0,
            font: Font::default(),
            align: TextAlign::default(),
            baseline: TextBaseline::default(),
        }
    }
}

impl PenState {
    fn faded(&self, color: Color) -> Color {
        Color {
            a: (color.a * self.alpha).clamp(0.0, 1.0),
            ..color
        }
    }
}

// ================================================================================
// Frame Surface
// ================================================================================

/// Draws onto a `canvas::Frame`.
///
/// The frame only knows a limited transform stack, so the full affine state
/// is kept here and geometry is mapped to device space before it is handed
/// over. Text and images follow translation and scale; rotation only moves
/// their anchor.
pub struct FrameSurface<'a> {
    frame: &'a mut canvas::Frame,
    pen: PenState,
    saved: Vec<PenState>,
}

impl<'a> FrameSurface<'a> {
    pub fn new(frame: &'a mut canvas::Frame) -> Self {
        Self {
            frame,
            pen: PenState::default(),
            saved: Vec::new(),
        }
    }

    fn device_path(&self, path: &Path) -> canvas::Path {
        let path = path.transformed(&self.pen.transform);
        canvas::Path::new(|builder| {
            for el in path.elements() {
                match *el {
                    PathEl::MoveTo(p) => builder.move_to(from_kurbo(p)),
                    PathEl::LineTo(p) => builder.line_to(from_kurbo(p)),
                    PathEl::QuadTo(c, p) => builder.quadratic_curve_to(from_kurbo(c), from_kurbo(p)),
                    PathEl::CurveTo(c1, c2, p) => {
                        builder.bezier_curve_to(from_kurbo(c1), from_kurbo(c2), from_kurbo(p))
                    }
                    PathEl::ClosePath => builder.close(),
                }
            }
        })
    }

    fn stroke_device_path(&mut self, path: canvas::Path) {
        let scale = self.pen.transform.scale_factor();
        let dash: Vec<f32> = self.pen.line_dash.iter().map(|d| d * scale).collect();

        let mut stroke = canvas::Stroke::default()
            .with_color(self.pen.faded(self.pen.stroke))
            .with_width(self.pen.line_width * scale);
        if !dash.is_empty() {
            stroke.line_dash = canvas::LineDash {
                segments: &dash,
                offset: 0,
            };
        }
        self.frame.stroke(&path, stroke);
    }

    /// Bounding box of `rect` in device space.
    fn device_rect(&self, rect: Rectangle) -> Rectangle {
        let m = &self.pen.transform;
        let corners = [
            m.apply(Point::new(rect.x, rect.y)),
            m.apply(Point::new(rect.x + rect.width, rect.y)),
            m.apply(Point::new(rect.x, rect.y + rect.height)),
            m.apply(Point::new(rect.x + rect.width, rect.y + rect.height)),
        ];
        let (mut min, mut max) = (corners[0], corners[0]);
        for c in &corners[1..] {
            min = Point::new(min.x.min(c.x), min.y.min(c.y));
            max = Point::new(max.x.max(c.x), max.y.max(c.y));
        }
        Rectangle::new(min, Size::new(max.x - min.x, max.y - min.y))
    }

    fn text(&mut self, text: &str, at: Point, color: Color) {
        let width = self.measure_text(text);
        let height = self.pen.font.size;
        let top_left = Point::new(
            at.x + self.pen.align.offset(width),
            at.y + self.pen.baseline.offset(height),
        );

        self.frame.fill_text(canvas::Text {
            content: text.to_owned(),
            position: self.pen.transform.apply(top_left),
            color: self.pen.faded(color),
            size: Pixels(height * self.pen.transform.scale_factor()),
            font: self.pen.font.face,
            ..Default::default()
        });
    }
}

impl Surface for FrameSurface<'_> {
    fn save(&mut self) {
        self.saved.push(self.pen.clone());
    }

    fn restore(&mut self) {
        if let Some(pen) = self.saved.pop() {
            self.pen = pen;
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.pen.transform = self.pen.transform.multiply(&Affine::translation(dx, dy));
    }

    fn rotate(&mut self, angle: f32) {
        self.pen.transform = self.pen.transform.multiply(&Affine::rotation(angle));
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.pen.transform = self.pen.transform.multiply(&Affine::scaling(sx, sy));
    }

    fn transform(&mut self, m: Affine) {
        self.pen.transform = self.pen.transform.multiply(&m);
    }

    fn set_transform(&mut self, m: Affine) {
        self.pen.transform = m;
    }

    fn set_fill_color(&mut self, color: Color) {
        self.pen.fill = color;
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.pen.stroke = color;
    }

    fn set_line_width(&mut self, width: f32) {
        self.pen.line_width = width;
    }

    fn set_line_dash(&mut self, segments: &[f32]) {
        self.pen.line_dash = segments.to_vec();
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.pen.alpha = alpha;
    }

    fn set_font(&mut self, font: Font) {
        self.pen.font = font;
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.pen.align = align;
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.pen.baseline = baseline;
    }

    fn fill_path(&mut self, path: &Path) {
        if path.is_empty() {
            return;
        }
        let device = self.device_path(path);
        self.frame.fill(&device, self.pen.faded(self.pen.fill));
    }

    fn stroke_path(&mut self, path: &Path) {
        if path.is_empty() {
            return;
        }
        let device = self.device_path(path);
        self.stroke_device_path(device);
    }

    fn fill_rect(&mut self, rect: Rectangle) {
        self.fill_path(&Path::rectangle(rect));
    }

    fn stroke_rect(&mut self, rect: Rectangle) {
        self.stroke_path(&Path::rectangle(rect));
    }

    fn fill_text(&mut self, text: &str, at: Point) {
        self.text(text, at, self.pen.fill);
    }

    fn stroke_text(&mut self, text: &str, at: Point) {
        // The canvas has no outlined text; draw it in the stroke color.
        self.text(text, at, self.pen.stroke);
    }

    fn measure_text(&self, text: &str) -> f32 {
        self.pen.font.estimate_width(text)
    }

    fn draw_image(&mut self, picture: &LoadedPicture, source: Option<Rectangle>, target: Rectangle) {
        let mut bounds = self.device_rect(target);

        // Clip by drawing the whole picture scaled so that `source` lands on
        // `target`, inside a clip of the target bounds.
        if let Some(source) = source.filter(|s| s.width > 0.0 && s.height > 0.0) {
            let sx = bounds.width / source.width;
            let sy = bounds.height / source.height;
            let clip = bounds;
            bounds = Rectangle::new(
                Point::new(bounds.x - source.x * sx, bounds.y - source.y * sy),
                Size::new(picture.size.width * sx, picture.size.height * sy),
            );
            let image = canvas::Image::new(picture.handle.clone()).opacity(self.pen.alpha);
            self.frame.with_clip(clip, |frame| {
                let local = Rectangle::new(
                    Point::new(bounds.x - clip.x, bounds.y - clip.y),
                    bounds.size(),
                );
                frame.draw_image(local, image);
            });
            return;
        }

        let image = canvas::Image::new(picture.handle.clone()).opacity(self.pen.alpha);
        self.frame.draw_image(bounds, image);
    }
}
