//! A headless surface that records a display list.
//!
//! Useful for snapshotting a frame without a window, and for asserting what
//! the engine painted.

use iced::{Color, Point, Rectangle};

use crate::affine::Affine;
use crate::path::Path;
use crate::surface::{Font, LoadedPicture, Surface, TextAlign, TextBaseline};

#[derive(Debug, Clone, PartialEq)]
pub struct Pen {
    pub transform: Affine,
    pub fill: Color,
    pub stroke: Color,
    pub line_width: f32,
    pub line_dash: Vec<f32>,
    pub alpha: f32,
    pub font: Font,
    pub align: TextAlign,
    pub baseline: TextBaseline,
}

impl Default for Pen {
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

/// One drawing operation, with the pen state it was issued under.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Save,
    Restore,
    FillPath { path: Path, pen: Pen },
    StrokePath { path: Path, pen: Pen },
    FillRect { rect: Rectangle, pen: Pen },
    StrokeRect { rect: Rectangle, pen: Pen },
    FillText { text: String, at: Point, pen: Pen },
    StrokeText { text: String, at: Point, pen: Pen },
    DrawImage {
        source: Option<Rectangle>,
        target: Rectangle,
        pen: Pen,
    },
}

impl Command {
    pub fn pen(&self) -> Option<&Pen> {
        match self {
            Command::Save | Command::Restore => None,
            Command::FillPath { pen, .. }
            | Command::StrokePath { pen, .. }
            | Command::FillRect { pen, .. }
            | Command::StrokeRect { pen, .. }
            | Command::FillText { pen, .. }
            | Command::StrokeText { pen, .. }
            | Command::DrawImage { pen, .. } => Some(pen),
        }
    }

    pub fn is_draw(&self) -> bool {
        self.pen().is_some()
    }
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pen: Pen,
    saved: Vec<Pen>,
    commands: Vec<Command>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Drawing commands only, without save/restore bookkeeping.
    pub fn draws(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter().filter(|c| c.is_draw())
    }

    pub fn take(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn matrix(&self) -> Affine {
        self.pen.transform
    }

    pub fn pen(&self) -> &Pen {
        &self.pen
    }
}

impl Surface for RecordingSurface {
    fn save(&mut self) {
        self.saved.push(self.pen.clone());
        self.commands.push(Command::Save);
    }

    fn restore(&mut self) {
        if let Some(pen) = self.saved.pop() {
            self.pen = pen;
        }
        self.commands.push(Command::Restore);
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
        self.commands.push(Command::FillPath {
            path: path.clone(),
            pen: self.pen.clone(),
        });
    }

    fn stroke_path(&mut self, path: &Path) {
        self.commands.push(Command::StrokePath {
            path: path.clone(),
            pen: self.pen.clone(),
        });
    }

    fn fill_rect(&mut self, rect: Rectangle) {
        self.commands.push(Command::FillRect {
            rect,
            pen: self.pen.clone(),
        });
    }

    fn stroke_rect(&mut self, rect: Rectangle) {
        self.commands.push(Command::StrokeRect {
            rect,
            pen: self.pen.clone(),
        });
    }

    fn fill_text(&mut self, text: &str, at: Point) {
        self.commands.push(Command::FillText {
            text: text.to_owned(),
            at,
            pen: self.pen.clone(),
        });
    }

    fn stroke_text(&mut self, text: &str, at: Point) {
        self.commands.push(Command::StrokeText {
            text: text.to_owned(),
            at,
            pen: self.pen.clone(),
        });
    }

    fn measure_text(&self, text: &str) -> f32 {
        self.pen.font.estimate_width(text)
    }

    fn draw_image(&mut self, _picture: &LoadedPicture, source: Option<Rectangle>, target: Rectangle) {
        self.commands.push(Command::DrawImage {
            source,
            target,
            pen: self.pen.clone(),
        });
    }
}
