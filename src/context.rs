//! The per-frame drawing façade handed to snippets.
//!
//! Every primitive routes its numbers through [`ViewContext::t`], so a
//! snippet that paints the same calls with new values animates toward them
//! without keeping any state itself. Filled, text and image primitives are
//! also tested against the pointer as they are drawn.

use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use iced::{Color, Point, Rectangle, Size, Vector};

use crate::affine::Affine;
use crate::error::Error;
use crate::interp::{Intermediate, Timing};
use crate::path::Path;
use crate::registry::{DrawManager, SnippetKey};
use crate::snippet::{self, Replay, Snippet};
use crate::surface::{Font, Picture, Surface, TextAlign, TextBaseline};
use crate::tracker::Tracked;

/// A pointer intersection with a drawn primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub key: SnippetKey,
    /// Pointer position in the snippet's local coordinates.
    pub local: Point,
    /// Pointer position relative to the hit rectangle, in `[0, 1]²`.
    pub normalized: Option<Point>,
}

/// Text and alpha state that `save`/`restore` bracket together with the
/// surface.
#[derive(Debug, Clone, Copy)]
struct Pen {
    font: Font,
    align: TextAlign,
    baseline: TextBaseline,
    alpha: f32,
}

impl Default for Pen {
    fn default() -> Self {
        Self {
            font: Font::default(),
            align: TextAlign::default(),
            baseline: TextBaseline::default(),
            alpha: 1.0,
        }
    }
}

pub struct ViewContext<'a> {
    surface: &'a mut Tracked<dyn Surface + 'a>,
    pub(crate) manager: &'a mut DrawManager,
    timing: Timing,
    dt: f32,
    dimensions: Size,
    pointer: Option<Point>,
    local_pointer: Option<Point>,
    hits: Vec<Hit>,
    errors: Vec<Error>,
    active: Option<usize>,
    transitioning: bool,
    picking: bool,
    replaying: bool,
    path: Path,
    pen: Pen,
    saved: Vec<Pen>,
}

impl<'a> ViewContext<'a> {
    /// A context for one frame. `dt` is the clamped step in milliseconds and
    /// `pointer` is in device coordinates, `None` while it is off the surface.
    pub fn new(
        surface: &'a mut Tracked<dyn Surface + 'a>,
        manager: &'a mut DrawManager,
        timing: Timing,
        dt: f32,
        dimensions: Size,
        pointer: Option<Point>,
    ) -> Self {
        let mut ctx = Self {
            surface,
            manager,
            timing,
            dt,
            dimensions,
            pointer,
            local_pointer: None,
            hits: Vec::new(),
            errors: Vec::new(),
            active: None,
            transitioning: false,
            picking: false,
            replaying: false,
            path: Path::new(),
            pen: Pen::default(),
            saved: Vec::new(),
        };
        ctx.update_pointer();
        ctx
    }

    // ================================================================================
    // Snippets
    // ================================================================================

    /// Paint `snippet`, remembering it for interpolation and fade-out.
    pub fn snippet<T: Snippet<Args = ()>>(&mut self, snippet: &Rc<T>) {
        self.enter(snippet.key(), snippet::replay(snippet, ()), false);
    }

    /// Paint `snippet` with extra arguments; the arguments are kept so the
    /// exact call can be repeated while the snippet fades out.
    pub fn snippet_with<T: Snippet>(&mut self, snippet: &Rc<T>, args: T::Args) {
        self.enter(snippet.key(), snippet::replay(snippet, args), true);
    }

    pub fn snippets<'s, T>(&mut self, snippets: impl IntoIterator<Item = &'s Rc<T>>)
    where
        T: Snippet<Args = ()>,
    {
        for s in snippets {
            self.snippet(s);
        }
    }

    pub fn snippets_with<'s, T>(&mut self, snippets: impl IntoIterator<Item = &'s Rc<T>>, args: T::Args)
    where
        T: Snippet,
    {
        for s in snippets {
            self.snippet_with(s, args.clone());
        }
    }

    /// Top-level invocations are isolated: a panicking snippet is recorded
    /// and the frame goes on.
    fn enter(&mut self, key: SnippetKey, call: Replay, has_args: bool) {
        if self.active.is_some() {
            self.enter_unguarded(key, call, has_args);
            return;
        }

        let depth = self.surface.depth();
        let transform = self.surface.current();
        let saved = self.saved.len();
        let hits = self.hits.len();
        let (transitioning, picking, pen) = (self.transitioning, self.picking, self.pen);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.enter_unguarded(key, call, has_args);
        }));

        if let Err(payload) = result {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_owned());
            tracing::error!(%key, %message, "snippet paint failed");

            self.surface.restore_to(depth);
            self.surface.set_transform(transform);
            self.saved.truncate(saved);
            self.hits.truncate(hits);
            self.active = None;
            self.transitioning = transitioning;
            self.picking = picking;
            self.pen = pen;
            self.surface.set_global_alpha(pen.alpha);
            self.path.clear();
            self.update_pointer();
            self.errors.push(Error::SnippetPanicked { key, message });
        }
    }

    fn enter_unguarded(&mut self, key: SnippetKey, call: Replay, has_args: bool) {
        let index = self.manager.get_or_create(key, self.timing.initial_presence());
        let transform = self.surface.current();
        let replaying = self.replaying;

        if let Some(state) = self.manager.get_mut(index) {
            if !state.drawn {
                state.calls.clear();
                // Painted again after fading: start over from the new targets.
                if state.fading && !replaying {
                    state.intermediates.clear();
                    state.fading = false;
                }
            }
            state.drawn = true;
            state.instance = Some(Rc::clone(&call));
            if has_args {
                state.calls.push(Rc::clone(&call));
            }
            state.call_index = 0;
            state.transform = transform;
        }

        let outer = (self.active, self.transitioning, self.picking);
        self.active = Some(index);
        self.transitioning = true;
        self.picking = false;

        (*call)(self);

        if let Some(state) = self.manager.get_mut(index) {
            state.transitioning = self.transitioning;
        }
        (self.active, self.transitioning, self.picking) = outer;
    }

    /// Repeat the recorded invocations of a snippet that was not painted this
    /// frame, at the transform it was last painted with.
    pub(crate) fn replay(&mut self, key: SnippetKey, transform: Affine, calls: Vec<Replay>, has_args: bool) {
        self.set_transform(transform);
        self.replaying = true;
        for call in calls {
            self.enter(key, call, has_args);
        }
        self.replaying = false;
    }

    // ================================================================================
    // Interpolation
    // ================================================================================

    /// Transition toward `target`, returning the value to draw this frame.
    ///
    /// Call sites are matched by their order within the snippet's paint, so
    /// a paint should make the same sequence of calls every frame.
    pub fn t(&mut self, target: f32) -> f32 {
        if !self.transitioning {
            return target;
        }
        let Some(index) = self.active else {
            return target;
        };
        let Some(state) = self.manager.get_mut(index) else {
            return target;
        };

        let i = state.call_index;
        state.call_index += 1;
        if i >= state.intermediates.len() {
            let seed = if target.is_finite() { target } else { 0.0 };
            state.intermediates.push(Intermediate::at(seed));
        }
        state.intermediates[i].step(target, self.dt, self.timing.movement_ms)
    }

    /// Consume a call site without a target, leaving it unset.
    fn hold(&mut self) {
        if !self.transitioning {
            return;
        }
        let Some(state) = self.active.and_then(|i| self.manager.get_mut(i)) else {
            return;
        };

        let i = state.call_index;
        state.call_index += 1;
        if i >= state.intermediates.len() {
            state.intermediates.push(Intermediate::unset());
        } else {
            state.intermediates[i] = Intermediate::unset();
        }
    }

    pub fn t_point(&mut self, p: Point) -> Point {
        let x = self.t(p.x);
        let y = self.t(p.y);
        Point::new(x, y)
    }

    pub fn t_vector(&mut self, v: Vector) -> Vector {
        let x = self.t(v.x);
        let y = self.t(v.y);
        Vector::new(x, y)
    }

    pub fn t_size(&mut self, s: Size) -> Size {
        let w = self.t(s.width);
        let h = self.t(s.height);
        Size::new(w, h)
    }

    pub fn t_rect(&mut self, r: Rectangle) -> Rectangle {
        let origin = self.t_point(Point::new(r.x, r.y));
        let size = self.t_size(r.size());
        Rectangle::new(origin, size)
    }

    /// Interpolate every channel; alpha is also scaled by presence, which is
    /// what makes snippets fade.
    pub fn t_color(&mut self, color: Color) -> Color {
        let r = self.t(color.r);
        let g = self.t(color.g);
        let b = self.t(color.b);
        let a = self.t(color.a) * self.presence();
        Color::from_rgba(r, g, b, a.clamp(0.0, 1.0))
    }

    // ================================================================================
    // State
    // ================================================================================

    /// Opacity of the active snippet; 1 outside snippets.
    pub fn presence(&self) -> f32 {
        self.active
            .and_then(|i| self.manager.get(i))
            .map_or(1.0, |s| s.opacity())
    }

    pub fn active(&self) -> Option<SnippetKey> {
        self.active.and_then(|i| self.manager.get(i)).map(|s| s.key())
    }

    pub fn dimensions(&self) -> Size {
        self.dimensions
    }

    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    /// The pointer in current local coordinates; `None` when there is no
    /// pointer or under a singular transform.
    pub fn local_pointer(&self) -> Option<Point> {
        self.local_pointer
    }

    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    /// Enable or disable interpolation for the rest of the active snippet.
    pub fn set_transitioning(&mut self, transitioning: bool) {
        self.transitioning = transitioning;
    }

    pub fn is_picking(&self) -> bool {
        self.picking
    }

    /// Enable or disable hit recording for the following primitives.
    pub fn set_picking(&mut self, picking: bool) {
        self.picking = picking;
    }

    pub(crate) fn finish(self) -> (Vec<Hit>, Vec<Error>) {
        (self.hits, self.errors)
    }

    fn update_pointer(&mut self) {
        let inverse = self.surface.current().invert();
        self.local_pointer = self.pointer.zip(inverse).map(|(p, inv)| inv.apply(p));
    }

    fn push_hit(&mut self, normalized: Option<Point>) {
        if !self.picking {
            return;
        }
        let (Some(key), Some(local)) = (self.active(), self.local_pointer) else {
            return;
        };
        self.hits.push(Hit {
            key,
            local,
            normalized,
        });
    }

    /// Hit-test an axis-aligned box in local coordinates.
    fn hit_rect(&mut self, rect: Rectangle, normalize: bool) {
        let Some(p) = self.local_pointer else {
            return;
        };
        let inside = rect.x <= p.x
            && rect.y <= p.y
            && p.x <= rect.x + rect.width
            && p.y <= rect.y + rect.height;
        if !inside {
            return;
        }

        let normalized = (normalize && rect.width != 0.0 && rect.height != 0.0)
            .then(|| Point::new((p.x - rect.x) / rect.width, (p.y - rect.y) / rect.height));
        self.push_hit(normalized);
    }

    // ================================================================================
    // Styles
    // ================================================================================

    pub fn fill_style(&mut self, color: Color) {
        let color = self.t_color(color);
        self.surface.set_fill_color(color);
    }

    pub fn stroke_style(&mut self, color: Color) {
        let color = self.t_color(color);
        self.surface.set_stroke_color(color);
    }

    pub fn line_width(&mut self, width: f32) {
        let width = self.t(width);
        self.surface.set_line_width(width);
    }

    pub fn line_dash(&mut self, segments: &[f32]) {
        self.surface.set_line_dash(segments);
    }

    pub fn global_alpha(&mut self, alpha: f32) {
        let alpha = self.t(alpha);
        self.pen.alpha = alpha;
        self.surface.set_global_alpha(alpha);
    }

    /// Fonts are not interpolated; scaling glyphs looks wrong.
    pub fn font(&mut self, font: Font) {
        self.pen.font = font;
        self.surface.set_font(font);
    }

    pub fn text_align(&mut self, align: TextAlign) {
        self.pen.align = align;
        self.surface.set_text_align(align);
    }

    pub fn text_baseline(&mut self, baseline: TextBaseline) {
        self.pen.baseline = baseline;
        self.surface.set_text_baseline(baseline);
    }

    // ================================================================================
    // Transforms
    // ================================================================================

    pub fn save(&mut self) {
        self.saved.push(self.pen);
        self.surface.save();
    }

    pub fn restore(&mut self) {
        if let Some(pen) = self.saved.pop() {
            self.pen = pen;
        }
        self.surface.restore();
        self.update_pointer();
    }

    pub fn translate(&mut self, offset: Vector) {
        let offset = self.t_vector(offset);
        self.surface.translate(offset.x, offset.y);
        self.update_pointer();
    }

    pub fn rotate(&mut self, angle: f32) {
        let angle = self.t(angle);
        self.surface.rotate(angle);
        self.update_pointer();
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        let sx = self.t(sx);
        let sy = self.t(sy);
        self.surface.scale(sx, sy);
        self.update_pointer();
    }

    pub fn transform(&mut self, m: Affine) {
        self.surface.transform(m);
        self.update_pointer();
    }

    pub fn set_transform(&mut self, m: Affine) {
        self.surface.set_transform(m);
        self.update_pointer();
    }

    // ================================================================================
    // Paths
    // ================================================================================

    pub fn begin_path(&mut self) {
        self.path.clear();
    }

    pub fn close_path(&mut self) {
        self.path.close();
    }

    pub fn move_to(&mut self, p: Point) {
        let p = self.t_point(p);
        self.path.move_to(p);
    }

    pub fn line_to(&mut self, p: Point) {
        let p = self.t_point(p);
        self.path.line_to(p);
    }

    pub fn arc_to(&mut self, corner: Point, to: Point, radius: f32) {
        let corner = self.t_point(corner);
        let to = self.t_point(to);
        let radius = self.t(radius);
        self.path.arc_to(corner, to, radius);
    }

    pub fn ellipse(&mut self, center: Point, radii: Vector) {
        let center = self.t_point(center);
        let radii = self.t_vector(radii);
        self.path.ellipse(center, radii);
    }

    /// Fill the current path; a hit when the pointer lies inside it.
    pub fn fill(&mut self) {
        self.surface.fill_path(&self.path);
        if self.local_pointer.is_some_and(|p| self.path.contains(p)) {
            self.push_hit(None);
        }
    }

    pub fn stroke(&mut self) {
        self.surface.stroke_path(&self.path);
    }

    // ================================================================================
    // Shapes
    // ================================================================================

    pub fn fill_rect(&mut self, rect: Rectangle) {
        let rect = self.t_rect(rect);
        self.surface.fill_rect(rect);
        self.hit_rect(rect, true);
    }

    pub fn stroke_rect(&mut self, rect: Rectangle) {
        let rect = self.t_rect(rect);
        self.surface.stroke_rect(rect);
    }

    fn round_rect_path(&mut self, rect: Rectangle, radius: f32) {
        let rect = self.t_rect(rect);
        let radius = self.t(radius);
        self.path = Path::rounded_rect(rect, radius);
    }

    pub fn fill_round_rect(&mut self, rect: Rectangle, radius: f32) {
        self.round_rect_path(rect, radius);
        self.fill();
    }

    pub fn stroke_round_rect(&mut self, rect: Rectangle, radius: f32) {
        self.round_rect_path(rect, radius);
        self.stroke();
    }

    pub fn stroke_line(&mut self, from: Point, to: Point) {
        self.begin_path();
        self.move_to(from);
        self.line_to(to);
        self.stroke();
    }

    /// Fill an ellipse; a hit when the pointer is within the mean radius of
    /// its center.
    pub fn fill_ellipse(&mut self, center: Point, radii: Vector) {
        self.begin_path();
        let center = self.t_point(center);
        let radii = self.t_vector(radii);
        self.path.ellipse(center, radii);
        self.surface.fill_path(&self.path);

        if let Some(p) = self.local_pointer {
            let d = p - center;
            if (d.x * d.x + d.y * d.y).sqrt() <= 0.5 * (radii.x + radii.y) {
                self.push_hit(None);
            }
        }
    }

    pub fn stroke_ellipse(&mut self, center: Point, radii: Vector) {
        self.begin_path();
        self.ellipse(center, radii);
        self.stroke();
    }

    // ================================================================================
    // Text
    // ================================================================================

    fn text_box(&self, text: &str, at: Point) -> Rectangle {
        let width = self.surface.measure_text(text);
        let height = self.pen.font.size;
        Rectangle::new(
            Point::new(at.x + self.pen.align.offset(width), at.y + self.pen.baseline.offset(height)),
            Size::new(width, height),
        )
    }

    pub fn fill_text(&mut self, text: &str, at: Point) {
        let at = self.t_point(at);
        self.surface.fill_text(text, at);
        let bounds = self.text_box(text, at);
        self.hit_rect(bounds, false);
    }

    pub fn stroke_text(&mut self, text: &str, at: Point) {
        let at = self.t_point(at);
        self.surface.stroke_text(text, at);
        let bounds = self.text_box(text, at);
        self.hit_rect(bounds, false);
    }

    pub fn measure_text(&self, text: &str) -> f32 {
        self.surface.measure_text(text)
    }

    // ================================================================================
    // Images
    // ================================================================================

    /// Draw a picture at its natural size.
    ///
    /// While the picture is pending its size is unknown, so the size call
    /// sites are held unset and take the natural size on the first loaded
    /// frame instead of growing from zero.
    pub fn draw_image(&mut self, picture: &Picture, at: Point) {
        let at = self.t_point(at);
        let size = match picture.get() {
            Some(loaded) => self.t_size(loaded.natural_size()),
            None => {
                self.hold();
                self.hold();
                Size::ZERO
            }
        };
        self.paint_picture(picture, None, Rectangle::new(at, size));
    }

    pub fn draw_image_scaled(&mut self, picture: &Picture, at: Point, size: Size) {
        let target = self.t_rect(Rectangle::new(at, size));
        self.paint_picture(picture, None, target);
    }

    /// Draw the `source` region of a picture into `target`.
    pub fn draw_image_clipped(&mut self, picture: &Picture, source: Rectangle, target: Rectangle) {
        let source = self.t_rect(source);
        let target = self.t_rect(target);
        self.paint_picture(picture, Some(source), target);
    }

    fn paint_picture(&mut self, picture: &Picture, source: Option<Rectangle>, target: Rectangle) {
        // Not loaded yet: nothing to draw and nothing to hit.
        let Some(loaded) = picture.get() else {
            return;
        };

        let presence = self.presence();
        self.surface.set_global_alpha(presence);
        self.surface.draw_image(loaded, source, target);
        self.surface.set_global_alpha(self.pen.alpha);

        self.hit_rect(target, true);
    }
}
