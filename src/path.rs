//! 2D paths with canvas building semantics over [`kurbo::BezPath`].
//!
//! Containment and bounds come from [`kurbo::Shape`]; this module only adds
//! what a canvas path does on top of a plain Bézier path: implicit subpath
//! starts, lines after `close` resuming at the subpath origin, and `arc_to`.

use std::f64::consts::PI;

use iced::{Point, Rectangle, Size, Vector};
use kurbo::{BezPath, PathEl, Shape, Vec2};

use crate::affine::{Affine, from_kurbo, to_kurbo};

/// Accuracy used when curves are expanded into Bézier segments.
const TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    inner: BezPath,
    /// Start of the current subpath.
    start: Option<kurbo::Point>,
    /// End of the last segment, `None` right after `close`.
    current: Option<kurbo::Point>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rectangle(rect: Rectangle) -> Self {
        let mut path = Path::new();
        path.move_to(Point::new(rect.x, rect.y));
        path.line_to(Point::new(rect.x + rect.width, rect.y));
        path.line_to(Point::new(rect.x + rect.width, rect.y + rect.height));
        path.line_to(Point::new(rect.x, rect.y + rect.height));
        path.close();
        path
    }

    /// A closed rectangle with corners rounded by `radius`, clamped to half
    /// the shorter side.
    pub fn rounded_rect(rect: Rectangle, radius: f32) -> Self {
        let rounded = kurbo::RoundedRect::new(
            f64::from(rect.x),
            f64::from(rect.y),
            f64::from(rect.x + rect.width),
            f64::from(rect.y + rect.height),
            f64::from(radius.max(0.0)),
        );
        let start = to_kurbo(Point::new(rect.x, rect.y));
        Path {
            inner: rounded.to_path(TOLERANCE),
            start: Some(start),
            current: None,
        }
    }

    pub fn elements(&self) -> &[PathEl] {
        self.inner.elements()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.elements().iter().all(|el| matches!(el, PathEl::MoveTo(_)))
    }

    pub fn clear(&mut self) {
        *self = Path::default();
    }

    pub fn move_to(&mut self, p: Point) {
        let p = to_kurbo(p);
        // A lone move_to is replaced rather than left as a stray subpath.
        if let Some(PathEl::MoveTo(last)) = self.inner.elements().last().copied()
            && self.current == Some(last)
        {
            self.inner.truncate(self.inner.elements().len() - 1);
        }
        self.inner.move_to(p);
        self.start = Some(p);
        self.current = Some(p);
    }

    pub fn line_to(&mut self, p: Point) {
        match (self.start, self.current) {
            (None, _) => self.move_to(p),
            (Some(start), None) => {
                self.inner.move_to(start);
                self.inner.line_to(to_kurbo(p));
                self.current = Some(to_kurbo(p));
            }
            (Some(_), Some(_)) => {
                self.inner.line_to(to_kurbo(p));
                self.current = Some(to_kurbo(p));
            }
        }
    }

    pub fn close(&mut self) {
        if self.current.is_some() {
            self.inner.close_path();
            self.current = None;
        }
    }

    fn current_point(&self) -> Option<kurbo::Point> {
        self.current.or(self.start)
    }

    /// Canvas `arcTo`: a straight line toward `corner`, rounded off by an arc
    /// of `radius` tangent to both `current → corner` and `corner → to`.
    pub fn arc_to(&mut self, corner: Point, to: Point, radius: f32) {
        let Some(from) = self.current_point() else {
            self.move_to(corner);
            return;
        };

        let radius = f64::from(radius);
        let (corner_k, to_k) = (to_kurbo(corner), to_kurbo(to));
        let v1 = from - corner_k;
        let v2 = to_k - corner_k;

        if radius <= 0.0
            || v1.hypot() < f64::EPSILON
            || v2.hypot() < f64::EPSILON
            || v1.cross(v2).abs() < 1e-6
        {
            self.line_to(corner);
            return;
        }

        let (u1, u2) = (v1.normalize(), v2.normalize());
        let angle = u1.dot(u2).clamp(-1.0, 1.0).acos();
        let tangent = radius / (angle / 2.0).tan();
        let center = corner_k + (u1 + u2).normalize() * (radius / (angle / 2.0).sin());

        let t1 = corner_k + u1 * tangent;
        let t2 = corner_k + u2 * tangent;
        let start = (t1 - center).atan2();
        let mut sweep = (t2 - center).atan2() - start;
        if sweep > PI {
            sweep -= 2.0 * PI;
        } else if sweep < -PI {
            sweep += 2.0 * PI;
        }

        self.line_to(from_kurbo(t1));
        let arc = kurbo::Arc {
            center,
            radii: Vec2::new(radius, radius),
            start_angle: start,
            sweep_angle: sweep,
            x_rotation: 0.0,
        };
        self.inner.extend(arc.append_iter(TOLERANCE));
        self.current = Some(t2);
    }

    /// Append a closed, full ellipse as its own subpath.
    pub fn ellipse(&mut self, center: Point, radii: Vector) {
        let ellipse = kurbo::Ellipse::new(
            to_kurbo(center),
            Vec2::new(f64::from(radii.x), f64::from(radii.y)),
            0.0,
        );
        let start = to_kurbo(Point::new(center.x + radii.x, center.y));
        self.inner.extend(ellipse.path_elements(TOLERANCE));
        self.inner.close_path();
        self.start = Some(start);
        self.current = None;
    }

    /// Nonzero-winding containment, every subpath implicitly closed.
    pub fn contains(&self, p: Point) -> bool {
        self.filled().contains(to_kurbo(p))
    }

    /// The path as a fill sees it, with open subpaths closed.
    fn filled(&self) -> BezPath {
        let mut filled = BezPath::new();
        let mut open = false;
        for el in self.inner.elements() {
            match el {
                PathEl::MoveTo(_) => {
                    if open {
                        filled.close_path();
                    }
                    open = false;
                }
                PathEl::ClosePath => open = false,
                _ => open = true,
            }
            filled.push(*el);
        }
        if open {
            filled.close_path();
        }
        filled
    }

    pub fn bounds(&self) -> Option<Rectangle> {
        if self.is_empty() {
            return None;
        }
        let b = self.inner.bounding_box();
        Some(Rectangle::new(
            from_kurbo(b.origin()),
            Size::new(b.width() as f32, b.height() as f32),
        ))
    }

    /// The same path with every point mapped through `m`.
    pub fn transformed(&self, m: &Affine) -> Path {
        Path {
            inner: m.0 * self.inner.clone(),
            start: self.start.map(|p| m.0 * p),
            current: self.current.map(|p| m.0 * p),
        }
    }
}
