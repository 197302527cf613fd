//! 2D affine matrices in canvas layout, backed by [`kurbo::Affine`].
//!
//! A matrix `[a, b, c, d, e, f]` maps local coordinates to device
//! coordinates as
//!
//! ```text
//! | x' |   | a  c  e | | x |
//! | y' | = | b  d  f | | y |
//! | 1  |   | 0  0  1 | | 1 |
//! ```
//!
//! The wrapper speaks iced's `f32` geometry at the edges.

use iced::Point;

/// Determinants smaller than this are treated as singular.
const SINGULAR_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine(pub kurbo::Affine);

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine {
    pub const IDENTITY: Affine = Affine(kurbo::Affine::IDENTITY);

    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Affine(kurbo::Affine::new([a, b, c, d, e, f].map(f64::from)))
    }

    pub fn translation(tx: f32, ty: f32) -> Self {
        Affine(kurbo::Affine::translate((f64::from(tx), f64::from(ty))))
    }

    pub fn rotation(angle: f32) -> Self {
        Affine(kurbo::Affine::rotate(f64::from(angle)))
    }

    pub fn scaling(sx: f32, sy: f32) -> Self {
        Affine(kurbo::Affine::scale_non_uniform(f64::from(sx), f64::from(sy)))
    }

    /// Compose `self` with `other`, applying `other` first.
    ///
    /// This is what a canvas does when `transform(other)` is called while
    /// `self` is the current matrix.
    pub fn multiply(&self, other: &Affine) -> Affine {
        Affine(self.0 * other.0)
    }

    pub fn determinant(&self) -> f32 {
        self.0.determinant() as f32
    }

    /// The inverse matrix, or `None` when the matrix collapses the plane.
    pub fn invert(&self) -> Option<Affine> {
        let det = self.0.determinant();
        if !det.is_finite() || det.abs() < SINGULAR_EPSILON {
            return None;
        }
        Some(Affine(self.0.inverse()))
    }

    pub fn inverse_or_identity(&self) -> Affine {
        self.invert().unwrap_or(Self::IDENTITY)
    }

    pub fn apply(&self, p: Point) -> Point {
        from_kurbo(self.0 * to_kurbo(p))
    }

    /// Uniform length scale of the matrix (geometric mean of the axes).
    pub fn scale_factor(&self) -> f32 {
        self.0.determinant().abs().sqrt() as f32
    }
}

pub(crate) fn to_kurbo(p: Point) -> kurbo::Point {
    kurbo::Point::new(f64::from(p.x), f64::from(p.y))
}

pub(crate) fn from_kurbo(p: kurbo::Point) -> Point {
    Point::new(p.x as f32, p.y as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    #[test]
    fn test_compose_translate_then_scale() {
        // translate(10, 5) followed by scale(2, 3)
        let m = Affine::translation(10.0, 5.0).multiply(&Affine::scaling(2.0, 3.0));
        assert!(close(m.apply(Point::new(1.0, 1.0)), Point::new(12.0, 8.0)));
    }

    #[test]
    fn test_rotation_quarter_turn() {
        let m = Affine::rotation(std::f32::consts::FRAC_PI_2);
        assert!(close(m.apply(Point::new(1.0, 0.0)), Point::new(0.0, 1.0)));
    }

    #[test]
    fn test_invert_round_trips_points() {
        let m = Affine::translation(-4.0, 7.0)
            .multiply(&Affine::rotation(0.3))
            .multiply(&Affine::scaling(2.0, 0.5));
        let inv = m.invert().unwrap();
        let p = Point::new(3.0, -2.0);
        assert!(close(inv.apply(m.apply(p)), p));
    }

    #[test]
    fn test_singular_matrix_has_no_inverse() {
        let m = Affine::scaling(0.0, 2.0);
        assert!(m.invert().is_none());
        assert_eq!(m.inverse_or_identity(), Affine::IDENTITY);
    }

    #[test]
    fn test_new_uses_canvas_layout() {
        let m = Affine::new(1.0, 0.0, 0.0, 1.0, 3.0, 4.0);
        assert_eq!(m, Affine::translation(3.0, 4.0));
        assert_eq!(m.0.as_coeffs(), [1.0, 0.0, 0.0, 1.0, 3.0, 4.0]);
    }
}
