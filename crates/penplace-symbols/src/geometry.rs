//! Planar primitives shared by the path flattener and the normalizer.

use serde::{Deserialize, Serialize};

/// Fewest points a flattened curve may produce (its two endpoints).
pub const MIN_CURVE_POINTS: usize = 2;
/// Most points a single flattened curve may produce.
pub const MAX_CURVE_POINTS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn manhattan(&self, other: &Point) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn approx_eq(&self, other: &Point, eps: f64) -> bool {
        (self.x - other.x).abs() <= eps && (self.y - other.y).abs() <= eps
    }

    /// Distance from `self` to the segment `a`-`b`.
    pub fn distance_to_segment(&self, a: &Point, b: &Point) -> f64 {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let len_sq = dx * dx + dy * dy;
        if len_sq == 0.0 {
            return self.distance(a);
        }
        let t = (((self.x - a.x) * dx + (self.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
        self.distance(&Point::new(a.x + t * dx, a.y + t * dy))
    }

    pub(crate) fn lerp(&self, other: &Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

/// Axis-aligned bounding box accumulated point by point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BBox {
    pub fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn include(&mut self, p: &Point) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// 2x3 affine matrix `[a b c d e f]` as used by the SVG `transform` attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub const fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    pub fn translate(tx: f64, ty: f64) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::identity()
        }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::identity()
        }
    }

    pub fn rotate(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        }
    }

    /// `self * other`: `other` is applied first.
    pub fn then(&self, other: &Transform) -> Transform {
        Transform {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    pub fn apply(&self, p: &Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    /// Uniform length scale of the matrix, used for radii.
    pub fn length_scale(&self) -> f64 {
        (self.a * self.d - self.b * self.c).abs().sqrt()
    }
}

/// Douglas-Peucker simplification. Endpoints are always kept; an interior
/// point survives only if it deviates more than `tolerance` from the chord
/// of the run it splits.
pub fn simplify(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    let mut stack = vec![(0usize, points.len() - 1)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }
        let mut max_dist = 0.0;
        let mut max_idx = start;
        for (i, p) in points.iter().enumerate().take(end).skip(start + 1) {
            let dist = p.distance_to_segment(&points[start], &points[end]);
            if dist > max_dist {
                max_dist = dist;
                max_idx = i;
            }
        }
        if max_dist > tolerance {
            keep[max_idx] = true;
            stack.push((start, max_idx));
            stack.push((max_idx, end));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

/// Drop consecutive points closer than `eps` to their predecessor.
pub fn dedup(points: &mut Vec<Point>, eps: f64) {
    points.dedup_by(|b, a| a.approx_eq(b, eps));
}

/// Number of points (endpoints included) needed so that a curve whose
/// second derivative is bounded by `second_derivative` deviates at most
/// `tolerance` from its chords. Clamped to the curve sampling bounds.
pub fn curve_point_count(second_derivative: f64, tolerance: f64) -> usize {
    if tolerance <= 0.0 {
        return MAX_CURVE_POINTS;
    }
    let segments = (second_derivative / (8.0 * tolerance)).sqrt().ceil();
    if !segments.is_finite() {
        return MAX_CURVE_POINTS;
    }
    (segments as usize + 1).clamp(MIN_CURVE_POINTS, MAX_CURVE_POINTS)
}

/// Number of points needed to flatten an arc of `radius` sweeping `sweep`
/// radians with sagitta at most `tolerance`.
pub fn arc_point_count(radius: f64, sweep: f64, tolerance: f64) -> usize {
    if radius <= tolerance || tolerance <= 0.0 {
        return MIN_CURVE_POINTS.max((sweep.abs() / std::f64::consts::FRAC_PI_2).ceil() as usize + 1);
    }
    let step = 2.0 * (1.0 - tolerance / radius).acos();
    let segments = (sweep.abs() / step).ceil();
    if !segments.is_finite() {
        return MAX_CURVE_POINTS;
    }
    (segments as usize + 1).clamp(MIN_CURVE_POINTS, MAX_CURVE_POINTS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(raw: &[(f64, f64)]) -> Vec<Point> {
        raw.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn simplify_merges_collinear_runs() {
        let line = pts(&[(0.0, 0.0), (5.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        assert_eq!(
            simplify(&line, 0.5),
            pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)])
        );
    }

    #[test]
    fn simplify_keeps_real_corners() {
        let zigzag = pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (20.0, 10.0)]);
        assert_eq!(simplify(&zigzag, 0.5), zigzag);
    }

    #[test]
    fn simplify_handles_closed_rings() {
        let square = pts(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (0.0, 0.0),
        ]);
        assert_eq!(simplify(&square, 0.5), square);
    }

    #[test]
    fn simplify_is_idempotent() {
        let noisy = pts(&[
            (0.0, 0.0),
            (1.0, 0.2),
            (2.0, -0.1),
            (3.0, 5.0),
            (4.0, 0.3),
            (8.0, 0.0),
        ]);
        let once = simplify(&noisy, 0.5);
        assert_eq!(simplify(&once, 0.5), once);
    }

    #[test]
    fn transforms_compose_right_to_left() {
        let t = Transform::translate(10.0, 0.0).then(&Transform::scale(2.0, 2.0));
        assert_eq!(t.apply(&Point::new(1.0, 1.0)), Point::new(12.0, 2.0));
    }

    #[test]
    fn curve_sampling_is_bounded() {
        assert_eq!(curve_point_count(0.0, 0.5), MIN_CURVE_POINTS);
        assert_eq!(curve_point_count(1e12, 0.5), MAX_CURVE_POINTS);
        let mid = curve_point_count(400.0, 0.5);
        assert!(mid > MIN_CURVE_POINTS && mid < MAX_CURVE_POINTS);
    }
}
