//! SVG path data (`d` attribute) parsing and flattening.
//!
//! Relative commands are resolved to absolute coordinates while parsing, so a
//! [`Subpath`] only ever holds absolute segments. Flattening turns each
//! subpath into a polyline: straight segments contribute their endpoint only,
//! curves are sampled adaptively by chord deviation.

use crate::error::SymbolError;
use crate::geometry::{arc_point_count, curve_point_count, dedup, Point};
use std::f64::consts::PI;

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Line {
        to: Point,
    },
    Cubic {
        c1: Point,
        c2: Point,
        to: Point,
    },
    Quadratic {
        c: Point,
        to: Point,
    },
    Arc {
        rx: f64,
        ry: f64,
        x_rotation: f64,
        large_arc: bool,
        sweep: bool,
        to: Point,
    },
}

impl Segment {
    pub fn end(&self) -> Point {
        match self {
            Segment::Line { to }
            | Segment::Cubic { to, .. }
            | Segment::Quadratic { to, .. }
            | Segment::Arc { to, .. } => *to,
        }
    }
}

/// A run of segments starting at a moveto.
#[derive(Debug, Clone, PartialEq)]
pub struct Subpath {
    pub start: Point,
    pub segments: Vec<Segment>,
    pub closed: bool,
}

impl Subpath {
    fn new(start: Point) -> Self {
        Self {
            start,
            segments: Vec::new(),
            closed: false,
        }
    }

    /// Flatten to a polyline. Closed subpaths end on their start point.
    pub fn flatten(&self, tolerance: f64) -> Vec<Point> {
        let mut points = vec![self.start];
        let mut current = self.start;
        for segment in &self.segments {
            flatten_segment(current, segment, tolerance, &mut points);
            current = segment.end();
        }
        if self.closed && !current.approx_eq(&self.start, 1e-9) {
            points.push(self.start);
        }
        dedup(&mut points, 1e-9);
        points
    }
}

/// Parse a complete `d` attribute.
pub fn parse_path(data: &str) -> Result<Vec<Subpath>, SymbolError> {
    PathParser::new(data).parse()
}

fn flatten_segment(from: Point, segment: &Segment, tolerance: f64, out: &mut Vec<Point>) {
    match *segment {
        Segment::Line { to } => out.push(to),
        Segment::Cubic { c1, c2, to } => {
            let straight = c1.distance_to_segment(&from, &to) <= tolerance
                && c2.distance_to_segment(&from, &to) <= tolerance;
            if straight {
                out.push(to);
                return;
            }
            let dd1 = (from.x - 2.0 * c1.x + c2.x).hypot(from.y - 2.0 * c1.y + c2.y);
            let dd2 = (c1.x - 2.0 * c2.x + to.x).hypot(c1.y - 2.0 * c2.y + to.y);
            let count = curve_point_count(6.0 * dd1.max(dd2), tolerance);
            for i in 1..count {
                let t = i as f64 / (count - 1) as f64;
                out.push(cubic_point(from, c1, c2, to, t));
            }
        }
        Segment::Quadratic { c, to } => {
            if c.distance_to_segment(&from, &to) <= tolerance {
                out.push(to);
                return;
            }
            let dd = (from.x - 2.0 * c.x + to.x).hypot(from.y - 2.0 * c.y + to.y);
            let count = curve_point_count(2.0 * dd, tolerance);
            for i in 1..count {
                let t = i as f64 / (count - 1) as f64;
                let a = from.lerp(&c, t);
                let b = c.lerp(&to, t);
                out.push(a.lerp(&b, t));
            }
        }
        Segment::Arc {
            rx,
            ry,
            x_rotation,
            large_arc,
            sweep,
            to,
        } => match ArcCenter::from_endpoints(from, to, rx, ry, x_rotation, large_arc, sweep) {
            Some(arc) => {
                let count = arc_point_count(arc.rx.max(arc.ry), arc.sweep, tolerance);
                for i in 1..count {
                    let t = i as f64 / (count - 1) as f64;
                    out.push(arc.point(arc.start_angle + arc.sweep * t));
                }
                // Land exactly on the endpoint.
                if let Some(last) = out.last_mut() {
                    *last = to;
                }
            }
            None => out.push(to),
        },
    }
}

fn cubic_point(p0: Point, c1: Point, c2: Point, p3: Point, t: f64) -> Point {
    let mt = 1.0 - t;
    let a = mt * mt * mt;
    let b = 3.0 * mt * mt * t;
    let c = 3.0 * mt * t * t;
    let d = t * t * t;
    Point::new(
        a * p0.x + b * c1.x + c * c2.x + d * p3.x,
        a * p0.y + b * c1.y + c * c2.y + d * p3.y,
    )
}

/// Center parameterization of an SVG elliptical arc.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ArcCenter {
    pub center: Point,
    pub rx: f64,
    pub ry: f64,
    pub phi: f64,
    pub start_angle: f64,
    pub sweep: f64,
}

impl ArcCenter {
    fn from_endpoints(
        from: Point,
        to: Point,
        rx: f64,
        ry: f64,
        x_rotation: f64,
        large_arc: bool,
        sweep: bool,
    ) -> Option<Self> {
        let (mut rx, mut ry) = (rx.abs(), ry.abs());
        if rx == 0.0 || ry == 0.0 || from.approx_eq(&to, 1e-12) {
            return None;
        }
        let phi = x_rotation.to_radians();
        let (sin_phi, cos_phi) = phi.sin_cos();
        let dx2 = (from.x - to.x) / 2.0;
        let dy2 = (from.y - to.y) / 2.0;
        let x1p = cos_phi * dx2 + sin_phi * dy2;
        let y1p = -sin_phi * dx2 + cos_phi * dy2;

        let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
        if lambda > 1.0 {
            rx *= lambda.sqrt();
            ry *= lambda.sqrt();
        }

        let num = rx * rx * ry * ry - rx * rx * y1p * y1p - ry * ry * x1p * x1p;
        let den = rx * rx * y1p * y1p + ry * ry * x1p * x1p;
        if den == 0.0 {
            return None;
        }
        let mut coef = (num / den).max(0.0).sqrt();
        if large_arc == sweep {
            coef = -coef;
        }
        let cxp = coef * rx * y1p / ry;
        let cyp = -coef * ry * x1p / rx;
        let center = Point::new(
            cos_phi * cxp - sin_phi * cyp + (from.x + to.x) / 2.0,
            sin_phi * cxp + cos_phi * cyp + (from.y + to.y) / 2.0,
        );

        let u = ((x1p - cxp) / rx, (y1p - cyp) / ry);
        let v = ((-x1p - cxp) / rx, (-y1p - cyp) / ry);
        let start_angle = vector_angle((1.0, 0.0), u);
        let mut delta = vector_angle(u, v);
        if !sweep && delta > 0.0 {
            delta -= 2.0 * PI;
        } else if sweep && delta < 0.0 {
            delta += 2.0 * PI;
        }

        Some(Self {
            center,
            rx,
            ry,
            phi,
            start_angle,
            sweep: delta,
        })
    }

    pub(crate) fn point(&self, angle: f64) -> Point {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_t, cos_t) = angle.sin_cos();
        Point::new(
            self.center.x + self.rx * cos_phi * cos_t - self.ry * sin_phi * sin_t,
            self.center.y + self.rx * sin_phi * cos_t + self.ry * cos_phi * sin_t,
        )
    }
}

fn vector_angle(u: (f64, f64), v: (f64, f64)) -> f64 {
    (u.0 * v.1 - u.1 * v.0).atan2(u.0 * v.0 + u.1 * v.1)
}

/// Previous segment's trailing control point, for S/T reflection.
#[derive(Clone, Copy)]
enum LastControl {
    None,
    Cubic(Point),
    Quadratic(Point),
}

struct PathParser<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    subpaths: Vec<Subpath>,
    current: Point,
    last_control: LastControl,
}

impl<'a> PathParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            subpaths: Vec::new(),
            current: Point::default(),
            last_control: LastControl::None,
        }
    }

    fn parse(mut self) -> Result<Vec<Subpath>, SymbolError> {
        let mut command: Option<char> = None;

        loop {
            self.skip_separators();
            let Some(ch) = self.peek_char() else {
                break;
            };

            let cmd = if ch.is_ascii_alphabetic() {
                self.advance();
                if !"MmLlHhVvCcSsQqTtAaZz".contains(ch) {
                    return Err(SymbolError::parse(ch.to_string(), "path data"));
                }
                ch
            } else if is_number_start(ch) {
                // Implicit repetition of the previous command.
                match command {
                    Some('M') => 'L',
                    Some('m') => 'l',
                    Some(c) if c != 'Z' && c != 'z' => c,
                    _ => return Err(SymbolError::parse(self.number_token(), "path data")),
                }
            } else {
                return Err(SymbolError::parse(ch.to_string(), "path data"));
            };

            if self.subpaths.is_empty() && !matches!(cmd, 'M' | 'm') {
                return Err(SymbolError::parse(
                    cmd.to_string(),
                    "path data (must start with a moveto)",
                ));
            }

            self.command(cmd)?;
            command = Some(cmd);
        }

        Ok(self.subpaths)
    }

    fn command(&mut self, cmd: char) -> Result<(), SymbolError> {
        let relative = cmd.is_ascii_lowercase();
        let origin = if relative {
            self.current
        } else {
            Point::default()
        };
        let offset = |p: Point| Point::new(p.x + origin.x, p.y + origin.y);

        match cmd.to_ascii_uppercase() {
            'M' => {
                let to = offset(self.point()?);
                self.subpaths.push(Subpath::new(to));
                self.current = to;
                self.last_control = LastControl::None;
            }
            'L' => {
                let to = offset(self.point()?);
                self.push(Segment::Line { to }, LastControl::None);
            }
            'H' => {
                let x = self.number()? + origin.x;
                let to = Point::new(x, self.current.y);
                self.push(Segment::Line { to }, LastControl::None);
            }
            'V' => {
                let y = self.number()? + origin.y;
                let to = Point::new(self.current.x, y);
                self.push(Segment::Line { to }, LastControl::None);
            }
            'C' => {
                let c1 = offset(self.point()?);
                let c2 = offset(self.point()?);
                let to = offset(self.point()?);
                self.push(Segment::Cubic { c1, c2, to }, LastControl::Cubic(c2));
            }
            'S' => {
                let c1 = match self.last_control {
                    LastControl::Cubic(prev) => reflect(prev, self.current),
                    _ => self.current,
                };
                let c2 = offset(self.point()?);
                let to = offset(self.point()?);
                self.push(Segment::Cubic { c1, c2, to }, LastControl::Cubic(c2));
            }
            'Q' => {
                let c = offset(self.point()?);
                let to = offset(self.point()?);
                self.push(Segment::Quadratic { c, to }, LastControl::Quadratic(c));
            }
            'T' => {
                let c = match self.last_control {
                    LastControl::Quadratic(prev) => reflect(prev, self.current),
                    _ => self.current,
                };
                let to = offset(self.point()?);
                self.push(Segment::Quadratic { c, to }, LastControl::Quadratic(c));
            }
            'A' => {
                let rx = self.number()?;
                let ry = self.number()?;
                let x_rotation = self.number()?;
                let large_arc = self.flag()?;
                let sweep = self.flag()?;
                let to = offset(self.point()?);
                self.push(
                    Segment::Arc {
                        rx,
                        ry,
                        x_rotation,
                        large_arc,
                        sweep,
                        to,
                    },
                    LastControl::None,
                );
            }
            'Z' => {
                if let Some(subpath) = self.subpaths.last_mut() {
                    subpath.closed = true;
                    self.current = subpath.start;
                    // A drawing command after Z starts a new subpath here.
                    let start = subpath.start;
                    self.subpaths.push(Subpath::new(start));
                }
                self.last_control = LastControl::None;
            }
            _ => return Err(SymbolError::parse(cmd.to_string(), "path data")),
        }
        Ok(())
    }

    fn push(&mut self, segment: Segment, control: LastControl) {
        self.current = segment.end();
        self.last_control = control;
        if let Some(subpath) = self.subpaths.last_mut() {
            subpath.segments.push(segment);
        }
    }

    fn point(&mut self) -> Result<Point, SymbolError> {
        let x = self.number()?;
        let y = self.number()?;
        Ok(Point::new(x, y))
    }

    fn number(&mut self) -> Result<f64, SymbolError> {
        self.skip_separators();
        match self.peek_char() {
            Some(ch) if is_number_start(ch) => {}
            Some(ch) => return Err(SymbolError::parse(ch.to_string(), "path data")),
            None => return Err(SymbolError::parse("<end of path>", "path data")),
        }
        let token = self.number_token();
        token
            .parse::<f64>()
            .map_err(|_| SymbolError::parse(token, "path data"))
    }

    /// Consume the longest numeric literal at the cursor.
    fn number_token(&mut self) -> String {
        let start = self.position();
        let mut seen_dot = false;
        let mut seen_exp = false;
        let mut prev: Option<char> = None;

        while let Some(ch) = self.peek_char() {
            let accept = match ch {
                '0'..='9' => true,
                '+' | '-' => prev.is_none() || matches!(prev, Some('e' | 'E')),
                '.' if !seen_dot && !seen_exp => {
                    seen_dot = true;
                    true
                }
                'e' | 'E' if !seen_exp && prev.is_some_and(|p| p.is_ascii_digit() || p == '.') => {
                    seen_exp = true;
                    true
                }
                _ => false,
            };
            if !accept {
                break;
            }
            prev = Some(ch);
            self.advance();
        }

        self.input[start..self.position()].to_string()
    }

    fn flag(&mut self) -> Result<bool, SymbolError> {
        self.skip_separators();
        match self.peek_char() {
            Some('0') => {
                self.advance();
                Ok(false)
            }
            Some('1') => {
                self.advance();
                Ok(true)
            }
            Some(ch) => Err(SymbolError::parse(ch.to_string(), "arc flag")),
            None => Err(SymbolError::parse("<end of path>", "arc flag")),
        }
    }

    fn skip_separators(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() || ch == ',' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn advance(&mut self) {
        self.chars.next();
    }

    fn position(&mut self) -> usize {
        self.chars
            .peek()
            .map(|(pos, _)| *pos)
            .unwrap_or(self.input.len())
    }
}

fn is_number_start(ch: char) -> bool {
    ch.is_ascii_digit() || ch == '-' || ch == '+' || ch == '.'
}

fn reflect(control: Point, around: Point) -> Point {
    Point::new(2.0 * around.x - control.x, 2.0 * around.y - control.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(data: &str) -> Vec<Vec<Point>> {
        parse_path(data)
            .unwrap()
            .iter()
            .map(|s| s.flatten(0.5))
            .filter(|p| p.len() > 1)
            .collect()
    }

    #[test]
    fn relative_commands_become_absolute() {
        let paths = flat("m 10 10 l 5 0 v 5 h -5 z");
        assert_eq!(
            paths,
            vec![vec![
                Point::new(10.0, 10.0),
                Point::new(15.0, 10.0),
                Point::new(15.0, 15.0),
                Point::new(10.0, 15.0),
                Point::new(10.0, 10.0),
            ]]
        );
    }

    #[test]
    fn implicit_lineto_after_moveto() {
        let paths = flat("M0,0 10,0 10,10");
        assert_eq!(paths[0].len(), 3);
        assert_eq!(paths[0][2], Point::new(10.0, 10.0));
    }

    #[test]
    fn compact_numbers_split_on_sign_and_dot() {
        let subpaths = parse_path("M0-5L.5.5").unwrap();
        assert_eq!(subpaths[0].start, Point::new(0.0, -5.0));
        assert_eq!(subpaths[0].segments[0].end(), Point::new(0.5, 0.5));
    }

    #[test]
    fn straight_cubic_emits_only_endpoint() {
        let paths = flat("M0 0 C 3 0 6 0 10 0");
        assert_eq!(paths[0], vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
    }

    #[test]
    fn curved_cubic_is_sampled_within_bounds() {
        let paths = flat("M0 0 C 0 40 40 40 40 0");
        let n = paths[0].len();
        assert!(n > 2 && n <= 32, "got {n} points");
        assert_eq!(*paths[0].last().unwrap(), Point::new(40.0, 0.0));
    }

    #[test]
    fn smooth_cubic_reflects_control_point() {
        let subpaths = parse_path("M0 0 C 0 10 10 10 10 0 S 20 -10 20 0").unwrap();
        match subpaths[0].segments[1] {
            Segment::Cubic { c1, .. } => assert_eq!(c1, Point::new(10.0, -10.0)),
            ref other => panic!("expected cubic, got {other:?}"),
        }
    }

    #[test]
    fn arc_with_compact_flags() {
        let subpaths = parse_path("M0 0 a5 5 0 01 10 0").unwrap();
        match subpaths[0].segments[0] {
            Segment::Arc {
                large_arc, sweep, to, ..
            } => {
                assert!(!large_arc);
                assert!(sweep);
                assert_eq!(to, Point::new(10.0, 0.0));
            }
            ref other => panic!("expected arc, got {other:?}"),
        }
        let pts = subpaths[0].flatten(0.1);
        assert!(pts.len() > 2);
        assert_eq!(*pts.last().unwrap(), Point::new(10.0, 0.0));
    }

    #[test]
    fn unknown_command_names_the_token() {
        let err = parse_path("M 0 0 X 10 10").unwrap_err();
        match err {
            SymbolError::Parse { token, .. } => assert_eq!(token, "X"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn bad_number_names_the_token() {
        let err = parse_path("M 0 0 L 1e 5").unwrap_err();
        assert!(matches!(err, SymbolError::Parse { ref token, .. } if token == "1e"));
    }
}
