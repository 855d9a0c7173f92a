//! Output stroke stream.
//!
//! The canonical primitives are `PenDown`, `PenMove` and `PenUp`. `Line`,
//! `Rectangle` and `Circle` are shorthands that expand into them.

use crate::geometry::Point;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Stroke {
    PenDown { x: f64, y: f64 },
    PenMove { x: f64, y: f64 },
    PenUp,
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
    Rectangle { x: f64, y: f64, width: f64, height: f64 },
    Circle { cx: f64, cy: f64, r: f64, segments: usize },
}

impl Stroke {
    pub fn is_canonical(&self) -> bool {
        matches!(
            self,
            Stroke::PenDown { .. } | Stroke::PenMove { .. } | Stroke::PenUp
        )
    }

    /// Canonical primitives drawing the same thing.
    pub fn expand(&self) -> Vec<Stroke> {
        match *self {
            Stroke::PenDown { .. } | Stroke::PenMove { .. } | Stroke::PenUp => vec![*self],
            Stroke::Line { x1, y1, x2, y2 } => {
                polyline(&[Point::new(x1, y1), Point::new(x2, y2)])
            }
            Stroke::Rectangle {
                x,
                y,
                width,
                height,
            } => polyline(&[
                Point::new(x, y),
                Point::new(x + width, y),
                Point::new(x + width, y + height),
                Point::new(x, y + height),
                Point::new(x, y),
            ]),
            Stroke::Circle { cx, cy, r, segments } => {
                let segments = segments.max(3);
                let ring: Vec<Point> = (0..=segments)
                    .map(|i| {
                        let angle = TAU * (i % segments) as f64 / segments as f64;
                        Point::new(cx + r * angle.cos(), cy + r * angle.sin())
                    })
                    .collect();
                polyline(&ring)
            }
        }
    }
}

/// Pen down on the first point, through the rest, then up.
pub fn polyline(points: &[Point]) -> Vec<Stroke> {
    let Some((first, rest)) = points.split_first() else {
        return Vec::new();
    };
    let mut strokes = Vec::with_capacity(points.len() + 1);
    strokes.push(Stroke::PenDown {
        x: first.x,
        y: first.y,
    });
    strokes.extend(rest.iter().map(|p| Stroke::PenMove { x: p.x, y: p.y }));
    strokes.push(Stroke::PenUp);
    strokes
}

/// Expand shorthands so only canonical primitives remain.
pub fn canonicalize(strokes: &[Stroke]) -> Vec<Stroke> {
    strokes.iter().flat_map(Stroke::expand).collect()
}

/// Line protocol read by the device transport: `pen down X Y`,
/// `pen move X Y` and `pen up`, with integer coordinates.
pub fn to_lamp(strokes: &[Stroke]) -> String {
    let mut out = String::new();
    for stroke in canonicalize(strokes) {
        // Writing to a String cannot fail.
        let _ = match stroke {
            Stroke::PenDown { x, y } => writeln!(out, "pen down {} {}", x.round(), y.round()),
            Stroke::PenMove { x, y } => writeln!(out, "pen move {} {}", x.round(), y.round()),
            _ => writeln!(out, "pen up"),
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_expands_to_three_primitives() {
        let strokes = Stroke::Line {
            x1: 0.0,
            y1: 0.0,
            x2: 5.0,
            y2: 0.0,
        }
        .expand();
        assert_eq!(
            strokes,
            vec![
                Stroke::PenDown { x: 0.0, y: 0.0 },
                Stroke::PenMove { x: 5.0, y: 0.0 },
                Stroke::PenUp
            ]
        );
    }

    #[test]
    fn rectangle_closes() {
        let strokes = Stroke::Rectangle {
            x: 1.0,
            y: 1.0,
            width: 2.0,
            height: 3.0,
        }
        .expand();
        assert_eq!(strokes.len(), 6);
        assert_eq!(strokes[0], Stroke::PenDown { x: 1.0, y: 1.0 });
        assert_eq!(strokes[4], Stroke::PenMove { x: 1.0, y: 1.0 });
        assert!(strokes.iter().all(Stroke::is_canonical));
    }

    #[test]
    fn circle_returns_to_start() {
        let strokes = Stroke::Circle {
            cx: 0.0,
            cy: 0.0,
            r: 10.0,
            segments: 16,
        }
        .expand();
        assert_eq!(strokes.len(), 18);
        assert_eq!(strokes[0], Stroke::PenDown { x: 10.0, y: 0.0 });
        assert_eq!(strokes[16], Stroke::PenMove { x: 10.0, y: 0.0 });
    }

    #[test]
    fn lamp_lines_are_integers() {
        let lamp = to_lamp(&[
            Stroke::PenDown { x: 10.4, y: 20.6 },
            Stroke::PenMove { x: 11.5, y: 20.0 },
            Stroke::PenUp,
        ]);
        assert_eq!(lamp, "pen down 10 21\npen move 12 20\npen up\n");
    }

    #[test]
    fn json_uses_cmd_tag() {
        let json = serde_json::to_string(&Stroke::PenUp).unwrap();
        assert_eq!(json, r#"{"cmd":"pen_up"}"#);
    }
}
