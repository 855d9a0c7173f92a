use crate::error::SymbolError;
use crate::geometry::{Point, Transform};
use crate::normalize::{Shape, SymbolElement};
use serde::{Deserialize, Serialize};

/// Slack allowed on hand-edited coordinates.
const TOLERANCE: f64 = 1e-6;

/// One drawing operation inside a stroke group. Coordinates are relative to
/// the template's bbox origin and divided by the template's longest side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StrokeOp {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    PenUp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrokeGroup {
    pub ops: Vec<StrokeOp>,
}

impl StrokeGroup {
    /// A single pen-down run through `points`, ending with the pen lifted.
    pub fn polyline(points: &[Point]) -> Self {
        let mut ops = Vec::with_capacity(points.len() + 1);
        for (i, p) in points.iter().enumerate() {
            if i == 0 {
                ops.push(StrokeOp::MoveTo { x: p.x, y: p.y });
            } else {
                ops.push(StrokeOp::LineTo { x: p.x, y: p.y });
            }
        }
        ops.push(StrokeOp::PenUp);
        Self { ops }
    }

    /// Split the group back into its pen-down runs.
    pub fn polylines(&self) -> Vec<Vec<Point>> {
        let mut runs = Vec::new();
        let mut current: Vec<Point> = Vec::new();
        for op in &self.ops {
            match *op {
                StrokeOp::MoveTo { x, y } => {
                    if current.len() > 1 {
                        runs.push(std::mem::take(&mut current));
                    }
                    current.clear();
                    current.push(Point::new(x, y));
                }
                StrokeOp::LineTo { x, y } => current.push(Point::new(x, y)),
                StrokeOp::PenUp => {
                    if current.len() > 1 {
                        runs.push(std::mem::take(&mut current));
                    }
                    current.clear();
                }
            }
        }
        if current.len() > 1 {
            runs.push(current);
        }
        runs
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.ops.iter().filter_map(|op| match *op {
            StrokeOp::MoveTo { x, y } | StrokeOp::LineTo { x, y } => Some(Point::new(x, y)),
            StrokeOp::PenUp => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplatePin {
    pub name: String,
    /// Fraction of the bbox width, in `[0, 1]`.
    pub x: f64,
    /// Fraction of the bbox height, in `[0, 1]`.
    pub y: f64,
    /// Outward direction in degrees (0 right, 90 up, 180 left, 270 down).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemplateSize {
    pub width: f64,
    pub height: f64,
}

/// Normalized, placement-independent drawing of one component type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentTemplate {
    pub type_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,
    pub bbox: TemplateSize,
    pub pins: Vec<TemplatePin>,
    pub strokes: Vec<StrokeGroup>,
}

impl ComponentTemplate {
    pub fn width(&self) -> f64 {
        self.bbox.width
    }

    pub fn height(&self) -> f64 {
        self.bbox.height
    }

    /// Divisor applied to stroke coordinates at normalization time.
    pub fn stroke_scale(&self) -> f64 {
        self.bbox.width.max(self.bbox.height)
    }

    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }

    pub fn pin(&self, name: &str) -> Option<&TemplatePin> {
        self.pins.iter().find(|p| p.name == name)
    }

    /// Pin positions in template units, relative to the bbox origin.
    pub fn local_pins(&self) -> Vec<Point> {
        self.pins
            .iter()
            .map(|p| Point::new(p.x * self.bbox.width, p.y * self.bbox.height))
            .collect()
    }

    /// Stroke runs in template units, relative to the bbox origin.
    pub fn local_strokes(&self) -> Vec<Vec<Point>> {
        let scale = self.stroke_scale();
        self.strokes
            .iter()
            .flat_map(|group| group.polylines())
            .map(|run| {
                run.into_iter()
                    .map(|p| Point::new(p.x * scale, p.y * scale))
                    .collect()
            })
            .collect()
    }

    /// Check what a hand-edited template can get wrong: the bbox must be
    /// positive and finite, pins must lie in the unit square and stroke
    /// points inside the bbox.
    pub fn validate(&self) -> Result<(), SymbolError> {
        let invalid = |detail: String| SymbolError::InvalidTemplate {
            name: self.type_id.clone(),
            detail,
        };
        let (width, height) = (self.bbox.width, self.bbox.height);
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(invalid(format!(
                "bbox {width} x {height} is not positive and finite"
            )));
        }

        let in_range = |v: f64, max: f64| v.is_finite() && v >= -TOLERANCE && v <= max + TOLERANCE;
        for pin in &self.pins {
            if !in_range(pin.x, 1.0) || !in_range(pin.y, 1.0) {
                return Err(invalid(format!(
                    "{} at ({}, {}) is outside [0, 1] x [0, 1]",
                    pin.name, pin.x, pin.y
                )));
            }
        }

        let scale = self.stroke_scale();
        let (max_x, max_y) = (width / scale, height / scale);
        for (i, group) in self.strokes.iter().enumerate() {
            if let Some(p) = group
                .points()
                .find(|p| !in_range(p.x, max_x) || !in_range(p.y, max_y))
            {
                return Err(invalid(format!(
                    "stroke group {i} point ({}, {}) is outside [0, {max_x}] x [0, {max_y}]",
                    p.x, p.y
                )));
            }
        }
        Ok(())
    }

    /// Rebuild symbol elements in template units. Pins come back as
    /// zero-radius circles carrying their names as ids.
    pub fn to_elements(&self) -> Vec<SymbolElement> {
        let mut elements: Vec<SymbolElement> = self
            .local_strokes()
            .into_iter()
            .map(|run| SymbolElement {
                shape: Shape::Polyline(run),
                id: None,
                transform: Transform::identity(),
            })
            .collect();

        for (pin, pos) in self.pins.iter().zip(self.local_pins()) {
            elements.push(SymbolElement {
                shape: Shape::Circle {
                    center: pos,
                    radius: 0.0,
                },
                id: Some(pin.name.clone()),
                transform: Transform::identity(),
            });
        }
        elements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polyline_group_round_trips_through_ops() {
        let run = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 0.5)];
        let group = StrokeGroup::polyline(&run);
        assert_eq!(group.ops.len(), 4);
        assert_eq!(group.ops[3], StrokeOp::PenUp);
        assert_eq!(group.polylines(), vec![run]);
    }

    #[test]
    fn stroke_ops_serialize_with_op_tag() {
        let json = serde_json::to_string(&StrokeOp::MoveTo { x: 0.5, y: 1.0 }).unwrap();
        assert_eq!(json, r#"{"op":"move_to","x":0.5,"y":1.0}"#);
        let up: StrokeOp = serde_json::from_str(r#"{"op":"pen_up"}"#).unwrap();
        assert_eq!(up, StrokeOp::PenUp);
    }

    #[test]
    fn local_geometry_is_in_template_units() {
        let template = ComponentTemplate {
            type_id: "R".into(),
            name: String::new(),
            category: String::new(),
            bbox: TemplateSize {
                width: 40.0,
                height: 10.0,
            },
            pins: vec![TemplatePin {
                name: "pin2".into(),
                x: 1.0,
                y: 0.5,
                angle: Some(0.0),
            }],
            strokes: vec![StrokeGroup::polyline(&[
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.25),
            ])],
        };
        assert_eq!(template.local_pins(), vec![Point::new(40.0, 5.0)]);
        assert_eq!(
            template.local_strokes(),
            vec![vec![Point::new(0.0, 0.0), Point::new(40.0, 10.0)]]
        );
        assert!(template.pin("pin2").is_some());
        assert!(template.pin("pin1").is_none());
        assert!(template.validate().is_ok());
    }

    #[test]
    fn degenerate_bbox_is_invalid() {
        let template = ComponentTemplate {
            type_id: "X".into(),
            name: String::new(),
            category: String::new(),
            bbox: TemplateSize {
                width: 0.0,
                height: f64::INFINITY,
            },
            pins: Vec::new(),
            strokes: Vec::new(),
        };
        let err = template.validate().unwrap_err();
        assert!(err.is_structural());
        assert!(err.to_string().contains("'X'"), "{err}");
    }
}
