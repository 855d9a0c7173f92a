//! Symbol normalization: vector elements in, [`ComponentTemplate`] out.

use crate::error::SymbolError;
use crate::geometry::{arc_point_count, dedup, simplify, BBox, Point, Transform};
use crate::path::parse_path;
use crate::template::{ComponentTemplate, StrokeGroup, TemplatePin, TemplateSize};
use log::{debug, trace};
use serde::Deserialize;
use std::f64::consts::TAU;

/// Drawable circles never use fewer segments than this.
const MIN_CIRCLE_SEGMENTS: usize = 8;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Simplification tolerance in source units.
    pub tolerance: f64,
    /// Circles with a radius below this are pin markers.
    pub pin_radius: f64,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.5,
            pin_radius: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Raw `d` attribute.
    Path(String),
    Circle { center: Point, radius: f64 },
    Rect { x: f64, y: f64, width: f64, height: f64 },
    Line { from: Point, to: Point },
    Polyline(Vec<Point>),
    Polygon(Vec<Point>),
}

/// One vector primitive of a symbol, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolElement {
    pub shape: Shape,
    pub id: Option<String>,
    /// Accumulated transform from the element and its enclosing groups.
    pub transform: Transform,
}

impl SymbolElement {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            id: None,
            transform: Transform::identity(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

struct PinMarker {
    position: Point,
    explicit_name: Option<String>,
}

/// Normalize the elements of one symbol into a template named `type_id`.
pub fn normalize(
    type_id: &str,
    elements: &[SymbolElement],
    config: &NormalizerConfig,
) -> Result<ComponentTemplate, SymbolError> {
    let mut markers = Vec::new();
    let mut runs: Vec<Vec<Point>> = Vec::new();
    let mut raw_points = 0usize;

    for element in elements {
        if let Some(marker) = pin_marker(element, config) {
            markers.push(marker);
            continue;
        }
        for mut run in flatten_element(element, config.tolerance)? {
            dedup(&mut run, 1e-9);
            raw_points += run.len();
            let run = simplify(&run, config.tolerance);
            if run.len() > 1 {
                runs.push(run);
            }
        }
    }

    if runs.is_empty() {
        return Err(SymbolError::EmptyComponent {
            name: type_id.to_string(),
        });
    }

    let mut bbox = BBox::empty();
    for p in runs.iter().flatten() {
        bbox.include(p);
    }
    let (width, height) = (bbox.width(), bbox.height());
    if width <= f64::EPSILON || height <= f64::EPSILON {
        return Err(SymbolError::DegenerateGeometry {
            name: type_id.to_string(),
            width,
            height,
        });
    }

    let kept: usize = runs.iter().map(Vec::len).sum();
    trace!("{type_id}: simplified {raw_points} points to {kept}");

    let divisor = width.max(height);
    let strokes = runs
        .iter()
        .map(|run| {
            let relative: Vec<Point> = run
                .iter()
                .map(|p| Point::new((p.x - bbox.min_x) / divisor, (p.y - bbox.min_y) / divisor))
                .collect();
            StrokeGroup::polyline(&relative)
        })
        .collect();

    let pins = name_pins(markers)
        .into_iter()
        .map(|(name, position)| {
            let x = ((position.x - bbox.min_x) / width).clamp(0.0, 1.0);
            let y = ((position.y - bbox.min_y) / height).clamp(0.0, 1.0);
            TemplatePin {
                name,
                x,
                y,
                angle: Some(edge_angle(x * width, y * height, width, height)),
            }
        })
        .collect::<Vec<_>>();

    debug!(
        "{type_id}: {} stroke groups, {} pins, bbox {width:.2} x {height:.2}",
        runs.len(),
        pins.len()
    );

    Ok(ComponentTemplate {
        type_id: type_id.to_string(),
        name: String::new(),
        category: String::new(),
        bbox: TemplateSize { width, height },
        pins,
        strokes,
    })
}

fn pin_marker(element: &SymbolElement, config: &NormalizerConfig) -> Option<PinMarker> {
    let Shape::Circle { center, radius } = element.shape else {
        return None;
    };
    let id = element.id.as_deref().unwrap_or_default();
    let radius = radius * element.transform.length_scale();
    let named_pin = id.to_ascii_lowercase().contains("pin");
    if radius >= config.pin_radius && !named_pin {
        return None;
    }
    let explicit_name = id
        .get(..3)
        .is_some_and(|head| head.eq_ignore_ascii_case("pin"))
        .then(|| id.to_string());
    Some(PinMarker {
        position: element.transform.apply(&center),
        explicit_name,
    })
}

/// Assign names in document order, then order by pin number. Markers
/// without an explicit name take the lowest free `pinK`.
fn name_pins(markers: Vec<PinMarker>) -> Vec<(String, Point)> {
    let mut taken: Vec<String> = Vec::new();
    let mut named: Vec<(Option<String>, Point)> = Vec::new();
    for marker in markers {
        match marker.explicit_name {
            Some(name) if !taken.contains(&name) => {
                taken.push(name.clone());
                named.push((Some(name), marker.position));
            }
            _ => named.push((None, marker.position)),
        }
    }

    let mut next = 1usize;
    let mut pins: Vec<(String, Point)> = named
        .into_iter()
        .map(|(name, position)| {
            let name = name.unwrap_or_else(|| loop {
                let candidate = format!("pin{next}");
                next += 1;
                if !taken.contains(&candidate) {
                    taken.push(candidate.clone());
                    break candidate;
                }
            });
            (name, position)
        })
        .collect();

    pins.sort_by_key(|(name, _)| pin_number(name).unwrap_or(usize::MAX));
    pins
}

/// `pin12` -> 12. Case-insensitive on the prefix.
pub fn pin_number(name: &str) -> Option<usize> {
    let head = name.get(..3)?;
    if !head.eq_ignore_ascii_case("pin") {
        return None;
    }
    name[3..].parse().ok()
}

/// Outward angle of the bbox edge nearest to a local point.
fn edge_angle(x: f64, y: f64, width: f64, height: f64) -> f64 {
    let candidates = [
        (x, 180.0),
        (width - x, 0.0),
        (y, 90.0),
        (height - y, 270.0),
    ];
    let mut best = candidates[0];
    for candidate in &candidates[1..] {
        if candidate.0 < best.0 {
            best = *candidate;
        }
    }
    best.1
}

fn flatten_element(element: &SymbolElement, tolerance: f64) -> Result<Vec<Vec<Point>>, SymbolError> {
    let local: Vec<Vec<Point>> = match &element.shape {
        Shape::Path(d) => parse_path(d)?
            .iter()
            .map(|subpath| subpath.flatten(tolerance))
            .filter(|run| run.len() > 1)
            .collect(),
        Shape::Circle { center, radius } => {
            let count = arc_point_count(*radius, TAU, tolerance).max(MIN_CIRCLE_SEGMENTS + 1);
            let run = (0..count)
                .map(|i| {
                    let angle = TAU * (i % (count - 1)) as f64 / (count - 1) as f64;
                    Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
                })
                .collect();
            vec![run]
        }
        Shape::Rect {
            x,
            y,
            width,
            height,
        } => vec![vec![
            Point::new(*x, *y),
            Point::new(x + width, *y),
            Point::new(x + width, y + height),
            Point::new(*x, y + height),
            Point::new(*x, *y),
        ]],
        Shape::Line { from, to } => vec![vec![*from, *to]],
        Shape::Polyline(points) => vec![points.clone()],
        Shape::Polygon(points) => {
            let mut ring = points.clone();
            if let Some(first) = points.first() {
                ring.push(*first);
            }
            vec![ring]
        }
    };

    Ok(local
        .into_iter()
        .map(|run| run.iter().map(|p| element.transform.apply(p)).collect())
        .collect())
}
