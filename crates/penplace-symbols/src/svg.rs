//! Reading symbol elements out of SVG documents.

use crate::error::SymbolError;
use crate::geometry::{Point, Transform};
use crate::normalize::{Shape, SymbolElement};
use log::{debug, trace};
use std::collections::HashMap;
use ::svg::node::element::tag::Type;
use ::svg::node::Value;
use ::svg::parser::Event;

/// Containers whose children are never drawn directly.
const NON_RENDERED: &[&str] = &["defs", "clipPath", "mask", "symbol", "marker", "pattern"];

/// Extract drawable primitives and pin markers from an SVG document, in
/// document order, with group transforms applied.
pub fn read_symbol(content: &str) -> Result<Vec<SymbolElement>, SymbolError> {
    let parser = ::svg::read(content).map_err(|e| SymbolError::Svg(e.to_string()))?;

    let mut elements = Vec::new();
    let mut groups: Vec<Transform> = vec![Transform::identity()];
    let mut hidden_depth = 0usize;

    for event in parser {
        match event {
            Event::Error(err) => return Err(SymbolError::Svg(err.to_string())),
            Event::Tag(name, kind, attributes) => {
                if NON_RENDERED.contains(&name) {
                    match kind {
                        Type::Start => hidden_depth += 1,
                        Type::End => hidden_depth = hidden_depth.saturating_sub(1),
                        Type::Empty => {}
                    }
                    continue;
                }
                if hidden_depth > 0 {
                    continue;
                }

                let parent = groups.last().copied().unwrap_or_default();
                if name == "g" {
                    match kind {
                        Type::Start => {
                            let local = transform_attr(&attributes)?;
                            groups.push(parent.then(&local));
                        }
                        Type::End => {
                            if groups.len() > 1 {
                                groups.pop();
                            }
                        }
                        Type::Empty => {}
                    }
                    continue;
                }
                if matches!(kind, Type::End) {
                    continue;
                }

                if let Some(shape) = shape(name, &attributes)? {
                    let transform = parent.then(&transform_attr(&attributes)?);
                    let id = attributes.get("id").map(|v| v.to_string());
                    trace!("svg element <{name}> id={id:?}");
                    elements.push(SymbolElement {
                        shape,
                        id,
                        transform,
                    });
                }
            }
            _ => {}
        }
    }

    debug!("read {} symbol elements", elements.len());
    Ok(elements)
}

type Attributes = HashMap<String, Value>;

fn shape(name: &str, attrs: &Attributes) -> Result<Option<Shape>, SymbolError> {
    let shape = match name {
        "path" => match attrs.get("d") {
            Some(d) => Shape::Path(d.to_string()),
            None => return Ok(None),
        },
        "circle" => Shape::Circle {
            center: Point::new(length(attrs, "cx")?, length(attrs, "cy")?),
            radius: length(attrs, "r")?,
        },
        "rect" => Shape::Rect {
            x: length(attrs, "x")?,
            y: length(attrs, "y")?,
            width: length(attrs, "width")?,
            height: length(attrs, "height")?,
        },
        "line" => Shape::Line {
            from: Point::new(length(attrs, "x1")?, length(attrs, "y1")?),
            to: Point::new(length(attrs, "x2")?, length(attrs, "y2")?),
        },
        "polyline" => Shape::Polyline(points(attrs)?),
        "polygon" => Shape::Polygon(points(attrs)?),
        _ => return Ok(None),
    };
    Ok(Some(shape))
}

/// Numeric attribute with an optional `px` unit. Missing attributes are 0.
fn length(attrs: &Attributes, key: &str) -> Result<f64, SymbolError> {
    let Some(value) = attrs.get(key) else {
        return Ok(0.0);
    };
    let value = value.to_string();
    let raw = value.trim();
    let raw = raw.strip_suffix("px").unwrap_or(raw);
    raw.parse()
        .map_err(|_| SymbolError::parse(raw, format!("attribute '{key}'")))
}

fn points(attrs: &Attributes) -> Result<Vec<Point>, SymbolError> {
    let Some(value) = attrs.get("points") else {
        return Ok(Vec::new());
    };
    let value = value.to_string();
    let numbers = numbers(&value, "attribute 'points'")?;
    if numbers.len() % 2 != 0 {
        return Err(SymbolError::parse(value, "attribute 'points'"));
    }
    Ok(numbers
        .chunks_exact(2)
        .map(|pair| Point::new(pair[0], pair[1]))
        .collect())
}

fn numbers(raw: &str, context: &str) -> Result<Vec<f64>, SymbolError> {
    raw.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().map_err(|_| SymbolError::parse(s, context)))
        .collect()
}

fn transform_attr(attrs: &Attributes) -> Result<Transform, SymbolError> {
    match attrs.get("transform") {
        Some(value) => parse_transform(&value.to_string()),
        None => Ok(Transform::identity()),
    }
}

/// Parse a `transform` attribute. Functions compose left to right, so the
/// rightmost one is applied to coordinates first.
pub fn parse_transform(raw: &str) -> Result<Transform, SymbolError> {
    let context = "attribute 'transform'";
    let mut result = Transform::identity();

    for item in raw.split(')') {
        let item = item.trim().trim_start_matches(',').trim();
        if item.is_empty() {
            continue;
        }
        let (name, args) = item
            .split_once('(')
            .ok_or_else(|| SymbolError::parse(item, context))?;
        let name = name.trim();
        let args = numbers(args, context)?;

        let step = match (name, args.as_slice()) {
            ("matrix", &[a, b, c, d, e, f]) => Transform { a, b, c, d, e, f },
            ("translate", &[tx]) => Transform::translate(tx, 0.0),
            ("translate", &[tx, ty]) => Transform::translate(tx, ty),
            ("scale", &[s]) => Transform::scale(s, s),
            ("scale", &[sx, sy]) => Transform::scale(sx, sy),
            ("rotate", &[deg]) => Transform::rotate(deg),
            ("rotate", &[deg, cx, cy]) => Transform::translate(cx, cy)
                .then(&Transform::rotate(deg))
                .then(&Transform::translate(-cx, -cy)),
            _ => return Err(SymbolError::parse(name, context)),
        };
        result = result.then(&step);
    }

    Ok(result)
}
