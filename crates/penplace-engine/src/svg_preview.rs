//! SVG rendering of a composed stroke stream, for previewing output without
//! the device.

use crate::compositor::{Canvas, DrawGroup, GroupSource};
use crate::stroke::{canonicalize, Stroke};
use svg::node::element::path::Data;
use svg::node::element::{Group, Path, Rectangle};
use svg::Document;

/// One `<path>` per pen-down run, grouped per component or wire.
pub fn document(groups: &[DrawGroup], canvas: &Canvas) -> Document {
    let mut document = Document::new()
        .set("width", format!("{}", canvas.width))
        .set("height", format!("{}", canvas.height))
        .set("viewBox", format!("0 0 {} {}", canvas.width, canvas.height))
        .add(
            Rectangle::new()
                .set("width", "100%")
                .set("height", "100%")
                .set("fill", "white"),
        );

    for group in groups {
        let (class, name, colour) = match &group.source {
            GroupSource::Component(name) => ("component", name, "black"),
            GroupSource::Net(name) => ("wire", name, "#1f4e9c"),
        };
        let mut node = Group::new()
            .set("class", class)
            .set("data-name", name.as_str())
            .set("fill", "none")
            .set("stroke", colour)
            .set("stroke-width", "2")
            .set("stroke-linecap", "round")
            .set("stroke-linejoin", "round");
        for data in runs(&group.strokes) {
            node = node.add(Path::new().set("d", data));
        }
        document = document.add(node);
    }
    document
}

pub fn to_svg_string(groups: &[DrawGroup], canvas: &Canvas) -> String {
    document(groups, canvas).to_string()
}

fn runs(strokes: &[Stroke]) -> Vec<Data> {
    let mut out = Vec::new();
    let mut current: Option<Data> = None;
    for stroke in canonicalize(strokes) {
        match stroke {
            Stroke::PenDown { x, y } => {
                if let Some(data) = current.take() {
                    out.push(data);
                }
                current = Some(Data::new().move_to((x as f32, y as f32)));
            }
            Stroke::PenMove { x, y } => {
                current = current.map(|data| data.line_to((x as f32, y as f32)));
            }
            _ => {
                if let Some(data) = current.take() {
                    out.push(data);
                }
            }
        }
    }
    if let Some(data) = current {
        out.push(data);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::polyline;
    use penplace_symbols::Point;

    #[test]
    fn each_run_becomes_a_path() {
        let mut strokes = polyline(&[Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
        strokes.extend(polyline(&[Point::new(0.0, 5.0), Point::new(10.0, 5.0)]));
        let groups = vec![DrawGroup {
            source: GroupSource::Component("R1".into()),
            strokes,
        }];
        let canvas = Canvas {
            width: 100.0,
            height: 50.0,
            margin: 0.0,
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        };
        let svg = to_svg_string(&groups, &canvas);
        assert_eq!(svg.matches("<path").count(), 2);
        assert!(svg.contains("R1"));
    }
}
