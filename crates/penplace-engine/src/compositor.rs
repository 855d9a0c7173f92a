use crate::config::CanvasConfig;
use crate::error::EngineError;
use crate::geometry::{Point, Rect};
use crate::placer::PlacedComponent;
use crate::router::RoutedNet;
use crate::stroke::{polyline, Stroke};
use log::debug;
use serde::Serialize;

/// Target surface and the transform mapping layout coordinates onto it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Canvas {
    /// Fit `bounds` inside the viewport minus its margin and center it.
    pub fn fit(bounds: &Rect, config: &CanvasConfig) -> Self {
        let avail_w = (config.width - 2.0 * config.margin).max(0.0);
        let avail_h = (config.height - 2.0 * config.margin).max(0.0);
        let fit = |avail: f64, extent: f64| {
            if extent > 0.0 {
                avail / extent
            } else {
                f64::INFINITY
            }
        };
        let scale = config.scale.unwrap_or_else(|| {
            fit(avail_w, bounds.width)
                .min(fit(avail_h, bounds.height))
                .min(config.max_scale)
        });

        Self {
            width: config.width,
            height: config.height,
            margin: config.margin,
            scale,
            offset_x: (config.width - bounds.width * scale) / 2.0 - bounds.x * scale,
            offset_y: (config.height - bounds.height * scale) / 2.0 - bounds.y * scale,
        }
    }

    pub fn apply(&self, p: &Point) -> Point {
        Point::new(
            p.x * self.scale + self.offset_x,
            p.y * self.scale + self.offset_y,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum GroupSource {
    Component(String),
    Net(String),
}

/// Strokes belonging to one component, or to one polyline of a net.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawGroup {
    pub source: GroupSource,
    pub strokes: Vec<Stroke>,
}

/// Union of every placed bbox and routed point.
pub fn content_bounds(placed: &[PlacedComponent], routes: &[RoutedNet]) -> Option<Rect> {
    let mut bounds: Option<Rect> = None;
    for rect in placed.iter().map(PlacedComponent::bounds) {
        bounds = Some(match bounds {
            Some(b) => b.union(&rect),
            None => rect,
        });
    }
    for p in routes.iter().flat_map(|r| r.polylines.iter().flatten()) {
        bounds = Some(match bounds {
            Some(b) => b.include_point(p),
            None => Rect::new(p.x, p.y, 0.0, 0.0),
        });
    }
    bounds
}

/// Scale and center the layout, emitting components in placement order and
/// then every polyline of every net in declaration order.
pub fn compose(
    placed: &[PlacedComponent],
    routes: &[RoutedNet],
    config: &CanvasConfig,
) -> Result<(Canvas, Vec<DrawGroup>), EngineError> {
    let bounds = content_bounds(placed, routes).ok_or(EngineError::EmptyRender)?;
    if bounds.width <= 0.0 && bounds.height <= 0.0 {
        return Err(EngineError::EmptyRender);
    }
    let canvas = Canvas::fit(&bounds, config);
    debug!(
        "canvas scale {:.3}, offset ({:.1}, {:.1})",
        canvas.scale, canvas.offset_x, canvas.offset_y
    );

    let mut groups = Vec::with_capacity(placed.len() + routes.len());
    for component in placed {
        let strokes = component
            .strokes()
            .iter()
            .flat_map(|run| {
                let mapped: Vec<Point> = run.iter().map(|p| canvas.apply(p)).collect();
                polyline(&mapped)
            })
            .collect();
        groups.push(DrawGroup {
            source: GroupSource::Component(component.reference().to_string()),
            strokes,
        });
    }
    for net in routes {
        for line in &net.polylines {
            let mapped: Vec<Point> = line.iter().map(|p| canvas.apply(p)).collect();
            groups.push(DrawGroup {
                source: GroupSource::Net(net.name.clone()),
                strokes: polyline(&mapped),
            });
        }
    }
    Ok((canvas, groups))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CanvasConfig {
        CanvasConfig::default()
    }

    #[test]
    fn scale_is_capped() {
        let canvas = Canvas::fit(&Rect::new(0.0, 0.0, 10.0, 10.0), &config());
        assert_eq!(canvas.scale, 2.0);
        // Centered.
        let c = canvas.apply(&Point::new(5.0, 5.0));
        assert_eq!(c, Point::new(702.0, 936.0));
    }

    #[test]
    fn wide_layouts_fit_the_width() {
        let canvas = Canvas::fit(&Rect::new(100.0, 0.0, 2408.0, 100.0), &config());
        assert_eq!(canvas.scale, 0.5);
        let left = canvas.apply(&Point::new(100.0, 0.0));
        assert_eq!(left.x, 100.0);
    }

    #[test]
    fn explicit_scale_wins() {
        let cfg = CanvasConfig {
            scale: Some(3.0),
            ..config()
        };
        assert_eq!(Canvas::fit(&Rect::new(0.0, 0.0, 10.0, 10.0), &cfg).scale, 3.0);
    }

    #[test]
    fn routes_alone_have_bounds() {
        let routes = vec![RoutedNet {
            name: "A".into(),
            polylines: vec![vec![Point::new(0.0, 0.0), Point::new(0.0, 50.0)]],
        }];
        let bounds = content_bounds(&[], &routes).unwrap();
        assert_eq!(bounds, Rect::new(0.0, 0.0, 0.0, 50.0));
    }

    #[test]
    fn nothing_to_draw_is_an_error() {
        assert!(matches!(
            compose(&[], &[], &config()).unwrap_err(),
            EngineError::EmptyRender
        ));
    }
}
