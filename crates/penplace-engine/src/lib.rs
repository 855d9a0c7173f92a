//! # penplace-engine
//!
//! Turns a parsed [`Circuit`] and a [`TemplateLibrary`] into a placed, routed
//! and composed stroke stream:
//!
//! 1. [`classifier`] picks a layout strategy from the circuit's topology.
//! 2. [`placer`] lays components out at fixed pitch for that strategy.
//! 3. [`router`] connects pins with orthogonal wires (MST + A*).
//! 4. [`compositor`] scales and centers everything onto the canvas.
//!
//! The library is only ever borrowed, so one loaded library can serve many
//! renders at once.

pub mod classifier;
pub mod compositor;
pub mod config;
pub mod error;
pub mod geometry;
pub mod placer;
pub mod router;
pub mod stroke;
pub mod svg_preview;

use log::info;
use penplace_netlist::Circuit;
use penplace_symbols::TemplateLibrary;

pub use classifier::{classify, Topology};
pub use compositor::{Canvas, DrawGroup, GroupSource};
pub use config::{CanvasConfig, PlacerConfig, RenderConfig, RouterConfig};
pub use error::{EngineError, ErrorClass, RoutingError};
pub use geometry::{Point, Rect, Rotation};
pub use placer::PlacedComponent;
pub use router::RoutedNet;
pub use stroke::Stroke;

/// Everything one render produced.
#[derive(Debug, Clone)]
pub struct RenderOutput<'a> {
    pub topology: Topology,
    /// Components in placement order.
    pub placed: Vec<PlacedComponent<'a>>,
    /// Routed nets in declaration order.
    pub routes: Vec<RoutedNet>,
    /// Nets that could not be routed. They are left out of `routes` and of
    /// the strokes.
    pub failed_nets: Vec<RoutingError>,
    /// Component groups first, then one group per wire polyline.
    pub strokes: Vec<DrawGroup>,
    pub canvas: Canvas,
}

impl RenderOutput<'_> {
    /// The full stroke stream, in emission order.
    pub fn stroke_stream(&self) -> Vec<Stroke> {
        self.strokes
            .iter()
            .flat_map(|g| g.strokes.iter().copied())
            .collect()
    }

    pub fn component_groups(&self) -> impl Iterator<Item = &DrawGroup> {
        self.strokes
            .iter()
            .filter(|g| matches!(g.source, GroupSource::Component(_)))
    }

    pub fn wire_groups(&self) -> impl Iterator<Item = &DrawGroup> {
        self.strokes
            .iter()
            .filter(|g| matches!(g.source, GroupSource::Net(_)))
    }

    pub fn to_lamp(&self) -> String {
        stroke::to_lamp(&self.stroke_stream())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.stroke_stream())
    }

    pub fn to_svg(&self) -> String {
        svg_preview::to_svg_string(&self.strokes, &self.canvas)
    }
}

/// Run the whole pipeline. Routing failures are reported in
/// [`RenderOutput::failed_nets`]; every other failure is fatal.
pub fn render<'a>(
    circuit: &'a Circuit,
    library: &'a TemplateLibrary,
    config: &RenderConfig,
) -> Result<RenderOutput<'a>, EngineError> {
    config.validate()?;
    if circuit.is_empty() {
        return Err(EngineError::EmptyCircuit);
    }
    let topology = classify(circuit);
    let placed = placer::place(circuit, library, &topology, &config.placer)?;

    let report = router::ManhattanRouter::new(&placed, config.router.clone()).route(circuit);
    let (canvas, strokes) = compositor::compose(&placed, &report.routes, &config.canvas)?;

    info!(
        "rendered {} components and {} nets as {} ({} failed)",
        placed.len(),
        report.routes.len(),
        topology.name(),
        report.failed.len()
    );

    Ok(RenderOutput {
        topology,
        placed,
        routes: report.routes,
        failed_nets: report.failed,
        strokes,
        canvas,
    })
}
