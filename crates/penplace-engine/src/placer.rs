//! Fixed-pitch placement for each topology.
//!
//! Every strategy advances by the largest component extent plus the margin,
//! so bounding boxes never overlap.

use crate::classifier::Topology;
use crate::config::PlacerConfig;
use crate::error::EngineError;
use crate::geometry::{Point, Rect, Rotation};
use log::debug;
use penplace_netlist::{Circuit, CircuitComponent};
use penplace_symbols::{ComponentTemplate, TemplateLibrary};

/// A component pinned to an absolute position and rotation. Absolute pin
/// coordinates are cached and recomputed whenever either changes.
#[derive(Debug, Clone)]
pub struct PlacedComponent<'a> {
    pub component: &'a CircuitComponent,
    pub template: &'a ComponentTemplate,
    position: Point,
    rotation: Rotation,
    pins: Vec<Point>,
}

impl<'a> PlacedComponent<'a> {
    pub fn new(
        component: &'a CircuitComponent,
        template: &'a ComponentTemplate,
        position: Point,
        rotation: Rotation,
    ) -> Self {
        let mut placed = Self {
            component,
            template,
            position,
            rotation,
            pins: Vec::new(),
        };
        placed.update_pins();
        placed
    }

    pub fn reference(&self) -> &str {
        &self.component.reference
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
        self.update_pins();
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
        self.update_pins();
    }

    /// Absolute pin coordinates, in template pin order.
    pub fn pins(&self) -> &[Point] {
        &self.pins
    }

    pub fn pin(&self, index: usize) -> Option<Point> {
        self.pins.get(index).copied()
    }

    pub fn size(&self) -> (f64, f64) {
        self.rotation
            .rotated_size(self.template.width(), self.template.height())
    }

    pub fn bounds(&self) -> Rect {
        let (width, height) = self.size();
        Rect::new(self.position.x, self.position.y, width, height)
    }

    /// Local template point to absolute coordinates.
    pub fn to_absolute(&self, local: &Point) -> Point {
        let p = self
            .rotation
            .apply(local, self.template.width(), self.template.height());
        Point::new(p.x + self.position.x, p.y + self.position.y)
    }

    /// Template strokes in absolute coordinates, one run per pen-down.
    pub fn strokes(&self) -> Vec<Vec<Point>> {
        self.template
            .local_strokes()
            .iter()
            .map(|run| run.iter().map(|p| self.to_absolute(p)).collect())
            .collect()
    }

    fn update_pins(&mut self) {
        self.pins = self
            .template
            .local_pins()
            .iter()
            .map(|p| self.to_absolute(p))
            .collect();
    }
}

/// Resolve every component's template, failing on the first one the
/// library lacks or whose pin count disagrees with the netlist.
fn resolve_templates<'a>(
    circuit: &'a Circuit,
    library: &'a TemplateLibrary,
) -> Result<Vec<&'a ComponentTemplate>, EngineError> {
    circuit
        .components
        .iter()
        .map(|component| {
            let type_id = component.component_type.type_id();
            let template = library.get(type_id).ok_or_else(|| {
                EngineError::UnknownComponentTemplate {
                    component: component.reference.clone(),
                    type_id: type_id.to_string(),
                }
            })?;
            if component.component_type.is_known()
                && template.pin_count() != component.nodes.len()
            {
                return Err(EngineError::PinCountMismatch {
                    component: component.reference.clone(),
                    type_id: type_id.to_string(),
                    nodes: component.nodes.len(),
                    pins: template.pin_count(),
                });
            }
            Ok(template)
        })
        .collect()
}

/// Place every component of `circuit` according to `topology`. The result
/// is in placement order.
pub fn place<'a>(
    circuit: &'a Circuit,
    library: &'a TemplateLibrary,
    topology: &Topology,
    config: &PlacerConfig,
) -> Result<Vec<PlacedComponent<'a>>, EngineError> {
    if circuit.is_empty() {
        return Err(EngineError::EmptyCircuit);
    }
    let templates = resolve_templates(circuit, library)?;

    let slots = match topology {
        Topology::Series { order } => series(&templates, order, config.margin),
        Topology::Divider {
            source,
            top,
            bottom,
            grounds,
        } => divider(&templates, *source, *top, *bottom, grounds, config.margin),
        Topology::Parallel {
            branches,
            left_net,
            ..
        } => parallel(circuit, &templates, branches, left_net, config.margin),
        Topology::Grid => grid(&templates, config.margin),
    };

    let placed: Vec<PlacedComponent<'a>> = slots
        .into_iter()
        .map(|slot| {
            PlacedComponent::new(
                &circuit.components[slot.index],
                templates[slot.index],
                slot.position,
                slot.rotation,
            )
        })
        .collect();

    for p in &placed {
        debug!(
            "placed {} at ({:.1}, {:.1}) rotated {}",
            p.reference(),
            p.position.x,
            p.position.y,
            p.rotation.degrees()
        );
    }
    Ok(placed)
}

struct Slot {
    index: usize,
    position: Point,
    rotation: Rotation,
}

fn rotated_size(template: &ComponentTemplate, rotation: Rotation) -> (f64, f64) {
    rotation.rotated_size(template.width(), template.height())
}

fn series(templates: &[&ComponentTemplate], order: &[usize], margin: f64) -> Vec<Slot> {
    let max_w = order
        .iter()
        .map(|&i| templates[i].width())
        .fold(0.0, f64::max);
    let max_h = order
        .iter()
        .map(|&i| templates[i].height())
        .fold(0.0, f64::max);
    let pitch = max_w + margin;

    order
        .iter()
        .enumerate()
        .map(|(k, &index)| Slot {
            index,
            position: Point::new(k as f64 * pitch, (max_h - templates[index].height()) / 2.0),
            rotation: Rotation::R0,
        })
        .collect()
}

fn divider(
    templates: &[&ComponentTemplate],
    source: usize,
    top: usize,
    bottom: usize,
    grounds: &[usize],
    margin: f64,
) -> Vec<Slot> {
    let mut stack = vec![
        (source, Rotation::R0),
        (top, Rotation::R90),
        (bottom, Rotation::R90),
    ];
    stack.extend(grounds.iter().map(|&g| (g, Rotation::R0)));

    let sizes: Vec<(f64, f64)> = stack
        .iter()
        .map(|&(i, r)| rotated_size(templates[i], r))
        .collect();
    let max_w = sizes.iter().map(|s| s.0).fold(0.0, f64::max);
    let pitch = sizes.iter().map(|s| s.1).fold(0.0, f64::max) + margin;

    stack
        .iter()
        .zip(&sizes)
        .enumerate()
        .map(|(k, (&(index, rotation), &(w, _)))| Slot {
            index,
            position: Point::new((max_w - w) / 2.0, k as f64 * pitch),
            rotation,
        })
        .collect()
}

/// Sources on the left, one row per branch in the middle column, everything
/// else on the right. Branches share the column's left edge: their left pins
/// line up, and right pins line up only between branches of equal width.
fn parallel(
    circuit: &Circuit,
    templates: &[&ComponentTemplate],
    branches: &[usize],
    left_net: &str,
    margin: f64,
) -> Vec<Slot> {
    let sources: Vec<usize> = (0..templates.len())
        .filter(|i| !branches.contains(i) && circuit.components[*i].component_type.is_source())
        .collect();
    let rest: Vec<usize> = (0..templates.len())
        .filter(|i| !branches.contains(i) && !sources.contains(i))
        .collect();

    let branch_rotation = |i: usize| {
        if circuit.components[i].nodes[0] == left_net {
            Rotation::R0
        } else {
            Rotation::R180
        }
    };
    let columns: [Vec<(usize, Rotation)>; 3] = [
        sources.iter().map(|&i| (i, Rotation::R0)).collect(),
        branches.iter().map(|&i| (i, branch_rotation(i))).collect(),
        rest.iter().map(|&i| (i, Rotation::R0)).collect(),
    ];

    let row_pitch = templates.iter().map(|t| t.height()).fold(0.0, f64::max) + margin;
    let mut slots = Vec::with_capacity(templates.len());
    let mut x = 0.0;
    for column in &columns {
        if column.is_empty() {
            continue;
        }
        let width = column
            .iter()
            .map(|&(i, r)| rotated_size(templates[i], r).0)
            .fold(0.0, f64::max);
        for (row, &(index, rotation)) in column.iter().enumerate() {
            slots.push(Slot {
                index,
                position: Point::new(x, row as f64 * row_pitch),
                rotation,
            });
        }
        x += width + margin;
    }
    slots
}

fn grid(templates: &[&ComponentTemplate], margin: f64) -> Vec<Slot> {
    let columns = (templates.len() as f64).sqrt().ceil().max(1.0) as usize;
    let pitch = templates
        .iter()
        .map(|t| t.width().max(t.height()))
        .fold(0.0, f64::max)
        + margin;

    (0..templates.len())
        .map(|index| Slot {
            index,
            position: Point::new(
                (index % columns) as f64 * pitch,
                (index / columns) as f64 * pitch,
            ),
            rotation: Rotation::R0,
        })
        .collect()
}
