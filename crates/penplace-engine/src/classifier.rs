//! Topology classification.
//!
//! Matchers run in a fixed priority order: series, divider, parallel, then
//! the grid fallback which accepts every circuit. The first match decides
//! the layout strategy.

use penplace_netlist::{Circuit, GROUND};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};

/// Layout strategy chosen for a circuit. Indices refer to
/// `Circuit::components`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Topology {
    /// Components form one unbranched chain, listed in walk order.
    Series { order: Vec<usize> },
    /// Source with two passives chained from its top net to ground.
    Divider {
        source: usize,
        top: usize,
        bottom: usize,
        grounds: Vec<usize>,
    },
    /// Passives sharing the same pair of nets.
    Parallel {
        branches: Vec<usize>,
        left_net: String,
        right_net: String,
    },
    Grid,
}

impl Topology {
    pub fn name(&self) -> &'static str {
        match self {
            Topology::Series { .. } => "series",
            Topology::Divider { .. } => "divider",
            Topology::Parallel { .. } => "parallel",
            Topology::Grid => "grid",
        }
    }
}

pub trait TopologyMatcher: Sync {
    fn matches(&self, circuit: &Circuit) -> Option<Topology>;
}

pub struct SeriesMatcher;
pub struct DividerMatcher;
pub struct ParallelMatcher;
pub struct GridMatcher;

/// Priority order. The last entry always matches.
pub const MATCHERS: &[&dyn TopologyMatcher] =
    &[&SeriesMatcher, &DividerMatcher, &ParallelMatcher, &GridMatcher];

pub fn classify(circuit: &Circuit) -> Topology {
    let topology = MATCHERS
        .iter()
        .find_map(|m| m.matches(circuit))
        .unwrap_or(Topology::Grid);
    log::debug!("classified circuit as {}", topology.name());
    topology
}

/// Indices of the components attached to each of `index`'s nets, in pin
/// order, excluding `index` itself.
fn neighbours(circuit: &Circuit, index: usize) -> Vec<usize> {
    let mut out = Vec::new();
    for node in &circuit.components[index].nodes {
        let Some(net) = circuit.net(node) else {
            continue;
        };
        for endpoint in &net.endpoints {
            if let Some(other) = circuit.component_index(&endpoint.component) {
                if other != index && !out.contains(&other) {
                    out.push(other);
                }
            }
        }
    }
    out
}

fn is_connected(circuit: &Circuit) -> bool {
    let mut seen = HashSet::from([0usize]);
    let mut queue = VecDeque::from([0usize]);
    while let Some(i) = queue.pop_front() {
        for n in neighbours(circuit, i) {
            if seen.insert(n) {
                queue.push_back(n);
            }
        }
    }
    seen.len() == circuit.components.len()
}

impl TopologyMatcher for SeriesMatcher {
    fn matches(&self, circuit: &Circuit) -> Option<Topology> {
        if circuit.is_empty()
            || circuit.nets.iter().any(|n| n.degree() != 2)
            || circuit.components.iter().any(|c| c.nodes.len() > 2)
            || !is_connected(circuit)
        {
            return None;
        }

        // Open chains start at a dangling end, closed loops at the source.
        let start = circuit
            .components
            .iter()
            .position(|c| c.nodes.len() == 1)
            .or_else(|| {
                circuit
                    .components
                    .iter()
                    .position(|c| c.component_type.is_source())
            })
            .unwrap_or(0);

        let mut order = vec![start];
        let mut current = start;
        while let Some(next) = neighbours(circuit, current)
            .into_iter()
            .find(|n| !order.contains(n))
        {
            order.push(next);
            current = next;
        }
        for i in 0..circuit.components.len() {
            if !order.contains(&i) {
                order.push(i);
            }
        }
        Some(Topology::Series { order })
    }
}

impl TopologyMatcher for DividerMatcher {
    fn matches(&self, circuit: &Circuit) -> Option<Topology> {
        let grounds: Vec<usize> = (0..circuit.components.len())
            .filter(|&i| circuit.components[i].component_type.is_ground())
            .collect();
        let others: Vec<usize> = (0..circuit.components.len())
            .filter(|i| !grounds.contains(i))
            .collect();
        if others.len() != 3 {
            return None;
        }

        let mut ground_nets: HashSet<&str> = HashSet::from([GROUND]);
        for &g in &grounds {
            ground_nets.extend(circuit.components[g].nodes.iter().map(String::as_str));
        }

        let source = *others
            .iter()
            .find(|&&i| circuit.components[i].component_type.is_source())?;
        let passives: Vec<usize> = others.iter().copied().filter(|&i| i != source).collect();
        let two_pin_passives = passives.iter().all(|&i| {
            let c = &circuit.components[i];
            c.component_type.is_passive() && c.nodes.len() == 2
        });
        if !two_pin_passives {
            return None;
        }

        let source_nodes = &circuit.components[source].nodes;
        if source_nodes.len() != 2 {
            return None;
        }
        let (top_net, bottom_net) = if ground_nets.contains(source_nodes[1].as_str()) {
            (&source_nodes[0], &source_nodes[1])
        } else if ground_nets.contains(source_nodes[0].as_str()) {
            (&source_nodes[1], &source_nodes[0])
        } else {
            return None;
        };
        if top_net == bottom_net {
            return None;
        }

        for (top, bottom) in [(passives[0], passives[1]), (passives[1], passives[0])] {
            let top_nodes = &circuit.components[top].nodes;
            let bottom_nodes = &circuit.components[bottom].nodes;
            let Some(mid) = other_node(top_nodes, top_net) else {
                continue;
            };
            if mid == bottom_net || ground_nets.contains(mid.as_str()) {
                continue;
            }
            let reaches_ground = other_node(bottom_nodes, mid)
                .is_some_and(|n| ground_nets.contains(n.as_str()));
            if reaches_ground {
                return Some(Topology::Divider {
                    source,
                    top,
                    bottom,
                    grounds,
                });
            }
        }
        None
    }
}

/// For a two-node list containing `net`, the other node.
fn other_node<'a>(nodes: &'a [String], net: &str) -> Option<&'a String> {
    match nodes {
        [a, b] if a == net => Some(b),
        [a, b] if b == net => Some(a),
        _ => None,
    }
}

impl TopologyMatcher for ParallelMatcher {
    fn matches(&self, circuit: &Circuit) -> Option<Topology> {
        let mut groups: Vec<((&str, &str), Vec<usize>)> = Vec::new();
        for (i, c) in circuit.components.iter().enumerate() {
            if !c.component_type.is_passive() || c.nodes.len() != 2 || c.nodes[0] == c.nodes[1] {
                continue;
            }
            let (a, b) = (c.nodes[0].as_str(), c.nodes[1].as_str());
            let key = if a <= b { (a, b) } else { (b, a) };
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, members)) => members.push(i),
                None => groups.push((key, vec![i])),
            }
        }

        let (_, branches) = groups.into_iter().find(|(_, m)| m.len() >= 2)?;
        let first = &circuit.components[branches[0]];
        Some(Topology::Parallel {
            left_net: first.nodes[0].clone(),
            right_net: first.nodes[1].clone(),
            branches,
        })
    }
}

impl TopologyMatcher for GridMatcher {
    fn matches(&self, _circuit: &Circuit) -> Option<Topology> {
        Some(Topology::Grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use penplace_netlist::parse_netlist;

    fn classify_text(text: &str) -> Topology {
        classify(&parse_netlist(text).unwrap())
    }

    #[test]
    fn rc_loop_is_series() {
        let t = classify_text("V1 IN 0 5V\nR1 IN OUT 10k\nC1 OUT 0 100nF\n");
        assert_eq!(t, Topology::Series { order: vec![0, 1, 2] });
    }

    #[test]
    fn series_walk_starts_at_dangling_end() {
        let t = classify_text("R1 A B\nGND1 C 0\nR2 B C\nR3 A X\nGND2 X 0\n");
        // Nets A, B, C, X all have two endpoints.
        assert_eq!(
            t,
            Topology::Series {
                order: vec![1, 2, 0, 3, 4]
            }
        );
    }

    #[test]
    fn grounded_divider() {
        let t = classify_text("V1 IN 0 12V\nR1 IN MID 10k\nR2 MID 0 10k\nGND1 0 0\n");
        assert_eq!(
            t,
            Topology::Divider {
                source: 0,
                top: 1,
                bottom: 2,
                grounds: vec![3]
            }
        );
    }

    #[test]
    fn divider_with_passives_listed_bottom_first() {
        let t = classify_text("V1 IN 0\nR2 MID 0\nR1 MID IN\nGND1 0 0\n");
        assert_eq!(
            t,
            Topology::Divider {
                source: 0,
                top: 2,
                bottom: 1,
                grounds: vec![3]
            }
        );
    }

    #[test]
    fn shared_net_pair_is_parallel() {
        let t = classify_text("V1 A 0 5V\nR1 A B 1k\nR2 A B 2k\nGND1 B 0\n");
        assert_eq!(
            t,
            Topology::Parallel {
                branches: vec![1, 2],
                left_net: "A".into(),
                right_net: "B".into()
            }
        );
    }

    #[test]
    fn reversed_branch_still_groups() {
        let t = classify_text("R1 A B\nC1 B A\nL1 A C\n");
        assert_eq!(t.name(), "parallel");
    }

    #[test]
    fn lone_component_falls_back_to_grid() {
        assert_eq!(classify_text("R1 A B 10k\n"), Topology::Grid);
    }

    #[test]
    fn every_circuit_classifies() {
        assert_eq!(classify_text("Q1 c b e\nR1 c x\n"), Topology::Grid);
    }
}
