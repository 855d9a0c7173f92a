//! Component/net graph for penplace.
//!
//! A netlist is a list of component lines (`REF NODE... [VALUE...]`). Parsing
//! yields a [`Circuit`]: components in declaration order and the nets they
//! form, grouped by shared node token. Both are immutable after parsing and
//! serialisable with `serde`.

pub mod component_type;
pub mod error;
pub mod parser;

use serde::{Deserialize, Serialize};

pub use component_type::{Category, ComponentType};
pub use error::NetlistError;
pub use parser::{parse_netlist, read_netlist};

/// Canonical name of the reference node.
pub const GROUND: &str = "GND";

/// Canonical form of a node token: `0`, `GND` and `gnd` all name ground.
pub fn canonical_node(token: &str) -> String {
    match token {
        "0" | "GND" | "gnd" => GROUND.to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitComponent {
    pub reference: String,
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    /// Net names in pin order.
    pub nodes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl CircuitComponent {
    /// Net attached to the pin at `index`.
    pub fn node(&self, index: usize) -> Option<&str> {
        self.nodes.get(index).map(String::as_str)
    }
}

/// One pin of one component, by position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub component: String,
    /// Zero-based pin position within the component's node list.
    pub pin: usize,
}

impl Endpoint {
    /// Name of the template pin this endpoint attaches to.
    pub fn pin_name(&self) -> String {
        format!("pin{}", self.pin + 1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Net {
    pub name: String,
    pub endpoints: Vec<Endpoint>,
}

impl Net {
    pub fn degree(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_multi_terminal(&self) -> bool {
        self.endpoints.len() > 2
    }

    pub fn is_ground(&self) -> bool {
        self.name == GROUND
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    pub components: Vec<CircuitComponent>,
    /// Nets in order of first appearance.
    pub nets: Vec<Net>,
}

impl Circuit {
    /// Group component pins into nets by shared node name.
    pub fn from_components(components: Vec<CircuitComponent>) -> Self {
        let mut nets: Vec<Net> = Vec::new();
        for component in &components {
            for (pin, node) in component.nodes.iter().enumerate() {
                let endpoint = Endpoint {
                    component: component.reference.clone(),
                    pin,
                };
                match nets.iter_mut().find(|n| &n.name == node) {
                    Some(net) => net.endpoints.push(endpoint),
                    None => nets.push(Net {
                        name: node.clone(),
                        endpoints: vec![endpoint],
                    }),
                }
            }
        }
        Self { components, nets }
    }

    pub fn component(&self, reference: &str) -> Option<&CircuitComponent> {
        self.components.iter().find(|c| c.reference == reference)
    }

    pub fn component_index(&self, reference: &str) -> Option<usize> {
        self.components.iter().position(|c| c.reference == reference)
    }

    pub fn net(&self, name: &str) -> Option<&Net> {
        self.nets.iter().find(|n| n.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl std::str::FromStr for Circuit {
    type Err = NetlistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_netlist(s)
    }
}
