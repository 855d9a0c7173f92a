use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical component kinds recognised from reference prefixes. Anything
/// else is kept as [`ComponentType::Unknown`] with the prefix as written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ComponentType {
    Resistor,
    Capacitor,
    Inductor,
    Diode,
    ZenerDiode,
    DcSource,
    AcSource,
    CurrentSource,
    NpnBjt,
    NMosfet,
    OpAmp,
    Ground,
    Switch,
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Passive,
    Source,
    Semiconductor,
    Active,
    Reference,
    Unknown,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Passive => "passive",
            Category::Source => "source",
            Category::Semiconductor => "semiconductor",
            Category::Active => "active",
            Category::Reference => "reference",
            Category::Unknown => "unknown",
        }
    }
}

impl ComponentType {
    /// Resolve a reference designator such as `R1` or `VAC2`. The full
    /// alphabetic prefix is tried first, then its first letter.
    pub fn from_reference(reference: &str) -> Self {
        let prefix: String = reference
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .collect();
        let upper = prefix.to_ascii_uppercase();

        if let Some(kind) = Self::from_prefix(&upper) {
            return kind;
        }
        if let Some(kind) = upper.get(..1).and_then(Self::from_prefix) {
            return kind;
        }
        ComponentType::Unknown(prefix)
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        let kind = match prefix {
            "R" => ComponentType::Resistor,
            "C" => ComponentType::Capacitor,
            "L" => ComponentType::Inductor,
            "D" => ComponentType::Diode,
            "ZD" => ComponentType::ZenerDiode,
            "V" | "VDC" => ComponentType::DcSource,
            "VAC" => ComponentType::AcSource,
            "I" => ComponentType::CurrentSource,
            "Q" => ComponentType::NpnBjt,
            "M" => ComponentType::NMosfet,
            "U" => ComponentType::OpAmp,
            "GND" => ComponentType::Ground,
            "SW" => ComponentType::Switch,
            _ => return None,
        };
        Some(kind)
    }

    /// Inverse of [`ComponentType::type_id`].
    pub fn from_type_id(type_id: &str) -> Self {
        match type_id {
            "R" => ComponentType::Resistor,
            "C" => ComponentType::Capacitor,
            "L" => ComponentType::Inductor,
            "D" => ComponentType::Diode,
            "ZD" => ComponentType::ZenerDiode,
            "VDC" => ComponentType::DcSource,
            "VAC" => ComponentType::AcSource,
            "IDC" => ComponentType::CurrentSource,
            "NPN_BJT" => ComponentType::NpnBjt,
            "N_MOSFET" => ComponentType::NMosfet,
            "OPAMP" => ComponentType::OpAmp,
            "GND" => ComponentType::Ground,
            "SW" => ComponentType::Switch,
            other => ComponentType::Unknown(other.to_string()),
        }
    }

    /// Key of this type in a template library. Unknown types use their
    /// reference prefix.
    pub fn type_id(&self) -> &str {
        match self {
            ComponentType::Resistor => "R",
            ComponentType::Capacitor => "C",
            ComponentType::Inductor => "L",
            ComponentType::Diode => "D",
            ComponentType::ZenerDiode => "ZD",
            ComponentType::DcSource => "VDC",
            ComponentType::AcSource => "VAC",
            ComponentType::CurrentSource => "IDC",
            ComponentType::NpnBjt => "NPN_BJT",
            ComponentType::NMosfet => "N_MOSFET",
            ComponentType::OpAmp => "OPAMP",
            ComponentType::Ground => "GND",
            ComponentType::Switch => "SW",
            ComponentType::Unknown(prefix) => prefix.as_str(),
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            ComponentType::Resistor => "Resistor",
            ComponentType::Capacitor => "Capacitor",
            ComponentType::Inductor => "Inductor",
            ComponentType::Diode => "Diode",
            ComponentType::ZenerDiode => "Zener Diode",
            ComponentType::DcSource => "DC Voltage Source",
            ComponentType::AcSource => "AC Voltage Source",
            ComponentType::CurrentSource => "DC Current Source",
            ComponentType::NpnBjt => "NPN Transistor",
            ComponentType::NMosfet => "N-Channel MOSFET",
            ComponentType::OpAmp => "Operational Amplifier",
            ComponentType::Ground => "Ground",
            ComponentType::Switch => "Switch",
            ComponentType::Unknown(_) => "Unknown",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            ComponentType::Resistor
            | ComponentType::Capacitor
            | ComponentType::Inductor
            | ComponentType::Switch => Category::Passive,
            ComponentType::DcSource | ComponentType::AcSource | ComponentType::CurrentSource => {
                Category::Source
            }
            ComponentType::Diode
            | ComponentType::ZenerDiode
            | ComponentType::NpnBjt
            | ComponentType::NMosfet => Category::Semiconductor,
            ComponentType::OpAmp => Category::Active,
            ComponentType::Ground => Category::Reference,
            ComponentType::Unknown(_) => Category::Unknown,
        }
    }

    /// Number of node tokens a component of this type takes. `None` for
    /// unknown types, which take every remaining token.
    pub fn node_count(&self) -> Option<usize> {
        match self {
            ComponentType::Ground => Some(1),
            ComponentType::NpnBjt | ComponentType::NMosfet => Some(3),
            ComponentType::OpAmp => Some(5),
            ComponentType::Unknown(_) => None,
            _ => Some(2),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ComponentType::Unknown(_))
    }

    pub fn is_source(&self) -> bool {
        self.category() == Category::Source
    }

    /// Two-terminal R, C or L.
    pub fn is_passive(&self) -> bool {
        matches!(
            self,
            ComponentType::Resistor | ComponentType::Capacitor | ComponentType::Inductor
        )
    }

    pub fn is_ground(&self) -> bool {
        *self == ComponentType::Ground
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentType::Unknown(prefix) => write!(f, "UNKNOWN({prefix})"),
            other => f.write_str(other.type_id()),
        }
    }
}

impl From<ComponentType> for String {
    fn from(kind: ComponentType) -> Self {
        kind.type_id().to_string()
    }
}

impl From<String> for ComponentType {
    fn from(type_id: String) -> Self {
        ComponentType::from_type_id(&type_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_prefix_before_first_letter() {
        assert_eq!(ComponentType::from_reference("VAC1"), ComponentType::AcSource);
        assert_eq!(ComponentType::from_reference("VDC3"), ComponentType::DcSource);
        assert_eq!(ComponentType::from_reference("V1"), ComponentType::DcSource);
        assert_eq!(ComponentType::from_reference("ZD2"), ComponentType::ZenerDiode);
        assert_eq!(ComponentType::from_reference("GND1"), ComponentType::Ground);
        assert_eq!(ComponentType::from_reference("RLOAD"), ComponentType::Resistor);
    }

    #[test]
    fn unknown_prefix_is_kept() {
        let kind = ComponentType::from_reference("XYZ1");
        assert_eq!(kind, ComponentType::Unknown("XYZ".into()));
        assert_eq!(kind.type_id(), "XYZ");
        assert_eq!(kind.node_count(), None);
        assert_eq!(kind.to_string(), "UNKNOWN(XYZ)");
    }

    #[test]
    fn node_counts() {
        assert_eq!(ComponentType::Ground.node_count(), Some(1));
        assert_eq!(ComponentType::NpnBjt.node_count(), Some(3));
        assert_eq!(ComponentType::OpAmp.node_count(), Some(5));
        assert_eq!(ComponentType::Capacitor.node_count(), Some(2));
    }

    #[test]
    fn serializes_as_type_id() {
        let json = serde_json::to_string(&ComponentType::NMosfet).unwrap();
        assert_eq!(json, "\"N_MOSFET\"");
        let back: ComponentType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ComponentType::NMosfet);
    }
}
