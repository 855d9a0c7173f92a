use penplace_netlist::NetlistError;
use penplace_symbols::SymbolError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Coarse error classes reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Parse,
    Structural,
    Routing,
    Render,
    Config,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorClass::Parse => "parse",
            ErrorClass::Structural => "structural",
            ErrorClass::Routing => "routing",
            ErrorClass::Render => "render",
            ErrorClass::Config => "config",
        })
    }
}

/// Fatal pipeline errors. Nothing is rendered when one of these is returned.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("circuit has no components")]
    EmptyCircuit,

    #[error("no template for component type '{type_id}' (used by {component})")]
    UnknownComponentTemplate { component: String, type_id: String },

    #[error("{component} connects {nodes} nodes but template '{type_id}' has {pins} pins")]
    PinCountMismatch {
        component: String,
        type_id: String,
        nodes: usize,
        pins: usize,
    },

    #[error("nothing to render")]
    EmptyRender,

    #[error("invalid setting {key} = {value}: must be {expected}")]
    InvalidConfig {
        key: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error(transparent)]
    Symbol(#[from] SymbolError),

    #[error(transparent)]
    Netlist(#[from] NetlistError),
}

impl EngineError {
    pub fn class(&self) -> ErrorClass {
        match self {
            EngineError::EmptyCircuit
            | EngineError::UnknownComponentTemplate { .. }
            | EngineError::PinCountMismatch { .. } => ErrorClass::Structural,
            EngineError::EmptyRender => ErrorClass::Render,
            EngineError::InvalidConfig { .. } => ErrorClass::Config,
            EngineError::Symbol(e) if e.is_structural() => ErrorClass::Structural,
            EngineError::Symbol(_) => ErrorClass::Parse,
            EngineError::Netlist(e) if e.is_parse() => ErrorClass::Parse,
            EngineError::Netlist(_) => ErrorClass::Structural,
        }
    }
}

/// Per-net routing failure. Collected in the render output, never fatal.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum RoutingError {
    #[error("net '{net}': no route from {from} to {to} within {expansions} expansions")]
    RouteNotFound {
        net: String,
        from: String,
        to: String,
        expansions: usize,
    },
}

impl RoutingError {
    pub fn class(&self) -> ErrorClass {
        ErrorClass::Routing
    }

    pub fn net(&self) -> &str {
        match self {
            RoutingError::RouteNotFound { net, .. } => net,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_follow_the_taxonomy() {
        assert_eq!(EngineError::EmptyCircuit.class(), ErrorClass::Structural);
        assert_eq!(EngineError::EmptyRender.class(), ErrorClass::Render);

        let parse = penplace_netlist::parse_netlist("R1 A").unwrap_err();
        assert_eq!(EngineError::from(parse).class(), ErrorClass::Parse);

        let dup = penplace_netlist::parse_netlist("R1 A B\nR1 A B").unwrap_err();
        assert_eq!(EngineError::from(dup).class(), ErrorClass::Structural);

        let empty = SymbolError::EmptyComponent { name: "X".into() };
        assert_eq!(EngineError::from(empty).class(), ErrorClass::Structural);
    }

    #[test]
    fn unknown_template_names_the_type() {
        let err = EngineError::UnknownComponentTemplate {
            component: "XYZ1".into(),
            type_id: "XYZ".into(),
        };
        assert!(err.to_string().contains("'XYZ'"));
        assert_eq!(ErrorClass::Structural.to_string(), "structural");
    }
}
