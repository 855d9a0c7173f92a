use crate::error::NetlistError;
use crate::{canonical_node, Circuit, CircuitComponent, ComponentType};
use log::{debug, trace};
use std::collections::HashSet;
use std::path::Path;

/// Parse netlist text into a [`Circuit`].
///
/// Blank lines and `*` lines are comments. `.` lines are directives; `.end`
/// stops parsing and every other directive is ignored.
pub fn parse_netlist(text: &str) -> Result<Circuit, NetlistError> {
    let mut components = Vec::new();
    let mut seen = HashSet::new();

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();

        if line.is_empty() || line.starts_with('*') {
            continue;
        }
        if let Some(directive) = line.strip_prefix('.') {
            if directive
                .split_whitespace()
                .next()
                .is_some_and(|d| d.eq_ignore_ascii_case("end"))
            {
                trace!("line {line_no}: .end");
                break;
            }
            debug!("line {line_no}: ignoring directive '{line}'");
            continue;
        }

        let component = parse_component(line, line_no)?;
        if !seen.insert(component.reference.clone()) {
            return Err(NetlistError::DuplicateReference {
                line: line_no,
                reference: component.reference,
            });
        }
        components.push(component);
    }

    let circuit = Circuit::from_components(components);
    debug!(
        "parsed {} components, {} nets",
        circuit.components.len(),
        circuit.nets.len()
    );
    Ok(circuit)
}

/// Read and parse a netlist file.
pub fn read_netlist(path: &Path) -> Result<Circuit, NetlistError> {
    let text = std::fs::read_to_string(path)?;
    debug!("reading netlist {}", path.display());
    parse_netlist(&text)
}

fn parse_component(line: &str, line_no: usize) -> Result<CircuitComponent, NetlistError> {
    let malformed = || NetlistError::MalformedLine {
        line: line_no,
        content: line.to_string(),
    };

    let mut tokens = line.split_whitespace();
    let reference = tokens.next().ok_or_else(malformed)?;
    let rest: Vec<&str> = tokens.collect();
    if rest.len() < 2 {
        return Err(malformed());
    }

    let component_type = ComponentType::from_reference(reference);
    let node_count = component_type.node_count().unwrap_or(rest.len());
    if rest.len() < node_count {
        return Err(malformed());
    }

    let (nodes, value) = rest.split_at(node_count);
    let value = (!value.is_empty()).then(|| value.join(" "));

    Ok(CircuitComponent {
        reference: reference.to_string(),
        component_type,
        nodes: nodes.iter().map(|n| canonical_node(n)).collect(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Endpoint;

    #[test]
    fn parses_components_and_values() {
        let circuit = parse_netlist("V1 IN 0 5V\nR1 IN OUT 10k\nC1 OUT 0 100nF\n").unwrap();
        assert_eq!(circuit.components.len(), 3);
        assert_eq!(circuit.components[0].component_type, ComponentType::DcSource);
        assert_eq!(circuit.components[0].nodes, ["IN", "GND"]);
        assert_eq!(circuit.components[0].value.as_deref(), Some("5V"));
        let names: Vec<_> = circuit.nets.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["IN", "GND", "OUT"]);
    }

    #[test]
    fn comments_directives_and_end() {
        let text = "* title\n\n.tran 1ms\nR1 A B\n.END\nR2 A B\n";
        let circuit = parse_netlist(text).unwrap();
        assert_eq!(circuit.components.len(), 1);
    }

    #[test]
    fn value_tokens_are_joined() {
        let circuit = parse_netlist("VAC1 IN 0 SIN 0 1 60").unwrap();
        assert_eq!(circuit.components[0].value.as_deref(), Some("SIN 0 1 60"));
    }

    #[test]
    fn ground_takes_one_node() {
        let circuit = parse_netlist("GND1 B 0").unwrap();
        let gnd = &circuit.components[0];
        assert_eq!(gnd.nodes, ["B"]);
        assert_eq!(gnd.value.as_deref(), Some("0"));
    }

    #[test]
    fn transistor_takes_three_nodes() {
        let circuit = parse_netlist("Q1 c b e 2N3904").unwrap();
        let q = &circuit.components[0];
        assert_eq!(q.nodes.len(), 3);
        assert_eq!(
            circuit.net("e").unwrap().endpoints,
            vec![Endpoint {
                component: "Q1".into(),
                pin: 2
            }]
        );
    }

    #[test]
    fn unknown_types_take_every_token() {
        let circuit = parse_netlist("XYZ1 A B C").unwrap();
        let x = &circuit.components[0];
        assert_eq!(x.component_type, ComponentType::Unknown("XYZ".into()));
        assert_eq!(x.nodes, ["A", "B", "C"]);
        assert_eq!(x.value, None);
    }

    #[test]
    fn short_line_is_malformed() {
        let err = parse_netlist("R1 A B\nR2 A\n").unwrap_err();
        match err {
            NetlistError::MalformedLine { line, content } => {
                assert_eq!(line, 2);
                assert_eq!(content, "R2 A");
            }
            other => panic!("unexpected {other}"),
        }
    }

    #[test]
    fn transistor_missing_node_is_malformed() {
        let err = parse_netlist("Q1 c b").unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn duplicate_reference_is_rejected() {
        let err = parse_netlist("R1 A B\n* again\nR1 B C\n").unwrap_err();
        match err {
            NetlistError::DuplicateReference { line, reference } => {
                assert_eq!(line, 3);
                assert_eq!(reference, "R1");
            }
            other => panic!("unexpected {other}"),
        }
        assert!(!parse_netlist("R1 A B\nR1 B C").unwrap_err().is_parse());
    }
}
