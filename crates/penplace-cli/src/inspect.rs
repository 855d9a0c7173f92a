use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use penplace_engine::{classify, Topology};
use penplace_netlist::{read_netlist, Circuit};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
#[command(about = "Print components, nets and the classified topology of a netlist")]
pub struct InspectArgs {
    #[arg(value_name = "NETLIST", value_hint = clap::ValueHint::FilePath)]
    pub netlist: PathBuf,

    /// Print the circuit and topology as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    circuit: &'a Circuit,
    topology: &'a Topology,
}

pub fn execute(args: InspectArgs) -> Result<()> {
    let circuit = read_netlist(&args.netlist)
        .with_context(|| format!("Failed to read netlist {}", args.netlist.display()))?;
    let topology = classify(&circuit);

    if args.json {
        let report = Report {
            circuit: &circuit,
            topology: &topology,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "Components".bold());
    for c in &circuit.components {
        println!(
            "  {:<8} {:<10} {:<24} {}",
            c.reference,
            c.component_type.type_id(),
            c.nodes.join(" "),
            c.value.as_deref().unwrap_or("")
        );
    }

    println!("{}", "Nets".bold());
    for net in &circuit.nets {
        let endpoints: Vec<String> = net
            .endpoints
            .iter()
            .map(|e| format!("{}.{}", e.component, e.pin_name()))
            .collect();
        println!("  {:<10} {}", net.name, endpoints.join(", "));
    }

    println!("{} {}", "Topology:".bold(), describe(&circuit, &topology));
    Ok(())
}

fn describe(circuit: &Circuit, topology: &Topology) -> String {
    let refs = |indices: &[usize]| -> String {
        indices
            .iter()
            .map(|&i| circuit.components[i].reference.as_str())
            .collect::<Vec<_>>()
            .join(" -> ")
    };
    match topology {
        Topology::Series { order } => format!("series ({})", refs(order)),
        Topology::Divider {
            source, top, bottom, ..
        } => format!("divider ({})", refs(&[*source, *top, *bottom])),
        Topology::Parallel {
            branches,
            left_net,
            right_net,
        } => format!(
            "parallel ({} between {left_net} and {right_net})",
            refs(branches).replace(" -> ", ", ")
        ),
        Topology::Grid => "grid".to_string(),
    }
}
