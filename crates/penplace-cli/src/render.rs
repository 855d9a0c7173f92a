use crate::config::{parse_viewport, Settings};
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use log::debug;
use penplace_engine::render;
use penplace_netlist::read_netlist;
use penplace_symbols::TemplateLibrary;
use std::path::PathBuf;

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// `pen down X Y` / `pen move X Y` / `pen up` lines.
    #[default]
    Lamp,
    /// Stroke list as JSON.
    Json,
    /// SVG preview.
    Svg,
}

#[derive(Args, Debug, Clone)]
#[command(about = "Render a netlist to pen strokes")]
pub struct RenderArgs {
    /// Netlist file.
    #[arg(value_name = "NETLIST", value_hint = clap::ValueHint::FilePath)]
    pub netlist: PathBuf,

    /// Template library produced by `build-library`.
    #[arg(value_name = "LIBRARY", value_hint = clap::ValueHint::FilePath)]
    pub library: PathBuf,

    /// Fixed output scale instead of fitting the viewport.
    #[arg(long)]
    pub scale: Option<f64>,

    /// Routing grid pitch, in template units.
    #[arg(long)]
    pub grid: Option<f64>,

    /// Canvas size as WIDTHxHEIGHT.
    #[arg(long, value_name = "WxH", value_parser = parse_viewport)]
    pub viewport: Option<(f64, f64)>,

    /// Canvas margin.
    #[arg(long)]
    pub margin: Option<f64>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Lamp)]
    pub format: OutputFormat,

    /// Write the output here instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Config file (defaults to ./penplace.toml when present).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

pub fn execute(args: RenderArgs) -> Result<()> {
    let settings = Settings::load(args.config.as_deref())?;
    let mut config = settings.render_config();
    if let Some(scale) = args.scale {
        config.canvas.scale = Some(scale);
    }
    if let Some(grid) = args.grid {
        config.router.grid = grid;
    }
    if let Some((width, height)) = args.viewport {
        config.canvas.width = width;
        config.canvas.height = height;
    }
    if let Some(margin) = args.margin {
        config.canvas.margin = margin;
    }
    debug!("render config: {config:?}");

    let circuit = read_netlist(&args.netlist)
        .with_context(|| format!("Failed to read netlist {}", args.netlist.display()))?;
    let library = TemplateLibrary::load(&args.library)
        .with_context(|| format!("Failed to load library {}", args.library.display()))?;

    let output = render(&circuit, &library, &config)?;

    for failure in &output.failed_nets {
        eprintln!(
            "{}: {failure}",
            format!("warning[{}]", failure.class()).yellow().bold()
        );
    }

    let text = match args.format {
        OutputFormat::Lamp => output.to_lamp(),
        OutputFormat::Json => output.to_json()?,
        OutputFormat::Svg => output.to_svg(),
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, &text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} {} ({}, {} components, {} nets) to {}",
                "Rendered".green().bold(),
                args.netlist.display(),
                output.topology.name(),
                output.placed.len(),
                output.routes.len(),
                path.display()
            );
        }
        None => print!("{text}"),
    }
    Ok(())
}
