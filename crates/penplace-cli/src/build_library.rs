use crate::config::Settings;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use log::debug;
use penplace_netlist::ComponentType;
use penplace_symbols::TemplateLibrary;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
#[command(about = "Build a template library from SVG symbols")]
pub struct BuildLibraryArgs {
    /// Directory of `<TYPE>.svg` symbol files (non-recursive).
    #[arg(value_name = "SYMBOLS_DIR", value_hint = clap::ValueHint::DirPath)]
    pub symbols: PathBuf,

    /// Write the library here instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Simplification tolerance, in source units.
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Circles smaller than this radius are pin markers.
    #[arg(long)]
    pub pin_radius: Option<f64>,

    /// Config file (defaults to ./penplace.toml when present).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

pub fn execute(args: BuildLibraryArgs) -> Result<()> {
    let settings = Settings::load(args.config.as_deref())?;
    let mut normalizer = settings.normalizer;
    if let Some(tolerance) = args.tolerance {
        normalizer.tolerance = tolerance;
    }
    if let Some(radius) = args.pin_radius {
        normalizer.pin_radius = radius;
    }
    debug!("normalizer: {normalizer:?}");

    let mut library = TemplateLibrary::build_from_dir(&args.symbols, &normalizer)
        .with_context(|| format!("Failed to build library from {}", args.symbols.display()))?;
    if library.is_empty() {
        anyhow::bail!("No .svg symbols found in {}", args.symbols.display());
    }

    for template in library.iter_mut() {
        let kind = ComponentType::from_type_id(&template.type_id);
        template.name = kind.display_name().to_string();
        template.category = kind.category().as_str().to_string();
    }

    match &args.output {
        Some(path) => {
            library
                .save(path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} {} templates to {}",
                "Wrote".green().bold(),
                library.len(),
                path.display()
            );
        }
        None => println!("{}", library.to_json()?),
    }
    Ok(())
}
