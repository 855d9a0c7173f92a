use clap::{Parser, Subcommand};
use colored::Colorize;
use penplace_engine::{EngineError, ErrorClass};
use penplace_netlist::NetlistError;
use penplace_symbols::SymbolError;

mod build_library;
mod config;
mod inspect;
mod render;

#[derive(Parser)]
#[command(name = "penplace")]
#[command(about = "Render SPICE-style netlists as pen strokes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a directory of SVG symbols into a template library
    #[command(alias = "b")]
    BuildLibrary(build_library::BuildLibraryArgs),

    /// Place, route and draw a netlist
    #[command(alias = "r")]
    Render(render::RenderArgs),

    /// Show the parsed circuit and its classified topology
    #[command(alias = "i")]
    Inspect(inspect::InspectArgs),
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::BuildLibrary(args) => build_library::execute(args),
        Commands::Render(args) => render::execute(args),
        Commands::Inspect(args) => inspect::execute(args),
    };

    if let Err(err) = result {
        let label = match error_class(&err) {
            Some(class) => format!("error[{class}]"),
            None => "error".to_string(),
        };
        eprintln!("{}: {err:#}", label.red().bold());
        std::process::exit(1);
    }
}

/// Class of the first library error in the chain. IO failures have none.
fn error_class(err: &anyhow::Error) -> Option<ErrorClass> {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<EngineError>() {
            return match e {
                EngineError::Netlist(NetlistError::Io(_)) | EngineError::Symbol(SymbolError::Io(_)) => None,
                _ => Some(e.class()),
            };
        }
        if let Some(e) = cause.downcast_ref::<NetlistError>() {
            return match e {
                NetlistError::Io(_) => None,
                e if e.is_parse() => Some(ErrorClass::Parse),
                _ => Some(ErrorClass::Structural),
            };
        }
        if let Some(e) = cause.downcast_ref::<SymbolError>() {
            return match e {
                SymbolError::Io(_) => None,
                e if e.is_structural() => Some(ErrorClass::Structural),
                _ => Some(ErrorClass::Parse),
            };
        }
    }
    None
}
