#![allow(dead_code)]

use anyhow::Result;
use penplace_netlist::{parse_netlist, Circuit};
use penplace_symbols::svg::read_symbol;
use penplace_symbols::{normalize, NormalizerConfig, TemplateLibrary};

const RESISTOR: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 40 20">
  <path d="M0 10 H10"/>
  <rect x="10" y="4" width="20" height="12"/>
  <path d="M30 10 H40"/>
  <circle cx="0" cy="10" r="1"/>
  <circle cx="40" cy="10" r="1"/>
</svg>"#;

const CAPACITOR: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 40 20">
  <path d="M0 10 H17 M17 2 V18 M23 2 V18 M23 10 H40"/>
  <circle id="pin1" cx="0" cy="10" r="1"/>
  <circle id="pin2" cx="40" cy="10" r="1"/>
</svg>"#;

const SOURCE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 40 40">
  <circle cx="20" cy="20" r="12"/>
  <path d="M20 0 V8 M20 32 V40"/>
  <circle cx="20" cy="0" r="1"/>
  <circle cx="20" cy="40" r="1"/>
</svg>"#;

const GROUND: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 20 20">
  <path d="M10 0 V10 M0 10 H20 M4 14 H16 M8 18 H12"/>
  <circle cx="10" cy="0" r="1"/>
</svg>"#;

/// R, C, VDC and GND templates normalized from inline SVG.
pub fn basic_library() -> Result<TemplateLibrary> {
    let config = NormalizerConfig::default();
    let mut library = TemplateLibrary::new();
    for (type_id, svg) in [
        ("R", RESISTOR),
        ("C", CAPACITOR),
        ("VDC", SOURCE),
        ("GND", GROUND),
    ] {
        library.insert(normalize(type_id, &read_symbol(svg)?, &config)?);
    }
    Ok(library)
}

pub fn circuit(text: &str) -> Result<Circuit> {
    Ok(parse_netlist(text)?)
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
