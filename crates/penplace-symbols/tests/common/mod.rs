#![allow(dead_code)]

use std::path::Path;

pub const RESISTOR_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 40 20">
  <path d="M0 10 H10"/>
  <rect x="10" y="4" width="20" height="12"/>
  <path d="M30 10 H40"/>
  <circle cx="0" cy="10" r="1"/>
  <circle cx="40" cy="10" r="1"/>
</svg>"#;

pub const CAPACITOR_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 40 20">
  <path d="M0 10 H17 M17 2 V18 M23 2 V18 M23 10 H40"/>
  <circle id="pin1" cx="0" cy="10" r="1"/>
  <circle id="pin2" cx="40" cy="10" r="1"/>
</svg>"#;

pub const SOURCE_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 40 40">
  <circle cx="20" cy="20" r="12"/>
  <path d="M20 0 V8 M20 32 V40"/>
  <g transform="translate(20,20)">
    <path d="M-3 -6 h6 M0 -9 v6 M-3 6 h6"/>
  </g>
  <circle cx="20" cy="0" r="1"/>
  <circle cx="20" cy="40" r="1"/>
</svg>"#;

pub const GROUND_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 20 20">
  <path d="M10 0 V10 M0 10 H20 M4 14 H16 M8 18 H12"/>
  <circle cx="10" cy="0" r="1"/>
</svg>"#;

/// Symbol files for the basic R/C/VDC/GND set, as (file name, content).
pub fn basic_symbols() -> Vec<(&'static str, &'static str)> {
    vec![
        ("R.svg", RESISTOR_SVG),
        ("C.svg", CAPACITOR_SVG),
        ("VDC.svg", SOURCE_SVG),
        ("GND.svg", GROUND_SVG),
    ]
}

pub fn write_symbols(dir: &Path, symbols: &[(&str, &str)]) -> std::io::Result<()> {
    for (name, content) in symbols {
        std::fs::write(dir.join(name), content)?;
    }
    Ok(())
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn close(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}
