#![allow(dead_code)]

use anyhow::Result;
use assert_fs::prelude::*;
use assert_fs::TempDir;

pub const RESISTOR: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 40 20">
  <path d="M0 10 H10 M30 10 H40"/>
  <rect x="10" y="4" width="20" height="12"/>
  <circle cx="0" cy="10" r="1"/>
  <circle cx="40" cy="10" r="1"/>
</svg>"#;

pub const CAPACITOR: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 40 20">
  <path d="M0 10 H17 M17 2 V18 M23 2 V18 M23 10 H40"/>
  <circle id="pin1" cx="0" cy="10" r="1"/>
  <circle id="pin2" cx="40" cy="10" r="1"/>
</svg>"#;

pub const SOURCE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 40 40">
  <circle cx="20" cy="20" r="12"/>
  <path d="M20 0 V8 M20 32 V40"/>
  <circle cx="20" cy="0" r="1"/>
  <circle cx="20" cy="40" r="1"/>
</svg>"#;

pub const GROUND: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 20 20">
  <path d="M10 0 V10 M0 10 H20 M4 14 H16 M8 18 H12"/>
  <circle cx="10" cy="0" r="1"/>
</svg>"#;

pub const RC_LOOP: &str = "V1 IN 0 5V\nR1 IN OUT 10k\nC1 OUT 0 100nF\n";

/// Temp project with `symbols/` holding the R, C, VDC and GND symbols.
pub fn project() -> Result<TempDir> {
    let temp = TempDir::new()?;
    let symbols = temp.child("symbols");
    symbols.create_dir_all()?;
    symbols.child("R.svg").write_str(RESISTOR)?;
    symbols.child("C.svg").write_str(CAPACITOR)?;
    symbols.child("VDC.svg").write_str(SOURCE)?;
    symbols.child("GND.svg").write_str(GROUND)?;
    Ok(temp)
}

pub fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
