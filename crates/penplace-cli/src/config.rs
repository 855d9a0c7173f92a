use anyhow::{Context, Result};
use log::debug;
use penplace_engine::{CanvasConfig, PlacerConfig, RenderConfig, RouterConfig};
use penplace_symbols::NormalizerConfig;
use serde::Deserialize;
use std::path::Path;

/// Picked up from the working directory when `--config` is not given.
pub const CONFIG_FILE: &str = "penplace.toml";

/// Contents of `penplace.toml`. Every table and key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub normalizer: NormalizerConfig,
    pub placer: PlacerConfig,
    pub router: RouterConfig,
    pub canvas: CanvasConfig,
}

impl Settings {
    /// Load `explicit`, or `penplace.toml` in the working directory if it
    /// exists, or the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::read(path),
            None if Path::new(CONFIG_FILE).is_file() => Self::read(Path::new(CONFIG_FILE)),
            None => Ok(Self::default()),
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        settings
            .render_config()
            .validate()
            .with_context(|| format!("Invalid config {}", path.display()))?;
        debug!("loaded config from {}", path.display());
        Ok(settings)
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            placer: self.placer.clone(),
            router: self.router.clone(),
            canvas: self.canvas.clone(),
        }
    }
}

/// Parse a `WIDTHxHEIGHT` viewport such as `1404x1872`.
pub fn parse_viewport(value: &str) -> Result<(f64, f64), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| *v > 0.0)
            .ok_or_else(|| format!("invalid viewport dimension '{s}'"))
    };
    Ok((parse(w)?, parse(h)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_tables_keep_defaults() {
        let settings: Settings = toml::from_str("[router]\ngrid = 20.0\n").unwrap();
        assert_eq!(settings.router.grid, 20.0);
        assert_eq!(settings.router.max_expansions, 200_000);
        assert_eq!(settings.normalizer.tolerance, 0.5);
        assert_eq!(settings.render_config().canvas.width, 1404.0);
    }

    #[test]
    fn unknown_tables_are_rejected() {
        assert!(toml::from_str::<Settings>("[routr]\ngrid = 20.0\n").is_err());
    }

    #[test]
    fn out_of_range_values_are_rejected() -> Result<()> {
        let temp = assert_fs::TempDir::new()?;
        let path = temp.path().join("penplace.toml");
        std::fs::write(&path, "[router]\ngrid = 0.0\n")?;
        let err = Settings::read(&path).unwrap_err();
        assert!(format!("{err:#}").contains("router.grid"), "{err:#}");

        std::fs::write(&path, "[placer]\nmargin = -30.0\n")?;
        assert!(Settings::read(&path).is_err());

        std::fs::write(&path, "[router]\ngrid = 5.0\n")?;
        assert_eq!(Settings::read(&path)?.router.grid, 5.0);
        Ok(())
    }

    #[test]
    fn viewport_syntax() {
        assert_eq!(parse_viewport("800x600"), Ok((800.0, 600.0)));
        assert!(parse_viewport("800").is_err());
        assert!(parse_viewport("0x600").is_err());
    }
}
