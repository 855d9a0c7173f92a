use crate::error::EngineError;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlacerConfig {
    /// Clearance between neighbouring components, in template units.
    pub margin: f64,
}

impl Default for PlacerConfig {
    fn default() -> Self {
        Self { margin: 60.0 }
    }
}

/// Router configuration. Penalties are expressed in grid pitches so they
/// scale with `grid`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Grid pitch in template units.
    pub grid: f64,
    /// Extra cost for each change of direction.
    pub bend_penalty: f64,
    /// Extra cost for entering a cell inside a component's bbox.
    pub obstacle_penalty: f64,
    /// Upper bound on A* node expansions per two-terminal search.
    pub max_expansions: usize,
    /// Free cells added around the routing area on every side.
    pub margin_cells: i32,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            grid: 10.0,
            bend_penalty: 0.5,
            obstacle_penalty: 100.0,
            max_expansions: 200_000,
            margin_cells: 4,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub max_scale: f64,
    /// Fixed scale; bypasses fitting to the viewport when set.
    pub scale: Option<f64>,
}

impl Default for CanvasConfig {
    // reMarkable 2, portrait.
    fn default() -> Self {
        Self {
            width: 1404.0,
            height: 1872.0,
            margin: 100.0,
            max_scale: 2.0,
            scale: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub placer: PlacerConfig,
    pub router: RouterConfig,
    pub canvas: CanvasConfig,
}

impl RenderConfig {
    /// Reject values the placer, router or compositor cannot work with.
    pub fn validate(&self) -> Result<(), EngineError> {
        let canvas = &self.canvas;
        let router = &self.router;
        at_least_zero("placer.margin", self.placer.margin)?;
        positive("router.grid", router.grid)?;
        at_least_zero("router.bend_penalty", router.bend_penalty)?;
        at_least_zero("router.obstacle_penalty", router.obstacle_penalty)?;
        at_least_zero("router.margin_cells", f64::from(router.margin_cells))?;
        positive("canvas.width", canvas.width)?;
        positive("canvas.height", canvas.height)?;
        at_least_zero("canvas.margin", canvas.margin)?;
        positive("canvas.max_scale", canvas.max_scale)?;
        if let Some(scale) = canvas.scale {
            positive("canvas.scale", scale)?;
        }
        Ok(())
    }
}

fn positive(key: &'static str, value: f64) -> Result<(), EngineError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidConfig {
            key,
            value,
            expected: "positive",
        })
    }
}

fn at_least_zero(key: &'static str, value: f64) -> Result<(), EngineError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EngineError::InvalidConfig {
            key,
            value,
            expected: "zero or more",
        })
    }
}
