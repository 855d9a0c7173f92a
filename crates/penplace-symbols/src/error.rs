use thiserror::Error;

/// Errors raised while reading symbols or building templates.
#[derive(Debug, Error)]
pub enum SymbolError {
    /// Malformed symbol syntax. `token` is the offending input fragment.
    #[error("unexpected token '{token}' in {context}")]
    Parse { token: String, context: String },

    #[error("symbol '{name}' has no drawable geometry")]
    EmptyComponent { name: String },

    #[error("symbol '{name}' has a zero-area bounding box ({width} x {height})")]
    DegenerateGeometry {
        name: String,
        width: f64,
        height: f64,
    },

    #[error("template '{name}': {detail}")]
    InvalidTemplate { name: String, detail: String },

    #[error("malformed SVG document: {0}")]
    Svg(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("template library JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SymbolError {
    pub(crate) fn parse(token: impl Into<String>, context: impl Into<String>) -> Self {
        SymbolError::Parse {
            token: token.into(),
            context: context.into(),
        }
    }

    /// True for errors caused by the symbol's shape rather than its syntax.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            SymbolError::EmptyComponent { .. }
                | SymbolError::DegenerateGeometry { .. }
                | SymbolError::InvalidTemplate { .. }
        )
    }
}
