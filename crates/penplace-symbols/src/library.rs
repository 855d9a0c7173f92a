use crate::error::SymbolError;
use crate::normalize::{normalize, NormalizerConfig};
use crate::svg::read_symbol;
use crate::template::ComponentTemplate;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const LIBRARY_VERSION: &str = "1";
pub const COORDINATE_SYSTEM: &str = "normalized_max_dimension";

/// Templates keyed by type id. Built once, then shared read-only between
/// renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateLibrary {
    pub version: String,
    pub coordinate_system: String,
    pub components: BTreeMap<String, ComponentTemplate>,
}

impl Default for TemplateLibrary {
    fn default() -> Self {
        Self {
            version: LIBRARY_VERSION.to_string(),
            coordinate_system: COORDINATE_SYSTEM.to_string(),
            components: BTreeMap::new(),
        }
    }
}

impl TemplateLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a template under its own type id, replacing any previous one.
    pub fn insert(&mut self, template: ComponentTemplate) {
        self.components.insert(template.type_id.clone(), template);
    }

    pub fn get(&self, type_id: &str) -> Option<&ComponentTemplate> {
        self.components.get(type_id)
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.components.contains_key(type_id)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentTemplate> {
        self.components.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ComponentTemplate> {
        self.components.values_mut()
    }

    /// Parse a persisted library and check every template in it.
    pub fn from_json(content: &str) -> Result<Self, SymbolError> {
        let library: Self = serde_json::from_str(content)?;
        for template in library.iter() {
            template.validate()?;
        }
        Ok(library)
    }

    pub fn to_json(&self) -> Result<String, SymbolError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, SymbolError> {
        let content = std::fs::read_to_string(path)?;
        let library = Self::from_json(&content)?;
        debug!(
            "loaded {} templates from {}",
            library.len(),
            path.display()
        );
        Ok(library)
    }

    pub fn save(&self, path: &Path) -> Result<(), SymbolError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Normalize every `*.svg` file directly inside `dir`. Files are visited
    /// in name order and the file stem becomes the type id.
    pub fn build_from_dir(dir: &Path, config: &NormalizerConfig) -> Result<Self, SymbolError> {
        let mut library = Self::new();
        for path in symbol_files(dir)? {
            let Some(type_id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let content = std::fs::read_to_string(&path)?;
            let elements = read_symbol(&content)?;
            let template = normalize(type_id, &elements, config)?;
            info!(
                "{type_id}: {} pins, {} stroke groups",
                template.pin_count(),
                template.strokes.len()
            );
            library.insert(template);
        }
        Ok(library)
    }
}

fn symbol_files(dir: &Path) -> Result<Vec<PathBuf>, SymbolError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_svg = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
        if path.is_file() && is_svg {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
