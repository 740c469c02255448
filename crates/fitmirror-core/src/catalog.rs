//! Outfit catalog store.
//!
//! The catalog is constructed once and passed by reference to whoever
//! needs outfit data. The built-in demo catalog is embedded at compile
//! time from `data/outfits.json`.

use crate::outfit::Outfit;
use std::path::Path;
use thiserror::Error;

const BUILTIN_CATALOG: &str = include_str!("../data/outfits.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown outfit: {0}")]
    UnknownOutfit(String),
}

/// In-memory outfit store.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    outfits: Vec<Outfit>,
}

impl Catalog {
    pub fn new(outfits: Vec<Outfit>) -> Self {
        Self { outfits }
    }

    /// The embedded demo catalog.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Parse a JSON array of outfits.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let outfits: Vec<Outfit> = serde_json::from_str(json)?;
        Ok(Self { outfits })
    }

    /// Load a JSON catalog file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json(&json)?;
        tracing::info!(path = %path.display(), outfits = catalog.len(), "loaded catalog");
        Ok(catalog)
    }

    pub fn list(&self) -> &[Outfit] {
        &self.outfits
    }

    pub fn get(&self, id: &str) -> Option<&Outfit> {
        self.outfits.iter().find(|o| o.id == id)
    }

    /// Like [`get`](Self::get), but an unknown id is an error.
    pub fn require(&self, id: &str) -> Result<&Outfit, CatalogError> {
        self.get(id)
            .ok_or_else(|| CatalogError::UnknownOutfit(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.outfits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outfits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outfit::GarmentType;

    #[test]
    fn test_builtin_catalog_parses() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.len(), 3);
        let interview = catalog.get("1").unwrap();
        assert_eq!(interview.name, "Professional Interview Look");
        assert_eq!(interview.items.len(), 2);
        assert_eq!(interview.items[0].kind, GarmentType::Top);
        assert_eq!(interview.items[1].kind, GarmentType::Bottom);
    }

    #[test]
    fn test_require_unknown() {
        let catalog = Catalog::builtin().unwrap();
        assert!(matches!(
            catalog.require("42"),
            Err(CatalogError::UnknownOutfit(id)) if id == "42"
        ));
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(
            Catalog::from_json("{not json"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Catalog::load(Path::new("/nonexistent/fitmirror/catalog.json"));
        assert!(matches!(result, Err(CatalogError::Io { .. })));
    }
}
