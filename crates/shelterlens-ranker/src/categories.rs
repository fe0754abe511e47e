//! Name → category lookup table.
//!
//! The table lives outside the code in a keyed file so new shelters can be
//! classified without a rebuild. Accepted layouts:
//!
//! ```toml
//! [categories]
//! "Weinberg Housing and Resource Center" = "Emergency Shelters"
//! ```
//!
//! or the same mapping as a YAML/JSON document, either wrapped in a
//! `categories` key or as a flat object.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;
use shelterlens_common::error::{Result, ShelterError};
use shelterlens_common::Category;
use tracing::debug;

#[derive(Deserialize)]
#[serde(untagged)]
enum CategoryDocument {
    Wrapped { categories: BTreeMap<String, String> },
    Flat(BTreeMap<String, String>),
}

impl CategoryDocument {
    fn into_entries(self) -> BTreeMap<String, String> {
        match self {
            CategoryDocument::Wrapped { categories } => categories,
            CategoryDocument::Flat(entries) => entries,
        }
    }
}

fn fold(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Static name → category table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryMap {
    exact: HashMap<String, Category>,
    folded: HashMap<String, Category>,
}

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, N, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, C)>,
        N: Into<String>,
        C: Into<Category>,
    {
        let mut map = Self::new();
        for (name, category) in pairs {
            map.insert(name, category);
        }
        map
    }

    pub fn with(mut self, name: &str, category: Category) -> Self {
        self.insert(name, category);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, category: impl Into<Category>) {
        let name = name.into();
        let category = category.into();
        self.folded.insert(fold(&name), category.clone());
        self.exact.insert(name, category);
    }

    /// Load a table, picking the format from the file extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let map = match ext.as_str() {
            "toml" => Self::from_toml_str(&content)?,
            "yaml" | "yml" => Self::from_yaml_str(&content)?,
            "json" => Self::from_json_str(&content)?,
            other => {
                return Err(ShelterError::Config(format!(
                    "unsupported category table format '{}' for {}",
                    other,
                    path.display()
                )))
            }
        };
        debug!(path = %path.display(), entries = map.len(), "Loaded category table");
        Ok(map)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let doc: CategoryDocument =
            toml::from_str(content).map_err(|e| ShelterError::Config(e.to_string()))?;
        Ok(Self::from_pairs(doc.into_entries()))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let doc: CategoryDocument =
            serde_yaml::from_str(content).map_err(|e| ShelterError::Config(e.to_string()))?;
        Ok(Self::from_pairs(doc.into_entries()))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let doc: CategoryDocument = serde_json::from_str(content)?;
        Ok(Self::from_pairs(doc.into_entries()))
    }

    /// Exact name first, then a trimmed case-insensitive match.
    pub fn lookup(&self, name: &str) -> Option<&Category> {
        self.exact
            .get(name)
            .or_else(|| self.folded.get(&fold(name)))
    }

    /// Category for a record: table entry, else the label the source
    /// carried, else `Unknown`.
    pub fn resolve(&self, name: &str, source_label: Option<&str>) -> Category {
        match self.lookup(name) {
            Some(category) => category.clone(),
            None => source_label.map(Category::parse).unwrap_or_default(),
        }
    }

    pub fn len(&self) -> usize {
        self.exact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }
}
