//! Content catalog
//!
//! Static, read-only description of the categories shown in the explore
//! phase. The core never mutates it; it only resolves focus names against it
//! and reads each category's sub-item layout policy.

use serde::{Deserialize, Serialize};

use crate::tuning::ConfigError;

/// Catalog shipped with the crate
const BUILTIN_CATALOG: &str = include_str!("../assets/catalog.json");

/// Default label for an item's image link
pub const DEFAULT_LINK_LABEL: &str = "View Image";

/// How a focused category's items orbit its node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Distribution {
    /// One flat ring, items evenly spaced
    #[default]
    Ring,
    /// Groups of four on differently inclined rings
    MultiPlane,
    /// Inclination and phase stepped to cover a sphere
    FullSphere,
}

/// A single entry inside a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub external_link: Option<String>,
    /// Image shown in the modal viewer
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub link_label: Option<String>,
}

impl Item {
    pub fn link_label(&self) -> &str {
        self.link_label.as_deref().unwrap_or(DEFAULT_LINK_LABEL)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub distribution: Distribution,
    pub items: Vec<Item>,
}

/// Ordered list of categories plus the owner shown in the intro
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub owner: String,
    #[serde(default)]
    pub role: String,
    pub categories: Vec<Category>,
}

impl Catalog {
    /// Parse and validate a catalog document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// The catalog embedded in the crate
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.categories.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        for (i, category) in self.categories.iter().enumerate() {
            if self.categories[..i].iter().any(|c| c.name == category.name) {
                return Err(ConfigError::DuplicateCategory(category.name.clone()));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Look up a category by name
    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Position of a category on the ring
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }
}
