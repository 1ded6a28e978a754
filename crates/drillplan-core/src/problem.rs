//! Problem lists.
//!
//! A problem list is an externally supplied JSON file in `problem_lists/`:
//!
//! ```json
//! {
//!   "name": "NeetCode 150",
//!   "categories": {
//!     "Arrays & Hashing": [
//!       { "id": 217, "title": "Contains Duplicate", "leetcode_url": "..." }
//!     ]
//!   }
//! }
//! ```
//!
//! Category order is preserved and defines the configured list order.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Numeric problem id (the judge's problem number).
pub type ProblemId = u32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionLink {
    #[serde(default = "default_link_text")]
    pub text: String,
    pub url: String,
}

fn default_link_text() -> String {
    "Solution Link".into()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    #[serde(default)]
    pub explanation: Option<String>,
    /// Source code keyed by language, in file order.
    #[serde(default)]
    pub code: IndexMap<String, String>,
}

/// One practice problem. Never mutated by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDefinition {
    pub id: ProblemId,
    pub title: String,
    #[serde(default, alias = "url")]
    pub leetcode_url: Option<String>,
    #[serde(default)]
    pub solution_link: Option<SolutionLink>,
    #[serde(default)]
    pub hints: Vec<String>,
    #[serde(default)]
    pub solution: Option<Solution>,
    #[serde(default)]
    pub youtube_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub problems: Vec<ProblemDefinition>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCategories {
    Keyed(IndexMap<String, Vec<ProblemDefinition>>),
    Listed(Vec<Category>),
}

#[derive(Deserialize)]
struct RawCatalog {
    name: String,
    categories: RawCategories,
}

/// A named, ordered list of problems grouped by category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemCatalog {
    pub name: String,
    pub categories: Vec<Category>,
}

impl ProblemCatalog {
    /// Build a catalog, rejecting duplicate ids across categories.
    ///
    /// # Errors
    /// [`CatalogError::DuplicateId`] or [`CatalogError::Empty`].
    pub fn new(name: impl Into<String>, categories: Vec<Category>) -> Result<Self, CatalogError> {
        let catalog = Self {
            name: name.into(),
            categories,
        };
        catalog.check_ids()?;
        Ok(catalog)
    }

    /// Parse a catalog from JSON text. `path` is only used in errors.
    pub fn from_json(content: &str, path: &Path) -> Result<Self, CatalogError> {
        let raw: RawCatalog =
            serde_json::from_str(content).map_err(|source| CatalogError::ParseFailed {
                path: path.to_path_buf(),
                source,
            })?;
        let categories = match raw.categories {
            RawCategories::Keyed(map) => map
                .into_iter()
                .map(|(name, problems)| Category { name, problems })
                .collect(),
            RawCategories::Listed(list) => list,
        };
        Self::new(raw.name, categories)
    }

    /// Load a catalog file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content, path)
    }

    fn check_ids(&self) -> Result<(), CatalogError> {
        let mut seen: HashMap<ProblemId, &str> = HashMap::new();
        for category in &self.categories {
            for problem in &category.problems {
                if let Some(first) = seen.insert(problem.id, &category.name) {
                    return Err(CatalogError::DuplicateId {
                        id: problem.id,
                        first: first.to_string(),
                        second: category.name.clone(),
                    });
                }
            }
        }
        if seen.is_empty() {
            return Err(CatalogError::Empty(self.name.clone()));
        }
        Ok(())
    }

    /// All problems in list order with their category name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProblemDefinition)> {
        self.categories
            .iter()
            .flat_map(|c| c.problems.iter().map(move |p| (c.name.as_str(), p)))
    }

    pub fn len(&self) -> usize {
        self.categories.iter().map(|c| c.problems.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: ProblemId) -> Option<&ProblemDefinition> {
        self.iter().map(|(_, p)| p).find(|p| p.id == id)
    }
}

/// Names of the `*.json` problem lists in a directory, sorted.
pub fn available_lists(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    if !dir.exists() {
        return Ok(names);
    }
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

/// File path of a list name inside `dir`. Spaces are dropped, as in
/// "NeetCode 150" -> `NeetCode150.json`.
pub fn list_path(dir: &Path, name: &str) -> PathBuf {
    let file = if name.ends_with(".json") {
        name.to_string()
    } else {
        format!("{}.json", name.replace(' ', ""))
    };
    dir.join(file)
}
