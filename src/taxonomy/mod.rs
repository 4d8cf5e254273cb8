//! Emotion taxonomy - static reference data for classification and palettes
//!
//! A taxonomy is an immutable, validated table of named categories. It is
//! loaded once (builtin table or JSON file) and passed explicitly to the
//! classifier and the assembler; nothing reads it through global state.

mod builtin;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::analysis::dimensions::EmotionDimensions;
use crate::analysis::palette::Color;
use crate::error::TaxonomyError;

/// Whether a category is a basic emotion or a blend of basic emotions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Primary,
    Composite,
}

/// One named category with its reference point and colors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionCategoryPrototype {
    pub name: String,
    pub kind: CategoryKind,
    pub prototype: EmotionDimensions,
    pub color_palette: Vec<Color>,
    /// Primary names this composite blends (empty for primaries)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub composed_of: Vec<String>,
}

impl EmotionCategoryPrototype {
    pub fn primary(name: &str, prototype: EmotionDimensions, color_palette: Vec<Color>) -> Self {
        Self {
            name: name.to_string(),
            kind: CategoryKind::Primary,
            prototype,
            color_palette,
            composed_of: Vec::new(),
        }
    }

    pub fn composite(
        name: &str,
        prototype: EmotionDimensions,
        color_palette: Vec<Color>,
        composed_of: &[&str],
    ) -> Self {
        Self {
            name: name.to_string(),
            kind: CategoryKind::Composite,
            prototype,
            color_palette,
            composed_of: composed_of.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn is_composite(&self) -> bool {
        self.kind == CategoryKind::Composite
    }
}

#[derive(Serialize, Deserialize)]
struct TaxonomyFile {
    categories: Vec<EmotionCategoryPrototype>,
}

/// Validated, immutable category table
#[derive(Debug, Clone, PartialEq)]
pub struct EmotionTaxonomy {
    categories: Vec<EmotionCategoryPrototype>,
}

impl EmotionTaxonomy {
    /// Build a taxonomy, validating it
    ///
    /// # Errors
    /// - `Empty` when there are no categories
    /// - `DuplicateCategory` when a name repeats
    /// - `UnknownComponent` when a composite lists a missing primary
    /// - `PrototypeOutOfRange` when a prototype coordinate is outside [0, 1]
    pub fn new(categories: Vec<EmotionCategoryPrototype>) -> Result<Self, TaxonomyError> {
        if categories.is_empty() {
            return Err(TaxonomyError::Empty);
        }

        let mut names = HashSet::new();
        for category in &categories {
            if !names.insert(category.name.as_str()) {
                return Err(TaxonomyError::DuplicateCategory {
                    name: category.name.clone(),
                });
            }
            let p = &category.prototype;
            for value in [p.valence, p.arousal, p.dominance, p.complexity] {
                if !(0.0..=1.0).contains(&value) {
                    return Err(TaxonomyError::PrototypeOutOfRange {
                        name: category.name.clone(),
                        value,
                    });
                }
            }
        }

        for category in categories.iter().filter(|c| c.is_composite()) {
            for component in &category.composed_of {
                let is_primary = categories
                    .iter()
                    .any(|c| &c.name == component && c.kind == CategoryKind::Primary);
                if !is_primary {
                    return Err(TaxonomyError::UnknownComponent {
                        composite: category.name.clone(),
                        component: component.clone(),
                    });
                }
            }
        }

        Ok(Self { categories })
    }

    /// The builtin Plutchik table: 8 primaries and their 8 primary dyads
    pub fn builtin() -> Self {
        builtin::BUILTIN_TAXONOMY.clone()
    }

    /// Parse `{"categories": [...]}` JSON
    pub fn from_json_str(json: &str) -> Result<Self, TaxonomyError> {
        let file: TaxonomyFile = serde_json::from_str(json).map_err(|e| TaxonomyError::Parse {
            reason: e.to_string(),
        })?;
        Self::new(file.categories)
    }

    /// Load and validate a JSON taxonomy file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, TaxonomyError> {
        let contents = fs::read_to_string(&path).map_err(|e| TaxonomyError::Parse {
            reason: format!("{:?}: {}", path.as_ref(), e),
        })?;
        let taxonomy = Self::from_json_str(&contents)?;
        log::info!(
            "[Taxonomy] Loaded {} categories from {:?}",
            taxonomy.len(),
            path.as_ref()
        );
        Ok(taxonomy)
    }

    /// Serialize in the same shape `from_json_str` accepts
    pub fn to_json_pretty(&self) -> Result<String, TaxonomyError> {
        let file = TaxonomyFile {
            categories: self.categories.clone(),
        };
        serde_json::to_string_pretty(&file).map_err(|e| TaxonomyError::Parse {
            reason: e.to_string(),
        })
    }

    /// All categories in declaration order
    pub fn categories(&self) -> &[EmotionCategoryPrototype] {
        &self.categories
    }

    pub fn primaries(&self) -> impl Iterator<Item = &EmotionCategoryPrototype> {
        self.categories.iter().filter(|c| !c.is_composite())
    }

    pub fn composites(&self) -> impl Iterator<Item = &EmotionCategoryPrototype> {
        self.categories.iter().filter(|c| c.is_composite())
    }

    pub fn get(&self, name: &str) -> Option<&EmotionCategoryPrototype> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Palette for `name`, empty if the category is unknown
    pub fn palette_for(&self, name: &str) -> &[Color] {
        self.get(name).map(|c| c.color_palette.as_slice()).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(v: f32, a: f32, d: f32) -> EmotionDimensions {
        EmotionDimensions::new(v, a, d, 0.3)
    }

    #[test]
    fn test_builtin_is_valid() {
        let taxonomy = EmotionTaxonomy::builtin();
        assert_eq!(taxonomy.primaries().count(), 8);
        assert_eq!(taxonomy.composites().count(), 8);
        assert!(taxonomy.get("Joy").is_some());
        assert_eq!(
            taxonomy.get("Love").unwrap().composed_of,
            vec!["Joy".to_string(), "Trust".to_string()]
        );
        assert!(taxonomy
            .categories()
            .iter()
            .all(|c| !c.color_palette.is_empty()));
        // Revalidation of the builtin table succeeds
        assert!(EmotionTaxonomy::new(taxonomy.categories().to_vec()).is_ok());
    }

    #[test]
    fn test_empty_taxonomy_rejected() {
        assert_eq!(EmotionTaxonomy::new(vec![]), Err(TaxonomyError::Empty));
    }

    #[test]
    fn test_duplicate_rejected() {
        let result = EmotionTaxonomy::new(vec![
            EmotionCategoryPrototype::primary("Joy", dims(0.9, 0.6, 0.7), vec![]),
            EmotionCategoryPrototype::primary("Joy", dims(0.8, 0.6, 0.7), vec![]),
        ]);
        assert!(matches!(
            result,
            Err(TaxonomyError::DuplicateCategory { name }) if name == "Joy"
        ));
    }

    #[test]
    fn test_unknown_component_rejected() {
        let result = EmotionTaxonomy::new(vec![
            EmotionCategoryPrototype::primary("Joy", dims(0.9, 0.6, 0.7), vec![]),
            EmotionCategoryPrototype::composite("Love", dims(0.85, 0.45, 0.55), vec![], &[
                "Joy", "Trust",
            ]),
        ]);
        assert!(matches!(
            result,
            Err(TaxonomyError::UnknownComponent { component, .. }) if component == "Trust"
        ));
    }

    #[test]
    fn test_out_of_range_prototype_rejected() {
        let mut prototype = dims(0.5, 0.5, 0.5);
        prototype.arousal = 1.5;
        let result = EmotionTaxonomy::new(vec![EmotionCategoryPrototype::primary(
            "Odd",
            prototype,
            vec![],
        )]);
        assert!(matches!(
            result,
            Err(TaxonomyError::PrototypeOutOfRange { .. })
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let taxonomy = EmotionTaxonomy::builtin();
        let json = taxonomy.to_json_pretty().unwrap();
        let parsed = EmotionTaxonomy::from_json_str(&json).unwrap();
        assert_eq!(parsed, taxonomy);
    }

    #[test]
    fn test_invalid_json() {
        let err = EmotionTaxonomy::from_json_str("{\"categories\": 3}").unwrap_err();
        assert!(matches!(err, TaxonomyError::Parse { .. }));
        let err = EmotionTaxonomy::from_json_str("{\"categories\": []}").unwrap_err();
        assert_eq!(err, TaxonomyError::Empty);
    }

    #[test]
    fn test_palette_for_unknown() {
        let taxonomy = EmotionTaxonomy::builtin();
        assert!(taxonomy.palette_for("Nope").is_empty());
        assert_eq!(taxonomy.palette_for("Joy").len(), 3);
    }
}
