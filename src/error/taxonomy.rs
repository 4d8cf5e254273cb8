// Taxonomy error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Taxonomy error code constants
///
/// Error code range: 3001-3005
pub struct TaxonomyErrorCodes {}

impl TaxonomyErrorCodes {
    /// No categories to classify against
    pub const EMPTY: i32 = 3001;

    /// Two categories share a name
    pub const DUPLICATE_CATEGORY: i32 = 3002;

    /// A composite names a primary that does not exist
    pub const UNKNOWN_COMPONENT: i32 = 3003;

    /// A prototype coordinate lies outside [0, 1]
    pub const PROTOTYPE_OUT_OF_RANGE: i32 = 3004;

    /// Taxonomy source could not be read or parsed
    pub const PARSE: i32 = 3005;
}

/// Log a taxonomy error with structured context
pub fn log_taxonomy_error(err: &TaxonomyError, context: &str) {
    error!(
        "Taxonomy error in {}: code={}, component=EmotionTaxonomy, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Taxonomy setup errors
///
/// Surfaced once when the analyzer is constructed, never per frame.
#[derive(Debug, Clone, PartialEq)]
pub enum TaxonomyError {
    /// The taxonomy has no categories
    Empty,

    /// Category name declared more than once
    DuplicateCategory { name: String },

    /// Composite refers to an unknown primary
    UnknownComponent { composite: String, component: String },

    /// Prototype dimension outside [0, 1]
    PrototypeOutOfRange { name: String, value: f32 },

    /// File could not be read or JSON is invalid
    Parse { reason: String },
}

impl ErrorCode for TaxonomyError {
    fn code(&self) -> i32 {
        match self {
            TaxonomyError::Empty => TaxonomyErrorCodes::EMPTY,
            TaxonomyError::DuplicateCategory { .. } => TaxonomyErrorCodes::DUPLICATE_CATEGORY,
            TaxonomyError::UnknownComponent { .. } => TaxonomyErrorCodes::UNKNOWN_COMPONENT,
            TaxonomyError::PrototypeOutOfRange { .. } => {
                TaxonomyErrorCodes::PROTOTYPE_OUT_OF_RANGE
            }
            TaxonomyError::Parse { .. } => TaxonomyErrorCodes::PARSE,
        }
    }

    fn message(&self) -> String {
        match self {
            TaxonomyError::Empty => "No taxonomy available to classify against".to_string(),
            TaxonomyError::DuplicateCategory { name } => {
                format!("Category '{}' is declared more than once", name)
            }
            TaxonomyError::UnknownComponent {
                composite,
                component,
            } => {
                format!(
                    "Composite '{}' refers to unknown primary '{}'",
                    composite, component
                )
            }
            TaxonomyError::PrototypeOutOfRange { name, value } => {
                format!(
                    "Prototype of '{}' has coordinate {} outside [0, 1]",
                    name, value
                )
            }
            TaxonomyError::Parse { reason } => format!("Failed to load taxonomy: {}", reason),
        }
    }
}

impl fmt::Display for TaxonomyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TaxonomyError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for TaxonomyError {}
