//! FILENAME: cube-engine/src/schema.rs
//! Cube Schema - The serializable declaration of a cube.
//!
//! Describes what a cube IS before any data arrives: its dimension names
//! (the group-by axes) and field names (the measures), both ordered.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use crate::error::SchemaError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CubeSchema {
    #[serde(default)]
    pub dimensions: Vec<String>,

    #[serde(default)]
    pub fields: Vec<String>,
}

impl CubeSchema {
    pub fn new<D, F>(dimensions: D, fields: F) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        CubeSchema {
            dimensions: dimensions.into_iter().map(Into::into).collect(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Total column count of a matching ingestion header.
    pub fn width(&self) -> usize {
        self.dimensions.len() + self.fields.len()
    }

    /// Checks that names are unique within and across both lists.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if let Some(name) = first_duplicate(&self.dimensions) {
            return Err(SchemaError::DuplicateDimension(name.to_string()));
        }
        if let Some(name) = first_duplicate(&self.fields) {
            return Err(SchemaError::DuplicateField(name.to_string()));
        }
        if let Some(name) = self.fields.iter().find(|f| self.dimensions.contains(f)) {
            return Err(SchemaError::Overlap(name.clone()));
        }
        Ok(())
    }
}

/// Returns the first name that appears a second time.
pub(crate) fn first_duplicate(names: &[String]) -> Option<&str> {
    let mut seen = FxHashSet::default();
    names
        .iter()
        .find(|name| !seen.insert(name.as_str()))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_schema() {
        let schema = CubeSchema::new(["city", "year"], ["total"]);
        assert_eq!(schema.width(), 3);
        assert_eq!(schema.validate(), Ok(()));
    }

    #[test]
    fn test_duplicate_dimension() {
        let schema = CubeSchema::new(["city", "year", "city"], ["total"]);
        assert_eq!(
            schema.validate(),
            Err(SchemaError::DuplicateDimension("city".to_string()))
        );
    }

    #[test]
    fn test_duplicate_field() {
        let schema = CubeSchema::new(["city"], ["total", "total"]);
        assert_eq!(
            schema.validate(),
            Err(SchemaError::DuplicateField("total".to_string()))
        );
    }

    #[test]
    fn test_overlap() {
        let schema = CubeSchema::new(["city", "total"], ["total"]);
        assert_eq!(schema.validate(), Err(SchemaError::Overlap("total".to_string())));
    }

    #[test]
    fn test_deserialize_missing_lists() {
        let schema: CubeSchema = serde_json::from_str(r#"{"dimensions": ["city"]}"#).unwrap();
        assert_eq!(schema.dimensions, vec!["city".to_string()]);
        assert!(schema.fields.is_empty());
    }
}
