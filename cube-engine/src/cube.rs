//! FILENAME: cube-engine/src/cube.rs
//! Cube - Columnar observations and the OLAP operators over them.
//!
//! A cube is two parallel sequences: `points` (coordinates, one value per
//! dimension) and `data` (measures, one value per field). Index `i` of each
//! describes the same observation.
//!
//! Operators never touch the receiver; each returns a fresh cube:
//! - `slice`: fix one dimension to a value and drop it from the schema
//! - `dice`: keep observations matching a predicate, schema unchanged
//! - `roll_up`: group by a dimension subset and fold the measures
//! - `drill_down`: slice, then roll up along another dimension
//!
//! Only `add_rows` mutates, and it only appends.

use std::collections::hash_map::Entry;
use log::{debug, trace, warn};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use crate::aggregate::{AggregationType, Aggregator};
use crate::error::{IngestError, QueryError, SchemaError, ValidityError};
use crate::schema::{first_duplicate, CubeSchema};
use crate::value::{Value, ValueKey};

/// One observation's coordinates, in `Cube::dimensions` order.
pub type Point = Vec<Value>;

/// One observation's measures, in `Cube::fields` order.
pub type DataRow = Vec<Value>;

// ============================================================================
// GROUP KEY
// ============================================================================

/// Structural key of a roll-up group: the typed coordinate tuple.
/// Most roll-ups group by a handful of dimensions, so keys stay inline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey {
    values: SmallVec<[ValueKey; 4]>,
}

impl GroupKey {
    fn from_point(point: &[Value]) -> Self {
        GroupKey {
            values: point.iter().map(ValueKey::from).collect(),
        }
    }
}

// ============================================================================
// CUBE
// ============================================================================

/// An in-memory OLAP cube.
///
/// Invariants (checked by `is_valid`, never enforced on mutation):
/// - `points.len() == data.len()`
/// - every point has `dimensions.len()` values
/// - every data row has `fields.len()` values
/// - no duplicate names in `dimensions` or in `fields`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cube {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<Point>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<DataRow>,
}

impl Cube {
    /// Creates an empty cube. Names are not checked; see `from_schema`.
    pub fn new<D, F>(dimensions: D, fields: F) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        Cube {
            dimensions: dimensions.into_iter().map(Into::into).collect(),
            points: Vec::new(),
            fields: fields.into_iter().map(Into::into).collect(),
            data: Vec::new(),
        }
    }

    /// Creates an empty cube from a validated schema.
    pub fn from_schema(schema: CubeSchema) -> Result<Self, SchemaError> {
        schema.validate()?;
        Ok(Cube {
            dimensions: schema.dimensions,
            points: Vec::new(),
            fields: schema.fields,
            data: Vec::new(),
        })
    }

    pub fn schema(&self) -> CubeSchema {
        CubeSchema {
            dimensions: self.dimensions.clone(),
            fields: self.fields.clone(),
        }
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Position of a dimension. When a name occurs more than once the last
    /// occurrence wins.
    pub fn dimension_index(&self, name: &str) -> Option<usize> {
        self.dimensions.iter().rposition(|d| d == name)
    }

    fn resolve(&self, name: &str) -> Result<usize, QueryError> {
        self.dimension_index(name).ok_or_else(|| {
            warn!("dimension '{}' not in {:?}", name, self.dimensions);
            QueryError::UnknownDimension(name.to_string())
        })
    }

    // ------------------------------------------------------------------------
    // Ingestion
    // ------------------------------------------------------------------------

    /// Appends one observation per row.
    ///
    /// `header` names every dimension and field exactly once, in any order;
    /// each row is aligned to `header`. Nothing is appended unless the whole
    /// batch is well-formed. Value types are not checked.
    pub fn add_rows<S, R>(&mut self, header: &[S], rows: &[R]) -> Result<(), IngestError>
    where
        S: AsRef<str>,
        R: AsRef<[Value]>,
    {
        let expected = self.dimensions.len() + self.fields.len();
        if header.len() != expected {
            return Err(IngestError::SchemaMismatch {
                expected,
                actual: header.len(),
            });
        }

        let dim_indexes = column_indexes(header, &self.dimensions)?;
        let field_indexes = column_indexes(header, &self.fields)?;

        for (row, values) in rows.iter().enumerate() {
            let values: &[Value] = values.as_ref();
            if values.len() != header.len() {
                return Err(IngestError::RowWidth {
                    row,
                    expected: header.len(),
                    actual: values.len(),
                });
            }
        }

        self.points.reserve(rows.len());
        self.data.reserve(rows.len());
        for values in rows {
            let values: &[Value] = values.as_ref();
            self.points.push(project(values, &dim_indexes));
            self.data.push(project(values, &field_indexes));
        }

        debug!("add_rows: appended {} rows, cube now holds {}", rows.len(), self.len());
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Operators
    // ------------------------------------------------------------------------

    /// Keeps the observations whose `dimension` equals `value` and removes
    /// that dimension from the output schema.
    pub fn slice(&self, dimension: &str, value: impl Into<Value>) -> Result<Cube, QueryError> {
        let index = self.resolve(dimension)?;
        let value = value.into();

        let mut cube = Cube {
            dimensions: remove_at(&self.dimensions, index),
            points: Vec::new(),
            fields: self.fields.clone(),
            data: Vec::new(),
        };

        for (point, row) in self.points.iter().zip(&self.data) {
            if point.get(index) == Some(&value) {
                cube.points.push(remove_at(point, index));
                cube.data.push(row.clone());
            }
        }

        debug!(
            "slice {}={}: {} of {} observations",
            dimension,
            value,
            cube.len(),
            self.len()
        );
        Ok(cube)
    }

    /// Keeps the observations at every index where `selector` holds, in
    /// original order. Dimensions and fields are unchanged.
    pub fn dice<F>(&self, selector: F) -> Cube
    where
        F: Fn(&Cube, usize) -> bool,
    {
        let mut cube = Cube {
            dimensions: self.dimensions.clone(),
            points: Vec::new(),
            fields: self.fields.clone(),
            data: Vec::new(),
        };

        for (i, (point, row)) in self.points.iter().zip(&self.data).enumerate() {
            if selector(self, i) {
                cube.points.push(point.clone());
                cube.data.push(row.clone());
            }
        }

        debug!("dice: {} of {} observations", cube.len(), self.len());
        cube
    }

    /// Groups observations by their values on `dimensions` and folds each
    /// group's data rows with `aggregator`, starting from `initial_value`.
    ///
    /// Output dimensions are `dimensions` in the given order; output fields
    /// are `fields`. Groups appear in the order they are first seen.
    ///
    /// Ex: `cube.roll_up(&["year"], &["flights"], AggregationType::Sum, &[Value::Integer(0)])`
    pub fn roll_up<S, T, A>(
        &self,
        dimensions: &[S],
        fields: &[T],
        aggregator: A,
        initial_value: &[Value],
    ) -> Result<Cube, QueryError>
    where
        S: AsRef<str>,
        T: AsRef<str>,
        A: Aggregator,
    {
        let dim_indexes = dimensions
            .iter()
            .map(|d| self.resolve(d.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut cube = Cube {
            dimensions: dimensions.iter().map(|d| d.as_ref().to_string()).collect(),
            points: Vec::new(),
            fields: fields.iter().map(|f| f.as_ref().to_string()).collect(),
            data: Vec::new(),
        };

        let mut groups: FxHashMap<GroupKey, usize> = FxHashMap::default();

        for (point, row) in self.points.iter().zip(&self.data) {
            let coordinates: Point = dim_indexes
                .iter()
                .map(|&i| point.get(i).cloned().unwrap_or_default())
                .collect();

            let slot = match groups.entry(GroupKey::from_point(&coordinates)) {
                Entry::Occupied(entry) => *entry.get(),
                Entry::Vacant(entry) => {
                    let slot = cube.points.len();
                    trace!("roll_up: new group {} {:?}", slot, coordinates);
                    entry.insert(slot);
                    cube.points.push(coordinates);
                    cube.data.push(initial_value.to_vec());
                    slot
                }
            };

            let accumulator = std::mem::take(&mut cube.data[slot]);
            cube.data[slot] = aggregator.fold(accumulator, row);
        }

        debug!(
            "roll_up by {:?}: {} observations into {} groups",
            cube.dimensions,
            self.len(),
            cube.len()
        );
        Ok(cube)
    }

    /// Slices `dimension` at `pointer`, then sums every field of this cube
    /// grouped by `target`.
    pub fn drill_down(
        &self,
        dimension: &str,
        pointer: impl Into<Value>,
        target: &str,
    ) -> Result<Cube, QueryError> {
        let initial_value = AggregationType::Sum.initial_value(self.fields.len());
        self.drill_down_with(dimension, pointer, target, AggregationType::Sum, &initial_value)
    }

    /// `drill_down` with an explicit aggregator.
    pub fn drill_down_with<A: Aggregator>(
        &self,
        dimension: &str,
        pointer: impl Into<Value>,
        target: &str,
        aggregator: A,
        initial_value: &[Value],
    ) -> Result<Cube, QueryError> {
        let sliced = self.slice(dimension, pointer)?;
        sliced.roll_up(&[target], &self.fields, aggregator, initial_value)
    }

    // ------------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------------

    /// Column names for `rows`: dimensions first, then fields.
    pub fn headers(&self) -> Vec<String> {
        self.dimensions
            .iter()
            .chain(&self.fields)
            .cloned()
            .collect()
    }

    /// The cube as rows, each `point ++ data` in `headers` order.
    pub fn rows(&self) -> Vec<Vec<Value>> {
        self.points
            .iter()
            .zip(&self.data)
            .map(|(point, row)| point.iter().chain(row).cloned().collect())
            .collect()
    }

    /// Reports the first structural violation. A cube without data rows is
    /// always valid.
    pub fn is_valid(&self) -> Result<(), ValidityError> {
        if self.data.is_empty() {
            return Ok(());
        }

        for (index, point) in self.points.iter().enumerate() {
            if point.len() != self.dimensions.len() {
                return Err(ValidityError::InvalidPoint {
                    index,
                    expected: self.dimensions.len(),
                    actual: point.len(),
                });
            }
        }

        for (index, row) in self.data.iter().enumerate() {
            if row.len() != self.fields.len() {
                return Err(ValidityError::InvalidDataRow {
                    index,
                    expected: self.fields.len(),
                    actual: row.len(),
                });
            }
        }

        if self.points.len() != self.data.len() {
            return Err(ValidityError::OrphanRows {
                points: self.points.len(),
                data: self.data.len(),
            });
        }

        if let Some(name) = first_duplicate(&self.dimensions) {
            return Err(ValidityError::DuplicateDimension(name.to_string()));
        }
        if let Some(name) = first_duplicate(&self.fields) {
            return Err(ValidityError::DuplicateField(name.to_string()));
        }

        Ok(())
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Header position of each name, first match in `header`.
fn column_indexes<S: AsRef<str>>(header: &[S], names: &[String]) -> Result<Vec<usize>, IngestError> {
    names
        .iter()
        .map(|name| {
            header
                .iter()
                .position(|h| h.as_ref() == name)
                .ok_or_else(|| IngestError::UnknownColumn(name.clone()))
        })
        .collect()
}

fn project(values: &[Value], indexes: &[usize]) -> Vec<Value> {
    indexes.iter().map(|&i| values[i].clone()).collect()
}

fn remove_at<T: Clone>(items: &[T], index: usize) -> Vec<T> {
    let mut out = Vec::with_capacity(items.len().saturating_sub(1));
    out.extend_from_slice(&items[..index]);
    out.extend_from_slice(&items[index + 1..]);
    out
}
