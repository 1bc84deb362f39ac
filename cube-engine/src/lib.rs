//! FILENAME: cube-engine/src/lib.rs
//! In-memory OLAP cube engine.
//!
//! The whole dataset lives in memory and every operation is a synchronous
//! call. Derived cubes are independent copies of their parent.
//!
//! Layers:
//! - `value`: Scalar values and their hashable key form
//! - `schema`: Serializable declaration (what the cube IS)
//! - `cube`: Storage and the slice / dice / roll-up / drill-down operators
//! - `aggregate`: Aggregator strategy and element-wise built-ins
//! - `error`: Ingestion, query and validity errors

pub mod value;
pub mod schema;
pub mod cube;
pub mod aggregate;
pub mod error;

pub use value::{OrderedFloat, Value, ValueKey};
pub use schema::CubeSchema;
pub use cube::{Cube, DataRow, Point};
pub use aggregate::{AggregationType, Aggregator};
pub use error::{IngestError, QueryError, SchemaError, ValidityError};
