//! Destination schema resolution
//!
//! Maps an entity type to the live column layout of its destination table.
//!
//! # Overview
//!
//! - `ValueKind` - Closed set of coercion targets, resolved from type names
//! - `ColumnSchema` - Ordered columns of one table
//! - `SchemaResolver` - Looks schemas up through a [`Destination`](crate::database::Destination),
//!   caching them per file or per run

mod resolver;
mod types;

pub use resolver::SchemaResolver;
pub use types::{ColumnDef, ColumnSchema, NumericBounds, ValueKind};
