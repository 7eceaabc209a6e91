//! # relq
//!
//! A tiny embeddable relational query evaluator over in-memory tables.
//!
//! Tables are described by types implementing [`table::TableSchema`] and
//! registered on a [`engine::Database`], which owns the record store and
//! assigns surrogate keys on insert. On top of that the crate provides:
//!
//! - typed queries with filters, multi-key sorting and pagination, built
//!   through [`query::QueryBuilder`];
//! - dynamic predicates assembled from optional components, which are
//!   silently dropped when absent;
//! - inner and left outer joins, both along declared foreign keys and as
//!   unrelated theta joins, through [`join::JoinQuery`];
//! - grouping and aggregation over flat rows with [`aggregate::Aggregator`];
//! - shaping flat rows into user-defined structs, by field name or
//!   positionally, with optional up-front projection checking
//!   ([`shape::CheckedProjection`]);
//! - bulk updates and deletes applied directly against the store, while
//!   previously fetched result sets keep their snapshot values.
//!
//! The `example` crate in this workspace walks through the whole surface
//! with a two-table schema.

pub mod aggregate;
pub mod engine;
pub mod join;
pub mod prelude;
pub mod query;
pub mod row;
pub mod shape;
pub mod store;
pub mod table;
#[cfg(test)]
pub(crate) mod tests;
pub mod types;
pub mod value;

use thiserror::Error;

/// The result type for database operations.
pub type RelqResult<T> = Result<T, RelqError>;

/// An enum representing all the errors a database operation can surface.
#[derive(Debug, Error)]
pub enum RelqError {
    /// An error occurred in the record store.
    #[error("store error: {0}")]
    Store(#[from] store::StoreError),

    /// An error occurred evaluating a query.
    #[error("query error: {0}")]
    Query(#[from] query::QueryError),

    /// An error occurred shaping results.
    #[error("shape error: {0}")]
    Shape(#[from] shape::ShapeError),
}
