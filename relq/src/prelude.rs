//! Re-exports of the types needed to define schemas and run queries.

pub use crate::aggregate::{Aggregate, AggregateFunc, Aggregator};
pub use crate::engine::Database;
pub use crate::join::{JoinKind, JoinOn, JoinQuery};
pub use crate::query::{
    Filter, OrderDirection, Query, QueryBuilder, QueryError, QueryResult, Select,
};
pub use crate::row::{Row, SelectExpr, Selection};
pub use crate::shape::{
    shape_by_constructor, shape_by_fields, CheckedProjection, FieldShaped, PositionalShaped,
    ShapeError, ShapeSchema,
};
pub use crate::store::{RecordId, StoreError, StoreResult};
pub use crate::table::{
    Assignment, ColumnDef, ForeignKeyDef, InsertRecord, TableRecord, TableSchema, UpdateRecord,
};
pub use crate::types::DataTypeKind;
pub use crate::value::Value;
pub use crate::{RelqError, RelqResult};
