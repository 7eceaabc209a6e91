//! This module contains types related to table schemas and the records flowing through them.

mod column_def;
mod record;
mod schema;

pub use self::column_def::{ColumnDef, ForeignKeyDef};
pub use self::record::{Assignment, InsertRecord, TableRecord, UpdateRecord};
pub use self::schema::TableSchema;
