use crate::table::column_def::ColumnDef;
use crate::table::{InsertRecord, TableRecord, UpdateRecord};

/// Table schema representation.
///
/// It is used to define the structure of a table held by the
/// [`crate::store::RecordStore`]. Schemas are supplied by the host
/// application at startup and registered on the [`crate::engine::Database`].
pub trait TableSchema
where
    Self: 'static,
{
    /// The [`TableRecord`] type associated with this table schema;
    /// which is the data returned by a query.
    type Record: TableRecord<Schema = Self>;
    /// The [`InsertRecord`] type associated with this table schema.
    type Insert: InsertRecord<Schema = Self>;
    /// The [`UpdateRecord`] type associated with this table schema.
    type Update: UpdateRecord<Schema = Self>;

    /// Returns the name of the table.
    fn table_name() -> &'static str;

    /// Returns the column definitions of the table.
    ///
    /// The surrogate key column must be part of the list; its value is
    /// assigned by the store at insert time.
    fn columns() -> &'static [ColumnDef];

    /// Returns the name of the primary key column.
    fn primary_key() -> &'static str;

    /// Looks up a column definition by name.
    fn column(name: &str) -> Option<ColumnDef> {
        Self::columns().iter().find(|col| col.name == name).copied()
    }
}
