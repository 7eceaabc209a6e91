use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of data a column can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataTypeKind {
    Boolean,
    Decimal,
    Int64,
    Text,
    Uint64,
}

impl fmt::Display for DataTypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataTypeKind::Boolean => "Boolean",
            DataTypeKind::Decimal => "Decimal",
            DataTypeKind::Int64 => "Int64",
            DataTypeKind::Text => "Text",
            DataTypeKind::Uint64 => "Uint64",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_should_display_data_type_kind() {
        assert_eq!(DataTypeKind::Int64.to_string(), "Int64");
        assert_eq!(DataTypeKind::Text.to_string(), "Text");
    }
}
