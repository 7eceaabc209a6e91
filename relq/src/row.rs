//! Flat result rows: position- and name-addressable bags of selected values.

use crate::value::Value;

/// A single selected expression: a column, optionally renamed.
///
/// The alias overrides the output name used for addressing the value in a
/// [`Row`] and for matching target fields during shaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectExpr {
    pub column: &'static str,
    pub alias: Option<&'static str>,
}

impl SelectExpr {
    /// Selects a column under its own name.
    pub fn col(column: &'static str) -> Self {
        Self {
            column,
            alias: None,
        }
    }

    /// Renames the selected expression.
    pub fn alias(mut self, alias: &'static str) -> Self {
        self.alias = Some(alias);
        self
    }

    /// The name this expression contributes to the output row.
    pub fn output_name(&self) -> &'static str {
        self.alias.unwrap_or(self.column)
    }
}

/// An ordered list of selected expressions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    exprs: Vec<SelectExpr>,
}

impl Selection {
    pub fn new(exprs: Vec<SelectExpr>) -> Self {
        Self { exprs }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectExpr> {
        self.exprs.iter()
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }
}

impl<const N: usize> From<[SelectExpr; N]> for Selection {
    fn from(exprs: [SelectExpr; N]) -> Self {
        Self::new(exprs.to_vec())
    }
}

impl From<Vec<SelectExpr>> for Selection {
    fn from(exprs: Vec<SelectExpr>) -> Self {
        Self::new(exprs)
    }
}

/// A flat tuple of named values, preserving selection order.
///
/// Values are addressable both by position and by output name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    values: Vec<(String, Value)>,
}

impl Row {
    pub fn new(values: Vec<(String, Value)>) -> Self {
        Self { values }
    }

    /// Gets a value by position.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index).map(|(_, value)| value)
    }

    /// Gets a value by output name.
    pub fn get_named(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    /// The output names, in selection order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    /// The values, in selection order, discarding names.
    pub fn into_values(self) -> Vec<Value> {
        self.values.into_iter().map(|(_, value)| value).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Value)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
