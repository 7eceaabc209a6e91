//! Shaping flat result rows into user-defined target structs.
//!
//! Two strategies are supported. Field shaping matches row values to target
//! fields by output name, so aliases in the selection drive the mapping.
//! Constructor shaping is positional: values feed the target's constructor
//! in selection order. [`CheckedProjection`] validates a selection against a
//! target's declared parameter list up front, before any row is fetched.

use std::marker::PhantomData;

use thiserror::Error;

use crate::row::{Row, Selection};
use crate::table::TableSchema;
use crate::types::DataTypeKind;
use crate::value::Value;

/// An enum representing possible errors that can occur while shaping rows.
#[derive(Debug, Error)]
pub enum ShapeError {
    /// A row carries an output name the target has no field for.
    #[error("target '{target}' has no field named '{field}'")]
    UnknownField { target: &'static str, field: String },

    /// A row's width does not match the target constructor's arity.
    #[error("target '{target}' takes {expected} values, row has {found}")]
    Arity {
        target: &'static str,
        expected: usize,
        found: usize,
    },

    /// A value's kind does not match the target field at that position.
    #[error("target '{target}' position {index}: expected {expected}, found {found}")]
    TypeMismatch {
        target: &'static str,
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    /// The selection does not satisfy the target's declared parameters.
    #[error("invalid projection for target '{target}': {reason}")]
    Projection {
        target: &'static str,
        reason: String,
    },

    /// The selection names a column the source table does not declare.
    #[error("unknown column: {0}")]
    UnknownColumn(String),
}

/// A target shaped by matching row output names to its fields.
pub trait FieldShaped: Default {
    /// The target's name, used in error messages.
    fn target_name() -> &'static str;

    /// Assigns one named value to the matching field.
    fn assign(&mut self, field: &str, value: Value) -> Result<(), ShapeError>;
}

/// Shapes rows into targets by output name.
///
/// Every value of every row must find a field; an unmatched name fails the
/// whole batch.
pub fn shape_by_fields<T>(rows: impl IntoIterator<Item = Row>) -> Result<Vec<T>, ShapeError>
where
    T: FieldShaped,
{
    rows.into_iter()
        .map(|row| {
            let mut target = T::default();
            for (name, value) in row {
                target.assign(&name, value)?;
            }
            Ok(target)
        })
        .collect()
}

/// A target shaped positionally through a constructor.
pub trait PositionalShaped: Sized {
    /// The target's name, used in error messages.
    fn target_name() -> &'static str;

    /// Constructs the target from values in selection order.
    fn from_positional(values: Vec<Value>) -> Result<Self, ShapeError>;
}

/// Shapes rows into targets positionally, in selection order.
pub fn shape_by_constructor<T>(rows: impl IntoIterator<Item = Row>) -> Result<Vec<T>, ShapeError>
where
    T: PositionalShaped,
{
    rows.into_iter()
        .map(|row| T::from_positional(row.into_values()))
        .collect()
}

/// A positionally shaped target that also declares its parameter names and
/// kinds, enabling projection checking before execution.
pub trait ShapeSchema: PositionalShaped {
    /// Constructor parameters, in positional order.
    const PARAMS: &'static [(&'static str, DataTypeKind)];
}

/// A selection validated against a target's parameter list at construction
/// time.
///
/// Building the projection fails when the selection's arity, output names or
/// column kinds do not line up with [`ShapeSchema::PARAMS`], so a mismatched
/// projection is rejected before any row is fetched rather than while
/// shaping results.
#[derive(Debug, Clone)]
pub struct CheckedProjection<T>
where
    T: ShapeSchema,
{
    selection: Selection,
    _marker: PhantomData<T>,
}

impl<T> CheckedProjection<T>
where
    T: ShapeSchema,
{
    /// Validates the selection against the target, resolving columns through
    /// the source table's schema.
    pub fn for_table<S>(selection: Selection) -> Result<Self, ShapeError>
    where
        S: TableSchema,
    {
        if selection.len() != T::PARAMS.len() {
            return Err(ShapeError::Projection {
                target: T::target_name(),
                reason: format!(
                    "takes {} parameters, selection has {}",
                    T::PARAMS.len(),
                    selection.len()
                ),
            });
        }

        for (index, (expr, (param_name, param_kind))) in
            selection.iter().zip(T::PARAMS).enumerate()
        {
            let column = S::column(expr.column)
                .ok_or_else(|| ShapeError::UnknownColumn(expr.column.to_string()))?;
            if expr.output_name() != *param_name {
                return Err(ShapeError::Projection {
                    target: T::target_name(),
                    reason: format!(
                        "position {index} selects '{}', parameter is '{param_name}'",
                        expr.output_name()
                    ),
                });
            }
            if column.data_type != *param_kind {
                return Err(ShapeError::Projection {
                    target: T::target_name(),
                    reason: format!(
                        "position {index} is {}, parameter '{param_name}' is {param_kind}",
                        column.data_type
                    ),
                });
            }
        }

        Ok(Self {
            selection,
            _marker: PhantomData,
        })
    }

    /// The validated selection, to run the query with.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Shapes rows fetched with [`CheckedProjection::selection`].
    pub fn shape(&self, rows: impl IntoIterator<Item = Row>) -> Result<Vec<T>, ShapeError> {
        shape_by_constructor(rows)
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::row::SelectExpr;
    use crate::tests::{Member, MemberDto, UserDto};

    fn member_row() -> Row {
        Row::new(vec![
            ("username".to_string(), Value::from("member1")),
            ("age".to_string(), Value::Int64(10)),
        ])
    }

    #[test]
    fn test_should_shape_by_fields() {
        let dtos: Vec<MemberDto> =
            shape_by_fields(vec![member_row()]).expect("failed to shape");
        assert_eq!(dtos.len(), 1);
        assert_eq!(dtos[0].username.as_deref(), Some("member1"));
        assert_eq!(dtos[0].age, Some(10));
    }

    #[test]
    fn test_should_fail_field_shaping_on_unknown_name() {
        let row = Row::new(vec![("nickname".to_string(), Value::from("m"))]);
        let result: Result<Vec<MemberDto>, _> = shape_by_fields(vec![row]);
        assert!(matches!(result, Err(ShapeError::UnknownField { .. })));
    }

    #[test]
    fn test_should_shape_aliased_row_into_renamed_target() {
        // UserDto calls the member's username "name"; the alias bridges them
        let row = Row::new(vec![
            ("name".to_string(), Value::from("member1")),
            ("age".to_string(), Value::Int64(10)),
        ]);
        let dtos: Vec<UserDto> = shape_by_fields(vec![row]).expect("failed to shape");
        assert_eq!(dtos[0].name.as_deref(), Some("member1"));
    }

    #[test]
    fn test_should_shape_by_constructor() {
        let dtos: Vec<MemberDto> =
            shape_by_constructor(vec![member_row()]).expect("failed to shape");
        assert_eq!(dtos[0].username.as_deref(), Some("member1"));
        assert_eq!(dtos[0].age, Some(10));
    }

    #[test]
    fn test_should_fail_constructor_shaping_on_wrong_arity() {
        let row = Row::new(vec![("username".to_string(), Value::from("m"))]);
        let result: Result<Vec<MemberDto>, _> = shape_by_constructor(vec![row]);
        assert!(matches!(
            result,
            Err(ShapeError::Arity {
                expected: 2,
                found: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_should_fail_constructor_shaping_on_swapped_values() {
        // age and username swapped, caught by the kind check at position 0
        let row = Row::new(vec![
            ("age".to_string(), Value::Int64(10)),
            ("username".to_string(), Value::from("member1")),
        ]);
        let result: Result<Vec<MemberDto>, _> = shape_by_constructor(vec![row]);
        assert!(matches!(
            result,
            Err(ShapeError::TypeMismatch { index: 0, .. })
        ));
    }

    #[test]
    fn test_should_accept_valid_checked_projection() {
        let selection = Selection::from([
            SelectExpr::col("username").alias("name"),
            SelectExpr::col("age"),
        ]);
        let projection = CheckedProjection::<UserDto>::for_table::<Member>(selection)
            .expect("projection should validate");

        let row = Row::new(vec![
            ("name".to_string(), Value::from("member1")),
            ("age".to_string(), Value::Int64(10)),
        ]);
        let dtos = projection.shape(vec![row]).expect("failed to shape");
        assert_eq!(dtos[0].name.as_deref(), Some("member1"));
        assert_eq!(dtos[0].age, Some(10));
    }

    #[test]
    fn test_should_reject_projection_with_wrong_arity() {
        let selection = Selection::from([SelectExpr::col("username").alias("name")]);
        let result = CheckedProjection::<UserDto>::for_table::<Member>(selection);
        assert!(matches!(result, Err(ShapeError::Projection { .. })));
    }

    #[test]
    fn test_should_reject_projection_with_unaliased_name() {
        // without the alias the output name stays "username", not "name"
        let selection = Selection::from([SelectExpr::col("username"), SelectExpr::col("age")]);
        let result = CheckedProjection::<UserDto>::for_table::<Member>(selection);
        assert!(matches!(result, Err(ShapeError::Projection { .. })));
    }

    #[test]
    fn test_should_reject_projection_with_unknown_column() {
        let selection = Selection::from([
            SelectExpr::col("nickname").alias("name"),
            SelectExpr::col("age"),
        ]);
        let result = CheckedProjection::<UserDto>::for_table::<Member>(selection);
        assert!(matches!(result, Err(ShapeError::UnknownColumn(_))));
    }

    #[test]
    fn test_should_reject_projection_with_mismatched_kind() {
        let selection = Selection::from([
            SelectExpr::col("age").alias("name"),
            SelectExpr::col("age"),
        ]);
        let result = CheckedProjection::<UserDto>::for_table::<Member>(selection);
        assert!(matches!(result, Err(ShapeError::Projection { .. })));
    }
}
