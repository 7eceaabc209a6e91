use std::cmp::Ordering;

use like::Like;

use crate::query::{QueryError, QueryResult};
use crate::table::ColumnDef;
use crate::value::Value;

/// [`super::Query`] filters.
///
/// A filter is a pure predicate over a record's column values. Comparisons
/// against NULL are false, never an error, matching SQL three-valued logic
/// collapsed to a boolean.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(&'static str, Value),
    Ne(&'static str, Value),
    Gt(&'static str, Value),
    Lt(&'static str, Value),
    Ge(&'static str, Value),
    Le(&'static str, Value),
    /// Inclusive on both bounds.
    Between(&'static str, Value, Value),
    In(&'static str, Vec<Value>),
    Like(&'static str, Value),
    NotNull(&'static str),
    IsNull(&'static str),
    And(Box<Filter>, Box<Filter>),
    Or(Box<Filter>, Box<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    /// Creates an equality filter.
    pub fn eq(field: &'static str, value: impl Into<Value>) -> Self {
        Filter::Eq(field, value.into())
    }

    /// Creates a not-equal filter.
    pub fn ne(field: &'static str, value: impl Into<Value>) -> Self {
        Filter::Ne(field, value.into())
    }

    /// Creates a greater-than filter.
    pub fn gt(field: &'static str, value: impl Into<Value>) -> Self {
        Filter::Gt(field, value.into())
    }

    /// Creates a less-than filter.
    pub fn lt(field: &'static str, value: impl Into<Value>) -> Self {
        Filter::Lt(field, value.into())
    }

    /// Creates a greater-than-or-equal filter.
    pub fn ge(field: &'static str, value: impl Into<Value>) -> Self {
        Filter::Ge(field, value.into())
    }

    /// Creates a less-than-or-equal filter.
    pub fn le(field: &'static str, value: impl Into<Value>) -> Self {
        Filter::Le(field, value.into())
    }

    /// Creates a range filter, inclusive on both bounds.
    pub fn between(field: &'static str, lo: impl Into<Value>, hi: impl Into<Value>) -> Self {
        Filter::Between(field, lo.into(), hi.into())
    }

    /// Creates a set-membership filter.
    pub fn is_in<I, V>(field: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Filter::In(field, values.into_iter().map(Into::into).collect())
    }

    /// Creates a LIKE filter with SQL `%`/`_` wildcard semantics.
    pub fn like(field: &'static str, pattern: &str) -> Self {
        Filter::Like(field, Value::Text(pattern.to_string()))
    }

    /// Creates a NOT NULL filter.
    pub fn not_null(field: &'static str) -> Self {
        Filter::NotNull(field)
    }

    /// Creates an IS NULL filter.
    pub fn is_null(field: &'static str) -> Self {
        Filter::IsNull(field)
    }

    /// Chain two filters with AND.
    pub fn and(self, other: Filter) -> Self {
        Filter::And(Box::new(self), Box::new(other))
    }

    /// Chain two filters with OR.
    pub fn or(self, other: Filter) -> Self {
        Filter::Or(Box::new(self), Box::new(other))
    }

    /// Negate a filter with NOT.
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Filter::Not(Box::new(self))
    }

    /// Folds optional filter components into a single AND conjunction.
    ///
    /// Absent components are silently dropped, which lets callers assemble
    /// dynamic filters from optional parameters without branching per
    /// combination. When every component is absent the result is [`None`],
    /// meaning "no filter".
    pub fn all<I>(components: I) -> Option<Filter>
    where
        I: IntoIterator<Item = Option<Filter>>,
    {
        components.into_iter().flatten().reduce(Filter::and)
    }

    /// Returns whether the given record values match the filter.
    pub fn matches(&self, record_values: &[(ColumnDef, Value)]) -> QueryResult<bool> {
        match self {
            Filter::Eq(field, value) => {
                Ok(compare(record_values, field, value)? == Some(Ordering::Equal))
            }
            Filter::Ne(field, value) => Ok(matches!(
                compare(record_values, field, value)?,
                Some(Ordering::Less | Ordering::Greater)
            )),
            Filter::Gt(field, value) => {
                Ok(compare(record_values, field, value)? == Some(Ordering::Greater))
            }
            Filter::Lt(field, value) => {
                Ok(compare(record_values, field, value)? == Some(Ordering::Less))
            }
            Filter::Ge(field, value) => Ok(matches!(
                compare(record_values, field, value)?,
                Some(Ordering::Greater | Ordering::Equal)
            )),
            Filter::Le(field, value) => Ok(matches!(
                compare(record_values, field, value)?,
                Some(Ordering::Less | Ordering::Equal)
            )),
            Filter::Between(field, lo, hi) => {
                let ge_lo = matches!(
                    compare(record_values, field, lo)?,
                    Some(Ordering::Greater | Ordering::Equal)
                );
                let le_hi = matches!(
                    compare(record_values, field, hi)?,
                    Some(Ordering::Less | Ordering::Equal)
                );
                Ok(ge_lo && le_hi)
            }
            Filter::In(field, values) => {
                for value in values {
                    if compare(record_values, field, value)? == Some(Ordering::Equal) {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Filter::Like(field, pattern) => like_matches(record_values, field, pattern),
            Filter::NotNull(field) => Ok(!field_value(record_values, field)?.is_null()),
            Filter::IsNull(field) => Ok(field_value(record_values, field)?.is_null()),
            Filter::And(left, right) => {
                Ok(left.matches(record_values)? && right.matches(record_values)?)
            }
            Filter::Or(left, right) => {
                Ok(left.matches(record_values)? || right.matches(record_values)?)
            }
            Filter::Not(inner) => Ok(!inner.matches(record_values)?),
        }
    }
}

/// Looks up the value for a column in a record.
pub(crate) fn field_value<'a>(
    record_values: &'a [(ColumnDef, Value)],
    field: &'static str,
) -> QueryResult<&'a Value> {
    record_values
        .iter()
        .find(|(col_def, _)| col_def.name == field)
        .map(|(_, value)| value)
        .ok_or_else(|| QueryError::UnknownColumn(field.to_string()))
}

/// Compares a record column against an operand.
///
/// Returns [`None`] when either side is NULL; errs when the kinds differ.
fn compare(
    record_values: &[(ColumnDef, Value)],
    field: &'static str,
    operand: &Value,
) -> QueryResult<Option<Ordering>> {
    let value = field_value(record_values, field)?;
    if value.is_null() || operand.is_null() {
        return Ok(None);
    }
    if value.kind() != operand.kind() {
        return Err(QueryError::TypeMismatch {
            column: field,
            expected: value.type_name(),
            found: operand.type_name(),
        });
    }
    Ok(Some(value.cmp(operand)))
}

fn like_matches(
    record_values: &[(ColumnDef, Value)],
    field: &'static str,
    pattern: &Value,
) -> QueryResult<bool> {
    let value = field_value(record_values, field)?;
    let (Value::Text(text), Value::Text(pattern)) = (value, pattern) else {
        if value.is_null() {
            return Ok(false);
        }
        return Err(QueryError::TypeMismatch {
            column: field,
            expected: "Text",
            found: value.type_name(),
        });
    };

    Like::<false>::like(text.as_str(), pattern.as_str())
        .map_err(|err| QueryError::InvalidQuery(format!("bad LIKE pattern '{pattern}': {err}")))
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::table::TableSchema;
    use crate::tests::Member;

    fn member_values(username: Option<&str>, age: i64) -> Vec<(ColumnDef, Value)> {
        Member::columns()
            .iter()
            .copied()
            .zip(vec![
                Value::Uint64(1),
                username.map(str::to_string).into(),
                Value::Int64(age),
                Value::Null,
            ])
            .collect()
    }

    #[test]
    fn test_should_build_filter() {
        let eq = Filter::eq("age", 30i64);
        assert!(matches!(eq, Filter::Eq("age", Value::Int64(30))));

        let between = Filter::between("age", 10i64, 30i64);
        assert!(matches!(
            between,
            Filter::Between("age", Value::Int64(10), Value::Int64(30))
        ));

        let is_in = Filter::is_in("age", [20i64, 30]);
        assert!(matches!(is_in, Filter::In("age", _)));

        let like = Filter::like("username", "member%");
        assert!(matches!(like, Filter::Like("username", Value::Text(_))));

        // chained filters
        let combined = eq.and(between).or(Filter::is_null("username").not());
        if let Filter::Or(left, right) = combined {
            assert!(matches!(*left, Filter::And(_, _)));
            assert!(matches!(*right, Filter::Not(_)));
        } else {
            panic!("Expected combined filter to be an Or filter");
        }
    }

    #[test]
    fn test_should_match_equality() {
        let values = member_values(Some("member1"), 10);
        assert!(
            Filter::eq("username", "member1")
                .matches(&values)
                .expect("failed to match")
        );
        assert!(
            !Filter::eq("username", "member2")
                .matches(&values)
                .expect("failed to match")
        );
    }

    #[test]
    fn test_should_match_between_inclusive() {
        for age in [10, 20, 30] {
            let values = member_values(Some("m"), age);
            assert!(
                Filter::between("age", 10i64, 30i64)
                    .matches(&values)
                    .expect("failed to match"),
                "age {age} should be within [10, 30]"
            );
        }
        for age in [9, 31] {
            let values = member_values(Some("m"), age);
            assert!(
                !Filter::between("age", 10i64, 30i64)
                    .matches(&values)
                    .expect("failed to match"),
                "age {age} should be outside [10, 30]"
            );
        }
    }

    #[test]
    fn test_should_match_in() {
        let values = member_values(Some("m"), 20);
        assert!(
            Filter::is_in("age", [20i64, 30])
                .matches(&values)
                .expect("failed to match")
        );
        assert!(
            !Filter::is_in("age", [40i64, 50])
                .matches(&values)
                .expect("failed to match")
        );
    }

    #[test]
    fn test_should_match_like() {
        let values = member_values(Some("member1"), 10);
        assert!(
            Filter::like("username", "member%")
                .matches(&values)
                .expect("failed to match")
        );
        assert!(
            !Filter::like("username", "team%")
                .matches(&values)
                .expect("failed to match")
        );
    }

    #[test]
    fn test_should_treat_null_comparisons_as_false() {
        let values = member_values(None, 10);
        assert!(
            !Filter::eq("username", "member1")
                .matches(&values)
                .expect("failed to match")
        );
        assert!(
            !Filter::like("username", "%")
                .matches(&values)
                .expect("failed to match")
        );
        assert!(
            Filter::is_null("username")
                .matches(&values)
                .expect("failed to match")
        );
        assert!(
            !Filter::not_null("username")
                .matches(&values)
                .expect("failed to match")
        );
    }

    #[test]
    fn test_should_fail_on_unknown_column() {
        let values = member_values(Some("m"), 10);
        let result = Filter::eq("nickname", "m").matches(&values);
        assert!(matches!(result, Err(QueryError::UnknownColumn(_))));
    }

    #[test]
    fn test_should_fail_on_type_mismatch() {
        let values = member_values(Some("m"), 10);
        let result = Filter::gt("age", "ten").matches(&values);
        assert!(matches!(result, Err(QueryError::TypeMismatch { .. })));
    }

    #[test]
    fn test_should_fold_optional_components() {
        let filter = Filter::all([Some(Filter::eq("username", "member1")), None]);
        assert!(matches!(filter, Some(Filter::Eq("username", _))));

        let filter = Filter::all([
            Some(Filter::eq("username", "member1")),
            Some(Filter::eq("age", 10i64)),
        ]);
        assert!(matches!(filter, Some(Filter::And(_, _))));

        // every component absent means no filter at all
        let filter = Filter::all([None, None]);
        assert!(filter.is_none());
    }
}
