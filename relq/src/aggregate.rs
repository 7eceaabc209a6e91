//! Grouping and aggregation over flat result rows.
//!
//! The [`Aggregator`] consumes the [`Row`]s produced by a select or a join
//! and reduces them into one output row per group. NULL values never
//! contribute to an aggregate; a column aggregate over zero non-NULL inputs
//! yields NULL, while `count` yields zero.

use rust_decimal::Decimal;

use crate::query::{QueryError, QueryResult};
use crate::row::Row;
use crate::value::Value;

/// The supported aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunc {
    Count,
    Sum,
    Avg,
    Max,
    Min,
}

impl AggregateFunc {
    fn name(&self) -> &'static str {
        match self {
            AggregateFunc::Count => "count",
            AggregateFunc::Sum => "sum",
            AggregateFunc::Avg => "avg",
            AggregateFunc::Max => "max",
            AggregateFunc::Min => "min",
        }
    }
}

/// One aggregate expression: a function over an input column, optionally
/// renamed and, for averages, optionally rounded for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
    func: AggregateFunc,
    column: Option<&'static str>,
    alias: Option<&'static str>,
    round_dp: Option<u32>,
}

impl Aggregate {
    /// Counts the rows of the group.
    pub fn count() -> Self {
        Self {
            func: AggregateFunc::Count,
            column: None,
            alias: None,
            round_dp: None,
        }
    }

    /// Sums the non-NULL values of a column.
    pub fn sum(column: &'static str) -> Self {
        Self::over(AggregateFunc::Sum, column)
    }

    /// Averages the non-NULL values of a column, as an exact decimal.
    pub fn avg(column: &'static str) -> Self {
        Self::over(AggregateFunc::Avg, column)
    }

    /// The greatest non-NULL value of a column.
    pub fn max(column: &'static str) -> Self {
        Self::over(AggregateFunc::Max, column)
    }

    /// The smallest non-NULL value of a column.
    pub fn min(column: &'static str) -> Self {
        Self::over(AggregateFunc::Min, column)
    }

    fn over(func: AggregateFunc, column: &'static str) -> Self {
        Self {
            func,
            column: Some(column),
            alias: None,
            round_dp: None,
        }
    }

    /// Renames the output column.
    pub fn alias(mut self, alias: &'static str) -> Self {
        self.alias = Some(alias);
        self
    }

    /// Rounds an average to the given number of decimal places. Without it
    /// the average keeps its full exact precision.
    pub fn round_dp(mut self, dp: u32) -> Self {
        self.round_dp = Some(dp);
        self
    }

    /// The name this aggregate contributes to the output row.
    pub fn output_name(&self) -> String {
        if let Some(alias) = self.alias {
            return alias.to_string();
        }
        match self.column {
            Some(column) => format!("{}({column})", self.func.name()),
            None => self.func.name().to_string(),
        }
    }

    fn compute(&self, rows: &[&Row]) -> QueryResult<Value> {
        let Some(column) = self.column else {
            return Ok(Value::Uint64(rows.len() as u64));
        };

        let mut values = Vec::with_capacity(rows.len());
        for row in rows {
            let value = row
                .get_named(column)
                .ok_or_else(|| QueryError::UnknownColumn(column.to_string()))?;
            if !value.is_null() {
                values.push(value);
            }
        }
        if values.is_empty() {
            return Ok(Value::Null);
        }
        for value in &values[1..] {
            if value.kind() != values[0].kind() {
                return Err(QueryError::TypeMismatch {
                    column,
                    expected: values[0].type_name(),
                    found: value.type_name(),
                });
            }
        }

        match self.func {
            AggregateFunc::Count => Ok(Value::Uint64(values.len() as u64)),
            AggregateFunc::Max => Ok(values.iter().max().map_or(Value::Null, |v| (*v).clone())),
            AggregateFunc::Min => Ok(values.iter().min().map_or(Value::Null, |v| (*v).clone())),
            AggregateFunc::Sum => sum(column, &values),
            AggregateFunc::Avg => {
                let total = decimal_sum(column, &values)?;
                let count = Decimal::from(values.len() as u64);
                let mean = total
                    .checked_div(count)
                    .ok_or_else(|| overflow(column, "avg"))?;
                Ok(Value::Decimal(match self.round_dp {
                    Some(dp) => mean.round_dp(dp),
                    None => mean,
                }))
            }
        }
    }
}

/// Sums values in the kind of their column, with checked arithmetic.
fn sum(column: &'static str, values: &[&Value]) -> QueryResult<Value> {
    match values[0] {
        Value::Int64(_) => {
            let mut total = 0i64;
            for value in values {
                if let Value::Int64(v) = value {
                    total = total.checked_add(*v).ok_or_else(|| overflow(column, "sum"))?;
                }
            }
            Ok(Value::Int64(total))
        }
        Value::Uint64(_) => {
            let mut total = 0u64;
            for value in values {
                if let Value::Uint64(v) = value {
                    total = total.checked_add(*v).ok_or_else(|| overflow(column, "sum"))?;
                }
            }
            Ok(Value::Uint64(total))
        }
        Value::Decimal(_) => decimal_sum(column, values).map(Value::Decimal),
        other => Err(QueryError::InvalidQuery(format!(
            "cannot sum values of type {} on column '{column}'",
            other.type_name()
        ))),
    }
}

/// Sums values as exact decimals, for averages and decimal columns.
fn decimal_sum(column: &'static str, values: &[&Value]) -> QueryResult<Decimal> {
    let mut total = Decimal::ZERO;
    for value in values {
        let addend = match value {
            Value::Int64(v) => Decimal::from(*v),
            Value::Uint64(v) => Decimal::from(*v),
            Value::Decimal(v) => *v,
            other => {
                return Err(QueryError::InvalidQuery(format!(
                    "cannot average values of type {} on column '{column}'",
                    other.type_name()
                )));
            }
        };
        total = total
            .checked_add(addend)
            .ok_or_else(|| overflow(column, "sum"))?;
    }
    Ok(total)
}

fn overflow(column: &'static str, func: &str) -> QueryError {
    QueryError::InvalidQuery(format!(
        "numeric overflow computing {func} over column '{column}'"
    ))
}

/// Groups rows by key columns and reduces each group with a list of
/// aggregates.
#[derive(Debug, Clone)]
pub struct Aggregator {
    group_by: Vec<&'static str>,
    aggregates: Vec<Aggregate>,
}

impl Aggregator {
    pub fn new(
        group_by: impl IntoIterator<Item = &'static str>,
        aggregates: impl IntoIterator<Item = Aggregate>,
    ) -> Self {
        Self {
            group_by: group_by.into_iter().collect(),
            aggregates: aggregates.into_iter().collect(),
        }
    }

    /// An aggregator without grouping keys; every input row falls into a
    /// single implicit group, which exists even over zero input rows.
    pub fn totals(aggregates: impl IntoIterator<Item = Aggregate>) -> Self {
        Self::new([], aggregates)
    }

    /// Reduces rows into one output row per group.
    ///
    /// Groups appear in first-occurrence order of their key. NULL is a
    /// groupable key value and forms its own group.
    pub fn apply(&self, rows: &[Row]) -> QueryResult<Vec<Row>> {
        let mut groups: Vec<(Vec<Value>, Vec<&Row>)> = Vec::new();

        if self.group_by.is_empty() {
            groups.push((Vec::new(), rows.iter().collect()));
        } else {
            for row in rows {
                let mut key = Vec::with_capacity(self.group_by.len());
                for column in &self.group_by {
                    let value = row
                        .get_named(column)
                        .ok_or_else(|| QueryError::UnknownColumn(column.to_string()))?;
                    key.push(value.clone());
                }
                match groups.iter_mut().find(|(k, _)| *k == key) {
                    Some((_, members)) => members.push(row),
                    None => groups.push((key, vec![row])),
                }
            }
        }

        let mut output = Vec::with_capacity(groups.len());
        for (key, members) in groups {
            let mut row = Vec::with_capacity(self.group_by.len() + self.aggregates.len());
            for (column, value) in self.group_by.iter().zip(key) {
                row.push((column.to_string(), value));
            }
            for aggregate in &self.aggregates {
                row.push((aggregate.output_name(), aggregate.compute(&members)?));
            }
            output.push(Row::new(row));
        }
        Ok(output)
    }
}
