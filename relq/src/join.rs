//! Two-table joins evaluated by nested-loop over the stored rows.
//!
//! A join is either *related*, following the declared foreign key from the
//! left table to the right one, or *unrelated* (a theta join), pairing every
//! left row with every right row and keeping those matching the `on`
//! condition. Both flavours accept an extra `on` condition; for a related
//! left outer join this filters the right side while keeping every left row,
//! which is the classic "join on extra condition" shape.

use std::cmp::Ordering;
use std::marker::PhantomData;

use crate::query::{field_value, Filter, QueryError, QueryResult};
use crate::store::RecordStore;
use crate::table::{ColumnDef, ForeignKeyDef, TableSchema};
use crate::value::Value;
use crate::{RelqError, RelqResult};

/// How unmatched left rows are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Left rows without a matching right row are dropped.
    Inner,
    /// Left rows without a matching right row are kept, with an absent right
    /// side.
    LeftOuter,
}

/// A join condition over a pair of rows.
///
/// Cross-side comparisons name a left column and a right column; the
/// [`JoinOn::Left`] and [`JoinOn::Right`] wrappers apply an ordinary
/// [`Filter`] to one side only. NULL on either side of a comparison makes
/// the condition false, never an error.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinOn {
    Eq(&'static str, &'static str),
    Ne(&'static str, &'static str),
    Gt(&'static str, &'static str),
    Lt(&'static str, &'static str),
    Ge(&'static str, &'static str),
    Le(&'static str, &'static str),
    /// A filter over the left row only.
    Left(Filter),
    /// A filter over the right row only.
    Right(Filter),
    And(Box<JoinOn>, Box<JoinOn>),
    Or(Box<JoinOn>, Box<JoinOn>),
}

impl JoinOn {
    /// Left column equals right column.
    pub fn eq(left: &'static str, right: &'static str) -> Self {
        JoinOn::Eq(left, right)
    }

    /// Left column differs from right column.
    pub fn ne(left: &'static str, right: &'static str) -> Self {
        JoinOn::Ne(left, right)
    }

    /// Left column is greater than right column.
    pub fn gt(left: &'static str, right: &'static str) -> Self {
        JoinOn::Gt(left, right)
    }

    /// Left column is less than right column.
    pub fn lt(left: &'static str, right: &'static str) -> Self {
        JoinOn::Lt(left, right)
    }

    /// Left column is greater than or equal to right column.
    pub fn ge(left: &'static str, right: &'static str) -> Self {
        JoinOn::Ge(left, right)
    }

    /// Left column is less than or equal to right column.
    pub fn le(left: &'static str, right: &'static str) -> Self {
        JoinOn::Le(left, right)
    }

    /// A condition on the left row only.
    pub fn left(filter: Filter) -> Self {
        JoinOn::Left(filter)
    }

    /// A condition on the right row only.
    pub fn right(filter: Filter) -> Self {
        JoinOn::Right(filter)
    }

    /// Chain two conditions with AND.
    pub fn and(self, other: JoinOn) -> Self {
        JoinOn::And(Box::new(self), Box::new(other))
    }

    /// Chain two conditions with OR.
    pub fn or(self, other: JoinOn) -> Self {
        JoinOn::Or(Box::new(self), Box::new(other))
    }

    /// Evaluates the condition against a pair of rows.
    pub fn eval(
        &self,
        left: &[(ColumnDef, Value)],
        right: &[(ColumnDef, Value)],
    ) -> QueryResult<bool> {
        match self {
            JoinOn::Eq(lf, rf) => Ok(cross_compare(left, right, lf, rf)? == Some(Ordering::Equal)),
            JoinOn::Ne(lf, rf) => Ok(matches!(
                cross_compare(left, right, lf, rf)?,
                Some(Ordering::Less | Ordering::Greater)
            )),
            JoinOn::Gt(lf, rf) => {
                Ok(cross_compare(left, right, lf, rf)? == Some(Ordering::Greater))
            }
            JoinOn::Lt(lf, rf) => Ok(cross_compare(left, right, lf, rf)? == Some(Ordering::Less)),
            JoinOn::Ge(lf, rf) => Ok(matches!(
                cross_compare(left, right, lf, rf)?,
                Some(Ordering::Greater | Ordering::Equal)
            )),
            JoinOn::Le(lf, rf) => Ok(matches!(
                cross_compare(left, right, lf, rf)?,
                Some(Ordering::Less | Ordering::Equal)
            )),
            JoinOn::Left(filter) => filter.matches(left),
            JoinOn::Right(filter) => filter.matches(right),
            JoinOn::And(a, b) => Ok(a.eval(left, right)? && b.eval(left, right)?),
            JoinOn::Or(a, b) => Ok(a.eval(left, right)? || b.eval(left, right)?),
        }
    }
}

/// Compares a left-row column against a right-row column.
fn cross_compare(
    left: &[(ColumnDef, Value)],
    right: &[(ColumnDef, Value)],
    left_field: &'static str,
    right_field: &'static str,
) -> QueryResult<Option<Ordering>> {
    let left_value = field_value(left, left_field)?;
    let right_value = field_value(right, right_field)?;
    if left_value.is_null() || right_value.is_null() {
        return Ok(None);
    }
    if left_value.kind() != right_value.kind() {
        return Err(QueryError::TypeMismatch {
            column: left_field,
            expected: left_value.type_name(),
            found: right_value.type_name(),
        });
    }
    Ok(Some(left_value.cmp(right_value)))
}

/// A join between two tables, left table `L` and right table `R`.
#[derive(Debug, Clone)]
pub struct JoinQuery<L, R>
where
    L: TableSchema,
    R: TableSchema,
{
    pub(crate) kind: JoinKind,
    pub(crate) related: bool,
    pub(crate) on: Option<JoinOn>,
    _marker: PhantomData<(L, R)>,
}

impl<L, R> JoinQuery<L, R>
where
    L: TableSchema,
    R: TableSchema,
{
    /// A join following the foreign key declared from `L` to `R`.
    pub fn related(kind: JoinKind) -> Self {
        Self {
            kind,
            related: true,
            on: None,
            _marker: PhantomData,
        }
    }

    /// A theta join pairing every `L` row with every `R` row, constrained
    /// only by `on` conditions.
    pub fn unrelated(kind: JoinKind) -> Self {
        Self {
            kind,
            related: false,
            on: None,
            _marker: PhantomData,
        }
    }

    /// Adds a condition, combining with any existing one using AND.
    pub fn on(mut self, condition: JoinOn) -> Self {
        self.on = match self.on {
            Some(existing) => Some(existing.and(condition)),
            None => Some(condition),
        };
        self
    }

    fn foreign_key(&self) -> RelqResult<Option<ForeignKeyDef>> {
        if !self.related {
            return Ok(None);
        }
        L::columns()
            .iter()
            .find_map(|col| {
                col.foreign_key
                    .filter(|fk| fk.foreign_table == R::table_name())
            })
            .map(Some)
            .ok_or_else(|| {
                RelqError::from(QueryError::InvalidQuery(format!(
                    "no foreign key from table '{}' to table '{}'",
                    L::table_name(),
                    R::table_name()
                )))
            })
    }
}

/// A joined pair of rows, the right side absent when a left outer join found
/// no match.
#[derive(Debug, Clone)]
pub(crate) struct JoinedValues {
    pub left: Vec<(ColumnDef, Value)>,
    pub right: Option<Vec<(ColumnDef, Value)>>,
}

/// Runs a join over the store.
///
/// Output ordering is deterministic: left rows in insertion order, each
/// followed by its matching right rows in insertion order.
pub(crate) fn evaluate<L, R>(
    store: &RecordStore,
    join: &JoinQuery<L, R>,
) -> RelqResult<Vec<JoinedValues>>
where
    L: TableSchema,
    R: TableSchema,
{
    let foreign_key = join.foreign_key()?;

    let right_rows: Vec<Vec<(ColumnDef, Value)>> = store
        .scan(R::table_name())?
        .iter()
        .map(|row| zip_columns(R::columns(), &row.values))
        .collect();

    let mut results = Vec::new();
    for left_row in store.scan(L::table_name())? {
        let left_values = zip_columns(L::columns(), &left_row.values);
        let mut matched = false;

        for right_values in &right_rows {
            if let Some(fk) = foreign_key {
                let local = field_value(&left_values, fk.local_column)?;
                let foreign = field_value(right_values, fk.foreign_column)?;
                if local.is_null() || foreign.is_null() || local != foreign {
                    continue;
                }
            }
            if let Some(on) = &join.on {
                if !on.eval(&left_values, right_values)? {
                    continue;
                }
            }
            matched = true;
            results.push(JoinedValues {
                left: left_values.clone(),
                right: Some(right_values.clone()),
            });
        }

        if !matched && join.kind == JoinKind::LeftOuter {
            results.push(JoinedValues {
                left: left_values,
                right: None,
            });
        }
    }

    Ok(results)
}

fn zip_columns(columns: &'static [ColumnDef], values: &[Value]) -> Vec<(ColumnDef, Value)> {
    columns.iter().copied().zip(values.iter().cloned()).collect()
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::tests::{fixture_database, Member, Team};

    #[test]
    fn test_should_join_members_to_their_team() {
        let db = fixture_database();
        let join = JoinQuery::<Member, Team>::related(JoinKind::Inner);
        let pairs = evaluate(db.store(), &join).expect("failed to join");

        // all four members belong to a team
        assert_eq!(pairs.len(), 4);
        for pair in &pairs {
            let right = pair.right.as_ref().expect("inner join pair without right");
            let member_team = field_value(&pair.left, "team_id").expect("no team_id");
            let team_id = field_value(right, "id").expect("no id");
            assert_eq!(member_team, team_id);
        }
    }

    #[test]
    fn test_should_keep_unmatched_left_rows_on_left_outer() {
        let mut db = fixture_database();
        db.insert::<Member>(crate::tests::NewMember {
            username: Some("stray".to_string()),
            age: 50,
            team_id: None,
        })
        .expect("failed to insert");

        let join = JoinQuery::<Member, Team>::related(JoinKind::LeftOuter);
        let pairs = evaluate(db.store(), &join).expect("failed to join");

        assert_eq!(pairs.len(), 5);
        let unmatched: Vec<_> = pairs.iter().filter(|pair| pair.right.is_none()).collect();
        assert_eq!(unmatched.len(), 1);
        assert_eq!(
            field_value(&unmatched[0].left, "username").expect("no username"),
            &Value::from("stray")
        );
    }

    #[test]
    fn test_should_drop_unmatched_left_rows_on_inner() {
        let mut db = fixture_database();
        db.insert::<Member>(crate::tests::NewMember {
            username: Some("stray".to_string()),
            age: 50,
            team_id: None,
        })
        .expect("failed to insert");

        let join = JoinQuery::<Member, Team>::related(JoinKind::Inner);
        let pairs = evaluate(db.store(), &join).expect("failed to join");
        assert_eq!(pairs.len(), 4);
    }

    #[test]
    fn test_should_filter_right_side_but_keep_left_rows() {
        let db = fixture_database();
        // classic "left join team on team.name = 'teamA'"
        let join = JoinQuery::<Member, Team>::related(JoinKind::LeftOuter)
            .on(JoinOn::right(Filter::eq("name", "teamA")));
        let pairs = evaluate(db.store(), &join).expect("failed to join");

        // every member appears exactly once; only teamA members carry a team
        assert_eq!(pairs.len(), 4);
        let with_team = pairs.iter().filter(|pair| pair.right.is_some()).count();
        assert_eq!(with_team, 2);
    }

    #[test]
    fn test_should_evaluate_theta_join() {
        let mut db = fixture_database();
        // a member named after a team, the classic theta join demo
        db.insert::<Member>(crate::tests::NewMember {
            username: Some("teamB".to_string()),
            age: 60,
            team_id: None,
        })
        .expect("failed to insert");

        let join = JoinQuery::<Member, Team>::unrelated(JoinKind::Inner)
            .on(JoinOn::eq("username", "name"));
        let pairs = evaluate(db.store(), &join).expect("failed to join");

        assert_eq!(pairs.len(), 1);
        let right = pairs[0].right.as_ref().expect("missing right side");
        assert_eq!(
            field_value(right, "name").expect("no name"),
            &Value::from("teamB")
        );
    }

    #[test]
    fn test_should_fail_related_join_without_foreign_key() {
        let db = fixture_database();
        // teams declare no foreign key towards members
        let join = JoinQuery::<Team, Member>::related(JoinKind::Inner);
        let result = evaluate(db.store(), &join);
        assert!(matches!(
            result,
            Err(RelqError::Query(QueryError::InvalidQuery(_)))
        ));
    }

    #[test]
    fn test_should_combine_on_conditions_with_and() {
        let db = fixture_database();
        let join = JoinQuery::<Member, Team>::related(JoinKind::Inner)
            .on(JoinOn::right(Filter::eq("name", "teamA")))
            .on(JoinOn::left(Filter::gt("age", 10i64)));
        let pairs = evaluate(db.store(), &join).expect("failed to join");

        // only member2 (age 20) of teamA survives both conditions
        assert_eq!(pairs.len(), 1);
        assert_eq!(
            field_value(&pairs[0].left, "username").expect("no username"),
            &Value::from("member2")
        );
    }
}
