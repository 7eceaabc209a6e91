//! The demo schema: a members table with a foreign key to a teams table.

use relq::prelude::*;

const TEAM_COLUMNS: &[ColumnDef] = &[
    ColumnDef {
        name: "id",
        data_type: DataTypeKind::Uint64,
        nullable: false,
        primary_key: true,
        foreign_key: None,
    },
    ColumnDef {
        name: "name",
        data_type: DataTypeKind::Text,
        nullable: false,
        primary_key: false,
        foreign_key: None,
    },
];

/// The teams table.
pub struct Team;

impl TableSchema for Team {
    type Record = TeamRecord;
    type Insert = NewTeam;
    type Update = TeamPatch;

    fn table_name() -> &'static str {
        "teams"
    }

    fn columns() -> &'static [ColumnDef] {
        TEAM_COLUMNS
    }

    fn primary_key() -> &'static str {
        "id"
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamRecord {
    pub id: Option<RecordId>,
    pub name: Option<String>,
}

impl TableRecord for TeamRecord {
    type Schema = Team;

    fn from_values(values: &[(ColumnDef, Value)]) -> Self {
        let mut record = Self::default();
        for (col, value) in values {
            match (col.name, value) {
                ("id", Value::Uint64(id)) => record.id = Some(RecordId(*id)),
                ("name", Value::Text(name)) => record.name = Some(name.clone()),
                _ => {}
            }
        }
        record
    }

    fn to_values(&self) -> Vec<Value> {
        vec![self.id.into(), self.name.clone().into()]
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewTeam {
    pub name: String,
}

impl InsertRecord for NewTeam {
    type Schema = Team;

    fn into_values(self) -> Vec<(ColumnDef, Value)> {
        vec![(TEAM_COLUMNS[1], Value::Text(self.name))]
    }
}

#[derive(Debug, Clone, Default)]
pub struct TeamPatch {
    pub name: Option<Assignment>,
    pub where_clause: Option<Filter>,
}

impl UpdateRecord for TeamPatch {
    type Schema = Team;

    fn assignments(&self) -> Vec<(ColumnDef, Assignment)> {
        self.name
            .clone()
            .map(|assignment| (TEAM_COLUMNS[1], assignment))
            .into_iter()
            .collect()
    }

    fn where_clause(&self) -> Option<Filter> {
        self.where_clause.clone()
    }
}

const MEMBER_COLUMNS: &[ColumnDef] = &[
    ColumnDef {
        name: "id",
        data_type: DataTypeKind::Uint64,
        nullable: false,
        primary_key: true,
        foreign_key: None,
    },
    ColumnDef {
        name: "username",
        data_type: DataTypeKind::Text,
        nullable: true,
        primary_key: false,
        foreign_key: None,
    },
    ColumnDef {
        name: "age",
        data_type: DataTypeKind::Int64,
        nullable: false,
        primary_key: false,
        foreign_key: None,
    },
    ColumnDef {
        name: "team_id",
        data_type: DataTypeKind::Uint64,
        nullable: true,
        primary_key: false,
        foreign_key: Some(ForeignKeyDef {
            local_column: "team_id",
            foreign_table: "teams",
            foreign_column: "id",
        }),
    },
];

/// The members table.
pub struct Member;

impl TableSchema for Member {
    type Record = MemberRecord;
    type Insert = NewMember;
    type Update = MemberPatch;

    fn table_name() -> &'static str {
        "members"
    }

    fn columns() -> &'static [ColumnDef] {
        MEMBER_COLUMNS
    }

    fn primary_key() -> &'static str {
        "id"
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberRecord {
    pub id: Option<RecordId>,
    pub username: Option<String>,
    pub age: Option<i64>,
    pub team_id: Option<RecordId>,
}

impl TableRecord for MemberRecord {
    type Schema = Member;

    fn from_values(values: &[(ColumnDef, Value)]) -> Self {
        let mut record = Self::default();
        for (col, value) in values {
            match (col.name, value) {
                ("id", Value::Uint64(id)) => record.id = Some(RecordId(*id)),
                ("username", Value::Text(username)) => record.username = Some(username.clone()),
                ("age", Value::Int64(age)) => record.age = Some(*age),
                ("team_id", Value::Uint64(id)) => record.team_id = Some(RecordId(*id)),
                _ => {}
            }
        }
        record
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            self.id.into(),
            self.username.clone().into(),
            self.age.into(),
            self.team_id.into(),
        ]
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewMember {
    pub username: Option<String>,
    pub age: i64,
    pub team_id: Option<RecordId>,
}

impl InsertRecord for NewMember {
    type Schema = Member;

    fn into_values(self) -> Vec<(ColumnDef, Value)> {
        vec![
            (MEMBER_COLUMNS[1], self.username.into()),
            (MEMBER_COLUMNS[2], Value::Int64(self.age)),
            (MEMBER_COLUMNS[3], self.team_id.into()),
        ]
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemberPatch {
    pub username: Option<Assignment>,
    pub age: Option<Assignment>,
    pub team_id: Option<Assignment>,
    pub where_clause: Option<Filter>,
}

impl UpdateRecord for MemberPatch {
    type Schema = Member;

    fn assignments(&self) -> Vec<(ColumnDef, Assignment)> {
        [
            (MEMBER_COLUMNS[1], &self.username),
            (MEMBER_COLUMNS[2], &self.age),
            (MEMBER_COLUMNS[3], &self.team_id),
        ]
        .into_iter()
        .filter_map(|(col, assignment)| assignment.clone().map(|a| (col, a)))
        .collect()
    }

    fn where_clause(&self) -> Option<Filter> {
        self.where_clause.clone()
    }
}

/// A flat projection of a member, shaped by field names.
#[derive(Debug, Clone, Default)]
pub struct MemberDto {
    pub username: Option<String>,
    pub age: Option<i64>,
}

impl FieldShaped for MemberDto {
    fn target_name() -> &'static str {
        "MemberDto"
    }

    fn assign(&mut self, field: &str, value: Value) -> Result<(), ShapeError> {
        match field {
            "username" => self.username = value.as_text().cloned(),
            "age" => self.age = value.as_int64().copied(),
            _ => {
                return Err(ShapeError::UnknownField {
                    target: Self::target_name(),
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// A flat projection renaming the username to `name`, shaped positionally
/// with an up-front checked selection.
#[derive(Debug, Clone, Default)]
pub struct UserDto {
    pub name: Option<String>,
    pub age: Option<i64>,
}

impl PositionalShaped for UserDto {
    fn target_name() -> &'static str {
        "UserDto"
    }

    fn from_positional(values: Vec<Value>) -> Result<Self, ShapeError> {
        let found = values.len();
        let [name, age]: [Value; 2] = values.try_into().map_err(|_| ShapeError::Arity {
            target: Self::target_name(),
            expected: 2,
            found,
        })?;
        Ok(Self {
            name: name.as_text().cloned(),
            age: age.as_int64().copied(),
        })
    }
}

impl ShapeSchema for UserDto {
    const PARAMS: &'static [(&'static str, DataTypeKind)] =
        &[("name", DataTypeKind::Text), ("age", DataTypeKind::Int64)];
}
