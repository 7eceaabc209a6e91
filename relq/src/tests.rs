//! Shared test fixtures: a two-table schema of members and teams, plus the
//! DTO targets used by the shaping tests.


use std::collections::HashMap;

pub use self::dto::{MemberDto, UserDto};
pub use self::member::{Member, MemberPatch, MemberRecord, NewMember, MEMBERS_FIXTURES};
pub use self::team::{NewTeam, Team, TeamPatch, TeamRecord, TEAMS_FIXTURES};
use crate::engine::Database;

/// A database loaded with the standard fixtures: two teams, teamA with
/// member1 (age 10) and member2 (age 20), teamB with member3 (age 30) and
/// member4 (age 40).
pub fn fixture_database() -> Database {
    let mut db = Database::new();
    db.register::<Team>();
    db.register::<Member>();

    let mut team_ids = HashMap::new();
    for name in TEAMS_FIXTURES {
        let id = db
            .insert::<Team>(NewTeam {
                name: name.to_string(),
            })
            .expect("failed to insert team fixture");
        team_ids.insert(*name, id);
    }

    for (username, age, team) in MEMBERS_FIXTURES {
        db.insert::<Member>(NewMember {
            username: Some(username.to_string()),
            age: *age,
            team_id: Some(team_ids[team]),
        })
        .expect("failed to insert member fixture");
    }

    db
}
