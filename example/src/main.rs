//! End-to-end walkthrough of the query evaluator.
//!
//! Loads two teams and four members, then runs through selects, dynamic
//! predicates, joins, aggregation, shaping and bulk mutation. Run with
//! `RUST_LOG=relq=debug` to watch the engine's own logging.

mod schema;

use relq::prelude::*;
use tracing::info;

use crate::schema::{Member, MemberDto, MemberPatch, NewMember, NewTeam, Team, UserDto};

fn main() -> RelqResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut db = Database::new();
    db.register::<Team>();
    db.register::<Member>();
    seed(&mut db)?;

    selects(&db)?;
    dynamic_predicates(&db, Some("member1"), None)?;
    joins(&mut db)?;
    aggregation(&db)?;
    shaping(&db)?;
    bulk_mutation(&mut db)?;

    Ok(())
}

fn seed(db: &mut Database) -> RelqResult<()> {
    let team_a = db.insert::<Team>(NewTeam {
        name: "teamA".to_string(),
    })?;
    let team_b = db.insert::<Team>(NewTeam {
        name: "teamB".to_string(),
    })?;

    for (username, age, team) in [
        ("member1", 10, team_a),
        ("member2", 20, team_a),
        ("member3", 30, team_b),
        ("member4", 40, team_b),
    ] {
        db.insert::<Member>(NewMember {
            username: Some(username.to_string()),
            age,
            team_id: Some(team),
        })?;
    }
    info!("seeded 2 teams and 4 members");
    Ok(())
}

fn selects(db: &Database) -> RelqResult<()> {
    // filter, sort, paginate
    let query = Query::<Member>::builder()
        .and_where(Filter::between("age", 20i64, 40i64))
        .order_by_desc("age")
        .limit(2)
        .build();
    let members = db.select(query)?;
    println!("two oldest members aged 20 to 40:");
    for member in &members {
        println!(
            "  #{} {:?} (age {:?}, team {:?})",
            member.id.unwrap_or_default(),
            member.username,
            member.age,
            member.team_id
        );
    }

    let count = db.count::<Member>(Some(Filter::like("username", "member%")))?;
    println!("members matching 'member%': {count}");

    let first = db.select_one(
        Query::<Member>::builder()
            .and_where(Filter::eq("username", "member1"))
            .build(),
    )?;
    println!("member1 found: {}", first.is_some());
    Ok(())
}

/// Filter components assembled from optional parameters; absent ones are
/// dropped instead of branching per combination.
fn dynamic_predicates(
    db: &Database,
    username: Option<&str>,
    age: Option<i64>,
) -> RelqResult<()> {
    let filter = Filter::all([
        username.map(|u| Filter::eq("username", u)),
        age.map(|a| Filter::eq("age", a)),
    ]);
    let count = db.count::<Member>(filter)?;
    println!("dynamic search matched {count} member(s)");
    Ok(())
}

fn joins(db: &mut Database) -> RelqResult<()> {
    // inner join along the declared foreign key
    let join = JoinQuery::<Member, Team>::related(JoinKind::Inner);
    let pairs = db.join(&join)?;
    println!("members with their team:");
    for (member, team) in &pairs {
        println!(
            "  {:?} -> {:?}",
            member.username,
            team.as_ref().and_then(|t| t.name.clone())
        );
    }

    // left outer join keeps every member, filtering only the right side
    let join = JoinQuery::<Member, Team>::related(JoinKind::LeftOuter)
        .on(JoinOn::right(Filter::eq("name", "teamA")));
    let rows = db.join_rows(&join)?;
    println!("left join on team name 'teamA' ({} rows):", rows.len());
    for row in &rows {
        println!(
            "  {} / {}",
            row.get_named("members.username").unwrap_or(&Value::Null),
            row.get_named("teams.name").unwrap_or(&Value::Null)
        );
    }

    // theta join: members named after a team
    db.insert::<Member>(NewMember {
        username: Some("teamB".to_string()),
        age: 50,
        team_id: None,
    })?;
    let join =
        JoinQuery::<Member, Team>::unrelated(JoinKind::Inner).on(JoinOn::eq("username", "name"));
    let pairs = db.join(&join)?;
    println!("members named after a team: {}", pairs.len());

    db.delete::<Member>(Some(Filter::eq("username", "teamB")))?;
    Ok(())
}

fn aggregation(db: &Database) -> RelqResult<()> {
    let selection = Selection::from([SelectExpr::col("age")]);
    let rows = db.select_rows(&selection, Query::<Member>::default())?;

    let totals = Aggregator::totals([
        Aggregate::count(),
        Aggregate::sum("age"),
        Aggregate::avg("age").round_dp(2),
        Aggregate::max("age"),
        Aggregate::min("age"),
    ])
    .apply(&rows)?;
    println!("age statistics:");
    for (name, value) in totals[0].iter() {
        println!("  {name} = {value}");
    }

    // average age per team, through a join feeding the aggregator
    let join = JoinQuery::<Member, Team>::related(JoinKind::Inner);
    let rows = db.join_rows(&join)?;
    let by_team = Aggregator::new(["teams.name"], [Aggregate::avg("members.age")]).apply(&rows)?;
    println!("average age per team:");
    for row in &by_team {
        println!(
            "  {} = {}",
            row.get_named("teams.name").unwrap_or(&Value::Null),
            row.get_named("avg(members.age)").unwrap_or(&Value::Null)
        );
    }
    Ok(())
}

fn shaping(db: &Database) -> RelqResult<()> {
    // by field name
    let selection = Selection::from([SelectExpr::col("username"), SelectExpr::col("age")]);
    let rows = db.select_rows(&selection, Query::<Member>::default())?;
    let dtos: Vec<MemberDto> = shape_by_fields(rows)?;
    println!("shaped {} MemberDto values by field:", dtos.len());
    for dto in &dtos {
        println!("  {:?} aged {:?}", dto.username, dto.age);
    }

    // positionally, with the projection checked before fetching anything
    let selection = Selection::from([
        SelectExpr::col("username").alias("name"),
        SelectExpr::col("age"),
    ]);
    let projection = CheckedProjection::<UserDto>::for_table::<Member>(selection)?;
    let rows = db.select_rows(projection.selection(), Query::<Member>::default())?;
    let users = projection.shape(rows)?;
    println!("shaped {} UserDto values positionally:", users.len());
    for user in &users {
        println!("  {:?} aged {:?}", user.name, user.age);
    }
    Ok(())
}

fn bulk_mutation(db: &mut Database) -> RelqResult<()> {
    // a result set fetched now is a snapshot
    let snapshot = db.select(Query::<Member>::default())?;

    let renamed = db.update(MemberPatch {
        username: Some(Assignment::Set(Value::from("nonmember"))),
        where_clause: Some(Filter::lt("age", 30i64)),
        ..Default::default()
    })?;
    println!("renamed {renamed} members under 30");

    let aged = db.update(MemberPatch {
        age: Some(Assignment::Add(Value::Int64(1))),
        ..Default::default()
    })?;
    println!("incremented age of {aged} members");

    println!(
        "snapshot still shows {:?} at age {:?}",
        snapshot[0].username, snapshot[0].age
    );
    let refetched = db.select(Query::<Member>::default())?;
    println!(
        "store now shows {:?} at age {:?}",
        refetched[0].username, refetched[0].age
    );

    let deleted = db.delete::<Member>(Some(Filter::gt("age", 18i64)))?;
    println!("deleted {deleted} adult members");
    Ok(())
}
