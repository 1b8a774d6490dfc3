use super::*;
use crate::catalog::{Catalog, ColumnType, Table};
use crate::expr::Operators;

fn catalog() -> Catalog {
    Catalog::new()
        .with_table(
            Table::new("items")
                .with_primary_key("id", ColumnType::Integer)
                .with_column("name", ColumnType::Text)
                .with_column("price", ColumnType::Real)
                .with_column("id_section", ColumnType::Integer)
                .with_column("id_brand", ColumnType::Integer)
                .with_column("art", ColumnType::Text)
                .with_column("id_src", ColumnType::Integer)
                .with_column("is_new", ColumnType::Integer),
        )
        .with_table(
            Table::new("info")
                .with_primary_key("id", ColumnType::Integer)
                .with_column("id_item", ColumnType::Integer)
                .with_column("price", ColumnType::Real)
                .with_column("name", ColumnType::Varchar)
                .with_column("data", ColumnType::Text),
        )
        .with_table(Table::new("checks").with_primary_key("id", ColumnType::Integer))
        .with_table(
            Table::new("brands")
                .with_primary_key("id", ColumnType::Integer)
                .with_column("name", ColumnType::Varchar)
                .with_column("description", ColumnType::Text),
        )
        .with_table(
            Table::new("sections")
                .with_primary_key("id", ColumnType::Integer)
                .with_column("sum_inc", "FLOAT"),
        )
}

fn select_clauses(qb: &QueryBuilder) -> &SelectClauses {
    match qb.clauses() {
        Clauses::Select(c) => c,
        other => panic!("expected select clauses, got {other:?}"),
    }
}

/// Where text stored for `select items.* from items where <cond>`.
fn where_text(cond: impl Into<Condition>) -> String {
    let db = catalog();
    let mut qb = QueryBuilder::new();
    qb.select(&db["items"])
        .from(&db["items"])
        .unwrap()
        .where_(cond)
        .unwrap();
    select_clauses(&qb).where_text.clone()
}

fn order_of(qb: &QueryBuilder) -> Vec<String> {
    select_clauses(qb)
        .order
        .iter()
        .map(|e| format!("{} {}", e.field, e.direction))
        .collect()
}

// ==================== select / from ====================

#[test]
fn test_select_fields() {
    let db = catalog();
    let items = &db["items"];
    let info = &db["info"];
    let mut qb = QueryBuilder::new();

    qb.select(()).from(items).unwrap();
    assert!(select_clauses(&qb).fields.is_empty());

    qb.select((&items["id"], &items["name"], &items["price"]));
    assert_eq!(
        select_clauses(&qb).fields,
        vec!["items.id", "items.name", "items.price"]
    );

    qb.select((items, info));
    assert_eq!(select_clauses(&qb).fields, vec!["items.*", "info.*"]);

    qb.select((" id,name,, ", " ,;,,users.*", " items.price,;    ", ""));
    assert_eq!(
        select_clauses(&qb).fields,
        vec!["id", "name", "users.*", "items.price"]
    );

    qb.select("id, name from users; delete * from users;--");
    assert_eq!(select_clauses(&qb).fields, vec!["id"]);

    qb.select((
        items,
        &info["id"],
        " ;,info.price,, some not valid stuff, ",
        "",
        ",",
        "; delete * from users; ",
    ));
    assert_eq!(
        select_clauses(&qb).fields,
        vec!["items.*", "info.id", "info.price"]
    );
}

#[test]
fn test_select_distinct_needs_fields() {
    let db = catalog();
    let items = &db["items"];
    let mut qb = QueryBuilder::new();

    qb.select_distinct((&items["id"], &items["name"]));
    assert!(select_clauses(&qb).distinct);

    qb.select_distinct("bad field; --");
    assert!(!select_clauses(&qb).distinct);
    qb.from(items).unwrap();
    assert_eq!(qb.build_select().unwrap(), "select * from items");
}

#[test]
fn test_from_tables() {
    let db = catalog();
    let mut qb = QueryBuilder::new();

    qb.select(&db["items"]["id"]).from(&db["items"]).unwrap();
    assert_eq!(select_clauses(&qb).tables, vec!["items"]);

    qb.select(&db["items"]["id"])
        .from((&db["items"], &db["brands"], "sections, info"))
        .unwrap();
    assert_eq!(
        select_clauses(&qb).tables,
        vec!["items", "brands", "sections", "info"]
    );

    qb.select(&db["items"]["id"])
        .from((" , sections,,, info, ; , ", "", ",", " ; "))
        .unwrap();
    assert_eq!(select_clauses(&qb).tables, vec!["sections", "info"]);

    qb.select(&db["items"]["id"])
        .from((&db["brands"], " , sections, ; delete * from users; , "))
        .unwrap();
    assert_eq!(select_clauses(&qb).tables, vec!["brands", "sections"]);

    // Columns are not tables.
    qb.select(()).from(&db["items"]["id"]).unwrap();
    assert!(select_clauses(&qb).tables.is_empty());
}

// ==================== join ====================

#[test]
fn test_join() {
    let db = catalog();
    let (items, info, checks, brands) = (&db["items"], &db["info"], &db["checks"], &db["brands"]);
    let mut qb = QueryBuilder::new();

    qb.select(())
        .from(items)
        .unwrap()
        .join(info, items["id"].equals(&info["id_item"]).unwrap(), JoinKind::Plain)
        .unwrap()
        .join(checks, checks["id"].equals(&info["id_item"]).unwrap(), "left")
        .unwrap();
    assert_eq!(
        qb.build_select().unwrap(),
        "select * from items join info on (items.id = info.id_item) \
         left join checks on (checks.id = info.id_item)"
    );

    qb.select(())
        .from(items)
        .unwrap()
        .join(checks, checks["id"].equals(&info["id_item"]).unwrap(), "right")
        .unwrap()
        .join(
            checks,
            checks["id"].equals(&info["id_item"]).unwrap(),
            "some wrong; params",
        )
        .unwrap();
    assert_eq!(
        qb.build_select().unwrap(),
        "select * from items right join checks on (checks.id = info.id_item) \
         join checks on (checks.id = info.id_item)"
    );

    qb.select(())
        .from(items)
        .unwrap()
        .join(checks, checks["id"].equals(&info["id_item"]).unwrap(), "inner")
        .unwrap()
        .join(info, info["id"].equals(&info["id_item"]).unwrap(), "cross")
        .unwrap()
        .join(brands, brands["id"].equals(&items["id_brand"]).unwrap(), "full outer")
        .unwrap();
    assert_eq!(
        qb.build_select().unwrap(),
        "select * from items inner join checks on (checks.id = info.id_item) \
         cross join info on (info.id = info.id_item) \
         full outer join brands on (brands.id = items.id_brand)"
    );

    qb.set_join(info, items["id"].equals(&info["id_item"]).unwrap(), "")
        .unwrap();
    assert_eq!(
        qb.build_select().unwrap(),
        "select * from items join info on (items.id = info.id_item)"
    );

    qb.set_join(brands, brands["id"].equals(&items["id_brand"]).unwrap(), "")
        .unwrap()
        .join(info, items["id"].equals(&info["id_item"]).unwrap(), "")
        .unwrap();
    assert_eq!(
        qb.build_select().unwrap(),
        "select * from items join brands on (brands.id = items.id_brand) \
         join info on (items.id = info.id_item)"
    );
}

#[test]
fn test_join_needs_table_and_condition() {
    let db = catalog();
    let mut qb = QueryBuilder::new();
    qb.select(())
        .from(&db["items"])
        .unwrap()
        .join("", db["info"]["id"].equals(1).unwrap(), "")
        .unwrap()
        .join(&db["info"], "   ", "")
        .unwrap();
    assert!(select_clauses(&qb).joins.is_empty());
    assert_eq!(qb.current_marker(), Some(Marker::Join));

    // Join tables given as text are kept verbatim, aliases included.
    qb.join("brands b", "b.id = items.id_brand", "LEFT ").unwrap();
    assert_eq!(
        qb.build_select().unwrap(),
        "select * from items left join brands b on b.id = items.id_brand"
    );
}

// ==================== where / and / or ====================

#[test]
fn test_where_conditions() {
    let db = catalog();
    let (items, info) = (&db["items"], &db["info"]);

    assert_eq!(where_text(items["name"].equals("name").unwrap()), "(items.name = 'name')");
    assert_eq!(where_text(items["price"].less_than(5.0).unwrap()), "(items.price < 5.0)");
    assert_eq!(where_text("  (info.id = 5.0)  "), "(info.id = 5.0)");
    assert_eq!(where_text(info["id"].less_than(-50).unwrap()), "(info.id < -50)");
    assert_eq!(where_text(info["id"].greater_than(50).unwrap()), "(info.id > 50)");
    assert_eq!(where_text(info["id"].equals(50).unwrap()), "(info.id = 50)");
    assert_eq!(where_text(info["id"].not_equals(50).unwrap()), "(info.id != 50)");
    assert_eq!(
        where_text(info["id"].less_than(&items["id"]).unwrap()),
        "(info.id < items.id)"
    );
    assert_eq!(
        where_text(
            info["id"]
                .less_than(50)
                .unwrap()
                .and(items["name"].not_equals("qwe").unwrap())
        ),
        "((info.id < 50) and (items.name != 'qwe'))"
    );
    assert_eq!(
        where_text(
            info["id"]
                .less_than(50)
                .unwrap()
                .or(info["id"].greater_than(40).unwrap())
        ),
        "((info.id < 50) or (info.id > 40))"
    );
    assert_eq!(where_text(info["id"].is_in([23, 45, 67])), "(info.id in (23, 45, 67))");
    assert_eq!(
        where_text(info["id"].not_in(["A", "B", "C"])),
        "(info.id not in ('A', 'B', 'C'))"
    );
    assert_eq!(where_text(""), "");
}

#[test]
fn test_where_type_mismatch() {
    let db = catalog();
    let (items, info) = (&db["items"], &db["info"]);
    assert!(info["id"].equals("qwe").unwrap_err().is_type_mismatch());
    assert!(info["id"].not_equals("qwe").unwrap_err().is_type_mismatch());
    assert!(items["name"].equals(50).unwrap_err().is_type_mismatch());
    assert!(items["name"].not_equals(50).unwrap_err().is_type_mismatch());
    assert!(items["name"].greater_than(50).unwrap_err().is_type_mismatch());
    assert!(items["name"].less_than(50).unwrap_err().is_type_mismatch());
    assert!(items["price"].equals("rty").unwrap_err().is_type_mismatch());
    // Varchar and text share a kind.
    assert!(info["name"].equals(&items["name"]).is_ok());
}

#[test]
fn test_and_or_chain() {
    let db = catalog();
    let items = &db["items"];
    let mut qb = QueryBuilder::new();

    qb.select(items).from(items).unwrap();
    let err = qb.and(items["id"].less_than(20).unwrap()).unwrap_err();
    assert!(err.is_sequence());
    assert_eq!(
        err.to_string(),
        "wrong query parts sequence: 'where+' can't be after 'from'"
    );

    qb.select(items)
        .from(items)
        .unwrap()
        .where_(items["id"].greater_than(10).unwrap())
        .unwrap()
        .and(items["id"].less_than(20).unwrap())
        .unwrap();
    assert_eq!(
        select_clauses(&qb).where_text,
        "(items.id > 10) and (items.id < 20)"
    );
    assert_eq!(
        qb.build_select().unwrap(),
        "select items.* from items where (items.id > 10) and (items.id < 20)"
    );

    qb.select(items)
        .from(items)
        .unwrap()
        .where_(items["id"].not_equals(0).unwrap())
        .unwrap()
        .or(items["id"].is_in([20, 30, 40]))
        .unwrap()
        .and("items.price > 1")
        .unwrap();
    // No grouping is added around earlier terms.
    assert_eq!(
        select_clauses(&qb).where_text,
        "(items.id != 0) or (items.id in (20, 30, 40)) and items.price > 1"
    );
}

#[test]
fn test_and_with_empty_condition_clears_where() {
    let db = catalog();
    let items = &db["items"];
    let mut qb = QueryBuilder::new();
    qb.select(())
        .from(items)
        .unwrap()
        .where_(items["id"].greater_than(10).unwrap())
        .unwrap()
        .and("  ")
        .unwrap();
    assert_eq!(select_clauses(&qb).where_text, "");
    assert_eq!(qb.build_select().unwrap(), "select * from items");
}

// ==================== group by / having ====================

#[test]
fn test_group_by() {
    let db = catalog();
    let (items, info) = (&db["items"], &db["info"]);
    let mut qb = QueryBuilder::new();

    qb.select(items).from(items).unwrap().group_by(&info["id"]).unwrap();
    assert_eq!(select_clauses(&qb).group, vec!["info.id"]);

    qb.select(items)
        .from(items)
        .unwrap()
        .group_by((&info["id"], &info["price"], "info.name"))
        .unwrap();
    assert_eq!(
        select_clauses(&qb).group,
        vec!["info.id", "info.price", "info.name"]
    );

    qb.select(items)
        .from(items)
        .unwrap()
        .group_by((&info["id"], &info["price"], " ;,info.name,info.data,,"))
        .unwrap();
    assert_eq!(
        select_clauses(&qb).group,
        vec!["info.id", "info.price", "info.name", "info.data"]
    );
}

#[test]
fn test_having() {
    let db = catalog();
    let items = &db["items"];
    let mut qb = QueryBuilder::new();

    qb.select(&items["id_section"])
        .from(items)
        .unwrap()
        .where_(items["id"].greater_than(20).unwrap())
        .unwrap()
        .group_by(&items["id_section"])
        .unwrap()
        .having(" sum(items.price) > 100 ")
        .unwrap()
        .order_by(&items["id_section"], "desc")
        .unwrap();
    assert_eq!(
        qb.build_select().unwrap(),
        "select items.id_section from items where (items.id > 20) \
         group by items.id_section having sum(items.price) > 100 \
         order by items.id_section desc"
    );
}

#[test]
fn test_having_requires_group_by() {
    let db = catalog();
    let items = &db["items"];
    let mut qb = QueryBuilder::new();

    qb.select(()).from(items).unwrap();
    let err = qb.having("").unwrap_err();
    assert!(err.is_missing_clause());
    assert_eq!(err.to_string(), "group by is not defined");

    // A group-by call whose tokens were all dropped leaves the list empty.
    qb.group_by("bad field").unwrap();
    assert!(qb.having("count(*) > 1").unwrap_err().is_missing_clause());
    assert_eq!(qb.current_marker(), Some(Marker::Group));
}

#[test]
fn test_having_drops_semicolons() {
    let db = catalog();
    let items = &db["items"];
    let mut qb = QueryBuilder::new();
    qb.select(())
        .from(items)
        .unwrap()
        .group_by(&items["id_brand"])
        .unwrap()
        .having("count(*) > 1; drop table items")
        .unwrap();
    assert_eq!(select_clauses(&qb).having, "");
    assert_eq!(qb.current_marker(), Some(Marker::Having));
}

// ==================== order by / limit ====================

#[test]
fn test_order_by() {
    let db = catalog();
    let items = &db["items"];
    let mut qb = QueryBuilder::new();
    qb.select(&items["id_section"]).from(items).unwrap();

    qb.order_by(&items["price"], Direction::Asc).unwrap();
    assert_eq!(order_of(&qb), vec!["items.price asc"]);

    qb.set_order_by(&items["price"], "asc").unwrap();
    assert_eq!(order_of(&qb), vec!["items.price asc"]);

    qb.set_order_by(&items["price"], "qwe").unwrap();
    assert_eq!(order_of(&qb), vec!["items.price asc"]);

    qb.set_order_by(&items["price"], "desc").unwrap();
    assert_eq!(order_of(&qb), vec!["items.price desc"]);

    qb.set_order_by("somecol desc, someother, thirdone desc", Direction::Asc)
        .unwrap();
    assert_eq!(
        order_of(&qb),
        vec!["somecol desc", "someother asc", "thirdone desc"]
    );

    qb.set_order_by("some col desc,, someo;ther, thirdone deeesc", Direction::Asc)
        .unwrap();
    assert!(order_of(&qb).is_empty());

    qb.set_order_by(&items["price"], "desc")
        .unwrap()
        .order_by("items.id asc", Direction::Asc)
        .unwrap()
        .order_by(&items["art"], "asc")
        .unwrap();
    assert_eq!(
        order_of(&qb),
        vec!["items.price desc", "items.id asc", "items.art asc"]
    );
    assert_eq!(
        qb.build_select().unwrap(),
        "select items.id_section from items order by items.price desc \
         order by items.id asc order by items.art asc"
    );
}

#[test]
fn test_limit_text() {
    let db = catalog();
    let items = &db["items"];
    let cases: Vec<(Bound, Bound, &str)> = vec![
        (50.into(), ().into(), "limit 50"),
        (50.into(), 200.into(), "limit 50 offset 200"),
        ((-50).into(), (-200).into(), "limit 50 offset 200"),
        ((-50).into(), "200".into(), "limit 50 offset 200"),
        ("50".into(), "200".into(), "limit 50 offset 200"),
        ("50".into(), "qwe".into(), "limit 50"),
        ("asd".into(), "qwe".into(), ""),
        (0.into(), 10.into(), ""),
    ];
    for (restriction, offset, expected) in cases {
        let mut qb = QueryBuilder::new();
        qb.select(()).from(items).unwrap().limit(restriction, offset).unwrap();
        assert_eq!(select_clauses(&qb).limit, expected);
    }
}

#[test]
fn test_limit_rendering_is_configurable() {
    let db = catalog();
    let items = &db["items"];

    let mut qb = QueryBuilder::new();
    qb.select(()).from(items).unwrap().limit(10, 20).unwrap();
    assert_eq!(qb.build_select().unwrap(), "select * from items");

    let mut qb = QueryBuilder::with_config(BuilderConfig::new().render_limit(true));
    qb.select(())
        .from(items)
        .unwrap()
        .order_by(&items["id"], Direction::Desc)
        .unwrap()
        .limit(10, 20)
        .unwrap();
    assert_eq!(
        qb.build_select().unwrap(),
        "select * from items order by items.id desc limit 10 offset 20"
    );
}

// ==================== sequencing ====================

#[test]
fn test_clause_before_statement() {
    let db = catalog();
    let mut qb = QueryBuilder::new();
    assert!(matches!(
        qb.from(&db["items"]).unwrap_err(),
        ChainError::InconsistentState(_)
    ));
    assert!(matches!(
        qb.having("max(info.id) > 256").unwrap_err(),
        ChainError::InconsistentState(_)
    ));
    assert!(matches!(
        qb.build_sql().unwrap_err(),
        ChainError::InconsistentState(_)
    ));
}

#[test]
fn test_sequence_errors() {
    let db = catalog();
    let (items, info, checks) = (&db["items"], &db["info"], &db["checks"]);
    let join_cond = || checks["id"].equals(&info["id_item"]).unwrap();
    let mut qb = QueryBuilder::new();

    let err = qb
        .select(())
        .where_(info["id"].greater_than(-50).unwrap())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "wrong query parts sequence: 'where' can't be after 'select'"
    );
    assert!(qb.select(()).and("a > b").unwrap_err().is_sequence());
    assert!(qb.select(()).join(checks, join_cond(), "").unwrap_err().is_sequence());

    qb.select(()).from(items).unwrap().order_by(&info["id"], "").unwrap();
    assert!(qb.join(checks, join_cond(), "").unwrap_err().is_sequence());

    qb.select(()).from(items).unwrap().group_by(&info["id"]).unwrap();
    assert!(qb.join(checks, join_cond(), "").unwrap_err().is_sequence());

    qb.select(()).from(items).unwrap().limit(5, ()).unwrap();
    assert!(qb.join(checks, join_cond(), "").unwrap_err().is_sequence());

    let err = qb.select(()).set([("name", "x")]).unwrap_err();
    assert!(matches!(
        err,
        ChainError::UnknownClause {
            mode: Mode::Select,
            marker: Marker::Set
        }
    ));
}

#[test]
fn test_rejected_call_leaves_state_untouched() {
    let db = catalog();
    let items = &db["items"];
    let mut qb = QueryBuilder::new();

    qb.select(&items["id"]);
    let before = qb.clauses().clone();
    assert!(qb.where_("items.id > 1").is_err());
    assert_eq!(qb.clauses(), &before);
    assert_eq!(qb.current_marker(), Some(Marker::Select));
    assert_eq!(qb.previous_marker(), None);

    qb.from(items).unwrap();
    assert_eq!(qb.current_marker(), Some(Marker::From));
    assert_eq!(qb.previous_marker(), Some(Marker::Select));
}

#[test]
fn test_mutation_grammars() {
    let db = catalog();
    let brands = &db["brands"];
    let mut qb = QueryBuilder::new();

    qb.update(brands);
    assert!(qb.where_("id = 1").unwrap_err().is_sequence());
    assert!(matches!(
        qb.and("id = 1").unwrap_err(),
        ChainError::UnknownClause { mode: Mode::Update, .. }
    ));

    qb.insert([("name", "x")]);
    assert!(matches!(
        qb.where_("id = 1").unwrap_err(),
        ChainError::UnknownClause { mode: Mode::Insert, .. }
    ));

    qb.delete(brands);
    assert!(matches!(
        qb.from(brands).unwrap_err(),
        ChainError::UnknownClause { mode: Mode::Delete, .. }
    ));
}

#[test]
fn test_mode_switch_resets_storage() {
    let db = catalog();
    let items = &db["items"];
    let mut qb = QueryBuilder::new();

    qb.select(items)
        .from(items)
        .unwrap()
        .where_(items["id"].greater_than(1).unwrap())
        .unwrap();
    qb.delete(items);
    assert_eq!(qb.mode(), Some(Mode::Delete));
    assert_eq!(qb.current_marker(), Some(Marker::Delete));
    assert_eq!(qb.previous_marker(), None);

    qb.select(());
    assert_eq!(select_clauses(&qb), &SelectClauses::default());
    assert!(qb.build_select().unwrap_err().is_missing_clause());
}

// ==================== rendering ====================

#[test]
fn test_build_statements() {
    let db = catalog();
    let (items, brands) = (&db["items"], &db["brands"]);
    let mut qb = QueryBuilder::new();

    qb.select(())
        .from(items)
        .unwrap()
        .where_(items["id"].greater_than(20).unwrap())
        .unwrap();
    assert_eq!(
        qb.build_select().unwrap(),
        "select * from items where (items.id > 20)"
    );

    qb.select_distinct(&items["id"])
        .from(items)
        .unwrap()
        .where_(items["id"].greater_than(20).unwrap())
        .unwrap();
    assert_eq!(
        qb.build_sql().unwrap().as_deref(),
        Some("select distinct items.id from items where (items.id > 20)")
    );

    qb.insert([("name", "some"), ("description", "some")])
        .into_table(brands)
        .unwrap();
    assert_eq!(
        qb.build_insert().unwrap().as_deref(),
        Some("insert into brands (name, description) values ('some', 'some')")
    );

    qb.update(brands)
        .set([("name", "new"), ("description", "new")])
        .unwrap()
        .where_(brands["name"].not_equals("old").unwrap())
        .unwrap();
    assert_eq!(
        qb.build_update().unwrap().as_deref(),
        Some("update brands set name = 'new', description = 'new' where (brands.name != 'old')")
    );

    qb.delete(brands);
    assert_eq!(
        qb.build_delete().unwrap().as_deref(),
        Some("delete from brands")
    );

    qb.delete("brands")
        .where_(brands["name"].equals("old").unwrap())
        .unwrap();
    assert_eq!(
        qb.build_sql().unwrap().as_deref(),
        Some("delete from brands where (brands.name = 'old')")
    );
}

#[test]
fn test_mutations_render_nothing_without_targets() {
    let mut qb = QueryBuilder::new();

    qb.insert([("name", "x")]).into_table("brands b").unwrap();
    assert_eq!(qb.build_insert().unwrap(), None);

    qb.insert(Vec::<(String, i64)>::new()).into_table("brands").unwrap();
    assert_eq!(qb.build_insert().unwrap(), None);

    qb.update("brands;").set([("name", "x")]).unwrap();
    assert_eq!(qb.build_update().unwrap(), None);

    qb.delete("");
    assert_eq!(qb.build_delete().unwrap(), None);
    assert!(matches!(
        qb.build_select().unwrap_err(),
        ChainError::InconsistentState(_)
    ));
}

#[test]
fn test_mixed_value_kinds() {
    let mut qb = QueryBuilder::new();
    qb.insert(vec![
        ("name", Value::from("n")),
        ("sum_inc", Value::from(0.5)),
        ("id", Value::from(9)),
    ])
    .into_table("sections")
    .unwrap();
    assert_eq!(
        qb.build_insert().unwrap().as_deref(),
        Some("insert into sections (name, id) values ('n', 9)")
    );
}
