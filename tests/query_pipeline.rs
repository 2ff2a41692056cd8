//! End-to-end tests of the query pipeline through `handle_query`.

use bumpalo::Bump;
use slotdb::catalog::Catalog;
use slotdb::error::ErrorKind;
use slotdb::session::handle_query;
use slotdb::storage::{TableStore, TupleBuilder};

fn setup() -> (Catalog, TableStore) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    (Catalog::bootstrap().unwrap(), TableStore::new())
}

/// Owned copy of a FieldDesc, so tests can outlive the request arena.
#[derive(Debug, PartialEq, Eq)]
struct Field {
    name: Option<String>,
    table_oid: u32,
    ordinal: u16,
    type_oid: u32,
    type_len: i16,
    typemod: i32,
}

/// Run one query and collect the descriptor plus all rows as strings.
fn run(
    sql: &str,
    catalog: &mut Catalog,
    store: &mut TableStore,
) -> slotdb::Result<(Vec<Field>, Vec<Vec<String>>)> {
    let arena = Bump::new();
    let (descriptor, cursor) = handle_query(sql, catalog, store, &arena)?;

    let fields = descriptor
        .fields
        .iter()
        .map(|f| Field {
            name: f.name.map(str::to_owned),
            table_oid: f.table_oid,
            ordinal: f.column_ordinal,
            type_oid: f.type_oid,
            type_len: f.type_len,
            typemod: f.typemod,
        })
        .collect();

    let mut rows = Vec::new();
    for row in cursor {
        let row = row?;
        rows.push(
            row.fields
                .iter()
                .map(|f| String::from_utf8_lossy(f.bytes).into_owned())
                .collect(),
        );
    }
    Ok((fields, rows))
}

/// Create foo(a char(5), b int4) and append three rows to its page.
fn seed_foo(catalog: &mut Catalog, store: &mut TableStore) -> u32 {
    run("CREATE TABLE foo (a CHAR(5), b INT);", catalog, store).unwrap();

    let arena = Bump::new();
    let foo = catalog.lookup_table_by_name("foo", &arena).unwrap();
    let page = store.page_mut(foo.oid).unwrap();
    for (a, b) in [("one", 1), ("two", 2), ("three", 3)] {
        let tuple = TupleBuilder::new().char_field(a, 5).int4(b).finish();
        page.insert_tuple(&tuple).unwrap();
    }
    foo.oid
}

#[test]
fn select_literals_without_table() {
    let (mut catalog, mut store) = setup();

    let (fields, rows) = run("SELECT 1, 'two' AS b;", &mut catalog, &mut store).unwrap();
    assert_eq!(
        fields,
        vec![
            Field {
                name: None,
                table_oid: 0,
                ordinal: 0,
                type_oid: 23,
                type_len: 4,
                typemod: -1,
            },
            Field {
                name: Some("b".to_owned()),
                table_oid: 0,
                ordinal: 0,
                type_oid: 18,
                type_len: -1,
                typemod: 3,
            },
        ]
    );
    assert_eq!(rows, vec![vec!["1".to_owned(), "two".to_owned()]]);
}

#[test]
fn table_less_select_yields_exactly_one_row() {
    let (mut catalog, mut store) = setup();
    let arena = Bump::new();

    let (_, mut cursor) =
        handle_query("SELECT 42;", &mut catalog, &mut store, &arena).unwrap();
    assert!(cursor.next().is_some());
    assert!(cursor.next().is_none());
    assert!(cursor.next().is_none());
}

#[test]
fn star_expansion_scans_in_insertion_order() {
    let (mut catalog, mut store) = setup();
    let foo_oid = seed_foo(&mut catalog, &mut store);

    let (fields, rows) = run("SELECT * FROM foo;", &mut catalog, &mut store).unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].name, Some("a".to_owned()));
    assert_eq!(fields[0].table_oid, foo_oid);
    assert_eq!(fields[0].ordinal, 1);
    assert_eq!(fields[0].type_oid, 18);
    assert_eq!(fields[0].typemod, 5);
    assert_eq!(fields[1].name, Some("b".to_owned()));
    assert_eq!(fields[1].ordinal, 2);
    assert_eq!(fields[1].type_oid, 23);

    assert_eq!(
        rows,
        vec![
            vec!["one".to_owned(), "1".to_owned()],
            vec!["two".to_owned(), "2".to_owned()],
            vec!["three".to_owned(), "3".to_owned()],
        ]
    );
}

#[test]
fn field_selection_with_alias() {
    let (mut catalog, mut store) = setup();
    seed_foo(&mut catalog, &mut store);

    let (fields, rows) = run("SELECT b AS num FROM foo;", &mut catalog, &mut store).unwrap();
    assert_eq!(fields[0].name, Some("num".to_owned()));
    assert_eq!(fields[0].ordinal, 2);
    assert_eq!(
        rows,
        vec![
            vec!["1".to_owned()],
            vec!["2".to_owned()],
            vec!["3".to_owned()],
        ]
    );
}

#[test]
fn unknown_column_fails_resolution() {
    let (mut catalog, mut store) = setup();
    seed_foo(&mut catalog, &mut store);

    let err = run("SELECT missing FROM foo;", &mut catalog, &mut store).unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::UndefinedColumn(name) if name == "missing"
    ));
    assert_eq!(err.message(), "column \"missing\" does not exist");
    assert_eq!(err.sqlstate(), "42703");
}

#[test]
fn unknown_table_fails_resolution() {
    let (mut catalog, mut store) = setup();

    let err = run("SELECT x FROM nowhere;", &mut catalog, &mut store).unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::UndefinedTable(name) if name == "nowhere"
    ));
    assert_eq!(err.sqlstate(), "42P01");
}

#[test]
fn syntax_error_position_is_one_based() {
    let (mut catalog, mut store) = setup();

    let err = run("SELECT 1 2;", &mut catalog, &mut store).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Syntax));
    assert_eq!(err.sqlstate(), "42601");
    assert_eq!(err.position(), Some(10));
}

#[test]
fn create_then_select_empty_table() {
    let (mut catalog, mut store) = setup();

    let (fields, rows) = run(
        "CREATE TABLE t (x INT, y CHAR(10));",
        &mut catalog,
        &mut store,
    )
    .unwrap();
    assert!(fields.is_empty());
    assert!(rows.is_empty());

    let (fields, rows) = run("SELECT x, y FROM t;", &mut catalog, &mut store).unwrap();
    assert!(rows.is_empty());
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].type_oid, 23);
    assert_eq!(fields[0].type_len, 4);
    assert_eq!(fields[0].typemod, -1);
    assert_eq!(fields[1].type_oid, 18);
    assert_eq!(fields[1].type_len, -1);
    assert_eq!(fields[1].typemod, 10);
}

#[test]
fn select_from_the_catalog_itself() {
    let (mut catalog, mut store) = setup();
    seed_foo(&mut catalog, &mut store);

    let (_, rows) = run("SELECT name FROM tables;", &mut catalog, &mut store).unwrap();
    let names: Vec<&str> = rows.iter().map(|row| row[0].as_str()).collect();
    assert_eq!(names, vec!["tables", "columns", "foo"]);
}

#[test]
fn joins_are_rejected() {
    let (mut catalog, mut store) = setup();
    seed_foo(&mut catalog, &mut store);

    let err = run("SELECT a FROM foo, bar;", &mut catalog, &mut store).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::FeatureNotSupported));
    assert_eq!(err.sqlstate(), "0A000");
}

#[test]
fn dml_statements_are_rejected() {
    let (mut catalog, mut store) = setup();

    let err = run(
        "INSERT INTO foo VALUES ('x', 1);",
        &mut catalog,
        &mut store,
    )
    .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::FeatureNotSupported));
    assert_eq!(err.position(), Some(1));
}

#[test]
fn star_without_from_is_a_syntax_error() {
    let (mut catalog, mut store) = setup();

    let err = run("SELECT *;", &mut catalog, &mut store).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::Syntax));
}

#[test]
fn session_continues_after_an_error() {
    let (mut catalog, mut store) = setup();
    seed_foo(&mut catalog, &mut store);

    let err = run("SELECT missing FROM foo;", &mut catalog, &mut store).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::UndefinedColumn(_)));

    let (_, rows) = run("SELECT a FROM foo;", &mut catalog, &mut store).unwrap();
    assert_eq!(rows.len(), 3);
}

#[test]
fn bigint_and_smallint_fields_render_as_text() {
    let (mut catalog, mut store) = setup();
    run(
        "CREATE TABLE nums (s SMALLINT, l BIGINT);",
        &mut catalog,
        &mut store,
    )
    .unwrap();

    let arena = Bump::new();
    let nums = catalog.lookup_table_by_name("nums", &arena).unwrap();
    let page = store.page_mut(nums.oid).unwrap();
    let tuple = TupleBuilder::new().int2(-7).int8(5_000_000_000).finish();
    page.insert_tuple(&tuple).unwrap();

    let (_, rows) = run("SELECT s, l FROM nums;", &mut catalog, &mut store).unwrap();
    assert_eq!(rows, vec![vec!["-7".to_owned(), "5000000000".to_owned()]]);
}
