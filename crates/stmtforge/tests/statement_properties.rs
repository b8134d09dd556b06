//! Behavior checks through the public API, one dialect builder per test.

use std::collections::HashSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde_json::json;
use stmtforge::{
    DbField, Dialect, Field, Order, OrderField, QueryBuilder, QueryField, QueryGroup,
    StatementRequest, col,
};

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn query_field_identity_ignores_value() {
    let a = QueryField::eq("Id", 1).unwrap();
    let b = QueryField::eq("Id", 2).unwrap();
    assert_eq!(hash_of(&a), hash_of(&b));
    assert_eq!(a, b);

    let set: HashSet<QueryField> = [a].into_iter().collect();
    assert!(set.contains(&b));

    let c = QueryField::ne("Id", 1).unwrap();
    assert_ne!(b, c);
}

#[test]
fn query_field_name_comparison_is_case_sensitive() {
    let field = QueryField::eq("Name", "x").unwrap();
    assert!(field == "Name");
    assert!(field != "name");
}

#[test]
fn order_field_equality_needs_name_and_order() {
    let asc = OrderField::new("Id", Order::Ascending).unwrap();
    assert_eq!(asc, OrderField::ascending("Id").unwrap());
    assert_ne!(asc, OrderField::descending("Id").unwrap());
    assert_ne!(asc, OrderField::ascending("Code").unwrap());
}

#[test]
fn query_over_two_fields_is_repeatable() {
    for dialect in Dialect::all() {
        let builder = dialect.statement_builder();
        let request = StatementRequest::new("Person").fields(Field::from_names(&["A", "B"]).unwrap());
        let mut qb = QueryBuilder::new();

        let first = builder.create_query(&mut qb, &request, None).unwrap();
        let second = builder.create_query(&mut qb, &request, None).unwrap();
        assert_eq!(first, second);

        let setting = dialect.db_setting();
        let expected = format!(
            "SELECT {}{}{}, {}{}{} FROM {}Person{} ;",
            setting.opening_quote, "A", setting.closing_quote,
            setting.opening_quote, "B", setting.closing_quote,
            setting.opening_quote, setting.closing_quote,
        );
        assert_eq!(first, expected);
    }
}

#[test]
fn insert_all_suffixes_every_row_but_the_first() {
    let request = StatementRequest::new("Person")
        .fields(Field::from_names(&["Id", "Name", "Address"]).unwrap())
        .identity_field(DbField::identity("Id"))
        .batch_size(3);

    for dialect in Dialect::all() {
        let sql = dialect
            .statement_builder()
            .create_insert_all(&mut QueryBuilder::new(), &request)
            .unwrap();
        for suffix in ["", "_1", "_2"] {
            assert!(sql.contains(&format!("@Name{suffix}, @Address{suffix}")), "{dialect}: {sql}");
        }
        assert!(!sql.contains("@Id"), "{dialect}: {sql}");
    }
}

#[test]
fn update_all_adopts_primary_as_qualifier() {
    let builder = Dialect::SqlServer.statement_builder();
    let mut qb = QueryBuilder::new();
    let request = StatementRequest::new("Person")
        .fields(Field::from_names(&["Id", "Name"]).unwrap())
        .batch_size(2);

    let err = builder.create_update_all(&mut qb, &request).unwrap_err();
    assert!(err.is_missing_qualifiers());

    let sql = builder
        .create_update_all(&mut qb, &request.primary_field(DbField::primary("Id")))
        .unwrap();
    assert!(sql.contains("WHERE ([Id] = @Id) ;"));
    assert!(sql.contains("WHERE ([Id] = @Id_1) ;"));
    assert!(!sql.contains("SET [Id]"));
}

#[test]
fn hints_fail_regardless_of_other_input() {
    // Blank table, no fields: the hints check still fires first.
    let request = StatementRequest::new("").hints("WITH (NOLOCK)");
    for dialect in [Dialect::PostgreSql, Dialect::MySql, Dialect::Sqlite] {
        let builder = dialect.statement_builder();
        let err = builder.create_query(&mut QueryBuilder::new(), &request, None).unwrap_err();
        assert!(err.is_not_supported(), "{dialect}: {err}");
    }
}

#[test]
fn sql_server_batch_query_shape() {
    let request = StatementRequest::new("Table")
        .fields(Field::from_names(&["Field1", "Field2"]).unwrap())
        .order_by(vec![OrderField::ascending("Field1").unwrap()]);
    let sql = Dialect::SqlServer
        .statement_builder()
        .create_batch_query(&mut QueryBuilder::new(), &request, 0, 10)
        .unwrap();
    assert_eq!(
        sql,
        "WITH CTE AS ( SELECT ROW_NUMBER() OVER ( ORDER BY [Field1] ASC ) AS [RowNumber], [Field1], [Field2] FROM [Table] ) SELECT [Field1], [Field2] FROM CTE WHERE ([RowNumber] BETWEEN 1 AND 10) ORDER BY [Field1] ASC ;"
    );
}

#[test]
fn bag_filter_compiles_with_its_parameters() {
    let setting = Dialect::SqlServer.db_setting();
    let filter = QueryGroup::parse(&json!({
        "Name": "Alice",
        "Age": { "operation": "gt", "value": 30 },
    }))
    .unwrap();
    let request = StatementRequest::new("Person")
        .fields(Field::from_names(&["Id", "Name"]).unwrap())
        .filter(filter.clone());

    let sql = Dialect::SqlServer
        .statement_builder()
        .create_query(&mut QueryBuilder::new(), &request, None)
        .unwrap();
    assert_eq!(sql, "SELECT [Id], [Name] FROM [Person] WHERE ([Name] = @Name AND [Age] > @Age) ;");

    let names: Vec<String> = filter.parameters(0, &setting).into_iter().map(|p| p.name).collect();
    assert_eq!(names, ["@Name", "@Age"]);
}

#[test]
fn predicate_expression_compiles_to_where() {
    let predicate = (col("Age").ge(18) & col("Name").starts_with("A")) | !col("IsActive").is_true();
    let filter = QueryGroup::from_predicate(&predicate).unwrap();
    let request = StatementRequest::new("Person")
        .fields(Field::from_names(&["Id"]).unwrap())
        .filter(filter);

    let sql = Dialect::PostgreSql
        .statement_builder()
        .create_delete(&mut QueryBuilder::new(), &request)
        .unwrap();
    assert!(sql.starts_with("DELETE FROM \"Person\" WHERE ("));
    assert!(sql.contains("\"Age\" >= @Age"));
    assert!(sql.contains("\"Name\" LIKE @Name"));
    assert!(sql.contains("NOT (\"IsActive\" = @IsActive)"));
}
