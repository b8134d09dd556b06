use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use stmtforge::{
    Dialect, Field, OrderField, QueryBuilder, QueryField, QueryGroup, StatementRequest,
};

/// A request over `n` columns `col0..coln` filtered on every column.
fn build_request(n: usize, batch_size: usize) -> StatementRequest {
    let names: Vec<String> = (0..n).map(|i| format!("col{i}")).collect();
    let filter: Vec<QueryField> = names
        .iter()
        .enumerate()
        .map(|(i, name)| QueryField::eq(name.as_str(), i as i64).unwrap())
        .collect();
    StatementRequest::new("t")
        .fields(Field::from_names(&names).unwrap())
        .filter(QueryGroup::and(filter))
        .order_by(vec![OrderField::ascending("col0").unwrap()])
        .qualifiers(vec![Field::new("col0").unwrap()])
        .batch_size(batch_size)
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_builder/query");

    for n in [1, 5, 10, 50, 100] {
        let request = build_request(n, 1);
        let builder = Dialect::SqlServer.statement_builder();
        group.bench_with_input(BenchmarkId::from_parameter(n), &request, |b, request| {
            let mut qb = QueryBuilder::new();
            b.iter(|| black_box(builder.create_query(&mut qb, request, None).unwrap()));
        });
    }

    group.finish();
}

fn bench_insert_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_builder/insert_all");

    for dialect in [Dialect::SqlServer, Dialect::PostgreSql] {
        for rows in [1, 10, 100] {
            let request = build_request(10, rows);
            let builder = dialect.statement_builder();
            let id = BenchmarkId::new(dialect.name(), rows);
            group.bench_with_input(id, &request, |b, request| {
                let mut qb = QueryBuilder::new();
                b.iter(|| black_box(builder.create_insert_all(&mut qb, request).unwrap()));
            });
        }
    }

    group.finish();
}

fn bench_merge_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_builder/merge_all");

    for dialect in Dialect::all() {
        let request = build_request(10, 10);
        let builder = dialect.statement_builder();
        group.bench_with_input(BenchmarkId::from_parameter(dialect), &request, |b, request| {
            let mut qb = QueryBuilder::new();
            b.iter(|| black_box(builder.create_merge_all(&mut qb, request).unwrap()));
        });
    }

    group.finish();
}

fn bench_group_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_builder/group_render");
    let setting = Dialect::SqlServer.db_setting();

    for n in [1, 10, 100] {
        // Same column repeated, so every leaf goes through parameter de-duplication.
        let fields: Vec<QueryField> = (0..n).map(|i| QueryField::gt("Id", i as i64).unwrap()).collect();
        let tree = QueryGroup::or(fields);
        group.bench_with_input(BenchmarkId::from_parameter(n), &tree, |b, tree| {
            b.iter(|| black_box(tree.get_string(0, &setting)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_query,
    bench_insert_all,
    bench_merge_all,
    bench_group_render
);
criterion_main!(benches);
