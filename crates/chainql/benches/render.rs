use chainql::{Catalog, ColumnType, Direction, Operators, QueryBuilder, Table};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

/// A table with `n` integer columns `col0..col{n-1}`.
fn wide_catalog(n: usize) -> Catalog {
    let table = (0..n).fold(
        Table::new("t").with_primary_key("id", ColumnType::Integer),
        |table, i| table.with_column(format!("col{i}"), ColumnType::Integer),
    );
    Catalog::new().with_table(table)
}

/// select col0, ... from t where (t.col0 > 0) and (t.col1 > 1) ... order by t.id desc
fn build_select(catalog: &Catalog, n: usize) -> QueryBuilder {
    let t = &catalog["t"];
    let columns: Vec<_> = (0..n).map(|i| &t[format!("col{i}").as_str()]).collect();

    let mut qb = QueryBuilder::new();
    qb.select(columns.clone()).from(t).unwrap();
    for (i, col) in columns.iter().enumerate() {
        let cond = col.greater_than(i as i64).unwrap();
        if i == 0 {
            qb.where_(cond).unwrap();
        } else {
            qb.and(cond).unwrap();
        }
    }
    qb.order_by(&t["id"], Direction::Desc).unwrap();
    qb
}

fn bench_build_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/build_select");

    for n in [1, 5, 10, 50] {
        let catalog = wide_catalog(n);
        let qb = build_select(&catalog, n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &qb, |b, qb| {
            b.iter(|| black_box(qb.build_select().unwrap()));
        });
    }

    group.finish();
}

fn bench_chain_and_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/chain_and_render");

    for n in [1, 5, 10, 50] {
        let catalog = wide_catalog(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let qb = build_select(&catalog, n);
                black_box(qb.build_select().unwrap());
            });
        });
    }

    group.finish();
}

fn bench_membership(c: &mut Criterion) {
    let catalog = wide_catalog(1);
    let id = &catalog["t"]["id"];

    c.bench_function("render/membership_100", |b| {
        let items: Vec<i64> = (0..100).collect();
        b.iter(|| black_box(id.is_in(items.clone()).into_sql()));
    });
}

criterion_group!(
    benches,
    bench_build_select,
    bench_chain_and_render,
    bench_membership
);
criterion_main!(benches);
