use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use housefilter_filters::dedup::drop_duplicates;
use housefilter_filters::{DatasetKind, FilterContext, PolicyRegistry};
use housefilter_formats::csv_reader::parse_text;
use housefilter_formats::Table;

fn county_sales_table(rows: usize) -> Table {
    let mut csv = String::from("price,bedrooms,bathrooms,sqft_living,sqft_lot,lat,long,yr_built,grade\n");
    for i in 0..rows {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{}\n",
            5_000 + i * 1_000,
            i % 25,
            (i % 8) as f64 * 0.75,
            500 + i % 4_000,
            1_000 + i * 3,
            46.5 + (i % 20) as f64 * 0.1,
            -122.8 + (i % 30) as f64 * 0.07,
            1790 + i % 240,
            i % 15
        ));
    }
    parse_text(&csv, b',').unwrap()
}

fn index_table(rows: usize) -> Table {
    let mut csv = String::from("year,index,change\n");
    for i in 0..rows {
        csv.push_str(&format!("{},{},{}\n", 1950 + i % 70, i % 1_200, (i % 50) as f64 - 25.0));
    }
    parse_text(&csv, b',').unwrap()
}

fn bench_policies(c: &mut Criterion) {
    let mut group = c.benchmark_group("policies");
    let registry = PolicyRegistry::standard();
    let ctx = FilterContext::for_year(2024);

    let sales = county_sales_table(10_000);
    group.throughput(Throughput::Elements(sales.height() as u64));
    group.bench_function("county_sales_10k", |b| {
        let policy = registry.policy_for(DatasetKind::CountySales);
        b.iter(|| black_box(policy.apply(black_box(&sales), &ctx)));
    });

    let index = index_table(10_000);
    group.bench_function("numeric_index_10k", |b| {
        let policy = registry.policy_for(DatasetKind::NumericIndex);
        b.iter(|| black_box(policy.apply(black_box(&index), &ctx)));
    });

    group.bench_function("generic_10k", |b| {
        let policy = registry.policy_for(DatasetKind::Generic);
        b.iter(|| black_box(policy.apply(black_box(&index), &ctx)));
    });

    group.finish();
}

fn bench_dedup(c: &mut Criterion) {
    let mut group = c.benchmark_group("dedup");

    let table = index_table(50_000);
    group.throughput(Throughput::Elements(table.height() as u64));
    group.bench_function("drop_duplicates_50k", |b| {
        b.iter(|| black_box(drop_duplicates(black_box(&table))));
    });

    group.finish();
}

criterion_group!(benches, bench_policies, bench_dedup);
criterion_main!(benches);
