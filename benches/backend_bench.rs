use criterion::{criterion_group, criterion_main, Criterion};
use kvperf::{config, create_database, Database, Properties, Query};
use rand::prelude::*;
use tempfile::TempDir;

fn sled_database(dir: &TempDir) -> Box<dyn Database> {
    let mut job = Properties::new();
    job.insert(config::JOB_NAME, "bench");
    job.insert(config::SLED_PATH, dir.path().to_str().unwrap());

    let mut db = create_database("sled").unwrap();
    assert!(db.init(&Properties::new(), &job).is_ok());
    db
}

fn write_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("write");

    group.bench_function("sled", |b| {
        b.iter_batched(
            || {
                let dir = TempDir::new().unwrap();
                let db = sled_database(&dir);
                (dir, db)
            },
            |(_dir, db)| {
                for i in 0..100 {
                    let query = Query::write(format!("key{}", i), b"value".to_vec());
                    assert!(db.insert(&query).is_ok());
                }
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn read_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("read");

    group.bench_function("sled", |b| {
        b.iter_batched(
            || {
                let dir = TempDir::new().unwrap();
                let db = sled_database(&dir);
                for i in 0..100 {
                    let query = Query::write(format!("key{}", i), b"value".to_vec());
                    assert!(db.insert(&query).is_ok());
                }
                (dir, db)
            },
            |(_dir, db)| {
                let mut rng = thread_rng();
                for _ in 0..100 {
                    let query = Query::lookup(format!("key{}", rng.gen_range(0..100)));
                    assert!(db.read(&query).is_ok());
                }
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, write_bench, read_bench);
criterion_main!(benches);
