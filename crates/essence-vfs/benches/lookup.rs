use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use essence_vfs::{Extended, VFile, Vfs, unix_time};
use std::hint::black_box;
use std::io::Read;

/// Benchmark `open` at the end of a linear sibling scan
fn bench_open(c: &mut Criterion) {
    let mut group = c.benchmark_group("open");

    for size in [10, 100, 1000, 10000] {
        let vfs = create_vfs_with_files(size);
        let path = format!("/static/assets/file_{}.css", size - 1);

        group.bench_with_input(BenchmarkId::new("last_sibling", size), &path, |b, path| {
            b.iter(|| vfs.open(black_box(path)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark lookups of missing files
fn bench_exists_missing(c: &mut Criterion) {
    let mut group = c.benchmark_group("exists");

    for size in [10, 100, 1000] {
        let vfs = create_vfs_with_files(size);

        group.bench_with_input(BenchmarkId::new("missing", size), &size, |b, _| {
            b.iter(|| vfs.exists(black_box("/static/assets/missing.css")));
        });
    }

    group.finish();
}

/// Benchmark whole-file reads through the facade
fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("read");

    for size in [100, 1000] {
        let fs = Extended::embedded(create_vfs_with_files(size));
        let path = format!("/static/assets/file_{}.css", size / 2);

        group.bench_with_input(BenchmarkId::new("bytes", size), &path, |b, path| {
            b.iter(|| fs.bytes(black_box(path)).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("handle", size), &path, |b, path| {
            b.iter(|| {
                let mut out = Vec::new();
                fs.open(black_box(path)).unwrap().read_to_end(&mut out).unwrap();
                out
            });
        });
    }

    group.finish();
}

/// Benchmark the depth-first walk used by glob parsing
fn bench_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("walk");

    for size in [10, 100, 1000] {
        let fs = Extended::embedded(create_vfs_with_files(size));

        group.bench_with_input(BenchmarkId::new("count", size), &fs, |b, fs| {
            b.iter(|| {
                let mut count = 0usize;
                fs.walk(|_, _| count += 1).unwrap();
                count
            });
        });
    }

    group.finish();
}

fn create_vfs_with_files(count: usize) -> Vfs {
    let t = unix_time(1_700_000_000, 0);
    let files = (0..count).map(|i| {
        VFile::file(
            format!("file_{i}.css"),
            t,
            format!(".rule-{i} {{ color: #{i:06x}; }}").into_bytes(),
        )
    });

    Vfs::from_children(
        t,
        [VFile::dir("static", t).with_children([VFile::dir("assets", t).with_children(files)])],
    )
}

criterion_group!(benches, bench_open, bench_exists_missing, bench_read, bench_walk);
criterion_main!(benches);
