//! Benchmarks for input enumeration and batch planning.
//!
//! Run with: cargo bench

use std::fs;

use criterion::Criterion;
use mkvaudio::{AudioFormat, Batch, ExtractionRequest, find_containers};

fn build_tree(root: &std::path::Path, folders: usize, files_per_folder: usize) {
    for folder in 0..folders {
        let directory = root.join(format!("season-{folder:02}"));
        fs::create_dir_all(&directory).unwrap();
        for file in 0..files_per_folder {
            fs::write(directory.join(format!("episode-{file:03}.mkv")), b"").unwrap();
            fs::write(directory.join(format!("episode-{file:03}.srt")), b"").unwrap();
        }
    }
}

fn benchmark_enumeration(criterion: &mut Criterion) {
    let input = tempfile::tempdir().unwrap();
    build_tree(input.path(), 20, 25);

    criterion.bench_function("find 500 containers among 1000 files", |bencher| {
        bencher.iter(|| find_containers(input.path(), &["mkv"]).unwrap());
    });
}

fn benchmark_planning(criterion: &mut Criterion) {
    let input = tempfile::tempdir().unwrap();
    build_tree(input.path(), 20, 25);
    let request = ExtractionRequest::new()
        .with_input_root(input.path())
        .with_output_root("/tmp/mkvaudio-bench-out")
        .with_format(AudioFormat::Flac);

    criterion.bench_function("plan batch of 500 jobs", |bencher| {
        bencher.iter(|| Batch::plan(&request).unwrap());
    });
}

criterion::criterion_group!(benches, benchmark_enumeration, benchmark_planning);
criterion::criterion_main!(benches);
