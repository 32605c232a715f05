//! Benchmarks for chapter grouping and output naming.
//!
//! Run with: cargo bench

use std::hint::black_box;

use criterion::Criterion;
use epsplit::{Chapter, GroupingConfig, OutputTemplate, SourceFile, TemplateValues, group};

fn sources(files: usize, chapters_per_file: usize) -> Vec<SourceFile> {
    (0..files)
        .map(|file| {
            let chapters = (0..chapters_per_file)
                .map(|i| Chapter::from_seconds(i as f64 * 60.0, (i + 1) as f64 * 60.0))
                .collect();
            SourceFile::new(format!("disc{file}.mkv"), chapters)
        })
        .collect()
}

fn benchmark_grouping(criterion: &mut Criterion) {
    let sources = sources(20, 500);
    let mut benchmark_group = criterion.benchmark_group("grouping");

    for length in [1, 4] {
        let config = GroupingConfig::new().with_episode_length(length);
        benchmark_group.bench_function(format!("10k chapters, length {length}"), |bencher| {
            bencher.iter(|| {
                let count = group(black_box(&sources), &config)
                    .unwrap()
                    .filter(Result::is_ok)
                    .count();
                black_box(count)
            });
        });
    }

    benchmark_group.finish();
}

fn benchmark_template(criterion: &mut Criterion) {
    let template = OutputTemplate::parse("S01E{episode_num:03d} - {title:_<20}.{ext}").unwrap();

    criterion.bench_function("render output name", |bencher| {
        bencher.iter(|| {
            template.render(black_box(&TemplateValues {
                episode_num: 7,
                title: "The One With The Benchmark",
                ext: "mkv",
            }))
        });
    });
}

criterion::criterion_group!(benches, benchmark_grouping, benchmark_template);
criterion::criterion_main!(benches);
