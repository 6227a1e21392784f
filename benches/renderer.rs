use chart_rs_renderer::config::{CategoryValue, ChartConfig, SeriesPatch};
use chart_rs_renderer::{Backend, Chart};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn chart_config(series_count: usize, categories: usize, kind: &str) -> ChartConfig {
    let mut config = ChartConfig::default();
    config.title.text = "Benchmark".to_string();
    config.category_axis.categories = (0..categories)
        .map(|idx| CategoryValue::Text(format!("C{idx}")))
        .collect();
    config.series = (0..series_count)
        .map(|series| SeriesPatch {
            name: Some(format!("Series {series}")),
            kind: Some(kind.to_string()),
            data: Some(
                (0..categories)
                    .map(|idx| Some(((idx * 7 + series * 13) % 50) as f64 - 10.0))
                    .collect(),
            ),
            ..SeriesPatch::default()
        })
        .collect();
    config
}

fn bench_refresh(c: &mut Criterion) {
    let mut group = c.benchmark_group("refresh");
    for series_count in [1usize, 4, 16] {
        for kind in ["column", "line"] {
            let config = chart_config(series_count, 12, kind);
            group.bench_with_input(
                BenchmarkId::new(kind, series_count),
                &config,
                |b, config| {
                    let mut chart = Chart::new(config.clone());
                    b.iter(|| black_box(chart.refresh(Backend::Svg)));
                },
            );
        }
    }
    group.finish();
}

fn bench_backends(c: &mut Criterion) {
    let config = chart_config(4, 24, "column");
    let mut group = c.benchmark_group("backend");
    for backend in [Backend::Svg, Backend::Vml] {
        group.bench_function(format!("{backend:?}"), |b| {
            let mut chart = Chart::new(config.clone());
            b.iter(|| black_box(chart.refresh(backend)));
        });
    }
    group.finish();
}

fn bench_stacked(c: &mut Criterion) {
    let mut config = chart_config(8, 24, "bar");
    config.series_defaults.base.stack = Some(true);
    c.bench_function("stacked_bars", |b| {
        let mut chart = Chart::new(config.clone());
        b.iter(|| black_box(chart.refresh(Backend::Svg)));
    });
}

criterion_group!(benches, bench_refresh, bench_backends, bench_stacked);
criterion_main!(benches);
