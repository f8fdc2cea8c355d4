use corpsite_core::carousel::Carousel;
use corpsite_core::config::CarouselConfig;
use corpsite_core::entities::{EntityId, Project};
use corpsite_core::i18n::TextDirection;
use corpsite_core::views::ListFilter;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

const CATEGORIES: [&str; 4] = ["commercial", "residential", "education", "healthcare"];
const CITIES: [&str; 3] = ["Riyadh", "Jeddah", "Dammam"];

fn projects(count: usize) -> Vec<Project> {
    (0..count)
        .map(|i| Project {
            id: Some(EntityId::Int(i as i64)),
            title: format!("Project {i} Tower"),
            category: CATEGORIES[i % CATEGORIES.len()].to_string(),
            location: CITIES[i % CITIES.len()].to_string(),
            is_active: i % 3 != 0,
            ..Default::default()
        })
        .collect()
}

fn bench_filtering(c: &mut Criterion) {
    let mut group = c.benchmark_group("list_filtering");
    group.measurement_time(Duration::from_secs(5));

    for size in [100usize, 1_000, 10_000] {
        let items = projects(size);
        group.throughput(Throughput::Elements(size as u64));

        let search = ListFilter::new().with_search("tower 1");
        group.bench_with_input(BenchmarkId::new("search", size), &items, |b, items| {
            b.iter(|| black_box(search.apply(items)))
        });

        let combined = ListFilter::new()
            .with_search("jeddah")
            .with_facet("category", "education")
            .with_facet("status", "active");
        group.bench_with_input(BenchmarkId::new("search_and_facets", size), &items, |b, items| {
            b.iter(|| black_box(combined.apply(items)))
        });
    }

    group.finish();
}

fn bench_carousel(c: &mut Criterion) {
    c.bench_function("carousel_sweep_rtl", |b| {
        b.iter(|| {
            let mut carousel = Carousel::new(CarouselConfig::default(), 500, 1280, TextDirection::Rtl);
            while carousel.press_left() {}
            black_box(carousel.translate_offset())
        })
    });
}

criterion_group!(benches, bench_filtering, bench_carousel);
criterion_main!(benches);
