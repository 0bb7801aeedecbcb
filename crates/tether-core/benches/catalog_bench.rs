//! Benchmarks for bindable-member discovery.
//!
//! Run with: cargo bench -p tether-core --bench catalog_bench

use std::hint::black_box;
use std::rc::Rc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use tether_core::{DynObject, MemberCatalog};

fn wide_object(props: usize) -> Rc<DynObject> {
    let mut builder = DynObject::builder("Wide");
    for i in 0..props {
        let name = format!("prop_{i:04}");
        builder = if i % 3 == 0 {
            builder.hidden(&name, i as i64)
        } else {
            builder.property(&name, i as i64)
        };
        builder = builder.event(&format!("evt_{i:04}"));
    }
    builder.build()
}

fn bench_discovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog/discovery");
    for &size in &[8usize, 64, 512] {
        let obj = wide_object(size);
        group.bench_with_input(BenchmarkId::new("properties", size), &obj, |b, obj| {
            b.iter(|| black_box(MemberCatalog::find_bindable_properties(obj.as_ref())));
        });
        group.bench_with_input(BenchmarkId::new("lookup_last", size), &obj, |b, obj| {
            let name = format!("prop_{:04}", size - 1);
            b.iter(|| black_box(MemberCatalog::find_property(obj.as_ref(), &name)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_discovery);
criterion_main!(benches);
