use bale_core::{
    containers::{CompoundStringBuffer, CompoundTupleBuffer, TupleView, TupleViewFactory},
    layout::AllocationMode,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{thread_rng, Rng};

fn gen_random_polylines(factory: &TupleViewFactory, count: usize) -> Vec<TupleView> {
    let mut rng = thread_rng();
    (0..count)
        .map(|_| {
            let mut polyline = factory.new_buffer(0).unwrap();
            for _ in 0..rng.gen_range(2..64) {
                polyline
                    .push_tuple(&[rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>()])
                    .unwrap();
            }
            polyline
        })
        .collect()
}

fn pack_polylines(factory: TupleViewFactory, polylines: &[TupleView]) {
    let mut buffer = CompoundTupleBuffer::new(factory, 16, 8).unwrap();
    for polyline in polylines {
        buffer.append_sub_buffer(polyline).unwrap();
    }
    black_box(buffer);
}

fn pack_strings(strings: &[String]) {
    let mut buffer = CompoundStringBuffer::new(16, 8).unwrap();
    for string in strings {
        buffer.append_sub_buffer(string.as_str()).unwrap();
    }
    black_box(buffer);
}

fn bench(c: &mut Criterion) {
    let factory = TupleViewFactory::float32(3);
    let polylines = gen_random_polylines(&factory, 4096);
    let strings = (0..4096)
        .map(|index| format!("  record {}  ", index))
        .collect::<Vec<_>>();

    c.bench_function("pack_polylines_direct", |b| {
        b.iter(|| pack_polylines(factory, &polylines));
    });
    c.bench_function("pack_polylines_managed", |b| {
        b.iter(|| {
            pack_polylines(
                factory.with_allocation_mode(AllocationMode::Managed),
                &polylines,
            )
        });
    });
    c.bench_function("pack_strings", |b| {
        b.iter(|| pack_strings(&strings));
    });

    let mut packed = CompoundTupleBuffer::new(factory, 16, 8).unwrap();
    for polyline in &polylines {
        packed.append_sub_buffer(polyline).unwrap();
    }
    let indices = (0..packed.num_sub_buffers()).rev().step_by(3).collect::<Vec<_>>();
    c.bench_function("subset_polylines", |b| {
        b.iter(|| black_box(packed.subset(&indices).unwrap()));
    });
}

criterion_group! {
    name = compound_buffers;
    config = Criterion::default().sample_size(40);
    targets = bench
}
criterion_main!(compound_buffers);
