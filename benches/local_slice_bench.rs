use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use local_slice::{reduce, slice_value, Action, BindOptions, Binder, KeySpec, SliceMap, Store};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn populated(n: usize) -> SliceMap {
    let mut m = SliceMap::empty();
    for (i, x) in lcg(7).take(n).enumerate() {
        let action = Action::set("local", key(x).as_str(), slice_value(i as u64), "SET_LOCAL");
        m = reduce(Some(&m), &action);
    }
    m
}

fn bench_reduce_set(c: &mut Criterion) {
    c.bench_function("reduce_set_1k", |b| {
        b.iter_batched(
            SliceMap::empty,
            |mut m| {
                for (i, x) in lcg(1).take(1_000).enumerate() {
                    let action =
                        Action::set("local", key(x).as_str(), slice_value(i as u64), "SET_LOCAL");
                    m = reduce(Some(&m), &action);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_reduce_noop(c: &mut Criterion) {
    c.bench_function("reduce_noop_passthrough", |b| {
        let m = populated(1_000);
        let action = Action::other("SOMETHING_ELSE");
        b.iter(|| black_box(reduce(Some(&m), &action)))
    });
}

fn bench_attach_detach(c: &mut Criterion) {
    c.bench_function("attach_detach_shared_key", |b| {
        let store = Store::new();
        let binder: Binder<(), u64> = Binder::new(
            &store,
            BindOptions {
                key: KeySpec::fixed("hot"),
                ..Default::default()
            },
        );
        // A resident reference keeps the key alive so churn measures the
        // count transitions, not repeated cleanup dispatches.
        let resident = binder.attach(&());
        resident.setter().set(0);
        b.iter(|| {
            let binding = binder.attach(&());
            black_box(binding.read());
        })
    });
}

fn bench_setter_writes(c: &mut Criterion) {
    c.bench_function("setter_write_churn", |b| {
        let store = Store::new();
        let binder: Binder<(), u64> = Binder::new(
            &store,
            BindOptions {
                key: KeySpec::fixed("hot"),
                ..Default::default()
            },
        );
        let binding = binder.attach(&());
        let set = binding.setter();
        let mut n = 0u64;
        b.iter(|| {
            n = n.wrapping_add(1);
            set.set(n);
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_reduce_set, bench_reduce_noop, bench_attach_detach, bench_setter_writes
}
criterion_main!(benches);
