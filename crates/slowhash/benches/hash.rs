use criterion::{black_box, criterion_group, criterion_main, Criterion};
use slowhash::kernels;
use slowhash::{HashContext, Params, Variant};

fn bench_classic(c: &mut Criterion) {
  let mut group = c.benchmark_group("slowhash/classic");
  group.sample_size(10);

  let input = [0x4du8; 76];
  for (name, variant) in [("v0", Variant::V0), ("v1", Variant::V1), ("v2", Variant::V2)] {
    let mut ctx = HashContext::new(Params::classic(variant)).unwrap();
    group.bench_function(name, |b| b.iter(|| ctx.hash(black_box(&input)).unwrap()));
  }
  group.finish();
}

fn bench_kernels(c: &mut Criterion) {
  let mut group = c.benchmark_group("slowhash/kernels");
  group.sample_size(10);

  let input = [0x4du8; 76];
  let caps = platform::caps();
  for &id in kernels::ALL {
    if !caps.has(id.required_caps()) {
      continue;
    }
    let mut ctx = HashContext::with_kernel(Params::classic(Variant::V2), id).unwrap();
    group.bench_function(id.as_str(), |b| b.iter(|| ctx.hash(black_box(&input)).unwrap()));
  }
  group.finish();
}

fn bench_lite(c: &mut Criterion) {
  let mut group = c.benchmark_group("slowhash/lite");
  group.sample_size(20);

  let input = [0x4du8; 76];
  let mut ctx = HashContext::new(Params::lite(Variant::V1)).unwrap();
  group.bench_function("v1", |b| b.iter(|| ctx.hash(black_box(&input)).unwrap()));
  group.finish();
}

// Scratchpad setup cost, the reason contexts cache their buffer.
fn bench_context_setup(c: &mut Criterion) {
  let mut group = c.benchmark_group("slowhash/setup");
  group.sample_size(20);

  group.bench_function("fresh-context", |b| {
    b.iter(|| {
      let mut params = Params::classic(Variant::V0);
      params.iteration_count = 2;
      let mut ctx = HashContext::new(params).unwrap();
      ctx.hash(black_box(b"setup")).unwrap()
    })
  });
  group.finish();
}

criterion_group!(benches, bench_classic, bench_kernels, bench_lite, bench_context_setup);
criterion_main!(benches);
