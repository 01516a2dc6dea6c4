use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use seqevo_sim::model::gamma::{self, DEFAULT_TOLERANCE};
use seqevo_sim::model::SubstitutionModel;

fn bench_transition_probabilities(c: &mut Criterion) {
    let mut group = c.benchmark_group("transition_probabilities");
    let dna = SubstitutionModel::gtr4([1.0, 2.0, 0.5, 0.7, 3.0, 1.0], &[0.3, 0.2, 0.2, 0.3]).unwrap();
    let protein = SubstitutionModel::poisson().unwrap();

    group.bench_function("dna", |b| {
        b.iter(|| black_box(dna.transition_probabilities(black_box(0.1)).unwrap()))
    });
    group.bench_function("protein", |b| {
        b.iter(|| black_box(protein.transition_probabilities(black_box(0.1)).unwrap()))
    });

    group.finish();
}

fn bench_gamma_means(c: &mut Criterion) {
    let mut group = c.benchmark_group("gamma_means");

    for n in [4, 16] {
        group.bench_with_input(BenchmarkId::new("alpha_0.5", n), &n, |b, &n| {
            b.iter(|| black_box(gamma::get_means(n, black_box(0.5), DEFAULT_TOLERANCE).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_transition_probabilities, bench_gamma_means);
criterion_main!(benches);
