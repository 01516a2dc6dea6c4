use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use seqevo_sim::model::{PhyloModel, SubstitutionModel};
use seqevo_sim::model::gamma::DEFAULT_TOLERANCE;
use seqevo_sim::simulation::{SimulationBuilder, TreeSampler};
use seqevo_sim::tree::{Node, Tree};

/// Balanced binary tree with `2^depth` leaves and equal branch lengths.
fn balanced(depth: usize, next_leaf: &mut usize) -> Tree<Node> {
    if depth == 0 {
        *next_leaf += 1;
        return Tree::leaf(Node::new(format!("t{next_leaf}"), 0.05));
    }
    let left = balanced(depth - 1, next_leaf);
    let right = balanced(depth - 1, next_leaf);
    Tree::node(Node::new("", 0.05), vec![left, right])
}

fn gamma_hky() -> PhyloModel {
    let model: PhyloModel = SubstitutionModel::hky(2.0, &[0.1, 0.2, 0.3, 0.4]).unwrap().into();
    model.expand_gamma(4, 0.5, DEFAULT_TOLERANCE).unwrap()
}

fn bench_sampler_setup(c: &mut Criterion) {
    let mut group = c.benchmark_group("sampler_setup");
    let model = gamma_hky();

    for depth in [3, 6] {
        let tree = balanced(depth, &mut 0);
        group.bench_with_input(BenchmarkId::new("gamma4_hky", 1 << depth), &tree, |b, tree| {
            b.iter(|| black_box(TreeSampler::new(&model, tree).unwrap()))
        });
    }

    group.finish();
}

fn bench_simulate_sites(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulate_sites");
    let sites = 1000;
    let sampler = TreeSampler::new(&gamma_hky(), &balanced(5, &mut 0)).unwrap();

    group.throughput(Throughput::Elements(sites as u64));
    group.bench_function("single_thread", |b| {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
        b.iter(|| black_box(sampler.simulate_sites(black_box(sites), &mut rng)))
    });

    group.finish();
}

fn bench_simulation_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation_run");
    let sites = 10_000;
    let tree = balanced(5, &mut 0);
    let model = gamma_hky();

    group.throughput(Throughput::Elements(sites as u64));
    for chunks in [1, 4, 16] {
        group.bench_with_input(BenchmarkId::new("chunks", chunks), &chunks, |b, &chunks| {
            b.iter_batched(
                || {
                    SimulationBuilder::new()
                        .model(model.clone())
                        .tree(tree.clone())
                        .sites(sites)
                        .seed(vec![42])
                        .chunks(chunks)
                        .build()
                        .unwrap()
                },
                |sim| black_box(sim.run().unwrap()),
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sampler_setup, bench_simulate_sites, bench_simulation_run);
criterion_main!(benches);
