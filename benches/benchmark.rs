use criterion::{black_box, criterion_group, criterion_main, Criterion};
use meshsim::{euclidean, ConnectivityIndex, Point, PointCluster, Simulation, SimulationConfig};
use rand::{rngs::StdRng, Rng, SeedableRng};

const SEED: u64 = 0;
const N: usize = 2000;
const RANGE: f64 = 0.2;

fn build(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("build");
    group.sample_size(10);

    let points = dataset();
    group.bench_function("kdtree", |b| {
        b.iter(|| {
            let mut index = ConnectivityIndex::default();
            index.rebuild(black_box(&points));
            index
        });
    });
}

fn pairs(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("pairs_within");
    group.sample_size(10);

    let points = dataset();
    let mut index = ConnectivityIndex::default();
    index.rebuild(&points);
    group.bench_function("kdtree", |b| {
        b.iter(|| index.pairs_within(black_box(RANGE)));
    });
    group.bench_function("list", |b| {
        b.iter(|| pairs_list(&points, black_box(RANGE)));
    });
}

fn meteor_shower(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("meteor_shower");
    group.sample_size(10);

    group.bench_function("simulation", |b| {
        b.iter(|| {
            let mut sim = Simulation::new(SimulationConfig::seeded(SEED)).expect("valid config");
            sim.scatter(N, [0.0, 0.0], 1.0).expect("valid scatter");
            for _ in 0..10 {
                sim.meteors(0.5, 10).expect("valid meteors");
                sim.make_graph(RANGE).expect("valid range");
            }
            sim.num_connected()
        });
    });
}

criterion_group!(benches, build, pairs, meteor_shower);
criterion_main!(benches);

fn pairs_list(points: &[Point], radius: f64) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for i in 0..points.len() {
        for j in i + 1..points.len() {
            if euclidean(&points[i], &points[j]) <= radius {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

fn dataset() -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(SEED);
    let mut cluster = PointCluster::new();
    for _ in 0..4 {
        let center = [rng.gen_range(-2.0..2.0), rng.gen_range(-2.0..2.0)];
        cluster
            .append_cluster(N / 4, center, 1.0, &mut rng)
            .expect("valid cluster");
    }
    cluster.positions().to_vec()
}
