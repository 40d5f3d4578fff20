use criterion::{criterion_group, criterion_main, Criterion};
use moea::config::{AlgorithmConfig, OperatorConfig, PolicyConfig, ScheduleConfig, SurrogateConfig};
use moea::evaluators::SurrogateEvaluator;
use moea::interfaces::Silent;
use moea::optimizers::{Nsga2, Optimizer};
use moea::problems::Zdt1;
use moea::ranking::Ranking;
use moea::selection::environmental_selection;
use moea::solution::{Solution, SolutionSet};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn population(size: usize) -> SolutionSet {
    let mut rng = StdRng::seed_from_u64(7);
    (0..size)
        .map(|i| {
            let objectives = vec![rng.random::<f64>(), rng.random::<f64>()];
            Solution::with_objectives(vec![i as f64], objectives)
        })
        .collect()
}

fn 排序与选择(b: &mut Criterion) {
    let set = population(20_000);
    b.bench_function("排序与选择", |b| {
        b.iter(|| {
            let ranking = Ranking::new(set.clone()).unwrap();
            environmental_selection(ranking, 10_000).unwrap()
        })
    });
}

fn 代理评估(b: &mut Criterion) {
    let algorithm = AlgorithmConfig {
        population_size: 50,
        max_evaluations: 2_000,
        seed: Some(1),
    };
    let optimizer = Nsga2::new(&algorithm, &OperatorConfig::default());
    let config = SurrogateConfig::new(PolicyConfig::Schedule(ScheduleConfig::default()));
    b.bench_function("代理评估", |b| {
        b.iter(|| {
            let problem = Zdt1::new(30).unwrap();
            let mut evaluator = SurrogateEvaluator::new(problem, &config, 2_000, &Silent).unwrap();
            optimizer.optimize(&mut evaluator, &Silent).unwrap()
        })
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = 排序与选择, 代理评估
}
criterion_main!(benches);
