use moea::comparators::{Dominance, DominanceComparator};
use moea::config::{
    AlgorithmConfig, ClassificationConfig, Config, ModelSelectionConfig, OperatorConfig, PolicyConfig,
    ScheduleConfig, SurrogateConfig, TiePolicy, TournamentConfig,
};
use moea::distance::{crowding_distance_assignment, crowding_distances};
use moea::evaluators::{Evaluator, SurrogateEvaluator};
use moea::interfaces::command_line::CommandLine;
use moea::interfaces::{消息, Recorder, Silent};
use moea::io::{read_front, write_objectives, write_variables};
use moea::optimizers::{Nsga2, Optimizer};
use moea::problems::{from_config, Problem, Zdt1};
use moea::ranking::Ranking;
use moea::selection::environmental_selection;
use moea::solution::{EvaluationState, Solution, SolutionSet};
use moea::Error;
use proptest::prelude::*;
use std::cell::Cell;
use std::rc::Rc;

/// 两个目标都等于第一个变量，并记录真实评估的次数
#[derive(Clone, Default)]
struct Counting {
    calls: Rc<Cell<usize>>,
}

impl Problem for Counting {
    fn name(&self) -> &str {
        "counting"
    }

    fn number_of_variables(&self) -> usize {
        1
    }

    fn number_of_objectives(&self) -> usize {
        2
    }

    fn lower_bound(&self, _index: usize) -> f64 {
        0.0
    }

    fn upper_bound(&self, _index: usize) -> f64 {
        1.0
    }

    fn evaluate(&mut self, variables: &[f64]) -> Result<Vec<f64>, Error> {
        self.calls.set(self.calls.get() + 1);
        Ok(vec![variables[0], variables[0]])
    }
}

fn points(objectives: &[[f64; 2]]) -> SolutionSet {
    objectives
        .iter()
        .enumerate()
        .map(|(i, p)| Solution::with_objectives(vec![i as f64], p.to_vec()))
        .collect()
}

#[test]
fn single_front_scenario() {
    let set = points(&[[1.0, 4.0], [2.0, 3.0], [3.0, 2.0], [4.0, 1.0]]);
    let ranking = Ranking::new(set).unwrap();
    assert_eq!(ranking.number_of_subfronts(), 1);
    let mut front = ranking.subfront(0).unwrap().clone();
    assert_eq!(front.len(), 4);
    crowding_distance_assignment(&mut front, 2);
    assert!(front[0].crowding_distance.is_infinite());
    assert!(front[3].crowding_distance.is_infinite());
    assert!(front[1].crowding_distance.is_finite());
    assert_eq!(front[1].crowding_distance, front[2].crowding_distance);
}

fn schedule_evaluator(compute_counter: usize, problem: Counting) -> SurrogateEvaluator<'static, Counting> {
    let config = SurrogateConfig::new(PolicyConfig::Schedule(ScheduleConfig {
        initial_solutions: 5,
        compute_counter,
        ..Default::default()
    }));
    SurrogateEvaluator::new(problem, &config, 100, &Silent).unwrap()
}

#[test]
fn schedule_phases() {
    let problem = Counting::default();
    let calls = problem.calls.clone();
    let mut evaluator = schedule_evaluator(1000, problem);
    for n in 1..=100 {
        let mut solution = Solution::new(vec![(n % 10) as f64 / 10.0], 2);
        evaluator.evaluate(&mut solution).unwrap();
        match n {
            1..=5 => assert!(solution.is_real(), "第 {n} 次应当真实评估"),
            6..=89 => assert_eq!(solution.state(), EvaluationState::Estimated, "第 {n} 次应当估计"),
            _ => assert!(solution.is_real(), "第 {n} 次应当真实评估"),
        }
        if n == 5 {
            assert!(evaluator.surrogates().iter().all(|s| s.train_set().len() == 5));
        }
    }
    assert_eq!(calls.get(), 5 + 11);
    assert_eq!(evaluator.real_solutions().len(), 16);
}

#[test]
fn schedule_correction_rounds() {
    let mut evaluator = schedule_evaluator(10, Counting::default());
    let mut real = Vec::new();
    for n in 1..=100 {
        let mut solution = Solution::new(vec![(n % 7) as f64 / 7.0], 2);
        evaluator.evaluate(&mut solution).unwrap();
        if solution.is_real() {
            real.push(n);
        }
    }
    let mut expected: Vec<usize> = (1..=5).collect();
    expected.extend((15..90).step_by(10));
    expected.extend(90..=100);
    assert_eq!(real, expected);
}

fn tournament_scenario(max_evaluations: usize) {
    let config = SurrogateConfig::new(PolicyConfig::Tournament(TournamentConfig {
        train_set_size: 20,
        sample_interval: 10,
        on_tie: TiePolicy::Discard,
    }));
    let recorder = Recorder::default();
    let mut evaluator =
        SurrogateEvaluator::new(Counting::default(), &config, max_evaluations, &recorder).unwrap();
    let mut set: SolutionSet = (0..22)
        .map(|i| {
            let x = match i {
                0 => 0.0,
                10 => 1.0,
                20 => 0.2,
                21 => 0.8,
                _ => (i % 9) as f64 / 9.0,
            };
            Solution::new(vec![x], 2)
        })
        .collect();
    evaluator.evaluate_all(&mut set).unwrap();
    assert!(set.iter().take(20).all(Solution::is_real));
    assert!(evaluator.surrogates().iter().all(|s| s.train_set().len() == 2));
    assert_eq!(evaluator.evaluations(), 22);
    assert_eq!(evaluator.real_solutions().len(), 21);
    let last: Vec<EvaluationState> = set.iter().skip(20).map(Solution::state).collect();
    assert_eq!(last, vec![EvaluationState::Real, EvaluationState::Discarded]);
    assert_eq!(recorder.count(|m| matches!(m, 消息::PairSettled { real_evaluated: 1, .. })), 1);
    assert_eq!(recorder.count(|m| matches!(m, 消息::FinalPhase { .. })), 0);
}

#[test]
fn tournament_pairs_after_bootstrap() {
    tournament_scenario(1000);
}

#[test]
fn tournament_pairs_up_to_the_last_call() {
    // 最后一对落在预算的最后 10% 里，仍然只真实评估一个
    tournament_scenario(22);
}

#[test]
fn report_round_trip() {
    let directory = tempfile::tempdir().unwrap();
    let set = points(&[[0.1, 1.0 / 3.0], [1e-12, 2.5e7], [-0.0, 42.0]]);
    let path = directory.path().join("FUN");
    write_objectives(&set, &path).unwrap();
    let front = read_front(&path).unwrap();
    assert_eq!(front.len(), 3);
    for (read, written) in front.iter().zip(&set) {
        for (a, b) in read.iter().zip(written.objectives()) {
            assert!((a - b).abs() < 1e-9);
        }
    }
    let variables = directory.path().join("VAR");
    write_variables(&set, &variables).unwrap();
    assert_eq!(read_front(&variables).unwrap(), vec![vec![0.0], vec![1.0], vec![2.0]]);
}

#[test]
fn configured_run_writes_reports() {
    let config: Config = serde_yaml::from_str(
        r#"
problem: { name: zdt1, variables: 6 }
algorithm: { population_size: 16, max_evaluations: 320, seed: 5 }
surrogate:
  method: schedule
  compute_counter: 8
  correction: best
"#,
    )
    .unwrap();
    config.validate().unwrap();
    let directory = tempfile::tempdir().unwrap();
    let cli = CommandLine::new(Some(directory.path().to_path_buf()), false).unwrap();
    let problem = from_config(&config.problem).unwrap();
    let surrogate = config.surrogate.as_ref().unwrap();
    let mut evaluator = SurrogateEvaluator::new(problem, surrogate, 320, &cli).unwrap();
    let result = Nsga2::new(&config.algorithm, &config.operators)
        .optimize(&mut evaluator, &cli)
        .unwrap();
    assert_eq!(result.evaluations, 320);
    assert!(result.real_evaluations < 320);
    cli.write_reports(&result).unwrap();
    let fun = read_front(&directory.path().join("FUN")).unwrap();
    assert_eq!(fun.len(), result.population.len());
    let rank0 = read_front(&directory.path().join("RANK0")).unwrap();
    assert!(!rank0.is_empty());
    for a in &rank0 {
        for b in &rank0 {
            assert_eq!(DominanceComparator::compare_objectives(a, b), Dominance::Incomparable);
        }
    }
}

#[test]
fn every_policy_drives_nsga2() {
    let algorithm = AlgorithmConfig {
        population_size: 16,
        max_evaluations: 320,
        seed: Some(3),
    };
    let nsga2 = Nsga2::new(&algorithm, &OperatorConfig::default());
    let policies = [
        PolicyConfig::Schedule(ScheduleConfig::default()),
        PolicyConfig::ModelSelection(ModelSelectionConfig::default()),
        PolicyConfig::Tournament(TournamentConfig::default()),
        PolicyConfig::Classification(ClassificationConfig::default()),
    ];
    for policy in policies {
        let pairwise = matches!(
            policy,
            PolicyConfig::Tournament(_) | PolicyConfig::Classification(_)
        );
        let recorder = Recorder::default();
        let config = SurrogateConfig::new(policy);
        let mut evaluator = SurrogateEvaluator::new(Zdt1::new(6).unwrap(), &config, 320, &recorder).unwrap();
        let result = nsga2.optimize(&mut evaluator, &recorder).unwrap();
        assert_eq!(result.evaluations, 320);
        assert!(result.real_evaluations < 320);
        assert_eq!(result.real_solutions.len(), result.real_evaluations);
        // 成对策略没有最后阶段
        let final_phases = if pairwise { 0 } else { 1 };
        assert_eq!(recorder.count(|m| matches!(m, 消息::FinalPhase { .. })), final_phases);
        assert_eq!(recorder.count(|m| matches!(m, 消息::Finished { .. })), 1);
    }
}

proptest! {
    #[test]
    fn selection_keeps_most_spread_members(
        objectives in prop::collection::vec(prop::collection::vec(0.0..10.0f64, 2), 2..40),
        fraction in 0.1..1.0f64,
    ) {
        let set: SolutionSet = objectives
            .iter()
            .enumerate()
            .map(|(i, o)| Solution::with_objectives(vec![i as f64], o.clone()))
            .collect();
        let size = ((objectives.len() as f64 * fraction).ceil() as usize).max(1);
        let fronts = Ranking::fronts_of(set.as_slice()).unwrap();
        let selected = environmental_selection(Ranking::new(set.clone()).unwrap(), size).unwrap();
        prop_assert_eq!(selected.len(), size);
        let kept: Vec<usize> = selected.iter().map(|s| s.variables()[0] as usize).collect();
        // 找到被截断的那一层
        let mut accepted = 0;
        for front in &fronts {
            if accepted + front.len() <= size {
                prop_assert!(front.iter().all(|i| kept.contains(i)));
                accepted += front.len();
                continue;
            }
            let members: Vec<Solution> = front.iter().map(|i| set[*i].clone()).collect();
            let distances = crowding_distances(&members, 2);
            let kept_min = front
                .iter()
                .zip(&distances)
                .filter(|(i, _)| kept.contains(i))
                .map(|(_, d)| *d)
                .fold(f64::INFINITY, f64::min);
            let dropped_max = front
                .iter()
                .zip(&distances)
                .filter(|(i, _)| !kept.contains(i))
                .map(|(_, d)| *d)
                .fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(kept_min >= dropped_max);
            break;
        }
    }
}
