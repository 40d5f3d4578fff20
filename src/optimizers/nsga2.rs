//! NSGA-II
//!
//! 每一代由二元锦标赛选出父代，经交叉和变异产生子代，交给评估器评估。未被评估的子代（被成对策略放弃的）不进入下一代。
//! 父代和子代合并后分层，按层和拥挤距离选出下一代。

use super::{OptimizationResult, Optimizer};
use crate::config::{AlgorithmConfig, OperatorConfig};
use crate::evaluators::Evaluator;
use crate::interfaces::{界面, 消息};
use crate::operators::{BinaryTournament, Crossover, Mutation, PolynomialMutation, SbxCrossover, Selection};
use crate::problems::random_solution;
use crate::ranking::Ranking;
use crate::selection::environmental_selection;
use crate::solution::{Solution, SolutionSet};
use crate::Error;
use rand::rngs::StdRng;
use rand::SeedableRng;
use web_time::Instant;

#[derive(Debug, Clone)]
pub struct Nsga2 {
    pub population_size: usize,
    pub max_evaluations: usize,
    pub seed: u64,
    pub crossover: SbxCrossover,
    pub mutation: PolynomialMutation,
    pub selection: BinaryTournament,
}

impl Nsga2 {
    pub fn new(algorithm: &AlgorithmConfig, operators: &OperatorConfig) -> Self {
        Self {
            population_size: algorithm.population_size,
            max_evaluations: algorithm.max_evaluations,
            seed: algorithm.seed.unwrap_or_else(rand::random),
            crossover: SbxCrossover {
                probability: operators.crossover_probability,
                distribution_index: operators.crossover_distribution_index,
            },
            mutation: PolynomialMutation {
                probability: operators.mutation_probability,
                distribution_index: operators.mutation_distribution_index,
            },
            selection: BinaryTournament,
        }
    }

    /// 分层并选出下一代；候选解不足时全部保留
    fn survive(&self, candidates: SolutionSet) -> Result<SolutionSet, Error> {
        let ranking = Ranking::new(candidates)?;
        let size = self.population_size.min(ranking.len());
        environmental_selection(ranking, size)
    }

    fn offspring<E: Evaluator>(
        &self,
        population: &SolutionSet,
        evaluator: &E,
        count: usize,
        rng: &mut StdRng,
    ) -> Result<SolutionSet, Error> {
        let problem = evaluator.problem();
        let mut offspring = SolutionSet::new(count);
        while offspring.len() < count {
            let (Some(a), Some(b)) = (
                self.selection.execute(population, rng),
                self.selection.execute(population, rng),
            ) else {
                return Err(Error::Underflow {
                    requested: 1,
                    available: 0,
                });
            };
            let children = self.crossover.execute([a, b], problem, rng);
            for mut child in children {
                if offspring.len() == count {
                    break;
                }
                self.mutation.execute(&mut child, problem, rng);
                offspring.push(child)?;
            }
        }
        Ok(offspring)
    }
}

impl Optimizer for Nsga2 {
    fn optimize<E: Evaluator>(&self, evaluator: &mut E, interface: &dyn 界面) -> Result<OptimizationResult, Error> {
        let started = Instant::now();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut population: SolutionSet = (0..self.population_size)
            .map(|_| random_solution(evaluator.problem(), &mut rng))
            .collect();
        evaluator.evaluate_all(&mut population)?;
        population.retain(Solution::is_evaluated);
        let mut population = self.survive(population)?;
        let mut generation = 0;
        while evaluator.evaluations() < self.max_evaluations {
            let remaining = self.max_evaluations - evaluator.evaluations();
            let count = self.population_size.min(remaining);
            let mut offspring = self.offspring(&population, evaluator, count, &mut rng)?;
            evaluator.evaluate_all(&mut offspring)?;
            offspring.retain(Solution::is_evaluated);
            for child in offspring {
                population.push(child)?;
            }
            population = self.survive(population)?;
            generation += 1;
            let front_size = population.iter().filter(|s| s.rank == 0).count();
            interface.发送(消息::Progress {
                generation,
                evaluations: evaluator.evaluations(),
                real_evaluations: evaluator.real_evaluations(),
                front_size,
            });
        }
        interface.发送(消息::Finished {
            evaluations: evaluator.evaluations(),
            real_evaluations: evaluator.real_evaluations(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        });
        Ok(OptimizationResult {
            population,
            real_solutions: evaluator.real_solutions().clone(),
            generations: generation,
            evaluations: evaluator.evaluations(),
            real_evaluations: evaluator.real_evaluations(),
        })
    }
}
