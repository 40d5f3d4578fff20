//! 遗传算子接口，以及实数编码的默认实现
//!

use crate::problems::Problem;
use crate::solution::{Solution, SolutionSet};
use rand::Rng;

pub mod default;

pub use default::{BinaryTournament, PolynomialMutation, SbxCrossover};

pub trait Crossover {
    /// 由两个父代产生两个未评估的子代
    fn execute<R: Rng + ?Sized>(
        &self,
        parents: [&Solution; 2],
        problem: &dyn Problem,
        rng: &mut R,
    ) -> [Solution; 2];
}

pub trait Mutation {
    fn execute<R: Rng + ?Sized>(&self, solution: &mut Solution, problem: &dyn Problem, rng: &mut R);
}

pub trait Selection {
    fn execute<'a, R: Rng + ?Sized>(&self, population: &'a SolutionSet, rng: &mut R) -> Option<&'a Solution>;
}
