//! 优化方法接口，以及 NSGA-II 的实现
//!

use crate::evaluators::Evaluator;
use crate::interfaces::界面;
use crate::solution::SolutionSet;
use crate::Error;

pub mod nsga2;

pub use nsga2::Nsga2;

/// 一次优化的结果
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// 最后一代种群
    pub population: SolutionSet,
    /// 所有真实评估过的解
    pub real_solutions: SolutionSet,
    pub generations: usize,
    pub evaluations: usize,
    pub real_evaluations: usize,
}

pub trait Optimizer {
    fn optimize<E: Evaluator>(&self, evaluator: &mut E, interface: &dyn 界面) -> Result<OptimizationResult, Error>;
}
