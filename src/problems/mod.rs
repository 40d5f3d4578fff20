//! 优化问题的定义
//!
//! 问题只负责给出变量的取值范围和计算目标值、约束，评估状态和预算由评估器管理。

use crate::config::ProblemConfig;
use crate::solution::{EvaluationState, Solution};
use crate::Error;
use rand::Rng;

pub mod kursawe;
pub mod srinivas;
pub mod zdt;

pub use kursawe::Kursawe;
pub use srinivas::Srinivas;
pub use zdt::{Zdt1, Zdt2};

pub trait Problem {
    fn name(&self) -> &str;

    fn number_of_variables(&self) -> usize;

    fn number_of_objectives(&self) -> usize;

    fn number_of_constraints(&self) -> usize {
        0
    }

    fn lower_bound(&self, index: usize) -> f64;

    fn upper_bound(&self, index: usize) -> f64;

    /// 计算目标值，这是需要节省的昂贵操作
    fn evaluate(&mut self, variables: &[f64]) -> Result<Vec<f64>, Error>;

    /// 返回约束违反量之和与被违反的约束个数
    fn evaluate_constraints(&mut self, _variables: &[f64]) -> Result<(f64, usize), Error> {
        Ok((0.0, 0))
    }
}

impl<P: Problem + ?Sized> Problem for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn number_of_variables(&self) -> usize {
        (**self).number_of_variables()
    }

    fn number_of_objectives(&self) -> usize {
        (**self).number_of_objectives()
    }

    fn number_of_constraints(&self) -> usize {
        (**self).number_of_constraints()
    }

    fn lower_bound(&self, index: usize) -> f64 {
        (**self).lower_bound(index)
    }

    fn upper_bound(&self, index: usize) -> f64 {
        (**self).upper_bound(index)
    }

    fn evaluate(&mut self, variables: &[f64]) -> Result<Vec<f64>, Error> {
        (**self).evaluate(variables)
    }

    fn evaluate_constraints(&mut self, variables: &[f64]) -> Result<(f64, usize), Error> {
        (**self).evaluate_constraints(variables)
    }
}

/// 用真实问题评估一个解，写入目标值和约束违反量，并标记为真实评估
pub fn evaluate_real<P: Problem + ?Sized>(problem: &mut P, solution: &mut Solution) -> Result<(), Error> {
    let objectives = problem.evaluate(solution.variables())?;
    if objectives.len() != solution.number_of_objectives() {
        return Err(Error::DimensionMismatch {
            expected: solution.number_of_objectives(),
            found: objectives.len(),
        });
    }
    for (index, value) in objectives.into_iter().enumerate() {
        solution.set_objective(index, value);
    }
    if problem.number_of_constraints() > 0 {
        let (violation, violated) = problem.evaluate_constraints(solution.variables())?;
        solution.set_constraint_violation(violation, violated);
    }
    solution.mark(EvaluationState::Real);
    Ok(())
}

/// 在取值范围内均匀随机生成一个未评估的解
pub fn random_solution<P, R>(problem: &P, rng: &mut R) -> Solution
where
    P: Problem + ?Sized,
    R: Rng + ?Sized,
{
    let variables = (0..problem.number_of_variables())
        .map(|i| {
            let (low, high) = (problem.lower_bound(i), problem.upper_bound(i));
            low + rng.random::<f64>() * (high - low)
        })
        .collect();
    Solution::new(variables, problem.number_of_objectives())
}

/// 按名称构造内置的测试问题
pub fn from_config(config: &ProblemConfig) -> Result<Box<dyn Problem>, Error> {
    let problem: Box<dyn Problem> = match config.name.to_lowercase().as_str() {
        "zdt1" => Box::new(Zdt1::new(config.variables.unwrap_or(30))?),
        "zdt2" => Box::new(Zdt2::new(config.variables.unwrap_or(30))?),
        "kursawe" => Box::new(Kursawe::new(config.variables.unwrap_or(3))?),
        "srinivas" => Box::new(Srinivas),
        other => return Err(Error::InvalidConfig(format!("未知的问题：{other}"))),
    };
    Ok(problem)
}

/// 约束 g(x) ≥ 0 的违反量之和与违反个数
pub(crate) fn violations(constraints: &[f64]) -> (f64, usize) {
    constraints
        .iter()
        .filter(|g| **g < 0.0)
        .fold((0.0, 0), |(total, count), g| (total + g, count + 1))
}
