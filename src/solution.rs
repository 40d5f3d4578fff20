//! 解与解集
//!
//! 一个解由决策变量、目标值和约束违反量组成。目标值只有在评估之后才有意义，因此每个解都带有一个显式的评估状态：
//! 构造出来的解处于「未评估」状态，由真实问题或者代理模型写入目标值之后才进入「已评估」状态。

use crate::comparators::{Dominance, DominanceComparator};
use crate::Error;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// 解的评估状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationState {
    /// 刚构造出来，或者决策变量被修改过
    Unevaluated,
    /// 目标值来自代理模型的估计
    Estimated,
    /// 目标值来自真实问题
    Real,
    /// 成对比较时被判定为不值得真实评估
    Discarded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    variables: Vec<f64>,
    objectives: Vec<f64>,
    constraint_violation: f64,
    violated_constraints: usize,
    state: EvaluationState,
    pub rank: usize,
    pub crowding_distance: f64,
}

impl Solution {
    pub fn new(variables: Vec<f64>, number_of_objectives: usize) -> Self {
        Self {
            variables,
            objectives: vec![0.0; number_of_objectives],
            constraint_violation: 0.0,
            violated_constraints: 0,
            state: EvaluationState::Unevaluated,
            rank: 0,
            crowding_distance: 0.0,
        }
    }

    /// 直接用已知的目标值构造一个解，常用于读取前沿文件
    pub fn with_objectives(variables: Vec<f64>, objectives: Vec<f64>) -> Self {
        Self {
            variables,
            objectives,
            constraint_violation: 0.0,
            violated_constraints: 0,
            state: EvaluationState::Real,
            rank: 0,
            crowding_distance: 0.0,
        }
    }

    pub fn variables(&self) -> &[f64] {
        &self.variables
    }

    /// 修改决策变量之后，原有的目标值不再有效
    pub fn variables_mut(&mut self) -> &mut Vec<f64> {
        self.state = EvaluationState::Unevaluated;
        &mut self.variables
    }

    pub fn number_of_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn objectives(&self) -> &[f64] {
        &self.objectives
    }

    pub fn number_of_objectives(&self) -> usize {
        self.objectives.len()
    }

    pub fn objective(&self, index: usize) -> f64 {
        self.objectives[index]
    }

    pub fn set_objective(&mut self, index: usize, value: f64) {
        self.objectives[index] = value;
    }

    pub fn constraint_violation(&self) -> f64 {
        self.constraint_violation
    }

    pub fn violated_constraints(&self) -> usize {
        self.violated_constraints
    }

    /// 记录约束违反情况，`violation` 取违反量的绝对值之和
    pub fn set_constraint_violation(&mut self, violation: f64, violated: usize) {
        self.constraint_violation = violation.abs();
        self.violated_constraints = violated;
    }

    pub fn is_feasible(&self) -> bool {
        self.violated_constraints == 0 && self.constraint_violation == 0.0
    }

    pub fn state(&self) -> EvaluationState {
        self.state
    }

    pub fn mark(&mut self, state: EvaluationState) {
        self.state = state;
    }

    pub fn is_evaluated(&self) -> bool {
        matches!(
            self.state,
            EvaluationState::Estimated | EvaluationState::Real
        )
    }

    pub fn is_real(&self) -> bool {
        self.state == EvaluationState::Real
    }

    pub fn is_discarded(&self) -> bool {
        self.state == EvaluationState::Discarded
    }
}

/// 有序、可按序号访问的解集，容量只是一个提示
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolutionSet {
    solutions: Vec<Solution>,
    capacity: usize,
}

impl SolutionSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            solutions: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 加入一个解；目标向量的长度必须和已有成员一致
    pub fn push(&mut self, solution: Solution) -> Result<(), Error> {
        if let Some(first) = self.solutions.first() {
            if first.number_of_objectives() != solution.number_of_objectives() {
                return Err(Error::DimensionMismatch {
                    expected: first.number_of_objectives(),
                    found: solution.number_of_objectives(),
                });
            }
        }
        self.solutions.push(solution);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Solution> {
        self.solutions.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Solution> {
        self.solutions.get_mut(index)
    }

    pub fn remove(&mut self, index: usize) -> Solution {
        self.solutions.remove(index)
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    pub fn clear(&mut self) {
        self.solutions.clear();
    }

    /// 两个解集的并，不去重
    pub fn union(&self, other: &SolutionSet) -> Result<SolutionSet, Error> {
        let mut union = SolutionSet::new(self.len() + other.len());
        for solution in self.iter().chain(other.iter()) {
            union.push(solution.clone())?;
        }
        Ok(union)
    }

    /// 按支配关系找出最好的一个解，并列时取最先出现的
    pub fn best(&self, comparator: &DominanceComparator) -> Result<Option<&Solution>, Error> {
        Ok(self
            .best_index(comparator)?
            .map(|index| &self.solutions[index]))
    }

    pub fn best_index(&self, comparator: &DominanceComparator) -> Result<Option<usize>, Error> {
        let mut best: Option<usize> = None;
        for (index, solution) in self.solutions.iter().enumerate() {
            best = match best {
                None => Some(index),
                Some(current) => match comparator.compare(solution, &self.solutions[current])? {
                    Dominance::ADominates => Some(index),
                    _ => Some(current),
                },
            };
        }
        Ok(best)
    }

    pub fn retain<F: FnMut(&Solution) -> bool>(&mut self, predicate: F) {
        self.solutions.retain(predicate);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Solution> {
        self.solutions.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Solution> {
        self.solutions.iter_mut()
    }

    pub fn as_slice(&self) -> &[Solution] {
        &self.solutions
    }

    pub fn as_mut_slice(&mut self) -> &mut [Solution] {
        &mut self.solutions
    }

    pub fn into_vec(self) -> Vec<Solution> {
        self.solutions
    }

    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&Solution, &Solution) -> std::cmp::Ordering,
    {
        self.solutions.sort_by(compare);
    }

    pub fn truncate(&mut self, length: usize) {
        self.solutions.truncate(length);
    }
}

impl From<Vec<Solution>> for SolutionSet {
    fn from(solutions: Vec<Solution>) -> Self {
        let capacity = solutions.len();
        Self {
            solutions,
            capacity,
        }
    }
}

impl FromIterator<Solution> for SolutionSet {
    fn from_iter<T: IntoIterator<Item = Solution>>(iter: T) -> Self {
        SolutionSet::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl IntoIterator for SolutionSet {
    type Item = Solution;
    type IntoIter = std::vec::IntoIter<Solution>;

    fn into_iter(self) -> Self::IntoIter {
        self.solutions.into_iter()
    }
}

impl<'a> IntoIterator for &'a SolutionSet {
    type Item = &'a Solution;
    type IntoIter = std::slice::Iter<'a, Solution>;

    fn into_iter(self) -> Self::IntoIter {
        self.solutions.iter()
    }
}

impl Index<usize> for SolutionSet {
    type Output = Solution;

    fn index(&self, index: usize) -> &Self::Output {
        &self.solutions[index]
    }
}

impl IndexMut<usize> for SolutionSet {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.solutions[index]
    }
}
