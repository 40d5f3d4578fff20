//! 代理模型：训练集、回归器和成对分类器
//!
//! 每个目标各有一个 [`Surrogate`]，它持有一张训练表、一个线性回归模型和一个神经网络模型。训练表只增不减，
//! 直到被显式清空。模型在预测前按需在整张表上重新训练；表没有变化时沿用上次训练的结果，因为训练是确定性的，
//! 两者的输出完全相同。

use crate::comparators::Dominance;
use crate::solution::{Solution, SolutionSet};
use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod classifier;
pub mod linear;
pub mod neural;

pub use classifier::PairwiseClassifier;
pub use linear::LinearRegression;
pub use neural::{NetworkConfig, NeuralNetwork};

/// 训练模型至少需要的样本数
pub const MIN_TRAINING_ROWS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Linear,
    Neural,
}

impl Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelKind::Linear => f.write_str("线性回归"),
            ModelKind::Neural => f.write_str("神经网络"),
        }
    }
}

pub trait Regressor {
    fn fit(&mut self, train_set: &TrainSet) -> Result<(), Error>;
    fn predict(&self, features: &[f64]) -> Result<f64, Error>;
}

pub trait Classifier {
    fn fit(&mut self, train_set: &ClassifyingTrainSet) -> Result<(), Error>;
    /// 按 [`Dominance::LABELS`] 的顺序给出三个标签的概率
    fn distribution(&self, features: &[f64]) -> Result<[f64; 3], Error>;
}

fn check_width(width: &mut Option<usize>, found: usize) -> Result<(), Error> {
    match *width {
        None => {
            *width = Some(found);
            Ok(())
        }
        Some(expected) if expected != found => Err(Error::DimensionMismatch { expected, found }),
        Some(_) => Ok(()),
    }
}

/// 回归训练表：每行是决策变量和一个目标值
#[derive(Debug, Clone, Default)]
pub struct TrainSet {
    width: Option<usize>,
    features: Vec<Vec<f64>>,
    targets: Vec<f64>,
    revision: u64,
}

impl TrainSet {
    /// 第一行确定特征个数
    pub fn push(&mut self, features: &[f64], target: f64) -> Result<(), Error> {
        check_width(&mut self.width, features.len())?;
        self.features.push(features.to_vec());
        self.targets.push(target);
        self.revision += 1;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.width = None;
        self.features.clear();
        self.targets.clear();
        self.revision += 1;
    }

    pub fn width(&self) -> Option<usize> {
        self.width
    }

    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// 每次修改都会变化，用来判断模型是否需要重新训练
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// 分类训练表：每行是两个解拼接起来的决策变量和它们的支配关系
#[derive(Debug, Clone, Default)]
pub struct ClassifyingTrainSet {
    width: Option<usize>,
    features: Vec<Vec<f64>>,
    labels: Vec<Dominance>,
    revision: u64,
}

impl ClassifyingTrainSet {
    pub fn push(&mut self, features: Vec<f64>, label: Dominance) -> Result<(), Error> {
        check_width(&mut self.width, features.len())?;
        self.features.push(features);
        self.labels.push(label);
        self.revision += 1;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.width = None;
        self.features.clear();
        self.labels.clear();
        self.revision += 1;
    }

    pub fn width(&self) -> Option<usize> {
        self.width
    }

    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    pub fn labels(&self) -> &[Dominance] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// 单个目标的代理模型
#[derive(Debug, Clone)]
pub struct Surrogate {
    train_set: TrainSet,
    linear: LinearRegression,
    neural: NeuralNetwork,
    // 两个模型各自最近一次训练时训练表的版本
    linear_revision: Option<u64>,
    neural_revision: Option<u64>,
    references: SolutionSet,
}

impl Surrogate {
    pub fn new(network: NetworkConfig) -> Self {
        Self {
            train_set: TrainSet::default(),
            linear: LinearRegression::default(),
            neural: NeuralNetwork::regressor(network),
            linear_revision: None,
            neural_revision: None,
            references: SolutionSet::default(),
        }
    }

    /// 把解的决策变量和第 `objective` 个目标值加入训练表
    pub fn fill_train_set(&mut self, objective: usize, solution: &Solution) -> Result<(), Error> {
        if objective >= solution.number_of_objectives() {
            return Err(Error::DimensionMismatch {
                expected: objective + 1,
                found: solution.number_of_objectives(),
            });
        }
        self.train_set
            .push(solution.variables(), solution.objective(objective))
    }

    /// 用指定的模型估计一个解的目标值
    pub fn predict(&mut self, kind: ModelKind, solution: &Solution) -> Result<f64, Error> {
        let rows = self.train_set.len();
        if rows < MIN_TRAINING_ROWS {
            return Err(Error::NotTrained {
                rows,
                required: MIN_TRAINING_ROWS,
            });
        }
        let revision = Some(self.train_set.revision());
        match kind {
            ModelKind::Linear => {
                if self.linear_revision != revision {
                    self.linear.fit(&self.train_set)?;
                    self.linear_revision = revision;
                }
                self.linear.predict(solution.variables())
            }
            ModelKind::Neural => {
                if self.neural_revision != revision {
                    Regressor::fit(&mut self.neural, &self.train_set)?;
                    self.neural_revision = revision;
                }
                self.neural.predict(solution.variables())
            }
        }
    }

    pub fn train_set(&self) -> &TrainSet {
        &self.train_set
    }

    pub fn empty_train_set(&mut self) {
        self.train_set.clear();
    }

    /// 参考样本用于比较不同模型的误差
    pub fn add_reference(&mut self, solution: Solution) -> Result<(), Error> {
        self.references.push(solution)
    }

    pub fn references(&self) -> &SolutionSet {
        &self.references
    }

    pub fn empty_reference_archive(&mut self) {
        self.references.clear();
    }

    /// 模型在参考样本上的误差平方和
    pub fn reference_error(&mut self, kind: ModelKind, objective: usize) -> Result<f64, Error> {
        let references = std::mem::take(&mut self.references);
        let mut error = 0.0;
        let mut result = Ok(());
        for reference in &references {
            match self.predict(kind, reference) {
                Ok(estimate) => error += (reference.objective(objective) - estimate).powi(2),
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }
        self.references = references;
        result.map(|_| error)
    }
}
