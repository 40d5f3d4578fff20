//! 配置文件的定义
//!
//! 配置文件使用 YAML 格式。没有 `surrogate` 一节时，所有解都用真实问题评估。

use crate::surrogates::{ModelKind, NetworkConfig, MIN_TRAINING_ROWS};
use crate::Error;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fs::read_to_string;
use std::path::Path;

#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Info {
    pub name: Option<String>,
    pub version: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemConfig {
    pub name: String,
    pub variables: Option<usize>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlgorithmConfig {
    pub population_size: usize,
    pub max_evaluations: usize,
    pub seed: Option<u64>,
}

impl Default for AlgorithmConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_evaluations: 25000,
            seed: None,
        }
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorConfig {
    pub crossover_probability: f64,
    pub crossover_distribution_index: f64,
    /// 缺省时为 1 / 变量个数
    pub mutation_probability: Option<f64>,
    pub mutation_distribution_index: f64,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            crossover_probability: 0.9,
            crossover_distribution_index: 20.0,
            mutation_probability: None,
            mutation_distribution_index: 20.0,
        }
    }
}

/// 校正轮中哪些解要真实评估
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionSample {
    /// 本轮最后一个解
    Last,
    /// 按估计值最好的解
    Best,
    /// 每隔 100 / p 个解取一个
    Percent(f64),
}

/// 成对比较中两个解互不支配时的处理
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TiePolicy {
    #[default]
    Discard,
    EvaluateBoth,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub initial_solutions: usize,
    pub compute_counter: usize,
    pub epsilon: f64,
    pub model: ModelKind,
    pub correction: CorrectionSample,
    pub time_budget_minutes: Option<f64>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            initial_solutions: 5,
            compute_counter: 20,
            epsilon: 0.5,
            model: ModelKind::Linear,
            correction: CorrectionSample::Last,
            time_budget_minutes: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSelectionConfig {
    pub real_init_counter: usize,
    pub model_init_counter: usize,
}

impl Default for ModelSelectionConfig {
    fn default() -> Self {
        Self {
            real_init_counter: 5,
            model_init_counter: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentConfig {
    pub train_set_size: usize,
    pub sample_interval: usize,
    pub on_tie: TiePolicy,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            train_set_size: 50,
            sample_interval: 10,
            on_tie: TiePolicy::Discard,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    pub train_set_size: usize,
    pub on_tie: TiePolicy,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            train_set_size: 50,
            on_tie: TiePolicy::Discard,
        }
    }
}

/// 决定每个候选解是否真实评估的策略
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PolicyConfig {
    Schedule(ScheduleConfig),
    ModelSelection(ModelSelectionConfig),
    Tournament(TournamentConfig),
    Classification(ClassificationConfig),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurrogateConfig {
    #[serde(flatten)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub network: NetworkConfig,
}

impl SurrogateConfig {
    pub fn new(policy: PolicyConfig) -> Self {
        Self {
            policy,
            network: NetworkConfig::default(),
        }
    }

    /// 拒绝会让模型在训练数据不足时被查询的设置
    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |message: String| Err(Error::InvalidConfig(message));
        let network = &self.network;
        if network.hidden == 0 || network.epochs == 0 {
            return invalid("神经网络的隐层单元数和训练周期数都必须为正".to_string());
        }
        if !(network.learning_rate > 0.0) || !(0.0..1.0).contains(&network.momentum) {
            return invalid(format!(
                "学习率必须为正，动量必须在 [0, 1) 中，给出了 {} 和 {}",
                network.learning_rate, network.momentum
            ));
        }
        match &self.policy {
            PolicyConfig::Schedule(schedule) => {
                if schedule.initial_solutions < MIN_TRAINING_ROWS {
                    return invalid(format!(
                        "initial_solutions 至少为 {MIN_TRAINING_ROWS}，给出了 {}",
                        schedule.initial_solutions
                    ));
                }
                if schedule.compute_counter == 0 {
                    return invalid("compute_counter 必须为正".to_string());
                }
                if !(schedule.epsilon >= 0.0) {
                    return invalid(format!("epsilon 不能为负，给出了 {}", schedule.epsilon));
                }
                if let CorrectionSample::Percent(p) = schedule.correction {
                    if !(p > 0.0 && p <= 100.0) {
                        return invalid(format!("校正比例必须在 (0, 100] 中，给出了 {p}"));
                    }
                }
                if let Some(minutes) = schedule.time_budget_minutes {
                    if !(minutes > 0.0) {
                        return invalid(format!("时间预算必须为正，给出了 {minutes}"));
                    }
                }
            }
            PolicyConfig::ModelSelection(selection) => {
                if selection.real_init_counter < 4 {
                    return invalid(format!(
                        "real_init_counter 至少为 4，给出了 {}",
                        selection.real_init_counter
                    ));
                }
                if selection.model_init_counter == 0 {
                    return invalid("model_init_counter 必须为正".to_string());
                }
            }
            PolicyConfig::Tournament(tournament) => {
                if tournament.sample_interval == 0
                    || tournament.train_set_size <= tournament.sample_interval
                {
                    return invalid(format!(
                        "train_set_size 必须大于 sample_interval，给出了 {} 和 {}",
                        tournament.train_set_size, tournament.sample_interval
                    ));
                }
            }
            PolicyConfig::Classification(classification) => {
                let size = classification.train_set_size;
                if size < 2 * MIN_TRAINING_ROWS || size % 2 != 0 {
                    return invalid(format!(
                        "train_set_size 必须是不小于 {} 的偶数，给出了 {size}",
                        2 * MIN_TRAINING_ROWS
                    ));
                }
            }
        }
        Ok(())
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub info: Info,
    pub problem: ProblemConfig,
    #[serde(default)]
    pub algorithm: AlgorithmConfig,
    #[serde(default)]
    pub operators: OperatorConfig,
    pub surrogate: Option<SurrogateConfig>,
}

impl Config {
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let content = read_to_string(path)
            .map_err(|e| Error::Io(format!("无法读取 {}：{e}", path.display())))?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        let algorithm = &self.algorithm;
        if algorithm.population_size < 2 {
            return Err(Error::InvalidConfig(format!(
                "种群至少需要 2 个解，给出了 {}",
                algorithm.population_size
            )));
        }
        if algorithm.max_evaluations < algorithm.population_size {
            return Err(Error::InvalidConfig(format!(
                "评估次数 {} 少于种群大小 {}",
                algorithm.max_evaluations, algorithm.population_size
            )));
        }
        let operators = &self.operators;
        if !(0.0..=1.0).contains(&operators.crossover_probability) {
            return Err(Error::InvalidConfig(format!(
                "交叉概率必须在 [0, 1] 中，给出了 {}",
                operators.crossover_probability
            )));
        }
        if let Some(p) = operators.mutation_probability {
            if !(0.0..=1.0).contains(&p) {
                return Err(Error::InvalidConfig(format!(
                    "变异概率必须在 [0, 1] 中，给出了 {p}"
                )));
            }
        }
        if let Some(surrogate) = &self.surrogate {
            surrogate.validate()?;
        }
        Ok(())
    }
}
