//! libmoea 是使用 Rust 实现的代理模型辅助多目标进化优化库。
//!
//! 种群算法（NSGA-II）共用非支配排序、拥挤距离和环境选择；在评估环节，评估器按照选定的策略决定每个候选解是交给昂贵的真实问题，
//! 还是用线性回归、神经网络或成对支配分类器给出的廉价估计代替，从而在评估预算内尽量少做真实评估。
//!
//! moea 是使用 libmoea 实现的命令行程序，用户提供配置文件，本程序运行一次优化并输出最后一代种群和真实评估过的第一层解。

pub mod comparators;
pub mod config;
pub mod distance;
pub mod error;
pub mod evaluators;
pub mod interfaces;
pub mod io;
pub mod operators;
pub mod optimizers;
pub mod problems;
pub mod ranking;
pub mod selection;
pub mod solution;
pub mod surrogates;

pub use error::Error;
