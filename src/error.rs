//! 错误类型
//!
//! 核心组件的所有错误都会原样返回给直接调用者，由外层决定中止还是重试。

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// 两个解的目标（或变量）向量长度不一致
    #[error("维度不一致：期望 {expected}，实际 {found}")]
    DimensionMismatch { expected: usize, found: usize },
    /// 训练集中的样本不足以训练模型
    #[error("模型尚未训练：训练集只有 {rows} 行，至少需要 {required} 行")]
    NotTrained { rows: usize, required: usize },
    /// 环境选择要求的解多于可用的解
    #[error("候选解不足：需要 {requested} 个，只有 {available} 个")]
    Underflow { requested: usize, available: usize },
    /// 真实目标函数的计算失败
    #[error("真实评估失败：{0}")]
    RealEvaluation(String),
    #[error("配置有误：{0}")]
    InvalidConfig(String),
    #[error("读写失败：{0}")]
    Io(String),
    #[error("解析失败：{0}")]
    Parse(String),
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(value: serde_yaml::Error) -> Self {
        Self::InvalidConfig(value.to_string())
    }
}

impl From<std::num::ParseFloatError> for Error {
    fn from(value: std::num::ParseFloatError) -> Self {
        Self::Parse(value.to_string())
    }
}
