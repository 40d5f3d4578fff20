use crate::comparators::Dominance;
use crate::surrogates::ModelKind;
use serde::Serialize;
use std::cell::RefCell;
use std::fmt::Display;

pub mod command_line;

/// 向用户反馈的消息类型
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum 消息 {
    /// 初始的真实评估阶段结束，代理模型开始工作
    BootstrapComplete {
        evaluations: usize,
        rows: usize,
    },
    /// 进入最后的全真实评估阶段
    FinalPhase {
        evaluations: usize,
    },
    CorrectionRound {
        evaluations: usize,
        corrected: usize,
        updated_rows: usize,
    },
    TrainSetCorrected {
        objective: usize,
        error: f64,
    },
    ModelSelected {
        objective: usize,
        kind: ModelKind,
        linear_error: f64,
        neural_error: f64,
    },
    QuotaExhausted {
        evaluations: usize,
    },
    PairSettled {
        evaluations: usize,
        verdict: Dominance,
        real_evaluated: usize,
    },
    Progress {
        generation: usize,
        evaluations: usize,
        real_evaluations: usize,
        front_size: usize,
    },
    Finished {
        evaluations: usize,
        real_evaluations: usize,
        elapsed_ms: u64,
    },
}

impl Display for 消息 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            消息::BootstrapComplete { evaluations, rows } => write!(
                f,
                "第 {evaluations} 次评估：初始真实评估完成，训练表共 {rows} 行"
            ),
            消息::FinalPhase { evaluations } => write!(
                f,
                "第 {evaluations} 次评估：进入最后阶段，此后全部真实评估"
            ),
            消息::CorrectionRound {
                evaluations,
                corrected,
                updated_rows,
            } => write!(
                f,
                "第 {evaluations} 次评估：校正了 {corrected} 个解，训练表新增 {updated_rows} 行"
            ),
            消息::TrainSetCorrected { objective, error } => write!(
                f,
                "目标 {objective} 的估计误差为 {error:.4}，已加入训练表"
            ),
            消息::ModelSelected {
                objective,
                kind,
                linear_error,
                neural_error,
            } => write!(
                f,
                "目标 {objective} 选用{kind}（线性误差 {linear_error:.4e}，神经网络误差 {neural_error:.4e}）"
            ),
            消息::QuotaExhausted { evaluations } => write!(
                f,
                "第 {evaluations} 次评估：模型预测次数用完，重新开始真实评估"
            ),
            消息::PairSettled {
                evaluations,
                verdict,
                real_evaluated,
            } => write!(
                f,
                "第 {evaluations} 次评估：成对比较结果为 {verdict:?}，真实评估了 {real_evaluated} 个解"
            ),
            消息::Progress {
                generation,
                evaluations,
                real_evaluations,
                front_size,
            } => write!(
                f,
                "第 {generation} 代：已评估 {evaluations} 次，其中真实评估 {real_evaluations} 次，第一层有 {front_size} 个解"
            ),
            消息::Finished {
                evaluations,
                real_evaluations,
                elapsed_ms,
            } => write!(
                f,
                "优化结束：共评估 {evaluations} 次，其中真实评估 {real_evaluations} 次，用时 {elapsed_ms} ms"
            ),
        }
    }
}

/// 定义了向用户报告消息的接口，核心算法只通过它输出信息
pub trait 界面 {
    fn 发送(&self, message: 消息);
}

/// 丢弃所有消息
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl 界面 for Silent {
    fn 发送(&self, _message: 消息) {}
}

/// 把消息按顺序记录下来，便于检查
#[derive(Debug, Default)]
pub struct Recorder {
    messages: RefCell<Vec<消息>>,
}

impl Recorder {
    pub fn messages(&self) -> Vec<消息> {
        self.messages.borrow().clone()
    }

    pub fn count<F: Fn(&消息) -> bool>(&self, predicate: F) -> usize {
        self.messages.borrow().iter().filter(|m| predicate(m)).count()
    }
}

impl 界面 for Recorder {
    fn 发送(&self, message: 消息) {
        self.messages.borrow_mut().push(message);
    }
}
