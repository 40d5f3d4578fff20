//! 模型选择
//!
//! 一个循环分为四步：真实评估若干个解作为训练数据；在参考样本上比较线性回归和神经网络的误差，为每个目标选出误差较小的模型；
//! 用选出的模型估计若干个解；预测次数用完后清空训练表和参考样本，重新开始。

use super::{Core, Gate};
use crate::config::ModelSelectionConfig;
use crate::interfaces::消息;
use crate::problems::Problem;
use crate::solution::Solution;
use crate::surrogates::ModelKind;
use crate::Error;

/// 每隔这么多次初始评估保留一个参考样本
const REFERENCE_INTERVAL: usize = 4;

#[derive(Debug, Clone)]
pub struct ModelSelection {
    config: ModelSelectionConfig,
    real_counter: usize,
    model_counter: usize,
    selected: Option<Vec<ModelKind>>,
}

impl ModelSelection {
    pub fn new(config: ModelSelectionConfig) -> Self {
        let real_counter = config.real_init_counter;
        Self {
            config,
            real_counter,
            model_counter: 0,
            selected: None,
        }
    }

    /// 当前为每个目标选定的模型
    pub fn selected(&self) -> Option<&[ModelKind]> {
        self.selected.as_deref()
    }

    fn bootstrap<P: Problem>(&mut self, core: &mut Core<'_, P>, solution: &mut Solution) -> Result<(), Error> {
        core.real(solution)?;
        core.fill(solution)?;
        if self.real_counter % REFERENCE_INTERVAL == 0 {
            for surrogate in core.surrogates_mut() {
                surrogate.add_reference(solution.clone())?;
            }
        }
        self.real_counter -= 1;
        if self.real_counter == 0 {
            core.发送(消息::BootstrapComplete {
                evaluations: core.call(),
                rows: core.rows(),
            });
        }
        Ok(())
    }

    fn select<P: Problem>(&mut self, core: &mut Core<'_, P>) -> Result<Vec<ModelKind>, Error> {
        let mut selected = Vec::with_capacity(core.number_of_objectives());
        for objective in 0..core.number_of_objectives() {
            let surrogate = &mut core.surrogates_mut()[objective];
            let linear_error = surrogate.reference_error(ModelKind::Linear, objective)?;
            let neural_error = surrogate.reference_error(ModelKind::Neural, objective)?;
            let kind = if linear_error < neural_error {
                ModelKind::Linear
            } else {
                ModelKind::Neural
            };
            core.发送(消息::ModelSelected {
                objective,
                kind,
                linear_error,
                neural_error,
            });
            selected.push(kind);
        }
        Ok(selected)
    }

    fn reset<P: Problem>(&mut self, core: &mut Core<'_, P>) {
        for surrogate in core.surrogates_mut() {
            surrogate.empty_train_set();
            surrogate.empty_reference_archive();
        }
        self.selected = None;
        self.real_counter = self.config.real_init_counter;
        core.发送(消息::QuotaExhausted {
            evaluations: core.call(),
        });
    }
}

impl Gate for ModelSelection {
    fn evaluate<P: Problem>(&mut self, core: &mut Core<'_, P>, solution: &mut Solution) -> Result<(), Error> {
        if core.in_final_phase() {
            return core.real(solution);
        }
        if self.real_counter > 0 {
            return self.bootstrap(core, solution);
        }
        if self.selected.is_none() {
            self.selected = Some(self.select(core)?);
            self.model_counter = self.config.model_init_counter;
        }
        if self.model_counter == 0 {
            // 本次调用成为新一轮的第一次初始评估
            self.reset(core);
            return self.bootstrap(core, solution);
        }
        let selected = self.selected.as_deref().unwrap_or_default();
        core.estimate(|objective| selected[objective], solution)?;
        self.model_counter -= 1;
        Ok(())
    }
}
