//! 成对锦标赛
//!
//! 前 `train_set_size` 个解真实评估，其中每隔 `sample_interval` 个取一个作为训练数据。之后用神经网络估计每个解，
//! 相邻的两个解配成一对，只真实评估估计值占优的一个，另一个放弃。

use super::{settle_pair, Core, Gate, Phase};
use crate::comparators::DominanceComparator;
use crate::config::TournamentConfig;
use crate::interfaces::消息;
use crate::problems::Problem;
use crate::solution::{Solution, SolutionSet};
use crate::surrogates::ModelKind;
use crate::Error;

#[derive(Debug, Clone)]
pub struct Tournament {
    config: TournamentConfig,
    /// 跨调用配对时，先到的一个解的副本
    pending: Option<Solution>,
}

impl Tournament {
    pub fn new(config: TournamentConfig) -> Self {
        Self {
            config,
            pending: None,
        }
    }

    fn bootstrap<P: Problem>(&self, core: &mut Core<'_, P>, solution: &mut Solution) -> Result<(), Error> {
        core.real(solution)?;
        let index = core.call() - 1;
        if index % self.config.sample_interval == 0 {
            core.fill(solution)?;
        }
        if index + 1 == self.config.train_set_size {
            core.发送(消息::BootstrapComplete {
                evaluations: core.call(),
                rows: core.rows(),
            });
        }
        Ok(())
    }

    fn settle<P: Problem>(
        &self,
        core: &mut Core<'_, P>,
        first: &mut Solution,
        second: &mut Solution,
    ) -> Result<(), Error> {
        let verdict = DominanceComparator.compare(first, second)?;
        settle_pair(core, verdict, self.config.on_tie, first, second)?;
        Ok(())
    }
}

impl Gate for Tournament {
    fn evaluate<P: Problem>(&mut self, core: &mut Core<'_, P>, solution: &mut Solution) -> Result<(), Error> {
        match Phase::of(core, self.config.train_set_size) {
            Phase::Bootstrap => self.bootstrap(core, solution),
            Phase::Pairing => {
                core.estimate(|_| ModelKind::Neural, solution)?;
                match self.pending.take() {
                    Some(mut first) => self.settle(core, &mut first, solution),
                    None => {
                        self.pending = Some(solution.clone());
                        Ok(())
                    }
                }
            }
        }
    }

    fn evaluate_all<P: Problem>(&mut self, core: &mut Core<'_, P>, set: &mut SolutionSet) -> Result<(), Error> {
        let solutions = set.as_mut_slice();
        // 本批中等待配对的解的序号
        let mut held: Option<usize> = None;
        for index in 0..solutions.len() {
            core.begin_call();
            match Phase::of(core, self.config.train_set_size) {
                Phase::Bootstrap => self.bootstrap(core, &mut solutions[index])?,
                Phase::Pairing => {
                    core.estimate(|_| ModelKind::Neural, &mut solutions[index])?;
                    if let Some(first) = held.take() {
                        let (head, tail) = solutions.split_at_mut(index);
                        self.settle(core, &mut head[first], &mut tail[0])?;
                    } else if let Some(mut first) = self.pending.take() {
                        self.settle(core, &mut first, &mut solutions[index])?;
                    } else {
                        held = Some(index);
                    }
                }
            }
        }
        if let Some(first) = held {
            self.pending = Some(solutions[first].clone());
        }
        Ok(())
    }
}
