//! 评估器：决定每个候选解用真实问题评估还是用代理模型估计
//!
//! 外层算法只依赖 [`Evaluator`]。[`DirectEvaluator`] 全部真实评估；[`SurrogateEvaluator`] 在构造时选定一种策略，
//! 之后的每一次调用都先把调用计数加一（无论之后发生什么，每次调用都消耗一份预算），再交给策略处理。
//!
//! 策略的共同状态放在 [`Core`] 里：真实问题、计数器、真实评估过的解的存档，以及每个目标各一个代理模型。

use crate::comparators::Dominance;
use crate::config::{PolicyConfig, SurrogateConfig, TiePolicy};
use crate::interfaces::{界面, 消息};
use crate::problems::{evaluate_real, Problem};
use crate::solution::{EvaluationState, Solution, SolutionSet};
use crate::surrogates::{ModelKind, PairwiseClassifier, Surrogate};
use crate::Error;
use web_time::Instant;

pub mod classification;
pub mod model_selection;
pub mod schedule;
pub mod tournament;

pub use classification::Classification;
pub use model_selection::ModelSelection;
pub use schedule::Schedule;
pub use tournament::Tournament;

/// 定期校正和模型选择两种策略在预算用到这个比例之后全部真实评估
pub const FINAL_PHASE: f64 = 0.9;

pub trait Evaluator {
    fn evaluate(&mut self, solution: &mut Solution) -> Result<(), Error>;

    /// 按顺序评估一个解集中的所有解
    fn evaluate_all(&mut self, set: &mut SolutionSet) -> Result<(), Error> {
        for solution in set.iter_mut() {
            self.evaluate(solution)?;
        }
        Ok(())
    }

    /// 调用次数
    fn evaluations(&self) -> usize;

    /// 真实评估次数
    fn real_evaluations(&self) -> usize;

    /// 所有真实评估过的解的副本
    fn real_solutions(&self) -> &SolutionSet;

    fn problem(&self) -> &dyn Problem;

    fn number_of_objectives(&self) -> usize {
        self.problem().number_of_objectives()
    }

    fn number_of_variables(&self) -> usize {
        self.problem().number_of_variables()
    }
}

/// 全部真实评估
pub struct DirectEvaluator<P: Problem> {
    problem: P,
    evaluations: usize,
    archive: SolutionSet,
}

impl<P: Problem> DirectEvaluator<P> {
    pub fn new(problem: P) -> Self {
        Self {
            problem,
            evaluations: 0,
            archive: SolutionSet::default(),
        }
    }
}

impl<P: Problem> Evaluator for DirectEvaluator<P> {
    fn evaluate(&mut self, solution: &mut Solution) -> Result<(), Error> {
        self.evaluations += 1;
        evaluate_real(&mut self.problem, solution)?;
        self.archive.push(solution.clone())
    }

    fn evaluations(&self) -> usize {
        self.evaluations
    }

    fn real_evaluations(&self) -> usize {
        self.evaluations
    }

    fn real_solutions(&self) -> &SolutionSet {
        &self.archive
    }

    fn problem(&self) -> &dyn Problem {
        &self.problem
    }
}

/// 各个策略共享的状态
pub struct Core<'a, P: Problem> {
    problem: P,
    interface: &'a dyn 界面,
    max_evaluations: usize,
    evaluations: usize,
    real_evaluations: usize,
    archive: SolutionSet,
    surrogates: Vec<Surrogate>,
    started: Instant,
    final_phase_announced: bool,
}

impl<'a, P: Problem> Core<'a, P> {
    fn new(problem: P, config: &SurrogateConfig, max_evaluations: usize, interface: &'a dyn 界面) -> Self {
        let surrogates = (0..problem.number_of_objectives())
            .map(|_| Surrogate::new(config.network))
            .collect();
        Self {
            problem,
            interface,
            max_evaluations,
            evaluations: 0,
            real_evaluations: 0,
            archive: SolutionSet::default(),
            surrogates,
            started: Instant::now(),
            final_phase_announced: false,
        }
    }

    /// 当前调用的序号，从 1 开始
    pub fn call(&self) -> usize {
        self.evaluations
    }

    fn begin_call(&mut self) {
        self.evaluations += 1;
    }

    pub fn max_evaluations(&self) -> usize {
        self.max_evaluations
    }

    pub fn elapsed_minutes(&self) -> f64 {
        self.started.elapsed().as_secs_f64() / 60.0
    }

    pub fn number_of_objectives(&self) -> usize {
        self.surrogates.len()
    }

    pub fn 发送(&self, message: 消息) {
        self.interface.发送(message);
    }

    /// 调用次数达到预算的 90% 之后进入最后阶段；第一次进入时发出消息
    pub fn in_final_phase(&mut self) -> bool {
        let reached = self.evaluations as f64 >= FINAL_PHASE * self.max_evaluations as f64;
        if reached {
            self.announce_final_phase();
        }
        reached
    }

    pub fn announce_final_phase(&mut self) {
        if !self.final_phase_announced {
            self.final_phase_announced = true;
            self.发送(消息::FinalPhase {
                evaluations: self.evaluations,
            });
        }
    }

    /// 真实评估并存档
    pub fn real(&mut self, solution: &mut Solution) -> Result<(), Error> {
        evaluate_real(&mut self.problem, solution)?;
        self.real_evaluations += 1;
        self.archive.push(solution.clone())
    }

    /// 把一个真实评估过的解加入每个目标的训练表
    pub fn fill(&mut self, solution: &Solution) -> Result<(), Error> {
        for (objective, surrogate) in self.surrogates.iter_mut().enumerate() {
            surrogate.fill_train_set(objective, solution)?;
        }
        Ok(())
    }

    /// 用代理模型估计所有目标，`kind` 给出每个目标使用的模型
    pub fn estimate<F>(&mut self, kind: F, solution: &mut Solution) -> Result<(), Error>
    where
        F: Fn(usize) -> ModelKind,
    {
        for (objective, surrogate) in self.surrogates.iter_mut().enumerate() {
            let value = surrogate.predict(kind(objective), solution)?;
            solution.set_objective(objective, value);
        }
        // 代理模型不估计约束
        solution.set_constraint_violation(0.0, 0);
        solution.mark(EvaluationState::Estimated);
        Ok(())
    }

    /// 比较估计值和真实值，误差超过 `epsilon` 的目标把真实值加入训练表，返回新增的行数
    pub fn correct(&mut self, estimate: &[f64], real: &Solution, epsilon: f64) -> Result<usize, Error> {
        let mut rows = 0;
        for (objective, surrogate) in self.surrogates.iter_mut().enumerate() {
            let error = (real.objective(objective) - estimate[objective]).abs();
            if error > epsilon {
                surrogate.fill_train_set(objective, real)?;
                self.interface
                    .发送(消息::TrainSetCorrected { objective, error });
                rows += 1;
            }
        }
        Ok(rows)
    }

    pub fn surrogates(&self) -> &[Surrogate] {
        &self.surrogates
    }

    pub fn surrogates_mut(&mut self) -> &mut [Surrogate] {
        &mut self.surrogates
    }

    pub fn rows(&self) -> usize {
        self.surrogates.iter().map(|s| s.train_set().len()).sum()
    }
}

/// 成对比较的裁决：真实评估占优的一方，另一方标记为放弃；互不支配时按 `on_tie` 处理。
/// 返回真实评估的个数。
pub(crate) fn settle_pair<P: Problem>(
    core: &mut Core<'_, P>,
    verdict: Dominance,
    on_tie: TiePolicy,
    first: &mut Solution,
    second: &mut Solution,
) -> Result<usize, Error> {
    let real_evaluated = match (verdict, on_tie) {
        (Dominance::ADominates, _) => {
            core.real(first)?;
            second.mark(EvaluationState::Discarded);
            1
        }
        (Dominance::BDominates, _) => {
            first.mark(EvaluationState::Discarded);
            core.real(second)?;
            1
        }
        (Dominance::Incomparable, TiePolicy::Discard) => {
            first.mark(EvaluationState::Discarded);
            second.mark(EvaluationState::Discarded);
            0
        }
        (Dominance::Incomparable, TiePolicy::EvaluateBoth) => {
            core.real(first)?;
            core.real(second)?;
            2
        }
    };
    core.发送(消息::PairSettled {
        evaluations: core.call(),
        verdict,
        real_evaluated,
    });
    Ok(real_evaluated)
}

/// 策略的统一接口
pub trait Gate {
    fn evaluate<P: Problem>(&mut self, core: &mut Core<'_, P>, solution: &mut Solution) -> Result<(), Error>;

    fn evaluate_all<P: Problem>(&mut self, core: &mut Core<'_, P>, set: &mut SolutionSet) -> Result<(), Error> {
        for solution in set.iter_mut() {
            core.begin_call();
            self.evaluate(core, solution)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum Policy {
    Schedule(Schedule),
    ModelSelection(ModelSelection),
    Tournament(Tournament),
    Classification(Classification),
}

impl Policy {
    fn new(config: &SurrogateConfig) -> Self {
        match &config.policy {
            PolicyConfig::Schedule(c) => Policy::Schedule(Schedule::new(c.clone())),
            PolicyConfig::ModelSelection(c) => Policy::ModelSelection(ModelSelection::new(c.clone())),
            PolicyConfig::Tournament(c) => Policy::Tournament(Tournament::new(c.clone())),
            PolicyConfig::Classification(c) => {
                Policy::Classification(Classification::new(c.clone(), config.network))
            }
        }
    }
}

/// 由代理模型把关的评估器
pub struct SurrogateEvaluator<'a, P: Problem> {
    core: Core<'a, P>,
    policy: Policy,
}

impl<'a, P: Problem> SurrogateEvaluator<'a, P> {
    pub fn new(
        problem: P,
        config: &SurrogateConfig,
        max_evaluations: usize,
        interface: &'a dyn 界面,
    ) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            core: Core::new(problem, config, max_evaluations, interface),
            policy: Policy::new(config),
        })
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn surrogates(&self) -> &[Surrogate] {
        self.core.surrogates()
    }

    pub fn classifier(&self) -> Option<&PairwiseClassifier> {
        match &self.policy {
            Policy::Classification(classification) => Some(classification.classifier()),
            _ => None,
        }
    }
}

impl<P: Problem> Evaluator for SurrogateEvaluator<'_, P> {
    fn evaluate(&mut self, solution: &mut Solution) -> Result<(), Error> {
        self.core.begin_call();
        let core = &mut self.core;
        match &mut self.policy {
            Policy::Schedule(policy) => policy.evaluate(core, solution),
            Policy::ModelSelection(policy) => policy.evaluate(core, solution),
            Policy::Tournament(policy) => policy.evaluate(core, solution),
            Policy::Classification(policy) => policy.evaluate(core, solution),
        }
    }

    fn evaluate_all(&mut self, set: &mut SolutionSet) -> Result<(), Error> {
        let core = &mut self.core;
        match &mut self.policy {
            Policy::Schedule(policy) => policy.evaluate_all(core, set),
            Policy::ModelSelection(policy) => policy.evaluate_all(core, set),
            Policy::Tournament(policy) => policy.evaluate_all(core, set),
            Policy::Classification(policy) => policy.evaluate_all(core, set),
        }
    }

    fn evaluations(&self) -> usize {
        self.core.evaluations
    }

    fn real_evaluations(&self) -> usize {
        self.core.real_evaluations
    }

    fn real_solutions(&self) -> &SolutionSet {
        &self.core.archive
    }

    fn problem(&self) -> &dyn Problem {
        &self.core.problem
    }
}

/// 成对策略所处的阶段；成对策略没有最后阶段，预算用完之前一直配对
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    Bootstrap,
    Pairing,
}

impl Phase {
    /// `train_set_size` 之前的调用都是初始阶段，调用序号从 0 开始计
    pub(crate) fn of<P: Problem>(core: &Core<'_, P>, train_set_size: usize) -> Self {
        if core.call() - 1 < train_set_size {
            Phase::Bootstrap
        } else {
            Phase::Pairing
        }
    }
}
