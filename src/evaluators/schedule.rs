//! 定期校正
//!
//! 前若干个解真实评估并作为训练数据；之后用选定的模型估计，每估计 `compute_counter` 个解进行一轮校正：
//! 真实评估本轮的部分解，估计误差超过 `epsilon` 的目标把真实值加入训练表。预算或时间用到 90% 之后全部真实评估。

use super::{Core, Gate};
use crate::comparators::DominanceComparator;
use crate::config::{CorrectionSample, ScheduleConfig};
use crate::interfaces::消息;
use crate::problems::Problem;
use crate::solution::{Solution, SolutionSet};
use crate::Error;

#[derive(Debug, Clone)]
pub struct Schedule {
    config: ScheduleConfig,
    counter: usize,
    round: SolutionSet,
}

impl Schedule {
    pub fn new(config: ScheduleConfig) -> Self {
        let counter = config.compute_counter;
        Self {
            config,
            counter,
            round: SolutionSet::default(),
        }
    }

    /// 本轮还能估计的解的个数
    pub fn counter(&self) -> usize {
        self.counter
    }

    fn out_of_time<P: Problem>(&self, core: &mut Core<'_, P>) -> bool {
        match self.config.time_budget_minutes {
            Some(minutes) if core.elapsed_minutes() >= super::FINAL_PHASE * minutes => {
                core.announce_final_phase();
                true
            }
            _ => false,
        }
    }

    /// 本轮中要真实评估的解的序号
    fn picks(&self, round: &SolutionSet) -> Result<Vec<usize>, Error> {
        let last = round.len() - 1;
        let picks = match self.config.correction {
            CorrectionSample::Last => vec![last],
            CorrectionSample::Best => {
                let best = round.best_index(&DominanceComparator)?;
                vec![best.unwrap_or(last)]
            }
            CorrectionSample::Percent(p) => {
                let step = ((100.0 / p).round() as usize).max(1);
                (0..round.len()).step_by(step).collect()
            }
        };
        Ok(picks)
    }

    /// 当前解是本轮最后一个，就地评估；本轮较早的解在副本上评估
    fn correct<P: Problem>(
        &self,
        core: &mut Core<'_, P>,
        round: &SolutionSet,
        current: &mut Solution,
    ) -> Result<(), Error> {
        let last = round.len() - 1;
        let picks = self.picks(round)?;
        let mut updated_rows = 0;
        for index in &picks {
            let estimate = round[*index].objectives().to_vec();
            if *index == last {
                core.real(current)?;
                updated_rows += core.correct(&estimate, current, self.config.epsilon)?;
            } else {
                let mut copy = round[*index].clone();
                core.real(&mut copy)?;
                updated_rows += core.correct(&estimate, &copy, self.config.epsilon)?;
            }
        }
        core.发送(消息::CorrectionRound {
            evaluations: core.call(),
            corrected: picks.len(),
            updated_rows,
        });
        Ok(())
    }
}

impl Gate for Schedule {
    fn evaluate<P: Problem>(&mut self, core: &mut Core<'_, P>, solution: &mut Solution) -> Result<(), Error> {
        if core.in_final_phase() || self.out_of_time(core) {
            return core.real(solution);
        }
        let call = core.call();
        if call <= self.config.initial_solutions {
            core.real(solution)?;
            core.fill(solution)?;
            if call == self.config.initial_solutions {
                core.发送(消息::BootstrapComplete {
                    evaluations: call,
                    rows: core.rows(),
                });
            }
            return Ok(());
        }
        let model = self.config.model;
        core.estimate(|_| model, solution)?;
        self.round.push(solution.clone())?;
        self.counter -= 1;
        if self.counter == 0 {
            // 校正失败时下一轮照常开始
            self.counter = self.config.compute_counter;
            let round = std::mem::take(&mut self.round);
            self.correct(core, &round, solution)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PolicyConfig, SurrogateConfig};
    use crate::evaluators::tests::{candidate, Identity};
    use crate::evaluators::{Evaluator, Policy, SurrogateEvaluator};
    use crate::interfaces::Recorder;
    use crate::solution::EvaluationState;

    fn evaluator<'a>(
        config: ScheduleConfig,
        max_evaluations: usize,
        recorder: &'a Recorder,
    ) -> SurrogateEvaluator<'a, Identity> {
        let config = SurrogateConfig::new(PolicyConfig::Schedule(config));
        SurrogateEvaluator::new(Identity::default(), &config, max_evaluations, recorder).unwrap()
    }

    #[test]
    fn best_correction_uses_dominance_best_estimate() {
        let recorder = Recorder::default();
        let config = ScheduleConfig {
            initial_solutions: 2,
            compute_counter: 3,
            epsilon: 0.0,
            correction: CorrectionSample::Best,
            ..Default::default()
        };
        let mut evaluator = evaluator(config, 1000, &recorder);
        let mut set: SolutionSet = [0.0, 1.0, 0.9, 0.2, 0.5]
            .iter()
            .map(|x| candidate(*x))
            .collect();
        evaluator.evaluate_all(&mut set).unwrap();
        // 本轮估计值最小的是 0.2，它不是当前解，所以在副本上评估
        assert_eq!(evaluator.real_evaluations(), 3);
        assert_eq!(evaluator.real_solutions()[2].variables(), &[0.2]);
        assert_eq!(set[3].state(), EvaluationState::Estimated);
        assert_eq!(set[4].state(), EvaluationState::Estimated);
        assert_eq!(
            recorder.count(|m| matches!(m, 消息::CorrectionRound { corrected: 1, .. })),
            1
        );
    }

    #[test]
    fn percent_correction_samples_round() {
        let recorder = Recorder::default();
        let config = ScheduleConfig {
            initial_solutions: 2,
            compute_counter: 4,
            epsilon: 10.0,
            correction: CorrectionSample::Percent(50.0),
            ..Default::default()
        };
        let mut evaluator = evaluator(config, 1000, &recorder);
        let mut set: SolutionSet = [0.0, 1.0, 0.1, 0.2, 0.3, 0.4]
            .iter()
            .map(|x| candidate(*x))
            .collect();
        evaluator.evaluate_all(&mut set).unwrap();
        // 每隔两个取一个：本轮的第 0 和第 2 个
        assert_eq!(evaluator.real_evaluations(), 4);
        let corrected: Vec<f64> = evaluator.real_solutions().iter().skip(2).map(|s| s.variables()[0]).collect();
        assert_eq!(corrected, vec![0.1, 0.3]);
        // 误差都没有超过 epsilon，训练表不变
        assert!(evaluator.surrogates().iter().all(|s| s.train_set().len() == 2));
    }

    #[test]
    fn time_budget_forces_real_evaluation() {
        let recorder = Recorder::default();
        let config = ScheduleConfig {
            initial_solutions: 2,
            time_budget_minutes: Some(1e-6),
            ..Default::default()
        };
        let mut evaluator = evaluator(config, 1000, &recorder);
        std::thread::sleep(std::time::Duration::from_millis(5));
        for i in 0..10 {
            let mut solution = candidate(i as f64 / 10.0);
            evaluator.evaluate(&mut solution).unwrap();
            assert!(solution.is_real());
        }
        assert_eq!(recorder.count(|m| matches!(m, 消息::FinalPhase { .. })), 1);
    }

    /// 第 `fail_on` 次真实评估时失败
    struct FailsOnce {
        inner: Identity,
        fail_on: usize,
        real_calls: usize,
    }

    impl Problem for FailsOnce {
        fn name(&self) -> &str {
            "fails-once"
        }

        fn number_of_variables(&self) -> usize {
            1
        }

        fn number_of_objectives(&self) -> usize {
            2
        }

        fn lower_bound(&self, _index: usize) -> f64 {
            0.0
        }

        fn upper_bound(&self, _index: usize) -> f64 {
            1.0
        }

        fn evaluate(&mut self, variables: &[f64]) -> Result<Vec<f64>, Error> {
            self.real_calls += 1;
            if self.real_calls == self.fail_on {
                return Err(Error::RealEvaluation("模拟器超时".to_string()));
            }
            self.inner.evaluate(variables)
        }
    }

    #[test]
    fn failed_correction_starts_a_fresh_round() {
        let problem = FailsOnce {
            inner: Identity::default(),
            fail_on: 3,
            real_calls: 0,
        };
        let config = SurrogateConfig::new(PolicyConfig::Schedule(ScheduleConfig {
            initial_solutions: 2,
            compute_counter: 2,
            ..Default::default()
        }));
        let recorder = Recorder::default();
        let mut evaluator = SurrogateEvaluator::new(problem, &config, 1000, &recorder).unwrap();
        let mut results = Vec::new();
        for x in [0.0, 1.0, 0.3, 0.6, 0.4, 0.7] {
            let mut solution = candidate(x);
            let result = evaluator.evaluate(&mut solution);
            results.push(result.map(|_| solution.state()));
        }
        assert_eq!(
            results,
            vec![
                Ok(EvaluationState::Real),
                Ok(EvaluationState::Real),
                Ok(EvaluationState::Estimated),
                Err(Error::RealEvaluation("模拟器超时".to_string())),
                Ok(EvaluationState::Estimated),
                Ok(EvaluationState::Real),
            ]
        );
        let Policy::Schedule(schedule) = evaluator.policy() else {
            panic!("策略应为定期校正");
        };
        assert_eq!(schedule.counter(), 2);
        assert_eq!(evaluator.real_evaluations(), 3);
        assert_eq!(recorder.count(|m| matches!(m, 消息::CorrectionRound { .. })), 1);
    }
}
