//! 成对分类
//!
//! 前 `train_set_size` 个解真实评估，相邻两个配成一对，把它们的支配关系交给分类器学习。
//! 之后相邻两个解先由分类器判断支配关系，只真实评估被判定占优的一个。

use super::{settle_pair, Core, Gate, Phase};
use crate::config::ClassificationConfig;
use crate::interfaces::消息;
use crate::problems::Problem;
use crate::solution::{Solution, SolutionSet};
use crate::surrogates::{NetworkConfig, PairwiseClassifier};
use crate::Error;

#[derive(Debug, Clone)]
pub struct Classification {
    config: ClassificationConfig,
    classifier: PairwiseClassifier,
    /// 等待配对的解的副本，初始阶段和分类阶段共用
    pending: Option<Solution>,
}

impl Classification {
    pub fn new(config: ClassificationConfig, network: NetworkConfig) -> Self {
        Self {
            config,
            classifier: PairwiseClassifier::new(network),
            pending: None,
        }
    }

    pub fn classifier(&self) -> &PairwiseClassifier {
        &self.classifier
    }

    fn bootstrap<P: Problem>(&mut self, core: &mut Core<'_, P>, solution: &mut Solution) -> Result<(), Error> {
        core.real(solution)?;
        match self.pending.take() {
            Some(first) => {
                self.classifier.fill_classifying_train_set(&first, solution)?;
            }
            None => self.pending = Some(solution.clone()),
        }
        if core.call() == self.config.train_set_size {
            core.发送(消息::BootstrapComplete {
                evaluations: core.call(),
                rows: self.classifier.train_set().len(),
            });
        }
        Ok(())
    }

    fn settle<P: Problem>(
        &mut self,
        core: &mut Core<'_, P>,
        first: &mut Solution,
        second: &mut Solution,
    ) -> Result<(), Error> {
        let verdict = self.classifier.classify(first, second)?;
        settle_pair(core, verdict, self.config.on_tie, first, second)?;
        Ok(())
    }
}

impl Gate for Classification {
    fn evaluate<P: Problem>(&mut self, core: &mut Core<'_, P>, solution: &mut Solution) -> Result<(), Error> {
        match Phase::of(core, self.config.train_set_size) {
            Phase::Bootstrap => self.bootstrap(core, solution),
            Phase::Pairing => match self.pending.take() {
                Some(mut first) => self.settle(core, &mut first, solution),
                None => {
                    self.pending = Some(solution.clone());
                    Ok(())
                }
            },
        }
    }

    fn evaluate_all<P: Problem>(&mut self, core: &mut Core<'_, P>, set: &mut SolutionSet) -> Result<(), Error> {
        let solutions = set.as_mut_slice();
        let mut held: Option<usize> = None;
        for index in 0..solutions.len() {
            core.begin_call();
            match Phase::of(core, self.config.train_set_size) {
                Phase::Bootstrap => self.bootstrap(core, &mut solutions[index])?,
                Phase::Pairing => {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PolicyConfig, SurrogateConfig, TiePolicy};
    use crate::evaluators::tests::{candidate, Identity};
    use crate::evaluators::{Evaluator, SurrogateEvaluator};
    use crate::interfaces::Recorder;
    use crate::solution::EvaluationState;

    #[test]
    fn bootstrap_pairs_feed_classifier() {
        let recorder = Recorder::default();
        let config = SurrogateConfig::new(PolicyConfig::Classification(ClassificationConfig {
            train_set_size: 6,
            on_tie: TiePolicy::Discard,
        }));
        let mut evaluator = SurrogateEvaluator::new(Identity::default(), &config, 1000, &recorder).unwrap();
        let mut set: SolutionSet = [0.1, 0.9, 0.8, 0.2, 0.3, 0.7, 0.4, 0.6]
            .iter()
            .map(|x| candidate(*x))
            .collect();
        evaluator.evaluate_all(&mut set).unwrap();
        let classifier = evaluator.classifier().unwrap();
        assert_eq!(classifier.train_set().len(), 3);
        assert_eq!(classifier.train_set().width(), Some(2));
        assert!(set.iter().take(6).all(Solution::is_real));
        // 最后一对由分类器裁决，不论结果如何，两个解都不再是未评估状态
        assert!(set
            .iter()
            .skip(6)
            .all(|s| s.state() != EvaluationState::Unevaluated));
        assert_eq!(recorder.count(|m| matches!(m, 消息::PairSettled { .. })), 1);
        assert_eq!(recorder.count(|m| matches!(m, 消息::BootstrapComplete { rows: 3, .. })), 1);
    }

    #[test]
    fn pairs_are_classified_to_the_end_of_the_budget() {
        let recorder = Recorder::default();
        let config = SurrogateConfig::new(PolicyConfig::Classification(ClassificationConfig {
            train_set_size: 6,
            on_tie: TiePolicy::Discard,
        }));
        let mut evaluator = SurrogateEvaluator::new(Identity::default(), &config, 8, &recorder).unwrap();
        let mut set: SolutionSet = [0.1, 0.9, 0.8, 0.2, 0.3, 0.7, 0.4, 0.6]
            .iter()
            .map(|x| candidate(*x))
            .collect();
        evaluator.evaluate_all(&mut set).unwrap();
        assert_eq!(evaluator.evaluations(), 8);
        assert!(evaluator.real_evaluations() <= 7);
        assert!(set.iter().skip(6).any(Solution::is_discarded));
        assert_eq!(recorder.count(|m| matches!(m, 消息::PairSettled { .. })), 1);
        assert_eq!(recorder.count(|m| matches!(m, 消息::FinalPhase { .. })), 0);
    }

    #[test]
    fn classified_winner_is_evaluated() {
        let recorder = Recorder::default();
        let mut config = SurrogateConfig::new(PolicyConfig::Classification(ClassificationConfig {
            train_set_size: 40,
            on_tie: TiePolicy::Discard,
        }));
        config.network.epochs = 5000;
        let mut evaluator = SurrogateEvaluator::new(Identity::default(), &config, 1000, &recorder).unwrap();
        let mut set = SolutionSet::new(40);
        for i in 0..10 {
            let low = i as f64 / 20.0;
            let high = 1.0 - low;
            for x in [low, high, high, low] {
                set.push(candidate(x)).unwrap();
            }
        }
        evaluator.evaluate_all(&mut set).unwrap();
        let mut winner = candidate(0.1);
        let mut loser = candidate(0.9);
        evaluator.evaluate(&mut winner).unwrap();
        evaluator.evaluate(&mut loser).unwrap();
        assert_eq!(loser.state(), EvaluationState::Discarded);
        let archived = evaluator.real_solutions().iter().last().unwrap();
        assert_eq!(archived.variables(), &[0.1]);
        assert_eq!(evaluator.real_evaluations(), 41);
    }
}
