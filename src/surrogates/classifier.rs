//! 成对支配关系分类器
//!
//! 把两个解的决策变量首尾相接作为输入，预测它们之间的支配关系。

use super::{Classifier, ClassifyingTrainSet, NetworkConfig, NeuralNetwork, MIN_TRAINING_ROWS};
use crate::comparators::{Dominance, DominanceComparator};
use crate::solution::Solution;
use crate::Error;

#[derive(Debug, Clone)]
pub struct PairwiseClassifier {
    train_set: ClassifyingTrainSet,
    network: NeuralNetwork,
    fitted_revision: Option<u64>,
}

fn pair_features(a: &Solution, b: &Solution) -> Vec<f64> {
    let mut features = Vec::with_capacity(a.number_of_variables() + b.number_of_variables());
    features.extend_from_slice(a.variables());
    features.extend_from_slice(b.variables());
    features
}

impl PairwiseClassifier {
    pub fn new(network: NetworkConfig) -> Self {
        Self {
            train_set: ClassifyingTrainSet::default(),
            network: NeuralNetwork::classifier(network),
            fitted_revision: None,
        }
    }

    /// 用两个已真实评估的解的支配关系作为标签加入训练表，返回这个标签
    pub fn fill_classifying_train_set(&mut self, a: &Solution, b: &Solution) -> Result<Dominance, Error> {
        let label = DominanceComparator.compare(a, b)?;
        self.train_set.push(pair_features(a, b), label)?;
        Ok(label)
    }

    /// 预测 `a` 与 `b` 的支配关系；概率相同时取 [`Dominance::LABELS`] 中靠前的标签
    pub fn classify(&mut self, a: &Solution, b: &Solution) -> Result<Dominance, Error> {
        let rows = self.train_set.len();
        if rows < MIN_TRAINING_ROWS {
            return Err(Error::NotTrained {
                rows,
                required: MIN_TRAINING_ROWS,
            });
        }
        let revision = Some(self.train_set.revision());
        if self.fitted_revision != revision {
            Classifier::fit(&mut self.network, &self.train_set)?;
            self.fitted_revision = revision;
        }
        let distribution = self.network.distribution(&pair_features(a, b))?;
        let mut best = 0;
        for (index, probability) in distribution.iter().enumerate() {
            if *probability > distribution[best] {
                best = index;
            }
        }
        Ok(Dominance::LABELS[best])
    }

    pub fn train_set(&self) -> &ClassifyingTrainSet {
        &self.train_set
    }

    pub fn empty_train_set(&mut self) {
        self.train_set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f64) -> Solution {
        Solution::with_objectives(vec![x], vec![x, x])
    }

    #[test]
    fn labels_come_from_real_objectives() {
        let mut classifier = PairwiseClassifier::new(NetworkConfig::default());
        assert_eq!(
            classifier.fill_classifying_train_set(&point(0.0), &point(1.0)).unwrap(),
            Dominance::ADominates
        );
        assert_eq!(
            classifier.fill_classifying_train_set(&point(1.0), &point(0.0)).unwrap(),
            Dominance::BDominates
        );
        assert_eq!(classifier.train_set().width(), Some(2));
        assert_eq!(classifier.train_set().labels().len(), 2);
    }

    #[test]
    fn classify_needs_rows() {
        let mut classifier = PairwiseClassifier::new(NetworkConfig::default());
        classifier.fill_classifying_train_set(&point(0.0), &point(1.0)).unwrap();
        assert_eq!(
            classifier.classify(&point(0.2), &point(0.8)),
            Err(Error::NotTrained {
                rows: 1,
                required: MIN_TRAINING_ROWS
            })
        );
        classifier.fill_classifying_train_set(&point(1.0), &point(0.0)).unwrap();
        assert!(classifier.classify(&point(0.2), &point(0.8)).is_ok());
        classifier.empty_train_set();
        assert!(classifier.classify(&point(0.2), &point(0.8)).is_err());
    }

    #[test]
    fn learns_separable_pairs() {
        let config = NetworkConfig {
            epochs: 5000,
            ..Default::default()
        };
        let mut classifier = PairwiseClassifier::new(config);
        for i in 0..10 {
            let low = i as f64 / 20.0;
            let high = 1.0 - low;
            classifier.fill_classifying_train_set(&point(low), &point(high)).unwrap();
            classifier.fill_classifying_train_set(&point(high), &point(low)).unwrap();
        }
        assert_eq!(
            classifier.classify(&point(0.1), &point(0.9)).unwrap(),
            Dominance::ADominates
        );
        assert_eq!(
            classifier.classify(&point(0.9), &point(0.1)).unwrap(),
            Dominance::BDominates
        );
    }
}
