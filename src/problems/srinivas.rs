use super::{violations, Problem};
use crate::Error;

/// Srinivas 问题：两个变量、两个目标、两个约束，变量在 [-20, 20] 中
#[derive(Debug, Clone, Copy, Default)]
pub struct Srinivas;

impl Problem for Srinivas {
    fn name(&self) -> &str {
        "Srinivas"
    }

    fn number_of_variables(&self) -> usize {
        2
    }

    fn number_of_objectives(&self) -> usize {
        2
    }

    fn number_of_constraints(&self) -> usize {
        2
    }

    fn lower_bound(&self, _index: usize) -> f64 {
        -20.0
    }

    fn upper_bound(&self, _index: usize) -> f64 {
        20.0
    }

    fn evaluate(&mut self, x: &[f64]) -> Result<Vec<f64>, Error> {
        let f1 = 2.0 + (x[0] - 2.0).powi(2) + (x[1] - 1.0).powi(2);
        let f2 = 9.0 * x[0] - (x[1] - 1.0).powi(2);
        Ok(vec![f1, f2])
    }

    fn evaluate_constraints(&mut self, x: &[f64]) -> Result<(f64, usize), Error> {
        let g1 = 1.0 - (x[0] * x[0] + x[1] * x[1]) / 225.0;
        let g2 = (3.0 * x[1] - x[0]) / 10.0 - 1.0;
        Ok(violations(&[g1, g2]))
    }
}
