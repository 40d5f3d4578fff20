//! ZDT 系列双目标问题，决策变量都在 [0, 1] 中

use super::Problem;
use crate::Error;

fn check(variables: usize) -> Result<usize, Error> {
    if variables < 2 {
        return Err(Error::InvalidConfig(format!(
            "ZDT 问题至少需要 2 个变量，给出了 {variables} 个"
        )));
    }
    Ok(variables)
}

fn g(variables: &[f64]) -> f64 {
    let tail: f64 = variables[1..].iter().sum();
    1.0 + 9.0 * tail / (variables.len() - 1) as f64
}

/// 前沿为 f2 = 1 - √f1 的凸问题
#[derive(Debug, Clone)]
pub struct Zdt1 {
    variables: usize,
}

impl Zdt1 {
    pub fn new(variables: usize) -> Result<Self, Error> {
        Ok(Self {
            variables: check(variables)?,
        })
    }
}

impl Problem for Zdt1 {
    fn name(&self) -> &str {
        "ZDT1"
    }

    fn number_of_variables(&self) -> usize {
        self.variables
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
        let f1 = variables[0];
        let g = g(variables);
        Ok(vec![f1, g * (1.0 - (f1 / g).sqrt())])
    }
}

/// 前沿为 f2 = 1 - f1² 的凹问题
#[derive(Debug, Clone)]
pub struct Zdt2 {
    variables: usize,
}

impl Zdt2 {
    pub fn new(variables: usize) -> Result<Self, Error> {
        Ok(Self {
            variables: check(variables)?,
        })
    }
}

impl Problem for Zdt2 {
    fn name(&self) -> &str {
        "ZDT2"
    }

    fn number_of_variables(&self) -> usize {
        self.variables
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
        let f1 = variables[0];
        let g = g(variables);
        Ok(vec![f1, g * (1.0 - (f1 / g).powi(2))])
    }
}
