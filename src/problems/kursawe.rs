use super::Problem;
use crate::Error;

/// Kursawe 问题，决策变量在 [-5, 5] 中，前沿不连续
#[derive(Debug, Clone)]
pub struct Kursawe {
    variables: usize,
}

impl Kursawe {
    pub fn new(variables: usize) -> Result<Self, Error> {
        if variables < 2 {
            return Err(Error::InvalidConfig(format!(
                "Kursawe 问题至少需要 2 个变量，给出了 {variables} 个"
            )));
        }
        Ok(Self { variables })
    }
}

impl Problem for Kursawe {
    fn name(&self) -> &str {
        "Kursawe"
    }

    fn number_of_variables(&self) -> usize {
        self.variables
    }

    fn number_of_objectives(&self) -> usize {
        2
    }

    fn lower_bound(&self, _index: usize) -> f64 {
        -5.0
    }

    fn upper_bound(&self, _index: usize) -> f64 {
        5.0
    }

    fn evaluate(&mut self, x: &[f64]) -> Result<Vec<f64>, Error> {
        let f1: f64 = x
            .windows(2)
            .map(|w| -10.0 * (-0.2 * (w[0] * w[0] + w[1] * w[1]).sqrt()).exp())
            .sum();
        let f2: f64 = x
            .iter()
            .map(|xi| xi.abs().powf(0.8) + 5.0 * xi.powi(3).sin())
            .sum();
        Ok(vec![f1, f2])
    }
}
