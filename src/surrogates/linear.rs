//! 线性回归
//!
//! 在中心化的数据上求解带微小岭项的正规方程，截距由均值还原。样本少于特征数时岭项保证方程可解。

use super::{Regressor, TrainSet, MIN_TRAINING_ROWS};
use crate::Error;
use ndarray::{Array1, Array2};

const RIDGE: f64 = 1e-8;
const PIVOT_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, Default)]
pub struct LinearRegression {
    coefficients: Vec<f64>,
    intercept: f64,
    fitted: bool,
}

impl LinearRegression {
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl Regressor for LinearRegression {
    fn fit(&mut self, train_set: &TrainSet) -> Result<(), Error> {
        let rows = train_set.len();
        if rows < MIN_TRAINING_ROWS {
            return Err(Error::NotTrained {
                rows,
                required: MIN_TRAINING_ROWS,
            });
        }
        let width = train_set.width().unwrap_or(0);
        let mut x = Array2::<f64>::zeros((rows, width));
        for (i, row) in train_set.features().iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                x[[i, j]] = *value;
            }
        }
        let y = Array1::from_vec(train_set.targets().to_vec());
        let x_mean = x.sum_axis(ndarray::Axis(0)) / rows as f64;
        let y_mean = y.sum() / rows as f64;
        let centered_x = &x - &x_mean;
        let centered_y = &y - y_mean;
        let mut gram = centered_x.t().dot(&centered_x);
        for j in 0..width {
            gram[[j, j]] += RIDGE;
        }
        let moment = centered_x.t().dot(&centered_y);
        let coefficients = solve(gram, moment);
        self.intercept = y_mean
            - coefficients
                .iter()
                .zip(x_mean.iter())
                .map(|(b, m)| b * m)
                .sum::<f64>();
        self.coefficients = coefficients;
        self.fitted = true;
        Ok(())
    }

    fn predict(&self, features: &[f64]) -> Result<f64, Error> {
        if !self.fitted {
            return Err(Error::NotTrained {
                rows: 0,
                required: MIN_TRAINING_ROWS,
            });
        }
        if features.len() != self.coefficients.len() {
            return Err(Error::DimensionMismatch {
                expected: self.coefficients.len(),
                found: features.len(),
            });
        }
        let value = self
            .coefficients
            .iter()
            .zip(features)
            .map(|(b, x)| b * x)
            .sum::<f64>();
        Ok(self.intercept + value)
    }
}

/// 列主元高斯消元；主元过小的未知数取 0
fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Vec<f64> {
    let n = b.len();
    let mut usable = vec![true; n];
    for column in 0..n {
        let pivot_row = (column..n)
            .max_by(|&i, &j| a[[i, column]].abs().total_cmp(&a[[j, column]].abs()))
            .unwrap_or(column);
        if a[[pivot_row, column]].abs() < PIVOT_TOLERANCE {
            usable[column] = false;
            continue;
        }
        if pivot_row != column {
            for k in 0..n {
                a.swap([pivot_row, k], [column, k]);
            }
            b.swap(pivot_row, column);
        }
        for row in column + 1..n {
            let factor = a[[row, column]] / a[[column, column]];
            if factor == 0.0 {
                continue;
            }
            for k in column..n {
                a[[row, k]] -= factor * a[[column, k]];
            }
            b[row] -= factor * b[column];
        }
    }
    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        if !usable[row] {
            continue;
        }
        let tail: f64 = (row + 1..n).map(|k| a[[row, k]] * x[k]).sum();
        x[row] = (b[row] - tail) / a[[row, row]];
    }
    x
}
