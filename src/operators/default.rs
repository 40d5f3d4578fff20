use super::{Crossover, Mutation, Selection};
use crate::comparators::RankCrowdingComparator;
use crate::problems::Problem;
use crate::solution::{Solution, SolutionSet};
use rand::Rng;
use std::cmp::Ordering;

/// 两个变量的差小于这个值时不做交叉
const EPSILON: f64 = 1e-14;

/// 模拟二进制交叉（SBX）
#[derive(Debug, Clone, Copy)]
pub struct SbxCrossover {
    pub probability: f64,
    pub distribution_index: f64,
}

impl Default for SbxCrossover {
    fn default() -> Self {
        Self {
            probability: 0.9,
            distribution_index: 20.0,
        }
    }
}

impl SbxCrossover {
    fn spread(&self, beta: f64, u: f64) -> f64 {
        let eta = self.distribution_index;
        let alpha = 2.0 - beta.powf(-(eta + 1.0));
        if u <= 1.0 / alpha {
            (u * alpha).powf(1.0 / (eta + 1.0))
        } else {
            (1.0 / (2.0 - u * alpha)).powf(1.0 / (eta + 1.0))
        }
    }
}

impl Crossover for SbxCrossover {
    fn execute<R: Rng + ?Sized>(
        &self,
        parents: [&Solution; 2],
        problem: &dyn Problem,
        rng: &mut R,
    ) -> [Solution; 2] {
        let mut first = Solution::new(parents[0].variables().to_vec(), parents[0].number_of_objectives());
        let mut second = Solution::new(parents[1].variables().to_vec(), parents[1].number_of_objectives());
        if rng.random::<f64>() > self.probability {
            return [first, second];
        }
        let x1 = first.variables_mut();
        let x2 = second.variables_mut();
        for i in 0..x1.len().min(x2.len()) {
            if rng.random::<f64>() > 0.5 || (x1[i] - x2[i]).abs() <= EPSILON {
                continue;
            }
            let (y1, y2) = if x1[i] < x2[i] { (x1[i], x2[i]) } else { (x2[i], x1[i]) };
            let (lower, upper) = (problem.lower_bound(i), problem.upper_bound(i));
            let u = rng.random::<f64>();
            let beta_low = 1.0 + 2.0 * (y1 - lower) / (y2 - y1);
            let c1 = 0.5 * ((y1 + y2) - self.spread(beta_low, u) * (y2 - y1));
            let beta_high = 1.0 + 2.0 * (upper - y2) / (y2 - y1);
            let c2 = 0.5 * ((y1 + y2) + self.spread(beta_high, u) * (y2 - y1));
            let (c1, c2) = (c1.clamp(lower, upper), c2.clamp(lower, upper));
            if rng.random::<f64>() <= 0.5 {
                x1[i] = c2;
                x2[i] = c1;
            } else {
                x1[i] = c1;
                x2[i] = c2;
            }
        }
        [first, second]
    }
}

/// 多项式变异；`probability` 缺省时为 1 / 变量个数
#[derive(Debug, Clone, Copy)]
pub struct PolynomialMutation {
    pub probability: Option<f64>,
    pub distribution_index: f64,
}

impl Default for PolynomialMutation {
    fn default() -> Self {
        Self {
            probability: None,
            distribution_index: 20.0,
        }
    }
}

impl Mutation for PolynomialMutation {
    fn execute<R: Rng + ?Sized>(&self, solution: &mut Solution, problem: &dyn Problem, rng: &mut R) {
        let n = solution.number_of_variables();
        if n == 0 {
            return;
        }
        let probability = self.probability.unwrap_or(1.0 / n as f64);
        let power = 1.0 / (self.distribution_index + 1.0);
        let variables = solution.variables_mut();
        for (i, y) in variables.iter_mut().enumerate() {
            if rng.random::<f64>() > probability {
                continue;
            }
            let (lower, upper) = (problem.lower_bound(i), problem.upper_bound(i));
            let width = upper - lower;
            if width <= 0.0 {
                continue;
            }
            let delta1 = (*y - lower) / width;
            let delta2 = (upper - *y) / width;
            let u = rng.random::<f64>();
            let eta = self.distribution_index;
            let deltaq = if u <= 0.5 {
                let value = 2.0 * u + (1.0 - 2.0 * u) * (1.0 - delta1).powf(eta + 1.0);
                value.powf(power) - 1.0
            } else {
                let value = 2.0 * (1.0 - u) + 2.0 * (u - 0.5) * (1.0 - delta2).powf(eta + 1.0);
                1.0 - value.powf(power)
            };
            *y = (*y + deltaq * width).clamp(lower, upper);
        }
    }
}

/// 二元锦标赛：先比非支配等级，再比拥挤距离，仍相同时随机取一个
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryTournament;

impl Selection for BinaryTournament {
    fn execute<'a, R: Rng + ?Sized>(&self, population: &'a SolutionSet, rng: &mut R) -> Option<&'a Solution> {
        if population.is_empty() {
            return None;
        }
        let a = &population[rng.random_range(0..population.len())];
        let b = &population[rng.random_range(0..population.len())];
        let winner = match RankCrowdingComparator.compare(a, b) {
            Ordering::Less => a,
            Ordering::Greater => b,
            Ordering::Equal => {
                if rng.random::<bool>() {
                    a
                } else {
                    b
                }
            }
        };
        Some(winner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problems::Zdt1;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn offspring_stay_in_bounds() {
        let problem = Zdt1::new(5).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let crossover = SbxCrossover {
            probability: 1.0,
            ..Default::default()
        };
        let mutation = PolynomialMutation {
            probability: Some(1.0),
            ..Default::default()
        };
        let a = Solution::with_objectives(vec![0.0, 0.2, 0.4, 0.6, 1.0], vec![0.0, 0.0]);
        let b = Solution::with_objectives(vec![1.0, 0.8, 0.6, 0.4, 0.0], vec![0.0, 0.0]);
        for _ in 0..200 {
            let [mut c, mut d] = crossover.execute([&a, &b], &problem, &mut rng);
            mutation.execute(&mut c, &problem, &mut rng);
            mutation.execute(&mut d, &problem, &mut rng);
            for child in [&c, &d] {
                assert!(!child.is_evaluated());
                assert!(child.variables().iter().all(|x| (0.0..=1.0).contains(x)));
            }
        }
    }

    #[test]
    fn tournament_prefers_lower_rank() {
        let mut good = Solution::with_objectives(vec![0.0], vec![0.0, 0.0]);
        let mut bad = good.clone();
        good.rank = 0;
        bad.rank = 3;
        let population: SolutionSet = vec![good, bad].into();
        let mut rng = StdRng::seed_from_u64(1);
        let mut wins = 0;
        for _ in 0..100 {
            if BinaryTournament.execute(&population, &mut rng).unwrap().rank == 0 {
                wins += 1;
            }
        }
        // 只有两个都抽到差解时才会选中它
        assert!(wins > 50);
        assert!(BinaryTournament.execute(&SolutionSet::default(), &mut rng).is_none());
    }
}
