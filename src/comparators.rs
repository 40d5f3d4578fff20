//! 解之间的比较器
//!
//! 所有目标都按最小化处理。

use crate::solution::Solution;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// 两个解之间的支配关系
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dominance {
    ADominates,
    BDominates,
    Incomparable,
}

impl Dominance {
    /// 分类器标签的固定顺序，与 -1、0、1 一一对应
    pub const LABELS: [Dominance; 3] = [
        Dominance::ADominates,
        Dominance::Incomparable,
        Dominance::BDominates,
    ];

    pub fn flag(self) -> i8 {
        match self {
            Dominance::ADominates => -1,
            Dominance::Incomparable => 0,
            Dominance::BDominates => 1,
        }
    }

    pub fn from_flag(flag: i8) -> Option<Self> {
        match flag {
            -1 => Some(Dominance::ADominates),
            0 => Some(Dominance::Incomparable),
            1 => Some(Dominance::BDominates),
            _ => None,
        }
    }

    /// 在 `LABELS` 中的位置
    pub fn label_index(self) -> usize {
        (self.flag() + 1) as usize
    }

    pub fn reverse(self) -> Self {
        match self {
            Dominance::ADominates => Dominance::BDominates,
            Dominance::BDominates => Dominance::ADominates,
            Dominance::Incomparable => Dominance::Incomparable,
        }
    }
}

impl From<Dominance> for Ordering {
    fn from(value: Dominance) -> Self {
        match value {
            Dominance::ADominates => Ordering::Less,
            Dominance::Incomparable => Ordering::Equal,
            Dominance::BDominates => Ordering::Greater,
        }
    }
}

/// Pareto 支配比较器；约束违反量优先于目标值
#[derive(Debug, Clone, Copy, Default)]
pub struct DominanceComparator;

impl DominanceComparator {
    pub fn compare(&self, a: &Solution, b: &Solution) -> Result<Dominance, Error> {
        if a.number_of_objectives() != b.number_of_objectives() {
            return Err(Error::DimensionMismatch {
                expected: a.number_of_objectives(),
                found: b.number_of_objectives(),
            });
        }
        let (va, vb) = (a.constraint_violation(), b.constraint_violation());
        if (va != 0.0 || vb != 0.0) && va != vb {
            return Ok(if va < vb {
                Dominance::ADominates
            } else {
                Dominance::BDominates
            });
        }
        Ok(Self::compare_objectives(a.objectives(), b.objectives()))
    }

    /// 只比较目标值，调用者保证长度一致
    pub fn compare_objectives(a: &[f64], b: &[f64]) -> Dominance {
        let mut a_better = false;
        let mut b_better = false;
        for (x, y) in a.iter().zip(b) {
            if x < y {
                a_better = true;
            } else if y < x {
                b_better = true;
            }
            if a_better && b_better {
                return Dominance::Incomparable;
            }
        }
        match (a_better, b_better) {
            (true, false) => Dominance::ADominates,
            (false, true) => Dominance::BDominates,
            _ => Dominance::Incomparable,
        }
    }
}

/// 拥挤距离大的排在前面
#[derive(Debug, Clone, Copy, Default)]
pub struct CrowdingComparator;

impl CrowdingComparator {
    pub fn compare(&self, a: &Solution, b: &Solution) -> Ordering {
        b.crowding_distance.total_cmp(&a.crowding_distance)
    }
}

/// 先比较非支配等级，等级相同时比较拥挤距离
#[derive(Debug, Clone, Copy, Default)]
pub struct RankCrowdingComparator;

impl RankCrowdingComparator {
    pub fn compare(&self, a: &Solution, b: &Solution) -> Ordering {
        a.rank
            .cmp(&b.rank)
            .then_with(|| CrowdingComparator.compare(a, b))
    }
}
