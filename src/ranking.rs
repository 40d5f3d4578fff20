//! 快速非支配排序
//!
//! 对每一对解计算支配关系，记录每个解被多少个解支配、又支配了哪些解；被支配次数为零的解组成第 0 层，
//! 之后逐层剥离。同一层内保持输入顺序。

use crate::comparators::{Dominance, DominanceComparator};
use crate::solution::{Solution, SolutionSet};
use crate::Error;

#[derive(Debug, Clone, Default)]
pub struct Ranking {
    fronts: Vec<SolutionSet>,
}

impl Ranking {
    /// 对解集分层，解被移动到各层中，并写入各自的等级
    pub fn new(set: SolutionSet) -> Result<Self, Error> {
        let indices = Self::fronts_of(set.as_slice())?;
        let mut slots: Vec<Option<Solution>> = set.into_iter().map(Some).collect();
        let mut fronts = Vec::with_capacity(indices.len());
        for (rank, members) in indices.into_iter().enumerate() {
            let mut front = SolutionSet::new(members.len());
            for index in members {
                if let Some(mut solution) = slots[index].take() {
                    solution.rank = rank;
                    front.push(solution)?;
                }
            }
            fronts.push(front);
        }
        Ok(Self { fronts })
    }

    /// 只返回各层成员的序号，不移动解
    pub fn fronts_of(solutions: &[Solution]) -> Result<Vec<Vec<usize>>, Error> {
        let comparator = DominanceComparator;
        let n = solutions.len();
        // 支配 i 的解的个数
        let mut dominated_by = vec![0usize; n];
        // 被 i 支配的解
        let mut dominates: Vec<Vec<usize>> = vec![Vec::new(); n];
        for p in 0..n {
            for q in p + 1..n {
                match comparator.compare(&solutions[p], &solutions[q])? {
                    Dominance::ADominates => {
                        dominates[p].push(q);
                        dominated_by[q] += 1;
                    }
                    Dominance::BDominates => {
                        dominates[q].push(p);
                        dominated_by[p] += 1;
                    }
                    Dominance::Incomparable => {}
                }
            }
        }
        let mut fronts = Vec::new();
        let mut current: Vec<usize> = (0..n).filter(|&i| dominated_by[i] == 0).collect();
        while !current.is_empty() {
            let mut next = Vec::new();
            for &p in &current {
                for &q in &dominates[p] {
                    dominated_by[q] -= 1;
                    if dominated_by[q] == 0 {
                        next.push(q);
                    }
                }
            }
            next.sort_unstable();
            fronts.push(current);
            current = next;
        }
        Ok(fronts)
    }

    pub fn subfront(&self, rank: usize) -> Option<&SolutionSet> {
        self.fronts.get(rank)
    }

    pub fn number_of_subfronts(&self) -> usize {
        self.fronts.len()
    }

    pub fn fronts(&self) -> &[SolutionSet] {
        &self.fronts
    }

    pub fn into_fronts(self) -> Vec<SolutionSet> {
        self.fronts
    }

    pub fn len(&self) -> usize {
        self.fronts.iter().map(SolutionSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.fronts.is_empty()
    }
}
