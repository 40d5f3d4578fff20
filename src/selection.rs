//! 环境选择：按层接收解，最后一层按拥挤距离截断

use crate::distance::crowding_distance_assignment;
use crate::ranking::Ranking;
use crate::solution::SolutionSet;
use crate::Error;

/// 从分好层的解中选出恰好 `size` 个解
///
/// 整层能放下时整层接收；放不下的那一层先计算拥挤距离，保留距离最大的若干个。
/// 距离相同时保留序号较小的。候选解不足时返回 [`Error::Underflow`]。
pub fn environmental_selection(ranking: Ranking, size: usize) -> Result<SolutionSet, Error> {
    let available = ranking.len();
    if available < size {
        return Err(Error::Underflow {
            requested: size,
            available,
        });
    }
    let mut population = SolutionSet::new(size);
    for mut front in ranking.into_fronts() {
        let remaining = size - population.len();
        if remaining == 0 {
            break;
        }
        let number_of_objectives = front.get(0).map_or(0, |s| s.number_of_objectives());
        crowding_distance_assignment(&mut front, number_of_objectives);
        if front.len() > remaining {
            // sort_by 是稳定的
            front.sort_by(|a, b| b.crowding_distance.total_cmp(&a.crowding_distance));
            front.truncate(remaining);
        }
        for solution in front {
            population.push(solution)?;
        }
    }
    Ok(population)
}
