//! 拥挤距离

use crate::solution::{Solution, SolutionSet};

/// 计算一层中每个解的拥挤距离，不写回解
pub fn crowding_distances(front: &[Solution], number_of_objectives: usize) -> Vec<f64> {
    let size = front.len();
    if size <= 2 {
        return vec![f64::INFINITY; size];
    }
    let mut distances = vec![0.0; size];
    let mut order: Vec<usize> = (0..size).collect();
    for objective in 0..number_of_objectives {
        // 稳定排序，相同目标值保持原有次序
        order.sort_by(|&a, &b| {
            front[a]
                .objective(objective)
                .total_cmp(&front[b].objective(objective))
        });
        let min = front[order[0]].objective(objective);
        let max = front[order[size - 1]].objective(objective);
        distances[order[0]] = f64::INFINITY;
        distances[order[size - 1]] = f64::INFINITY;
        let range = max - min;
        if range == 0.0 {
            continue;
        }
        for window in order.windows(3) {
            let (previous, current, next) = (window[0], window[1], window[2]);
            let gap = front[next].objective(objective) - front[previous].objective(objective);
            distances[current] += gap / range;
        }
    }
    distances
}

/// 计算拥挤距离并写入每个解
pub fn crowding_distance_assignment(front: &mut SolutionSet, number_of_objectives: usize) {
    let distances = crowding_distances(front.as_slice(), number_of_objectives);
    for (solution, distance) in front.iter_mut().zip(distances) {
        solution.crowding_distance = distance;
    }
}
