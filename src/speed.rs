//! 基于加速度合值序列的速度估算
//!
//! 峰值为达到 [`PEAK_HEIGHT`] 的局部极大值。从每个峰值向前回溯，
//! 合值大于 [`WALK_FLOOR`] 且未到达下标 0 时累加 `magnitude * STEP_WEIGHT`。
//! 结果只记在峰值记录上，其余记录速度为 0。

use crate::types::SpeedSample;

/// 局部极大值计为峰值的最小合值 (m/s²)
pub const PEAK_HEIGHT: f64 = 10.0;
/// 回溯遇到不大于该值的合值即停止
pub const WALK_FLOOR: f64 = 0.5;
/// 回溯经过的每个合值的权重
pub const STEP_WEIGHT: f64 = 0.01;

/// 查找不低于 min_height 的局部极大值
///
/// 两侧都更低的平顶只报告一个峰值，取中间下标（宽度为偶数时取靠前的一个）。
/// 首尾两个点永远不是峰值。
pub fn find_peaks(values: &[f64], min_height: f64) -> Vec<usize> {
    let mut peaks = Vec::new();
    if values.len() < 3 {
        return peaks;
    }

    let last = values.len() - 1;
    let mut i = 1;
    while i < last {
        if values[i - 1] < values[i] {
            let mut ahead = i + 1;
            while ahead < last && values[ahead] == values[i] {
                ahead += 1;
            }
            if values[ahead] < values[i] {
                let middle = (i + ahead - 1) / 2;
                if values[middle] >= min_height {
                    peaks.push(middle);
                }
                i = ahead;
            }
        }
        i += 1;
    }

    peaks
}

fn walk_back(magnitudes: &[f64], peak: usize) -> f64 {
    let mut speed = 0.0;
    let mut i = peak;
    while magnitudes[i] > WALK_FLOOR && i > 0 {
        speed += magnitudes[i] * STEP_WEIGHT;
        i -= 1;
    }
    speed
}

/// 为有序的 `(id, magnitude)` 序列逐条估算速度
///
/// 输出与输入一一对应、顺序相同，峰值下标通过输入表映射回记录 id。
pub fn estimate_speeds(series: &[(i64, f64)]) -> Vec<SpeedSample> {
    let mut speeds: Vec<SpeedSample> = series
        .iter()
        .map(|&(id, _)| SpeedSample { id, speed: 0.0 })
        .collect();

    if series.is_empty() {
        return speeds;
    }

    let magnitudes: Vec<f64> = series.iter().map(|&(_, m)| m).collect();
    for peak in find_peaks(&magnitudes, PEAK_HEIGHT) {
        speeds[peak].speed = walk_back(&magnitudes, peak);
    }

    speeds
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn series(magnitudes: &[f64]) -> Vec<(i64, f64)> {
        magnitudes
            .iter()
            .enumerate()
            .map(|(i, &m)| (100 + i as i64, m))
            .collect()
    }

    #[test]
    fn reference_scenario() {
        let input = series(&[2.0, 12.0, 3.0, 0.2, 11.0, 0.6, 0.4]);
        assert_eq!(find_peaks(&[2.0, 12.0, 3.0, 0.2, 11.0, 0.6, 0.4], PEAK_HEIGHT), vec![1, 4]);

        let speeds = estimate_speeds(&input);
        assert_eq!(speeds.len(), 7);
        assert!(close(speeds[1].speed, 0.12));
        assert!(close(speeds[4].speed, 0.11));
        for i in [0, 2, 3, 5, 6] {
            assert_eq!(speeds[i].speed, 0.0);
        }
        let ids: Vec<i64> = speeds.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![100, 101, 102, 103, 104, 105, 106]);
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(estimate_speeds(&[]).is_empty());
    }

    #[test]
    fn walk_accumulates_until_floor() {
        // 峰值在 4，回溯 4,3,2 后遇到 0.3 停止
        let speeds = estimate_speeds(&series(&[5.0, 0.3, 2.0, 6.0, 15.0, 1.0]));
        assert!(close(speeds[4].speed, (15.0 + 6.0 + 2.0) * STEP_WEIGHT));
        assert_eq!(speeds[3].speed, 0.0);
    }

    #[test]
    fn walk_never_includes_index_zero() {
        let speeds = estimate_speeds(&series(&[9.0, 9.5, 20.0, 1.0]));
        assert!(close(speeds[2].speed, (20.0 + 9.5) * STEP_WEIGHT));
    }

    #[test]
    fn peaks_below_height_are_ignored() {
        assert!(find_peaks(&[1.0, 9.99, 1.0], PEAK_HEIGHT).is_empty());
        assert_eq!(find_peaks(&[1.0, 10.0, 1.0], PEAK_HEIGHT), vec![1]);
    }

    #[test]
    fn endpoints_are_never_peaks() {
        assert!(find_peaks(&[50.0, 1.0, 50.0], PEAK_HEIGHT).is_empty());
        assert!(find_peaks(&[50.0, 40.0], PEAK_HEIGHT).is_empty());
    }

    #[test]
    fn plateau_reports_middle_index() {
        assert_eq!(find_peaks(&[1.0, 12.0, 12.0, 12.0, 1.0], PEAK_HEIGHT), vec![2]);
        assert_eq!(find_peaks(&[1.0, 12.0, 12.0, 1.0], PEAK_HEIGHT), vec![1]);
    }

    #[test]
    fn plateau_running_into_the_end_is_not_a_peak() {
        assert!(find_peaks(&[1.0, 12.0, 12.0, 12.0], PEAK_HEIGHT).is_empty());
        // 右侧继续上升的台阶也不是峰
        assert_eq!(find_peaks(&[1.0, 12.0, 12.0, 14.0, 2.0], PEAK_HEIGHT), vec![3]);
    }

    #[test]
    fn peak_walk_stops_immediately_on_low_peak_neighbour() {
        let speeds = estimate_speeds(&series(&[0.1, 0.2, 11.0, 0.1]));
        assert!(close(speeds[2].speed, 0.11));
    }
}
