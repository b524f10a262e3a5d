use serde::{Deserialize, Serialize};

use crate::types::{Keypoint, KeypointMatch, LidarPoint};
use crate::util::{bucket_minima, median, sorted_values};

pub const SLOT_WIDTH: f64 = 0.10;
pub const RANK_DIVISOR: usize = 3;
pub const MIN_PIXEL_DISTANCE: f64 = 100.0;

/// Robustness knobs of both estimators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtcConfig {
    /// lateral bucket width in meters
    pub slot_width: f64,
    /// the closest distance is taken at rank `count / rank_divisor`
    pub rank_divisor: usize,
    /// collapse equal slot minima before ranking
    pub dedup_slot_minima: bool,
    /// smallest current-frame keypoint distance in pixels that yields a ratio
    pub min_pixel_distance: f64,
    /// previous-frame keypoint distances at or below this are skipped
    pub ratio_epsilon: f64,
}

impl Default for TtcConfig {
    fn default() -> Self {
        Self {
            slot_width: SLOT_WIDTH,
            rank_divisor: RANK_DIVISOR,
            dedup_slot_minima: true,
            min_pixel_distance: MIN_PIXEL_DISTANCE,
            ratio_epsilon: f64::EPSILON,
        }
    }
}

/// Per lateral slot minimum forward distance, sorted ascending.
pub fn slot_minima(lidar_points: &[LidarPoint], config: &TtcConfig) -> Vec<f64> {
    let minima = bucket_minima(
        lidar_points
            .iter()
            .map(|p| ((p.y / config.slot_width).floor() as i64, p.x)),
    );
    sorted_values(minima.into_values().collect(), config.dedup_slot_minima)
}

/// Robust closest forward distance of a cloud.
///
/// Takes the slot minima at rank `count / rank_divisor` so that a few spurious
/// returns in front of the object do not drive the estimate. `None` for an
/// empty cloud.
pub fn closest_distance(lidar_points: &[LidarPoint], config: &TtcConfig) -> Option<f64> {
    let minima = slot_minima(lidar_points, config);
    let rank = minima.len() / config.rank_divisor.max(1);
    let selected = minima.get(rank).copied();
    log::debug!(
        "lidar distance correction {:?} selected={:?} @={}",
        minima,
        selected,
        rank
    );
    selected
}

/// TTC from the robust closest distances of two consecutive clouds.
///
/// NaN when either cloud is empty; infinite when the distance did not change;
/// negative for a receding object.
pub fn compute_ttc_lidar(
    lidar_points_prev: &[LidarPoint],
    lidar_points_curr: &[LidarPoint],
    frame_rate: f64,
    config: &TtcConfig,
) -> f64 {
    let (Some(min_x_prev), Some(min_x_curr)) = (
        closest_distance(lidar_points_prev, config),
        closest_distance(lidar_points_curr, config),
    ) else {
        return f64::NAN;
    };
    let dt = 1.0 / frame_rate;
    min_x_curr * dt / (min_x_prev - min_x_curr)
}

/// Ratios of current to previous pixel distance for every pair of matches.
///
/// Pairs whose previous distance is within `ratio_epsilon` of zero, or whose
/// current distance is under `min_pixel_distance`, are left out.
pub fn distance_ratios(
    kpts_prev: &[Keypoint],
    kpts_curr: &[Keypoint],
    kpt_matches: &[KeypointMatch],
    config: &TtcConfig,
) -> Vec<f64> {
    let pairs: Vec<_> = kpt_matches
        .iter()
        .filter_map(|m| Some((kpts_prev.get(m.query_idx)?.pt, kpts_curr.get(m.train_idx)?.pt)))
        .collect();
    if pairs.len() < kpt_matches.len() {
        log::warn!(
            "skip {} matches with index out of range",
            kpt_matches.len() - pairs.len()
        );
    }

    let mut ratios = Vec::new();
    for (i, (outer_prev, outer_curr)) in pairs.iter().enumerate() {
        for (inner_prev, inner_curr) in &pairs[i + 1..] {
            let dist_curr = outer_curr.as_dvec2().distance(inner_curr.as_dvec2());
            let dist_prev = outer_prev.as_dvec2().distance(inner_prev.as_dvec2());
            if dist_prev > config.ratio_epsilon && dist_curr >= config.min_pixel_distance {
                ratios.push(dist_curr / dist_prev);
            }
        }
    }
    ratios
}

/// TTC from the median scale change of the keypoints on one object.
///
/// NaN when no distance ratio survives filtering; infinite when the median
/// ratio is exactly one.
pub fn compute_ttc_camera(
    kpts_prev: &[Keypoint],
    kpts_curr: &[Keypoint],
    kpt_matches: &[KeypointMatch],
    frame_rate: f64,
    config: &TtcConfig,
) -> f64 {
    let mut ratios = distance_ratios(kpts_prev, kpts_curr, kpt_matches, config);
    let Some(med_dist_ratio) = median(&mut ratios) else {
        return f64::NAN;
    };
    let dt = 1.0 / frame_rate;
    -dt / (1.0 - med_dist_ratio)
}
