use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cluster::{cluster_kpt_matches_with_roi, cluster_lidar_with_roi};
use crate::error::FusionError;
use crate::frame::{DataFrame, LidarCrop, crop_lidar_points};
use crate::matching::{BoxMatches, match_bounding_boxes};
use crate::projection::Projector;
use crate::summary::{ObjectSummary, summarize_objects};
use crate::ttc::{TtcConfig, compute_ttc_camera, compute_ttc_lidar};
use crate::types::{BoundingBox, BoxId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// frames per second, constant over the sequence
    pub frame_rate: f64,
    /// roi shrink applied before lidar association, in `[0, 1)`
    pub shrink_factor: f32,
    /// upstream point filter, `None` to use clouds as given
    pub crop: Option<LidarCrop>,
    pub ttc: TtcConfig,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            frame_rate: 10.0,
            shrink_factor: 0.10,
            crop: Some(LidarCrop::default()),
            ttc: TtcConfig::default(),
        }
    }
}

impl FusionConfig {
    pub fn validate(&self) -> Result<(), FusionError> {
        if !(self.frame_rate > 0.0) {
            return Err(FusionError::InvalidConfig(format!(
                "frame_rate must be positive, got {}",
                self.frame_rate
            )));
        }
        if !(0.0..1.0).contains(&self.shrink_factor) {
            return Err(FusionError::InvalidConfig(format!(
                "shrink_factor must be in [0, 1), got {}",
                self.shrink_factor
            )));
        }
        if !(self.ttc.slot_width > 0.0) {
            return Err(FusionError::InvalidConfig(format!(
                "slot_width must be positive, got {}",
                self.ttc.slot_width
            )));
        }
        if self.ttc.rank_divisor == 0 {
            return Err(FusionError::InvalidConfig(
                "rank_divisor must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Both TTC estimates for one resolved box pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TtcEstimate {
    pub prev_box_id: BoxId,
    pub curr_box_id: BoxId,
    pub votes: usize,
    pub ttc_lidar: f64,
    pub ttc_camera: f64,
    pub lidar_points_prev: usize,
    pub lidar_points_curr: usize,
    pub kpt_matches: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FramePairResult {
    pub time_ns: i64,
    pub box_matches: BoxMatches,
    /// current frame boxes with lidar points and keypoint matches attached
    #[serde(skip)]
    pub boxes: Vec<BoundingBox>,
    pub estimates: Vec<TtcEstimate>,
    pub objects: Vec<ObjectSummary>,
}

/// Crops the frame's cloud and distributes it over the frame's boxes.
///
/// Earlier associations of the boxes are discarded first.
pub fn associate_frame<P: Projector + ?Sized>(
    frame: &mut DataFrame,
    projector: &P,
    config: &FusionConfig,
) {
    if let Some(crop) = &config.crop {
        crop_lidar_points(&mut frame.lidar_points, crop);
    }
    for b in frame.boxes.iter_mut() {
        b.clear_associations();
    }
    cluster_lidar_with_roi(
        &mut frame.boxes,
        &frame.lidar_points,
        config.shrink_factor,
        projector,
    );
}

/// Resolves the boxes of `curr` against `prev` and estimates TTC per pair.
///
/// Both frames must already be associated with [`associate_frame`]; `curr` is
/// left untouched and the keypoint-populated boxes are returned in the result.
pub fn process_frame_pair(
    prev: &DataFrame,
    curr: &DataFrame,
    config: &FusionConfig,
) -> FramePairResult {
    let mut boxes = curr.boxes.clone();
    for b in boxes.iter_mut() {
        b.keypoints.clear();
        b.kpt_matches.clear();
        cluster_kpt_matches_with_roi(b, &prev.keypoints, &curr.keypoints, &curr.kpt_matches);
    }

    let box_matches = match_bounding_boxes(
        &curr.kpt_matches,
        &prev.boxes,
        &prev.keypoints,
        &curr.boxes,
        &curr.keypoints,
    );

    log::trace!(
        "{} box matches, {} unmatched",
        box_matches.len(),
        box_matches.unmatched.len()
    );

    let estimates: Vec<TtcEstimate> = box_matches
        .matches
        .par_iter()
        .filter_map(|(prev_id, m)| {
            let prev_box = prev.find_box(*prev_id)?;
            let curr_box = boxes.iter().find(|b| b.box_id == m.curr_id)?;
            let ttc_lidar = compute_ttc_lidar(
                &prev_box.lidar_points,
                &curr_box.lidar_points,
                config.frame_rate,
                &config.ttc,
            );
            let ttc_camera = compute_ttc_camera(
                &prev.keypoints,
                &curr.keypoints,
                &curr_box.kpt_matches,
                config.frame_rate,
                &config.ttc,
            );
            Some(TtcEstimate {
                prev_box_id: *prev_id,
                curr_box_id: m.curr_id,
                votes: m.votes,
                ttc_lidar,
                ttc_camera,
                lidar_points_prev: prev_box.lidar_points.len(),
                lidar_points_curr: curr_box.lidar_points.len(),
                kpt_matches: curr_box.kpt_matches.len(),
            })
        })
        .collect();

    for e in &estimates {
        log::debug!(
            "box {} -> {}: ttc lidar {:.3} s, ttc camera {:.3} s",
            e.prev_box_id,
            e.curr_box_id,
            e.ttc_lidar,
            e.ttc_camera
        );
    }

    FramePairResult {
        time_ns: curr.time_ns,
        box_matches,
        objects: summarize_objects(&boxes),
        boxes,
        estimates,
    }
}

/// Runs association on every frame, then every consecutive frame pair.
///
/// Frames are associated in parallel, then the pairs are processed in
/// parallel. The result has one entry per pair, in frame order.
pub fn process_sequence<P: Projector + ?Sized>(
    frames: &mut [DataFrame],
    projector: &P,
    config: &FusionConfig,
) -> Result<Vec<FramePairResult>, FusionError> {
    config.validate()?;
    if frames.len() < 2 {
        return Err(FusionError::NotEnoughFrames(frames.len()));
    }
    frames
        .par_iter_mut()
        .for_each(|f| associate_frame(f, projector, config));
    Ok(frames
        .par_windows(2)
        .map(|pair| process_frame_pair(&pair[0], &pair[1], config))
        .collect())
}
