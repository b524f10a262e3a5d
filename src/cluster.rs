use glam::Vec2;
use rayon::prelude::*;

use crate::projection::Projector;
use crate::types::{BoundingBox, Keypoint, KeypointMatch, LidarPoint, Roi};

/// Index of the only roi containing `pt`, `None` if zero or several do.
fn unique_enclosing(rois: &[Roi], pt: Vec2) -> Option<usize> {
    let mut enclosing = rois
        .iter()
        .enumerate()
        .filter(|(_, roi)| roi.contains(pt))
        .map(|(i, _)| i);
    let first = enclosing.next()?;
    if enclosing.next().is_some() {
        None
    } else {
        Some(first)
    }
}

/// Distributes lidar points over the boxes whose projected roi contains them.
///
/// Each roi is first shrunk by `shrink_factor` to keep edge returns out. A
/// point is appended to a box only when exactly one shrunk roi encloses its
/// projection; background and ambiguous points are dropped.
pub fn cluster_lidar_with_roi<P: Projector + ?Sized>(
    boxes: &mut [BoundingBox],
    lidar_points: &[LidarPoint],
    shrink_factor: f32,
    projector: &P,
) {
    let rois: Vec<Roi> = boxes.iter().map(|b| b.roi.shrink(shrink_factor)).collect();
    let owners: Vec<Option<usize>> = lidar_points
        .par_iter()
        .map(|p| unique_enclosing(&rois, projector.project_point(p)))
        .collect();

    let mut assigned = 0;
    for (p, owner) in lidar_points.iter().zip(owners) {
        if let Some(idx) = owner {
            boxes[idx].lidar_points.push(*p);
            assigned += 1;
        }
    }
    log::trace!(
        "{} of {} lidar points assigned to {} boxes",
        assigned,
        lidar_points.len(),
        boxes.len()
    );
}

/// Attaches to `bounding_box` every match whose current keypoint lies in its roi.
///
/// The roi is used as is. A match may end up in several overlapping boxes.
/// Matches indexing past either keypoint list are skipped.
pub fn cluster_kpt_matches_with_roi(
    bounding_box: &mut BoundingBox,
    kpts_prev: &[Keypoint],
    kpts_curr: &[Keypoint],
    kpt_matches: &[KeypointMatch],
) {
    for m in kpt_matches {
        if m.query_idx >= kpts_prev.len() {
            log::warn!("skip match with query index {} out of range", m.query_idx);
            continue;
        }
        let Some(kp_curr) = kpts_curr.get(m.train_idx) else {
            log::warn!("skip match with train index {} out of range", m.train_idx);
            continue;
        };
        if bounding_box.roi.contains(kp_curr.pt) {
            bounding_box.kpt_matches.push(*m);
            bounding_box.keypoints.push(*kp_curr);
        }
    }
}
