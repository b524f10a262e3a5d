use serde::{Deserialize, Serialize};

use crate::types::{BoundingBox, BoxId};

/// Top-view extent of the lidar points attached to one box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectSummary {
    pub box_id: BoxId,
    pub num_points: usize,
    /// closest forward distance in meters
    pub x_min: f64,
    /// lateral extent `y_max - y_min` in meters
    pub y_width: f64,
}

impl ObjectSummary {
    /// `None` for a box without lidar points.
    pub fn from_box(bounding_box: &BoundingBox) -> Option<ObjectSummary> {
        let first = bounding_box.lidar_points.first()?;
        let (x_min, y_min, y_max) = bounding_box.lidar_points.iter().fold(
            (first.x, first.y, first.y),
            |(x_min, y_min, y_max), p| (x_min.min(p.x), y_min.min(p.y), y_max.max(p.y)),
        );
        Some(ObjectSummary {
            box_id: bounding_box.box_id,
            num_points: bounding_box.lidar_points.len(),
            x_min,
            y_width: y_max - y_min,
        })
    }
}

pub fn summarize_objects(boxes: &[BoundingBox]) -> Vec<ObjectSummary> {
    boxes.iter().filter_map(ObjectSummary::from_box).collect()
}
