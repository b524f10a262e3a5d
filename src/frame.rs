use serde::{Deserialize, Serialize};

use crate::types::{BoundingBox, BoxId, Keypoint, KeypointMatch, LidarPoint};

/// Everything observed at one timestamp.
///
/// `kpt_matches` links this frame's keypoints to the previous frame's
/// (`query_idx` into the previous frame, `train_idx` into this one) and is
/// empty for the first frame of a sequence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataFrame {
    pub time_ns: i64,
    pub boxes: Vec<BoundingBox>,
    #[serde(default)]
    pub keypoints: Vec<Keypoint>,
    #[serde(default)]
    pub kpt_matches: Vec<KeypointMatch>,
    #[serde(default)]
    pub lidar_points: Vec<LidarPoint>,
}

impl DataFrame {
    pub fn find_box(&self, box_id: BoxId) -> Option<&BoundingBox> {
        self.boxes.iter().find(|b| b.box_id == box_id)
    }
}

/// Region of the point cloud kept for association.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LidarCrop {
    pub min_x: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub min_z: f64,
    pub max_z: f64,
    pub min_r: f64,
}

impl Default for LidarCrop {
    fn default() -> Self {
        Self {
            min_x: 2.0,
            max_x: 20.0,
            max_y: 2.0,
            min_z: -1.5,
            max_z: -0.9,
            min_r: 0.1,
        }
    }
}

impl LidarCrop {
    pub fn keep(&self, p: &LidarPoint) -> bool {
        p.x >= self.min_x
            && p.x <= self.max_x
            && p.y.abs() <= self.max_y
            && p.z >= self.min_z
            && p.z <= self.max_z
            && p.r >= self.min_r
    }
}

pub fn crop_lidar_points(lidar_points: &mut Vec<LidarPoint>, crop: &LidarCrop) {
    let before = lidar_points.len();
    lidar_points.retain(|p| crop.keep(p));
    log::trace!("crop kept {} of {} lidar points", lidar_points.len(), before);
}
