use glam::Vec2;
use nalgebra as na;
use serde::{Deserialize, Serialize};

/// Detector-assigned box identity, unique within one frame.
pub type BoxId = u32;

/// Single lidar return in sensor coordinates.
///
/// x points forward, y to the left and z up, all in meters. `r` is the
/// reflectivity reported by the sensor; plain `(x, y, z)` points count as
/// fully reflective.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LidarPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default = "default_reflectivity")]
    pub r: f64,
}

fn default_reflectivity() -> f64 {
    1.0
}

impl LidarPoint {
    pub fn new(x: f64, y: f64, z: f64) -> LidarPoint {
        LidarPoint {
            x,
            y,
            z,
            r: default_reflectivity(),
        }
    }
    pub fn na_point(&self) -> na::Vector3<f64> {
        na::Vector3::new(self.x, self.y, self.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Keypoint {
    pub pt: Vec2,
    #[serde(default)]
    pub size: f32,
    #[serde(default)]
    pub response: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32) -> Keypoint {
        Keypoint {
            pt: Vec2::new(x, y),
            size: 1.0,
            response: 0.0,
        }
    }
}

/// Correspondence between keypoint `query_idx` of the previous frame and
/// keypoint `train_idx` of the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct KeypointMatch {
    pub query_idx: usize,
    pub train_idx: usize,
    #[serde(default)]
    pub distance: f32,
}

impl KeypointMatch {
    pub fn new(query_idx: usize, train_idx: usize) -> KeypointMatch {
        KeypointMatch {
            query_idx,
            train_idx,
            distance: 0.0,
        }
    }
}

/// Axis aligned rectangle in pixel space.
///
/// Containment is half-open: `x <= px < x + width`, same along y.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Roi {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Roi {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Roi {
        Roi {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest roi covering all `pts`, `None` for an empty slice.
    pub fn bounding(pts: &[Vec2]) -> Option<Roi> {
        let first = pts.first()?;
        let (min, max) = pts
            .iter()
            .fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)));
        let size = max - min;
        Some(Roi::new(min.x, min.y, size.x, size.y))
    }

    pub fn contains(&self, pt: Vec2) -> bool {
        pt.x >= self.x
            && pt.x < self.x + self.width
            && pt.y >= self.y
            && pt.y < self.y + self.height
    }

    /// Contracts the roi symmetrically around its center.
    ///
    /// The new size is `(1 - shrink_factor)` of the current one and the origin
    /// moves by half of the removed extent.
    pub fn shrink(&self, shrink_factor: f32) -> Roi {
        Roi {
            x: self.x + shrink_factor * self.width / 2.0,
            y: self.y + shrink_factor * self.height / 2.0,
            width: self.width * (1.0 - shrink_factor),
            height: self.height * (1.0 - shrink_factor),
        }
    }
}

/// Detection box of one frame plus everything associated to it.
///
/// The detector fills `box_id`, `roi`, `class_id` and `confidence`; the
/// associators append to the three collections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub box_id: BoxId,
    pub roi: Roi,
    #[serde(default)]
    pub class_id: i32,
    #[serde(default)]
    pub confidence: f32,
    #[serde(default)]
    pub lidar_points: Vec<LidarPoint>,
    #[serde(default)]
    pub keypoints: Vec<Keypoint>,
    #[serde(default)]
    pub kpt_matches: Vec<KeypointMatch>,
}

impl BoundingBox {
    pub fn new(box_id: BoxId, roi: Roi) -> BoundingBox {
        BoundingBox {
            box_id,
            roi,
            ..Default::default()
        }
    }

    pub fn clear_associations(&mut self) {
        self.lidar_points.clear();
        self.keypoints.clear();
        self.kpt_matches.clear();
    }
}
