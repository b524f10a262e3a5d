use glam::Vec2;
use nalgebra as na;
use rayon::prelude::*;

use crate::calibration::Calibration;
use crate::types::LidarPoint;

/// Maps sensor-frame points to pixels.
///
/// No depth check is done here. Points at or behind the image plane give
/// non-finite or mirrored pixels and have to be removed upstream, e.g. with
/// [`crate::frame::LidarCrop`].
pub trait Projector
where
    Self: Sync,
{
    fn project_one(&self, pt: &na::Vector3<f64>) -> na::Vector2<f64>;

    fn project_point(&self, p: &LidarPoint) -> Vec2 {
        let px = self.project_one(&p.na_point());
        Vec2::new(px[0] as f32, px[1] as f32)
    }

    fn project(&self, lidar_points: &[LidarPoint]) -> Vec<Vec2> {
        lidar_points
            .par_iter()
            .map(|p| self.project_point(p))
            .collect()
    }
}

/// Pinhole projection `P_rect * R_rect * RT` of lidar points.
#[derive(Debug, Clone)]
pub struct LidarCamera {
    projection: na::Matrix3x4<f64>,
}

impl LidarCamera {
    pub fn new(calib: &Calibration) -> LidarCamera {
        LidarCamera {
            projection: calib.p_rect * calib.r_rect * calib.rt,
        }
    }
}

impl Projector for LidarCamera {
    fn project_one(&self, pt: &na::Vector3<f64>) -> na::Vector2<f64> {
        let x = na::Vector4::new(pt[0], pt[1], pt[2], 1.0);
        let y = self.projection * x;
        na::Vector2::new(y[0] / y[2], y[1] / y[2])
    }
}
