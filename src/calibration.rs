use nalgebra as na;
use serde::{Deserialize, Serialize};

/// Lidar to camera calibration as stored on disk, row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibConfig {
    /// rigid transform from the lidar frame to the camera frame (3x4)
    pub velo_to_cam: [[f64; 4]; 3],
    /// rectifying rotation (3x3)
    pub r_rect: [[f64; 3]; 3],
    /// rectified projection (3x4)
    pub p_rect: [[f64; 4]; 3],
}

impl Default for CalibConfig {
    fn default() -> Self {
        // KITTI 2011_09_26, cam 00
        Self {
            velo_to_cam: [
                [7.533745e-03, -9.999714e-01, -6.166020e-04, -4.069766e-03],
                [1.480249e-02, 7.280733e-04, -9.998902e-01, -7.631618e-02],
                [9.998621e-01, 7.523790e-03, 1.480755e-02, -2.717806e-01],
            ],
            r_rect: [
                [9.999239e-01, 9.837760e-03, -7.445048e-03],
                [-9.869795e-03, 9.999421e-01, -4.278459e-03],
                [7.402527e-03, 4.351614e-03, 9.999631e-01],
            ],
            p_rect: [
                [7.215377e+02, 0.000000e+00, 6.095593e+02, 0.000000e+00],
                [0.000000e+00, 7.215377e+02, 1.728540e+02, 0.000000e+00],
                [0.000000e+00, 0.000000e+00, 1.000000e+00, 0.000000e+00],
            ],
        }
    }
}

/// Homogeneous calibration matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    pub rt: na::Matrix4<f64>,
    pub r_rect: na::Matrix4<f64>,
    pub p_rect: na::Matrix3x4<f64>,
}

impl Calibration {
    pub fn from_config(config: &CalibConfig) -> Calibration {
        let mut rt = na::Matrix4::identity();
        let mut r_rect = na::Matrix4::identity();
        let mut p_rect = na::Matrix3x4::zeros();
        for r in 0..3 {
            for c in 0..4 {
                rt[(r, c)] = config.velo_to_cam[r][c];
                p_rect[(r, c)] = config.p_rect[r][c];
            }
            for c in 0..3 {
                r_rect[(r, c)] = config.r_rect[r][c];
            }
        }
        Calibration { rt, r_rect, p_rect }
    }

    /// Calibration with an axis swap only: lidar x maps to camera depth, lidar
    /// y to -u and lidar z to -v.
    pub fn ideal(focal: f64, cx: f64, cy: f64) -> Calibration {
        let rt = na::Matrix4::new(
            0.0, -1.0, 0.0, 0.0, //
            0.0, 0.0, -1.0, 0.0, //
            1.0, 0.0, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        );
        let p_rect = na::Matrix3x4::new(
            focal, 0.0, cx, 0.0, //
            0.0, focal, cy, 0.0, //
            0.0, 0.0, 1.0, 0.0,
        );
        Calibration {
            rt,
            r_rect: na::Matrix4::identity(),
            p_rect,
        }
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::from_config(&CalibConfig::default())
    }
}
