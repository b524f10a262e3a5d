use nalgebra as na;
use ttc_fusion::LidarPoint;
use ttc_fusion::calibration::{CalibConfig, Calibration};
use ttc_fusion::projection::{LidarCamera, Projector};

#[test]
fn test_calibration_from_config() {
    let config = CalibConfig::default();
    let calib = Calibration::from_config(&config);

    assert!((calib.rt[(0, 1)] - config.velo_to_cam[0][1]).abs() < 1e-12);
    assert!((calib.rt[(2, 3)] - config.velo_to_cam[2][3]).abs() < 1e-12);
    for c in 0..3 {
        assert_eq!(calib.rt[(3, c)], 0.0);
    }
    assert_eq!(calib.rt[(3, 3)], 1.0);

    assert!((calib.r_rect[(1, 2)] - config.r_rect[1][2]).abs() < 1e-12);
    assert_eq!(calib.r_rect[(3, 3)], 1.0);
    assert_eq!(calib.r_rect[(0, 3)], 0.0);

    assert!((calib.p_rect[(0, 0)] - 721.5377).abs() < 1e-9);
    assert!((calib.p_rect[(1, 2)] - 172.854).abs() < 1e-9);
}

#[test]
fn test_calib_config_json() {
    let config = CalibConfig::default();
    let j = serde_json::to_string(&config).unwrap();
    let back: CalibConfig = serde_json::from_str(&j).unwrap();
    assert_eq!(config, back);
}

#[test]
fn test_ideal_projection() {
    let camera = LidarCamera::new(&Calibration::ideal(500.0, 600.0, 200.0));

    let px = camera.project_one(&na::Vector3::new(10.0, 0.0, 0.0));
    assert!((px - na::Vector2::new(600.0, 200.0)).norm() < 1e-9);

    // left of the sensor is left in the image, up is up
    let px = camera.project_one(&na::Vector3::new(10.0, 1.0, 0.0));
    assert!((px[0] - 550.0).abs() < 1e-9);
    let px = camera.project_one(&na::Vector3::new(10.0, 0.0, 1.0));
    assert!((px[1] - 150.0).abs() < 1e-9);

    // perspective divide
    let near = camera.project_one(&na::Vector3::new(5.0, 1.0, 1.0));
    let far = camera.project_one(&na::Vector3::new(10.0, 2.0, 2.0));
    assert!((near - far).norm() < 1e-9);
}

#[test]
fn test_kitti_projection_matches_matrix_chain() {
    let calib = Calibration::default();
    let camera = LidarCamera::new(&calib);
    let p = LidarPoint::new(12.0, -1.5, -0.8);

    let x = na::Vector4::new(p.x, p.y, p.z, 1.0);
    let y = calib.p_rect * calib.r_rect * calib.rt * x;
    let expected = na::Vector2::new(y[0] / y[2], y[1] / y[2]);

    let px = camera.project_one(&p.na_point());
    assert!((px - expected).norm() < 1e-9);

    // a point ahead and slightly right lands right of the principal point
    assert!(px[0] > 609.0);
    assert!(px[1] > 172.0);
}

#[test]
fn test_project_many() {
    let camera = LidarCamera::new(&Calibration::ideal(500.0, 600.0, 200.0));
    let pts: Vec<_> = (1..50)
        .map(|i| LidarPoint::new(5.0 + i as f64, 0.1 * i as f64, -1.0))
        .collect();
    let px = camera.project(&pts);
    assert_eq!(px.len(), pts.len());
    for (p, q) in pts.iter().zip(px) {
        assert_eq!(camera.project_point(p), q);
    }
}
