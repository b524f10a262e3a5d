use std::fs;
use tempfile::TempDir;
use ttc_fusion::calibration::CalibConfig;
use ttc_fusion::data_loader::{
    CALIB_FILE, CONFIG_FILE, FRAMES_DIR, load_calibration, load_config, load_frames,
};
use ttc_fusion::io::{format_estimates, object_from_json, object_to_json, write_report};
use ttc_fusion::matching::{BoxMatch, BoxMatches};
use ttc_fusion::{
    BoundingBox, DataFrame, FramePairResult, FusionConfig, FusionError, Keypoint, LidarPoint, Roi,
    TtcEstimate,
};

fn sample_frame(time_ns: i64) -> DataFrame {
    DataFrame {
        time_ns,
        boxes: vec![BoundingBox::new(3, Roi::new(1.0, 2.0, 30.0, 40.0))],
        keypoints: vec![Keypoint::new(5.0, 6.0)],
        kpt_matches: Vec::new(),
        lidar_points: vec![LidarPoint::new(7.0, 0.5, -1.0)],
    }
}

#[test]
fn test_json_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("frame.json");
    object_to_json(&path, &sample_frame(42)).unwrap();

    let back: DataFrame = object_from_json(&path).unwrap();
    assert_eq!(back.time_ns, 42);
    assert_eq!(back.boxes[0].roi, Roi::new(1.0, 2.0, 30.0, 40.0));
    assert_eq!(back.keypoints, vec![Keypoint::new(5.0, 6.0)]);
    assert_eq!(back.lidar_points, vec![LidarPoint::new(7.0, 0.5, -1.0)]);
}

#[test]
fn test_object_from_json_errors() {
    let temp_dir = TempDir::new().unwrap();
    let missing = object_from_json::<DataFrame, _>(temp_dir.path().join("nope.json"));
    assert!(matches!(missing, Err(FusionError::Io(_))));

    let broken = temp_dir.path().join("broken.json");
    fs::write(&broken, "{ not json").unwrap();
    assert!(matches!(
        object_from_json::<DataFrame, _>(&broken),
        Err(FusionError::Json(_))
    ));
}

#[test]
fn test_load_frames() {
    let temp_dir = TempDir::new().unwrap();
    let frames_dir = temp_dir.path().join(FRAMES_DIR);
    fs::create_dir_all(&frames_dir).unwrap();
    // file names out of time order on purpose
    object_to_json(frames_dir.join("000001.json"), &sample_frame(300)).unwrap();
    object_to_json(frames_dir.join("000002.json"), &sample_frame(200)).unwrap();
    object_to_json(frames_dir.join("000003.json"), &sample_frame(100)).unwrap();
    fs::write(frames_dir.join("notes.txt"), "ignored").unwrap();

    let frames = load_frames(temp_dir.path()).unwrap();
    let times: Vec<_> = frames.iter().map(|f| f.time_ns).collect();
    assert_eq!(times, vec![100, 200, 300]);
}

#[test]
fn test_load_frames_equal_time_keeps_file_order() {
    let temp_dir = TempDir::new().unwrap();
    let frames_dir = temp_dir.path().join(FRAMES_DIR);
    fs::create_dir_all(&frames_dir).unwrap();
    for (name, time_ns, box_id) in [("b.json", 100, 2), ("a.json", 100, 1), ("c.json", 50, 3)] {
        let mut frame = sample_frame(time_ns);
        frame.boxes[0].box_id = box_id;
        object_to_json(frames_dir.join(name), &frame).unwrap();
    }

    let frames = load_frames(temp_dir.path()).unwrap();
    let ids: Vec<_> = frames.iter().map(|f| f.boxes[0].box_id).collect();
    assert_eq!(ids, vec![3, 1, 2]);
}

#[test]
fn test_load_frames_errors() {
    assert!(load_frames("non_existent_path").is_err());

    let temp_dir = TempDir::new().unwrap();
    assert!(load_frames(temp_dir.path()).unwrap().is_empty());

    let frames_dir = temp_dir.path().join(FRAMES_DIR);
    fs::create_dir_all(&frames_dir).unwrap();
    fs::write(frames_dir.join("000000.json"), "[]").unwrap();
    assert!(matches!(
        load_frames(temp_dir.path()),
        Err(FusionError::Json(_))
    ));
}

#[test]
fn test_load_calibration_and_config() {
    let temp_dir = TempDir::new().unwrap();
    assert_eq!(load_calibration(temp_dir.path()).unwrap(), CalibConfig::default());
    assert_eq!(load_config(temp_dir.path()).unwrap(), FusionConfig::default());

    let mut calib = CalibConfig::default();
    calib.p_rect[0][0] = 500.0;
    object_to_json(temp_dir.path().join(CALIB_FILE), &calib).unwrap();
    assert_eq!(load_calibration(temp_dir.path()).unwrap(), calib);

    fs::write(temp_dir.path().join(CONFIG_FILE), r#"{"frame_rate": 20.0}"#).unwrap();
    assert_eq!(load_config(temp_dir.path()).unwrap().frame_rate, 20.0);

    fs::write(temp_dir.path().join(CONFIG_FILE), r#"{"shrink_factor": 1.5}"#).unwrap();
    assert!(matches!(
        load_config(temp_dir.path()),
        Err(FusionError::InvalidConfig(_))
    ));
}

fn sample_result() -> FramePairResult {
    let mut box_matches = BoxMatches::default();
    box_matches.matches.insert(1, BoxMatch { curr_id: 2, votes: 9 });
    box_matches.unmatched.push(5);
    FramePairResult {
        time_ns: 100,
        box_matches,
        boxes: Vec::new(),
        estimates: vec![TtcEstimate {
            prev_box_id: 1,
            curr_box_id: 2,
            votes: 9,
            ttc_lidar: 12.5,
            ttc_camera: f64::NAN,
            lidar_points_prev: 300,
            lidar_points_curr: 310,
            kpt_matches: 1,
        }],
        objects: Vec::new(),
    }
}

#[test]
fn test_write_report() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("report.json");
    let results = vec![sample_result(), sample_result()];

    write_report(&output_path, 10.0, &results).unwrap();

    let content = fs::read_to_string(&output_path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(json["frame_rate"], 10.0);
    assert_eq!(json["frame_pairs"], 2);
    assert_eq!(json["estimates"], 2);
    let frames = json["frames"].as_array().unwrap();
    assert_eq!(frames.len(), 2);
    let e = &frames[0]["estimates"][0];
    assert_eq!(e["ttc_lidar"], 12.5);
    assert!(e["ttc_camera"].is_null());
    assert_eq!(frames[0]["box_matches"]["unmatched"][0], 5);
}

#[test]
fn test_format_estimates() {
    let s = format_estimates(&[sample_result()]);
    assert_eq!(s.lines().count(), 1);
    assert!(s.contains("12.500"));
    assert!(s.contains("NaN"));
}
