use clap::{Parser, Subcommand};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::path::Path;
use ttc_fusion::calibration::{CalibConfig, Calibration};
use ttc_fusion::data_loader::{CALIB_FILE, CONFIG_FILE, FRAMES_DIR};
use ttc_fusion::io::object_to_json;
use ttc_fusion::pipeline::FusionConfig;
use ttc_fusion::projection::{LidarCamera, Projector};
use ttc_fusion::{BoundingBox, DataFrame, Keypoint, KeypointMatch, LidarPoint, Roi};

const IMAGE_W: f32 = 1242.0;
const IMAGE_H: f32 = 375.0;
const HALF_WIDTH: f64 = 0.9;
const BOTTOM_Z: f64 = -1.7;
const TOP_Z: f64 = -0.2;
const NEIGHBOUR_Y: f64 = -3.2;
const NEIGHBOUR_X: f64 = 12.0;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a synthetic approaching-vehicle dataset
    Generate {
        /// Output directory
        #[arg(short, long)]
        output: String,

        /// Number of frames to generate
        #[arg(short, long, default_value = "20")]
        num_frames: usize,

        /// Frames per second
        #[arg(long, default_value = "10.0")]
        frame_rate: f64,

        /// Distance of the lead vehicle in the first frame, meters
        #[arg(long, default_value = "8.0")]
        start_distance: f64,

        /// Closing speed of the lead vehicle, meters per second
        #[arg(long, default_value = "1.0")]
        closing_speed: f64,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Commands::Generate {
            output,
            num_frames,
            frame_rate,
            start_distance,
            closing_speed,
            seed,
        } => {
            generate_dataset(
                &output,
                num_frames,
                frame_rate,
                start_distance,
                closing_speed,
                seed,
            )?;
        }
    }

    Ok(())
}

/// Pixel roi of a vertical rectangle facing the sensor at distance `x`.
fn face_roi(camera: &LidarCamera, x: f64, y_center: f64) -> Option<Roi> {
    let corners: Vec<Vec2> = [
        (y_center - HALF_WIDTH, BOTTOM_Z),
        (y_center + HALF_WIDTH, BOTTOM_Z),
        (y_center - HALF_WIDTH, TOP_Z),
        (y_center + HALF_WIDTH, TOP_Z),
    ]
    .iter()
    .map(|(y, z)| camera.project_point(&LidarPoint::new(x, *y, *z)))
    .collect();
    Roi::bounding(&corners)
}

fn face_points(rng: &mut ChaCha8Rng, x: f64, y_center: f64) -> Vec<LidarPoint> {
    let mut pts = Vec::new();
    let mut y = y_center - HALF_WIDTH + 0.05;
    while y < y_center + HALF_WIDTH - 0.05 {
        for row in 0..6 {
            let z = -1.45 + row as f64 * 0.1;
            pts.push(LidarPoint {
                x: x + rng.random_range(0.0..0.03),
                y: y + rng.random_range(-0.01..0.01),
                z,
                r: rng.random_range(0.2..0.9),
            });
        }
        y += 0.04;
    }
    pts
}

fn generate_dataset(
    output_dir: &str,
    num_frames: usize,
    frame_rate: f64,
    start_distance: f64,
    closing_speed: f64,
    seed: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    use std::fs;

    let calib_config = CalibConfig::default();
    let camera = LidarCamera::new(&Calibration::from_config(&calib_config));
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let frames_dir = Path::new(output_dir).join(FRAMES_DIR);
    fs::create_dir_all(&frames_dir)?;

    // (y, z) of textured spots, fixed on each vehicle over the sequence
    let lead_features: Vec<(f64, f64)> = (0..40)
        .map(|_| {
            (
                rng.random_range(-HALF_WIDTH..HALF_WIDTH),
                rng.random_range(BOTTOM_Z..TOP_Z),
            )
        })
        .collect();
    let neighbour_features: Vec<(f64, f64)> = (0..20)
        .map(|_| {
            (
                NEIGHBOUR_Y + rng.random_range(-HALF_WIDTH..HALF_WIDTH),
                rng.random_range(BOTTOM_Z..TOP_Z),
            )
        })
        .collect();
    let num_tracked = lead_features.len() + neighbour_features.len();

    for frame_idx in 0..num_frames {
        let t = frame_idx as f64 / frame_rate;
        let lead_x = start_distance - closing_speed * t;

        let mut lidar_points = face_points(&mut rng, lead_x, 0.0);
        // spurious returns in front of the lead vehicle
        for _ in 0..2 {
            lidar_points.push(LidarPoint {
                x: lead_x - rng.random_range(0.3..0.8),
                y: rng.random_range(-0.5..0.5),
                z: -1.2,
                r: 0.3,
            });
        }
        lidar_points.extend(face_points(&mut rng, NEIGHBOUR_X, NEIGHBOUR_Y));
        // ground returns
        for _ in 0..200 {
            lidar_points.push(LidarPoint {
                x: rng.random_range(3.0..25.0),
                y: rng.random_range(-6.0..6.0),
                z: -1.73 + rng.random_range(-0.02..0.02),
                r: rng.random_range(0.0..0.5),
            });
        }

        let mut keypoints: Vec<Keypoint> = lead_features
            .iter()
            .map(|(y, z)| (lead_x, *y, *z))
            .chain(neighbour_features.iter().map(|(y, z)| (NEIGHBOUR_X, *y, *z)))
            .map(|(x, y, z)| {
                let px = camera.project_point(&LidarPoint::new(x, y, z));
                Keypoint::new(
                    px.x + rng.random_range(-0.3..0.3),
                    px.y + rng.random_range(-0.3..0.3),
                )
            })
            .collect();
        for _ in 0..30 {
            keypoints.push(Keypoint::new(
                rng.random_range(0.0..IMAGE_W),
                rng.random_range(0.0..IMAGE_H),
            ));
        }

        let kpt_matches: Vec<KeypointMatch> = if frame_idx == 0 {
            Vec::new()
        } else {
            let mut matches: Vec<_> = (0..num_tracked).map(|i| KeypointMatch::new(i, i)).collect();
            for _ in 0..3 {
                matches.push(KeypointMatch::new(
                    rng.random_range(0..keypoints.len()),
                    rng.random_range(0..keypoints.len()),
                ));
            }
            matches
        };

        // detector ids are per frame, so the order is shuffled
        let (lead_id, neighbour_id) = if rng.random_bool(0.5) { (0, 1) } else { (1, 0) };
        let mut boxes = Vec::new();
        if let Some(roi) = face_roi(&camera, lead_x, 0.0) {
            boxes.push(BoundingBox::new(lead_id, roi));
        }
        if let Some(roi) = face_roi(&camera, NEIGHBOUR_X, NEIGHBOUR_Y) {
            boxes.push(BoundingBox::new(neighbour_id, roi));
        }
        boxes.sort_by_key(|b| b.box_id);

        let frame = DataFrame {
            time_ns: (t * 1e9) as i64,
            boxes,
            keypoints,
            kpt_matches,
            lidar_points,
        };
        object_to_json(frames_dir.join(format!("{:06}.json", frame_idx)), &frame)?;
    }

    object_to_json(Path::new(output_dir).join(CALIB_FILE), &calib_config)?;
    let config = FusionConfig {
        frame_rate,
        ..Default::default()
    };
    object_to_json(Path::new(output_dir).join(CONFIG_FILE), &config)?;

    println!("Generated {} frames in {}", num_frames, output_dir);
    Ok(())
}
