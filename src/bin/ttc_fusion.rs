use clap::Parser;
use std::time::Instant;
use ttc_fusion::calibration::Calibration;
use ttc_fusion::data_loader::{load_calibration, load_config, load_frames};
use ttc_fusion::io::{format_estimates, object_from_json, write_report};
use ttc_fusion::pipeline::{FusionConfig, process_sequence};
use ttc_fusion::projection::LidarCamera;

#[derive(Parser)]
#[command(version, about, author)]
struct TtcfCli {
    /// dataset folder with frames/*.json and optional calib.json / config.json
    path: String,

    /// pipeline configuration json, overrides <path>/config.json
    #[arg(short, long)]
    config: Option<String>,

    /// overrides the configured frame rate
    #[arg(long)]
    frame_rate: Option<f64>,

    /// overrides the configured roi shrink factor
    #[arg(long)]
    shrink_factor: Option<f32>,

    /// report output path
    #[arg(short, long, default_value = "ttc_report.json")]
    output: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = TtcfCli::parse();

    let mut config: FusionConfig = match &cli.config {
        Some(p) => object_from_json(p)?,
        None => load_config(&cli.path)?,
    };
    if let Some(frame_rate) = cli.frame_rate {
        config.frame_rate = frame_rate;
    }
    if let Some(shrink_factor) = cli.shrink_factor {
        config.shrink_factor = shrink_factor;
    }
    config.validate()?;

    let calib = Calibration::from_config(&load_calibration(&cli.path)?);
    let projector = LidarCamera::new(&calib);

    let now = Instant::now();
    let mut frames = load_frames(&cli.path)?;
    log::info!(
        "loaded {} frames in {:.3} sec",
        frames.len(),
        now.elapsed().as_secs_f64()
    );

    let now = Instant::now();
    let results = process_sequence(&mut frames, &projector, &config)?;
    let duration_sec = now.elapsed().as_secs_f64();
    println!("processing took {:.6} sec", duration_sec);
    println!("avg: {} sec", duration_sec / results.len() as f64);
    print!("{}", format_estimates(&results));

    write_report(&cli.output, config.frame_rate, &results)?;
    println!("report written to {}", cli.output);
    Ok(())
}
