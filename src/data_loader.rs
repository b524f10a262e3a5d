use std::path::{Path, PathBuf};

use glob::glob;
use indicatif::ParallelProgressIterator;
use rayon::prelude::*;

use crate::calibration::CalibConfig;
use crate::error::FusionError;
use crate::frame::DataFrame;
use crate::io::object_from_json;
use crate::pipeline::FusionConfig;

pub const CALIB_FILE: &str = "calib.json";
pub const CONFIG_FILE: &str = "config.json";
pub const FRAMES_DIR: &str = "frames";

fn json_filter(rp: glob::GlobResult) -> Option<PathBuf> {
    match rp {
        Ok(p) if p.extension().is_some_and(|e| e == "json") => Some(p),
        Ok(_) => None,
        Err(e) => {
            log::warn!("unreadable path: {}", e);
            None
        }
    }
}

/// Loads every `frames/*.json` of a dataset folder.
///
/// Files are parsed in parallel; the frames come back sorted by `time_ns`,
/// frames with equal `time_ns` in file name order.
pub fn load_frames<P: AsRef<Path>>(root_folder: P) -> Result<Vec<DataFrame>, FusionError> {
    let root = root_folder.as_ref();
    if !root.is_dir() {
        return Err(FusionError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} is not a directory", root.display()),
        )));
    }
    let pattern = root.join(FRAMES_DIR).join("*.json");
    let mut sorted_path: Vec<PathBuf> = glob(&pattern.to_string_lossy())?
        .filter_map(json_filter)
        .collect();
    sorted_path.sort();
    log::trace!("loading {} frames from {}", sorted_path.len(), root.display());

    let mut frames = sorted_path
        .par_iter()
        .progress_count(sorted_path.len() as u64)
        .map(object_from_json::<DataFrame, _>)
        .collect::<Result<Vec<_>, _>>()?;
    frames.sort_by_key(|f| f.time_ns);
    Ok(frames)
}

/// Calibration of a dataset folder, KITTI defaults when it has none.
pub fn load_calibration<P: AsRef<Path>>(root_folder: P) -> Result<CalibConfig, FusionError> {
    let path = root_folder.as_ref().join(CALIB_FILE);
    if path.is_file() {
        object_from_json(path)
    } else {
        log::info!("no {} found, using default calibration", CALIB_FILE);
        Ok(CalibConfig::default())
    }
}

/// Pipeline configuration of a dataset folder, defaults when it has none.
pub fn load_config<P: AsRef<Path>>(root_folder: P) -> Result<FusionConfig, FusionError> {
    let path = root_folder.as_ref().join(CONFIG_FILE);
    let config = if path.is_file() {
        object_from_json(path)?
    } else {
        FusionConfig::default()
    };
    config.validate()?;
    Ok(config)
}
