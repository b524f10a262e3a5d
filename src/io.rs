use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};

use crate::error::FusionError;
use crate::matching::BoxMatches;
use crate::pipeline::{FramePairResult, TtcEstimate};
use crate::summary::ObjectSummary;

/// Serializes an object to a pretty printed JSON file.
pub fn object_to_json<T: Serialize, P: AsRef<Path>>(
    output_path: P,
    object: &T,
) -> Result<(), FusionError> {
    let j = serde_json::to_string_pretty(object)?;
    std::fs::write(output_path, j)?;
    Ok(())
}

/// Deserializes an object from a JSON file.
pub fn object_from_json<T: DeserializeOwned, P: AsRef<Path>>(
    file_path: P,
) -> Result<T, FusionError> {
    let contents = std::fs::read_to_string(file_path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Sequence-level report written by the `ttcf` binary.
///
/// Non-finite TTC values end up as `null`.
#[derive(Debug, Serialize)]
pub struct SequenceReport<'a> {
    pub frame_rate: f64,
    pub frame_pairs: usize,
    pub estimates: usize,
    pub frames: Vec<FrameReport<'a>>,
}

#[derive(Debug, Serialize)]
pub struct FrameReport<'a> {
    pub time_ns: i64,
    pub box_matches: &'a BoxMatches,
    pub estimates: &'a [TtcEstimate],
    pub objects: &'a [ObjectSummary],
}

impl<'a> SequenceReport<'a> {
    pub fn new(frame_rate: f64, results: &'a [FramePairResult]) -> SequenceReport<'a> {
        let frames: Vec<_> = results
            .iter()
            .map(|r| FrameReport {
                time_ns: r.time_ns,
                box_matches: &r.box_matches,
                estimates: &r.estimates,
                objects: &r.objects,
            })
            .collect();
        SequenceReport {
            frame_rate,
            frame_pairs: frames.len(),
            estimates: frames.iter().map(|f| f.estimates.len()).sum(),
            frames,
        }
    }
}

pub fn write_report<P: AsRef<Path>>(
    output_path: P,
    frame_rate: f64,
    results: &[FramePairResult],
) -> Result<(), FusionError> {
    object_to_json(output_path, &SequenceReport::new(frame_rate, results))
}

/// Plain text table of every estimate, one line per box pair.
pub fn format_estimates(results: &[FramePairResult]) -> String {
    let mut s = String::new();
    for (pair_idx, r) in results.iter().enumerate() {
        for e in &r.estimates {
            s += format!(
                "pair {:4} box {:3} -> {:3}  lidar {:8.3} s  camera {:8.3} s  ({} pts, {} matches)\n",
                pair_idx,
                e.prev_box_id,
                e.curr_box_id,
                e.ttc_lidar,
                e.ttc_camera,
                e.lidar_points_curr,
                e.kpt_matches
            )
            .as_str();
        }
    }
    s
}
