pub mod calibration;
pub mod cluster;
pub mod data_loader;
pub mod error;
pub mod frame;
pub mod io;
pub mod matching;
pub mod pipeline;
pub mod projection;
pub mod summary;
pub mod ttc;
pub mod types;
pub mod util;

pub use error::FusionError;
pub use frame::DataFrame;
pub use pipeline::{FramePairResult, FusionConfig, TtcEstimate};
pub use types::*;
