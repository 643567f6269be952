pub mod point_set;
pub mod waveform;

pub use point_set::PointSet;
pub use waveform::{ScatterData, WaveformSet};
