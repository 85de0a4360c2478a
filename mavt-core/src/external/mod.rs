//! Interactions with the external ffmpeg/ffprobe processes.
//!
//! `runner` owns process lifecycle and concurrent output draining;
//! `classifier` owns the line grammars of the tools' diagnostic text.

pub mod classifier;
pub mod runner;

pub use classifier::{
    BlackframeLine, InputHeader, ProgressLine, StreamHeader, TrackKind,
};
pub use runner::{run_capture, run_streaming, CapturedOutput, StreamSource};
