//! Core library for inspecting and editing multi-audio-track videos by
//! driving the external ffmpeg and ffprobe binaries.
//!
//! All decoding, encoding and filtering happens inside the external tools;
//! this crate builds their command lines, streams and parses their
//! line-oriented diagnostic output, and translates ffmpeg's internal
//! frame/time coordinates (which start where decoding began, at ffmpeg's
//! internal frame rate) back into the input video's timeline.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use mavt_core::{ops, OperationEvent, ToolPaths};
//! use std::path::PathBuf;
//!
//! let tools = ToolPaths::default();
//! let request = ops::SliceRequest {
//!     start: "00:00:01".to_string(),
//!     end: "00:00:03".to_string(),
//!     input: PathBuf::from("in.mkv"),
//!     output: PathBuf::from("out.mkv"),
//! };
//! let outcome = ops::slice(&tools, &request, &mut |event| {
//!     if let OperationEvent::Progress(progress) = event {
//!         eprintln!("at {} (frame {})", progress.time, progress.frame);
//!     }
//! }).unwrap();
//! assert!(outcome.success);
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod ops;
pub mod probe;
pub mod progress;
pub mod timecode;

// Re-exports for public API
pub use config::ToolPaths;
pub use error::{CoreError, CoreResult};
pub use ops::{ImageDetection, OperationEvent, OperationOutcome};
pub use probe::{InputDescription, KeyFrameIndex, TrackDescription};
pub use progress::{ProgressTranslator, TranslatedProgress};
pub use timecode::TimeCode;
