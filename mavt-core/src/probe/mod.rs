//! Probing of input videos via ffprobe and the `ffmpeg -i` dump.

pub mod fps;
pub mod inspect;
pub mod key_frames;

pub use fps::resolve_fps;
pub use inspect::{inspect_input, parse_input_dump, InputDescription, StreamGroup, TrackDescription};
pub use key_frames::{scan_key_frames, scan_key_frames_with, KeyFrameIndex};
