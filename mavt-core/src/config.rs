//! Tool path configuration.
//!
//! Every prober and operation driver takes a [`ToolPaths`] value instead of
//! consulting process-wide state, so tests and callers can point individual
//! operations at different ffmpeg/ffprobe builds.

/// Paths (or bare command names resolved via `PATH`) of the external tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub ffmpeg: String,
    pub ffprobe: String,
}

impl ToolPaths {
    pub fn new(ffmpeg: impl Into<String>, ffprobe: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}
