//! Keyframe timestamp probing and seek-time resolution.
//!
//! ffmpeg's `-ss` does not start decoding at the requested time: it snaps
//! backward to the nearest keyframe at or before it. [`KeyFrameIndex`]
//! replicates that snap so progress coordinates can be translated back into
//! the input video's timeline.
//!
//! Probing is a subprocess call, so drivers scan at most once per operation
//! and never share the result across operations (the file may have changed
//! in between).

use std::collections::VecDeque;
use std::path::Path;

use log::debug;

use crate::config::ToolPaths;
use crate::error::{CoreError, CoreResult};
use crate::external::classifier;
use crate::external::runner::{self, StreamSource};
use crate::timecode::TimeCode;

/// Keyframe timestamps of the first video stream, ascending.
#[derive(Debug, Clone)]
pub struct KeyFrameIndex {
    times: Vec<TimeCode>,
}

impl KeyFrameIndex {
    pub fn from_times(times: Vec<TimeCode>) -> Self {
        Self { times }
    }

    pub fn times(&self) -> &[TimeCode] {
        &self.times
    }

    /// Returns the time ffmpeg will actually seek to for a requested `-ss`
    /// value: the last keyframe at or before `requested`, or zero when the
    /// request precedes every keyframe.
    pub fn resolve_seek_time(&self, requested: TimeCode) -> TimeCode {
        let mut resolved = TimeCode::ZERO;
        for &key_frame in &self.times {
            if key_frame > requested {
                break;
            }
            resolved = key_frame;
        }
        resolved
    }
}

/// Scans every keyframe timestamp, invoking `on_time` per keyframe in
/// stream order.
pub fn scan_key_frames_with<F>(tools: &ToolPaths, input: &Path, mut on_time: F) -> CoreResult<()>
where
    F: FnMut(TimeCode),
{
    let args = vec![
        "-hide_banner".to_string(),
        "-skip_frame".to_string(),
        "nokey".to_string(),
        "-select_streams".to_string(),
        "v".to_string(),
        "-show_frames".to_string(),
        "-show_entries".to_string(),
        "frame=pts_time".to_string(),
        "-of".to_string(),
        "csv".to_string(),
        input.to_string_lossy().into_owned(),
    ];

    // Keep a short stderr tail for the failure message; keyframe-only
    // decodes of long files can produce a lot of noise before failing.
    let mut stderr_tail: VecDeque<String> = VecDeque::new();
    let mut count = 0usize;

    let status = runner::run_streaming(&tools.ffprobe, &args, |source, line| {
        match source {
            StreamSource::Stdout => {
                if let Some(seconds) = classifier::match_key_frame_seconds(line)? {
                    count += 1;
                    on_time(TimeCode::from_secs_f64(seconds));
                }
            }
            StreamSource::Stderr => {
                if stderr_tail.len() == 20 {
                    stderr_tail.pop_front();
                }
                stderr_tail.push_back(line.to_string());
            }
        }
        Ok(())
    })?;

    if !status.success() {
        return Err(CoreError::CommandFailed {
            tool: tools.ffprobe.clone(),
            status,
            message: stderr_tail.make_contiguous().join("\n"),
        });
    }

    debug!("scanned {count} key frames from {}", input.display());
    Ok(())
}

/// Scans every keyframe timestamp into a [`KeyFrameIndex`].
pub fn scan_key_frames(tools: &ToolPaths, input: &Path) -> CoreResult<KeyFrameIndex> {
    let mut times = Vec::new();
    scan_key_frames_with(tools, input, |time| times.push(time))?;
    Ok(KeyFrameIndex::from_times(times))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(seconds: &[f64]) -> KeyFrameIndex {
        KeyFrameIndex::from_times(seconds.iter().map(|&s| TimeCode::from_secs_f64(s)).collect())
    }

    #[test]
    fn seek_snaps_to_last_key_frame_at_or_before_request() {
        let index = index(&[0.0, 6.3, 10.2, 17.5]);

        let resolved = index.resolve_seek_time(TimeCode::from_secs_f64(9.0));
        assert_eq!(resolved, TimeCode::from_secs_f64(6.3));

        // An exact keyframe hit seeks to that keyframe.
        let resolved = index.resolve_seek_time(TimeCode::from_secs_f64(10.2));
        assert_eq!(resolved, TimeCode::from_secs_f64(10.2));

        let resolved = index.resolve_seek_time(TimeCode::ZERO);
        assert_eq!(resolved, TimeCode::ZERO);

        let resolved = index.resolve_seek_time(TimeCode::from_secs_f64(100.0));
        assert_eq!(resolved, TimeCode::from_secs_f64(17.5));
    }

    #[test]
    fn seek_before_first_key_frame_resolves_to_zero() {
        let index = index(&[1.5, 4.0]);
        let resolved = index.resolve_seek_time(TimeCode::from_secs_f64(1.0));
        assert_eq!(resolved, TimeCode::ZERO);

        let empty = KeyFrameIndex::from_times(Vec::new());
        assert_eq!(empty.resolve_seek_time(TimeCode::from_secs_f64(3.0)), TimeCode::ZERO);
    }
}
