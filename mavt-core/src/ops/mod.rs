//! Operation drivers.
//!
//! Every long-running operation follows the same lifecycle: build an
//! argument vector, stream the subprocess's diagnostic output, emit typed
//! events through the caller's sink, and return exactly one terminal
//! outcome decided by the exit code. Precondition problems (bad time
//! syntax, comma in a filter expression, missing tool) surface as
//! `CoreError` before or instead of an outcome; a nonzero exit is not an
//! error but a `Failed` outcome carrying the extracted diagnostic.

pub mod crop_scale;
pub mod find_image;
pub mod select_audio;
pub mod slice;

use std::process::ExitStatus;

use crate::error::CoreResult;
use crate::external::classifier;
use crate::external::runner::{self, StreamSource};
use crate::progress::{ProgressTranslator, TranslatedProgress};
use crate::timecode::TimeCode;

pub use crop_scale::{crop_scale, CropScaleRequest};
pub use find_image::{find_image, FindImageRequest};
pub use select_audio::{select_audio, SelectAudioRequest};
pub use slice::{slice, SliceRequest};

/// Streaming event emitted while an operation is running.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationEvent {
    Progress(TranslatedProgress),
    Detection(ImageDetection),
}

/// One accepted blackframe match, in both coordinate systems.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageDetection {
    /// Frame number in the input video's timeline.
    pub frame: i64,
    /// Time in the input video's timeline.
    pub time: TimeCode,
    pub internal_frame: i64,
    pub internal_time: TimeCode,
    pub pblack: i64,
    pub pts: i64,
    pub frame_type: String,
    pub last_keyframe: i64,
}

/// Terminal result of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationOutcome {
    pub success: bool,
    /// Extracted diagnostic text on failure.
    pub message: Option<String>,
}

pub(crate) fn outcome_from_status(status: ExitStatus, stderr_lines: &[String]) -> OperationOutcome {
    if status.success() {
        OperationOutcome {
            success: true,
            message: None,
        }
    } else {
        OperationOutcome {
            success: false,
            message: strip_input_banner(stderr_lines),
        }
    }
}

/// Drops the input-description preamble from a failed run's stderr so the
/// message starts at the actual error text: every leading line that is an
/// `Input ...` header or an indented continuation is skipped.
fn strip_input_banner(lines: &[String]) -> Option<String> {
    let mut index = 0;
    while index < lines.len() {
        let line = &lines[index];
        let is_banner = (line.starts_with("Input") && line.len() > "Input".len())
            || (line.starts_with("  ") && line.len() > 2);
        if !is_banner {
            break;
        }
        index += 1;
    }

    if index == lines.len() {
        return None;
    }
    Some(lines[index..].join("\n"))
}

/// Shared body of the file-producing drivers: stream stderr, translate
/// progress statistics, map the exit status to an outcome.
pub(crate) fn run_transcode(
    tool: &str,
    args: &[String],
    translator: &ProgressTranslator,
    on_event: &mut dyn FnMut(OperationEvent),
) -> CoreResult<OperationOutcome> {
    let mut stderr_lines: Vec<String> = Vec::new();

    let status = runner::run_streaming(tool, args, |source, line| {
        if source == StreamSource::Stderr {
            stderr_lines.push(line.to_string());

            if let Some(progress) = classifier::match_progress(line) {
                let time: TimeCode = progress.time.parse()?;
                on_event(OperationEvent::Progress(
                    translator.translate(progress.frame, time),
                ));
            }
        }
        Ok(())
    })?;

    Ok(outcome_from_status(status, &stderr_lines))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn banner_is_stripped_from_failure_message() {
        let stderr = lines(&[
            "Input #0, matroska,webm, from 'in.mkv':",
            "  Metadata:",
            "    ENCODER         : Lavf58.76.100",
            "  Duration: 00:00:20.07, start: 0.023000, bitrate: 3805 kb/s",
            "  Stream #0:0: Video: h264 (High), yuv420p, 1920x1080, 60 fps",
            "File 'out.mkv' already exists. Exiting.",
        ]);
        let message = strip_input_banner(&stderr).unwrap();
        assert_eq!(message, "File 'out.mkv' already exists. Exiting.");
        assert!(!message.contains("Input #0"));
    }

    #[test]
    fn all_banner_output_yields_no_message() {
        let stderr = lines(&["Input #0, matroska, from 'in.mkv':", "  Metadata:"]);
        assert_eq!(strip_input_banner(&stderr), None);
        assert_eq!(strip_input_banner(&[]), None);
    }

    #[test]
    fn message_without_banner_is_kept_whole() {
        let stderr = lines(&["in.mkv: No such file or directory"]);
        assert_eq!(
            strip_input_banner(&stderr).unwrap(),
            "in.mkv: No such file or directory"
        );
    }
}
