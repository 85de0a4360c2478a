//! Stream-copy trimming of a time range.

use std::path::PathBuf;

use log::info;

use crate::config::ToolPaths;
use crate::error::CoreResult;
use crate::probe;
use crate::progress::ProgressTranslator;
use crate::timecode::TimeCode;

use super::{run_transcode, OperationEvent, OperationOutcome};

/// Parameters for a slice operation. `start`/`end` accept either ffmpeg
/// time syntax and are passed through to the tool verbatim.
#[derive(Debug, Clone)]
pub struct SliceRequest {
    pub start: String,
    pub end: String,
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Copies the `start..end` range of the input into a new file without
/// re-encoding. Progress events are translated against the keyframe the
/// seek actually lands on, not the requested start time.
pub fn slice(
    tools: &ToolPaths,
    request: &SliceRequest,
    on_event: &mut dyn FnMut(OperationEvent),
) -> CoreResult<OperationOutcome> {
    let requested_start: TimeCode = request.start.parse()?;
    let _: TimeCode = request.end.parse()?;

    let input_fps = probe::resolve_fps(tools, &request.input)?;
    let key_frames = probe::scan_key_frames(tools, &request.input)?;
    let start_offset = key_frames.resolve_seek_time(requested_start);
    let translator = ProgressTranslator::new(start_offset, input_fps, input_fps);

    info!(
        "slicing {} [{} .. {}] -> {} (seek lands on {})",
        request.input.display(),
        request.start,
        request.end,
        request.output.display(),
        start_offset,
    );

    let args = vec![
        "-hide_banner".to_string(),
        "-n".to_string(), // fail if the output already exists
        "-ss".to_string(),
        request.start.clone(),
        "-to".to_string(),
        request.end.clone(),
        "-i".to_string(),
        request.input.to_string_lossy().into_owned(),
        "-map".to_string(),
        "0".to_string(),
        "-map_metadata".to_string(),
        "0".to_string(),
        "-c".to_string(),
        "copy".to_string(),
        request.output.to_string_lossy().into_owned(),
    ];

    run_transcode(&tools.ffmpeg, &args, &translator, on_event)
}
