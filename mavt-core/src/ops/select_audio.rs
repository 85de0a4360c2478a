//! Audio track selection by stream-copy remapping.

use std::path::PathBuf;

use log::info;

use crate::config::ToolPaths;
use crate::error::CoreResult;
use crate::probe;
use crate::progress::ProgressTranslator;
use crate::timecode::TimeCode;

use super::{run_transcode, OperationEvent, OperationOutcome};

/// Parameters for a select-audio operation. `audio_tracks` are zero-based
/// indexes into the input's audio streams (`0:a:N`).
#[derive(Debug, Clone)]
pub struct SelectAudioRequest {
    pub input: PathBuf,
    pub audio_tracks: Vec<u32>,
    pub output: PathBuf,
}

/// Copies the first video stream plus the chosen audio tracks into a new
/// file, dropping every other audio track.
pub fn select_audio(
    tools: &ToolPaths,
    request: &SelectAudioRequest,
    on_event: &mut dyn FnMut(OperationEvent),
) -> CoreResult<OperationOutcome> {
    let input_fps = probe::resolve_fps(tools, &request.input)?;
    let translator = ProgressTranslator::new(TimeCode::ZERO, input_fps, input_fps);

    info!(
        "selecting audio tracks {:?} of {} -> {}",
        request.audio_tracks,
        request.input.display(),
        request.output.display()
    );

    let mut args = vec![
        "-hide_banner".to_string(),
        "-n".to_string(), // fail if the output already exists
        "-i".to_string(),
        request.input.to_string_lossy().into_owned(),
        "-map".to_string(),
        "0:v:0".to_string(),
    ];
    for track in &request.audio_tracks {
        args.push("-map".to_string());
        args.push(format!("0:a:{track}"));
    }
    args.extend([
        "-map_metadata".to_string(),
        "0".to_string(),
        "-c".to_string(),
        "copy".to_string(),
        request.output.to_string_lossy().into_owned(),
    ]);

    run_transcode(&tools.ffmpeg, &args, &translator, on_event)
}
