//! Re-encode with crop and/or scale filters.

use std::path::PathBuf;

use log::info;

use crate::config::ToolPaths;
use crate::error::{CoreError, CoreResult};
use crate::probe;
use crate::progress::ProgressTranslator;
use crate::timecode::TimeCode;

use super::{run_transcode, OperationEvent, OperationOutcome};

/// Parameters for a crop/scale operation. `crop` and `scale` are raw ffmpeg
/// filter argument strings (`w:h:x:y`, `w:h`).
#[derive(Debug, Clone)]
pub struct CropScaleRequest {
    pub input: PathBuf,
    pub crop: Option<String>,
    pub scale: Option<String>,
    pub video_codec: Option<String>,
    pub output: PathBuf,
}

/// Re-encodes the video stream through an optional crop/scale filter chain,
/// copying audio and metadata.
pub fn crop_scale(
    tools: &ToolPaths,
    request: &CropScaleRequest,
    on_event: &mut dyn FnMut(OperationEvent),
) -> CoreResult<OperationOutcome> {
    // A comma would splice extra filters into the chain.
    if let Some(crop) = request.crop.as_deref() {
        if crop.contains(',') {
            return Err(CoreError::InvalidFilterExpr {
                what: "crop",
                value: crop.to_string(),
            });
        }
    }
    if let Some(scale) = request.scale.as_deref() {
        if scale.contains(',') {
            return Err(CoreError::InvalidFilterExpr {
                what: "scale",
                value: scale.to_string(),
            });
        }
    }

    let input_fps = probe::resolve_fps(tools, &request.input)?;
    let translator = ProgressTranslator::new(TimeCode::ZERO, input_fps, input_fps);

    info!(
        "crop/scale {} -> {}",
        request.input.display(),
        request.output.display()
    );

    let mut args = vec![
        "-hide_banner".to_string(),
        "-n".to_string(), // fail if the output already exists
        "-i".to_string(),
        request.input.to_string_lossy().into_owned(),
    ];

    let filters: Vec<String> = [
        request.crop.as_deref().map(|c| format!("crop={c}")),
        request.scale.as_deref().map(|s| format!("scale={s}")),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !filters.is_empty() {
        args.push("-filter:v".to_string());
        args.push(filters.join(","));
    }

    if let Some(codec) = request.video_codec.as_deref() {
        args.push("-c:v".to_string());
        args.push(codec.to_string());
    }

    args.extend([
        "-c:a".to_string(),
        "copy".to_string(),
        "-map".to_string(),
        "0".to_string(),
        "-map_metadata".to_string(),
        "0".to_string(),
        request.output.to_string_lossy().into_owned(),
    ]);

    run_transcode(&tools.ffmpeg, &args, &translator, on_event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_in_filter_expression_is_rejected() {
        let request = CropScaleRequest {
            input: PathBuf::from("in.mkv"),
            crop: Some("100:100:0:0,eq=brightness=1".to_string()),
            scale: None,
            video_codec: None,
            output: PathBuf::from("out.mkv"),
        };
        let err = crop_scale(&ToolPaths::default(), &request, &mut |_| {}).unwrap_err();
        assert!(matches!(err, CoreError::InvalidFilterExpr { what: "crop", .. }));

        let request = CropScaleRequest {
            crop: None,
            scale: Some("1280:720,fps=10".to_string()),
            ..request
        };
        let err = crop_scale(&ToolPaths::default(), &request, &mut |_| {}).unwrap_err();
        assert!(matches!(err, CoreError::InvalidFilterExpr { what: "scale", .. }));
    }
}
