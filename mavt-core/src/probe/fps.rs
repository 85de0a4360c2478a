//! Average frame rate probing via ffprobe.

use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::config::ToolPaths;
use crate::error::{CoreError, CoreResult};
use crate::external::runner;

#[derive(Debug, Deserialize)]
struct ProbeStream {
    avg_frame_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

/// Returns the average frame rate of the first video stream as a float.
pub fn resolve_fps(tools: &ToolPaths, input: &Path) -> CoreResult<f64> {
    let args = vec![
        "-hide_banner".to_string(),
        "-i".to_string(),
        input.to_string_lossy().into_owned(),
        "-show_streams".to_string(),
        "-select_streams".to_string(),
        "v".to_string(),
        "-print_format".to_string(),
        "json".to_string(),
    ];

    let output = runner::run_capture(&tools.ffprobe, &args)?;
    if !output.status.success() {
        return Err(CoreError::CommandFailed {
            tool: tools.ffprobe.clone(),
            status: output.status,
            message: output.stderr.trim().to_string(),
        });
    }

    let fps = parse_fps_json(&output.stdout)?;
    debug!("avg frame rate of {}: {fps}", input.display());
    Ok(fps)
}

fn parse_fps_json(json: &str) -> CoreResult<f64> {
    let probe: ProbeOutput = serde_json::from_str(json)?;
    let stream = probe.streams.first().ok_or(CoreError::NoVideoStream)?;
    let rate = stream
        .avg_frame_rate
        .as_deref()
        .ok_or_else(|| CoreError::MalformedFrameRate {
            value: "<missing>".to_string(),
        })?;
    parse_rational_rate(rate)
}

/// Parses ffprobe's `"N/D"` rational frame rate.
fn parse_rational_rate(value: &str) -> CoreResult<f64> {
    let malformed = || CoreError::MalformedFrameRate {
        value: value.to_string(),
    };

    let (numerator, denominator) = value.split_once('/').ok_or_else(malformed)?;
    let numerator: u64 = numerator.parse().map_err(|_| malformed())?;
    let denominator: u64 = denominator.parse().map_err(|_| malformed())?;
    if denominator == 0 {
        return Err(malformed());
    }

    Ok(numerator as f64 / denominator as f64)
}
