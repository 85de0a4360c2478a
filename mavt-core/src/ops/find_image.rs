//! Locating a reference image inside a video.
//!
//! The input video and a looped still image are blended with
//! `blend=difference`; frames where the difference is nearly black are the
//! frames where the image appears. The blackframe filter reports those
//! frames on stderr, and the driver translates each report back into the
//! input video's timeline before applying the minimum-output-interval
//! filter.

use std::path::PathBuf;

use log::info;

use crate::config::ToolPaths;
use crate::error::CoreResult;
use crate::external::classifier;
use crate::external::runner::{self, StreamSource};
use crate::probe;
use crate::progress::ProgressTranslator;
use crate::timecode::TimeCode;

use super::{outcome_from_status, ImageDetection, OperationEvent, OperationOutcome};

/// Percentage of pixels that must be below the threshold for a blackframe
/// report.
pub const DEFAULT_BLACKFRAME_AMOUNT: u32 = 98;
/// Pixel luminance threshold for "black".
pub const DEFAULT_BLACKFRAME_THRESHOLD: u32 = 32;

/// Parameters for a find-image operation.
#[derive(Debug, Clone)]
pub struct FindImageRequest {
    /// Optional `-ss` seek, ffmpeg time syntax.
    pub start: Option<String>,
    /// Optional `-to` stop time, ffmpeg time syntax.
    pub end: Option<String>,
    pub input: PathBuf,
    /// Crop applied to the input video before blending (`w:h:x:y`).
    pub input_crop: Option<String>,
    pub reference: PathBuf,
    /// Crop applied to the reference image before blending.
    pub reference_crop: Option<String>,
    /// Sampling rate override; also becomes the internal frame rate.
    pub fps: Option<u32>,
    pub blackframe_amount: u32,
    pub blackframe_threshold: u32,
    /// Minimum seconds between two forwarded detections (input timeline).
    pub output_interval: f64,
}

/// Searches the video for frames matching the reference image. Detections
/// and progress are interleaved through `on_event`.
pub fn find_image(
    tools: &ToolPaths,
    request: &FindImageRequest,
    on_event: &mut dyn FnMut(OperationEvent),
) -> CoreResult<OperationOutcome> {
    let input_fps = probe::resolve_fps(tools, &request.input)?;
    let internal_fps = request.fps.map_or(input_fps, f64::from);

    let start_offset = match request.start.as_deref() {
        Some(start) => {
            let requested: TimeCode = start.parse()?;
            let key_frames = probe::scan_key_frames(tools, &request.input)?;
            key_frames.resolve_seek_time(requested)
        }
        None => TimeCode::ZERO,
    };
    let translator = ProgressTranslator::new(start_offset, input_fps, internal_fps);

    info!(
        "searching for {} in {} (amount={}, threshold={})",
        request.reference.display(),
        request.input.display(),
        request.blackframe_amount,
        request.blackframe_threshold
    );

    let mut args = vec!["-hide_banner".to_string()];
    if let Some(start) = &request.start {
        args.push("-ss".to_string());
        args.push(start.clone());
    }
    if let Some(end) = &request.end {
        args.push("-to".to_string());
        args.push(end.clone());
    }
    args.extend([
        "-i".to_string(),
        request.input.to_string_lossy().into_owned(),
        "-loop".to_string(),
        "1".to_string(),
        "-i".to_string(),
        request.reference.to_string_lossy().into_owned(),
        "-an".to_string(),
        "-filter_complex".to_string(),
        build_filter_graph(request),
        "-f".to_string(),
        "null".to_string(),
        "-".to_string(),
    ]);

    let mut interval = IntervalFilter::new(request.output_interval);
    let mut stderr_lines: Vec<String> = Vec::new();

    let status = runner::run_streaming(&tools.ffmpeg, &args, |source, line| {
        if source != StreamSource::Stderr {
            return Ok(());
        }
        stderr_lines.push(line.to_string());

        if let Some(report) = classifier::match_blackframe(line)? {
            let internal_time = TimeCode::from_secs_f64(report.t);
            let translated = translator.translate(report.frame, internal_time);
            if interval.accept(translated.time.total_seconds()) {
                on_event(OperationEvent::Detection(ImageDetection {
                    frame: translated.frame,
                    time: translated.time,
                    internal_frame: report.frame,
                    internal_time,
                    pblack: report.pblack,
                    pts: report.pts,
                    frame_type: report.frame_type,
                    last_keyframe: report.last_keyframe,
                }));
            }
            return Ok(());
        }

        if let Some(progress) = classifier::match_progress(line) {
            let time: TimeCode = progress.time.parse()?;
            on_event(OperationEvent::Progress(
                translator.translate(progress.frame, time),
            ));
        }
        Ok(())
    })?;

    Ok(outcome_from_status(status, &stderr_lines))
}

/// Assembles the blend/blackframe filter graph, chaining the optional
/// `fps`/`crop` filters onto whichever inputs need them.
fn build_filter_graph(request: &FindImageRequest) -> String {
    let chain = |crop: Option<&str>| -> Option<String> {
        let mut filters = Vec::new();
        if let Some(fps) = request.fps {
            filters.push(format!("fps={fps}"));
        }
        if let Some(crop) = crop {
            filters.push(format!("crop={crop}"));
        }
        if filters.is_empty() {
            None
        } else {
            Some(filters.join(","))
        }
    };

    let input_chain = chain(request.input_crop.as_deref());
    let reference_chain = chain(request.reference_crop.as_deref());

    let blend_a = if input_chain.is_some() { "[va]" } else { "[0:v]" };
    let blend_b = if reference_chain.is_some() { "[vb]" } else { "[1:v]" };

    let mut sections = Vec::new();
    if let Some(filters) = &input_chain {
        sections.push(format!("[0:v]{filters}[va]"));
    }
    if let Some(filters) = &reference_chain {
        sections.push(format!("[1:v]{filters}[vb]"));
    }
    sections.push(format!(
        "{blend_a}{blend_b}blend=difference:shortest=1,blackframe=amount={}:threshold={}",
        request.blackframe_amount, request.blackframe_threshold
    ));

    sections.join(";")
}

/// Suppresses detections closer than `min_interval` seconds (input
/// timeline) to the previously forwarded one. Seeded so the first
/// detection always passes.
struct IntervalFilter {
    min_interval: f64,
    previous: f64,
}

impl IntervalFilter {
    fn new(min_interval: f64) -> Self {
        Self {
            min_interval,
            previous: -min_interval,
        }
    }

    fn accept(&mut self, seconds: f64) -> bool {
        if seconds - self.previous >= self.min_interval {
            self.previous = seconds;
            true
        } else {
            false
        }
    }
}
