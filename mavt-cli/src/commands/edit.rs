// mavt-cli/src/commands/edit.rs
//
// File-producing commands (slice, crop-scale, select-audio) and the
// find-image search. All of them stream OperationEvents into the progress
// display and turn a Failed outcome into a process-level error.

use std::path::Path;

use anyhow::{bail, Result};
use console::style;
use mavt_core::{ops, OperationEvent, OperationOutcome, ToolPaths};

use crate::cli::{CropScaleArgs, FindImageArgs, SelectAudioArgs, SliceArgs};
use crate::progress::ProgressDisplay;

pub fn run_slice(tools: &ToolPaths, args: &SliceArgs) -> Result<()> {
    let display = ProgressDisplay::new(args.progress);
    let request = ops::SliceRequest {
        start: args.ss.clone(),
        end: args.to.clone(),
        input: args.input_path.clone(),
        output: args.output_path.clone(),
    };

    let outcome = ops::slice(tools, &request, &mut |event| dispatch(&display, event));
    display.finish();
    report_file_outcome(outcome?, &args.output_path)
}

pub fn run_crop_scale(tools: &ToolPaths, args: &CropScaleArgs) -> Result<()> {
    let display = ProgressDisplay::new(args.progress);
    let request = ops::CropScaleRequest {
        input: args.input_path.clone(),
        crop: args.crop.clone(),
        scale: args.scale.clone(),
        video_codec: args.video_codec.clone(),
        output: args.output_path.clone(),
    };

    let outcome = ops::crop_scale(tools, &request, &mut |event| dispatch(&display, event));
    display.finish();
    report_file_outcome(outcome?, &args.output_path)
}

pub fn run_select_audio(tools: &ToolPaths, args: &SelectAudioArgs) -> Result<()> {
    let display = ProgressDisplay::new(args.progress);
    let request = ops::SelectAudioRequest {
        input: args.input_path.clone(),
        audio_tracks: args.audio_tracks.clone(),
        output: args.output_path.clone(),
    };

    let outcome = ops::select_audio(tools, &request, &mut |event| dispatch(&display, event));
    display.finish();
    report_file_outcome(outcome?, &args.output_path)
}

pub fn run_find_image(tools: &ToolPaths, args: &FindImageArgs) -> Result<()> {
    let display = ProgressDisplay::new(args.progress);
    let request = ops::FindImageRequest {
        start: args.ss.clone(),
        end: args.to.clone(),
        input: args.input_path.clone(),
        input_crop: args.input_crop.clone(),
        reference: args.reference_path.clone(),
        reference_crop: args.reference_crop.clone(),
        fps: args.fps,
        blackframe_amount: args.blackframe_amount,
        blackframe_threshold: args.blackframe_threshold,
        output_interval: args.output_interval,
    };

    let outcome = ops::find_image(tools, &request, &mut |event| dispatch(&display, event));
    display.finish();

    let outcome = outcome?;
    if outcome.success {
        Ok(())
    } else {
        bail_with_diagnostic(outcome)
    }
}

fn dispatch(display: &ProgressDisplay, event: OperationEvent) {
    match event {
        OperationEvent::Progress(progress) => display.update(&progress),
        OperationEvent::Detection(detection) => display.detection(&detection),
    }
}

fn report_file_outcome(outcome: OperationOutcome, output: &Path) -> Result<()> {
    if outcome.success {
        println!("{} {}", style("Done").green().bold(), output.display());
        Ok(())
    } else {
        bail_with_diagnostic(outcome)
    }
}

fn bail_with_diagnostic(outcome: OperationOutcome) -> Result<()> {
    match outcome.message {
        Some(message) => bail!("ffmpeg failed:\n{message}"),
        None => bail!("ffmpeg failed without a diagnostic message"),
    }
}
