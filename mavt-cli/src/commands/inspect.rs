// mavt-cli/src/commands/inspect.rs
//
// Read-only commands: input, fps, key-frames, audio.

use anyhow::Result;
use mavt_core::{probe, ToolPaths};

use crate::cli::{AudioArgs, FpsArgs, InputArgs, KeyFramesArgs};

pub fn run_input(tools: &ToolPaths, args: &InputArgs) -> Result<()> {
    let input = probe::inspect_input(tools, &args.input_path)?;

    println!("Input #{}, {}", input.index, input.text);
    for (key, value) in &input.metadata {
        println!("  {key}: {value}");
    }
    for group in &input.streams {
        for track in &group.tracks {
            println!("Stream #{}:{} ({}): {}", group.index, track.index, track.kind, track.text);
            for (key, value) in &track.metadata {
                println!("    {key}: {value}");
            }
        }
    }
    Ok(())
}

pub fn run_fps(tools: &ToolPaths, args: &FpsArgs) -> Result<()> {
    let fps = probe::resolve_fps(tools, &args.input_path)?;
    println!("{fps}");
    Ok(())
}

pub fn run_key_frames(tools: &ToolPaths, args: &KeyFramesArgs) -> Result<()> {
    // Print timestamps as they arrive; keyframe scans of long files take a
    // while and buffering the whole list first would look like a hang.
    probe::scan_key_frames_with(tools, &args.input_path, |time| {
        println!("{:.6}", time.total_seconds());
    })?;
    Ok(())
}

pub fn run_audio(tools: &ToolPaths, args: &AudioArgs) -> Result<()> {
    let input = probe::inspect_input(tools, &args.input_path)?;
    for track in input.audio_tracks() {
        let title = track.metadata_value("title").unwrap_or("");
        println!("Audio Track {}: {}", track.index, title);
    }
    Ok(())
}
