// mavt-cli/src/main.rs
//
// Entry point: parses arguments, initializes logging, threads the tool
// paths into the chosen command, and maps errors to a nonzero exit.

mod cli;
mod commands;
mod progress;

use std::process;

use clap::Parser;
use console::style;
use log::debug;
use mavt_core::ToolPaths;

fn main() {
    let cli = cli::Cli::parse();

    // The --log-level flag sets the default; RUST_LOG still wins so probes
    // can be debugged without re-running with different flags.
    env_logger::Builder::new()
        .filter_level(cli.log_level)
        .parse_default_env()
        .init();

    debug!(
        "mavt run started: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    let tools = ToolPaths::new(cli.ffmpeg_path.clone(), cli.ffprobe_path.clone());

    let result = match &cli.command {
        cli::Commands::Input(args) => commands::run_input(&tools, args),
        cli::Commands::Fps(args) => commands::run_fps(&tools, args),
        cli::Commands::KeyFrames(args) => commands::run_key_frames(&tools, args),
        cli::Commands::Slice(args) => commands::run_slice(&tools, args),
        cli::Commands::CropScale(args) => commands::run_crop_scale(&tools, args),
        cli::Commands::FindImage(args) => commands::run_find_image(&tools, args),
        cli::Commands::Audio(args) => commands::run_audio(&tools, args),
        cli::Commands::SelectAudio(args) => commands::run_select_audio(&tools, args),
    };

    if let Err(err) = result {
        eprintln!("{} {err:#}", style("Error:").red().bold());
        process::exit(1);
    }
}
