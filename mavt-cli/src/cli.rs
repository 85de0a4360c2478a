// mavt-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use mavt_core::ops::find_image::{DEFAULT_BLACKFRAME_AMOUNT, DEFAULT_BLACKFRAME_THRESHOLD};

use crate::progress::ProgressMode;

#[derive(Parser, Debug)]
#[command(
    name = "mavt",
    author,
    version,
    about = "Inspect and edit multi-audio-track videos",
    long_about = "Inspects and edits multi-audio-track video files by driving the \
                  external ffmpeg/ffprobe binaries via mavt-core."
)]
pub struct Cli {
    /// Path of the ffmpeg executable.
    #[arg(
        long,
        value_name = "PATH",
        env = "MAVT_FFMPEG",
        default_value = "ffmpeg",
        global = true
    )]
    pub ffmpeg_path: String,

    /// Path of the ffprobe executable.
    #[arg(
        long,
        value_name = "PATH",
        env = "MAVT_FFPROBE",
        default_value = "ffprobe",
        global = true
    )]
    pub ffprobe_path: String,

    /// Log level (error, warn, info, debug, trace). RUST_LOG overrides.
    #[arg(short = 'l', long, value_name = "LEVEL", default_value = "warn", global = true)]
    pub log_level: log::LevelFilter,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the input's streams, tracks and metadata
    Input(InputArgs),
    /// Print the input's average video frame rate
    Fps(FpsArgs),
    /// List every keyframe timestamp in seconds
    KeyFrames(KeyFramesArgs),
    /// Copy a time range into a new file without re-encoding
    Slice(SliceArgs),
    /// Re-encode the video through crop/scale filters
    CropScale(CropScaleArgs),
    /// Locate a reference image via blackframe difference detection
    FindImage(FindImageArgs),
    /// List the audio tracks and their titles
    Audio(AudioArgs),
    /// Keep only the chosen audio tracks
    SelectAudio(SelectAudioArgs),
}

#[derive(Parser, Debug)]
pub struct InputArgs {
    /// Input video file
    #[arg(short = 'i', long = "input", value_name = "INPUT_PATH")]
    pub input_path: PathBuf,
}

#[derive(Parser, Debug)]
pub struct FpsArgs {
    /// Input video file
    #[arg(short = 'i', long = "input", value_name = "INPUT_PATH")]
    pub input_path: PathBuf,
}

#[derive(Parser, Debug)]
pub struct KeyFramesArgs {
    /// Input video file
    #[arg(short = 'i', long = "input", value_name = "INPUT_PATH")]
    pub input_path: PathBuf,
}

#[derive(Parser, Debug)]
pub struct SliceArgs {
    /// Range start (ffmpeg time syntax, e.g. 00:01:30.5 or 90.5)
    #[arg(long)]
    pub ss: String,

    /// Range end (ffmpeg time syntax)
    #[arg(long)]
    pub to: String,

    /// Input video file
    #[arg(short = 'i', long = "input", value_name = "INPUT_PATH")]
    pub input_path: PathBuf,

    /// Progress display mode
    #[arg(short = 'p', long, value_enum, default_value_t = ProgressMode::Bar)]
    pub progress: ProgressMode,

    /// Output video file (must not exist)
    #[arg(value_name = "OUTPUT_PATH")]
    pub output_path: PathBuf,
}

#[derive(Parser, Debug)]
pub struct CropScaleArgs {
    /// Input video file
    #[arg(short = 'i', long = "input", value_name = "INPUT_PATH")]
    pub input_path: PathBuf,

    /// Crop expression (w:h:x:y)
    #[arg(long, value_name = "CROP")]
    pub crop: Option<String>,

    /// Scale expression (w:h)
    #[arg(long, value_name = "SCALE")]
    pub scale: Option<String>,

    /// Video codec override (e.g. libx264)
    #[arg(long = "video-codec", value_name = "CODEC")]
    pub video_codec: Option<String>,

    /// Progress display mode
    #[arg(short = 'p', long, value_enum, default_value_t = ProgressMode::Bar)]
    pub progress: ProgressMode,

    /// Output video file (must not exist)
    #[arg(value_name = "OUTPUT_PATH")]
    pub output_path: PathBuf,
}

#[derive(Parser, Debug)]
pub struct FindImageArgs {
    /// Search range start (ffmpeg time syntax)
    #[arg(long)]
    pub ss: Option<String>,

    /// Search range end (ffmpeg time syntax)
    #[arg(long)]
    pub to: Option<String>,

    /// Input video file
    #[arg(short = 'i', long = "input", value_name = "INPUT_PATH")]
    pub input_path: PathBuf,

    /// Crop applied to the input video before comparison (w:h:x:y)
    #[arg(long = "input-crop", value_name = "CROP")]
    pub input_crop: Option<String>,

    /// Reference image file
    #[arg(short = 'r', long = "reference", value_name = "IMAGE_PATH")]
    pub reference_path: PathBuf,

    /// Crop applied to the reference image before comparison (w:h:x:y)
    #[arg(long = "reference-crop", value_name = "CROP")]
    pub reference_crop: Option<String>,

    /// Sampling frame rate override
    #[arg(long, value_name = "FPS")]
    pub fps: Option<u32>,

    /// Blackframe amount (percentage of pixels below the threshold)
    #[arg(long = "blackframe-amount", value_name = "AMOUNT", default_value_t = DEFAULT_BLACKFRAME_AMOUNT)]
    pub blackframe_amount: u32,

    /// Blackframe pixel threshold
    #[arg(long = "blackframe-threshold", value_name = "THRESHOLD", default_value_t = DEFAULT_BLACKFRAME_THRESHOLD)]
    pub blackframe_threshold: u32,

    /// Minimum seconds between reported detections
    #[arg(long = "output-interval", value_name = "SECONDS", default_value_t = 0.0)]
    pub output_interval: f64,

    /// Progress display mode
    #[arg(short = 'p', long, value_enum, default_value_t = ProgressMode::Bar)]
    pub progress: ProgressMode,
}

#[derive(Parser, Debug)]
pub struct AudioArgs {
    /// Input video file
    #[arg(short = 'i', long = "input", value_name = "INPUT_PATH")]
    pub input_path: PathBuf,
}

#[derive(Parser, Debug)]
pub struct SelectAudioArgs {
    /// Input video file
    #[arg(short = 'i', long = "input", value_name = "INPUT_PATH")]
    pub input_path: PathBuf,

    /// Zero-based audio track index to keep (repeatable)
    #[arg(long = "audio-track", value_name = "INDEX", required = true)]
    pub audio_tracks: Vec<u32>,

    /// Progress display mode
    #[arg(short = 'p', long, value_enum, default_value_t = ProgressMode::Bar)]
    pub progress: ProgressMode,

    /// Output video file (must not exist)
    #[arg(value_name = "OUTPUT_PATH")]
    pub output_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_slice_args() {
        let cli = Cli::parse_from([
            "mavt", "slice", "--ss", "00:00:01", "--to", "00:00:03", "-i", "in.mkv", "out.mkv",
        ]);
        match cli.command {
            Commands::Slice(args) => {
                assert_eq!(args.ss, "00:00:01");
                assert_eq!(args.to, "00:00:03");
                assert_eq!(args.input_path, PathBuf::from("in.mkv"));
                assert_eq!(args.output_path, PathBuf::from("out.mkv"));
                assert_eq!(args.progress, ProgressMode::Bar);
            }
            other => panic!("expected slice, got {other:?}"),
        }
    }

    #[test]
    fn parses_global_tool_paths() {
        let cli = Cli::parse_from([
            "mavt",
            "fps",
            "-i",
            "in.mkv",
            "--ffmpeg-path",
            "/opt/ffmpeg/bin/ffmpeg",
            "--ffprobe-path",
            "/opt/ffmpeg/bin/ffprobe",
        ]);
        assert_eq!(cli.ffmpeg_path, "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(cli.ffprobe_path, "/opt/ffmpeg/bin/ffprobe");
    }

    #[test]
    fn parses_find_image_defaults() {
        let cli = Cli::parse_from(["mavt", "find-image", "-i", "in.mkv", "-r", "ref.png"]);
        match cli.command {
            Commands::FindImage(args) => {
                assert_eq!(args.blackframe_amount, 98);
                assert_eq!(args.blackframe_threshold, 32);
                assert_eq!(args.output_interval, 0.0);
                assert!(args.ss.is_none());
                assert!(args.fps.is_none());
            }
            other => panic!("expected find-image, got {other:?}"),
        }
    }

    #[test]
    fn select_audio_requires_at_least_one_track() {
        assert!(Cli::try_parse_from(["mavt", "select-audio", "-i", "in.mkv", "out.mkv"]).is_err());

        let cli = Cli::parse_from([
            "mavt",
            "select-audio",
            "-i",
            "in.mkv",
            "--audio-track",
            "0",
            "--audio-track",
            "2",
            "out.mkv",
        ]);
        match cli.command {
            Commands::SelectAudio(args) => assert_eq!(args.audio_tracks, vec![0, 2]),
            other => panic!("expected select-audio, got {other:?}"),
        }
    }

    #[test]
    fn parses_progress_mode_values() {
        let cli = Cli::parse_from([
            "mavt", "slice", "--ss", "0", "--to", "1", "-i", "in.mkv", "-p", "plain", "out.mkv",
        ]);
        match cli.command {
            Commands::Slice(args) => assert_eq!(args.progress, ProgressMode::Plain),
            other => panic!("expected slice, got {other:?}"),
        }
    }
}
