//! Input/stream inspection from the `ffmpeg -i` dump.
//!
//! `ffmpeg -hide_banner -i INPUT` prints a human-readable description of the
//! input to stderr (and exits nonzero, since no output file is given). This
//! module parses that text into a typed description: one input, its metadata
//! block, and its streams grouped the way the header numbers them
//! (`Stream #G:T` — group `G`, track `T`).

use std::path::Path;

use crate::config::ToolPaths;
use crate::error::{CoreError, CoreResult};
use crate::external::classifier::{self, TrackKind};
use crate::external::runner;

/// One `Stream #G:T` entry with its metadata block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackDescription {
    pub index: u32,
    pub kind: TrackKind,
    pub text: String,
    pub metadata: Vec<(String, String)>,
}

impl TrackDescription {
    /// Case-insensitive metadata lookup.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// Tracks sharing the same leading stream-header number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamGroup {
    pub index: u32,
    pub tracks: Vec<TrackDescription>,
}

/// Parsed description of the first input in a dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDescription {
    pub index: u32,
    pub text: String,
    pub metadata: Vec<(String, String)>,
    pub streams: Vec<StreamGroup>,
}

impl InputDescription {
    /// Audio tracks of the first stream group, in header order.
    pub fn audio_tracks(&self) -> impl Iterator<Item = &TrackDescription> {
        self.streams
            .first()
            .into_iter()
            .flat_map(|group| group.tracks.iter())
            .filter(|track| track.kind == TrackKind::Audio)
    }
}

/// Inspects an input file by running `ffmpeg -i` and parsing its dump.
pub fn inspect_input(tools: &ToolPaths, input: &Path) -> CoreResult<InputDescription> {
    if !input.exists() {
        return Err(CoreError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} not found", input.display()),
        )));
    }

    let args = vec![
        "-hide_banner".to_string(),
        "-i".to_string(),
        input.to_string_lossy().into_owned(),
    ];

    // ffmpeg exits nonzero here by design ("At least one output file must be
    // specified"); the dump is complete on stderr regardless, so the exit
    // status is not consulted.
    let output = runner::run_capture(&tools.ffmpeg, &args)?;

    parse_input_dump(&output.stderr).ok_or_else(|| CoreError::EmptyInput {
        path: input.to_path_buf(),
    })
}

/// Parses the first `Input #N` block out of a dump. Returns `None` when the
/// text contains no input header (missing file, unreadable container).
pub fn parse_input_dump(text: &str) -> Option<InputDescription> {
    let lines: Vec<&str> = text.lines().collect();

    let input_starts: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| classifier::match_input_header(line).is_some())
        .map(|(idx, _)| idx)
        .collect();

    let start = *input_starts.first()?;
    let end = input_starts.get(1).copied().unwrap_or(lines.len());

    let header = classifier::match_input_header(lines[start])?;
    let block = &lines[start + 1..end];

    let stream_starts: Vec<usize> = block
        .iter()
        .enumerate()
        .filter(|(_, line)| classifier::match_stream_header(line).is_some())
        .map(|(idx, _)| idx)
        .collect();

    // Input-level metadata sits between the header and the first stream.
    let metadata_end = stream_starts.first().copied().unwrap_or(block.len());
    let metadata = collect_first_metadata_block(&block[..metadata_end], 2);

    let mut streams: Vec<StreamGroup> = Vec::new();
    for (position, &stream_start) in stream_starts.iter().enumerate() {
        let stream_end = stream_starts
            .get(position + 1)
            .copied()
            .unwrap_or(block.len());

        let stream_header = match classifier::match_stream_header(block[stream_start]) {
            Some(header) => header,
            None => continue,
        };
        let track_metadata = collect_first_metadata_block(&block[stream_start + 1..stream_end], 4);

        let track = TrackDescription {
            index: stream_header.track_index,
            kind: stream_header.kind,
            text: stream_header.text,
            metadata: track_metadata,
        };

        match streams
            .iter_mut()
            .find(|group| group.index == stream_header.input_index)
        {
            Some(group) => group.tracks.push(track),
            None => streams.push(StreamGroup {
                index: stream_header.input_index,
                tracks: vec![track],
            }),
        }
    }

    Some(InputDescription {
        index: header.index,
        text: header.text,
        metadata,
        streams,
    })
}

/// Collects the `key : value` items following the first `Metadata:` marker
/// at `indent`. Items are expected two spaces deeper; unrelated lines in
/// between are skipped.
fn collect_first_metadata_block(lines: &[&str], indent: usize) -> Vec<(String, String)> {
    let start = match lines
        .iter()
        .position(|line| classifier::match_metadata_block_start(line, indent))
    {
        Some(idx) => idx + 1,
        None => return Vec::new(),
    };

    lines[start..]
        .iter()
        .filter_map(|line| classifier::match_metadata_item(line, indent + 2))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ffmpeg 4.4 layout: streams indented two spaces.
    const DUMP_V44: &str = "\
Input #0, matroska,webm, from 'sample1.mkv':
  Metadata:
    title           : Sample One
    ENCODER         : Lavf58.76.100
  Duration: 00:00:20.07, start: 0.023000, bitrate: 3805 kb/s
  Stream #0:0: Video: h264 (High), yuv420p(tv, bt709, progressive), 1920x1080 [SAR 1:1 DAR 16:9], 60 fps, 60 tbr, 1k tbn, 120 tbc (default)
    Metadata:
      title           : Main Video
  Stream #0:1: Audio: aac (LC), 48000 Hz, stereo, fltp (default)
    Metadata:
      title           : Game Audio
  Stream #0:2: Audio: aac (LC), 48000 Hz, stereo, fltp
    Metadata:
      title           : Voice
At least one output file must be specified
";

    // ffmpeg 4.2 layout: streams indented four spaces.
    const DUMP_V42: &str = "\
Input #0, matroska,webm, from 'sample1.mkv':
  Metadata:
    ENCODER         : Lavf58.29.100
  Duration: 00:00:20.07, start: 0.023000, bitrate: 3805 kb/s
    Stream #0:0: Video: h264 (High), yuv420p, 1920x1080, 60 fps, 60 tbr, 1k tbn (default)
    Stream #0:1: Audio: aac (LC), 48000 Hz, stereo, fltp (default)
    Metadata:
      title           : Commentary
";

    #[test]
    fn parses_input_header_and_metadata() {
        let input = parse_input_dump(DUMP_V44).unwrap();
        assert_eq!(input.index, 0);
        assert_eq!(input.text, "matroska,webm, from 'sample1.mkv':");
        assert_eq!(
            input.metadata,
            vec![
                ("title".to_string(), "Sample One".to_string()),
                ("ENCODER".to_string(), "Lavf58.76.100".to_string()),
            ]
        );
    }

    #[test]
    fn parses_tracks_with_metadata() {
        let input = parse_input_dump(DUMP_V44).unwrap();
        assert_eq!(input.streams.len(), 1);

        let tracks = &input.streams[0].tracks;
        assert_eq!(tracks.len(), 3);
        assert_eq!(tracks[0].kind, TrackKind::Video);
        assert_eq!(tracks[1].index, 1);
        assert_eq!(tracks[1].metadata_value("title"), Some("Game Audio"));
        assert_eq!(tracks[2].metadata_value("TITLE"), Some("Voice"));

        let audio: Vec<u32> = input.audio_tracks().map(|t| t.index).collect();
        assert_eq!(audio, vec![1, 2]);
    }

    #[test]
    fn parses_four_space_stream_indent() {
        let input = parse_input_dump(DUMP_V42).unwrap();
        let tracks = &input.streams[0].tracks;
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].kind, TrackKind::Video);
        assert_eq!(tracks[1].metadata_value("title"), Some("Commentary"));
    }

    #[test]
    fn dump_without_input_yields_none() {
        let text = "sample1.mkv: No such file or directory\n";
        assert!(parse_input_dump(text).is_none());
        assert!(parse_input_dump("").is_none());
    }
}
