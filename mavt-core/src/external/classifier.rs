//! Line grammar matchers for ffmpeg/ffprobe diagnostic output.
//!
//! Each matcher inspects one line in isolation and either extracts typed
//! fields or reports no match. Matching is deliberately order-insensitive:
//! drivers try the grammars they care about and skip everything else.
//! Malformed fields inside an already-matched grammar are errors; lines that
//! simply match no grammar are not.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CoreError, CoreResult};

/// A `frame=... time=... bitrate=...` statistics line.
///
/// The time field is kept as text; whether `N/A` or a malformed value is
/// tolerable depends on the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressLine {
    pub frame: i64,
    pub time: String,
}

/// One report from the blackframe filter.
#[derive(Debug, Clone, PartialEq)]
pub struct BlackframeLine {
    pub frame: i64,
    pub pblack: i64,
    pub pts: i64,
    pub t: f64,
    pub frame_type: String,
    pub last_keyframe: i64,
}

/// `Input #N, <text>` header from an input dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputHeader {
    pub index: u32,
    pub text: String,
}

/// Media kind of a stream within an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Video,
    Audio,
    Other,
}

impl TrackKind {
    fn from_label(label: &str) -> TrackKind {
        match label {
            "Video" => TrackKind::Video,
            "Audio" => TrackKind::Audio,
            _ => TrackKind::Other,
        }
    }
}

impl std::fmt::Display for TrackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TrackKind::Video => "Video",
            TrackKind::Audio => "Audio",
            TrackKind::Other => "Other",
        })
    }
}

/// `Stream #N:M...: <Kind>: <text>` header from an input dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamHeader {
    pub input_index: u32,
    pub track_index: u32,
    pub kind: TrackKind,
    pub text: String,
}

static PROGRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^frame=\s*(\d+)\s+.*time=(\S+)\s+bitrate").unwrap());

static BLACKFRAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[Parsed_blackframe[^\]]*\]\s+(frame:.+)$").unwrap());

static INPUT_HEADER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Input #(\d+), (.+)$").unwrap());

// ffmpeg 4.2 indents stream headers four spaces, 4.4 two spaces.
static STREAM_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\s{2}|\s{4})Stream #(\d+):(\d+).*?: ([A-Za-z]+): (.+)$").unwrap()
});

/// Matches an encoder statistics line. Fields other than `frame` and `time`
/// (fps, q, size, speed, ...) vary between ffmpeg versions and are ignored.
pub fn match_progress(line: &str) -> Option<ProgressLine> {
    let caps = PROGRESS_RE.captures(line)?;
    let frame = caps[1].parse().ok()?;
    Some(ProgressLine {
        frame,
        time: caps[2].to_string(),
    })
}

/// Matches a `[Parsed_blackframe...] frame:N pblack:N pts:N t:F type:C
/// last_keyframe:N` report. A matched line with missing or non-numeric
/// fields is an error, not a skip.
pub fn match_blackframe(line: &str) -> CoreResult<Option<BlackframeLine>> {
    let caps = match BLACKFRAME_RE.captures(line) {
        Some(caps) => caps,
        None => return Ok(None),
    };

    let malformed = || CoreError::BlackframeParse {
        line: line.to_string(),
    };

    let mut frame = None;
    let mut pblack = None;
    let mut pts = None;
    let mut t = None;
    let mut frame_type = None;
    let mut last_keyframe = None;

    for token in caps[1].split_whitespace() {
        let (key, value) = token.split_once(':').ok_or_else(malformed)?;
        match key {
            "frame" => frame = Some(value.parse().map_err(|_| malformed())?),
            "pblack" => pblack = Some(value.parse().map_err(|_| malformed())?),
            "pts" => pts = Some(value.parse().map_err(|_| malformed())?),
            "t" => t = Some(value.parse().map_err(|_| malformed())?),
            "type" => frame_type = Some(value.to_string()),
            "last_keyframe" => last_keyframe = Some(value.parse().map_err(|_| malformed())?),
            _ => {}
        }
    }

    Ok(Some(BlackframeLine {
        frame: frame.ok_or_else(malformed)?,
        pblack: pblack.ok_or_else(malformed)?,
        pts: pts.ok_or_else(malformed)?,
        t: t.ok_or_else(malformed)?,
        frame_type: frame_type.ok_or_else(malformed)?,
        last_keyframe: last_keyframe.ok_or_else(malformed)?,
    }))
}

/// Matches one row of `ffprobe -of csv` keyframe output and returns the
/// timestamp in seconds.
///
/// Works around the ffprobe CSV glitch (trac ticket 7153) where the comma
/// before a `side_data` column is dropped, yielding `frame,0.007000side_data`:
/// the literal suffix is stripped before parsing. A matched row whose
/// seconds field still fails to parse is an error.
pub fn match_key_frame_seconds(line: &str) -> CoreResult<Option<f64>> {
    let mut columns = line.split(',');
    if columns.next() != Some("frame") {
        return Ok(None);
    }
    let seconds = match columns.next() {
        Some(field) => field.trim(),
        None => return Ok(None),
    };

    let seconds = seconds.strip_suffix("side_data").unwrap_or(seconds);
    if seconds.is_empty() || seconds == "N/A" {
        // Frame without a timestamp; nothing to locate it by.
        return Ok(None);
    }
    match seconds.parse::<f64>() {
        Ok(value) => Ok(Some(value)),
        Err(_) => Err(CoreError::KeyFrameParse {
            line: line.to_string(),
        }),
    }
}

pub fn match_input_header(line: &str) -> Option<InputHeader> {
    let caps = INPUT_HEADER_RE.captures(line)?;
    Some(InputHeader {
        index: caps[1].parse().ok()?,
        text: caps[2].to_string(),
    })
}

pub fn match_stream_header(line: &str) -> Option<StreamHeader> {
    let caps = STREAM_HEADER_RE.captures(line)?;
    Some(StreamHeader {
        input_index: caps[1].parse().ok()?,
        track_index: caps[2].parse().ok()?,
        kind: TrackKind::from_label(&caps[3]),
        text: caps[4].to_string(),
    })
}

fn indented_rest(line: &str, indent: usize) -> Option<&str> {
    if line.len() <= indent || !line.as_bytes()[..indent].iter().all(|&b| b == b' ') {
        return None;
    }
    Some(&line[indent..])
}

/// Matches the `Metadata:` marker at the given indent level.
pub fn match_metadata_block_start(line: &str, indent: usize) -> bool {
    indented_rest(line, indent).is_some_and(|rest| rest.trim_end() == "Metadata:")
}

/// Matches a `key : value` continuation line at the given indent level.
/// Lines with an empty value (such as a deeper `Metadata:` marker) do not
/// match.
pub fn match_metadata_item(line: &str, indent: usize) -> Option<(String, String)> {
    let rest = indented_rest(line, indent)?;
    let (key, value) = rest.split_once(':')?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_line_tolerates_interior_fields() {
        let line = "frame=  120 fps=30 q=-1.0 size=1024kB time=00:00:04.00 bitrate=2095.8kbits/s speed=1.99x";
        let progress = match_progress(line).unwrap();
        assert_eq!(progress.frame, 120);
        assert_eq!(progress.time, "00:00:04.00");
    }

    #[test]
    fn progress_line_requires_bitrate() {
        let line = "frame=  120 fps=30 q=-1.0 size=1024kB time=00:00:04.00 speed=1.99x";
        assert!(match_progress(line).is_none());
        assert!(match_progress("size=1024kB time=00:00:04.00 bitrate=1k").is_none());
    }

    #[test]
    fn blackframe_line_extracts_all_fields() {
        let line =
            "[Parsed_blackframe_2 @ 0x5604] frame:810 pblack:99 pts:13516 t:13.516000 type:P last_keyframe:720";
        let bf = match_blackframe(line).unwrap().unwrap();
        assert_eq!(bf.frame, 810);
        assert_eq!(bf.pblack, 99);
        assert_eq!(bf.pts, 13516);
        assert!((bf.t - 13.516).abs() < 1e-9);
        assert_eq!(bf.frame_type, "P");
        assert_eq!(bf.last_keyframe, 720);
    }

    #[test]
    fn blackframe_line_with_bad_field_is_an_error() {
        let line = "[Parsed_blackframe_2 @ 0x5604] frame:oops pblack:99 pts:1 t:1.0 type:P last_keyframe:0";
        assert!(match_blackframe(line).is_err());

        // Missing a required key is also an error once the grammar matched.
        let line = "[Parsed_blackframe_2 @ 0x5604] frame:810 pblack:99";
        assert!(match_blackframe(line).is_err());
    }

    #[test]
    fn blackframe_prefix_is_required() {
        assert!(match_blackframe("frame:810 pblack:99").unwrap().is_none());
    }

    #[test]
    fn key_frame_row_parses_plain_and_glitched_forms() {
        assert_eq!(match_key_frame_seconds("frame,1.983000").unwrap(), Some(1.983));
        assert_eq!(
            match_key_frame_seconds(
                "frame,0.007000side_data,H.26[45] User Data Unregistered SEI message"
            )
            .unwrap(),
            Some(0.007)
        );
        assert_eq!(
            match_key_frame_seconds("frame,0.007000,side_data,H.26[45] User Data").unwrap(),
            Some(0.007)
        );
    }

    #[test]
    fn key_frame_row_skips_and_fails_correctly() {
        assert_eq!(match_key_frame_seconds("stream,0,0").unwrap(), None);
        assert_eq!(match_key_frame_seconds("frame").unwrap(), None);
        assert_eq!(match_key_frame_seconds("frame,N/A").unwrap(), None);
        assert!(match_key_frame_seconds("frame,garbage").is_err());
    }

    #[test]
    fn input_header_matches() {
        let header = match_input_header("Input #0, matroska,webm, from 'in.mkv':").unwrap();
        assert_eq!(header.index, 0);
        assert_eq!(header.text, "matroska,webm, from 'in.mkv':");
        assert!(match_input_header("  Input #0, x").is_none());
    }

    #[test]
    fn stream_header_matches_both_indent_levels() {
        let v42 = "    Stream #0:0: Video: h264 (High), yuv420p(tv, bt709), 1920x1080, 60 fps";
        let v44 = "  Stream #0:1(jpn): Audio: aac (LC), 48000 Hz, stereo, fltp (default)";

        let video = match_stream_header(v42).unwrap();
        assert_eq!(video.input_index, 0);
        assert_eq!(video.track_index, 0);
        assert_eq!(video.kind, TrackKind::Video);

        let audio = match_stream_header(v44).unwrap();
        assert_eq!(audio.track_index, 1);
        assert_eq!(audio.kind, TrackKind::Audio);
        assert_eq!(audio.text, "aac (LC), 48000 Hz, stereo, fltp (default)");

        let subs = match_stream_header("  Stream #0:2: Subtitle: ass").unwrap();
        assert_eq!(subs.kind, TrackKind::Other);

        assert!(match_stream_header("Stream #0:0: Video: h264").is_none());
    }

    #[test]
    fn metadata_lines_match_at_exact_indent() {
        assert!(match_metadata_block_start("  Metadata:", 2));
        assert!(!match_metadata_block_start("Metadata:", 2));

        assert_eq!(
            match_metadata_item("    title           : Commentary", 4),
            Some(("title".to_string(), "Commentary".to_string()))
        );
        assert_eq!(match_metadata_item("    Metadata:", 4), None);
        assert_eq!(match_metadata_item("Duration: 00:00:20.07", 4), None);
    }
}
