//! Translation of ffmpeg's internal progress coordinates.
//!
//! ffmpeg's `frame=`/`time=` counters start near zero at the point decoding
//! began (after any `-ss` seek, which itself snaps to a keyframe) and count
//! at the *output* frame rate, which an `fps` filter may have changed. The
//! translator rescales both back into the input video's timeline.

use crate::timecode::TimeCode;

/// A progress sample in both coordinate systems.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranslatedProgress {
    /// Frame number in the input video's timeline.
    pub frame: i64,
    /// Time in the input video's timeline.
    pub time: TimeCode,
    pub internal_frame: i64,
    pub internal_time: TimeCode,
}

/// Converts internal (frame, time) pairs into input-relative coordinates.
///
/// Constructed once per operation: `start_offset` is the keyframe-resolved
/// seek time, `internal_fps` is the rate ffmpeg counts frames at (equal to
/// `input_fps` unless the operation inserts its own `fps` filter).
#[derive(Debug, Clone, Copy)]
pub struct ProgressTranslator {
    start_offset: TimeCode,
    input_fps: f64,
    internal_fps: f64,
}

impl ProgressTranslator {
    pub fn new(start_offset: TimeCode, input_fps: f64, internal_fps: f64) -> Self {
        Self {
            start_offset,
            input_fps,
            internal_fps,
        }
    }

    pub fn translate(&self, internal_frame: i64, internal_time: TimeCode) -> TranslatedProgress {
        let start_frame = self.start_offset.total_seconds() * self.input_fps;
        let rescaled = internal_frame as f64 / self.internal_fps * self.input_fps;

        TranslatedProgress {
            // Floor, not round: the frame number is observable output and
            // must be reproducible bit-for-bit.
            frame: (start_frame + rescaled).floor() as i64,
            time: self.start_offset + internal_time,
            internal_frame,
            internal_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_with_matching_rates() {
        let translator =
            ProgressTranslator::new("00:00:10.000000".parse().unwrap(), 30.0, 30.0);
        let progress = translator.translate(60, TimeCode::from_secs_f64(2.0));

        assert_eq!(progress.time, TimeCode::from_secs_f64(12.0));
        assert_eq!(progress.frame, 360);
        assert_eq!(progress.internal_frame, 60);
        assert_eq!(progress.internal_time, TimeCode::from_secs_f64(2.0));
    }

    #[test]
    fn rescales_across_fps_mismatch() {
        // Internal counter at 5 fps over a 30 fps input: each internal
        // frame covers six input frames.
        let translator = ProgressTranslator::new(TimeCode::ZERO, 30.0, 5.0);
        let progress = translator.translate(10, TimeCode::from_secs_f64(2.0));
        assert_eq!(progress.frame, 60);
        assert_eq!(progress.time, TimeCode::from_secs_f64(2.0));
    }

    #[test]
    fn output_frame_is_floored() {
        let translator = ProgressTranslator::new(TimeCode::ZERO, 30.0, 7.0);
        // 5 / 7 * 30 = 21.428... -> 21
        let progress = translator.translate(5, TimeCode::ZERO);
        assert_eq!(progress.frame, 21);
    }

    #[test]
    fn zero_offset_is_identity_for_time() {
        let translator = ProgressTranslator::new(TimeCode::ZERO, 30.0, 30.0);
        let time = TimeCode::from_secs_f64(3.25);
        let progress = translator.translate(0, time);
        assert_eq!(progress.time, time);
        assert_eq!(progress.frame, 0);
    }
}
