// mavt-cli/tests/cli_integration.rs
//
// Binary-level tests. These deliberately use nonexistent tool paths so
// they are deterministic on machines without ffmpeg installed; end-to-end
// coverage against the real binaries lives in mavt-core's e2e tests.

use assert_cmd::Command;
use predicates::str::contains;

fn mavt_cmd() -> Command {
    Command::cargo_bin("mavt").expect("failed to find mavt binary")
}

#[test]
fn help_lists_all_subcommands() {
    mavt_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("input"))
        .stdout(contains("fps"))
        .stdout(contains("key-frames"))
        .stdout(contains("slice"))
        .stdout(contains("crop-scale"))
        .stdout(contains("find-image"))
        .stdout(contains("select-audio"));
}

#[test]
fn slice_requires_time_range() {
    mavt_cmd()
        .args(["slice", "-i", "in.mkv", "out.mkv"])
        .assert()
        .failure()
        .stderr(contains("--ss"));
}

#[test]
fn slice_rejects_malformed_time_before_probing() {
    mavt_cmd()
        .args([
            "--ffprobe-path",
            "/nonexistent/ffprobe",
            "slice",
            "--ss",
            "abc",
            "--to",
            "00:00:03",
            "-i",
            "in.mkv",
            "out.mkv",
        ])
        .assert()
        .failure()
        .stderr(contains("unsupported time syntax"));
}

#[test]
fn crop_scale_rejects_comma_in_filter_expression() {
    mavt_cmd()
        .args([
            "--ffprobe-path",
            "/nonexistent/ffprobe",
            "crop-scale",
            "-i",
            "in.mkv",
            "--crop",
            "100:100:0:0,eq=brightness=1",
            "out.mkv",
        ])
        .assert()
        .failure()
        .stderr(contains("must not contain"));
}

#[test]
fn missing_ffprobe_is_reported_by_name() {
    mavt_cmd()
        .args([
            "--ffprobe-path",
            "/nonexistent/ffprobe",
            "fps",
            "-i",
            "in.mkv",
        ])
        .assert()
        .failure()
        .stderr(contains("executable not found"));
}

#[test]
fn select_audio_requires_a_track_index() {
    mavt_cmd()
        .args(["select-audio", "-i", "in.mkv", "out.mkv"])
        .assert()
        .failure()
        .stderr(contains("--audio-track"));
}
