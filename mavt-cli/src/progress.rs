// mavt-cli/src/progress.rs
//
// Progress display for long-running operations: an indicatif spinner with
// translated coordinates as its message, a plain one-line-per-update mode
// for logs and pipes, or nothing.

use std::time::Duration;

use clap::ValueEnum;
use console::Term;
use indicatif::{ProgressBar, ProgressDrawTarget};
use mavt_core::{ImageDetection, TranslatedProgress};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressMode {
    /// Animated spinner with live coordinates
    Bar,
    /// One line per update on stderr
    Plain,
    /// No progress output
    None,
}

// clap renders default_value_t through Display, so this must produce the
// exact possible-value spellings.
impl std::fmt::Display for ProgressMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ProgressMode::Bar => "bar",
            ProgressMode::Plain => "plain",
            ProgressMode::None => "none",
        })
    }
}

pub struct ProgressDisplay {
    bar: Option<ProgressBar>,
    plain: bool,
}

impl ProgressDisplay {
    pub fn new(mode: ProgressMode) -> Self {
        match mode {
            // The spinner draws to stderr and hides itself when stderr is
            // not a terminal, so `bar` piped into a file degrades cleanly.
            ProgressMode::Bar => {
                let bar = ProgressBar::new_spinner();
                if !Term::stderr().is_term() {
                    bar.set_draw_target(ProgressDrawTarget::hidden());
                }
                bar.enable_steady_tick(Duration::from_millis(120));
                Self {
                    bar: Some(bar),
                    plain: false,
                }
            }
            ProgressMode::Plain => Self {
                bar: None,
                plain: true,
            },
            ProgressMode::None => Self {
                bar: None,
                plain: false,
            },
        }
    }

    pub fn update(&self, progress: &TranslatedProgress) {
        if let Some(bar) = &self.bar {
            bar.set_message(format!(
                "time {}, frame {} (internal time {}, frame {})",
                progress.time, progress.frame, progress.internal_time, progress.internal_frame
            ));
        } else if self.plain {
            eprintln!(
                "Progress | Time {}, frame {} (Internal time {}, frame {})",
                progress.time, progress.frame, progress.internal_time, progress.internal_frame
            );
        }
    }

    /// Prints a detection without tearing the spinner line.
    pub fn detection(&self, detection: &ImageDetection) {
        let line = format!(
            "Output | Time {}, frame {} (Internal time {}, frame {})",
            detection.time, detection.frame, detection.internal_time, detection.internal_frame
        );
        match &self.bar {
            Some(bar) => bar.println(line),
            None => println!("{line}"),
        }
    }

    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}
