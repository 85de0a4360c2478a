// mavt-cli/src/commands/mod.rs
//
// One function per subcommand. Inspection commands print parsed probe
// results; editing commands stream progress and report the terminal
// outcome.

mod edit;
mod inspect;

pub use edit::{run_crop_scale, run_find_image, run_select_audio, run_slice};
pub use inspect::{run_audio, run_fps, run_input, run_key_frames};
