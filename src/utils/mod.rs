pub mod paths;
pub mod text;
pub mod time;

pub use paths::{decode_project_dir, encode_project_path, expand_tilde};
pub use text::{truncate, truncate_value, value_to_string};
pub use time::{dt_to_iso, json_millis, ms_to_iso, parse_iso_date, parse_timestamp};

/// Print a `[DEBUG]` trace line to stderr when verbose mode is on.
///
/// Diagnostics never go to stdout - that stream carries only NDJSON records.
pub fn debug_log(verbose: bool, msg: impl AsRef<str>) {
    if verbose {
        eprintln!("[DEBUG] {}", msg.as_ref());
    }
}
