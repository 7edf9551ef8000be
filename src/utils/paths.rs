use std::path::PathBuf;

/// Expand a leading `~` or `~/` to the user's home directory.
///
/// Paths without a tilde, and tildes when no home directory can be resolved,
/// pass through unchanged.
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Encode a project path into Claude Code's directory-name format.
///
/// `/data00/home/user.name/project_x` becomes `-data00-home-user-name-project-x`:
/// the leading slash turns into a leading dash, and interior slashes, dots and
/// underscores all turn into dashes. Trailing slashes are stripped first and
/// `~` is expanded.
pub fn encode_project_path(project_path: &str) -> String {
    let expanded = expand_tilde(project_path);
    let expanded = expanded.to_string_lossy();
    let trimmed = expanded.trim_end_matches('/');

    let dash = |s: &str| -> String {
        s.chars().map(|c| if matches!(c, '/' | '.' | '_') { '-' } else { c }).collect()
    };

    match trimmed.strip_prefix('/') {
        Some(body) => format!("-{}", dash(body)),
        None => dash(trimmed),
    }
}

/// Best-effort inverse of [`encode_project_path`] for discovered directories.
///
/// The encoding is lossy (dots, underscores and slashes collapse into the
/// same dash), so decoding treats every dash as a path separator, matching
/// what the index's `projectPath` field is there to correct.
pub fn decode_project_dir(name: &str) -> String {
    match name.strip_prefix('-') {
        Some(rest) => format!("/{}", rest.replace('-', "/")),
        None => name.to_string(),
    }
}
