use std::path::PathBuf;

use dirs_next::home_dir;

/// Expand a leading `~` into the user's home directory.
///
/// Only `~` on its own and `~/…` (or `~\…`) are expanded; `~user` forms are
/// returned unchanged. When the home directory cannot be determined the path
/// is returned as written.
pub fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    let rest = match trimmed {
        "~" => Some(""),
        _ => trimmed.strip_prefix("~/").or_else(|| trimmed.strip_prefix("~\\")),
    };
    match (rest, home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(trimmed),
    }
}
