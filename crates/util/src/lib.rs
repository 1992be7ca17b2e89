//! Small helpers shared by the launcher crates.

use once_cell::sync::Lazy;
use regex::Regex;

pub mod async_runtime;
pub mod path_processing;
pub mod remote_path;
pub mod shell_quoting;

pub use async_runtime::block_on_future;
pub use path_processing::expand_tilde;
pub use remote_path::join_remote_path;
pub use shell_quoting::{quote_token, render_command_line};

static SECRET_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(authorization: )([\w\-\.=:/+]+(?: [\w\-\.=:/+]+)?)",
        r"(?i)([A-Z0-9_]*?(KEY|TOKEN|SECRET|PASSWORD|EXECUTION_ID)=)([^\s]+)",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Redacts values that look like secrets in a string.
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for pattern in SECRET_PATTERNS.iter() {
        redacted = pattern
            .replace_all(&redacted, |caps: &regex::Captures| {
                let prefix = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                format!("{}<redacted>", prefix)
            })
            .to_string();
    }
    redacted
}
