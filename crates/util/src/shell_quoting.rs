//! # Shell Quoting Utilities
//!
//! Renders argument vectors as a single copy-pasteable shell line. The
//! launcher never executes through a shell; the rendered line exists only for
//! logs and dry-run output.

/// Quote a single token for POSIX shells when it needs quoting.
///
/// Tokens made only of "safe" characters are returned unchanged. Everything
/// else is wrapped in single quotes, with embedded single quotes written as
/// `'\''`.
///
/// # Example
/// ```rust
/// use detaxizer_util::shell_quoting::quote_token;
///
/// assert_eq!(quote_token("--tax2filter"), "--tax2filter");
/// assert_eq!(quote_token("My report"), "'My report'");
/// assert_eq!(quote_token(""), "''");
/// ```
pub fn quote_token(token: &str) -> String {
    if !token.is_empty() && token.bytes().all(is_safe_byte) {
        return token.to_string();
    }
    let mut quoted = String::with_capacity(token.len() + 2);
    quoted.push('\'');
    for character in token.chars() {
        if character == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(character);
        }
    }
    quoted.push('\'');
    quoted
}

/// Join a program and its arguments into one shell-quoted line.
///
/// # Example
/// ```rust
/// use detaxizer_util::shell_quoting::render_command_line;
///
/// let line = render_command_line(["/root/nextflow", "run", "--multiqc_title", "QC run"]);
/// assert_eq!(line, "/root/nextflow run --multiqc_title 'QC run'");
/// ```
pub fn render_command_line<I, S>(tokens: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .map(|token| quote_token(token.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_safe_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'/' | b':' | b'=' | b',' | b'@' | b'+' | b'%')
}
