//! Joining of remote artifact paths.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Characters escaped inside a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'%');

/// Append path segments to a base URI, normalising the slashes in between.
///
/// Segments are percent-encoded so that a segment can never introduce extra
/// path components. Empty segments are skipped.
///
/// ```rust
/// use detaxizer_util::join_remote_path;
///
/// let remote = join_remote_path("latch:///your_log_dir/nf_nf_core_detaxizer/", ["run-42", "nextflow.log"]);
/// assert_eq!(remote, "latch:///your_log_dir/nf_nf_core_detaxizer/run-42/nextflow.log");
/// ```
pub fn join_remote_path<I, S>(base: &str, segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = base.trim_end_matches('/').to_string();
    for segment in segments {
        let trimmed = segment.as_ref().trim_matches('/');
        if trimmed.is_empty() {
            continue;
        }
        joined.push('/');
        joined.extend(utf8_percent_encode(trimmed, SEGMENT));
    }
    joined
}
