//! Build diagnostic filtering
//!
//! rustc reports errors against the temporary source file, whose path
//! means nothing to the user. When the output carries the build failure
//! marker, every diagnostic is cut down to its `line:column: message`
//! part; anything else is passed through untouched.

use std::io::{self, Write};

/// Line rustc prints after the diagnostics of a failed build.
pub const BUILD_FAILURE_MARKER: &str = "error: aborting due to";

/// Whether `output` comes from a failed build rather than a program.
pub fn has_build_marker(output: &str) -> bool {
    output.lines().any(|line| line.starts_with(BUILD_FAILURE_MARKER))
}

/// Strip marker lines and the artifact path from build diagnostics.
///
/// Only lines mentioning `artifact` survive, with everything up to and
/// including `artifact:` removed.
pub fn filter_build_output(output: &str, artifact: &str) -> String {
    let needle = format!("{}:", artifact);
    let mut filtered = String::new();
    for line in output.lines() {
        if line.starts_with(BUILD_FAILURE_MARKER) {
            continue;
        }
        if let Some(pos) = line.find(&needle) {
            filtered.push_str(&line[pos + needle.len()..]);
            filtered.push('\n');
        }
    }
    filtered
}

/// Write compiler output to `writer`, filtered if it is a build failure.
pub fn relay_build_output<W: Write + ?Sized>(
    output: &[u8],
    artifact: &str,
    writer: &mut W,
) -> io::Result<()> {
    let text = String::from_utf8_lossy(output);
    if has_build_marker(&text) {
        writer.write_all(filter_build_output(&text, artifact).as_bytes())
    } else {
        writer.write_all(output)
    }
}
