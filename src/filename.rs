//! Filesystem-safe names derived from story titles.
//!
//! Only ASCII letters and digits survive, so names are portable across filesystems.

/// Base name used when a title sanitizes to nothing.
pub const FALLBACK_BASENAME: &str = "Story";

/// Keep only alphanumerics, spaces, underscores, and hyphens; trim trailing whitespace.
pub fn sanitize_filename(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect();
    kept.trim_end().to_string()
}

/// Sanitized base name for output files, never empty.
pub fn output_basename(title: &str) -> String {
    let s = sanitize_filename(title);
    if s.is_empty() {
        FALLBACK_BASENAME.to_string()
    } else {
        s
    }
}
