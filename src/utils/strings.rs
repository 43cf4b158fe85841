//! String helpers.

/// Check if a string is blank (empty or whitespace only)
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}
