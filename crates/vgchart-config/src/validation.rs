//! Validation utilities and regex patterns

use regex::Regex;
use std::sync::LazyLock;
use validator::ValidationError;

/// Regex pattern for validating hex color codes (e.g., #FFFFFF, #F00)
pub static HEX_COLOR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#([0-9A-Fa-f]{3}|[0-9A-Fa-f]{6})$").expect("Invalid hex color regex pattern")
});

/// Regex pattern for CSS named colors (e.g., steelblue)
pub static NAMED_COLOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{3,20}$").expect("Invalid named color regex pattern"));

/// Regex pattern for a plain HTML file name without directories
pub static PAGE_FILE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*\.html$").expect("Invalid page file regex pattern")
});

/// Validate a color given as hex code or CSS color name
pub fn validate_color(color: &str) -> Result<(), ValidationError> {
    if HEX_COLOR_REGEX.is_match(color) || NAMED_COLOR_REGEX.is_match(color) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_color"))
    }
}

/// Validate that a page file name stays inside the output directory
pub fn validate_page_file_name(file: &str) -> Result<(), ValidationError> {
    if file.is_empty() {
        return Err(ValidationError::new("empty_page_file"));
    }
    if file.contains("..") || !PAGE_FILE_REGEX.is_match(file) {
        return Err(ValidationError::new("invalid_page_file"));
    }
    Ok(())
}

/// Validate a navigation target: a sibling page, optionally with a fragment
pub fn validate_link_target(target: &str) -> Result<(), ValidationError> {
    let file = target.split_once('#').map_or(target, |(file, _)| file);
    validate_page_file_name(file).map_err(|_| ValidationError::new("invalid_link_target"))
}

/// Validate a tracing level name
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    match level {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ValidationError::new("invalid_log_level")),
    }
}
