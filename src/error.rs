use std::path::PathBuf;

use thiserror::Error;

/// Error types for extraction and localization
#[derive(Debug, Error)]
pub enum LocError {
    /// A closing inline tag had no matching open tag anywhere in the current message
    #[error("Syntax error in HTML file {path} line {line}. Unbalanced HTML tags.")]
    UnbalancedTags { path: String, line: usize },

    /// Reading or writing a file failed
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A project configuration file could not be parsed
    #[error("Invalid project configuration in '{}': {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A locale spec could not be parsed
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),
}

/// Result type for extraction and localization
pub type LocResult<T> = Result<T, LocError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbalanced_message_names_file_and_line() {
        let err = LocError::UnbalancedTags {
            path: "foo/bar.html".to_string(),
            line: 12,
        };
        assert_eq!(
            err.to_string(),
            "Syntax error in HTML file foo/bar.html line 12. Unbalanced HTML tags."
        );
    }

    #[test]
    fn test_invalid_locale_message() {
        let err = LocError::InvalidLocale("en_US@x".to_string());
        assert_eq!(err.to_string(), "Invalid locale: en_US@x");
    }
}
