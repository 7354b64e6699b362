/// Result alias that carries the custom [`StoryboardError`] type.
pub type Result<T> = std::result::Result<T, StoryboardError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum StoryboardError {
    /// Free-form message for failures that do not warrant their own variant.
    #[error("{0}")]
    Message(String),
    /// The lyric source has an extension no loader understands.
    #[error("unsupported lyrics file `{path}`: expected .srt, .vtt or .json")]
    UnsupportedFormat { path: String },
    /// A time window whose end precedes its start.
    #[error("{effect}: invalid time range {start}..{end} (end precedes start)")]
    InvalidTimeRange {
        effect: &'static str,
        start: i64,
        end: i64,
    },
    /// An effect parameter outside of its accepted domain.
    #[error("{effect}: invalid `{field}`: {reason}")]
    InvalidConfig {
        effect: &'static str,
        field: &'static str,
        reason: String,
    },
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Malformed JSON input (project files, schemas, lyric lists).
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl StoryboardError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    /// Shorthand for [`StoryboardError::InvalidConfig`].
    pub fn config(effect: &'static str, field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            effect,
            field,
            reason: reason.into(),
        }
    }
}

impl From<&str> for StoryboardError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for StoryboardError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_names_effect_and_field() {
        let err = StoryboardError::config("particles", "lifetime", "must be positive");
        let text = err.to_string();
        assert!(text.contains("particles"));
        assert!(text.contains("lifetime"));
        assert!(text.contains("must be positive"));
    }

    #[test]
    fn unsupported_format_mentions_path() {
        let err = StoryboardError::UnsupportedFormat {
            path: "lyrics.txt".to_string(),
        };
        assert!(format!("{err}").contains("lyrics.txt"));
    }
}
