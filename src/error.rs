//! Structured error types for the report rendering pipeline.
//!
//! The policy (mirroring how the GUI collaborator consumes us): per-image
//! problems never abort a render — they become [`Warning`]s collected next to
//! the finished document. Everything else is a hard, typed failure.

use thiserror::Error;

/// The unified error type returned by all public API functions.
#[derive(Debug, Error)]
pub enum Error {
    /// Report JSON failed to parse.
    #[error("failed to parse report: {source}{}", format_hint(.hint))]
    Parse {
        source: serde_json::Error,
        hint: String,
    },

    /// The configured font family is not in the registry. Raised at engine
    /// construction, never during layout.
    #[error("unknown font family '{0}'")]
    UnknownFont(String),

    /// An image reported a zero width or height.
    #[error("invalid image dimensions ({width}x{height})")]
    InvalidImageDimensions { width: u32, height: u32 },

    /// An image could not be read or decoded.
    #[error("failed to load image '{src}': {reason}")]
    ImageLoadFailure { src: String, reason: String },

    /// The backend could not persist the document.
    #[error("failed to write document: {0}")]
    WriteFailure(#[from] std::io::Error),
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  hint: {hint}")
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "check for trailing commas, missing quotes, or unescaped characters".to_string()
            }
            serde_json::error::Category::Data => {
                "the JSON is valid but doesn't match the report schema; check field names and types"
                    .to_string()
            }
            serde_json::error::Category::Eof => {
                "unexpected end of input — is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        Error::Parse { source: e, hint }
    }
}

/// A non-fatal problem encountered during one render pass.
///
/// Currently only images produce warnings: a reference that fails to resolve
/// is skipped and the render continues without it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// The image source that was skipped.
    pub src: String,
    /// Human-readable reason.
    pub message: String,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "skipped image '{}': {}", self.src, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_carries_hint() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{ bad")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.contains("failed to parse report"));
        assert!(msg.contains("hint:"));
    }

    #[test]
    fn warning_display_names_source() {
        let w = Warning {
            src: "/tmp/missing.png".to_string(),
            message: "no such file".to_string(),
        };
        assert!(w.to_string().contains("/tmp/missing.png"));
    }
}
