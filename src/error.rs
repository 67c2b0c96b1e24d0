use std::fmt;

/// Returned by [`Matcher::compile`](crate::pattern::Matcher::compile) when the
/// rendered pattern is rejected by the regex engine.
///
/// [`Router::add`](crate::router::Router::add) never surfaces this error: it
/// logs it and registers a matcher that never matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternError {
    /// The route declaration as written by the caller
    pub declaration: String,
    /// The regex source produced from the declaration
    pub pattern: String,
    /// Message reported by the regex engine
    pub message: String,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "route declaration '{}' compiled to an invalid pattern '{}': {}",
            self.declaration, self.pattern, self.message
        )
    }
}

impl std::error::Error for PatternError {}

/// A captured path value that is not valid percent-encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A `%` that is not followed by two hex digits
    MalformedEscape {
        /// The raw captured value
        value: String,
        /// Byte offset of the offending `%`
        offset: usize,
    },
    /// The decoded bytes are not UTF-8
    InvalidUtf8 {
        /// The raw captured value
        value: String,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::MalformedEscape { value, offset } => {
                write!(
                    f,
                    "malformed percent-escape at byte {offset} in path value '{value}'"
                )
            }
            DecodeError::InvalidUtf8 { value } => {
                write!(f, "path value '{value}' does not decode to UTF-8")
            }
        }
    }
}

impl std::error::Error for DecodeError {}
