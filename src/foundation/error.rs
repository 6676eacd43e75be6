use std::fmt;

/// Convenience result type used across quire.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Where a content node came from in the source document.
///
/// Parsing is out of scope for this crate; the location is carried through verbatim so fatal
/// errors can point back at the markup that caused them.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SourceLocation {
    /// Document identifier (file name or URI), empty when unknown.
    #[serde(default)]
    pub system_id: String,
    /// 1-based line, 0 when unknown.
    #[serde(default)]
    pub line: u32,
    /// 1-based column, 0 when unknown.
    #[serde(default)]
    pub column: u32,
}

impl SourceLocation {
    /// Build a location from its parts.
    pub fn new(system_id: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            system_id: system_id.into(),
            line,
            column,
        }
    }

    /// Whether any part of the location is known.
    pub fn is_known(&self) -> bool {
        !self.system_id.is_empty() || self.line > 0
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_known() {
            return f.write_str("<unknown>");
        }
        let id = if self.system_id.is_empty() {
            "<input>"
        } else {
            self.system_id.as_str()
        };
        write!(f, "{id}:{}:{}", self.line, self.column)
    }
}

/// Top-level error taxonomy used by layout APIs.
///
/// `Structural` and `NonTermination` are the fatal layout conditions: the pagination driver
/// aborts the current document when it sees either. Recoverable policy mismatches never surface
/// here; they are reported as [`crate::Diagnostic`]s and layout continues.
#[derive(thiserror::Error, Debug)]
pub enum LayoutError {
    /// The content tree violates a structural rule (child arity, bad enumerator, misplaced flow).
    #[error("structural error at {location}: {message}")]
    Structural {
        /// Human-readable description.
        message: String,
        /// Location of the offending node.
        location: SourceLocation,
    },

    /// A node kept reporting zero progress; the content can never fit.
    #[error("non-termination at {location}: {message} (after {attempts} attempts)")]
    NonTermination {
        /// Human-readable description.
        message: String,
        /// Location of the node that tripped the guard.
        location: SourceLocation,
        /// Number of consecutive zero-progress calls observed.
        attempts: u32,
    },

    /// Invalid user-provided document or geometry data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LayoutError {
    /// Build a [`LayoutError::Structural`] value.
    pub fn structural(msg: impl Into<String>, location: SourceLocation) -> Self {
        Self::Structural {
            message: msg.into(),
            location,
        }
    }

    /// Build a [`LayoutError::NonTermination`] value.
    pub fn non_termination(
        msg: impl Into<String>,
        location: SourceLocation,
        attempts: u32,
    ) -> Self {
        Self::NonTermination {
            message: msg.into(),
            location,
            attempts,
        }
    }

    /// Build a [`LayoutError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LayoutError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Source location for the fatal layout kinds.
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::Structural { location, .. } | Self::NonTermination { location, .. } => {
                Some(location)
            }
            _ => None,
        }
    }

    /// Whether this error is one of the fatal layout conditions.
    pub fn is_fatal_layout(&self) -> bool {
        matches!(self, Self::Structural { .. } | Self::NonTermination { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
