//! Core error types (deterministic only)

use crate::annotation::AnnotationId;
use crate::span::Span;
use crate::types::AnnotationType;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by the annotation model itself
///
/// These never involve I/O. An `InvalidSpan` is always local to the call
/// that tried to create the annotation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotationError {
    /// Offsets are reversed or fall outside the document text
    #[error("invalid span {start}..{end} for text of length {len}")]
    InvalidSpan {
        /// Requested start offset
        start: usize,
        /// Requested end offset
        end: usize,
        /// Length of the document text in characters
        len: usize,
    },

    /// The annotation would overlap an existing annotation of the same type
    #[error("{ty} annotation at {new} overlaps existing annotation {existing} at {existing_span}")]
    Overlap {
        /// Type of both annotations
        ty: AnnotationType,
        /// Span that was rejected
        new: Span,
        /// Id of the annotation already occupying the text
        existing: AnnotationId,
        /// Span of the existing annotation
        existing_span: Span,
    },

    /// No live annotation carries this id
    #[error("unknown annotation id {0}")]
    UnknownAnnotation(AnnotationId),

    /// A relational annotation points at something that does not exist
    #[error("{role} {id} does not exist")]
    DanglingReference {
        /// Which end of the relation is missing ("governor", "dependent", ...)
        role: &'static str,
        /// The missing id
        id: AnnotationId,
    },

    /// A dependency endpoint exists but is not a token
    #[error("annotation {0} is not a Token")]
    NotAToken(AnnotationId),
}

/// Failure of a single stage on a single document
#[derive(Debug, Error)]
pub enum StageError {
    /// The stage could not complete its work
    #[error("stage '{stage}' failed: {reason}")]
    Failed {
        /// Stage name
        stage: String,
        /// Human readable cause
        reason: String,
    },

    /// The stage tried to write an annotation the model rejected
    #[error("stage '{stage}' produced an invalid annotation: {source}")]
    Annotation {
        /// Stage name
        stage: String,
        /// Underlying model error
        #[source]
        source: AnnotationError,
    },

    /// The stage ran longer than its wall-clock budget
    #[error("stage '{stage}' took {elapsed:?}, exceeding its budget of {limit:?}")]
    Timeout {
        /// Stage name
        stage: String,
        /// Measured run time
        elapsed: Duration,
        /// Configured budget
        limit: Duration,
    },

    /// Two annotations of the same type overlap after the stage ran
    #[error("stage '{stage}' left overlapping {ty} annotations {first} and {second}")]
    InvariantViolation {
        /// Stage name
        stage: String,
        /// Offending type
        ty: AnnotationType,
        /// First annotation id
        first: AnnotationId,
        /// Second annotation id
        second: AnnotationId,
    },
}

impl StageError {
    /// Shorthand for a generic failure
    pub fn failed(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        StageError::Failed {
            stage: stage.into(),
            reason: reason.into(),
        }
    }

    /// Wrap an annotation model error raised while running `stage`
    pub fn annotation(stage: impl Into<String>, source: AnnotationError) -> Self {
        StageError::Annotation {
            stage: stage.into(),
            source,
        }
    }

    /// Name of the stage that failed
    pub fn stage(&self) -> &str {
        match self {
            StageError::Failed { stage, .. }
            | StageError::Annotation { stage, .. }
            | StageError::Timeout { stage, .. }
            | StageError::InvariantViolation { stage, .. } => stage,
        }
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, AnnotationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_span_display() {
        let err = AnnotationError::InvalidSpan {
            start: 5,
            end: 2,
            len: 10,
        };
        assert_eq!(err.to_string(), "invalid span 5..2 for text of length 10");
    }

    #[test]
    fn test_stage_error_carries_stage_name() {
        let err = StageError::failed("tokenizer", "boom");
        assert_eq!(err.stage(), "tokenizer");
        assert_eq!(err.to_string(), "stage 'tokenizer' failed: boom");

        let err = StageError::annotation("gazetteer", AnnotationError::UnknownAnnotation(3));
        assert_eq!(err.stage(), "gazetteer");
        assert!(err.to_string().contains("unknown annotation id 3"));
    }

    #[test]
    fn test_timeout_display() {
        let err = StageError::Timeout {
            stage: "parser".into(),
            elapsed: Duration::from_millis(30),
            limit: Duration::from_millis(10),
        };
        let msg = err.to_string();
        assert!(msg.contains("parser"));
        assert!(msg.contains("30ms"));
    }
}
