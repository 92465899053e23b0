//! Error handling for the binding generator
//!
//! Every error here is fatal for the run: the generator has no
//! partial-success mode, so either both artifacts are produced or none are.

use thiserror::Error;

/// Main generator error type covering descriptor loading and code generation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenError {
    #[error("Unsupported signature shape for '{function}': {reason}")]
    UnsupportedSignatureShape {
        function: String,
        reason: String,
    },

    #[error("Unsupported annotation '{annotation}' on parameter '{parameter}' of '{function}' (expected int, bool, object, Any or an optional type)")]
    UnsupportedAnnotationType {
        function: String,
        parameter: String,
        annotation: String,
    },

    #[error("Failed to load descriptor for module '{module}': {message}")]
    DescriptorLoadFailure {
        module: String,
        message: String,
    },

    #[error("IO error: {message}")]
    IoError { message: String },
}

impl GenError {
    /// Create a signature shape error
    pub fn unsupported_shape(function: impl Into<String>, reason: impl Into<String>) -> Self {
        GenError::UnsupportedSignatureShape {
            function: function.into(),
            reason: reason.into(),
        }
    }

    /// Create an annotation error
    pub fn unsupported_annotation(
        function: impl Into<String>,
        parameter: impl Into<String>,
        annotation: impl Into<String>,
    ) -> Self {
        GenError::UnsupportedAnnotationType {
            function: function.into(),
            parameter: parameter.into(),
            annotation: annotation.into(),
        }
    }

    /// Create a descriptor load error
    pub fn load_failure(module: impl Into<String>, message: impl Into<String>) -> Self {
        GenError::DescriptorLoadFailure {
            module: module.into(),
            message: message.into(),
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for GenError {
    fn from(err: std::io::Error) -> Self {
        GenError::IoError {
            message: err.to_string(),
        }
    }
}
