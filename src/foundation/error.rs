/// Convenience result type used across viewgrid.
pub type ViewgridResult<T> = Result<T, ViewgridError>;

/// Top-level error taxonomy used by dataset, pipeline and dispatch APIs.
#[derive(thiserror::Error, Debug)]
pub enum ViewgridError {
    /// Command-line misuse.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// Malformed canonical view index text.
    #[error("invalid view index: {0}")]
    InvalidIndexFormat(String),

    /// Index or coordinate outside the dataset bounds.
    #[error("out of range: {0}")]
    OutOfRange(String),

    /// Operation requires a different dataset dimensionality.
    #[error("structural mismatch: {0}")]
    StructuralMismatch(String),

    /// Missing or ill-typed entry in the parameter document.
    #[error("parameter error: {0}")]
    Parameters(String),

    /// Malformed template, bad format spec, or unbound placeholder in a full render.
    #[error("template error: {0}")]
    Template(String),

    /// An external tool exited nonzero, could not be run, or did not produce its output.
    #[error("external tool '{tool}' failed: {reason}")]
    ExternalToolFailed {
        /// Tool identifier or binary path.
        tool: String,
        /// Short description of the failure.
        reason: String,
        /// Captured stdout followed by stderr.
        output: String,
    },

    /// The view-synthesis renderer failed for a virtual view.
    #[error("renderer failed on view {virtual_idx}")]
    RendererFailed {
        /// Encoded index of the virtual view being rendered.
        virtual_idx: String,
        /// Captured renderer output.
        output: String,
    },

    /// One or more jobs of a dispatched batch failed.
    #[error("{failed} of {total} jobs failed; first failure: {first}")]
    BatchFailed {
        /// Number of failed jobs.
        failed: usize,
        /// Number of dispatched jobs.
        total: usize,
        /// Message of the first failure in dispatch order.
        first: String,
    },

    /// Errors when serializing or deserializing the parameter document.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ViewgridError {
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    pub fn invalid_index(msg: impl Into<String>) -> Self {
        Self::InvalidIndexFormat(msg.into())
    }

    pub fn out_of_range(msg: impl Into<String>) -> Self {
        Self::OutOfRange(msg.into())
    }

    pub fn structural(msg: impl Into<String>) -> Self {
        Self::StructuralMismatch(msg.into())
    }

    pub fn parameters(msg: impl Into<String>) -> Self {
        Self::Parameters(msg.into())
    }

    pub fn template(msg: impl Into<String>) -> Self {
        Self::Template(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    pub fn tool_failed(
        tool: impl Into<String>,
        reason: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self::ExternalToolFailed {
            tool: tool.into(),
            reason: reason.into(),
            output: output.into(),
        }
    }

    /// Captured subprocess output carried by tool and renderer failures.
    pub fn captured_output(&self) -> Option<&str> {
        match self {
            Self::ExternalToolFailed { output, .. } | Self::RendererFailed { output, .. } => {
                Some(output.as_str())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
