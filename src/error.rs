/// Exit code for artifact, configuration, and I/O failures.
pub const EXIT_ARTIFACT: u8 = 2;
/// Exit code for rejected input (or a batch with no valid rows).
pub const EXIT_INPUT: u8 = 3;
/// Exit code for a feature vector that does not line up with the fitted artifacts.
pub const EXIT_SCHEMA: u8 = 4;

/// Errors raised by the scoring pipeline itself.
///
/// Each variant names what went wrong so the caller can report the exact
/// artifact, stage, or field. None of them are ever turned into a default
/// probability.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    /// A fitted artifact is missing or malformed. Fatal at startup.
    #[error("Artifact `{artifact}`: {message}")]
    Artifact { artifact: String, message: String },

    /// The feature vector disagrees with a fitted artifact. Rejects the request.
    #[error("Schema mismatch at {stage}: {message}")]
    SchemaMismatch { stage: &'static str, message: String },

    /// A raw applicant field violates its input constraints.
    #[error("Invalid `{field}`: {message}")]
    InvalidInput { field: &'static str, message: String },
}

impl PipelineError {
    pub fn artifact(artifact: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Artifact {
            artifact: artifact.into(),
            message: message.into(),
        }
    }

    pub fn schema(stage: &'static str, message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            stage,
            message: message.into(),
        }
    }

    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            message: message.into(),
        }
    }

    /// Process exit code used when this error reaches `main`.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Artifact { .. } => EXIT_ARTIFACT,
            PipelineError::InvalidInput { .. } => EXIT_INPUT,
            PipelineError::SchemaMismatch { .. } => EXIT_SCHEMA,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_errors_map_to_distinct_exit_codes() {
        let artifact: AppError = PipelineError::artifact("scaler.json", "missing").into();
        let input: AppError = PipelineError::invalid("age", "must be >= 18").into();
        let schema: AppError = PipelineError::schema("scaler", "expected 16 columns, found 15").into();

        assert_eq!(artifact.exit_code(), EXIT_ARTIFACT);
        assert_eq!(input.exit_code(), EXIT_INPUT);
        assert_eq!(schema.exit_code(), EXIT_SCHEMA);
        assert!(artifact.to_string().contains("scaler.json"));
        assert!(schema.to_string().contains("expected 16 columns"));
    }
}
