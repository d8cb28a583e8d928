//! CLI-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::ErrorKind;
use crate::exitcode;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        CliError::Io {
            context: context.into(),
            source,
        }
    }

    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => exitcode::USAGE,
            CliError::Io { .. } => exitcode::IOERR,
            CliError::Application(e) => match e {
                ApplicationError::Config { .. } => exitcode::CONFIG,
                ApplicationError::GenerationLimit { .. } => exitcode::USAGE,
                ApplicationError::Domain(e) => match e.kind() {
                    ErrorKind::InvalidArgument => exitcode::DATAERR,
                    ErrorKind::CollaboratorFailure => exitcode::SOFTWARE,
                    ErrorKind::AllocationFailure => exitcode::OSERR,
                    ErrorKind::ResourceLimit => exitcode::SOFTWARE,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    #[test]
    fn given_domain_errors_when_mapping_exit_codes_then_follow_kind() {
        let invalid: CliError = ApplicationError::from(DomainError::InvalidArgument("x".into())).into();
        let limit: CliError =
            ApplicationError::from(DomainError::FrontierLimit { limit: 1, generation: 2 }).into();

        assert_eq!(invalid.exit_code(), exitcode::DATAERR);
        assert_eq!(limit.exit_code(), exitcode::SOFTWARE);
    }

    #[test]
    fn given_config_error_when_mapping_exit_code_then_config() {
        let err: CliError = ApplicationError::Config {
            message: "bad".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exitcode::CONFIG);
    }
}
