//! CLI error handling

use std::fmt;

use fixity_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Anything propagated out of the workflow or queue
    Fixity(fixity_errors::Error),
    /// One or more jobs were dead-lettered during a run
    DeadLetters(usize),
    /// I/O error reading the id input
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Fixity(e) => {
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                Ok(())
            }
            CliError::DeadLetters(count) => {
                write!(f, "{count} job(s) exhausted their delivery cap")
            }
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Fixity(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::DeadLetters(_) => None,
        }
    }
}

impl From<fixity_errors::Error> for CliError {
    fn from(e: fixity_errors::Error) -> Self {
        CliError::Fixity(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
