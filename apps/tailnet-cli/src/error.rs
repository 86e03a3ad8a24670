//! CLI error types and exit codes

use tailnet_directory::DirectoryError;
use tailnet_membership::MembershipError;
use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error
/// - 3: Network or directory error
/// - 4: Validation error
/// - 5: Operation incomplete (cancelled or timed out)
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Directory error: {message}")]
    Directory {
        message: String,
        hint: Option<&'static str>,
    },

    #[error("Incomplete: {0}\n\nThe directory was left as it is; run the command again to converge.")]
    Incomplete(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::Io(_) => 1,
            CliError::Directory { .. } => 3,
            CliError::Validation(_) | CliError::NotFound(_) => 4,
            CliError::Incomplete(_) => 5,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {self}");
        } else {
            eprintln!("Error: {self}");
        }

        if let Some(hint) = self.hint() {
            if use_color {
                eprintln!("\n\x1b[33mHint:\x1b[0m {hint}");
            } else {
                eprintln!("\nHint: {hint}");
            }
        }
    }

    fn hint(&self) -> Option<&'static str> {
        match self {
            CliError::Directory { hint, .. } => *hint,
            CliError::Config(_) => {
                Some("Set TAILSCALE_API_KEY or pass a config file with --config.")
            }
            _ => None,
        }
    }
}

impl From<MembershipError> for CliError {
    fn from(e: MembershipError) -> Self {
        if e.is_validation() {
            return CliError::Validation(e.to_string());
        }
        if e.is_incomplete() {
            return CliError::Incomplete(e.to_string());
        }
        // The hint is printed on its own line.
        let message = match &e {
            MembershipError::Directory { source, .. } | MembershipError::Conflict { source, .. } => {
                source.to_string()
            }
            _ => e.to_string(),
        };
        CliError::Directory {
            message,
            hint: e.hint(),
        }
    }
}

impl From<DirectoryError> for CliError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::Config(_) | DirectoryError::Url(_) => CliError::Config(e.to_string()),
            other => CliError::Directory {
                message: other.to_string(),
                hint: None,
            },
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Io(format!("JSON error: {e}"))
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(e: serde_yaml::Error) -> Self {
        CliError::Config(format!("YAML error: {e}"))
    }
}
