//! Error handling with context, recovery suggestions and exit statuses
//!
//! Every failure in the pipeline is fatal, so errors carry everything the
//! user needs to act on them:
//! - An error code for the failure class
//! - Optional context and a recovery suggestion
//! - The exit status of a failed subprocess, propagated to the process exit

use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // General errors (1xxx)
    Unknown = 1000,
    Internal = 1001,

    // IO errors (2xxx)
    IoError = 2000,
    FileNotFound = 2001,
    PermissionDenied = 2002,
    InvalidPath = 2003,

    // Configuration errors (3xxx)
    ConfigError = 3000,
    ConfigNotFound = 3001,
    ConfigParseError = 3002,

    // Process errors (5xxx)
    ProcessError = 5000,
    CommandNotFound = 5001,
    CommandFailed = 5002,

    // Validation errors (6xxx)
    ValidationError = 6000,
    InvalidInput = 6001,

    // Platform errors (8xxx)
    PlatformError = 8000,
    UnsupportedPlatform = 8001,
    MissingPrerequisite = 8002,
    ArtifactMissing = 8003,

    // Network and archive errors (9xxx)
    DownloadFailed = 9000,
    ArchiveError = 9001,
}

impl ErrorCode {
    /// Get the numeric code
    #[must_use]
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a human-readable category
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self.code() / 1000 {
            1 => "General",
            2 => "IO",
            3 => "Configuration",
            5 => "Process",
            6 => "Validation",
            8 => "Platform",
            9 => "Network",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Main error type with rich context
#[derive(Error, Debug)]
pub struct Error {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context
    pub context: Option<String>,
    /// Recovery suggestion
    pub suggestion: Option<String>,
    /// Exit status of the subprocess that caused this error
    pub exit_status: Option<i32>,
    /// Source error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, "\n  Context: {ctx}")?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {suggestion}")?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            exit_status: None,
            source: None,
        }
    }

    /// Add context to the error
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a recovery suggestion
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add a source error
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Exit code the process should terminate with for this error.
    ///
    /// A failed subprocess propagates its own status; everything else is a
    /// plain failure.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self.exit_status {
            Some(status) if status != exit_codes::SUCCESS => status,
            _ => exit_codes::FAILURE,
        }
    }

    // Convenience constructors

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::IoError, message)
    }

    pub fn file_not_found(path: impl AsRef<Path>) -> Self {
        Self::new(
            ErrorCode::FileNotFound,
            format!("File not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Check that the file exists and you have read permissions")
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    pub fn config_not_found(path: impl AsRef<Path>) -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Create an .aabkit.toml file or use --config to specify a path")
    }

    pub fn process(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProcessError, message)
    }

    pub fn command_not_found(cmd: &str) -> Self {
        Self::new(ErrorCode::CommandNotFound, format!("Command not found: {cmd}"))
            .with_suggestion(format!("Install {cmd} and ensure it's in your PATH"))
    }

    pub fn command_failed(command: impl Into<String>, status: i32) -> Self {
        let mut err = Self::new(
            ErrorCode::CommandFailed,
            format!("Command failed with exit code {status}"),
        )
        .with_context(command);
        err.exit_status = Some(status);
        err
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn missing_prerequisite(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MissingPrerequisite, message)
    }

    pub fn unsupported_platform(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnsupportedPlatform, message)
            .with_suggestion("Run this tool on macOS or Linux")
    }

    pub fn artifact_missing(path: impl AsRef<Path>) -> Self {
        Self::new(
            ErrorCode::ArtifactMissing,
            format!("Build artifact not found: {}", path.as_ref().display()),
        )
        .with_context("All build commands exited successfully")
        .with_suggestion("Inspect the build output above for warnings and retry")
    }

    pub fn download(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DownloadFailed, message)
    }

    pub fn archive(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ArchiveError, message)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Exit codes for the CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::IoError,
        };
        Error::new(code, err.to_string()).with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("TOML parse error: {err}"))
            .with_source(err)
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;
    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_suggestion(suggestion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::FileNotFound.to_string(), "E2001");
        assert_eq!(ErrorCode::CommandFailed.to_string(), "E5002");
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::IoError.category(), "IO");
        assert_eq!(ErrorCode::UnsupportedPlatform.category(), "Platform");
        assert_eq!(ErrorCode::DownloadFailed.category(), "Network");
    }

    #[test]
    fn test_command_failed_propagates_status() {
        let err = Error::command_failed("$ flutter clean", 3);
        assert_eq!(err.code, ErrorCode::CommandFailed);
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.context.as_deref(), Some("$ flutter clean"));
    }

    #[test]
    fn test_other_errors_exit_with_failure() {
        assert_eq!(Error::missing_prerequisite("Java 17 required").exit_code(), 1);
        assert_eq!(Error::artifact_missing("app-release.aab").exit_code(), 1);
    }

    #[test]
    fn test_context_does_not_lose_exit_status() {
        let result: Result<()> = Err(Error::command_failed("$ sdkmanager --version", 2));
        let err = result.context("sdkmanager failed").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("sdkmanager failed"));
    }

    #[test]
    fn test_error_with_suggestion() {
        let err = Error::unsupported_platform("Unsupported OS: windows");
        assert!(err.to_string().contains("Suggestion: Run this tool on macOS or Linux"));
    }
}
