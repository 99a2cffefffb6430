//! Process execution utilities
//!
//! Every external tool the pipeline touches (`java`, `sdkmanager`, `keytool`,
//! `flutter`) runs through a [`CommandRunner`], so steps can be exercised
//! against a recording fake instead of a real toolchain.
//!
//! An [`Invocation`] describes a command:
//! - Program and arguments, with secret arguments redacted on display
//! - Working directory
//! - Extra environment variables

use crate::error::{Error, Result};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tracing::debug;

/// Placeholder printed instead of secret arguments
pub const REDACTED: &str = "****";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Arg {
    Plain(String),
    Secret(String),
}

impl Arg {
    fn value(&self) -> &str {
        match self {
            Arg::Plain(v) | Arg::Secret(v) => v,
        }
    }
}

/// A command to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<Arg>,
    dir: Option<PathBuf>,
    env: Vec<(String, OsString)>,
}

impl Invocation {
    /// Start describing a command
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            dir: None,
            env: Vec::new(),
        }
    }

    /// Append an argument
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(Arg::Plain(arg.into()));
        self
    }

    /// Append several arguments
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|a| Arg::Plain(a.into())));
        self
    }

    /// Append an argument that must never be echoed or logged
    #[must_use]
    pub fn secret_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(Arg::Secret(arg.into()));
        self
    }

    /// Run in the given directory
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Set an environment variable for the child
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Program name or path
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Raw argument values, secrets included
    #[must_use]
    pub fn argv(&self) -> Vec<&str> {
        self.args.iter().map(Arg::value).collect()
    }

    /// Working directory, if any
    #[must_use]
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Value this invocation sets for an environment variable
    #[must_use]
    pub fn env_value(&self, key: &str) -> Option<&OsStr> {
        self.env
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_os_str())
    }

    /// Build the `std::process::Command`
    #[must_use]
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args.iter().map(Arg::value));
        if let Some(dir) = &self.dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd
    }

    fn spawn_error(&self, err: std::io::Error) -> Error {
        if err.kind() == ErrorKind::NotFound {
            Error::command_not_found(&self.program).with_source(err)
        } else {
            Error::process(format!("Failed to execute {}: {}", self.program, err)).with_source(err)
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$ {}", self.program)?;
        for arg in &self.args {
            match arg {
                Arg::Plain(v) => write!(f, " {v}")?,
                Arg::Secret(_) => write!(f, " {REDACTED}")?,
            }
        }
        Ok(())
    }
}

/// Result of a command execution
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Whether the command succeeded (exit code 0)
    pub success: bool,
    /// Exit code of the command
    pub exit_code: i32,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

impl CommandResult {
    /// Create from `std::process::Output`
    #[must_use]
    pub fn from_output(output: Output) -> Self {
        Self {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    /// Get combined output (stdout + stderr)
    #[must_use]
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Executes invocations
pub trait CommandRunner {
    /// Run with inherited stdio and return the exit code
    fn stream(&self, invocation: &Invocation) -> Result<i32>;

    /// Run and capture output
    fn capture(&self, invocation: &Invocation) -> Result<CommandResult>;

    /// Run with `input` written to stdin, capturing output
    fn feed(&self, invocation: &Invocation, input: &[u8]) -> Result<CommandResult>;

    /// Stream a command and fail with its exit code unless it succeeds
    fn run_checked(&self, invocation: &Invocation) -> Result<()> {
        let code = self.stream(invocation)?;
        if code == 0 {
            Ok(())
        } else {
            Err(Error::command_failed(invocation.to_string(), code))
        }
    }
}

/// Runs commands on the host
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn stream(&self, invocation: &Invocation) -> Result<i32> {
        debug!(command = %invocation, "streaming");
        let status = invocation
            .to_command()
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| invocation.spawn_error(e))?;

        Ok(status.code().unwrap_or(-1))
    }

    fn capture(&self, invocation: &Invocation) -> Result<CommandResult> {
        debug!(command = %invocation, "capturing");
        let output = invocation
            .to_command()
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| invocation.spawn_error(e))?;

        Ok(CommandResult::from_output(output))
    }

    fn feed(&self, invocation: &Invocation, input: &[u8]) -> Result<CommandResult> {
        debug!(command = %invocation, bytes = input.len(), "feeding stdin");
        let mut child = invocation
            .to_command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| invocation.spawn_error(e))?;

        if let Some(mut stdin) = child.stdin.take() {
            // The child may exit before reading everything
            match stdin.write_all(input).and_then(|()| stdin.flush()) {
                Err(e) if e.kind() != ErrorKind::BrokenPipe => return Err(e.into()),
                _ => {}
            }
        }

        let output = child.wait_with_output()?;
        Ok(CommandResult::from_output(output))
    }
}

/// Locate a program on an explicit search path
///
/// `path` is the value of a `PATH`-style variable; `None` searches nothing.
#[must_use]
pub fn find_on_path(program: &str, path: Option<&OsStr>, cwd: &Path) -> Option<PathBuf> {
    which::which_in(program, path, cwd).ok()
}

/// Prepend a directory to a `PATH`-style value
pub fn prepend_path(dir: &Path, path: Option<&OsStr>) -> Result<OsString> {
    let mut dirs = vec![dir.to_path_buf()];
    if let Some(existing) = path {
        dirs.extend(std::env::split_paths(existing));
    }
    std::env::join_paths(dirs)
        .map_err(|e| Error::io(format!("Cannot add {} to PATH: {}", dir.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_redacts_secrets() {
        let inv = Invocation::new("keytool")
            .args(["-alias", "upload"])
            .arg("-storepass")
            .secret_arg("hunter22");

        assert_eq!(inv.to_string(), "$ keytool -alias upload -storepass ****");
        assert_eq!(inv.argv(), vec!["-alias", "upload", "-storepass", "hunter22"]);
    }

    #[test]
    fn test_env_value_last_wins() {
        let inv = Invocation::new("sdkmanager")
            .env("ANDROID_HOME", "/a")
            .env("ANDROID_HOME", "/b");
        assert_eq!(inv.env_value("ANDROID_HOME"), Some(OsStr::new("/b")));
        assert_eq!(inv.env_value("PATH"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_capture_echo() {
        let result = SystemRunner.capture(&Invocation::new("echo").arg("hello")).unwrap();
        assert!(result.success);
        assert!(result.stdout.contains("hello"));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_checked_propagates_exit_code() {
        let inv = Invocation::new("sh").args(["-c", "exit 7"]);
        let err = SystemRunner.run_checked(&inv).unwrap_err();
        assert_eq!(err.exit_code(), 7);
    }

    #[cfg(unix)]
    #[test]
    fn test_feed_writes_stdin() {
        let result = SystemRunner
            .feed(&Invocation::new("head").args(["-n", "1"]), b"y\ny\ny\n")
            .unwrap();
        assert_eq!(result.stdout.trim(), "y");
    }

    #[test]
    fn test_missing_program_is_command_not_found() {
        let err = SystemRunner
            .capture(&Invocation::new("nonexistent_command_12345"))
            .unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::CommandNotFound);
    }

    #[test]
    fn test_prepend_path() {
        let joined = prepend_path(Path::new("/opt/flutter/bin"), Some(OsStr::new("/usr/bin"))).unwrap();
        let parts: Vec<PathBuf> = std::env::split_paths(&joined).collect();
        assert_eq!(parts[0], PathBuf::from("/opt/flutter/bin"));
        assert_eq!(parts.last(), Some(&PathBuf::from("/usr/bin")));
    }

    #[test]
    fn test_command_result_combined_output() {
        let result = CommandResult {
            success: true,
            exit_code: 0,
            stdout: "out".to_string(),
            stderr: "err".to_string(),
        };
        assert!(result.combined_output().contains("out"));
        assert!(result.combined_output().contains("err"));
    }
}
