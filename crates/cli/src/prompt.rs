//! Interactive credential prompts
//!
//! Steps that need secrets ask a [`CredentialProvider`] rather than the
//! terminal, so tests can answer with fixed values.

use aabkit_core::{Error, Result};
use console::Term;

/// Source of values the user did not pass on the command line
pub trait CredentialProvider {
    /// Ask for a secret; input must not be echoed
    fn secret(&self, prompt: &str) -> Result<String>;

    /// Ask for a plain line of text
    fn text(&self, prompt: &str) -> Result<String>;
}

/// Prompts on the controlling terminal
#[derive(Debug, Clone)]
pub struct TerminalPrompt {
    term: Term,
}

impl TerminalPrompt {
    /// Prompt on stderr so stdout stays clean for piping
    pub fn new() -> Self {
        Self { term: Term::stderr() }
    }

    fn ensure_interactive(&self, prompt: &str) -> Result<()> {
        if self.term.is_term() {
            Ok(())
        } else {
            Err(Error::invalid_input(format!(
                "Cannot ask for \"{}\": not running in a terminal",
                prompt.trim_end_matches([':', ' '])
            ))
            .with_suggestion("Pass --store-pass, --key-pass and --key-alias on the command line"))
        }
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialProvider for TerminalPrompt {
    fn secret(&self, prompt: &str) -> Result<String> {
        self.ensure_interactive(prompt)?;
        self.term.write_str(prompt)?;
        Ok(self.term.read_secure_line()?)
    }

    fn text(&self, prompt: &str) -> Result<String> {
        self.ensure_interactive(prompt)?;
        self.term.write_str(prompt)?;
        Ok(self.term.read_line()?.trim().to_string())
    }
}
