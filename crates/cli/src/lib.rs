//! Terminal utilities for aabkit
//!
//! Provides shared CLI functionality:
//! - Terminal output formatting
//! - Progress indicators
//! - Credential prompts

#![warn(missing_docs)]

pub mod output;
pub mod progress;
pub mod prompt;
