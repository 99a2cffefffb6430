//! Core utilities for the aabkit release builder
//!
//! This crate provides the shared plumbing every pipeline step relies on:
//!
//! - **Error handling**: errors with codes, context, recovery suggestions and
//!   propagated exit statuses
//! - **Process execution**: the [`process::CommandRunner`] seam and the
//!   system implementation
//! - **Configuration**: TOML-based settings plus the captured process
//!   environment, threaded through each step as [`config::PipelineConfig`]
//! - **Platform detection**: the supported host operating systems
//!
//! # Example
//!
//! ```rust,no_run
//! use aabkit_core::config::{ConfigSchema, PipelineConfig};
//! use aabkit_core::process::{CommandRunner, Invocation, SystemRunner};
//!
//! let config = PipelineConfig::from_env(".", ConfigSchema::default()).unwrap();
//! let java = SystemRunner.capture(&Invocation::new("java").arg("-version")).unwrap();
//! println!("{} {}", config.project_root.display(), java.combined_output());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod platform;
pub mod process;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{ConfigSchema, PipelineConfig};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::platform::HostOs;
    pub use crate::process::{CommandResult, CommandRunner, Invocation, SystemRunner};
}
