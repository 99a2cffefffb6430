//! Flutter Android release preparation
//!
//! This crate implements the steps that take a Flutter project to a signed
//! release App Bundle:
//! - JDK version verification
//! - Flutter SDK installation
//! - Android command-line tools and `sdkmanager` packages
//! - Upload keystore and `key.properties` provisioning
//! - The `flutter build appbundle` sequence
//!
//! [`pipeline::Pipeline`] chains them in order and stops at the first failure.

#![warn(missing_docs)]

pub mod archive;
pub mod bundle;
pub mod fetch;
pub mod flutter;
pub mod java;
pub mod pipeline;
pub mod sdk;
pub mod signing;

#[cfg(test)]
pub(crate) mod testutil;

use aabkit_cli::output::Status;
use aabkit_core::process::{CommandRunner, Invocation};
use aabkit_core::Result;

/// Echo a command, run it with inherited stdio, and fail on a non-zero exit
pub(crate) fn run_echoed(runner: &dyn CommandRunner, invocation: &Invocation) -> Result<()> {
    Status::command(&invocation.to_string());
    tracing::info!(command = %invocation, "running");
    runner.run_checked(invocation)
}
