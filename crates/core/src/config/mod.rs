//! Configuration loading and the per-run pipeline configuration

mod environment;
mod loader;
mod schema;

pub use environment::{PipelineConfig, ANDROID_SDK_VARS, SCRATCH_DIR_NAME};
pub use loader::Config;
pub use schema::*;
