//! Batch-mode STM32CubeMX project regenerator.
//!
//! Stages a temporary project directory, scripts the tool's batch
//! interface, watches its output stream for failure markers, and
//! reconciles the generated trees back into the project with a backup
//! path on the side.

pub mod cli;
pub mod config;
pub mod driver;
pub mod paths;
pub mod script;
pub mod stager;
pub mod workflow;
