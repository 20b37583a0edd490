//! Utility modules
//!
//! This module contains utilities and helpers:
//! - Error types and result types
//! - Stage traces for debugging a pipeline call

pub mod error;
pub mod report;

// Re-export commonly used items
pub use error::{PipelineError, PipelineResult, SourceError};
pub use report::{LabelWarning, PipelineTrace, Stage, StageRecord};
