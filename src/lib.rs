//! ConcatX video joiner library
//!
//! Joins an ordered list of clips with transitions. Each clip is cut into
//! fragments by lossless stream copy, only the short transition regions are
//! re-encoded, and everything is stitched back together with the concat
//! demuxer.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod output;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use app::{ConcatInteractor, ConcatRequest, PipelineSettings};
pub use config::AppConfig;
pub use domain::errors::{DomainError, DomainResult, EngineError};
pub use domain::model::{Clip, Fragment, FragmentKind, FragmentPlan, Transition, TransitionSpec};
pub use domain::rules::SegmentationPlanner;
pub use output::ConcatReport;
