//! Integration module for connecting tracking engines with the optimiser.
//!
//! This module provides the trait a tracking engine implements to hand its
//! hypothesis pool to the optimiser and receive the accepted selection back.

mod builder;
mod params;
mod pipeline;
mod source;

pub use builder::HypothesisBuilder;
pub use params::HypothesisParams;
pub use pipeline::{OptimiserPipeline, PipelineError};
pub use source::{HypothesisSource, collect_hypotheses};
