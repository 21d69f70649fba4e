//! Global optimisation of tracklet linking hypotheses.
//!
//! A tracking engine proposes competing explanations for where each tracklet
//! starts and ends. [`TrackOptimiser`] encodes them as an exact-cover binary
//! program and returns the maximum-likelihood subset in which every tracklet
//! boundary is explained exactly once.

pub mod integration;
pub mod optimiser;

pub use integration::{
    HypothesisBuilder, HypothesisParams, HypothesisSource, OptimiserPipeline, PipelineError,
};
pub use optimiser::{
    AssignmentSolver, BinaryProgramSolver, ConstraintSystem, Event, Fate, IdSpace, IlpSolver,
    OptimiserConfig, OptimiserError, OptimiserResult, RawHypothesis, Selection, SolverOutcome,
    SolverStatus, SparseBinaryMatrix, TrackHypothesis, TrackOptimiser,
};
