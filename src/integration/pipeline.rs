//! OptimiserPipeline for combining a tracking engine with global optimisation.

use thiserror::Error;
use tracing::info;

use crate::integration::params::HypothesisParams;
use crate::integration::source::{HypothesisSource, collect_hypotheses};
use crate::optimiser::{
    BinaryProgramSolver, IlpSolver, OptimiserConfig, OptimiserError, Selection, TrackOptimiser,
};

/// Failure of a pipeline pass.
#[derive(Debug, PartialEq, Error)]
pub enum PipelineError<E> {
    /// The tracking engine failed.
    #[error("Tracking engine error: {0}")]
    Source(E),
    /// The hypothesis pool is malformed.
    #[error(transparent)]
    Optimiser(#[from] OptimiserError),
}

/// A combined runner that bundles a tracking engine with the optimiser.
///
/// One `run` generates hypotheses in the engine, selects the consistent
/// subset and hands it back to the engine to apply.
pub struct OptimiserPipeline<H: HypothesisSource, S: BinaryProgramSolver = IlpSolver> {
    source: H,
    optimiser: TrackOptimiser<S>,
    params: HypothesisParams,
}

impl<H: HypothesisSource> OptimiserPipeline<H, IlpSolver> {
    /// Create a new pipeline with the given engine and optimiser config.
    pub fn new(source: H, config: OptimiserConfig) -> Self {
        Self::with_optimiser(source, TrackOptimiser::new(config))
    }

    /// Create a new pipeline with default configuration.
    pub fn with_default_config(source: H) -> Self {
        Self::new(source, OptimiserConfig::default())
    }
}

impl<H: HypothesisSource, S: BinaryProgramSolver> OptimiserPipeline<H, S> {
    pub fn with_optimiser(source: H, optimiser: TrackOptimiser<S>) -> Self {
        Self {
            source,
            optimiser,
            params: HypothesisParams::default(),
        }
    }

    /// Replace the hypothesis generation parameters.
    pub fn with_params(mut self, params: HypothesisParams) -> Self {
        self.params = params;
        self
    }

    /// Optimise tracklets within `start_frame..stop_frame`.
    ///
    /// This method asks the engine for hypotheses, selects the consistent
    /// subset and merges it back into the engine. The selection is merged
    /// even when it is empty, so the engine can finalise fates either way.
    ///
    /// # Arguments
    /// * `start_frame` - First frame of the optimisation window
    /// * `stop_frame` - Frame after the last one in the window
    ///
    /// # Returns
    /// The accepted `Selection`, or a pipeline error when the engine fails or
    /// the hypothesis pool is malformed.
    pub fn run(
        &mut self,
        start_frame: u32,
        stop_frame: u32,
    ) -> Result<Selection, PipelineError<H::Error>> {
        let count = self
            .source
            .create_hypotheses(&self.params, start_frame, stop_frame)
            .map_err(PipelineError::Source)?;
        info!(count, start_frame, stop_frame, "Loading hypotheses");

        let hypotheses = collect_hypotheses(&self.source, count, self.optimiser.config())?;
        let selection = self.optimiser.optimise(&hypotheses)?;

        self.source
            .merge(selection.indices())
            .map_err(PipelineError::Source)?;
        Ok(selection)
    }

    /// Get a reference to the hypothesis generation parameters.
    pub fn params(&self) -> &HypothesisParams {
        &self.params
    }

    /// Get a reference to the underlying engine.
    pub fn source(&self) -> &H {
        &self.source
    }

    /// Get a mutable reference to the underlying engine.
    pub fn source_mut(&mut self) -> &mut H {
        &mut self.source
    }

    /// Get a reference to the underlying optimiser.
    pub fn optimiser(&self) -> &TrackOptimiser<S> {
        &self.optimiser
    }

    pub fn into_source(self) -> H {
        self.source
    }
}
