//! Trait for the tracking engine that generates and applies hypotheses.

use crate::integration::params::HypothesisParams;
use crate::integration::pipeline::PipelineError;
use crate::optimiser::{OptimiserConfig, RawHypothesis, TrackHypothesis};

/// Trait for tracking engines that emit a hypothesis pool.
///
/// Implement this trait to connect a tracker to the optimiser.
///
/// # Example
///
/// ```ignore
/// use btrack_optimiser::{HypothesisParams, HypothesisSource, RawHypothesis};
///
/// struct MyEngine {
///     // Handle to the native tracker here
/// }
///
/// impl HypothesisSource for MyEngine {
///     type Error = std::io::Error;
///
///     fn create_hypotheses(
///         &mut self,
///         params: &HypothesisParams,
///         start_frame: u32,
///         stop_frame: u32,
///     ) -> Result<usize, Self::Error> {
///         Ok(0)
///     }
///
///     fn hypothesis(&self, index: usize) -> Result<RawHypothesis, Self::Error> {
///         unimplemented!()
///     }
///
///     fn merge(&mut self, selected: &[usize]) -> Result<(), Self::Error> {
///         Ok(())
///     }
/// }
/// ```
pub trait HypothesisSource {
    /// Error type for engine failures.
    type Error;

    /// Generate hypotheses for tracklets in `start_frame..stop_frame`.
    ///
    /// # Arguments
    /// * `params` - Hypothesis generation parameters
    /// * `start_frame` - First frame of the optimisation window
    /// * `stop_frame` - Frame after the last one in the window
    ///
    /// # Returns
    /// The number of hypotheses produced, or an engine error. Hypotheses are
    /// then fetched by index with `hypothesis`.
    fn create_hypotheses(
        &mut self,
        params: &HypothesisParams,
        start_frame: u32,
        stop_frame: u32,
    ) -> Result<usize, Self::Error>;

    /// Fetch one hypothesis by index.
    fn hypothesis(&self, index: usize) -> Result<RawHypothesis, Self::Error>;

    /// Apply the accepted hypotheses (links, divisions, fates).
    ///
    /// Called with an empty slice when nothing was accepted.
    fn merge(&mut self, selected: &[usize]) -> Result<(), Self::Error>;
}

/// Read `count` hypotheses from `source`, preserving engine order.
pub fn collect_hypotheses<H: HypothesisSource>(
    source: &H,
    count: usize,
    config: &OptimiserConfig,
) -> Result<Vec<TrackHypothesis>, PipelineError<H::Error>> {
    let mut hypotheses = Vec::with_capacity(count);
    for index in 0..count {
        let raw = source.hypothesis(index).map_err(PipelineError::Source)?;
        hypotheses.push(TrackHypothesis::from_raw(
            index,
            &raw,
            config.strict_references,
        )?);
    }
    Ok(hypotheses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimiser::{Fate, OptimiserError};

    struct VecSource(Vec<RawHypothesis>);

    impl HypothesisSource for VecSource {
        type Error = String;

        fn create_hypotheses(
            &mut self,
            _params: &HypothesisParams,
            _start_frame: u32,
            _stop_frame: u32,
        ) -> Result<usize, Self::Error> {
            Ok(self.0.len())
        }

        fn hypothesis(&self, index: usize) -> Result<RawHypothesis, Self::Error> {
            self.0
                .get(index)
                .copied()
                .ok_or_else(|| format!("no hypothesis {}", index))
        }

        fn merge(&mut self, _selected: &[usize]) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    fn raw(fate: Fate, id: u32, ref_one: u32) -> RawHypothesis {
        RawHypothesis {
            fate_code: fate.code(),
            id,
            log_likelihood: 0.0,
            ref_one,
            ref_two: 0,
        }
    }

    #[test]
    fn test_collect_preserves_order() {
        let source = VecSource(vec![
            raw(Fate::Terminate, 2, 0),
            raw(Fate::Link, 1, 2),
            raw(Fate::Initialize, 1, 0),
        ]);
        let pool = collect_hypotheses(&source, 3, &OptimiserConfig::default()).unwrap();
        let fates: Vec<Fate> = pool.iter().map(|h| h.fate()).collect();
        assert_eq!(fates, vec![Fate::Terminate, Fate::Link, Fate::Initialize]);
    }

    #[test]
    fn test_collect_reports_bad_record() {
        let mut bad = raw(Fate::Link, 1, 2);
        bad.fate_code = 42;
        let source = VecSource(vec![raw(Fate::Initialize, 1, 0), bad]);
        let result = collect_hypotheses(&source, 2, &OptimiserConfig::default());
        assert_eq!(
            result,
            Err(PipelineError::Optimiser(OptimiserError::UnknownFate(42)))
        );
    }

    #[test]
    fn test_collect_reports_engine_error() {
        let source = VecSource(vec![]);
        let result = collect_hypotheses(&source, 1, &OptimiserConfig::default());
        assert_eq!(result, Err(PipelineError::Source("no hypothesis 0".to_string())));
    }
}
