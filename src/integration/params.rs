//! Parameters the engine uses when generating hypotheses.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::optimiser::Fate;

/// Hypothesis generation parameters.
///
/// The optimiser never reads these; they are handed through to
/// [`HypothesisSource::create_hypotheses`](crate::integration::HypothesisSource::create_hypotheses).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HypothesisParams {
    /// Time scale of initialisation/termination away from the field edge
    pub lambda_time: f64,
    /// Distance scale of initialisation/termination away from the field edge
    pub lambda_dist: f64,
    /// Distance scale for linking
    pub lambda_link: f64,
    /// Distance scale for branching
    pub lambda_branch: f64,
    /// Floor probability
    pub eta: f64,
    /// Distance from the field edge counted as "at the edge"
    pub theta_dist: f64,
    /// Frames from the start/end counted as "at the edge"
    pub theta_time: f64,
    /// Maximum link distance
    pub dist_thresh: f64,
    /// Maximum link gap in frames
    pub time_thresh: f64,
    /// Dummy observations in a row before apoptosis is considered
    pub apop_thresh: u32,
    pub segmentation_miss_rate: f64,
    pub apoptosis_rate: f64,
    /// Allow events away from the field edge
    pub relax: bool,
    /// Which fates to generate
    pub hypotheses_to_generate: Vec<Fate>,
}

impl Default for HypothesisParams {
    fn default() -> Self {
        Self {
            lambda_time: 5.0,
            lambda_dist: 3.0,
            lambda_link: 10.0,
            lambda_branch: 50.0,
            eta: 1e-10,
            theta_dist: 20.0,
            theta_time: 5.0,
            dist_thresh: 40.0,
            time_thresh: 2.0,
            apop_thresh: 5,
            segmentation_miss_rate: 0.1,
            apoptosis_rate: 0.001,
            relax: true,
            hypotheses_to_generate: Fate::ALL.to_vec(),
        }
    }
}

impl HypothesisParams {
    pub fn generates(&self, fate: Fate) -> bool {
        self.hypotheses_to_generate.contains(&fate)
    }

    /// Restrict generation to `fates`.
    pub fn with_fates(mut self, fates: &[Fate]) -> Self {
        self.hypotheses_to_generate = fates.to_vec();
        self
    }
}
