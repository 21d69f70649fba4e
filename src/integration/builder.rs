//! Builder for creating TrackHypothesis objects from loose fields.

use crate::optimiser::{Fate, OptimiserResult, RawHypothesis, TrackHypothesis};

/// Builder for creating `TrackHypothesis` objects, validating on `build`.
#[derive(Debug, Clone, Default)]
pub struct HypothesisBuilder {
    raw: RawHypothesis,
}

impl HypothesisBuilder {
    /// Create a new builder for track `id` with a zero log-likelihood.
    pub fn new(id: u32, fate: Fate) -> Self {
        Self {
            raw: RawHypothesis {
                fate_code: fate.code(),
                id,
                ..RawHypothesis::default()
            },
        }
    }

    /// Set the log-likelihood directly.
    pub fn log_likelihood(mut self, log_likelihood: f64) -> Self {
        self.raw.log_likelihood = log_likelihood;
        self
    }

    /// Set the log-likelihood from a probability in `(0, 1]`.
    pub fn probability(mut self, probability: f64) -> Self {
        self.raw.log_likelihood = probability.ln();
        self
    }

    /// Set the link target.
    pub fn link_id(mut self, link_id: u32) -> Self {
        self.raw.ref_one = link_id;
        self
    }

    /// Set both children of a division.
    pub fn children(mut self, child_one_id: u32, child_two_id: u32) -> Self {
        self.raw.ref_one = child_one_id;
        self.raw.ref_two = child_two_id;
        self
    }

    /// Set both parents of a merge.
    pub fn parents(mut self, parent_one_id: u32, parent_two_id: u32) -> Self {
        self.raw.ref_one = parent_one_id;
        self.raw.ref_two = parent_two_id;
        self
    }

    /// The engine record this builder describes.
    pub fn raw(&self) -> RawHypothesis {
        self.raw
    }

    /// Build the final `TrackHypothesis`.
    pub fn build(self) -> OptimiserResult<TrackHypothesis> {
        TrackHypothesis::from_raw(0, &self.raw, true)
    }
}
