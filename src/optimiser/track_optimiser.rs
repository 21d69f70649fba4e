//! Global optimisation of a hypothesis pool.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{Span, debug, info, info_span, warn};

use crate::optimiser::constraints::{ConstraintSystem, IdSpace};
use crate::optimiser::errors::OptimiserResult;
use crate::optimiser::hypothesis::TrackHypothesis;
use crate::optimiser::ilp::IlpSolver;
use crate::optimiser::solver::{BinaryProgramSolver, SolverStatus};

/// Configuration for the TrackOptimiser.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OptimiserConfig {
    pub id_space: IdSpace,
    pub strict_references: bool,
}

impl Default for OptimiserConfig {
    fn default() -> Self {
        Self {
            id_space: IdSpace::Strict,
            strict_references: true,
        }
    }
}

/// Accepted hypotheses of one optimisation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    status: SolverStatus,
    indices: Vec<usize>,
}

impl Selection {
    /// Interpret a solver solution.
    ///
    /// Any strictly positive value counts as selected. A non-optimal status
    /// selects nothing.
    pub fn from_solution(status: SolverStatus, solution: &[f64]) -> Self {
        let indices = if status.is_optimal() {
            solution
                .iter()
                .enumerate()
                .filter_map(|(j, &v)| if v > 0.0 { Some(j) } else { None })
                .collect()
        } else {
            vec![]
        };
        Self { status, indices }
    }

    /// Indices into the hypothesis pool, in ascending order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }

    pub fn status(&self) -> &SolverStatus {
        &self.status
    }

    pub fn is_optimal(&self) -> bool {
        self.status.is_optimal()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.binary_search(&index).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }
}

impl IntoIterator for Selection {
    type Item = usize;
    type IntoIter = std::vec::IntoIter<usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.indices.into_iter()
    }
}

/// Selects the maximum-likelihood consistent subset of a hypothesis pool.
///
/// Each pass builds a fresh [`ConstraintSystem`], so one optimiser can serve
/// independent pools one after another.
pub struct TrackOptimiser<S: BinaryProgramSolver = IlpSolver> {
    config: OptimiserConfig,
    solver: S,
    span: Span,
}

impl TrackOptimiser<IlpSolver> {
    pub fn new(config: OptimiserConfig) -> Self {
        Self::with_solver(config, IlpSolver)
    }
}

impl Default for TrackOptimiser<IlpSolver> {
    fn default() -> Self {
        Self::new(OptimiserConfig::default())
    }
}

impl<S: BinaryProgramSolver> TrackOptimiser<S> {
    pub fn with_solver(config: OptimiserConfig, solver: S) -> Self {
        Self {
            config,
            solver,
            span: info_span!("track_optimiser"),
        }
    }

    /// Emit this optimiser's diagnostics inside `span`.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn config(&self) -> &OptimiserConfig {
        &self.config
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Encode the pool without solving it.
    pub fn build(&self, hypotheses: &[TrackHypothesis]) -> OptimiserResult<ConstraintSystem> {
        ConstraintSystem::build(hypotheses, self.config.id_space)
    }

    /// Run one optimisation pass over `hypotheses`.
    ///
    /// Structural problems with the pool are returned as errors before the
    /// solver runs. A solver that does not reach an optimum yields an empty
    /// selection carrying its status.
    pub fn optimise(&self, hypotheses: &[TrackHypothesis]) -> OptimiserResult<Selection> {
        let _guard = self.span.enter();

        info!(
            hypotheses = hypotheses.len(),
            "Setting up constraints matrix for global optimisation"
        );
        let system = self.build(hypotheses)?;
        debug!(
            rows = system.matrix().nrows(),
            cols = system.matrix().ncols(),
            nnz = system.matrix().nnz(),
            "Constraints matrix built"
        );

        if system.num_hypotheses() == 0 {
            return Ok(Selection::from_solution(SolverStatus::Optimal, &[]));
        }

        info!(solver = self.solver.name(), "Optimising");
        let outcome = self.solver.solve(&system);

        if !outcome.status.is_optimal() {
            warn!(status = %outcome.status, "Optimiser returned non-optimal status");
            return Ok(Selection::from_solution(outcome.status, &outcome.solution));
        }

        let selection = Selection::from_solution(outcome.status, &outcome.solution);
        debug!(
            selected = selection.len(),
            objective = system.objective(&outcome.solution),
            "Optimisation complete"
        );
        Ok(selection)
    }
}
