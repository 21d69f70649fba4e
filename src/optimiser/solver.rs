//! Interface to binary integer program backends.

use std::fmt;

use crate::optimiser::constraints::ConstraintSystem;

/// Termination status reported by a solver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverStatus {
    /// A proven optimum was found.
    Optimal,
    /// No selection covers every slot exactly once.
    Infeasible,
    /// A feasible but unproven solution, e.g. after hitting a limit.
    Suboptimal,
    /// Anything else the backend reports, such as numerical failure.
    Other(String),
}

impl SolverStatus {
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolverStatus::Optimal)
    }
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverStatus::Optimal => write!(f, "optimal"),
            SolverStatus::Infeasible => write!(f, "infeasible"),
            SolverStatus::Suboptimal => write!(f, "suboptimal"),
            SolverStatus::Other(msg) => write!(f, "{}", msg),
        }
    }
}

/// Status plus one value per hypothesis column.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOutcome {
    pub status: SolverStatus,
    pub solution: Vec<f64>,
}

impl SolverOutcome {
    pub fn new(status: SolverStatus, solution: Vec<f64>) -> Self {
        Self { status, solution }
    }

    /// A failed solve with an all-zero solution of length `n`.
    pub fn failed(status: SolverStatus, n: usize) -> Self {
        Self::new(status, vec![0.0; n])
    }
}

/// Solves `min cost·x  s.t.  A x = 1,  x ∈ {0,1}^n`.
///
/// Implement this trait to plug in a different backend.
///
/// # Example
///
/// ```ignore
/// use btrack_optimiser::{BinaryProgramSolver, ConstraintSystem, SolverOutcome, SolverStatus};
///
/// struct RejectAll;
///
/// impl BinaryProgramSolver for RejectAll {
///     fn name(&self) -> &str {
///         "reject-all"
///     }
///
///     fn solve(&self, system: &ConstraintSystem) -> SolverOutcome {
///         SolverOutcome::failed(SolverStatus::Infeasible, system.num_hypotheses())
///     }
/// }
/// ```
pub trait BinaryProgramSolver {
    /// Short backend name used in diagnostics.
    fn name(&self) -> &str;

    /// Solve the program. Failure is reported through the status and never
    /// as a panic; the solution always has one entry per column.
    fn solve(&self, system: &ConstraintSystem) -> SolverOutcome;
}

impl<S: BinaryProgramSolver + ?Sized> BinaryProgramSolver for &S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn solve(&self, system: &ConstraintSystem) -> SolverOutcome {
        (**self).solve(system)
    }
}

impl<S: BinaryProgramSolver + ?Sized> BinaryProgramSolver for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn solve(&self, system: &ConstraintSystem) -> SolverOutcome {
        (**self).solve(system)
    }
}
