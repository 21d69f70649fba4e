//! General backend built on `good_lp` with the pure-Rust `microlp` solver.

use good_lp::{
    Expression, ResolutionError, Solution, SolverModel, Variable, default_solver, variable,
    variables,
};

use crate::optimiser::constraints::ConstraintSystem;
use crate::optimiser::solver::{BinaryProgramSolver, SolverOutcome, SolverStatus};

/// Branch-and-bound solver for the full program, including division and
/// merge hypotheses.
#[derive(Debug, Clone, Copy, Default)]
pub struct IlpSolver;

impl IlpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl BinaryProgramSolver for IlpSolver {
    fn name(&self) -> &str {
        "microlp"
    }

    fn solve(&self, system: &ConstraintSystem) -> SolverOutcome {
        let n = system.num_hypotheses();

        // An uncoverable slot makes the program infeasible without a search.
        if system.matrix().has_empty_rows() {
            return SolverOutcome::failed(SolverStatus::Infeasible, n);
        }
        if n == 0 {
            return SolverOutcome::new(SolverStatus::Optimal, vec![]);
        }

        let mut vars = variables!();
        let x: Vec<Variable> = (0..n).map(|_| vars.add(variable().binary())).collect();

        let mut objective = Expression::default();
        for (&c, &xj) in system.cost().iter().zip(&x) {
            objective.add_mul(c, xj);
        }

        let rows = system.matrix().rows();
        let mut problem = vars.minimise(objective).using(default_solver);
        for row in rows {
            let mut covered = Expression::default();
            for j in row {
                covered.add_mul(1.0, x[j]);
            }
            problem = problem.with(covered.eq(1.0));
        }

        match problem.solve() {
            // Binaries come back as floats within the integrality tolerance.
            Ok(solution) => SolverOutcome::new(
                SolverStatus::Optimal,
                x.iter().map(|&xj| solution.value(xj).round()).collect(),
            ),
            Err(ResolutionError::Infeasible) => {
                SolverOutcome::failed(SolverStatus::Infeasible, n)
            }
            Err(err) => SolverOutcome::failed(SolverStatus::Other(err.to_string()), n),
        }
    }
}
