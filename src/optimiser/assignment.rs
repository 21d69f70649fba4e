//! Linear assignment backend for pools without division or merge events.
//!
//! When no hypothesis touches more than one tail and one head, the exact
//! cover reduces to assigning tails to heads. The square cost matrix has
//! side `2N`:
//!
//! ```text
//!              heads 0..N         deaths 0..N
//! tails      | link / false pos | terminate (diagonal) |
//! births     | init (diagonal)  | 0                    |
//! ```

use ndarray::Array2;

use crate::optimiser::constraints::ConstraintSystem;
use crate::optimiser::solver::{BinaryProgramSolver, SolverOutcome, SolverStatus};

/// Solves link-only pools with the Jonker-Volgenant algorithm.
///
/// Pools containing division or merge hypotheses are rejected with
/// [`SolverStatus::Other`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AssignmentSolver;

impl AssignmentSolver {
    pub fn new() -> Self {
        Self
    }
}

/// Cost matrix plus the hypothesis chosen for every allowed cell.
struct AssignmentProblem {
    costs: Array2<f64>,
    choice: Array2<Option<usize>>,
}

impl AssignmentProblem {
    fn from_system(system: &ConstraintSystem) -> Option<Self> {
        let n = system.num_tracklets();
        let size = 2 * n;
        let cost = system.cost();

        let mut choice: Array2<Option<usize>> = Array2::from_elem((size, size), None);
        for (j, rows) in system.matrix().columns().enumerate() {
            let cell = match *rows {
                [tail] if tail < n => (tail, n + tail),
                [head] => (head, head - n),
                [tail, head] if tail < n && head >= n => (tail, head - n),
                _ => return None,
            };
            let better = match choice[cell] {
                Some(current) => cost[j] < cost[current],
                None => true,
            };
            if better {
                choice[cell] = Some(j);
            }
        }

        // Any assignment through a forbidden cell must cost more than every
        // assignment avoiding them.
        let total: f64 = cost.iter().map(|c| c.abs()).sum();
        let forbidden = 2.0 * total + 1.0;
        let offset = cost.iter().fold(0.0_f64, |acc, &c| acc.min(c)).abs();

        let mut costs = Array2::from_elem((size, size), forbidden + offset);
        for r in n..size {
            for c in n..size {
                costs[[r, c]] = offset;
            }
        }
        for ((r, c), &hyp) in choice.indexed_iter() {
            if let Some(j) = hyp {
                costs[[r, c]] = cost[j] + offset;
            }
        }

        Some(Self { costs, choice })
    }

    /// Selected hypothesis per row, `None` when the assignment is infeasible.
    fn decode(&self, row_to_col: &[usize], n: usize) -> Option<Vec<usize>> {
        let mut selected = Vec::new();
        for (r, &c) in row_to_col.iter().enumerate() {
            let dummy = r >= n && c >= n;
            match self.choice[[r, c]] {
                Some(j) => selected.push(j),
                None if dummy => {}
                None => return None,
            }
        }
        Some(selected)
    }
}

impl BinaryProgramSolver for AssignmentSolver {
    fn name(&self) -> &str {
        "lapjv"
    }

    fn solve(&self, system: &ConstraintSystem) -> SolverOutcome {
        let num_hypotheses = system.num_hypotheses();
        let n = system.num_tracklets();
        if n == 0 {
            return SolverOutcome::new(SolverStatus::Optimal, vec![0.0; num_hypotheses]);
        }
        if system.matrix().has_empty_rows() {
            return SolverOutcome::failed(SolverStatus::Infeasible, num_hypotheses);
        }

        let Some(problem) = AssignmentProblem::from_system(system) else {
            return SolverOutcome::failed(
                SolverStatus::Other("not an assignment problem".to_string()),
                num_hypotheses,
            );
        };

        match lapjv::lapjv(&problem.costs) {
            Ok((row_to_col, _)) => match problem.decode(&row_to_col, n) {
                Some(selected) => {
                    let mut x = vec![0.0; num_hypotheses];
                    for j in selected {
                        x[j] = 1.0;
                    }
                    SolverOutcome::new(SolverStatus::Optimal, x)
                }
                None => SolverOutcome::failed(SolverStatus::Infeasible, num_hypotheses),
            },
            Err(_) => SolverOutcome::failed(
                SolverStatus::Other("assignment did not converge".to_string()),
                num_hypotheses,
            ),
        }
    }
}
