mod assignment;
mod constraints;
mod errors;
mod hypothesis;
mod ilp;
mod solver;
mod track_optimiser;

pub use assignment::AssignmentSolver;
pub use constraints::{ConstraintSystem, IdSpace, SparseBinaryMatrix};
pub use errors::{OptimiserError, OptimiserResult};
pub use hypothesis::{Event, Fate, RawHypothesis, TrackHypothesis};
pub use ilp::IlpSolver;
pub use solver::{BinaryProgramSolver, SolverOutcome, SolverStatus};
pub use track_optimiser::{OptimiserConfig, Selection, TrackOptimiser};
