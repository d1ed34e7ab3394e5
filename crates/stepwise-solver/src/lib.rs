mod engine;
mod error;
mod matrix;
mod normalize;
mod number;
mod objective;
mod problem;
#[cfg(feature = "serde")]
mod record;
mod solution;
mod solver;
mod step;
mod tableau;
mod variable;

pub use engine::Engine;
pub use error::{InputShapeError, SolveError};
pub use matrix::AugmentedMatrix;
pub use number::{from_ints, int, parse_rational, ratio, Param, ParseNumberError, Rational};
pub use objective::{ObjectiveRow, ObjectiveSet, RowParameter, Sense};
pub use problem::{ArtificialMethod, Constraint, Goal, Problem, Relation};
#[cfg(feature = "serde")]
pub use record::{NumberRecord, ProblemRecord, RecordError, SolutionRecord, StepRecord};
pub use solution::{GoalReport, LevelReport, Outcome, Solution, SolutionStatus};
pub use solver::Solver;
pub use step::{Pivot, Step, Trace};
pub use tableau::Tableau;
pub use variable::{VarId, VarKind, Variable};
