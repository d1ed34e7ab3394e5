use thiserror::Error;

/// Dimension and arity problems in a [`crate::Problem`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputShapeError {
    #[error("Problem has no decision variables")]
    NoVariables,
    #[error("Problem has neither an objective function nor goals")]
    MissingObjective,
    #[error("Objective has {found} coefficients but the problem has {expected} decision variables")]
    ObjectiveArity { expected: usize, found: usize },
    #[error("Constraint {row} has {found} coefficients but the problem has {expected} decision variables")]
    ConstraintArity { row: usize, expected: usize, found: usize },
    #[error("Goal {row} has {found} coefficients but the problem has {expected} decision variables")]
    GoalArity { row: usize, expected: usize, found: usize },
    #[error("Goal {row} has priority 0, priorities start at 1")]
    ZeroPriority { row: usize },
    #[error("Constraint {row} needs an artificial variable but no artificial variable method was given")]
    MissingArtificialMethod { row: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolveError {
    #[error("Invalid input: {0}")]
    InputShape(#[from] InputShapeError),
    /// Entering/leaving selection produced a zero pivot element. Never
    /// expected on valid input.
    #[error("Cannot pivot on a zero element at row {row}, column {column}")]
    PivotOnZero { row: usize, column: usize },
}
