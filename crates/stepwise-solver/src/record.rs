//! Serializable input and output records for the solver boundary.
//!
//! Matrices are augmented: every row ends with its right-hand side. Numbers
//! may be JSON integers, decimals or strings such as `"7/2"`; results carry
//! every number as an exact string.

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::number::{int, parse_rational, ParseNumberError, Rational};
use crate::problem::{ArtificialMethod, Problem, Relation};
use crate::solution::{Outcome, Solution, SolutionStatus};
use crate::step::Step;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error(transparent)]
    Number(#[from] ParseNumberError),
    #[error("Row {row} of {matrix} is empty; augmented rows end with the right-hand side")]
    EmptyRow { matrix: &'static str, row: usize },
    #[error("{matrix} has {rows} rows but {relations} relations were given")]
    RelationCount {
        matrix: &'static str,
        rows: usize,
        relations: usize,
    },
    #[error("{goals} goals but {priorities} priorities were given")]
    PriorityCount { goals: usize, priorities: usize },
    #[error("restricted has {found} flags but the problem has {expected} decision variables")]
    RestrictedCount { expected: usize, found: usize },
}

/// Magnitude from which an f64 no longer holds every integer (2^53)
const EXACT_FLOAT_LIMIT: f64 = 9_007_199_254_740_992.0;

/// A number as written in an input file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberRecord {
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Text(String),
}

impl NumberRecord {
    pub fn to_rational(&self) -> Result<Rational, ParseNumberError> {
        match self {
            NumberRecord::Integer(i) => Ok(int(*i)),
            NumberRecord::Unsigned(u) => Ok(Rational::from_integer(BigInt::from(*u))),
            // Integers beyond u64 arrive here already rounded
            NumberRecord::Float(f) if f.abs() >= EXACT_FLOAT_LIMIT => {
                Err(ParseNumberError::Inexact(f.to_string()))
            }
            // Display of an f64 never uses an exponent, so the decimal parser
            // reads back the shortest representation exactly
            NumberRecord::Float(f) => parse_rational(&f.to_string()),
            NumberRecord::Text(text) => parse_rational(text),
        }
    }
}

/// Input record of a standard LP or a goal program
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProblemRecord {
    /// Absent under goal programming
    pub objective_function_coefficients_vector: Option<Vec<NumberRecord>>,
    pub aug_constraints_coefficients_matrix: Vec<Vec<NumberRecord>>,
    pub constraints_relations: Vec<Relation>,
    pub aug_goals_coefficients_matrix: Vec<Vec<NumberRecord>>,
    pub goals_relations: Vec<Relation>,
    /// Priority level per goal; defaults to goal order
    pub goals_priorities: Option<Vec<usize>>,
    /// Defaults to every variable non-negative
    pub restricted: Option<Vec<bool>>,
    pub is_maximization: bool,
    pub artificial_solution_method: Option<ArtificialMethod>,
}

impl ProblemRecord {
    fn num_variables(&self) -> usize {
        if let Some(objective) = &self.objective_function_coefficients_vector {
            return objective.len();
        }
        self.aug_goals_coefficients_matrix
            .first()
            .or_else(|| self.aug_constraints_coefficients_matrix.first())
            .map(|row| row.len().saturating_sub(1))
            .or_else(|| self.restricted.as_ref().map(Vec::len))
            .unwrap_or(0)
    }
}

fn numbers(values: &[NumberRecord]) -> Result<Vec<Rational>, ParseNumberError> {
    values.iter().map(NumberRecord::to_rational).collect()
}

type AugmentedRow = (Vec<Rational>, Rational);

fn augmented_rows(
    matrix: &'static str,
    rows: &[Vec<NumberRecord>],
    relations: &[Relation],
) -> Result<Vec<(AugmentedRow, Relation)>, RecordError> {
    if rows.len() != relations.len() {
        return Err(RecordError::RelationCount {
            matrix,
            rows: rows.len(),
            relations: relations.len(),
        });
    }

    rows.iter()
        .zip(relations)
        .enumerate()
        .map(|(row, (values, &relation))| {
            let mut values = numbers(values)?;
            let rhs = values.pop().ok_or(RecordError::EmptyRow { matrix, row })?;
            Ok(((values, rhs), relation))
        })
        .collect()
}

impl TryFrom<ProblemRecord> for Problem {
    type Error = RecordError;

    fn try_from(record: ProblemRecord) -> Result<Self, Self::Error> {
        let n = record.num_variables();
        let mut problem = Problem::new(n);

        if let Some(objective) = &record.objective_function_coefficients_vector {
            problem.set_objective(numbers(objective)?, record.is_maximization);
        }

        let constraints = augmented_rows(
            "aug_constraints_coefficients_matrix",
            &record.aug_constraints_coefficients_matrix,
            &record.constraints_relations,
        )?;
        for ((coefficients, rhs), relation) in constraints {
            problem.add_constraint(coefficients, relation, rhs);
        }

        let goals = augmented_rows(
            "aug_goals_coefficients_matrix",
            &record.aug_goals_coefficients_matrix,
            &record.goals_relations,
        )?;
        match &record.goals_priorities {
            Some(priorities) if priorities.len() != goals.len() => {
                return Err(RecordError::PriorityCount {
                    goals: goals.len(),
                    priorities: priorities.len(),
                });
            }
            Some(priorities) => {
                for (((coefficients, rhs), relation), &priority) in goals.into_iter().zip(priorities) {
                    problem.add_goal_with_priority(coefficients, relation, rhs, priority);
                }
            }
            None => {
                for ((coefficients, rhs), relation) in goals {
                    problem.add_goal(coefficients, relation, rhs);
                }
            }
        }

        if let Some(restricted) = record.restricted {
            if restricted.len() != n {
                return Err(RecordError::RestrictedCount {
                    expected: n,
                    found: restricted.len(),
                });
            }
            problem.restricted = restricted;
        }
        if let Some(method) = record.artificial_solution_method {
            problem.set_method(method);
        }

        Ok(problem)
    }
}

/// One recorded tableau
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<usize>,
    pub comment: String,
    /// Column names, RHS excluded
    pub variables: Vec<String>,
    /// Row labels: objective rows, then `R1..Rm`
    pub rows: Vec<String>,
    pub grid: Vec<Vec<String>>,
    /// Basic variable of each constraint row
    pub basis: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entering: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaving: Option<usize>,
}

impl From<&Step> for StepRecord {
    fn from(step: &Step) -> Self {
        Self {
            number: step.number(),
            comment: step.comment().to_string(),
            variables: step.variable_names(),
            rows: step.row_labels(),
            grid: step.grid(),
            basis: step.basis_names(),
            entering: step.pivot().map(|p| p.entering),
            leaving: step.pivot().map(|p| p.leaving),
        }
    }
}

/// Output record; every number is an exact string
#[derive(Debug, Clone, Serialize)]
pub struct SolutionRecord {
    pub status: SolutionStatus,
    pub variables: Vec<String>,
    pub final_decision_variable_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_objective_function_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goals_satisfied: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goals_unsatisfied: Option<Vec<String>>,
    pub summary: String,
    pub steps: Vec<StepRecord>,
}

impl From<&Solution> for SolutionRecord {
    fn from(solution: &Solution) -> Self {
        let (objective, satisfied, unsatisfied) = match &solution.outcome {
            Outcome::Objective(value) => (value.as_ref().map(Rational::to_string), None, None),
            Outcome::Goals(_) => (
                None,
                Some(solution.goals_satisfied()),
                Some(solution.goals_unsatisfied()),
            ),
        };

        Self {
            status: solution.status,
            variables: solution.variables.clone(),
            final_decision_variable_values: solution
                .values
                .as_ref()
                .map(|values| values.iter().map(Rational::to_string).collect()),
            final_objective_function_value: objective,
            goals_satisfied: satisfied,
            goals_unsatisfied: unsatisfied,
            summary: solution.summary().to_string(),
            steps: solution.steps.iter().map(StepRecord::from).collect(),
        }
    }
}
