//! Turns a [`Problem`] into an augmented tableau with an initial basis.
//!
//! Column layout: decision columns (free variables split into a positive and
//! a negative part), surplus, favored deviations, penalized deviations,
//! slack, artificial, RHS. Goal rows come before constraint rows.

use log::{debug, warn};

use crate::error::InputShapeError;
use crate::matrix::AugmentedMatrix;
use crate::number::{int, Rational};
use crate::problem::{orient, Problem, Relation};
use crate::tableau::Tableau;
use crate::variable::{VarId, VarKind, Variable};

/// Columns standing for one original decision variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionColumns {
    Restricted(VarId),
    Split { positive: VarId, negative: VarId },
}

/// A goal deviation variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deviation {
    pub goal: usize,
    pub variable: VarId,
    /// Penalized deviations appear in the goal's priority row
    pub penalized: bool,
}

#[derive(Debug, Clone)]
pub struct Normalized {
    pub tableau: Tableau,
    /// Objective coefficients over the decision columns (after splitting);
    /// `None` under goal programming
    pub objective: Option<Vec<Rational>>,
    pub decisions: Vec<DecisionColumns>,
    pub artificial: Vec<VarId>,
    pub deviations: Vec<Deviation>,
    /// Number of leading goal rows in the tableau
    pub goal_rows: usize,
}

struct Columns {
    matrix: AugmentedMatrix,
    variables: Vec<Variable>,
    next_id: usize,
}

impl Columns {
    fn declare(&mut self, kind: VarKind, index: usize) -> VarId {
        let id = VarId(self.next_id);
        self.next_id += 1;
        self.variables.push(Variable::new(id, kind, index));
        id
    }

    fn push_unit(&mut self, row: usize, sign: i64, kind: VarKind, index: usize) -> VarId {
        self.matrix.push_unit_column(row, int(sign));
        self.declare(kind, index)
    }
}

pub fn normalize(problem: &Problem) -> Result<Normalized, InputShapeError> {
    problem.validate()?;

    let n = problem.num_variables();
    let goal_rows = problem.goals.len();
    let mut matrix = AugmentedMatrix::new(n);

    let mut goal_relations = Vec::with_capacity(goal_rows);
    for goal in &problem.goals {
        let (coefficients, relation, rhs) = orient(&goal.coefficients, goal.relation, &goal.rhs);
        matrix.push_row(coefficients, rhs);
        goal_relations.push(relation);
    }

    let mut constraint_relations = Vec::with_capacity(problem.num_constraints());
    for constraint in &problem.constraints {
        let (coefficients, relation, rhs) =
            orient(&constraint.coefficients, constraint.relation, &constraint.rhs);
        matrix.push_row(coefficients, rhs);
        constraint_relations.push(relation);
    }

    let mut objective = if problem.is_goal_programming() {
        if problem.objective.is_some() {
            warn!("Objective function ignored: goals are present");
        }
        None
    } else {
        problem.objective.clone()
    };

    let mut columns = Columns {
        matrix,
        variables: Vec::new(),
        next_id: 0,
    };

    // Decision variables, splitting free ones
    let mut decisions = Vec::with_capacity(n);
    let mut column = 0;
    for (i, &restricted) in problem.restricted.iter().enumerate() {
        if restricted {
            decisions.push(DecisionColumns::Restricted(columns.declare(VarKind::Decision, i)));
            column += 1;
            continue;
        }

        let negated = columns.matrix.negated_column(column);
        columns.matrix.insert_column(column + 1, negated);
        if let Some(objective) = objective.as_mut() {
            let negated = -&objective[column];
            objective.insert(column + 1, negated);
        }
        let positive = columns.declare(VarKind::PositivePart, i);
        let negative = columns.declare(VarKind::NegativePart, i);
        decisions.push(DecisionColumns::Split { positive, negative });
        column += 2;
    }

    let row_count = columns.matrix.row_count();
    let mut basis: Vec<Option<VarId>> = vec![None; row_count];

    // Surplus columns
    for (k, relation) in constraint_relations.iter().enumerate() {
        if *relation == Relation::Ge {
            columns.push_unit(goal_rows + k, -1, VarKind::Surplus, k);
        }
    }

    // Deviation columns: y- has coefficient +1, y+ has -1
    let mut favored = Vec::new();
    let mut penalized = Vec::new();
    for (g, relation) in goal_relations.iter().enumerate() {
        match relation {
            Relation::Ge => {
                penalized.push((g, VarKind::DeviationMinus));
                favored.push((g, VarKind::DeviationPlus));
            }
            Relation::Eq => {
                penalized.push((g, VarKind::DeviationMinus));
                penalized.push((g, VarKind::DeviationPlus));
            }
            Relation::Le => {
                favored.push((g, VarKind::DeviationMinus));
                penalized.push((g, VarKind::DeviationPlus));
            }
        }
    }

    let mut deviations = Vec::with_capacity(favored.len() + penalized.len());
    let tagged = favored
        .into_iter()
        .map(|d| (d, false))
        .chain(penalized.into_iter().map(|d| (d, true)));
    for ((g, kind), is_penalized) in tagged {
        let sign = if kind == VarKind::DeviationMinus { 1 } else { -1 };
        let id = columns.push_unit(g, sign, kind, g);
        // The under-achievement column is the unit vector of its goal row
        if kind == VarKind::DeviationMinus {
            basis[g] = Some(id);
        }
        deviations.push(Deviation {
            goal: g,
            variable: id,
            penalized: is_penalized,
        });
    }

    // Slack columns
    for (k, relation) in constraint_relations.iter().enumerate() {
        if *relation == Relation::Le {
            let id = columns.push_unit(goal_rows + k, 1, VarKind::Slack, k);
            basis[goal_rows + k] = Some(id);
        }
    }

    // Artificial columns
    let mut artificial = Vec::new();
    for (k, relation) in constraint_relations.iter().enumerate() {
        if *relation != Relation::Le {
            let id = columns.push_unit(goal_rows + k, 1, VarKind::Artificial, k);
            basis[goal_rows + k] = Some(id);
            artificial.push(id);
        }
    }

    let basis: Vec<VarId> = basis.into_iter().flatten().collect();
    debug_assert_eq!(basis.len(), row_count);

    debug!(
        "Normalized problem: {} rows, {} columns, {} artificial, {} deviation variables",
        row_count,
        columns.matrix.column_count(),
        artificial.len(),
        deviations.len()
    );

    Ok(Normalized {
        tableau: Tableau {
            matrix: columns.matrix,
            variables: columns.variables,
            basis,
        },
        objective,
        decisions,
        artificial,
        deviations,
        goal_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number::from_ints;
    use crate::problem::ArtificialMethod;

    #[test]
    fn test_slack_surplus_and_artificial_columns() {
        // max 2x1 + x2
        //   x1 + x2 >= 2
        //   x1      <= 4
        //   x1 - x2  = 1
        let mut problem = Problem::new(2);
        problem.set_objective(from_ints(&[2, 1]), true);
        problem.add_constraint(from_ints(&[1, 1]), Relation::Ge, int(2));
        problem.add_constraint(from_ints(&[1, 0]), Relation::Le, int(4));
        problem.add_constraint(from_ints(&[1, -1]), Relation::Eq, int(1));
        problem.set_method(ArtificialMethod::BigM);

        let normalized = normalize(&problem).unwrap();
        let tableau = &normalized.tableau;
        assert_eq!(tableau.variable_names(), vec!["x1", "x2", "e1", "s2", "a1", "a3"]);
        assert_eq!(tableau.matrix.row(0), from_ints(&[1, 1, -1, 0, 1, 0, 2]).as_slice());
        assert_eq!(tableau.matrix.row(1), from_ints(&[1, 0, 0, 1, 0, 0, 4]).as_slice());
        assert_eq!(tableau.matrix.row(2), from_ints(&[1, -1, 0, 0, 0, 1, 1]).as_slice());
        // Basis follows row order, not insertion order
        assert_eq!(tableau.basis_names(), vec!["a1", "s2", "a3"]);
        assert_eq!(normalized.artificial.len(), 2);
        assert_eq!(normalized.objective, Some(from_ints(&[2, 1])));
    }

    #[test]
    fn test_free_variable_is_split() {
        let mut problem = Problem::new(2);
        problem.set_objective(from_ints(&[3, 5]), false);
        problem.set_unrestricted(0);
        problem.add_constraint(from_ints(&[2, 1]), Relation::Le, int(6));

        let normalized = normalize(&problem).unwrap();
        let tableau = &normalized.tableau;
        assert_eq!(tableau.variable_names(), vec!["x1+", "x1-", "x2", "s1"]);
        assert_eq!(tableau.matrix.row(0), from_ints(&[2, -2, 1, 1, 6]).as_slice());
        assert_eq!(normalized.objective, Some(from_ints(&[3, -3, 5])));
        assert!(matches!(normalized.decisions[0], DecisionColumns::Split { .. }));
        assert!(matches!(normalized.decisions[1], DecisionColumns::Restricted(_)));
    }

    #[test]
    fn test_negative_rhs_is_flipped() {
        let mut problem = Problem::new(1);
        problem.set_objective(from_ints(&[1]), true);
        problem.add_constraint(from_ints(&[1]), Relation::Le, int(-2));
        problem.set_method(ArtificialMethod::TwoPhase);

        let normalized = normalize(&problem).unwrap();
        let tableau = &normalized.tableau;
        assert_eq!(tableau.variable_names(), vec!["x1", "e1", "a1"]);
        assert_eq!(tableau.matrix.row(0), from_ints(&[-1, -1, 1, 2]).as_slice());
    }

    #[test]
    fn test_goal_rows_and_deviations() {
        let mut problem = Problem::new(2);
        problem.add_goal(from_ints(&[1, 1]), Relation::Ge, int(10));
        problem.add_goal(from_ints(&[1, 0]), Relation::Le, int(4));
        problem.add_goal(from_ints(&[0, 1]), Relation::Eq, int(3));
        problem.add_constraint(from_ints(&[1, 2]), Relation::Le, int(20));

        let normalized = normalize(&problem).unwrap();
        let tableau = &normalized.tableau;
        assert_eq!(normalized.goal_rows, 3);
        assert_eq!(
            tableau.variable_names(),
            vec!["x1", "x2", "y1+", "y2-", "y1-", "y2+", "y3-", "y3+", "s1"]
        );
        assert_eq!(tableau.basis_names(), vec!["y1-", "y2-", "y3-", "s1"]);
        assert_eq!(tableau.matrix.row(0), from_ints(&[1, 1, -1, 0, 1, 0, 0, 0, 0, 10]).as_slice());
        assert_eq!(tableau.matrix.row(3), from_ints(&[1, 2, 0, 0, 0, 0, 0, 0, 1, 20]).as_slice());

        let penalized: Vec<String> = normalized
            .deviations
            .iter()
            .filter(|d| d.penalized)
            .map(|d| tableau.variable(tableau.column_of(d.variable).unwrap()).name())
            .collect();
        assert_eq!(penalized, vec!["y1-", "y2+", "y3-", "y3+"]);
        assert!(normalized.objective.is_none());
    }

    #[test]
    fn test_missing_method_is_rejected() {
        let mut problem = Problem::new(1);
        problem.set_objective(from_ints(&[1]), true);
        problem.add_constraint(from_ints(&[1]), Relation::Eq, int(1));
        assert_eq!(
            normalize(&problem).unwrap_err(),
            InputShapeError::MissingArtificialMethod { row: 0 }
        );
    }
}
