use log::{debug, info, warn};
use num_traits::{One, Signed, Zero};

use crate::error::SolveError;
use crate::number::{Param, Rational};
use crate::objective::ObjectiveSet;
use crate::solution::SolutionStatus;
use crate::step::{describe, Pivot, Trace};
use crate::tableau::Tableau;
use crate::variable::{VarId, Variable};

/// Pivoting state machine shared by every solve mode.
///
/// An engine holds no tableau state, so the same configuration can be run
/// once for a standard or Big-M problem and twice for Two-Phase.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    /// Prefix for the initial snapshot comment, e.g. "Phase one"
    title: Option<String>,
    /// Variables barred from entering the basis
    frozen: Vec<VarId>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_frozen(mut self, frozen: Vec<VarId>) -> Self {
        self.frozen = frozen;
        self
    }

    /// Pivot until no row yields an entering variable, then classify the
    /// terminal tableau.
    pub fn run(
        &self,
        tableau: &mut Tableau,
        objective: &mut ObjectiveSet,
        trace: &mut Trace,
    ) -> Result<SolutionStatus, SolveError> {
        trace.note(tableau, objective, describe::initial(self.title.as_deref()));
        self.make_consistent(tableau, objective, trace);

        while let Some(column) = self.find_pivot_column(tableau, objective) {
            let Some((row, ratio)) = self.find_pivot_row(tableau, column) else {
                debug!("No leaving variable for column {}", tableau.variable(column));
                break;
            };

            let (entering, leaving) = pivot_variables(tableau, row, column);
            debug!("Pivot: {} enters, {} leaves (ratio {})", entering, leaving, ratio);
            if ratio.is_zero() {
                warn!("Degenerate pivot on {}: zero ratio, cycling is possible", entering);
            }

            trace.step(
                tableau,
                objective,
                Some(Pivot { entering: column, leaving: row }),
                describe::pivot_element(&entering, &leaving),
            );
            self.pivot(tableau, objective, trace, row, column)?;
        }

        let status = self.classify(tableau, objective);
        info!("Simplex terminated: {}", status);
        trace.note(tableau, objective, describe::final_tableau(status));
        Ok(status)
    }

    /// Pivot the artificial variable basic in `row` out of the basis on the
    /// first non-artificial column with a non-zero entry in that row. The
    /// row's RHS must be zero, so the entry may have either sign and no value
    /// changes.
    ///
    /// Returns `false` when every non-artificial entry of the row is zero:
    /// the row is redundant and no later pivot can change it.
    pub(crate) fn drive_out(
        &self,
        tableau: &mut Tableau,
        objective: &mut ObjectiveSet,
        trace: &mut Trace,
        row: usize,
    ) -> Result<bool, SolveError> {
        let Some(column) = (0..tableau.column_count())
            .find(|&c| !tableau.variable(c).is_artificial() && !tableau.matrix.get(row, c).is_zero())
        else {
            return Ok(false);
        };

        let (entering, leaving) = pivot_variables(tableau, row, column);
        debug!("Driving {} out of the basis, {} enters at zero", leaving, entering);
        trace.step(
            tableau,
            objective,
            Some(Pivot { entering: column, leaving: row }),
            describe::pivot_element(&entering, &leaving),
        );
        self.pivot(tableau, objective, trace, row, column)?;
        Ok(true)
    }

    fn can_enter(&self, tableau: &Tableau, column: usize) -> bool {
        let id = tableau.variable(column).id;
        !tableau.is_basic(id) && !self.frozen.contains(&id)
    }

    /// Remove basic variables from every objective row
    fn make_consistent(&self, tableau: &Tableau, objective: &mut ObjectiveSet, trace: &mut Trace) {
        for level in 0..objective.rows.len() {
            for (row, &basic) in tableau.basis.iter().enumerate() {
                let Some(column) = tableau.column_of(basic) else {
                    continue;
                };
                let factor = objective.rows[level].entries[column].clone();
                if factor.is_zero() {
                    continue;
                }

                let label = objective.rows[level].label.clone();
                let symbol = objective.rows[level].parameter.symbol();
                trace.detail(tableau, objective, describe::inconsistent_row(&label));
                objective.rows[level].subtract_row_multiple(tableau.matrix.row(row), &factor);
                trace.step(
                    tableau,
                    objective,
                    None,
                    describe::row_operation(&label, &Tableau::row_label(row), &factor, &symbol),
                );
            }
        }
    }

    /// Columns that would improve row `level` without touching any higher row
    fn eligible_columns<'a>(
        &'a self,
        tableau: &'a Tableau,
        objective: &'a ObjectiveSet,
        level: usize,
    ) -> impl Iterator<Item = usize> + 'a {
        let row = &objective.rows[level];
        (0..tableau.column_count()).filter(move |&column| {
            self.can_enter(tableau, column)
                && objective.sense.improves(&row.entries[column])
                && objective.dominance_clear(level, column)
        })
    }

    /// Scan rows top to bottom; in each row take the most improving column
    /// that is zero in every higher row.
    fn find_pivot_column(&self, tableau: &Tableau, objective: &ObjectiveSet) -> Option<usize> {
        for (level, row) in objective.rows.iter().enumerate() {
            let mut candidates: Vec<(usize, Param)> = (0..tableau.column_count())
                .filter(|&column| self.can_enter(tableau, column))
                .filter(|&column| objective.sense.improves(&row.entries[column]))
                .map(|column| (column, objective.sense.improvement_key(&row.entries[column])))
                .collect();
            // Stable: ties keep column order
            candidates.sort_by(|a, b| a.1.cmp(&b.1));

            if let Some((column, _)) = candidates
                .into_iter()
                .find(|(column, _)| objective.dominance_clear(level, *column))
            {
                return Some(column);
            }
        }
        None
    }

    /// Minimum ratio test; ties go to the first row encountered
    fn find_pivot_row(&self, tableau: &Tableau, column: usize) -> Option<(usize, Rational)> {
        let matrix = &tableau.matrix;
        let mut best: Option<(usize, Rational)> = None;

        for row in 0..matrix.row_count() {
            let coefficient = matrix.get(row, column);
            if !coefficient.is_positive() {
                continue;
            }
            let ratio = matrix.rhs(row) / coefficient;
            if ratio.is_negative() {
                continue;
            }
            if best.as_ref().is_none_or(|(_, min)| ratio < *min) {
                best = Some((row, ratio));
            }
        }

        best
    }

    fn pivot(
        &self,
        tableau: &mut Tableau,
        objective: &mut ObjectiveSet,
        trace: &mut Trace,
        row: usize,
        column: usize,
    ) -> Result<(), SolveError> {
        let pivot_element = tableau.matrix.get(row, column).clone();
        if pivot_element.is_zero() {
            return Err(SolveError::PivotOnZero { row, column });
        }

        tableau.basis[row] = tableau.variable(column).id;
        let pivot_label = Tableau::row_label(row);

        if !pivot_element.is_one() {
            tableau.matrix.scale_row(row, &pivot_element.recip());
            trace.step(tableau, objective, None, describe::normalize_row(&pivot_label, &pivot_element));
        }

        // Objective rows
        for level in 0..objective.rows.len() {
            let factor = objective.rows[level].entries[column].clone();
            if factor.is_zero() {
                continue;
            }
            objective.rows[level].subtract_row_multiple(tableau.matrix.row(row), &factor);
            let label = &objective.rows[level].label;
            let symbol = objective.rows[level].parameter.symbol();
            let comment = describe::row_operation(label, &pivot_label, &factor, &symbol);
            trace.step(tableau, objective, None, comment);
        }

        // Constraint rows
        for target in 0..tableau.row_count() {
            if target == row {
                continue;
            }
            let factor = tableau.matrix.get(target, column).clone();
            if factor.is_zero() {
                continue;
            }
            tableau.matrix.subtract_row_multiple(target, row, &factor);
            let comment = describe::row_operation(
                &Tableau::row_label(target),
                &pivot_label,
                &Param::constant(factor),
                "M",
            );
            trace.step(tableau, objective, None, comment);
        }

        Ok(())
    }

    fn can_leave(tableau: &Tableau, column: usize) -> bool {
        tableau.matrix.column(column).any(|value| value.is_positive())
    }

    /// Evaluated once at halt, in precedence order
    fn classify(&self, tableau: &Tableau, objective: &ObjectiveSet) -> SolutionStatus {
        let infeasible = tableau.basis.iter().enumerate().any(|(row, &id)| {
            tableau
                .column_of(id)
                .is_some_and(|c| tableau.variable(c).is_artificial())
                && tableau.matrix.rhs(row).is_positive()
        });
        if infeasible {
            return SolutionStatus::Infeasible;
        }

        let unbounded = (0..objective.rows.len()).any(|level| {
            self.eligible_columns(tableau, objective, level)
                .any(|column| !Self::can_leave(tableau, column))
        });
        if unbounded {
            return SolutionStatus::Unbounded;
        }

        let infinite = (0..tableau.column_count()).any(|column| {
            self.can_enter(tableau, column) && objective.is_zero_column(column) && Self::can_leave(tableau, column)
        });
        if infinite {
            return SolutionStatus::InfiniteSolutions;
        }

        let degenerate = tableau.basis.iter().enumerate().any(|(row, &id)| {
            let artificial = tableau
                .column_of(id)
                .is_some_and(|c| tableau.variable(c).is_artificial());
            !artificial && tableau.matrix.rhs(row).is_zero()
        });
        if degenerate {
            return SolutionStatus::Degenerate;
        }

        SolutionStatus::Optimal
    }
}

/// Entering variable of `column` and the variable currently basic in `row`
fn pivot_variables(tableau: &Tableau, row: usize, column: usize) -> (Variable, Variable) {
    let entering = tableau.variable(column).clone();
    let leaving = match tableau.column_of(tableau.basis[row]) {
        Some(c) => tableau.variable(c).clone(),
        None => entering.clone(),
    };
    (entering, leaving)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::number::{from_ints, int};
    use crate::problem::{ArtificialMethod, Problem, Relation};

    fn standard(problem: &Problem) -> (Tableau, ObjectiveSet) {
        let n = normalize(problem).unwrap();
        let big_m = if problem.method == Some(ArtificialMethod::BigM) {
            n.artificial.clone()
        } else {
            Vec::new()
        };
        let objective = ObjectiveSet::standard(&n.tableau, n.objective.as_ref().unwrap(), problem.maximize, &big_m);
        (n.tableau, objective)
    }

    #[test]
    fn test_single_pivot_to_optimum() {
        // max 3x1 + 2x2 s.t. x1 + x2 <= 4, x1 + 3x2 <= 6
        let mut problem = Problem::new(2);
        problem.set_objective(from_ints(&[3, 2]), true);
        problem.add_constraint(from_ints(&[1, 1]), Relation::Le, int(4));
        problem.add_constraint(from_ints(&[1, 3]), Relation::Le, int(6));
        let (mut tableau, mut objective) = standard(&problem);
        let mut trace = Trace::new(true);

        let status = Engine::new().run(&mut tableau, &mut objective, &mut trace).unwrap();
        assert_eq!(status, SolutionStatus::Optimal);
        assert_eq!(objective.rows[0].rhs(), &Param::constant(int(12)));
        assert_eq!(tableau.basis_names(), vec!["x1", "s2"]);
        assert_eq!(tableau.matrix.rhs(1), &int(2));

        // initial, pivot choice, z elimination, R2 elimination, final
        let comments: Vec<&str> = trace.steps().iter().map(|s| s.comment()).collect();
        assert_eq!(comments.len(), 5);
        assert_eq!(comments[0], "Initial simplex tableau");
        assert_eq!(comments[1], "Step 1:\nEntering variable x1 and leaving variable s1");
        assert_eq!(comments[2], "Step 2:\nz = z + 3R1");
        assert_eq!(comments[3], "Step 3:\nR2 = R2 - R1");
        assert_eq!(comments[4], "Final simplex tableau: Optimal");
        assert_eq!(trace.steps()[1].pivot(), Some(Pivot { entering: 0, leaving: 0 }));
    }

    #[test]
    fn test_unbounded() {
        // max x1 s.t. x1 - x2 <= 1
        let mut problem = Problem::new(2);
        problem.set_objective(from_ints(&[1, 0]), true);
        problem.add_constraint(from_ints(&[1, -1]), Relation::Le, int(1));
        let (mut tableau, mut objective) = standard(&problem);
        let mut trace = Trace::new(true);

        let status = Engine::new().run(&mut tableau, &mut objective, &mut trace).unwrap();
        assert_eq!(status, SolutionStatus::Unbounded);
    }

    #[test]
    fn test_big_m_makes_row_consistent_first() {
        // min x1 s.t. x1 >= 2
        let mut problem = Problem::new(1);
        problem.set_objective(from_ints(&[1]), false);
        problem.add_constraint(from_ints(&[1]), Relation::Ge, int(2));
        problem.set_method(ArtificialMethod::BigM);
        let (mut tableau, mut objective) = standard(&problem);
        let mut trace = Trace::new(true);

        let status = Engine::new().run(&mut tableau, &mut objective, &mut trace).unwrap();
        assert_eq!(status, SolutionStatus::Optimal);
        assert_eq!(trace.steps()[1].comment(), "Row z is inconsistent");
        assert_eq!(trace.steps()[2].comment(), "Step 1:\nz = z - MR1");
        // internal objective is -x1, so the RHS holds -2
        assert_eq!(objective.rows[0].rhs(), &Param::constant(int(-2)));
    }

    #[test]
    fn test_infinite_solutions() {
        // max x1 + x2 s.t. x1 + x2 <= 3: every point of the edge is optimal
        let mut problem = Problem::new(2);
        problem.set_objective(from_ints(&[1, 1]), true);
        problem.add_constraint(from_ints(&[1, 1]), Relation::Le, int(3));
        let (mut tableau, mut objective) = standard(&problem);
        let mut trace = Trace::new(true);

        let status = Engine::new().run(&mut tableau, &mut objective, &mut trace).unwrap();
        assert_eq!(status, SolutionStatus::InfiniteSolutions);
    }

    #[test]
    fn test_degenerate() {
        // max x1 + 2x2 s.t. x1 <= 0, x2 <= 2: x1 ends basic at zero
        let mut problem = Problem::new(2);
        problem.set_objective(from_ints(&[1, 2]), true);
        problem.add_constraint(from_ints(&[1, 0]), Relation::Le, int(0));
        problem.add_constraint(from_ints(&[0, 1]), Relation::Le, int(2));
        let (mut tableau, mut objective) = standard(&problem);
        let mut trace = Trace::new(true);

        let status = Engine::new().run(&mut tableau, &mut objective, &mut trace).unwrap();
        assert_eq!(status, SolutionStatus::Degenerate);
        assert_eq!(objective.rows[0].rhs(), &Param::constant(int(4)));
    }

    #[test]
    fn test_frozen_columns_never_enter() {
        let mut problem = Problem::new(2);
        problem.set_objective(from_ints(&[3, 2]), true);
        problem.add_constraint(from_ints(&[1, 1]), Relation::Le, int(4));
        let (mut tableau, mut objective) = standard(&problem);
        let x1 = tableau.variables[0].id;
        let mut trace = Trace::new(false);

        let status = Engine::new()
            .with_frozen(vec![x1])
            .run(&mut tableau, &mut objective, &mut trace)
            .unwrap();
        assert_eq!(status, SolutionStatus::Optimal);
        assert_eq!(tableau.basis_names(), vec!["x2"]);
        // only the initial and final snapshots without detail
        assert_eq!(trace.len(), 2);
    }

    #[test]
    fn test_drive_out_artificial_at_zero() {
        // max x1 s.t. -x1 = 0, x1 <= 5
        let mut problem = Problem::new(1);
        problem.set_objective(from_ints(&[1]), true);
        problem.add_constraint(from_ints(&[-1]), Relation::Eq, int(0));
        problem.add_constraint(from_ints(&[1]), Relation::Le, int(5));
        problem.set_method(ArtificialMethod::TwoPhase);
        let (mut tableau, mut objective) = standard(&problem);
        let mut trace = Trace::new(true);

        let moved = Engine::new()
            .drive_out(&mut tableau, &mut objective, &mut trace, 0)
            .unwrap();
        assert!(moved);
        assert_eq!(tableau.basis_names(), vec!["x1", "s2"]);
        assert_eq!(tableau.matrix.row(0), from_ints(&[1, 0, -1, 0]).as_slice());
        assert_eq!(tableau.matrix.rhs(1), &int(5));
        assert_eq!(
            trace.steps()[0].comment(),
            "Step 1:\nEntering variable x1 and leaving variable a1"
        );
    }

    #[test]
    fn test_drive_out_leaves_redundant_row() {
        // x1 + x2 = 2 twice: once R1 is pivoted, R2 holds only its artificial
        let mut problem = Problem::new(2);
        problem.set_objective(from_ints(&[1, 2]), true);
        problem.add_constraint(from_ints(&[1, 1]), Relation::Eq, int(2));
        problem.add_constraint(from_ints(&[1, 1]), Relation::Eq, int(2));
        problem.set_method(ArtificialMethod::TwoPhase);
        let (mut tableau, mut objective) = standard(&problem);
        let mut trace = Trace::new(false);
        let engine = Engine::new();

        assert!(engine.drive_out(&mut tableau, &mut objective, &mut trace, 0).unwrap());
        assert!(!engine.drive_out(&mut tableau, &mut objective, &mut trace, 1).unwrap());
        assert_eq!(tableau.basis_names(), vec!["x1", "a2"]);
        assert_eq!(tableau.matrix.row(1), from_ints(&[0, 0, -1, 1, 0]).as_slice());
    }

    #[test]
    fn test_pivot_on_zero_is_an_error() {
        let mut problem = Problem::new(2);
        problem.set_objective(from_ints(&[1, 1]), true);
        problem.add_constraint(from_ints(&[0, 1]), Relation::Le, int(4));
        let (mut tableau, mut objective) = standard(&problem);
        let mut trace = Trace::new(true);

        let err = Engine::new()
            .pivot(&mut tableau, &mut objective, &mut trace, 0, 0)
            .unwrap_err();
        assert_eq!(err, SolveError::PivotOnZero { row: 0, column: 0 });
    }
}
