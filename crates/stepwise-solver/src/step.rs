use num_traits::{One, Signed, Zero};

use crate::matrix::AugmentedMatrix;
use crate::number::{Param, Rational};
use crate::objective::{ObjectiveRow, ObjectiveSet};
use crate::tableau::Tableau;
use crate::variable::{VarId, Variable};

/// Entering column and leaving row of a pivot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pivot {
    pub entering: usize,
    pub leaving: usize,
}

/// Snapshot of the tableau. A pivot choice is recorded before the pivot;
/// row normalizations and eliminations are recorded after the operation,
/// so the snapshot shows its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    number: Option<usize>,
    variables: Vec<Variable>,
    objective: Vec<ObjectiveRow>,
    matrix: AugmentedMatrix,
    basis: Vec<VarId>,
    pivot: Option<Pivot>,
    comment: String,
}

impl Step {
    /// Position in the numbered sequence; `None` for initial, final and
    /// informational snapshots
    pub fn number(&self) -> Option<usize> {
        self.number
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn objective_rows(&self) -> &[ObjectiveRow] {
        &self.objective
    }

    pub fn matrix(&self) -> &AugmentedMatrix {
        &self.matrix
    }

    pub fn basis(&self) -> &[VarId] {
        &self.basis
    }

    pub fn pivot(&self) -> Option<Pivot> {
        self.pivot
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn variable_names(&self) -> Vec<String> {
        self.variables.iter().map(Variable::name).collect()
    }

    pub fn basis_names(&self) -> Vec<String> {
        self.basis
            .iter()
            .map(|id| {
                self.variables
                    .iter()
                    .find(|v| v.id == *id)
                    .map(Variable::name)
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Labels of every grid row: objective rows first, then `R1..Rm`
    pub fn row_labels(&self) -> Vec<String> {
        self.objective
            .iter()
            .map(|row| row.label.clone())
            .chain((0..self.matrix.row_count()).map(Tableau::row_label))
            .collect()
    }

    /// Whole tableau as text, objective rows on top, RHS last in each row
    pub fn grid(&self) -> Vec<Vec<String>> {
        let objective = self
            .objective
            .iter()
            .map(|row| (0..row.entries.len()).map(|c| row.render(c)).collect());
        let constraints = self
            .matrix
            .rows()
            .iter()
            .map(|row| row.iter().map(Rational::to_string).collect());
        objective.chain(constraints).collect()
    }
}

/// Append-only record of a solve session
#[derive(Debug, Clone, Default)]
pub struct Trace {
    steps: Vec<Step>,
    counter: usize,
    /// Record numbered intermediate steps
    detailed: bool,
}

impl Trace {
    pub fn new(detailed: bool) -> Self {
        Self {
            steps: Vec::new(),
            counter: 0,
            detailed,
        }
    }

    /// Record a numbered step
    pub(crate) fn step(&mut self, tableau: &Tableau, objective: &ObjectiveSet, pivot: Option<Pivot>, comment: String) {
        if !self.detailed {
            return;
        }
        self.counter += 1;
        let comment = format!("Step {}:\n{}", self.counter, comment);
        self.push(tableau, objective, Some(self.counter), pivot, comment);
    }

    /// Record an unnumbered snapshot. Always kept.
    pub(crate) fn note(&mut self, tableau: &Tableau, objective: &ObjectiveSet, comment: String) {
        self.push(tableau, objective, None, None, comment);
    }

    /// Record an unnumbered snapshot only in detailed mode
    pub(crate) fn detail(&mut self, tableau: &Tableau, objective: &ObjectiveSet, comment: String) {
        if self.detailed {
            self.push(tableau, objective, None, None, comment);
        }
    }

    fn push(
        &mut self,
        tableau: &Tableau,
        objective: &ObjectiveSet,
        number: Option<usize>,
        pivot: Option<Pivot>,
        comment: String,
    ) {
        self.steps.push(Step {
            number,
            variables: tableau.variables.clone(),
            objective: objective.rows.clone(),
            matrix: tableau.matrix.clone(),
            basis: tableau.basis.clone(),
            pivot,
            comment,
        });
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn into_steps(self) -> Vec<Step> {
        self.steps
    }
}

/// Descriptions of tableau operations
pub(crate) mod describe {
    use super::*;

    pub fn initial(title: Option<&str>) -> String {
        match title {
            Some(title) => format!("{title}: initial simplex tableau"),
            None => "Initial simplex tableau".to_string(),
        }
    }

    pub fn inconsistent_row(label: &str) -> String {
        format!("Row {label} is inconsistent")
    }

    pub fn pivot_element(entering: &Variable, leaving: &Variable) -> String {
        format!("Entering variable {entering} and leaving variable {leaving}")
    }

    /// `target = target - factor * source`, written with the sign folded in,
    /// e.g. `R2 = R2 - 3R1`, `z = z + R1`, `z = z - (M - 2)R1`
    pub fn row_operation(target: &str, source: &str, factor: &Param, symbol: &str) -> String {
        if factor.is_symbolic() && !factor.constant.is_zero() {
            return format!("{target} = {target} - ({}){source}", factor.render(symbol));
        }

        let (sign, magnitude) = if factor.is_negative() {
            ("+", -factor)
        } else {
            ("-", factor.clone())
        };
        let multiplier = if magnitude.is_symbolic() {
            magnitude.render(symbol)
        } else {
            scalar(&magnitude.constant)
        };
        format!("{target} = {target} {sign} {multiplier}{source}")
    }

    pub fn normalize_row(label: &str, pivot: &Rational) -> String {
        if pivot.is_negative() || !pivot.is_integer() {
            format!("{label} = {label} / ({pivot})")
        } else {
            format!("{label} = {label} / {pivot}")
        }
    }

    pub fn final_tableau(status: impl std::fmt::Display) -> String {
        format!("Final simplex tableau: {status}")
    }

    fn scalar(value: &Rational) -> String {
        if value.is_one() {
            String::new()
        } else if value.is_integer() {
            value.to_string()
        } else {
            format!("({value})")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::describe::*;
    use super::*;
    use crate::number::{int, ratio};

    #[test]
    fn test_row_operation_text() {
        assert_eq!(row_operation("R2", "R1", &Param::constant(int(3)), "M"), "R2 = R2 - 3R1");
        assert_eq!(row_operation("z", "R1", &Param::constant(int(-1)), "M"), "z = z + R1");
        assert_eq!(row_operation("R1", "R2", &Param::constant(ratio(1, 2)), "M"), "R1 = R1 - (1/2)R2");
        assert_eq!(row_operation("z", "R2", &Param::symbolic(int(-1)), "M"), "z = z + MR2");
        let mixed = Param {
            coefficient: int(1),
            constant: int(-2),
        };
        assert_eq!(row_operation("z", "R1", &mixed, "M"), "z = z - (M - 2)R1");
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_row("R1", &int(3)), "R1 = R1 / 3");
        assert_eq!(normalize_row("R1", &ratio(3, 2)), "R1 = R1 / (3/2)");
        assert_eq!(normalize_row("R1", &int(-2)), "R1 = R1 / (-2)");
    }
}
