use num_traits::Zero;

use crate::number::{int, Param, Rational};
use crate::normalize::Deviation;
use crate::tableau::Tableau;
use crate::variable::VarId;

/// Direction the engine optimizes a set of objective rows in.
///
/// Rows are stored in `z - c.x = 0` form: under `Maximize` a negative entry
/// improves the objective, under `Minimize` a positive one does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Maximize,
    Minimize,
}

impl Sense {
    /// Whether a non-basic column with this entry would improve the row
    pub fn improves(self, entry: &Param) -> bool {
        match self {
            Sense::Maximize => entry.is_negative(),
            Sense::Minimize => entry.is_positive(),
        }
    }

    /// Sort key, smallest first = most improving
    pub(crate) fn improvement_key(self, entry: &Param) -> Param {
        match self {
            Sense::Maximize => entry.clone(),
            Sense::Minimize => -entry,
        }
    }
}

/// Free parameter carried by an objective row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowParameter {
    /// Plain exact numbers
    None,
    /// Big-M penalty
    BigM,
    /// Priority level `Pk`
    Priority(usize),
}

impl RowParameter {
    pub fn symbol(&self) -> String {
        match self {
            RowParameter::None | RowParameter::BigM => "M".to_string(),
            RowParameter::Priority(level) => format!("P{level}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectiveRow {
    pub label: String,
    pub parameter: RowParameter,
    /// One entry per tableau column followed by the RHS
    pub entries: Vec<Param>,
}

impl ObjectiveRow {
    fn zeros(label: impl Into<String>, parameter: RowParameter, columns: usize) -> Self {
        Self {
            label: label.into(),
            parameter,
            entries: vec![Param::zero(); columns + 1],
        }
    }

    pub fn rhs(&self) -> &Param {
        &self.entries[self.entries.len() - 1]
    }

    /// `self = self - factor * source` where `source` is a constraint row
    pub fn subtract_row_multiple(&mut self, source: &[Rational], factor: &Param) {
        for (entry, value) in self.entries.iter_mut().zip(source) {
            *entry = &*entry - &factor.scale(value);
        }
    }

    pub fn render(&self, column: usize) -> String {
        self.entries[column].render(&self.parameter.symbol())
    }
}

/// Ordered objective rows; row 0 has the highest priority
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectiveSet {
    pub sense: Sense,
    pub rows: Vec<ObjectiveRow>,
}

impl ObjectiveSet {
    /// Single `z` row for a standard LP.
    ///
    /// The engine maximizes, so the row holds `-c` for a maximization and `c`
    /// for a minimization. With `big_m` every artificial column holds `+M`.
    pub fn standard(tableau: &Tableau, coefficients: &[Rational], maximize: bool, big_m: &[VarId]) -> Self {
        let parameter = if big_m.is_empty() {
            RowParameter::None
        } else {
            RowParameter::BigM
        };
        let mut row = ObjectiveRow::zeros("z", parameter, tableau.column_count());
        for (entry, c) in row.entries.iter_mut().zip(coefficients) {
            *entry = Param::constant(if maximize { -c } else { c.clone() });
        }
        for &id in big_m {
            if let Some(column) = tableau.column_of(id) {
                row.entries[column] = Param::symbolic(int(1));
            }
        }

        Self {
            sense: Sense::Maximize,
            rows: vec![row],
        }
    }

    /// One row per distinct priority level, ascending, minimizing penalized
    /// deviations. `priorities[g]` is the level of goal `g`. With `big_m`, a
    /// feasibility row penalizing artificial variables sits above every level.
    pub fn goals(tableau: &Tableau, deviations: &[Deviation], priorities: &[usize], big_m: &[VarId]) -> Self {
        let columns = tableau.column_count();
        let mut rows = Vec::new();

        if !big_m.is_empty() {
            let mut row = ObjectiveRow::zeros("M", RowParameter::BigM, columns);
            for &id in big_m {
                if let Some(column) = tableau.column_of(id) {
                    row.entries[column] = Param::symbolic(int(-1));
                }
            }
            rows.push(row);
        }

        for level in distinct_levels(priorities) {
            let mut row = ObjectiveRow::zeros(format!("P{level}"), RowParameter::Priority(level), columns);
            for deviation in deviations.iter().filter(|d| d.penalized && priorities[d.goal] == level) {
                if let Some(column) = tableau.column_of(deviation.variable) {
                    row.entries[column] = Param::symbolic(int(-1));
                }
            }
            rows.push(row);
        }

        Self {
            sense: Sense::Minimize,
            rows,
        }
    }

    /// Temporary `r` row minimizing the sum of artificial variables
    pub fn phase_one(tableau: &Tableau, artificial: &[VarId]) -> Self {
        let mut row = ObjectiveRow::zeros("r", RowParameter::None, tableau.column_count());
        for &id in artificial {
            if let Some(column) = tableau.column_of(id) {
                row.entries[column] = Param::constant(int(-1));
            }
        }

        Self {
            sense: Sense::Minimize,
            rows: vec![row],
        }
    }

    pub fn remove_column(&mut self, at: usize) {
        for row in &mut self.rows {
            row.entries.remove(at);
        }
    }

    /// Whether column `column` is zero in every row strictly above `level`
    pub fn dominance_clear(&self, level: usize, column: usize) -> bool {
        self.rows[..level].iter().all(|row| row.entries[column].is_zero())
    }

    pub fn is_zero_column(&self, column: usize) -> bool {
        self.rows.iter().all(|row| row.entries[column].is_zero())
    }
}

/// Sorted distinct priority levels
pub fn distinct_levels(priorities: &[usize]) -> Vec<usize> {
    let mut levels = priorities.to_vec();
    levels.sort_unstable();
    levels.dedup();
    levels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::number::from_ints;
    use crate::problem::{ArtificialMethod, Problem, Relation};

    #[test]
    fn test_standard_row_signs() {
        let mut problem = Problem::new(2);
        problem.set_objective(from_ints(&[3, 2]), true);
        problem.add_constraint(from_ints(&[1, 1]), Relation::Le, int(4));
        let n = normalize(&problem).unwrap();

        let max = ObjectiveSet::standard(&n.tableau, n.objective.as_ref().unwrap(), true, &[]);
        let rendered: Vec<String> = (0..4).map(|c| max.rows[0].render(c)).collect();
        assert_eq!(rendered, vec!["-3", "-2", "0", "0"]);
        assert_eq!(max.sense, Sense::Maximize);

        let min = ObjectiveSet::standard(&n.tableau, n.objective.as_ref().unwrap(), false, &[]);
        assert_eq!(min.rows[0].entries[0], Param::constant(int(3)));
    }

    #[test]
    fn test_big_m_row() {
        let mut problem = Problem::new(1);
        problem.set_objective(from_ints(&[1]), false);
        problem.add_constraint(from_ints(&[1]), Relation::Ge, int(2));
        problem.set_method(ArtificialMethod::BigM);
        let n = normalize(&problem).unwrap();

        let set = ObjectiveSet::standard(&n.tableau, n.objective.as_ref().unwrap(), false, &n.artificial);
        assert_eq!(set.rows[0].parameter, RowParameter::BigM);
        assert_eq!(set.rows[0].render(2), "M");
        assert!(!Sense::Maximize.improves(&set.rows[0].entries[2]));
    }

    #[test]
    fn test_goal_rows_follow_priorities() {
        let mut problem = Problem::new(2);
        problem.add_goal_with_priority(from_ints(&[1, 1]), Relation::Ge, int(10), 2);
        problem.add_goal_with_priority(from_ints(&[1, 0]), Relation::Le, int(4), 1);
        problem.add_goal_with_priority(from_ints(&[0, 1]), Relation::Le, int(8), 2);
        let n = normalize(&problem).unwrap();
        let priorities = problem.goal_priorities();

        let set = ObjectiveSet::goals(&n.tableau, &n.deviations, &priorities, &[]);
        assert_eq!(set.sense, Sense::Minimize);
        let labels: Vec<&str> = set.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["P1", "P2"]);

        // P1 penalizes y2+, P2 penalizes y1- and y3+
        let names = n.tableau.variable_names();
        let penalized_in = |row: &ObjectiveRow| -> Vec<String> {
            row.entries[..names.len()]
                .iter()
                .enumerate()
                .filter(|(_, e)| !e.is_zero())
                .map(|(c, _)| names[c].clone())
                .collect()
        };
        assert_eq!(penalized_in(&set.rows[0]), vec!["y2+"]);
        assert_eq!(penalized_in(&set.rows[1]), vec!["y1-", "y3+"]);
        assert_eq!(set.rows[1].render(names.iter().position(|v| v == "y1-").unwrap()), "-P2");
    }

    #[test]
    fn test_phase_one_row() {
        let mut problem = Problem::new(1);
        problem.set_objective(from_ints(&[1]), true);
        problem.add_constraint(from_ints(&[1]), Relation::Eq, int(3));
        problem.add_constraint(from_ints(&[1]), Relation::Le, int(5));
        problem.set_method(ArtificialMethod::TwoPhase);
        let n = normalize(&problem).unwrap();

        let set = ObjectiveSet::phase_one(&n.tableau, &n.artificial);
        assert_eq!(n.tableau.variable_names(), vec!["x1", "s2", "a1"]);
        assert_eq!(set.rows[0].entries[2], Param::constant(int(-1)));
        assert!(set.rows[0].entries[0].is_zero());
        assert!(set.rows[0].rhs().is_zero());
    }

    #[test]
    fn test_dominance() {
        let mut set = ObjectiveSet {
            sense: Sense::Minimize,
            rows: vec![
                ObjectiveRow::zeros("P1", RowParameter::Priority(1), 2),
                ObjectiveRow::zeros("P2", RowParameter::Priority(2), 2),
            ],
        };
        set.rows[0].entries[1] = Param::symbolic(int(-1));
        assert!(set.dominance_clear(1, 0));
        assert!(!set.dominance_clear(1, 1));
        assert!(set.dominance_clear(0, 1));
        assert!(set.is_zero_column(0));
        assert_eq!(distinct_levels(&[3, 1, 3, 2]), vec![1, 2, 3]);
    }
}
