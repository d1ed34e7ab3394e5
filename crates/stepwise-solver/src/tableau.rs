use num_traits::Zero;

use crate::matrix::AugmentedMatrix;
use crate::number::Rational;
use crate::variable::{VarId, Variable};

/// Constraint part of a simplex tableau together with its column variables
/// and the basic variable of every row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tableau {
    pub matrix: AugmentedMatrix,
    /// One variable per matrix column, in column order
    pub variables: Vec<Variable>,
    /// Basic variable of each matrix row
    pub basis: Vec<VarId>,
}

impl Tableau {
    pub fn row_count(&self) -> usize {
        self.matrix.row_count()
    }

    pub fn column_count(&self) -> usize {
        self.matrix.column_count()
    }

    pub fn column_of(&self, id: VarId) -> Option<usize> {
        self.variables.iter().position(|v| v.id == id)
    }

    pub fn variable(&self, column: usize) -> &Variable {
        &self.variables[column]
    }

    pub fn is_basic(&self, id: VarId) -> bool {
        self.basis.contains(&id)
    }

    /// Row in which `id` is basic
    pub fn basic_row(&self, id: VarId) -> Option<usize> {
        self.basis.iter().position(|&b| b == id)
    }

    /// Current value of a variable: its row's RHS when basic, zero otherwise
    pub fn value_of(&self, id: VarId) -> Rational {
        match self.basic_row(id) {
            Some(row) => self.matrix.rhs(row).clone(),
            None => Rational::zero(),
        }
    }

    /// Delete a variable's column. The variable must not be basic.
    pub fn remove_variable(&mut self, id: VarId) -> Option<usize> {
        debug_assert!(!self.is_basic(id));
        let column = self.column_of(id)?;
        self.matrix.remove_column(column);
        self.variables.remove(column);
        Some(column)
    }

    pub fn variable_names(&self) -> Vec<String> {
        self.variables.iter().map(Variable::name).collect()
    }

    pub fn basis_names(&self) -> Vec<String> {
        self.basis
            .iter()
            .map(|&id| match self.column_of(id) {
                Some(column) => self.variables[column].name(),
                None => format!("#{}", id.0),
            })
            .collect()
    }

    /// Display label of a constraint row
    pub fn row_label(row: usize) -> String {
        format!("R{}", row + 1)
    }
}
