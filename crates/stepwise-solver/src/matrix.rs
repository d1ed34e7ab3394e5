use num_traits::Zero;

use crate::number::Rational;

/// Constraint rows of a tableau. Each stored row holds one coefficient per
/// variable column followed by the right-hand side.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AugmentedMatrix {
    rows: Vec<Vec<Rational>>,
    /// Number of variable columns (the RHS is not counted)
    columns: usize,
}

impl AugmentedMatrix {
    pub fn new(columns: usize) -> Self {
        Self {
            rows: Vec::new(),
            columns,
        }
    }

    /// Append a row. `coefficients` must have one entry per variable column.
    pub fn push_row(&mut self, coefficients: Vec<Rational>, rhs: Rational) {
        debug_assert_eq!(coefficients.len(), self.columns);
        let mut row = coefficients;
        row.push(rhs);
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns
    }

    pub fn get(&self, row: usize, column: usize) -> &Rational {
        &self.rows[row][column]
    }

    pub fn rhs(&self, row: usize) -> &Rational {
        &self.rows[row][self.columns]
    }

    /// Full row including the trailing RHS entry
    pub fn row(&self, row: usize) -> &[Rational] {
        &self.rows[row]
    }

    pub fn rows(&self) -> &[Vec<Rational>] {
        &self.rows
    }

    pub fn column(&self, column: usize) -> impl Iterator<Item = &Rational> + '_ {
        self.rows.iter().map(move |row| &row[column])
    }

    pub fn negated_column(&self, column: usize) -> Vec<Rational> {
        self.column(column).map(|value| -value).collect()
    }

    /// Insert a variable column at `at`, shifting later columns (and the RHS)
    /// right. `values` holds one entry per row.
    pub fn insert_column(&mut self, at: usize, values: Vec<Rational>) {
        debug_assert!(at <= self.columns);
        debug_assert_eq!(values.len(), self.rows.len());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.insert(at, value);
        }
        self.columns += 1;
    }

    /// Append a variable column just before the RHS
    pub fn push_column(&mut self, values: Vec<Rational>) {
        self.insert_column(self.columns, values);
    }

    /// Append a column that is zero everywhere except `sign` in `row`
    pub fn push_unit_column(&mut self, row: usize, sign: Rational) {
        let mut values = vec![Rational::zero(); self.rows.len()];
        values[row] = sign;
        self.push_column(values);
    }

    pub fn remove_column(&mut self, at: usize) {
        debug_assert!(at < self.columns);
        for row in &mut self.rows {
            row.remove(at);
        }
        self.columns -= 1;
    }

    /// Multiply every entry of a row, RHS included, by `factor`
    pub fn scale_row(&mut self, row: usize, factor: &Rational) {
        for value in &mut self.rows[row] {
            *value = &*value * factor;
        }
    }

    /// `target = target - factor * source`
    pub fn subtract_row_multiple(&mut self, target: usize, source: usize, factor: &Rational) {
        let source_row = self.rows[source].clone();
        for (value, source_value) in self.rows[target].iter_mut().zip(&source_row) {
            *value = &*value - factor * source_value;
        }
    }
}
