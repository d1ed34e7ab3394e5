use num_traits::Signed;

use crate::error::InputShapeError;
use crate::number::Rational;

/// Represents a linear program or a goal program
#[derive(Debug, Clone)]
pub struct Problem {
    /// Objective function coefficients; absent under goal programming
    pub objective: Option<Vec<Rational>>,
    /// Whether to maximize (ignored under goal programming)
    pub maximize: bool,
    /// Hard constraints
    pub constraints: Vec<Constraint>,
    /// Soft goals, in priority order unless a goal carries an explicit priority
    pub goals: Vec<Goal>,
    /// One flag per decision variable; `false` marks a free variable
    pub restricted: Vec<bool>,
    /// How artificial variables are handled; required when a row needs one
    pub method: Option<ArtificialMethod>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    /// Coefficients for each decision variable
    pub coefficients: Vec<Rational>,
    /// Comparison operator
    pub relation: Relation,
    /// Right-hand side value
    pub rhs: Rational,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Goal {
    pub coefficients: Vec<Rational>,
    pub relation: Relation,
    /// Target value
    pub rhs: Rational,
    /// Priority level (1 is the highest); defaults to the goal's position
    pub priority: Option<usize>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Less than or equal (<=)
    #[cfg_attr(feature = "serde", serde(rename = "<=", alias = "≤", alias = "LEQ"))]
    Le,
    /// Equal (=)
    #[cfg_attr(feature = "serde", serde(rename = "=", alias = "==", alias = "EQU"))]
    Eq,
    /// Greater than or equal (>=)
    #[cfg_attr(feature = "serde", serde(rename = ">=", alias = "≥", alias = "GEQ"))]
    Ge,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtificialMethod {
    /// Penalize artificial variables with a free parameter M in the objective
    #[cfg_attr(feature = "serde", serde(rename = "BIG_M", alias = "M"))]
    BigM,
    /// Drive artificial variables to zero first, then optimize
    #[cfg_attr(feature = "serde", serde(rename = "TWO_PHASE", alias = "TP"))]
    TwoPhase,
}

impl Relation {
    /// Relation obtained by multiplying both sides by -1
    pub fn reversed(self) -> Self {
        match self {
            Relation::Le => Relation::Ge,
            Relation::Ge => Relation::Le,
            Relation::Eq => Relation::Eq,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Relation::Le => "<=",
            Relation::Eq => "=",
            Relation::Ge => ">=",
        }
    }
}

/// Flip a row with a negative RHS so that its RHS becomes non-negative
pub(crate) fn orient(
    coefficients: &[Rational],
    relation: Relation,
    rhs: &Rational,
) -> (Vec<Rational>, Relation, Rational) {
    if rhs.is_negative() {
        (
            coefficients.iter().map(|c| -c).collect(),
            relation.reversed(),
            -rhs,
        )
    } else {
        (coefficients.to_vec(), relation, rhs.clone())
    }
}

impl Constraint {
    /// Whether the row gets an artificial variable once its RHS is non-negative
    pub fn needs_artificial(&self) -> bool {
        let relation = if self.rhs.is_negative() {
            self.relation.reversed()
        } else {
            self.relation
        };
        relation != Relation::Le
    }
}

impl Problem {
    pub fn new(num_variables: usize) -> Self {
        Self {
            objective: None,
            maximize: true,
            constraints: Vec::new(),
            goals: Vec::new(),
            restricted: vec![true; num_variables],
            method: None,
        }
    }

    pub fn set_objective(&mut self, coefficients: Vec<Rational>, maximize: bool) {
        self.objective = Some(coefficients);
        self.maximize = maximize;
    }

    pub fn add_constraint(&mut self, coefficients: Vec<Rational>, relation: Relation, rhs: Rational) {
        self.constraints.push(Constraint {
            coefficients,
            relation,
            rhs,
        });
    }

    pub fn add_goal(&mut self, coefficients: Vec<Rational>, relation: Relation, rhs: Rational) {
        self.goals.push(Goal {
            coefficients,
            relation,
            rhs,
            priority: None,
        });
    }

    pub fn add_goal_with_priority(
        &mut self,
        coefficients: Vec<Rational>,
        relation: Relation,
        rhs: Rational,
        priority: usize,
    ) {
        self.goals.push(Goal {
            coefficients,
            relation,
            rhs,
            priority: Some(priority),
        });
    }

    /// Mark a decision variable as free (unrestricted in sign)
    pub fn set_unrestricted(&mut self, index: usize) {
        self.restricted[index] = false;
    }

    pub fn set_method(&mut self, method: ArtificialMethod) {
        self.method = Some(method);
    }

    pub fn num_variables(&self) -> usize {
        self.restricted.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_goal_programming(&self) -> bool {
        !self.goals.is_empty()
    }

    /// Priority level of each goal
    pub fn goal_priorities(&self) -> Vec<usize> {
        self.goals
            .iter()
            .enumerate()
            .map(|(i, g)| g.priority.unwrap_or(i + 1))
            .collect()
    }

    /// Check dimensions and arities before solving
    pub fn validate(&self) -> Result<(), InputShapeError> {
        let n = self.num_variables();
        if n == 0 {
            return Err(InputShapeError::NoVariables);
        }

        if !self.is_goal_programming() {
            let objective = self.objective.as_ref().ok_or(InputShapeError::MissingObjective)?;
            if objective.len() != n {
                return Err(InputShapeError::ObjectiveArity {
                    expected: n,
                    found: objective.len(),
                });
            }
        }

        for (row, c) in self.constraints.iter().enumerate() {
            if c.coefficients.len() != n {
                return Err(InputShapeError::ConstraintArity {
                    row,
                    expected: n,
                    found: c.coefficients.len(),
                });
            }
        }

        for (row, g) in self.goals.iter().enumerate() {
            if g.coefficients.len() != n {
                return Err(InputShapeError::GoalArity {
                    row,
                    expected: n,
                    found: g.coefficients.len(),
                });
            }
            if g.priority == Some(0) {
                return Err(InputShapeError::ZeroPriority { row });
            }
        }

        if self.method.is_none() {
            if let Some(row) = self.constraints.iter().position(Constraint::needs_artificial) {
                return Err(InputShapeError::MissingArtificialMethod { row });
            }
        }

        Ok(())
    }
}
