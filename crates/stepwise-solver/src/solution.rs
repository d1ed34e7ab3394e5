use std::fmt;

use num_traits::Zero;

use crate::normalize::DecisionColumns;
use crate::number::Rational;
use crate::objective::{ObjectiveRow, ObjectiveSet, RowParameter};
use crate::problem::Problem;
use crate::step::{Step, Trace};
use crate::tableau::Tableau;
use crate::variable::VarId;

/// The result of solving a problem
#[derive(Debug, Clone)]
pub struct Solution {
    /// Solution status
    pub status: SolutionStatus,
    /// Value of each original decision variable (`None` when infeasible)
    pub values: Option<Vec<Rational>>,
    /// Objective value or goal achievement
    pub outcome: Outcome,
    /// Column names of the terminal tableau
    pub variables: Vec<String>,
    /// Every recorded tableau, in order; the last one carries the summary
    pub steps: Vec<Step>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// A unique non-degenerate optimum was found
    Optimal,
    /// An artificial variable stayed positive: no feasible point exists
    Infeasible,
    /// Some improving direction has no leaving variable
    Unbounded,
    /// A non-basic column with zero reduced cost could still enter
    InfiniteSolutions,
    /// A basic variable sits at zero
    Degenerate,
}

impl fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SolutionStatus::Optimal => "Optimal",
            SolutionStatus::Infeasible => "Infeasible",
            SolutionStatus::Unbounded => "Unbounded",
            SolutionStatus::InfiniteSolutions => "Infinite solutions",
            SolutionStatus::Degenerate => "Degenerate",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Final objective value of a standard LP (`None` when infeasible)
    Objective(Option<Rational>),
    Goals(GoalReport),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GoalReport {
    /// Goal indices whose priority level is satisfied
    pub satisfied: Vec<usize>,
    pub unsatisfied: Vec<usize>,
    /// One entry per priority level, ascending
    pub levels: Vec<LevelReport>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelReport {
    pub priority: usize,
    /// Sum of penalized deviations left at this level
    pub deviation: Rational,
    pub satisfied: bool,
}

impl Solution {
    pub fn objective_value(&self) -> Option<&Rational> {
        match &self.outcome {
            Outcome::Objective(value) => value.as_ref(),
            Outcome::Goals(_) => None,
        }
    }

    pub fn goals(&self) -> Option<&GoalReport> {
        match &self.outcome {
            Outcome::Goals(report) => Some(report),
            Outcome::Objective(_) => None,
        }
    }

    /// Labels (`G1`, `G2`, ...) of satisfied goals
    pub fn goals_satisfied(&self) -> Vec<String> {
        self.goals().map(|r| goal_labels(&r.satisfied)).unwrap_or_default()
    }

    pub fn goals_unsatisfied(&self) -> Vec<String> {
        self.goals().map(|r| goal_labels(&r.unsatisfied)).unwrap_or_default()
    }

    /// Trailing summary
    pub fn summary(&self) -> &str {
        self.steps.last().map(Step::comment).unwrap_or_default()
    }
}

fn goal_labels(goals: &[usize]) -> Vec<String> {
    goals.iter().map(|g| format!("G{}", g + 1)).collect()
}

/// State a solve session halts in
pub(crate) struct Terminal<'a> {
    pub status: SolutionStatus,
    pub tableau: &'a Tableau,
    pub objective: &'a ObjectiveSet,
    pub decisions: &'a [DecisionColumns],
    /// Columns barred from entering during the last engine run
    pub frozen: &'a [VarId],
}

impl Terminal<'_> {
    fn decision_values(&self) -> Vec<Rational> {
        self.decisions
            .iter()
            .map(|columns| match *columns {
                DecisionColumns::Restricted(id) => self.tableau.value_of(id),
                DecisionColumns::Split { positive, negative } => {
                    self.tableau.value_of(positive) - self.tableau.value_of(negative)
                }
            })
            .collect()
    }

    /// A priority row is satisfied when no non-basic column could still
    /// improve it and nothing is left to improve. Hard constraints can block
    /// every improving column while a deviation remains.
    fn is_satisfied(&self, row: &ObjectiveRow) -> bool {
        if !row.rhs().coefficient.is_zero() {
            return false;
        }
        !self.tableau.variables.iter().enumerate().any(|(column, variable)| {
            !self.tableau.is_basic(variable.id)
                && !self.frozen.contains(&variable.id)
                && self.objective.sense.improves(&row.entries[column])
        })
    }

    fn goal_report(&self, priorities: &[usize]) -> GoalReport {
        if self.status == SolutionStatus::Infeasible {
            return GoalReport {
                satisfied: Vec::new(),
                unsatisfied: (0..priorities.len()).collect(),
                levels: Vec::new(),
            };
        }

        let levels: Vec<LevelReport> = self
            .objective
            .rows
            .iter()
            .filter_map(|row| match row.parameter {
                RowParameter::Priority(priority) => Some(LevelReport {
                    priority,
                    deviation: row.rhs().coefficient.clone(),
                    satisfied: self.is_satisfied(row),
                }),
                _ => None,
            })
            .collect();

        let mut report = GoalReport {
            levels,
            ..GoalReport::default()
        };
        for (goal, priority) in priorities.iter().enumerate() {
            let satisfied = report
                .levels
                .iter()
                .any(|level| level.priority == *priority && level.satisfied);
            if satisfied {
                report.satisfied.push(goal);
            } else {
                report.unsatisfied.push(goal);
            }
        }
        report
    }

    fn objective_value(&self, maximize: bool) -> Option<Rational> {
        if self.status == SolutionStatus::Infeasible {
            return None;
        }
        let rhs = &self.objective.rows.first()?.rhs().constant;
        Some(if maximize { rhs.clone() } else { -rhs })
    }
}

/// Read the terminal tableau back into original-variable values and append
/// the summary step.
pub(crate) fn extract_solution(problem: &Problem, terminal: Terminal<'_>, mut trace: Trace) -> Solution {
    let values = (terminal.status != SolutionStatus::Infeasible).then(|| terminal.decision_values());

    let outcome = if problem.is_goal_programming() {
        Outcome::Goals(terminal.goal_report(&problem.goal_priorities()))
    } else {
        Outcome::Objective(terminal.objective_value(problem.maximize))
    };

    let summary = summarize(terminal.status, &outcome, values.as_deref());
    trace.note(terminal.tableau, terminal.objective, summary);

    Solution {
        status: terminal.status,
        values,
        outcome,
        variables: terminal.tableau.variable_names(),
        steps: trace.into_steps(),
    }
}

fn summarize(status: SolutionStatus, outcome: &Outcome, values: Option<&[Rational]>) -> String {
    let mut lines = Vec::new();

    match (status, outcome) {
        (SolutionStatus::Infeasible, _) => lines.push("Problem is infeasible".to_string()),
        (SolutionStatus::Unbounded, _) => lines.push("Problem is unbounded".to_string()),
        (_, Outcome::Goals(report)) => {
            if !report.satisfied.is_empty() {
                lines.push(format!("Goals satisfied: {}", goal_labels(&report.satisfied).join(", ")));
            }
            if !report.unsatisfied.is_empty() {
                lines.push(format!("Goals unsatisfied: {}", goal_labels(&report.unsatisfied).join(", ")));
            }
        }
        (_, Outcome::Objective(value)) => {
            let value = value.clone().unwrap_or_else(Rational::zero);
            lines.push(match status {
                SolutionStatus::InfiniteSolutions => {
                    format!("Problem has infinitely many optimal solutions, one of them at z = {value}")
                }
                SolutionStatus::Degenerate => format!("Degenerate solution found at z = {value}"),
                _ => format!("Optimal solution found at z = {value}"),
            });
        }
    }

    if let Some(values) = values {
        let names: Vec<String> = (1..=values.len()).map(|i| format!("x{i}")).collect();
        let values: Vec<String> = values.iter().map(Rational::to_string).collect();
        lines.push(format!("Where ({}) = ({})", names.join(", "), values.join(", ")));
    }

    lines.join("\n")
}
