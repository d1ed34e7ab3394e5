use log::{debug, info};

use crate::engine::Engine;
use crate::error::SolveError;
use crate::normalize::{normalize, Normalized};
use crate::objective::ObjectiveSet;
use crate::problem::{ArtificialMethod, Problem};
use crate::solution::{extract_solution, Solution, SolutionStatus, Terminal};
use crate::step::Trace;
use crate::tableau::Tableau;
use crate::variable::VarId;

/// Exact simplex solver. Every call to [`Solver::solve`] is an independent
/// session owning its tableau and trace.
#[derive(Debug, Clone)]
pub struct Solver {
    /// Record every intermediate step, not only initial/final snapshots
    record_steps: bool,
}

impl Default for Solver {
    fn default() -> Self {
        Self { record_steps: true }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trace(mut self, record_steps: bool) -> Self {
        self.record_steps = record_steps;
        self
    }

    /// Solve a standard LP or a goal program
    pub fn solve(&self, problem: &Problem) -> Result<Solution, SolveError> {
        let Normalized {
            mut tableau,
            objective: coefficients,
            decisions,
            artificial,
            deviations,
            ..
        } = normalize(problem)?;

        let big_m = if problem.method == Some(ArtificialMethod::BigM) {
            artificial.clone()
        } else {
            Vec::new()
        };
        let mut objective = if problem.is_goal_programming() {
            ObjectiveSet::goals(&tableau, &deviations, &problem.goal_priorities(), &big_m)
        } else {
            ObjectiveSet::standard(
                &tableau,
                coefficients.as_deref().unwrap_or_default(),
                problem.maximize,
                &big_m,
            )
        };

        let mut trace = Trace::new(self.record_steps);
        let two_phase = problem.method == Some(ArtificialMethod::TwoPhase) && !artificial.is_empty();

        let (status, frozen) = if two_phase {
            self.solve_two_phase(&mut tableau, &mut objective, &artificial, &mut trace)?
        } else {
            // Big-M carries its penalty in the objective: one run suffices
            let status = Engine::new().run(&mut tableau, &mut objective, &mut trace)?;
            (status, Vec::new())
        };

        let terminal = Terminal {
            status,
            tableau: &tableau,
            objective: &objective,
            decisions: &decisions,
            frozen: &frozen,
        };
        Ok(extract_solution(problem, terminal, trace))
    }

    /// Phase one minimizes the artificial variables. Unless that leaves one
    /// positive, artificial variables still basic at zero are pivoted out,
    /// the non-basic artificial columns are dropped and the real objective is
    /// optimized from the resulting basis.
    ///
    /// Returns the final status and the artificial variables kept in the
    /// basis of redundant rows, barred from entering during phase two.
    fn solve_two_phase(
        &self,
        tableau: &mut Tableau,
        objective: &mut ObjectiveSet,
        artificial: &[VarId],
        trace: &mut Trace,
    ) -> Result<(SolutionStatus, Vec<VarId>), SolveError> {
        let mut phase_one = ObjectiveSet::phase_one(tableau, artificial);
        let status = Engine::new()
            .with_title("Phase one")
            .run(tableau, &mut phase_one, trace)?;
        if status == SolutionStatus::Infeasible {
            info!("Phase one left an artificial variable positive");
            *objective = phase_one;
            return Ok((status, Vec::new()));
        }

        let engine = Engine::new();
        for row in 0..tableau.row_count() {
            if !artificial.contains(&tableau.basis[row]) {
                continue;
            }
            if !engine.drive_out(tableau, &mut phase_one, trace, row)? {
                debug!("{} is redundant, its artificial variable stays at zero", Tableau::row_label(row));
            }
        }

        let mut frozen = Vec::new();
        for &id in artificial {
            if tableau.is_basic(id) {
                frozen.push(id);
            } else if let Some(column) = tableau.remove_variable(id) {
                objective.remove_column(column);
            }
        }
        debug!(
            "Phase two: {} artificial columns removed, {} kept at zero",
            artificial.len() - frozen.len(),
            frozen.len()
        );

        let status = Engine::new()
            .with_title("Phase two")
            .with_frozen(frozen.clone())
            .run(tableau, objective, trace)?;
        Ok((status, frozen))
    }
}
