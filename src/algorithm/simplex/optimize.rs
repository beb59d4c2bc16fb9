//! # Optimization
//!
//! Primal simplex iterations to reach an optimum from a feasible tableau, and dual simplex
//! iterations to reach feasibility again from an optimal tableau.
use log::{debug, trace};

use crate::algorithm::simplex::SimplexSolver;
use crate::algorithm::simplex::strategy::pivot_rule::PivotRule;
use crate::data::variable::Variable;
use crate::error::{Difficulty, Error};

impl<PR: PivotRule> SimplexSolver<PR> {
    /// Minimize the row of `objective` using the primal simplex method.
    ///
    /// The tableau should be feasible; it stays feasible.
    ///
    /// # Arguments
    ///
    /// * `objective`: Basic variable of the row to minimize. Either the objective function of the
    /// solver, or a temporary one used to drive an artificial variable to zero.
    ///
    /// # Errors
    ///
    /// An `InternalError` if the objective is unbounded. As all error variables are restricted,
    /// that can't happen for a consistent tableau.
    pub(super) fn optimize(&mut self, objective: Variable) -> Result<(), Error> {
        loop {
            let objective_row = self.tableau.row(objective)
                .ok_or(Error::InternalError("objective function has no row"))?;
            let Some((entering, cost)) = self.pivot_rule.select_primal_pivot_column(objective_row) else {
                return Ok(());
            };
            let leaving = self.tableau.select_primal_pivot_row(entering)
                .ok_or(Error::InternalError("objective function is unbounded"))?;

            trace!("primal pivot with relative cost {}", cost);
            self.pivot(entering, leaving)?;
        }
    }

    /// Restore feasibility of rows that were marked infeasible using the dual simplex method.
    ///
    /// The objective row should be dual feasible, that is, optimal apart from the infeasibility.
    ///
    /// # Errors
    ///
    /// A `TooDifficult` error if an infeasible row can't be fixed. In that case, all pivots are
    /// undone.
    pub(super) fn dual_optimize(&mut self) -> Result<(), Error> {
        debug_assert!(self.journal.is_none());
        self.journal = Some(Vec::new());
        let restored = self.restore_feasibility();
        let journal = self.journal.take().unwrap_or_default();

        if let Err(error) = restored {
            debug!("dual optimization failed after {} pivots: {}", journal.len(), error);
            self.undo_pivots(journal)?;
            self.tableau.recompute_infeasible_rows();
            return Err(error);
        }

        Ok(())
    }

    fn restore_feasibility(&mut self) -> Result<(), Error> {
        while let Some(leaving) = self.tableau.most_infeasible_row() {
            let entering = self.tableau.select_dual_pivot_column(leaving, self.objective)
                .ok_or(Error::TooDifficult(Difficulty::DualInfeasible(leaving)))?;

            trace!("dual pivot on infeasible row {}", leaving);
            self.pivot(entering, leaving)?;
        }

        Ok(())
    }

    /// Exchange a parametric variable and a basic variable.
    ///
    /// # Arguments
    ///
    /// * `entering`: Parametric variable that becomes basic.
    /// * `leaving`: Basic variable that becomes parametric. Its row should mention `entering`.
    pub(super) fn pivot(&mut self, entering: Variable, leaving: Variable) -> Result<(), Error> {
        trace!("pivot: {} enters, {} leaves", entering, leaving);

        let mut row = self.tableau.remove_row(leaving)
            .ok_or(Error::InternalError("leaving variable is not basic"))?;
        if !row.contains(entering) {
            self.tableau.add_row(leaving, row);
            return Err(Error::InternalError("entering variable is not in the row of the leaving variable"));
        }
        row.change_subject(leaving, entering);
        self.tableau.substitute_out(entering, &row);
        self.tableau.add_row(entering, row);

        self.statistics.pivots += 1;
        if let Some(journal) = self.journal.as_mut() {
            journal.push((entering, leaving));
        }
        debug_assert!(self.tableau.is_consistent());

        Ok(())
    }

    /// Undo pivots, most recent first.
    pub(super) fn undo_pivots(&mut self, journal: Vec<(Variable, Variable)>) -> Result<(), Error> {
        for (entering, leaving) in journal.into_iter().rev() {
            self.pivot(leaving, entering)?;
        }

        Ok(())
    }
}
