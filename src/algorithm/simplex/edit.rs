//! # Editing
//!
//! Stays keep variables where they are, edits move them around. Suggested values only shift the
//! constants of rows mentioning the error variables of an edit, after which the dual simplex
//! method restores feasibility. Edit sessions nest: every `begin_edit` remembers how many edit
//! variables existed, and the matching `end_edit` removes the ones added since.
use log::debug;

use crate::algorithm::simplex::SimplexSolver;
use crate::algorithm::simplex::strategy::pivot_rule::PivotRule;
use crate::data::constraint::Constraint;
use crate::data::number_types::numerical_precision::approx;
use crate::data::strength::{REQUIRED, STRONG, Strength};
use crate::data::variable::Variable;
use crate::error::{EditMisuse, Error};

impl<PR: PivotRule> SimplexSolver<PR> {
    /// Start editing a variable, from its current value.
    ///
    /// # Errors
    ///
    /// `EditMisuse` if the strength is required or the variable is already being edited.
    pub fn add_edit_var(&mut self, variable: Variable, strength: Strength, weight: f64) -> Result<Constraint, Error> {
        let constraint = Constraint::edit(variable, self.value(variable), strength, weight);
        self.add_constraint(&constraint)?;

        Ok(constraint)
    }

    /// Stop editing a variable.
    ///
    /// # Errors
    ///
    /// `EditMisuse` if the variable is not being edited.
    pub fn remove_edit_var(&mut self, variable: Variable) -> Result<(), Error> {
        let constraint = self.edit_infos.iter()
            .find(|info| info.variable == variable)
            .map(|info| info.constraint.clone())
            .ok_or(Error::EditMisuse(EditMisuse::NotAnEditVariable(variable)))?;

        self.remove_constraint(&constraint)
    }

    /// Remove the most recently added edit variables, until only `n` remain.
    pub fn remove_edit_vars_to(&mut self, n: usize) -> Result<(), Error> {
        while self.edit_infos.len() > n {
            let constraint = match self.edit_infos.last() {
                Some(info) => info.constraint.clone(),
                None => break,
            };
            self.remove_constraint(&constraint)?;
        }

        Ok(())
    }

    #[allow(missing_docs)]
    pub fn remove_all_edit_vars(&mut self) -> Result<(), Error> {
        self.remove_edit_vars_to(0)
    }

    /// Start an edit session for the edit variables added so far.
    ///
    /// # Errors
    ///
    /// `EditMisuse` if there are no edit variables.
    pub fn begin_edit(&mut self) -> Result<(), Error> {
        if self.edit_infos.is_empty() {
            return Err(Error::EditMisuse(EditMisuse::NoEditVariables));
        }

        self.tableau.clear_infeasible_rows();
        self.reset_stay_constants();
        self.edit_stack.push(self.edit_infos.len());
        debug!("edit session {} started with {} edit variables", self.edit_stack.len() - 1, self.edit_infos.len());

        Ok(())
    }

    /// End the innermost edit session.
    ///
    /// The current suggestions are resolved first. Edit variables added since the matching
    /// `begin_edit` are removed.
    ///
    /// # Errors
    ///
    /// `EditMisuse` if no session was started, or if all edit variables were removed during the
    /// session. The session is ended in the latter case.
    pub fn end_edit(&mut self) -> Result<(), Error> {
        if self.edit_stack.len() < 2 {
            return Err(Error::EditMisuse(EditMisuse::UnbalancedEndEdit));
        }
        if self.edit_infos.is_empty() {
            self.edit_stack.pop();
            self.tableau.clear_infeasible_rows();
            return Err(Error::EditMisuse(EditMisuse::NoEditVariables));
        }

        self.resolve()?;
        self.edit_stack.pop();
        let remaining = self.edit_stack.last().copied().unwrap_or(0);
        debug!("edit session {} ended", self.edit_stack.len());

        self.remove_edit_vars_to(remaining)
    }

    /// Whether an edit session is in progress.
    pub fn is_editing(&self) -> bool {
        self.edit_stack.len() > 1
    }

    /// Suggest a new value for an edit variable.
    ///
    /// Takes effect at the next `resolve`.
    ///
    /// # Errors
    ///
    /// `EditMisuse` outside of an edit session, or if the variable is not being edited.
    pub fn suggest_value(&mut self, variable: Variable, value: f64) -> Result<(), Error> {
        if !self.is_editing() {
            return Err(Error::EditMisuse(EditMisuse::NotEditing));
        }
        let info = self.edit_infos.iter_mut()
            .find(|info| info.variable == variable)
            .ok_or(Error::EditMisuse(EditMisuse::NotAnEditVariable(variable)))?;

        let delta = value - info.previous_constant;
        info.previous_constant = value;
        let (plus, minus) = (info.plus, info.minus);
        self.delta_edit_constant(delta, plus, minus);

        Ok(())
    }

    /// Shift the target of an edit by `delta`.
    ///
    /// The edit reads `plus - minus = target - variable`. If one of the error variables is basic,
    /// only its row changes; otherwise every row mentioning them does.
    fn delta_edit_constant(&mut self, delta: f64, plus: Variable, minus: Variable) {
        if self.tableau.increment_constant(plus, delta).is_some() {
            return;
        }
        if self.tableau.increment_constant(minus, -delta).is_some() {
            return;
        }

        let shifts = self.tableau.column(minus)
            .into_iter()
            .flatten()
            .filter_map(|&basic| self.tableau.row(basic).map(|row| (basic, row.coefficient_for(minus) * delta)))
            .collect::<Vec<_>>();
        for (basic, shift) in shifts {
            self.tableau.increment_constant(basic, shift);
        }
    }

    /// Restore feasibility after suggesting values and push the new values.
    ///
    /// # Errors
    ///
    /// `TooDifficult` if the suggestions can't be accommodated; the tableau is left as it was
    /// before resolving.
    pub fn resolve(&mut self) -> Result<(), Error> {
        self.dual_optimize()?;
        self.set_external_variables();
        self.tableau.clear_infeasible_rows();
        if self.config.auto_reset_stay_constants {
            self.reset_stay_constants();
        }

        Ok(())
    }

    /// Suggest values for all edit variables, in the order they were added, and resolve.
    ///
    /// # Errors
    ///
    /// `EditMisuse` outside of an edit session, `BadResolve` if the number of values doesn't
    /// match the number of edit variables.
    pub fn resolve_with(&mut self, values: &[f64]) -> Result<(), Error> {
        if !self.is_editing() {
            return Err(Error::EditMisuse(EditMisuse::NotEditing));
        }
        if values.len() != self.edit_infos.len() {
            return Err(Error::BadResolve { expected: self.edit_infos.len(), given: values.len() });
        }

        let variables = self.edit_variables().collect::<Vec<_>>();
        for (variable, &value) in variables.into_iter().zip(values) {
            self.suggest_value(variable, value)?;
        }

        self.resolve()
    }

    /// Make the current values the targets of all stays.
    ///
    /// The error variable of a stay that is basic is set to zero; if both are parametric, they
    /// are zero already.
    pub fn reset_stay_constants(&mut self) {
        for info in &self.stay_error_variables {
            if self.tableau.is_basic(info.plus) {
                self.tableau.set_constant(info.plus, 0_f64);
            } else if self.tableau.is_basic(info.minus) {
                self.tableau.set_constant(info.minus, 0_f64);
            }
        }
    }

    /// Keep a variable at its current value.
    ///
    /// # Errors
    ///
    /// A stay is never required, so this only fails on errors that signal bugs, or when the
    /// strength is required and the current value conflicts.
    pub fn add_stay(&mut self, variable: Variable, strength: Strength, weight: f64) -> Result<Constraint, Error> {
        let constraint = Constraint::stay(variable, self.value(variable), strength, weight);
        self.add_constraint(&constraint)?;

        Ok(constraint)
    }

    /// Keep both coordinates of a point at their current values.
    pub fn add_point_stay(
        &mut self,
        (x, y): (Variable, Variable),
        strength: Strength,
        weight: f64,
    ) -> Result<(Constraint, Constraint), Error> {
        let x_stay = self.add_stay(x, strength, weight)?;
        let y_stay = self.add_stay(y, strength, weight)?;

        Ok((x_stay, y_stay))
    }

    /// Keep points at their current values, earlier points with a lower weight.
    ///
    /// The weight starts at one and doubles for every next point.
    pub fn add_point_stays(
        &mut self,
        points: &[(Variable, Variable)],
        strength: Strength,
    ) -> Result<Vec<(Constraint, Constraint)>, Error> {
        let mut weight = 1_f64;
        let mut stays = Vec::with_capacity(points.len());
        for &point in points {
            stays.push(self.add_point_stay(point, strength, weight)?);
            weight *= 2_f64;
        }

        Ok(stays)
    }

    /// Require `variable >= lower`.
    pub fn add_lower_bound(&mut self, variable: Variable, lower: f64) -> Result<Constraint, Error> {
        let constraint = Constraint::inequality(variable - lower, REQUIRED, 1_f64);
        self.add_constraint(&constraint)?;

        Ok(constraint)
    }

    /// Require `variable <= upper`.
    pub fn add_upper_bound(&mut self, variable: Variable, upper: f64) -> Result<Constraint, Error> {
        let constraint = Constraint::inequality(-variable + upper, REQUIRED, 1_f64);
        self.add_constraint(&constraint)?;

        Ok(constraint)
    }

    /// Require `lower <= variable <= upper`.
    ///
    /// Either both bounds are added, or neither is.
    pub fn add_bounds(&mut self, variable: Variable, lower: f64, upper: f64) -> Result<(Constraint, Constraint), Error> {
        let lower_bound = self.add_lower_bound(variable, lower)?;
        match self.add_upper_bound(variable, upper) {
            Ok(upper_bound) => Ok((lower_bound, upper_bound)),
            Err(error) => {
                self.remove_constraint(&lower_bound)?;
                Err(error)
            },
        }
    }

    /// Make a variable known to the solver with a weak stay, if it isn't already.
    pub fn add_var(&mut self, variable: Variable) -> Result<(), Error> {
        if !self.contains_variable(variable) {
            self.add_stay(variable, Constraint::DEFAULT_STAY_STRENGTH, 1_f64)?;
        }

        Ok(())
    }

    /// Move a variable to a value, in a single edit session.
    ///
    /// Variables unknown to the solver simply take the value.
    pub fn set_edited_value(&mut self, variable: Variable, value: f64) -> Result<(), Error> {
        if !self.contains_variable(variable) {
            self.change_value(variable, value);
            return Ok(());
        }
        if approx(value, self.value(variable)) {
            return Ok(());
        }

        self.add_edit_var(variable, STRONG, 1_f64)?;
        self.begin_edit()?;
        self.suggest_value(variable, value)?;
        self.end_edit()
    }
}
