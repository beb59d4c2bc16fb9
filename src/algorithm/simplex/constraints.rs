//! # Adding and removing constraints
//!
//! A constraint is rewritten in terms of the current parametric variables, extended with slack and
//! error variables, and then either added to the tableau directly or, if no suitable basic variable
//! can be found for it, through an artificial variable that is driven to zero.
use std::iter;

use log::{debug, trace};

use crate::algorithm::simplex::{EditInfo, SimplexSolver, StayInfo};
use crate::algorithm::simplex::strategy::pivot_rule::PivotRule;
use crate::data::constraint::{Constraint, ConstraintKind};
use crate::data::expression::LinearExpression;
use crate::data::number_types::numerical_precision::near_zero;
use crate::data::strength::Strength;
use crate::data::variable::{Variable, VariableKind};
use crate::error::{Difficulty, EditMisuse, Error, Explanation};

/// A constraint rewritten to become a row of the tableau.
struct NewRow {
    /// Equals zero, only mentions parametric variables and has a non-negative constant.
    expression: LinearExpression,
    /// Plus and minus error variables of a non-required equation.
    plus_minus: Option<(Variable, Variable)>,
}

impl<PR: PivotRule> SimplexSolver<PR> {
    /// Add a constraint to the solver.
    ///
    /// # Errors
    ///
    /// * `RequiredFailure` if a required constraint conflicts with the required constraints
    /// already present.
    /// * `TooDifficult` if the constraint can't be represented.
    /// * `EditMisuse` for an edit constraint that is required, or for a variable that is already
    /// being edited.
    /// * `DuplicateConstraint` if the constraint is already active.
    ///
    /// In all these cases, the solver is left as it was.
    pub fn add_constraint(&mut self, constraint: &Constraint) -> Result<(), Error> {
        self.check_addable(constraint)?;
        debug!("adding constraint {}", constraint);

        let NewRow { expression, plus_minus } = self.new_expression(constraint);
        if let Err(error) = self.insert_row(expression) {
            self.forget_constraint(constraint);
            debug!("could not add constraint {}: {}", constraint, error);
            return Err(error);
        }

        match (constraint.kind(), plus_minus) {
            (ConstraintKind::Edit(variable), Some((plus, minus))) => self.edit_infos.push(EditInfo {
                variable,
                constraint: constraint.clone(),
                plus,
                minus,
                previous_constant: constraint.expression().constant(),
            }),
            (ConstraintKind::Stay(_), Some((plus, minus))) => self.stay_error_variables.push(StayInfo {
                constraint: constraint.clone(),
                plus,
                minus,
            }),
            _ => {},
        }
        constraint.added_to_solver();
        self.needs_solving = true;

        self.autosolve()
    }

    /// Add a constraint, reporting whether it could be added instead of why not.
    ///
    /// # Return value
    ///
    /// `false` when the constraint was too difficult, conflicted with required constraints or was
    /// already present.
    ///
    /// # Errors
    ///
    /// Other errors, signaling misuse or bugs, are passed through.
    pub fn try_add_constraint(&mut self, constraint: &Constraint) -> Result<bool, Error> {
        match self.add_constraint(constraint) {
            Ok(()) => Ok(true),
            Err(Error::TooDifficult(_) | Error::RequiredFailure(_) | Error::DuplicateConstraint(_)) => Ok(false),
            Err(error) => Err(error),
        }
    }

    /// Remove a constraint from the solver.
    ///
    /// # Errors
    ///
    /// `ConstraintNotFound` if the constraint is not active in this solver.
    pub fn remove_constraint(&mut self, constraint: &Constraint) -> Result<(), Error> {
        self.remove_constraint_internal(constraint)?;
        self.autosolve()
    }

    /// Remove a constraint, reporting whether it was present instead of failing.
    ///
    /// # Errors
    ///
    /// Only errors signaling bugs are passed through.
    pub fn try_remove_constraint(&mut self, constraint: &Constraint) -> Result<bool, Error> {
        match self.remove_constraint(constraint) {
            Ok(()) => Ok(true),
            Err(Error::ConstraintNotFound(_)) => Ok(false),
            Err(error) => Err(error),
        }
    }

    /// Whether all error variables of an active constraint are zero.
    ///
    /// Required constraints are always satisfied.
    ///
    /// # Errors
    ///
    /// `ConstraintNotFound` if the constraint is not active in this solver.
    pub fn is_constraint_satisfied(&self, constraint: &Constraint) -> Result<bool, Error> {
        if !self.marker_variables.contains_key(constraint) {
            return Err(Error::ConstraintNotFound(constraint.clone()));
        }

        Ok(self.error_variables.get(constraint).is_none_or(|errors| self.errors_vanish(errors)))
    }

    /// Change the strength of a constraint.
    ///
    /// See `change_strength_and_weight`.
    pub fn change_strength(&mut self, constraint: &Constraint, strength: Strength) -> Result<(), Error> {
        self.change_strength_and_weight(constraint, strength, constraint.weight())
    }

    /// Change the weight of a constraint.
    ///
    /// See `change_strength_and_weight`.
    pub fn change_weight(&mut self, constraint: &Constraint, weight: f64) -> Result<(), Error> {
        self.change_strength_and_weight(constraint, constraint.strength(), weight)
    }

    /// Change the strength and weight of a constraint, which may be active in this solver.
    ///
    /// For an active constraint, the objective coefficients of its error variables are updated in
    /// place, after which the objective is optimized again.
    ///
    /// # Errors
    ///
    /// `TooDifficult` if the constraint is active and either the old or the new strength is
    /// required, or if the constraint is active in a different solver.
    pub fn change_strength_and_weight(
        &mut self,
        constraint: &Constraint,
        strength: Strength,
        weight: f64,
    ) -> Result<(), Error> {
        if !self.marker_variables.contains_key(constraint) {
            constraint.change_strength(strength)?;
            return constraint.change_weight(weight);
        }
        if constraint.is_required() || strength.is_required() {
            return Err(Error::TooDifficult(Difficulty::RequiredStrengthChange));
        }

        let old_coefficient = constraint.objective_coefficient();
        constraint.set_strength_and_weight(strength, weight);
        let delta = constraint.objective_coefficient() - old_coefficient;
        if near_zero(delta) {
            return Ok(());
        }

        let errors = self.error_variables.get(constraint).cloned().unwrap_or_default();
        for error in errors {
            self.add_to_objective(error, delta);
        }
        self.needs_solving = true;

        self.autosolve()
    }

    /// Add `coefficient` times an error variable to the objective, in terms of the parametric
    /// variables.
    fn add_to_objective(&mut self, error: Variable, coefficient: f64) {
        match self.tableau.row(error).cloned() {
            Some(row) => self.tableau.add_expression_to_row(self.objective, &row, coefficient),
            None => self.tableau.add_variable_to_row(self.objective, error, coefficient),
        }
    }

    fn check_addable(&self, constraint: &Constraint) -> Result<(), Error> {
        if self.marker_variables.contains_key(constraint) {
            return Err(Error::DuplicateConstraint(constraint.clone()));
        }
        if constraint.is_strict_inequality() {
            return Err(Error::TooDifficult(Difficulty::StrictInequality));
        }
        if !constraint.read_only_variables().is_empty() {
            return Err(Error::TooDifficult(Difficulty::ReadOnlyVariables));
        }
        if let Some(variable) = constraint.expression().variables().find(Variable::is_finite_domain) {
            return Err(Error::TooDifficult(Difficulty::UnusableVariable(variable)));
        }
        if let ConstraintKind::Edit(variable) = constraint.kind() {
            if constraint.is_required() {
                return Err(Error::EditMisuse(EditMisuse::RequiredStrength));
            }
            if self.edit_infos.iter().any(|info| info.variable == variable) {
                return Err(Error::EditMisuse(EditMisuse::AlreadyEditing(variable)));
            }
        }

        Ok(())
    }

    /// Rewrite a constraint in terms of the parametric variables.
    ///
    /// Basic variables are replaced by their rows. Inequalities get a slack variable, non-required
    /// constraints error variables that are added to the objective. The marker and error variables
    /// are registered for the constraint.
    fn new_expression(&mut self, constraint: &Constraint) -> NewRow {
        let original = constraint.expression();
        let mut expression = LinearExpression::new(original.constant());
        for (variable, coefficient) in original.terms() {
            match self.tableau.row(variable) {
                Some(row) => expression.add_expression(row, coefficient),
                None => expression.add_variable(variable, coefficient),
            };
        }

        let coefficient = constraint.objective_coefficient();
        let mut errors = Vec::new();
        let mut plus_minus = None;
        let marker = if constraint.is_inequality() {
            // expression - slack = 0, slack >= 0
            let slack = self.new_variable(VariableKind::Slack);
            expression.add_variable(slack, -1_f64);
            if !constraint.is_required() {
                let minus = self.new_variable(VariableKind::Error);
                expression.add_variable(minus, 1_f64);
                self.tableau.add_variable_to_row(self.objective, minus, coefficient);
                errors.push(minus);
            }
            slack
        } else if constraint.is_required() {
            let dummy = self.new_variable(VariableKind::Dummy);
            expression.add_variable(dummy, 1_f64);
            dummy
        } else {
            // expression - plus + minus = 0
            let plus = self.new_variable(VariableKind::Error);
            let minus = self.new_variable(VariableKind::Error);
            expression.add_variable(plus, -1_f64);
            expression.add_variable(minus, 1_f64);
            self.tableau.add_variable_to_row(self.objective, plus, coefficient);
            self.tableau.add_variable_to_row(self.objective, minus, coefficient);
            errors.extend([plus, minus]);
            plus_minus = Some((plus, minus));
            plus
        };

        self.marker_variables.insert(constraint.clone(), marker);
        self.marked_constraints.insert(marker, constraint.clone());
        if !errors.is_empty() {
            self.error_variables.insert(constraint.clone(), errors);
        }

        if expression.constant() < 0_f64 {
            expression.scale(-1_f64);
        }

        NewRow { expression, plus_minus }
    }

    /// Add a rewritten constraint as a row, directly if possible.
    fn insert_row(&mut self, mut expression: LinearExpression) -> Result<(), Error> {
        match self.choose_subject(&mut expression)? {
            Some(subject) => {
                trace!("adding row directly with subject {}", subject);
                expression.new_subject(subject);
                if self.tableau.has_column(subject) {
                    self.tableau.substitute_out(subject, &expression);
                }
                self.tableau.add_row(subject, expression);
                Ok(())
            },
            None => self.add_with_artificial_variable(expression),
        }
    }

    /// Find a variable to solve the expression for, such that the tableau stays feasible.
    ///
    /// Terms are considered in order of identifier. The first unrestricted variable is a valid
    /// subject, but a later unrestricted variable that is new to the solver is preferred. Without
    /// unrestricted variables, a new restricted variable with a negative coefficient is used; dummy
    /// variables are only used when the expression contains nothing else.
    ///
    /// # Return value
    ///
    /// `None` if an artificial variable is needed.
    ///
    /// # Errors
    ///
    /// A `RequiredFailure` when the expression consists of dummy variables only and has a nonzero
    /// constant: required equations contradict each other.
    fn choose_subject(&self, expression: &mut LinearExpression) -> Result<Option<Variable>, Error> {
        let mut subject = None;
        let mut found_unrestricted = false;
        let mut found_new_restricted = false;
        for (variable, coefficient) in expression.terms() {
            if found_unrestricted {
                if !variable.is_restricted() && !self.tableau.has_column(variable) {
                    return Ok(Some(variable));
                }
            } else if variable.is_restricted() {
                if !found_new_restricted
                    && !variable.is_dummy()
                    && coefficient < 0_f64
                    && self.tableau.is_new(variable, self.objective)
                {
                    subject = Some(variable);
                    found_new_restricted = true;
                }
            } else {
                subject = Some(variable);
                found_unrestricted = true;
            }
        }
        if subject.is_some() {
            return Ok(subject);
        }

        let mut subject_coefficient = 0_f64;
        for (variable, coefficient) in expression.terms() {
            if !variable.is_dummy() {
                return Ok(None);
            }
            if !self.tableau.has_column(variable) {
                subject = Some(variable);
                subject_coefficient = coefficient;
            }
        }
        if !near_zero(expression.constant()) {
            return Err(Error::RequiredFailure(self.explain(expression.variables())));
        }
        if subject_coefficient > 0_f64 {
            expression.scale(-1_f64);
        }

        Ok(subject)
    }

    /// Add a row through an artificial variable.
    ///
    /// The artificial variable equals the expression and is minimized. If it reaches zero, it is
    /// removed and the expression holds; otherwise the constraint is infeasible and all pivots
    /// performed are undone.
    fn add_with_artificial_variable(&mut self, expression: LinearExpression) -> Result<(), Error> {
        let artificial = self.new_variable(VariableKind::Artificial);
        let artificial_objective = self.new_variable(VariableKind::Objective);
        trace!("adding row with artificial variable {}", artificial);

        self.tableau.add_row(artificial_objective, expression.clone());
        self.tableau.add_row(artificial, expression);

        debug_assert!(self.journal.is_none());
        self.journal = Some(Vec::new());
        let probed = self.drive_to_zero(artificial, artificial_objective);
        let journal = self.journal.take().unwrap_or_default();

        if probed.is_err() {
            self.undo_pivots(journal)?;
            self.tableau.remove_row(artificial);
        }
        self.tableau.remove_row(artificial_objective);
        self.tableau.remove_column(artificial);

        probed
    }

    fn drive_to_zero(&mut self, artificial: Variable, artificial_objective: Variable) -> Result<(), Error> {
        self.optimize(artificial_objective)?;

        let row = self.tableau.row(artificial_objective)
            .ok_or(Error::InternalError("artificial objective has no row"))?;
        if !near_zero(row.constant()) {
            let explanation = self.explain(iter::once(artificial).chain(row.variables()));
            return Err(Error::RequiredFailure(explanation));
        }

        let Some(row) = self.tableau.row(artificial) else {
            return Ok(());
        };
        if row.is_constant() {
            self.tableau.remove_row(artificial);
            return Ok(());
        }
        match row.any_pivotable_variable()? {
            Some(entering) => self.pivot(entering, artificial),
            None => Err(Error::RequiredFailure(self.explain(iter::once(artificial).chain(row.variables())))),
        }
    }

    /// The required constraints marked by some of the given variables.
    fn explain<I: IntoIterator<Item = Variable>>(&self, variables: I) -> Explanation {
        if !self.config.explain_failures {
            return Explanation::default();
        }

        Explanation::new(variables.into_iter()
            .filter_map(|variable| self.marked_constraints.get(&variable))
            .filter(|constraint| constraint.is_required())
            .cloned())
    }

    /// Undo the registration of a constraint that could not be added.
    ///
    /// Its marker and error variables only appear in the objective, if at all.
    fn forget_constraint(&mut self, constraint: &Constraint) {
        if let Some(marker) = self.marker_variables.remove(constraint) {
            self.marked_constraints.remove(&marker);
            self.tableau.remove_column(marker);
        }
        for error in self.error_variables.remove(constraint).unwrap_or_default() {
            self.tableau.remove_column(error);
        }
    }

    /// Remove a constraint without optimizing afterwards.
    pub(super) fn remove_constraint_internal(&mut self, constraint: &Constraint) -> Result<(), Error> {
        let marker = *self.marker_variables.get(constraint)
            .ok_or_else(|| Error::ConstraintNotFound(constraint.clone()))?;
        debug!("removing constraint {}", constraint);

        self.needs_solving = true;

        let errors = self.error_variables.remove(constraint).unwrap_or_default();
        let coefficient = constraint.objective_coefficient();
        for &error in &errors {
            self.add_to_objective(error, -coefficient);
        }

        self.marker_variables.remove(constraint);
        self.marked_constraints.remove(&marker);
        if !self.tableau.is_basic(marker) {
            match self.tableau.select_marker_exit_row(marker, self.objective) {
                Some(leaving) => self.pivot(marker, leaving)?,
                None => self.tableau.remove_column(marker),
            }
        }
        self.tableau.remove_row(marker);
        for error in errors.into_iter().filter(|&error| error != marker) {
            if self.tableau.remove_row(error).is_none() {
                self.tableau.remove_column(error);
            }
        }

        match constraint.kind() {
            ConstraintKind::Stay(_) => self.stay_error_variables.retain(|info| &info.constraint != constraint),
            ConstraintKind::Edit(_) => self.edit_infos.retain(|info| &info.constraint != constraint),
            ConstraintKind::Equation | ConstraintKind::Inequality { .. } => {},
        }
        self.satisfaction.remove(constraint);
        constraint.removed_from_solver();

        Ok(())
    }
}
