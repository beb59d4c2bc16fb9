//! # Data structures for Simplex
//!
//! Contains the simplex tableau and logic for elementary operations which can be performed upon it.
//! The tableau is extended with supplementary data structures for efficiency.
//!
//! Rows map each basic variable to the expression that defines it in terms of parametric
//! variables. Columns are the transpose: for each parametric variable, the basic variables whose
//! row mentions it. The two are kept exactly in sync.
use std::collections::{BTreeMap, BTreeSet};
use std::mem;

use crate::data::expression::{LinearExpression, RowObserver};
use crate::data::number_types::numerical_precision::is_negative;
use crate::data::variable::Variable;

/// The most high-level data structure that is used by the Simplex algorithm: the Simplex tableau.
///
/// The objective function is a row as well, with an objective variable as its basic variable.
#[derive(Clone, Debug, Default)]
pub struct Tableau {
    /// Basic variable to the expression defining it.
    ///
    /// A basic variable never appears in its own row, nor in any other row.
    rows: BTreeMap<Variable, LinearExpression>,
    /// Parametric variable to the basic variables with a row mentioning it.
    ///
    /// Never contains empty sets.
    columns: BTreeMap<Variable, BTreeSet<Variable>>,

    /// Restricted basic variables whose row constant is negative.
    ///
    /// Only nonempty in between perturbing constants and dual optimization.
    infeasible_rows: BTreeSet<Variable>,
    /// External variables that are basic.
    external_rows: BTreeSet<Variable>,
    /// External variables that are parametric and appear in some row.
    external_parametric_variables: BTreeSet<Variable>,
}

/// Sizes of the different parts of the tableau.
#[allow(missing_docs)]
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct TableauInfo {
    pub nr_rows: usize,
    pub nr_columns: usize,
    pub nr_infeasible_rows: usize,
    pub nr_external_rows: usize,
    pub nr_external_parametric_variables: usize,
}

impl Tableau {
    /// Create an empty tableau.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a new row.
    ///
    /// # Arguments
    ///
    /// * `basic`: Variable that becomes basic. Should not be basic already.
    /// * `expression`: What `basic` equals; should only mention parametric variables.
    pub fn add_row(&mut self, basic: Variable, expression: LinearExpression) {
        debug_assert!(!self.is_basic(basic));
        debug_assert!(!expression.contains(basic));

        for variable in expression.variables() {
            self.columns.entry(variable).or_default().insert(basic);
            if variable.is_external() {
                self.external_parametric_variables.insert(variable);
            }
        }
        if basic.is_external() {
            self.external_rows.insert(basic);
            self.external_parametric_variables.remove(&basic);
        }

        self.rows.insert(basic, expression);
    }

    /// Detach a row.
    ///
    /// # Return value
    ///
    /// The expression that defined `basic`, or `None` if it wasn't basic.
    pub fn remove_row(&mut self, basic: Variable) -> Option<LinearExpression> {
        let expression = self.rows.remove(&basic)?;

        for variable in expression.variables() {
            self.note_removed_variable(variable, basic);
        }
        self.infeasible_rows.remove(&basic);
        if basic.is_external() {
            self.external_rows.remove(&basic);
        }

        Some(expression)
    }

    /// Delete all terms of a parametric variable that is being discarded.
    pub fn remove_column(&mut self, variable: Variable) {
        if let Some(column) = self.columns.remove(&variable) {
            for basic in column {
                if let Some(row) = self.rows.get_mut(&basic) {
                    row.remove_variable(variable);
                }
            }
        }
        if variable.is_external() {
            self.external_rows.remove(&variable);
            self.external_parametric_variables.remove(&variable);
        }
    }

    /// Replace a parametric variable by an expression in every row that mentions it.
    ///
    /// Restricted basic variables whose constant becomes negative are marked infeasible.
    pub fn substitute_out(&mut self, old: Variable, expression: &LinearExpression) {
        debug_assert!(!expression.contains(old));

        let column = self.columns.remove(&old).unwrap_or_default();
        for basic in column {
            self.update_row(basic, |row, tableau| row.substitute_out(old, expression, basic, tableau));
            if basic.is_restricted() && self.rows.get(&basic).is_some_and(|row| is_negative(row.constant())) {
                self.infeasible_rows.insert(basic);
            }
        }
        if old.is_external() {
            self.external_parametric_variables.remove(&old);
        }
    }

    /// Add a term to a row, keeping the columns up to date.
    pub fn add_variable_to_row(&mut self, basic: Variable, variable: Variable, coefficient: f64) {
        self.update_row(basic, |row, tableau| {
            row.add_variable_noting(variable, coefficient, basic, tableau);
        });
    }

    /// Add a multiple of an expression to a row, keeping the columns up to date.
    pub fn add_expression_to_row(&mut self, basic: Variable, expression: &LinearExpression, multiplier: f64) {
        self.update_row(basic, |row, tableau| {
            row.add_expression_noting(expression, multiplier, basic, tableau);
        });
    }

    /// Modify a row while the tableau observes changes in its terms.
    ///
    /// The row is temporarily swapped out, but its basic variable stays registered as basic.
    fn update_row<F: FnOnce(&mut LinearExpression, &mut Self)>(&mut self, basic: Variable, update: F) {
        if let Some(slot) = self.rows.get_mut(&basic) {
            let mut row = mem::take(slot);
            update(&mut row, self);
            if let Some(slot) = self.rows.get_mut(&basic) {
                *slot = row;
            }
        }
    }

    /// Shift the constant of a row.
    ///
    /// # Return value
    ///
    /// The new constant, or `None` if `basic` has no row.
    pub fn increment_constant(&mut self, basic: Variable, delta: f64) -> Option<f64> {
        let row = self.rows.get_mut(&basic)?;
        row.increment_constant(delta);
        let constant = row.constant();
        if basic.is_restricted() && is_negative(constant) {
            self.infeasible_rows.insert(basic);
        }
        Some(constant)
    }

    /// Overwrite the constant of a row, if `basic` has one.
    pub fn set_constant(&mut self, basic: Variable, constant: f64) {
        if let Some(row) = self.rows.get_mut(&basic) {
            row.set_constant(constant);
        }
    }

    /// Whether a variable is basic.
    pub fn is_basic(&self, variable: Variable) -> bool {
        self.rows.contains_key(&variable)
    }

    /// Whether a variable appears in any row.
    pub fn has_column(&self, variable: Variable) -> bool {
        self.columns.contains_key(&variable)
    }

    /// Whether the tableau knows about a variable at all.
    pub fn contains_variable(&self, variable: Variable) -> bool {
        self.is_basic(variable) || self.has_column(variable)
    }

    /// Whether a variable is only known to the objective function, if at all.
    pub fn is_new(&self, variable: Variable, objective: Variable) -> bool {
        match self.columns.get(&variable) {
            None => true,
            Some(column) => column.len() == 1 && column.contains(&objective),
        }
    }

    /// Row of a basic variable.
    pub fn row(&self, basic: Variable) -> Option<&LinearExpression> {
        self.rows.get(&basic)
    }

    /// All rows, ordered by basic variable.
    pub fn rows(&self) -> impl Iterator<Item = (Variable, &LinearExpression)> {
        self.rows.iter().map(|(&basic, row)| (basic, row))
    }

    /// Basic variables with a row mentioning `variable`.
    pub fn column(&self, variable: Variable) -> Option<&BTreeSet<Variable>> {
        self.columns.get(&variable)
    }

    /// External variables that are basic.
    pub fn external_rows(&self) -> impl Iterator<Item = Variable> + '_ {
        self.external_rows.iter().copied()
    }

    /// External variables that are parametric.
    pub fn external_parametric_variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.external_parametric_variables.iter().copied()
    }

    /// Restricted basic variables currently marked as having a negative value.
    pub fn infeasible_rows(&self) -> impl Iterator<Item = Variable> + '_ {
        self.infeasible_rows.iter().copied()
    }

    /// Forget about all rows marked infeasible.
    pub fn clear_infeasible_rows(&mut self) {
        self.infeasible_rows.clear();
    }

    /// Mark exactly the restricted rows with a negative constant as infeasible.
    pub fn recompute_infeasible_rows(&mut self) {
        self.infeasible_rows = self.rows.iter()
            .filter(|(basic, row)| basic.is_restricted() && is_negative(row.constant()))
            .map(|(&basic, _)| basic)
            .collect();
    }

    /// The marked row with the most negative constant.
    ///
    /// Marks that are no longer accurate, because the row was pivoted out or became feasible, are
    /// dropped.
    ///
    /// # Return value
    ///
    /// Basic variable of the row, ties going to the lowest identifier.
    pub fn most_infeasible_row(&mut self) -> Option<Variable> {
        let rows = &self.rows;
        self.infeasible_rows.retain(|basic| rows.get(basic).is_some_and(|row| is_negative(row.constant())));

        self.infeasible_rows.iter()
            .map(|&basic| (basic, rows.get(&basic).map_or(0_f64, LinearExpression::constant)))
            .min_by(|(_, left), (_, right)| left.total_cmp(right))
            .map(|(basic, _)| basic)
    }

    /// Ratio test for a primal pivot.
    ///
    /// Pivotable basic variables with a negative coefficient on the entering variable limit how
    /// far it can be increased. Dummy basic variables stand for required equations and have to
    /// stay at zero, so any dummy row mentioning the entering variable blocks it right away.
    ///
    /// # Arguments
    ///
    /// * `entering`: Parametric variable entering the basis.
    ///
    /// # Return value
    ///
    /// The basic variable that is the first to hit zero, ties going to the lowest identifier.
    /// `None` if the entering variable can be increased without bound.
    pub fn select_primal_pivot_row(&self, entering: Variable) -> Option<Variable> {
        let candidates = self.column_entries(entering)
            .filter_map(|(basic, constant, coefficient)| {
                if basic.is_dummy() {
                    Some((basic, 0_f64))
                } else if basic.is_pivotable() && coefficient < 0_f64 {
                    Some((basic, -constant / coefficient))
                } else {
                    None
                }
            });
        minimum_ratio(candidates)
    }

    /// Entering variable for a dual pivot on an infeasible row.
    ///
    /// Among the pivotable variables with a positive coefficient in the row, the one with the
    /// smallest ratio of objective coefficient to row coefficient keeps the objective row dual
    /// feasible.
    ///
    /// # Return value
    ///
    /// The entering variable, ties going to the lowest identifier. `None` if there is no variable
    /// that could make the row feasible.
    pub fn select_dual_pivot_column(&self, leaving: Variable, objective: Variable) -> Option<Variable> {
        let row = self.rows.get(&leaving)?;
        let objective_row = self.rows.get(&objective)?;

        let candidates = row.terms()
            .filter(|&(variable, coefficient)| variable.is_pivotable() && coefficient > 0_f64)
            .map(|(variable, coefficient)| (variable, objective_row.coefficient_for(variable) / coefficient));
        minimum_ratio(candidates)
    }

    /// Row to pivot out when a parametric marker variable needs to become basic to be removed.
    ///
    /// A dummy row comes first: its constant is zero, so pivoting through it changes no value and
    /// the dummy becomes parametric again. Then restricted rows with a negative coefficient on the
    /// marker, as those keep the tableau feasible. Otherwise any restricted row, and otherwise any
    /// row other than the objective function.
    ///
    /// # Return value
    ///
    /// `None` if the marker appears in no row other than the objective.
    pub fn select_marker_exit_row(&self, marker: Variable, objective: Variable) -> Option<Variable> {
        let candidates = || self.column_entries(marker)
            .filter(move |&(basic, _, _)| basic != objective);

        candidates()
            .find(|&(basic, _, _)| basic.is_dummy())
            .map(|(basic, _, _)| basic)
            .or_else(|| minimum_ratio(candidates()
                .filter(|&(basic, _, coefficient)| basic.is_restricted() && coefficient < 0_f64)
                .map(|(basic, constant, coefficient)| (basic, -constant / coefficient))))
            .or_else(|| minimum_ratio(candidates()
                .filter(|&(basic, _, _)| basic.is_restricted())
                .map(|(basic, constant, coefficient)| (basic, constant / coefficient))))
            .or_else(|| candidates().map(|(basic, _, _)| basic).next())
    }

    /// Basic variable, row constant and coefficient for each row mentioning `variable`.
    fn column_entries(&self, variable: Variable) -> impl Iterator<Item = (Variable, f64, f64)> + '_ {
        self.columns.get(&variable)
            .into_iter()
            .flatten()
            .filter_map(move |&basic| self.rows.get(&basic)
                .map(|row| (basic, row.constant(), row.coefficient_for(variable))))
    }

    /// Whether rows and columns are exactly in sync and the bookkeeping sets are accurate.
    ///
    /// Used in debug assertions and tests.
    pub fn is_consistent(&self) -> bool {
        let rows_match_columns = self.rows.iter().all(|(basic, row)| {
            !row.contains(*basic)
                && !self.columns.contains_key(basic)
                && row.variables().all(|variable| {
                    !self.rows.contains_key(&variable)
                        && self.columns.get(&variable).is_some_and(|column| column.contains(basic))
                })
        });
        let columns_match_rows = self.columns.iter().all(|(variable, column)| {
            !column.is_empty()
                && column.iter().all(|basic| self.rows.get(basic).is_some_and(|row| row.contains(*variable)))
        });
        let external_rows_accurate = self.external_rows.iter().all(|basic| self.rows.contains_key(basic))
            && self.rows.keys().filter(|basic| basic.is_external()).all(|basic| self.external_rows.contains(basic));
        let external_parametric_accurate = self.external_parametric_variables.iter()
            .all(|variable| variable.is_external() && !self.rows.contains_key(variable));

        rows_match_columns && columns_match_rows && external_rows_accurate && external_parametric_accurate
    }

    /// Sizes of the different parts of the tableau.
    pub fn info(&self) -> TableauInfo {
        TableauInfo {
            nr_rows: self.rows.len(),
            nr_columns: self.columns.len(),
            nr_infeasible_rows: self.infeasible_rows.len(),
            nr_external_rows: self.external_rows.len(),
            nr_external_parametric_variables: self.external_parametric_variables.len(),
        }
    }
}

impl RowObserver for Tableau {
    fn note_added_variable(&mut self, variable: Variable, subject: Variable) {
        self.columns.entry(variable).or_default().insert(subject);
        if variable.is_external() && !self.is_basic(variable) {
            self.external_parametric_variables.insert(variable);
        }
    }

    fn note_removed_variable(&mut self, variable: Variable, subject: Variable) {
        if let Some(column) = self.columns.get_mut(&variable) {
            column.remove(&subject);
            if column.is_empty() {
                self.columns.remove(&variable);
                self.external_parametric_variables.remove(&variable);
            }
        }
    }
}

/// Variable with the smallest ratio; the first one encountered on ties.
fn minimum_ratio<I: Iterator<Item = (Variable, f64)>>(candidates: I) -> Option<Variable> {
    candidates
        .min_by(|(_, left), (_, right)| left.total_cmp(right))
        .map(|(variable, _)| variable)
}
