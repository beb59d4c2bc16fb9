//! # Linear expressions
//!
//! An affine form `constant + sum(coefficient * variable)` with a sparse set of terms. Terms with a
//! coefficient that is zero up to the solver tolerance are never stored.
//!
//! Expressions serve two purposes: clients use them to state constraints, and the tableau uses
//! them as rows. When a row changes its set of terms, the tableau needs to know about it to keep
//! its column index exact; that is what the `_noting` variants of the mutating methods are for.
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FormatResult};
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use num_traits::Zero;

use crate::data::number_types::numerical_precision::near_zero;
use crate::data::variable::Variable;
use crate::error::Error;

/// Gets told about terms appearing in and disappearing from a row.
///
/// The tableau implements this to keep its column index in sync with its rows.
pub trait RowObserver {
    /// `variable` now has a nonzero coefficient in the row of `subject`.
    fn note_added_variable(&mut self, variable: Variable, subject: Variable);
    /// `variable` no longer appears in the row of `subject`.
    fn note_removed_variable(&mut self, variable: Variable, subject: Variable);
}

/// Sparse affine form over variables.
///
/// Terms are kept ordered by variable, so iteration order is deterministic.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct LinearExpression {
    constant: f64,
    terms: BTreeMap<Variable, f64>,
}

impl LinearExpression {
    /// An expression without any terms.
    pub fn new(constant: f64) -> Self {
        Self { constant, terms: BTreeMap::new() }
    }

    /// An expression with a single term.
    pub fn from_term(variable: Variable, coefficient: f64) -> Self {
        let mut expression = Self::zero();
        expression.add_variable(variable, coefficient);
        expression
    }

    /// The constant part.
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Overwrite the constant part.
    pub fn set_constant(&mut self, constant: f64) {
        self.constant = constant;
    }

    /// Add to the constant part.
    pub fn increment_constant(&mut self, delta: f64) {
        self.constant += delta;
    }

    /// All terms, ordered by variable.
    pub fn terms(&self) -> impl Iterator<Item = (Variable, f64)> + '_ {
        self.terms.iter().map(|(&variable, &coefficient)| (variable, coefficient))
    }

    /// All variables with a nonzero coefficient, ordered.
    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.terms.keys().copied()
    }

    /// Number of terms.
    pub fn nr_terms(&self) -> usize {
        self.terms.len()
    }

    /// Coefficient of a variable, zero if it doesn't appear.
    pub fn coefficient_for(&self, variable: Variable) -> f64 {
        self.terms.get(&variable).copied().unwrap_or(0_f64)
    }

    /// Whether a variable appears with a nonzero coefficient.
    pub fn contains(&self, variable: Variable) -> bool {
        self.terms.contains_key(&variable)
    }

    /// Whether the expression has no terms.
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// Multiply in place.
    ///
    /// Terms that become too small are dropped without notifying anyone, so this should not be
    /// called on an expression that is currently a row of a tableau.
    pub fn scale(&mut self, factor: f64) -> &mut Self {
        self.constant *= factor;
        self.terms.retain(|_, coefficient| {
            *coefficient *= factor;
            !near_zero(*coefficient)
        });
        self
    }

    /// Multiplied copy.
    pub fn times(&self, factor: f64) -> Self {
        let mut result = self.clone();
        result.scale(factor);
        result
    }

    /// Product of two expressions.
    ///
    /// # Errors
    ///
    /// `NonlinearExpression` if neither of the two is constant.
    pub fn times_expression(&self, other: &Self) -> Result<Self, Error> {
        if self.is_constant() {
            Ok(other.times(self.constant))
        } else if other.is_constant() {
            Ok(self.times(other.constant))
        } else {
            Err(Error::NonlinearExpression)
        }
    }

    /// Divided copy.
    ///
    /// # Errors
    ///
    /// `NonlinearExpression` when dividing by zero.
    pub fn divide(&self, divisor: f64) -> Result<Self, Error> {
        if near_zero(divisor) {
            Err(Error::NonlinearExpression)
        } else {
            Ok(self.times(1_f64 / divisor))
        }
    }

    /// Quotient of two expressions.
    ///
    /// # Errors
    ///
    /// `NonlinearExpression` if the divisor is not a nonzero constant.
    pub fn divide_expression(&self, divisor: &Self) -> Result<Self, Error> {
        if divisor.is_constant() {
            self.divide(divisor.constant)
        } else {
            Err(Error::NonlinearExpression)
        }
    }

    /// Add `multiplier` times `other` to this expression.
    pub fn add_expression(&mut self, other: &Self, multiplier: f64) -> &mut Self {
        self.constant += multiplier * other.constant;
        for (variable, coefficient) in other.terms() {
            self.add_variable(variable, multiplier * coefficient);
        }
        self
    }

    /// Add `multiplier` times `other` to the row of `subject`, reporting term changes.
    pub fn add_expression_noting<O: RowObserver>(
        &mut self,
        other: &Self,
        multiplier: f64,
        subject: Variable,
        observer: &mut O,
    ) -> &mut Self {
        self.constant += multiplier * other.constant;
        for (variable, coefficient) in other.terms() {
            self.add_variable_noting(variable, multiplier * coefficient, subject, observer);
        }
        self
    }

    /// Add a term, merging it with an existing term for the same variable.
    pub fn add_variable(&mut self, variable: Variable, coefficient: f64) -> &mut Self {
        self.merge_term(variable, coefficient);
        self
    }

    /// Add a term to the row of `subject`, reporting whether the variable appeared or vanished.
    pub fn add_variable_noting<O: RowObserver>(
        &mut self,
        variable: Variable,
        coefficient: f64,
        subject: Variable,
        observer: &mut O,
    ) -> &mut Self {
        match self.merge_term(variable, coefficient) {
            TermChange::Added => observer.note_added_variable(variable, subject),
            TermChange::Removed => observer.note_removed_variable(variable, subject),
            TermChange::Updated | TermChange::Unchanged => {},
        }
        self
    }

    fn merge_term(&mut self, variable: Variable, coefficient: f64) -> TermChange {
        match self.terms.get_mut(&variable) {
            Some(existing) => {
                let sum = *existing + coefficient;
                if near_zero(sum) {
                    self.terms.remove(&variable);
                    TermChange::Removed
                } else {
                    *existing = sum;
                    TermChange::Updated
                }
            },
            None if near_zero(coefficient) => TermChange::Unchanged,
            None => {
                self.terms.insert(variable, coefficient);
                TermChange::Added
            },
        }
    }

    /// Drop a term without notifying anyone, returning its coefficient.
    pub(crate) fn remove_variable(&mut self, variable: Variable) -> Option<f64> {
        self.terms.remove(&variable)
    }

    /// Replace `variable` by `expression` in the row of `subject`.
    ///
    /// # Arguments
    ///
    /// * `variable`: Should appear in this expression.
    /// * `expression`: What `variable` equals; may not contain `variable` itself.
    /// * `subject`: Basic variable of the row this expression is.
    /// * `observer`: Gets told about every term that appears or vanishes because of this.
    pub fn substitute_out<O: RowObserver>(
        &mut self,
        variable: Variable,
        expression: &Self,
        subject: Variable,
        observer: &mut O,
    ) {
        debug_assert!(!expression.contains(variable));

        if let Some(multiplier) = self.terms.remove(&variable) {
            self.add_expression_noting(expression, multiplier, subject, observer);
        }
    }

    /// Solve `old_subject = self` for `new_subject`, updating this expression in place.
    ///
    /// Before, this expression defines `old_subject` and contains `new_subject`. Afterwards it
    /// defines `new_subject` and contains `old_subject`.
    pub fn change_subject(&mut self, old_subject: Variable, new_subject: Variable) {
        let reciprocal = self.new_subject(new_subject);
        self.terms.insert(old_subject, reciprocal);
    }

    /// Solve `0 = self` for `subject`, which should appear in this expression.
    ///
    /// # Return value
    ///
    /// The reciprocal of the old coefficient of `subject`, which is the coefficient with which an
    /// old subject would appear in the result.
    pub fn new_subject(&mut self, subject: Variable) -> f64 {
        let coefficient = self.terms.remove(&subject).unwrap_or(1_f64);
        debug_assert!(!near_zero(coefficient));

        let reciprocal = 1_f64 / coefficient;
        self.scale(-reciprocal);
        reciprocal
    }

    /// Any variable in this expression that may enter the basis.
    ///
    /// The variable with the lowest identifier is returned, for reproducibility.
    ///
    /// # Errors
    ///
    /// An `InternalError` when called on a constant expression: there would be no sense in asking.
    pub fn any_pivotable_variable(&self) -> Result<Option<Variable>, Error> {
        if self.is_constant() {
            return Err(Error::InternalError("no pivotable variable in a constant expression"));
        }

        Ok(self.variables().find(Variable::is_pivotable))
    }

    /// Value of this expression for the given variable values.
    pub fn evaluate<V: Fn(Variable) -> f64>(&self, value_of: V) -> f64 {
        self.terms()
            .map(|(variable, coefficient)| coefficient * value_of(variable))
            .sum::<f64>() + self.constant
    }
}

enum TermChange {
    Added,
    Updated,
    Removed,
    Unchanged,
}

impl Zero for LinearExpression {
    fn zero() -> Self {
        Self::new(0_f64)
    }

    fn is_zero(&self) -> bool {
        self.is_constant() && near_zero(self.constant)
    }
}

impl From<f64> for LinearExpression {
    fn from(constant: f64) -> Self {
        Self::new(constant)
    }
}

impl From<Variable> for LinearExpression {
    fn from(variable: Variable) -> Self {
        Self::from_term(variable, 1_f64)
    }
}

impl<T: Into<LinearExpression>> AddAssign<T> for LinearExpression {
    fn add_assign(&mut self, rhs: T) {
        self.add_expression(&rhs.into(), 1_f64);
    }
}

impl<T: Into<LinearExpression>> SubAssign<T> for LinearExpression {
    fn sub_assign(&mut self, rhs: T) {
        self.add_expression(&rhs.into(), -1_f64);
    }
}

impl<T: Into<LinearExpression>> Add<T> for LinearExpression {
    type Output = Self;

    fn add(mut self, rhs: T) -> Self::Output {
        self += rhs;
        self
    }
}

impl<T: Into<LinearExpression>> Sub<T> for LinearExpression {
    type Output = Self;

    fn sub(mut self, rhs: T) -> Self::Output {
        self -= rhs;
        self
    }
}

impl Mul<f64> for LinearExpression {
    type Output = Self;

    fn mul(mut self, rhs: f64) -> Self::Output {
        self.scale(rhs);
        self
    }
}

impl Mul<LinearExpression> for f64 {
    type Output = LinearExpression;

    fn mul(self, rhs: LinearExpression) -> Self::Output {
        rhs * self
    }
}

impl Neg for LinearExpression {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self * -1_f64
    }
}

impl<T: Into<LinearExpression>> Add<T> for Variable {
    type Output = LinearExpression;

    fn add(self, rhs: T) -> Self::Output {
        LinearExpression::from(self) + rhs
    }
}

impl<T: Into<LinearExpression>> Sub<T> for Variable {
    type Output = LinearExpression;

    fn sub(self, rhs: T) -> Self::Output {
        LinearExpression::from(self) - rhs
    }
}

impl Mul<f64> for Variable {
    type Output = LinearExpression;

    fn mul(self, rhs: f64) -> Self::Output {
        LinearExpression::from_term(self, rhs)
    }
}

impl Mul<Variable> for f64 {
    type Output = LinearExpression;

    fn mul(self, rhs: Variable) -> Self::Output {
        LinearExpression::from_term(rhs, self)
    }
}

impl Neg for Variable {
    type Output = LinearExpression;

    fn neg(self) -> Self::Output {
        LinearExpression::from_term(self, -1_f64)
    }
}

impl Display for LinearExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        write!(f, "{}", self.constant)?;
        for (variable, coefficient) in self.terms() {
            write!(f, " + {}*{}", coefficient, variable)?;
        }
        Ok(())
    }
}
