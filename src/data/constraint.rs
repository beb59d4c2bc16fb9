//! # Constraints
//!
//! Every constraint reduces to a normalized expression that should be equal to, or at least, zero.
//! Next to that it carries a strength, a weight to distinguish constraints of equal strength and a
//! set of read-only variables.
//!
//! Constraints are shared handles: the solver keeps clones to look up the internal variables it
//! created for them, and the client keeps one to remove the constraint again later.
use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt::{Debug, Display, Formatter, Result as FormatResult};
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use crate::data::expression::LinearExpression;
use crate::data::number_types::numerical_precision::{EPSILON, near_zero};
use crate::data::strength::{REQUIRED, STRONG, Strength, WEAK};
use crate::data::variable::Variable;
use crate::error::{Difficulty, Error};

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

/// How the two sides of a constraint relate.
#[allow(missing_docs)]
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum Relation {
    Equal,
    LessOrEqual,
    GreaterOrEqual,
    Less,
    Greater,
}

/// The different sorts of constraints.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum ConstraintKind {
    /// `expression == 0`
    Equation,
    /// `expression >= 0`, or `expression > 0` when strict.
    Inequality {
        /// Whether the expression should be strictly positive.
        strict: bool,
    },
    /// Drive a variable towards a suggested value.
    Edit(Variable),
    /// Keep a variable at its current value.
    Stay(Variable),
}

/// Shared handle to a constraint.
///
/// Equality, hashing and ordering are by identity: two constraints with the same expression are
/// still different constraints.
#[derive(Clone)]
pub struct Constraint(Rc<ConstraintData>);

struct ConstraintData {
    id: usize,
    kind: ConstraintKind,
    expression: LinearExpression,
    strength: Cell<Strength>,
    weight: Cell<f64>,
    read_only_variables: RefCell<BTreeSet<Variable>>,
    /// Number of solvers this constraint is currently active in.
    times_added: Cell<usize>,
}

impl Constraint {
    fn from_parts(kind: ConstraintKind, expression: LinearExpression, strength: Strength, weight: f64) -> Self {
        Self(Rc::new(ConstraintData {
            id: NEXT_ID.fetch_add(1, AtomicOrdering::Relaxed),
            kind,
            expression,
            strength: Cell::new(strength),
            weight: Cell::new(weight),
            read_only_variables: RefCell::new(BTreeSet::new()),
            times_added: Cell::new(0),
        }))
    }

    /// Relate two sides.
    ///
    /// # Arguments
    ///
    /// * `lhs`: Left hand side.
    /// * `relation`: How the left hand side relates to the right hand side.
    /// * `rhs`: Right hand side.
    /// * `strength`: How important it is to satisfy the constraint.
    /// * `weight`: Multiplier to distinguish constraints of the same strength, typically `1`.
    pub fn new(
        lhs: impl Into<LinearExpression>,
        relation: Relation,
        rhs: impl Into<LinearExpression>,
        strength: Strength,
        weight: f64,
    ) -> Self {
        let (lhs, rhs) = (lhs.into(), rhs.into());
        match relation {
            Relation::Equal => Self::equation(lhs - rhs, strength, weight),
            Relation::GreaterOrEqual => Self::inequality(lhs - rhs, strength, weight),
            Relation::LessOrEqual => Self::inequality(rhs - lhs, strength, weight),
            Relation::Greater => Self::strict_inequality(lhs - rhs, strength, weight),
            Relation::Less => Self::strict_inequality(rhs - lhs, strength, weight),
        }
    }

    /// `expression == 0`
    pub fn equation(expression: impl Into<LinearExpression>, strength: Strength, weight: f64) -> Self {
        Self::from_parts(ConstraintKind::Equation, expression.into(), strength, weight)
    }

    /// `expression >= 0`
    pub fn inequality(expression: impl Into<LinearExpression>, strength: Strength, weight: f64) -> Self {
        Self::from_parts(ConstraintKind::Inequality { strict: false }, expression.into(), strength, weight)
    }

    /// `expression > 0`
    ///
    /// These can be stated, but not added to the simplex solver.
    pub fn strict_inequality(expression: impl Into<LinearExpression>, strength: Strength, weight: f64) -> Self {
        Self::from_parts(ConstraintKind::Inequality { strict: true }, expression.into(), strength, weight)
    }

    /// Drive `variable` towards values suggested while editing, starting at `value`.
    pub fn edit(variable: Variable, value: f64, strength: Strength, weight: f64) -> Self {
        Self::from_parts(ConstraintKind::Edit(variable), LinearExpression::new(value) - variable, strength, weight)
    }

    /// Keep `variable` at `value`.
    pub fn stay(variable: Variable, value: f64, strength: Strength, weight: f64) -> Self {
        Self::from_parts(ConstraintKind::Stay(variable), LinearExpression::new(value) - variable, strength, weight)
    }

    /// `variable == value`, required.
    pub fn fix(variable: Variable, value: f64) -> Self {
        Self::equation(variable - value, REQUIRED, 1_f64)
    }

    /// Default strength for an edit constraint.
    pub const DEFAULT_EDIT_STRENGTH: Strength = STRONG;
    /// Default strength for a stay constraint.
    pub const DEFAULT_STAY_STRENGTH: Strength = WEAK;
    /// Default strength for a linear equation or inequality.
    pub const DEFAULT_LINEAR_STRENGTH: Strength = REQUIRED;

    /// Process-unique identifier.
    pub fn id(&self) -> usize {
        self.0.id
    }

    /// What sort of constraint this is.
    pub fn kind(&self) -> ConstraintKind {
        self.0.kind
    }

    /// The normalized expression, which should equal zero or be non-negative.
    pub fn expression(&self) -> &LinearExpression {
        &self.0.expression
    }

    #[allow(missing_docs)]
    pub fn strength(&self) -> Strength {
        self.0.strength.get()
    }

    #[allow(missing_docs)]
    pub fn weight(&self) -> f64 {
        self.0.weight.get()
    }

    /// Objective coefficient of the error variables of this constraint.
    pub(crate) fn objective_coefficient(&self) -> f64 {
        self.strength().symbolic_weight().as_f64() * self.weight()
    }

    #[allow(missing_docs)]
    pub fn is_required(&self) -> bool {
        self.strength().is_required()
    }

    /// Whether this constraint is of the form `expression >= 0` (or `> 0`).
    pub fn is_inequality(&self) -> bool {
        matches!(self.0.kind, ConstraintKind::Inequality { .. })
    }

    /// Whether this is a strict inequality, which the simplex solver can't represent.
    pub fn is_strict_inequality(&self) -> bool {
        self.0.kind == ConstraintKind::Inequality { strict: true }
    }

    #[allow(missing_docs)]
    pub fn is_edit(&self) -> bool {
        matches!(self.0.kind, ConstraintKind::Edit(_))
    }

    #[allow(missing_docs)]
    pub fn is_stay(&self) -> bool {
        matches!(self.0.kind, ConstraintKind::Stay(_))
    }

    /// The variable an edit or stay constraint is about.
    pub fn edit_or_stay_variable(&self) -> Option<Variable> {
        match self.0.kind {
            ConstraintKind::Edit(variable) | ConstraintKind::Stay(variable) => Some(variable),
            ConstraintKind::Equation | ConstraintKind::Inequality { .. } => None,
        }
    }

    /// Mark variables as read-only: the constraint may not change them.
    pub fn add_read_only_variables<I: IntoIterator<Item = Variable>>(&self, variables: I) {
        self.0.read_only_variables.borrow_mut().extend(variables);
    }

    /// Variables this constraint should not change.
    pub fn read_only_variables(&self) -> BTreeSet<Variable> {
        self.0.read_only_variables.borrow().clone()
    }

    #[allow(missing_docs)]
    pub fn is_read_only(&self, variable: Variable) -> bool {
        self.0.read_only_variables.borrow().contains(&variable)
    }

    /// Whether this constraint is currently active in a solver.
    pub fn is_in_solver(&self) -> bool {
        self.0.times_added.get() > 0
    }

    /// Change the strength.
    ///
    /// # Errors
    ///
    /// A `TooDifficult` error when the constraint is currently active in a solver; use the
    /// solver's method instead.
    pub fn change_strength(&self, strength: Strength) -> Result<(), Error> {
        if self.is_in_solver() {
            return Err(Error::TooDifficult(Difficulty::ChangeWhileActive));
        }
        self.0.strength.set(strength);
        Ok(())
    }

    /// Change the weight.
    ///
    /// # Errors
    ///
    /// A `TooDifficult` error when the constraint is currently active in a solver; use the
    /// solver's method instead.
    pub fn change_weight(&self, weight: f64) -> Result<(), Error> {
        if self.is_in_solver() {
            return Err(Error::TooDifficult(Difficulty::ChangeWhileActive));
        }
        self.0.weight.set(weight);
        Ok(())
    }

    pub(crate) fn set_strength_and_weight(&self, strength: Strength, weight: f64) {
        self.0.strength.set(strength);
        self.0.weight.set(weight);
    }

    pub(crate) fn added_to_solver(&self) {
        self.0.times_added.set(self.0.times_added.get() + 1);
    }

    pub(crate) fn removed_from_solver(&self) {
        debug_assert!(self.0.times_added.get() > 0);
        self.0.times_added.set(self.0.times_added.get().saturating_sub(1));
    }

    /// Whether the constraint holds for the given values, up to the solver tolerance.
    pub fn is_satisfied_by<V: Fn(Variable) -> f64>(&self, value_of: V) -> bool {
        let value = self.0.expression.evaluate(value_of);
        match self.0.kind {
            ConstraintKind::Inequality { strict: false } => value >= -EPSILON,
            ConstraintKind::Inequality { strict: true } => value > EPSILON,
            ConstraintKind::Equation | ConstraintKind::Edit(_) | ConstraintKind::Stay(_) => near_zero(value),
        }
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Constraint {}

impl Hash for Constraint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl PartialOrd for Constraint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Constraint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.id.cmp(&other.0.id)
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        write!(f, "{} w{{{}}} ", self.strength(), self.weight())?;
        match self.0.kind {
            ConstraintKind::Equation => write!(f, "({} = 0)", self.0.expression),
            ConstraintKind::Inequality { strict: false } => write!(f, "({} >= 0)", self.0.expression),
            ConstraintKind::Inequality { strict: true } => write!(f, "({} > 0)", self.0.expression),
            ConstraintKind::Edit(variable) => write!(f, "edit {}", variable),
            ConstraintKind::Stay(variable) => write!(f, "stay {}", variable),
        }
    }
}

impl Debug for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        write!(f, "Constraint#{}[{}]", self.0.id, self)
    }
}
