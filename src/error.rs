//! # Errors
//!
//! Everything that can go wrong while stating constraints or solving them. Every mutating solver
//! operation that returns an error has left the solver exactly as it was before the call.
use std::fmt::{Display, Formatter, Result as FormatResult};

use itertools::Itertools;
use thiserror::Error;

use crate::data::constraint::Constraint;
use crate::data::variable::Variable;

/// Error type for all solver operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The structural assumptions of the algorithm are violated.
    #[error("too difficult: {0}")]
    TooDifficult(Difficulty),
    /// A required constraint can't be satisfied together with the required constraints already
    /// in the solver.
    #[error("required constraint can't be satisfied, conflicting constraints: {0}")]
    RequiredFailure(Explanation),
    /// The constraint is not active in the solver.
    #[error("constraint not found: {0}")]
    ConstraintNotFound(Constraint),
    /// The constraint is already active in the solver.
    #[error("constraint already added: {0}")]
    DuplicateConstraint(Constraint),
    /// The edit protocol was used out of order.
    #[error("edit misuse: {0}")]
    EditMisuse(EditMisuse),
    /// The number of values to resolve with doesn't match the number of edit variables.
    #[error("{given} values given to resolve with, but there are {expected} edit variables")]
    BadResolve {
        #[allow(missing_docs)]
        expected: usize,
        #[allow(missing_docs)]
        given: usize,
    },
    /// An operation would have introduced a product of variables.
    #[error("expression would be nonlinear")]
    NonlinearExpression,
    /// An invariant of the algorithm doesn't hold; this is a bug.
    #[error("internal error: {0}")]
    InternalError(&'static str),
}

/// The reason a problem is too difficult.
#[derive(Error, Eq, PartialEq, Debug)]
pub enum Difficulty {
    /// Strict inequalities can't be represented.
    #[error("strict inequalities are not allowed")]
    StrictInequality,
    /// Read-only annotations are not supported by this solver.
    #[error("read-only variables are not allowed")]
    ReadOnlyVariables,
    /// The variable can't be used by this solver.
    #[error("variable {0} can't be used in this solver")]
    UnusableVariable(Variable),
    /// Dual optimization found an infeasible row without a variable to pivot on.
    #[error("no variable to restore feasibility of row {0}")]
    DualInfeasible(Variable),
    /// Strength or weight of an active constraint can only be changed through the solver.
    #[error("constraint is active in a solver")]
    ChangeWhileActive,
    /// Constraints can't be moved from or to the required strength while active.
    #[error("required strength can't be changed")]
    RequiredStrengthChange,
}

/// The ways in which the edit protocol can be misused.
#[derive(Error, Eq, PartialEq, Debug)]
pub enum EditMisuse {
    /// A suggestion was made for a variable that is not being edited.
    #[error("{0} is not an edit variable")]
    NotAnEditVariable(Variable),
    /// A variable can only be edited once at a time.
    #[error("{0} is already an edit variable")]
    AlreadyEditing(Variable),
    /// Edits need to be tradeable against other constraints.
    #[error("edit variables can't have the required strength")]
    RequiredStrength,
    /// Editing requires edit variables.
    #[error("there are no edit variables")]
    NoEditVariables,
    /// An edit session was ended that was never started.
    #[error("no edit session to end")]
    UnbalancedEndEdit,
    /// Values can only be suggested between beginning and ending an edit session.
    #[error("suggestion outside of an edit session")]
    NotEditing,
}

/// The constraints implicated in a required failure.
///
/// Ordered by creation, without duplicates. Empty when the solver was configured not to explain
/// failures.
#[derive(Eq, PartialEq, Debug, Default)]
pub struct Explanation {
    constraints: Vec<Constraint>,
}

impl Explanation {
    /// Collect constraints into an explanation.
    pub fn new<I: IntoIterator<Item = Constraint>>(constraints: I) -> Self {
        Self {
            constraints: constraints.into_iter().sorted().dedup().collect(),
        }
    }

    #[allow(missing_docs)]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    #[allow(missing_docs)]
    pub fn contains(&self, constraint: &Constraint) -> bool {
        self.constraints.binary_search(constraint).is_ok()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

impl Display for Explanation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        write!(f, "{{{}}}", self.constraints.iter().join(", "))
    }
}

#[cfg(test)]
mod test {
    use crate::data::constraint::Constraint;
    use crate::data::variable::Variable;
    use crate::error::{Difficulty, Error, Explanation};

    #[test]
    fn explanation_is_ordered_and_unique() {
        let x = Variable::new();
        let first = Constraint::fix(x, 1_f64);
        let second = Constraint::fix(x, 2_f64);

        let explanation = Explanation::new([second.clone(), first.clone(), second.clone()]);
        assert_eq!(explanation.constraints(), &[first.clone(), second.clone()]);
        assert!(explanation.contains(&first));
        assert!(!Explanation::default().contains(&first));
    }

    #[test]
    fn display() {
        let error = Error::TooDifficult(Difficulty::StrictInequality);
        assert_eq!(error.to_string(), "too difficult: strict inequalities are not allowed");

        let error = Error::BadResolve { expected: 2, given: 3 };
        assert_eq!(error.to_string(), "3 values given to resolve with, but there are 2 edit variables");
    }
}
