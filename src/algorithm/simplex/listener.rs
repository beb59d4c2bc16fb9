//! # Listeners
//!
//! Hooks through which the solver reports values it pushes to external variables. All methods have
//! empty default implementations, so a listener only implements what it is interested in.
use crate::data::constraint::Constraint;
use crate::data::variable::Variable;

/// Gets told about the results of solving.
pub trait SolverListener {
    /// The value of an external variable changed.
    fn value_changed(&mut self, _variable: Variable, _value: f64) {}

    /// All values have been pushed after solving or resolving.
    fn resolved(&mut self) {}

    /// A non-required constraint went from satisfied to violated or back.
    fn satisfaction_changed(&mut self, _constraint: &Constraint, _satisfied: bool) {}
}
