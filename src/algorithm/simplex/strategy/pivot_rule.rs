//! # Pivot rules
//!
//! Strategies for choosing the variable that enters the basis during primal optimization.
use crate::data::expression::LinearExpression;
use crate::data::number_types::numerical_precision::is_negative;
use crate::data::variable::Variable;

/// Deciding how to pivot.
///
/// During the Simplex method, one needs to decide how to move from basic solution to basic
/// solution. The pivot rule describes that behavior.
///
/// Once the column has been selected for a primal pivot (or the row for a dual pivot), a row
/// (column) needs to be found. This decision is made independent of the strategy, by the tableau.
pub trait PivotRule {
    /// Create a new instance.
    fn new() -> Self;

    /// Column selection rule for the primal Simplex method.
    ///
    /// # Arguments
    ///
    /// * `objective_row`: Row of the objective function that is being minimized. Its coefficients
    /// are the relative costs of the parametric variables.
    ///
    /// # Return value
    ///
    /// A pivotable variable with a negative relative cost and that cost, or `None` if the current
    /// basis is optimal.
    fn select_primal_pivot_column(&mut self, objective_row: &LinearExpression) -> Option<(Variable, f64)>;
}

/// Candidates for entering the basis, ordered by identifier.
fn profitable(objective_row: &LinearExpression) -> impl Iterator<Item = (Variable, f64)> + '_ {
    objective_row.terms()
        .filter(|&(variable, cost)| variable.is_pivotable() && is_negative(cost))
}

/// Simply pivot on the first column, which has a negative relative cost.
///
/// Columns are ordered by identifier, making this Bland's rule.
pub struct FirstProfitable;
impl PivotRule for FirstProfitable {
    fn new() -> Self {
        Self
    }

    fn select_primal_pivot_column(&mut self, objective_row: &LinearExpression) -> Option<(Variable, f64)> {
        profitable(objective_row).next()
    }
}

/// Pivot on the column with the most negative relative cost.
///
/// On ties, the variable with the lowest identifier is chosen.
pub struct SteepestDescentAlongVariable;
impl PivotRule for SteepestDescentAlongVariable {
    fn new() -> Self {
        Self
    }

    fn select_primal_pivot_column(&mut self, objective_row: &LinearExpression) -> Option<(Variable, f64)> {
        let mut smallest: Option<(Variable, f64)> = None;
        for (variable, cost) in profitable(objective_row) {
            if let Some((existing_variable, existing_cost)) = smallest.as_mut() {
                if cost < *existing_cost {
                    *existing_variable = variable;
                    *existing_cost = cost;
                }
            } else { smallest = Some((variable, cost)) }
        }

        smallest
    }
}

#[cfg(test)]
mod test {
    use crate::algorithm::simplex::strategy::pivot_rule::{FirstProfitable, PivotRule, SteepestDescentAlongVariable};
    use crate::data::expression::LinearExpression;
    use crate::data::variable::{Variable, VariableKind};

    fn objective_row() -> (LinearExpression, [Variable; 4]) {
        let a = Variable::of_kind(VariableKind::Error);
        let b = Variable::of_kind(VariableKind::Slack);
        let c = Variable::of_kind(VariableKind::Error);
        let d = Variable::of_kind(VariableKind::Dummy);

        let row = LinearExpression::new(10_f64) + a * 2_f64 - b - c * 3_f64 - d * 7_f64;
        (row, [a, b, c, d])
    }

    #[test]
    fn first_profitable() {
        let (row, [_, b, _, _]) = objective_row();
        assert_eq!(FirstProfitable::new().select_primal_pivot_column(&row), Some((b, -1_f64)));
    }

    #[test]
    fn steepest_descent() {
        let (row, [_, _, c, _]) = objective_row();
        assert_eq!(SteepestDescentAlongVariable::new().select_primal_pivot_column(&row), Some((c, -3_f64)));
    }

    #[test]
    fn ties_go_to_lowest_identifier() {
        let first = Variable::of_kind(VariableKind::Slack);
        let second = Variable::of_kind(VariableKind::Slack);
        let row = LinearExpression::new(0_f64) - second * 2_f64 - first * 2_f64;

        assert_eq!(SteepestDescentAlongVariable::new().select_primal_pivot_column(&row), Some((first, -2_f64)));
    }

    #[test]
    fn optimal() {
        let s = Variable::of_kind(VariableKind::Slack);
        let row = LinearExpression::new(0_f64) + s - Variable::new() * 1e-10;

        assert_eq!(FirstProfitable::new().select_primal_pivot_column(&row), None);
        assert_eq!(SteepestDescentAlongVariable::new().select_primal_pivot_column(&row), None);
    }
}
