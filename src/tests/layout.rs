//! Two variables that should add up to a fixed total, as when dividing a window between two panes.
use approx::assert_abs_diff_eq;
use test_log::test;

use crate::algorithm::simplex::SimplexSolver;
use crate::data::constraint::{Constraint, Relation};
use crate::data::strength::{REQUIRED, STRONG, WEAK};
use crate::data::variable::Variable;

fn panes() -> (SimplexSolver, Variable, Variable) {
    let left = Variable::new();
    let right = Variable::new();
    let mut solver = SimplexSolver::new();

    assert!(solver.add_constraint(&Constraint::new(left + right, Relation::Equal, 10_f64, REQUIRED, 1_f64)).is_ok());
    assert!(solver.add_stay(left, WEAK, 1_f64).is_ok());
    assert!(solver.add_stay(right, WEAK, 1_f64).is_ok());

    (solver, left, right)
}

#[test]
fn initial_values() {
    let (solver, left, right) = panes();

    assert_abs_diff_eq!(solver.value(left), 0_f64, epsilon = 1e-8);
    assert_abs_diff_eq!(solver.value(right), 10_f64, epsilon = 1e-8);
    assert!(solver.tableau().is_consistent());
    assert!(solver.constraints().all(|constraint| {
        constraint.is_satisfied_by(|variable| solver.value(variable)) || !constraint.is_required()
    }));
}

#[test]
fn drag_divider() {
    let (mut solver, left, right) = panes();

    assert!(solver.add_edit_var(left, STRONG, 1_f64).is_ok());
    assert!(solver.begin_edit().is_ok());
    assert!(solver.suggest_value(left, 7_f64).is_ok());
    assert!(solver.resolve().is_ok());
    assert_abs_diff_eq!(solver.value(left), 7_f64, epsilon = 1e-8);
    assert_abs_diff_eq!(solver.value(right), 3_f64, epsilon = 1e-8);

    for position in [6_f64, 2_f64, 9_f64] {
        assert!(solver.resolve_with(&[position]).is_ok());
        assert_abs_diff_eq!(solver.value(left), position, epsilon = 1e-8);
        assert_abs_diff_eq!(solver.value(right), 10_f64 - position, epsilon = 1e-8);
    }

    assert!(solver.end_edit().is_ok());
    assert_eq!(solver.nr_edit_variables(), 0);
    assert_abs_diff_eq!(solver.value(left), 9_f64, epsilon = 1e-8);
    assert_abs_diff_eq!(solver.value(right), 1_f64, epsilon = 1e-8);
    assert!(solver.tableau().is_consistent());
    assert_eq!(solver.tableau().infeasible_rows().count(), 0);
}

#[test]
fn solving_twice_changes_nothing() {
    let (mut solver, left, right) = panes();
    let pivots = solver.statistics().pivots;

    assert!(solver.solve().is_ok());
    assert!(solver.solve().is_ok());

    assert_eq!(solver.statistics().pivots, pivots);
    assert_abs_diff_eq!(solver.value(left), 0_f64, epsilon = 1e-8);
    assert_abs_diff_eq!(solver.value(right), 10_f64, epsilon = 1e-8);
}

#[test]
fn unsatisfiable_preference_leaves_no_trace() {
    let (mut solver, left, right) = panes();
    let info = solver.tableau().info();

    let preference = Constraint::new(left, Relation::Equal, 4_f64, WEAK, 1_f64);
    assert!(solver.add_constraint(&preference).is_ok());
    assert_abs_diff_eq!(solver.value(left), 0_f64, epsilon = 1e-8);
    assert_eq!(solver.is_constraint_satisfied(&preference).ok(), Some(false));

    assert!(solver.remove_constraint(&preference).is_ok());
    assert_eq!(solver.tableau().info(), info);
    assert_abs_diff_eq!(solver.value(left), 0_f64, epsilon = 1e-8);
    assert_abs_diff_eq!(solver.value(right), 10_f64, epsilon = 1e-8);
    assert!(solver.tableau().is_consistent());
}

#[test]
fn removal_restores_values() {
    let (mut solver, left, right) = panes();
    let nr_rows = solver.tableau().info().nr_rows;

    let preference = Constraint::new(left, Relation::Equal, 4_f64, STRONG, 1_f64);
    assert!(solver.add_constraint(&preference).is_ok());
    assert_abs_diff_eq!(solver.value(left), 4_f64, epsilon = 1e-8);
    assert_abs_diff_eq!(solver.value(right), 6_f64, epsilon = 1e-8);

    assert!(solver.remove_constraint(&preference).is_ok());
    assert_eq!(solver.tableau().info().nr_rows, nr_rows);
    assert_abs_diff_eq!(solver.value(left), 0_f64, epsilon = 1e-8);
    assert_abs_diff_eq!(solver.value(right), 10_f64, epsilon = 1e-8);
    assert!(solver.constraints().all(|constraint| solver.is_constraint_satisfied(constraint).unwrap_or(false)));
}

#[test]
fn deterministic() {
    let run = || {
        let (mut solver, left, right) = panes();
        let center = Variable::new();
        assert!(solver.add_constraint(&Constraint::new(center * 2_f64, Relation::Equal, left + right, REQUIRED, 1_f64)).is_ok());
        assert!(solver.add_constraint(&Constraint::new(left, Relation::GreaterOrEqual, 3_f64, REQUIRED, 1_f64)).is_ok());
        assert!(solver.add_constraint(&Constraint::new(right, Relation::Equal, 8_f64, WEAK, 1_f64)).is_ok());
        assert!(solver.set_edited_value(left, 5_f64).is_ok());

        (
            [solver.value(left), solver.value(right), solver.value(center)],
            solver.statistics().pivots,
            solver.tableau().info(),
        )
    };

    let first = run();
    let second = run();
    assert_eq!(first, second);
    assert_abs_diff_eq!(first.0[0] + first.0[1], 10_f64, epsilon = 1e-8);
    assert_abs_diff_eq!(first.0[2], 5_f64, epsilon = 1e-8);
}
