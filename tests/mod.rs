//! # Integration tests
//!
//! Integration tests completely external from the crate. All code written in this module could be
//! written by an external user of the crate.
use approx::assert_abs_diff_eq;
use test_log::test;

use cassowary::algorithm::simplex::SimplexSolver;
use cassowary::data::constraint::{Constraint, Relation};
use cassowary::data::expression::LinearExpression;
use cassowary::data::strength::{MEDIUM, REQUIRED, STRONG, Strength, SymbolicWeight, WEAK};
use cassowary::data::variable::Variable;
use cassowary::error::{Difficulty, Error};

/// A horizontal box: left edge, width and right edge of a child inside a parent of given width.
struct Child {
    left: Variable,
    width: Variable,
    right: Variable,
}

impl Child {
    fn new(solver: &mut SimplexSolver) -> Self {
        let child = Self { left: Variable::new(), width: Variable::new(), right: Variable::new() };
        let edges = Constraint::new(child.left + child.width, Relation::Equal, child.right, REQUIRED, 1_f64);
        assert!(solver.add_constraint(&edges).is_ok());
        assert!(solver.add_lower_bound(child.width, 0_f64).is_ok());

        child
    }
}

#[test]
fn two_columns() {
    let mut solver = SimplexSolver::new();
    let parent_width = Variable::new();
    assert!(solver.add_constraint(&Constraint::fix(parent_width, 100_f64)).is_ok());

    let first = Child::new(&mut solver);
    let second = Child::new(&mut solver);
    let gap = 10_f64;
    let constraints = [
        Constraint::fix(first.left, 0_f64),
        Constraint::new(first.right + gap, Relation::Equal, second.left, REQUIRED, 1_f64),
        Constraint::new(second.right, Relation::Equal, parent_width, REQUIRED, 1_f64),
        Constraint::new(first.width, Relation::Equal, second.width, STRONG, 1_f64),
        Constraint::new(first.width, Relation::GreaterOrEqual, 60_f64, MEDIUM, 1_f64),
        Constraint::new(first.width, Relation::Equal, second.width, WEAK, 1_f64),
    ];
    for constraint in &constraints {
        assert!(solver.add_constraint(constraint).is_ok());
    }

    assert_abs_diff_eq!(solver.value(first.width), 45_f64, epsilon = 1e-8);
    assert_abs_diff_eq!(solver.value(second.width), 45_f64, epsilon = 1e-8);
    assert_abs_diff_eq!(solver.value(second.left), 55_f64, epsilon = 1e-8);
    assert_eq!(solver.is_constraint_satisfied(&constraints[4]).ok(), Some(false));

    assert!(solver.remove_constraint(&constraints[3]).is_ok());
    assert_abs_diff_eq!(solver.value(first.width), 60_f64, epsilon = 1e-8);
    assert_abs_diff_eq!(solver.value(second.width), 30_f64, epsilon = 1e-8);
    assert!(solver.tableau().is_consistent());
}

#[test]
fn drag_with_limit() {
    let mut solver = SimplexSolver::new();
    let x = Variable::new();
    let y = Variable::new();

    assert!(solver.add_point_stay((x, y), WEAK, 1_f64).is_ok());
    assert!(solver.add_bounds(x, 0_f64, 50_f64).is_ok());
    assert!(solver.add_constraint(&Constraint::new(y, Relation::Equal, x * 2_f64, REQUIRED, 1_f64)).is_ok());

    assert!(solver.add_edit_var(x, Constraint::DEFAULT_EDIT_STRENGTH, 1_f64).is_ok());
    assert!(solver.begin_edit().is_ok());
    for (suggested, expected) in [(10_f64, 10_f64), (40_f64, 40_f64), (80_f64, 50_f64), (-5_f64, 0_f64)] {
        assert!(solver.resolve_with(&[suggested]).is_ok());
        assert_abs_diff_eq!(solver.value(x), expected, epsilon = 1e-8);
        assert_abs_diff_eq!(solver.value(y), 2_f64 * expected, epsilon = 1e-8);
    }
    assert!(solver.end_edit().is_ok());
    assert_abs_diff_eq!(solver.value(x), 0_f64, epsilon = 1e-8);
}

#[test]
fn expressions_are_normalized() {
    let x = Variable::new();
    let y = Variable::new();

    let expression = (x * 3_f64 + 2_f64) - (y - x) * 2_f64 + y * 2_f64;
    assert_eq!(expression.coefficient_for(x), 5_f64);
    assert!(!expression.contains(y));
    assert_eq!(expression.constant(), 2_f64);

    assert!(matches!(LinearExpression::from(x).times_expression(&LinearExpression::from(y)), Err(Error::NonlinearExpression)));
    assert!(LinearExpression::from(x).times_expression(&LinearExpression::new(4_f64)).is_ok());
}

#[test]
fn strength_hierarchy() {
    assert!(STRONG > MEDIUM && MEDIUM > WEAK);
    assert!(REQUIRED.is_required());
    assert!(REQUIRED.partial_cmp(&STRONG).is_none());

    let custom = Strength::new("custom", SymbolicWeight::new(0_f64, 5_f64, 0_f64));
    assert!(custom > MEDIUM && custom < STRONG);

    let x = Variable::new();
    let mut solver = SimplexSolver::new();
    assert!(solver.add_constraint(&Constraint::new(x, Relation::Equal, 1_f64, MEDIUM, 1_f64)).is_ok());
    assert!(solver.add_constraint(&Constraint::new(x, Relation::Equal, 2_f64, custom, 1_f64)).is_ok());
    assert_abs_diff_eq!(solver.value(x), 2_f64, epsilon = 1e-8);
}

#[test]
fn strict_inequalities_are_rejected() {
    let x = Variable::new();
    let mut solver = SimplexSolver::new();

    let strict = Constraint::new(x, Relation::Less, 3_f64, REQUIRED, 1_f64);
    assert!(strict.is_satisfied_by(|_| 2_f64));
    assert!(matches!(solver.add_constraint(&strict), Err(Error::TooDifficult(Difficulty::StrictInequality))));
    assert_eq!(solver.constraints().count(), 0);
}
