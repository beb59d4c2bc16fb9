//! # Incremental simplex solver
//!
//! Constraints are rewritten into rows of a simplex tableau as they are added. Non-required
//! constraints get a pair of error variables that are weighted into an objective function; the
//! solver keeps the tableau at a feasible optimum of that objective.
//!
//! Adding or removing a constraint only touches the rows involved, after which the primal simplex
//! method restores optimality. Suggesting new values for edit variables only shifts row constants,
//! after which the dual simplex method restores feasibility.
use std::collections::{BTreeMap, HashMap};

use enum_map::EnumMap;
use num_traits::Zero;

use crate::algorithm::simplex::config::SolverConfig;
use crate::algorithm::simplex::listener::SolverListener;
use crate::algorithm::simplex::strategy::pivot_rule::{PivotRule, SteepestDescentAlongVariable};
use crate::algorithm::simplex::tableau::Tableau;
use crate::data::constraint::Constraint;
use crate::data::expression::LinearExpression;
use crate::data::number_types::numerical_precision::near_zero;
use crate::data::variable::{Variable, VariableKind};
use crate::error::Error;

pub mod config;
pub mod listener;
pub mod strategy;
pub mod tableau;

mod constraints;
mod edit;
mod optimize;

/// Solver for linear equalities and inequalities of different strengths.
///
/// The pivot rule decides which variable enters the basis during primal optimization.
pub struct SimplexSolver<PR = SteepestDescentAlongVariable> {
    tableau: Tableau,
    /// Basic variable of the objective function row.
    objective: Variable,
    /// Last values pushed to external variables.
    values: HashMap<Variable, f64>,

    /// Variable whose row represents a constraint, used to remove it again.
    marker_variables: BTreeMap<Constraint, Variable>,
    /// Inverse of `marker_variables`.
    marked_constraints: BTreeMap<Variable, Constraint>,
    /// Error variables of each non-required constraint, as they appear in the objective.
    error_variables: BTreeMap<Constraint, Vec<Variable>>,
    /// Plus and minus error variables of each stay.
    stay_error_variables: Vec<StayInfo>,
    /// Edit variables in the order they were added.
    edit_infos: Vec<EditInfo>,
    /// Number of edit variables at each `begin_edit` that hasn't been ended yet.
    edit_stack: Vec<usize>,

    /// Last reported satisfaction of each non-required constraint.
    satisfaction: BTreeMap<Constraint, bool>,
    needs_solving: bool,
    /// Pivots performed while probing, so they can be undone when the probe fails.
    journal: Option<Vec<(Variable, Variable)>>,

    statistics: Statistics,
    config: SolverConfig,
    listeners: Vec<Box<dyn SolverListener>>,
    pivot_rule: PR,
}

/// Bookkeeping for a variable that is being edited.
#[derive(Clone, Debug)]
struct EditInfo {
    variable: Variable,
    constraint: Constraint,
    plus: Variable,
    minus: Variable,
    /// Last value suggested.
    previous_constant: f64,
}

#[derive(Clone, Debug)]
struct StayInfo {
    constraint: Constraint,
    plus: Variable,
    minus: Variable,
}

/// Counters describing the work done by a solver.
#[derive(Clone, Debug, Default)]
pub struct Statistics {
    /// Internal variables created, per kind.
    pub variables_created: EnumMap<VariableKind, usize>,
    /// Pivots performed, including those that were undone.
    pub pivots: usize,
}

impl SimplexSolver {
    /// Create a new solver with the default configuration.
    pub fn new() -> Self {
        Self::with_config(SolverConfig::default())
    }

    /// Create a new solver.
    pub fn with_config(config: SolverConfig) -> Self {
        Self::with_pivot_rule(config)
    }
}

impl Default for SimplexSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl<PR: PivotRule> SimplexSolver<PR> {
    /// Create a new solver that uses a specific pivot rule.
    pub fn with_pivot_rule(config: SolverConfig) -> Self {
        let mut statistics = Statistics::default();
        let objective = Variable::of_kind(VariableKind::Objective);
        statistics.variables_created[VariableKind::Objective] += 1;

        let mut tableau = Tableau::new();
        tableau.add_row(objective, LinearExpression::zero());

        Self {
            tableau,
            objective,
            values: HashMap::new(),
            marker_variables: BTreeMap::new(),
            marked_constraints: BTreeMap::new(),
            error_variables: BTreeMap::new(),
            stay_error_variables: Vec::new(),
            edit_infos: Vec::new(),
            edit_stack: vec![0],
            satisfaction: BTreeMap::new(),
            needs_solving: false,
            journal: None,
            statistics,
            config,
            listeners: Vec::new(),
            pivot_rule: PR::new(),
        }
    }

    /// Current value of an external variable; zero if the solver never assigned one.
    pub fn value(&self, variable: Variable) -> f64 {
        self.values.get(&variable).copied().unwrap_or(0_f64)
    }

    /// Current value of the objective function, the weighted violation of non-required
    /// constraints.
    pub fn objective_value(&self) -> f64 {
        self.tableau.row(self.objective).map_or(0_f64, LinearExpression::constant)
    }

    /// Whether the constraint is active in this solver.
    pub fn contains_constraint(&self, constraint: &Constraint) -> bool {
        self.marker_variables.contains_key(constraint)
    }

    /// All constraints active in this solver, in order of creation.
    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.marker_variables.keys()
    }

    /// Whether the variable appears in the tableau.
    pub fn contains_variable(&self, variable: Variable) -> bool {
        self.tableau.contains_variable(variable)
    }

    /// Variables currently being edited, in the order they were added.
    pub fn edit_variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.edit_infos.iter().map(|info| info.variable)
    }

    #[allow(missing_docs)]
    pub fn nr_edit_variables(&self) -> usize {
        self.edit_infos.len()
    }

    /// Read-only access to the tableau.
    pub fn tableau(&self) -> &Tableau {
        &self.tableau
    }

    #[allow(missing_docs)]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    #[allow(missing_docs)]
    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Register a listener that gets told about values pushed to external variables.
    pub fn add_listener(&mut self, listener: Box<dyn SolverListener>) {
        self.listeners.push(listener);
    }

    /// Optimize and push values, if anything changed since the last time.
    ///
    /// Only needed when `autosolve` is disabled.
    pub fn solve(&mut self) -> Result<(), Error> {
        let infeasible = self.tableau.infeasible_rows().next().is_some();
        if infeasible {
            self.dual_optimize()?;
        }
        let needs_solving = self.needs_solving;
        if needs_solving {
            self.optimize(self.objective)?;
        }
        if infeasible || needs_solving {
            self.set_external_variables();
        }

        Ok(())
    }

    /// Turn solving after every change on or off.
    ///
    /// Turning it on solves right away.
    pub fn set_autosolve(&mut self, enabled: bool) -> Result<(), Error> {
        self.config.autosolve = enabled;
        if enabled {
            self.solve()
        } else {
            Ok(())
        }
    }

    /// Turn collecting explanations for required failures on or off.
    pub fn set_explain_failures(&mut self, enabled: bool) {
        self.config.explain_failures = enabled;
    }

    /// Turn resetting stay constants after each resolve on or off.
    ///
    /// Turning it on makes the current values the targets of all stays right away.
    pub fn set_auto_reset_stay_constants(&mut self, enabled: bool) {
        self.config.auto_reset_stay_constants = enabled;
        if enabled {
            self.reset_stay_constants();
        }
    }

    /// Push the values of the current basic solution to the external variables.
    ///
    /// Doesn't optimize: with `autosolve` disabled, a later `solve` still does.
    pub fn update_external_variables(&mut self) {
        let parametric = self.tableau.external_parametric_variables()
            .map(|variable| (variable, 0_f64));
        let basic = self.tableau.external_rows()
            .filter_map(|variable| self.tableau.row(variable).map(|row| (variable, row.constant())));
        let updates = parametric.chain(basic).collect::<Vec<_>>();

        for (variable, value) in updates {
            self.change_value(variable, value);
        }

        self.report_satisfaction();
        for listener in &mut self.listeners {
            listener.resolved();
        }
    }

    /// Optimize and push values if configured to do so after every change.
    fn autosolve(&mut self) -> Result<(), Error> {
        if self.config.autosolve {
            self.optimize(self.objective)?;
            self.set_external_variables();
        }

        Ok(())
    }

    fn new_variable(&mut self, kind: VariableKind) -> Variable {
        self.statistics.variables_created[kind] += 1;
        Variable::of_kind(kind)
    }

    /// Push the values of an optimal solution.
    ///
    /// Basic variables take the constant of their row, parametric ones are zero.
    fn set_external_variables(&mut self) {
        self.needs_solving = false;
        self.update_external_variables();
    }

    fn change_value(&mut self, variable: Variable, value: f64) {
        let previous = self.values.insert(variable, value);
        if previous != Some(value) {
            for listener in &mut self.listeners {
                listener.value_changed(variable, value);
            }
        }
    }

    /// Tell listeners about non-required constraints that became satisfied or violated.
    fn report_satisfaction(&mut self) {
        if self.listeners.is_empty() {
            return;
        }

        let states = self.error_variables.iter()
            .map(|(constraint, errors)| (constraint.clone(), self.errors_vanish(errors)))
            .collect::<Vec<_>>();
        for (constraint, satisfied) in states {
            if let Some(previous) = self.satisfaction.insert(constraint.clone(), satisfied) {
                if previous != satisfied {
                    for listener in &mut self.listeners {
                        listener.satisfaction_changed(&constraint, satisfied);
                    }
                }
            }
        }
    }

    /// Whether all of these error variables are zero in the current solution.
    fn errors_vanish(&self, errors: &[Variable]) -> bool {
        errors.iter()
            .all(|&error| self.tableau.row(error).is_none_or(|row| near_zero(row.constant())))
    }
}

#[cfg(test)]
mod test {
    use approx::assert_abs_diff_eq;

    use crate::algorithm::simplex::SimplexSolver;
    use crate::algorithm::simplex::config::SolverConfig;
    use crate::algorithm::simplex::strategy::pivot_rule::FirstProfitable;
    use crate::data::constraint::{Constraint, Relation};
    use crate::data::strength::{REQUIRED, STRONG, WEAK};
    use crate::data::variable::{Variable, VariableKind};
    use crate::error::Error;

    #[test]
    fn empty() {
        let mut solver = SimplexSolver::new();
        assert!(solver.solve().is_ok());
        assert_eq!(solver.objective_value(), 0_f64);
        assert_eq!(solver.value(Variable::new()), 0_f64);
        assert_eq!(solver.tableau().info().nr_rows, 1);
        assert_eq!(solver.statistics().variables_created[VariableKind::Objective], 1);
    }

    #[test]
    fn manual_solving() {
        let x = Variable::new();
        let mut solver = SimplexSolver::with_config(SolverConfig::new().with_autosolve(false));

        assert!(solver.add_constraint(&Constraint::fix(x, 3_f64)).is_ok());
        assert_eq!(solver.value(x), 0_f64);

        assert!(solver.solve().is_ok());
        assert_abs_diff_eq!(solver.value(x), 3_f64, epsilon = 1e-8);
    }

    #[test]
    fn set_autosolve_solves() {
        let x = Variable::new();
        let mut solver = SimplexSolver::with_config(SolverConfig::new().with_autosolve(false));

        assert!(solver.add_constraint(&Constraint::new(x, Relation::GreaterOrEqual, 4_f64, REQUIRED, 1_f64)).is_ok());
        assert!(solver.add_stay(x, WEAK, 1_f64).is_ok());
        assert!(solver.set_autosolve(true).is_ok());
        assert_abs_diff_eq!(solver.value(x), 4_f64, epsilon = 1e-8);
    }

    #[test]
    fn toggle_explanations() {
        let x = Variable::new();
        let mut solver = SimplexSolver::new();
        let one = Constraint::fix(x, 1_f64);
        let two = Constraint::fix(x, 2_f64);
        assert!(solver.add_constraint(&one).is_ok());

        solver.set_explain_failures(false);
        assert!(!solver.config().explain_failures);
        assert!(matches!(
            solver.add_constraint(&two),
            Err(Error::RequiredFailure(explanation)) if explanation.constraints().is_empty(),
        ));

        solver.set_explain_failures(true);
        assert!(matches!(
            solver.add_constraint(&two),
            Err(Error::RequiredFailure(explanation)) if explanation.contains(&one),
        ));
    }

    #[test]
    fn toggle_stay_reset() {
        let x = Variable::new();
        let y = Variable::new();
        let mut solver = SimplexSolver::with_config(SolverConfig::new().with_auto_reset_stay_constants(false));
        assert!(solver.add_constraint(&Constraint::new(x + y, Relation::Equal, 10_f64, REQUIRED, 1_f64)).is_ok());
        assert!(solver.add_point_stay((x, y), WEAK, 1_f64).is_ok());

        assert!(solver.add_edit_var(x, STRONG, 1_f64).is_ok());
        assert!(solver.begin_edit().is_ok());
        assert!(solver.resolve_with(&[7_f64]).is_ok());
        assert_abs_diff_eq!(solver.value(x), 7_f64, epsilon = 1e-8);
        assert!(solver.end_edit().is_ok());
        // The stays still hold on to the values from before the edit
        assert_abs_diff_eq!(solver.value(x), 0_f64, epsilon = 1e-8);
        assert_abs_diff_eq!(solver.value(y), 10_f64, epsilon = 1e-8);

        assert!(solver.add_edit_var(x, STRONG, 1_f64).is_ok());
        assert!(solver.begin_edit().is_ok());
        assert!(solver.resolve_with(&[7_f64]).is_ok());
        solver.set_auto_reset_stay_constants(true);
        assert!(solver.config().auto_reset_stay_constants);
        assert!(solver.end_edit().is_ok());
        assert_abs_diff_eq!(solver.value(x), 7_f64, epsilon = 1e-8);
        assert_abs_diff_eq!(solver.value(y), 3_f64, epsilon = 1e-8);
    }

    #[test]
    fn update_external_variables_without_solving() {
        let x = Variable::new();
        let mut solver = SimplexSolver::with_config(SolverConfig::new().with_autosolve(false));

        assert!(solver.add_constraint(&Constraint::fix(x, 3_f64)).is_ok());
        assert_eq!(solver.value(x), 0_f64);

        solver.update_external_variables();
        assert_abs_diff_eq!(solver.value(x), 3_f64, epsilon = 1e-8);
        assert!(solver.needs_solving);

        assert!(solver.solve().is_ok());
        assert!(!solver.needs_solving);
        assert_abs_diff_eq!(solver.value(x), 3_f64, epsilon = 1e-8);
    }

    #[test]
    fn other_pivot_rule() {
        let x = Variable::new();
        let y = Variable::new();
        let mut solver = SimplexSolver::<FirstProfitable>::with_pivot_rule(SolverConfig::default());

        assert!(solver.add_constraint(&Constraint::new(x + y, Relation::Equal, 10_f64, REQUIRED, 1_f64)).is_ok());
        assert!(solver.add_constraint(&Constraint::new(x, Relation::LessOrEqual, 4_f64, REQUIRED, 1_f64)).is_ok());
        assert!(solver.add_stay(y, WEAK, 1_f64).is_ok());
        assert!(solver.add_constraint(&Constraint::new(x, Relation::Equal, 4_f64, WEAK, 2_f64)).is_ok());

        assert_abs_diff_eq!(solver.value(x), 4_f64, epsilon = 1e-8);
        assert_abs_diff_eq!(solver.value(y), 6_f64, epsilon = 1e-8);
        assert!(solver.tableau().is_consistent());
    }
}
