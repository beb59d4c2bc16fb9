//! # Variables
//!
//! A variable is a cheap, copyable handle to a numeric unknown. Identity is a process-unique
//! integer; the solver keeps the values, so handles can be shared freely.
//!
//! Variables created by client code are external. All other kinds are created by the solver while
//! it rewrites constraints into tableau rows and are never handed out.
use std::fmt::{Display, Formatter, Result as FormatResult};
use std::sync::atomic::{AtomicUsize, Ordering};

use enum_map::Enum;

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

/// The role a variable plays, which determines how the simplex method may treat it.
#[derive(Enum, Eq, PartialEq, Ord, PartialOrd, Hash, Copy, Clone, Debug)]
pub enum VariableKind {
    /// Real valued, visible to the client.
    External,
    /// Visible to the client, but only takes values from a finite domain.
    ///
    /// Such variables can't be handled by the simplex solver.
    FiniteDomain,
    /// Turns an inequality into an equation.
    Slack,
    /// Measures the violation of a non-required constraint, one for each direction.
    Error,
    /// Temporarily added to force a constraint into the tableau.
    Artificial,
    /// Marks a required equation; never pivoted on.
    Dummy,
    /// Basic variable of an objective function row.
    Objective,
}

impl VariableKind {
    fn prefix(self) -> &'static str {
        match self {
            VariableKind::External => "v",
            VariableKind::FiniteDomain => "f",
            VariableKind::Slack => "s",
            VariableKind::Error => "e",
            VariableKind::Artificial => "a",
            VariableKind::Dummy => "d",
            VariableKind::Objective => "z",
        }
    }
}

/// Handle to an unknown.
///
/// Equality, hashing and ordering only depend on the identifier. Because identifiers are handed
/// out in increasing order, the ordering is also the order of creation, which is what all
/// deterministic tie-breaking in the solver relies on.
#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Copy, Clone, Debug)]
pub struct Variable {
    id: usize,
    kind: VariableKind,
}

impl Variable {
    /// Create a new real valued variable.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self::of_kind(VariableKind::External)
    }

    /// Create a new variable that only takes values from a finite domain.
    pub fn finite_domain() -> Self {
        Self::of_kind(VariableKind::FiniteDomain)
    }

    pub(crate) fn of_kind(kind: VariableKind) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            kind,
        }
    }

    /// Process-unique identifier.
    pub fn id(&self) -> usize {
        self.id
    }

    /// What role this variable plays.
    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    /// Whether the variable is visible to the client of the solver.
    pub fn is_external(&self) -> bool {
        matches!(self.kind, VariableKind::External | VariableKind::FiniteDomain)
    }

    /// Whether the variable only takes values from a finite domain.
    pub fn is_finite_domain(&self) -> bool {
        self.kind == VariableKind::FiniteDomain
    }

    /// Whether this is a dummy variable, marking a required equation.
    pub fn is_dummy(&self) -> bool {
        self.kind == VariableKind::Dummy
    }

    /// Whether the variable may enter the basis.
    pub fn is_pivotable(&self) -> bool {
        matches!(self.kind, VariableKind::Slack | VariableKind::Error | VariableKind::Artificial)
    }

    /// Whether the variable is constrained to be non-negative.
    ///
    /// Only internal variables are restricted; external and objective variables are not.
    pub fn is_restricted(&self) -> bool {
        matches!(
            self.kind,
            VariableKind::Slack | VariableKind::Error | VariableKind::Artificial | VariableKind::Dummy,
        )
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        write!(f, "{}{}", self.kind.prefix(), self.id)
    }
}
