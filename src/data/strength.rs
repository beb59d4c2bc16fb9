//! # Strengths
//!
//! Non-required constraints are ranked by a symbolic weight: a vector of three levels that is
//! compared lexicographically, most significant level first. No amount of violation at a lower
//! level can make up for violation at a higher one.
//!
//! Required constraints are not ranked at all; the solver satisfies them exactly.
use std::cmp::Ordering;
use std::fmt::{Display, Formatter, Result as FormatResult};
use std::ops::{Add, Div, Mul, Neg, Sub};

use num_traits::Zero;

use crate::data::number_types::numerical_precision::approx;

/// Number of levels in a symbolic weight.
pub const NR_LEVELS: usize = 3;

/// Factor with which each level outweighs the next one when a symbolic weight is folded into a
/// single number.
const LEVEL_MULTIPLIER: f64 = 1000_f64;

/// Lexicographically ordered weight.
///
/// The derived ordering compares the levels element by element, first mismatch decides.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default)]
pub struct SymbolicWeight([f64; NR_LEVELS]);

impl SymbolicWeight {
    /// Create a new weight, levels from most to least significant.
    pub const fn new(first: f64, second: f64, third: f64) -> Self {
        Self([first, second, third])
    }

    /// The levels, most significant first.
    pub fn levels(&self) -> [f64; NR_LEVELS] {
        self.0
    }

    /// Fold the levels into a single number that is used as an objective coefficient.
    ///
    /// # Note
    ///
    /// The ordering is only preserved as long as each level stays below the level multiplier.
    pub fn as_f64(&self) -> f64 {
        self.0.iter().fold(0_f64, |total, &level| total * LEVEL_MULTIPLIER + level)
    }

    /// Whether all levels are equal up to the solver tolerance.
    pub fn approx_eq(&self, other: &Self) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(&left, &right)| approx(left, right))
    }

    /// Whether the first nonzero level is negative.
    pub fn is_negative(&self) -> bool {
        *self < Self::zero()
    }
}

impl Add for SymbolicWeight {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self([self.0[0] + rhs.0[0], self.0[1] + rhs.0[1], self.0[2] + rhs.0[2]])
    }
}

impl Sub for SymbolicWeight {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self + -rhs
    }
}

impl Neg for SymbolicWeight {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self * -1_f64
    }
}

impl Mul<f64> for SymbolicWeight {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0.map(|level| level * rhs))
    }
}

impl Div<f64> for SymbolicWeight {
    type Output = Self;

    fn div(self, rhs: f64) -> Self::Output {
        Self(self.0.map(|level| level / rhs))
    }
}

impl Zero for SymbolicWeight {
    fn zero() -> Self {
        Self::default()
    }

    fn is_zero(&self) -> bool {
        self.0.iter().all(Zero::is_zero)
    }
}

impl Display for SymbolicWeight {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        write!(f, "[{},{},{}]", self.0[0], self.0[1], self.0[2])
    }
}

/// How badly a constraint wants to be satisfied.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Strength {
    name: &'static str,
    symbolic_weight: SymbolicWeight,
    required: bool,
}

/// Must be satisfied exactly.
pub const REQUIRED: Strength = Strength {
    name: "required",
    symbolic_weight: SymbolicWeight::new(1000_f64, 1000_f64, 1000_f64),
    required: true,
};
/// Strongest non-required strength, used for edits by default.
pub const STRONG: Strength = Strength::new("strong", SymbolicWeight::new(1_f64, 0_f64, 0_f64));
/// In between.
pub const MEDIUM: Strength = Strength::new("medium", SymbolicWeight::new(0_f64, 1_f64, 0_f64));
/// Weakest strength, used for stays by default.
pub const WEAK: Strength = Strength::new("weak", SymbolicWeight::new(0_f64, 0_f64, 1_f64));

impl Strength {
    /// Create a new non-required strength.
    pub const fn new(name: &'static str, symbolic_weight: SymbolicWeight) -> Self {
        Self { name, symbolic_weight, required: false }
    }

    /// Human readable name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Weight used to rank this strength against other non-required strengths.
    pub fn symbolic_weight(&self) -> SymbolicWeight {
        self.symbolic_weight
    }

    /// Whether constraints of this strength need to be satisfied exactly.
    pub fn is_required(&self) -> bool {
        self.required
    }
}

/// Required strengths are incomparable with all other strengths.
impl PartialOrd for Strength {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.required, other.required) {
            (true, true) => Some(Ordering::Equal),
            (false, false) => self.symbolic_weight.partial_cmp(&other.symbolic_weight),
            _ => None,
        }
    }
}

impl Display for Strength {
    fn fmt(&self, f: &mut Formatter<'_>) -> FormatResult {
        if self.required {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}{}", self.name, self.symbolic_weight)
        }
    }
}

#[cfg(test)]
mod test {
    use num_traits::Zero;

    use crate::data::strength::{MEDIUM, REQUIRED, STRONG, Strength, SymbolicWeight, WEAK};

    #[test]
    fn lexicographic() {
        assert!(SymbolicWeight::new(1_f64, 0_f64, 0_f64) > SymbolicWeight::new(0_f64, 100_f64, 100_f64));
        assert!(SymbolicWeight::new(0_f64, 1_f64, 0_f64) > SymbolicWeight::new(0_f64, 0_f64, 999_f64));
        assert!(SymbolicWeight::new(0_f64, 0_f64, 2_f64) > SymbolicWeight::new(0_f64, 0_f64, 1_f64));
        assert_eq!(SymbolicWeight::new(1_f64, 2_f64, 3_f64), SymbolicWeight::new(1_f64, 2_f64, 3_f64));
    }

    #[test]
    fn arithmetic() {
        let w = SymbolicWeight::new(1_f64, 2_f64, 3_f64);
        assert_eq!(w + w, w * 2_f64);
        assert!((w - w).is_zero());
        assert_eq!(w / 2_f64, SymbolicWeight::new(0.5, 1_f64, 1.5));
        assert!((-w).is_negative());
        assert!(!w.is_negative());
    }

    #[test]
    fn as_f64() {
        assert_eq!(STRONG.symbolic_weight().as_f64(), 1e6);
        assert_eq!(MEDIUM.symbolic_weight().as_f64(), 1e3);
        assert_eq!(WEAK.symbolic_weight().as_f64(), 1_f64);
        assert_eq!(SymbolicWeight::new(1_f64, 2_f64, 3_f64).as_f64(), 1_002_003_f64);
    }

    #[test]
    fn strength_ordering() {
        assert!(STRONG > MEDIUM);
        assert!(MEDIUM > WEAK);
        assert_eq!(REQUIRED.partial_cmp(&STRONG), None);
        assert_eq!(WEAK.partial_cmp(&REQUIRED), None);
        assert!(REQUIRED >= REQUIRED);

        let custom = Strength::new("custom", SymbolicWeight::new(0_f64, 100_f64, 100_f64));
        assert!(STRONG > custom);
        assert!(!custom.is_required());
        assert!(REQUIRED.is_required());
    }
}
