//! # Integration tests that require a look inside the crate.
//!
//! Each module builds a small system of constraints and checks both the values pushed to the
//! external variables and the state of the tableau.
mod layout;
