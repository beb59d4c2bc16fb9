//! Solver configuration.

/// Options for the behavior of the simplex solver.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Optimize and push values after every change to the set of constraints.
    ///
    /// When disabled, `solve` needs to be called explicitly.
    pub autosolve: bool,
    /// Collect the constraints implicated when a required constraint can't be added.
    pub explain_failures: bool,
    /// Reset the constants of stay constraints to the current values after each resolve.
    pub auto_reset_stay_constants: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            autosolve: true,
            explain_failures: true,
            auto_reset_stay_constants: true,
        }
    }
}

impl SolverConfig {
    /// Create a new configuration with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable solving after every change.
    pub fn with_autosolve(mut self, enabled: bool) -> Self {
        self.autosolve = enabled;
        self
    }

    /// Enable or disable explanations for required failures.
    pub fn with_explain_failures(mut self, enabled: bool) -> Self {
        self.explain_failures = enabled;
        self
    }

    /// Enable or disable resetting stay constants after each resolve.
    pub fn with_auto_reset_stay_constants(mut self, enabled: bool) -> Self {
        self.auto_reset_stay_constants = enabled;
        self
    }
}

#[cfg(test)]
mod test {
    use crate::algorithm::simplex::config::SolverConfig;

    #[test]
    fn defaults() {
        let config = SolverConfig::new();
        assert!(config.autosolve);
        assert!(config.explain_failures);
        assert!(config.auto_reset_stay_constants);
    }

    #[test]
    fn builder() {
        let config = SolverConfig::new()
            .with_autosolve(false)
            .with_explain_failures(false)
            .with_auto_reset_stay_constants(false);
        assert!(!config.autosolve);
        assert!(!config.explain_failures);
        assert!(!config.auto_reset_stay_constants);
    }
}
