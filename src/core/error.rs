/// Failure of an engine operation. Nothing is partially computed: a call either
/// returns its full result or one of these.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// Input rejected before any simulation ran.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Arithmetic produced a non-finite value mid-simulation.
    #[error("simulation failed: {0}")]
    Simulation(String),
}

impl EngineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn simulation(msg: impl Into<String>) -> Self {
        Self::Simulation(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
