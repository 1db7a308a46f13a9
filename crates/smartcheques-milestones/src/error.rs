use smartcheques_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MilestoneError {
    #[error("milestone not found: {0}")]
    NotFound(String),

    #[error("contract not found: {0}")]
    ContractNotFound(String),

    #[error("dependency milestone not found: {0}")]
    UnknownDependency(String),

    #[error("dependency graph would contain a cycle")]
    CyclicDependency,

    #[error("cannot leave pending state: dependency {0} is not completed")]
    DependencyNotMet(String),

    #[error("invalid transition from {from:?} to {to:?}")]
    InvalidTransition { from: String, to: String },

    #[error("progress must be within [0, 100], got {0}")]
    InvalidProgress(f64),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("persistence error: {0}")]
    Store(String),
}
