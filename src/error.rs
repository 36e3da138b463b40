use std::convert::Infallible;
use thiserror::Error;

/// Errors raised while a circuit is being built or checked.
///
/// Every variant names the offending gate, node or parameter so the caller can
/// point the user at the thing to fix.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("gate `{gate}`: malformed gate kind `{kind}`, expected TH12, TH22, TH23 or THm<m>")]
    MalformedGateKind { gate: String, kind: String },

    #[error("gate `{gate}`: {kind} takes {expected} inputs, got {found}")]
    ArityMismatch {
        gate: String,
        kind: String,
        expected: usize,
        found: usize,
    },

    #[error("gate `{gate}`: delay must be finite and non-negative, got {delay}")]
    InvalidDelay { gate: String, delay: f64 },

    #[error("`{gate}` needs at least one input")]
    NoInputs { gate: String },

    #[error("`{referrer}` references unknown node `{missing}`")]
    UnresolvedReference { referrer: String, missing: String },

    #[error("simulation step must be finite and positive, got {step}")]
    InvalidStep { step: f64 },

    #[error("simulation time bound must be finite and non-negative, got {max_time}")]
    InvalidTimeBound { max_time: f64 },
}

/// Returned when a value is assigned to an input the circuit doesn't have.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown input `{name}`")]
pub struct UnknownInputError {
    pub name: String,
}

/// Returned when a string is not one of the gate kind encodings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed gate kind `{kind}`")]
pub struct ParseGateKindError {
    pub kind: String,
}

// Lets `add_gate` accept an already typed GateKind through the same TryInto bound.
impl From<Infallible> for ParseGateKindError {
    fn from(e: Infallible) -> Self {
        match e {}
    }
}

/// Errors found when checking a finite state machine definition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FsmError {
    #[error("transition {index} references undefined state `{state}`")]
    UnknownState { index: usize, state: String },

    #[error("start state `{start}` is not defined")]
    UnknownStart { start: String },
}

/// Top level error of the crate, every fallible entry point converts into it.
#[derive(Error, Debug)]
pub enum NclError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    UnknownInput(#[from] UnknownInputError),

    #[error(transparent)]
    Fsm(#[from] FsmError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type of the fallible entry points.
pub type NclResult<T> = Result<T, NclError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let e = ValidationError::ArityMismatch {
            gate: "G1".into(),
            kind: "TH23".into(),
            expected: 3,
            found: 2,
        };
        assert_eq!(e.to_string(), "gate `G1`: TH23 takes 3 inputs, got 2");

        let e: NclError = UnknownInputError { name: "Z".into() }.into();
        assert_eq!(e.to_string(), "unknown input `Z`");
    }
}
