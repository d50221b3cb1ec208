// Error types for the theory core.
//
// Two families, matching how failures reach the caller:
// - `TheoryError`: out-of-contract calls into the pitch model or chord
//   vocabulary (degree outside 1..7, a pitch not in the key, a chord symbol
//   the mode does not define). These are programmer errors on the shell side.
// - `ConfigError`: a broken `TheoryTables` instance. Raised once, when the
//   tables are constructed or loaded, never during generation.
//
// Musical rule violations are not errors at all; see `validate.rs`.

use thiserror::Error;

use crate::chord::HarmonicFunction;
use crate::key::Mode;

/// Contract violations in the pitch model and chord vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TheoryError {
    #[error("scale degree {0} is outside 1..7")]
    InvalidDegree(u8),
    #[error("pitch '{pitch}' is not in the {key} scale")]
    UnknownPitch { pitch: String, key: String },
    #[error("chord '{symbol}' is not recognized in {mode:?} mode")]
    UnknownChordSymbol { mode: Mode, symbol: String },
    #[error("unknown tonic '{0}'")]
    UnknownTonic(String),
    #[error("unknown mode '{0}' (expected major or minor)")]
    UnknownMode(String),
}

/// A `TheoryTables` instance that cannot drive the generator or validator.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no transitions defined out of {0:?}")]
    MissingTransitions(HarmonicFunction),
    #[error("{mode:?} mode has no chords for {function:?}")]
    NoCandidates {
        mode: Mode,
        function: HarmonicFunction,
    },
    #[error("{mode:?} chord '{symbol}' is listed for {function:?} but has no chord tones")]
    CandidateWithoutTones {
        mode: Mode,
        function: HarmonicFunction,
        symbol: String,
    },
    #[error("{mode:?} chord '{symbol}' is listed under more than one function")]
    AmbiguousFunction { mode: Mode, symbol: String },
    #[error("{mode:?} chord '{symbol}' contains degree {degree}, outside 1..7")]
    DegreeOutOfRange {
        mode: Mode,
        symbol: String,
        degree: u8,
    },
    #[error("{mode:?} {role} chord '{symbol}' must have {expected:?} function")]
    CadenceChord {
        mode: Mode,
        role: &'static str,
        symbol: String,
        expected: HarmonicFunction,
    },
    #[error("transition {from:?} -> {to:?} is required by the cadence but not allowed")]
    CadenceTransition {
        from: HarmonicFunction,
        to: HarmonicFunction,
    },
    #[error("interior length range {min}..={max} is empty or zero")]
    InteriorLength { min: usize, max: usize },
    #[error("failed to read tables: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tables: {0}")]
    Json(#[from] serde_json::Error),
}
