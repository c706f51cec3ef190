//! The error taxonomy of spec §7.
//!
//! Back-end contract operations (see [`crate::backend`]) return
//! `Result<T, String>`, a human-readable reason, never a typed error,
//! because hosts surface these verbatim in a message box. [`EngineError`]
//! exists one layer up, in the middle-end and save-file code, where callers
//! (tests, the GUI status bar) want to match on the *kind* of failure rather
//! than parse a string.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A params/desc/id/save-file string was rejected during validation.
    /// The target state is left untouched.
    #[error("{0}")]
    Parse(String),

    /// The solver could not produce a move string.
    #[error("unsolvable: {0}")]
    Unsolvable(String),

    /// `execute_move` returned `None`; the caller should drop the input
    /// silently rather than propagate this further.
    #[error("move rejected by back-end")]
    ExecuteMoveInvalid,

    /// Save-file framing or header content did not parse.
    #[error("save file corrupt: {0}")]
    SaveFileCorrupt(String),

    /// The `VERSION` header named an unsupported version.
    #[error("unsupported save file version: {0}")]
    VersionUnsupported(String),

    /// The `GAME` header did not match the back-end the caller expected.
    #[error("save file is for a different game: expected {expected}, found {found}")]
    WrongGame { expected: String, found: String },

    /// An internal invariant was violated on input that should have been
    /// impossible to construct through the public API. Per §7 this is
    /// fatal: these must never trigger on correct inputs, so the caller is
    /// expected to `panic!`/abort rather than recover.
    #[error("internal invariant violated: {0}")]
    InternalInvariantViolated(String),
}

impl EngineError {
    pub fn parse(reason: impl Into<String>) -> Self {
        EngineError::Parse(reason.into())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
