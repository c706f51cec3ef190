//! A portable collection of logic puzzles (spec §1): a generic middle-end
//! (move history, undo/redo, serialization, timing) driving interchangeable
//! back-ends, each implementing one puzzle's generation, validation, and
//! solving. [`midend::Midend`] and [`facade::Host`] are the pieces a new
//! front end (this crate's own `cli`, or the `puzzles-gui` workspace
//! member) builds on; [`backends`] holds the puzzles themselves.

pub mod backend;
pub mod backends;
pub mod codec;
pub mod config;
pub mod drawing;
pub mod dsf;
pub mod error;
pub mod facade;
pub mod ident;
pub mod input;
pub mod midend;
pub mod params;
pub mod rng;
pub mod savefile;

#[cfg(feature = "cli")]
pub mod cli;

pub use backend::{Backend, BackendFlags, MoveOutcome};
pub use error::{EngineError, EngineResult};
pub use facade::{Host, RawKey};
pub use midend::Midend;
