//! Concrete puzzle back-ends (spec §4.F, §4.G), each a self-contained
//! implementation of [`crate::backend::Backend`] plus its own board
//! representation, solver, and generator.

pub mod bridges;
pub mod slide;
