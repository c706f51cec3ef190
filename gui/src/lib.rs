//! The `iced` front end for the puzzle engine (spec §4.H): a host that
//! turns a [`puzzles::Midend`] into an interactive window, grounded on
//! `tesuji`'s own `gui` module (board canvas program, file-dialog tasks,
//! theme constants) and generalized from one game (Go/SGF) to any
//! [`puzzles::Backend`] by dispatching over [`app::Puzzle`].

pub mod app;
pub mod canvas_drawing;
pub mod io;
pub mod theme;

pub use app::{GuiApp, Message};
