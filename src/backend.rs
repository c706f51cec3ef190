//! The back-end contract (spec §4.D): the capability set every puzzle
//! implements. The middle-end ([`crate::midend`]) is generic over one
//! `Backend` implementation per live session, "dispatch statically where
//! each executable links one back-end" (spec §9 Design Notes), rather
//! than a dyn-compatible trait object, since associated types make the
//! latter impractical here; see `DESIGN.md` for the open-question
//! resolution.
//!
//! Grounded on `tesuji::editor::Adapter` (`render`/`next_command`) as the
//! shape of "a capability interface a generic driver calls", generalized
//! from that trait's two methods to the full operation set spec §4.D
//! requires.

use crate::drawing::DrawingHandle;
use crate::input::InputEvent;
use crate::params::PresetMenu;
use crate::rng::RandomSource;

/// Flags a back-end can opt into. A hand-rolled two-bit wrapper rather
/// than a `bitflags`-crate type: none of the five example repos depend on
/// `bitflags`, and two flags don't justify adding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BackendFlags(u8);

impl BackendFlags {
    /// `solve()` should animate like a played move rather than jumping
    /// straight to the solved state.
    pub const SOLVE_ANIMATES: BackendFlags = BackendFlags(0b01);
    /// The back-end wants `changed_state` notifications from undo/redo.
    pub const WANTS_STATECHANGE_NOTIFY: BackendFlags = BackendFlags(0b10);

    pub const fn empty() -> Self {
        BackendFlags(0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for BackendFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        BackendFlags(self.0 | rhs.0)
    }
}

/// Outcome of `interpret_move` (spec §4.D).
pub enum MoveOutcome {
    /// A move string to execute.
    Move(String),
    /// UI state changed; redraw but do not append a move (the "UI update
    /// sentinel" of the glossary).
    UiUpdate,
    /// The event was ignored.
    Ignored,
}

/// Everything a puzzle back-end implements (spec §4.D). `Params` is the
/// `GameParameters` record, `State` the immutable `GameState`, `Ui` the
/// ephemeral per-session `UIState`.
pub trait Backend {
    type Params: Clone;
    type State: Clone + PartialEq;
    type Ui: Default;

    fn name(&self) -> &'static str;

    fn default_params(&self) -> Self::Params;
    fn presets(&self) -> &PresetMenu<Self::Params>;

    /// `full=true` includes all fields; `full=false` is the short,
    /// persistent-only form used in `params#seed`/`params:desc` ids.
    fn encode_params(&self, params: &Self::Params, full: bool) -> String;
    /// Total: missing fields keep their previous value.
    fn decode_params(&self, params: &mut Self::Params, s: &str);
    fn validate_params(&self, params: &Self::Params, full: bool) -> Result<(), String>;

    fn new_desc(&self, params: &Self::Params, rng: &mut RandomSource) -> (String, Option<String>);
    /// Must reject any string `new_desc` cannot produce.
    fn validate_desc(&self, params: &Self::Params, desc: &str) -> Result<(), String>;

    fn new_game(&self, params: &Self::Params, desc: &str) -> Result<Self::State, String>;

    fn solve(&self, initial: &Self::State, current: &Self::State, aux: Option<&str>) -> Result<String, String>;

    fn text_format(&self, _state: &Self::State) -> Option<String> {
        None
    }

    fn new_ui(&self, state: &Self::State) -> Self::Ui {
        let _ = state;
        Self::Ui::default()
    }
    fn encode_ui(&self, _ui: &Self::Ui) -> Option<String> {
        None
    }
    fn decode_ui(&self, _ui: &mut Self::Ui, _s: &str) {}

    /// Notifies the back-end that undo/redo silently changed the current
    /// state (only called when `flags()` contains `WANTS_STATECHANGE_NOTIFY`).
    fn changed_state(&self, _ui: &mut Self::Ui, _old: &Self::State, _new: &Self::State) {}

    /// Pixel dimensions the board would occupy at the given tile size, for
    /// the middle-end's `size()` binary search.
    fn compute_size(&self, params: &Self::Params, tile_size: i32) -> (i32, i32);

    fn interpret_move(&self, state: &Self::State, ui: &mut Self::Ui, input: InputEvent) -> MoveOutcome;
    fn execute_move(&self, state: &Self::State, movestr: &str) -> Option<Self::State>;

    fn redraw(
        &self,
        drawing: &mut dyn DrawingHandle,
        old_state: Option<&Self::State>,
        state: &Self::State,
        dir: i32,
        ui: &Self::Ui,
        animtime: f32,
        flashtime: f32,
    );

    fn anim_length(&self, old: &Self::State, new: &Self::State, dir: i32, ui: &Self::Ui) -> f32;
    fn flash_length(&self, old: &Self::State, new: &Self::State, dir: i32, ui: &Self::Ui) -> f32;

    /// -1 lost, 0 in progress, +1 won.
    fn status(&self, state: &Self::State) -> i32;

    fn is_timed(&self) -> bool {
        false
    }
    fn timing_state(&self, _state: &Self::State, _ui: &Self::Ui) -> bool {
        false
    }

    fn flags(&self) -> BackendFlags {
        BackendFlags::empty()
    }

    fn preferred_tile_size(&self) -> i32 {
        32
    }

    fn colours(&self) -> Vec<crate::drawing::Colour>;
}
