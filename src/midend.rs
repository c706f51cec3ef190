//! The generic middle-end controller (spec §4.E): owns move history,
//! undo/redo, timing, and save-file round-tripping for one live game,
//! generic over a single [`crate::backend::Backend`] implementation.
//!
//! Grounded on `tesuji::editor::Editor`/`EditCommand`/`run_editor`, the
//! teacher's "generic controller that owns an append-only history and
//! dispatches commands against it", `Editor::tree`/`cursor` is this
//! module's `history`/`position`, and `Editor::apply` is `make_move`.
//! Unlike the teacher's tree (which supports branching edits), spec §4.E's
//! history is strictly linear: a new move past the current position
//! truncates the redo tail, it never forks.

use std::io::{Read, Write};

use crate::backend::{Backend, BackendFlags, MoveOutcome};
use crate::error::EngineError;
use crate::ident::{self, IdPayload};
use crate::input::{Button, ButtonLatch, ButtonPhase, CursorKey, Modifiers, Priority, normalize_key, InputEvent};
use crate::rng::{HostEntropy, RandomSource};
use crate::savefile::{self, Field};

pub use crate::ident::IdDefaultMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movetype {
    /// The very first entry, produced by `new_game`. Never appears past
    /// index 0.
    New,
    Move,
    Solve,
    Restart,
}

#[derive(Clone)]
struct HistoryEntry<S> {
    state: S,
    movetype: Movetype,
    /// `None` only for the `New` entry at index 0.
    movestr: Option<String>,
}

/// Append-only, strictly linear move history with a cursor (spec §4.E).
/// `position` is 1-based: `position == 1` means `entries[0]` is current.
struct MoveHistory<S> {
    entries: Vec<HistoryEntry<S>>,
    position: usize,
}

impl<S: Clone> MoveHistory<S> {
    fn new(initial: S) -> Self {
        Self { entries: vec![HistoryEntry { state: initial, movetype: Movetype::New, movestr: None }], position: 1 }
    }

    fn current(&self) -> &S {
        &self.entries[self.position - 1].state
    }

    fn current_movetype(&self) -> Movetype {
        self.entries[self.position - 1].movetype
    }

    fn can_undo(&self) -> bool {
        self.position > 1
    }

    fn can_redo(&self) -> bool {
        self.position < self.entries.len()
    }

    /// Truncates any redo tail past the current position, then appends.
    fn push(&mut self, state: S, movetype: Movetype, movestr: String) {
        self.entries.truncate(self.position);
        self.entries.push(HistoryEntry { state, movetype, movestr: Some(movestr) });
        self.position = self.entries.len();
    }
}

/// How `game_id`/`new_game` should produce the next description: mint (or
/// reuse) a seed and regenerate, or replay a description given directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GenMode {
    Seed,
    Desc,
}

pub struct Midend<B: Backend> {
    backend: B,
    params: B::Params,
    seed: Option<String>,
    desc: String,
    priv_desc: Option<String>,
    aux: Option<String>,
    ui: B::Ui,
    history: Option<MoveHistory<B::State>>,
    genmode: GenMode,
    tile_size: i32,

    // Animation/flash state for the transition currently in flight.
    old_state: Option<B::State>,
    anim_dir: i32,
    anim_clock: f32,
    anim_total: f32,
    pending_flash_check: Option<(Movetype, Movetype)>,
    flash_clock: f32,
    flash_total: f32,

    elapsed: f32,
    button_latch: ButtonLatch,
    redraw_generation: u64,
}

impl<B: Backend> Midend<B> {
    pub fn new(backend: B, config: &dyn crate::config::ConfigSource) -> Self {
        let mut params = backend.default_params();
        if let Some(s) = config.default_params(backend.name()) {
            backend.decode_params(&mut params, &s);
        }
        let tile_size = config.tile_size(backend.name()).unwrap_or_else(|| backend.preferred_tile_size());
        let ui = B::Ui::default();
        Self {
            backend,
            params,
            seed: None,
            desc: String::new(),
            priv_desc: None,
            aux: None,
            ui,
            history: None,
            genmode: GenMode::Seed,
            tile_size,
            old_state: None,
            anim_dir: 0,
            anim_clock: 0.0,
            anim_total: 0.0,
            pending_flash_check: None,
            flash_clock: 0.0,
            flash_total: 0.0,
            elapsed: 0.0,
            button_latch: ButtonLatch::new(),
            redraw_generation: 0,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn params(&self) -> &B::Params {
        &self.params
    }

    pub fn ui(&self) -> &B::Ui {
        &self.ui
    }

    fn history(&self) -> &MoveHistory<B::State> {
        self.history.as_ref().expect("new_game must be called before using the midend")
    }

    fn history_mut(&mut self) -> &mut MoveHistory<B::State> {
        self.history.as_mut().expect("new_game must be called before using the midend")
    }

    pub fn current_state(&self) -> &B::State {
        self.history().current()
    }

    pub fn status(&self) -> i32 {
        self.backend.status(self.current_state())
    }

    pub fn tile_size(&self) -> i32 {
        self.tile_size
    }

    pub fn redraw_generation(&self) -> u64 {
        self.redraw_generation
    }

    pub fn force_redraw(&mut self) {
        self.redraw_generation += 1;
    }

    /// Generates (or replays) the current description and starts a fresh
    /// game from it. `host` mints a new seed only when in seed mode with no
    /// seed already set (e.g. via [`Midend::game_id`]).
    pub fn new_game(&mut self, host: &mut dyn HostEntropy) {
        match self.genmode {
            GenMode::Seed => {
                let seed = self.seed.clone().unwrap_or_else(|| host.fresh_seed());
                let mut rng = RandomSource::from_seed_str(&seed);
                let (desc, aux) = self.backend.new_desc(&self.params, &mut rng);
                self.seed = Some(seed);
                self.desc = desc;
                self.aux = aux;
            }
            GenMode::Desc => {
                // self.desc (and self.aux, usually None) were set by game_id.
            }
        }

        let initial = self
            .backend
            .new_game(&self.params, &self.desc)
            .unwrap_or_else(|e| panic!("internal invariant violated: back-end rejected its own description {:?}: {e}", self.desc));

        if let Some(aux) = self.aux.clone() {
            let movestr = self
                .backend
                .solve(&initial, &initial, Some(&aux))
                .unwrap_or_else(|e| panic!("internal invariant violated: aux self-test solve failed: {e}"));
            let result = self.backend.execute_move(&initial, &movestr);
            assert!(result.is_some(), "internal invariant violated: aux-derived solve move string did not execute");
        }

        self.ui = self.backend.new_ui(&initial);
        self.history = Some(MoveHistory::new(initial));
        self.priv_desc = None;
        self.old_state = None;
        self.anim_dir = 0;
        self.anim_clock = 0.0;
        self.anim_total = 0.0;
        self.pending_flash_check = None;
        self.flash_clock = 0.0;
        self.flash_total = 0.0;
        self.elapsed = 0.0;
        self.force_redraw();
    }

    /// Binary-searches the largest tile size fitting within `(x, y)`. When
    /// `user` is true the result is remembered (a deliberate user resize);
    /// otherwise it's a one-off query (e.g. a non-interactive render) and
    /// the stored tile size is left untouched.
    pub fn size(&mut self, x: i32, y: i32, user: bool) -> (i32, i32) {
        let mut lo: i32 = 1;
        let mut hi: i32 = x.max(y).max(1);
        let mut best = lo;
        while lo <= hi {
            let mid = lo + (hi - lo) / 2;
            let (w, h) = self.backend.compute_size(&self.params, mid);
            if w <= x && h <= y {
                best = mid;
                lo = mid + 1;
            } else {
                hi = mid - 1;
            }
        }
        if user {
            self.tile_size = best;
        }
        self.force_redraw();
        self.backend.compute_size(&self.params, best)
    }

    /// Draws the current transition through `drawing`, per spec §4.D's
    /// `redraw` contract, passing whatever animation/flash clock is live.
    pub fn redraw(&self, drawing: &mut dyn crate::drawing::DrawingHandle) {
        self.backend.redraw(
            drawing,
            self.old_state.as_ref(),
            self.current_state(),
            self.anim_dir,
            &self.ui,
            self.anim_clock,
            self.flash_clock,
        );
    }

    pub fn process_mouse(&mut self, x: i32, y: i32, button: Button, phase: ButtonPhase, priority: Option<Priority>) -> bool {
        let events = self.button_latch.normalize(x, y, button, phase, priority);
        let mut changed = false;
        for event in events {
            changed |= self.dispatch_input(event);
        }
        changed
    }

    pub fn process_cursor(&mut self, key: CursorKey, modifiers: Modifiers) -> bool {
        self.dispatch_input(InputEvent::Cursor(key, modifiers))
    }

    pub fn process_char(&mut self, c: char) -> bool {
        self.dispatch_input(normalize_key(c))
    }

    fn dispatch_input(&mut self, event: InputEvent) -> bool {
        let state = self.history().current().clone();
        match self.backend.interpret_move(&state, &mut self.ui, event) {
            MoveOutcome::Ignored => false,
            MoveOutcome::UiUpdate => {
                self.force_redraw();
                true
            }
            MoveOutcome::Move(movestr) => match self.backend.execute_move(&state, &movestr) {
                Some(new_state) => {
                    self.make_move(new_state, Movetype::Move, movestr);
                    true
                }
                // execute_move rejected its own interpret_move output: drop
                // silently (spec §7 edge case), as if the input were a no-op.
                None => false,
            },
        }
    }

    /// Appends `new_state` to history and arms whatever animation it
    /// warrants, finishing the move immediately if no animation is due.
    fn make_move(&mut self, new_state: B::State, movetype: Movetype, movestr: String) {
        let old_state = self.history().current().clone();
        let old_movetype = self.history().current_movetype();

        let mut anim_total = self.backend.anim_length(&old_state, &new_state, 1, &self.ui);
        if movetype == Movetype::Solve && !self.backend.flags().contains(BackendFlags::SOLVE_ANIMATES) {
            anim_total = 0.0;
        }

        self.history_mut().push(new_state, movetype, movestr);
        self.old_state = Some(old_state);
        self.anim_dir = 1;
        self.anim_clock = 0.0;
        self.anim_total = anim_total;
        self.pending_flash_check = Some((old_movetype, movetype));
        self.force_redraw();

        if self.anim_total <= 0.0 {
            self.finish_move();
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history().can_redo()
    }

    pub fn undo(&mut self) -> bool {
        self.step_history(-1)
    }

    pub fn redo(&mut self) -> bool {
        self.step_history(1)
    }

    fn step_history(&mut self, dir: i32) -> bool {
        let old_pos = self.history().position;
        let moved = if dir < 0 { self.history_mut().undo_step() } else { self.history_mut().redo_step() };
        if !moved {
            return false;
        }

        let (old_state, old_movetype, new_state, new_movetype) = {
            let history = self.history();
            let old_entry = &history.entries[old_pos - 1];
            let new_entry = &history.entries[history.position - 1];
            (old_entry.state.clone(), old_entry.movetype, new_entry.state.clone(), new_entry.movetype)
        };

        if old_state != new_state {
            if self.backend.flags().contains(BackendFlags::WANTS_STATECHANGE_NOTIFY) {
                self.backend.changed_state(&mut self.ui, &old_state, &new_state);
            }
            self.old_state = Some(old_state.clone());
            self.anim_dir = dir;
            self.anim_clock = 0.0;
            self.anim_total = self.backend.anim_length(&old_state, &new_state, dir, &self.ui);
            self.pending_flash_check = Some((old_movetype, new_movetype));
            if self.anim_total <= 0.0 {
                self.finish_move();
            }
        }
        self.force_redraw();
        true
    }

    /// Reconstructs the state from the *public* description (not
    /// `history[0]`, which may differ after a game-id change mid-session)
    /// and records it as a `Restart` entry.
    pub fn restart_game(&mut self) {
        let desc = self.desc.clone();
        let new_state = self
            .backend
            .new_game(&self.params, &desc)
            .unwrap_or_else(|e| panic!("internal invariant violated: restart from own description failed: {e}"));
        self.make_move(new_state, Movetype::Restart, desc);
    }

    /// Runs the back-end solver from the initial state to the current one
    /// and appends the resulting transition as a `Solve` entry.
    pub fn solve(&mut self) -> Result<(), String> {
        let initial = self.history().entries[0].state.clone();
        let current = self.history().current().clone();
        let movestr = self.backend.solve(&initial, &current, self.aux.as_deref())?;
        let new_state = self
            .backend
            .execute_move(&current, &movestr)
            .ok_or_else(|| "solve produced a move string execute_move rejected".to_string())?;
        self.make_move(new_state, Movetype::Solve, movestr);
        Ok(())
    }

    /// Parses `params#seed`, `params:desc`, or a bare string (interpreted
    /// per `default_mode` when there's no separator), validating both the
    /// parameters and the seed/description before committing either.
    pub fn game_id(&mut self, s: &str, default_mode: IdDefaultMode) -> Result<(), String> {
        let parsed = ident::parse_game_id(s, default_mode);

        let mut new_params = self.params.clone();
        if !parsed.params.is_empty() {
            self.backend.decode_params(&mut new_params, parsed.params);
        }
        self.backend.validate_params(&new_params, true)?;

        match parsed.payload {
            IdPayload::Seed(seed) => {
                self.params = new_params;
                self.seed = Some(seed.to_string());
                self.genmode = GenMode::Seed;
            }
            IdPayload::Desc(desc) => {
                self.backend.validate_desc(&new_params, desc)?;
                self.params = new_params;
                self.desc = desc.to_string();
                self.genmode = GenMode::Desc;
            }
        }
        self.aux = None;
        Ok(())
    }

    /// Advances animation, flash, and elapsed-time clocks by `dt` seconds,
    /// finishing any move whose animation just completed.
    pub fn timer(&mut self, dt: f32) {
        if self.anim_total > 0.0 {
            self.anim_clock += dt;
            if self.anim_clock >= self.anim_total {
                self.finish_move();
            } else {
                self.force_redraw();
            }
        }
        if self.flash_total > 0.0 {
            self.flash_clock += dt;
            if self.flash_clock >= self.flash_total {
                self.flash_clock = 0.0;
                self.flash_total = 0.0;
            }
            self.force_redraw();
        }
        self.elapsed += dt;
    }

    /// Whether the host's platform timer should keep firing: the back-end
    /// wants ticks for its own timing state, or a flash/animation is live.
    pub fn timer_should_be_armed(&self) -> bool {
        (self.backend.is_timed() && self.backend.timing_state(self.current_state(), &self.ui))
            || self.flash_total > 0.0
            || self.anim_total > 0.0
    }

    /// Move-completion algorithm (spec §4.E `finish_move`): decide whether
    /// the just-completed transition warrants a victory flash, arm it, then
    /// free the animation snapshot.
    fn finish_move(&mut self) {
        if let Some((old_mt, new_mt)) = self.pending_flash_check.take() {
            let warranted = old_mt != Movetype::Solve && old_mt != Movetype::Restart && new_mt != Movetype::Solve && new_mt != Movetype::Restart;
            if warranted {
                if let Some(old_state) = self.old_state.clone() {
                    let current = self.history().current().clone();
                    let len = self.backend.flash_length(&old_state, &current, self.anim_dir, &self.ui);
                    if len > 0.0 {
                        self.flash_clock = 0.0;
                        self.flash_total = len;
                    }
                }
            }
        }
        self.old_state = None;
        self.anim_clock = 0.0;
        self.anim_total = 0.0;
        self.anim_dir = 0;
        self.force_redraw();
    }

    /// Writes the save-file format (spec §6) through `w`.
    pub fn serialise<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        let history = self.history();
        savefile::write_field(w, "SAVEFILE", savefile::SAVEFILE_MAGIC.as_bytes())?;
        savefile::write_field(w, "VERSION", savefile::SAVEFILE_VERSION.as_bytes())?;
        savefile::write_field(w, "GAME", self.backend.name().as_bytes())?;
        savefile::write_field(w, "PARAMS", self.backend.encode_params(&self.params, false).as_bytes())?;
        savefile::write_field(w, "CPARAMS", self.backend.encode_params(&self.params, true).as_bytes())?;
        if let Some(seed) = &self.seed {
            savefile::write_field(w, "SEED", seed.as_bytes())?;
        }
        savefile::write_field(w, "DESC", self.desc.as_bytes())?;
        if let Some(pd) = &self.priv_desc {
            savefile::write_field(w, "PRIVDESC", pd.as_bytes())?;
        }
        if let Some(aux) = &self.aux {
            let obfuscated = savefile::obfuscate(aux.as_bytes(), true);
            savefile::write_field(w, "AUXINFO", &obfuscated)?;
        }
        if let Some(ui) = self.backend.encode_ui(&self.ui) {
            savefile::write_field(w, "UI", ui.as_bytes())?;
        }
        savefile::write_field(w, "TIME", self.elapsed.to_string().as_bytes())?;
        savefile::write_field(w, "NSTATES", history.entries.len().to_string().as_bytes())?;
        savefile::write_field(w, "STATEPOS", history.position.to_string().as_bytes())?;
        for entry in &history.entries[1..] {
            let header = match entry.movetype {
                Movetype::Move => "MOVE",
                Movetype::Solve => "SOLVE",
                Movetype::Restart => "RESTART",
                Movetype::New => unreachable!("only entries[0] may be New"),
            };
            let movestr = entry.movestr.as_deref().expect("non-initial entries always carry a move string");
            savefile::write_field(w, header, movestr.as_bytes())?;
        }
        Ok(())
    }

    /// Reads a save file through `r`, fully validating before mutating any
    /// field of `self` (a corrupt or mismatched file leaves the live game
    /// untouched).
    pub fn deserialise<R: Read>(&mut self, r: &mut R) -> Result<(), EngineError>
    where
        B: Clone,
    {
        let mut fields = Vec::new();
        while let Some(f) = savefile::read_field(r)? {
            fields.push(f);
        }
        let restored = self.parse_fields(&fields)?;
        *self = restored;
        Ok(())
    }

    fn parse_fields(&self, fields: &[Field]) -> Result<Self, EngineError>
    where
        B: Clone,
    {
        let mut idx = 0usize;
        let magic = take_field(fields, &mut idx, "SAVEFILE")?;
        if magic != savefile::SAVEFILE_MAGIC {
            return Err(EngineError::SaveFileCorrupt("bad SAVEFILE magic".into()));
        }
        let version = take_field(fields, &mut idx, "VERSION")?;
        if version != savefile::SAVEFILE_VERSION {
            return Err(EngineError::VersionUnsupported(version.to_string()));
        }
        let game = take_field(fields, &mut idx, "GAME")?;
        if game != self.backend.name() {
            return Err(EngineError::WrongGame { expected: self.backend.name().to_string(), found: game.to_string() });
        }
        let _short_params = take_field(fields, &mut idx, "PARAMS")?;
        let full_params = take_field(fields, &mut idx, "CPARAMS")?;
        let mut params = self.backend.default_params();
        self.backend.decode_params(&mut params, full_params);
        self.backend.validate_params(&params, true).map_err(EngineError::Parse)?;

        let seed = peek_optional(fields, idx).filter(|f| f.header == "SEED").map(|_| {
            let s = take_field(fields, &mut idx, "SEED").unwrap();
            s.to_string()
        });

        let desc = take_field(fields, &mut idx, "DESC")?.to_string();
        self.backend.validate_desc(&params, &desc).map_err(EngineError::Parse)?;

        let priv_desc = peek_optional(fields, idx).filter(|f| f.header == "PRIVDESC").map(|_| {
            let s = take_field(fields, &mut idx, "PRIVDESC").unwrap();
            s.to_string()
        });

        let aux = peek_optional(fields, idx).filter(|f| f.header == "AUXINFO").map(|f| {
            let raw = f.payload.clone();
            idx += 1;
            String::from_utf8(savefile::obfuscate(&raw, false)).unwrap_or_default()
        });

        let initial_state = self.backend.new_game(&params, &desc).map_err(EngineError::Parse)?;
        let mut ui = self.backend.new_ui(&initial_state);

        if peek_optional(fields, idx).filter(|f| f.header == "UI").is_some() {
            let s = take_field(fields, &mut idx, "UI")?;
            self.backend.decode_ui(&mut ui, s);
        }

        let time_str = take_field(fields, &mut idx, "TIME")?;
        let elapsed: f32 = time_str.parse().map_err(|_| EngineError::SaveFileCorrupt(format!("bad TIME field {time_str:?}")))?;

        let nstates_str = take_field(fields, &mut idx, "NSTATES")?;
        let nstates: usize = nstates_str.parse().map_err(|_| EngineError::SaveFileCorrupt(format!("bad NSTATES field {nstates_str:?}")))?;
        if nstates == 0 {
            return Err(EngineError::SaveFileCorrupt("NSTATES must be at least 1".into()));
        }

        let statepos_str = take_field(fields, &mut idx, "STATEPOS")?;
        let statepos: usize = statepos_str.parse().map_err(|_| EngineError::SaveFileCorrupt(format!("bad STATEPOS field {statepos_str:?}")))?;
        if statepos < 1 || statepos > nstates {
            return Err(EngineError::SaveFileCorrupt(format!("STATEPOS {statepos} out of range 1..={nstates}")));
        }

        let mut entries = vec![HistoryEntry { state: initial_state.clone(), movetype: Movetype::New, movestr: None }];
        let mut current = initial_state;
        for _ in 1..nstates {
            let f = fields.get(idx).ok_or_else(|| EngineError::SaveFileCorrupt("missing move entry".into()))?;
            idx += 1;
            let movetype = match f.header.as_str() {
                "MOVE" => Movetype::Move,
                "SOLVE" => Movetype::Solve,
                "RESTART" => Movetype::Restart,
                other => return Err(EngineError::SaveFileCorrupt(format!("expected MOVE/SOLVE/RESTART, found {other}"))),
            };
            let movestr = String::from_utf8(f.payload.clone()).map_err(|_| EngineError::SaveFileCorrupt("move string is not valid UTF-8".into()))?;
            let next = if movetype == Movetype::Restart {
                self.backend.new_game(&params, &movestr).map_err(EngineError::Parse)?
            } else {
                self.backend
                    .execute_move(&current, &movestr)
                    .ok_or_else(|| EngineError::SaveFileCorrupt(format!("replayed move {movestr:?} was rejected")))?
            };
            entries.push(HistoryEntry { state: next.clone(), movetype, movestr: Some(movestr) });
            current = next;
        }
        if idx != fields.len() {
            return Err(EngineError::SaveFileCorrupt("trailing data after the last move entry".into()));
        }

        Ok(Midend {
            backend: self.backend.clone(),
            params,
            seed,
            desc,
            priv_desc,
            aux,
            ui,
            history: Some(MoveHistory { entries, position: statepos }),
            genmode: GenMode::Desc,
            tile_size: self.tile_size,
            old_state: None,
            anim_dir: 0,
            anim_clock: 0.0,
            anim_total: 0.0,
            pending_flash_check: None,
            flash_clock: 0.0,
            flash_total: 0.0,
            elapsed,
            button_latch: ButtonLatch::new(),
            redraw_generation: self.redraw_generation + 1,
        })
    }
}

impl<S: Clone> MoveHistory<S> {
    fn undo_step(&mut self) -> bool {
        if self.can_undo() {
            self.position -= 1;
            true
        } else {
            false
        }
    }

    fn redo_step(&mut self) -> bool {
        if self.can_redo() {
            self.position += 1;
            true
        } else {
            false
        }
    }
}

fn take_field<'a>(fields: &'a [Field], idx: &mut usize, expected: &str) -> Result<&'a str, EngineError> {
    let f = fields.get(*idx).ok_or_else(|| EngineError::SaveFileCorrupt(format!("missing {expected} field")))?;
    if f.header != expected {
        return Err(EngineError::SaveFileCorrupt(format!("expected {expected}, found {}", f.header)));
    }
    *idx += 1;
    std::str::from_utf8(&f.payload).map_err(|_| EngineError::SaveFileCorrupt(format!("{expected} is not valid UTF-8")))
}

fn peek_optional(fields: &[Field], idx: usize) -> Option<&Field> {
    fields.get(idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfigSource;
    use crate::drawing::{Colour, DrawingHandle};
    use crate::params::{Preset, PresetMenu};
    use crate::rng::RandomSource;

    /// A trivial one-state "counter" back-end: `new_game` always starts at
    /// 0, the only move is "increment", solve jumps straight to target 3.
    #[derive(Clone)]
    struct CounterBackend {
        presets: PresetMenu<i32>,
    }

    impl CounterBackend {
        fn new() -> Self {
            CounterBackend { presets: PresetMenu::Leaf(Preset::new("Default", 3)) }
        }
    }

    impl Backend for CounterBackend {
        type Params = i32;
        type State = i32;
        type Ui = ();

        fn name(&self) -> &'static str {
            "counter"
        }
        fn default_params(&self) -> i32 {
            3
        }
        fn presets(&self) -> &PresetMenu<i32> {
            &self.presets
        }
        fn encode_params(&self, params: &i32, _full: bool) -> String {
            params.to_string()
        }
        fn decode_params(&self, params: &mut i32, s: &str) {
            if let Ok(v) = s.parse() {
                *params = v;
            }
        }
        fn validate_params(&self, params: &i32, _full: bool) -> Result<(), String> {
            if *params > 0 {
                Ok(())
            } else {
                Err("target must be positive".to_string())
            }
        }
        fn new_desc(&self, params: &i32, _rng: &mut RandomSource) -> (String, Option<String>) {
            (format!("target{params}"), None)
        }
        fn validate_desc(&self, _params: &i32, desc: &str) -> Result<(), String> {
            if desc.starts_with("target") {
                Ok(())
            } else {
                Err("bad description".to_string())
            }
        }
        fn new_game(&self, _params: &i32, _desc: &str) -> Result<i32, String> {
            Ok(0)
        }
        fn solve(&self, _initial: &i32, current: &i32, _aux: Option<&str>) -> Result<String, String> {
            Ok(format!("set{}", current + 1))
        }
        fn interpret_move(&self, _state: &i32, _ui: &mut (), input: InputEvent) -> MoveOutcome {
            match input {
                InputEvent::Char('+') => MoveOutcome::Move("inc".to_string()),
                _ => MoveOutcome::Ignored,
            }
        }
        fn execute_move(&self, state: &i32, movestr: &str) -> Option<i32> {
            if movestr == "inc" {
                Some(state + 1)
            } else if let Some(rest) = movestr.strip_prefix("set") {
                rest.parse().ok()
            } else {
                None
            }
        }
        fn redraw(&self, _drawing: &mut dyn DrawingHandle, _old: Option<&i32>, _state: &i32, _dir: i32, _ui: &(), _animtime: f32, _flashtime: f32) {}
        fn anim_length(&self, _old: &i32, _new: &i32, _dir: i32, _ui: &()) -> f32 {
            0.0
        }
        fn flash_length(&self, _old: &i32, _new: &i32, _dir: i32, _ui: &()) -> f32 {
            0.0
        }
        fn status(&self, state: &i32) -> i32 {
            if *state >= 3 {
                1
            } else {
                0
            }
        }
        fn compute_size(&self, _params: &i32, tile_size: i32) -> (i32, i32) {
            (tile_size * 3, tile_size * 3)
        }
        fn colours(&self) -> Vec<Colour> {
            vec![Colour::WHITE]
        }
    }

    struct FixedEntropy(&'static str);
    impl HostEntropy for FixedEntropy {
        fn fresh_seed(&mut self) -> String {
            self.0.to_string()
        }
    }

    fn new_midend() -> Midend<CounterBackend> {
        let config = MapConfigSource::new();
        let mut mid = Midend::new(CounterBackend::new(), &config);
        mid.new_game(&mut FixedEntropy("12345"));
        mid
    }

    #[test]
    fn new_game_starts_at_zero() {
        let mid = new_midend();
        assert_eq!(*mid.current_state(), 0);
        assert_eq!(mid.status(), 0);
    }

    #[test]
    fn moves_append_and_undo_redo_traverse_history() {
        let mut mid = new_midend();
        mid.process_char('+');
        mid.process_char('+');
        assert_eq!(*mid.current_state(), 2);
        assert!(mid.undo());
        assert_eq!(*mid.current_state(), 1);
        assert!(mid.undo());
        assert_eq!(*mid.current_state(), 0);
        assert!(!mid.undo());
        assert!(mid.redo());
        assert!(mid.redo());
        assert_eq!(*mid.current_state(), 2);
    }

    #[test]
    fn new_move_truncates_redo_tail() {
        let mut mid = new_midend();
        mid.process_char('+');
        mid.process_char('+');
        mid.undo();
        assert!(mid.can_redo());
        mid.process_char('+');
        assert_eq!(*mid.current_state(), 2);
        assert!(!mid.can_redo());
    }

    #[test]
    fn solve_reaches_winning_state() {
        let mut mid = new_midend();
        mid.process_char('+');
        mid.solve().unwrap();
        assert_eq!(*mid.current_state(), 2);
        mid.solve().unwrap();
        assert_eq!(mid.status(), 1);
    }

    #[test]
    fn restart_replays_the_public_description_not_history_zero() {
        let mut mid = new_midend();
        mid.process_char('+');
        mid.process_char('+');
        mid.restart_game();
        assert_eq!(*mid.current_state(), 0);
        assert!(mid.can_undo());
    }

    #[test]
    fn game_id_seed_form_commits_only_after_validation() {
        let mut mid = new_midend();
        let result = mid.game_id("0#99999", IdDefaultMode::Seed);
        assert!(result.is_err());
        // rejected params must not have been committed.
        assert_eq!(*mid.params(), 3);
    }

    #[test]
    fn game_id_desc_form_round_trips_through_new_game() {
        let mut mid = new_midend();
        mid.game_id("3:target3", IdDefaultMode::Desc).unwrap();
        mid.new_game(&mut FixedEntropy("unused"));
        assert_eq!(*mid.current_state(), 0);
    }

    #[test]
    fn save_and_restore_round_trip() {
        let mut mid = new_midend();
        mid.process_char('+');
        mid.process_char('+');
        mid.undo();

        let mut buf = Vec::new();
        mid.serialise(&mut buf).unwrap();

        let mut restored = new_midend();
        let mut cursor = std::io::Cursor::new(buf);
        restored.deserialise(&mut cursor).unwrap();

        assert_eq!(*restored.current_state(), *mid.current_state());
        assert!(restored.can_redo());
    }

    #[test]
    fn deserialise_rejects_wrong_game_without_mutating_state() {
        let mut mid = new_midend();
        let mut bogus = Vec::new();
        savefile::write_field(&mut bogus, "SAVEFILE", savefile::SAVEFILE_MAGIC.as_bytes()).unwrap();
        savefile::write_field(&mut bogus, "VERSION", savefile::SAVEFILE_VERSION.as_bytes()).unwrap();
        savefile::write_field(&mut bogus, "GAME", b"not-counter").unwrap();
        let mut cursor = std::io::Cursor::new(bogus);
        let before = *mid.current_state();
        let result = mid.deserialise(&mut cursor);
        assert!(matches!(result, Err(EngineError::WrongGame { .. })));
        assert_eq!(*mid.current_state(), before);
    }

    #[test]
    fn timer_arms_while_flash_is_live() {
        let mut mid = new_midend();
        assert!(!mid.timer_should_be_armed());
        mid.flash_total = 1.0;
        assert!(mid.timer_should_be_armed());
        mid.timer(2.0);
        assert!(!mid.timer_should_be_armed());
    }
}
