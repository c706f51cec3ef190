//! The sliding-block back-end (spec §4.F): slide rectilinear blocks around
//! a bordered grid until the distinguished main block reaches a
//! forcefield-protected target cell. Board representation, the two-level
//! BFS solver, and the carve-then-merge generator live in the sibling
//! modules; this file is only the [`Backend`] impl gluing them together,
//! in the same "thin trait impl over a richer internal module" shape
//! `tesuji::editor::run_editor` wraps around `Editor`.

mod board;
mod generator;
mod solver;

use crate::backend::{BackendFlags, MoveOutcome};
use crate::drawing::{Colour, DrawingHandle, Rect};
use crate::input::{Button, ButtonPhase, InputEvent};
use crate::params::{Preset, PresetMenu};
use crate::rng::RandomSource;
use board::{Board, MAIN_ANCHOR};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideParams {
    pub width: usize,
    pub height: usize,
    pub move_limit: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlideState {
    board: Board,
    target_cell: usize,
    moves_made: usize,
}

/// `selected` holds the anchor index of a block picked up by the first
/// click of a two-click move; `None` means no block is currently selected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlideUi {
    selected: Option<usize>,
}

#[derive(Clone)]
pub struct SlideBackend {
    presets: PresetMenu<SlideParams>,
}

impl Default for SlideBackend {
    fn default() -> Self {
        Self {
            presets: PresetMenu::Submenu(
                "Sliding Blocks".to_string(),
                vec![
                    PresetMenu::Leaf(Preset::new("Tiny", SlideParams { width: 4, height: 4, move_limit: 30 })),
                    PresetMenu::Leaf(Preset::new("Standard", SlideParams { width: 6, height: 6, move_limit: 60 })),
                    PresetMenu::Leaf(Preset::new("Large", SlideParams { width: 9, height: 7, move_limit: 100 })),
                ],
            ),
        }
    }
}

fn apply_field(key: Option<char>, digits: &str, is_leading_run: bool, params: &mut SlideParams) {
    if digits.is_empty() {
        return;
    }
    let Ok(value) = digits.parse::<usize>() else { return };
    match key {
        None if is_leading_run => params.width = value,
        Some('x') => params.height = value,
        Some('m') => params.move_limit = value,
        _ => {}
    }
}

/// Parses the bespoke `{width}x{height}m{move_limit}` token stream (no
/// letter precedes `width`, so [`crate::params::split_param_tokens`]'s
/// letter-then-digits grammar doesn't fit here).
fn decode_params_str(params: &mut SlideParams, s: &str) {
    let mut pending_key: Option<char> = None;
    let mut digits = String::new();
    let mut leading = true;
    for c in s.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        if !digits.is_empty() {
            apply_field(pending_key, &digits, leading, params);
            leading = false;
        }
        digits.clear();
        pending_key = Some(c);
    }
    if !digits.is_empty() {
        apply_field(pending_key, &digits, leading, params);
    }
}

/// The description format a back-end's `desc` carries on top of its
/// (separately-encoded) params: `{cells},{forcefield},{tx},{ty},{minmoves}`.
fn parse_desc(params: &SlideParams, desc: &str) -> Result<(Board, usize, usize), String> {
    let total_w = params.width + 2;
    let total_h = params.height + 2;
    let len = total_w * total_h;

    let mut parts = desc.split(',');
    let cell_tokens = parts.next().ok_or("description is missing its cell tokens")?;
    let forcefield_tokens = parts.next().ok_or("description is missing its forcefield tokens")?;
    let tx: usize = parts.next().ok_or("description is missing tx")?.parse().map_err(|_| "tx is not a number".to_string())?;
    let ty: usize = parts.next().ok_or("description is missing ty")?.parse().map_err(|_| "ty is not a number".to_string())?;
    let minmoves: usize = parts
        .next()
        .ok_or("description is missing minmoves")?
        .parse()
        .map_err(|_| "minmoves is not a number".to_string())?;
    if parts.next().is_some() {
        return Err("description has trailing data after minmoves".to_string());
    }

    let cells = board::decode_cells(cell_tokens, len)?;
    let forcefield = board::decode_forcefield(forcefield_tokens, len)?;

    if tx >= total_w || ty >= total_h {
        return Err("target cell coordinates are out of bounds".to_string());
    }
    let target_cell = ty * total_w + tx;

    let main_count = cells.iter().filter(|&&c| c == MAIN_ANCHOR).count();
    if main_count != 1 {
        return Err("description must contain exactly one main block anchor".to_string());
    }

    Ok((Board { width: total_w, height: total_h, cells, forcefield }, target_cell, minmoves))
}

impl crate::backend::Backend for SlideBackend {
    type Params = SlideParams;
    type State = SlideState;
    type Ui = SlideUi;

    fn name(&self) -> &'static str {
        "slide"
    }

    fn default_params(&self) -> SlideParams {
        SlideParams { width: 4, height: 4, move_limit: 30 }
    }

    fn presets(&self) -> &PresetMenu<SlideParams> {
        &self.presets
    }

    fn encode_params(&self, params: &SlideParams, _full: bool) -> String {
        format!("{}x{}m{}", params.width, params.height, params.move_limit)
    }

    fn decode_params(&self, params: &mut SlideParams, s: &str) {
        decode_params_str(params, s);
    }

    fn validate_params(&self, params: &SlideParams, _full: bool) -> Result<(), String> {
        if params.width < 2 || params.height < 2 {
            return Err("width and height must each be at least 2".to_string());
        }
        if params.move_limit == 0 {
            return Err("move_limit must be positive".to_string());
        }
        Ok(())
    }

    fn new_desc(&self, params: &SlideParams, rng: &mut RandomSource) -> (String, Option<String>) {
        let generated = generator::generate(params.width, params.height, params.move_limit, rng)
            .expect("generation over valid params always succeeds");
        let cell_tokens = board::encode_cells(&generated.board.cells);
        let forcefield_tokens = board::encode_forcefield(&generated.board.forcefield);
        let tx = generated.target_cell % generated.board.width;
        let ty = generated.target_cell / generated.board.width;
        let desc = format!("{cell_tokens},{forcefield_tokens},{tx},{ty},{}", generated.minmoves);
        (desc, None)
    }

    fn validate_desc(&self, params: &SlideParams, desc: &str) -> Result<(), String> {
        parse_desc(params, desc).map(|_| ())
    }

    fn new_game(&self, params: &SlideParams, desc: &str) -> Result<SlideState, String> {
        let (board, target_cell, _minmoves) = parse_desc(params, desc)?;
        Ok(SlideState { board, target_cell, moves_made: 0 })
    }

    fn text_format(&self, state: &SlideState) -> Option<String> {
        let board = &state.board;
        let which = board::which_anchor(board);
        let mut out = String::with_capacity((board.width + 1) * board.height);
        for row in 0..board.height {
            for col in 0..board.width {
                let idx = row * board.width + col;
                let cell = board.cells[idx];
                let ch = if cell == board::WALL {
                    '#'
                } else if cell == MAIN_ANCHOR {
                    '@'
                } else if cell == board::EMPTY {
                    if board.forcefield[idx] { 'x' } else { '.' }
                } else {
                    let anchor = which[idx].expect("a backlink cell always resolves to an anchor");
                    (b'a' + (anchor % 26) as u8) as char
                };
                out.push(ch);
            }
            out.push('\n');
        }
        Some(out)
    }

    fn solve(&self, _initial: &SlideState, current: &SlideState, _aux: Option<&str>) -> Result<String, String> {
        if self.status(current) == 1 {
            return Err("already solved".to_string());
        }
        let moves = solver::solve_board(&current.board, current.target_cell, None)?;
        if moves.is_empty() {
            return Err("no solution exists from the current position".to_string());
        }
        let mut out = String::from("S");
        for (i, (src, dst)) in moves.iter().enumerate() {
            if i > 0 {
                out.push(';');
            }
            out.push_str(&format!("M{src}-{dst}"));
        }
        Ok(out)
    }

    fn interpret_move(&self, state: &SlideState, ui: &mut SlideUi, input: InputEvent) -> MoveOutcome {
        let InputEvent::Mouse { x, y, button: Button::Left, phase: ButtonPhase::Press } = input else {
            return MoveOutcome::Ignored;
        };
        let tile = self.preferred_tile_size();
        if tile <= 0 || x < 0 || y < 0 {
            return MoveOutcome::Ignored;
        }
        let (col, row) = ((x / tile) as usize, (y / tile) as usize);
        if col >= state.board.width || row >= state.board.height {
            return MoveOutcome::Ignored;
        }
        let idx = row * state.board.width + col;
        let which = board::which_anchor(&state.board);

        match ui.selected {
            None => match which[idx] {
                Some(anchor) => {
                    ui.selected = Some(anchor);
                    MoveOutcome::UiUpdate
                }
                None => MoveOutcome::Ignored,
            },
            Some(anchor) => {
                if idx == anchor {
                    ui.selected = None;
                    return MoveOutcome::UiUpdate;
                }
                let blocks = board::block_cells(&state.board);
                if let Some(cells) = blocks.get(&anchor) {
                    let candidates = board::reachable_moves(&state.board, anchor, cells);
                    if let Some(candidate) = candidates.iter().find(|c| c.new_anchor == idx) {
                        let dst = candidate.new_anchor;
                        ui.selected = None;
                        return MoveOutcome::Move(format!("M{anchor}-{dst}"));
                    }
                }
                match which[idx] {
                    Some(new_anchor) => {
                        ui.selected = Some(new_anchor);
                        MoveOutcome::UiUpdate
                    }
                    None => MoveOutcome::Ignored,
                }
            }
        }
    }

    fn execute_move(&self, state: &SlideState, movestr: &str) -> Option<SlideState> {
        let rest = movestr.strip_prefix('S').unwrap_or(movestr);
        let mut board = state.board.clone();
        let mut moves_made = state.moves_made;
        let mut applied_any = false;

        for submove in rest.split(';') {
            if submove.is_empty() {
                continue;
            }
            let body = submove.strip_prefix('M')?;
            let (src_str, dst_str) = body.split_once('-')?;
            let src: usize = src_str.parse().ok()?;
            let dst: usize = dst_str.parse().ok()?;

            let blocks = board::block_cells(&board);
            let cells = blocks.get(&src)?;
            let candidate = board::reachable_moves(&board, src, cells).into_iter().find(|c| c.new_anchor == dst)?;
            board = candidate.board;
            moves_made += 1;
            applied_any = true;
        }

        if !applied_any {
            return None;
        }
        Some(SlideState { board, target_cell: state.target_cell, moves_made })
    }

    fn redraw(
        &self,
        drawing: &mut dyn DrawingHandle,
        _old_state: Option<&SlideState>,
        state: &SlideState,
        _dir: i32,
        ui: &SlideUi,
        _animtime: f32,
        flashtime: f32,
    ) {
        let tile = self.preferred_tile_size() as f32;
        let colours = self.colours();
        let board = &state.board;

        drawing.start_draw();
        for row in 0..board.height {
            for col in 0..board.width {
                let idx = row * board.width + col;
                let rect = Rect::new(col as f32 * tile, row as f32 * tile, tile, tile);
                let colour = if board.cells[idx] == board::WALL {
                    colours[0]
                } else if board.cells[idx] == MAIN_ANCHOR {
                    colours[2]
                } else if board.cells[idx] == board::EMPTY {
                    if board.forcefield[idx] { colours[4] } else { colours[1] }
                } else {
                    colours[3]
                };
                drawing.draw_rect(rect, colour, true);
                if Some(idx) == ui.selected {
                    drawing.draw_rect(rect, Colour::WHITE, false);
                }
            }
        }

        let whole = Rect::new(0.0, 0.0, board.width as f32 * tile, board.height as f32 * tile);
        if flashtime > 0.0 {
            drawing.draw_rect(whole, Colour::WHITE, false);
        }
        drawing.draw_update(whole);
        drawing.end_draw();
    }

    fn anim_length(&self, old: &SlideState, new: &SlideState, _dir: i32, _ui: &SlideUi) -> f32 {
        if old.board.cells != new.board.cells {
            0.12
        } else {
            0.0
        }
    }

    fn flash_length(&self, old: &SlideState, new: &SlideState, _dir: i32, _ui: &SlideUi) -> f32 {
        if self.status(new) == 1 && self.status(old) != 1 {
            0.3
        } else {
            0.0
        }
    }

    fn status(&self, state: &SlideState) -> i32 {
        if state.board.cells[state.target_cell] == MAIN_ANCHOR {
            1
        } else {
            0
        }
    }

    fn compute_size(&self, params: &SlideParams, tile_size: i32) -> (i32, i32) {
        ((params.width + 2) as i32 * tile_size, (params.height + 2) as i32 * tile_size)
    }

    fn flags(&self) -> BackendFlags {
        BackendFlags::SOLVE_ANIMATES
    }

    fn colours(&self) -> Vec<Colour> {
        vec![
            Colour::new(0.35, 0.35, 0.35), // wall
            Colour::new(0.85, 0.85, 0.85), // empty
            Colour::new(0.85, 0.2, 0.2),   // main block
            Colour::new(0.3, 0.5, 0.8),    // ordinary block
            Colour::new(0.9, 0.8, 0.3),    // forcefield marker (on empty target)
        ]
    }
}
