//! The bridge-drawing back-end (spec §4.G): connect numbered islands with
//! horizontal/vertical bridges until every island's degree matches its clue
//! and the whole archipelago is one connected graph. Board representation,
//! the three-pass deductive solver, and the island-placement generator live
//! in the sibling modules; this file is only the [`Backend`] impl gluing
//! them together, in the same "thin trait impl over a richer internal
//! module" shape as [`crate::backends::slide`].

mod board;
mod generator;
mod solver;

use crate::backend::MoveOutcome;
use crate::drawing::{Colour, DrawingHandle, Font, Point, Rect, TextAlign};
use crate::input::{Button, ButtonPhase, InputEvent};
use crate::params::{Preset, PresetMenu};
use crate::rng::RandomSource;
use board::Board;
use solver::{Difficulty, SolveOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgesParams {
    pub width: usize,
    pub height: usize,
    pub difficulty: Difficulty,
    /// Forbid bridges that would close a cycle in the island adjacency
    /// graph, a rule toggle independent of difficulty.
    pub no_loops: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BridgesState {
    board: Board,
    no_loops: bool,
}

/// `dragging` holds the candidate index a drag started over, so a release
/// on the same candidate (rather than a stray drag elsewhere) commits a
/// change; `None` means no drag is in progress.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BridgesUi {
    dragging: Option<usize>,
}

#[derive(Clone)]
pub struct BridgesBackend {
    presets: PresetMenu<BridgesParams>,
}

impl Default for BridgesBackend {
    fn default() -> Self {
        Self {
            presets: PresetMenu::Submenu(
                "Bridges".to_string(),
                vec![
                    PresetMenu::Leaf(Preset::new("Easy", BridgesParams { width: 7, height: 7, difficulty: Difficulty::Easy, no_loops: false })),
                    PresetMenu::Leaf(Preset::new("Medium", BridgesParams { width: 9, height: 9, difficulty: Difficulty::Medium, no_loops: false })),
                    PresetMenu::Leaf(Preset::new("Hard", BridgesParams { width: 11, height: 11, difficulty: Difficulty::Hard, no_loops: false })),
                ],
            ),
        }
    }
}

fn difficulty_digit(difficulty: Difficulty) -> u8 {
    match difficulty {
        Difficulty::Easy => 0,
        Difficulty::Medium => 1,
        Difficulty::Hard => 2,
    }
}

fn difficulty_from_digit(d: u8) -> Option<Difficulty> {
    match d {
        0 => Some(Difficulty::Easy),
        1 => Some(Difficulty::Medium),
        2 => Some(Difficulty::Hard),
        _ => None,
    }
}

/// `w{width}h{height}d{0|1|2}l{0|1}`, the `key<digits>` grammar
/// [`crate::params::split_param_tokens`] already parses (its own doc
/// comment uses `w9h9d2` as this back-end's worked example); `l` is the
/// no-loops rule toggle.
fn decode_params_str(params: &mut BridgesParams, s: &str) {
    for (key, value) in crate::params::split_param_tokens(s) {
        let Ok(n) = value.parse::<usize>() else { continue };
        match key {
            'w' => params.width = n,
            'h' => params.height = n,
            'd' => {
                if let Some(difficulty) = difficulty_from_digit(n as u8) {
                    params.difficulty = difficulty;
                }
            }
            'l' => params.no_loops = n != 0,
            _ => {}
        }
    }
}

fn parse_desc(params: &BridgesParams, desc: &str) -> Result<Board, String> {
    board::decode_layout(desc, params.width, params.height)
}

impl crate::backend::Backend for BridgesBackend {
    type Params = BridgesParams;
    type State = BridgesState;
    type Ui = BridgesUi;

    fn name(&self) -> &'static str {
        "bridges"
    }

    fn default_params(&self) -> BridgesParams {
        BridgesParams { width: 7, height: 7, difficulty: Difficulty::Easy, no_loops: false }
    }

    fn presets(&self) -> &PresetMenu<BridgesParams> {
        &self.presets
    }

    fn encode_params(&self, params: &BridgesParams, full: bool) -> String {
        if full {
            format!("w{}h{}d{}l{}", params.width, params.height, difficulty_digit(params.difficulty), params.no_loops as u8)
        } else {
            format!("d{}l{}", difficulty_digit(params.difficulty), params.no_loops as u8)
        }
    }

    fn decode_params(&self, params: &mut BridgesParams, s: &str) {
        decode_params_str(params, s);
    }

    fn validate_params(&self, params: &BridgesParams, _full: bool) -> Result<(), String> {
        if params.width < 4 || params.height < 4 {
            return Err("width and height must each be at least 4".to_string());
        }
        Ok(())
    }

    fn new_desc(&self, params: &BridgesParams, rng: &mut RandomSource) -> (String, Option<String>) {
        let generated = generator::generate(params.width, params.height, params.difficulty, params.no_loops, rng)
            .expect("generation over valid params always succeeds");
        (board::encode_layout(&generated.board), None)
    }

    fn validate_desc(&self, params: &BridgesParams, desc: &str) -> Result<(), String> {
        parse_desc(params, desc).map(|_| ())
    }

    fn new_game(&self, params: &BridgesParams, desc: &str) -> Result<BridgesState, String> {
        let board = parse_desc(params, desc)?;
        Ok(BridgesState { board, no_loops: params.no_loops })
    }

    fn text_format(&self, state: &BridgesState) -> Option<String> {
        let board = &state.board;
        let mut out = String::with_capacity((board.width + 1) * board.height);
        for y in 0..board.height {
            for x in 0..board.width {
                match board.island_at(x, y) {
                    Some(i) => out.push_str(&board.islands[i].clue.to_string()),
                    None => out.push('.'),
                }
            }
            out.push('\n');
        }
        Some(out)
    }

    fn solve(&self, _initial: &BridgesState, current: &BridgesState, _aux: Option<&str>) -> Result<String, String> {
        if self.status(current) == 1 {
            return Err("already solved".to_string());
        }
        let solved = match solver::solve(&current.board, Difficulty::Hard, current.no_loops) {
            SolveOutcome::Solved(board) => board,
            SolveOutcome::Impossible(reason) => return Err(reason),
            SolveOutcome::Stuck => return Err("stuck: deduction alone could not finish this board".to_string()),
        };
        let mut out = String::from("S");
        for (i, &count) in solved.bridges.iter().enumerate() {
            out.push_str(&format!("B{i}={count};"));
        }
        Ok(out)
    }

    fn interpret_move(&self, state: &BridgesState, ui: &mut BridgesUi, input: InputEvent) -> MoveOutcome {
        let InputEvent::Mouse { x, y, button, phase: ButtonPhase::Press } = input else {
            return MoveOutcome::Ignored;
        };
        let tile = self.preferred_tile_size() as f32;
        let Some(candidate) = nearest_candidate(&state.board, x as f32 / tile, y as f32 / tile) else {
            return MoveOutcome::Ignored;
        };
        ui.dragging = Some(candidate);

        let current = state.board.bridges[candidate];
        let next = match button {
            Button::Left => (current + 1) % (board::MAX_BRIDGES + 1),
            Button::Right => (current + board::MAX_BRIDGES) % (board::MAX_BRIDGES + 1),
            Button::Middle => return MoveOutcome::Ignored,
        };
        if next > 0 && state.board.crosses_a_drawn_bridge(candidate) {
            return MoveOutcome::Ignored;
        }
        MoveOutcome::Move(format!("B{candidate}={next}"))
    }

    fn execute_move(&self, state: &BridgesState, movestr: &str) -> Option<BridgesState> {
        let rest = movestr.strip_prefix('S').unwrap_or(movestr);
        let mut board = state.board.clone();
        let mut applied_any = false;

        for submove in rest.split(';') {
            if submove.is_empty() {
                continue;
            }
            let body = submove.strip_prefix('B')?;
            let (idx_str, count_str) = body.split_once('=')?;
            let idx: usize = idx_str.parse().ok()?;
            let count: u8 = count_str.parse().ok()?;
            if idx >= board.candidates.len() || count > board::MAX_BRIDGES {
                return None;
            }
            board.bridges[idx] = count;
            applied_any = true;
        }

        if !applied_any {
            return None;
        }
        Some(BridgesState { board, no_loops: state.no_loops })
    }

    fn redraw(
        &self,
        drawing: &mut dyn DrawingHandle,
        _old_state: Option<&BridgesState>,
        state: &BridgesState,
        _dir: i32,
        ui: &BridgesUi,
        _animtime: f32,
        flashtime: f32,
    ) {
        let tile = self.preferred_tile_size() as f32;
        let colours = self.colours();
        let board = &state.board;

        drawing.start_draw();
        for (i, c) in board.candidates.iter().enumerate() {
            let a = board.islands[c.a];
            let b = board.islands[c.b];
            let from = Point::new((a.x as f32 + 0.5) * tile, (a.y as f32 + 0.5) * tile);
            let to = Point::new((b.x as f32 + 0.5) * tile, (b.y as f32 + 0.5) * tile);
            let drawn = board.bridges[i];
            if drawn == 0 {
                continue;
            }
            let colour = if Some(i) == ui.dragging { colours[2] } else { colours[1] };
            for offset in offsets_for(c.orientation, drawn) {
                drawing.draw_line(shift(from, offset), shift(to, offset), colour);
            }
        }

        for isl in &board.islands {
            let centre = Point::new((isl.x as f32 + 0.5) * tile, (isl.y as f32 + 0.5) * tile);
            let island_idx = board.island_at(isl.x, isl.y).unwrap_or(0);
            let satisfied = board.degree(island_idx) == isl.clue as u32;
            let colour = if satisfied { colours[3] } else { colours[0] };
            drawing.draw_circle(centre, tile * 0.4, colour, true);
            drawing.draw_text(
                centre.x,
                centre.y,
                Font::Variable,
                tile * 0.5,
                TextAlign::Centre,
                Colour::BLACK,
                &isl.clue.to_string(),
            );
        }

        let whole = Rect::new(0.0, 0.0, board.width as f32 * tile, board.height as f32 * tile);
        if flashtime > 0.0 {
            drawing.draw_rect(whole, Colour::WHITE, false);
        }
        drawing.draw_update(whole);
        drawing.end_draw();
    }

    fn anim_length(&self, old: &BridgesState, new: &BridgesState, _dir: i32, _ui: &BridgesUi) -> f32 {
        if old.board.bridges != new.board.bridges {
            0.1
        } else {
            0.0
        }
    }

    fn flash_length(&self, old: &BridgesState, new: &BridgesState, _dir: i32, _ui: &BridgesUi) -> f32 {
        if self.status(new) == 1 && self.status(old) != 1 {
            0.3
        } else {
            0.0
        }
    }

    fn status(&self, state: &BridgesState) -> i32 {
        if state.board.is_solved() {
            1
        } else {
            0
        }
    }

    fn compute_size(&self, params: &BridgesParams, tile_size: i32) -> (i32, i32) {
        (params.width as i32 * tile_size, params.height as i32 * tile_size)
    }

    fn colours(&self) -> Vec<Colour> {
        vec![
            Colour::new(0.9, 0.9, 0.9),  // unsatisfied island
            Colour::new(0.3, 0.3, 0.3),  // drawn bridge
            Colour::new(0.85, 0.2, 0.2), // bridge under drag
            Colour::new(0.4, 0.8, 0.4),  // satisfied island
        ]
    }
}

/// A double bridge is drawn as two parallel lines a few pixels either side
/// of the island-to-island axis; a single bridge is drawn centred.
fn offsets_for(orientation: board::Orientation, count: u8) -> Vec<Point> {
    let perpendicular = match orientation {
        board::Orientation::Horizontal => Point::new(0.0, 1.0),
        board::Orientation::Vertical => Point::new(1.0, 0.0),
    };
    if count <= 1 {
        vec![Point::new(0.0, 0.0)]
    } else {
        vec![
            Point::new(-perpendicular.x * 3.0, -perpendicular.y * 3.0),
            Point::new(perpendicular.x * 3.0, perpendicular.y * 3.0),
        ]
    }
}

fn shift(p: Point, offset: Point) -> Point {
    Point::new(p.x + offset.x, p.y + offset.y)
}

/// Finds the candidate whose line segment passes closest to `(col, row)`
/// (in tile units), used to translate a click into the bridge it targets.
fn nearest_candidate(board: &Board, col: f32, row: f32) -> Option<usize> {
    const TOLERANCE: f32 = 0.4;
    let mut best: Option<(usize, f32)> = None;
    for (i, c) in board.candidates.iter().enumerate() {
        let a = board.islands[c.a];
        let b = board.islands[c.b];
        let dist = match c.orientation {
            board::Orientation::Horizontal => {
                if col < a.x as f32 || col > b.x as f32 {
                    continue;
                }
                (row - a.y as f32).abs()
            }
            board::Orientation::Vertical => {
                if row < a.y as f32 || row > b.y as f32 {
                    continue;
                }
                (col - a.x as f32).abs()
            }
        };
        if dist > TOLERANCE {
            continue;
        }
        if best.map(|(_, d)| dist < d).unwrap_or(true) {
            best = Some((i, dist));
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Backend;

    fn backend() -> BridgesBackend {
        BridgesBackend::default()
    }

    #[test]
    fn generated_game_is_immediately_playable_and_solvable() {
        let b = backend();
        let params = BridgesParams { width: 7, height: 7, difficulty: Difficulty::Easy, no_loops: false };
        let mut rng = RandomSource::from_seed_str("bridges-mod-test");
        let (desc, aux) = b.new_desc(&params, &mut rng);
        assert!(aux.is_none());
        b.validate_desc(&params, &desc).unwrap();
        let state = b.new_game(&params, &desc).unwrap();
        assert_eq!(b.status(&state), 0);

        let movestr = b.solve(&state, &state, None).unwrap();
        let solved = b.execute_move(&state, &movestr).unwrap();
        assert_eq!(b.status(&solved), 1);
    }

    #[test]
    fn params_round_trip_through_encode_decode() {
        let b = backend();
        let params = BridgesParams { width: 9, height: 11, difficulty: Difficulty::Hard, no_loops: true };
        let encoded = b.encode_params(&params, true);
        assert_eq!(encoded, "w9h11d2l1");
        let mut decoded = BridgesParams { width: 0, height: 0, difficulty: Difficulty::Easy, no_loops: false };
        b.decode_params(&mut decoded, &encoded);
        assert_eq!(decoded, params);
    }

    #[test]
    fn short_params_form_carries_difficulty_and_no_loops() {
        let b = backend();
        let params = BridgesParams { width: 7, height: 7, difficulty: Difficulty::Medium, no_loops: true };
        assert_eq!(b.encode_params(&params, false), "d1l1");
    }

    #[test]
    fn clicking_an_undrawn_candidate_proposes_drawing_one_bridge() {
        let b = backend();
        let params = BridgesParams { width: 7, height: 7, difficulty: Difficulty::Easy, no_loops: false };
        let mut rng = RandomSource::from_seed_str("bridges-ui-test");
        let (desc, _) = b.new_desc(&params, &mut rng);
        let state = b.new_game(&params, &desc).unwrap();
        let mut ui = BridgesUi::default();

        let first = &state.board.candidates[0];
        let a = state.board.islands[first.a];
        let b_isl = state.board.islands[first.b];
        let tile = b.preferred_tile_size();
        let mid_x = ((a.x + b_isl.x) as f32 / 2.0 + 0.5) * tile as f32;
        let mid_y = ((a.y + b_isl.y) as f32 / 2.0 + 0.5) * tile as f32;

        let outcome = b.interpret_move(
            &state,
            &mut ui,
            InputEvent::Mouse { x: mid_x as i32, y: mid_y as i32, button: Button::Left, phase: ButtonPhase::Press },
        );
        assert!(matches!(outcome, MoveOutcome::Move(_)));
    }

    #[test]
    fn execute_move_rejects_a_malformed_move_string() {
        let b = backend();
        let params = BridgesParams { width: 7, height: 7, difficulty: Difficulty::Easy, no_loops: false };
        let mut rng = RandomSource::from_seed_str("bridges-bad-move");
        let (desc, _) = b.new_desc(&params, &mut rng);
        let state = b.new_game(&params, &desc).unwrap();
        assert!(b.execute_move(&state, "not-a-move").is_none());
    }
}
