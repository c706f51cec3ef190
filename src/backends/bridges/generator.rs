//! Island-placement generator (spec §4.G steps 1-4): grow a connected island
//! layout one island at a time, require the bounding box's four edges to
//! each carry at least one island, draw a spanning set of bridges to derive
//! clues from, then verify the result solves at the target difficulty but
//! not at the one below it.
//!
//! Grounded on `backends::slide::generator`'s retry-the-whole-attempt shape:
//! deal with an unlucky layout by starting over rather than patching it.

use super::board::{Board, Island, MAX_BRIDGES};
use super::solver::{self, Difficulty, SolveOutcome};
use crate::dsf::Dsf;
use crate::rng::RandomSource;

const MAX_ATTEMPTS: usize = 200;

pub struct Generated {
    pub board: Board,
    pub minmoves: usize,
}

/// Builds a solvable bridges board of the given size and difficulty,
/// retrying from scratch (a fresh layout and a fresh bridge assignment) up
/// to a fixed attempt budget.
pub fn generate(width: usize, height: usize, difficulty: Difficulty, no_loops: bool, rng: &mut RandomSource) -> Result<Generated, String> {
    for _ in 0..MAX_ATTEMPTS {
        if let Some(board) = try_generate(width, height, difficulty, no_loops, rng) {
            let minmoves = board.candidates.iter().enumerate().filter(|&(i, _)| board.bridges[i] > 0).count();
            return Ok(Generated { board, minmoves });
        }
    }
    Err("failed to generate a solvable bridges board within the attempt budget".to_string())
}

fn try_generate(width: usize, height: usize, difficulty: Difficulty, no_loops: bool, rng: &mut RandomSource) -> Option<Board> {
    let positions = grow_layout(width, height, rng);
    if !touches_every_edge(width, height, &positions) {
        return None;
    }

    let islands: Vec<Island> = positions.into_iter().map(|(x, y)| Island { x, y, clue: 0 }).collect();
    let mut board = Board::new(width, height, islands);
    if board.candidates.is_empty() {
        return None;
    }

    draw_spanning_bridges(&mut board, no_loops, rng);
    assign_clues_from_bridges(&mut board);
    for b in &mut board.bridges {
        *b = 0;
    }

    if !solvable_at(&board, difficulty, no_loops) {
        return None;
    }
    if let Some(easier) = one_difficulty_easier(difficulty) {
        if solvable_at(&board, easier, no_loops) {
            return None; // too easy for the requested difficulty
        }
    }

    Some(board)
}

fn solvable_at(board: &Board, difficulty: Difficulty, no_loops: bool) -> bool {
    matches!(solver::solve(board, difficulty, no_loops), SolveOutcome::Solved(_))
}

fn one_difficulty_easier(difficulty: Difficulty) -> Option<Difficulty> {
    match difficulty {
        Difficulty::Easy => None,
        Difficulty::Medium => Some(Difficulty::Easy),
        Difficulty::Hard => Some(Difficulty::Medium),
    }
}

/// Step 1-3: plant a single island, then repeatedly pick a random existing
/// island and a random direction from it, extending to a random legal
/// position along that ray (sometimes running all the way to the board
/// edge, sometimes stopping short), until enough islands exist to make a
/// non-trivial puzzle.
fn grow_layout(width: usize, height: usize, rng: &mut RandomSource) -> Vec<(usize, usize)> {
    let mut positions = vec![(rng.random_upto(width as u32) as usize, rng.random_upto(height as u32) as usize)];
    let target_islands = ((width * height) / 4).max(4);

    let mut stalls = 0;
    while positions.len() < target_islands && stalls < target_islands * 4 {
        let from = positions[rng.random_upto(positions.len() as u32) as usize];
        match pick_extension(width, height, &positions, from, rng) {
            Some(to) => {
                positions.push(to);
                stalls = 0;
            }
            None => stalls += 1,
        }
    }
    positions
}

/// From `from`, tries the four directions in a random rotation and returns
/// a random legal new island position along the first direction that has
/// room (nothing already occupying the ray between `from` and the new
/// spot).
fn pick_extension(width: usize, height: usize, positions: &[(usize, usize)], from: (usize, usize), rng: &mut RandomSource) -> Option<(usize, usize)> {
    const DIRECTIONS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
    let start = rng.random_upto(4) as usize;

    for offset in 0..4 {
        let (dx, dy) = DIRECTIONS[(start + offset) % 4];
        let mut open = Vec::new();
        let (mut x, mut y) = (from.0 as i32, from.1 as i32);
        loop {
            x += dx;
            y += dy;
            if x < 0 || y < 0 || x as usize >= width || y as usize >= height {
                break;
            }
            let here = (x as usize, y as usize);
            if positions.contains(&here) {
                break;
            }
            open.push(here);
        }
        if open.is_empty() {
            continue;
        }
        let run_to_edge = rng.random_bool();
        let pick = if run_to_edge { open.len() - 1 } else { rng.random_upto(open.len() as u32) as usize };
        return Some(open[pick]);
    }
    None
}

fn touches_every_edge(width: usize, height: usize, positions: &[(usize, usize)]) -> bool {
    positions.iter().any(|&(x, _)| x == 0)
        && positions.iter().any(|&(x, _)| x == width - 1)
        && positions.iter().any(|&(_, y)| y == 0)
        && positions.iter().any(|&(_, y)| y == height - 1)
}

/// Draws enough non-crossing bridges to connect every island into one
/// component (a random spanning tree over the visibility graph), each with
/// a random count in `1..=MAX_BRIDGES`, then (unless `no_loops` was
/// requested) sprinkles a few extra bridges onto already-connected,
/// non-crossing candidates for variety. This known-good solution is what
/// the final clues are read back from, so a no-loops puzzle's solution
/// must itself stay acyclic.
fn draw_spanning_bridges(board: &mut Board, no_loops: bool, rng: &mut RandomSource) {
    let mut order: Vec<usize> = (0..board.candidates.len()).collect();
    rng.shuffle_all(&mut order);

    let mut dsf = Dsf::new(board.islands.len());
    for &c in &order {
        let cand = board.candidates[c];
        if dsf.connected(cand.a, cand.b) || board.crosses_a_drawn_bridge(c) {
            continue;
        }
        board.bridges[c] = 1 + rng.random_upto(MAX_BRIDGES as u32) as u8;
        dsf.union(cand.a, cand.b);
    }

    if no_loops {
        return;
    }

    for &c in &order {
        if board.bridges[c] > 0 || board.crosses_a_drawn_bridge(c) {
            continue;
        }
        if rng.random_upto(3) == 0 {
            board.bridges[c] = 1 + rng.random_upto(MAX_BRIDGES as u32) as u8;
        }
    }
}

fn assign_clues_from_bridges(board: &mut Board) {
    let degrees: Vec<u8> = (0..board.islands.len()).map(|i| board.degree(i) as u8).collect();
    for (isl, clue) in board.islands.iter_mut().zip(degrees) {
        isl.clue = clue;
    }
}
