//! Puzzle generation (spec §4.F steps 1-5): carve a bordered grid of
//! singleton blocks down to a board that is solvable but not trivially so,
//! merging neighbouring blocks back together where doing so still leaves a
//! board solvable within the requested move budget.
//!
//! Grounded on [`crate::dsf::Dsf`]'s min-index-root contract (spec §4.A):
//! `merge_blocks` below picks the surviving anchor the same way, so a
//! generated board's anchor numbering stays consistent with what the
//! solver and `which_anchor` already assume.

use super::board::{block_cells, collect_adjacent_block_edges, merge_blocks, Board, ANCHOR, EMPTY, MAIN_ANCHOR, WALL};
use super::solver;
use crate::dsf::Dsf;
use crate::rng::RandomSource;
use std::collections::HashSet;

pub struct Generated {
    pub board: Board,
    pub target_cell: usize,
    pub minmoves: usize,
}

/// Builds a `width x height` playing field (plus a one-cell wall border),
/// places the main block in one interior corner and reserves the opposite
/// interior corner as its forcefield-protected target, then alternately
/// deletes singleton blocks and re-merges adjacent blocks, keeping each
/// change only if `solver::solve_board` still succeeds within `move_limit`.
pub fn generate(width: usize, height: usize, move_limit: usize, rng: &mut RandomSource) -> Result<Generated, String> {
    assert!(width >= 2 && height >= 2, "a board needs at least a 2x2 interior");

    let total_w = width + 2;
    let total_h = height + 2;
    let mut cells = vec![WALL; total_w * total_h];
    for row in 1..total_h - 1 {
        for col in 1..total_w - 1 {
            cells[row * total_w + col] = ANCHOR;
        }
    }

    let main_idx = total_w + 1;
    let target_idx = (total_h - 2) * total_w + (total_w - 2);
    cells[main_idx] = MAIN_ANCHOR;

    let mut forcefield = vec![false; total_w * total_h];
    forcefield[target_idx] = true;

    let mut board = Board { width: total_w, height: total_h, cells, forcefield };

    solver::solve_board(&board, target_idx, Some(move_limit))
        .map_err(|_| "a fully-open board must already be solvable".to_string())?;

    delete_singletons(&mut board, main_idx, target_idx, move_limit);
    merge_adjacent_blocks(&mut board, main_idx, target_idx, move_limit, rng);

    let minmoves = solver::solve_board(&board, target_idx, None)
        .map(|moves| moves.len())
        .map_err(|_| "generated board is not solvable".to_string())?;

    Ok(Generated { board, target_cell: target_idx, minmoves })
}

/// Step 3: sweep the interior in reverse row-major order, tentatively
/// emptying each remaining singleton and keeping the deletion iff the board
/// stays solvable within the difficulty's move budget.
fn delete_singletons(board: &mut Board, main_idx: usize, target_idx: usize, move_limit: usize) {
    let mut interior = Vec::new();
    for row in 1..board.height - 1 {
        for col in 1..board.width - 1 {
            let idx = row * board.width + col;
            if idx != main_idx && idx != target_idx {
                interior.push(idx);
            }
        }
    }

    for idx in interior.into_iter().rev() {
        if board.cells[idx] != ANCHOR {
            continue;
        }
        board.cells[idx] = EMPTY;
        if solver::solve_board(board, target_idx, Some(move_limit)).is_err() {
            board.cells[idx] = ANCHOR;
        }
    }
}

/// Step 4: repeatedly shuffle the set of block-adjacency edges and try
/// merging each pair, keeping a merge iff it leaves the board solvable
/// within budget. A [`Dsf`] tracks already-merged pairs so the same two
/// blocks are never retried once joined (via whichever boundary cells first
/// discovered the adjacency), and a `tried` set stops an edge that failed
/// once from being retried forever once its two blocks stop changing.
fn merge_adjacent_blocks(board: &mut Board, main_idx: usize, target_idx: usize, move_limit: usize, rng: &mut RandomSource) {
    let mut dsf = Dsf::new(board.cells.len());
    let mut tried: HashSet<(usize, usize)> = HashSet::new();

    loop {
        let mut edges = collect_adjacent_block_edges(board);
        rng.shuffle_all(&mut edges);

        let mut progressed = false;
        for (a, b) in edges {
            if a == main_idx || b == main_idx {
                continue;
            }
            if tried.contains(&(a, b)) {
                continue;
            }
            tried.insert((a, b));
            if dsf.connected(a, b) {
                continue;
            }

            let blocks = block_cells(board);
            if !blocks.contains_key(&a) || !blocks.contains_key(&b) {
                // One of the two has already been absorbed into a
                // different block since `edges` was computed.
                continue;
            }

            let Some(merged) = merge_blocks(board, a, b) else { continue };
            if solver::solve_board(&merged, target_idx, Some(move_limit)).is_ok() {
                *board = merged;
                dsf.union(a, b);
                progressed = true;
            }
        }

        if !progressed {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_board_is_solvable_within_its_own_minmoves() {
        let mut rng = RandomSource::from_seed_str("generator-test-seed");
        let generated = generate(4, 4, 40, &mut rng).unwrap();
        let moves = solver::solve_board(&generated.board, generated.target_cell, None).unwrap();
        assert_eq!(moves.len(), generated.minmoves);
    }

    #[test]
    fn generated_board_keeps_a_single_main_anchor() {
        let mut rng = RandomSource::from_seed_str("generator-test-seed-2");
        let generated = generate(5, 3, 60, &mut rng).unwrap();
        let mains = generated.board.cells.iter().filter(|&&c| c == MAIN_ANCHOR).count();
        assert_eq!(mains, 1);
    }

    #[test]
    fn different_seeds_can_generate_different_boards() {
        let mut rng_a = RandomSource::from_seed_str("seed-alpha");
        let mut rng_b = RandomSource::from_seed_str("seed-beta");
        let a = generate(5, 5, 80, &mut rng_a).unwrap();
        let b = generate(5, 5, 80, &mut rng_b).unwrap();
        assert_ne!(a.board.cells, b.board.cells);
    }

    #[test]
    fn target_cell_is_never_reachable_by_a_non_main_block() {
        let mut rng = RandomSource::from_seed_str("forcefield-check");
        let generated = generate(4, 4, 40, &mut rng).unwrap();
        assert!(generated.board.forcefield[generated.target_cell]);
    }
}
