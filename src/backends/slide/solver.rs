//! Outer BFS over whole boards (spec §4.F): expand every block's
//! [`reachable_moves`] from the current board, stopping the first time the
//! main block's anchor lands on the target cell. Visited boards are keyed
//! in a `BTreeMap` ordered by their byte arrays (`Board`'s `Ord` impl),
//! mirroring the generic BFS shape grounded on
//! `other_examples/28c039a1_tov-klotski-rs__src-generic_solver.rs.rs`'s
//! `Solver`, adapted to reconstruct the move list from predecessor pointers
//! stored alongside each visited board rather than cloning whole paths,
//! cheaper once the state space gets large.

use super::board::{block_cells, reachable_moves, Board, MAIN_ANCHOR};
use std::collections::{BTreeMap, VecDeque};

/// One step of the solution: `(anchor moved, its new position)`.
pub type Move = (usize, usize);

struct VisitedEntry {
    distance: usize,
    predecessor: Option<Board>,
    step: Option<Move>,
}

/// Finds a shortest sequence of block moves taking `initial` to a board
/// where `target_cell` holds the main anchor. `move_limit`, if given,
/// bounds the search depth (used by the generator's solvability probes to
/// stay within a puzzle's declared difficulty).
pub fn solve_board(initial: &Board, target_cell: usize, move_limit: Option<usize>) -> Result<Vec<Move>, String> {
    if initial.cells[target_cell] == MAIN_ANCHOR {
        return Ok(Vec::new());
    }

    let mut visited: BTreeMap<Board, VisitedEntry> = BTreeMap::new();
    visited.insert(initial.clone(), VisitedEntry { distance: 0, predecessor: None, step: None });
    let mut queue: VecDeque<Board> = VecDeque::new();
    queue.push_back(initial.clone());

    while let Some(head) = queue.pop_front() {
        let distance = visited[&head].distance;
        if let Some(limit) = move_limit {
            if distance >= limit {
                continue;
            }
        }

        let blocks = block_cells(&head);
        for (&anchor_idx, cells) in &blocks {
            for candidate in reachable_moves(&head, anchor_idx, cells) {
                if visited.contains_key(&candidate.board) {
                    continue;
                }
                let is_win = candidate.board.cells[target_cell] == MAIN_ANCHOR;
                visited.insert(
                    candidate.board.clone(),
                    VisitedEntry {
                        distance: distance + 1,
                        predecessor: Some(head.clone()),
                        step: Some((candidate.moved_anchor, candidate.new_anchor)),
                    },
                );
                if is_win {
                    return Ok(reconstruct(&visited, &candidate.board));
                }
                queue.push_back(candidate.board);
            }
        }
    }

    Err("no sequence of moves reaches the target".to_string())
}

fn reconstruct(visited: &BTreeMap<Board, VisitedEntry>, goal: &Board) -> Vec<Move> {
    let mut moves = Vec::new();
    let mut current = goal.clone();
    loop {
        let entry = &visited[&current];
        match (&entry.predecessor, entry.step) {
            (Some(prev), Some(step)) => {
                moves.push(step);
                current = prev.clone();
            }
            _ => break,
        }
    }
    moves.reverse();
    moves
}

#[cfg(test)]
mod tests {
    use super::super::board::{ANCHOR, EMPTY, WALL};
    use super::*;

    fn open_row(width: usize) -> Board {
        // 1 interior row, `width` total columns including border walls.
        let mut cells = vec![WALL; width];
        for c in cells.iter_mut().take(width - 1).skip(1) {
            *c = EMPTY;
        }
        Board { width, height: 1, cells, forcefield: vec![false; width] }
    }

    #[test]
    fn solves_a_trivial_single_step_slide() {
        let mut board = open_row(5);
        board.cells[1] = MAIN_ANCHOR;
        let moves = solve_board(&board, 3, None).unwrap();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0], (1, 3));
    }

    #[test]
    fn already_solved_returns_no_moves() {
        let mut board = open_row(5);
        board.cells[2] = MAIN_ANCHOR;
        let moves = solve_board(&board, 2, None).unwrap();
        assert!(moves.is_empty());
    }

    #[test]
    fn unreachable_target_is_reported_unsolvable() {
        // target cell sits on a wall: can never hold the main anchor.
        let mut board = open_row(5);
        board.cells[1] = MAIN_ANCHOR;
        let result = solve_board(&board, 0, None);
        assert!(result.is_err());
    }

    #[test]
    fn move_limit_can_make_a_solvable_board_report_unsolvable() {
        let width = 8;
        let mut board = open_row(width);
        board.cells[1] = MAIN_ANCHOR;
        let target = width - 2;
        assert!(solve_board(&board, target, None).is_ok());
        assert!(solve_board(&board, target, Some(1)).is_err());
    }

    #[test]
    fn a_trailing_block_can_obstruct_or_free_the_main_block() {
        // main block at col 1, a second singleton block at col 2 blocking a
        // direct slide; the solver must move the blocker out of the way
        // first, then slide the main block through.
        let width = 6;
        let mut cells = vec![WALL; width];
        for c in cells.iter_mut().take(width - 1).skip(1) {
            *c = EMPTY;
        }
        cells[1] = MAIN_ANCHOR;
        cells[2] = ANCHOR;
        let board = Board { width, height: 1, cells, forcefield: vec![false; width] };
        let moves = solve_board(&board, width - 2, None).unwrap();
        assert!(moves.len() >= 2);
    }
}
