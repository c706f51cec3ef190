//! The multi-stage deductive solver (spec §4.G): three escalating
//! propagation passes, gated by difficulty, no search step beyond them.
//! Pass 3's "does forcing this edge isolate a satisfied sub-component"
//! check is built on [`crate::dsf::Dsf`]'s snapshot/restore via `Clone`
//! (grounded directly on spec §4.G's note that a plain byte-copy
//! save/restore suffices since a `Dsf` only ever accumulates unions).

use super::board::{Board, MAX_BRIDGES};
use crate::dsf::Dsf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// The three outcomes spec §4.G names: "solved / impossible / stuck".
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    /// Deduction, within the requested difficulty boundary, reached a fully
    /// solved board.
    Solved(Board),
    /// A necessary condition is already violated, so no assignment of
    /// bridges can solve this board regardless of how much search is spent.
    Impossible(String),
    /// Deduction made no further progress short of a solved board. A
    /// solution may still exist; finding it would require search beyond
    /// what this difficulty boundary performs.
    Stuck,
}

/// Runs deduction, and only deduction, up to the pass boundary `difficulty`
/// names, then classifies the result. There is no backtracking search here:
/// at `Hard` this still only means "passes 1 through 3", never "guess and
/// check", so `Stuck` is a reachable outcome at every difficulty.
pub fn solve(board: &Board, difficulty: Difficulty, no_loops: bool) -> SolveOutcome {
    let mut board = board.clone();
    let mut forbidden = vec![false; board.candidates.len()];
    deduce(&mut board, difficulty, no_loops, &mut forbidden);

    if board.is_solved() {
        return SolveOutcome::Solved(board);
    }
    if let Some(reason) = contradiction(&board, &forbidden) {
        return SolveOutcome::Impossible(reason);
    }
    SolveOutcome::Stuck
}

/// Runs passes 1 (and 2, at `Medium`+, and 3, at `Hard`) to a fixed point:
/// repeats until a full sweep makes no further change.
fn deduce(board: &mut Board, difficulty: Difficulty, no_loops: bool, forbidden: &mut [bool]) {
    loop {
        let mut changed = false;
        changed |= pass_one_per_island(board, forbidden);
        if difficulty >= Difficulty::Medium {
            changed |= pass_two_per_edge(board, no_loops, forbidden);
        }
        if difficulty == Difficulty::Hard {
            changed |= pass_three_isolation(board, forbidden);
        }
        if !changed {
            break;
        }
    }
}

fn spare_capacity(board: &Board, forbidden: &[bool], candidate: usize) -> u8 {
    if forbidden[candidate] { 0 } else { MAX_BRIDGES - board.bridges[candidate] }
}

/// A necessary-condition check that catches definite impossibility without
/// any search: either some island's drawn degree already exceeds its clue,
/// or some island can no longer reach its clue with the candidates still
/// open to it (spare capacity of anything not forbidden or already maxed).
fn contradiction(board: &Board, forbidden: &[bool]) -> Option<String> {
    for island in 0..board.islands.len() {
        let clue = board.islands[island].clue as u32;
        let current = board.degree(island);
        if current > clue {
            return Some(format!("island {island} carries more bridges than its clue allows"));
        }
        let remaining = clue - current;
        let reachable: u32 = board.candidates_of(island).iter().map(|&c| spare_capacity(board, forbidden, c) as u32).sum();
        if remaining > reachable {
            return Some(format!("island {island} cannot reach its clue with the candidates left open to it"));
        }
    }
    None
}

/// Pass 1: per-island forcing. `clue == current + free capacity` means
/// every remaining slot must be filled; `clue > (neighbours - 1) * max`
/// means every direction needs at least one bridge.
fn pass_one_per_island(board: &mut Board, forbidden: &[bool]) -> bool {
    let mut changed = false;
    for island in 0..board.islands.len() {
        let clue = board.islands[island].clue as u32;
        let candidates = board.candidates_of(island);
        let current = board.degree(island);
        if current > clue {
            continue; // inconsistent state; reported by `contradiction`, not fixed here.
        }
        let remaining = clue - current;
        let free_capacity: u32 = candidates.iter().map(|&c| spare_capacity(board, forbidden, c) as u32).sum();

        if remaining == free_capacity && remaining > 0 {
            for &c in &candidates {
                let spare = spare_capacity(board, forbidden, c);
                if spare > 0 && !board.crosses_a_drawn_bridge(c) {
                    board.bridges[c] += spare;
                    changed = true;
                }
            }
        }

        let n = candidates.len() as u32;
        if n > 0 && clue > (n - 1) * MAX_BRIDGES as u32 {
            for &c in &candidates {
                if board.bridges[c] == 0 && !forbidden[c] && !board.crosses_a_drawn_bridge(c) {
                    board.bridges[c] = 1;
                    changed = true;
                }
            }
        }
    }
    changed
}

/// Pass 2: per-edge forcing, plus (at `no_loops`) actually forbidding any
/// candidate that would join two islands already connected elsewhere in the
/// bridge graph, rather than merely detecting it.
fn pass_two_per_edge(board: &mut Board, no_loops: bool, forbidden: &mut [bool]) -> bool {
    let mut changed = false;

    if no_loops {
        let mut dsf = Dsf::new(board.islands.len());
        for (i, c) in board.candidates.iter().enumerate() {
            if board.bridges[i] > 0 {
                dsf.union(c.a, c.b);
            }
        }
        for i in 0..board.candidates.len() {
            let c = board.candidates[i];
            if board.bridges[i] == 0 && !forbidden[i] && dsf.connected(c.a, c.b) {
                forbidden[i] = true;
                changed = true;
            }
        }
    }

    for island in 0..board.islands.len() {
        let clue = board.islands[island].clue as u32;
        let current = board.degree(island);
        if current >= clue {
            continue;
        }
        let remaining = clue - current;
        let candidates = board.candidates_of(island);
        let undetermined: Vec<usize> = candidates.iter().copied().filter(|&c| spare_capacity(board, forbidden, c) > 0).collect();

        let available_elsewhere_if_skip = |skip: usize| -> u32 {
            undetermined.iter().filter(|&&c| c != skip).map(|&c| spare_capacity(board, forbidden, c) as u32).sum()
        };

        for &c in &undetermined {
            if board.bridges[c] > 0 {
                continue;
            }
            if available_elsewhere_if_skip(c) < remaining {
                if !board.crosses_a_drawn_bridge(c) {
                    board.bridges[c] = 1;
                    changed = true;
                }
            }
        }
    }
    changed
}

/// Pass 3 (subgroup isolation, approximated): a snapshot/restore `Dsf`
/// walk over the currently-forced graph, used only to detect the one
/// unambiguous case, exactly two components remain, and a given
/// undetermined candidate is the *only* open edge joining them, in which
/// case the graph can never become fully connected without it, so at least
/// one bridge is forced there. Unlike a full subgroup-isolation search,
/// this never commits a candidate straight to its maximum: it only raises
/// a floor of 1, leaving the rest to further deduction. An earlier, more
/// eager version of this pass (committing straight to `MAX_BRIDGES`
/// whenever a trial produced *a* satisfied sub-component) could strand the
/// true solution by exhausting an edge's spare capacity, so it was replaced
/// with this more conservative rule.
fn pass_three_isolation(board: &mut Board, forbidden: &[bool]) -> bool {
    let mut dsf = Dsf::new(board.islands.len());
    for (i, c) in board.candidates.iter().enumerate() {
        if board.bridges[i] > 0 {
            dsf.union(c.a, c.b);
        }
    }

    let component_count = (0..board.islands.len()).map(|i| dsf.clone().find_root(i)).collect::<std::collections::HashSet<_>>().len();
    if component_count != 2 {
        return false;
    }

    let mut changed = false;
    for c in 0..board.candidates.len() {
        if board.bridges[c] > 0 || board.crosses_a_drawn_bridge(c) || forbidden[c] {
            continue;
        }
        let cand = board.candidates[c];
        let mut trial = dsf.clone();
        if trial.connected(cand.a, cand.b) {
            continue; // already in the same component; not a cross-link
        }
        let (ra, rb) = (trial.find_root(cand.a), trial.find_root(cand.b));

        let is_unique_link = !(0..board.candidates.len()).any(|other| {
            if other == c || board.bridges[other] > 0 || forbidden[other] {
                return false;
            }
            let oc = board.candidates[other];
            let mut d2 = dsf.clone();
            let (roa, rob) = (d2.find_root(oc.a), d2.find_root(oc.b));
            (roa == ra && rob == rb) || (roa == rb && rob == ra)
        });

        if is_unique_link {
            board.bridges[c] = 1;
            changed = true;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::super::board::{Board, Island};
    use super::*;

    #[test]
    fn pass_one_fills_a_fully_determined_island() {
        // a single edge, clue exactly matches its max capacity.
        let islands = vec![Island { x: 0, y: 0, clue: 2 }, Island { x: 2, y: 0, clue: 2 }];
        let mut board = Board::new(3, 1, islands);
        let forbidden = vec![false; board.candidates.len()];
        pass_one_per_island(&mut board, &forbidden);
        assert_eq!(board.bridges[0], 2);
    }

    #[test]
    fn easy_difficulty_solves_a_fully_forced_board() {
        let islands = vec![Island { x: 0, y: 0, clue: 1 }, Island { x: 2, y: 0, clue: 1 }];
        let board = Board::new(3, 1, islands);
        assert_eq!(solve(&board, Difficulty::Easy, false), SolveOutcome::Solved(board_with_bridge(&board, 0, 1)));
    }

    fn board_with_bridge(board: &Board, candidate: usize, count: u8) -> Board {
        let mut solved = board.clone();
        solved.bridges[candidate] = count;
        solved
    }

    #[test]
    fn hard_difficulty_reports_stuck_when_only_guessing_would_finish_it() {
        // A square of 4 islands each needing 2: the unique solution is a
        // ring (one bridge per edge), but no per-island, per-edge, or
        // isolation rule fires on this symmetric layout, so deduction alone
        // cannot finish it even at the Hard boundary.
        let islands = vec![
            Island { x: 0, y: 0, clue: 2 },
            Island { x: 2, y: 0, clue: 2 },
            Island { x: 0, y: 2, clue: 2 },
            Island { x: 2, y: 2, clue: 2 },
        ];
        let board = Board::new(3, 3, islands);
        assert_eq!(solve(&board, Difficulty::Hard, false), SolveOutcome::Stuck);
    }

    #[test]
    fn impossible_board_is_reported_without_any_search() {
        // Single edge, clue 3 but a lone neighbour can carry at most
        // `MAX_BRIDGES` (2): no assignment can ever satisfy this island.
        let islands = vec![Island { x: 0, y: 0, clue: 3 }, Island { x: 2, y: 0, clue: 3 }];
        let board = Board::new(3, 1, islands);
        assert!(matches!(solve(&board, Difficulty::Hard, false), SolveOutcome::Impossible(_)));
    }

    #[test]
    fn no_loops_forbids_a_bridge_that_would_close_a_cycle() {
        // Ring of 4 islands, three of the four ring edges already drawn:
        // the fourth (candidate 3, joining islands 2 and 3) would close a
        // cycle through the other three, so pass 2 must forbid it outright.
        let islands = vec![
            Island { x: 0, y: 0, clue: 0 },
            Island { x: 2, y: 0, clue: 0 },
            Island { x: 0, y: 2, clue: 0 },
            Island { x: 2, y: 2, clue: 0 },
        ];
        let mut board = Board::new(3, 3, islands);
        for c in 0..3 {
            board.bridges[c] = 1;
        }
        let mut forbidden = vec![false; board.candidates.len()];
        pass_two_per_edge(&mut board, true, &mut forbidden);
        assert!(forbidden[3]);
    }
}
