use log::{debug, trace};

use crate::attractor::{attractor, attractor_of_set};
use crate::game::{Game, Player};
use crate::solution::{RegionStrategy, Solution};
use crate::solve::{CancelToken, ParityGameSolver, SolveError};

/// Zielonka's recursive algorithm: peel off the attractor of the highest
/// priority and solve what remains.
#[derive(Clone, Copy, Debug, Default)]
pub struct Zielonka;

impl ParityGameSolver for Zielonka {
    fn name(&self) -> &'static str {
        "zielonka"
    }

    fn solve(&self, game: &Game, cancel: &CancelToken) -> Result<Solution, SolveError> {
        debug_assert!(game.is_total(), "Zielonka's algorithm requires a total game");

        let mut calls = 0;
        let solution = solve_recursive(game, cancel, 0, &mut calls)?;
        debug!("zielonka: {} vertices solved in {calls} recursive calls", game.len());
        Ok(solution)
    }
}

fn solve_recursive(
    game: &Game,
    cancel: &CancelToken,
    depth: usize,
    calls: &mut usize,
) -> Result<Solution, SolveError> {
    cancel.check()?;
    *calls += 1;

    // Games reached here are total, so no vertices also means no edges.
    let Some(d) = game.max_priority() else {
        return Ok(Solution::empty(game.vertex_count()));
    };

    let p = Player::of_priority(d);
    let j = p.opponent();

    let top = game.vertices_with_priority(d);
    let a = attractor(game, p, top);
    trace!("{:depth$}d = {d}, |G| = {}, |A| = {}", "", game.len(), a.region.len());

    let sub = solve_recursive(&game.difference(&a.region), cancel, depth + 1, calls)?;

    if sub.region(j).is_empty() {
        let [mut won, _] = reorder(sub, p);
        won.merge(a);

        // Any move of p on the top priority vertices stays in the game, which p
        // wins entirely.
        for v in game.vertices_with_priority(d).filter(|&v| game.owner(v) == p) {
            if let Some(w) = game.successors(v).next() {
                won.strategy.entry(v).or_insert(w);
            }
        }

        let lost = RegionStrategy::empty(game.vertex_count());
        return Ok(Solution::from_winner(p, won, lost));
    }

    let [_, sub_j] = reorder(sub, p);
    let b = attractor_of_set(game, j, &sub_j.region);
    trace!("{:depth$}|B| = {}", "", b.region.len());

    let sub = solve_recursive(&game.difference(&b.region), cancel, depth + 1, calls)?;
    let [won, mut lost] = reorder(sub, p);
    lost.merge(b);
    lost.merge(sub_j);

    Ok(Solution::from_winner(p, won, lost))
}

/// Splits a solution into the part of `p` and the part of its opponent.
fn reorder(solution: Solution, p: Player) -> [RegionStrategy; 2] {
    let [p0, p1] = solution.into_parts();
    match p {
        Player::P0 => [p0, p1],
        Player::P1 => [p1, p0],
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::game::VertexId;

    #[test]
    fn two_vertex_cycle() {
        let mut builder = Game::builder();
        let v0 = builder.add_vertex(Player::P0, 2);
        let v1 = builder.add_vertex(Player::P1, 1);
        builder.add_edge(v0, v1).add_edge(v1, v0);
        let game = builder.build().unwrap();

        let solution = Zielonka.solve(&game, &CancelToken::new()).unwrap();
        assert_eq!(solution.region(Player::P0).len(), 2);
        assert!(solution.region(Player::P1).is_empty());
        assert_eq!(solution.strategy(Player::P0).get(&v0), Some(&v1));
        assert_eq!(solution.strategy(Player::P0).get(&v1), None);
        solution.validate(&game).unwrap();
    }

    #[test]
    fn odd_self_loop() {
        let mut builder = Game::builder();
        let v0 = builder.add_vertex(Player::P0, 1);
        builder.add_edge(v0, v0);
        let game = builder.build().unwrap();

        let solution = Zielonka.solve(&game, &CancelToken::new()).unwrap();
        assert!(solution.region(Player::P0).is_empty());
        assert_eq!(solution.winner(VertexId(0)), Some(Player::P1));
        solution.validate(&game).unwrap();
    }

    #[test]
    fn second_recursion() {
        // 0(P1, 3) -> 1; 1(P0, 2) -> 0, 2; 2(P0, 0) -> 2; 3(P1, 1) -> 3, 0
        // P0 leaves the odd cycle through 0 for the even self loop at 2, while
        // P1 keeps the play on the odd self loop at 3.
        let mut builder = Game::builder();
        let v0 = builder.add_vertex(Player::P1, 3);
        let v1 = builder.add_vertex(Player::P0, 2);
        let v2 = builder.add_vertex(Player::P0, 0);
        let v3 = builder.add_vertex(Player::P1, 1);
        builder.add_edge(v0, v1).add_edge(v1, v0).add_edge(v1, v2).add_edge(v2, v2);
        builder.add_edge(v3, v3).add_edge(v3, v0);
        let game = builder.build().unwrap();

        let solution = Zielonka.solve(&game, &CancelToken::new()).unwrap();
        solution.validate(&game).unwrap();
        assert_eq!(solution.winner(v0), Some(Player::P0));
        assert_eq!(solution.winner(v1), Some(Player::P0));
        assert_eq!(solution.winner(v2), Some(Player::P0));
        assert_eq!(solution.winner(v3), Some(Player::P1));
        assert_eq!(solution.strategy(Player::P0)[&v1], v2);
        assert_eq!(solution.strategy(Player::P1)[&v3], v3);
    }

    #[test]
    fn cancelled() {
        let mut builder = Game::builder();
        let v0 = builder.add_vertex(Player::P0, 0);
        builder.add_edge(v0, v0);
        let game = builder.build().unwrap();

        let cancel = CancelToken::new();
        cancel.cancel();
        assert_eq!(Zielonka.solve(&game, &cancel), Err(SolveError::Cancelled));
    }
}
