use log::{debug, trace};

use crate::attractor::{attractor, attractor_of_set};
use crate::game::{Game, Player, VertexId};
use crate::index::IndexedVec;
use crate::set::VertexSet;
use crate::solution::{RegionStrategy, Solution};
use crate::solve::{CancelToken, ParityGameSolver, SolveError};

/// Priority promotion: grows regions top-down by priority and promotes a
/// region to a higher one whenever the opponent can only escape upwards,
/// until some region is closed and therefore a dominion.
#[derive(Clone, Copy, Debug, Default)]
pub struct PriorityPromotion;

impl ParityGameSolver for PriorityPromotion {
    fn name(&self) -> &'static str {
        "promotion"
    }

    fn solve(&self, game: &Game, cancel: &CancelToken) -> Result<Solution, SolveError> {
        debug_assert!(game.is_total(), "priority promotion requires a total game");

        let mut solution = Solution::empty(game.vertex_count());
        let mut rest = game.clone();
        let mut promotions = 0;

        while let Some(top) = rest.max_priority() {
            cancel.check()?;

            let mut search = Search::new(&rest, cancel);
            let (player, dominion) = search.run(top)?;
            promotions += search.promotions;

            // The attractor of a dominion is a dominion too.
            let mut won = attractor_of_set(&rest, player, &dominion.region);
            won.merge(dominion);
            debug!("promotion: dominion of {} vertices for {player}", won.region.len());

            rest = rest.difference(&won.region);
            solution.get_mut(player).merge(won);
        }

        debug!("promotion: solved {} vertices with {promotions} promotions", game.len());
        Ok(solution)
    }
}

/// State of the search for a single dominion.
struct Search<'a> {
    game: &'a Game,
    cancel: &'a CancelToken,
    /// The priority of the region each vertex currently belongs to, `None`
    /// for vertices not yet assigned to any.
    region: IndexedVec<VertexId, Option<usize>>,
    strategy: IndexedVec<VertexId, Option<VertexId>>,
    promotions: usize,
}

impl<'a> Search<'a> {
    fn new(game: &'a Game, cancel: &'a CancelToken) -> Self {
        let n = game.vertex_count();
        Self {
            game,
            cancel,
            region: IndexedVec::from_elem(None, n),
            strategy: IndexedVec::from_elem(None, n),
            promotions: 0,
        }
    }

    fn run(&mut self, mut p: usize) -> Result<(Player, RegionStrategy), SolveError> {
        let game = self.game;
        let n = game.vertex_count();

        loop {
            self.cancel.check()?;

            let alpha = Player::of_priority(p);

            // Everything not already in a higher region.
            let below = game.vertices().filter(|&v| self.region[v].map_or(true, |r| r <= p));
            let h = game.subgame(&VertexSet::from_vertices(n, below));

            let target = h.vertices().filter(|&v| match self.region[v] {
                Some(r) => r == p,
                None => game.priority(v) == Some(p),
            });
            let z = attractor(&h, alpha, target);

            for v in z.region.iter() {
                self.region[v] = Some(p);
            }
            for (&v, &w) in &z.strategy {
                self.strategy[v] = Some(w);
            }

            let z = z.region;
            let open = z
                .iter()
                .filter(|&v| game.owner(v) == alpha)
                .any(|v| !h.successors(v).any(|w| z.contains(w)));
            let leaky = z
                .iter()
                .filter(|&v| game.owner(v) != alpha)
                .any(|v| h.successors(v).any(|w| !z.contains(w)));

            if open || leaky {
                // Not closed in the subgame: move on to the next lower region,
                // which exists as h is total.
                let rest = h.vertices().filter(|&v| !z.contains(v));
                let lower = rest.filter_map(|v| h.priority(v)).max();
                debug_assert!(lower.is_some(), "an open region leaves vertices outside of it");
                if let Some(next) = lower {
                    p = next;
                    continue;
                }
            }

            for v in z.iter().filter(|&v| game.owner(v) == alpha) {
                if !self.strategy[v].is_some_and(|w| z.contains(w)) {
                    self.strategy[v] = h.successors(v).find(|&w| z.contains(w));
                }
            }

            // The opponent can only escape to higher regions of alpha, since it
            // would have been attracted to any of its own.
            let escape = z
                .iter()
                .filter(|&v| game.owner(v) != alpha)
                .flat_map(|v| game.successors(v))
                .filter(|&w| !z.contains(w))
                .filter_map(|w| self.region[w])
                .min();

            let Some(q) = escape else {
                return Ok((alpha, self.dominion(alpha, z)));
            };

            trace!("promotion: region at {p} of {} vertices promoted to {q}", z.len());
            self.promotions += 1;

            // Lower regions are dissolved, while the promoted one keeps its moves.
            for v in game.vertices().filter(|&v| !z.contains(v)) {
                if self.region[v].is_some_and(|r| r < q) {
                    self.region[v] = None;
                    self.strategy[v] = None;
                }
            }
            for v in z.iter() {
                self.region[v] = Some(q);
            }
            p = q;
        }
    }

    fn dominion(&self, alpha: Player, region: VertexSet) -> RegionStrategy {
        let strategy = region
            .iter()
            .filter(|&v| self.game.owner(v) == alpha)
            .filter_map(|v| Some((v, self.strategy[v]?)))
            .collect();
        RegionStrategy { region, strategy }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn promotion_merges_regions() {
        // 0(P0, 4) -> 1; 1(P1, 1) -> 0, 2; 2(P0, 2) -> 1, 2
        // The region of 2 attracts 1 and can only be left by P1 towards the
        // region of 4, so it is promoted there and the merged region is a
        // dominion of P0.
        let mut builder = Game::builder();
        let v0 = builder.add_vertex(Player::P0, 4);
        let v1 = builder.add_vertex(Player::P1, 1);
        let v2 = builder.add_vertex(Player::P0, 2);
        builder.add_edge(v0, v1).add_edge(v1, v0).add_edge(v1, v2);
        builder.add_edge(v2, v1).add_edge(v2, v2);
        let game = builder.build().unwrap();

        let solution = PriorityPromotion.solve(&game, &CancelToken::new()).unwrap();
        solution.validate(&game).unwrap();
        assert_eq!(solution.region(Player::P0).len(), 3);
        assert_eq!(solution.strategy(Player::P0)[&v0], v1);
        assert_eq!(solution.strategy(Player::P0)[&v2], v1);
    }

    #[test]
    fn dominions_of_both_players() {
        // 0(P1, 5) -> 0, 1; 1(P0, 2) -> 1, 0; 2(P1, 1) -> 1
        let mut builder = Game::builder();
        let v0 = builder.add_vertex(Player::P1, 5);
        let v1 = builder.add_vertex(Player::P0, 2);
        let v2 = builder.add_vertex(Player::P1, 1);
        builder.add_edge(v0, v0).add_edge(v0, v1).add_edge(v1, v1).add_edge(v1, v0);
        builder.add_edge(v2, v1);
        let game = builder.build().unwrap();

        let solution = PriorityPromotion.solve(&game, &CancelToken::new()).unwrap();
        solution.validate(&game).unwrap();
        assert_eq!(solution.winner(v0), Some(Player::P1));
        assert_eq!(solution.winner(v1), Some(Player::P0));
        assert_eq!(solution.winner(v2), Some(Player::P0));
        assert_eq!(solution.strategy(Player::P1)[&v0], v0);
        assert_eq!(solution.strategy(Player::P0)[&v1], v1);
    }

    #[test]
    fn cancelled_before_first_dominion() {
        let mut builder = Game::builder();
        let v0 = builder.add_vertex(Player::P1, 1);
        builder.add_edge(v0, v0);
        let game = builder.build().unwrap();

        let cancel = CancelToken::new();
        cancel.cancel();
        assert_eq!(PriorityPromotion.solve(&game, &cancel), Err(SolveError::Cancelled));
    }
}
