use crate::game::{Game, Player, VertexId};
use crate::index::IndexedVec;
use crate::set::VertexSet;
use crate::solution::RegionStrategy;

/// Computes the set of vertices from which `player` can force the play into
/// `target`, together with the moves that do so.
///
/// Target vertices outside the active set of `game` are ignored. Moves are
/// recorded only for the attracted vertices owned by `player`; the target
/// vertices themselves get none.
pub fn attractor(
    game: &Game,
    player: Player,
    target: impl IntoIterator<Item = VertexId>,
) -> RegionStrategy {
    let mut attr = RegionStrategy::empty(game.vertex_count());

    // Number of successors of an opponent vertex not yet known to be in the
    // attractor, computed the first time the vertex is reached.
    let mut remaining: IndexedVec<VertexId, Option<usize>> =
        IndexedVec::from_elem(None, game.vertex_count());

    let mut queue = Vec::new();
    for v in target.into_iter().filter(|&v| game.contains(v)) {
        if attr.region.insert(v) {
            queue.push(v);
        }
    }

    // Backward BFS from the target.
    while let Some(v) = queue.pop() {
        for u in game.predecessors(v) {
            if attr.region.contains(u) {
                continue;
            }

            if game.owner(u) == player {
                attr.strategy.insert(u, v);
            } else {
                let count = remaining[u].get_or_insert_with(|| game.successors(u).count());
                *count -= 1;
                if *count != 0 {
                    continue;
                }
            }

            attr.region.insert(u);
            queue.push(u);
        }
    }

    attr
}

/// Like [`attractor`], but `target` is given as a set.
pub fn attractor_of_set(game: &Game, player: Player, target: &VertexSet) -> RegionStrategy {
    attractor(game, player, target.iter())
}

#[cfg(test)]
mod test {
    use super::*;

    // Vertices 0..6, edges:
    //   0(P0) -> 1, 2
    //   1(P1) -> 0, 3
    //   2(P1) -> 3
    //   3(P0) -> 3
    //   4(P1) -> 2, 5
    //   5(P0) -> 4
    fn sample() -> Game {
        let owners = [Player::P0, Player::P1, Player::P1, Player::P0, Player::P1, Player::P0];
        let edges = [(0, 1), (0, 2), (1, 0), (1, 3), (2, 3), (3, 3), (4, 2), (4, 5), (5, 4)];

        let mut builder = Game::builder();
        for owner in owners {
            builder.add_vertex(owner, 0);
        }
        for (u, v) in edges {
            builder.add_edge(VertexId(u), VertexId(v));
        }
        builder.build().unwrap()
    }

    fn set(vs: &[usize]) -> VertexSet {
        VertexSet::from_vertices(6, vs.iter().map(|&v| VertexId(v)))
    }

    #[test]
    fn attractor_for_p0() {
        let game = sample();
        let attr = attractor(&game, Player::P0, [VertexId(3)]);

        // 2 is forced into 3, 0 can choose 2, 1 can escape to 0 only to be
        // attracted too, while 4 can always escape to 5 and back.
        assert_eq!(attr.region, set(&[0, 1, 2, 3]));
        assert_eq!(attr.strategy.len(), 1);
        assert_eq!(attr.strategy[&VertexId(0)], VertexId(2));
    }

    #[test]
    fn attractor_for_p1() {
        let game = sample();
        let attr = attractor(&game, Player::P1, [VertexId(2)]);

        // 4 chooses 2 and 5 is forced into 4, while 0 avoids 2 by moving to 1,
        // from which there is no way back to 2.
        assert_eq!(attr.region, set(&[2, 4, 5]));
        assert_eq!(attr.strategy.len(), 1);
        assert_eq!(attr.strategy[&VertexId(4)], VertexId(2));
    }

    #[test]
    fn attractor_respects_active_set() {
        let game = sample().difference(&set(&[2]));
        let attr = attractor(&game, Player::P0, [VertexId(2), VertexId(3)]);

        // 1 keeps the play on the cycle with 0 forever.
        assert_eq!(attr.region, set(&[3]));
        assert!(attr.strategy.is_empty());
    }

    #[test]
    fn attractor_is_closed() {
        let game = sample();
        for player in Player::BOTH {
            for t in game.vertices() {
                let attr = attractor(&game, player, [t]);
                for v in game.vertices().filter(|&v| !attr.region.contains(v)) {
                    let mut succs = game.successors(v).map(|w| attr.region.contains(w));
                    let attracted = match game.owner(v) == player {
                        true => succs.any(|b| b),
                        false => succs.all(|b| b),
                    };
                    assert!(!attracted, "vertex {v} should be attracted to {t} for {player}");
                }
                for (&v, &w) in &attr.strategy {
                    assert_eq!(game.owner(v), player);
                    assert!(attr.region.contains(w));
                    assert!(game.successors(v).any(|u| u == w));
                }
            }
        }
    }
}
