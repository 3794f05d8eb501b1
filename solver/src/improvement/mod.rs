mod valuation;


use std::cmp::Reverse;

use either::Either;
use log::{debug, trace};

use crate::game::{Game, Player, VertexId};
use crate::index::IndexedVec;
use crate::set::VertexSet;
use crate::solution::Solution;
use crate::solve::{CancelToken, ParityGameSolver, SolveError};

/// Discrete strategy improvement with the valuation of Vöge and Jurdziński.
///
/// The strategy of [`Player::P0`] is improved until no vertex can switch to a
/// successor with a better play profile. The last valuation also gives the
/// best response of [`Player::P1`], which is used as its strategy.
#[derive(Clone, Copy, Debug, Default)]
pub struct StrategyImprovement {
    /// Give up with [`SolveError::IterationLimit`] after this many improving
    /// steps.
    pub max_iterations: Option<usize>,
}

impl ParityGameSolver for StrategyImprovement {
    fn name(&self) -> &'static str {
        "improvement"
    }

    fn solve(&self, game: &Game, cancel: &CancelToken) -> Result<Solution, SolveError> {
        debug_assert!(game.is_total(), "strategy improvement requires a total game");

        let mut solver = Improvement::new(game);
        let iterations = solver.run(self.max_iterations, cancel)?;
        debug!("improvement: {} vertices solved in {iterations} iterations", game.len());

        Ok(solver.into_solution())
    }
}

/// Total order on vertices: by priority, then by id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Relevance(usize, VertexId);

impl Relevance {
    fn winner(self) -> Player {
        Player::of_priority(self.0)
    }

    fn reward(self) -> Reward {
        match self.winner() {
            Player::P0 => Reward::P0(self),
            Player::P1 => Reward::P1(Reverse(self)),
        }
    }
}

/// How good visiting a vertex is for [`Player::P0`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Reward {
    P1(Reverse<Relevance>),
    Neutral,
    P0(Relevance),
}

/// The play from a vertex when both players follow `moves`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Profile {
    /// Most relevant vertex of the cycle the play ends in.
    cycle: VertexId,
    /// Vertices more relevant than `cycle` met on the way, most relevant first.
    before: Vec<VertexId>,
    /// Number of vertices visited before `cycle`.
    distance: usize,
}

/// Value of a successor for [`Player::P0`]; the best successor is the
/// greatest.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Preference {
    cycle: Reward,
    /// Rewards of the vertices before the cycle, closed by `Reward::Neutral`
    /// so that a prefix compares below any P0 reward and above any P1 one.
    before: Vec<Reward>,
    distance: Distance,
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Distance {
    /// The deciding vertex is itself the head of its cycle.
    Ignored,
    /// Losing plays are better when they take longer.
    Longer(usize),
    /// Winning plays are better when they end sooner.
    Shorter(Reverse<usize>),
}

struct Improvement<'a> {
    game: &'a Game,
    priorities: IndexedVec<VertexId, usize>,

    /// The move chosen at every vertex: the strategy being improved for P0,
    /// the best response found by the last valuation for P1.
    moves: IndexedVec<VertexId, VertexId>,

    profiles: IndexedVec<VertexId, Profile>,
    evaluated: VertexSet,
}

impl<'a> Improvement<'a> {
    fn new(game: &'a Game) -> Self {
        let n = game.vertex_count();

        let mut priorities = IndexedVec::from_elem(0, n);
        for p in game.priorities() {
            for v in game.vertices_with_priority(p) {
                priorities[v] = p;
            }
        }

        let mut moves = IndexedVec::from_elem(VertexId(0), n);
        for v in game.vertices() {
            if let Some(w) = game.successors(v).next() {
                moves[v] = w;
            }
        }

        Self {
            game,
            priorities,
            moves,
            profiles: IndexedVec::from_elem(Profile::default(), n),
            evaluated: VertexSet::new(n),
        }
    }

    /// Alternates valuations and improvements until the strategy is stable,
    /// returning the number of improving steps.
    fn run(
        &mut self,
        max_iterations: Option<usize>,
        cancel: &CancelToken,
    ) -> Result<usize, SolveError> {
        let mut iterations = 0;

        loop {
            cancel.check()?;

            self.valuation();
            if !self.improve() {
                return Ok(iterations);
            }

            iterations += 1;
            trace!("improvement: iteration {iterations}");

            if let Some(max) = max_iterations.filter(|&max| iterations > max) {
                return Err(SolveError::IterationLimit(max));
            }
        }
    }

    fn relevance_of(&self, v: VertexId) -> Relevance {
        Relevance(self.priorities[v], v)
    }

    fn reward_of(&self, v: VertexId) -> Reward {
        self.relevance_of(v).reward()
    }

    fn winner_of(&self, v: VertexId) -> Player {
        self.relevance_of(self.profiles[v].cycle).winner()
    }

    /// Successors of `u` in the game restricted to the current moves of P0.
    fn strat_succs(&self, u: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        match self.game.owner(u) {
            Player::P0 => Either::Left(std::iter::once(self.moves[u])),
            Player::P1 => Either::Right(self.game.successors(u)),
        }
    }

    /// Predecessors of `v` in the game restricted to the current moves of P0.
    fn strat_preds(&self, v: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.game
            .predecessors(v)
            .filter(move |&u| self.game.owner(u) == Player::P1 || self.moves[u] == v)
    }

    /// Value for P0 of moving from `u` to `v` under the last valuation.
    fn preference(&self, u: VertexId, v: VertexId) -> Preference {
        let profile = &self.profiles[v];

        let cycle = self.reward_of(profile.cycle);
        let before = profile.before.iter().map(|&x| self.reward_of(x));
        let before = before.chain([Reward::Neutral]).collect();
        let distance = match (self.profiles[u].cycle == u, self.winner_of(v)) {
            (true, _) => Distance::Ignored,
            (false, Player::P0) => Distance::Shorter(Reverse(profile.distance)),
            (false, Player::P1) => Distance::Longer(profile.distance),
        };

        Preference { cycle, before, distance }
    }

    /// Switches every P0 vertex to its best successor if that is strictly
    /// better than its current move. Returns whether any move changed.
    fn improve(&mut self) -> bool {
        let game = self.game;
        let mut improved = false;

        for u in game.vertices().filter(|&u| game.owner(u) == Player::P0) {
            let current = self.preference(u, self.moves[u]);
            let best = game
                .successors(u)
                .map(|v| (self.preference(u, v), v))
                .max_by(|(a, _), (b, _)| a.cmp(b));

            if let Some((_, v)) = best.filter(|(best, _)| *best > current) {
                self.moves[u] = v;
                improved = true;
            }
        }

        improved
    }

    fn into_solution(self) -> Solution {
        let n = self.game.vertex_count();
        let mut solution = Solution::empty(n);

        for v in self.game.vertices() {
            let winner = self.winner_of(v);
            let won = solution.get_mut(winner);

            won.region.insert(v);
            if self.game.owner(v) == winner {
                won.strategy.insert(v, self.moves[v]);
            }
        }

        solution
    }
}
