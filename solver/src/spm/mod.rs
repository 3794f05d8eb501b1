mod lifting;
mod measure;


use log::{debug, trace};

pub use lifting::{LiftingPolicy, LiftingStrategy, LinearLifting, PredecessorLifting};
pub use measure::Measure;

use crate::game::{Game, Player, VertexId};
use crate::index::IndexedVec;
use crate::set::VertexSet;
use crate::solution::{RegionStrategy, Solution};
use crate::solve::{CancelToken, ParityGameSolver, SolveError};

/// Jurdziński's small progress measures.
///
/// Measures are computed for [`Player::P0`] first. The vertices left at the
/// top are won by [`Player::P1`]; they form a trap for P0, so P1's strategy is
/// obtained from the dual measures on that subgame.
#[derive(Clone, Copy, Debug, Default)]
pub struct SmallProgressMeasures {
    pub lifting: LiftingPolicy,
}

impl SmallProgressMeasures {
    pub fn new(lifting: LiftingPolicy) -> Self {
        Self { lifting }
    }

    /// Computes the region and strategy of `player` in `game`, returning the
    /// remaining vertices as well.
    fn solve_for(
        &self,
        game: &Game,
        player: Player,
        cancel: &CancelToken,
    ) -> Result<(RegionStrategy, VertexSet), SolveError> {
        let mut measures = ProgressMeasures::new(game, player);
        let lifts = match self.lifting {
            LiftingPolicy::Linear => measures.run(&mut LinearLifting::new(game), cancel)?,
            LiftingPolicy::Predecessor => {
                measures.run(&mut PredecessorLifting::new(game), cancel)?
            }
        };
        trace!("spm: {lifts} lifts for {player} on {} vertices", game.len());

        Ok(measures.into_solution())
    }
}

impl ParityGameSolver for SmallProgressMeasures {
    fn name(&self) -> &'static str {
        match self.lifting {
            LiftingPolicy::Linear => "spm-linear",
            LiftingPolicy::Predecessor => "spm",
        }
    }

    fn solve(&self, game: &Game, cancel: &CancelToken) -> Result<Solution, SolveError> {
        debug_assert!(game.is_total(), "progress measures require a total game");

        let (won0, lost0) = self.solve_for(game, Player::P0, cancel)?;
        let (won1, lost1) = self.solve_for(&game.subgame(&lost0), Player::P1, cancel)?;
        debug_assert!(lost1.is_empty(), "dual measures disagree on {lost1:?}");

        debug!("spm: {} vertices won by P0, {} by P1", won0.region.len(), won1.region.len());
        Ok(Solution::new(won0, won1))
    }
}

/// Progress measures certifying the region won by `player`.
///
/// Counters are kept only for the priorities favouring the opponent; the
/// others stay zero.
pub(crate) struct ProgressMeasures<'a> {
    game: &'a Game,
    player: Player,
    /// Largest value of each counter: the number of vertices with that
    /// priority, or zero for priorities of `player`.
    bounds: Box<[usize]>,
    measures: IndexedVec<VertexId, Measure>,
}

impl<'a> ProgressMeasures<'a> {
    pub(crate) fn new(game: &'a Game, player: Player) -> Self {
        let len = game.max_priority().map_or(0, |d| d + 1);
        let bounds = (0..len)
            .map(|p| match Player::of_priority(p) == player {
                true => 0,
                false => game.count_with_priority(p),
            })
            .collect();
        let measures = IndexedVec::from_elem(Measure::zero(len), game.vertex_count());

        Self { game, player, bounds, measures }
    }

    #[cfg(test)]
    pub(crate) fn measure(&self, v: VertexId) -> &Measure {
        &self.measures[v]
    }

    /// Lifts vertices in the order given by `lifting` until it runs out,
    /// returning the number of successful lifts.
    pub(crate) fn run(
        &mut self,
        lifting: &mut impl LiftingStrategy,
        cancel: &CancelToken,
    ) -> Result<usize, SolveError> {
        let mut lifts = 0;

        while let Some(v) = lifting.next() {
            cancel.check()?;

            if self.measures[v].is_top() {
                continue;
            }

            let (lifted, _) = self.lift(v);
            if lifted > self.measures[v] {
                self.measures[v] = lifted;
                lifting.lifted(v);
                lifts += 1;
            }
        }

        Ok(lifts)
    }

    /// The least measure `v` needs to move to `w`.
    pub(crate) fn prog(&self, v: VertexId, w: VertexId) -> Measure {
        let Measure::Finite(m) = &self.measures[w] else {
            return Measure::Top;
        };
        let Some(p) = self.game.priority(v) else {
            return Measure::Top;
        };

        let mut m = m.clone();
        m[..p].fill(0);

        if Player::of_priority(p) == self.player {
            return Measure::Finite(m);
        }

        // Increment at p, carrying into the higher counters of the opponent.
        for i in (p..m.len()).step_by(2) {
            if m[i] < self.bounds[i] {
                m[i] += 1;
                return Measure::Finite(m);
            }
            m[i] = 0;
        }

        Measure::Top
    }

    /// The best `prog` of `v` over its successors for the owner of `v`, and
    /// the successor achieving it.
    pub(crate) fn lift(&self, v: VertexId) -> (Measure, Option<VertexId>) {
        let progs = self.game.successors(v).map(|w| (self.prog(v, w), w));
        let best = match self.game.owner(v) == self.player {
            true => progs.min_by(|(a, _), (b, _)| a.cmp(b)),
            false => progs.max_by(|(a, _), (b, _)| a.cmp(b)),
        };

        match best {
            Some((m, w)) => (m, Some(w)),
            None => (Measure::Top, None),
        }
    }

    /// Splits the game into the region of `player`, with the moves
    /// justifying its measures, and the vertices at the top.
    pub(crate) fn into_solution(self) -> (RegionStrategy, VertexSet) {
        let mut won = RegionStrategy::empty(self.game.vertex_count());
        let mut lost = VertexSet::new(self.game.vertex_count());

        for v in self.game.vertices() {
            if self.measures[v].is_top() {
                lost.insert(v);
                continue;
            }

            won.region.insert(v);
            if self.game.owner(v) == self.player {
                if let (_, Some(w)) = self.lift(v) {
                    won.strategy.insert(v, w);
                }
            }
        }

        (won, lost)
    }
}
