use std::cmp::Reverse;
use std::collections::VecDeque;

use crate::game::{Player, VertexId};
use crate::index::IndexedVec;
use crate::set::VertexSet;
use crate::Map;

use super::Improvement;

impl Improvement<'_> {
    /// Computes the profile of every vertex against the best response of P1
    /// to the current moves of P0, recording that response in `moves`.
    pub(super) fn valuation(&mut self) {
        let n = self.game.vertex_count();
        self.evaluated = VertexSet::new(n);
        let mut live = IndexedVec::from_elem(Vec::new(), n);

        // Best cycle heads for P1 first.
        let mut heads = self.game.vertices().collect::<Vec<_>>();
        heads.sort_by_key(|&v| self.reward_of(v));

        for w in heads {
            if self.evaluated.contains(w) || !self.closes_cycle(w) {
                continue;
            }

            let members = self.reach_unevaluated(w, |_| true);
            Component::new(self, w, &members, &mut live).evaluate();
            self.evaluated.union_with(&members);
        }
    }

    /// Whether the play can return to `w` through vertices less relevant
    /// than `w`.
    fn closes_cycle(&self, w: VertexId) -> bool {
        let relevance = self.relevance_of(w);
        let below = self.reach_unevaluated(w, |v| self.relevance_of(v) <= relevance);
        self.strat_succs(w).any(|v| below.contains(v))
    }

    /// Unevaluated vertices that reach `w` through vertices accepted by
    /// `accept`.
    fn reach_unevaluated(&self, w: VertexId, accept: impl Fn(VertexId) -> bool) -> VertexSet {
        reach(self.game.vertex_count(), w, |v| {
            self.strat_preds(v).filter(|&u| !self.evaluated.contains(u) && accept(u))
        })
    }
}

/// The vertices whose play ends in the cycle headed by `w`.
struct Component<'s, 'g> {
    solver: &'s mut Improvement<'g>,
    w: VertexId,
    members: &'s VertexSet,
    /// Successors of each member still available to P1, inside the component.
    live: &'s mut IndexedVec<VertexId, Vec<VertexId>>,
}

impl<'s, 'g> Component<'s, 'g> {
    fn new(
        solver: &'s mut Improvement<'g>,
        w: VertexId,
        members: &'s VertexSet,
        live: &'s mut IndexedVec<VertexId, Vec<VertexId>>,
    ) -> Self {
        for v in members.iter() {
            live[v] = solver.strat_succs(v).filter(|&s| members.contains(s)).collect();
        }

        Self { solver, w, members, live }
    }

    /// Members with a live edge into `v`.
    fn live_preds(&self, v: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        let (solver, members, live): (&Improvement, &VertexSet, &IndexedVec<_, Vec<_>>) =
            (self.solver, self.members, self.live);
        solver.strat_preds(v).filter(move |&u| members.contains(u) && live[u].contains(&v))
    }

    /// Members reaching `to` along live edges without passing through
    /// `avoid`.
    fn reach_live(&self, to: VertexId, avoid: VertexId) -> VertexSet {
        let capacity = self.solver.game.vertex_count();
        reach(capacity, to, |v| self.live_preds(v).filter(move |&u| u != avoid))
    }

    fn evaluate(&mut self) {
        let head = self.solver.relevance_of(self.w);
        let members = self.members;

        let mut by_relevance = members.iter().collect::<Vec<_>>();
        by_relevance.sort_unstable_by_key(|&v| Reverse(self.solver.relevance_of(v)));

        for &v in &by_relevance {
            let profile = &mut self.solver.profiles[v];
            profile.cycle = self.w;
            profile.before.clear();
        }

        for u in by_relevance {
            let relevance = self.solver.relevance_of(u);
            if relevance <= head {
                break;
            }

            match relevance.winner() {
                Player::P0 => self.avoid(u),
                Player::P1 => self.seek(u),
            }
        }

        match head.winner() {
            Player::P0 => self.delay(),
            Player::P1 => self.hurry(),
        }
    }

    /// P1 keeps away from `u` wherever it can still reach the cycle without
    /// it; the remaining members must pass through `u`.
    fn avoid(&mut self, u: VertexId) {
        let safe = self.reach_live(self.w, u);
        let members = self.members;

        for v in members.iter().filter(|&v| !safe.contains(v)) {
            self.solver.profiles[v].before.push(u);
        }

        for v in safe.iter().chain([u]) {
            self.live[v].retain(|&s| safe.contains(s));
        }
    }

    /// Members that can reach `u` before the cycle head do so.
    fn seek(&mut self, u: VertexId) {
        let toward = self.reach_live(u, self.w);

        for v in toward.iter() {
            self.solver.profiles[v].before.push(u);
            if v != u {
                self.live[v].retain(|&s| toward.contains(s));
            }
        }
    }

    fn first_move(&self) -> VertexId {
        let head = &self.live[self.w];
        debug_assert!(!head.is_empty(), "the cycle through {:?} lost its edges", self.w);
        *head.first().expect("cycle head without a live successor")
    }

    /// P1 delays reaching the head of an even cycle: a member is settled
    /// once all of its live successors are.
    fn delay(&mut self) {
        let first = self.first_move();
        let members = self.members;

        let mut pending = members
            .iter()
            .map(|v| (v, self.live[v].len()))
            .collect::<Map<_, _>>();

        let mut queue = VecDeque::from([(self.w, first, 0)]);
        while let Some((v, next, distance)) = queue.pop_front() {
            self.solver.profiles[v].distance = distance;
            self.solver.moves[v] = next;

            let settled = self.live_preds(v).filter(|&u| u != self.w).filter(|u| {
                let count = pending.entry(*u).or_default();
                *count -= 1;
                *count == 0
            });
            let settled = settled.collect::<Vec<_>>();
            queue.extend(settled.into_iter().map(|u| (u, v, distance + 1)));
        }
    }

    /// P1 reaches the head of an odd cycle as soon as possible.
    fn hurry(&mut self) {
        let first = self.first_move();
        let mut seen = VertexSet::new(self.solver.game.vertex_count());

        let mut queue = VecDeque::from([(self.w, first, 0)]);
        while let Some((v, next, distance)) = queue.pop_front() {
            if seen.insert(v) {
                self.solver.profiles[v].distance = distance;
                self.solver.moves[v] = next;
                let preds = self.live_preds(v).collect::<Vec<_>>();
                queue.extend(preds.into_iter().map(|u| (u, v, distance + 1)));
            }
        }
    }
}

/// Backward search from `start`, returning every vertex found by `explore`.
fn reach<I>(capacity: usize, start: VertexId, mut explore: impl FnMut(VertexId) -> I) -> VertexSet
where
    I: Iterator<Item = VertexId>,
{
    let mut seen = VertexSet::new(capacity);
    seen.insert(start);

    let mut stack = vec![start];
    while let Some(v) = stack.pop() {
        for u in explore(v) {
            if seen.insert(u) {
                stack.push(u);
            }
        }
    }

    seen
}
