use std::collections::VecDeque;

use crate::game::{Game, VertexId};
use crate::predecessors::Predecessors;
use crate::set::VertexSet;

/// Decides which vertex the progress measure solver tries to lift next.
pub trait LiftingStrategy {
    /// The next vertex to lift, or `None` once no lift can succeed anymore.
    fn next(&mut self) -> Option<VertexId>;

    /// Called after the measure of `v` was increased.
    fn lifted(&mut self, v: VertexId);
}

/// Which [`LiftingStrategy`] to use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LiftingPolicy {
    /// Round-robin over all vertices.
    Linear,
    /// Work queue of vertices whose successors were lifted.
    #[default]
    Predecessor,
}

/// Cycles through the vertices, stopping after a full round without lifts.
pub struct LinearLifting {
    vertices: Vec<VertexId>,
    next: usize,
    unchanged: usize,
}

impl LinearLifting {
    pub fn new(game: &Game) -> Self {
        Self { vertices: game.vertices().collect(), next: 0, unchanged: 0 }
    }
}

impl LiftingStrategy for LinearLifting {
    fn next(&mut self) -> Option<VertexId> {
        if self.unchanged >= self.vertices.len() {
            return None;
        }

        let v = self.vertices[self.next];
        self.next = (self.next + 1) % self.vertices.len();
        self.unchanged += 1;
        Some(v)
    }

    fn lifted(&mut self, _: VertexId) {
        self.unchanged = 0;
    }
}

/// Starts from every vertex and afterwards only revisits the predecessors of
/// lifted vertices, the only ones whose lift may have changed.
pub struct PredecessorLifting {
    predecessors: Predecessors,
    queue: VecDeque<VertexId>,
    queued: VertexSet,
}

impl PredecessorLifting {
    pub fn new(game: &Game) -> Self {
        Self {
            predecessors: Predecessors::new(game),
            queue: game.vertices().collect(),
            queued: game.active().clone(),
        }
    }
}

impl LiftingStrategy for PredecessorLifting {
    fn next(&mut self) -> Option<VertexId> {
        let v = self.queue.pop_front()?;
        self.queued.remove(v);
        Some(v)
    }

    fn lifted(&mut self, v: VertexId) {
        for &u in self.predecessors.of(v) {
            if self.queued.insert(u) {
                self.queue.push_back(u);
            }
        }
    }
}
