use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::index::{new_index, AsIndex, IndexedVec};
use crate::predecessors::Predecessors;
use crate::set::VertexSet;
use crate::Set;

new_index!(pub index VertexId);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    /// Wins plays whose highest priority seen infinitely often is even.
    P0,
    /// Wins plays whose highest priority seen infinitely often is odd.
    P1,
}

impl Player {
    pub const BOTH: [Player; 2] = [Player::P0, Player::P1];

    /// The player favoured by `priority`.
    pub fn of_priority(priority: usize) -> Player {
        match priority % 2 {
            0 => Player::P0,
            _ => Player::P1,
        }
    }

    pub fn opponent(self) -> Player {
        match self {
            Player::P0 => Player::P1,
            Player::P1 => Player::P0,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Player::P0 => 0,
            Player::P1 => 1,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::P0 => f.write_str("player 0"),
            Player::P1 => f.write_str("player 1"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameError {
    /// The vertex has no outgoing edge, so plays through it are not infinite.
    NoSuccessors(VertexId),
    /// An edge points to a vertex that was never added.
    UnknownVertex { from: VertexId, to: VertexId },
    /// A priority was assigned to a vertex outside the active set.
    InactiveVertex(VertexId),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::NoSuccessors(v) => write!(f, "vertex {v} has no successors"),
            GameError::UnknownVertex { from, to } => {
                write!(f, "edge from vertex {from} to unknown vertex {to}")
            }
            GameError::InactiveVertex(v) => write!(f, "vertex {v} is not part of the game"),
        }
    }
}

impl std::error::Error for GameError {}

/// Immutable graph data shared by a game and all of its projections.
#[derive(Debug)]
struct Arena {
    owners: IndexedVec<VertexId, Player>,
    succ_offsets: Vec<usize>,
    succ_targets: Vec<VertexId>,
    predecessors: Predecessors,
}

impl Arena {
    fn successors(&self, v: VertexId) -> &[VertexId] {
        let v = v.to_usize();
        &self.succ_targets[self.succ_offsets[v]..self.succ_offsets[v + 1]]
    }
}

/// A parity game restricted to a set of active vertices.
///
/// Projections created by [`Game::subgame`] and [`Game::difference`] share the
/// adjacency of the original game and keep vertex ids stable, so any table
/// indexed by [`VertexId`] stays valid across them.
#[derive(Clone)]
pub struct Game {
    arena: Arc<Arena>,
    priorities: Arc<IndexedVec<VertexId, usize>>,
    /// Every vertex of the id space grouped by priority, shared by projections.
    buckets: Arc<BTreeMap<usize, Set<VertexId>>>,
    active: VertexSet,
    /// Active vertices per priority; priorities without any are absent.
    counts: BTreeMap<usize, usize>,
}

impl Game {
    pub fn builder() -> GameBuilder {
        GameBuilder::default()
    }

    /// Size of the vertex-id space, including inactive vertices.
    pub fn vertex_count(&self) -> usize {
        self.arena.owners.len()
    }

    /// Number of active vertices.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn contains(&self, v: VertexId) -> bool {
        self.active.contains(v)
    }

    pub fn active(&self) -> &VertexSet {
        &self.active
    }

    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.active.iter()
    }

    pub fn owner(&self, v: VertexId) -> Player {
        self.arena.owners[v]
    }

    /// The priority of `v`, or `None` if `v` was removed from this game.
    pub fn priority(&self, v: VertexId) -> Option<usize> {
        self.contains(v).then(|| self.priorities[v])
    }

    /// Successors of `v` inside the active set.
    pub fn successors(&self, v: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.arena.successors(v).iter().copied().filter(|&u| self.active.contains(u))
    }

    /// Predecessors of `v` inside the active set.
    pub fn predecessors(&self, v: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.arena.predecessors.of(v).iter().copied().filter(|&u| self.active.contains(u))
    }

    pub fn max_priority(&self) -> Option<usize> {
        self.counts.last_key_value().map(|(&p, _)| p)
    }

    /// The distinct priorities of the active vertices, in increasing order.
    pub fn priorities(&self) -> impl Iterator<Item = usize> + DoubleEndedIterator + '_ {
        self.counts.keys().copied()
    }

    pub fn vertices_with_priority(&self, priority: usize) -> impl Iterator<Item = VertexId> + '_ {
        let bucket = self.buckets.get(&priority).into_iter().flatten();
        bucket.copied().filter(|&v| self.active.contains(v))
    }

    pub fn count_with_priority(&self, priority: usize) -> usize {
        self.counts.get(&priority).copied().unwrap_or(0)
    }

    pub fn edge_count(&self) -> usize {
        self.vertices().map(|v| self.successors(v).count()).sum()
    }

    /// Whether every active vertex has an active successor.
    pub fn is_total(&self) -> bool {
        self.vertices().all(|v| self.successors(v).next().is_some())
    }

    /// The game restricted to the vertices of `keep` that are active here.
    pub fn subgame(&self, keep: &VertexSet) -> Game {
        let mut active = keep.clone();
        active.intersect_with(&self.active);

        let mut counts = BTreeMap::new();
        for v in active.iter() {
            *counts.entry(self.priorities[v]).or_default() += 1;
        }

        Game {
            arena: self.arena.clone(),
            priorities: self.priorities.clone(),
            buckets: self.buckets.clone(),
            active,
            counts,
        }
    }

    /// The game without the vertices in `remove`.
    pub fn difference(&self, remove: &VertexSet) -> Game {
        let mut game = self.clone();
        for v in remove.iter().filter(|&v| self.contains(v)) {
            game.active.remove(v);
            game.uncount(v);
        }
        game
    }

    /// Changes the priority of an active vertex, keeping the priority index
    /// in sync.
    pub fn set_priority(&mut self, v: VertexId, priority: usize) -> Result<(), GameError> {
        if !self.contains(v) {
            return Err(GameError::InactiveVertex(v));
        }

        self.uncount(v);
        let old = std::mem::replace(&mut Arc::make_mut(&mut self.priorities)[v], priority);

        let buckets = Arc::make_mut(&mut self.buckets);
        if let Some(bucket) = buckets.get_mut(&old) {
            bucket.shift_remove(&v);
            if bucket.is_empty() {
                buckets.remove(&old);
            }
        }
        buckets.entry(priority).or_default().insert(v);
        *self.counts.entry(priority).or_default() += 1;
        Ok(())
    }

    fn uncount(&mut self, v: VertexId) {
        let priority = self.priorities[v];
        if let Some(count) = self.counts.get_mut(&priority) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&priority);
            }
        }
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for v in self.vertices() {
            let succs = self.successors(v).map(|u| u.to_usize()).collect::<Vec<_>>();
            list.entry(&(v.to_usize(), self.priorities[v], self.owner(v), succs));
        }
        list.finish()
    }
}

#[derive(Default)]
pub struct GameBuilder {
    owners: IndexedVec<VertexId, Player>,
    priorities: IndexedVec<VertexId, usize>,
    successors: IndexedVec<VertexId, Vec<VertexId>>,
}

impl GameBuilder {
    pub fn add_vertex(&mut self, owner: Player, priority: usize) -> VertexId {
        self.priorities.push(priority);
        self.successors.push(Vec::new());
        self.owners.push(owner)
    }

    /// Adds an edge; duplicates are collapsed when building.
    pub fn add_edge(&mut self, from: VertexId, to: VertexId) -> &mut Self {
        self.successors[from].push(to);
        self
    }

    pub fn build(self) -> Result<Game, GameError> {
        let n = self.owners.len();

        let mut succ_offsets = Vec::with_capacity(n + 1);
        let mut succ_targets = Vec::new();
        succ_offsets.push(0);
        for (v, succs) in self.successors.into_iter().enumerate() {
            let from = VertexId(v);
            let mut succs = succs;
            succs.sort_unstable();
            succs.dedup();

            if succs.is_empty() {
                return Err(GameError::NoSuccessors(from));
            }
            if let Some(&to) = succs.iter().find(|u| u.to_usize() >= n) {
                return Err(GameError::UnknownVertex { from, to });
            }

            succ_targets.extend(succs);
            succ_offsets.push(succ_targets.len());
        }

        let edges = (0..n)
            .flat_map(|u| {
                let succs = &succ_targets[succ_offsets[u]..succ_offsets[u + 1]];
                succs.iter().map(move |&v| (VertexId(u), v))
            })
            .collect::<Vec<_>>();
        let predecessors = Predecessors::from_edges(n, &edges);

        let mut buckets = BTreeMap::<usize, Set<VertexId>>::new();
        for (v, &p) in self.priorities.enumerate() {
            buckets.entry(p).or_default().insert(v);
        }
        let counts = buckets.iter().map(|(&p, vs)| (p, vs.len())).collect();

        let arena = Arena { owners: self.owners, succ_offsets, succ_targets, predecessors };
        Ok(Game {
            arena: Arc::new(arena),
            priorities: Arc::new(self.priorities),
            buckets: Arc::new(buckets),
            active: VertexSet::full(n),
            counts,
        })
    }
}
