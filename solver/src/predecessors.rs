use crate::game::{Game, VertexId};
use crate::index::AsIndex;

/// Reverse adjacency in compressed form: the predecessors of `v` are
/// `sources[offsets[v]..offsets[v + 1]]`.
#[derive(Clone, Debug, Default)]
pub struct Predecessors {
    offsets: Vec<usize>,
    sources: Vec<VertexId>,
}

impl Predecessors {
    /// Builds the predecessor index of `game`, keeping only edges between
    /// active vertices.
    pub fn new(game: &Game) -> Self {
        let edges = game
            .vertices()
            .flat_map(|u| game.successors(u).map(move |v| (u, v)))
            .collect::<Vec<_>>();
        Self::from_edges(game.vertex_count(), &edges)
    }

    pub(crate) fn from_edges(vertex_count: usize, edges: &[(VertexId, VertexId)]) -> Self {
        // Counting sort on the edge targets.
        let mut offsets = vec![0; vertex_count + 1];
        for &(_, v) in edges {
            offsets[v.to_usize() + 1] += 1;
        }
        for i in 1..offsets.len() {
            offsets[i] += offsets[i - 1];
        }

        let mut next = offsets.clone();
        let mut sources = vec![VertexId(0); offsets[vertex_count]];
        for &(u, v) in edges {
            let slot = &mut next[v.to_usize()];
            sources[*slot] = u;
            *slot += 1;
        }

        Self { offsets, sources }
    }

    pub fn of(&self, v: VertexId) -> &[VertexId] {
        let v = v.to_usize();
        &self.sources[self.offsets[v]..self.offsets[v + 1]]
    }

    pub fn edge_count(&self) -> usize {
        self.sources.len()
    }
}
