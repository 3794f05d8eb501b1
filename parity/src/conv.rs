use std::collections::HashMap;
use std::fmt;

use solver::index::AsIndex;
use solver::{Game, GameError, VertexId};

use crate::ParityGame;

/// A game built from a [`ParityGame`], with the file id of every vertex.
pub struct Converted {
    pub game: Game,
    pub ids: Vec<usize>,
    pub start: Option<VertexId>,
}

impl Converted {
    pub fn id_of(&self, v: VertexId) -> usize {
        self.ids[v.to_usize()]
    }
}

#[derive(Debug)]
pub enum ConvError {
    DuplicateId(usize),
    UnknownSuccessor { id: usize, successor: usize },
    UnknownStart(usize),
    Game(GameError),
}

impl fmt::Display for ConvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvError::DuplicateId(id) => write!(f, "vertex {id} is declared twice"),
            ConvError::UnknownSuccessor { id, successor } => {
                write!(f, "vertex {id} has undeclared successor {successor}")
            }
            ConvError::UnknownStart(id) => write!(f, "start vertex {id} is not declared"),
            ConvError::Game(e) => write!(f, "invalid game: {e}"),
        }
    }
}

impl std::error::Error for ConvError {}

impl From<GameError> for ConvError {
    fn from(e: GameError) -> Self {
        ConvError::Game(e)
    }
}

impl ParityGame {
    /// Builds the game, numbering the vertices in declaration order.
    pub fn to_game(&self) -> Result<Converted, ConvError> {
        let mut builder = Game::builder();
        let mut id_to_vertex = HashMap::with_capacity(self.nodes.len());

        for node in &self.nodes {
            let v = builder.add_vertex(node.player, node.priority);
            if id_to_vertex.insert(node.id, v).is_some() {
                return Err(ConvError::DuplicateId(node.id));
            }
        }

        for node in &self.nodes {
            let v = id_to_vertex[&node.id];
            for &successor in &node.successors {
                let Some(&w) = id_to_vertex.get(&successor) else {
                    return Err(ConvError::UnknownSuccessor { id: node.id, successor });
                };
                builder.add_edge(v, w);
            }
        }

        let start = match self.start {
            Some(id) => Some(*id_to_vertex.get(&id).ok_or(ConvError::UnknownStart(id))?),
            None => None,
        };

        let game = builder.build()?;
        let ids = self.nodes.iter().map(|node| node.id).collect();
        Ok(Converted { game, ids, start })
    }
}
