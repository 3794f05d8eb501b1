use std::fmt;

use crate::game::{Game, Player, VertexId};
use crate::set::VertexSet;
use crate::Map;

/// A region won by a player together with a positional strategy for the
/// vertices of the region owned by that player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionStrategy {
    pub region: VertexSet,
    pub strategy: Map<VertexId, VertexId>,
}

impl RegionStrategy {
    pub fn empty(capacity: usize) -> Self {
        Self { region: VertexSet::new(capacity), strategy: Map::default() }
    }

    /// Unions `other` into `self`. Moves already chosen in `self` are kept.
    pub fn merge(&mut self, other: RegionStrategy) {
        self.region.union_with(&other.region);
        for (v, w) in other.strategy {
            self.strategy.entry(v).or_insert(w);
        }
    }
}

/// The winning regions and strategies of both players.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    players: [RegionStrategy; 2],
}

impl Solution {
    pub fn empty(capacity: usize) -> Self {
        Self::new(RegionStrategy::empty(capacity), RegionStrategy::empty(capacity))
    }

    pub fn new(p0: RegionStrategy, p1: RegionStrategy) -> Self {
        Self { players: [p0, p1] }
    }

    /// Builds a solution from the parts of `winner` and of its opponent.
    pub fn from_winner(winner: Player, won: RegionStrategy, lost: RegionStrategy) -> Self {
        match winner {
            Player::P0 => Self::new(won, lost),
            Player::P1 => Self::new(lost, won),
        }
    }

    pub fn get(&self, player: Player) -> &RegionStrategy {
        &self.players[player.index()]
    }

    pub fn get_mut(&mut self, player: Player) -> &mut RegionStrategy {
        &mut self.players[player.index()]
    }

    pub fn into_parts(self) -> [RegionStrategy; 2] {
        self.players
    }

    pub fn region(&self, player: Player) -> &VertexSet {
        &self.get(player).region
    }

    pub fn strategy(&self, player: Player) -> &Map<VertexId, VertexId> {
        &self.get(player).strategy
    }

    /// The player whose region contains `v`, if any.
    pub fn winner(&self, v: VertexId) -> Option<Player> {
        Player::BOTH.into_iter().find(|&p| self.region(p).contains(v))
    }

    /// Checks that the regions partition the active vertices of `game` and
    /// that each strategy is total on the owned part of its region and never
    /// leaves it.
    pub fn validate(&self, game: &Game) -> Result<(), InvalidSolution> {
        for v in game.vertices() {
            match (self.region(Player::P0).contains(v), self.region(Player::P1).contains(v)) {
                (true, true) => return Err(InvalidSolution::Overlap(v)),
                (false, false) => return Err(InvalidSolution::Unclassified(v)),
                _ => {}
            }
        }

        for player in Player::BOTH {
            let RegionStrategy { region, strategy } = self.get(player);

            if let Some(v) = region.iter().find(|&v| !game.contains(v)) {
                return Err(InvalidSolution::Inactive(v));
            }

            for v in region.iter().filter(|&v| game.owner(v) == player) {
                let Some(&w) = strategy.get(&v) else {
                    return Err(InvalidSolution::MissingMove(player, v));
                };
                if !game.successors(v).any(|u| u == w) {
                    return Err(InvalidSolution::IllegalMove(player, v, w));
                }
                if !region.contains(w) {
                    return Err(InvalidSolution::LeavesRegion(player, v, w));
                }
            }

            let stray = strategy.keys().find(|&&v| game.owner(v) != player || !region.contains(v));
            if let Some(&v) = stray {
                return Err(InvalidSolution::StrayMove(player, v));
            }
        }

        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvalidSolution {
    Overlap(VertexId),
    Unclassified(VertexId),
    Inactive(VertexId),
    MissingMove(Player, VertexId),
    IllegalMove(Player, VertexId, VertexId),
    LeavesRegion(Player, VertexId, VertexId),
    StrayMove(Player, VertexId),
}

impl fmt::Display for InvalidSolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidSolution::Overlap(v) => write!(f, "vertex {v} is in both regions"),
            InvalidSolution::Unclassified(v) => write!(f, "vertex {v} is in no region"),
            InvalidSolution::Inactive(v) => write!(f, "vertex {v} is not part of the game"),
            InvalidSolution::MissingMove(p, v) => write!(f, "{p} has no move at vertex {v}"),
            InvalidSolution::IllegalMove(p, v, w) => {
                write!(f, "{p} moves from vertex {v} to {w}, which is not a successor")
            }
            InvalidSolution::LeavesRegion(p, v, w) => {
                write!(f, "{p} moves from vertex {v} to {w}, outside of its region")
            }
            InvalidSolution::StrayMove(p, v) => {
                write!(f, "{p} has a move at vertex {v}, which it does not own in its region")
            }
        }
    }
}

impl std::error::Error for InvalidSolution {}
