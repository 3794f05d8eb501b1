pub mod attractor;
pub mod game;
pub mod improvement;
pub mod index;
pub mod predecessors;
pub mod promotion;
pub mod set;
pub mod solution;
pub mod solve;
pub mod spm;
pub mod zielonka;

#[cfg(test)]
mod test;

pub use attractor::{attractor, attractor_of_set};
pub use game::{Game, GameBuilder, GameError, Player, VertexId};
pub use improvement::StrategyImprovement;
pub use predecessors::Predecessors;
pub use promotion::PriorityPromotion;
pub use set::VertexSet;
pub use solution::{InvalidSolution, RegionStrategy, Solution};
pub use solve::{CancelToken, ParityGameSolver, SolveError};
pub use spm::{LiftingPolicy, SmallProgressMeasures};
pub use zielonka::Zielonka;

pub type Set<T> = indexmap::IndexSet<T, rustc_hash::FxBuildHasher>;
pub type Map<K, V> = rustc_hash::FxHashMap<K, V>;
