mod bench;
mod conv;
mod parser;


pub use bench::{timed_solve, Timing};
pub use conv::{ConvError, Converted};
pub use parser::parse_parity_game;
use solver::Player;

#[derive(Debug)]
pub struct Node {
    pub id: usize,
    pub priority: usize,
    pub player: Player,
    pub successors: Vec<usize>,
    pub name: Option<String>,
}

#[derive(Debug)]
pub struct ParityGame {
    /// The largest id declared by the `parity` header, if any.
    pub max_id: Option<usize>,
    /// The vertex declared by the `start` header, if any.
    pub start: Option<usize>,
    pub nodes: Vec<Node>,
}
