mod board;
mod direction;
mod graph;
mod node;

pub use board::{BoardDefinition, BoardError, BoardLibrary, NodeDefinition};
pub use direction::Direction;
pub use graph::{BoardSide, GraphError, PowerTransition, WireGraph};
pub use node::{GridPos, NodeId, NodeType, WireNode};
