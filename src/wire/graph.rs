use super::direction::Direction;
use super::node::{GridPos, NodeId, NodeType, WireNode};
use rand::Rng;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

/// Which of the two mirrored boards a graph belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardSide {
    Player,
    Rival,
}

impl fmt::Display for BoardSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardSide::Player => write!(f, "player"),
            BoardSide::Rival => write!(f, "rival"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    DuplicateCoordinate(GridPos),
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::DuplicateCoordinate(pos) => {
                write!(f, "Two nodes share grid coordinate {}", pos)
            }
        }
    }
}

impl std::error::Error for GraphError {}

/// Change of the solved flag produced by one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerTransition {
    BecameSolved,
    BecameUnsolved,
    Unchanged,
    /// Board lacks a unique Start or End; nothing is powered
    Misconfigured,
}

/// A board of rotatable wire tiles with power flowing from Start to End
#[derive(Debug, Clone)]
pub struct WireGraph {
    side: BoardSide,
    nodes: Vec<WireNode>,
    by_grid: HashMap<GridPos, NodeId>,
    solved: bool,
}

impl WireGraph {
    pub fn new(side: BoardSide, nodes: Vec<WireNode>) -> Result<Self, GraphError> {
        let mut by_grid = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if by_grid.insert(node.grid, NodeId(i)).is_some() {
                return Err(GraphError::DuplicateCoordinate(node.grid));
            }
        }

        Ok(WireGraph {
            side,
            nodes,
            by_grid,
            solved: false,
        })
    }

    pub fn side(&self) -> BoardSide {
        self.side
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&WireNode> {
        self.nodes.get(id.0)
    }

    pub fn node_at(&self, pos: GridPos) -> Option<NodeId> {
        self.by_grid.get(&pos).copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &WireNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Grid neighbour of `id` in direction `dir`, if any
    pub fn neighbor(&self, id: NodeId, dir: Direction) -> Option<NodeId> {
        let node = self.nodes.get(id.0)?;
        self.node_at(node.grid.step(dir))
    }

    pub fn powered_nodes(&self) -> Vec<NodeId> {
        self.nodes()
            .filter(|(_, n)| n.powered)
            .map(|(id, _)| id)
            .collect()
    }

    /// First rotatable, non-terminal node whose rotation is wrong
    pub fn first_misaligned(&self) -> Option<NodeId> {
        self.nodes()
            .find(|(_, n)| n.is_rotatable() && !n.node_type.is_terminal() && !n.is_correct())
            .map(|(id, _)| id)
    }

    fn find_unique(&self, node_type: NodeType) -> Option<NodeId> {
        let mut found = None;
        for (id, node) in self.nodes() {
            if node.node_type == node_type {
                if found.is_some() {
                    return None;
                }
                found = Some(id);
            }
        }
        found
    }

    /// Recompute power from Start and report how the solved flag moved
    pub fn evaluate_power(&mut self) -> PowerTransition {
        for node in &mut self.nodes {
            node.previous_incoming_count = node.incoming_power_count;
            node.incoming_power_count = 0;
            node.powered = false;
        }

        let (Some(start), Some(end)) = (
            self.find_unique(NodeType::Start),
            self.find_unique(NodeType::End),
        ) else {
            log::warn!(
                "{} board needs exactly one Start and one End node, skipping power",
                self.side
            );
            self.solved = false;
            return PowerTransition::Misconfigured;
        };

        let mut visited_edges: HashSet<(NodeId, NodeId)> = HashSet::new();
        let mut queue = VecDeque::new();
        self.nodes[start.0].powered = true;
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            for dir in Direction::ALL {
                if !self.nodes[current.0].has_port(dir) {
                    continue;
                }
                let Some(next) = self.neighbor(current, dir) else {
                    continue;
                };
                if !self.nodes[next.0].has_port(dir.opposite()) {
                    continue;
                }
                if !visited_edges.insert((current, next)) {
                    continue;
                }

                let neighbour = &mut self.nodes[next.0];
                neighbour.incoming_power_count += 1;
                if !neighbour.powered
                    && neighbour.incoming_power_count >= neighbour.node_type.power_threshold()
                {
                    neighbour.powered = true;
                    queue.push_back(next);
                }
            }
        }

        let was_solved = self.solved;
        self.solved = self.nodes[end.0].powered;
        match (was_solved, self.solved) {
            (false, true) => PowerTransition::BecameSolved,
            (true, false) => PowerTransition::BecameUnsolved,
            _ => PowerTransition::Unchanged,
        }
    }

    /// Rotate one node a quarter turn and re-evaluate.
    /// Returns `None` if the node is missing or fixed.
    pub fn rotate_node(&mut self, id: NodeId) -> Option<PowerTransition> {
        let node = self.nodes.get_mut(id.0)?;
        if !node.rotate() {
            return None;
        }
        Some(self.evaluate_power())
    }

    /// Spin a random rotatable node by 1..=3 quarter turns and re-evaluate
    pub fn scramble_one(&mut self, rng: &mut impl Rng) -> Option<(NodeId, PowerTransition)> {
        let candidates: Vec<NodeId> = self
            .nodes()
            .filter(|(_, n)| n.is_rotatable() && !n.node_type.is_terminal())
            .map(|(id, _)| id)
            .collect();
        if candidates.is_empty() {
            return None;
        }

        let id = candidates[rng.random_range(0..candidates.len())];
        let steps = rng.random_range(1..4u8);
        self.nodes[id.0].rotate_by(steps);
        Some((id, self.evaluate_power()))
    }

    /// Back to the authored rotations with the solved flag cleared
    pub fn reset_board(&mut self) -> PowerTransition {
        self.solved = false;
        for node in &mut self.nodes {
            node.reset_to_initial();
        }
        self.evaluate_power()
    }

    pub fn set_visible(&mut self, visible: bool) {
        for node in &mut self.nodes {
            node.visible = visible;
        }
    }

    /// Mark exactly one node (or none) as hovered
    pub fn set_hovered(&mut self, hovered: Option<NodeId>) {
        for (i, node) in self.nodes.iter_mut().enumerate() {
            node.hovered = hovered == Some(NodeId(i));
        }
    }
}
