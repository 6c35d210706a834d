use super::direction::Direction;
use serde::Deserialize;
use std::fmt;

/// Index of a node inside its `WireGraph`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl NodeId {
    pub const fn index(&self) -> usize {
        self.0
    }
}

/// Integer grid coordinate, +y is Up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        GridPos { x, y }
    }

    /// The coordinate one step away in `dir`
    pub const fn step(&self, dir: Direction) -> Self {
        let (dx, dy) = dir.offset();
        GridPos {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum NodeType {
    Straight,
    Corner,
    Cross,
    TShape,
    Start,
    End,
}

impl NodeType {
    pub const fn is_terminal(self) -> bool {
        matches!(self, NodeType::Start | NodeType::End)
    }

    /// Incoming live edges needed before the node carries power
    pub const fn power_threshold(self) -> u32 {
        match self {
            NodeType::Cross => 3,
            _ => 1,
        }
    }

    /// Ports in the unrotated frame, clockwise from Up
    pub fn local_ports(self) -> impl Iterator<Item = Direction> {
        Direction::ALL
            .into_iter()
            .filter(move |&dir| self.has_local_port(dir))
    }

    /// Port layout in the node's unrotated frame
    const fn has_local_port(self, local: Direction) -> bool {
        match self {
            NodeType::Straight => matches!(local, Direction::Up | Direction::Down),
            NodeType::Corner => matches!(local, Direction::Up | Direction::Right),
            NodeType::Cross => true,
            NodeType::TShape => !matches!(local, Direction::Down),
            NodeType::Start => matches!(local, Direction::Up),
            NodeType::End => matches!(local, Direction::Down),
        }
    }
}

/// A single tile of a wire puzzle
#[derive(Debug, Clone)]
pub struct WireNode {
    pub node_type: NodeType,
    pub grid: GridPos,
    /// Quarter turns clockwise, always in 0..4
    current_rotation: u8,
    correct_rotation: u8,
    initial_rotation: u8,
    rotatable: bool,

    pub incoming_power_count: u32,
    pub previous_incoming_count: u32,
    pub powered: bool,

    // Presentation state read by the renderer
    pub visible: bool,
    pub hovered: bool,
}

impl WireNode {
    /// Start and End nodes are never rotatable, whatever `rotatable` says
    pub fn new(
        node_type: NodeType,
        grid: GridPos,
        rotation: u8,
        correct_rotation: u8,
        rotatable: bool,
    ) -> Self {
        WireNode {
            node_type,
            grid,
            current_rotation: rotation % 4,
            correct_rotation: correct_rotation % 4,
            initial_rotation: rotation % 4,
            rotatable: rotatable && !node_type.is_terminal(),
            incoming_power_count: 0,
            previous_incoming_count: 0,
            powered: false,
            visible: false,
            hovered: false,
        }
    }

    pub fn rotation(&self) -> u8 {
        self.current_rotation
    }

    pub fn correct_rotation(&self) -> u8 {
        self.correct_rotation
    }

    pub fn initial_rotation(&self) -> u8 {
        self.initial_rotation
    }

    pub fn is_rotatable(&self) -> bool {
        self.rotatable
    }

    pub fn is_correct(&self) -> bool {
        self.current_rotation == self.correct_rotation
    }

    /// Pure function of type, rotation and world direction
    pub fn has_port(&self, dir: Direction) -> bool {
        self.node_type
            .has_local_port(dir.to_local(self.current_rotation))
    }

    /// Rotate a quarter turn clockwise. Returns false for fixed nodes.
    pub fn rotate(&mut self) -> bool {
        self.rotate_by(1)
    }

    pub fn rotate_by(&mut self, steps: u8) -> bool {
        if !self.rotatable {
            return false;
        }
        self.current_rotation = (self.current_rotation + steps % 4) % 4;
        true
    }

    /// Return to the rotation the board was authored with
    pub fn reset_to_initial(&mut self) {
        if self.rotatable {
            self.current_rotation = self.initial_rotation;
        }
    }

    /// Mesh angle around the board normal, in degrees (clockwise is negative)
    pub fn angle_degrees(&self) -> f32 {
        -(self.current_rotation as f32) * 90.0
    }

    /// Scale the renderer should ease toward
    pub fn target_scale(&self) -> f32 {
        let base = if self.visible { 1.0 } else { 0.0 };
        let hover = if self.hovered { 1.25 } else { 1.0 };
        base * hover
    }

    /// One-shot scale kick after an evaluation that added incoming power
    pub fn power_pulse(&self) -> f32 {
        if self.incoming_power_count <= self.previous_incoming_count {
            return 0.0;
        }
        match (self.node_type, self.powered) {
            (NodeType::Cross, true) => 0.6,
            (NodeType::Cross, false) => 0.35,
            _ => 0.25,
        }
    }

    /// A Cross fed by some but not enough wires pulses in place
    pub fn is_breathing(&self) -> bool {
        self.node_type == NodeType::Cross && !self.powered && self.incoming_power_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(node_type: NodeType, rotation: u8) -> WireNode {
        WireNode::new(node_type, GridPos::new(0, 0), rotation, rotation, true)
    }

    fn ports(n: &WireNode) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|&d| n.has_port(d))
            .collect()
    }

    #[test]
    fn test_straight_connects_opposite_sides() {
        assert_eq!(
            ports(&node(NodeType::Straight, 0)),
            vec![Direction::Up, Direction::Down]
        );
        assert_eq!(
            ports(&node(NodeType::Straight, 1)),
            vec![Direction::Right, Direction::Left]
        );
    }

    #[test]
    fn test_corner_connects_adjacent_sides() {
        assert_eq!(
            ports(&node(NodeType::Corner, 0)),
            vec![Direction::Up, Direction::Right]
        );
        assert_eq!(
            ports(&node(NodeType::Corner, 1)),
            vec![Direction::Right, Direction::Down]
        );
        assert_eq!(
            ports(&node(NodeType::Corner, 3)),
            vec![Direction::Up, Direction::Left]
        );
    }

    #[test]
    fn test_cross_and_tshape_port_counts() {
        for rotation in 0..4 {
            assert_eq!(ports(&node(NodeType::Cross, rotation)).len(), 4);
            assert_eq!(ports(&node(NodeType::TShape, rotation)).len(), 3);
        }
        // Unrotated T has no Down port
        assert!(!node(NodeType::TShape, 0).has_port(Direction::Down));
        assert_eq!(
            NodeType::TShape.local_ports().collect::<Vec<_>>(),
            vec![Direction::Up, Direction::Right, Direction::Left]
        );
    }

    #[test]
    fn test_terminals_are_never_rotatable() {
        let mut start = WireNode::new(NodeType::Start, GridPos::new(0, 0), 0, 0, true);
        let mut end = WireNode::new(NodeType::End, GridPos::new(0, 2), 0, 0, true);

        assert!(!start.is_rotatable());
        assert!(!end.is_rotatable());
        assert!(!start.rotate());
        assert!(!end.rotate());
        assert_eq!(start.rotation(), 0);
        assert_eq!(ports(&start), vec![Direction::Up]);
        assert_eq!(ports(&end), vec![Direction::Down]);
    }

    #[test]
    fn test_rotate_wraps_and_resets() {
        let mut n = WireNode::new(NodeType::Corner, GridPos::new(1, 1), 2, 1, true);
        assert!(n.rotate());
        assert!(n.rotate());
        assert_eq!(n.rotation(), 0);
        assert!(n.rotate_by(5));
        assert_eq!(n.rotation(), 1);
        assert!(n.is_correct());

        n.reset_to_initial();
        assert_eq!(n.rotation(), 2);
    }

    #[test]
    fn test_power_pulse_only_on_gain() {
        let mut n = node(NodeType::Cross, 0);
        n.previous_incoming_count = 1;
        n.incoming_power_count = 2;
        assert!((n.power_pulse() - 0.35).abs() < f32::EPSILON);
        assert!(n.is_breathing());

        n.incoming_power_count = 3;
        n.powered = true;
        assert!((n.power_pulse() - 0.6).abs() < f32::EPSILON);
        assert!(!n.is_breathing());

        n.previous_incoming_count = 3;
        assert_eq!(n.power_pulse(), 0.0);
    }
}
