use super::graph::{BoardSide, GraphError, WireGraph};
use super::node::{GridPos, NodeType, WireNode};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

const BOARDS_JSON: &str = include_str!("../../assets/wire_boards.json");

#[derive(Debug)]
pub enum BoardError {
    Parse(serde_json::Error),
    Empty,
    UnknownBoard(String),
    Graph { board: String, source: GraphError },
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::Parse(e) => write!(f, "Invalid board JSON: {}", e),
            BoardError::Empty => write!(f, "No boards defined"),
            BoardError::UnknownBoard(name) => write!(f, "No board named '{}'", name),
            BoardError::Graph { board, source } => write!(f, "Board '{}': {}", board, source),
        }
    }
}

impl std::error::Error for BoardError {}

/// One tile as authored in the board file
#[derive(Debug, Clone, Deserialize)]
pub struct NodeDefinition {
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub rotation: u8,
    /// Defaults to `rotation`, i.e. a decoy that is already correct
    #[serde(default)]
    pub correct: Option<u8>,
    #[serde(default = "default_rotatable")]
    pub rotatable: bool,
}

fn default_rotatable() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoardDefinition {
    pub name: String,
    pub nodes: Vec<NodeDefinition>,
}

impl BoardDefinition {
    /// Instantiate a fresh graph for one side of the race
    pub fn build(&self, side: BoardSide) -> Result<WireGraph, BoardError> {
        let nodes = self
            .nodes
            .iter()
            .map(|def| {
                WireNode::new(
                    def.node_type,
                    GridPos::new(def.x, def.y),
                    def.rotation,
                    def.correct.unwrap_or(def.rotation),
                    def.rotatable,
                )
            })
            .collect();

        WireGraph::new(side, nodes).map_err(|source| BoardError::Graph {
            board: self.name.clone(),
            source,
        })
    }
}

#[derive(Debug, Deserialize)]
struct BoardFile {
    boards: Vec<BoardDefinition>,
}

/// All wire boards shipped with the game, keyed by name
#[derive(Debug)]
pub struct BoardLibrary {
    boards: HashMap<String, BoardDefinition>,
}

impl BoardLibrary {
    /// Load the embedded board file
    pub fn load() -> Result<Self, BoardError> {
        Self::from_json(BOARDS_JSON)
    }

    /// Parse and validate every board; a board that cannot form a graph fails the load
    pub fn from_json(json: &str) -> Result<Self, BoardError> {
        let file: BoardFile = serde_json::from_str(json).map_err(BoardError::Parse)?;
        if file.boards.is_empty() {
            return Err(BoardError::Empty);
        }

        let mut boards = HashMap::with_capacity(file.boards.len());
        for board in file.boards {
            board.build(BoardSide::Player)?;
            boards.insert(board.name.clone(), board);
        }
        Ok(BoardLibrary { boards })
    }

    pub fn get(&self, name: &str) -> Result<&BoardDefinition, BoardError> {
        self.boards
            .get(name)
            .ok_or_else(|| BoardError::UnknownBoard(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.boards.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::PowerTransition;

    const TEST_JSON: &str = r#"{
        "boards": [
            {
                "name": "line",
                "nodes": [
                    { "type": "Start", "x": 0, "y": 0 },
                    { "type": "Straight", "x": 0, "y": 1, "rotation": 1, "correct": 0 },
                    { "type": "End", "x": 0, "y": 2, "rotatable": true }
                ]
            }
        ]
    }"#;

    #[test]
    fn test_parse_board() {
        let library = BoardLibrary::from_json(TEST_JSON).unwrap();
        assert_eq!(library.names(), vec!["line"]);

        let mut graph = library.get("line").unwrap().build(BoardSide::Rival).unwrap();
        assert_eq!(graph.side(), BoardSide::Rival);
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.evaluate_power(), PowerTransition::Unchanged);

        // End asked to be rotatable but terminals never are
        let end = graph.node_at(GridPos::new(0, 2)).unwrap();
        assert!(!graph.node(end).unwrap().is_rotatable());
    }

    #[test]
    fn test_unknown_board() {
        let library = BoardLibrary::from_json(TEST_JSON).unwrap();
        assert!(matches!(
            library.get("nope"),
            Err(BoardError::UnknownBoard(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_invalid_boards_rejected() {
        assert!(matches!(
            BoardLibrary::from_json("{ \"boards\": [] }"),
            Err(BoardError::Empty)
        ));
        assert!(matches!(
            BoardLibrary::from_json("not json"),
            Err(BoardError::Parse(_))
        ));

        let duplicate = r#"{ "boards": [ { "name": "dup", "nodes": [
            { "type": "Start", "x": 0, "y": 0 },
            { "type": "End", "x": 0, "y": 0 }
        ] } ] }"#;
        assert!(matches!(
            BoardLibrary::from_json(duplicate),
            Err(BoardError::Graph { .. })
        ));
    }

    #[test]
    fn test_embedded_library_loads() {
        let library = BoardLibrary::load().unwrap();
        let mut graph = library
            .get("tunnel_mirror")
            .unwrap()
            .build(BoardSide::Player)
            .unwrap();

        graph.evaluate_power();
        assert!(!graph.is_solved());
        assert!(graph.first_misaligned().is_some());
    }
}
