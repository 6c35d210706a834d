//! Mirror puzzle race: the player and a rival solve copies of the same wire
//! board side by side while the rival sabotages the player's copy.

mod interactor;
mod rival;

pub use interactor::WireInteractor;
pub use rival::{RivalAction, RivalAi, RivalPhase};

use crate::config::{RaceConfig, RivalConfig};
use crate::services::NavAgent;
use crate::wire::{
    BoardError, BoardLibrary, BoardSide, GridPos, NodeId, PowerTransition, WireGraph,
};
use bevy::math::Vec3;
use rand::Rng;

/// Places a board's grid in the world, one cell per node on a vertical wall.
///
/// Boards face -Z, toward a player walking up the tunnel, so grid +x runs
/// along world -X and reads left to right from the player's side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardLayout {
    pub origin: Vec3,
    pub cell_size: f32,
}

impl BoardLayout {
    /// World direction of grid +x
    pub const RIGHT: Vec3 = Vec3::NEG_X;

    pub fn new(origin: Vec3, cell_size: f32) -> Self {
        BoardLayout { origin, cell_size }
    }

    pub fn world_position(&self, grid: GridPos) -> Vec3 {
        let offset = Self::RIGHT * grid.x as f32 + Vec3::Y * grid.y as f32;
        self.origin + offset * self.cell_size
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RaceState {
    Idle,
    Racing,
    PlayerWon,
    LockedOut { remaining: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RaceEvent {
    /// Both boards reset and the rival is running
    Started,
    PlayerRotated {
        node: NodeId,
        transition: PowerTransition,
    },
    RivalRotated { node: NodeId },
    Sabotaged { node: NodeId },
    /// The exit opens
    PlayerWon,
    /// The player is locked out until the race restarts
    RivalWon,
}

#[derive(Debug)]
pub struct MirrorRace {
    config: RaceConfig,
    player_board: WireGraph,
    rival_board: WireGraph,
    player_layout: BoardLayout,
    rival_layout: BoardLayout,
    rival: RivalAi,
    state: RaceState,
}

impl MirrorRace {
    /// Build both boards from the named library entry
    pub fn new(
        library: &BoardLibrary,
        config: RaceConfig,
        rival_config: RivalConfig,
        agent: Box<dyn NavAgent>,
    ) -> Result<Self, BoardError> {
        let board = library.get(&config.board)?;
        let mut player_board = board.build(BoardSide::Player)?;
        let mut rival_board = board.build(BoardSide::Rival)?;
        player_board.evaluate_power();
        rival_board.evaluate_power();
        player_board.set_visible(false);
        rival_board.set_visible(false);

        let player_layout =
            BoardLayout::new(Vec3::from(config.player_board_origin), config.cell_size);
        let rival_layout =
            BoardLayout::new(Vec3::from(config.rival_board_origin), config.cell_size);

        Ok(MirrorRace {
            config,
            player_board,
            rival_board,
            player_layout,
            rival_layout,
            rival: RivalAi::new(rival_config, agent),
            state: RaceState::Idle,
        })
    }

    pub fn state(&self) -> RaceState {
        self.state
    }

    pub fn is_racing(&self) -> bool {
        self.state == RaceState::Racing
    }

    pub fn board(&self, side: BoardSide) -> &WireGraph {
        match side {
            BoardSide::Player => &self.player_board,
            BoardSide::Rival => &self.rival_board,
        }
    }

    pub fn layout(&self, side: BoardSide) -> BoardLayout {
        match side {
            BoardSide::Player => self.player_layout,
            BoardSide::Rival => self.rival_layout,
        }
    }

    pub fn rival(&self) -> &RivalAi {
        &self.rival
    }

    /// Only rotatable nodes on the player's own board
    pub fn is_player_rotatable(&self, side: BoardSide, node: NodeId) -> bool {
        side == BoardSide::Player
            && self
                .player_board
                .node(node)
                .is_some_and(|n| n.is_rotatable())
    }

    // === Mutation Methods ===

    /// Player walked into the trigger volume
    pub fn on_trigger_enter(&mut self) -> Vec<RaceEvent> {
        let mut events = Vec::new();
        if self.state == RaceState::Idle {
            self.start(&mut events);
        }
        events
    }

    pub fn set_circuits_visible(&mut self, visible: bool) {
        self.player_board.set_visible(visible);
        self.rival_board.set_visible(visible);
    }

    /// Hover highlight on the player's board; anything else clears it
    pub fn set_hovered(&mut self, aimed: Option<(BoardSide, NodeId)>) {
        let hovered = aimed
            .filter(|&(side, node)| self.is_player_rotatable(side, node))
            .map(|(_, node)| node);
        self.player_board.set_hovered(hovered);
    }

    /// Rotate a node the player aimed at. Rival nodes are refused.
    pub fn rotate_player_node(&mut self, side: BoardSide, node: NodeId) -> Vec<RaceEvent> {
        let mut events = Vec::new();
        if !self.is_player_rotatable(side, node) {
            return events;
        }
        if let Some(transition) = self.player_board.rotate_node(node) {
            events.push(RaceEvent::PlayerRotated { node, transition });
            self.on_transition(transition, &mut events);
        }
        events
    }

    pub fn update(&mut self, dt: f32, rng: &mut impl Rng) -> Vec<RaceEvent> {
        let mut events = Vec::new();
        match self.state {
            RaceState::Racing => {
                let actions = self.rival.update(
                    dt,
                    &mut self.rival_board,
                    &self.rival_layout,
                    &mut self.player_board,
                    rng,
                );
                for action in actions {
                    let transition = match action {
                        RivalAction::Rotated { node, transition } => {
                            events.push(RaceEvent::RivalRotated { node });
                            transition
                        }
                        RivalAction::Sabotaged { node, transition } => {
                            events.push(RaceEvent::Sabotaged { node });
                            transition
                        }
                    };
                    self.on_transition(transition, &mut events);
                }
            }
            RaceState::LockedOut { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    log::info!("Lockout over, restarting race");
                    self.start(&mut events);
                } else {
                    self.state = RaceState::LockedOut { remaining };
                }
            }
            RaceState::Idle | RaceState::PlayerWon => {}
        }
        events
    }

    fn start(&mut self, events: &mut Vec<RaceEvent>) {
        self.player_board.reset_board();
        self.rival_board.reset_board();
        self.rival.start();
        self.state = RaceState::Racing;
        log::info!("Mirror race started on '{}'", self.config.board);
        events.push(RaceEvent::Started);
    }

    fn on_transition(&mut self, transition: PowerTransition, events: &mut Vec<RaceEvent>) {
        if transition != PowerTransition::BecameSolved || !self.is_racing() {
            return;
        }
        if self.player_board.is_solved() {
            self.rival.stop();
            self.state = RaceState::PlayerWon;
            log::info!("Player won the mirror race");
            events.push(RaceEvent::PlayerWon);
        } else if self.rival_board.is_solved() {
            self.rival.stop();
            self.state = RaceState::LockedOut {
                remaining: self.config.lockout_duration,
            };
            log::info!(
                "Rival won the mirror race, locked out for {}s",
                self.config.lockout_duration
            );
            events.push(RaceEvent::RivalWon);
        }
    }
}
